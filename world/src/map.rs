//! Dense tile storage addressed by [`TileIndex`].

use tunnelbridge_core::{MapSize, TileIndex, TileOffset, TileType};

/// Raw fields of a single tile.
///
/// The meaning of `m1`..`m8` depends on `tile_type`; see [`crate::layout`]
/// for tunnel entrances and bridge ramps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    /// What occupies the tile.
    pub tile_type: TileType,
    /// Height of the tile's north-west corner.
    pub height: u8,
    /// Owner byte.
    pub m1: u8,
    /// General purpose word.
    pub m2: u16,
    /// General purpose byte.
    pub m3: u8,
    /// General purpose byte.
    pub m4: u8,
    /// General purpose byte.
    pub m5: u8,
    /// General purpose byte.
    pub m6: u8,
    /// General purpose byte.
    pub m7: u8,
    /// General purpose word.
    pub m8: u16,
}

/// Rectangular grid of tiles stored in row-major order.
#[derive(Clone, Debug)]
pub struct Map {
    size: MapSize,
    tiles: Vec<Tile>,
}

impl Map {
    /// Creates a flat map of clear tiles at height zero.
    ///
    /// # Panics
    ///
    /// Panics if `size` is not [valid](MapSize::is_valid).
    #[must_use]
    pub fn new(size: MapSize) -> Self {
        assert!(size.is_valid(), "map size {size:?} is not addressable");
        let count = usize::try_from(size.tile_count()).unwrap_or(usize::MAX);
        Self {
            size,
            tiles: vec![Tile::default(); count],
        }
    }

    /// Dimensions of the map.
    #[must_use]
    pub const fn size(&self) -> MapSize {
        self.size
    }

    /// Largest valid x coordinate.
    #[must_use]
    pub const fn max_x(&self) -> u32 {
        self.size.size_x - 1
    }

    /// Largest valid y coordinate.
    #[must_use]
    pub const fn max_y(&self) -> u32 {
        self.size.size_y - 1
    }

    /// Index of the tile at `(x, y)`.
    #[must_use]
    pub fn tile_xy(&self, x: u32, y: u32) -> TileIndex {
        debug_assert!(x < self.size.size_x && y < self.size.size_y);
        TileIndex::new(y * self.size.size_x + x)
    }

    /// X coordinate of `tile`.
    #[must_use]
    pub const fn tile_x(&self, tile: TileIndex) -> u32 {
        tile.get() % self.size.size_x
    }

    /// Y coordinate of `tile`.
    #[must_use]
    pub const fn tile_y(&self, tile: TileIndex) -> u32 {
        tile.get() / self.size.size_x
    }

    /// Reports whether `tile` lies within the map.
    #[must_use]
    pub const fn is_valid_tile(&self, tile: TileIndex) -> bool {
        (tile.get() as u64) < self.size.tile_count()
    }

    /// Moves `tile` by `offset`, or `None` when the step leaves the map.
    ///
    /// Steps never wrap from one row into the next.
    #[must_use]
    pub fn add_offset(&self, tile: TileIndex, offset: TileOffset) -> Option<TileIndex> {
        let x = i64::from(self.tile_x(tile)) + i64::from(offset.dx);
        let y = i64::from(self.tile_y(tile)) + i64::from(offset.dy);
        let x = u32::try_from(x).ok().filter(|x| *x < self.size.size_x)?;
        let y = u32::try_from(y).ok().filter(|y| *y < self.size.size_y)?;
        Some(self.tile_xy(x, y))
    }

    /// Read access to the raw fields of `tile`.
    ///
    /// # Panics
    ///
    /// Panics if `tile` lies outside the map.
    #[must_use]
    pub fn tile(&self, tile: TileIndex) -> &Tile {
        &self.tiles[tile.get() as usize]
    }

    /// Write access to the raw fields of `tile`.
    ///
    /// # Panics
    ///
    /// Panics if `tile` lies outside the map.
    #[must_use]
    pub fn tile_mut(&mut self, tile: TileIndex) -> &mut Tile {
        &mut self.tiles[tile.get() as usize]
    }

    /// Type tag of `tile`.
    #[must_use]
    pub fn tile_type(&self, tile: TileIndex) -> TileType {
        self.tile(tile).tile_type
    }

    /// Reports whether `tile` carries the `tile_type` tag.
    #[must_use]
    pub fn is_tile_type(&self, tile: TileIndex, tile_type: TileType) -> bool {
        self.tile_type(tile) == tile_type
    }

    /// Replaces the type tag of `tile`.
    pub fn set_tile_type(&mut self, tile: TileIndex, tile_type: TileType) {
        self.tile_mut(tile).tile_type = tile_type;
    }

    /// Height of the north-west corner of `tile`.
    #[must_use]
    pub fn tile_height(&self, tile: TileIndex) -> u8 {
        self.tile(tile).height
    }

    /// Sets the height of the north-west corner of `tile`.
    pub fn set_tile_height(&mut self, tile: TileIndex, height: u8) {
        self.tile_mut(tile).height = height;
    }

    /// Height of the lowest corner of `tile`.
    ///
    /// Corners on the far south and east edges fall outside the grid and take
    /// the height of the nearest corner inside it.
    #[must_use]
    pub fn tile_z(&self, tile: TileIndex) -> u8 {
        let x = self.tile_x(tile);
        let y = self.tile_y(tile);
        [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)]
            .into_iter()
            .map(|(cx, cy)| self.corner_height(cx, cy))
            .min()
            .unwrap_or(0)
    }

    fn corner_height(&self, x: u32, y: u32) -> u8 {
        let x = x.min(self.max_x());
        let y = y.min(self.max_y());
        self.tile_height(self.tile_xy(x, y))
    }
}
