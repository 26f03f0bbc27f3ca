#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tunnel/bridge engine.
//!
//! This crate defines the geometry and transport vocabulary used by the tile
//! codec and the wormhole resolver, together with the message surface that
//! connects adapters to the authoritative world. Adapters submit [`Command`]
//! values describing desired mutations, the world executes them via its
//! `apply` entry point and reports the outcome as [`Event`] values.
//!
//! The grid is viewed top-down: `x` grows towards the east and `y` grows
//! towards the south.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the map with a flat, empty grid of the provided size.
    ConfigureMap {
        /// Dimensions of the new map.
        size: MapSize,
    },
    /// Sets the height of a tile's north-west corner.
    SetTileHeight {
        /// Tile whose corner height changes.
        tile: TileIndex,
        /// New corner height.
        height: u8,
    },
    /// Carves a rail tunnel entrance.
    BuildRailTunnel {
        /// Entrance tile.
        tile: TileIndex,
        /// Owner of the entrance.
        owner: Owner,
        /// Direction pointing into the tunnel, towards the other end.
        direction: Direction,
        /// Rail type laid through the tunnel.
        rail_type: RailType,
    },
    /// Carves a road tunnel entrance.
    BuildRoadTunnel {
        /// Entrance tile.
        tile: TileIndex,
        /// Owner of the entrance.
        owner: Owner,
        /// Direction pointing into the tunnel, towards the other end.
        direction: AxisDirection,
        /// Road type present in the tunnel, if any.
        road_type: Option<RoadType>,
        /// Tram type present in the tunnel, if any.
        tram_type: Option<RoadType>,
    },
    /// Builds a bridge ramp.
    BuildBridgeRamp {
        /// Ramp tile.
        tile: TileIndex,
        /// Owner of the ramp.
        owner: Owner,
        /// Type of bridge spanning from the ramp.
        bridge_type: BridgeType,
        /// Direction pointing across the bridge, towards the other ramp.
        direction: AxisDirection,
        /// Transport carried by the bridge.
        transport: TransportType,
    },
    /// Reserves or frees the track through a rail tunnel or bridge end.
    SetReservation {
        /// Rail tunnel or bridge end.
        tile: TileIndex,
        /// Desired reservation state.
        reserved: bool,
    },
    /// Places a tunnel entrance or bridge ramp in snow/desert, or takes it out.
    SetSnowOrDesert {
        /// Tunnel entrance or bridge ramp.
        tile: TileIndex,
        /// Whether the tile lies in snow or desert.
        snow_or_desert: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// The map was replaced with a new flat grid.
    MapConfigured {
        /// Dimensions of the new map.
        size: MapSize,
    },
    /// A tile corner height changed.
    TileHeightChanged {
        /// Tile whose north-west corner moved.
        tile: TileIndex,
        /// New corner height.
        height: u8,
    },
    /// A tunnel entrance was carved.
    TunnelBuilt {
        /// Entrance tile.
        tile: TileIndex,
        /// Full direction pointing into the tunnel.
        direction: Direction,
        /// Transport using the tunnel.
        transport: TransportType,
    },
    /// A bridge ramp was built.
    BridgeRampBuilt {
        /// Ramp tile.
        tile: TileIndex,
        /// Direction pointing across the bridge.
        direction: AxisDirection,
        /// Transport carried by the bridge.
        transport: TransportType,
    },
    /// The reservation state of a rail tunnel or bridge end changed.
    ReservationChanged {
        /// Affected tile.
        tile: TileIndex,
        /// New reservation state.
        reserved: bool,
    },
    /// The snow/desert state of a tunnel entrance or bridge ramp changed.
    SnowOrDesertChanged {
        /// Affected tile.
        tile: TileIndex,
        /// New snow/desert state.
        snow_or_desert: bool,
    },
    /// A command was refused without touching the map.
    CommandRejected {
        /// Specific reason the command was refused.
        reason: RejectionReason,
    },
}

/// Reasons the world may refuse a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The requested map has no tiles or more tiles than an index can address.
    InvalidMapSize,
    /// The tile lies outside the map.
    OutOfBounds {
        /// Offending tile.
        tile: TileIndex,
    },
    /// The tile is not a tunnel entrance or bridge ramp.
    NotTunnelBridge {
        /// Offending tile.
        tile: TileIndex,
    },
    /// The tile does not carry rail.
    NotRail {
        /// Offending tile.
        tile: TileIndex,
    },
    /// An owner or infrastructure type is too large for its tile field.
    ValueOutOfRange {
        /// Offending tile.
        tile: TileIndex,
    },
}

/// Linear, row-major index of a tile within the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex(u32);

impl TileIndex {
    /// Creates a new tile index wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying linear index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unit step between neighbouring tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileOffset {
    /// Change along the x axis.
    pub dx: i32,
    /// Change along the y axis.
    pub dy: i32,
}

impl TileOffset {
    /// Creates a new offset.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Offset pointing the opposite way.
    #[must_use]
    pub const fn negate(self) -> Self {
        Self {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}

/// Dimensions of the map measured in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapSize {
    /// Number of tile columns.
    pub size_x: u32,
    /// Number of tile rows.
    pub size_y: u32,
}

impl MapSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(size_x: u32, size_y: u32) -> Self {
        Self { size_x, size_y }
    }

    /// Total number of tiles covered by the map.
    #[must_use]
    pub const fn tile_count(&self) -> u64 {
        self.size_x as u64 * self.size_y as u64
    }

    /// Reports whether the map has at least one tile and every tile is
    /// addressable by a [`TileIndex`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.size_x > 0 && self.size_y > 0 && self.tile_count() <= u32::MAX as u64
    }
}

/// One of the eight compass directions.
///
/// The discriminants are the 3-bit values stored in the tile encoding.
/// Even values lie along a grid axis, odd values are grid diagonals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Towards decreasing `y`.
    North = 0,
    /// Towards increasing `x` and decreasing `y`.
    NorthEast = 1,
    /// Towards increasing `x`.
    East = 2,
    /// Towards increasing `x` and `y`.
    SouthEast = 3,
    /// Towards increasing `y`.
    South = 4,
    /// Towards decreasing `x` and increasing `y`.
    SouthWest = 5,
    /// Towards decreasing `x`.
    West = 6,
    /// Towards decreasing `x` and `y`.
    NorthWest = 7,
}

impl Direction {
    /// Every direction in encoding order.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Decodes the low three bits of `bits`.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0b111) as usize]
    }

    /// Encoded 3-bit value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn reverse(self) -> Self {
        Self::from_bits(self.bits() + 4)
    }

    /// Reports whether the direction runs along a grid axis, i.e. it has an
    /// exact [`AxisDirection`] counterpart.
    #[must_use]
    pub const fn is_axis_aligned(self) -> bool {
        self.bits() & 1 == 0
    }

    /// Axis direction obtained by dropping the lowest bit.
    ///
    /// Exact for axis-aligned directions. Diagonals round counter-clockwise,
    /// e.g. `NorthEast` becomes `North`.
    #[must_use]
    pub const fn to_axis(self) -> AxisDirection {
        AxisDirection::from_bits(self.bits() >> 1)
    }

    /// Unit step taken when moving one tile in this direction.
    #[must_use]
    pub const fn offset(self) -> TileOffset {
        match self {
            Self::North => TileOffset::new(0, -1),
            Self::NorthEast => TileOffset::new(1, -1),
            Self::East => TileOffset::new(1, 0),
            Self::SouthEast => TileOffset::new(1, 1),
            Self::South => TileOffset::new(0, 1),
            Self::SouthWest => TileOffset::new(-1, 1),
            Self::West => TileOffset::new(-1, 0),
            Self::NorthWest => TileOffset::new(-1, -1),
        }
    }

    /// Track piece followed by a train heading in this direction.
    ///
    /// Axis directions use the straight track along their axis, diagonals
    /// use the corner piece in the corner they point at.
    #[must_use]
    pub const fn track_bits(self) -> TrackBits {
        match self {
            Self::NorthEast => TrackBits::NORTH_EAST,
            Self::SouthEast => TrackBits::SOUTH_EAST,
            Self::SouthWest => TrackBits::SOUTH_WEST,
            Self::NorthWest => TrackBits::NORTH_WEST,
            _ => self.to_axis().track_bits(),
        }
    }
}

/// One of the four directions running along a grid axis.
///
/// The discriminants are the 2-bit values stored in the base direction field
/// of a tunnel or bridge tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum AxisDirection {
    /// Towards decreasing `y`.
    North = 0,
    /// Towards increasing `x`.
    East = 1,
    /// Towards increasing `y`.
    South = 2,
    /// Towards decreasing `x`.
    West = 3,
}

impl AxisDirection {
    /// Every axis direction in encoding order.
    pub const ALL: [AxisDirection; 4] = [
        AxisDirection::North,
        AxisDirection::East,
        AxisDirection::South,
        AxisDirection::West,
    ];

    /// Decodes the low two bits of `bits`.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0b11) as usize]
    }

    /// Encoded 2-bit value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn reverse(self) -> Self {
        Self::from_bits(self.bits() + 2)
    }

    /// Widens into the matching eight-way direction.
    #[must_use]
    pub const fn to_direction(self) -> Direction {
        Direction::from_bits(self.bits() << 1)
    }

    /// Unit step taken when moving one tile in this direction.
    #[must_use]
    pub const fn offset(self) -> TileOffset {
        self.to_direction().offset()
    }

    /// Grid axis the direction runs along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::East | Self::West => Axis::X,
            Self::North | Self::South => Axis::Y,
        }
    }

    /// Straight track running along this direction on an ordinary tile.
    #[must_use]
    pub const fn track_bits(self) -> TrackBits {
        match self.axis() {
            Axis::X => TrackBits::X,
            Axis::Y => TrackBits::Y,
        }
    }
}

/// The two grid axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal axis, east-west.
    X,
    /// Vertical axis, north-south.
    Y,
}

/// Mode of transport carried by a tunnel or bridge.
///
/// The discriminants are the values of the 2-bit transport field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransportType {
    /// Railway track.
    Rail = 0,
    /// Road and/or tram.
    Road = 1,
    /// Canal; only aqueducts carry water.
    Water = 2,
}

impl TransportType {
    /// Decodes a 2-bit transport field. `None` for the unused value 3.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Rail),
            1 => Some(Self::Road),
            2 => Some(Self::Water),
            _ => None,
        }
    }

    /// Encoded 2-bit value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Set of track pieces on a single tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackBits(u8);

impl TrackBits {
    /// No track at all.
    pub const NONE: Self = Self(0);
    /// Straight track along the x axis.
    pub const X: Self = Self(1 << 0);
    /// Straight track along the y axis.
    pub const Y: Self = Self(1 << 1);
    /// Short piece cutting across the north-east corner.
    pub const NORTH_EAST: Self = Self(1 << 2);
    /// Short piece cutting across the south-east corner.
    pub const SOUTH_EAST: Self = Self(1 << 3);
    /// Short piece cutting across the south-west corner.
    pub const SOUTH_WEST: Self = Self(1 << 4);
    /// Short piece cutting across the north-west corner.
    pub const NORTH_WEST: Self = Self(1 << 5);

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Reports whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Reports whether every piece in `other` is also in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TrackBits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TrackBits {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Company or pseudo-company owning a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Owner(u8);

impl Owner {
    /// Tiles owned by a town.
    pub const TOWN: Self = Self(0x0F);
    /// Tiles without an owner.
    pub const NONE: Self = Self(0x10);

    /// Creates a new owner wrapper.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric owner identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Selects between the road and tram halves of a road tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoadTramType {
    /// Road vehicles.
    Road,
    /// Trams.
    Tram,
}

/// Index into the rail type table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RailType(u8);

impl RailType {
    /// Creates a new rail type wrapper.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric rail type.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Index into the road/tram type table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoadType(u8);

impl RoadType {
    /// Stored value meaning "no road type present".
    pub const INVALID: Self = Self(63);

    /// Creates a new road type wrapper.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric road type.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Index into the bridge type table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BridgeType(u8);

impl BridgeType {
    /// Creates a new bridge type wrapper.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric bridge type.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Tag describing what occupies a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    /// Bare land.
    #[default]
    Clear,
    /// Railway track.
    Railway,
    /// Road or level crossing.
    Road,
    /// Town building.
    House,
    /// Trees.
    Trees,
    /// Station or depot-like infrastructure.
    Station,
    /// Sea, river or canal.
    Water,
    /// Border tile outside the playable area.
    Void,
    /// Industry building.
    Industry,
    /// Tunnel entrance or bridge ramp.
    TunnelBridge,
    /// Miscellaneous object.
    Object,
}
