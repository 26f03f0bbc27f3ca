#![allow(clippy::missing_errors_doc)]

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tunnelbridge_core::{
    AxisDirection, BridgeType, Command, Direction, Event, MapSize, Owner, RailType,
    RejectionReason, RoadTramType, RoadType, TileIndex, TileType, TransportType,
};
use tunnelbridge_world::{
    self as world, bridge_type, query, rail_type, road_type, tile_owner, tunnel_bridge_state,
    Map, TunnelBridgeState, World,
};

const SNAPSHOT_DOMAIN: &str = "tunnels";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "tunnels:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Terrain heights and wormhole ends of a map, transferable as one line of text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct MapLayoutSnapshot {
    /// Number of tile columns.
    pub(crate) columns: u32,
    /// Number of tile rows.
    pub(crate) rows: u32,
    /// North-west corner height of every tile, row by row.
    pub(crate) heights: Vec<u8>,
    /// Tunnel entrances and bridge ramps placed on the map.
    pub(crate) wormholes: Vec<WormholeRecord>,
}

/// One tunnel entrance or bridge ramp captured within a layout snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum WormholeRecord {
    /// Rail tunnel entrance.
    RailTunnel {
        /// Column of the entrance.
        x: u32,
        /// Row of the entrance.
        y: u32,
        /// Owning company.
        owner: Owner,
        /// Direction pointing into the tunnel.
        direction: Direction,
        /// Rail type laid through the tunnel.
        rail_type: RailType,
    },
    /// Road tunnel entrance.
    RoadTunnel {
        /// Column of the entrance.
        x: u32,
        /// Row of the entrance.
        y: u32,
        /// Owning company.
        owner: Owner,
        /// Direction pointing into the tunnel.
        direction: AxisDirection,
        /// Road type, if the tunnel carries road.
        road_type: Option<RoadType>,
        /// Tram type, if the tunnel carries tram tracks.
        tram_type: Option<RoadType>,
    },
    /// Bridge ramp.
    BridgeRamp {
        /// Column of the ramp.
        x: u32,
        /// Row of the ramp.
        y: u32,
        /// Owning company.
        owner: Owner,
        /// Direction pointing across the bridge.
        direction: AxisDirection,
        /// Transport carried by the bridge.
        transport: TransportType,
        /// Kind of bridge spanning from the ramp.
        bridge_type: BridgeType,
    },
}

impl WormholeRecord {
    fn position(&self) -> (u32, u32) {
        match *self {
            Self::RailTunnel { x, y, .. }
            | Self::RoadTunnel { x, y, .. }
            | Self::BridgeRamp { x, y, .. } => (x, y),
        }
    }

    fn command(&self, tile: TileIndex) -> Command {
        match *self {
            Self::RailTunnel {
                owner,
                direction,
                rail_type,
                ..
            } => Command::BuildRailTunnel {
                tile,
                owner,
                direction,
                rail_type,
            },
            Self::RoadTunnel {
                owner,
                direction,
                road_type,
                tram_type,
                ..
            } => Command::BuildRoadTunnel {
                tile,
                owner,
                direction,
                road_type,
                tram_type,
            },
            Self::BridgeRamp {
                owner,
                direction,
                transport,
                bridge_type,
                ..
            } => Command::BuildBridgeRamp {
                tile,
                owner,
                bridge_type,
                direction,
                transport,
            },
        }
    }
}

impl MapLayoutSnapshot {
    /// Captures the heights and wormhole ends of `map`.
    ///
    /// Water tunnels cannot be rebuilt from a command and are skipped.
    #[must_use]
    pub(crate) fn capture(map: &Map) -> Self {
        let size = map.size();
        let mut heights = Vec::new();
        let mut wormholes = Vec::new();
        for y in 0..size.size_y {
            for x in 0..size.size_x {
                let tile = map.tile_xy(x, y);
                heights.push(map.tile_height(tile));
                if let Some(record) = capture_wormhole(map, tile, x, y) {
                    wormholes.push(record);
                }
            }
        }

        Self {
            columns: size.size_x,
            rows: size.size_y,
            heights,
            wormholes,
        }
    }

    /// Builds a world holding this layout by replaying it as commands.
    pub(crate) fn to_world(&self) -> Result<World, LayoutTransferError> {
        let size = MapSize::new(self.columns, self.rows);
        let expected = size.tile_count();
        if self.heights.len() as u64 != expected {
            return Err(LayoutTransferError::HeightCount {
                expected,
                found: self.heights.len(),
            });
        }

        let mut world = World::new();
        replay(&mut world, Command::ConfigureMap { size })?;

        for (index, height) in self.heights.iter().enumerate() {
            let tile = TileIndex::new(index as u32);
            replay(
                &mut world,
                Command::SetTileHeight {
                    tile,
                    height: *height,
                },
            )?;
        }

        for record in &self.wormholes {
            let (x, y) = record.position();
            if x >= self.columns || y >= self.rows {
                return Err(LayoutTransferError::OutsideGrid { x, y });
            }
            let tile = query::map(&world).tile_xy(x, y);
            replay(&mut world, record.command(tile))?;
        }

        Ok(world)
    }

    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let payload = SerializableSnapshot {
            heights: self.heights.clone(),
            wormholes: self.wormholes.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::Serialize)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
            self.columns, self.rows
        ))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        Ok(Self {
            columns,
            rows,
            heights: decoded.heights,
            wormholes: decoded.wormholes,
        })
    }
}

fn capture_wormhole(map: &Map, tile: TileIndex, x: u32, y: u32) -> Option<WormholeRecord> {
    if !map.is_tile_type(tile, TileType::TunnelBridge) {
        return None;
    }

    let owner = tile_owner(map, tile);
    match tunnel_bridge_state(map, tile) {
        TunnelBridgeState::RailTunnel { direction, .. } => Some(WormholeRecord::RailTunnel {
            x,
            y,
            owner,
            direction,
            rail_type: rail_type(map, tile),
        }),
        TunnelBridgeState::RoadTunnel { direction } => Some(WormholeRecord::RoadTunnel {
            x,
            y,
            owner,
            direction,
            road_type: road_type(map, tile, RoadTramType::Road),
            tram_type: road_type(map, tile, RoadTramType::Tram),
        }),
        TunnelBridgeState::Bridge {
            direction,
            transport,
        } => Some(WormholeRecord::BridgeRamp {
            x,
            y,
            owner,
            direction,
            transport,
            bridge_type: bridge_type(map, tile),
        }),
        TunnelBridgeState::WaterTunnel { .. } => None,
    }
}

fn replay(world: &mut World, command: Command) -> Result<(), LayoutTransferError> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    match events.iter().find_map(|event| match event {
        Event::CommandRejected { reason } => Some(*reason),
        _ => None,
    }) {
        Some(reason) => Err(LayoutTransferError::Rejected(reason)),
        None => Ok(()),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableSnapshot {
    heights: Vec<u8>,
    wormholes: Vec<WormholeRecord>,
}

/// Errors that can occur while transferring layouts.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    #[error("layout string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The snapshot could not be serialised.
    #[error("could not serialise layout: {0}")]
    Serialize(#[source] serde_json::Error),
    /// The number of heights does not match the grid dimensions.
    #[error("layout holds {found} heights, the grid needs {expected}")]
    HeightCount {
        /// Tiles in the grid.
        expected: u64,
        /// Heights present in the payload.
        found: usize,
    },
    /// A wormhole lies outside the grid.
    #[error("wormhole at ({x}, {y}) lies outside the grid")]
    OutsideGrid {
        /// Column of the wormhole.
        x: u32,
        /// Row of the wormhole.
        y: u32,
    },
    /// The world refused a command replayed from the layout.
    #[error("world rejected the layout: {0:?}")]
    Rejected(RejectionReason),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if !MapSize::new(columns, rows).is_valid() {
        return Err(invalid());
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(columns: u32, rows: u32) -> MapLayoutSnapshot {
        MapLayoutSnapshot {
            columns,
            rows,
            heights: vec![0; (columns * rows) as usize],
            wormholes: Vec::new(),
        }
    }

    #[test]
    fn round_trip_populated_layout() {
        let mut snapshot = flat(6, 4);
        snapshot.heights[8] = 2;
        snapshot.wormholes = vec![
            WormholeRecord::RailTunnel {
                x: 1,
                y: 1,
                owner: Owner::new(2),
                direction: Direction::SouthEast,
                rail_type: RailType::new(3),
            },
            WormholeRecord::BridgeRamp {
                x: 5,
                y: 3,
                owner: Owner::new(0),
                direction: AxisDirection::West,
                transport: TransportType::Road,
                bridge_type: BridgeType::new(4),
            },
        ];

        let encoded = snapshot.encode().expect("snapshot encodes");
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:6x4:")));

        let decoded = MapLayoutSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn world_replay_captures_the_same_layout() {
        let mut snapshot = flat(5, 5);
        snapshot.heights[12] = 1;
        snapshot.wormholes = vec![
            WormholeRecord::RoadTunnel {
                x: 0,
                y: 2,
                owner: Owner::TOWN,
                direction: AxisDirection::East,
                road_type: Some(RoadType::new(1)),
                tram_type: None,
            },
            WormholeRecord::RailTunnel {
                x: 4,
                y: 0,
                owner: Owner::new(1),
                direction: Direction::SouthWest,
                rail_type: RailType::new(0),
            },
        ];

        let world = snapshot.to_world().expect("layout replays");
        assert_eq!(MapLayoutSnapshot::capture(query::map(&world)), snapshot);
    }

    #[test]
    fn rejects_foreign_prefix() {
        let error = MapLayoutSnapshot::decode("maze:v1:4x4:e30").expect_err("prefix rejected");
        assert!(matches!(error, LayoutTransferError::InvalidPrefix(prefix) if prefix == "maze"));
    }

    #[test]
    fn rejects_zero_sized_grid() {
        let error = MapLayoutSnapshot::decode("tunnels:v1:0x4:e30").expect_err("grid rejected");
        assert!(matches!(error, LayoutTransferError::InvalidDimensions(_)));
    }

    #[test]
    fn height_count_must_match_grid() {
        let mut snapshot = flat(3, 3);
        let _ = snapshot.heights.pop();
        assert!(matches!(
            snapshot.to_world(),
            Err(LayoutTransferError::HeightCount {
                expected: 9,
                found: 8
            })
        ));
    }

    #[test]
    fn wormholes_outside_the_grid_are_refused() {
        let mut snapshot = flat(3, 3);
        snapshot.wormholes.push(WormholeRecord::RailTunnel {
            x: 3,
            y: 0,
            owner: Owner::new(0),
            direction: Direction::West,
            rail_type: RailType::new(0),
        });
        assert!(matches!(
            snapshot.to_world(),
            Err(LayoutTransferError::OutsideGrid { x: 3, y: 0 })
        ));
    }

    #[test]
    fn oversized_owner_is_rejected_by_the_world() {
        let mut snapshot = flat(3, 3);
        snapshot.wormholes.push(WormholeRecord::BridgeRamp {
            x: 1,
            y: 1,
            owner: Owner::new(200),
            direction: AxisDirection::South,
            transport: TransportType::Road,
            bridge_type: BridgeType::new(0),
        });
        assert!(matches!(
            snapshot.to_world(),
            Err(LayoutTransferError::Rejected(RejectionReason::ValueOutOfRange { tile }))
                if tile == TileIndex::new(4)
        ));
    }
}
