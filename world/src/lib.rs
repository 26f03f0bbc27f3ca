#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative tile storage and the tunnel/bridge tile codec.
//!
//! [`Map`] stores a fixed set of raw fields per tile. The [`layout`] module
//! assigns meaning to those bits for tunnel entrances and bridge ramps, and
//! the accessor functions re-exported at the crate root read and write them.
//! Every accessor takes the map explicitly; preconditions such as "this tile
//! is a tunnel or bridge end" or "this tile carries rail" are checked on every
//! call and panic when violated.
//!
//! [`World`] wraps a map behind the command surface from
//! `tunnelbridge_core`, validating commands before they reach the codec.

use log::debug;
use tunnelbridge_core::{
    BridgeType, Command, Event, MapSize, Owner, RailType, RejectionReason, RoadType, TileIndex,
    TileType, TransportType,
};

use crate::layout::{m1, m3, m4, m6, m7, m8, BitSpan};

mod bridge;
pub mod layout;
mod map;
mod ownership;
mod tunnel;
mod tunnelbridge;

pub use bridge::{bridge_type, is_bridge, is_bridge_tile, make_bridge_ramp};
pub use map::{Map, Tile};
pub use ownership::{
    rail_type, road_owner, road_type, set_rail_type, set_road_owner, set_road_types,
    set_tile_owner, tile_owner,
};
pub use tunnel::{is_tunnel, is_tunnel_tile, make_rail_tunnel, make_road_tunnel};
pub use tunnelbridge::{
    has_tunnel_bridge_reservation, has_tunnel_bridge_snow_or_desert,
    set_tunnel_bridge_reservation, set_tunnel_bridge_snow_or_desert, tunnel_bridge_direction,
    tunnel_bridge_full_direction, tunnel_bridge_reservation_track_bits, tunnel_bridge_state,
    tunnel_bridge_transport_type, TunnelBridgeState,
};

const DEFAULT_MAP_SIZE: MapSize = MapSize::new(64, 64);

/// Represents the authoritative world state.
#[derive(Debug)]
pub struct World {
    map: Map,
}

impl World {
    /// Creates a world holding a flat default-sized map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: Map::new(DEFAULT_MAP_SIZE),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands that would violate a codec precondition are answered with
/// [`Event::CommandRejected`] and leave the map untouched.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let outcome = match command {
        Command::ConfigureMap { size } => configure_map(world, size),
        Command::SetTileHeight { tile, height } => {
            in_bounds(&world.map, tile).map(|()| {
                world.map.set_tile_height(tile, height);
                Event::TileHeightChanged { tile, height }
            })
        }
        Command::BuildRailTunnel {
            tile,
            owner,
            direction,
            rail_type,
        } => in_bounds(&world.map, tile)
            .and_then(|()| rail_tunnel_fits(tile, owner, rail_type))
            .map(|()| {
                make_rail_tunnel(&mut world.map, tile, owner, direction, rail_type);
                Event::TunnelBuilt {
                    tile,
                    direction,
                    transport: TransportType::Rail,
                }
            }),
        Command::BuildRoadTunnel {
            tile,
            owner,
            direction,
            road_type,
            tram_type,
        } => in_bounds(&world.map, tile)
            .and_then(|()| road_tunnel_fits(tile, owner, road_type, tram_type))
            .map(|()| {
                make_road_tunnel(&mut world.map, tile, owner, direction, road_type, tram_type);
                Event::TunnelBuilt {
                    tile,
                    direction: direction.to_direction(),
                    transport: TransportType::Road,
                }
            }),
        Command::BuildBridgeRamp {
            tile,
            owner,
            bridge_type,
            direction,
            transport,
        } => in_bounds(&world.map, tile)
            .and_then(|()| bridge_ramp_fits(tile, owner, bridge_type))
            .map(|()| {
                make_bridge_ramp(&mut world.map, tile, owner, bridge_type, direction, transport);
                Event::BridgeRampBuilt {
                    tile,
                    direction,
                    transport,
                }
            }),
        Command::SetReservation { tile, reserved } => rail_wormhole(&world.map, tile).map(|()| {
            set_tunnel_bridge_reservation(&mut world.map, tile, reserved);
            Event::ReservationChanged { tile, reserved }
        }),
        Command::SetSnowOrDesert {
            tile,
            snow_or_desert,
        } => wormhole(&world.map, tile).map(|()| {
            set_tunnel_bridge_snow_or_desert(&mut world.map, tile, snow_or_desert);
            Event::SnowOrDesertChanged {
                tile,
                snow_or_desert,
            }
        }),
    };

    match outcome {
        Ok(event) => out_events.push(event),
        Err(reason) => {
            debug!("command rejected: {reason:?}");
            out_events.push(Event::CommandRejected { reason });
        }
    }
}

fn configure_map(world: &mut World, size: MapSize) -> Result<Event, RejectionReason> {
    if !size.is_valid() {
        return Err(RejectionReason::InvalidMapSize);
    }

    world.map = Map::new(size);
    Ok(Event::MapConfigured { size })
}

fn in_bounds(map: &Map, tile: TileIndex) -> Result<(), RejectionReason> {
    if map.is_valid_tile(tile) {
        Ok(())
    } else {
        Err(RejectionReason::OutOfBounds { tile })
    }
}

fn values_fit(tile: TileIndex, values: &[(BitSpan, u16)]) -> Result<(), RejectionReason> {
    if values.iter().all(|(span, value)| span.fits(*value)) {
        Ok(())
    } else {
        Err(RejectionReason::ValueOutOfRange { tile })
    }
}

fn rail_tunnel_fits(
    tile: TileIndex,
    owner: Owner,
    rail_type: RailType,
) -> Result<(), RejectionReason> {
    values_fit(
        tile,
        &[
            (m1::OWNER, u16::from(owner.get())),
            (m8::RAIL_TYPE, u16::from(rail_type.get())),
        ],
    )
}

fn road_tunnel_fits(
    tile: TileIndex,
    owner: Owner,
    road_type: Option<RoadType>,
    tram_type: Option<RoadType>,
) -> Result<(), RejectionReason> {
    // Town and unowned trams share the town value in the narrow tram field.
    let tram_owner = if owner == Owner::NONE {
        Owner::TOWN
    } else {
        owner
    };
    let road_bits = |road: Option<RoadType>| road.map_or(0, |road| u16::from(road.get()));
    values_fit(
        tile,
        &[
            (m1::OWNER, u16::from(owner.get())),
            (m7::ROAD_OWNER, u16::from(owner.get())),
            (m3::TRAM_OWNER, u16::from(tram_owner.get())),
            (m4::ROAD_TYPE, road_bits(road_type)),
            (m8::TRAM_TYPE, road_bits(tram_type)),
        ],
    )
}

fn bridge_ramp_fits(
    tile: TileIndex,
    owner: Owner,
    bridge_type: BridgeType,
) -> Result<(), RejectionReason> {
    values_fit(
        tile,
        &[
            (m1::OWNER, u16::from(owner.get())),
            (m6::BRIDGE_TYPE, u16::from(bridge_type.get())),
        ],
    )
}

fn wormhole(map: &Map, tile: TileIndex) -> Result<(), RejectionReason> {
    in_bounds(map, tile)?;
    if map.is_tile_type(tile, TileType::TunnelBridge) {
        Ok(())
    } else {
        Err(RejectionReason::NotTunnelBridge { tile })
    }
}

fn rail_wormhole(map: &Map, tile: TileIndex) -> Result<(), RejectionReason> {
    wormhole(map, tile)?;
    let transport = layout::m5::TRANSPORT.get(map.tile(tile).m5);
    if transport == TransportType::Rail.bits() {
        Ok(())
    } else {
        Err(RejectionReason::NotRail { tile })
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Map, World};

    /// Provides read-only access to the tile map.
    #[must_use]
    pub fn map(world: &World) -> &Map {
        &world.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunnelbridge_core::{AxisDirection, Direction};

    fn configured(size: MapSize) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::ConfigureMap { size }, &mut events);
        assert_eq!(events, vec![Event::MapConfigured { size }]);
        world
    }

    #[test]
    fn invalid_map_size_keeps_previous_map() {
        let mut world = configured(MapSize::new(8, 8));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureMap {
                size: MapSize::new(0, 8),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: RejectionReason::InvalidMapSize
            }]
        );
        assert_eq!(query::map(&world).size(), MapSize::new(8, 8));
    }

    #[test]
    fn reservation_on_plain_tile_is_rejected() {
        let mut world = configured(MapSize::new(8, 8));
        let mut events = Vec::new();
        let tile = TileIndex::new(9);
        apply(
            &mut world,
            Command::SetReservation {
                tile,
                reserved: true,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: RejectionReason::NotTunnelBridge { tile }
            }]
        );
    }

    #[test]
    fn rail_tunnel_command_reports_full_direction() {
        let mut world = configured(MapSize::new(8, 8));
        let mut events = Vec::new();
        let tile = TileIndex::new(10);
        apply(
            &mut world,
            Command::BuildRailTunnel {
                tile,
                owner: Owner::new(1),
                direction: Direction::SouthEast,
                rail_type: RailType::new(0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::TunnelBuilt {
                tile,
                direction: Direction::SouthEast,
                transport: TransportType::Rail,
            }]
        );
        assert_eq!(
            tunnel_bridge_direction(query::map(&world), tile),
            AxisDirection::East
        );
    }

    #[test]
    fn out_of_bounds_height_change_is_rejected() {
        let mut world = configured(MapSize::new(4, 4));
        let mut events = Vec::new();
        let tile = TileIndex::new(16);
        apply(
            &mut world,
            Command::SetTileHeight { tile, height: 2 },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: RejectionReason::OutOfBounds { tile }
            }]
        );
    }

    #[test]
    fn oversized_payloads_are_rejected_untouched() {
        let mut world = configured(MapSize::new(8, 8));
        let tile = TileIndex::new(12);
        let commands = vec![
            Command::BuildRailTunnel {
                tile,
                owner: Owner::new(1),
                direction: Direction::East,
                rail_type: RailType::new(64),
            },
            Command::BuildRailTunnel {
                tile,
                owner: Owner::new(40),
                direction: Direction::East,
                rail_type: RailType::new(0),
            },
            Command::BuildRoadTunnel {
                tile,
                owner: Owner::new(0x1F),
                direction: AxisDirection::North,
                road_type: None,
                tram_type: None,
            },
            Command::BuildRoadTunnel {
                tile,
                owner: Owner::new(1),
                direction: AxisDirection::North,
                road_type: Some(RoadType::new(64)),
                tram_type: None,
            },
            Command::BuildRoadTunnel {
                tile,
                owner: Owner::new(1),
                direction: AxisDirection::North,
                road_type: None,
                tram_type: Some(RoadType::new(70)),
            },
            Command::BuildBridgeRamp {
                tile,
                owner: Owner::new(1),
                bridge_type: BridgeType::new(16),
                direction: AxisDirection::West,
                transport: TransportType::Rail,
            },
        ];

        for command in commands {
            let mut events = Vec::new();
            apply(&mut world, command.clone(), &mut events);
            assert_eq!(
                events,
                vec![Event::CommandRejected {
                    reason: RejectionReason::ValueOutOfRange { tile }
                }],
                "{command:?} was accepted"
            );
            assert!(query::map(&world).is_tile_type(tile, TileType::Clear));
        }
    }

    #[test]
    fn unowned_road_tunnel_is_accepted() {
        let mut world = configured(MapSize::new(8, 8));
        let mut events = Vec::new();
        let tile = TileIndex::new(3);
        apply(
            &mut world,
            Command::BuildRoadTunnel {
                tile,
                owner: Owner::NONE,
                direction: AxisDirection::South,
                road_type: Some(RoadType::new(5)),
                tram_type: None,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::TunnelBuilt {
                tile,
                direction: Direction::South,
                transport: TransportType::Road,
            }]
        );
        assert_eq!(tile_owner(query::map(&world), tile), Owner::NONE);
    }
}
