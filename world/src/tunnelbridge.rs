//! Accessors shared by tunnel entrances and bridge ramps.

use tunnelbridge_core::{AxisDirection, Direction, TileIndex, TileType, TrackBits, TransportType};

use crate::layout::{m5, m7};
use crate::tunnel::is_tunnel;
use crate::Map;

/// Decoded view of a tunnel entrance or bridge ramp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TunnelBridgeState {
    /// Road tunnel entrance; always one of the four axis directions.
    RoadTunnel {
        /// Direction pointing into the tunnel.
        direction: AxisDirection,
    },
    /// Rail tunnel entrance.
    RailTunnel {
        /// Direction pointing into the tunnel.
        direction: Direction,
        /// Whether the track through the entrance is reserved.
        reserved: bool,
    },
    /// Water tunnel entrance. Never built by the constructors; decoded for
    /// completeness of the transport field.
    WaterTunnel {
        /// Direction pointing into the tunnel.
        direction: AxisDirection,
    },
    /// Bridge ramp of any transport type.
    Bridge {
        /// Direction pointing across the bridge.
        direction: AxisDirection,
        /// Transport carried by the bridge.
        transport: TransportType,
    },
}

pub(crate) fn assert_tunnel_bridge(map: &Map, tile: TileIndex) {
    assert!(
        map.is_tile_type(tile, TileType::TunnelBridge),
        "tile {} is not a tunnel or bridge end (found {:?})",
        tile.get(),
        map.tile_type(tile)
    );
}

fn assert_rail(map: &Map, tile: TileIndex) {
    let transport = tunnel_bridge_transport_type(map, tile);
    assert!(
        transport == TransportType::Rail,
        "tile {} carries {transport:?}, reservations need rail",
        tile.get()
    );
}

/// Direction pointing towards the other end of the tunnel or bridge.
///
/// For diagonal rail tunnels this is the base direction, i.e. the 8-way
/// direction rounded counter-clockwise onto an axis.
///
/// # Panics
///
/// Panics if `tile` is not a tunnel or bridge end.
#[must_use]
pub fn tunnel_bridge_direction(map: &Map, tile: TileIndex) -> AxisDirection {
    assert_tunnel_bridge(map, tile);
    AxisDirection::from_bits(m5::DIRECTION.get(map.tile(tile).m5))
}

/// Full 8-way direction pointing towards the other end.
///
/// Only rail tunnels store diagonals. Everything else widens the base
/// direction.
///
/// # Panics
///
/// Panics if `tile` is not a tunnel or bridge end.
#[must_use]
pub fn tunnel_bridge_full_direction(map: &Map, tile: TileIndex) -> Direction {
    assert_tunnel_bridge(map, tile);
    let byte = map.tile(tile).m5;
    let base = m5::DIRECTION.get(byte);
    if is_tunnel(map, tile)
        && tunnel_bridge_transport_type(map, tile) == TransportType::Rail
        && m5::EXTENDED_DIRECTION.is_set(byte)
    {
        Direction::from_bits(m5::EXTENDED_LOW_BIT.get(byte) | (base << 1))
    } else {
        AxisDirection::from_bits(base).to_direction()
    }
}

/// Writes `direction` into the wormhole byte using the most compact form.
///
/// Axis directions only touch the base field. Diagonals additionally set the
/// extended flag and the low bit, which only rail tunnels may do.
pub(crate) fn store_full_direction(byte: &mut u8, direction: Direction) {
    let extended = !direction.is_axis_aligned();
    m5::DIRECTION.set(byte, direction.to_axis().bits());
    m5::EXTENDED_DIRECTION.assign(byte, extended);
    m5::EXTENDED_LOW_BIT.set(byte, if extended { direction.bits() & 1 } else { 0 });
}

/// Transport type of the tunnel, or of the bridge's ramp.
///
/// # Panics
///
/// Panics if `tile` is not a tunnel or bridge end, or if the field holds the
/// unused value 3.
#[must_use]
pub fn tunnel_bridge_transport_type(map: &Map, tile: TileIndex) -> TransportType {
    assert_tunnel_bridge(map, tile);
    let bits = m5::TRANSPORT.get(map.tile(tile).m5);
    match TransportType::from_bits(bits) {
        Some(transport) => transport,
        None => panic!("tile {} holds unused transport value {bits}", tile.get()),
    }
}

/// Reports whether the entrance or ramp lies in snow or desert.
///
/// # Panics
///
/// Panics if `tile` is not a tunnel or bridge end.
#[must_use]
pub fn has_tunnel_bridge_snow_or_desert(map: &Map, tile: TileIndex) -> bool {
    assert_tunnel_bridge(map, tile);
    m7::SNOW_OR_DESERT.is_set(map.tile(tile).m7)
}

/// Places the entrance or ramp in snow or desert, or takes it out.
///
/// # Panics
///
/// Panics if `tile` is not a tunnel or bridge end.
pub fn set_tunnel_bridge_snow_or_desert(map: &mut Map, tile: TileIndex, snow_or_desert: bool) {
    assert_tunnel_bridge(map, tile);
    m7::SNOW_OR_DESERT.assign(&mut map.tile_mut(tile).m7, snow_or_desert);
}

/// Reservation state of a rail tunnel or bridge end.
///
/// # Panics
///
/// Panics if `tile` is not a tunnel or bridge end carrying rail.
#[must_use]
pub fn has_tunnel_bridge_reservation(map: &Map, tile: TileIndex) -> bool {
    assert_tunnel_bridge(map, tile);
    assert_rail(map, tile);
    m5::RESERVATION.is_set(map.tile(tile).m5)
}

/// Changes the reservation state of a rail tunnel or bridge end.
///
/// # Panics
///
/// Panics if `tile` is not a tunnel or bridge end carrying rail.
pub fn set_tunnel_bridge_reservation(map: &mut Map, tile: TileIndex, reserved: bool) {
    assert_tunnel_bridge(map, tile);
    assert_rail(map, tile);
    m5::RESERVATION.assign(&mut map.tile_mut(tile).m5, reserved);
}

/// Track pieces reserved through a rail tunnel or bridge end.
///
/// Empty when nothing is reserved. Tunnels follow their full direction,
/// bridges their base direction.
///
/// # Panics
///
/// Panics if `tile` is not a tunnel or bridge end carrying rail.
#[must_use]
pub fn tunnel_bridge_reservation_track_bits(map: &Map, tile: TileIndex) -> TrackBits {
    if !has_tunnel_bridge_reservation(map, tile) {
        return TrackBits::NONE;
    }

    if is_tunnel(map, tile) {
        tunnel_bridge_full_direction(map, tile).track_bits()
    } else {
        tunnel_bridge_direction(map, tile).track_bits()
    }
}

/// Decodes the whole wormhole record of `tile`.
///
/// # Panics
///
/// Panics if `tile` is not a tunnel or bridge end.
#[must_use]
pub fn tunnel_bridge_state(map: &Map, tile: TileIndex) -> TunnelBridgeState {
    let transport = tunnel_bridge_transport_type(map, tile);
    let direction = tunnel_bridge_direction(map, tile);
    if !is_tunnel(map, tile) {
        return TunnelBridgeState::Bridge {
            direction,
            transport,
        };
    }

    match transport {
        TransportType::Rail => TunnelBridgeState::RailTunnel {
            direction: tunnel_bridge_full_direction(map, tile),
            reserved: has_tunnel_bridge_reservation(map, tile),
        },
        TransportType::Road => TunnelBridgeState::RoadTunnel { direction },
        TransportType::Water => TunnelBridgeState::WaterTunnel { direction },
    }
}
