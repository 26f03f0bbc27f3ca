use tunnelbridge_core::{
    AxisDirection, BridgeType, Command, Direction, Event, MapSize, Owner, RailType, RoadType,
    TileIndex, TransportType,
};
use tunnelbridge_system_wormhole::{
    is_tunnel_in_way, is_tunnel_in_way_dir, other_bridge_end, other_tunnel_bridge_end,
    other_tunnel_end, try_other_bridge_end, try_other_tunnel_end, tunnel_pairs, SearchLimits,
    WormholeFault,
};
use tunnelbridge_world::{self as world, query, Map, World};

fn configured(size_x: u32, size_y: u32) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureMap {
            size: MapSize::new(size_x, size_y),
        },
        &mut events,
    );
    world
}

fn tile(world: &World, x: u32, y: u32) -> TileIndex {
    query::map(world).tile_xy(x, y)
}

fn run(world: &mut World, commands: Vec<Command>) {
    for command in commands {
        let mut events = Vec::new();
        world::apply(world, command, &mut events);
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, Event::CommandRejected { .. })),
            "command rejected: {events:?}"
        );
    }
}

fn raise(world: &mut World, xs: std::ops::RangeInclusive<u32>, height: u8) {
    let size = query::map(world).size();
    let mut commands = Vec::new();
    for y in 0..size.size_y {
        for x in xs.clone() {
            commands.push(Command::SetTileHeight {
                tile: tile(world, x, y),
                height,
            });
        }
    }
    run(world, commands);
}

fn rail_tunnel(world: &World, x: u32, y: u32, direction: Direction) -> Command {
    Command::BuildRailTunnel {
        tile: tile(world, x, y),
        owner: Owner::new(1),
        direction,
        rail_type: RailType::new(0),
    }
}

fn bridge_ramp(world: &World, x: u32, y: u32, direction: AxisDirection) -> Command {
    Command::BuildBridgeRamp {
        tile: tile(world, x, y),
        owner: Owner::new(1),
        bridge_type: BridgeType::new(2),
        direction,
        transport: TransportType::Road,
    }
}

/// A 16x16 map with a ridge across columns 6 to 9 and a rail tunnel through
/// it on row 8.
fn ridge_with_tunnel() -> World {
    let mut world = configured(16, 16);
    raise(&mut world, 6..=10, 1);
    let commands = vec![
        rail_tunnel(&world, 5, 8, Direction::East),
        rail_tunnel(&world, 10, 8, Direction::West),
    ];
    run(&mut world, commands);
    world
}

#[test]
fn tunnel_through_ridge_pairs_both_ways() {
    let world = ridge_with_tunnel();
    let map = query::map(&world);
    let west = map.tile_xy(5, 8);
    let east = map.tile_xy(10, 8);

    assert_eq!(other_tunnel_end(map, west), east);
    assert_eq!(other_tunnel_end(map, east), west);
    assert_eq!(other_tunnel_bridge_end(map, west), east);
}

#[test]
fn tunnel_under_ridge_is_in_the_way_only_at_its_own_height() {
    let world = ridge_with_tunnel();
    let map = query::map(&world);
    let above = map.tile_xy(7, 8);

    assert!(is_tunnel_in_way(map, above, 0));
    assert!(is_tunnel_in_way_dir(map, above, 0, AxisDirection::East));
    assert!(is_tunnel_in_way_dir(map, above, 0, AxisDirection::West));
    assert!(!is_tunnel_in_way_dir(map, above, 0, AxisDirection::North));
    assert!(!is_tunnel_in_way(map, above, 1));
    assert!(!is_tunnel_in_way(map, map.tile_xy(7, 3), 0));
}

#[test]
fn every_column_over_the_tunnel_sees_it_only_at_tunnel_height() {
    let world = ridge_with_tunnel();
    let map = query::map(&world);

    for x in 6..=9 {
        let above = map.tile_xy(x, 8);
        for direction in [AxisDirection::East, AxisDirection::West] {
            assert!(is_tunnel_in_way_dir(map, above, 0, direction), "x={x} {direction:?}");
            assert!(!is_tunnel_in_way_dir(map, above, 1, direction), "x={x} {direction:?}");
        }
        for direction in [AxisDirection::North, AxisDirection::South] {
            assert!(!is_tunnel_in_way_dir(map, above, 0, direction), "x={x} {direction:?}");
        }
    }
}

#[test]
fn parallel_tunnels_at_different_heights_pair_by_height() {
    let mut world = configured(16, 4);
    raise(&mut world, 3..=12, 1);
    raise(&mut world, 5..=10, 2);
    raise(&mut world, 6..=9, 3);
    let commands = vec![
        rail_tunnel(&world, 2, 1, Direction::East),
        rail_tunnel(&world, 5, 1, Direction::East),
        rail_tunnel(&world, 9, 1, Direction::West),
        rail_tunnel(&world, 12, 1, Direction::West),
    ];
    run(&mut world, commands);
    let map = query::map(&world);
    assert_eq!(map.tile_z(map.tile_xy(2, 1)), 0);
    assert_eq!(map.tile_z(map.tile_xy(5, 1)), 2);

    assert_eq!(other_tunnel_end(map, map.tile_xy(2, 1)), map.tile_xy(12, 1));
    assert_eq!(other_tunnel_end(map, map.tile_xy(5, 1)), map.tile_xy(9, 1));
    assert_eq!(other_tunnel_end(map, map.tile_xy(9, 1)), map.tile_xy(5, 1));
    assert_eq!(other_tunnel_end(map, map.tile_xy(12, 1)), map.tile_xy(2, 1));
}

#[test]
fn diagonal_rail_tunnels_pair_along_the_diagonal() {
    let mut world = configured(8, 8);
    let commands = vec![
        rail_tunnel(&world, 1, 1, Direction::SouthEast),
        rail_tunnel(&world, 5, 5, Direction::NorthWest),
        rail_tunnel(&world, 6, 1, Direction::SouthWest),
        rail_tunnel(&world, 2, 5, Direction::NorthEast),
    ];
    run(&mut world, commands);
    let map = query::map(&world);

    assert_eq!(other_tunnel_end(map, map.tile_xy(1, 1)), map.tile_xy(5, 5));
    assert_eq!(other_tunnel_end(map, map.tile_xy(5, 5)), map.tile_xy(1, 1));
    assert_eq!(other_tunnel_end(map, map.tile_xy(6, 1)), map.tile_xy(2, 5));
    assert_eq!(other_tunnel_end(map, map.tile_xy(2, 5)), map.tile_xy(6, 1));
}

#[test]
fn road_tunnels_pair_like_rail_tunnels() {
    let mut world = configured(8, 8);
    let commands = vec![
        Command::BuildRoadTunnel {
            tile: tile(&world, 3, 0),
            owner: Owner::TOWN,
            direction: AxisDirection::South,
            road_type: Some(RoadType::new(0)),
            tram_type: None,
        },
        Command::BuildRoadTunnel {
            tile: tile(&world, 3, 6),
            owner: Owner::TOWN,
            direction: AxisDirection::North,
            road_type: Some(RoadType::new(0)),
            tram_type: None,
        },
    ];
    run(&mut world, commands);
    let map = query::map(&world);

    assert_eq!(other_tunnel_end(map, map.tile_xy(3, 0)), map.tile_xy(3, 6));
}

#[test]
fn tunnel_leaving_the_map_is_a_fault() {
    let mut world = configured(8, 1);
    let commands = vec![rail_tunnel(&world, 3, 0, Direction::West)];
    run(&mut world, commands);
    let map = query::map(&world);
    let start = map.tile_xy(3, 0);

    assert_eq!(
        try_other_tunnel_end(map, start, &SearchLimits::default()),
        Err(WormholeFault::LeftMap {
            start,
            direction: Direction::West,
            steps: 4,
        })
    );
}

#[test]
fn step_budget_bounds_the_walk() {
    let mut world = configured(16, 1);
    let commands = vec![
        rail_tunnel(&world, 0, 0, Direction::East),
        rail_tunnel(&world, 10, 0, Direction::West),
    ];
    run(&mut world, commands);
    let map = query::map(&world);
    let start = map.tile_xy(0, 0);

    assert_eq!(
        try_other_tunnel_end(map, start, &SearchLimits { max_steps: 9 }),
        Err(WormholeFault::StepLimitExceeded {
            start,
            direction: Direction::East,
            steps: 9,
        })
    );
    assert_eq!(
        try_other_tunnel_end(map, start, &SearchLimits { max_steps: 10 }),
        Ok(map.tile_xy(10, 0))
    );
}

#[test]
#[should_panic(expected = "tunnel has no other end")]
fn unpaired_tunnel_panics() {
    let mut world = configured(8, 8);
    let commands = vec![rail_tunnel(&world, 4, 4, Direction::North)];
    run(&mut world, commands);
    let map = query::map(&world);
    let _ = other_tunnel_end(map, map.tile_xy(4, 4));
}

#[test]
#[should_panic(expected = "is not a tunnel entrance")]
fn searching_from_a_bridge_as_a_tunnel_panics() {
    let mut world = configured(8, 8);
    let commands = vec![bridge_ramp(&world, 1, 1, AxisDirection::East)];
    run(&mut world, commands);
    let map = query::map(&world);
    let _ = try_other_tunnel_end(map, map.tile_xy(1, 1), &SearchLimits::default());
}

#[test]
fn bridge_ramps_pair_and_skip_tunnels_underneath() {
    let mut world = configured(12, 4);
    let commands = vec![
        bridge_ramp(&world, 1, 2, AxisDirection::East),
        rail_tunnel(&world, 4, 2, Direction::West),
        bridge_ramp(&world, 8, 2, AxisDirection::West),
    ];
    run(&mut world, commands);
    let map = query::map(&world);

    assert_eq!(other_bridge_end(map, map.tile_xy(1, 2)), map.tile_xy(8, 2));
    assert_eq!(other_bridge_end(map, map.tile_xy(8, 2)), map.tile_xy(1, 2));
    assert_eq!(other_tunnel_bridge_end(map, map.tile_xy(8, 2)), map.tile_xy(1, 2));
}

#[test]
fn lone_bridge_ramp_reports_a_fault() {
    let mut world = configured(6, 6);
    let commands = vec![bridge_ramp(&world, 2, 2, AxisDirection::North)];
    run(&mut world, commands);
    let map = query::map(&world);
    let start = map.tile_xy(2, 2);

    assert_eq!(
        try_other_bridge_end(map, start, &SearchLimits::default()),
        Err(WormholeFault::LeftMap {
            start,
            direction: Direction::North,
            steps: 3,
        })
    );
}

#[test]
fn tunnel_pairs_lists_each_tunnel_once() {
    let world = ridge_with_tunnel();
    let map: &Map = query::map(&world);

    let pairs = tunnel_pairs(map, &SearchLimits::default()).expect("map is well formed");
    assert_eq!(pairs, vec![(map.tile_xy(5, 8), map.tile_xy(10, 8))]);
}

#[test]
fn tunnel_pairs_surfaces_corruption() {
    let mut world = ridge_with_tunnel();
    let commands = vec![rail_tunnel(&world, 0, 0, Direction::North)];
    run(&mut world, commands);
    let map = query::map(&world);

    assert!(matches!(
        tunnel_pairs(map, &SearchLimits::default()),
        Err(WormholeFault::LeftMap { .. })
    ));
}
