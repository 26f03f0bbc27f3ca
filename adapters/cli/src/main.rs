#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for inspecting tunnel and bridge layouts.

mod layout_transfer;

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use tunnelbridge_core::{Command, Direction, MapSize, Owner, RailType, TileIndex, TileType};
use tunnelbridge_system_wormhole::{
    is_tunnel_in_way, try_other_bridge_end, try_other_tunnel_end, SearchLimits,
};
use tunnelbridge_world::{self as world, is_tunnel, query, tunnel_bridge_state, Map, World};

use crate::layout_transfer::MapLayoutSnapshot;

#[derive(Parser)]
#[command(name = "tunnelbridge")]
#[command(about = "Inspect tunnel and bridge layouts")]
struct Cli {
    /// Raise log verbosity; repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the layout string of a small map with a tunnel through a ridge
    Demo,
    /// List every tunnel entrance and bridge ramp with its other end
    Inspect {
        /// Layout string produced by `demo` or a previous export
        layout: String,
        /// Largest number of tiles an endpoint search may visit
        #[arg(long, default_value_t = SearchLimits::default().max_steps)]
        max_steps: u32,
    },
    /// Report whether a tunnel passes under a tile at a height
    InWay {
        /// Layout string produced by `demo` or a previous export
        layout: String,
        /// Column of the tile to check
        #[arg(long)]
        x: u32,
        /// Row of the tile to check
        #[arg(long)]
        y: u32,
        /// Height to check at
        #[arg(long)]
        z: u8,
    },
}

/// Entry point for the tunnel and bridge command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Demo => demo(),
        Commands::Inspect { layout, max_steps } => inspect(&layout, SearchLimits { max_steps }),
        Commands::InWay { layout, x, y, z } => in_way(&layout, x, y, z),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load(layout: &str) -> Result<World> {
    let snapshot = MapLayoutSnapshot::decode(layout).context("failed to decode layout")?;
    info!(
        "loaded {}x{} layout with {} wormhole ends",
        snapshot.columns,
        snapshot.rows,
        snapshot.wormholes.len()
    );
    snapshot.to_world().context("failed to rebuild layout")
}

fn demo() -> Result<()> {
    let mut world = World::new();
    let size = MapSize::new(16, 16);
    let mut commands = vec![Command::ConfigureMap { size }];
    for y in 0..size.size_y {
        for x in 6..=10 {
            commands.push(Command::SetTileHeight {
                tile: TileIndex::new(y * size.size_x + x),
                height: 1,
            });
        }
    }
    for (x, direction) in [(5, Direction::East), (10, Direction::West)] {
        commands.push(Command::BuildRailTunnel {
            tile: TileIndex::new(8 * size.size_x + x),
            owner: Owner::new(0),
            direction,
            rail_type: RailType::new(0),
        });
    }

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        info!("{events:?}");
    }

    let snapshot = MapLayoutSnapshot::capture(query::map(&world));
    println!("{}", snapshot.encode().context("failed to encode demo layout")?);
    Ok(())
}

fn inspect(layout: &str, limits: SearchLimits) -> Result<()> {
    let world = load(layout)?;
    let map = query::map(&world);
    for index in 0..map.size().tile_count() {
        let tile = TileIndex::new(index as u32);
        if !map.is_tile_type(tile, TileType::TunnelBridge) {
            continue;
        }

        let end = if is_tunnel(map, tile) {
            try_other_tunnel_end(map, tile, &limits)
        } else {
            try_other_bridge_end(map, tile, &limits)
        };
        let end = match end {
            Ok(end) => describe(map, end),
            Err(fault) => format!("corrupt ({fault})"),
        };
        println!(
            "{} {:?} -> {end}",
            describe(map, tile),
            tunnel_bridge_state(map, tile)
        );
    }
    Ok(())
}

fn in_way(layout: &str, x: u32, y: u32, z: u8) -> Result<()> {
    let world = load(layout)?;
    let map = query::map(&world);
    ensure!(
        x <= map.max_x() && y <= map.max_y(),
        "tile ({x}, {y}) lies outside the {}x{} map",
        map.size().size_x,
        map.size().size_y
    );

    println!("{}", is_tunnel_in_way(map, map.tile_xy(x, y), z));
    Ok(())
}

fn describe(map: &Map, tile: TileIndex) -> String {
    format!(
        "({}, {}) z={}",
        map.tile_x(tile),
        map.tile_y(tile),
        map.tile_z(tile)
    )
}
