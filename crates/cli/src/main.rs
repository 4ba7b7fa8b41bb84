//! Tickbridge demo binary.
//!
//! Drives the compatibility scheduler against either simulated host and
//! reports where work actually ran.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tickbridge_core::{Affinity, Coordinate, EntityId, RuntimeVariant, Ticks, WorldId};
use tickbridge_host::detect;
use tickbridge_sched::Scheduler;
use tickbridge_sim::{SimAuthorityHost, SimPartitionedHost};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "tickbridge")]
#[command(about = "Compatibility scheduler demo", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Variant {
    /// Single-authority host
    Classic,
    /// Spatially-partitioned host
    Partitioned,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a mixed workload and report dispatch placement
    Demo {
        /// Host variant to simulate
        #[arg(long, value_enum, default_value = "partitioned")]
        variant: Variant,
        /// Region threads for the partitioned host
        #[arg(long, default_value = "4")]
        regions: usize,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show what capability detection resolves for each simulated host
    Detect,
}

#[derive(Serialize)]
struct DemoReport {
    variant: RuntimeVariant,
    global_runs: u32,
    spatial_runs: u32,
    entity_runs: u32,
    background_runs: u32,
    repeating_runs: u32,
    distinct_threads: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            variant,
            regions,
            json,
        } => {
            let report = match variant {
                Variant::Classic => {
                    let host = SimAuthorityHost::with_tick(Duration::from_millis(10));
                    let scheduler = Scheduler::new(Arc::new(host.clone()));
                    let report = run_demo(&scheduler, None)?;
                    host.shutdown();
                    report
                }
                Variant::Partitioned => {
                    let host = SimPartitionedHost::with_tick(regions, Duration::from_millis(10));
                    let scheduler = Scheduler::new(Arc::new(host.clone()));
                    let report = run_demo(&scheduler, Some(&host))?;
                    host.shutdown();
                    report
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("variant:            {}", report.variant);
                println!("global runs:        {}", report.global_runs);
                println!("spatial runs:       {}", report.spatial_runs);
                println!("entity runs:        {}", report.entity_runs);
                println!("background runs:    {}", report.background_runs);
                println!("repeating runs:     {}", report.repeating_runs);
                println!("distinct threads:   {}", report.distinct_threads);
            }
        }
        Commands::Detect => {
            let classic = SimAuthorityHost::with_tick(Duration::from_millis(10));
            let partitioned = SimPartitionedHost::with_tick(2, Duration::from_millis(10));
            println!("classic host      -> {}", detect(&classic));
            println!("partitioned host  -> {}", detect(&partitioned));
            classic.shutdown();
            partitioned.shutdown();
        }
    }

    Ok(())
}

fn run_demo(scheduler: &Scheduler, partitioned: Option<&SimPartitionedHost>) -> Result<DemoReport> {
    let world = WorldId::new(1);
    let coordinate = Coordinate::new(world, 100, 64, -200);
    let entity = EntityId::new(42);

    if let Some(host) = partitioned {
        host.load_world(world);
        host.spawn_entity(entity, 0);
    }

    let threads = Arc::new(Mutex::new(HashSet::new()));
    let counter = |counts: &Arc<AtomicU32>| {
        let counts = Arc::clone(counts);
        let threads = Arc::clone(&threads);
        move || {
            counts.fetch_add(1, Ordering::SeqCst);
            threads.lock().unwrap().insert(thread::current().id());
        }
    };

    let global_runs = Arc::new(AtomicU32::new(0));
    let spatial_runs = Arc::new(AtomicU32::new(0));
    let entity_runs = Arc::new(AtomicU32::new(0));
    let background_runs = Arc::new(AtomicU32::new(0));
    let repeating_runs = Arc::new(AtomicU32::new(0));

    scheduler.schedule_now(Affinity::None, counter(&global_runs));
    scheduler.schedule_delayed(Affinity::None, counter(&global_runs), Ticks(2));
    scheduler.schedule_now(Affinity::At(coordinate), counter(&spatial_runs));
    scheduler.schedule_now(Affinity::For(entity), counter(&entity_runs));
    scheduler.schedule_background(counter(&background_runs));

    let repeating = scheduler.schedule_repeating(
        Affinity::None,
        counter(&repeating_runs),
        Ticks::ZERO,
        Ticks(2),
    )?;

    thread::sleep(Duration::from_millis(200));
    repeating.cancel();
    thread::sleep(Duration::from_millis(50));

    info!("demo workload complete");

    let distinct_threads = threads.lock().unwrap().len();

    Ok(DemoReport {
        variant: scheduler.variant(),
        global_runs: global_runs.load(Ordering::SeqCst),
        spatial_runs: spatial_runs.load(Ordering::SeqCst),
        entity_runs: entity_runs.load(Ordering::SeqCst),
        background_runs: background_runs.load(Ordering::SeqCst),
        repeating_runs: repeating_runs.load(Ordering::SeqCst),
        distinct_threads,
    })
}
