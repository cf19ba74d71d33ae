use std::{fs::File, path::PathBuf};

use anyhow::{bail, Context, Result};
use bih_collision::{BenchConfig, BenchExecutor, BenchReport, Stats, StatsNodeTrait};
use clap::Parser;
use log::{error, info, LevelFilter};
use options::Options;

mod options;

/// Initializes the program logging
///
/// # Arguments
/// * `filter` - The log level filter, i.e., the minimum log level to be logged.
fn initialize_logging(filter: LevelFilter) {
    let mut builder = pretty_env_logger::formatted_timed_builder();

    builder.filter_level(filter).init();
}

/// Prints the benchmark report.
///
/// # Arguments
/// * `report` - The report to print.
fn print_report(report: &BenchReport) {
    info!("Benchmark report:");
    for mesh in report.meshes.iter() {
        info!("  - {}:", mesh.name);
        info!("      Triangles: {}", mesh.num_triangles);
        info!("      Nodes: {} (depth {})", mesh.num_nodes, mesh.depth);
        info!("      Ray hits: {}", mesh.ray_hits);
        info!("      Sweep contacts: {}", mesh.sweep_contacts);
        info!("      Visited nodes: {}", mesh.query_stats.nodes_visited);
        info!("      Triangle tests: {}", mesh.query_stats.triangle_tests);
        info!("      Mismatches: {}", mesh.mismatches);
    }
}

/// Runs the program.
///
/// # Arguments
/// * `options` - The program options.
fn run_program(options: Options) -> Result<()> {
    let s = Stats::root();

    let config = {
        let _t = s.get_child("config").register_timing();
        let file = File::open(&options.config)
            .with_context(|| format!("Failed to open config '{}'", options.config))?;
        BenchConfig::read(file)?
    };

    let executor = BenchExecutor::new(config, PathBuf::from(&options.out_dir));
    let report = executor.run(s.get_child("bench"))?;

    print_report(&report);

    let mismatches = report.num_mismatches();
    if mismatches > 0 {
        bail!("{} queries differ from the naive collider", mismatches);
    }

    Ok(())
}

fn main() {
    let options = Options::parse();
    initialize_logging(options.log_level.into());
    options.dump_to_log();

    match run_program(options) {
        Ok(_) => {
            info!("Stat:");
            info!("{}", Stats::root().report());
            info!("Program completed successfully");
        }
        Err(err) => {
            error!("Program failed: {:?}", err);
            std::process::exit(1);
        }
    }
}
