// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: topology analysis of labeled skeleton rasters.
//!
//! Reads a raster as JSON (`{"shape": [..], "data": [..]}`), analyzes every
//! labeled skeleton and writes the summary table as JSON. Logs go to stderr.
//!
//! Usage:
//!   toska <input.json> [options]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use toska_core::{label_branches, label_components, parse_all_skeletons, Connectivity, Raster};
use toska_processing::{analyze_skeleton_network, analyze_skeletons, AnalysisConfig};
use tracing_subscriber::EnvFilter;

/// Parsed command line.
#[derive(Debug, Default)]
struct Options {
    input: PathBuf,
    connectivity: Option<Connectivity>,
    cycle_limit: Option<u64>,
    threads: Option<usize>,
    binary: bool,
    network: Option<u32>,
    parsed: Option<PathBuf>,
    branches: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return Ok(());
    }
    let options = parse_args(&args[1..])?;

    let mut config = AnalysisConfig::from_env();
    if let Some(connectivity) = options.connectivity {
        config.connectivity = Some(connectivity);
    }
    if let Some(limit) = options.cycle_limit {
        config.cycle_limit = Some(limit);
    }
    if let Some(threads) = options.threads {
        config.worker_threads = threads;
    }

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
        .context("Failed to configure worker threads")?;

    let raster = read_raster(&options.input)?;
    tracing::info!(
        input = %options.input.display(),
        shape = ?raster.shape(),
        threads = config.worker_threads,
        "Loaded raster"
    );
    let connectivity = config.connectivity_for(raster.ndim())?;

    let labeled = if options.binary {
        let mask = raster.map(|&v| v != 0);
        let (labeled, count) =
            label_components(&mask, &connectivity.kernel().structuring_element())?;
        tracing::info!(objects = count, %connectivity, "Labeled binary skeleton");
        labeled
    } else {
        raster
    };

    if options.parsed.is_some() || options.branches.is_some() {
        let parsed = parse_all_skeletons(&labeled, connectivity)?;
        if let Some(path) = &options.branches {
            let branches = label_branches(&parsed, &labeled, connectivity)?;
            write_json(path, &serde_json::to_string(&branches)?)?;
        }
        if let Some(path) = &options.parsed {
            write_json(path, &serde_json::to_string(&parsed)?)?;
        }
    }

    let json = match options.network {
        Some(label) => {
            let rows = analyze_skeleton_network(&labeled, label, &config)
                .with_context(|| format!("Failed to analyze skeleton {label}"))?;
            serde_json::to_string_pretty(&rows)?
        }
        None => {
            let report = analyze_skeletons(&labeled, &config);
            if !report.is_complete() {
                tracing::warn!(failed = report.failures.len(), "Some skeletons could not be analyzed");
            }
            report.to_json()?
        }
    };

    match &options.output {
        Some(path) => write_json(path, &json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        input: PathBuf::from(&args[0]),
        ..Options::default()
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--connectivity" => {
                options.connectivity = Some(value(args, &mut i)?.parse()?);
            }
            "--cycle-limit" => {
                options.cycle_limit = Some(value(args, &mut i)?.parse().context("Invalid cycle limit")?);
            }
            "--threads" => {
                options.threads = Some(value(args, &mut i)?.parse().context("Invalid thread count")?);
            }
            "--binary" => {
                options.binary = true;
            }
            "--network" => {
                options.network = Some(value(args, &mut i)?.parse().context("Invalid label")?);
            }
            "--parsed" => {
                options.parsed = Some(PathBuf::from(value(args, &mut i)?));
            }
            "--branches" => {
                options.branches = Some(PathBuf::from(value(args, &mut i)?));
            }
            "--output" => {
                options.output = Some(PathBuf::from(value(args, &mut i)?));
            }
            other => {
                print_usage();
                bail!("Unknown option: {other}");
            }
        }
        i += 1;
    }
    Ok(options)
}

/// Consumes the value following the option at `i`.
fn value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str> {
    let option = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .with_context(|| format!("Missing value for {option}"))
}

fn read_raster(path: &Path) -> Result<Raster<u32>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Cannot parse raster '{}'", path.display()))
}

fn write_json(path: &Path, json: &str) -> Result<()> {
    fs::write(path, json).with_context(|| format!("Cannot write '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "Wrote output");
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: toska <input.json> [options]");
    eprintln!();
    eprintln!("Input: JSON raster {{\"shape\": [rows, cols] or [planes, rows, cols], \"data\": [...]}}");
    eprintln!("       holding labeled skeletons (0 = background).");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --connectivity <n4|n8|n6|n18|n26>  Neighborhood (default: n8 in 2D, n26 in 3D)");
    eprintln!("  --binary                           Label the input's foreground into objects first");
    eprintln!("  --network <LABEL>                  Print the node/edge table of one skeleton");
    eprintln!("  --parsed <PATH>                    Write the endpoint/chain/branch raster");
    eprintln!("  --branches <PATH>                  Write the branch label raster");
    eprintln!("  --cycle-limit <N>                  Cap cycle enumeration per skeleton");
    eprintln!("  --threads <N>                      Worker threads (default: number of CPUs)");
    eprintln!("  --output <PATH>                    Write results to PATH instead of stdout");
    eprintln!();
    eprintln!("Environment: TOSKA_CONNECTIVITY, TOSKA_WORKER_THREADS, TOSKA_CYCLE_LIMIT, RUST_LOG");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_all_options() {
        let options = parse_args(&args(&[
            "in.json",
            "--connectivity",
            "n4",
            "--binary",
            "--network",
            "3",
            "--parsed",
            "p.json",
            "--cycle-limit",
            "50",
            "--output",
            "out.json",
        ]))
        .unwrap();
        assert_eq!(options.input, PathBuf::from("in.json"));
        assert_eq!(options.connectivity, Some(Connectivity::N4));
        assert!(options.binary);
        assert_eq!(options.network, Some(3));
        assert_eq!(options.parsed, Some(PathBuf::from("p.json")));
        assert_eq!(options.cycle_limit, Some(50));
        assert_eq!(options.output, Some(PathBuf::from("out.json")));
        assert_eq!(options.branches, None);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&args(&["in.json", "--connectivity", "n5"])).is_err());
        assert!(parse_args(&args(&["in.json", "--network"])).is_err());
        assert!(parse_args(&args(&["in.json", "--frobnicate"])).is_err());
    }
}
