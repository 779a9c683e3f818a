//! Scene preprocessing binary: loads a voxel scene and builds its
//! distance fields, reporting what a renderer would upload.
//!
//! Usage: cargo run --release --bin vox_prepare -- --input <FILE> [OPTIONS]
//!
//! Options:
//!   --input <FILE>   Scene file to load (required)
//!   --slot <N>       Scene slot whose model gets a distance field
//!                    (default: first resolved slot, else model 0)
//!   --json           Print a machine-readable summary to stdout

use std::process::ExitCode;
use std::time::Instant;

use log::{error, info};
use serde::Serialize;

use voxmarch::core::error::VoxError;
use voxmarch::vox;
use voxmarch::voxel::{DistanceFieldBuilder, VoxelPack};

#[derive(Serialize)]
struct ModelSummary {
    index: usize,
    dims: [usize; 3],
    occupied: usize,
    total: usize,
}

#[derive(Serialize)]
struct FieldSummary {
    model: usize,
    dim: usize,
    slabs: usize,
    max_distance: u8,
    build_ms: u128,
}

#[derive(Serialize)]
struct PrepareSummary {
    models: Vec<ModelSummary>,
    slots: Vec<Option<usize>>,
    field: Option<FieldSummary>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(input) = parse_str_arg(&args, "--input") else {
        eprintln!("usage: vox_prepare --input <FILE> [--slot <N>] [--json]");
        return ExitCode::FAILURE;
    };
    let slot = parse_usize_arg(&args, "--slot");
    let emit_json = args.iter().any(|a| a == "--json");

    match run(&input, slot, emit_json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(input: &str, slot: Option<usize>, emit_json: bool) -> Result<(), VoxError> {
    let pack = vox::load_file(input)?;

    for (index, model) in pack.models.iter().enumerate() {
        info!(
            "model {}: {}x{}x{}, {} of {} voxels occupied",
            index,
            model.x_dim(),
            model.y_dim(),
            model.z_dim(),
            model.occupied_count(),
            model.voxel_count()
        );
    }

    let field = match pick_model(&pack, slot) {
        Some(index) => {
            let model = &pack.models[index];
            let builder = DistanceFieldBuilder::new(model)?;
            let start = Instant::now();
            let field = builder.build()?;
            let elapsed = start.elapsed();
            let max_distance = field.iter().map(|v| v.distance).max().unwrap_or(0);
            info!(
                "distance field for model {}: {} slab(s) of {}^3 in {:.1?}, max radius {}",
                index,
                builder.num_slabs(),
                builder.dim(),
                elapsed,
                max_distance
            );
            Some(FieldSummary {
                model: index,
                dim: builder.dim(),
                slabs: builder.num_slabs(),
                max_distance,
                build_ms: elapsed.as_millis(),
            })
        }
        None => {
            info!("no model to preprocess");
            None
        }
    };

    if emit_json {
        let summary = PrepareSummary {
            models: pack
                .models
                .iter()
                .enumerate()
                .map(|(index, m)| ModelSummary {
                    index,
                    dims: [m.x_dim(), m.y_dim(), m.z_dim()],
                    occupied: m.occupied_count(),
                    total: m.voxel_count(),
                })
                .collect(),
            slots: pack.ordered_models.clone(),
            field,
        };
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        println!("{}", text);
    }

    Ok(())
}

/// Requested slot's model, else the first resolved slot, else model 0.
fn pick_model(pack: &VoxelPack, slot: Option<usize>) -> Option<usize> {
    if let Some(slot) = slot {
        return pack.ordered_models.get(slot).copied().flatten();
    }
    pack.ordered_models
        .iter()
        .find_map(|s| *s)
        .or(if pack.models.is_empty() { None } else { Some(0) })
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.clone())
}
