//! CLI tool for gridview - lays out a dataset and prints the drawn scene
//!
//! Usage:
//!   gridview_cli <dataset.json>                          # Scene JSON to stdout
//!   gridview_cli <dataset.json> --config cfg.json        # With a config file
//!   gridview_cli <dataset.json> --width 1280 --height 720 --scroll-y 3000
//!
//! Set `RUST_LOG=gridview=debug` to see scroll, pool and flush logging.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use gridview::render::{ManualFrameHost, RecordingBackend};
use gridview::{Dataset, Grid, GridConfig};
use tracing_subscriber::EnvFilter;

struct Args {
    dataset_path: String,
    config_path: Option<String>,
    width: f32,
    height: f32,
    scroll_x: f32,
    scroll_y: f32,
}

fn usage() -> ! {
    eprintln!(
        "Usage: gridview_cli <dataset.json> [--config cfg.json] [--width W] [--height H] \
         [--scroll-x X] [--scroll-y Y]"
    );
    std::process::exit(1);
}

fn parse_number(flag: &str, value: Option<&String>) -> f32 {
    match value.map(|v| v.parse::<f32>()) {
        Some(Ok(n)) if n.is_finite() => n,
        _ => {
            eprintln!("{flag} expects a number");
            usage();
        }
    }
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }
    let mut parsed = Args {
        dataset_path: args[1].clone(),
        config_path: None,
        width: 1280.0,
        height: 720.0,
        scroll_x: 0.0,
        scroll_y: 0.0,
    };
    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args.get(i + 1);
        match flag {
            "--config" => {
                parsed.config_path = Some(value.cloned().unwrap_or_else(|| usage()));
            }
            "--width" => parsed.width = parse_number(flag, value),
            "--height" => parsed.height = parse_number(flag, value),
            "--scroll-x" => parsed.scroll_x = parse_number(flag, value),
            "--scroll-y" => parsed.scroll_y = parse_number(flag, value),
            other => {
                eprintln!("Unknown argument: {other}");
                usage();
            }
        }
        i += 2;
    }
    parsed
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gridview=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = parse_args();

    // Read input files
    let json = match fs::read_to_string(&args.dataset_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", args.dataset_path, e);
            std::process::exit(1);
        }
    };
    let dataset = match Dataset::from_json(&json) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error decoding dataset: {}", e);
            std::process::exit(1);
        }
    };
    let config = match &args.config_path {
        Some(path) => {
            let text = match fs::read_to_string(path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error reading {}: {}", path, e);
                    std::process::exit(1);
                }
            };
            match GridConfig::from_json(&text) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error in config: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => GridConfig::default(),
    };

    let mut grid = match Grid::new(dataset, config, args.width, args.height, ManualFrameHost::new()) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error building grid: {}", e);
            std::process::exit(1);
        }
    };
    grid.set_scroll(args.scroll_x, args.scroll_y).unwrap();

    // Flush the one batched frame
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut backend = RecordingBackend::new(args.width.max(0.0) as u32, args.height.max(0.0) as u32);
    if let Some(token) = grid.host_mut().fire() {
        let painted = grid.on_frame(token, 0.0, &mut backend).unwrap();
        tracing::info!(painted, shapes = grid.pipeline().shape_count(), "frame flushed");
    }

    // Serialize to JSON
    let scene = match serde_json::to_string_pretty(&grid.scene_snapshot()) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };
    io::stdout().write_all(scene.as_bytes()).unwrap();
    println!();
}
