//! Pack and plan command implementations

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::atlas::{DynamicAtlas, RefreshOutcome, RefreshReport};
use crate::bitmap::open_resolver;
use crate::config::{load_config, merge_cli_overrides, CliOverrides, ConfigError};
use crate::output::write_atlas;
use crate::world::Scene;

/// Run the pack command
pub fn run_pack(
    scene_path: &Path,
    config_path: Option<&Path>,
    gfx: Option<PathBuf>,
    packed: bool,
    out: Option<PathBuf>,
    page_size: Option<u32>,
) -> ExitCode {
    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let overrides = CliOverrides { page_size, gfx_root: gfx, packed: packed.then_some(true), out };
    if let Err(e) = merge_cli_overrides(&mut config, &overrides) {
        eprintln!("Error: {}", e);
        let code = if matches!(e, ConfigError::Validation(_)) { EXIT_INVALID_ARGS } else { EXIT_ERROR };
        return ExitCode::from(code);
    }

    let scene = match Scene::load(scene_path) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error: {}: {}", scene_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let resolver = match open_resolver(&config.gfx) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("Error opening {}: {}", config.gfx.root.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut atlas = DynamicAtlas::from_config(&config.atlas);
    let report = match atlas.refresh(&scene, &scene, resolver.as_ref()) {
        RefreshOutcome::Completed(report) => report,
        // A fresh atlas has nothing in flight and is never reset mid-refresh
        other => {
            eprintln!("Error: refresh did not complete ({:?})", other);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    print_report(&report);

    match write_atlas(&atlas, &config.output.dir) {
        Ok(paths) => {
            for path in paths {
                println!("Saved: {}", path.display());
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error writing {}: {}", config.output.dir.display(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn print_report(report: &RefreshReport) {
    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }
    println!(
        "Requested {} bitmaps ({} failed), composed {} characters, placed {} frames ({} blank, {} deferred)",
        report.requested,
        report.failed_loads,
        report.characters_composed,
        report.frames_placed,
        report.blank_frames,
        report.deferred_frames,
    );
}

/// Run the plan command
pub fn run_plan(scene_path: &Path, json: bool) -> ExitCode {
    let scene = match Scene::load(scene_path) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error: {}: {}", scene_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut atlas = DynamicAtlas::default();
    let Some(plan) = atlas.plan_refresh(&scene, &scene) else {
        eprintln!("Error: refresh already in flight");
        return ExitCode::from(EXIT_ERROR);
    };

    for warning in plan.warnings() {
        eprintln!("Warning: {}", warning);
    }

    if json {
        match serde_json::to_string_pretty(plan.requests()) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        for key in plan.requests() {
            println!("{}  {}", key, key.relative_path());
        }
        println!("{} bitmaps", plan.requests().len());
    }

    ExitCode::from(EXIT_SUCCESS)
}
