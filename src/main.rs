use vqsim::{Scenario, ScenarioConfig};
use vqsim::{bench_index, bench_update, bench_update_curve};

use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Headless Verlet particle simulation with a quadtree broad phase")]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "default.yaml")]
    file_name: String,

    /// Override the number of frames to simulate
    #[arg(long)]
    frames: Option<u64>,

    /// Run the benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    log::debug!("{:?}", scenario_cfg);

    Ok(scenario_cfg)
}

fn run(mut scenario: Scenario, frames: u64) {
    let dt = scenario.frame_dt();
    let report_every = u64::from(scenario.run.fps);

    let mut physics_ms = 0.0;
    let mut contacts = 0;
    for frame in 1..=frames {
        scenario.spawner.spawn(&mut scenario.solver);
        scenario.solver.update(dt);

        let stats = scenario.solver.stats();
        physics_ms += stats.elapsed_ms;
        contacts += stats.contacts;

        if frame % report_every == 0 {
            log::info!(
                "t = {:5.1} s | {} sub-steps | {} particles | physics {:.2} ms/frame | {} contacts/frame | {} nodes | largest leaf {}",
                frame as f32 * dt,
                stats.sub_steps,
                scenario.solver.len(),
                physics_ms / report_every as f64,
                contacts / report_every as usize,
                stats.nodes,
                stats.max_bucket
            );
            physics_ms = 0.0;
            contacts = 0;
        }
    }

    log::info!(
        "done: {} frames, {} particles, spawner {}",
        frames,
        scenario.solver.len(),
        if scenario.spawner.is_done(&scenario.solver) { "full" } else { "still filling" }
    );
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        bench_index();
        bench_update();
        bench_update_curve();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg).context("invalid scenario")?;
    let frames = args.frames.unwrap_or(scenario.run.frames);

    run(scenario, frames);

    Ok(())
}
