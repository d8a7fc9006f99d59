use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use concertina_wm::actor::orchestrator::{
    AutoTilingOrchestrator, MonitorSnapshot, OrchestratorHandle, TileResult,
};
use concertina_wm::common::config::Config;
use concertina_wm::layout_engine::{CycleDirection, Direction};
use concertina_wm::model::layout::LayoutId;
use concertina_wm::model::persist::NullStore;
use concertina_wm::sys::geometry::Rect;
use concertina_wm::sys::screen::MonitorInfo;
use concertina_wm::sys::simulation::SimulatedWindowServer;
use concertina_wm::sys::window_server::{WindowInfo, WindowServerEvent, WindowSource};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "concertina", about = "Accordion tiling core, driven headlessly")]
struct Cli {
    /// TOML config file; built-in defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Replay a recorded event script against the simulated window server
    /// and report the resulting tiling as JSON.
    Replay { script: PathBuf },

    /// Print the container rectangles every built-in layout produces.
    Layouts {
        #[arg(long, default_value_t = 1920.0)]
        width: f64,
        #[arg(long, default_value_t = 1080.0)]
        height: f64,
    },
}

/// A recorded session: the world to build, then the steps to drive.
#[derive(Debug, Deserialize)]
struct ReplayScript {
    monitors: Vec<MonitorInfo>,
    #[serde(default)]
    windows: Vec<WindowInfo>,
    #[serde(default)]
    steps: Vec<ReplayStep>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ReplayStep {
    Event(WindowServerEvent),
    SwitchLayout { layout: LayoutId },
    CycleWindow { direction: CycleDirection },
    MoveWindow { direction: Direction },
    FocusContainer { direction: Direction },
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    result: Option<TileResult>,
    monitors: Vec<MonitorSnapshot>,
    windows: Vec<WindowInfo>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        CliCommand::Replay { script } => replay(&config, &script).await,
        CliCommand::Layouts { width, height } => {
            print_layouts(&config, width, height);
            Ok(())
        }
    }
}

async fn replay(config: &Config, path: &PathBuf) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    let script: ReplayScript =
        serde_json::from_str(&contents).context("failed to parse replay script")?;

    let sim = SimulatedWindowServer::new(script.monitors);
    for window in script.windows {
        sim.open_window(window);
    }

    let handle = AutoTilingOrchestrator::spawn(
        config.settings.clone(),
        Arc::new(sim.clone()),
        Arc::new(sim.clone()),
        Arc::new(sim.clone()),
        Arc::new(NullStore),
    );
    handle.start();
    handle.snapshot().await;

    // Enough quiet time after each step for the debounce to fire.
    let settle = config.settings.debounce_delay() * 2 + Duration::from_millis(20);
    for step in script.steps {
        drive(&handle, &sim, step);
        tokio::time::sleep(settle).await;
    }

    let report = ReplayReport {
        result: handle.last_result().await,
        monitors: handle.snapshot().await,
        windows: sim.visible_windows(),
    };
    handle.shutdown();
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn drive(handle: &OrchestratorHandle, sim: &SimulatedWindowServer, step: ReplayStep) {
    match step {
        ReplayStep::Event(event) => {
            sim.apply(&event);
            handle.notify_window_event(event);
        }
        ReplayStep::SwitchLayout { layout } => handle.switch_layout(layout, None),
        ReplayStep::CycleWindow { direction } => handle.cycle_window(direction),
        ReplayStep::MoveWindow { direction } => handle.move_window_to_container(direction),
        ReplayStep::FocusContainer { direction } => handle.focus_container(direction),
    }
}

fn print_layouts(config: &Config, width: f64, height: f64) {
    let frame = Rect::new(0.0, 0.0, width, height);
    let settings = &config.settings;
    for (index, layout) in LayoutId::iter().filter(|l| *l != LayoutId::Dynamic).enumerate() {
        println!("{}. {layout}", index + 1);
        let Some(frames) = layout.container_frames(frame, settings.margin, settings.padding)
        else {
            continue;
        };
        for rect in frames {
            println!(
                "   {:7.1} x {:6.1} at ({:7.1}, {:6.1})",
                rect.size.width, rect.size.height, rect.origin.x, rect.origin.y
            );
        }
    }
}
