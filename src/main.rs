use crate::analysis::summary::{summarize_database, summarize_nodes};
use crate::analysis::trend::success_ratio;
use crate::cli::Cli;
use crate::error::AppError;
use crate::simulation::control::Controller;
use crate::simulation::random::{RandomSource, RngSource};
use crate::tui::app::App;
use crate::tui::draw::draw_app;
use crate::tui::input::map_key;
use clap::Parser;
use crossterm::event::{Event, KeyEventKind};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::info;

mod analysis;
mod cli;
mod error;
mod geometry;
mod simulation;
mod state;
mod topology;
mod tui;

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = cli.sim_config()?;
    let flow = cli.flow_rate()?;
    let fps = cli.frame_rate()?;
    let controller = Controller::new(cli.topology, flow, config, random_source(cli.seed));
    info!(topology = %cli.topology, flow = flow.probability(), seed = ?cli.seed, "starting");

    if cli.headless {
        run_headless(controller, cli.ticks);
        return Ok(());
    }
    run_tui(controller, fps)
}

fn init_logging(cli: &Cli) -> Result<(), AppError> {
    match &cli.log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| AppError::LogFile {
                path: path.clone(),
                source,
            })?;
            tracing_subscriber::fmt()
                .with_max_level(cli.log_level)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(AppError::Logging)?;
        }
        // stdout belongs to the terminal UI
        None if cli.headless => {
            tracing_subscriber::fmt()
                .with_max_level(cli.log_level)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(AppError::Logging)?;
        }
        None => {}
    }
    Ok(())
}

fn random_source(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(RngSource::new(StdRng::seed_from_u64(seed))),
        None => Box::new(RngSource::new(rand::thread_rng())),
    }
}

fn run_tui(controller: Controller, fps: u32) -> Result<(), AppError> {
    let mut terminal = ratatui::init();
    let mut app = App::new(controller);
    let frame = Duration::from_secs_f64(1.0 / fps as f64);
    let mut last_tick = Instant::now();

    while app.running {
        terminal.draw(|f| draw_app(f, &app))?;

        let timeout = frame.saturating_sub(last_tick.elapsed());
        if crossterm::event::poll(timeout)? {
            match crossterm::event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = map_key(key.code) {
                        app.handle(action);
                    }
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= frame {
            app.tick();
            last_tick = Instant::now();
        }
    }
    Ok(())
}

fn run_headless(mut controller: Controller, ticks: u64) {
    let mut successes = 0;
    let mut failures = 0;
    for _ in 0..ticks {
        let report = controller.tick();
        successes += report.successes;
        failures += report.failures;
    }

    let sim = controller.simulation();
    println!(
        "{} after {} ticks at flow {}%",
        sim.kind(),
        sim.tick(),
        controller.flow().percent()
    );
    println!("completed: {}  failed: {}", successes, failures);
    for node in summarize_nodes(sim) {
        let limit = node
            .limit()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<10} {:<8} load {:>4}/{}",
            node.name(),
            if node.is_alive() { "ACTIVE" } else { "CRASHED" },
            node.load(),
            limit
        );
    }
    let db = summarize_database(sim);
    println!(
        "  {:<10} {:<8} queue {:>3}/{}",
        "database",
        if db.overloaded { "OVERLOAD" } else { "OK" },
        db.queued,
        db.capacity
    );
    let metrics = sim.metrics();
    if let Some(ratio) = success_ratio(metrics.successes(), metrics.failures()) {
        println!("success ratio (last {} ticks): {:.0}%", metrics.len(), ratio * 100.0);
    }
}
