use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use chrono::Local;
use clap::Parser;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod browser;
mod cards;
mod carousel;
mod controller;
mod domain;
mod entities;
mod formatter;
mod inputter;
mod mock;
mod model;
mod pages;
mod record;
mod session;
mod source;
mod store;
mod ui;

use controller::Controller;
use domain::{DashConfig, DashError, LayoutMode};
use mock::MockData;
use model::{DashData, Model, Status};
use ui::DashUI;

/// Sales development dashboard for the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// CSV, Parquet or Arrow IPC file shown on an extra page
    #[arg(short, long)]
    import: Option<String>,

    /// Render pages as tables, cards, or pick by terminal width
    #[arg(long, value_enum, default_value_t = LayoutMode::Auto)]
    layout: LayoutMode,

    #[arg(long, default_value = "~/.sdrdash.log")]
    log_file: String,

    /// Used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Event poll time in ms
    #[arg(long, default_value_t = 50)]
    poll: u64,

    /// Seed for the generated sample data
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Prefill the login form
    #[arg(long)]
    email: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_tracing(&args.log_file, &args.log_level) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Err(e) => {
            error!("Exiting with error: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_tracing(log_file: &str, log_level: &str) -> Result<(), DashError> {
    let path = shellexpand::full(log_file)
        .map_err(|e| DashError::Logging(format!("Cannot expand {log_file}: {e}")))?;
    let file = File::create(&*path)?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| DashError::Logging(e.to_string()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| DashError::Logging(e.to_string()))
}

fn load_data(args: &Args, seed: u64) -> Result<DashData, DashError> {
    let mut mock = MockData::new(Local::now(), seed);
    let imported = match &args.import {
        Some(path) => Some(source::import(path)?),
        None => None,
    };
    Ok(DashData {
        pocs: mock.pocs(),
        crm: mock.crm_entries(),
        meetings: mock.meetings(),
        leads: mock.leads(),
        imported,
    })
}

fn run(args: Args) -> Result<(), DashError> {
    info!("Starting sdrdash");
    let cfg = DashConfig::default()
        .with_event_poll_time(args.poll)
        .with_layout(args.layout)
        .with_seed(args.seed);

    // Load before touching the terminal so errors print normally
    let data = load_data(&args, cfg.seed)?;

    let mut terminal = ratatui::init();
    let result = (|| -> Result<(), DashError> {
        execute!(std::io::stdout(), EnableMouseCapture)?;
        let size = terminal.size()?;
        let mut model = Model::init(&cfg, data, size.width as usize, size.height as usize);
        if let Some(email) = &args.email {
            model.prefill_login(email);
        }
        let mut ui = DashUI::new();
        let controller = Controller::new(&cfg);

        while model.status != Status::QUITTING {
            // Render the current view
            terminal.draw(|f| ui.draw(&model, f))?;

            // Handle events and map to a Message
            let message = controller.handle_event(&model)?;
            model.update(message);
            model.tick(Instant::now());
        }
        Ok(())
    })();

    // Restore the terminal on both paths
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
    info!("Stopped sdrdash");
    result
}
