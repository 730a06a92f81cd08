use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use lumina_core::{Config, Credential};
use tracing_subscriber::EnvFilter;

mod app;
mod capture;
mod handler;
mod highlight;
mod input;
mod tui;
mod ui;
mod widget;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "lumina")]
#[command(version, about = "Beautiful code frames in the terminal, with Gemini-powered actions")]
struct Cli {
    /// Path to a config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gemini model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Directory that exported images are written to
    #[arg(short, long)]
    export_dir: Option<PathBuf>,

    /// TrueType font used for the export watermark
    #[arg(long)]
    font: Option<PathBuf>,
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging() -> Result<()> {
    let dir = dirs::cache_dir()
        .context("Could not determine cache directory")?
        .join("lumina");
    fs::create_dir_all(&dir)?;
    let file = File::create(dir.join("lumina.log"))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_env("LUMINA_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    Ok(())
}

fn load_config(cli: &Cli, path: &Path) -> Result<Config> {
    let mut config = Config::load_from(path)?;

    if let Some(model) = &cli.model {
        config.model = Some(model.clone());
    }
    if let Some(dir) = &cli.export_dir {
        config.export_dir = Some(dir.clone());
    }
    if let Some(font) = &cli.font {
        config.font_path = Some(font.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_logging() {
        eprintln!("Logging disabled: {e}");
    }

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::get_config_path()?,
    };
    let config = load_config(&cli, &config_path)?;
    let credential = Credential::from_env();
    tracing::info!(model = %config.assistant_settings().model, has_key = credential.is_present(), "starting lumina");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let mut app = App::new(&config, credential, events.sender());
    app.config_path = Some(config_path);

    let result = run(&mut terminal, &mut app, &mut events).await;

    app.cancel_requests();
    if let Some(task) = app.export_task.take() {
        task.abort();
    }
    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}
