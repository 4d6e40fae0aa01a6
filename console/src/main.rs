use anyhow::Context;
use app::Console;
use clap::Parser;
use config::ConsoleConfig;
use iced::Theme;
use linebotcore::api::{HttpBackend, StreamName};
use log::info;
use std::path::PathBuf;

mod app;
mod canvas;
mod config;
mod panels;

#[derive(Parser)]
#[command(author, version, about = "Operator console for the line-follower robot")]
struct Args {
    /// Load the console config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the robot service base URL
    #[arg(long)]
    backend: Option<String>,
    /// Override the stream shown at startup
    #[arg(long)]
    stream: Option<StreamName>,
    /// Show the LQR steering panel
    #[arg(long, default_value_t = false)]
    lqr_panel: bool,
}

fn application_title(_: &Console) -> String {
    "Line Follower Console".into()
}

fn application_theme(_: &Console) -> Theme {
    Theme::Dark
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };
    if let Some(url) = args.backend {
        config.backend_url = url;
    }
    if let Some(stream) = args.stream {
        config.default_stream = stream;
    }
    config.features.lqr_panel |= args.lqr_panel;
    config.validate().context("validating console options")?;

    let backend = HttpBackend::with_timeout(config.backend_url.clone(), config.request_timeout())
        .context("building HTTP client")?;
    info!(
        "console talking to {} (debounce {} ms, poll {} ms)",
        backend.base_url(),
        config.timing.debounce_ms,
        config.timing.poll_interval_ms
    );

    iced::application(
        move || Console::boot(config.clone(), backend.clone()),
        Console::update,
        Console::view,
    )
    .title(application_title)
    .theme(application_theme)
    .run()
    .context("running console window")
}
