use anyhow::Context;
use bridge::model::SharedState;
use clap::Parser;
use config::SimulatorConfig;
use log::info;
use robot::Robot;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

mod bridge;
mod config;
mod robot;

#[derive(Parser)]
#[command(author, version, about = "Simulated line-follower robot service")]
struct Args {
    /// Load the simulator config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the listen address
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Override the random seed driving the lane scene
    #[arg(long)]
    seed: Option<u64>,
    /// Report the camera as disconnected
    #[arg(long, default_value_t = false)]
    no_camera: bool,
    /// Report the chassis as disconnected
    #[arg(long, default_value_t = false)]
    no_chassis: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulatorConfig::load(path)?,
        None => SimulatorConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.camera_connected &= !args.no_camera;
    config.chassis_connected &= !args.no_chassis;
    config.validate()?;

    let mut state = SharedState::new(config.initial_params()?);
    if let Some(path) = config.persist.clone() {
        info!("persisting parameters to {}", path.display());
        state = state.persisting_to(path);
    }
    let robot = Robot::new(&config);

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating simulator runtime")?;
    runtime.block_on(async move {
        tokio::spawn(robot.run(state.clone()));
        tokio::spawn(bridge::server::serve(state, config.bind));
        signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
        info!("simulator shutting down");
        Ok::<(), anyhow::Error>(())
    })
}
