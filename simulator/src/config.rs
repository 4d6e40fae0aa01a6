use anyhow::{bail, Context};
use linebotcore::api::{ParamPatch, ParameterSet};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub bind: SocketAddr,
    pub frame_width: u32,
    pub frame_height: u32,
    pub tick_ms: u64,
    pub seed: u64,
    /// Amplitude of the random jitter added to the lateral error.
    pub noise: f64,
    pub camera_connected: bool,
    pub chassis_connected: bool,
    /// JSON object of parameter values applied over the built-in defaults.
    pub defaults: Option<PathBuf>,
    /// Where accepted parameter updates are written back as JSON.
    pub persist: Option<PathBuf>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5001)),
            frame_width: 320,
            frame_height: 240,
            tick_ms: 33,
            seed: 7,
            noise: 1.5,
            camera_connected: true,
            chassis_connected: true,
            defaults: None,
            persist: None,
        }
    }
}

impl SimulatorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading simulator config {}", path_ref.display()))?;
        let config: SimulatorConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing simulator config {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            bail!(
                "frame size must be positive, got {}x{}",
                self.frame_width,
                self.frame_height
            );
        }
        if self.tick_ms == 0 {
            bail!("tick_ms must be positive");
        }
        Ok(())
    }

    /// Built-in defaults, then the defaults file, then previously persisted
    /// values when that file exists.
    pub fn initial_params(&self) -> anyhow::Result<ParameterSet> {
        let mut params = ParameterSet::default();
        let persisted = self.persist.as_ref().filter(|path| path.exists());
        for path in self.defaults.iter().chain(persisted) {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("reading parameter file {}", path.display()))?;
            let patch: ParamPatch = serde_json::from_str(&contents)
                .with_context(|| format!("parsing parameter file {}", path.display()))?;
            let applied = params.merge(&patch);
            info!(
                "applied {} parameter(s) from {}",
                applied.len(),
                path.display()
            );
        }
        Ok(params)
    }
}
