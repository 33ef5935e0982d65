use crate::error::{CfuError, Result};
use crate::simulator::sim::mode::{Backend, SimConfig, StepMode};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_CONFIG: &str = include_str!("default.toml");

pub const ENV_PREFIX: &str = "CFU_SIM";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SimulationSection {
  #[serde(default = "default_backend")]
  pub backend: String,
  #[serde(default)]
  pub quiet: bool,
  #[serde(default)]
  pub step_mode: bool,
  #[serde(default)]
  pub trace_file: String,
  #[serde(default)]
  pub check: bool,
}

fn default_backend() -> String {
  "hardware".to_string()
}

impl Default for SimulationSection {
  fn default() -> Self {
    Self {
      backend: default_backend(),
      quiet: false,
      step_mode: false,
      trace_file: String::new(),
      check: false,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
  #[serde(default)]
  pub simulation: SimulationSection,
}

/// Command line flags that override the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
  pub quiet: bool,
  pub step: bool,
  pub trace_file: Option<String>,
  pub backend: Option<String>,
  pub check: bool,
}

/// Load the layered configuration: built-in defaults, then `path` if given,
/// then `CFU_SIM_*` environment variables (`CFU_SIM_SIMULATION__QUIET=true`).
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
  load_config_with_env(path, default_environment())
}

pub fn default_environment() -> Environment {
  Environment::with_prefix(ENV_PREFIX)
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

pub fn load_config_with_env(path: Option<&Path>, env: Environment) -> Result<AppConfig> {
  let mut builder = Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));
  if let Some(path) = path {
    log::debug!("[config] loading {}", path.display());
    builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
  }
  let config = builder.add_source(env).build()?.try_deserialize::<AppConfig>()?;
  Ok(config)
}

/// Load a single TOML file without defaults or environment
pub fn load_config_file(path: &Path) -> Result<AppConfig> {
  let content = std::fs::read_to_string(path)?;
  toml::from_str::<AppConfig>(&content).map_err(|e| CfuError::InvalidConfig(format!("{}: {}", path.display(), e)))
}

pub fn apply_cli_overrides(config: &mut AppConfig, cli: &CliOverrides) {
  if cli.quiet {
    config.simulation.quiet = true;
  }
  if cli.step {
    config.simulation.step_mode = true;
  }
  if let Some(file) = &cli.trace_file {
    config.simulation.trace_file = file.clone();
  }
  if let Some(backend) = &cli.backend {
    config.simulation.backend = backend.clone();
  }
  if cli.check {
    config.simulation.check = true;
  }
}

pub fn validate_config(config: &AppConfig) -> Result<()> {
  let backend = config
    .simulation
    .backend
    .parse::<Backend>()
    .map_err(CfuError::InvalidConfig)?;

  if config.simulation.check && backend == Backend::Software {
    return Err(CfuError::InvalidConfig(
      "check mode compares against the software CFU and needs the hardware backend".to_string(),
    ));
  }

  Ok(())
}

/// Effective configuration as TOML
pub fn render_config(config: &AppConfig) -> Result<String> {
  Ok(toml::to_string_pretty(config)?)
}

impl AppConfig {
  pub fn sim_config(&self) -> Result<SimConfig> {
    validate_config(self)?;
    let sim = &self.simulation;
    Ok(SimConfig {
      backend: sim.backend.parse::<Backend>().map_err(CfuError::InvalidConfig)?,
      quiet: sim.quiet,
      step_mode: if sim.step_mode {
        StepMode::Step
      } else {
        StepMode::Continuous
      },
      trace_file: if sim.trace_file.is_empty() {
        None
      } else {
        Some(sim.trace_file.clone())
      },
      check: sim.check,
    })
  }
}
