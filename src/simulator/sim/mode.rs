use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// Cycle model
  #[default]
  Hardware,
  /// Untimed software CFU
  Software,
}

impl FromStr for Backend {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "hardware" | "hw" => Ok(Backend::Hardware),
      "software" | "sw" => Ok(Backend::Software),
      other => Err(format!("unsupported backend: {}", other)),
    }
  }
}

impl fmt::Display for Backend {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Backend::Hardware => write!(f, "hardware"),
      Backend::Software => write!(f, "software"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
  Continuous,
  Step,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
  pub backend: Backend,
  pub quiet: bool,
  pub step_mode: StepMode,
  pub trace_file: Option<String>,
  /// Run the software CFU alongside and compare reads
  pub check: bool,
}

impl Default for SimConfig {
  fn default() -> Self {
    Self {
      backend: Backend::Hardware,
      quiet: false,
      step_mode: StepMode::Continuous,
      trace_file: None,
      check: false,
    }
  }
}
