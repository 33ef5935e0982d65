//! Error types for the simulator

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CfuError {
  /// funct3 outside the three implemented units
  #[error("Invalid unit selector: {0}")]
  InvalidSelector(u8),

  /// Host program syntax error
  #[error("line {line}: {msg}")]
  Parse { line: usize, msg: String },

  /// Configuration rejected by validation
  #[error("Invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("Config error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("TOML error: {0}")]
  Toml(#[from] toml::ser::Error),

  #[error("Trace error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Readline error: {0}")]
  Readline(#[from] rustyline::error::ReadlineError),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CfuError>;
