/// Instruction selector (funct3) and mode field (funct7) decoding
use crate::error::CfuError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mode bits 0-1: weight slot selector
pub const SELECT_MASK: u8 = 0b11;
/// Mode bit 2: store-weights enable
pub const STORE_WEIGHTS: u8 = 1 << 2;
/// Mode bit 3: reset accumulator
pub const RESET_ACC: u8 = 1 << 3;
/// Mode bit 4: enable accumulator
pub const ENABLE_ACC: u8 = 1 << 4;
/// The mode field is 7 bits wide
pub const MODE_MASK: u8 = 0x7F;

/// Per-instruction control bits
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Mode(u8);

impl Mode {
  pub const NONE: Mode = Mode(0);
  pub const STORE_WEIGHTS: Mode = Mode(STORE_WEIGHTS);
  pub const RESET: Mode = Mode(RESET_ACC);

  /// Truncates `raw` to the 7-bit field width
  pub const fn new(raw: u8) -> Self {
    Self(raw & MODE_MASK)
  }

  /// Accumulate with the weights of `slot`
  pub const fn accumulate(slot: u8) -> Self {
    Self(ENABLE_ACC | (slot & SELECT_MASK))
  }

  pub const fn raw(self) -> u8 {
    self.0
  }

  pub const fn select(self) -> u8 {
    self.0 & SELECT_MASK
  }

  pub const fn store_weights(self) -> bool {
    self.0 & STORE_WEIGHTS != 0
  }

  pub const fn reset_acc(self) -> bool {
    self.0 & RESET_ACC != 0
  }

  pub const fn enable_acc(self) -> bool {
    self.0 & ENABLE_ACC != 0
  }
}

impl From<u8> for Mode {
  fn from(raw: u8) -> Self {
    Self::new(raw)
  }
}

impl From<Mode> for u8 {
  fn from(mode: Mode) -> Self {
    mode.0
  }
}

impl fmt::Display for Mode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:#09b}", self.0)
  }
}

/// Unit selector carried in funct3
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Funct {
  #[default]
  StoreCodebook = 0,
  Weights = 1,
  Mac = 2,
}

impl Funct {
  pub fn name(self) -> &'static str {
    match self {
      Funct::StoreCodebook => "store_codebook",
      Funct::Weights => "weights",
      Funct::Mac => "macc",
    }
  }
}

impl TryFrom<u8> for Funct {
  type Error = CfuError;

  fn try_from(funct3: u8) -> Result<Self, Self::Error> {
    match funct3 {
      0 => Ok(Funct::StoreCodebook),
      1 => Ok(Funct::Weights),
      2 => Ok(Funct::Mac),
      other => Err(CfuError::InvalidSelector(other)),
    }
  }
}

impl From<Funct> for u8 {
  fn from(funct: Funct) -> Self {
    funct as u8
  }
}
