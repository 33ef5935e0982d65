/// SIMD8 CFU - instruction dispatch and the fixed wiring between the three
/// instruction units:
///
/// ```text
///   store_codebook.clusters ──> weights.codebook
///   weights.decoded         ──> macc.weights
/// ```
pub mod bits;
pub mod codebook;
pub mod mac;
pub mod mode;
pub mod weights;

pub use codebook::CodebookStore;
pub use mac::MacAccumulator;
pub use mode::{Funct, Mode};
pub use weights::WeightDecoder;

use crate::builtin::{Module, Wire};
use serde::{Deserialize, Serialize};

/// Instruction bus shared by all units: funct7 and the two source operands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InstInput {
  pub mode: Mode,
  pub rs1: u32,
  pub rs2: u32,
}

/// One cycle of host interface signals
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CfuRequest {
  pub funct: Funct,
  pub start: bool,
  pub mode: Mode,
  pub rs1: u32,
  pub rs2: u32,
}

impl CfuRequest {
  /// An instruction issue: `start` asserted on `funct`
  pub fn issue(funct: Funct, mode: Mode, rs1: u32, rs2: u32) -> Self {
    Self {
      funct,
      start: true,
      mode,
      rs1,
      rs2,
    }
  }

  /// A cycle without any instruction
  pub fn idle() -> Self {
    Self::default()
  }

  fn bus(&self) -> InstInput {
    InstInput {
      mode: self.mode,
      rs1: self.rs1,
      rs2: self.rs2,
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfuResponse {
  pub done: bool,
  pub output: u32,
}

/// Committed architectural state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfuState {
  pub codebook: u32,
  pub weights: u64,
  pub accumulator: i32,
}

/// Top level of the custom function unit
pub struct Simd8Cfu {
  name: String,

  // input: host interface
  pub input: Wire<CfuRequest>,

  // output: response of the selected unit
  pub output: Wire<u32>,

  pub store_codebook: CodebookStore,
  pub weights: WeightDecoder,
  pub macc: MacAccumulator,

  cycle: u64,
}

impl Simd8Cfu {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      input: Wire::default(),
      output: Wire::default(),
      store_codebook: CodebookStore::new("store_codebook"),
      weights: WeightDecoder::new("weights"),
      macc: MacAccumulator::new("macc"),
      cycle: 0,
    }
  }

  /// Present host signals for the current cycle
  pub fn send_instruction(&mut self, req: CfuRequest) {
    self.input.drive(req, req.start);
  }

  pub fn response(&self) -> CfuResponse {
    CfuResponse {
      done: self.output.valid,
      output: self.output.value,
    }
  }

  /// One full clock cycle: present `req`, evaluate, commit the edge.
  /// The returned response is the one sampled before the edge.
  pub fn step(&mut self, req: CfuRequest) -> CfuResponse {
    self.send_instruction(req);
    self.run();
    let resp = self.response();
    self.tick();
    resp
  }

  /// Number of clock edges since construction or the last reset
  pub fn cycle(&self) -> u64 {
    self.cycle
  }

  pub fn state(&self) -> CfuState {
    CfuState {
      codebook: self.store_codebook.word(),
      weights: self.weights.bank(),
      accumulator: self.macc.acc(),
    }
  }
}

impl Default for Simd8Cfu {
  fn default() -> Self {
    Self::new("simd8_cfu")
  }
}

impl Module for Simd8Cfu {
  fn run(&mut self) {
    let req = self.input.value;
    let bus = req.bus();

    // funct7 and operands are broadcast; start only reaches the selected unit
    self.store_codebook.input.drive(bus, req.start && req.funct == Funct::StoreCodebook);
    self.weights.input.drive(bus, req.start && req.funct == Funct::Weights);
    self.macc.input.drive(bus, req.start && req.funct == Funct::Mac);

    self.store_codebook.run();

    // static wiring, always active
    self.weights.codebook = self.store_codebook.clusters();
    self.weights.run();
    self.macc.weights = self.weights.decoded;
    self.macc.run();

    self.output = match req.funct {
      Funct::StoreCodebook => self.store_codebook.output.clone(),
      Funct::Weights => self.weights.output.clone(),
      Funct::Mac => self.macc.output.clone(),
    };

    if req.start {
      log::debug!(
        "[{}] cycle {}: {} funct7={} rs1={:#010x} rs2={:#010x} -> {:#x}",
        self.name,
        self.cycle,
        req.funct.name(),
        req.mode,
        req.rs1,
        req.rs2,
        self.output.value
      );
    }
  }

  fn tick(&mut self) {
    self.store_codebook.tick();
    self.weights.tick();
    self.macc.tick();
    self.cycle += 1;
    log::trace!("[{}] edge {}: {:?}", self.name, self.cycle, self.state());
  }

  fn reset(&mut self) {
    self.input = Wire::default();
    self.output = Wire::default();
    self.store_codebook.reset();
    self.weights.reset();
    self.macc.reset();
    self.cycle = 0;
  }

  fn name(&self) -> &str {
    &self.name
  }
}
