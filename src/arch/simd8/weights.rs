/// Weight code bank and decoder.
///
/// The bank holds 32 two-bit codes as four 16-bit slots. Every cycle the slot
/// picked by mode bits 0-1 is expanded through the codebook into eight signed
/// weights; storing a new bank needs `start` together with mode bit 2.
use super::bits::{self, pack_i8x8, unpack_codes};
use super::InstInput;
use crate::builtin::{Module, Reg, Wire};

/// Expand one slot of `bank` through `codebook`. Weight `i` of the result
/// (byte `i`) is the cluster named by code `i` of the slot.
pub fn decode(bank: u64, codebook: [i8; 4], select: u8) -> u64 {
  let codes = unpack_codes(bits::slot(bank, select));
  pack_i8x8(codes.map(|code| codebook[code as usize]))
}

pub struct WeightDecoder {
  name: String,

  // input: instruction bus, valid = start
  pub input: Wire<InstInput>,

  // input: committed codebook of the codebook store
  pub codebook: [i8; 4],

  // output: decoded weights, recomputed every cycle
  pub decoded: u64,

  // output: valid = done
  pub output: Wire<u32>,

  bank: Reg<u64>,
}

impl WeightDecoder {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      input: Wire::default(),
      codebook: [0; 4],
      decoded: 0,
      output: Wire::default(),
      bank: Reg::new(0),
    }
  }

  /// Committed weight bank
  pub fn bank(&self) -> u64 {
    *self.bank.get()
  }

  /// Slot currently routed to the decoder
  pub fn weight_codes(&self) -> u16 {
    bits::slot(self.bank(), self.input.value.mode.select())
  }
}

impl Module for WeightDecoder {
  fn run(&mut self) {
    let inst = self.input.value;

    // decode is combinational and ignores start
    self.decoded = decode(self.bank(), self.codebook, inst.mode.select());

    if !self.input.valid {
      self.output = Wire::default();
      return;
    }

    if inst.mode.store_weights() {
      let bank = bits::concat_u32(inst.rs1, inst.rs2);
      log::trace!("[{}] store bank {:#018x}", self.name, bank);
      self.bank.set(bank);
    }
    self.output.set(0);
  }

  fn tick(&mut self) {
    self.bank.tick();
  }

  fn reset(&mut self) {
    self.input = Wire::default();
    self.codebook = [0; 4];
    self.decoded = 0;
    self.output = Wire::default();
    self.bank.load(0);
  }

  fn name(&self) -> &str {
    &self.name
  }
}
