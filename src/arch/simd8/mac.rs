/// SIMD8 multiply-accumulate unit
use super::bits::{split_u64, unpack_i8x4};
use super::InstInput;
use crate::builtin::{Module, Reg, Wire};

/// Eight signed 8x8 products. Products 0-3 pair the low half of `weights`
/// with `in0`, products 4-7 pair the high half with `in1`.
pub fn products(weights: u64, in0: u32, in1: u32) -> [i32; 8] {
  let (w0, w1) = split_u64(weights);
  let (w0, w1) = (unpack_i8x4(w0), unpack_i8x4(w1));
  let (f0, f1) = (unpack_i8x4(in0), unpack_i8x4(in1));
  std::array::from_fn(|i| {
    if i < 4 {
      w0[i] as i32 * f0[i] as i32
    } else {
      w1[i - 4] as i32 * f1[i - 4] as i32
    }
  })
}

pub struct MacAccumulator {
  name: String,

  // input: instruction bus, valid = start
  pub input: Wire<InstInput>,

  // input: decoded weights from the weight decoder
  pub weights: u64,

  // output: current accumulator, valid = done
  pub output: Wire<u32>,

  products: [i32; 8],
  acc: Reg<i32>,
}

impl MacAccumulator {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      input: Wire::default(),
      weights: 0,
      output: Wire::default(),
      products: [0; 8],
      acc: Reg::new(0),
    }
  }

  /// Committed accumulator
  pub fn acc(&self) -> i32 {
    *self.acc.get()
  }

  /// Products of the last evaluated cycle
  pub fn products(&self) -> [i32; 8] {
    self.products
  }
}

impl Module for MacAccumulator {
  fn run(&mut self) {
    let inst = self.input.value;
    let start = self.input.valid;

    self.products = products(self.weights, inst.rs1, inst.rs2);

    // readback is combinational
    let acc = self.acc();
    self.output.drive(acc as u32, start);

    // reset does not wait for start and pre-empts accumulation
    if inst.mode.reset_acc() {
      log::trace!("[{}] reset accumulator", self.name);
      self.acc.set(0);
    } else if start && inst.mode.enable_acc() {
      // the sum of eight 16-bit products cannot overflow; the accumulator can
      let sum: i32 = self.products.iter().sum();
      let next = acc.wrapping_add(sum);
      log::trace!("[{}] accumulate {} -> {}", self.name, sum, next);
      self.acc.set(next);
    }
  }

  fn tick(&mut self) {
    self.acc.tick();
  }

  fn reset(&mut self) {
    self.input = Wire::default();
    self.weights = 0;
    self.output = Wire::default();
    self.products = [0; 8];
    self.acc.load(0);
  }

  fn name(&self) -> &str {
    &self.name
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::arch::simd8::bits::{pack_i8x4, pack_i8x8};
  use crate::arch::simd8::mode::Mode;

  /// One instruction: a start cycle followed by an idle cycle, like the host
  /// returning control. Returns the accumulator after both edges.
  fn issue(unit: &mut MacAccumulator, start: bool, mode: u8, in0: u32, in1: u32, weights: u64) -> i32 {
    let inst = InstInput {
      mode: Mode::new(mode),
      rs1: in0,
      rs2: in1,
    };
    unit.weights = weights;
    unit.input.drive(inst, start);
    unit.run();
    unit.tick();
    unit.input.drive(inst, false);
    unit.run();
    unit.tick();
    unit.acc()
  }

  #[test]
  fn test_accumulate_sequence() {
    let mut unit = MacAccumulator::new("macc");
    assert_eq!(issue(&mut unit, true, 0b1000, 0x5, 0, 0x2), 0);
    assert_eq!(issue(&mut unit, false, 0b10000, 0x5, 0, 0x2), 0);
    assert_eq!(issue(&mut unit, true, 0b10000, 0x5, 0, 0x2), 10);
    assert_eq!(issue(&mut unit, true, 0b10000, 0x3, 0, 0x1), 13);
    assert_eq!(issue(&mut unit, true, 0b1000, 0x3, 0, 0x1), 0);
    assert_eq!(issue(&mut unit, true, 0b10000, 0x4, 0, 0x3), 12);
    // read
    assert_eq!(issue(&mut unit, true, 0b0001, 0x45, 0, 0x3), 12);
    assert_eq!(issue(&mut unit, true, 0b10000, 0x4, 0, 0x3), 24);

    let weights = pack_i8x8([5, -2, 10, 8, 5, -2, 10, 8]);
    let in0 = pack_i8x4([-5, 3, 2, 56]);
    let in1 = pack_i8x4([12, 2, 4, -9]);
    assert_eq!(issue(&mut unit, true, 0b10000, in0, in1, weights), 24 + 461);
    assert_eq!(issue(&mut unit, true, 0b0001, 0, 0, weights), 24 + 461);
  }

  #[test]
  fn test_products_pairing() {
    let weights = pack_i8x8([5, -2, 10, 8, 5, -2, 10, 8]);
    let in0 = pack_i8x4([-5, 3, 2, 56]);
    let in1 = pack_i8x4([12, 2, 4, -9]);
    let p = products(weights, in0, in1);
    assert_eq!(p, [-25, -6, 20, 448, 60, -4, 40, -72]);
    assert_eq!(p.iter().sum::<i32>(), 461);
  }

  #[test]
  fn test_output_is_pre_edge_value() {
    let mut unit = MacAccumulator::new("macc");
    unit.weights = 0x2;
    unit.input.set(InstInput {
      mode: Mode::accumulate(0),
      rs1: 0x5,
      rs2: 0,
    });
    unit.run();
    assert!(unit.output.valid);
    assert_eq!(unit.output.value, 0);
    unit.tick();

    unit.input.set(InstInput::default());
    unit.run();
    assert_eq!(unit.output.value, 10);
  }

  #[test]
  fn test_reset_dominates_enable() {
    let mut unit = MacAccumulator::new("macc");
    issue(&mut unit, true, 0b10000, 0x7F, 0, 0x7F);
    assert_eq!(unit.acc(), 127 * 127);
    assert_eq!(issue(&mut unit, true, 0b11000, 0x7F, 0, 0x7F), 0);
  }

  #[test]
  fn test_reset_without_start() {
    let mut unit = MacAccumulator::new("macc");
    issue(&mut unit, true, 0b10000, 0x3, 0, 0x3);
    assert_eq!(unit.acc(), 9);
    assert_eq!(issue(&mut unit, false, 0b1000, 0, 0, 0), 0);
  }

  #[test]
  fn test_wraps_on_overflow() {
    let mut unit = MacAccumulator::new("macc");
    unit.acc.load(i32::MAX);
    // 8 * (-128 * -128) = 131072
    let all = pack_i8x4([-128; 4]);
    let weights = pack_i8x8([-128; 8]);
    let acc = issue(&mut unit, true, 0b10000, all, all, weights);
    assert_eq!(acc, i32::MAX.wrapping_add(131072));
    assert!(acc < 0);
  }
}
