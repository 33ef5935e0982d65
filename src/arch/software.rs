/// Software-defined CFU.
///
/// An untimed model of the three instructions, used in place of the hardware
/// unit when the CFU is emulated in software. Results are available in the
/// call that produces them, so unlike the cycle model an accumulate returns the
/// updated accumulator.
use super::simd8::bits::{self, pack_i8x8, unpack_codes, unpack_i8x4};
use super::simd8::mac::products;
use super::simd8::mode::{ENABLE_ACC, RESET_ACC, SELECT_MASK, STORE_WEIGHTS};
use super::simd8::CfuState;

#[derive(Clone, Debug, Default)]
pub struct SoftwareCfu {
  clusters: u32,
  weights: u64,
  acc: u32,
}

impl SoftwareCfu {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn execute(&mut self, funct3: u8, funct7: u8, rs1: u32, rs2: u32) -> u32 {
    match funct3 {
      0 => {
        self.clusters = rs2;
        self.clusters
      },
      1 => {
        if funct7 & STORE_WEIGHTS != 0 {
          self.weights = bits::concat_u32(rs1, rs2);
          self.weights as u32
        } else {
          0
        }
      },
      2 => {
        match funct7 {
          RESET_ACC => self.acc = 0,
          f if f & !SELECT_MASK == ENABLE_ACC => {
            let sum = self.multiply_add(rs1, rs2, f & SELECT_MASK);
            self.acc = self.acc.wrapping_add(sum as u32);
          },
          // anything else reads
          _ => {},
        }
        self.acc
      },
      _ => 0,
    }
  }

  fn multiply_add(&self, rs1: u32, rs2: u32, set: u8) -> i32 {
    let clusters = unpack_i8x4(self.clusters);
    let codes = unpack_codes(bits::slot(self.weights, set));
    let weights = pack_i8x8(codes.map(|code| clusters[code as usize]));
    let sum = products(weights, rs1, rs2).iter().sum();
    log::trace!("[software_cfu] weight set {} adds {}", set, sum);
    sum
  }

  pub fn state(&self) -> CfuState {
    CfuState {
      codebook: self.clusters,
      weights: self.weights,
      accumulator: self.acc as i32,
    }
  }
}
