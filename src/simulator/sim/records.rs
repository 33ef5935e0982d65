use crate::arch::simd8::{CfuRequest, CfuResponse, CfuState};
use serde::Serialize;

/// One line of the JSON trace: the host interface signals of a cycle and
/// the state committed at its clock edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
  pub cycle: u64,
  pub funct3: u8,
  pub start: bool,
  pub funct7: u8,
  pub rs1: u32,
  pub rs2: u32,
  pub done: bool,
  pub output: u32,
  pub codebook: u32,
  pub weights: u64,
  pub accumulator: i32,
}

impl TraceRecord {
  pub fn new(cycle: u64, req: &CfuRequest, resp: &CfuResponse, state: &CfuState) -> Self {
    Self {
      cycle,
      funct3: req.funct.into(),
      start: req.start,
      funct7: req.mode.raw(),
      rs1: req.rs1,
      rs2: req.rs2,
      done: resp.done,
      output: resp.output,
      codebook: state.codebook,
      weights: state.weights,
      accumulator: state.accumulator,
    }
  }
}
