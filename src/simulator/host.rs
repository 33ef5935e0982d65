/// Host side of the CFU interface.
///
/// `CfuBackend` is one instruction issue as seen by the host processor;
/// `CfuHost` adds the instruction helpers the host software calls.
use crate::arch::simd8::{CfuRequest, CfuResponse, CfuState, Funct, Mode, Simd8Cfu};
use crate::arch::SoftwareCfu;
use crate::builtin::Module;

pub trait CfuBackend {
  fn name(&self) -> &str;

  /// One clock cycle of host interface signals
  fn step(&mut self, req: CfuRequest) -> CfuResponse;

  /// Elapsed clock cycles
  fn cycles(&self) -> u64;

  fn state(&self) -> CfuState;

  /// Issue one instruction and wait for `done`
  fn issue(&mut self, funct: Funct, mode: Mode, rs1: u32, rs2: u32) -> CfuResponse {
    let req = CfuRequest::issue(funct, mode, rs1, rs2);
    loop {
      let resp = self.step(req);
      if resp.done {
        return resp;
      }
    }
  }

  /// Let `cycles` clock cycles pass without an instruction
  fn idle(&mut self, cycles: u64) {
    for _ in 0..cycles {
      self.step(CfuRequest::idle());
    }
  }
}

impl CfuBackend for Simd8Cfu {
  fn name(&self) -> &str {
    Module::name(self)
  }

  fn step(&mut self, req: CfuRequest) -> CfuResponse {
    Simd8Cfu::step(self, req)
  }

  fn cycles(&self) -> u64 {
    self.cycle()
  }

  fn state(&self) -> CfuState {
    Simd8Cfu::state(self)
  }
}

/// Untimed: every instruction counts as one cycle, idling costs nothing
#[derive(Default)]
pub struct SoftwareBackend {
  cfu: SoftwareCfu,
  issued: u64,
}

impl SoftwareBackend {
  pub fn new() -> Self {
    Self::default()
  }
}

impl CfuBackend for SoftwareBackend {
  fn name(&self) -> &str {
    "software_cfu"
  }

  fn step(&mut self, req: CfuRequest) -> CfuResponse {
    if !req.start {
      return CfuResponse::default();
    }
    self.issued += 1;
    CfuResponse {
      done: true,
      output: self.cfu.execute(req.funct.into(), req.mode.raw(), req.rs1, req.rs2),
    }
  }

  fn cycles(&self) -> u64 {
    self.issued
  }

  fn state(&self) -> CfuState {
    self.cfu.state()
  }
}

impl<B: CfuBackend + ?Sized> CfuBackend for Box<B> {
  fn name(&self) -> &str {
    (**self).name()
  }

  fn step(&mut self, req: CfuRequest) -> CfuResponse {
    (**self).step(req)
  }

  fn cycles(&self) -> u64 {
    (**self).cycles()
  }

  fn state(&self) -> CfuState {
    (**self).state()
  }

  fn issue(&mut self, funct: Funct, mode: Mode, rs1: u32, rs2: u32) -> CfuResponse {
    (**self).issue(funct, mode, rs1, rs2)
  }

  fn idle(&mut self, cycles: u64) {
    (**self).idle(cycles)
  }
}

/// Instruction helpers of the host software
pub struct CfuHost<B: CfuBackend> {
  backend: B,
}

impl<B: CfuBackend> CfuHost<B> {
  pub fn new(backend: B) -> Self {
    Self { backend }
  }

  pub fn backend(&self) -> &B {
    &self.backend
  }

  pub fn backend_mut(&mut self) -> &mut B {
    &mut self.backend
  }

  pub fn into_backend(self) -> B {
    self.backend
  }

  pub fn call(&mut self, funct: Funct, mode: Mode, rs1: u32, rs2: u32) -> u32 {
    self.backend.issue(funct, mode, rs1, rs2).output
  }

  pub fn store_codebook(&mut self, clusters: u32) -> u32 {
    self.call(Funct::StoreCodebook, Mode::NONE, 0, clusters)
  }

  pub fn store_weights(&mut self, lo: u32, hi: u32) -> u32 {
    self.call(Funct::Weights, Mode::STORE_WEIGHTS, lo, hi)
  }

  pub fn reset(&mut self) -> u32 {
    self.call(Funct::Mac, Mode::RESET, 0, 0)
  }

  pub fn accumulate(&mut self, slot: u8, in0: u32, in1: u32) -> u32 {
    self.call(Funct::Mac, Mode::accumulate(slot), in0, in1)
  }

  pub fn read(&mut self) -> u32 {
    self.call(Funct::Mac, Mode::NONE, 0, 0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn accumulate_all<B: CfuBackend>(host: &mut CfuHost<B>) -> u32 {
    host.reset();
    host.store_codebook(0x04030201);
    host.store_weights(0x01FFFA32, 0x12ED547A);
    for slot in 0..4 {
      host.accumulate(slot, 0x01010101, 0x01010101);
    }
    host.read()
  }

  #[test]
  fn test_hardware_host() {
    let mut host = CfuHost::new(Simd8Cfu::default());
    assert_eq!(accumulate_all(&mut host), 83);
    assert_eq!(host.backend().cycles(), 8);
  }

  #[test]
  fn test_software_host() {
    let mut host = CfuHost::new(SoftwareBackend::new());
    assert_eq!(accumulate_all(&mut host), 83);
    host.backend_mut().idle(3);
    assert_eq!(host.backend().cycles(), 8);
  }

  #[test]
  fn test_boxed_backend() {
    let backend: Box<dyn CfuBackend> = Box::new(Simd8Cfu::default());
    let mut host = CfuHost::new(backend);
    assert_eq!(accumulate_all(&mut host), 83);
    host.backend_mut().idle(2);
    assert_eq!(host.backend().cycles(), 10);
    assert_eq!(host.backend().state().accumulator, 83);
  }

  fn setup<B: CfuBackend>(host: &mut CfuHost<B>) {
    host.store_codebook(0x04030201);
    host.store_weights(0x01FFFA32, 0x12ED547A);
    host.reset();
  }

  #[test]
  fn test_accumulate_returns_previous_value_in_hardware() {
    let mut hw = CfuHost::new(Simd8Cfu::default());
    let mut sw = CfuHost::new(SoftwareBackend::new());
    setup(&mut hw);
    setup(&mut sw);
    assert_eq!(hw.accumulate(0, 0x01010101, 0x01010101), 0);
    assert_eq!(sw.accumulate(0, 0x01010101, 0x01010101), 23);
    assert_eq!(hw.read(), sw.read());
  }
}
