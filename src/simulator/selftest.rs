/// Built-in CFU check: three rounds of codebook/weight stores and four
/// accumulates each, compared against known cumulative results.
use super::host::{CfuBackend, CfuHost};
use serde::Serialize;

pub const CODEBOOK: u32 = 0x04030201;
pub const WEIGHTS: (u32, u32) = (0x01FFFA32, 0x12ED547A);

/// (in0, in1, expected accumulator after the round)
pub const ROUNDS: [(u32, u32, i32); 3] = [
  (0x01010101, 0x01010101, 83),
  (0x05060708, 0x01020304, 491),
  (0xFFFFFFFF, 0xFBF6FFFE, 286),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundResult {
  pub round: usize,
  pub expected: i32,
  pub actual: i32,
}

impl RoundResult {
  pub fn ok(&self) -> bool {
    self.expected == self.actual
  }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SelfTestReport {
  pub backend: String,
  pub rounds: Vec<RoundResult>,
}

impl SelfTestReport {
  pub fn passed(&self) -> usize {
    self.rounds.iter().filter(|r| r.ok()).count()
  }

  pub fn failed(&self) -> usize {
    self.rounds.len() - self.passed()
  }

  pub fn all_passed(&self) -> bool {
    self.failed() == 0
  }
}

fn check<B: CfuBackend>(host: &mut CfuHost<B>, in0: u32, in1: u32) -> i32 {
  host.store_codebook(CODEBOOK);
  host.store_weights(WEIGHTS.0, WEIGHTS.1);
  for slot in 0..4 {
    host.accumulate(slot, in0, in1);
  }
  host.read() as i32
}

pub fn run_selftest<B: CfuBackend>(backend: B) -> SelfTestReport {
  let mut host = CfuHost::new(backend);
  let mut report = SelfTestReport {
    backend: host.backend().name().to_string(),
    rounds: Vec::with_capacity(ROUNDS.len()),
  };

  host.reset();
  for (round, &(in0, in1, expected)) in ROUNDS.iter().enumerate() {
    let actual = check(&mut host, in0, in1);
    let result = RoundResult { round, expected, actual };
    if result.ok() {
      log::info!("[selftest] round {}: OK ({})", round, actual);
    } else {
      log::error!("[selftest] round {}: FAIL expected {} got {}", round, expected, actual);
    }
    report.rounds.push(result);
  }

  log::info!(
    "[selftest] {}: {} passed, {} failed, {} cycles",
    report.backend,
    report.passed(),
    report.failed(),
    host.backend().cycles()
  );
  report
}
