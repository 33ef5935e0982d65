use simd8_cfu::simulator::config::config::{load_config, load_config_file, render_config};
use simd8_cfu::simulator::host::{CfuBackend, CfuHost, SoftwareBackend};
use simd8_cfu::simulator::program::Program;
use simd8_cfu::simulator::selftest::run_selftest;
use simd8_cfu::simulator::sim::mode::{Backend, SimConfig};
use simd8_cfu::simulator::utils::log::init_test_log;
use simd8_cfu::simulator::Simulator;
use simd8_cfu::{CfuError, Funct, Mode, Simd8Cfu};
use std::io::Write;

const SELFTEST_PROGRAM: &str = "
# three rounds, cumulative accumulator
reset
codebook 0x04030201
weights 0x01FFFA32 0x12ED547A
acc 0 0x01010101 0x01010101
acc 1 0x01010101 0x01010101
acc 2 0x01010101 0x01010101
acc 3 0x01010101 0x01010101
read
expect 83
codebook 0x04030201
weights 0x01FFFA32 0x12ED547A
acc 0 0x05060708 0x01020304
acc 1 0x05060708 0x01020304
acc 2 0x05060708 0x01020304
acc 3 0x05060708 0x01020304
read
expect 491
codebook 0x04030201
weights 0x01FFFA32 0x12ED547A
acc 0 0xFFFFFFFF 0xFBF6FFFE
acc 1 0xFFFFFFFF 0xFBF6FFFE
acc 2 0xFFFFFFFF 0xFBF6FFFE
acc 3 0xFFFFFFFF 0xFBF6FFFE
read
expect 286
";

#[test]
fn selftest_passes_on_both_backends() {
  init_test_log();
  assert!(run_selftest(Simd8Cfu::default()).all_passed());
  assert!(run_selftest(SoftwareBackend::new()).all_passed());
}

#[test]
fn program_matches_selftest() {
  init_test_log();
  let program = Program::parse(SELFTEST_PROGRAM).unwrap();
  for backend in [Backend::Hardware, Backend::Software] {
    let mut sim = Simulator::new(SimConfig {
      backend,
      ..Default::default()
    })
    .unwrap();
    let report = sim.run(&program).unwrap();
    assert_eq!(report.expect_passed, 3, "{:?}", backend);
    assert!(report.passed());
    assert_eq!(report.instructions, 22);
  }
}

#[test]
fn check_mode_agrees_with_software() {
  let program = Program::parse(SELFTEST_PROGRAM).unwrap();
  let mut sim = Simulator::new(SimConfig {
    check: true,
    ..Default::default()
  })
  .unwrap();
  let report = sim.run(&program).unwrap();
  assert_eq!(report.mismatches, 0);
  assert_eq!(report.cycles, 22);
}

#[test]
fn hardware_and_software_reads_agree() {
  let mut hw = CfuHost::new(Simd8Cfu::default());
  let mut sw = CfuHost::new(SoftwareBackend::new());
  let words = [0x0000_0000u32, 0x7F80_01FF, 0x8080_8080, 0x1234_5678, 0xFFFF_FFFF, 0x05FB_0A80];

  for host in [&mut hw as &mut dyn HostLike, &mut sw] {
    host.reset();
  }
  for (i, &a) in words.iter().enumerate() {
    let b = words[(i + 1) % words.len()];
    for host in [&mut hw as &mut dyn HostLike, &mut sw] {
      host.load(a, b, a.rotate_left(8));
      for slot in 0..4 {
        host.accumulate(slot, b, a);
      }
    }
    assert_eq!(hw.read(), sw.read());
  }
}

trait HostLike {
  fn reset(&mut self);
  fn load(&mut self, codebook: u32, lo: u32, hi: u32);
  fn accumulate(&mut self, slot: u8, in0: u32, in1: u32);
}

impl<B: CfuBackend> HostLike for CfuHost<B> {
  fn reset(&mut self) {
    CfuHost::reset(self);
  }

  fn load(&mut self, codebook: u32, lo: u32, hi: u32) {
    self.store_codebook(codebook);
    self.store_weights(lo, hi);
  }

  fn accumulate(&mut self, slot: u8, in0: u32, in1: u32) {
    CfuHost::accumulate(self, slot, in0, in1);
  }
}

#[test]
fn trace_has_one_record_per_cycle() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("trace.jsonl");
  let mut sim = Simulator::new(SimConfig {
    trace_file: Some(path.to_string_lossy().to_string()),
    ..Default::default()
  })
  .unwrap();
  let program = Program::parse("codebook 0x04030201\nidle 2\nread\n").unwrap();
  let report = sim.run(&program).unwrap();
  assert_eq!(report.cycles, 4);

  let text = std::fs::read_to_string(&path).unwrap();
  let records: Vec<serde_json::Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
  assert_eq!(records.len(), 4);
  assert_eq!(records[0]["cycle"], 0);
  assert_eq!(records[0]["start"], true);
  assert_eq!(records[0]["output"], 1);
  assert_eq!(records[0]["codebook"], 0x04030201);
  assert_eq!(records[1]["start"], false);
  assert_eq!(records[1]["done"], false);
  assert_eq!(records[3]["funct3"], 2);
}

#[test]
fn config_file_layers_over_defaults() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  writeln!(file, "[simulation]\nbackend = \"software\"\nstep_mode = true").unwrap();

  let config = load_config(Some(file.path())).unwrap();
  assert_eq!(config.simulation.backend, "software");
  assert!(config.simulation.step_mode);
  assert!(!config.simulation.check);

  let single = load_config_file(file.path()).unwrap();
  assert_eq!(single.simulation.backend, "software");

  let rendered = render_config(&config).unwrap();
  assert!(rendered.contains("backend = \"software\""));
}

#[test]
fn bad_config_is_rejected() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  writeln!(file, "[simulation]\nbackend = \"fpga\"").unwrap();
  let config = load_config(Some(file.path())).unwrap();
  assert!(matches!(config.sim_config(), Err(CfuError::InvalidConfig(_))));

  let missing = tempfile::tempdir().unwrap().path().join("missing.toml");
  assert!(matches!(load_config(Some(&missing)), Err(CfuError::Config(_))));
}

#[test]
fn invalid_selector_at_host_boundary() {
  assert!(matches!(Funct::try_from(3), Err(CfuError::InvalidSelector(3))));
  assert_eq!(Funct::try_from(2).unwrap(), Funct::Mac);
  assert_eq!(Mode::new(0xFF).raw(), 0x7F);
}
