/// Codebook store: four signed 8-bit cluster centroids
use super::bits::{pack_i8x4, unpack_i8x4};
use super::InstInput;
use crate::builtin::{Module, Reg, Wire};

pub struct CodebookStore {
  name: String,

  // input: instruction bus, valid = start
  pub input: Wire<InstInput>,

  // output: valid = done
  pub output: Wire<u32>,

  clusters: Reg<[i8; 4]>,
}

impl CodebookStore {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      input: Wire::default(),
      output: Wire::default(),
      clusters: Reg::new([0; 4]),
    }
  }

  /// Committed clusters, cluster 0 first
  pub fn clusters(&self) -> [i8; 4] {
    *self.clusters.get()
  }

  /// Committed clusters packed back into a word (cluster 0 in byte 0)
  pub fn word(&self) -> u32 {
    pack_i8x4(self.clusters())
  }
}

impl Module for CodebookStore {
  fn run(&mut self) {
    if !self.input.valid {
      self.output = Wire::default();
      return;
    }

    // the codebook travels on the second source operand
    let clusters = unpack_i8x4(self.input.value.rs2);
    log::trace!("[{}] store clusters {:?}", self.name, clusters);
    self.clusters.set(clusters);
    self.output.set(1);
  }

  fn tick(&mut self) {
    self.clusters.tick();
  }

  fn reset(&mut self) {
    self.input = Wire::default();
    self.output = Wire::default();
    self.clusters.load([0; 4]);
  }

  fn name(&self) -> &str {
    &self.name
  }
}
