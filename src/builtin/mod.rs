/// Signal primitives shared by every hardware unit
mod port;

pub use port::{Reg, Wire};

/// A synchronous hardware module.
///
/// One clock cycle is `run` followed by `tick`: `run` evaluates the
/// combinational logic from the current input wires and the registers
/// committed at the previous edge, and schedules register writes; `tick` is
/// the clock edge that commits them.
pub trait Module {
  fn run(&mut self);
  fn tick(&mut self);
  fn reset(&mut self);
  fn name(&self) -> &str;
}
