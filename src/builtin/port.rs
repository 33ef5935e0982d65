/// Port and register types for module interconnection

/// A wire/signal that carries data between modules.
///
/// `valid` doubles as the handshake strobe of the wire: a unit input wire is
/// valid in the cycle its `start` is asserted, a unit output wire is valid in
/// the cycle it reports `done`. The value is still driven when the strobe is low.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wire<T: Clone> {
  pub value: T,
  pub valid: bool,
}

impl<T: Clone> Wire<T> {
  pub fn new(value: T) -> Self {
    Self { value, valid: false }
  }

  pub fn set(&mut self, value: T) {
    self.value = value;
    self.valid = true;
  }

  /// Drive a value with an explicit strobe.
  pub fn drive(&mut self, value: T, valid: bool) {
    self.value = value;
    self.valid = valid;
  }

  pub fn clear(&mut self) {
    self.valid = false;
  }
}

impl<T: Clone + Default> Default for Wire<T> {
  fn default() -> Self {
    Self {
      value: T::default(),
      valid: false,
    }
  }
}

/// A clocked register.
///
/// Reads always observe the value committed at the last clock edge. A write
/// scheduled with [`Reg::set`] becomes visible only after [`Reg::tick`]; the
/// last write scheduled within a cycle wins.
#[derive(Clone, Debug, Default)]
pub struct Reg<T: Clone> {
  cur: T,
  next: Option<T>,
}

impl<T: Clone> Reg<T> {
  pub fn new(init: T) -> Self {
    Self { cur: init, next: None }
  }

  /// Committed value
  pub fn get(&self) -> &T {
    &self.cur
  }

  /// Schedule a write for the next clock edge
  pub fn set(&mut self, value: T) {
    self.next = Some(value);
  }

  pub fn is_pending(&self) -> bool {
    self.next.is_some()
  }

  /// Clock edge: commit the scheduled write, if any
  pub fn tick(&mut self) {
    if let Some(value) = self.next.take() {
      self.cur = value;
    }
  }

  /// Asynchronous load, bypassing the clock (initialisation only)
  pub fn load(&mut self, value: T) {
    self.cur = value;
    self.next = None;
  }
}
