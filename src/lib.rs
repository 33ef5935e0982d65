//! Cycle-level model of a SIMD8 weight-clustering custom function unit and
//! the host-side tools that drive it.

pub mod arch;
pub mod builtin;
pub mod error;
pub mod simulator;

pub use arch::simd8::{CfuRequest, CfuResponse, CfuState, Funct, Mode};
pub use arch::{Simd8Cfu, SoftwareCfu};
pub use error::{CfuError, Result};
