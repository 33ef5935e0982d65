pub mod config;
pub mod host;
pub mod program;
pub mod selftest;
pub mod sim;
pub mod simulator;
pub mod utils;

pub use host::{CfuBackend, CfuHost, SoftwareBackend};
pub use program::{HostOp, Program};
pub use simulator::{RunReport, Simulator};
