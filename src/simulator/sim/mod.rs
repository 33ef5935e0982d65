pub mod mode;
pub mod records;
pub mod shell;

pub use mode::{Backend, SimConfig, StepMode};
pub use records::TraceRecord;
