//! ns-3 engine hand-off: program rendering and execution.

pub mod runner;
pub mod script;

pub use runner::{Ns3Runner, RunnerError};
pub use script::render_program;
