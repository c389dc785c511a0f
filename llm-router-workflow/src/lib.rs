pub mod error;
pub mod orchestrator;
pub mod retry;

pub use error::*;
pub use orchestrator::*;
pub use retry::*;
