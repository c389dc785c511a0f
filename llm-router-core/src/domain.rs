pub mod backend;
pub mod chain;
pub mod config;
pub mod output;
pub mod result;
pub mod task;

pub use backend::*;
pub use chain::*;
pub use config::*;
pub use output::*;
pub use result::*;
pub use task::*;
