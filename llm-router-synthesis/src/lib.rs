pub mod error;
pub mod format;
pub mod result;
pub mod schema;
pub mod synthesizer;

pub use error::*;
pub use format::*;
pub use result::*;
pub use schema::*;
pub use synthesizer::*;
