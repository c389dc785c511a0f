pub mod aggregators;
pub mod records;
pub mod scorer;

pub use aggregators::*;
pub use records::*;
pub use scorer::*;
