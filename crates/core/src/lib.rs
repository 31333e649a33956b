pub mod config;
pub mod error;
pub mod field;
pub mod table;
pub mod timestamp;

pub use config::ReviewConfig;
pub use error::*;
pub use field::*;
pub use table::*;
