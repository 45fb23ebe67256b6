pub mod config;
pub mod disk;
pub mod error;
pub mod types;

pub use config::*;
pub use disk::*;
pub use error::*;
pub use types::*;
