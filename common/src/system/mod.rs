//! Common system operations

mod error;
pub use error::*;
mod fs;
pub use fs::*;
