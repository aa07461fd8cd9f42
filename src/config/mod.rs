//! Configuration types and file loading.

mod loader;
mod types;

pub use loader::*;
pub use types::*;
