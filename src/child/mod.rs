//! Child process spawning and stream plumbing.

mod process;
mod stream;

pub use process::*;
pub use stream::*;
