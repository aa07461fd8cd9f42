//! Outbound report delivery to the callback endpoint.

mod dispatcher;

pub use dispatcher::*;
