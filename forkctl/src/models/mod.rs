//! Data models for forks and the glue service.

mod fork;
mod glue;

pub use fork::ForkRecord;
pub use glue::{GlueChain, GlueConfig, GlueHandle};
