//! Process-level services.

pub mod logger;
