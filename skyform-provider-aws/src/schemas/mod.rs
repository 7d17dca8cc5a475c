//! AWS resource schema definitions

pub mod rum;
pub mod types;
