//! Skyform Core
//!
//! Engine-facing contracts shared by Skyform providers: resources and their
//! observed state, the `Provider` lifecycle trait, and attribute schemas.

pub mod provider;
pub mod resource;
pub mod schema;
