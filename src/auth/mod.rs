//! Per-origin capabilities and the permission store

pub mod capabilities;
pub mod store;

pub use capabilities::{required_capability, Capability};
pub use store::{AppInfo, MemoryPermissionStore, PermissionStore};
