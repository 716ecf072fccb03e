//! Repository management modules.
//!
//! Services that orchestrate validation, storage and versioning for each resource type.

pub mod medications;
