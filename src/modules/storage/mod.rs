//! Storage module for file content
//!
//! Provides the key-addressed local disk store backing uploaded blobs.

mod disk_store;

pub use disk_store::DiskStore;
