mod file;

pub use file::{normalize_email, File, FileShare, SharePermission};
