mod file_service;

pub use file_service::{ContentUpdate, FileService};
pub(crate) use file_service::to_responses;
