//! Durable storage helpers

mod uploads;

pub use uploads::UploadStore;
