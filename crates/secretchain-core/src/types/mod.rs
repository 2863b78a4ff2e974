//! Core types shared by the manifest parser, the store and the sources

mod cancellation;
mod filter;
mod manifest;

pub use cancellation::CancellationToken;
pub use filter::{SecretFilter, SourceFilter, SourceInfo};
pub use manifest::{SecretEntry, SourceDescriptor};
