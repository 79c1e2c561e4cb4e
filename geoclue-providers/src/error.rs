//! Error types for provider loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while enumerating or loading provider descriptors
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The descriptor directory could not be listed
    #[error("Error opening {}: {source}", .dir.display())]
    DescriptorDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A descriptor could not be read
    #[error("Failed to read descriptor {id}: {source}")]
    DescriptorRead {
        id: String,
        #[source]
        source: io::Error,
    },

    /// A descriptor is not valid TOML or lacks required keys
    #[error("Failed to parse descriptor {id}: {source}")]
    DescriptorParse {
        id: String,
        #[source]
        source: toml::de::Error,
    },

    /// A descriptor parsed but describes an unusable provider
    #[error("Invalid descriptor {id}: {reason}")]
    InvalidDescriptor { id: String, reason: String },

    /// The source has no descriptor with this identifier
    #[error("Unknown descriptor {0}")]
    UnknownDescriptor(String),
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;
