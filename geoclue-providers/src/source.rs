//! Where provider descriptors come from.
//!
//! A [`DescriptorSource`] lists descriptor identifiers and reads their text.
//! The registry never looks at the filesystem directly, so tests and embedders
//! can hand it descriptors from memory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ProviderError, Result};

/// Extension that marks a file as a provider descriptor
pub const PROVIDER_EXTENSION: &str = ".provider";

/// Outcome of listing a source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorListing {
    /// Identifiers worth loading, in listing order
    pub accepted: Vec<String>,
    /// Entries that are not descriptors
    pub ignored: Vec<String>,
}

/// A collection of provider descriptors
pub trait DescriptorSource {
    /// Human readable location, for log messages
    fn location(&self) -> String;

    /// List the descriptors this source offers
    fn list(&self) -> Result<DescriptorListing>;

    /// Read the text of one descriptor
    fn read(&self, id: &str) -> Result<String>;
}

/// Descriptor files in a directory
#[derive(Debug, Clone)]
pub struct DescriptorDir {
    dir: PathBuf,
    extension: String,
}

impl DescriptorDir {
    /// Scan `dir` for files ending in `.provider`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_extension(dir, PROVIDER_EXTENSION)
    }

    pub fn with_extension(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Compare the text after the last dot, dot included
    fn has_extension(&self, file_name: &str) -> bool {
        file_name
            .rfind('.')
            .map_or(false, |i| file_name[i..] == self.extension)
    }
}

impl DescriptorSource for DescriptorDir {
    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    fn list(&self) -> Result<DescriptorListing> {
        let entries = fs::read_dir(&self.dir).map_err(|source| ProviderError::DescriptorDir {
            dir: self.dir.clone(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();

        if names.is_empty() {
            tracing::info!("No providers found in {}", self.dir.display());
        } else {
            tracing::info!("Found {} entries in {}", names.len(), self.dir.display());
        }

        let mut listing = DescriptorListing::default();
        for name in names {
            if self.has_extension(&name) {
                tracing::debug!("  {}", name);
                listing
                    .accepted
                    .push(self.dir.join(&name).to_string_lossy().into_owned());
            } else {
                tracing::debug!("  {} - ignored", name);
                listing.ignored.push(name);
            }
        }

        Ok(listing)
    }

    fn read(&self, id: &str) -> Result<String> {
        fs::read_to_string(id).map_err(|source| ProviderError::DescriptorRead {
            id: id.to_string(),
            source,
        })
    }
}

/// Descriptors held in memory, keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct InMemoryDescriptors {
    descriptors: BTreeMap<String, String>,
}

impl InMemoryDescriptors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(id, text);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.descriptors.insert(id.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl DescriptorSource for InMemoryDescriptors {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn list(&self) -> Result<DescriptorListing> {
        Ok(DescriptorListing {
            accepted: self.descriptors.keys().cloned().collect(),
            ignored: Vec::new(),
        })
    }

    fn read(&self, id: &str) -> Result<String> {
        self.descriptors
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownDescriptor(id.to_string()))
    }
}
