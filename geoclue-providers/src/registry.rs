//! The set of loaded providers.
//!
//! The registry holds one record for every valid descriptor seen by the last
//! successful [`ProviderRegistry::load`], or nothing. A load never takes a
//! non-empty registry to empty: if the source cannot be listed or yields no
//! usable descriptor, the previous records stay. Only
//! [`ProviderRegistry::release`] empties it, dropping every record and with
//! them every reference to the shared connectivity handle.

use std::fmt;

use crate::connectivity::SharedConnectivity;
use crate::error::ProviderError;
use crate::provider::ProviderRecord;
use crate::source::DescriptorSource;
use crate::types::Constraints;

/// Summary of a load pass
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Identifiers of the records now in the registry
    pub loaded: Vec<String>,
    /// Entries the source listed but which are not descriptors
    pub ignored: Vec<String>,
    /// Descriptors that failed to load, with the reason
    pub skipped: Vec<(String, ProviderError)>,
    /// Set when the source could not be listed at all
    pub source_error: Option<ProviderError>,
    /// Records of the previous load kept because this one produced none
    pub retained: usize,
}

impl LoadReport {
    /// Whether every listed descriptor loaded
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.source_error.is_none()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} loaded, {} skipped, {} ignored",
            self.loaded.len(),
            self.skipped.len(),
            self.ignored.len()
        )?;
        if self.retained > 0 {
            write!(f, ", {} retained", self.retained)?;
        }
        if let Some(error) = &self.source_error {
            write!(f, " ({})", error)?;
        }
        Ok(())
    }
}

/// Owner of every loaded [`ProviderRecord`]
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: Vec<ProviderRecord>,
    releases: u64,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registry contents with the providers described by `source`
    ///
    /// A descriptor that fails to load is logged and skipped; the rest still
    /// load. The new records are swapped in only when there is at least one
    /// of them; otherwise the current records are kept.
    pub fn load(
        &mut self,
        source: &dyn DescriptorSource,
        connectivity: &SharedConnectivity,
    ) -> LoadReport {
        let mut report = LoadReport::default();
        let listing = match source.list() {
            Ok(listing) => listing,
            Err(e) => {
                tracing::warn!("{}", e);
                report.source_error = Some(e);
                self.retain_into(&mut report);
                return report;
            }
        };
        report.ignored = listing.ignored;

        let mut loaded = Vec::with_capacity(listing.accepted.len());
        for id in listing.accepted {
            match ProviderRecord::load(source, &id, SharedConnectivity::clone(connectivity)) {
                Ok(record) => {
                    tracing::debug!(
                        "Loaded provider {} ({}, accuracy {})",
                        record.name(),
                        record.service(),
                        record.accuracy()
                    );
                    report.loaded.push(id);
                    loaded.push(record);
                }
                Err(e) => {
                    tracing::warn!("Loading from {} failed: {}", id, e);
                    report.skipped.push((id, e));
                }
            }
        }

        if loaded.is_empty() {
            self.retain_into(&mut report);
        } else {
            self.providers = loaded;
        }

        tracing::info!(
            "Provider registry loaded from {}: {}",
            source.location(),
            report
        );
        report
    }

    fn retain_into(&self, report: &mut LoadReport) {
        report.retained = self.providers.len();
        report.loaded = self.providers.iter().map(|p| p.id().to_string()).collect();
        if report.retained > 0 {
            tracing::warn!("Keeping {} previously loaded providers", report.retained);
        }
    }

    /// Drop every record; a no-op on an empty registry
    ///
    /// Returns the number of records released.
    pub fn release(&mut self) -> usize {
        let released = self.providers.len();
        if released > 0 {
            self.providers.clear();
            self.releases += 1;
            tracing::info!("Released {} providers", released);
        }
        released
    }

    /// How many times a non-empty registry has been released
    pub fn release_count(&self) -> u64 {
        self.releases
    }

    /// Records accepted by `constraints`, in registry order
    pub fn filter(&self, constraints: &Constraints) -> Vec<&ProviderRecord> {
        let matches: Vec<&ProviderRecord> = self
            .providers
            .iter()
            .filter(|provider| provider.is_good(constraints))
            .collect();

        tracing::debug!(
            "{} of {} providers match {}",
            matches.len(),
            self.providers.len(),
            constraints
        );
        matches
    }

    pub fn get(&self, id: &str) -> Option<&ProviderRecord> {
        self.providers.iter().find(|provider| provider.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderRecord> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
