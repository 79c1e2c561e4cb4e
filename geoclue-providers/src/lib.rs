//! # geoclue-providers
//!
//! Provider records and the registry the geoclue master selects from.
//!
//! Each location backend is declared by a descriptor file. Loading turns every
//! valid descriptor into a [`ProviderRecord`]; the [`ProviderRegistry`] owns
//! them and answers selection queries expressed as [`Constraints`].
//!
//! ```rust
//! use geoclue_providers::{
//!     AccuracyLevel, ConnectivityStatus, Constraints, InMemoryDescriptors, ProviderRegistry,
//!     SharedConnectivity, StaticConnectivity,
//! };
//!
//! let source = InMemoryDescriptors::new().with(
//!     "hostip",
//!     r#"
//!     [provider]
//!     name = "Hostip"
//!     service = "org.freedesktop.Geoclue.Providers.Hostip"
//!     path = "/org/freedesktop/Geoclue/Providers/Hostip"
//!     accuracy = "locality"
//!     interfaces = ["position", "address"]
//!     requires = ["network"]
//!     "#,
//! );
//!
//! let connectivity: SharedConnectivity = StaticConnectivity::shared(ConnectivityStatus::Online);
//! let mut registry = ProviderRegistry::new();
//! registry.load(&source, &connectivity);
//!
//! let constraints = Constraints::any().with_min_accuracy(AccuracyLevel::Country);
//! assert_eq!(registry.filter(&constraints).len(), 1);
//! ```

mod connectivity;
mod descriptor;
mod error;
mod provider;
mod registry;
mod source;
mod types;

pub use connectivity::{Connectivity, ConnectivityStatus, SharedConnectivity, StaticConnectivity};
pub use descriptor::ProviderDescriptor;
pub use error::{ProviderError, Result};
pub use provider::ProviderRecord;
pub use registry::{LoadReport, ProviderRegistry};
pub use source::{DescriptorDir, DescriptorListing, DescriptorSource, InMemoryDescriptors, PROVIDER_EXTENSION};
pub use types::{AccuracyLevel, Capability, Constraints, Interface, Resource};
