// lecatalogue - Catalog Model
//
// *Le Catalogue* (The Catalog) - Launchable settings destinations and their availability

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

//! Immutable catalog items, typed launch descriptors, catalog document parsing
//! and the once-per-process availability transform that feeds the search index.

pub mod availability;
pub mod item;
pub mod launch;
pub mod loader;
pub mod merge;

pub use availability::{
    resolve_all, resolve_availability, AvailabilityResolver, AvailabilityRule, PlatformFacts,
    ResolvedItem,
};
pub use item::CatalogItem;
pub use launch::{CommandLine, LaunchKind, LaunchTarget};
pub use loader::{parse_catalog_lossy, Catalog, CatalogError};
pub use merge::merge_discovered;
