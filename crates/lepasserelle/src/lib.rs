// lepasserelle - Host Bridge
//
// *La Passerelle* (The Bridge) - Configuration, startup pipeline, debouncing and CLI

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Command-line interface
pub mod cli;
/// TOML configuration
pub mod config;
/// Latest-wins query slot
pub mod debounce;
/// Host error types
pub mod errors;
/// Catalog load, cache and index build
pub mod startup;

pub use config::EngineConfig;
pub use debounce::{settle_and_search, QuerySlot, QueryTicket};
pub use errors::{PasserelleError, Result};
pub use startup::{read_catalog, DiscoverySource, Engine, NoDiscovery, StaticDiscovery, APP_VERSION};
