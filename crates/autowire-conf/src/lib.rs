//! # autowire-conf
//!
//! Settings for the autowire container, assembled from layered sources:
//! built-in defaults, an optional TOML file and `AUTOWIRE_*` environment
//! variables.
//!
//! ```
//! use autowire_conf::{SettingsBuilder, sources::{DefaultSource, EnvSource}};
//!
//! let settings = SettingsBuilder::new()
//!     .add_source(DefaultSource)
//!     .add_source(EnvSource::from_vars([("AUTOWIRE_FORGET_TRANSIENT_RECEIVERS", "off")]))
//!     .build()
//!     .unwrap();
//! assert!(!settings.forget_transient_receivers);
//! ```

pub mod settings;
pub mod sources;

pub use settings::{ContainerSettings, DEFAULT_MAX_RESOLUTION_DEPTH, SettingsBuilder, SettingsError};
pub use sources::{ConfigSource, SourceError};
