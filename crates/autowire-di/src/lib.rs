//! # Autowire Dependency Injection
//!
//! A service container that produces values from registered recipes and
//! fills constructor and callable parameters automatically.
//!
//! ## Features
//!
//! - **Recipes**: literals, closures, class names and prebuilt objects
//! - **Autowiring**: typed parameters receive the first registered object of that class
//! - **Resolve-once**: memoized services, produced at most once even across threads
//! - **Call targets**: closures, `[receiver, method]` pairs and `"Class@method"` strings
//! - **Hardening**: cyclic dependencies and runaway depth fail with an error
//!
//! Classes are described up front through a [`ClassCatalog`], which takes
//! the place of runtime reflection: each [`ClassDescriptor`] lists the
//! constructor's formal parameters and the methods that can be called.
//!
//! ## Example
//!
//! ```rust
//! use autowire_di::{ClassDescriptor, Container, FormalParameter, Instance, Value};
//! use std::sync::Arc;
//!
//! struct Config {
//!     dsn: String,
//! }
//!
//! struct Database {
//!     config: Arc<Config>,
//! }
//!
//! let container = Container::new();
//! container.describe(
//!     ClassDescriptor::builder::<Database>("Database")
//!         .constructor(vec![FormalParameter::new("config").typed("Config")], |args| {
//!             Ok(Database { config: args.object::<Config>(0)? })
//!         })
//!         .build(),
//! );
//! container.describe(
//!     ClassDescriptor::builder::<Config>("Config")
//!         .without_constructor(|| Config { dsn: String::new() })
//!         .build(),
//! );
//!
//! let config = Instance::new("Config", Config { dsn: "sqlite::memory:".into() });
//! container.instance("config", config);
//! container.once("db", "Database");
//!
//! let db = container.resolve::<Database>("db").unwrap();
//! assert_eq!(db.config.dsn, "sqlite::memory:");
//! assert!(Arc::ptr_eq(&db, &container.resolve::<Database>("db").unwrap()));
//! ```
//!
//! ## Settings
//!
//! [`ContainerSettings`] come from the `autowire-conf` crate and can be
//! loaded from TOML files and `AUTOWIRE_*` environment variables:
//!
//! ```rust
//! use autowire_di::{Container, ContainerSettings};
//!
//! let settings = ContainerSettings::from_toml_str("max_resolution_depth = 16").unwrap();
//! let container = Container::new().with_settings(settings).unwrap();
//! assert_eq!(container.settings().max_resolution_depth, 16);
//! ```

pub mod arguments;
pub mod container;
pub mod cycle_detection;
pub mod error;
pub mod reflection;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod value;

pub use arguments::Arguments;
pub use container::Container;
pub use cycle_detection::MAX_RESOLUTION_DEPTH;
pub use error::{DiError, DiResult};
pub use reflection::{
	ClassBuilder, ClassCatalog, ClassDescriptor, ClassKind, DefaultValue, FormalParameter, Signature,
	Visibility,
};
pub use registry::{Recipe, Registry, ServiceEntry};
pub use resolver::{CallTarget, Resolver};
pub use scope::InstanceStore;
pub use value::{Callable, Instance, Value};

pub use autowire_conf::{ContainerSettings, SettingsBuilder, SettingsError};
