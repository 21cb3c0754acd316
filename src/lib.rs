//! repokeeper - a declarative catalog of local git repositories
//!
//! The catalog lists GitHub repositories (grouped by owner) and explicitly
//! described SSH repositories in one YAML file, and reconciles it against
//! the clones found under a root directory.
//!
//! ## Modules
//!
//! - [`schema`]: configuration document validation
//! - [`resolve`]: option inheritance
//! - [`scan`]: local directory discovery
//! - [`reconcile`]: present / missing / untracked classification
//! - [`format`]: fixed-width console rows
//! - [`config`]: loading the configuration file
//! - [`catalog`]: one full reconciliation pass
//! - [`platform`], [`exec`]: OS commands
//! - [`sync`]: cloning and pulling

pub mod catalog;
pub mod config;
pub mod error;
pub mod exec;
pub mod format;
pub mod platform;
pub mod reconcile;
pub mod resolve;
pub mod scan;
pub mod schema;
pub mod sync;

pub use config::Config;
pub use error::{ExecutionError, PlatformError, ResolveError, ScanError, ValidationError};
pub use reconcile::{ReconcileReport, Status};
pub use resolve::ResolvedRepository;
pub use sync::{SyncEngine, SyncSummary};
