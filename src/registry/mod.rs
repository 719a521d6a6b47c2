//! Advertisement registry subsystem.
//!
//! # Data Flow
//! ```text
//! Advertisement (server + namespaces)
//!     → recorder.rs (validate, all-or-nothing)
//!     → store.rs (write lock, create/refresh associations)
//!
//! Client path request
//!     → resolver.rs
//!     → store.rs (read lock, longest-prefix lookup via index.rs / trie.rs)
//!     → Resolution { namespace, origins, caches }
//!
//! Periodic timer
//!     → sweeper.rs
//!     → store.rs (write lock, drop stale associations and empty namespaces)
//! ```
//!
//! # Design Decisions
//! - Registry is an explicit instance shared via Arc, never a global
//! - Namespace keys are exact strings; matching semantics live in matcher.rs
//! - State is rebuilt from re-advertisement after a restart

pub mod index;
pub mod matcher;
pub mod recorder;
pub mod resolver;
pub mod store;
pub mod sweeper;
pub mod trie;
pub mod types;

pub use recorder::AdRecorder;
pub use resolver::{PathResolver, Resolution};
pub use store::{AdRegistry, RegistryStats, SweepReport};
pub use sweeper::ExpirationSweeper;
pub use types::{AdvertisementError, NamespaceAd, ServerAd, ServerType};
