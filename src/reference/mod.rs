//! Reference Data
//!
//! Named reference lists (tags, statuses, stages, ...) and the registry that
//! catalogs them.

pub mod domains;
mod named_list;
mod registry;

pub use domains::{find_domain, ReferenceDomain, ALL_DOMAINS};
pub use named_list::{stored_names, NamedListStore, SEED_COUNT};
pub use registry::{derive_key, reconcile, Clock, ReferencePage, ReferenceRegistry};
