//! Local registry provider for the Crucible hub
//!
//! [`LocalRegistry`] implements [`hub_core::Registry`] on top of the local
//! filesystem: catalog metadata in a JSON index, archives as
//! content-addressed files. It owns every rule the HTTP layer leaves to the
//! provider: name and version grammars, uniqueness, containment, channel
//! references and archive digest verification.

mod archives;
mod local;
mod store;
pub mod validation;

pub use local::{LocalRegistry, INDEX_FILE};
