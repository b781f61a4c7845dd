#![deny(missing_docs)]

//! # oVirt Models
//!
//! Wire-level data model for the oVirt engine API client.
//!
//! The engine exposes hundreds of resource kinds through generated service
//! code; this crate carries only what the hand-written client core needs:
//!
//! - The [`Resource`] capability trait, through which the connection layer
//!   inspects arbitrary API objects (back-reference, singular vs collection
//!   shape) without knowing their concrete kind.
//! - The [`Fault`] and [`Action`] protocol envelopes the engine returns on
//!   error and operation paths.
//! - A reader for single-tag protocol documents ([`codec`]) that can tell
//!   "a document of another kind" apart from "not a document at all".
//! - A small hand-maintained subset of concrete resource kinds ([`types`])
//!   used by the core itself, the mock engine, and tests.
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`resource`] | `Resource` capability trait, `ElementKind`, downcasting |
//! | [`fault`] | `Fault` and `Action` envelopes |
//! | [`codec`] | Single-tag document readers with tag-mismatch detection |
//! | [`types`] | Concrete resource subset (`Vm`, `Nic`, their list kinds) |

pub mod codec;
pub mod fault;
pub mod resource;
pub mod types;

// Re-export all public types at crate root for convenience.
// Downstream crates can use `ovirt_models::Fault` directly.
pub use codec::*;
pub use fault::*;
pub use resource::*;
pub use types::*;
