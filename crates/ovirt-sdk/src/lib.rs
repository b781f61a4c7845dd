//! # oVirt SDK
//!
//! Client core for the oVirt engine management API: authenticated SSO
//! sessions, TLS trust configuration, link resolution and fault
//! classification. The generated per-resource services build on these
//! primitives; this crate contains everything stateful or
//! protocol-sensitive, and nothing that is generated.
//!
//! The core provides:
//!
//! * [`Connection`] — an authenticated session: lazy token acquisition,
//!   stale-token self-healing, revocation, raw authenticated requests.
//! * [`ConnectionBuilder`] — fail-fast configuration: URL, credentials,
//!   TLS trust (system store, CA file/bytes, insecure), headers, timeout.
//! * [`ServiceLocator`] / [`ResourceService`] — the seams through which
//!   [`Connection::follow_link`] resolves opaque `href` references into
//!   typed resources.
//! * [`check_fault`] / [`check_action`] / [`classify`] — turning engine
//!   error responses into the [`Error`] taxonomy.
//!
//! A connection is not internally synchronised: use one per logical owner,
//! or wrap it in a mutex.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use ovirt_sdk::Connection;
//!
//! # async fn run() -> Result<(), ovirt_sdk::Error> {
//! let mut connection = Connection::builder()
//!     .url("https://engine.example.com/ovirt-engine/api")
//!     .username("admin@internal")
//!     .password("secret")
//!     .build()?;
//!
//! let token = connection.authenticate().await?;
//! println!("session established: {token}");
//!
//! connection.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod connection;
pub mod credentials;
pub mod error;
pub mod fault;
pub mod link;
mod sso;
mod tls;

pub use builder::ConnectionBuilder;
pub use connection::Connection;
pub use credentials::Credentials;
pub use error::Error;
pub use fault::{check_action, check_fault, classify};
pub use link::{Fetched, Followed, ResourceService, ServiceLocator};

// Re-export the data-model types callers touch on every interaction.
pub use ovirt_models::{Action, ElementKind, Fault, Resource};
