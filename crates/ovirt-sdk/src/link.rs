//! Link resolution.
//!
//! Engine objects reference related resources through opaque `href` values.
//! [`Connection::follow_link`] turns such a reference back into live data:
//! it checks that the reference belongs to this connection's server, strips
//! the base prefix, resolves a service for the relative path and dispatches
//! the operation matching the object's declared shape. The set of possible
//! targets is the entire resource schema, so resolution works against the
//! narrow [`ServiceLocator`] / [`ResourceService`] seams instead of concrete
//! service types.

use async_trait::async_trait;
use ovirt_models::{ElementKind, Resource};
use tracing::debug;

use crate::connection::Connection;
use crate::error::Error;

// ---------------------------------------------------------------------------
// Service seams
// ---------------------------------------------------------------------------

/// Resolves relative API paths to service handles.
///
/// Implemented by the generated service tree; the core only needs this
/// narrow surface to follow links.
pub trait ServiceLocator: Send + Sync {
    /// Resolve the service responsible for `path`, given relative to the
    /// API entry point (e.g. `vms/123`).
    fn locate(&self, path: &str) -> Result<Box<dyn ResourceService>, Error>;
}

/// Uniform get/list surface of a resolved service.
#[async_trait]
pub trait ResourceService: Send + Sync {
    /// Retrieve the singular resource behind this service.
    async fn get(&self, connection: &mut Connection) -> Result<Fetched, Error>;

    /// Retrieve the collection behind this service.
    ///
    /// Services of singular resources keep the default, which reports the
    /// operation as unsupported.
    async fn list(&self, _connection: &mut Connection) -> Result<Fetched, Error> {
        Err(Error::generic("this service does not support listing"))
    }
}

// ---------------------------------------------------------------------------
// Dispatch outcome
// ---------------------------------------------------------------------------

/// Payload retrieved by following a link.
pub enum Followed {
    /// A single resource.
    Single(Box<dyn Resource>),
    /// A page of resources.
    Collection(Vec<Box<dyn Resource>>),
}

impl std::fmt::Debug for Followed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Followed::Single(_) => f.debug_tuple("Single").finish(),
            Followed::Collection(items) => {
                f.debug_tuple("Collection").field(&items.len()).finish()
            }
        }
    }
}

/// Outcome of a service dispatch.
///
/// Generated responses expose their payload twice: a checked accessor and a
/// panicking `must` variant. Link following only ever uses the checked
/// accessor, turning an absent payload into an error instead of a panic.
pub struct Fetched {
    payload: Option<Followed>,
}

impl Fetched {
    /// A response carrying a single resource.
    pub fn single(resource: impl Resource) -> Self {
        Fetched {
            payload: Some(Followed::Single(Box::new(resource))),
        }
    }

    /// A response carrying a page of resources.
    pub fn collection<T: Resource>(items: Vec<T>) -> Self {
        Fetched {
            payload: Some(Followed::Collection(
                items
                    .into_iter()
                    .map(|item| Box::new(item) as Box<dyn Resource>)
                    .collect(),
            )),
        }
    }

    /// A response with no payload.
    pub fn absent() -> Self {
        Fetched { payload: None }
    }

    /// Checked accessor.
    pub fn payload(&self) -> Option<&Followed> {
        self.payload.as_ref()
    }

    /// Checked accessor, by value.
    pub fn into_payload(self) -> Option<Followed> {
        self.payload
    }

    /// Panicking accessor, mirroring the generated `must_*` readers.
    ///
    /// # Panics
    ///
    /// Panics when the response carries no payload.
    pub fn must_payload(self) -> Followed {
        self.payload.expect("response carries no payload")
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

impl Connection {
    /// Resolve a link-bearing object into the resource(s) it references.
    ///
    /// Fails when the object has no `href`, when the `href` does not live
    /// under this connection's base URL, when no service locator is
    /// configured, or when the resolved service reports no data.
    pub async fn follow_link(&mut self, object: &dyn Resource) -> Result<Followed, Error> {
        let href = object
            .href()
            .filter(|href| !href.is_empty())
            .ok_or_else(|| {
                Error::generic("cannot follow link: the object doesn't have any href")
            })?;
        let path = self.relative_path(href)?;
        let locator = self.locator.clone().ok_or_else(|| {
            Error::Config("no service locator is configured on this connection".into())
        })?;
        debug!(href, path = %path, "following link");
        let service = locator.locate(&path)?;
        let fetched = match object.element_kind() {
            ElementKind::Collection => service.list(self).await?,
            ElementKind::Single => service.get(self).await?,
        };
        fetched
            .into_payload()
            .ok_or_else(|| Error::generic("cannot follow link: the retrieved data doesn't exist"))
    }

    /// Strip this connection's base prefix from a link `href`.
    ///
    /// Links may be absolute (`https://host/ovirt-engine/api/vms/1`) or
    /// server-relative (`/ovirt-engine/api/vms/1`); either way they must
    /// extend this connection's base URL.
    fn relative_path(&self, href: &str) -> Result<String, Error> {
        let base = self.url.as_str().trim_end_matches('/');
        let base_path = self.url.path().trim_end_matches('/');
        let rest = href
            .strip_prefix(base)
            .or_else(|| href.strip_prefix(base_path))
            .ok_or_else(|| {
                Error::generic(format!(
                    "the URL \"{href}\" isn't compatible with the base URL of the connection"
                ))
            })?;
        Ok(rest.trim_start_matches('/').to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
