//! Hand-maintained subset of the engine resource schema.
//!
//! The full schema (hundreds of kinds) is generated elsewhere and consumed
//! through the [`Resource`](crate::resource::Resource) capability trait; the
//! core only needs a few concrete kinds for its own plumbing, the mock
//! engine, and tests. Collection kinds mirror the wire shape of engine list
//! documents: the list's own `href` plus the repeated element under the
//! element name.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::resource::{ElementKind, Resource};

// ---------------------------------------------------------------------------
// Vm
// ---------------------------------------------------------------------------

/// A virtual machine.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Vm {
    /// Unique identifier assigned by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Canonical location of this VM on the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Lifecycle status as reported by the engine (e.g. `"up"`, `"down"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Resource for Vm {
    fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Single
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A page of virtual machines, as returned by the `vms` collection.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct VmList {
    /// Canonical location of the collection on the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// The virtual machines in this page.
    #[serde(default, rename = "vm")]
    pub vms: Vec<Vm>,
}

impl Resource for VmList {
    fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Collection
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Nic
// ---------------------------------------------------------------------------

/// A virtual network interface attached to a VM.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Nic {
    /// Unique identifier assigned by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable name (e.g. `"nic1"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Canonical location of this NIC on the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// MAC address, when assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
}

impl Resource for Nic {
    fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Single
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The NICs of a VM, as returned by the nested `nics` collection.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NicList {
    /// Canonical location of the collection on the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// The NICs in this page.
    #[serde(default, rename = "nic")]
    pub nics: Vec<Nic>,
}

impl Resource for NicList {
    fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Collection
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
