// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Tool Id: the identifier shared by the exposure and navigation crates.
//!
//! A *tool* is a logical, externally invocable UI affordance (a button, a tab, a
//! form field) that a controller may want to reach. Hosts register tools under a
//! globally unique string identifier; this crate provides [`ToolId`], a cheap to
//! clone, immutable handle for that string.
//!
//! ```
//! use understory_tool_id::ToolId;
//!
//! let a = ToolId::from("tab-security");
//! let b = a.clone();
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "tab-security");
//! assert_eq!(format!("{a}"), "tab-security");
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use core::borrow::Borrow;
use core::fmt;
use core::ops::Deref;

/// Identifier of a tool tracked by the exposure tracker or reachable through the
/// navigation planner.
///
/// Cloning shares the underlying string. Ordering and hashing follow the string
/// contents, so ids compare equal regardless of how they were constructed.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToolId(Arc<str>);

impl ToolId {
    /// Create an id from any string-like value.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ToolId({:?})", &*self.0)
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToolId {
    fn from(id: &str) -> Self {
        Self(Arc::from(id))
    }
}

impl From<String> for ToolId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&String> for ToolId {
    fn from(id: &String) -> Self {
        Self::from(id.as_str())
    }
}

impl From<&Self> for ToolId {
    fn from(id: &Self) -> Self {
        id.clone()
    }
}

impl Deref for ToolId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ToolId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ToolId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ToolId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ToolId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
