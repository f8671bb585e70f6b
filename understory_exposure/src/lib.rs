// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_exposure --heading-base-level=0

//! Understory Exposure: know which UI tools can be reached right now.
//!
//! ## Overview
//!
//! An external controller (an agent, a test harness) that drives a running UI needs to know
//! whether the element behind a tool actually exists, is on screen, is not covered by a dialog,
//! and accepts input. This crate tracks that as a five-step ladder, [`ExposureState`]:
//!
//! `NotPresent → Present → Visible → Exposed → Interactable`
//!
//! The host feeds two independent kinds of observations through
//! [`ExposureTracker::apply`]:
//! - structural: [`Signal::Added`] / [`Signal::Removed`],
//! - visual: [`Signal::Visibility`] / [`Signal::VisibilityLost`],
//!
//! plus [`Signal::Interactivity`] flags. On every signal the element's state is recomputed
//! from scratch rather than patched, so signals arriving out of order can never leave an
//! element stuck in an optimistic state. Unknown facts always resolve to the weaker state.
//!
//! ## Outputs
//!
//! - [`ExposureTracker::state`]: a pure read of the last computed state.
//! - [`ExposureTracker::wait_for_state`]: suspend until a state is reached or a timeout elapses.
//! - [`ExposureTracker::subscribe`]: receive an [`ExposureChangeEvent`] for every transition.
//!
//! ## Geometry
//!
//! [`VisibilityProbe`] derives visibility signals from world-space bounds and the stack of active
//! [`Layer`]s, for hosts that have layout results at hand.
//!
//! ## Minimal example
//!
//! ```
//! use std::sync::Arc;
//! use understory_exposure::{ExposureState, ExposureTracker, Signal};
//!
//! // Any `Weak` works as a node handle: the node is live while someone owns it.
//! let node = Arc::new(());
//! let tracker = ExposureTracker::new();
//! tracker.register("save", Arc::downgrade(&node)).unwrap();
//! assert_eq!(tracker.state("save").unwrap(), ExposureState::Present);
//!
//! tracker.apply("save", Signal::Visibility { visible: true, obstructed: false });
//! assert_eq!(tracker.state("save").unwrap(), ExposureState::Interactable);
//!
//! // A modal dialog opens on top.
//! tracker.apply("save", Signal::Visibility { visible: true, obstructed: true });
//! assert_eq!(tracker.state("save").unwrap(), ExposureState::Visible);
//! ```

mod geometry;
mod tracker;
mod types;

pub use geometry::{Layer, VisibilityProbe};
pub use tracker::{ExposureTracker, Subscription};
pub use types::{ElementFlags, ExposureChangeEvent, ExposureError, ExposureState, NodeHandle, Signal};
pub use understory_tool_id::ToolId;

impl<T: ?Sized> NodeHandle for std::sync::Weak<T> {
    fn is_live(&self) -> bool {
        self.strong_count() > 0
    }
}

impl<T: ?Sized> NodeHandle for std::rc::Weak<T> {
    fn is_live(&self) -> bool {
        self.strong_count() > 0
    }
}

impl<T: NodeHandle + ?Sized> NodeHandle for std::sync::Arc<T> {
    fn is_live(&self) -> bool {
        (**self).is_live()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn weak_handle_tracks_owner() {
        let owner = Arc::new(());
        let handle = Arc::downgrade(&owner);
        assert!(handle.is_live());
        drop(owner);
        assert!(!handle.is_live());
    }

    #[test]
    fn dropped_owner_allows_re_registration() {
        let tracker = ExposureTracker::new();
        let first = Arc::new(());
        tracker.register("save", Arc::downgrade(&first)).unwrap();
        let second = Arc::new(());
        assert!(tracker.register("save", Arc::downgrade(&second)).is_err());
        drop(first);
        tracker.register("save", Arc::downgrade(&second)).unwrap();
        assert_eq!(tracker.state("save").unwrap(), ExposureState::Present);
    }
}
