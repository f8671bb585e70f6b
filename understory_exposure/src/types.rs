// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for exposure tracking: states, flags, signals, events, and errors.
//!
//! ## Overview
//!
//! These types describe the inputs the host feeds into an
//! [`ExposureTracker`](crate::ExposureTracker) ([`Signal`]) and the outputs it
//! hands back to controllers ([`ExposureState`], [`ExposureChangeEvent`]).

use std::time::Instant;

use understory_tool_id::ToolId;

/// Readiness ladder of a tracked element.
///
/// Variants are ordered: a higher state implies every weaker guarantee held at
/// the same instant. Transitions are not required to move one step at a time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ExposureState {
    /// No live node matches the registered identity.
    NotPresent,
    /// The node exists in the structural tree but is not confirmed visible.
    Present,
    /// The node intersects the visible viewport.
    Visible,
    /// The node is visible and no higher-priority layer covers it.
    Exposed,
    /// The node is exposed and able to receive input.
    Interactable,
}

impl ExposureState {
    /// Returns true if `self` is at least as strong as `target`.
    #[inline]
    pub fn satisfies(self, target: Self) -> bool {
        self >= target
    }
}

bitflags::bitflags! {
    /// Interactivity flags reported by the host for an element.
    ///
    /// Any set flag keeps an otherwise exposed element from reaching
    /// [`ExposureState::Interactable`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// The element is disabled.
        const DISABLED  = 0b0000_0001;
        /// The element is read-only.
        const READ_ONLY = 0b0000_0010;
        /// The element is inert (for example inside an inert subtree).
        const INERT     = 0b0000_0100;
    }
}

/// An environment signal about a single element.
///
/// Structural signals ([`Added`](Signal::Added), [`Removed`](Signal::Removed))
/// and visual signals ([`Visibility`](Signal::Visibility),
/// [`VisibilityLost`](Signal::VisibilityLost)) arrive on independent channels
/// and in no guaranteed order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// The node was (re)attached to the structural tree.
    Added,
    /// The node was detached from the structural tree.
    Removed,
    /// Fresh visibility and obstruction observation.
    Visibility {
        /// The node intersects the visible area.
        visible: bool,
        /// A higher-priority active layer covers the node.
        obstructed: bool,
    },
    /// The visibility observer can no longer vouch for this node.
    VisibilityLost,
    /// Current interactivity flags.
    Interactivity(ElementFlags),
}

/// Opaque handle to the host's UI node.
///
/// The tracker never interprets the node; it only asks whether it is still
/// live, which decides whether a duplicate registration is rejected and whether
/// a structural removal is permanent.
pub trait NodeHandle {
    /// Returns true while the underlying node can still be attached to the UI.
    fn is_live(&self) -> bool;
}

/// A record of one observed state transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExposureChangeEvent {
    /// Element whose state changed.
    pub tool: ToolId,
    /// State before the transition.
    pub previous: ExposureState,
    /// State after the transition.
    pub current: ExposureState,
    /// When the transition was observed.
    pub at: Instant,
}

/// Errors surfaced by [`ExposureTracker`](crate::ExposureTracker) calls.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExposureError {
    /// The tool is already tracked and its node is still live.
    #[error("tool `{0}` is already registered to a live node")]
    DuplicateRegistration(ToolId),
    /// The tool was never registered (or has been unregistered).
    #[error("tool `{0}` is not registered")]
    UnknownTool(ToolId),
}

/// What the tracker currently knows about one element.
///
/// `None` means no signal has vouched for that property since it was last
/// invalidated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Knowledge {
    pub(crate) present: bool,
    pub(crate) visible: Option<bool>,
    pub(crate) obstructed: Option<bool>,
    pub(crate) flags: ElementFlags,
}

impl Knowledge {
    /// Knowledge right after registration: present, nothing else confirmed.
    pub(crate) fn registered() -> Self {
        Self {
            present: true,
            ..Self::default()
        }
    }

    /// Fold a signal into the stored knowledge.
    pub(crate) fn absorb(&mut self, signal: Signal) {
        match signal {
            Signal::Added => self.present = true,
            Signal::Removed => {
                // Absence clears every weaker claim.
                self.present = false;
                self.visible = None;
                self.obstructed = None;
            }
            // An absent element has nothing to see; a later `Added` starts
            // from unknown visibility.
            Signal::Visibility { .. } if !self.present => {}
            Signal::Visibility {
                visible,
                obstructed,
            } => {
                self.visible = Some(visible);
                self.obstructed = Some(obstructed);
            }
            Signal::VisibilityLost => {
                self.visible = None;
                self.obstructed = None;
            }
            Signal::Interactivity(flags) => self.flags = flags,
        }
    }

    /// Compute the state from scratch.
    ///
    /// Checks absence, then visibility, then obstruction, then interactivity.
    /// Unknown properties resolve to the weaker state.
    pub(crate) fn resolve(&self) -> ExposureState {
        if !self.present {
            return ExposureState::NotPresent;
        }
        if self.visible != Some(true) {
            return ExposureState::Present;
        }
        if self.obstructed != Some(false) {
            return ExposureState::Visible;
        }
        if !self.flags.is_empty() {
            return ExposureState::Exposed;
        }
        ExposureState::Interactable
    }
}
