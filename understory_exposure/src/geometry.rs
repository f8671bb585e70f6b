// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry helpers that turn layout results into visibility signals.
//!
//! Hosts that already know each element's world-space bounds (for example from a
//! box tree or a layout pass) can use [`VisibilityProbe`] to derive
//! [`Signal::Visibility`] instead of writing their own intersection logic.
//!
//! ```
//! use kurbo::Rect;
//! use understory_exposure::{Layer, Signal, VisibilityProbe};
//!
//! let probe = VisibilityProbe::new(Rect::new(0.0, 0.0, 800.0, 600.0));
//! let button = Rect::new(10.0, 10.0, 90.0, 40.0);
//!
//! // Nothing on top.
//! assert_eq!(
//!     probe.observe(button, 0, &[]),
//!     Signal::Visibility { visible: true, obstructed: false },
//! );
//!
//! // An open modal dialog above the page covers everything below it.
//! let dialog = Layer { bounds: Rect::new(200.0, 150.0, 600.0, 450.0), z_index: 100, modal: true };
//! assert_eq!(
//!     probe.observe(button, 0, &[dialog]),
//!     Signal::Visibility { visible: true, obstructed: true },
//! );
//! ```

use kurbo::Rect;

use crate::types::Signal;

/// An active paint layer that can cover content below it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Layer {
    /// World-space bounds of the layer.
    pub bounds: Rect,
    /// Paint priority; higher is drawn on top.
    pub z_index: i32,
    /// Modal layers block input to everything below them, regardless of bounds.
    pub modal: bool,
}

/// Computes visibility and obstruction for elements against a viewport.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VisibilityProbe {
    /// World-space visible region.
    pub viewport: Rect,
}

impl VisibilityProbe {
    /// Create a probe for `viewport`.
    pub fn new(viewport: Rect) -> Self {
        Self { viewport }
    }

    /// The part of `bounds` inside the viewport, if it has positive area.
    ///
    /// Non-finite bounds are treated as not visible.
    pub fn visible_part(&self, bounds: Rect) -> Option<Rect> {
        if !bounds.is_finite() {
            return None;
        }
        let part = bounds.intersect(self.viewport);
        (part.width() > 0.0 && part.height() > 0.0).then_some(part)
    }

    /// Observe an element with world `bounds` painted at `z_index`.
    ///
    /// The element is obstructed when some layer in `layers` with a strictly
    /// higher z-index is modal, or fully covers the element's visible part.
    pub fn observe(&self, bounds: Rect, z_index: i32, layers: &[Layer]) -> Signal {
        let Some(part) = self.visible_part(bounds) else {
            return Signal::Visibility {
                visible: false,
                obstructed: false,
            };
        };
        let obstructed = layers
            .iter()
            .filter(|l| l.z_index > z_index)
            .any(|l| l.modal || l.bounds.intersect(part) == part);
        Signal::Visibility {
            visible: true,
            obstructed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

    fn seen(obstructed: bool) -> Signal {
        Signal::Visibility {
            visible: true,
            obstructed,
        }
    }

    #[test]
    fn outside_viewport_is_not_visible() {
        let probe = VisibilityProbe::new(VIEWPORT);
        let below_fold = Rect::new(0.0, 150.0, 50.0, 180.0);
        assert_eq!(
            probe.observe(below_fold, 0, &[]),
            Signal::Visibility {
                visible: false,
                obstructed: false
            }
        );
    }

    #[test]
    fn edge_touching_is_not_visible() {
        let probe = VisibilityProbe::new(VIEWPORT);
        // Shares only the bottom edge with the viewport: zero area.
        let touching = Rect::new(0.0, 100.0, 50.0, 120.0);
        assert!(probe.visible_part(touching).is_none());
    }

    #[test]
    fn partially_visible_counts() {
        let probe = VisibilityProbe::new(VIEWPORT);
        let straddling = Rect::new(90.0, 90.0, 120.0, 120.0);
        assert_eq!(
            probe.visible_part(straddling),
            Some(Rect::new(90.0, 90.0, 100.0, 100.0))
        );
        assert_eq!(probe.observe(straddling, 0, &[]), seen(false));
    }

    #[test]
    fn non_finite_bounds_degrade_to_hidden() {
        let probe = VisibilityProbe::new(VIEWPORT);
        let bogus = Rect::new(f64::NAN, 0.0, 10.0, 10.0);
        assert!(probe.visible_part(bogus).is_none());
    }

    #[test]
    fn covering_layer_obstructs_only_when_above() {
        let probe = VisibilityProbe::new(VIEWPORT);
        let element = Rect::new(10.0, 10.0, 20.0, 20.0);
        let sheet = Layer {
            bounds: Rect::new(0.0, 0.0, 50.0, 50.0),
            z_index: 5,
            modal: false,
        };
        assert_eq!(probe.observe(element, 0, &[sheet]), seen(true));
        assert_eq!(probe.observe(element, 5, &[sheet]), seen(false), "same z does not cover");
        assert_eq!(probe.observe(element, 9, &[sheet]), seen(false));
    }

    #[test]
    fn partial_cover_does_not_obstruct() {
        let probe = VisibilityProbe::new(VIEWPORT);
        let element = Rect::new(10.0, 10.0, 40.0, 40.0);
        let popover = Layer {
            bounds: Rect::new(30.0, 30.0, 60.0, 60.0),
            z_index: 5,
            modal: false,
        };
        assert_eq!(probe.observe(element, 0, &[popover]), seen(false));
    }

    #[test]
    fn modal_obstructs_everything_below() {
        let probe = VisibilityProbe::new(VIEWPORT);
        let element = Rect::new(80.0, 80.0, 90.0, 90.0);
        let dialog = Layer {
            bounds: Rect::new(10.0, 10.0, 30.0, 30.0),
            z_index: 50,
            modal: true,
        };
        assert_eq!(probe.observe(element, 0, &[dialog]), seen(true));
        // Content inside the dialog paints above it.
        assert_eq!(probe.observe(element, 51, &[dialog]), seen(false));
    }
}
