//! Properties on the server

use crate::geometry::Rectangle;

// ============================ SizeHints =============================

/// Structure representing the parts of a `WM_SIZE_HINTS` property that are
/// used to constrain client sizes
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub(crate) struct WmSizeHints {
    /// The minimum size that the window may be assigned
    pub(crate) min_size:       Option<(i32, i32)>,
    /// The maximum size that the window may be assigned
    pub(crate) max_size:       Option<(i32, i32)>,
    /// The increment to be used for sizing the window together with
    /// `base_size`
    pub(crate) size_increment: Option<(i32, i32)>,
    /// The minimum aspect ratio as `(numerator, denominator)`
    pub(crate) min_aspect:     Option<(i32, i32)>,
    /// The maximum aspect ratio as `(numerator, denominator)`
    pub(crate) max_aspect:     Option<(i32, i32)>,
    /// The base size of the window
    pub(crate) base_size:      Option<(i32, i32)>,
}

/// Size constraints cached on a client
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub(crate) struct SizeHints {
    pub(crate) base_w: i32,
    pub(crate) base_h: i32,
    pub(crate) inc_w:  i32,
    pub(crate) inc_h:  i32,
    pub(crate) max_w:  i32,
    pub(crate) max_h:  i32,
    pub(crate) min_w:  i32,
    pub(crate) min_h:  i32,
    /// Minimum aspect, height over width
    pub(crate) min_a:  f32,
    /// Maximum aspect, width over height
    pub(crate) max_a:  f32,
    /// Whether the hints were read from the client since they last changed
    pub(crate) valid:  bool,
}

impl SizeHints {
    /// Build the cache from a raw property. A missing base size falls back to
    /// the minimum size and vice-versa
    pub(crate) fn from_wm(hints: &WmSizeHints) -> Self {
        let (base_w, base_h) = hints.base_size.or(hints.min_size).unwrap_or((0, 0));
        let (min_w, min_h) = hints.min_size.or(hints.base_size).unwrap_or((0, 0));
        let (inc_w, inc_h) = hints.size_increment.unwrap_or((0, 0));
        let (max_w, max_h) = hints.max_size.unwrap_or((0, 0));

        let (min_a, max_a) = match (hints.min_aspect, hints.max_aspect) {
            (Some((min_x, min_y)), Some((max_x, max_y))) if min_x != 0 && max_y != 0 =>
                (min_y as f32 / min_x as f32, max_x as f32 / max_y as f32),
            _ => (0.0, 0.0),
        };

        Self {
            base_w,
            base_h,
            inc_w: inc_w.max(0),
            inc_h: inc_h.max(0),
            max_w: max_w.max(0),
            max_h: max_h.max(0),
            min_w,
            min_h,
            min_a,
            max_a,
            valid: true,
        }
    }

    /// The client cannot be resized at all
    pub(crate) const fn is_fixed(&self) -> bool {
        self.max_w != 0 && self.max_h != 0 && self.max_w == self.min_w && self.max_h == self.min_h
    }
}

// ============================== Hints ===============================

/// The `WM_HINTS` fields the window manager acts on
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Hints {
    /// The client wants attention
    pub(crate) urgent: bool,
    /// The input hint, when present
    pub(crate) input:  Option<bool>,
}

// ======================== IcccmWindowState ==========================

/// The ICCCM `WM_STATE` of a top-level window
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum IcccmWindowState {
    /// Not mapped and not managed
    Withdrawn,
    /// Mapped
    Normal,
    /// Minimized
    Iconic,
}

impl From<IcccmWindowState> for u32 {
    fn from(state: IcccmWindowState) -> Self {
        match state {
            IcccmWindowState::Withdrawn => 0,
            IcccmWindowState::Normal => 1,
            IcccmWindowState::Iconic => 3,
        }
    }
}

impl IcccmWindowState {
    /// Convert a raw property value
    pub(crate) const fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Withdrawn),
            1 => Some(Self::Normal),
            3 => Some(Self::Iconic),
            _ => None,
        }
    }
}

// ======================== WindowAttributes ==========================

/// Attributes queried for windows that were not created through a map
/// request
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct WindowAttributes {
    /// Geometry relative to the root window
    pub(crate) geometry:          Rectangle,
    /// Border width
    pub(crate) border_width:      u32,
    /// The window asked not to be managed
    pub(crate) override_redirect: bool,
    /// The window is currently mapped
    pub(crate) viewable:          bool,
}

#[cfg(test)]
mod tests {
    use super::{IcccmWindowState, SizeHints, WmSizeHints};

    #[test]
    fn base_and_min_fall_back_to_each_other() {
        let hints = SizeHints::from_wm(&WmSizeHints {
            min_size: Some((100, 50)),
            ..WmSizeHints::default()
        });
        assert_eq!((hints.base_w, hints.base_h), (100, 50));
        assert_eq!((hints.min_w, hints.min_h), (100, 50));
        assert!(hints.valid);

        let hints = SizeHints::from_wm(&WmSizeHints {
            base_size: Some((20, 10)),
            ..WmSizeHints::default()
        });
        assert_eq!((hints.min_w, hints.min_h), (20, 10));
    }

    #[test]
    fn fixed_when_min_equals_max() {
        let hints = SizeHints::from_wm(&WmSizeHints {
            min_size: Some((300, 200)),
            max_size: Some((300, 200)),
            ..WmSizeHints::default()
        });
        assert!(hints.is_fixed());

        let hints = SizeHints::from_wm(&WmSizeHints {
            min_size: Some((300, 200)),
            max_size: Some((600, 200)),
            ..WmSizeHints::default()
        });
        assert!(!hints.is_fixed());
        assert!(!SizeHints::default().is_fixed());
    }

    #[test]
    fn zero_aspect_denominator_is_ignored() {
        let hints = SizeHints::from_wm(&WmSizeHints {
            min_aspect: Some((0, 1)),
            max_aspect: Some((16, 9)),
            ..WmSizeHints::default()
        });
        assert!(hints.min_a.abs() < f32::EPSILON);
        assert!(hints.max_a.abs() < f32::EPSILON);

        let hints = SizeHints::from_wm(&WmSizeHints {
            min_aspect: Some((4, 3)),
            max_aspect: Some((16, 9)),
            ..WmSizeHints::default()
        });
        assert!((hints.min_a - 0.75).abs() < 1e-6);
        assert!((hints.max_a - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn wm_state_values() {
        assert_eq!(u32::from(IcccmWindowState::Iconic), 3);
        assert_eq!(IcccmWindowState::from_raw(1), Some(IcccmWindowState::Normal));
        assert_eq!(IcccmWindowState::from_raw(2), None);
    }
}
