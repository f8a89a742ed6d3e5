//! Base types used throughout [`swm`]

#![allow(clippy::missing_docs_in_private_items)]

// Re-export
pub(crate) use x11rb::protocol::xproto::{Atom, Keycode, Window};

/// A keyboard symbol as defined by `X11/keysymdef.h`
pub(crate) type Keysym = u32;
/// Bitmask of the tags a client is shown on
pub(crate) type TagMask = u32;
/// Index of a monitor in the registry
pub(crate) type MonitorId = usize;

/// Window manager's name
#[macro_export]
macro_rules! WM_NAME (
    () => { "swm" };
);

/// Horizontal text padding on the bar. Clients are never smaller than this
/// plus two pixels
pub(crate) const PADDING: i32 = 6;
/// Horizontal outer gap
pub(crate) const GAP_OUTER_H: i32 = 8;
/// Vertical outer gap
pub(crate) const GAP_OUTER_V: i32 = 8;
/// Horizontal inner gap
pub(crate) const GAP_INNER_H: i32 = 12;
/// Vertical inner gap
pub(crate) const GAP_INNER_V: i32 = 12;

/// Longest client name kept, in bytes
pub(crate) const NAME_LIMIT: usize = 256;
/// Text shown in the status area when the root window has no name
pub(crate) const DEFAULT_STATUS: &str = WM_NAME!();
/// Placeholder for clients without a readable name
pub(crate) const BROKEN: &str = "broken";

/// Mask covering every configured tag
pub(crate) const fn tag_mask(ntags: usize) -> TagMask {
    if ntags >= 32 {
        TagMask::MAX
    } else {
        (1 << ntags) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::tag_mask;

    #[test]
    fn tag_mask_covers_every_tag() {
        assert_eq!(tag_mask(1), 0b1);
        assert_eq!(tag_mask(9), 0x1ff);
        assert_eq!(tag_mask(32), u32::MAX);
    }
}
