//! X11 Events

use crate::{core::Window, error::ProtocolError, geometry::Rectangle};
use x11rb::protocol::xproto::StackMode;

// ============================== XEvent ==============================

/// Low-level wrapper around X-server events
///
/// Only the fields the window manager reacts to are kept
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum XEvent {
    /// A mouse button was pressed
    ButtonPress(ButtonEvent),
    /// A client message was received and understood
    ClientMessage(ClientRequest),
    /// Notification that a window changed its configuration
    ConfigureNotify(ConfigureEvent),
    /// Request for configuration from a client
    ConfigureRequest(ConfigureRequestData),
    /// A window was destroyed
    DestroyNotify(Window),
    /// The pointer entered a window
    EnterNotify(CrossingEvent),
    /// Part of a window has to be redrawn
    Expose {
        /// The exposed window
        window: Window,
        /// Number of expose events that follow
        count:  u16,
    },
    /// A window received the input focus
    FocusIn(Window),
    /// A key combination was pressed
    KeyPress(KeyEvent),
    /// The keyboard or modifier mapping changed
    MappingNotify {
        /// The keyboard mapping changed, as opposed to the pointer or
        /// modifier mapping
        keyboard: bool,
    },
    /// A client is requesting to be mapped
    MapRequest(Window),
    /// The pointer moved on the root window
    MotionNotify {
        /// Window the event was reported on
        window: Window,
        /// Pointer position relative to root
        x:      i32,
        /// Pointer position relative to root
        y:      i32,
    },
    /// A window property was changed
    PropertyNotify(PropertyEvent),
    /// A window was unmapped
    UnmapNotify {
        /// The unmapped window
        window:    Window,
        /// Sent by a client with `SendEvent`
        synthetic: bool,
    },
    /// An asynchronous error for a request without a reply
    Error(ProtocolError),
    /// Catchall for events that are not tracked
    Unknown,
}

/// Data associated with a button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ButtonEvent {
    /// The window the press was reported on
    pub(crate) window: Window,
    /// Button index
    pub(crate) button: u8,
    /// Held modifiers
    pub(crate) state:  u16,
    /// Pointer position relative to `window`
    pub(crate) x:      i32,
    /// Pointer position relative to `window`
    pub(crate) y:      i32,
}

/// Data associated with a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct KeyEvent {
    /// Physical key
    pub(crate) keycode: u8,
    /// Held modifiers
    pub(crate) state:   u16,
}

/// Data associated with an enter event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CrossingEvent {
    /// The window the pointer entered
    pub(crate) window:   Window,
    /// The crossing was not caused by a grab
    pub(crate) normal:   bool,
    /// The pointer came from a child window
    pub(crate) inferior: bool,
}

/// Data associated with a configure event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConfigureEvent {
    /// The window associated with the event
    pub(crate) window: Window,
    /// The new geometry of the window
    pub(crate) geom:   Rectangle,
}

/// Data associated with a configure request. Fields missing from the
/// request's value mask are `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ConfigureRequestData {
    /// The window associated with the event
    pub(crate) window:       Window,
    /// X coordinate to configure to
    pub(crate) x:            Option<i32>,
    /// Y coordinate to configure to
    pub(crate) y:            Option<i32>,
    /// Window width to configure to
    pub(crate) width:        Option<i32>,
    /// Window height to configure to
    pub(crate) height:       Option<i32>,
    /// Border width to configure to
    pub(crate) border_width: Option<u32>,
    /// Sibling window to stack relative to
    pub(crate) sibling:      Option<Window>,
    /// Stacking relative to `sibling`
    pub(crate) stack_mode:   Option<StackMode>,
}

/// Property changes that have a meaning to the window manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Property {
    /// `WM_NAME` or `_NET_WM_NAME`
    Title,
    /// `WM_TRANSIENT_FOR`
    TransientFor,
    /// `WM_NORMAL_HINTS`
    NormalHints,
    /// `WM_HINTS`
    Hints,
    /// `_NET_WM_WINDOW_TYPE`
    WindowType,
    /// Anything else
    Other,
}

/// Data associated with a property change event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PropertyEvent {
    /// The window associated with the event
    pub(crate) window:  Window,
    /// Which property changed
    pub(crate) atom:    Property,
    /// The property was deleted rather than changed
    pub(crate) deleted: bool,
}

/// `_NET_WM_STATE` actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StateAction {
    /// `_NET_WM_STATE_REMOVE`
    Remove,
    /// `_NET_WM_STATE_ADD`
    Add,
    /// `_NET_WM_STATE_TOGGLE`
    Toggle,
}

impl StateAction {
    /// Convert the first data field of the client message
    pub(crate) const fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Remove),
            1 => Some(Self::Add),
            2 => Some(Self::Toggle),
            _ => None,
        }
    }

    /// Resulting state given the current one
    pub(crate) const fn apply(self, current: bool) -> bool {
        match self {
            Self::Remove => false,
            Self::Add => true,
            Self::Toggle => !current,
        }
    }
}

/// Client messages the window manager honors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClientRequest {
    /// A `_NET_WM_STATE` message naming `_NET_WM_STATE_FULLSCREEN`
    Fullscreen {
        /// Window the message is about
        window: Window,
        /// What to do
        action: StateAction,
    },
    /// A `_NET_ACTIVE_WINDOW` message
    Activate(Window),
}

#[cfg(test)]
mod tests {
    use super::StateAction;

    #[test]
    fn state_actions() {
        assert_eq!(StateAction::from_raw(2), Some(StateAction::Toggle));
        assert_eq!(StateAction::from_raw(7), None);
        assert!(StateAction::Toggle.apply(false));
        assert!(!StateAction::Toggle.apply(true));
        assert!(StateAction::Add.apply(true));
        assert!(!StateAction::Remove.apply(true));
    }
}
