//! Errors found throughout this crate

use std::fmt;
use thiserror::Error;
use x11rb::{
    errors::{ConnectError, ReplyError},
    protocol::{xproto, ErrorKind},
    x11_utils::X11Error,
};

/// Errors that occur from interacting with the X-Server
#[derive(Debug, Error)]
pub(crate) enum Error {
    /// Invalid property (`Atom`) queried for
    #[error("the property {0} was not found on this server")]
    InvalidProperty(String),

    /// Failure to connect to the server
    #[error("failed to connect to the X11 server: {0}")]
    Connection(#[from] ConnectError),

    /// Somebody else already selected `SubstructureRedirect` on the root
    #[error("another window manager is already running")]
    AnotherWindowManager,

    /// A protocol error outside of the expected races
    #[error("{0}")]
    Protocol(ProtocolError),

    /// Configuration values that cannot be used
    #[error("invalid configuration: {0}")]
    Config(String),
}

// ========================== ProtocolError =========================== [[[

/// A protocol error reported by the server, reduced to what is needed to
/// decide whether it can be ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProtocolError {
    /// Kind of error
    pub(crate) kind:    ErrorKind,
    /// Major opcode of the failed request
    pub(crate) request: u8,
    /// Raw error code
    pub(crate) code:    u8,
}

impl ProtocolError {
    /// Create a new [`ProtocolError`]
    pub(crate) const fn new(kind: ErrorKind, request: u8, code: u8) -> Self {
        Self { kind, request, code }
    }

    /// Errors that happen while talking to windows which vanished in the
    /// meantime, or grabs somebody else already holds. These are expected.
    pub(crate) fn is_benign(&self) -> bool {
        match self.kind {
            ErrorKind::Window => true,
            ErrorKind::Match => matches!(
                self.request,
                xproto::CONFIGURE_WINDOW_REQUEST | xproto::SET_INPUT_FOCUS_REQUEST
            ),
            ErrorKind::Drawable => matches!(
                self.request,
                xproto::COPY_AREA_REQUEST
                    | xproto::POLY_FILL_RECTANGLE_REQUEST
                    | xproto::POLY_SEGMENT_REQUEST
                    | xproto::POLY_TEXT8_REQUEST
                    | xproto::IMAGE_TEXT8_REQUEST
            ),
            ErrorKind::Access => matches!(
                self.request,
                xproto::GRAB_BUTTON_REQUEST | xproto::GRAB_KEY_REQUEST
            ),
            _ => false,
        }
    }
}

impl From<&X11Error> for ProtocolError {
    fn from(err: &X11Error) -> Self {
        Self::new(err.error_kind, err.major_opcode, err.error_code)
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "request ({}), error ({})", self.request, self.code)
    }
}

// ]]] === ProtocolError ===

/// Find the first X11 error inside of an [`anyhow::Error`] chain
pub(crate) fn protocol_error(err: &anyhow::Error) -> Option<ProtocolError> {
    err.chain().find_map(|cause| {
        if let Some(ReplyError::X11Error(x)) = cause.downcast_ref::<ReplyError>() {
            Some(ProtocolError::from(x))
        } else if let Some(Error::Protocol(p)) = cause.downcast_ref::<Error>() {
            Some(*p)
        } else {
            None
        }
    })
}

/// Whether an error can be dropped without losing track of the server
pub(crate) fn is_benign(err: &anyhow::Error) -> bool {
    protocol_error(err).map_or(false, |p| p.is_benign())
}
