//! Various utilities specifically dealing with X

use crate::error::ProtocolError;
use x11rb::{connection::RequestConnection, cookie::VoidCookie, errors::ReplyError};

// ============================ CookieExt =============================

/// Check a request without a reply, letting the expected races through
pub(crate) trait CookieExt {
    /// Like `check`, but errors the window manager is expected to run into
    /// (a window vanishing between two requests) count as success
    fn check_benign(self) -> Result<(), ReplyError>;
}

impl<C: RequestConnection> CookieExt for VoidCookie<'_, C> {
    fn check_benign(self) -> Result<(), ReplyError> {
        filter_benign(self.check())
    }
}

/// Swallow benign X11 errors from a checked request
pub(crate) fn filter_benign(res: Result<(), ReplyError>) -> Result<(), ReplyError> {
    match res {
        Err(ReplyError::X11Error(ref err)) if ProtocolError::from(err).is_benign() => {
            log::debug!(
                "ignoring {:?} error for request {}",
                err.error_kind,
                err.major_opcode
            );
            Ok(())
        },
        res => res,
    }
}
