//! Everything that talks to the X-Server
//!
//! The window manager only ever goes through [`XConn`], which lets the core
//! run against an in-memory double in tests.

pub(crate) mod event;
pub(crate) mod input;
pub(crate) mod keysym;
pub(crate) mod property;
pub(crate) mod render;
pub(crate) mod utils;
pub(crate) mod xconnection;

use crate::{
    core::{Keycode, Keysym, Window},
    geometry::{Point, Rectangle},
};
use anyhow::Result;
use event::{ConfigureRequestData, XEvent};
use property::{Hints, IcccmWindowState, WindowAttributes, WmSizeHints};

/// `WM_PROTOCOLS` a client may take part in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Protocol {
    /// `WM_DELETE_WINDOW`
    Delete,
    /// `WM_TAKE_FOCUS`
    TakeFocus,
}

/// Requests and queries the window manager issues against the display
pub(crate) trait XConn {
    // ========================= Accessor ========================= [[[

    /// The root window
    fn root(&self) -> Window;

    /// Size of the whole screen
    fn screen_rect(&self) -> Rectangle;

    // ]]] === Accessor ===

    // ======================== Initialize ======================== [[[

    /// Advertise EWMH support, select events on the root window and set the
    /// cursor
    fn init_ewmh(&mut self) -> Result<()>;

    /// Undo everything [`init_ewmh`](XConn::init_ewmh) did and give the focus
    /// back to the pointer root
    fn cleanup(&self) -> Result<()>;

    // ]]] === Initialize ===

    // ========================== Events ========================== [[[

    /// Block until the next event arrives
    fn next_event(&mut self) -> Result<XEvent>;

    /// Flush requests and wait for the server to process them
    fn sync(&self) -> Result<()>;

    /// Drop queued `EnterNotify` events, which are caused by restacking
    fn discard_enter_events(&mut self) -> Result<()>;

    // ]]] === Events ===

    // ========================= Retrieve ========================= [[[

    /// Rectangles of the physical screens, `None` when Xinerama is not active
    fn screens(&self) -> Result<Option<Vec<Rectangle>>>;

    /// Pointer position relative to the root window
    fn query_pointer(&self) -> Result<Option<Point>>;

    /// Children of the root window, bottom to top
    fn top_level_windows(&self) -> Result<Vec<Window>>;

    /// Attributes and geometry of a window that has not been managed yet
    fn window_attributes(&self, window: Window) -> Option<WindowAttributes>;

    /// `WM_STATE`
    fn wm_state(&self, window: Window) -> Option<IcccmWindowState>;

    /// `WM_TRANSIENT_FOR`
    fn transient_for(&self, window: Window) -> Option<Window>;

    /// `_NET_WM_NAME`, falling back to `WM_NAME`
    fn window_title(&self, window: Window) -> Option<String>;

    /// `WM_NAME` of the root window, used as status text
    fn root_name(&self) -> Option<String>;

    /// `WM_NORMAL_HINTS`
    fn size_hints(&self, window: Window) -> Option<WmSizeHints>;

    /// `WM_HINTS`
    fn wm_hints(&self, window: Window) -> Option<Hints>;

    /// `_NET_WM_STATE` contains `_NET_WM_STATE_FULLSCREEN`
    fn window_is_fullscreen(&self, window: Window) -> bool;

    /// `_NET_WM_WINDOW_TYPE` is `_NET_WM_WINDOW_TYPE_DIALOG`
    fn window_is_dialog(&self, window: Window) -> bool;

    /// `WM_PROTOCOLS` lists the protocol
    fn supports_protocol(&self, window: Window, protocol: Protocol) -> bool;

    // ]]] === Retrieve ===

    // =========================== Set ============================ [[[

    /// Set or clear the urgency flag in `WM_HINTS`
    fn set_urgency(&self, window: Window, urgent: bool) -> Result<()>;

    /// Replace `_NET_WM_STATE` with either fullscreen or nothing
    fn set_fullscreen_state(&self, window: Window, fullscreen: bool) -> Result<()>;

    /// Set `WM_STATE`
    fn set_wm_state(&self, window: Window, state: IcccmWindowState) -> Result<()>;

    /// Append a window to `_NET_CLIENT_LIST`
    fn append_client_list(&self, window: Window) -> Result<()>;

    /// Replace `_NET_CLIENT_LIST`
    fn set_client_list(&self, windows: &[Window]) -> Result<()>;

    // ]]] === Set ===

    // ========================= Actions ========================== [[[

    /// Select the events needed from a managed client
    fn select_client_input(&self, window: Window) -> Result<()>;

    /// Move and resize a window, setting its border width
    fn configure_window(&self, window: Window, rect: Rectangle, border: u32) -> Result<()>;

    /// Tell a client its geometry with a synthetic `ConfigureNotify`
    fn send_configure_notify(&self, window: Window, rect: Rectangle, border: u32) -> Result<()>;

    /// Move a window without resizing it
    fn move_window(&self, window: Window, x: i32, y: i32) -> Result<()>;

    /// Set the border width of a window
    fn set_border_width(&self, window: Window, width: u32) -> Result<()>;

    /// Set the border color of a window
    fn set_border_color(&self, window: Window, color: u32) -> Result<()>;

    /// Apply a configure request as-is
    fn forward_configure_request(&self, request: &ConfigureRequestData) -> Result<()>;

    /// Put a window above its siblings
    fn raise_window(&self, window: Window) -> Result<()>;

    /// Put a window directly below a sibling
    fn stack_below(&self, window: Window, sibling: Window) -> Result<()>;

    /// Map a window
    fn map_window(&self, window: Window) -> Result<()>;

    /// Give the input focus to a window and advertise it as active
    fn focus_window(&self, window: Window) -> Result<()>;

    /// Give the input focus back to the pointer root and clear
    /// `_NET_ACTIVE_WINDOW`
    fn revert_focus(&self) -> Result<()>;

    /// Send a `WM_PROTOCOLS` message if the client supports it. Returns
    /// whether it was sent
    fn send_protocol(&self, window: Window, protocol: Protocol) -> Result<bool>;

    /// Forcefully disconnect the client owning the window
    fn kill_client(&self, window: Window) -> Result<()>;

    /// Grab the server
    fn grab_server(&self) -> Result<()>;

    /// Ungrab the server
    fn ungrab_server(&self) -> Result<()>;

    /// Replay a pointer event frozen by a synchronous button grab
    fn allow_replay_pointer(&self) -> Result<()>;

    /// Create an override-redirect window for a bar
    fn create_bar(&self, rect: Rectangle) -> Result<Window>;

    /// Destroy a window the window manager created
    fn destroy_window(&self, window: Window) -> Result<()>;

    // ]]] === Actions ===

    // ========================= Keyboard ========================= [[[

    /// The modifier bit Num_Lock is mapped to, or `0`
    fn numlock_mask(&self) -> Result<u16>;

    /// Keysym produced by a keycode at shift level 0 or 1
    fn keycode_to_keysym(&self, keycode: Keycode, shifted: bool) -> Keysym;

    /// Keycodes producing a keysym
    fn keysym_to_keycodes(&self, keysym: Keysym) -> Vec<Keycode>;

    /// Reload the keyboard mapping after a `MappingNotify`
    fn refresh_keyboard_mapping(&mut self) -> Result<()>;

    // ]]] === Keyboard ===

    // ======================== Grab / Ungrab ===================== [[[

    /// Release every key grab on the root window
    fn ungrab_all_keys(&self) -> Result<()>;

    /// Grab a key with the given modifiers on the root window
    fn grab_key(&self, keycode: Keycode, modifiers: u16) -> Result<()>;

    /// Grab every key on the root window
    fn grab_any_key(&self) -> Result<()>;

    /// Release every button grab on a window
    fn ungrab_all_buttons(&self, window: Window) -> Result<()>;

    /// Grab every button synchronously so the first click can be replayed
    fn grab_any_button(&self, window: Window) -> Result<()>;

    /// Grab a button with the given modifiers
    fn grab_button(&self, window: Window, button: u8, modifiers: u16) -> Result<()>;

    // ]]] === Grab/Ungrab ===
}
