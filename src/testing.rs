//! In-memory doubles of the display server, renderer and process launcher

use crate::{
    config::{Config, Scheme},
    core::{Keycode, Keysym, Window},
    geometry::{Point, Rectangle},
    spawn::ProcessLauncher,
    wm::WindowManager,
    x::{
        event::{ConfigureRequestData, XEvent},
        keysym,
        property::{Hints, IcccmWindowState, WindowAttributes, WmSizeHints},
        render::Renderer,
        Protocol,
        XConn,
    },
};
use anyhow::{anyhow, Result};
use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
};

/// The window manager as tests drive it
pub(crate) type TestWm = WindowManager<MockConn, MockRenderer>;

/// Size of the screen when no screens are configured
const SCREEN: Rectangle = Rectangle::new(0, 0, 1000, 800);

/// First id handed out to bars
const FIRST_BAR: Window = 0x0010_0000;

/// Keysyms at shift level 0 and 1. The keycode is the index plus 10
const KEYMAP: &[(&str, &str)] = &[
    ("1", "exclam"),
    ("2", "at"),
    ("3", "numbersign"),
    ("4", "dollar"),
    ("5", "percent"),
    ("6", "6"),
    ("7", "ampersand"),
    ("8", "asterisk"),
    ("9", "parenleft"),
    ("0", "parenright"),
    ("minus", "underscore"),
    ("equal", "plus"),
    ("BackSpace", "BackSpace"),
    ("Tab", "Tab"),
    ("Return", "Return"),
    ("Escape", "Escape"),
    ("space", "space"),
    ("semicolon", "colon"),
    ("apostrophe", "quotedbl"),
    ("grave", "asciitilde"),
    ("backslash", "bar"),
    ("comma", "less"),
    ("period", "greater"),
    ("slash", "question"),
    ("bracketleft", "braceleft"),
    ("bracketright", "braceright"),
];

/// A request the window manager made
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    InitEwmh,
    Cleanup,
    Sync,
    DiscardEnterEvents,
    SetUrgency(Window, bool),
    SetFullscreenState(Window, bool),
    SetWmState(Window, IcccmWindowState),
    AppendClientList(Window),
    SetClientList(Vec<Window>),
    SelectClientInput(Window),
    ConfigureWindow(Window, Rectangle, u32),
    SendConfigureNotify(Window, Rectangle, u32),
    MoveWindow(Window, i32, i32),
    SetBorderWidth(Window, u32),
    SetBorderColor(Window, u32),
    ForwardConfigureRequest(Window),
    RaiseWindow(Window),
    StackBelow(Window, Window),
    MapWindow(Window),
    FocusWindow(Window),
    RevertFocus,
    SendProtocol(Window, Protocol),
    KillClient(Window),
    GrabServer,
    UngrabServer,
    AllowReplayPointer,
    CreateBar(Rectangle),
    DestroyWindow(Window),
    RefreshKeyboardMapping,
    UngrabAllKeys,
    GrabKey(Keycode, u16),
    GrabAnyKey,
    UngrabAllButtons(Window),
    GrabAnyButton(Window),
    GrabButton(Window, u8, u16),
}

/// What the server knows about a window
#[derive(Debug, Clone)]
pub(crate) struct MockWindow {
    pub(crate) geometry:          Rectangle,
    pub(crate) viewable:          bool,
    pub(crate) override_redirect: bool,
    pub(crate) wm_state:          Option<IcccmWindowState>,
    pub(crate) transient_for:     Option<Window>,
    pub(crate) title:             Option<String>,
    pub(crate) size_hints:        Option<WmSizeHints>,
    pub(crate) hints:             Option<Hints>,
    pub(crate) fullscreen:        bool,
    pub(crate) dialog:            bool,
    pub(crate) protocols:         Vec<Protocol>,
}

impl MockWindow {
    fn new(geometry: Rectangle) -> Self {
        Self {
            geometry,
            viewable: true,
            override_redirect: false,
            wm_state: None,
            transient_for: None,
            title: None,
            size_hints: None,
            hints: None,
            fullscreen: false,
            dialog: false,
            protocols: vec![],
        }
    }
}

// ============================= MockConn ============================= [[[

/// A display server that only remembers what it was asked to do
#[derive(Debug)]
pub(crate) struct MockConn {
    calls:     RefCell<Vec<Call>>,
    windows:   HashMap<Window, MockWindow>,
    events:    VecDeque<XEvent>,
    pointer:   Point,
    screens:   Option<Vec<Rectangle>>,
    root_name: Option<String>,
    next_bar:  Cell<Window>,
    keymap:    Vec<(Keysym, Keysym)>,
}

impl MockConn {
    /// Create a new [`MockConn`], with Xinerama reporting `screens`
    pub(crate) fn new(screens: Option<Vec<Rectangle>>) -> Self {
        let name = |n: &str| keysym::from_name(n).expect("keysym in the mock keymap");
        let mut keymap = KEYMAP
            .iter()
            .map(|(lower, upper)| (name(lower), name(upper)))
            .collect::<Vec<_>>();
        keymap.extend((b'a'..=b'z').map(|c| (Keysym::from(c), Keysym::from(c.to_ascii_uppercase()))));

        Self {
            calls: RefCell::new(vec![]),
            windows: HashMap::new(),
            events: VecDeque::new(),
            pointer: Point::default(),
            screens,
            root_name: None,
            next_bar: Cell::new(FIRST_BAR),
            keymap,
        }
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.borrow_mut().push(call);
        Ok(())
    }

    /// Every request made so far
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Forget the requests made so far
    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Create a top-level window
    pub(crate) fn add_window(&mut self, window: Window, geometry: Rectangle) {
        self.windows.insert(window, MockWindow::new(geometry));
    }

    /// Whether a window exists
    pub(crate) fn has_window(&self, window: Window) -> bool {
        self.windows.contains_key(&window)
    }

    /// Server-side state of a window
    pub(crate) fn window_mut(&mut self, window: Window) -> &mut MockWindow {
        self.windows
            .get_mut(&window)
            .expect("window was added to the mock")
    }

    /// Queue an event for `next_event`
    pub(crate) fn push_event(&mut self, event: XEvent) {
        self.events.push_back(event);
    }

    /// Move the pointer
    pub(crate) fn set_pointer(&mut self, point: Point) {
        self.pointer = point;
    }

    /// Change what Xinerama reports
    pub(crate) fn set_screens(&mut self, screens: Option<Vec<Rectangle>>) {
        self.screens = screens;
    }

    /// Set `WM_NAME` of the root window
    pub(crate) fn set_root_name(&mut self, name: Option<String>) {
        self.root_name = name;
    }

    /// The keycode producing a keysym without shift
    pub(crate) fn keycode_of(&self, sym: Keysym) -> Keycode {
        let idx = self
            .keymap
            .iter()
            .position(|&(lower, _)| lower == sym)
            .expect("keysym in the mock keymap");
        10 + idx as Keycode
    }

    fn window(&self, window: Window) -> Option<&MockWindow> {
        self.windows.get(&window)
    }
}

impl XConn for MockConn {
    fn root(&self) -> Window {
        1
    }

    fn screen_rect(&self) -> Rectangle {
        match &self.screens {
            Some(screens) if !screens.is_empty() => {
                let right = screens.iter().map(Rectangle::right).max().unwrap_or(0);
                let bottom = screens.iter().map(Rectangle::bottom).max().unwrap_or(0);
                Rectangle::new(0, 0, right, bottom)
            },
            _ => SCREEN,
        }
    }

    fn init_ewmh(&mut self) -> Result<()> {
        self.record(Call::InitEwmh)
    }

    fn cleanup(&self) -> Result<()> {
        self.record(Call::Cleanup)
    }

    fn next_event(&mut self) -> Result<XEvent> {
        self.events
            .pop_front()
            .ok_or_else(|| anyhow!("no more events"))
    }

    fn sync(&self) -> Result<()> {
        self.record(Call::Sync)
    }

    fn discard_enter_events(&mut self) -> Result<()> {
        self.record(Call::DiscardEnterEvents)
    }

    fn screens(&self) -> Result<Option<Vec<Rectangle>>> {
        Ok(self.screens.clone())
    }

    fn query_pointer(&self) -> Result<Option<Point>> {
        Ok(Some(self.pointer))
    }

    fn top_level_windows(&self) -> Result<Vec<Window>> {
        let mut windows = self.windows.keys().copied().collect::<Vec<_>>();
        windows.sort_unstable();
        Ok(windows)
    }

    fn window_attributes(&self, window: Window) -> Option<WindowAttributes> {
        self.window(window).map(|w| WindowAttributes {
            geometry:          w.geometry,
            border_width:      0,
            override_redirect: w.override_redirect,
            viewable:          w.viewable,
        })
    }

    fn wm_state(&self, window: Window) -> Option<IcccmWindowState> {
        self.window(window).and_then(|w| w.wm_state)
    }

    fn transient_for(&self, window: Window) -> Option<Window> {
        self.window(window).and_then(|w| w.transient_for)
    }

    fn window_title(&self, window: Window) -> Option<String> {
        self.window(window).and_then(|w| w.title.clone())
    }

    fn root_name(&self) -> Option<String> {
        self.root_name.clone()
    }

    fn size_hints(&self, window: Window) -> Option<WmSizeHints> {
        self.window(window).and_then(|w| w.size_hints)
    }

    fn wm_hints(&self, window: Window) -> Option<Hints> {
        self.window(window).and_then(|w| w.hints)
    }

    fn window_is_fullscreen(&self, window: Window) -> bool {
        self.window(window).map_or(false, |w| w.fullscreen)
    }

    fn window_is_dialog(&self, window: Window) -> bool {
        self.window(window).map_or(false, |w| w.dialog)
    }

    fn supports_protocol(&self, window: Window, protocol: Protocol) -> bool {
        self.window(window)
            .map_or(false, |w| w.protocols.contains(&protocol))
    }

    fn set_urgency(&self, window: Window, urgent: bool) -> Result<()> {
        self.record(Call::SetUrgency(window, urgent))
    }

    fn set_fullscreen_state(&self, window: Window, fullscreen: bool) -> Result<()> {
        self.record(Call::SetFullscreenState(window, fullscreen))
    }

    fn set_wm_state(&self, window: Window, state: IcccmWindowState) -> Result<()> {
        self.record(Call::SetWmState(window, state))
    }

    fn append_client_list(&self, window: Window) -> Result<()> {
        self.record(Call::AppendClientList(window))
    }

    fn set_client_list(&self, windows: &[Window]) -> Result<()> {
        self.record(Call::SetClientList(windows.to_vec()))
    }

    fn select_client_input(&self, window: Window) -> Result<()> {
        self.record(Call::SelectClientInput(window))
    }

    fn configure_window(&self, window: Window, rect: Rectangle, border: u32) -> Result<()> {
        self.record(Call::ConfigureWindow(window, rect, border))
    }

    fn send_configure_notify(&self, window: Window, rect: Rectangle, border: u32) -> Result<()> {
        self.record(Call::SendConfigureNotify(window, rect, border))
    }

    fn move_window(&self, window: Window, x: i32, y: i32) -> Result<()> {
        self.record(Call::MoveWindow(window, x, y))
    }

    fn set_border_width(&self, window: Window, width: u32) -> Result<()> {
        self.record(Call::SetBorderWidth(window, width))
    }

    fn set_border_color(&self, window: Window, color: u32) -> Result<()> {
        self.record(Call::SetBorderColor(window, color))
    }

    fn forward_configure_request(&self, request: &ConfigureRequestData) -> Result<()> {
        self.record(Call::ForwardConfigureRequest(request.window))
    }

    fn raise_window(&self, window: Window) -> Result<()> {
        self.record(Call::RaiseWindow(window))
    }

    fn stack_below(&self, window: Window, sibling: Window) -> Result<()> {
        self.record(Call::StackBelow(window, sibling))
    }

    fn map_window(&self, window: Window) -> Result<()> {
        self.record(Call::MapWindow(window))
    }

    fn focus_window(&self, window: Window) -> Result<()> {
        self.record(Call::FocusWindow(window))
    }

    fn revert_focus(&self) -> Result<()> {
        self.record(Call::RevertFocus)
    }

    fn send_protocol(&self, window: Window, protocol: Protocol) -> Result<bool> {
        self.record(Call::SendProtocol(window, protocol))?;
        Ok(self.supports_protocol(window, protocol))
    }

    fn kill_client(&self, window: Window) -> Result<()> {
        self.record(Call::KillClient(window))
    }

    fn grab_server(&self) -> Result<()> {
        self.record(Call::GrabServer)
    }

    fn ungrab_server(&self) -> Result<()> {
        self.record(Call::UngrabServer)
    }

    fn allow_replay_pointer(&self) -> Result<()> {
        self.record(Call::AllowReplayPointer)
    }

    fn create_bar(&self, rect: Rectangle) -> Result<Window> {
        self.record(Call::CreateBar(rect))?;
        let bar = self.next_bar.get();
        self.next_bar.set(bar + 1);
        Ok(bar)
    }

    fn destroy_window(&self, window: Window) -> Result<()> {
        self.record(Call::DestroyWindow(window))
    }

    fn numlock_mask(&self) -> Result<u16> {
        Ok(0x10)
    }

    fn keycode_to_keysym(&self, keycode: Keycode, shifted: bool) -> Keysym {
        usize::from(keycode)
            .checked_sub(10)
            .and_then(|idx| self.keymap.get(idx))
            .map_or(0, |&(lower, upper)| if shifted { upper } else { lower })
    }

    fn keysym_to_keycodes(&self, sym: Keysym) -> Vec<Keycode> {
        self.keymap
            .iter()
            .enumerate()
            .filter(|(_, &(lower, upper))| lower == sym || upper == sym)
            .map(|(idx, _)| 10 + idx as Keycode)
            .collect()
    }

    fn refresh_keyboard_mapping(&mut self) -> Result<()> {
        self.record(Call::RefreshKeyboardMapping)
    }

    fn ungrab_all_keys(&self) -> Result<()> {
        self.record(Call::UngrabAllKeys)
    }

    fn grab_key(&self, keycode: Keycode, modifiers: u16) -> Result<()> {
        self.record(Call::GrabKey(keycode, modifiers))
    }

    fn grab_any_key(&self) -> Result<()> {
        self.record(Call::GrabAnyKey)
    }

    fn ungrab_all_buttons(&self, window: Window) -> Result<()> {
        self.record(Call::UngrabAllButtons(window))
    }

    fn grab_any_button(&self, window: Window) -> Result<()> {
        self.record(Call::GrabAnyButton(window))
    }

    fn grab_button(&self, window: Window, button: u8, modifiers: u16) -> Result<()> {
        self.record(Call::GrabButton(window, button, modifiers))
    }
}

// ]]] === MockConn ===

// =========================== MockRenderer =========================== [[[

/// A draw command
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Draw {
    Text {
        x:      i32,
        w:      i32,
        text:   String,
        invert: bool,
        fg:     u32,
    },
    Rect {
        x:      i32,
        w:      i32,
        filled: bool,
        invert: bool,
    },
    Map(Window),
}

/// Measures text at 6 pixels per character and records what is drawn
#[derive(Debug)]
pub(crate) struct MockRenderer {
    scheme: Scheme,
    draws:  Vec<Draw>,
}

impl MockRenderer {
    /// Create a new [`MockRenderer`]
    pub(crate) const fn new() -> Self {
        Self {
            scheme: Scheme::NORMAL,
            draws:  vec![],
        }
    }

    /// Everything drawn so far
    pub(crate) fn draws(&self) -> &[Draw] {
        &self.draws
    }

    /// Forget what was drawn
    pub(crate) fn clear(&mut self) {
        self.draws.clear();
    }
}

impl Renderer for MockRenderer {
    fn set_scheme(&mut self, scheme: &Scheme) {
        self.scheme = *scheme;
    }

    fn text(
        &mut self,
        x: i32,
        _y: i32,
        w: i32,
        _h: i32,
        _pad: i32,
        text: &str,
        invert: bool,
    ) -> Result<i32> {
        self.draws.push(Draw::Text {
            x,
            w,
            text: text.to_owned(),
            invert,
            fg: self.scheme.fg,
        });
        Ok(x + w)
    }

    fn rect(&mut self, x: i32, _y: i32, w: i32, _h: i32, filled: bool, invert: bool) -> Result<()> {
        self.draws.push(Draw::Rect {
            x,
            w,
            filled,
            invert,
        });
        Ok(())
    }

    fn map(&mut self, window: Window, _x: i32, _y: i32, _w: i32, _h: i32) -> Result<()> {
        self.draws.push(Draw::Map(window));
        Ok(())
    }

    fn text_width(&self, text: &str) -> i32 {
        6 * text.chars().count() as i32
    }

    fn line_height(&self) -> i32 {
        12
    }

    fn resize(&mut self, _w: i32, _h: i32) -> Result<()> {
        Ok(())
    }
}

// ]]] === MockRenderer ===

thread_local! {
    /// Commands started through [`NullLauncher`] on this thread
    static SPAWNED: RefCell<Vec<Vec<String>>> = RefCell::new(vec![]);
}

/// Records commands instead of running them
#[derive(Debug, Clone, Copy)]
pub(crate) struct NullLauncher;

impl ProcessLauncher for NullLauncher {
    fn spawn(&self, argv: &[String]) -> Result<()> {
        if argv.is_empty() {
            return Err(anyhow!("cannot spawn an empty command"));
        }
        SPAWNED.with(|s| s.borrow_mut().push(argv.to_vec()));
        Ok(())
    }
}

/// Commands spawned by the current test
pub(crate) fn spawned() -> Vec<Vec<String>> {
    SPAWNED.with(|s| s.borrow().clone())
}

/// A window manager that went through setup with the default configuration
pub(crate) fn window_manager(screens: Option<Vec<Rectangle>>) -> TestWm {
    let mut wm = WindowManager::new(
        MockConn::new(screens),
        MockRenderer::new(),
        Config::default(),
        Box::new(NullLauncher),
    );
    wm.setup().expect("setup against the mock");
    wm
}

/// Have a window ask to be mapped. Windows that were not added yet get a
/// 100x100 geometry at the origin
pub(crate) fn map(wm: &mut TestWm, window: Window) {
    if !wm.conn.has_window(window) {
        wm.conn.add_window(window, Rectangle::new(0, 0, 100, 100));
    }
    wm.handle_event(XEvent::MapRequest(window))
        .expect("map request against the mock");
}
