//! The connection to the X-Server

use super::{
    event::{
        ButtonEvent,
        ClientRequest,
        ConfigureEvent,
        ConfigureRequestData,
        CrossingEvent,
        KeyEvent,
        Property,
        PropertyEvent,
        StateAction,
        XEvent,
    },
    keysym::XK_NUM_LOCK,
    property::{Hints, IcccmWindowState, WindowAttributes, WmSizeHints},
    utils::CookieExt,
    Protocol,
    XConn,
};
use crate::{
    core::{Atom, Keycode, Keysym, Window},
    error::{Error, ProtocolError},
    geometry::{Point, Rectangle},
};
use anyhow::{Context, Result};
use itertools::Itertools;
use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use std::{collections::VecDeque, os::unix::io::AsRawFd, sync::Arc};
use x11rb::{
    atom_manager,
    connection::Connection,
    cursor::Handle as CursorHandle,
    errors::ReplyError,
    properties,
    protocol::{
        xinerama::ConnectionExt as _,
        xproto::{
            self,
            AtomEnum,
            ButtonIndex,
            ChangeWindowAttributesAux,
            ClientMessageEvent,
            ConfigWindow,
            ConfigureWindowAux,
            ConnectionExt,
            CreateWindowAux,
            EventMask,
            GrabMode,
            InputFocus,
            MapState,
            Mapping,
            ModMask,
            NotifyDetail,
            NotifyMode,
            PropMode,
            StackMode,
            WindowClass,
        },
        ErrorKind,
        Event,
    },
    resource_manager::Database,
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
};

// =============================== Atoms ============================== [[[

atom_manager! {
    pub(crate) Atoms: AtomsCookie {
        UTF8_STRING,

        // ================ ICCCM properties =============== [[[
        WM_PROTOCOLS,
        WM_DELETE_WINDOW,
        WM_STATE,
        WM_TAKE_FOCUS, // ]]]

        // ================ EWMH properties ================ [[[
        _NET_ACTIVE_WINDOW,
        _NET_SUPPORTED,
        _NET_WM_NAME,
        _NET_WM_STATE,
        _NET_SUPPORTING_WM_CHECK,
        _NET_WM_STATE_FULLSCREEN,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DIALOG,
        _NET_CLIENT_LIST, // ]]]
    }
}

impl Atoms {
    /// Everything advertised in `_NET_SUPPORTED`
    fn supported(&self) -> [Atom; 9] {
        [
            self._NET_ACTIVE_WINDOW,
            self._NET_SUPPORTED,
            self._NET_WM_NAME,
            self._NET_WM_STATE,
            self._NET_SUPPORTING_WM_CHECK,
            self._NET_WM_STATE_FULLSCREEN,
            self._NET_WM_WINDOW_TYPE,
            self._NET_WM_WINDOW_TYPE_DIALOG,
            self._NET_CLIENT_LIST,
        ]
    }
}

// ]]] === Atoms ===

/// Events selected on the root window
fn root_event_mask() -> EventMask {
    EventMask::BUTTON_PRESS
        | EventMask::ENTER_WINDOW
        | EventMask::LEAVE_WINDOW
        | EventMask::POINTER_MOTION
        | EventMask::PROPERTY_CHANGE
        | EventMask::STRUCTURE_NOTIFY
        | EventMask::SUBSTRUCTURE_NOTIFY
        | EventMask::SUBSTRUCTURE_REDIRECT
}

/// Events selected on managed clients
fn client_event_mask() -> EventMask {
    EventMask::ENTER_WINDOW
        | EventMask::FOCUS_CHANGE
        | EventMask::PROPERTY_CHANGE
        | EventMask::STRUCTURE_NOTIFY
}

/// Events a passive button grab reports
fn button_mask() -> u16 {
    u32::from(EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE) as u16
}

/// `WM_CLASS` value: instance then class, each NUL-terminated
fn wm_class(instance: &str, class: &str) -> Vec<u8> {
    let mut value = Vec::with_capacity(instance.len() + class.len() + 2);
    value.extend_from_slice(instance.as_bytes());
    value.push(0);
    value.extend_from_slice(class.as_bytes());
    value.push(0);
    value
}

// ============================== Keymap ============================== [[[

/// Cached copy of the server's keyboard mapping
#[derive(Debug, Default, Clone)]
struct Keymap {
    /// First keycode of the mapping
    min_keycode:         Keycode,
    /// Number of keysyms for every keycode
    keysyms_per_keycode: usize,
    /// Flat table of keysyms
    keysyms:             Vec<Keysym>,
}

impl Keymap {
    /// Query the mapping from the server
    fn load(conn: &RustConnection) -> Result<Self> {
        let setup = conn.setup();
        let (lo, hi) = (setup.min_keycode, setup.max_keycode);
        let reply = conn
            .get_keyboard_mapping(lo, hi - lo + 1)
            .context("failed to get keyboard mapping")?
            .reply()
            .context("failed to get keyboard mapping reply")?;

        Ok(Self {
            min_keycode:         lo,
            keysyms_per_keycode: usize::from(reply.keysyms_per_keycode),
            keysyms:             reply.keysyms,
        })
    }

    /// Keysym at the given shift level
    fn keysym(&self, keycode: Keycode, level: usize) -> Keysym {
        if self.keysyms_per_keycode == 0 || keycode < self.min_keycode {
            return 0;
        }
        let idx = usize::from(keycode - self.min_keycode) * self.keysyms_per_keycode + level;
        self.keysyms.get(idx).copied().unwrap_or(0)
    }

    /// Keycodes having the keysym at any level
    fn keycodes(&self, keysym: Keysym) -> Vec<Keycode> {
        if self.keysyms_per_keycode == 0 {
            return vec![];
        }
        self.keysyms
            .iter()
            .positions(|&sym| sym == keysym)
            .filter_map(|idx| {
                let code = idx / self.keysyms_per_keycode + usize::from(self.min_keycode);
                u8::try_from(code).ok()
            })
            .unique()
            .collect()
    }
}

// ]]] === Keymap ===

// ============================ XConnection =========================== [[[

/// The main connection to the X-Server
pub(crate) struct XConnection {
    /// Connection to the X-Server
    conn:      Arc<RustConnection>,
    /// Default screen number
    screen:    usize,
    /// The root window
    root:      Window,
    /// Interned atoms
    atoms:     Atoms,
    /// `_NET_SUPPORTING_WM_CHECK` window
    check_win: Option<Window>,
    /// Keyboard mapping
    keymap:    Keymap,
    /// Events read while discarding `EnterNotify`
    pending:   VecDeque<Event>,
}

impl XConnection {
    /// Connect to the display named by `$DISPLAY` and claim the window
    /// manager role
    pub(crate) fn connect() -> Result<Self> {
        let (conn, screen) = RustConnection::connect(None).map_err(Error::Connection)?;
        let root = conn.setup().roots[screen].root;
        log::trace!("connected to screen {}, root Window({:#0x})", screen, root);

        Self::become_wm(&conn, root)?;

        if let Err(e) = fcntl(
            conn.stream().as_raw_fd(),
            FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC),
        ) {
            log::warn!("failed to set the display socket close-on-exec: {}", e);
        }

        let atoms = Atoms::new(&conn)
            .context("failed to intern atoms")?
            .reply()
            .context("failed to get atoms reply")?;
        let keymap = Keymap::load(&conn)?;

        Ok(Self {
            conn: Arc::new(conn),
            screen,
            root,
            atoms,
            check_win: None,
            keymap,
            pending: VecDeque::new(),
        })
    }

    /// Shared handle of the underlying connection
    pub(crate) fn conn(&self) -> Arc<RustConnection> {
        Arc::clone(&self.conn)
    }

    /// Default screen number
    pub(crate) const fn screen(&self) -> usize {
        self.screen
    }

    /// Select `SubstructureRedirect` on the root window, which only one client
    /// may do at a time
    fn become_wm(conn: &RustConnection, root: Window) -> Result<()> {
        log::debug!("attempting to become the window manager");
        match conn
            .change_window_attributes(
                root,
                &ChangeWindowAttributesAux::new().event_mask(EventMask::SUBSTRUCTURE_REDIRECT),
            )
            .context("failed to select SubstructureRedirect on root")?
            .check()
        {
            Err(ReplyError::X11Error(err)) if err.error_kind == ErrorKind::Access =>
                Err(Error::AnotherWindowManager.into()),
            res => res.context("failed to check selecting SubstructureRedirect"),
        }
    }

    /// Read a property of atoms
    fn atom_list(&self, window: Window, property: Atom) -> Vec<Atom> {
        self.conn
            .get_property(false, window, property, AtomEnum::ATOM, 0, 32)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .and_then(|reply| reply.value32().map(Iterator::collect))
            .unwrap_or_default()
    }

    /// Read a text property, whatever its encoding
    fn text_property(&self, window: Window, property: Atom) -> Option<String> {
        let reply = self
            .conn
            .get_property(false, window, property, AtomEnum::ANY, 0, u32::MAX)
            .ok()?
            .reply()
            .ok()?;

        if reply.format != 8 || reply.value.is_empty() {
            return None;
        }
        let text = String::from_utf8_lossy(&reply.value);
        Some(text.trim_end_matches('\0').to_owned())
    }

    /// Set the urgency flag on an existing `WM_HINTS`
    fn update_urgency(&self, window: Window, urgent: bool) -> Result<()> {
        let mut hints = match properties::WmHints::get(&*self.conn, window)
            .context("failed to request WM_HINTS")?
            .reply()
        {
            Ok(hints) => hints,
            Err(_) => return Ok(()),
        };
        hints.urgent = urgent;
        hints
            .set(&*self.conn, window)
            .context(format!("failed to set WM_HINTS on Window({:#0x})", window))?
            .check_benign()
            .context("failed to check setting WM_HINTS")?;

        Ok(())
    }

    /// Convert a raw event into the crate's representation
    fn translate(&self, event: Event) -> XEvent {
        match event {
            Event::ButtonPress(e) => XEvent::ButtonPress(ButtonEvent {
                window: e.event,
                button: e.detail,
                state:  u16::from(e.state),
                x:      i32::from(e.event_x),
                y:      i32::from(e.event_y),
            }),
            Event::ClientMessage(e) => self.translate_client_message(&e),
            Event::ConfigureNotify(e) => XEvent::ConfigureNotify(ConfigureEvent {
                window: e.window,
                geom:   Rectangle::new(
                    i32::from(e.x),
                    i32::from(e.y),
                    i32::from(e.width),
                    i32::from(e.height),
                ),
            }),
            Event::ConfigureRequest(e) => {
                let mask = u16::from(e.value_mask);
                let has = |bit: ConfigWindow| mask & u16::from(bit) != 0;
                XEvent::ConfigureRequest(ConfigureRequestData {
                    window:       e.window,
                    x:            has(ConfigWindow::X).then(|| i32::from(e.x)),
                    y:            has(ConfigWindow::Y).then(|| i32::from(e.y)),
                    width:        has(ConfigWindow::WIDTH).then(|| i32::from(e.width)),
                    height:       has(ConfigWindow::HEIGHT).then(|| i32::from(e.height)),
                    border_width: has(ConfigWindow::BORDER_WIDTH)
                        .then(|| u32::from(e.border_width)),
                    sibling:      has(ConfigWindow::SIBLING).then(|| e.sibling),
                    stack_mode:   has(ConfigWindow::STACK_MODE).then(|| e.stack_mode),
                })
            },
            Event::DestroyNotify(e) => XEvent::DestroyNotify(e.window),
            Event::EnterNotify(e) => XEvent::EnterNotify(CrossingEvent {
                window:   e.event,
                normal:   e.mode == NotifyMode::NORMAL,
                inferior: e.detail == NotifyDetail::INFERIOR,
            }),
            Event::Expose(e) => XEvent::Expose {
                window: e.window,
                count:  e.count,
            },
            Event::FocusIn(e) => XEvent::FocusIn(e.event),
            Event::KeyPress(e) => XEvent::KeyPress(KeyEvent {
                keycode: e.detail,
                state:   u16::from(e.state),
            }),
            Event::MappingNotify(e) => XEvent::MappingNotify {
                keyboard: e.request == Mapping::KEYBOARD,
            },
            Event::MapRequest(e) => XEvent::MapRequest(e.window),
            Event::MotionNotify(e) => XEvent::MotionNotify {
                window: e.event,
                x:      i32::from(e.root_x),
                y:      i32::from(e.root_y),
            },
            Event::PropertyNotify(e) => XEvent::PropertyNotify(PropertyEvent {
                window:  e.window,
                atom:    self.classify_property(e.atom),
                deleted: e.state == xproto::Property::DELETE,
            }),
            Event::UnmapNotify(e) => XEvent::UnmapNotify {
                window:    e.window,
                synthetic: e.response_type & 0x80 != 0,
            },
            Event::Error(e) => XEvent::Error(ProtocolError::from(&e)),
            _ => XEvent::Unknown,
        }
    }

    /// Decode the client messages the window manager answers to
    fn translate_client_message(&self, event: &ClientMessageEvent) -> XEvent {
        if event.format != 32 {
            return XEvent::Unknown;
        }
        let data = event.data.as_data32();

        if event.type_ == self.atoms._NET_WM_STATE {
            let fullscreen = self.atoms._NET_WM_STATE_FULLSCREEN;
            if data[1] == fullscreen || data[2] == fullscreen {
                if let Some(action) = StateAction::from_raw(data[0]) {
                    return XEvent::ClientMessage(ClientRequest::Fullscreen {
                        window: event.window,
                        action,
                    });
                }
            }
        } else if event.type_ == self.atoms._NET_ACTIVE_WINDOW {
            return XEvent::ClientMessage(ClientRequest::Activate(event.window));
        }

        XEvent::Unknown
    }

    /// Map an atom to the properties that matter
    fn classify_property(&self, atom: Atom) -> Property {
        if atom == u32::from(AtomEnum::WM_NAME) || atom == self.atoms._NET_WM_NAME {
            Property::Title
        } else if atom == u32::from(AtomEnum::WM_TRANSIENT_FOR) {
            Property::TransientFor
        } else if atom == u32::from(AtomEnum::WM_NORMAL_HINTS) {
            Property::NormalHints
        } else if atom == u32::from(AtomEnum::WM_HINTS) {
            Property::Hints
        } else if atom == self.atoms._NET_WM_WINDOW_TYPE {
            Property::WindowType
        } else {
            Property::Other
        }
    }

    /// Set the `left_ptr` cursor on the root window
    fn init_cursor(&self) -> Result<()> {
        log::debug!("initializing the cursor to `left_ptr`");
        let db = Database::new_from_default(&*self.conn).context("failed to get database")?;
        let cursor = CursorHandle::new(&*self.conn, self.screen, &db)
            .context("failed to create cursor handle")?
            .reply()
            .context("failed to get cursor handle reply")?
            .load_cursor(&*self.conn, "left_ptr")
            .context("failed to load `left_ptr`")?;

        self.conn
            .change_window_attributes(self.root, &ChangeWindowAttributesAux::new().cursor(cursor))
            .context("failed to set the root cursor")?
            .check()
            .context("failed to check setting the root cursor")?;

        Ok(())
    }

    /// Delete a property from the root window
    fn delete_root_property(&self, property: Atom) -> Result<()> {
        log::debug!("deleting root property {}", property);
        self.conn
            .delete_property(self.root, property)
            .context(format!("failed to delete property {}", property))?
            .check()
            .context(format!("failed to check deleting property {}", property))?;

        Ok(())
    }
}

impl XConn for XConnection {
    // ========================= Accessor ========================= [[[

    fn root(&self) -> Window {
        self.root
    }

    fn screen_rect(&self) -> Rectangle {
        let screen = &self.conn.setup().roots[self.screen];
        Rectangle::new(
            0,
            0,
            i32::from(screen.width_in_pixels),
            i32::from(screen.height_in_pixels),
        )
    }

    // ]]] === Accessor ===

    // ======================== Initialize ======================== [[[

    fn init_ewmh(&mut self) -> Result<()> {
        log::debug!("advertising EWMH support");
        let check = self.conn.generate_id().context("failed to generate an ID")?;
        self.conn
            .create_window(
                x11rb::COPY_DEPTH_FROM_PARENT,
                check,
                self.root,
                0,
                0,
                1,
                1,
                0,
                WindowClass::INPUT_OUTPUT,
                x11rb::COPY_FROM_PARENT,
                &CreateWindowAux::new(),
            )
            .context(format!("failed to create check Window({:#0x})", check))?
            .check()
            .context("failed to check creating the check window")?;
        self.check_win = Some(check);

        for window in [check, self.root] {
            self.conn
                .change_property32(
                    PropMode::REPLACE,
                    window,
                    self.atoms._NET_SUPPORTING_WM_CHECK,
                    AtomEnum::WINDOW,
                    &[check],
                )
                .context("failed to set `_NET_SUPPORTING_WM_CHECK`")?
                .check()
                .context("failed to check setting `_NET_SUPPORTING_WM_CHECK`")?;
        }

        self.conn
            .change_property8(
                PropMode::REPLACE,
                check,
                self.atoms._NET_WM_NAME,
                self.atoms.UTF8_STRING,
                crate::WM_NAME!().as_bytes(),
            )
            .context("failed to set `_NET_WM_NAME`")?
            .check()
            .context("failed to check setting `_NET_WM_NAME`")?;

        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.root,
                self.atoms._NET_SUPPORTED,
                AtomEnum::ATOM,
                &self.atoms.supported(),
            )
            .context("failed to set `_NET_SUPPORTED`")?
            .check()
            .context("failed to check setting `_NET_SUPPORTED`")?;

        self.delete_root_property(self.atoms._NET_CLIENT_LIST)?;

        self.conn
            .change_window_attributes(
                self.root,
                &ChangeWindowAttributesAux::new().event_mask(root_event_mask()),
            )
            .context("failed to select root events")?
            .check()
            .context("failed to check selecting root events")?;

        if let Err(e) = self.init_cursor() {
            log::warn!("{:#}", e);
        }

        Ok(())
    }

    fn cleanup(&self) -> Result<()> {
        log::debug!("cleaning up the connection");
        if let Some(check) = self.check_win {
            self.destroy_window(check)?;
        }
        self.conn
            .set_input_focus(
                InputFocus::POINTER_ROOT,
                InputFocus::POINTER_ROOT,
                x11rb::CURRENT_TIME,
            )
            .context("failed to reset the input focus")?
            .check_benign()
            .context("failed to check resetting the input focus")?;
        self.delete_root_property(self.atoms._NET_ACTIVE_WINDOW)?;
        self.sync()
    }

    // ]]] === Initialize ===

    // ========================== Events ========================== [[[

    fn next_event(&mut self) -> Result<XEvent> {
        let event = match self.pending.pop_front() {
            Some(event) => event,
            None => self
                .conn
                .wait_for_event()
                .context("failed to wait for an event")?,
        };

        Ok(self.translate(event))
    }

    fn sync(&self) -> Result<()> {
        self.conn.sync().context("failed to sync with the server")?;
        Ok(())
    }

    fn discard_enter_events(&mut self) -> Result<()> {
        self.sync()?;
        while let Some(event) = self
            .conn
            .poll_for_event()
            .context("failed to poll for events")?
        {
            if !matches!(event, Event::EnterNotify(_)) {
                self.pending.push_back(event);
            }
        }
        self.pending.retain(|e| !matches!(e, Event::EnterNotify(_)));

        Ok(())
    }

    // ]]] === Events ===

    // ========================= Retrieve ========================= [[[

    fn screens(&self) -> Result<Option<Vec<Rectangle>>> {
        let active = self
            .conn
            .xinerama_is_active()
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map_or(false, |reply| reply.state != 0);

        if !active {
            return Ok(None);
        }

        let screens = self
            .conn
            .xinerama_query_screens()
            .context("failed to query Xinerama screens")?
            .reply()
            .context("failed to get Xinerama screens reply")?
            .screen_info
            .iter()
            .map(|info| {
                Rectangle::new(
                    i32::from(info.x_org),
                    i32::from(info.y_org),
                    i32::from(info.width),
                    i32::from(info.height),
                )
            })
            .collect();

        Ok(Some(screens))
    }

    fn query_pointer(&self) -> Result<Option<Point>> {
        let reply = self
            .conn
            .query_pointer(self.root)
            .context("failed to query pointer")?
            .reply()
            .context("failed to get query pointer reply")?;

        Ok(reply
            .same_screen
            .then(|| Point::new(i32::from(reply.root_x), i32::from(reply.root_y))))
    }

    fn top_level_windows(&self) -> Result<Vec<Window>> {
        log::debug!("getting top-level windows");
        Ok(self
            .conn
            .query_tree(self.root)
            .context("failed to query the window tree")?
            .reply()
            .context("failed to get query tree reply")?
            .children)
    }

    fn window_attributes(&self, window: Window) -> Option<WindowAttributes> {
        log::debug!("getting attributes of Window({:#0x})", window);
        let attrs = self.conn.get_window_attributes(window).ok()?;
        let geom = self.conn.get_geometry(window).ok()?;
        let (attrs, geom) = (attrs.reply().ok()?, geom.reply().ok()?);

        Some(WindowAttributes {
            geometry:          Rectangle::new(
                i32::from(geom.x),
                i32::from(geom.y),
                i32::from(geom.width),
                i32::from(geom.height),
            ),
            border_width:      u32::from(geom.border_width),
            override_redirect: attrs.override_redirect,
            viewable:          attrs.map_state == MapState::VIEWABLE,
        })
    }

    fn wm_state(&self, window: Window) -> Option<IcccmWindowState> {
        self.conn
            .get_property(false, window, self.atoms.WM_STATE, self.atoms.WM_STATE, 0, 2)
            .ok()?
            .reply()
            .ok()?
            .value32()?
            .next()
            .and_then(IcccmWindowState::from_raw)
    }

    fn transient_for(&self, window: Window) -> Option<Window> {
        self.conn
            .get_property(
                false,
                window,
                AtomEnum::WM_TRANSIENT_FOR,
                AtomEnum::WINDOW,
                0,
                1,
            )
            .ok()?
            .reply()
            .ok()?
            .value32()?
            .next()
            .filter(|&w| w != x11rb::NONE)
    }

    fn window_title(&self, window: Window) -> Option<String> {
        self.text_property(window, self.atoms._NET_WM_NAME)
            .or_else(|| self.text_property(window, AtomEnum::WM_NAME.into()))
    }

    fn root_name(&self) -> Option<String> {
        self.text_property(self.root, AtomEnum::WM_NAME.into())
    }

    fn size_hints(&self, window: Window) -> Option<WmSizeHints> {
        let hints = properties::WmSizeHints::get_normal_hints(&*self.conn, window)
            .ok()?
            .reply()
            .ok()?;

        let (min_aspect, max_aspect) = hints.aspect.map_or((None, None), |(min, max)| {
            (
                Some((min.numerator, min.denominator)),
                Some((max.numerator, max.denominator)),
            )
        });

        Some(WmSizeHints {
            min_size: hints.min_size,
            max_size: hints.max_size,
            size_increment: hints.size_increment,
            min_aspect,
            max_aspect,
            base_size: hints.base_size,
        })
    }

    fn wm_hints(&self, window: Window) -> Option<Hints> {
        let hints = properties::WmHints::get(&*self.conn, window)
            .ok()?
            .reply()
            .ok()?;

        Some(Hints {
            urgent: hints.urgent,
            input:  hints.input,
        })
    }

    fn window_is_fullscreen(&self, window: Window) -> bool {
        self.atom_list(window, self.atoms._NET_WM_STATE)
            .contains(&self.atoms._NET_WM_STATE_FULLSCREEN)
    }

    fn window_is_dialog(&self, window: Window) -> bool {
        self.atom_list(window, self.atoms._NET_WM_WINDOW_TYPE)
            .first()
            .map_or(false, |&ty| ty == self.atoms._NET_WM_WINDOW_TYPE_DIALOG)
    }

    fn supports_protocol(&self, window: Window, protocol: Protocol) -> bool {
        let atom = match protocol {
            Protocol::Delete => self.atoms.WM_DELETE_WINDOW,
            Protocol::TakeFocus => self.atoms.WM_TAKE_FOCUS,
        };
        self.atom_list(window, self.atoms.WM_PROTOCOLS).contains(&atom)
    }

    // ]]] === Retrieve ===

    // =========================== Set ============================ [[[

    fn set_urgency(&self, window: Window, urgent: bool) -> Result<()> {
        log::debug!("setting urgency of Window({:#0x}) to {}", window, urgent);
        self.update_urgency(window, urgent)
    }

    fn set_fullscreen_state(&self, window: Window, fullscreen: bool) -> Result<()> {
        log::debug!("setting Window({:#0x}) fullscreen: {}", window, fullscreen);
        let value: &[Atom] = if fullscreen {
            &[self.atoms._NET_WM_STATE_FULLSCREEN]
        } else {
            &[]
        };
        self.conn
            .change_property32(
                PropMode::REPLACE,
                window,
                self.atoms._NET_WM_STATE,
                AtomEnum::ATOM,
                value,
            )
            .context(format!("failed to set `_NET_WM_STATE` on Window({:#0x})", window))?
            .check_benign()
            .context("failed to check setting `_NET_WM_STATE`")?;

        Ok(())
    }

    fn set_wm_state(&self, window: Window, state: IcccmWindowState) -> Result<()> {
        log::debug!("setting WM_STATE of Window({:#0x}) to {:?}", window, state);
        self.conn
            .change_property32(
                PropMode::REPLACE,
                window,
                self.atoms.WM_STATE,
                self.atoms.WM_STATE,
                &[state.into(), x11rb::NONE],
            )
            .context(format!("failed to set WM_STATE on Window({:#0x})", window))?
            .check_benign()
            .context("failed to check setting WM_STATE")?;

        Ok(())
    }

    fn append_client_list(&self, window: Window) -> Result<()> {
        self.conn
            .change_property32(
                PropMode::APPEND,
                self.root,
                self.atoms._NET_CLIENT_LIST,
                AtomEnum::WINDOW,
                &[window],
            )
            .context(format!("failed to append Window({:#0x}) to the client list", window))?
            .check()
            .context("failed to check appending to `_NET_CLIENT_LIST`")?;

        Ok(())
    }

    fn set_client_list(&self, windows: &[Window]) -> Result<()> {
        log::debug!("updating `_NET_CLIENT_LIST` with {} windows", windows.len());
        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.root,
                self.atoms._NET_CLIENT_LIST,
                AtomEnum::WINDOW,
                windows,
            )
            .context("failed to replace `_NET_CLIENT_LIST`")?
            .check()
            .context("failed to check replacing `_NET_CLIENT_LIST`")?;

        Ok(())
    }

    // ]]] === Set ===

    // ========================= Actions ========================== [[[

    fn select_client_input(&self, window: Window) -> Result<()> {
        log::debug!("selecting client events on Window({:#0x})", window);
        self.conn
            .change_window_attributes(
                window,
                &ChangeWindowAttributesAux::new().event_mask(client_event_mask()),
            )
            .context(format!("failed to select events on Window({:#0x})", window))?
            .check_benign()
            .context("failed to check selecting client events")?;

        Ok(())
    }

    fn configure_window(&self, window: Window, rect: Rectangle, border: u32) -> Result<()> {
        log::debug!("configuring Window({:#0x}) to {}", window, rect);
        self.conn
            .configure_window(window, &rect.to_aux(border))
            .context(format!("failed to configure Window({:#0x})", window))?
            .check_benign()
            .context(format!("failed to check configuring Window({:#0x})", window))?;

        Ok(())
    }

    fn send_configure_notify(&self, window: Window, rect: Rectangle, border: u32) -> Result<()> {
        log::debug!("sending ConfigureNotify to Window({:#0x})", window);
        let event = xproto::ConfigureNotifyEvent {
            response_type: xproto::CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: window,
            window,
            above_sibling: x11rb::NONE,
            x: rect.x as i16,
            y: rect.y as i16,
            width: rect.w.max(1) as u16,
            height: rect.h.max(1) as u16,
            border_width: border as u16,
            override_redirect: false,
        };

        self.conn
            .send_event(false, window, EventMask::STRUCTURE_NOTIFY, &event)
            .context(format!("failed to send ConfigureNotify to Window({:#0x})", window))?
            .check_benign()
            .context("failed to check sending ConfigureNotify")?;

        Ok(())
    }

    fn move_window(&self, window: Window, x: i32, y: i32) -> Result<()> {
        log::trace!("moving Window({:#0x}) to {},{}", window, x, y);
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().x(x).y(y))
            .context(format!("failed to move Window({:#0x})", window))?
            .check_benign()
            .context("failed to check moving window")?;

        Ok(())
    }

    fn set_border_width(&self, window: Window, width: u32) -> Result<()> {
        log::debug!("setting Window({:#0x}) border width {}", window, width);
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().border_width(width))
            .context(format!(
                "failed to set Window({:#0x}) border width to {}",
                window, width
            ))?
            .check_benign()
            .context(format!("failed to check setting border width to {}", width))?;

        Ok(())
    }

    fn set_border_color(&self, window: Window, color: u32) -> Result<()> {
        log::trace!("setting Window({:#0x}) border color {:#08x}", window, color);
        self.conn
            .change_window_attributes(window, &ChangeWindowAttributesAux::new().border_pixel(color))
            .context(format!("failed to set Window({:#0x}) border color", window))?
            .check_benign()
            .context("failed to check setting border color")?;

        Ok(())
    }

    fn forward_configure_request(&self, request: &ConfigureRequestData) -> Result<()> {
        log::debug!("forwarding configure request of Window({:#0x})", request.window);
        let aux = ConfigureWindowAux::new()
            .x(request.x)
            .y(request.y)
            .width(request.width.map(|w| w.max(1) as u32))
            .height(request.height.map(|h| h.max(1) as u32))
            .border_width(request.border_width)
            .sibling(request.sibling)
            .stack_mode(request.stack_mode);

        self.conn
            .configure_window(request.window, &aux)
            .context(format!(
                "failed to forward configure request of Window({:#0x})",
                request.window
            ))?
            .check_benign()
            .context("failed to check forwarding configure request")?;

        Ok(())
    }

    fn raise_window(&self, window: Window) -> Result<()> {
        log::debug!("raising Window({:#0x})", window);
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))
            .context(format!("failed to raise Window({:#0x})", window))?
            .check_benign()
            .context("failed to check raising window")?;

        Ok(())
    }

    fn stack_below(&self, window: Window, sibling: Window) -> Result<()> {
        log::trace!("stacking Window({:#0x}) below Window({:#0x})", window, sibling);
        self.conn
            .configure_window(
                window,
                &ConfigureWindowAux::new()
                    .sibling(sibling)
                    .stack_mode(StackMode::BELOW),
            )
            .context(format!("failed to restack Window({:#0x})", window))?
            .check_benign()
            .context("failed to check restacking window")?;

        Ok(())
    }

    fn map_window(&self, window: Window) -> Result<()> {
        log::debug!("mapping Window({:#0x})", window);
        self.conn
            .map_window(window)
            .context(format!("failed to map Window({:#0x})", window))?
            .check_benign()
            .context(format!("failed to check mapping Window({:#0x})", window))?;

        Ok(())
    }

    fn focus_window(&self, window: Window) -> Result<()> {
        log::debug!("focusing Window({:#0x})", window);
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, window, x11rb::CURRENT_TIME)
            .context(format!(
                "failed to `set_input_focus` for Window({:#0x})",
                window
            ))?
            .check_benign()
            .context(format!(
                "failed to check `set_input_focus` for Window({:#0x})",
                window
            ))?;

        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.root,
                self.atoms._NET_ACTIVE_WINDOW,
                AtomEnum::WINDOW,
                &[window],
            )
            .context("failed to replace property `_NET_ACTIVE_WINDOW`")?
            .check()
            .context("failed to check replacing `_NET_ACTIVE_WINDOW`")?;

        Ok(())
    }

    fn revert_focus(&self) -> Result<()> {
        log::debug!("reverting the input focus to root");
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, self.root, x11rb::CURRENT_TIME)
            .context("failed to revert the input focus")?
            .check_benign()
            .context("failed to check reverting the input focus")?;

        self.delete_root_property(self.atoms._NET_ACTIVE_WINDOW)
    }

    fn send_protocol(&self, window: Window, protocol: Protocol) -> Result<bool> {
        if !self.supports_protocol(window, protocol) {
            return Ok(false);
        }
        let atom = match protocol {
            Protocol::Delete => self.atoms.WM_DELETE_WINDOW,
            Protocol::TakeFocus => self.atoms.WM_TAKE_FOCUS,
        };

        log::debug!("sending {:?} to Window({:#0x})", protocol, window);
        let event = ClientMessageEvent::new(
            32,
            window,
            self.atoms.WM_PROTOCOLS,
            [atom, x11rb::CURRENT_TIME, 0, 0, 0],
        );
        self.conn
            .send_event(false, window, EventMask::NO_EVENT, &event)
            .context(format!("failed to send {:?} to Window({:#0x})", protocol, window))?
            .check_benign()
            .context(format!("failed to check sending {:?}", protocol))?;

        Ok(true)
    }

    fn kill_client(&self, window: Window) -> Result<()> {
        log::debug!("killing the client of Window({:#0x})", window);
        self.conn
            .kill_client(window)
            .context(format!("failed to kill Window({:#0x})", window))?
            .check_benign()
            .context("failed to check killing client")?;

        Ok(())
    }

    fn grab_server(&self) -> Result<()> {
        log::trace!("grabbing the server");
        self.conn
            .grab_server()
            .context("failed to grab server")?
            .check()
            .context("failed to check grabbing server")?;

        Ok(())
    }

    fn ungrab_server(&self) -> Result<()> {
        log::trace!("ungrabbing the server");
        self.conn
            .ungrab_server()
            .context("failed to ungrab server")?
            .check()
            .context("failed to check ungrabbing server")?;

        Ok(())
    }

    fn allow_replay_pointer(&self) -> Result<()> {
        self.conn
            .allow_events(xproto::Allow::REPLAY_POINTER, x11rb::CURRENT_TIME)
            .context("failed to replay the pointer")?
            .check()
            .context("failed to check replaying the pointer")?;

        Ok(())
    }

    fn create_bar(&self, rect: Rectangle) -> Result<Window> {
        log::debug!("creating a bar: {}", rect);
        let wid = self.conn.generate_id().context("failed to generate an ID")?;
        let aux = CreateWindowAux::new()
            .override_redirect(1)
            .background_pixmap(xproto::BackPixmap::PARENT_RELATIVE)
            .event_mask(EventMask::BUTTON_PRESS | EventMask::EXPOSURE);

        self.conn
            .create_window(
                x11rb::COPY_DEPTH_FROM_PARENT,
                wid,
                self.root,
                rect.x as i16,
                rect.y as i16,
                rect.w.max(1) as u16,
                rect.h.max(1) as u16,
                0,
                WindowClass::INPUT_OUTPUT,
                x11rb::COPY_FROM_PARENT,
                &aux,
            )
            .context(format!("failed to create Window({:#0x})", wid))?
            .check()
            .context(format!("failed check creating Window({:#0x})", wid))?;

        self.conn
            .change_property8(
                PropMode::REPLACE,
                wid,
                AtomEnum::WM_CLASS,
                AtomEnum::STRING,
                &wm_class(crate::WM_NAME!(), crate::WM_NAME!()),
            )
            .context("failed to replace `WM_CLASS` on the bar")?
            .check()
            .context("failed to check replacing `WM_CLASS` on the bar")?;

        self.map_window(wid)?;
        self.raise_window(wid)?;

        Ok(wid)
    }

    fn destroy_window(&self, window: Window) -> Result<()> {
        log::debug!("destroying Window({:#0x})", window);
        self.conn
            .destroy_window(window)
            .context(format!("failed to destroy Window({:#0x})", window))?
            .check_benign()
            .context(format!("failed to check destroying Window({:#0x})", window))?;

        Ok(())
    }

    // ]]] === Actions ===

    // ========================= Keyboard ========================= [[[

    fn numlock_mask(&self) -> Result<u16> {
        let numlock = self.keymap.keycodes(XK_NUM_LOCK);
        let reply = self
            .conn
            .get_modifier_mapping()
            .context("failed to get modifier mapping")?
            .reply()
            .context("failed to get modifier mapping reply")?;

        let per_modifier = reply.keycodes.len() / 8;
        if per_modifier == 0 {
            return Ok(0);
        }

        Ok(reply
            .keycodes
            .chunks(per_modifier)
            .enumerate()
            .filter(|(_, codes)| codes.iter().any(|c| *c != 0 && numlock.contains(c)))
            .last()
            .map_or(0, |(idx, _)| 1 << idx))
    }

    fn keycode_to_keysym(&self, keycode: Keycode, shifted: bool) -> Keysym {
        let sym = self.keymap.keysym(keycode, usize::from(shifted));
        if sym == 0 && shifted {
            self.keymap.keysym(keycode, 0)
        } else {
            sym
        }
    }

    fn keysym_to_keycodes(&self, keysym: Keysym) -> Vec<Keycode> {
        self.keymap.keycodes(keysym)
    }

    fn refresh_keyboard_mapping(&mut self) -> Result<()> {
        log::debug!("refreshing the keyboard mapping");
        self.keymap = Keymap::load(&self.conn)?;
        Ok(())
    }

    // ]]] === Keyboard ===

    // ======================== Grab / Ungrab ===================== [[[

    fn ungrab_all_keys(&self) -> Result<()> {
        log::debug!("ungrabbing all keys");
        self.conn
            .ungrab_key(xproto::Grab::ANY, self.root, ModMask::ANY)
            .context("failed to ungrab keys")?
            .check()
            .context("failed to check ungrabbing keys")?;

        Ok(())
    }

    fn grab_key(&self, keycode: Keycode, modifiers: u16) -> Result<()> {
        log::trace!("grabbing key {} with modifiers {:#x}", keycode, modifiers);
        self.conn
            .grab_key(
                true,
                self.root,
                modifiers,
                keycode,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )
            .context(format!("failed to grab key {}", keycode))?
            .check_benign()
            .context(format!("failed to check grabbing key {}", keycode))?;

        Ok(())
    }

    fn grab_any_key(&self) -> Result<()> {
        log::debug!("grabbing every key");
        self.conn
            .grab_key(
                true,
                self.root,
                ModMask::ANY,
                xproto::Grab::ANY,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )
            .context("failed to grab every key")?
            .check_benign()
            .context("failed to check grabbing every key")?;

        Ok(())
    }

    fn ungrab_all_buttons(&self, window: Window) -> Result<()> {
        log::trace!("ungrabbing buttons on Window({:#0x})", window);
        self.conn
            .ungrab_button(ButtonIndex::ANY, window, ModMask::ANY)
            .context(format!("failed to ungrab buttons on Window({:#0x})", window))?
            .check_benign()
            .context("failed to check ungrabbing buttons")?;

        Ok(())
    }

    fn grab_any_button(&self, window: Window) -> Result<()> {
        log::trace!("grabbing every button on Window({:#0x})", window);
        self.conn
            .grab_button(
                false,
                window,
                button_mask(),
                GrabMode::SYNC,
                GrabMode::SYNC,
                x11rb::NONE,
                x11rb::NONE,
                ButtonIndex::ANY,
                ModMask::ANY,
            )
            .context(format!("failed to grab buttons on Window({:#0x})", window))?
            .check_benign()
            .context("failed to check grabbing every button")?;

        Ok(())
    }

    fn grab_button(&self, window: Window, button: u8, modifiers: u16) -> Result<()> {
        log::trace!(
            "grabbing button {} with modifiers {:#x} on Window({:#0x})",
            button,
            modifiers,
            window
        );
        self.conn
            .grab_button(
                false,
                window,
                button_mask(),
                GrabMode::ASYNC,
                GrabMode::SYNC,
                x11rb::NONE,
                x11rb::NONE,
                ButtonIndex::from(button),
                modifiers,
            )
            .context(format!("failed to grab button {} on Window({:#0x})", button, window))?
            .check_benign()
            .context("failed to check grabbing button")?;

        Ok(())
    }

    // ]]] === Grab/Ungrab ===
} // ]]] === XConnection ===
