//! Reacting to events from the X-Server

use super::WindowManager;
use crate::{
    config::Action,
    error::Error,
    geometry::Rectangle,
    x::{
        event::{
            ButtonEvent,
            ClientRequest,
            ConfigureEvent,
            ConfigureRequestData,
            CrossingEvent,
            KeyEvent,
            Property,
            PropertyEvent,
            XEvent,
        },
        input::{mask_of, Click},
        property::IcccmWindowState,
        render::Renderer,
        XConn,
    },
};
use anyhow::Result;
use x11rb::protocol::xproto::{Button as XButton, ModMask as XModMask};

impl<C: XConn, R: Renderer> WindowManager<C, R> {
    /// Route an event to its handler
    pub(crate) fn handle_event(&mut self, event: XEvent) -> Result<()> {
        log::trace!("handling {:?}", event);

        match event {
            XEvent::ButtonPress(ev) => self.button_press(ev),
            XEvent::ClientMessage(req) => self.client_message(req),
            XEvent::ConfigureNotify(ev) => self.configure_notify(ev),
            XEvent::ConfigureRequest(req) => self.configure_request(&req),
            XEvent::DestroyNotify(window) =>
                if self.registry.contains(window) {
                    self.unmanage(window, true)
                } else {
                    Ok(())
                },
            XEvent::EnterNotify(ev) => self.enter_notify(ev),
            XEvent::Expose { window, count } =>
                if count == 0 {
                    let mon = self.window_to_monitor(window)?;
                    self.draw_bar(mon)
                } else {
                    Ok(())
                },
            XEvent::FocusIn(window) => match self.registry.sel() {
                Some(sel) if sel != window => self.set_focus(sel),
                _ => Ok(()),
            },
            XEvent::KeyPress(ev) => self.key_press(ev),
            XEvent::MappingNotify { keyboard } => {
                self.conn.refresh_keyboard_mapping()?;
                if keyboard {
                    self.grab_keys()?;
                }
                Ok(())
            },
            XEvent::MapRequest(window) => self.map_request(window),
            XEvent::MotionNotify { window, x, y } => self.motion_notify(window, x, y),
            XEvent::PropertyNotify(ev) => self.property_notify(ev),
            XEvent::UnmapNotify { window, synthetic } =>
                if !self.registry.contains(window) {
                    Ok(())
                } else if synthetic {
                    self.conn.set_wm_state(window, IcccmWindowState::Withdrawn)
                } else {
                    self.unmanage(window, false)
                },
            XEvent::Error(err) =>
                if err.is_benign() {
                    log::debug!("ignoring benign protocol error: {}", err);
                    Ok(())
                } else {
                    Err(Error::Protocol(err).into())
                },
            XEvent::Unknown => Ok(()),
        }
    }

    /// Work out where a button was pressed and run the matching bindings
    fn button_press(&mut self, ev: ButtonEvent) -> Result<()> {
        let mut click = Click::RootWin;
        let mut clicked = None;

        let mon = self.window_to_monitor(ev.window)?;
        if mon != self.registry.selected {
            self.unfocus(self.registry.sel(), false)?;
            self.registry.selected = mon;
            self.focus(None)?;
        }

        if Some(ev.window) == self.registry.selmon().bar {
            let (region, tag) = self.bar_click(self.registry.selected, ev.x);
            click = region;
            clicked = tag;
        } else if self.registry.contains(ev.window) {
            self.focus(Some(ev.window))?;
            self.restack(self.registry.selected)?;
            self.conn.allow_replay_pointer()?;
            click = Click::ClientWin;
        }

        let state = self.clean_mask(ev.state);
        let actions = self
            .config
            .buttons
            .iter()
            .filter(|b| {
                b.click == click
                    && XButton::from(b.button) == ev.button
                    && self.clean_mask(mask_of(&b.mods)) == state
            })
            .map(|b| b.action.clone())
            .collect::<Vec<_>>();

        for action in &actions {
            self.run_action(action, clicked)?;
        }

        Ok(())
    }

    /// Run the bindings of a key, or feed it to the launcher when none match
    fn key_press(&mut self, ev: KeyEvent) -> Result<()> {
        let sym = self.conn.keycode_to_keysym(ev.keycode, false);
        let state = self.clean_mask(ev.state);
        let actions = self
            .config
            .keys
            .iter()
            .filter(|k| k.key == sym && self.clean_mask(mask_of(&k.mods)) == state)
            .map(|k| k.action.clone())
            .collect::<Vec<Action>>();

        for action in &actions {
            self.run_action(action, None)?;
        }

        if !actions.is_empty() || self.exec.is_none() {
            return Ok(());
        }

        let shifted = ev.state & u16::from(XModMask::SHIFT) != 0;
        let sym = self.conn.keycode_to_keysym(ev.keycode, shifted);
        self.prompt_key(sym)?;
        self.draw_bar(self.registry.selected)
    }

    /// `_NET_WM_STATE` and `_NET_ACTIVE_WINDOW` requests
    fn client_message(&mut self, req: ClientRequest) -> Result<()> {
        match req {
            ClientRequest::Fullscreen { window, action } => {
                let current = match self.registry.client(window) {
                    Some(c) => c.is_fullscreen,
                    None => return Ok(()),
                };
                self.set_fullscreen(window, action.apply(current))
            },
            ClientRequest::Activate(window) => {
                let urgent = match self.registry.client(window) {
                    Some(c) => c.is_urgent,
                    None => return Ok(()),
                };
                if self.registry.sel() != Some(window) && !urgent {
                    self.set_urgent(window, true)?;
                }
                Ok(())
            },
        }
    }

    /// Only changes to the root window matter
    fn configure_notify(&mut self, ev: ConfigureEvent) -> Result<()> {
        if ev.window == self.conn.root() {
            self.root_resized(ev.geom)
        } else {
            Ok(())
        }
    }

    /// Floating clients get what they ask for within their monitor, tiled
    /// clients are told their current geometry and unmanaged windows are
    /// configured as requested
    fn configure_request(&mut self, req: &ConfigureRequestData) -> Result<()> {
        let window = req.window;
        let client = match self.registry.client(window) {
            Some(c) => c,
            None => {
                log::debug!("forwarding configure request of Window({:#0x})", window);
                self.conn.forward_configure_request(req)?;
                return self.conn.sync();
            },
        };
        let bw = client.border_width;

        if client.is_floating {
            let screen = self.registry.monitors[client.monitor].screen;
            let mut geom = client.geom;

            if let Some(x) = req.x {
                geom.x = screen.x + x;
            }
            if let Some(y) = req.y {
                geom.y = screen.y + y;
            }
            if let Some(w) = req.width {
                geom.w = w;
            }
            if let Some(h) = req.height {
                geom.h = h;
            }

            let outer = 2 * bw as i32;
            if geom.right() > screen.right() {
                geom.x = screen.x + (screen.w / 2 - (geom.w + outer) / 2);
            }
            if geom.bottom() > screen.bottom() {
                geom.y = screen.y + (screen.h / 2 - (geom.h + outer) / 2);
            }

            if let Some(c) = self.registry.client_mut(window) {
                c.geom = geom;
            }

            let moved = req.x.is_some() || req.y.is_some();
            let resized = req.width.is_some() || req.height.is_some();
            if moved && !resized {
                self.conn.send_configure_notify(window, geom, bw)?;
            }
            if self.registry.is_visible(window) {
                self.conn.configure_window(window, geom, bw)?;
            }
        } else if req.border_width.is_none() {
            let geom = client.geom;
            self.conn.send_configure_notify(window, geom, bw)?;
        }

        self.conn.sync()
    }

    /// Focus follows the pointer into clients and across monitors
    fn enter_notify(&mut self, ev: CrossingEvent) -> Result<()> {
        let root = self.conn.root();
        if (!ev.normal || ev.inferior) && ev.window != root {
            return Ok(());
        }

        let client = self.registry.client(ev.window).map(|c| (c.window, c.monitor));
        let mon = match client {
            Some((_, mon)) => mon,
            None => self.window_to_monitor(ev.window)?,
        };
        let client = client.map(|(w, _)| w);

        if mon != self.registry.selected {
            self.unfocus(self.registry.sel(), true)?;
            self.registry.selected = mon;
        } else if client.is_none() || client == self.registry.sel() {
            return Ok(());
        }

        self.focus(client)
    }

    /// Manage a window asking to be mapped, unless it opted out
    fn map_request(&mut self, window: crate::core::Window) -> Result<()> {
        let attrs = match self.conn.window_attributes(window) {
            Some(attrs) => attrs,
            None => return Ok(()),
        };
        if attrs.override_redirect || self.registry.contains(window) {
            return Ok(());
        }

        self.manage(window, &attrs)
    }

    /// Switch monitors when the pointer crosses over to another one on the
    /// root window
    fn motion_notify(&mut self, window: crate::core::Window, x: i32, y: i32) -> Result<()> {
        if window != self.conn.root() {
            return Ok(());
        }

        let mon = self.registry.rect_to_monitor(Rectangle::new(x, y, 1, 1));
        if let Some(last) = self.motion_mon {
            if mon != last {
                self.unfocus(self.registry.sel(), true)?;
                self.registry.selected = mon;
                self.focus(None)?;
            }
        }
        self.motion_mon = Some(mon);

        Ok(())
    }

    /// Refresh whatever a client changed about itself
    fn property_notify(&mut self, ev: PropertyEvent) -> Result<()> {
        let window = ev.window;

        if window == self.conn.root() {
            if ev.atom == Property::Title {
                self.update_status();
                return self.draw_bar(self.registry.selected);
            }
            return Ok(());
        }

        let (mon, floating) = match self.registry.client(window) {
            Some(c) if !ev.deleted => (c.monitor, c.is_floating),
            _ => return Ok(()),
        };

        match ev.atom {
            Property::TransientFor => {
                let parent = self.conn.transient_for(window);
                if !floating && parent.map_or(false, |p| self.registry.contains(p)) {
                    if let Some(c) = self.registry.client_mut(window) {
                        c.is_floating = true;
                    }
                    self.arrange(Some(mon))?;
                }
            },
            Property::NormalHints =>
                if let Some(c) = self.registry.client_mut(window) {
                    c.hints.valid = false;
                },
            Property::Hints => {
                self.update_wm_hints(window)?;
                self.draw_bars()?;
            },
            Property::Title => {
                self.update_title(window);
                if self.registry.monitors[mon].sel == Some(window) {
                    self.draw_bar(mon)?;
                }
            },
            Property::WindowType =>
                if self.update_window_type(window)? {
                    self.arrange(Some(mon))?;
                },
            Property::Other => {},
        }

        Ok(())
    }
}
