//! Bringing windows under management and letting them go

use super::WindowManager;
use crate::{
    core::{MonitorId, Window, BROKEN},
    geometry::Rectangle,
    monitor::client::Client,
    x::{
        property::{IcccmWindowState, SizeHints, WindowAttributes},
        render::Renderer,
        XConn,
    },
};
use anyhow::Result;

impl<C: XConn, R: Renderer> WindowManager<C, R> {
    /// Start managing a window
    pub(crate) fn manage(&mut self, window: Window, attrs: &WindowAttributes) -> Result<()> {
        log::debug!("managing Window({:#0x})", window);

        let parent = self
            .conn
            .transient_for(window)
            .and_then(|p| self.registry.client(p));
        let transient = parent.is_some();
        let (mon, tags) = match parent {
            Some(p) => (p.monitor, p.tags),
            None => (self.registry.selected, self.registry.selmon().tags),
        };

        let bw = self.config.global.border_width;
        let mut client = Client::new(window, mon, tags, attrs.geometry, bw);
        client.old_border = attrs.border_width;
        client.geom = self.clamp_to_monitor(&client, mon);
        let geom = client.geom;
        self.registry.insert(client);
        self.update_title(window);

        self.conn.set_border_width(window, bw)?;
        self.conn
            .set_border_color(window, self.config.global.normal.border)?;
        self.conn.send_configure_notify(window, geom, bw)?;

        self.update_window_type(window)?;
        self.update_size_hints(window);
        self.update_wm_hints(window)?;
        self.conn.select_client_input(window)?;
        self.grab_buttons(window, false)?;

        let floating = match self.registry.client_mut(window) {
            Some(c) => {
                if !c.is_floating {
                    c.is_floating = transient || c.is_fixed;
                    c.old_floating = c.is_floating;
                }
                c.is_floating
            },
            None => return Ok(()),
        };
        if floating {
            self.conn.raise_window(window)?;
        }

        self.registry.attach(window);
        self.registry.attach_stack(window);
        self.conn.append_client_list(window)?;

        // Keep it out of sight until it is arranged
        let geom = self.registry.client(window).map_or(geom, |c| c.geom);
        self.conn
            .move_window(window, geom.x + 2 * self.screen.w, geom.y)?;
        self.conn.set_wm_state(window, IcccmWindowState::Normal)?;

        if mon == self.registry.selected {
            self.unfocus(self.registry.sel(), false)?;
        }
        self.registry.monitors[mon].sel = Some(window);
        self.arrange(Some(mon))?;
        self.conn.map_window(window)?;
        self.focus(None)
    }

    /// Keep a new window inside the area of its monitor, and below a top bar
    /// when its centre would be under it
    fn clamp_to_monitor(&self, client: &Client, mon: MonitorId) -> Rectangle {
        let m = &self.registry.monitors[mon];
        let area = m.area;
        let mut geom = client.geom;

        if geom.x + client.outer_width() > area.right() {
            geom.x = area.right() - client.outer_width();
        }
        if geom.y + client.outer_height() > area.bottom() {
            geom.y = area.bottom() - client.outer_height();
        }
        geom.x = geom.x.max(area.x);

        let centre = geom.x + geom.w / 2;
        let under_bar = m.show_bar
            && m.bar_y == m.screen.y
            && centre >= area.x
            && centre < area.right();
        let top = if under_bar {
            m.screen.y + self.bar_height
        } else {
            m.screen.y
        };
        geom.y = geom.y.max(top);

        geom
    }

    /// Stop managing a window. A window that still exists gets its border and
    /// state back
    pub(crate) fn unmanage(&mut self, window: Window, destroyed: bool) -> Result<()> {
        let (mon, border) = match self.registry.client(window) {
            Some(c) => (c.monitor, c.old_border),
            None => return Ok(()),
        };
        log::debug!("unmanaging Window({:#0x}), destroyed: {}", window, destroyed);

        self.registry.detach(window);
        self.registry.detach_stack(window);

        if !destroyed {
            self.conn.grab_server()?;
            drop(self.conn.set_border_width(window, border));
            drop(self.conn.ungrab_all_buttons(window));
            drop(self.conn.set_wm_state(window, IcccmWindowState::Withdrawn));
            drop(self.conn.sync());
            self.conn.ungrab_server()?;
        }

        self.registry.remove(window);
        self.focus(None)?;
        self.update_client_list()?;
        self.arrange(Some(mon))
    }

    /// Re-read the title, falling back to a placeholder
    pub(crate) fn update_title(&mut self, window: Window) {
        let name = self
            .conn
            .window_title(window)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| String::from(BROKEN));

        if let Some(c) = self.registry.client_mut(window) {
            c.set_name(&name);
        }
    }

    /// Re-read `WM_NORMAL_HINTS`
    pub(crate) fn update_size_hints(&mut self, window: Window) {
        let hints = self
            .conn
            .size_hints(window)
            .map_or_else(
                || SizeHints {
                    valid: true,
                    ..SizeHints::default()
                },
                |h| SizeHints::from_wm(&h),
            );

        if let Some(c) = self.registry.client_mut(window) {
            c.set_hints(hints);
        }
    }

    /// Re-read `WM_HINTS`. The focused client never stays urgent
    pub(crate) fn update_wm_hints(&mut self, window: Window) -> Result<()> {
        let hints = match self.conn.wm_hints(window) {
            Some(hints) => hints,
            None => return Ok(()),
        };
        let focused = self.registry.sel() == Some(window);

        if focused && hints.urgent {
            self.conn.set_urgency(window, false)?;
        }
        if let Some(c) = self.registry.client_mut(window) {
            if !focused {
                c.is_urgent = hints.urgent;
            }
            c.never_focus = hints.input.map_or(false, |input| !input);
        }

        Ok(())
    }

    /// Re-read `_NET_WM_STATE` and `_NET_WM_WINDOW_TYPE`. Returns whether the
    /// client started floating and needs to be arranged
    pub(crate) fn update_window_type(&mut self, window: Window) -> Result<bool> {
        if self.conn.window_is_fullscreen(window) {
            self.set_fullscreen(window, true)?;
        }

        if self.conn.window_is_dialog(window) {
            if let Some(c) = self.registry.client_mut(window) {
                if !c.is_floating {
                    c.is_floating = true;
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    /// Make a client cover its monitor, or put it back where it was
    pub(crate) fn set_fullscreen(&mut self, window: Window, fullscreen: bool) -> Result<()> {
        let (mon, current) = match self.registry.client(window) {
            Some(c) => (c.monitor, c.is_fullscreen),
            None => return Ok(()),
        };

        if fullscreen && !current {
            self.conn.set_fullscreen_state(window, true)?;
            if let Some(c) = self.registry.client_mut(window) {
                c.is_fullscreen = true;
                c.old_floating = c.is_floating;
                c.old_geom = c.geom;
                c.is_floating = true;
            }
            let screen = self.registry.monitors[mon].screen;
            self.resize_client(window, screen)?;
            self.conn.raise_window(window)?;
        } else if !fullscreen && current {
            self.conn.set_fullscreen_state(window, false)?;
            let old = match self.registry.client_mut(window) {
                Some(c) => {
                    c.is_fullscreen = false;
                    c.is_floating = c.old_floating;
                    c.old_geom
                },
                None => return Ok(()),
            };
            self.resize_client(window, old)?;
            self.arrange(Some(mon))?;
        }

        Ok(())
    }

    /// Rewrite `_NET_CLIENT_LIST` from scratch
    pub(crate) fn update_client_list(&self) -> Result<()> {
        self.conn.set_client_list(&self.registry.windows())
    }

    /// Move a client to another monitor
    pub(crate) fn send_monitor(&mut self, window: Window, to: MonitorId) -> Result<()> {
        match self.registry.client(window) {
            Some(c) if c.monitor != to => {},
            _ => return Ok(()),
        }
        log::debug!("sending Window({:#0x}) to monitor {}", window, to);

        self.unfocus(Some(window), true)?;
        self.registry.migrate(window, to);
        self.focus(None)?;
        self.arrange(None)
    }
}
