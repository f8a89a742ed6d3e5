//! The window manager itself
//!
//! [`WindowManager`] owns every piece of mutable state: the connection, the
//! registry of clients and monitors, the bar renderer and the configuration.
//! Events are pulled one at a time and handled to completion before the next
//! one is read.

mod actions;
mod bar;
mod events;
mod focus;
mod grab;
mod layout;
mod manage;
mod prompt;
mod reconcile;

use crate::{
    config::Config,
    core::{MonitorId, Window, DEFAULT_STATUS},
    error::is_benign,
    geometry::Rectangle,
    monitor::registry::Registry,
    spawn::ProcessLauncher,
    x::{property::IcccmWindowState, render::Renderer, XConn},
};
use anyhow::Result;

/// State of a running window manager
pub(crate) struct WindowManager<C: XConn, R: Renderer> {
    /// Connection to the display server
    pub(crate) conn:     C,
    /// Draws the bars
    pub(crate) renderer: R,
    /// Clients and monitors
    pub(crate) registry: Registry,
    /// Settings and bindings
    pub(crate) config:   Config,
    /// Starts user commands
    launcher:            Box<dyn ProcessLauncher>,
    /// Modifier bit of Num_Lock
    numlock:             u16,
    /// Cleared by the `quit` action
    running:             bool,
    /// Whether gaps surround tiled clients
    gaps:                bool,
    /// Size of the root window
    screen:              Rectangle,
    /// Root window name shown on the bar
    status:              String,
    /// Command being typed, when the launcher is active
    exec:                Option<String>,
    /// Height of every bar
    bar_height:          i32,
    /// Monitor the pointer was last seen on
    motion_mon:          Option<MonitorId>,
}

impl<C: XConn, R: Renderer> WindowManager<C, R> {
    /// Create a new [`WindowManager`]. Nothing is sent to the server until
    /// [`setup`](Self::setup)
    pub(crate) fn new(
        conn: C,
        renderer: R,
        config: Config,
        launcher: Box<dyn ProcessLauncher>,
    ) -> Self {
        let bar_height = renderer.line_height() + 2;
        let screen = conn.screen_rect();

        Self {
            gaps: config.global.gaps,
            conn,
            renderer,
            registry: Registry::new(),
            config,
            launcher,
            numlock: 0,
            running: true,
            screen,
            status: String::from(DEFAULT_STATUS),
            exec: None,
            bar_height,
            motion_mon: None,
        }
    }

    /// Height of the bars
    pub(crate) const fn bar_height(&self) -> i32 {
        self.bar_height
    }

    /// Take over the display: advertise EWMH support, detect the monitors,
    /// create the bars and install the key grabs
    pub(crate) fn setup(&mut self) -> Result<()> {
        log::info!("setting up {}", crate::WM_NAME!());
        self.conn.init_ewmh()?;
        self.update_geometry()?;
        self.update_bars()?;
        self.update_status();
        self.grab_keys()?;
        self.focus(None)
    }

    /// Manage the windows that existed before the window manager started.
    /// Transient windows come last so that their parents are known
    pub(crate) fn scan(&mut self) -> Result<()> {
        let mut transients = vec![];

        for window in self.conn.top_level_windows()? {
            let attrs = match self.conn.window_attributes(window) {
                Some(attrs) if !attrs.override_redirect => attrs,
                _ => continue,
            };
            if !attrs.viewable
                && self.conn.wm_state(window) != Some(IcccmWindowState::Iconic)
            {
                continue;
            }

            if self.conn.transient_for(window).is_some() {
                transients.push((window, attrs));
            } else {
                self.manage(window, &attrs)?;
            }
        }

        for (window, attrs) in transients {
            self.manage(window, &attrs)?;
        }

        Ok(())
    }

    /// Handle events until the `quit` action runs. Expected protocol races
    /// are logged and skipped, anything else ends the loop
    pub(crate) fn run(&mut self) -> Result<()> {
        self.conn.sync()?;

        while self.running {
            let event = self.conn.next_event()?;
            if let Err(e) = self.handle_event(event) {
                if is_benign(&e) {
                    log::debug!("ignoring benign error: {:#}", e);
                } else {
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Release every client and restore the server to how it was found
    pub(crate) fn cleanup(&mut self) -> Result<()> {
        log::info!("shutting down");
        self.exec = None;

        let all = self.config.tag_mask();
        self.registry.selmon_mut().tags = all;

        for mon in 0..self.registry.monitors.len() {
            while let Some(&window) = self.registry.monitors[mon].stack.first() {
                self.unmanage(window, false)?;
            }
        }

        self.conn.ungrab_all_keys()?;
        for mon in &mut self.registry.monitors {
            if let Some(bar) = mon.bar.take() {
                self.conn.destroy_window(bar)?;
            }
        }

        self.conn.cleanup()
    }

    /// The monitor a window is on. For the root window this is where the
    /// pointer is
    fn window_to_monitor(&self, window: Window) -> Result<MonitorId> {
        if window == self.conn.root() {
            if let Some(p) = self.conn.query_pointer()? {
                return Ok(self
                    .registry
                    .rect_to_monitor(Rectangle::new(p.x, p.y, 1, 1)));
            }
        }
        if let Some(mon) = self.registry.bar_monitor(window) {
            return Ok(mon);
        }

        Ok(self
            .registry
            .client(window)
            .map_or(self.registry.selected, |c| c.monitor))
    }

    /// Re-read the status text from the root window name
    fn update_status(&mut self) {
        self.status = self
            .conn
            .root_name()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_STATUS));
    }
}
