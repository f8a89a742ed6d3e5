//! Representation of the physical monitors connected to the X-Server

pub(crate) mod client;
pub(crate) mod registry;

use crate::{
    config::GlobalSettings,
    core::{TagMask, Window},
    geometry::Rectangle,
};

// ============================== Monitor =============================

/// One physical display region
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Monitor {
    /// Bounds of the whole monitor
    pub(crate) screen:   Rectangle,
    /// Bounds minus the bar, where clients are placed
    pub(crate) area:     Rectangle,
    /// Vertical position of the bar, off-screen when hidden
    pub(crate) bar_y:    i32,
    /// Tags in view. Never zero
    pub(crate) tags:     TagMask,
    /// Percentage of the width given to the master column
    pub(crate) mfact:    u32,
    /// Number of clients in the master column
    pub(crate) nmaster:  u32,
    /// Whether the bar is shown
    pub(crate) show_bar: bool,
    /// Whether the bar sits at the top
    pub(crate) top_bar:  bool,
    /// The bar's window, once created
    pub(crate) bar:      Option<Window>,
    /// Clients in insertion order
    pub(crate) clients:  Vec<Window>,
    /// Clients most recently focused first
    pub(crate) stack:    Vec<Window>,
    /// Selected client
    pub(crate) sel:      Option<Window>,
}

impl Monitor {
    /// Create a new [`Monitor`] with the configured tiling defaults and no
    /// geometry
    pub(crate) fn new(settings: &GlobalSettings) -> Self {
        Self {
            screen:   Rectangle::default(),
            area:     Rectangle::default(),
            bar_y:    0,
            tags:     1,
            mfact:    settings.mfact,
            nmaster:  settings.nmaster.max(1),
            show_bar: settings.show_bar,
            top_bar:  settings.top_bar,
            bar:      None,
            clients:  vec![],
            stack:    vec![],
            sel:      None,
        }
    }

    /// Take a new screen rectangle, recomputing the window area
    pub(crate) fn set_screen(&mut self, screen: Rectangle, bar_height: i32) {
        self.screen = screen;
        self.update_bar_position(bar_height);
    }

    /// Carve the bar out of the monitor, or hide it above the screen
    pub(crate) fn update_bar_position(&mut self, bar_height: i32) {
        self.area = self.screen;
        if self.show_bar {
            self.area.h -= bar_height;
            if self.top_bar {
                self.bar_y = self.area.y;
                self.area.y += bar_height;
            } else {
                self.bar_y = self.area.y + self.area.h;
            }
        } else {
            self.bar_y = -bar_height;
        }
    }

    /// Geometry of the bar window
    pub(crate) const fn bar_rect(&self, bar_height: i32) -> Rectangle {
        Rectangle::new(self.area.x, self.bar_y, self.area.w, bar_height)
    }
}
