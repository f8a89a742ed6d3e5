//! Tiling and showing or hiding clients

use super::WindowManager;
use crate::{
    core::{MonitorId, Window, GAP_INNER_H, GAP_INNER_V, GAP_OUTER_H, GAP_OUTER_V},
    geometry::Rectangle,
    x::{render::Renderer, XConn},
};
use anyhow::Result;

impl<C: XConn, R: Renderer> WindowManager<C, R> {
    /// Show, tile and restack one monitor, or show and tile all of them
    pub(crate) fn arrange(&mut self, mon: Option<MonitorId>) -> Result<()> {
        match mon {
            Some(mon) => {
                self.show_hide(mon)?;
                self.tile(mon)?;
                self.restack(mon)
            },
            None => {
                for mon in 0..self.registry.monitors.len() {
                    self.show_hide(mon)?;
                }
                for mon in 0..self.registry.monitors.len() {
                    self.tile(mon)?;
                }
                Ok(())
            },
        }
    }

    /// Move visible clients into place, top of the stack first, and hidden
    /// clients off-screen, bottom of the stack first
    fn show_hide(&mut self, mon: MonitorId) -> Result<()> {
        let stack = self.registry.monitors[mon].stack.clone();

        for &w in &stack {
            if !self.registry.is_visible(w) {
                continue;
            }
            let (geom, refit) = match self.registry.client(w) {
                Some(c) => (c.geom, c.is_floating && !c.is_fullscreen),
                None => continue,
            };
            self.conn.move_window(w, geom.x, geom.y)?;
            if refit {
                self.resize(w, geom, false)?;
            }
        }

        for &w in stack.iter().rev() {
            if self.registry.is_visible(w) {
                continue;
            }
            if let Some(c) = self.registry.client(w) {
                self.conn.move_window(w, -2 * c.outer_width(), c.geom.y)?;
            }
        }

        Ok(())
    }

    /// Lay out the tiled clients of a monitor: a master column on the left,
    /// the rest stacked in a second column
    fn tile(&mut self, mon: MonitorId) -> Result<()> {
        let tiled = self.registry.tiled(mon).collect::<Vec<_>>();
        let n = tiled.len() as i32;
        if n == 0 {
            return Ok(());
        }

        let m = &self.registry.monitors[mon];
        let area = m.area;
        let nmaster = m.nmaster as i32;
        let mfact = m.mfact as i32;
        let bw = self.config.global.border_width as i32;
        let g = i32::from(self.gaps);
        let (oh, ov, ih, iv) = (GAP_OUTER_H * g, GAP_OUTER_V * g, GAP_INNER_H * g, GAP_INNER_V * g);

        let width = if n > nmaster {
            (area.w - 2 * oh - ih) * mfact / 100
        } else {
            area.w - 2 * oh
        };

        let mut placed = 0;
        let mut used = 0;
        for &w in tiled.iter().take(nmaster as usize) {
            let left = n.min(nmaster) - placed;
            let h = (area.h - used - 2 * ov - iv * (left - 1)) / left;
            self.resize(
                w,
                Rectangle::new(area.x + oh, area.y + used + ov, width - 2 * bw, h - 2 * bw),
                false,
            )?;
            used = self.advance(w, used, ih, area.h);
            placed += 1;
        }

        used = 0;
        for &w in tiled.iter().skip(nmaster as usize) {
            let left = n - placed;
            let h = (area.h - used - 2 * ov - iv * (left - 1)) / left;
            self.resize(
                w,
                Rectangle::new(
                    area.x + oh + width + ih,
                    area.y + used + oh,
                    area.w - width - 2 * bw - 2 * ov - iv,
                    h - 2 * bw,
                ),
                false,
            )?;
            used = self.advance(w, used, ih, area.h);
            placed += 1;
        }

        Ok(())
    }

    /// Vertical space used in a column after placing `window`
    fn advance(&self, window: Window, used: i32, gap: i32, height: i32) -> i32 {
        let outer = self.registry.client(window).map_or(0, |c| c.outer_height());
        if used + outer + gap < height {
            used + outer + gap
        } else {
            used
        }
    }

    /// Resize a client within the limits of its size hints
    pub(crate) fn resize(&mut self, window: Window, rect: Rectangle, interact: bool) -> Result<()> {
        let stale = self.registry.client(window).map_or(false, |c| {
            !c.hints.valid && (c.is_floating || self.config.global.resize_hints)
        });
        if stale {
            self.update_size_hints(window);
        }

        let adjusted = match self.registry.client(window) {
            Some(c) => c.apply_size_hints(
                rect,
                self.registry.monitors[c.monitor].area,
                self.screen,
                interact,
                self.config.global.resize_hints,
            ),
            None => return Ok(()),
        };

        match adjusted {
            Some(rect) => self.resize_client(window, rect),
            None => Ok(()),
        }
    }

    /// Move and resize a client to exactly `rect`
    pub(crate) fn resize_client(&mut self, window: Window, rect: Rectangle) -> Result<()> {
        let border = match self.registry.client_mut(window) {
            Some(c) => {
                c.geom = rect;
                if c.is_fullscreen {
                    0
                } else {
                    c.border_width
                }
            },
            None => return Ok(()),
        };

        self.conn.configure_window(window, rect, border)?;
        self.conn.send_configure_notify(window, rect, border)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        geometry::Rectangle,
        testing::{self, Call},
    };

    fn geom(wm: &testing::TestWm, window: u32) -> Rectangle {
        wm.registry.client(window).unwrap().geom
    }

    #[test]
    fn three_clients_without_gaps() {
        let mut wm = testing::window_manager(None);
        wm.gaps = false;
        for w in [0xa, 0xb, 0xc] {
            testing::map(&mut wm, w);
        }

        let area = wm.registry.monitors[0].area;
        assert_eq!(area, Rectangle::new(0, 0, 1000, 800 - wm.bar_height()));
        let h = area.h;
        assert_eq!(geom(&wm, 0xa), Rectangle::new(0, 0, 498, h - 2));
        assert_eq!(geom(&wm, 0xb), Rectangle::new(500, 0, 498, h / 2 - 2));
        assert_eq!(geom(&wm, 0xc), Rectangle::new(500, h / 2, 498, h - h / 2 - 2));
    }

    #[test]
    fn gaps_surround_the_columns() {
        let mut wm = testing::window_manager(None);
        testing::map(&mut wm, 0xa);
        testing::map(&mut wm, 0xb);

        let area = wm.registry.monitors[0].area;
        let width = (1000 - 16 - 12) * 50 / 100;
        assert_eq!(geom(&wm, 0xa), Rectangle::new(8, 8, width - 2, area.h - 16 - 2));
        assert_eq!(
            geom(&wm, 0xb),
            Rectangle::new(8 + width + 12, 8, 1000 - width - 2 - 16 - 12, area.h - 16 - 2)
        );
    }

    #[test]
    fn a_single_client_spans_the_area() {
        let mut wm = testing::window_manager(None);
        wm.gaps = false;
        testing::map(&mut wm, 0xa);
        let area = wm.registry.monitors[0].area;
        assert_eq!(geom(&wm, 0xa), Rectangle::new(0, 0, area.w - 2, area.h - 2));
    }

    #[test]
    fn arranging_twice_resizes_nothing() {
        let mut wm = testing::window_manager(None);
        for w in [0xa, 0xb, 0xc] {
            testing::map(&mut wm, w);
        }
        wm.arrange(Some(0)).unwrap();
        wm.conn.clear_calls();

        wm.arrange(Some(0)).unwrap();
        assert!(!wm
            .conn
            .calls()
            .iter()
            .any(|c| matches!(c, Call::ConfigureWindow(..))));
    }

    #[test]
    fn floating_clients_are_not_tiled() {
        let mut wm = testing::window_manager(None);
        wm.gaps = false;
        testing::map(&mut wm, 0xa);
        testing::map(&mut wm, 0xb);
        let before = geom(&wm, 0xb);
        wm.registry.client_mut(0xb).unwrap().is_floating = true;

        wm.arrange(Some(0)).unwrap();
        assert_eq!(geom(&wm, 0xb), before);
        let area = wm.registry.monitors[0].area;
        assert_eq!(geom(&wm, 0xa), Rectangle::new(0, 0, area.w - 2, area.h - 2));
    }

    #[test]
    fn hidden_clients_move_off_screen() {
        let mut wm = testing::window_manager(None);
        testing::map(&mut wm, 0xa);
        testing::map(&mut wm, 0xb);
        wm.registry.client_mut(0xa).unwrap().tags = 2;
        wm.conn.clear_calls();

        wm.arrange(Some(0)).unwrap();
        let c = wm.registry.client(0xa).unwrap();
        assert!(wm
            .conn
            .calls()
            .contains(&Call::MoveWindow(0xa, -2 * c.outer_width(), c.geom.y)));
    }

    #[test]
    fn more_masters_split_the_left_column() {
        let mut wm = testing::window_manager(None);
        wm.gaps = false;
        wm.registry.monitors[0].nmaster = 2;
        for w in [0xa, 0xb, 0xc] {
            testing::map(&mut wm, w);
        }
        let h = wm.registry.monitors[0].area.h;
        assert_eq!(geom(&wm, 0xa).w, 498);
        assert_eq!(geom(&wm, 0xb), Rectangle::new(0, h / 2, 498, h - h / 2 - 2));
        assert_eq!(geom(&wm, 0xc), Rectangle::new(500, 0, 498, h - 2));
    }
}
