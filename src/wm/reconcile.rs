//! Keeping monitors in line with the physical screens

use super::WindowManager;
use crate::{
    geometry::Rectangle,
    monitor::Monitor,
    x::{render::Renderer, XConn},
};
use anyhow::Result;
use itertools::Itertools;

impl<C: XConn, R: Renderer> WindowManager<C, R> {
    /// Create, update or remove monitors to match the screens the server
    /// reports. Clients of removed monitors move to the first one. Returns
    /// whether anything changed
    pub(crate) fn update_geometry(&mut self) -> Result<bool> {
        let screens = self
            .conn
            .screens()?
            .map(|rects| rects.into_iter().unique().collect::<Vec<_>>())
            .filter(|rects| !rects.is_empty())
            .unwrap_or_else(|| vec![Rectangle::new(0, 0, self.screen.w, self.screen.h)]);

        let mut dirty = false;
        let known = self.registry.monitors.len();

        for _ in known..screens.len() {
            log::debug!("adding a monitor");
            self.registry.add_monitor(Monitor::new(&self.config.global));
        }

        for (idx, &rect) in screens.iter().enumerate() {
            let mon = &mut self.registry.monitors[idx];
            if idx >= known || mon.screen != rect {
                log::debug!("monitor {} is now {}", idx, rect);
                dirty = true;
                mon.set_screen(rect, self.bar_height);
            }
        }

        while self.registry.monitors.len() > screens.len() {
            let last = self.registry.monitors.len() - 1;
            log::debug!("removing monitor {}", last);
            dirty = true;
            if let Some(bar) = self.registry.remove_monitor(last).and_then(|m| m.bar) {
                self.conn.destroy_window(bar)?;
            }
        }

        if dirty {
            self.registry.selected = 0;
            self.registry.selected = self.window_to_monitor(self.conn.root())?;
        }

        Ok(dirty)
    }

    /// Create the bars monitors are missing
    pub(crate) fn update_bars(&mut self) -> Result<()> {
        for mon in &mut self.registry.monitors {
            if mon.bar.is_none() {
                mon.bar = Some(self.conn.create_bar(mon.bar_rect(self.bar_height))?);
            }
        }
        Ok(())
    }

    /// The root window changed size or the screens were rearranged
    pub(crate) fn root_resized(&mut self, geom: Rectangle) -> Result<()> {
        let dirty = self.screen.w != geom.w || self.screen.h != geom.h;
        self.screen.w = geom.w;
        self.screen.h = geom.h;

        if self.update_geometry()? || dirty {
            self.renderer.resize(self.screen.w, self.bar_height)?;
            self.update_bars()?;

            for mon in 0..self.registry.monitors.len() {
                let m = &self.registry.monitors[mon];
                let screen = m.screen;
                let fullscreen = m
                    .clients
                    .iter()
                    .copied()
                    .filter(|&w| self.registry.client(w).map_or(false, |c| c.is_fullscreen))
                    .collect::<Vec<_>>();
                for w in fullscreen {
                    self.resize_client(w, screen)?;
                }

                let m = &self.registry.monitors[mon];
                if let Some(bar) = m.bar {
                    self.conn.configure_window(bar, m.bar_rect(self.bar_height), 0)?;
                }
            }

            self.focus(None)?;
            self.arrange(None)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        geometry::{Point, Rectangle},
        testing::{self, Call},
        x::{
            event::{ConfigureEvent, XEvent},
            XConn as _,
        },
    };

    const LEFT: Rectangle = Rectangle::new(0, 0, 1000, 800);
    const RIGHT: Rectangle = Rectangle::new(1000, 0, 1000, 800);

    #[test]
    fn duplicate_screens_collapse() {
        let wm = testing::window_manager(Some(vec![LEFT, LEFT, RIGHT]));
        assert_eq!(wm.registry.monitors.len(), 2);
        assert_eq!(wm.registry.monitors[1].screen, RIGHT);
    }

    #[test]
    fn without_xinerama_one_monitor_spans_the_screen() {
        let mut wm = testing::window_manager(None);
        assert_eq!(wm.registry.monitors.len(), 1);
        assert_eq!(wm.registry.monitors[0].screen, LEFT);

        wm.handle_event(XEvent::ConfigureNotify(ConfigureEvent {
            window: wm.conn.root(),
            geom:   Rectangle::new(0, 0, 1280, 1024),
        }))
        .unwrap();
        assert_eq!(wm.registry.monitors.len(), 1);
        assert_eq!(wm.registry.monitors[0].screen, Rectangle::new(0, 0, 1280, 1024));
        assert!(wm.conn.calls().contains(&Call::ConfigureWindow(
            wm.registry.monitors[0].bar.unwrap(),
            wm.registry.monitors[0].bar_rect(wm.bar_height()),
            0
        )));
    }

    #[test]
    fn unchanged_screens_are_not_dirty() {
        let mut wm = testing::window_manager(Some(vec![LEFT, RIGHT]));
        assert!(!wm.update_geometry().unwrap());
    }

    #[test]
    fn removing_the_selected_monitor_migrates_its_clients() {
        let mut wm = testing::window_manager(Some(vec![LEFT, RIGHT]));
        testing::map(&mut wm, 0xa);
        wm.conn.set_pointer(Point::new(1500, 400));
        wm.registry.selected = 1;
        wm.focus(None).unwrap();
        testing::map(&mut wm, 0xb);
        testing::map(&mut wm, 0xc);
        assert_eq!(wm.registry.selected, 1);
        assert_eq!(wm.registry.sel(), Some(0xc));
        let right_bar = wm.registry.monitors[1].bar.unwrap();

        wm.conn.set_screens(Some(vec![LEFT]));
        wm.conn.set_pointer(Point::new(500, 400));
        assert!(wm.update_geometry().unwrap());

        assert_eq!(wm.registry.monitors.len(), 1);
        assert_eq!(wm.registry.monitors[0].clients, vec![0xa, 0xb, 0xc]);
        assert_eq!(wm.registry.sel(), None);
        assert!(wm.conn.calls().contains(&Call::DestroyWindow(right_bar)));
        assert_eq!(wm.registry.check_invariants(), Ok(()));

        wm.focus(None).unwrap();
        assert_eq!(wm.registry.sel(), Some(0xc));
    }

    #[test]
    fn screen_changes_reach_the_layout() {
        let mut wm = testing::window_manager(Some(vec![LEFT, RIGHT]));
        wm.gaps = false;
        testing::map(&mut wm, 0xa);

        wm.conn.set_screens(Some(vec![Rectangle::new(0, 0, 600, 800), RIGHT]));
        wm.handle_event(XEvent::ConfigureNotify(ConfigureEvent {
            window: wm.conn.root(),
            geom:   Rectangle::new(0, 0, 2000, 800),
        }))
        .unwrap();

        let c = wm.registry.client(0xa).unwrap();
        assert_eq!(c.geom.w, 598);
    }
}
