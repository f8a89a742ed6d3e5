//! Drawing the bars and finding out what was clicked on them

use super::WindowManager;
use crate::{
    core::{MonitorId, TagMask, PADDING},
    x::{input::Click, render::Renderer, XConn},
};
use anyhow::Result;

impl<C: XConn, R: Renderer> WindowManager<C, R> {
    /// Redraw every bar
    pub(crate) fn draw_bars(&mut self) -> Result<()> {
        for mon in 0..self.registry.monitors.len() {
            self.draw_bar(mon)?;
        }
        Ok(())
    }

    /// Redraw the bar of one monitor: status text, tags, then the title of
    /// the selected client or the command being typed
    pub(crate) fn draw_bar(&mut self, mon: MonitorId) -> Result<()> {
        let m = &self.registry.monitors[mon];
        let bar = match m.bar {
            Some(bar) if m.show_bar => bar,
            _ => return Ok(()),
        };

        let bh = self.bar_height;
        let ww = m.area.w;
        let is_selmon = mon == self.registry.selected;
        let normal = self.config.global.normal;
        let selected = self.config.global.selected;
        let active = if is_selmon { selected } else { normal };

        // Status first, so that tags may cover it on narrow monitors
        let mut tw = 0;
        if is_selmon {
            self.renderer.set_scheme(&normal);
            tw = self.renderer.text_width(&self.status) + 2;
            self.renderer
                .text(ww - tw, 0, tw, bh, 0, &self.status, false)?;
        }

        let (occupied, urgent) = self.registry.occupied(mon);
        let boxs = PADDING / 9;
        let boxw = PADDING / 6 + 2;
        let sel_tags = if is_selmon {
            m.sel
                .and_then(|w| self.registry.client(w))
                .map_or(0, |c| c.tags)
        } else {
            0
        };

        let mut x = 0;
        for (i, name) in self.config.global.tags.iter().enumerate() {
            let bit: TagMask = 1 << i;
            let w = self.renderer.text_width(name) + PADDING;
            self.renderer
                .set_scheme(if m.tags & bit == 0 { &normal } else { &selected });
            self.renderer
                .text(x, 0, w, bh, PADDING / 2, name, urgent & bit != 0)?;
            if occupied & bit != 0 {
                self.renderer.rect(
                    x + boxs,
                    boxs,
                    boxw,
                    boxw,
                    sel_tags & bit != 0,
                    urgent & bit != 0,
                )?;
            }
            x += w;
        }

        let w = ww - tw - x;
        if w > bh {
            if let Some(buf) = &self.exec {
                self.renderer.set_scheme(&active);
                self.renderer.text(x, 0, w, bh, PADDING / 2, buf, false)?;
            } else if let Some(c) = m.sel.and_then(|w| self.registry.client(w)) {
                self.renderer.set_scheme(&active);
                self.renderer
                    .text(x, 0, w, bh, PADDING / 2, &c.name, false)?;
                if c.is_floating {
                    self.renderer
                        .rect(x + boxs, boxs, boxw, boxw, c.is_fixed, false)?;
                }
            } else {
                self.renderer.set_scheme(&normal);
                self.renderer.rect(x, 0, w, bh, true, true)?;
            }
        }

        self.renderer.map(bar, 0, 0, ww, bh)
    }

    /// Region of a bar under `x`, along with the tag when it is one
    pub(crate) fn bar_click(&self, mon: MonitorId, x: i32) -> (Click, Option<TagMask>) {
        let mut right = 0;
        for (i, name) in self.config.global.tags.iter().enumerate() {
            right += self.renderer.text_width(name) + PADDING;
            if x < right {
                return (Click::TagBar, Some(1 << i));
            }
        }

        let ww = self.registry.monitors[mon].area.w;
        if x > ww - (self.renderer.text_width(&self.status) + 2) {
            (Click::StatusText, None)
        } else {
            (Click::WinTitle, None)
        }
    }
}
