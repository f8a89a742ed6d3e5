//! Input focus, borders and stacking order

use super::WindowManager;
use crate::{
    core::{MonitorId, Window},
    x::{render::Renderer, Protocol, XConn},
};
use anyhow::Result;

impl<C: XConn, R: Renderer> WindowManager<C, R> {
    /// Focus a client, or the most recently focused visible client of the
    /// selected monitor when `window` is `None` or hidden
    pub(crate) fn focus(&mut self, window: Option<Window>) -> Result<()> {
        let target = window
            .filter(|&w| self.registry.is_visible(w))
            .or_else(|| self.registry.first_visible(self.registry.selected));

        let prev = self.registry.sel();
        if prev.is_some() && prev != target {
            self.unfocus(prev, false)?;
        }

        if let Some(w) = target {
            log::debug!("focusing Window({:#0x})", w);
            let (mon, urgent) = match self.registry.client(w) {
                Some(c) => (c.monitor, c.is_urgent),
                None => return Ok(()),
            };
            if mon != self.registry.selected {
                self.registry.selected = mon;
            }
            if urgent {
                self.set_urgent(w, false)?;
            }
            self.registry.detach_stack(w);
            self.registry.attach_stack(w);
            self.grab_buttons(w, true)?;
            self.conn
                .set_border_color(w, self.config.global.selected.border)?;
            self.set_focus(w)?;
        } else {
            self.conn.revert_focus()?;
        }

        self.registry.selmon_mut().sel = target;
        self.draw_bars()
    }

    /// Give a client the normal look and click-to-focus grabs. With `revert`,
    /// the input focus also goes back to the root window
    pub(crate) fn unfocus(&mut self, window: Option<Window>, revert: bool) -> Result<()> {
        let window = match window {
            Some(w) => w,
            None => return Ok(()),
        };
        log::trace!("unfocusing Window({:#0x})", window);

        self.grab_buttons(window, false)?;
        self.conn
            .set_border_color(window, self.config.global.normal.border)?;
        if revert {
            self.conn.revert_focus()?;
        }

        Ok(())
    }

    /// Hand the input focus to a client. Clients declining it through their
    /// input hint are only asked to take it
    pub(crate) fn set_focus(&mut self, window: Window) -> Result<()> {
        let never_focus = self
            .registry
            .client(window)
            .map_or(false, |c| c.never_focus);
        if !never_focus {
            self.conn.focus_window(window)?;
        }
        self.conn.send_protocol(window, Protocol::TakeFocus)?;

        Ok(())
    }

    /// Set or clear a client's urgency, mirroring it in `WM_HINTS`
    pub(crate) fn set_urgent(&mut self, window: Window, urgent: bool) -> Result<()> {
        if let Some(c) = self.registry.client_mut(window) {
            c.is_urgent = urgent;
        }
        self.conn.set_urgency(window, urgent)
    }

    /// Raise the selected client if it floats and put the tiled clients
    /// below the bar, most recently focused on top
    pub(crate) fn restack(&mut self, mon: MonitorId) -> Result<()> {
        self.draw_bar(mon)?;

        let m = &self.registry.monitors[mon];
        let sel = match m.sel {
            Some(sel) => sel,
            None => return Ok(()),
        };

        if self.registry.client(sel).map_or(false, |c| c.is_floating) {
            self.conn.raise_window(sel)?;
        }

        if let Some(bar) = m.bar {
            let mut sibling = bar;
            for &w in &m.stack {
                let tiled = self.registry.client(w).map_or(false, |c| !c.is_floating);
                if tiled && self.registry.is_visible(w) {
                    self.conn.stack_below(w, sibling)?;
                    sibling = w;
                }
            }
        }

        self.conn.sync()?;
        self.conn.discard_enter_events()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::Scheme,
        testing::{self, Call},
        x::Protocol,
    };

    #[test]
    fn focus_none_is_idempotent() {
        let mut wm = testing::window_manager(None);
        testing::map(&mut wm, 0x200);
        testing::map(&mut wm, 0x300);

        wm.focus(None).unwrap();
        let first = wm.registry.sel();
        wm.focus(None).unwrap();
        assert_eq!(wm.registry.sel(), first);
        assert_eq!(first, Some(0x300));
    }

    #[test]
    fn focus_falls_back_to_the_most_recent_visible() {
        let mut wm = testing::window_manager(None);
        testing::map(&mut wm, 0x200);
        testing::map(&mut wm, 0x300);
        testing::map(&mut wm, 0x400);
        wm.focus(Some(0x200)).unwrap();
        assert_eq!(wm.registry.selmon().stack, vec![0x200, 0x400, 0x300]);

        wm.registry.client_mut(0x200).unwrap().tags = 2;
        wm.focus(Some(0x200)).unwrap();
        assert_eq!(wm.registry.sel(), Some(0x400));
        assert_eq!(wm.registry.check_invariants(), Ok(()));
    }

    #[test]
    fn focus_changes_borders_and_grabs() {
        let mut wm = testing::window_manager(None);
        testing::map(&mut wm, 0x200);
        testing::map(&mut wm, 0x300);
        wm.conn.clear_calls();

        wm.focus(Some(0x200)).unwrap();
        let calls = wm.conn.calls();
        assert!(calls.contains(&Call::SetBorderColor(0x300, Scheme::NORMAL.border)));
        assert!(calls.contains(&Call::GrabAnyButton(0x300)));
        assert!(calls.contains(&Call::SetBorderColor(0x200, Scheme::SELECTED.border)));
        assert!(calls.contains(&Call::FocusWindow(0x200)));
        assert!(!calls.contains(&Call::RevertFocus));
    }

    #[test]
    fn nothing_to_focus_reverts_to_root() {
        let mut wm = testing::window_manager(None);
        wm.conn.clear_calls();
        wm.focus(None).unwrap();
        assert_eq!(wm.registry.sel(), None);
        assert!(wm.conn.calls().contains(&Call::RevertFocus));
    }

    #[test]
    fn never_focus_clients_are_only_asked() {
        let mut wm = testing::window_manager(None);
        testing::map(&mut wm, 0x200);
        wm.registry.client_mut(0x200).unwrap().never_focus = true;
        wm.conn.clear_calls();

        wm.focus(Some(0x200)).unwrap();
        let calls = wm.conn.calls();
        assert!(!calls.contains(&Call::FocusWindow(0x200)));
        assert!(calls.contains(&Call::SendProtocol(0x200, Protocol::TakeFocus)));
        assert!(calls.contains(&Call::SetBorderColor(0x200, Scheme::SELECTED.border)));
    }

    #[test]
    fn focusing_clears_urgency() {
        let mut wm = testing::window_manager(None);
        testing::map(&mut wm, 0x200);
        testing::map(&mut wm, 0x300);
        wm.set_urgent(0x200, true).unwrap();

        wm.focus(Some(0x200)).unwrap();
        assert!(!wm.registry.client(0x200).unwrap().is_urgent);
        assert!(wm.conn.calls().contains(&Call::SetUrgency(0x200, false)));
    }

    #[test]
    fn restack_puts_tiled_clients_below_the_bar() {
        let mut wm = testing::window_manager(None);
        testing::map(&mut wm, 0x200);
        testing::map(&mut wm, 0x300);
        testing::map(&mut wm, 0x400);
        wm.registry.client_mut(0x300).unwrap().is_floating = true;
        wm.focus(Some(0x300)).unwrap();
        let bar = wm.registry.selmon().bar.unwrap();
        wm.conn.clear_calls();

        wm.restack(0).unwrap();
        let stacking: Vec<_> = wm
            .conn
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::StackBelow(..) | Call::RaiseWindow(_)))
            .collect();
        assert_eq!(stacking, vec![
            Call::RaiseWindow(0x300),
            Call::StackBelow(0x400, bar),
            Call::StackBelow(0x200, 0x400),
        ]);
        assert!(wm.conn.calls().contains(&Call::DiscardEnterEvents));
    }
}
