//! Actions that can be bound to keys and buttons

use super::WindowManager;
use crate::{
    config::Action,
    core::{TagMask, Window},
    x::{render::Renderer, Protocol, XConn},
};
use anyhow::Result;

impl<C: XConn, R: Renderer> WindowManager<C, R> {
    /// Run a bound action. `clicked` is the tag under the pointer when the
    /// binding fired on the tag bar
    pub(crate) fn run_action(&mut self, action: &Action, clicked: Option<TagMask>) -> Result<()> {
        log::debug!("running action: {}", action);
        let ntags = self.config.global.tags.len();

        match action {
            Action::Spawn(argv) => {
                if let Err(e) = self.launcher.spawn(argv) {
                    log::error!("{:#}", e);
                }
                Ok(())
            },
            Action::StartExec => self.start_exec(),
            Action::KillClient => self.kill_client(),
            Action::Zoom => self.zoom(),
            Action::FocusStack(dir) => self.focus_stack(*dir),
            Action::SetMfact(delta) => self.set_mfact(*delta),
            Action::IncNmaster(delta) => self.inc_nmaster(*delta),
            Action::FocusMon(dir) => self.focus_mon(*dir),
            Action::TagMon(dir) => self.tag_mon(*dir),
            Action::ToggleBar => self.toggle_bar(),
            Action::ToggleGaps => {
                self.gaps = !self.gaps;
                self.arrange(None)
            },
            Action::View(arg) => self.view(arg.mask(ntags, clicked)),
            Action::ToggleView(arg) => self.toggle_view(arg.mask(ntags, clicked)),
            Action::Tag(arg) => self.tag(arg.mask(ntags, clicked)),
            Action::ToggleTag(arg) => self.toggle_tag(arg.mask(ntags, clicked)),
            Action::Quit => {
                log::info!("quitting");
                self.running = false;
                Ok(())
            },
        }
    }

    /// Focus the next (`dir > 0`) or previous visible client, wrapping
    /// around. Does nothing while the selection is fullscreen
    fn focus_stack(&mut self, dir: i32) -> Result<()> {
        let sel = match self.registry.sel() {
            Some(sel) => sel,
            None => return Ok(()),
        };
        if self.registry.client(sel).map_or(true, |c| c.is_fullscreen) {
            return Ok(());
        }

        let visible = self
            .registry
            .selmon()
            .clients
            .iter()
            .copied()
            .filter(|&w| self.registry.is_visible(w))
            .collect::<Vec<_>>();
        let pos = match visible.iter().position(|&w| w == sel) {
            Some(pos) => pos,
            None => return Ok(()),
        };
        let len = visible.len();
        let next = if dir > 0 {
            visible[(pos + 1) % len]
        } else {
            visible[(pos + len - 1) % len]
        };

        self.focus(Some(next))?;
        self.restack(self.registry.selected)
    }

    /// Swap the selection into the master area. When it already is the
    /// master, the next tiled client takes its place
    fn zoom(&mut self) -> Result<()> {
        let sel = match self.registry.sel() {
            Some(sel) if self.registry.client(sel).map_or(false, |c| !c.is_floating) => sel,
            _ => return Ok(()),
        };

        let target = {
            let mut tiled = self.registry.tiled(self.registry.selected);
            if tiled.next() == Some(sel) {
                match tiled.next() {
                    Some(next) => next,
                    None => return Ok(()),
                }
            } else {
                sel
            }
        };

        self.pop(target)
    }

    /// Make a client the master, focus it and re-tile
    fn pop(&mut self, window: Window) -> Result<()> {
        self.registry.pop(window);
        self.focus(Some(window))?;
        self.arrange(Some(self.registry.selected))
    }

    /// Grow or shrink the master column. Values above 100 set it to the
    /// value minus 100
    fn set_mfact(&mut self, delta: i32) -> Result<()> {
        let current = self.registry.selmon().mfact as i32;
        let mfact = if delta > 100 {
            delta - 100
        } else {
            current + delta
        };
        if !(5..=95).contains(&mfact) {
            return Ok(());
        }

        self.registry.selmon_mut().mfact = mfact as u32;
        self.arrange(Some(self.registry.selected))
    }

    /// Change how many clients share the master column, keeping at least one
    fn inc_nmaster(&mut self, delta: i32) -> Result<()> {
        let m = self.registry.selmon_mut();
        m.nmaster = (m.nmaster as i32 + delta).max(1) as u32;
        self.arrange(Some(self.registry.selected))
    }

    /// Close the selection, politely if it takes part in `WM_DELETE_WINDOW`
    fn kill_client(&mut self) -> Result<()> {
        let sel = match self.registry.sel() {
            Some(sel) => sel,
            None => return Ok(()),
        };

        if !self.conn.send_protocol(sel, Protocol::Delete)? {
            log::debug!("killing Window({:#0x})", sel);
            self.conn.grab_server()?;
            drop(self.conn.kill_client(sel));
            drop(self.conn.sync());
            self.conn.ungrab_server()?;
        }

        Ok(())
    }

    /// Select the next or previous monitor
    fn focus_mon(&mut self, dir: i32) -> Result<()> {
        if self.registry.monitors.len() <= 1 {
            return Ok(());
        }
        let mon = self.registry.dir_to_monitor(dir);
        if mon == self.registry.selected {
            return Ok(());
        }

        self.unfocus(self.registry.sel(), false)?;
        self.registry.selected = mon;
        self.focus(None)
    }

    /// Send the selection to the next or previous monitor
    fn tag_mon(&mut self, dir: i32) -> Result<()> {
        match self.registry.sel() {
            Some(sel) if self.registry.monitors.len() > 1 => {
                let mon = self.registry.dir_to_monitor(dir);
                self.send_monitor(sel, mon)
            },
            _ => Ok(()),
        }
    }

    /// Show or hide the bar of the selected monitor
    fn toggle_bar(&mut self) -> Result<()> {
        let bh = self.bar_height;
        let m = self.registry.selmon_mut();
        m.show_bar = !m.show_bar;
        m.update_bar_position(bh);

        if let Some(bar) = m.bar {
            let rect = m.bar_rect(bh);
            self.conn.configure_window(bar, rect, 0)?;
        }
        self.arrange(Some(self.registry.selected))
    }

    /// Show exactly the given tags
    fn view(&mut self, mask: TagMask) -> Result<()> {
        if mask == 0 || mask == self.registry.selmon().tags {
            return Ok(());
        }

        self.registry.selmon_mut().tags = mask;
        self.focus(None)?;
        self.arrange(Some(self.registry.selected))
    }

    /// Add or remove tags from the view, which may not become empty
    fn toggle_view(&mut self, mask: TagMask) -> Result<()> {
        let tags = self.registry.selmon().tags ^ mask;
        if tags == 0 {
            return Ok(());
        }

        self.registry.selmon_mut().tags = tags;
        self.focus(None)?;
        self.arrange(Some(self.registry.selected))
    }

    /// Put the selection on exactly the given tags
    fn tag(&mut self, mask: TagMask) -> Result<()> {
        match self.registry.sel().and_then(|w| self.registry.client_mut(w)) {
            Some(c) if mask != 0 => c.tags = mask,
            _ => return Ok(()),
        }

        self.focus(None)?;
        self.arrange(Some(self.registry.selected))
    }

    /// Add or remove tags from the selection, which may not lose all of them
    fn toggle_tag(&mut self, mask: TagMask) -> Result<()> {
        match self.registry.sel().and_then(|w| self.registry.client_mut(w)) {
            Some(c) if c.tags ^ mask != 0 => c.tags ^= mask,
            _ => return Ok(()),
        }

        self.focus(None)?;
        self.arrange(Some(self.registry.selected))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::{Action, TagArg, TagKeyword},
        geometry::Rectangle,
        testing::{self, Call},
        x::Protocol,
    };

    fn single(idx: u32) -> TagArg {
        TagArg::Single(idx)
    }

    #[test]
    fn focus_stack_wraps_around() {
        let mut wm = testing::window_manager(None);
        for w in [0xa, 0xb, 0xc] {
            testing::map(&mut wm, w);
        }
        assert_eq!(wm.registry.sel(), Some(0xc));

        wm.run_action(&Action::FocusStack(1), None).unwrap();
        assert_eq!(wm.registry.sel(), Some(0xa));
        wm.run_action(&Action::FocusStack(-1), None).unwrap();
        assert_eq!(wm.registry.sel(), Some(0xc));
        wm.run_action(&Action::FocusStack(-1), None).unwrap();
        assert_eq!(wm.registry.sel(), Some(0xb));
    }

    #[test]
    fn focus_stack_stays_on_fullscreen_clients() {
        let mut wm = testing::window_manager(None);
        testing::map(&mut wm, 0xa);
        testing::map(&mut wm, 0xb);
        wm.set_fullscreen(0xb, true).unwrap();

        wm.run_action(&Action::FocusStack(1), None).unwrap();
        assert_eq!(wm.registry.sel(), Some(0xb));
    }

    #[test]
    fn zoom_swaps_the_master() {
        let mut wm = testing::window_manager(None);
        for w in [0xa, 0xb, 0xc] {
            testing::map(&mut wm, w);
        }

        wm.run_action(&Action::Zoom, None).unwrap();
        assert_eq!(wm.registry.selmon().clients, vec![0xc, 0xa, 0xb]);
        assert_eq!(wm.registry.sel(), Some(0xc));

        // The master gives way to the next tiled client
        wm.run_action(&Action::Zoom, None).unwrap();
        assert_eq!(wm.registry.selmon().clients, vec![0xa, 0xc, 0xb]);
        assert_eq!(wm.registry.sel(), Some(0xa));
        assert_eq!(wm.registry.check_invariants(), Ok(()));
    }

    #[test]
    fn zoom_without_a_selection_does_nothing() {
        let mut wm = testing::window_manager(None);
        wm.run_action(&Action::Zoom, None).unwrap();
        testing::map(&mut wm, 0xa);
        wm.run_action(&Action::Zoom, None).unwrap();
        assert_eq!(wm.registry.selmon().clients, vec![0xa]);
    }

    #[test]
    fn mfact_stays_in_bounds() {
        let mut wm = testing::window_manager(None);
        wm.run_action(&Action::SetMfact(40), None).unwrap();
        assert_eq!(wm.registry.selmon().mfact, 90);
        wm.run_action(&Action::SetMfact(10), None).unwrap();
        assert_eq!(wm.registry.selmon().mfact, 90);
        wm.run_action(&Action::SetMfact(130), None).unwrap();
        assert_eq!(wm.registry.selmon().mfact, 30);
        wm.run_action(&Action::SetMfact(199), None).unwrap();
        assert_eq!(wm.registry.selmon().mfact, 30);
    }

    #[test]
    fn nmaster_never_drops_below_one() {
        let mut wm = testing::window_manager(None);
        wm.run_action(&Action::IncNmaster(2), None).unwrap();
        assert_eq!(wm.registry.selmon().nmaster, 3);
        wm.run_action(&Action::IncNmaster(-5), None).unwrap();
        assert_eq!(wm.registry.selmon().nmaster, 1);
    }

    #[test]
    fn kill_is_polite_when_possible() {
        let mut wm = testing::window_manager(None);
        testing::map(&mut wm, 0xa);
        wm.conn.window_mut(0xa).protocols = vec![Protocol::Delete];
        wm.conn.clear_calls();
        wm.run_action(&Action::KillClient, None).unwrap();
        assert_eq!(wm.conn.calls(), vec![Call::SendProtocol(0xa, Protocol::Delete)]);

        wm.conn.window_mut(0xa).protocols.clear();
        wm.conn.clear_calls();
        wm.run_action(&Action::KillClient, None).unwrap();
        assert_eq!(wm.conn.calls(), vec![
            Call::SendProtocol(0xa, Protocol::Delete),
            Call::GrabServer,
            Call::KillClient(0xa),
            Call::Sync,
            Call::UngrabServer,
        ]);
    }

    #[test]
    fn views_are_never_empty() {
        let mut wm = testing::window_manager(None);
        wm.run_action(&Action::View(single(3)), None).unwrap();
        assert_eq!(wm.registry.selmon().tags, 0b100);

        wm.run_action(&Action::View(single(12)), None).unwrap();
        assert_eq!(wm.registry.selmon().tags, 0b100);

        wm.run_action(&Action::ToggleView(single(3)), None).unwrap();
        assert_eq!(wm.registry.selmon().tags, 0b100);

        wm.run_action(&Action::ToggleView(single(1)), None).unwrap();
        assert_eq!(wm.registry.selmon().tags, 0b101);
    }

    #[test]
    fn viewing_another_tag_hides_and_refocuses() {
        let mut wm = testing::window_manager(None);
        testing::map(&mut wm, 0xa);
        wm.run_action(&Action::View(single(2)), None).unwrap();
        assert_eq!(wm.registry.sel(), None);

        testing::map(&mut wm, 0xb);
        wm.run_action(&Action::View(single(1)), None).unwrap();
        assert_eq!(wm.registry.sel(), Some(0xa));
        assert_eq!(wm.registry.check_invariants(), Ok(()));
    }

    #[test]
    fn clients_always_keep_a_tag() {
        let mut wm = testing::window_manager(None);
        testing::map(&mut wm, 0xa);

        wm.run_action(&Action::ToggleTag(single(1)), None).unwrap();
        assert_eq!(wm.registry.client(0xa).unwrap().tags, 0b1);

        wm.run_action(&Action::ToggleTag(single(4)), None).unwrap();
        assert_eq!(wm.registry.client(0xa).unwrap().tags, 0b1001);

        wm.run_action(&Action::Tag(TagArg::Named(TagKeyword::All)), None)
            .unwrap();
        assert_eq!(wm.registry.client(0xa).unwrap().tags, 0x1ff);

        wm.run_action(&Action::Tag(TagArg::Named(TagKeyword::Clicked)), None)
            .unwrap();
        assert_eq!(wm.registry.client(0xa).unwrap().tags, 0x1ff);

        wm.run_action(&Action::Tag(single(2)), None).unwrap();
        assert_eq!(wm.registry.client(0xa).unwrap().tags, 0b10);
        assert_eq!(wm.registry.sel(), None);
        assert_eq!(wm.registry.check_invariants(), Ok(()));
    }

    #[test]
    fn monitors_are_cycled() {
        let mut wm = testing::window_manager(None);
        wm.run_action(&Action::FocusMon(1), None).unwrap();
        assert_eq!(wm.registry.selected, 0);

        let mut wm = testing::window_manager(Some(vec![
            Rectangle::new(0, 0, 1000, 800),
            Rectangle::new(1000, 0, 1000, 800),
        ]));
        testing::map(&mut wm, 0xa);
        wm.run_action(&Action::FocusMon(-1), None).unwrap();
        assert_eq!(wm.registry.selected, 1);
        assert_eq!(wm.registry.sel(), None);

        wm.run_action(&Action::FocusMon(1), None).unwrap();
        assert_eq!(wm.registry.sel(), Some(0xa));

        wm.run_action(&Action::TagMon(1), None).unwrap();
        assert_eq!(wm.registry.client(0xa).unwrap().monitor, 1);
        assert_eq!(wm.registry.selected, 0);
        assert_eq!(wm.registry.check_invariants(), Ok(()));
    }

    #[test]
    fn toggling_the_bar_grows_the_area() {
        let mut wm = testing::window_manager(None);
        wm.gaps = false;
        testing::map(&mut wm, 0xa);

        wm.run_action(&Action::ToggleBar, None).unwrap();
        let m = wm.registry.selmon();
        assert!(!m.show_bar);
        assert_eq!(m.area, m.screen);
        assert_eq!(
            wm.registry.client(0xa).unwrap().geom,
            Rectangle::new(0, 0, 998, 798)
        );
        assert!(wm.conn.calls().contains(&Call::ConfigureWindow(
            m.bar.unwrap(),
            m.bar_rect(wm.bar_height()),
            0
        )));
    }

    #[test]
    fn toggling_gaps_retiles() {
        let mut wm = testing::window_manager(None);
        testing::map(&mut wm, 0xa);
        assert_eq!(wm.registry.client(0xa).unwrap().geom.x, 8);
        wm.run_action(&Action::ToggleGaps, None).unwrap();
        assert_eq!(wm.registry.client(0xa).unwrap().geom.x, 0);
    }

    #[test]
    fn spawning_goes_through_the_launcher() {
        let mut wm = testing::window_manager(None);
        let argv = vec![String::from("st"), String::from("-e"), String::from("htop")];
        wm.run_action(&Action::Spawn(argv.clone()), None).unwrap();
        assert_eq!(testing::spawned(), vec![argv]);

        // Failures are only logged
        wm.run_action(&Action::Spawn(vec![]), None).unwrap();
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut wm = testing::window_manager(None);
        wm.run_action(&Action::Quit, None).unwrap();
        assert!(!wm.running);
    }
}
