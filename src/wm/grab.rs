//! Passive key and button grabs
//!
//! Every binding is grabbed four times, with and without Caps_Lock and
//! Num_Lock, so that it fires whatever state the locks are in.

use super::WindowManager;
use crate::{
    core::Window,
    x::{
        input::{mask_of, modifier_bits, Click},
        render::Renderer,
        XConn,
    },
};
use anyhow::Result;
use x11rb::protocol::xproto::{Button as XButton, ModMask as XModMask};

impl<C: XConn, R: Renderer> WindowManager<C, R> {
    /// Strip lock modifiers and anything that is not a real modifier
    pub(crate) fn clean_mask(&self, mask: u16) -> u16 {
        mask & !(self.numlock | u16::from(XModMask::LOCK)) & modifier_bits()
    }

    /// Lock combinations a binding is grabbed with
    fn lock_variants(&self) -> [u16; 4] {
        let lock = u16::from(XModMask::LOCK);
        [0, lock, self.numlock, lock | self.numlock]
    }

    /// Grab every bound key on the root window, replacing previous grabs
    pub(crate) fn grab_keys(&mut self) -> Result<()> {
        self.numlock = self.conn.numlock_mask()?;
        log::debug!("grabbing keys, numlock is {:#x}", self.numlock);
        self.conn.ungrab_all_keys()?;

        for key in &self.config.keys {
            let mods = mask_of(&key.mods);
            for keycode in self.conn.keysym_to_keycodes(key.key) {
                for lock in self.lock_variants() {
                    self.conn.grab_key(keycode, mods | lock)?;
                }
            }
        }

        Ok(())
    }

    /// Grab the client-window button bindings on a client. Unfocused
    /// clients also get every button grabbed, so a click focuses them
    pub(crate) fn grab_buttons(&mut self, window: Window, focused: bool) -> Result<()> {
        self.conn.ungrab_all_buttons(window)?;
        if !focused {
            self.conn.grab_any_button(window)?;
        }

        for binding in self
            .config
            .buttons
            .iter()
            .filter(|b| b.click == Click::ClientWin)
        {
            let mods = mask_of(&binding.mods);
            for lock in self.lock_variants() {
                self.conn
                    .grab_button(window, XButton::from(binding.button), mods | lock)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::{Action, ButtonBinding, KeyBinding},
        testing::{self, Call},
        x::{
            event::XEvent,
            input::{Button, Click, ModMask},
            keysym,
        },
    };

    #[test]
    fn lock_and_numlock_are_ignored() {
        let wm = testing::window_manager(None);
        // Mod2 is Num_Lock in the mock
        assert_eq!(wm.clean_mask(0x40 | 0x10 | 0x02), 0x40);
        assert_eq!(wm.clean_mask(0x01 | 0x04 | 0x8000), 0x05);
    }

    #[test]
    fn keys_are_grabbed_with_every_lock_combination() {
        let mut wm = testing::window_manager(None);
        wm.config.keys = vec![KeyBinding {
            mods:   vec![ModMask::Mod4],
            key:    keysym::from_name("j").unwrap(),
            action: Action::FocusStack(1),
        }];
        wm.conn.clear_calls();
        wm.grab_keys().unwrap();

        let keycode = wm.conn.keycode_of(keysym::from_name("j").unwrap());
        assert_eq!(wm.conn.calls(), vec![
            Call::UngrabAllKeys,
            Call::GrabKey(keycode, 0x40),
            Call::GrabKey(keycode, 0x42),
            Call::GrabKey(keycode, 0x50),
            Call::GrabKey(keycode, 0x52),
        ]);
    }

    #[test]
    fn unfocused_clients_grab_every_button() {
        let mut wm = testing::window_manager(None);
        wm.config.buttons = vec![ButtonBinding {
            click:  Click::ClientWin,
            mods:   vec![ModMask::Mod4],
            button: Button::Left,
            action: Action::Zoom,
        }];
        wm.conn.clear_calls();

        wm.grab_buttons(0xa, false).unwrap();
        let calls = wm.conn.calls();
        assert_eq!(calls[0], Call::UngrabAllButtons(0xa));
        assert_eq!(calls[1], Call::GrabAnyButton(0xa));
        assert_eq!(calls.len(), 6);

        wm.conn.clear_calls();
        wm.grab_buttons(0xa, true).unwrap();
        assert!(!wm.conn.calls().contains(&Call::GrabAnyButton(0xa)));
        assert!(wm.conn.calls().contains(&Call::GrabButton(0xa, 1, 0x52)));
    }

    #[test]
    fn keyboard_remapping_regrabs() {
        let mut wm = testing::window_manager(None);
        wm.conn.clear_calls();
        wm.handle_event(XEvent::MappingNotify { keyboard: false }).unwrap();
        assert!(!wm.conn.calls().contains(&Call::UngrabAllKeys));

        wm.handle_event(XEvent::MappingNotify { keyboard: true }).unwrap();
        let calls = wm.conn.calls();
        assert!(calls.contains(&Call::RefreshKeyboardMapping));
        assert!(calls.contains(&Call::UngrabAllKeys));
    }
}
