//! Typing a command on the bar

use super::WindowManager;
use crate::{
    core::{Keysym, NAME_LIMIT},
    x::{
        keysym::{self, XK_BACKSPACE, XK_ESCAPE, XK_RETURN},
        render::Renderer,
        XConn,
    },
};
use anyhow::Result;

impl<C: XConn, R: Renderer> WindowManager<C, R> {
    /// Start reading a command. Every key is grabbed until it is run or
    /// dismissed
    pub(crate) fn start_exec(&mut self) -> Result<()> {
        log::debug!("reading a command");
        self.exec = Some(String::new());
        self.conn.grab_any_key()?;
        self.draw_bar(self.registry.selected)
    }

    /// Feed a key that is not bound to anything to the command being typed
    pub(crate) fn prompt_key(&mut self, sym: Keysym) -> Result<()> {
        let buf = match self.exec.as_mut() {
            Some(buf) => buf,
            None => return Ok(()),
        };

        match sym {
            XK_RETURN => {
                let argv = buf
                    .split(' ')
                    .filter(|arg| !arg.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>();
                self.exec = None;
                if !argv.is_empty() {
                    if let Err(e) = self.launcher.spawn(&argv) {
                        log::error!("{:#}", e);
                    }
                }
                self.grab_keys()
            },
            XK_ESCAPE => {
                self.exec = None;
                self.grab_keys()
            },
            XK_BACKSPACE => {
                buf.pop();
                Ok(())
            },
            _ => {
                if let Some(ch) = keysym::to_char(sym) {
                    if buf.len() + ch.len_utf8() < NAME_LIMIT {
                        buf.push(ch);
                    }
                }
                Ok(())
            },
        }
    }
}
