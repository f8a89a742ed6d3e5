//! Running user commands
//!
//! Children are started in their own session and never waited on by the
//! event loop. A background thread reaps them as they exit.

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{Receiver, Sender};
use nix::{
    errno::Errno,
    sys::wait::{waitpid, WaitStatus},
    unistd::{setsid, Pid},
};
use std::{
    io,
    os::unix::process::CommandExt,
    process::{Command, Stdio},
    thread,
};

/// Something that can start a detached command
pub(crate) trait ProcessLauncher {
    /// Start `argv[0]` with the remaining arguments, without waiting for it
    fn spawn(&self, argv: &[String]) -> Result<()>;
}

/// Launches commands as real processes
#[derive(Debug)]
pub(crate) struct Launcher {
    /// Tells the reaper a new child exists
    notify: Sender<u32>,
}

impl Launcher {
    /// Create a new [`Launcher`] along with its reaper thread
    pub(crate) fn new() -> Result<Self> {
        let (notify, children) = crossbeam_channel::unbounded();
        thread::Builder::new()
            .name(String::from("reaper"))
            .spawn(move || reap(&children))
            .context("failed to start the reaper thread")?;

        Ok(Self { notify })
    }
}

impl ProcessLauncher for Launcher {
    fn spawn(&self, argv: &[String]) -> Result<()> {
        let (prog, args) = argv
            .split_first()
            .ok_or_else(|| anyhow!("cannot spawn an empty command"))?;

        let mut cmd = Command::new(prog);
        cmd.args(args).stdin(Stdio::null());

        // SAFETY: only `setsid` runs between fork and exec, which is
        // async-signal-safe
        #[allow(unsafe_code)]
        unsafe {
            cmd.pre_exec(|| {
                setsid()
                    .map(drop)
                    .map_err(|e| io::Error::from_raw_os_error(e as i32))
            });
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("unable to run {}", prog))?;
        log::debug!("spawned {} as {}", prog, child.id());

        // The reaper only goes away with the process
        drop(self.notify.send(child.id()));

        Ok(())
    }
}

/// Wait on every child after each launch until none are left
fn reap(children: &Receiver<u32>) {
    for pid in children.iter() {
        log::trace!("reaper woken by {}", pid);
        loop {
            match waitpid(Pid::from_raw(-1), None) {
                Ok(WaitStatus::Exited(pid, code)) => {
                    log::debug!("child {} exited with {}", pid, code);
                },
                Ok(WaitStatus::Signaled(pid, sig, _)) => {
                    log::debug!("child {} was killed by {}", pid, sig);
                },
                Ok(_) | Err(Errno::EINTR) => {},
                Err(Errno::ECHILD) => break,
                Err(e) => {
                    log::warn!("failed to reap children: {}", e);
                    break;
                },
            }
        }
    }
}
