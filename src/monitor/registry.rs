//! Ownership of every managed [`Client`] and every [`Monitor`]
//!
//! Clients live in a single arena keyed by their window. Each monitor keeps
//! two orderings of the windows it owns: `clients`, in the order they were
//! attached, and `stack`, most recently focused first. Nothing in here talks
//! to the X-Server.

use super::{client::Client, Monitor};
use crate::{
    core::{MonitorId, TagMask, Window},
    geometry::Rectangle,
};
use indexmap::IndexMap;

/// The window manager's view of clients and monitors
#[derive(Debug, Default)]
pub(crate) struct Registry {
    /// Every managed client
    clients:             IndexMap<Window, Client>,
    /// Monitors, in the order the server reported their screens
    pub(crate) monitors: Vec<Monitor>,
    /// The monitor receiving input. Always a valid index once a monitor
    /// exists
    pub(crate) selected: MonitorId,
}

impl Registry {
    /// Create an empty [`Registry`]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // ========================== Lookup ========================== [[[

    /// The selected monitor
    pub(crate) fn selmon(&self) -> &Monitor {
        &self.monitors[self.selected]
    }

    /// The selected monitor, mutably
    pub(crate) fn selmon_mut(&mut self) -> &mut Monitor {
        &mut self.monitors[self.selected]
    }

    /// The selected client of the selected monitor
    pub(crate) fn sel(&self) -> Option<Window> {
        self.monitors.get(self.selected).and_then(|m| m.sel)
    }

    /// Whether the window is managed
    pub(crate) fn contains(&self, window: Window) -> bool {
        self.clients.contains_key(&window)
    }

    /// The client of a window
    pub(crate) fn client(&self, window: Window) -> Option<&Client> {
        self.clients.get(&window)
    }

    /// The client of a window, mutably
    pub(crate) fn client_mut(&mut self, window: Window) -> Option<&mut Client> {
        self.clients.get_mut(&window)
    }

    /// Every managed client, in the order they were managed
    pub(crate) fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    /// Every managed window, monitor by monitor in `clients` order
    pub(crate) fn windows(&self) -> Vec<Window> {
        self.monitors
            .iter()
            .flat_map(|m| m.clients.iter().copied())
            .collect()
    }

    /// The monitor a bar window belongs to
    pub(crate) fn bar_monitor(&self, window: Window) -> Option<MonitorId> {
        self.monitors.iter().position(|m| m.bar == Some(window))
    }

    /// Whether the client is on a tag its monitor shows
    pub(crate) fn is_visible(&self, window: Window) -> bool {
        self.clients.get(&window).map_or(false, |c| {
            self.monitors
                .get(c.monitor)
                .map_or(false, |m| c.tags & m.tags != 0)
        })
    }

    /// Whether the client takes part in tiling
    fn is_tiled(&self, window: Window) -> bool {
        self.is_visible(window) && self.clients.get(&window).map_or(false, |c| !c.is_floating)
    }

    /// The first visible client in the monitor's focus history
    pub(crate) fn first_visible(&self, mon: MonitorId) -> Option<Window> {
        self.monitors[mon]
            .stack
            .iter()
            .copied()
            .find(|&w| self.is_visible(w))
    }

    /// Visible, non-floating clients of a monitor in `clients` order
    pub(crate) fn tiled(&self, mon: MonitorId) -> impl Iterator<Item = Window> + '_ {
        self.monitors[mon]
            .clients
            .iter()
            .copied()
            .filter(move |&w| self.is_tiled(w))
    }

    /// The first tiled client at or after `window` in `clients` order
    pub(crate) fn next_tiled(&self, window: Window) -> Option<Window> {
        let mon = self.clients.get(&window)?.monitor;
        let order = &self.monitors[mon].clients;
        let start = order.iter().position(|&w| w == window)?;
        order[start..]
            .iter()
            .copied()
            .find(|&w| self.is_tiled(w))
    }

    /// Union of the tags of every client on a monitor, and of the urgent ones
    pub(crate) fn occupied(&self, mon: MonitorId) -> (TagMask, TagMask) {
        self.monitors[mon]
            .clients
            .iter()
            .filter_map(|w| self.clients.get(w))
            .fold((0, 0), |(occ, urg), c| {
                (occ | c.tags, if c.is_urgent { urg | c.tags } else { urg })
            })
    }

    // ]]] === Lookup ===

    // ========================= Mutation ========================= [[[

    /// Take ownership of a client. It is not part of any ordering yet
    pub(crate) fn insert(&mut self, client: Client) {
        self.clients.insert(client.window, client);
    }

    /// Give up a client. It has to be detached from both orderings first
    pub(crate) fn remove(&mut self, window: Window) -> Option<Client> {
        self.clients.shift_remove(&window)
    }

    /// Append the client to its monitor's `clients`
    pub(crate) fn attach(&mut self, window: Window) {
        if let Some(c) = self.clients.get(&window) {
            self.monitors[c.monitor].clients.push(window);
        }
    }

    /// Remove the client from its monitor's `clients`
    pub(crate) fn detach(&mut self, window: Window) {
        if let Some(c) = self.clients.get(&window) {
            self.monitors[c.monitor].clients.retain(|&w| w != window);
        }
    }

    /// Put the client at the head of its monitor's `stack`
    pub(crate) fn attach_stack(&mut self, window: Window) {
        if let Some(c) = self.clients.get(&window) {
            self.monitors[c.monitor].stack.insert(0, window);
        }
    }

    /// Remove the client from its monitor's `stack`. When it was selected,
    /// the next visible client in the stack takes its place
    pub(crate) fn detach_stack(&mut self, window: Window) {
        let mon = match self.clients.get(&window) {
            Some(c) => c.monitor,
            None => return,
        };
        self.monitors[mon].stack.retain(|&w| w != window);

        if self.monitors[mon].sel == Some(window) {
            self.monitors[mon].sel = self.first_visible(mon);
        }
    }

    /// Move the client to the front of its monitor's `clients`
    pub(crate) fn pop(&mut self, window: Window) {
        self.detach(window);
        if let Some(c) = self.clients.get(&window) {
            self.monitors[c.monitor].clients.insert(0, window);
        }
    }

    /// Hand a client to another monitor, adopting the tags it shows
    pub(crate) fn migrate(&mut self, window: Window, to: MonitorId) {
        if !self.contains(window) || to >= self.monitors.len() {
            return;
        }
        self.detach(window);
        self.detach_stack(window);

        let tags = self.monitors[to].tags;
        if let Some(c) = self.clients.get_mut(&window) {
            c.monitor = to;
            c.tags = tags;
        }

        self.attach(window);
        self.attach_stack(window);
    }

    /// Append a monitor, returning its index
    pub(crate) fn add_monitor(&mut self, monitor: Monitor) -> MonitorId {
        self.monitors.push(monitor);
        self.monitors.len() - 1
    }

    /// Remove a monitor after moving its clients to the first surviving one.
    ///
    /// The clients keep their relative order in both orderings. When the
    /// removed monitor was selected, the destination becomes selected with no
    /// selected client. Returns the removed monitor, so its bar can be
    /// destroyed.
    pub(crate) fn remove_monitor(&mut self, id: MonitorId) -> Option<Monitor> {
        if self.monitors.len() < 2 || id >= self.monitors.len() {
            return None;
        }
        let dest = if id == 0 { 1 } else { 0 };
        let tags = self.monitors[dest].tags;

        let moved = std::mem::take(&mut self.monitors[id].clients);
        let recency = std::mem::take(&mut self.monitors[id].stack);
        self.monitors[id].sel = None;

        for &w in &moved {
            if let Some(c) = self.clients.get_mut(&w) {
                log::debug!("moving Window({:#0x}) off of monitor {}", w, id);
                c.monitor = dest;
                c.tags = tags;
            }
        }
        self.monitors[dest].clients.extend(moved);
        self.monitors[dest].stack.splice(0..0, recency);

        let removed = self.monitors.remove(id);
        for c in self.clients.values_mut() {
            if c.monitor > id {
                c.monitor -= 1;
            }
        }

        let dest = if dest > id { dest - 1 } else { dest };
        if self.selected == id {
            self.selected = dest;
            self.monitors[dest].sel = None;
        } else if self.selected > id {
            self.selected -= 1;
        }

        Some(removed)
    }

    // ]]] === Mutation ===

    // ========================== Monitors ======================== [[[

    /// The monitor a rectangle overlaps the most, the selected one if it
    /// overlaps none
    pub(crate) fn rect_to_monitor(&self, rect: Rectangle) -> MonitorId {
        let mut best = self.selected;
        let mut area = 0;
        for (idx, m) in self.monitors.iter().enumerate() {
            let a = rect.intersection_area(&m.area);
            if a > area {
                area = a;
                best = idx;
            }
        }
        best
    }

    /// The monitor after (`dir > 0`) or before the selected one, wrapping
    /// around
    pub(crate) fn dir_to_monitor(&self, dir: i32) -> MonitorId {
        let n = self.monitors.len();
        if n == 0 {
            return 0;
        }
        if dir > 0 {
            (self.selected + 1) % n
        } else {
            (self.selected + n - 1) % n
        }
    }

    // ]]] === Monitors ===

    /// Verify that every client appears exactly once in both orderings of
    /// its monitor and nowhere else, and that selections are visible
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        for c in self.clients.values() {
            for (idx, m) in self.monitors.iter().enumerate() {
                let want = usize::from(idx == c.monitor);
                let in_clients = m.clients.iter().filter(|&&w| w == c.window).count();
                let in_stack = m.stack.iter().filter(|&&w| w == c.window).count();
                if in_clients != want || in_stack != want {
                    return Err(format!(
                        "Window({:#0x}) is {}x in clients and {}x in stack of monitor {}",
                        c.window, in_clients, in_stack, idx
                    ));
                }
            }
            if c.tags == 0 {
                return Err(format!("Window({:#0x}) has no tags", c.window));
            }
        }
        for (idx, m) in self.monitors.iter().enumerate() {
            if m.clients.len() != m.stack.len()
                || m.clients.iter().any(|w| !self.clients.contains_key(w))
            {
                return Err(format!("monitor {} tracks unknown windows", idx));
            }
            if m.tags == 0 {
                return Err(format!("monitor {} shows no tags", idx));
            }
        }
        if let Some(sel) = self.sel() {
            if !self.is_visible(sel) || !self.selmon().stack.contains(&sel) {
                return Err(format!("selected Window({:#0x}) is not visible", sel));
            }
        }
        Ok(())
    }
}
