//! Input into the window manager

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use strum_macros::Display;
use x11rb::protocol::xproto::{Button as XButton, ModMask as XModMask};

// ============================== ModMask =============================
// ====================================================================

/// Keycode modifier that is held
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ModMask {
    /// Left or right `shift` key
    Shift,
    /// Caps-lock
    Lock,
    /// Left or right `control` key
    #[serde(alias = "ctrl")]
    Control,
    /// Modifier 1 as defined in `xmodmap` (usually `alt`)
    #[serde(alias = "alt")]
    Mod1,
    /// Modifier 2 as defined in `xmodmap` (usually `num-lock`)
    Mod2,
    /// Modifier 3 as defined in `xmodmap` (usually blank)
    Mod3,
    /// Modifier 4 as defined in `xmodmap` (usually `super`)
    #[serde(alias = "super")]
    Mod4,
    /// Modifier 5 as defined or in `xmodmap` (usually `mode_shift`)
    Mod5,
}

impl From<ModMask> for u16 {
    fn from(m: ModMask) -> Self {
        u16::from(match m {
            ModMask::Shift => XModMask::SHIFT,
            ModMask::Lock => XModMask::LOCK,
            ModMask::Control => XModMask::CONTROL,
            ModMask::Mod1 => XModMask::M1,
            ModMask::Mod2 => XModMask::M2,
            ModMask::Mod3 => XModMask::M3,
            ModMask::Mod4 => XModMask::M4,
            ModMask::Mod5 => XModMask::M5,
        })
    }
}

/// Combine a list of modifiers into a single mask
pub(crate) fn mask_of(mods: &[ModMask]) -> u16 {
    mods.iter().fold(0, |acc, &m| acc | u16::from(m))
}

/// Every real modifier bit a binding may use
pub(crate) fn modifier_bits() -> u16 {
    u16::from(
        XModMask::SHIFT
            | XModMask::CONTROL
            | XModMask::M1
            | XModMask::M2
            | XModMask::M3
            | XModMask::M4
            | XModMask::M5,
    )
}

// ============================== Button ==============================
// ====================================================================

/// Available buttons on a mouse
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Button {
    /// 1, Left-click
    #[serde(rename = "mouse1", alias = "button1")]
    Left,
    /// 2, Middle-click
    #[serde(rename = "mouse2", alias = "button2")]
    Middle,
    /// 3, Right-click
    #[serde(rename = "mouse3", alias = "button3")]
    Right,
    /// 4, Wheel-scroll up
    #[serde(alias = "scroll-up", alias = "scroll_up")]
    ScrollUp,
    /// 5, Wheel-scroll down
    #[serde(alias = "scroll-down", alias = "scroll_down")]
    ScrollDown,
}

impl From<Button> for XButton {
    fn from(b: Button) -> Self {
        match b {
            Button::Left => 1,
            Button::Middle => 2,
            Button::Right => 3,
            Button::ScrollUp => 4,
            Button::ScrollDown => 5,
        }
    }
}

impl TryFrom<u8> for Button {
    type Error = anyhow::Error;

    fn try_from(u: u8) -> Result<Self> {
        match u {
            1 => Ok(Self::Left),
            2 => Ok(Self::Middle),
            3 => Ok(Self::Right),
            4 => Ok(Self::ScrollUp),
            5 => Ok(Self::ScrollDown),
            _ => Err(anyhow!("mouse button {} is unknown", u)),
        }
    }
}

// ============================== Click ===============================
// ====================================================================

/// The region a pointer button press landed in
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum Click {
    /// One of the tag labels on a bar
    #[serde(alias = "tag-bar")]
    TagBar,
    /// The status text on the right of a bar
    #[serde(alias = "status-text")]
    StatusText,
    /// The title area of a bar
    #[serde(alias = "win-title")]
    WinTitle,
    /// A managed client
    #[serde(alias = "client-win")]
    ClientWin,
    /// The root window
    #[serde(alias = "root-win")]
    RootWin,
}
