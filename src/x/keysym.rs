//! Keysym names and conversions
//!
//! Values are taken from `X11/keysymdef.h`. Only the subset that can be used
//! in a binding or typed into the launcher is known here.

use crate::core::Keysym;
use serde::{de, Deserialize};

pub(crate) const XK_BACKSPACE: Keysym = 0xff08;
pub(crate) const XK_TAB: Keysym = 0xff09;
pub(crate) const XK_RETURN: Keysym = 0xff0d;
pub(crate) const XK_ESCAPE: Keysym = 0xff1b;
pub(crate) const XK_DELETE: Keysym = 0xffff;
pub(crate) const XK_NUM_LOCK: Keysym = 0xff7f;
/// Offset of keysyms that directly encode a unicode code point
const UNICODE_OFFSET: Keysym = 0x0100_0000;

/// Named keysyms that are not a single printable character
const NAMED: &[(&str, Keysym)] = &[
    ("BackSpace", XK_BACKSPACE),
    ("Tab", XK_TAB),
    ("Return", XK_RETURN),
    ("Escape", XK_ESCAPE),
    ("Delete", XK_DELETE),
    ("Num_Lock", XK_NUM_LOCK),
    ("Home", 0xff50),
    ("Left", 0xff51),
    ("Up", 0xff52),
    ("Right", 0xff53),
    ("Down", 0xff54),
    ("Prior", 0xff55),
    ("Page_Up", 0xff55),
    ("Next", 0xff56),
    ("Page_Down", 0xff56),
    ("End", 0xff57),
    ("Print", 0xff61),
    ("Insert", 0xff63),
    ("space", 0x0020),
    ("exclam", 0x0021),
    ("quotedbl", 0x0022),
    ("numbersign", 0x0023),
    ("dollar", 0x0024),
    ("percent", 0x0025),
    ("ampersand", 0x0026),
    ("apostrophe", 0x0027),
    ("parenleft", 0x0028),
    ("parenright", 0x0029),
    ("asterisk", 0x002a),
    ("plus", 0x002b),
    ("comma", 0x002c),
    ("minus", 0x002d),
    ("period", 0x002e),
    ("slash", 0x002f),
    ("colon", 0x003a),
    ("semicolon", 0x003b),
    ("less", 0x003c),
    ("equal", 0x003d),
    ("greater", 0x003e),
    ("question", 0x003f),
    ("at", 0x0040),
    ("bracketleft", 0x005b),
    ("backslash", 0x005c),
    ("bracketright", 0x005d),
    ("underscore", 0x005f),
    ("grave", 0x0060),
    ("braceleft", 0x007b),
    ("bar", 0x007c),
    ("braceright", 0x007d),
    ("asciitilde", 0x007e),
];

/// Look up a keysym by the name `xev` reports for it
pub(crate) fn from_name(name: &str) -> Option<Keysym> {
    if let Some(&(_, sym)) = NAMED.iter().find(|(n, _)| *n == name) {
        return Some(sym);
    }

    // F1 through F35 are contiguous
    if let Some(n) = name.strip_prefix('F').and_then(|n| n.parse::<Keysym>().ok()) {
        return (1..=35).contains(&n).then(|| 0xffbd + n);
    }

    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() => Some(c as Keysym),
        _ => None,
    }
}

/// Character produced by typing the keysym, if any
pub(crate) fn to_char(sym: Keysym) -> Option<char> {
    match sym {
        0x20..=0x7e | 0xa0..=0xff => char::from_u32(sym),
        s if s > UNICODE_OFFSET => char::from_u32(s - UNICODE_OFFSET),
        _ => None,
    }
}

/// [`Deserialize`] a keysym from its name
#[allow(single_use_lifetimes)]
pub(crate) fn deserialize_keysym<'de, D>(d: D) -> Result<Keysym, D::Error>
where
    D: de::Deserializer<'de>,
{
    let name = String::deserialize(d)?;
    from_name(&name).ok_or_else(|| {
        de::Error::invalid_value(de::Unexpected::Str(&name), &"a known keysym name")
    })
}
