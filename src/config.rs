//! Configuration options

use crate::{
    core::{tag_mask, Keysym, TagMask},
    error::Error,
    utils::deserialize_shellexpand,
    x::{
        input::{Button, Click, ModMask},
        keysym::{self, deserialize_keysym},
    },
};
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use directories::BaseDirs;
use format_serde_error::SerdeError;
use once_cell::sync::Lazy;
use serde::{de, Deserialize};
use std::{
    env,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use strum_macros::Display;

/// Configuration file name
const CONFIG_FILE: &str = "swm.yml";

/// Most tags that can be configured
const MAX_TAGS: usize = 31;

// ================ Color Schemes ================= [[[

/// Colors used to draw a bar segment or a border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub(crate) struct Scheme {
    /// Text color
    #[serde(deserialize_with = "deserialize_color")]
    pub(crate) fg:     u32,
    /// Background color
    #[serde(deserialize_with = "deserialize_color")]
    pub(crate) bg:     u32,
    /// Window border color
    #[serde(deserialize_with = "deserialize_color")]
    pub(crate) border: u32,
}

impl Scheme {
    /// Scheme of unfocused clients and inactive tags
    pub(crate) const NORMAL: Self = Self {
        fg:     0x00bb_bbbb,
        bg:     0x0022_2222,
        border: 0x0044_4444,
    };
    /// Scheme of the focused client and active tags
    pub(crate) const SELECTED: Self = Self {
        fg:     0x00ee_eeee,
        bg:     0x0000_5577,
        border: 0x0000_5577,
    };
}

/// Parse a `#rrggbb` string
pub(crate) fn parse_color(s: &str) -> Option<u32> {
    let hex = s.strip_prefix('#')?;
    (hex.len() == 6)
        .then(|| u32::from_str_radix(hex, 16).ok())
        .flatten()
}

/// [`Deserialize`] a `#rrggbb` color into a pixel value
#[allow(single_use_lifetimes)]
fn deserialize_color<'de, D>(d: D) -> Result<u32, D::Error>
where
    D: de::Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    parse_color(&s)
        .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Str(&s), &"a color like #rrggbb"))
}

// ]]] === Color Schemes ===

// =============== GlobalSettings ================= [[[

/// Global configuration settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct GlobalSettings {
    /// Whether logs should be written to a file
    #[serde(alias = "log-to-file")]
    pub(crate) log_to_file: bool,

    /// The directory to write the log to
    #[serde(alias = "log-dir", deserialize_with = "deserialize_shellexpand")]
    pub(crate) log_dir: Option<PathBuf>,

    // ====================== Window Manager Specific ======================
    /// Name of the tags, shown on the bar in this order
    pub(crate) tags: Vec<String>,

    /// Size of the border around each client
    #[serde(alias = "border-width")]
    pub(crate) border_width: u32,

    /// Percentage of the window area given to the master column
    pub(crate) mfact: u32,

    /// Number of clients in the master column
    pub(crate) nmaster: u32,

    /// Whether a bar is shown on each monitor
    #[serde(alias = "show-bar")]
    pub(crate) show_bar: bool,

    /// Place the bar at the top instead of the bottom
    #[serde(alias = "top-bar")]
    pub(crate) top_bar: bool,

    /// Respect size hints of tiled clients
    #[serde(alias = "resize-hints")]
    pub(crate) resize_hints: bool,

    /// Whether the gaps between tiled clients start out enabled
    pub(crate) gaps: bool,

    /// X core font used on the bar
    pub(crate) font: String,

    /// Colors of unfocused elements
    pub(crate) normal: Scheme,

    /// Colors of focused elements
    pub(crate) selected: Scheme,
} // ]]] === Global Settings ===

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            log_to_file: false,
            log_dir:     None,

            tags:         (1..=9).map(|t| t.to_string()).collect::<Vec<_>>(),
            border_width: 1_u32,
            mfact:        50_u32,
            nmaster:      1_u32,
            show_bar:     true,
            top_bar:      false,
            resize_hints: false,
            gaps:         true,
            font:         String::from("fixed"),
            normal:       Scheme::NORMAL,
            selected:     Scheme::SELECTED,
        }
    }
}

// ================== Actions ===================== [[[

/// Tags an action operates on
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum TagArg {
    /// `all` or `clicked`
    Named(TagKeyword),
    /// A single 1-based tag index
    Single(u32),
    /// Several 1-based tag indices
    Indices(Vec<u32>),
}

/// Keywords accepted in place of tag indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum TagKeyword {
    /// Every tag
    All,
    /// The tag under the pointer when a bar tag was clicked
    Clicked,
}

impl TagArg {
    /// Resolve to a [`TagMask`]. Indices past the configured tags are dropped
    pub(crate) fn mask(&self, ntags: usize, clicked: Option<TagMask>) -> TagMask {
        let all = tag_mask(ntags);
        match self {
            Self::Named(TagKeyword::All) => all,
            Self::Named(TagKeyword::Clicked) => clicked.unwrap_or(0) & all,
            Self::Single(idx) => index_bit(*idx) & all,
            Self::Indices(idxs) => idxs.iter().fold(0, |acc, &i| acc | index_bit(i)) & all,
        }
    }
}

/// Bit for a 1-based tag index
const fn index_bit(idx: u32) -> TagMask {
    if idx == 0 || idx > 32 {
        0
    } else {
        1 << (idx - 1)
    }
}

/// Something a binding can do
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum Action {
    /// Run a command
    Spawn(Vec<String>),
    /// Start typing a command on the bar
    StartExec,
    /// Close the focused client
    KillClient,
    /// Move the focused client into the master area
    Zoom,
    /// Focus the next or previous visible client
    FocusStack(i32),
    /// Change the master fraction, or set it when above 100
    SetMfact(i32),
    /// Change the number of master clients
    IncNmaster(i32),
    /// Focus the next or previous monitor
    FocusMon(i32),
    /// Send the focused client to the next or previous monitor
    TagMon(i32),
    /// Show or hide the bar of the selected monitor
    ToggleBar,
    /// Enable or disable gaps
    ToggleGaps,
    /// Show the given tags
    View(TagArg),
    /// Add or remove tags from the view
    ToggleView(TagArg),
    /// Move the focused client to the given tags
    Tag(TagArg),
    /// Add or remove tags from the focused client
    ToggleTag(TagArg),
    /// Exit the window manager
    Quit,
}

// ]]] === Actions ===

// ================== Bindings ==================== [[[

/// A key combination bound to an [`Action`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct KeyBinding {
    /// Modifiers that must be held
    #[serde(default)]
    pub(crate) mods:   Vec<ModMask>,
    /// The key, by its keysym name
    #[serde(deserialize_with = "deserialize_keysym")]
    pub(crate) key:    Keysym,
    /// What to do
    pub(crate) action: Action,
}

/// A pointer button bound to an [`Action`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ButtonBinding {
    /// Where the button has to be pressed
    pub(crate) click:  Click,
    /// Modifiers that must be held
    #[serde(default)]
    pub(crate) mods:   Vec<ModMask>,
    /// The button
    pub(crate) button: Button,
    /// What to do
    pub(crate) action: Action,
}

/// Shorthand for the built-in tables
fn key(mods: &[ModMask], name: &str, action: Action) -> Option<KeyBinding> {
    Some(KeyBinding {
        mods: mods.to_vec(),
        key: keysym::from_name(name)?,
        action,
    })
}

/// The built-in key bindings
pub(crate) fn default_keys() -> Vec<KeyBinding> {
    use Action::{
        FocusMon,
        FocusStack,
        IncNmaster,
        KillClient,
        Quit,
        SetMfact,
        Spawn,
        StartExec,
        Tag,
        TagMon,
        ToggleBar,
        ToggleGaps,
        ToggleTag,
        ToggleView,
        View,
        Zoom,
    };
    use ModMask::{Control, Mod4 as MODKEY, Shift};

    let cmd = |argv: &[&str]| Spawn(argv.iter().map(ToString::to_string).collect());

    let mut keys = vec![
        key(&[MODKEY], "equal", cmd(&["amixer", "set", "Master", "5%+"])),
        key(&[MODKEY], "minus", cmd(&["amixer", "set", "Master", "5%-"])),
        key(&[MODKEY], "m", cmd(&["amixer", "set", "Master", "toggle"])),
        key(&[MODKEY], "Return", cmd(&["st"])),
        key(&[MODKEY], "w", cmd(&["chromium"])),
        key(&[MODKEY], "e", StartExec),
        key(&[MODKEY, Shift], "q", KillClient),
        key(&[MODKEY], "semicolon", Zoom),
        key(&[MODKEY], "j", FocusStack(1)),
        key(&[MODKEY], "k", FocusStack(-1)),
        key(&[MODKEY], "l", SetMfact(5)),
        key(&[MODKEY], "h", SetMfact(-5)),
        key(&[MODKEY], "i", IncNmaster(1)),
        key(&[MODKEY], "o", IncNmaster(-1)),
        key(&[MODKEY], "comma", FocusMon(-1)),
        key(&[MODKEY], "period", FocusMon(1)),
        key(&[MODKEY, Shift], "comma", TagMon(-1)),
        key(&[MODKEY, Shift], "period", TagMon(1)),
        key(&[MODKEY], "b", ToggleBar),
        key(&[MODKEY], "g", ToggleGaps),
    ];

    for idx in 1..=9_u32 {
        let name = idx.to_string();
        keys.push(key(&[MODKEY], &name, View(TagArg::Single(idx))));
        keys.push(key(&[MODKEY, Control], &name, ToggleView(TagArg::Single(idx))));
        keys.push(key(&[MODKEY, Shift], &name, Tag(TagArg::Single(idx))));
        keys.push(key(
            &[MODKEY, Control, Shift],
            &name,
            ToggleTag(TagArg::Single(idx)),
        ));
    }

    keys.push(key(&[MODKEY], "0", View(TagArg::Named(TagKeyword::All))));
    keys.push(key(&[MODKEY, Shift], "0", Tag(TagArg::Named(TagKeyword::All))));
    keys.push(key(&[MODKEY, Shift], "e", Quit));

    keys.into_iter().flatten().collect()
}

/// The built-in button bindings
pub(crate) fn default_buttons() -> Vec<ButtonBinding> {
    let clicked = || TagArg::Named(TagKeyword::Clicked);
    let bind = |mods: &[ModMask], button, action| ButtonBinding {
        click: Click::TagBar,
        mods: mods.to_vec(),
        button,
        action,
    };

    vec![
        bind(&[], Button::Left, Action::View(clicked())),
        bind(&[], Button::Right, Action::ToggleView(clicked())),
        bind(&[ModMask::Mod4], Button::Left, Action::Tag(clicked())),
        bind(&[ModMask::Mod4], Button::Right, Action::ToggleTag(clicked())),
    ]
}

// ]]] === Bindings ===

// =================== Config ===================== [[[

/// Configuration file to parse
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Config {
    /// Global settings
    #[serde(flatten)]
    pub(crate) global: GlobalSettings,

    /// Key bindings
    #[serde(default = "default_keys")]
    pub(crate) keys: Vec<KeyBinding>,

    /// Pointer button bindings
    #[serde(default = "default_buttons")]
    pub(crate) buttons: Vec<ButtonBinding>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global:  GlobalSettings::default(),
            keys:    default_keys(),
            buttons: default_buttons(),
        }
    }
}

impl Config {
    /// Create the default configuration file
    pub(crate) fn create_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::debug!("Creating configuration path: {}", path.display());
            fs::create_dir_all(path).context("unable to create configuration directory")?;
        }

        let path = path.join(CONFIG_FILE);
        log::debug!("{}: {}", "Configuration path".bright_blue(), path.display());

        if !path.is_file() {
            let initialization = include_str!("../assets/swm.yml");

            let mut config_file: fs::File = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .open(&path)
                .with_context(|| format!("could not create swm config: '{}'", path.display()))?;

            config_file
                .write_all(initialization.as_bytes())
                .with_context(|| format!("could not create swm config: '{}'", path.display()))?;
            config_file.flush()?;
            crate::swm_info!("wrote the default configuration to {}", path.display());
        }

        Self::load(path)
    }

    /// Load the configuration file from a given path
    pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = fs::read_to_string(&path).context("failed to read config file")?;
        Self::parse(file)
    }

    /// Parse and validate the contents of a configuration file
    pub(crate) fn parse(file: String) -> Result<Self> {
        let config: Self = serde_yaml::from_str(&file).map_err(|e| SerdeError::new(file, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the default configuration file
    pub(crate) fn load_default() -> Result<Self> {
        let dirs = PROJECT_DIRS
            .as_ref()
            .ok_or_else(|| anyhow!("could not detect user home directory"))?;
        let path = dirs.config_dir();
        log::debug!("loading default config: {}", path.display());
        Self::create_default(path)
    }

    /// Reject values the window manager cannot work with
    pub(crate) fn validate(&self) -> Result<(), Error> {
        let global = &self.global;

        if global.tags.is_empty() || global.tags.len() > MAX_TAGS {
            return Err(Error::Config(format!(
                "between 1 and {} tags are required, found {}",
                MAX_TAGS,
                global.tags.len()
            )));
        }

        if !(5..=95).contains(&global.mfact) {
            return Err(Error::Config(format!(
                "mfact must be within 5 and 95, found {}",
                global.mfact
            )));
        }

        if global.nmaster == 0 {
            return Err(Error::Config(String::from("nmaster must be at least 1")));
        }

        Ok(())
    }

    /// Mask of every configured tag
    pub(crate) fn tag_mask(&self) -> TagMask {
        tag_mask(self.global.tags.len())
    }
} // ]]] === Config ===

// ================ Project Dirs ================== [[[

/// Get the base [`SwmDirs`]
pub(crate) static PROJECT_DIRS: Lazy<Option<SwmDirs>> = Lazy::new(SwmDirs::new);

/// Get the project directories relevant to [`swm`]
#[derive(Debug, Clone)]
pub(crate) struct SwmDirs {
    /// User's `$XDG_CONFIG_HOME/swm` directory
    config_dir: PathBuf,
}

impl SwmDirs {
    /// Create a new [`SwmDirs`]
    fn new() -> Option<Self> {
        Some(Self {
            config_dir: Self::get_dir("SWM_CONFIG_DIR", "XDG_CONFIG_HOME", ".config")?,
        })
    }

    /// Wrapper function that makes it easier to get directories
    fn get_dir(env_var: &str, var: &str, join: &str) -> Option<PathBuf> {
        env::var_os(env_var).map(PathBuf::from).map_or_else(
            || {
                env::var_os(var)
                    .map(PathBuf::from)
                    .filter(|p| p.is_absolute())
                    .or_else(|| BaseDirs::new().map(|p| p.home_dir().join(join)))
                    .map(|p| p.join(env!("CARGO_PKG_NAME")))
            },
            |v| {
                // Custom env var is set
                if v.is_absolute() {
                    Some(v)
                } else {
                    BaseDirs::new()
                        .map(|p| p.home_dir().join(join))
                        .map(|p| p.join(env!("CARGO_PKG_NAME")))
                }
            },
        )
    }

    /// Get configuration directory
    #[must_use]
    pub(crate) fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

// ]]] === Project Dirs ===
