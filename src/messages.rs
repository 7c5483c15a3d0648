//! The grammar of control messages.
//!
//! A message is the command name followed by its arguments. Flags may be
//! given with one dash or two (`-focus` or `--focus`).

use crate::{
    core::{Xid, MAX_SIZE},
    error::Error,
};
use clap::{AppSettings, ColorChoice, Parser, Subcommand};
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

/// Every command a control client can send
pub(crate) const COMMANDS: &[&str] = &[
    "selected-border",
    "normal-border",
    "focused-border",
    "border-width",
    "window-gap",
    "root-count",
    "ratio",
    "padding",
    "fullscreen",
    "select-layout",
    "reset-layout",
    "mirror-layout",
    "focus-monitor",
    "focus-window",
    "select-window",
    "move-window",
    "root-window",
    "close-window",
];

/// Flags that are documented with a single dash
const FLAGS: &[&str] = &["-default", "-focus"];

/// A relative count, i.e., `+1` or `-2`
static RELATIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]\d+$").expect("valid regex"));

// ============================== Message ============================= [[[

/// A control message
#[derive(Parser, Debug, Clone, PartialEq)]
#[clap(
    name = "ltwm",
    color = ColorChoice::Never,
    setting = AppSettings::NoBinaryName,
    global_setting = AppSettings::AllowNegativeNumbers,
    disable_help_subcommand = true
)]
pub(crate) struct Message {
    #[clap(subcommand)]
    pub(crate) command: Command,
}

/// The commands understood by the window manager
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub(crate) enum Command {
    /// Get or set the border color of the selected window
    SelectedBorder { color: Option<String> },
    /// Get or set the border color of windows at rest
    NormalBorder { color: Option<String> },
    /// Get or set the border color of the focused window
    FocusedBorder { color: Option<String> },
    /// Get or set the border width of the focused monitor, or the default
    BorderWidth {
        #[clap(long)]
        default: bool,
        size:    Option<String>,
    },
    /// Get or set the gap between windows of the focused monitor, or the
    /// default
    WindowGap {
        #[clap(long)]
        default: bool,
        size:    Option<String>,
    },
    /// Get or set the number of root windows
    RootCount { count: Option<String> },
    /// Get or set the portion of the monitor given to the root windows
    Ratio { ratio: Option<String> },
    /// Get or set the padding on one side of the focused monitor
    Padding {
        direction: String,
        size:      Option<String>,
    },
    /// Get or set fullscreen mode
    Fullscreen { state: Option<String> },
    /// Get, cycle or choose the layout
    SelectLayout { layout: Option<String> },
    /// Restore the layouts, ratio and root count
    ResetLayout,
    /// Get or set whether the layout is mirrored
    MirrorLayout { state: Option<String> },
    /// Focus another monitor
    FocusMonitor { selector: String },
    /// Focus a window
    FocusWindow { selector: Option<String> },
    /// Select a window without focusing it
    SelectWindow { selector: String },
    /// Swap the focused window with another
    MoveWindow { selector: Option<String> },
    /// Make a window the first root window
    RootWindow {
        #[clap(long)]
        focus:    bool,
        selector: Option<String>,
    },
    /// Ask a window to close
    CloseWindow { selector: Option<String> },
}

impl Message {
    /// Parse the words of a message into a [`Command`]
    pub(crate) fn parse(tokens: &[String]) -> Result<Command, Error> {
        let name = tokens.first().map_or("", String::as_str);
        if !COMMANDS.contains(&name) {
            return Err(Error::CommandNotFound(name.to_owned()));
        }

        let args = tokens.iter().map(|token| {
            if FLAGS.contains(&token.as_str()) {
                format!("-{}", token)
            } else {
                token.clone()
            }
        });

        Self::try_parse_from(args)
            .map(|message| message.command)
            .map_err(|e| {
                let msg = e.to_string();
                let line = msg.lines().next().unwrap_or_default();
                Error::Parse(line.trim_start_matches("error: ").to_owned())
            })
    }
}

// ]]] === Message ===

// ============================== Target ============================== [[[

/// Which window or monitor a command acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    /// The window under the pointer
    Pointer,
    /// A window ID, given as `0x..`
    Id(Xid),
    /// Steps away from the focused element, `+N` or `-N`
    Relative(isize),
    /// Position counting from the front, starting at 1
    Absolute(usize),
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidArgument {
            name:  "selector",
            value: s.to_owned(),
        };

        if s == "pointer" {
            Ok(Self::Pointer)
        } else if let Some(hex) = s.strip_prefix("0x") {
            Xid::from_str_radix(hex, 16)
                .map(Self::Id)
                .map_err(|_| invalid())
        } else if RELATIVE.is_match(s) {
            s.parse().map(Self::Relative).map_err(|_| invalid())
        } else {
            match s.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Self::Absolute(n)),
                _ => Err(invalid()),
            }
        }
    }
}

// ]]] === Target ===

/// A new value for a setting, either replacing it or changing it by an amount
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Adjust<T> {
    /// `+N` or `-N`
    Relative(T),
    /// `N`
    Absolute(T),
}

impl<T: FromStr + Copy + AddChecked> Adjust<T> {
    /// Parse an adjustment, naming the setting in the error
    pub(crate) fn parse(name: &'static str, s: &str) -> Result<Self, Error> {
        let value = parse_number::<T>(name, s)?;

        if s.starts_with('+') || s.starts_with('-') {
            Ok(Self::Relative(value))
        } else {
            Ok(Self::Absolute(value))
        }
    }

    /// The value after applying the adjustment to `current`, `None` if it
    /// can't be represented
    pub(crate) fn apply(self, current: T) -> Option<T> {
        match self {
            Self::Relative(delta) => current.add_checked(delta),
            Self::Absolute(value) => Some(value),
        }
    }
}

/// Addition that fails instead of overflowing
pub(crate) trait AddChecked: Sized {
    fn add_checked(self, other: Self) -> Option<Self>;
}

impl AddChecked for isize {
    fn add_checked(self, other: Self) -> Option<Self> {
        self.checked_add(other)
    }
}

impl AddChecked for f64 {
    fn add_checked(self, other: Self) -> Option<Self> {
        let sum = self + other;
        sum.is_finite().then(|| sum)
    }
}

/// Parse a plain number, naming the setting in the error
pub(crate) fn parse_number<T: FromStr>(name: &'static str, s: &str) -> Result<T, Error> {
    s.parse().map_err(|_| Error::InvalidArgument {
        name,
        value: s.to_owned(),
    })
}

/// Parse a border width, gap or padding. Sizes the X server can't
/// represent are invalid
pub(crate) fn parse_size(name: &'static str, s: &str) -> Result<u32, Error> {
    match parse_number::<u32>(name, s)? {
        size if size <= MAX_SIZE => Ok(size),
        _ => Err(Error::InvalidArgument {
            name,
            value: s.to_owned(),
        }),
    }
}
