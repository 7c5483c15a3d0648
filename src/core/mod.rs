//! Base types used throughout [`ltwm`]

use crate::error::Error;
use std::{fmt, str::FromStr};

// Re-export
pub(crate) use x11rb::protocol::xproto::{Atom, Window};

/// Type alias used for syntax compatibility
pub(crate) type Xid = u32;
/// Type alias for a given index
pub(crate) type Idx = usize;

/// Trait to return an item's ID, used when matching items inside a
/// [`Ring`](crate::cycle::Ring)
pub(crate) trait Identify {
    fn id(&self) -> Xid;
}

impl Identify for Window {
    fn id(&self) -> Xid {
        *self
    }
}

/// Window manager's name
#[macro_export]
macro_rules! WM_NAME (
    () => { "ltwm" };
);

/// Color of the border of the current selection
pub(crate) const DEFAULT_SELECTED_BORDER: Rgb = Rgb::new(0xc2, 0x8c, 0xcf);
/// Color of the border of unfocused windows
pub(crate) const DEFAULT_NORMAL_BORDER: Rgb = Rgb::new(0x3f, 0x3e, 0x3b);
/// Color of the border of the focused window
pub(crate) const DEFAULT_FOCUSED_BORDER: Rgb = Rgb::new(0x11, 0x80, 0x9e);
/// Gap between two tiled windows
pub(crate) const DEFAULT_WINDOW_GAP: u32 = 3;
/// Width of a window border
pub(crate) const DEFAULT_BORDER_WIDTH: u32 = 4;
/// Portion of the monitor given to the root windows
pub(crate) const DEFAULT_RATIO: f64 = 0.65;
/// Number of windows in the root area
pub(crate) const DEFAULT_ROOT_COUNT: usize = 1;
/// Milliseconds a selection survives without being touched
pub(crate) const DEFAULT_SELECTION_TIMEOUT: u64 = 1000;
/// Smallest accepted split ratio
pub(crate) const MIN_RATIO: f64 = 0.2;
/// Largest accepted split ratio
pub(crate) const MAX_RATIO: f64 = 0.8;
/// Largest border width, window gap or padding. X coordinates are 16 bits
pub(crate) const MAX_SIZE: u32 = i16::MAX as u32;

// ================================ Rgb ===============================
// ====================================================================

/// A color given as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) red:   u8,
    pub(crate) green: u8,
    pub(crate) blue:  u8,
}

impl Rgb {
    /// Create a new [`Rgb`]
    pub(crate) const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Scale each channel to the 16-bit range X expects (`0xab` -> `0xabab`)
    pub(crate) const fn to_u16(self) -> (u16, u16, u16) {
        (
            self.red as u16 * 0x101,
            self.green as u16 * 0x101,
            self.blue as u16 * 0x101,
        )
    }

    /// Pack the color into a `0x00rrggbb` pixel
    pub(crate) const fn packed(self) -> u32 {
        (self.red as u32) << 16 | (self.green as u32) << 8 | self.blue as u32
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidColor(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;

        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

        Ok(Self {
            red:   channel(0)?,
            green: channel(2)?,
            blue:  channel(4)?,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

// =============================== Color ==============================
// ====================================================================

/// A border color: what the user asked for and the pixel the server gave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Color {
    /// The requested color
    pub(crate) rgb:   Rgb,
    /// The allocated pixel value
    pub(crate) pixel: u32,
}

impl Color {
    /// Create a new [`Color`]
    pub(crate) const fn new(rgb: Rgb, pixel: u32) -> Self {
        Self { rgb, pixel }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.rgb.fmt(f)
    }
}

/// Which of the three border colors a window should currently wear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BorderKind {
    /// The window is the current selection
    Selected,
    /// The window is the focused window of the focused monitor
    Focused,
    /// Any other window
    Normal,
}

// ============================= Protocol =============================
// ====================================================================

/// A `WM_PROTOCOLS` entry advertised by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Protocol {
    /// The client can be asked to close itself
    DeleteWindow,
    /// The client wants to be told when it receives focus
    TakeFocus,
    /// Anything this window manager does not act upon
    Other(Atom),
}

// =============================== State ==============================
// ====================================================================

/// The argument of a command that sets a boolean setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    On,
    Off,
    Toggle,
}

impl State {
    /// Apply the state to the current value
    pub(crate) const fn apply(self, current: bool) -> bool {
        match self {
            Self::On => true,
            Self::Off => false,
            Self::Toggle => !current,
        }
    }
}

impl FromStr for State {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" => Ok(Self::On),
            "false" => Ok(Self::Off),
            "toggle" => Ok(Self::Toggle),
            _ => Err(Error::InvalidState(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Rgb,
        State,
        DEFAULT_FOCUSED_BORDER,
        DEFAULT_NORMAL_BORDER,
        DEFAULT_SELECTED_BORDER,
    };

    #[test]
    fn parse_rgb() {
        let rgb: Rgb = "#c28ccf".parse().unwrap();
        assert_eq!(rgb, Rgb { red: 0xc2, green: 0x8c, blue: 0xcf });
        assert_eq!(rgb.to_u16(), (0xc2c2, 0x8c8c, 0xcfcf));
        assert_eq!(rgb.packed(), 0x00c2_8ccf);
        assert_eq!(rgb.to_string(), "#c28ccf");
    }

    #[test]
    fn reject_bad_rgb() {
        for bad in &["c28ccf", "#c28cc", "#c28ccfa", "#g28ccf", "#", ""] {
            assert!(bad.parse::<Rgb>().is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn state() {
        assert!("true".parse::<State>().unwrap().apply(false));
        assert!(!"false".parse::<State>().unwrap().apply(true));
        assert!("toggle".parse::<State>().unwrap().apply(false));
        assert!("on".parse::<State>().is_err());
    }

    #[test]
    fn default_colors() {
        assert_eq!(DEFAULT_SELECTED_BORDER.to_string(), "#c28ccf");
        assert_eq!(DEFAULT_NORMAL_BORDER.to_string(), "#3f3e3b");
        assert_eq!(DEFAULT_FOCUSED_BORDER.to_string(), "#11809e");
    }
}
