//! Configuration options

use crate::{
    core::{
        Rgb,
        DEFAULT_BORDER_WIDTH,
        DEFAULT_FOCUSED_BORDER,
        DEFAULT_NORMAL_BORDER,
        DEFAULT_RATIO,
        DEFAULT_ROOT_COUNT,
        DEFAULT_SELECTED_BORDER,
        DEFAULT_SELECTION_TIMEOUT,
        DEFAULT_WINDOW_GAP,
        MAX_RATIO,
        MAX_SIZE,
        MIN_RATIO,
    },
    ltwm_error,
    utils::deserialize_shellexpand,
};
use anyhow::{Context, Result};
use directories::BaseDirs;
use format_serde_error::SerdeError;
use once_cell::sync::Lazy;
use serde::{de, Deserialize};
use std::{
    env,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Configuration file name
const CONFIG_FILE: &str = "ltwm.yml";

/// Socket used when neither the command line nor the configuration names one
pub(crate) const DEFAULT_SOCKET: &str = "/tmp/ltwm.sock";

// =============== GlobalSettings ================= [[[

/// Global configuration settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct GlobalSettings {
    /// Path of the control socket
    #[serde(deserialize_with = "deserialize_shellexpand")]
    pub(crate) socket: Option<PathBuf>,

    /// Whether logs should be written to a file
    #[serde(alias = "log-to-file")]
    pub(crate) log_to_file: bool,

    /// The directory to write the log to
    #[serde(alias = "log-dir", deserialize_with = "deserialize_shellexpand")]
    pub(crate) log_dir: Option<PathBuf>,

    // ====================== Window Manager Specific ======================
    /// Border color of windows that are neither focused nor selected
    #[serde(alias = "normal-border-color", deserialize_with = "deserialize_rgb")]
    pub(crate) normal_border_color: Rgb,

    /// Border color of the focused window
    #[serde(alias = "focused-border-color", deserialize_with = "deserialize_rgb")]
    pub(crate) focused_border_color: Rgb,

    /// Border color of the selected window
    #[serde(alias = "selected-border-color", deserialize_with = "deserialize_rgb")]
    pub(crate) selected_border_color: Rgb,

    /// Gap between windows on new monitors
    #[serde(alias = "window-gap")]
    pub(crate) window_gap: u32,

    /// Border width of windows on new monitors
    #[serde(alias = "border-width")]
    pub(crate) border_width: u32,

    /// Portion of a monitor given to its root windows
    #[serde(alias = "split-ratio")]
    pub(crate) split_ratio: f64,

    /// Number of root windows of a monitor
    #[serde(alias = "root-count")]
    pub(crate) root_count: usize,

    /// Milliseconds before an untouched selection is cleared
    #[serde(alias = "selection-timeout")]
    pub(crate) selection_timeout: u64,
} // ]]] === Global Settings ===

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            socket:                None,
            log_to_file:           false,
            log_dir:               None,
            normal_border_color:   DEFAULT_NORMAL_BORDER,
            focused_border_color:  DEFAULT_FOCUSED_BORDER,
            selected_border_color: DEFAULT_SELECTED_BORDER,
            window_gap:            DEFAULT_WINDOW_GAP,
            border_width:          DEFAULT_BORDER_WIDTH,
            split_ratio:           DEFAULT_RATIO,
            root_count:            DEFAULT_ROOT_COUNT,
            selection_timeout:     DEFAULT_SELECTION_TIMEOUT,
        }
    }
}

/// [`Deserialize`] a `#rrggbb` color
#[allow(single_use_lifetimes)]
fn deserialize_rgb<'de, D>(d: D) -> Result<Rgb, D::Error>
where
    D: de::Deserializer<'de>,
{
    let value = String::deserialize(d)?;
    value
        .parse()
        .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&value), &"a color like #rrggbb"))
}

// =================== Config ===================== [[[

/// Configuration file to parse
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Config {
    /// Global settings
    #[serde(flatten)]
    pub(crate) global: GlobalSettings,
}

impl Config {
    // NOTE: SerdeError doesn't always point out correct error

    /// Load the configuration file from a given path
    pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&file).map_err(|e| SerdeError::new(file, e))?;
        config.global.sanitize();

        Ok(config)
    }

    /// The default configuration file, if there is one
    pub(crate) fn default_path() -> Option<PathBuf> {
        PROJECT_DIRS
            .as_ref()
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .filter(|path| path.is_file())
    }

    /// The path of the control socket
    pub(crate) fn socket(&self) -> PathBuf {
        self.global
            .socket
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET))
    }

    /// How long a selection survives without being touched
    pub(crate) const fn selection_timeout(&self) -> Duration {
        Duration::from_millis(self.global.selection_timeout)
    }
} // ]]] === Config ===

impl GlobalSettings {
    /// Pull values that can't be used back into range. This runs before
    /// logging is started, so corrections are reported on stderr
    fn sanitize(&mut self) {
        if !(MIN_RATIO..=MAX_RATIO).contains(&self.split_ratio) {
            let ratio = self.split_ratio.clamp(MIN_RATIO, MAX_RATIO);
            ltwm_error!(
                "split-ratio {} is outside of [{}, {}], using {}",
                self.split_ratio,
                MIN_RATIO,
                MAX_RATIO,
                ratio
            );
            self.split_ratio = ratio;
        }

        for (name, value) in [
            ("window-gap", &mut self.window_gap),
            ("border-width", &mut self.border_width),
        ] {
            if *value > MAX_SIZE {
                ltwm_error!("{} {} is larger than {}, using {}", name, value, MAX_SIZE, MAX_SIZE);
                *value = MAX_SIZE;
            }
        }

        self.root_count = self.root_count.max(1);
    }
}

// ================ Project Dirs ================== [[[

/// Get the base [`LtwmDirs`]
pub(crate) static PROJECT_DIRS: Lazy<Option<LtwmDirs>> = Lazy::new(LtwmDirs::new);

/// Get the project directories relevant to [`ltwm`]
#[derive(Debug, Clone)]
pub(crate) struct LtwmDirs {
    /// User's `$XDG_CONFIG_HOME/ltwm` directory
    config_dir: PathBuf,
}

impl LtwmDirs {
    /// Create a new [`LtwmDirs`]
    fn new() -> Option<Self> {
        Some(Self {
            config_dir: Self::get_dir("LTWM_CONFIG_DIR", "XDG_CONFIG_HOME", ".config")?,
        })
    }

    /// Wrapper function that makes it easier to get directories
    fn get_dir(env_var: &str, var: &str, join: &str) -> Option<PathBuf> {
        env::var_os(env_var)
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
            .or_else(|| {
                env::var_os(var)
                    .map(PathBuf::from)
                    .filter(|p| p.is_absolute())
                    .or_else(|| BaseDirs::new().map(|p| p.home_dir().join(join)))
                    .map(|p| p.join(env!("CARGO_PKG_NAME")))
            })
    }

    /// Get the `config` directory
    pub(crate) fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

// ]]] === Project Dirs ===

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::core::Rgb;
    use std::{io::Write, path::PathBuf};

    fn load(yaml: &str) -> anyhow::Result<Config> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(yaml.as_bytes())?;
        Config::load(file.path())
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.global.window_gap, 3);
        assert_eq!(config.global.border_width, 4);
        assert_eq!(config.global.normal_border_color.to_string(), "#3f3e3b");
        assert_eq!(config.socket(), PathBuf::from("/tmp/ltwm.sock"));
    }

    #[test]
    fn kebab_case_keys() {
        let config = load("window-gap: 8\nfocused-border-color: '#ff0000'\nsplit-ratio: 0.9\n")
            .unwrap();
        assert_eq!(config.global.window_gap, 8);
        assert_eq!(config.global.focused_border_color, Rgb { red: 255, green: 0, blue: 0 });
        // Out of range ratios are clamped
        assert!((config.global.split_ratio - 0.8).abs() < f64::EPSILON);
        // Unspecified keys keep their defaults
        assert_eq!(config.global.border_width, 4);
    }

    #[test]
    fn sizes_are_capped() {
        let config = load("window-gap: 4294967295\nborder-width: 40000\nroot-count: 0\n").unwrap();
        assert_eq!(config.global.window_gap, 32767);
        assert_eq!(config.global.border_width, 32767);
        assert_eq!(config.global.root_count, 1);
    }

    #[test]
    fn default_path_is_never_missing() {
        // Absent files fall back to the built-in defaults in `main`
        assert!(Config::default_path().map_or(true, |path| path.is_file()));

        let err = Config::load("/nonexistent/ltwm.yml").unwrap_err();
        assert!(format!("{:#}", err).starts_with("failed to read config file: /nonexistent/ltwm.yml"));
    }

    #[test]
    fn bad_color_is_an_error() {
        assert!(load("normal-border-color: blue\n").is_err());
    }
}
