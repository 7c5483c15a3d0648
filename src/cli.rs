//! The command line arguments

use crate::utils::wants_color;
use clap::{crate_description, crate_version, AppSettings, Parser, Subcommand, ValueHint};
use once_cell::sync::Lazy;
use std::path::PathBuf;

/// Options for the [`ltwm`] program
#[derive(Parser, Default, Clone, Debug, PartialEq)]
#[clap(
    version = crate_version!(),
    about = <String as AsRef<str>>::as_ref(&APP_ABOUT),
    after_help =  <String as AsRef<str>>::as_ref(&AFTER_HELP),
    max_term_width = 100,
    color = clap::ColorChoice::Auto,
    global_setting = AppSettings::DeriveDisplayOrder,
    disable_help_subcommand = true,
    hide_possible_values = true,
)]
pub(crate) struct Opts {
    /// Display debugging messages on various levels
    #[clap(
        long,
        short,
        global = true,
        parse(from_occurrences),
        long_help = "
        Set the verbosity level of the program. There are 2 extra levels after the default (INFO). \
                     If `-v` is used, DEBUG messages are displayed, and if `-vv` is used TRACE \
                     messages are displayed. The verbosity can also be set with the `LTWM_LOG` \
                     environment variable"
    )]
    pub(crate) verbose: u8,

    /// Location of configuration file
    #[clap(
        long,
        short,
        takes_value = true,
        number_of_values = 1,
        value_name = "file",
        value_hint = ValueHint::FilePath,
        long_help = "\
        Specify the location of the configuration file. The default location is \
                `$XDG_CONFIG_HOME/ltwm/ltwm.yml`"
    )]
    pub(crate) config: Option<PathBuf>,

    /// Location of the control socket
    #[clap(
        long,
        short,
        global = true,
        takes_value = true,
        number_of_values = 1,
        value_name = "path",
        value_hint = ValueHint::FilePath,
        env = "LTWM_SOCKET",
        long_help = "\
        The unix socket the window manager listens on for commands, and the one `ltwm msg` \
                writes to. Defaults to the `socket` configuration option, then `/tmp/ltwm.sock`"
    )]
    pub(crate) socket: Option<PathBuf>,

    #[clap(subcommand)]
    pub(crate) subcommand: Option<Subcmd>,
}

/// Subcommands of [`ltwm`]
#[derive(Subcommand, Clone, Debug, PartialEq)]
pub(crate) enum Subcmd {
    /// Send a command to the running window manager and print its reply
    #[clap(
        setting = AppSettings::TrailingVarArg,
        setting = AppSettings::AllowHyphenValues,
        override_usage = "ltwm msg <command> [args...]"
    )]
    Msg {
        /// The command followed by its arguments
        #[clap(required = true, multiple_values = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

// =============== Prettify Help ==================

/// Yellow ansi code
const YELLOW: &str = "\x1b[0;33m";
/// Green ansi code
const GREEN: &str = "\x1b[0;32m";
/// Bold-red ansi code
const BRED: &str = "\x1b[01;38;5;1m";
/// Reset colors
const RES: &str = "\x1b[0m";

/// Colored options used in the output of `--help`
pub(crate) static APP_ABOUT: Lazy<String> = Lazy::new(|| {
    wants_color()
        .then(|| {
            format!(
                "{}DESCRIPTION: {}{}{}",
                YELLOW,
                GREEN,
                crate_description!(),
                RES
            )
        })
        .unwrap_or_else(|| crate_description!().to_owned())
});

/// Colorized message displayed after the help message
pub(crate) static AFTER_HELP: Lazy<String> = Lazy::new(|| {
    wants_color()
        .then(|| {
            format!(
                "Run {}ltwm{} {}msg{} with a command such as {}focus-window +1{} to control a \
                 running instance.",
                BRED, RES, GREEN, RES, GREEN, RES
            )
        })
        .unwrap_or_else(|| {
            String::from(
                "Run ltwm msg with a command such as focus-window +1 to control a running \
                 instance.",
            )
        })
});

#[cfg(test)]
mod tests {
    use super::{Opts, Subcmd};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn run_manager() {
        let opts = Opts::try_parse_from(&["ltwm", "-vv", "-c", "/etc/ltwm.yml"]).unwrap();
        assert_eq!(opts.verbose, 2);
        assert_eq!(opts.config, Some(PathBuf::from("/etc/ltwm.yml")));
        assert_eq!(opts.subcommand, None);
    }

    #[test]
    fn message_keeps_hyphenated_arguments() {
        let opts =
            Opts::try_parse_from(&["ltwm", "msg", "root-window", "-focus", "-1"]).unwrap();
        assert_eq!(
            opts.subcommand,
            Some(Subcmd::Msg {
                args: vec!["root-window".into(), "-focus".into(), "-1".into()],
            })
        );
    }
}
