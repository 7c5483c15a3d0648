//! Macros for error/warning printing

/// Expand to an error message
#[macro_export]
macro_rules! ltwm_error {
    ($($err:tt)*) => ({
        use colored::Colorize;
        eprintln!("{}: {}", "[ltwm error]".red().bold(), format!($($err)*));
    })
}

/// Expand to a fatal message and exit
#[macro_export]
macro_rules! ltwm_fatal {
    ($($err:tt)*) => ({
        use colored::Colorize;
        eprintln!("{}: {}", "[ltwm fatal]".yellow().bold(), format!($($err)*));
        std::process::exit(1);
    })
}
