//! Macros for error/warning printing

/// Expand to an error message
#[macro_export]
macro_rules! swm_error {
    ($($err:tt)*) => ({
        use colored::Colorize;
        eprintln!("{}: {}", "[swm error]".red().bold(), format!($($err)*));
    })
}

/// Expand to an info message
#[macro_export]
macro_rules! swm_info {
    ($($err:tt)*) => ({
        use colored::Colorize;
        eprintln!("{}: {}", "[swm info]".purple().bold(), format!($($err)*));
    })
}

/// Expand to a fatal message and exit
#[macro_export]
macro_rules! swm_fatal {
    ($($err:tt)*) => ({
        use colored::Colorize;
        eprintln!("{}: {}", "[swm fatal]".yellow().bold(), format!($($err)*));
        std::process::exit(1);
    })
}
