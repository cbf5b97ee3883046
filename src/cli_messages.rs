//! Console output for one-shot commands
//!
//! Headless commands report through these tagged lines so scripts can grep
//! for the tag while people still get color.

/// Tag printed in front of a command message.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Tag {
    Info,
    Warn,
    Error,
    Success,
}

impl Tag {
    fn colored(&self) -> &'static str {
        match self {
            Tag::Info => "\x1b[1;33m[INFO]\x1b[0m",
            Tag::Warn => "\x1b[1;91m[WARN]\x1b[0m",
            Tag::Error => "\x1b[1;31m[ERROR]\x1b[0m",
            Tag::Success => "\x1b[1;32m[SUCCESS]\x1b[0m",
        }
    }
}

/// Formats `title` and optional `details` as one tagged line.
pub fn format_line(tag: Tag, title: &str, details: &str) -> String {
    if details.is_empty() {
        format!("{} {}", tag.colored(), title)
    } else {
        format!("{} {}\t {}", tag.colored(), title, details)
    }
}

pub fn print_line(tag: Tag, title: &str, details: &str) {
    match tag {
        // Errors go to stderr so stdout stays parseable
        Tag::Error => eprintln!("{}", format_line(tag, title, details)),
        _ => println!("{}", format_line(tag, title, details)),
    }
}

#[macro_export]
macro_rules! print_cmd_info {
    ($title:expr, $($details:tt)*) => {
        $crate::cli_messages::print_line($crate::cli_messages::Tag::Info, $title, &format!($($details)*))
    };
}

#[macro_export]
macro_rules! print_cmd_warn {
    ($title:expr, $($details:tt)*) => {
        $crate::cli_messages::print_line($crate::cli_messages::Tag::Warn, $title, &format!($($details)*))
    };
}

#[macro_export]
macro_rules! print_cmd_error {
    ($title:expr) => {
        $crate::cli_messages::print_line($crate::cli_messages::Tag::Error, $title, "")
    };
    ($title:expr, $($details:tt)*) => {
        $crate::cli_messages::print_line($crate::cli_messages::Tag::Error, $title, &format!($($details)*))
    };
}

#[macro_export]
macro_rules! print_cmd_success {
    ($title:expr, $($details:tt)*) => {
        $crate::cli_messages::print_line($crate::cli_messages::Tag::Success, $title, &format!($($details)*))
    };
}
