// stylepipe/src/ui/output_format.rs
//! Colored status lines for stderr.

use owo_colors::{AnsiColors, OwoColorize};
use std::io::{self, Write};

/// Kinds of status line the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warn,
    Error,
}

impl MessageKind {
    fn prefix(self) -> &'static str {
        match self {
            MessageKind::Info => "info",
            MessageKind::Success => "done",
            MessageKind::Warn => "warning",
            MessageKind::Error => "error",
        }
    }

    fn color(self) -> AnsiColors {
        match self {
            MessageKind::Info => AnsiColors::Cyan,
            MessageKind::Success => AnsiColors::Green,
            MessageKind::Warn => AnsiColors::Yellow,
            MessageKind::Error => AnsiColors::Red,
        }
    }
}

/// Writes `prefix: message`, colorizing the prefix when the stream supports it.
pub fn print_message<W: Write>(writer: &mut W, kind: MessageKind, message: &str, supports_color: bool) -> io::Result<()> {
    if supports_color {
        writeln!(writer, "{}: {}", kind.prefix().color(kind.color()).bold(), message)
    } else {
        writeln!(writer, "{}: {}", kind.prefix(), message)
    }
}

pub fn print_info_message<W: Write>(writer: &mut W, message: &str, supports_color: bool) -> io::Result<()> {
    print_message(writer, MessageKind::Info, message, supports_color)
}

pub fn print_success_message<W: Write>(writer: &mut W, message: &str, supports_color: bool) -> io::Result<()> {
    print_message(writer, MessageKind::Success, message, supports_color)
}

pub fn print_warn_message<W: Write>(writer: &mut W, message: &str, supports_color: bool) -> io::Result<()> {
    print_message(writer, MessageKind::Warn, message, supports_color)
}

pub fn print_error_message<W: Write>(writer: &mut W, message: &str, supports_color: bool) -> io::Result<()> {
    print_message(writer, MessageKind::Error, message, supports_color)
}
