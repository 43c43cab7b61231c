//! Terminal output for exercise results

const RESET: &str = "\x1b[0m";
const HEADER: &str = "\x1b[1;36m";
const KEY: &str = "\x1b[90m";

#[derive(Clone, Copy)]
enum Level {
    Done,
    Failed,
    Warn,
    Note,
}

impl Level {
    fn marker(self) -> (&'static str, &'static str) {
        match self {
            Level::Done => ("\x1b[32m", "✓"),
            Level::Failed => ("\x1b[31m", "✗"),
            Level::Warn => ("\x1b[33m", "⚠"),
            Level::Note => ("\x1b[34m", "ℹ"),
        }
    }

    fn line(self, msg: &str) -> String {
        let (color, symbol) = self.marker();
        match self {
            // problems keep their color across the whole line
            Level::Failed | Level::Warn => format!("{color}{symbol} {msg}{RESET}"),
            Level::Done | Level::Note => format!("{color}{symbol}{RESET} {msg}"),
        }
    }
}

pub fn print_success(msg: &str) {
    println!("{}", Level::Done.line(msg));
}

pub fn print_error(msg: &str) {
    eprintln!("{}", Level::Failed.line(msg));
}

pub fn print_warning(msg: &str) {
    println!("{}", Level::Warn.line(msg));
}

pub fn print_info(msg: &str) {
    println!("{}", Level::Note.line(msg));
}

/// Exercise banner padded to a fixed width.
pub fn print_header(title: &str) {
    let rule = "─".repeat(50usize.saturating_sub(title.chars().count()));
    println!("\n{HEADER}{title} {rule}{RESET}\n");
}

pub fn print_key_value(key: &str, value: &str) {
    println!("  {KEY}{key}:{RESET} {value}");
}
