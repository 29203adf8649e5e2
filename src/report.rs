//! Operator-facing status lines.

use console::style;

pub fn success(message: impl AsRef<str>) {
    println!("{}", style(message.as_ref()).black().on_green());
}

pub fn warning(message: impl AsRef<str>) {
    println!("{}", style(message.as_ref()).black().on_yellow());
}

pub fn error(message: impl AsRef<str>) {
    println!("{}", style(message.as_ref()).white().on_red());
}
