use crate::FileStatus;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(icon: &str, text: &str) {
    println!("{} {}", icon, text.style(theme().header.clone()));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(theme().dim.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn failure(label: &str) {
    println!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

/// One line per file that went through the parser; unchanged files are silent
pub fn file_status(path: &str, status: FileStatus) {
    match status {
        FileStatus::New => println!("{} {}", Icons::NEW.style(theme().success.clone()), path.style(theme().path.clone())),
        FileStatus::Modified => println!("{} {}", Icons::MOD.style(theme().warn.clone()), path.style(theme().path.clone())),
        FileStatus::Unchanged => {}
    }
}

pub fn file_removed(path: &str) {
    println!("{} {}", Icons::DEL.style(theme().error.clone()), path.style(theme().path.clone()));
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}
