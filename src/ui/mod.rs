pub mod articles;
pub mod chrome;
pub mod components;
pub mod data;
pub mod pagination;
pub mod shortcuts;
pub mod tui;
pub mod wordcloud;

use std::process::{Command, Stdio};

/// Opens `url` with the platform opener, or `$BROWSER` when set. Output is
/// discarded so the terminal UI is not scribbled over.
pub fn open_in_browser(url: &str) -> std::io::Result<()> {
    let mut cmd = match dotenvy::var("BROWSER") {
        Ok(browser) if !browser.trim().is_empty() => {
            let mut c = Command::new(browser.trim());
            c.arg(url);
            c
        }
        _ => platform_opener(url),
    };
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

#[cfg(target_os = "windows")]
fn platform_opener(url: &str) -> Command {
    let mut c = Command::new("cmd");
    c.args(["/C", "start", "", url]);
    c
}

#[cfg(target_os = "macos")]
fn platform_opener(url: &str) -> Command {
    let mut c = Command::new("open");
    c.arg(url);
    c
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn platform_opener(url: &str) -> Command {
    let mut c = Command::new("xdg-open");
    c.arg(url);
    c
}
