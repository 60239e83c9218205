//! Terminal-side alerts: the bell for in-focus sounds and OSC escape
//! sequences for desktop notifications.
//!
//! OSC 777 is understood by VTE-based terminals, foot, WezTerm and kitty;
//! iTerm2 and Windows Terminal take OSC 9 instead.

use std::io::{self, Write};

const BEL: &str = "\x07";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscFlavor {
    /// `ESC ] 777 ; notify ; title ; body BEL`
    Notify777,
    /// `ESC ] 9 ; message BEL`
    Growl9,
}

impl OscFlavor {
    pub fn detect<E>(env: E) -> Self
    where
        E: Fn(&str) -> Option<String>,
    {
        let iterm = env("TERM_PROGRAM").is_some_and(|p| p == "iTerm.app");
        if iterm || env("WT_SESSION").is_some() {
            OscFlavor::Growl9
        } else {
            OscFlavor::Notify777
        }
    }

    pub fn from_env() -> Self {
        Self::detect(|key| std::env::var(key).ok())
    }
}

/// Strip anything that could terminate or split the escape sequence.
fn clean(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() && *c != ';')
        .collect()
}

pub fn desktop_sequence(flavor: OscFlavor, title: &str, body: &str) -> String {
    match flavor {
        OscFlavor::Notify777 => {
            format!("\x1b]777;notify;{};{}{BEL}", clean(title), clean(body))
        }
        OscFlavor::Growl9 => format!("\x1b]9;{}: {}{BEL}", clean(title), clean(body)),
    }
}

pub fn play_sound() -> io::Result<()> {
    let mut out = io::stdout();
    out.write_all(BEL.as_bytes())?;
    out.flush()
}

pub fn desktop_notification(flavor: OscFlavor, title: &str, body: &str) -> io::Result<()> {
    let mut out = io::stdout();
    out.write_all(desktop_sequence(flavor, title, body).as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_777_sequence() {
        assert_eq!(
            desktop_sequence(OscFlavor::Notify777, "bob in general", "hi"),
            "\x1b]777;notify;bob in general;hi\x07"
        );
    }

    #[test]
    fn control_characters_and_separators_are_stripped() {
        assert_eq!(
            desktop_sequence(OscFlavor::Growl9, "bob", "a;b\x07c\x1b]d"),
            "\x1b]9;bob: abc]d\x07"
        );
    }

    #[test]
    fn flavor_detection() {
        assert_eq!(
            OscFlavor::detect(|k| (k == "TERM_PROGRAM").then(|| "iTerm.app".to_string())),
            OscFlavor::Growl9
        );
        assert_eq!(
            OscFlavor::detect(|k| (k == "WT_SESSION").then(|| "1".to_string())),
            OscFlavor::Growl9
        );
        assert_eq!(OscFlavor::detect(|_| None), OscFlavor::Notify777);
    }
}
