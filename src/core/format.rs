//! # Message Formatting
//!
//! Text shaping shared by both controllers and the renderer. Everything here
//! is pure: no terminal, no clock except the one passed in.
//!
//! Message bodies are split into [`Fragment`]s per line. User text is never
//! interpreted as markup; it is only stripped of control characters so it
//! cannot drive the terminal.

use chrono::{DateTime, Duration as ChronoDuration, Local, Utc};
use ratatui::style::Color;

/// One styled piece of a message line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    /// An `http://` or `https://` URL, kept verbatim.
    Link(String),
    /// `@name` including the `@`.
    Mention(String),
}

/// Remove control characters except newline. Escape sequences and carriage
/// returns would otherwise reach the terminal.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .collect()
}

/// Split a message body into lines of fragments.
pub fn format_message_text(text: &str) -> Vec<Vec<Fragment>> {
    sanitize(text).split('\n').map(format_line).collect()
}

fn format_line(line: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut rest = line;

    while let Some(start) = find_url(rest) {
        push_mentions(&mut fragments, &rest[..start]);
        let end = rest[start..]
            .find(char::is_whitespace)
            .map_or(rest.len(), |offset| start + offset);
        fragments.push(Fragment::Link(rest[start..end].to_string()));
        rest = &rest[end..];
    }
    push_mentions(&mut fragments, rest);
    fragments
}

fn find_url(text: &str) -> Option<usize> {
    let http = text.find("http://");
    let https = text.find("https://");
    match (http, https) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn push_mentions(fragments: &mut Vec<Fragment>, text: &str) {
    let mut plain_start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '@' {
            continue;
        }
        let mut end = i + 1;
        while let Some(&(j, next)) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                end = j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        if end > i + 1 {
            push_text(fragments, &text[plain_start..i]);
            fragments.push(Fragment::Mention(text[i..end].to_string()));
            plain_start = end;
        }
    }
    push_text(fragments, &text[plain_start..]);
}

fn push_text(fragments: &mut Vec<Fragment>, text: &str) {
    if text.is_empty() {
        return;
    }
    match fragments.last_mut() {
        Some(Fragment::Text(prev)) => prev.push_str(text),
        _ => fragments.push(Fragment::Text(text.to_string())),
    }
}

/// Display a timestamp relative to `now`: `HH:MM` for today, `Yesterday
/// HH:MM` for the previous calendar day, otherwise the date.
pub fn format_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let local = timestamp.with_timezone(&Local);
    let local_now = now.with_timezone(&Local);
    let age = now.signed_duration_since(timestamp);

    if local.date_naive() == local_now.date_naive() && age < ChronoDuration::hours(24) {
        local.format("%H:%M").to_string()
    } else if local_now.date_naive().pred_opt() == Some(local.date_naive())
        && age < ChronoDuration::hours(48)
    {
        format!("Yesterday {}", local.format("%H:%M"))
    } else {
        local.format("%Y-%m-%d").to_string()
    }
}

const AVATAR_PALETTE: [Color; 18] = [
    Color::Rgb(0x0e, 0xa5, 0xe9),
    Color::Rgb(0x3b, 0x82, 0xf6),
    Color::Rgb(0x63, 0x66, 0xf1),
    Color::Rgb(0x8b, 0x5c, 0xf6),
    Color::Rgb(0xa8, 0x55, 0xf7),
    Color::Rgb(0xd9, 0x46, 0xef),
    Color::Rgb(0xec, 0x48, 0x99),
    Color::Rgb(0xf4, 0x3f, 0x5e),
    Color::Rgb(0xef, 0x44, 0x44),
    Color::Rgb(0xf9, 0x73, 0x16),
    Color::Rgb(0xf5, 0x9e, 0x0b),
    Color::Rgb(0xea, 0xb3, 0x08),
    Color::Rgb(0x84, 0xcc, 0x16),
    Color::Rgb(0x22, 0xc5, 0x5e),
    Color::Rgb(0x10, 0xb9, 0x81),
    Color::Rgb(0x14, 0xb8, 0xa6),
    Color::Rgb(0x06, 0xb6, 0xd4),
    Color::Rgb(0x08, 0x91, 0xb2),
];

/// Stable per-username colour.
pub fn avatar_color(username: &str) -> Color {
    let hash = username.encode_utf16().fold(0i32, |hash, unit| {
        (unit as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    });
    AVATAR_PALETTE[(hash.unsigned_abs() as usize) % AVATAR_PALETTE.len()]
}

/// Room name slug: lowercase, runs of whitespace replaced by `-`.
pub fn slugify(name: &str) -> String {
    name.trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn script_tags_stay_literal_and_urls_become_links() {
        let lines = format_message_text("<script>alert(1)</script> see http://x.test ok");
        assert_eq!(
            lines,
            vec![vec![
                Fragment::Text("<script>alert(1)</script> see ".to_string()),
                Fragment::Link("http://x.test".to_string()),
                Fragment::Text(" ok".to_string()),
            ]]
        );
    }

    #[test]
    fn mentions_are_split_out() {
        let lines = format_message_text("hey @bob_2, and @ alone");
        assert_eq!(
            lines[0],
            vec![
                Fragment::Text("hey ".to_string()),
                Fragment::Mention("@bob_2".to_string()),
                Fragment::Text(", and @ alone".to_string()),
            ]
        );
    }

    #[test]
    fn url_with_at_sign_is_not_a_mention() {
        let lines = format_message_text("https://x.test/@bob");
        assert_eq!(lines[0], vec![Fragment::Link("https://x.test/@bob".to_string())]);
    }

    #[test]
    fn newlines_split_lines() {
        let lines = format_message_text("one\ntwo");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], vec![Fragment::Text("two".to_string())]);
    }

    #[test]
    fn escape_sequences_are_stripped() {
        assert_eq!(sanitize("a\x1b[31mb\r\nc"), "a[31mb\nc");
    }

    #[test]
    fn time_today_yesterday_and_older() {
        let now = Local.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap().to_utc();
        let today = Local.with_ymd_and_hms(2024, 6, 15, 9, 5, 0).unwrap().to_utc();
        let yesterday = Local.with_ymd_and_hms(2024, 6, 14, 18, 30, 0).unwrap().to_utc();
        let older = Local.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap().to_utc();
        assert_eq!(format_time(today, now), "09:05");
        assert_eq!(format_time(yesterday, now), "Yesterday 18:30");
        assert_eq!(format_time(older, now), "2024-06-01");
    }

    #[test]
    fn avatar_color_is_stable() {
        assert_eq!(avatar_color("alice"), avatar_color("alice"));
        assert!(AVATAR_PALETTE.contains(&avatar_color("")));
    }

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("  My  Cool\tRoom "), "my-cool-room");
    }
}
