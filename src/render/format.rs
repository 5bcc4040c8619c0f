//! Countdown text and digit-wise fragments

use serde::Serialize;

/// Text shown on a finished card
pub const ZERO_DURATION: &str = "00:00:00";
/// Text shown on a card before its first tick
pub const PLACEHOLDER: &str = "--:--:--";

/// One character of a fixed-width time string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "char", rename_all = "lowercase")]
pub enum Fragment {
    /// Styled individually
    Digit(char),
    /// Passed through unstyled
    Separator(char),
}

/// Split a time string into per-digit fragments; `:` is the only separator
pub fn digit_fragments(text: &str) -> Vec<Fragment> {
    text.chars()
        .map(|c| if c == ':' { Fragment::Separator(c) } else { Fragment::Digit(c) })
        .collect()
}

/// Markup with every digit wrapped in its own span
pub fn fragments_to_html(fragments: &[Fragment]) -> String {
    let mut html = String::with_capacity(fragments.len() * 26);
    for fragment in fragments {
        match fragment {
            Fragment::Digit(c) => {
                html.push_str("<span class=\"digit\">");
                html.push(*c);
                html.push_str("</span>");
            }
            Fragment::Separator(c) => html.push(*c),
        }
    }
    html
}

/// `HH:MM:SS` for a whole number of seconds; negative input renders as zero
pub fn format_hms(total_seconds: i64) -> String {
    let s = total_seconds.max(0);
    format!("{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
}

/// Whole seconds left, rounded up
pub fn ceil_seconds(millis: i64) -> i64 {
    if millis <= 0 {
        0
    } else {
        (millis + 999) / 1000
    }
}
