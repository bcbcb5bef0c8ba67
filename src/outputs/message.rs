//! Chat message rendering.
//!
//! Layout:
//!
//! ```text
//! 🔔 **Daily Team Reminder**
//!
//! 😄 **Joke of the Day**
//! • why did X
//!
//! 📊 **Metrics Goals**
//! • *Velocity*: 30
//!
//! -------------------
//! Have a great day! 🌟
//! ```

use chrono::Weekday;
use std::fmt::Write;

use crate::models::{SectionKind, Sections};
use crate::utils::split_key_value;

pub const HEADER: &str = "🔔 **Daily Team Reminder**";
pub const FOOTER: &str = "-------------------\nHave a great day! 🌟";

fn section_title(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Joke => "😄 **Joke of the Day**",
        SectionKind::Tip => "💡 **QA Tip of the Day**",
        SectionKind::Important => "⚠️ **Important Reminder**",
        SectionKind::Metrics => "📊 **Metrics Goals**",
        SectionKind::Link => "📌 **Remember**",
    }
}

/// Render `sections` into the final message text.
///
/// When the sections were extracted day-aware and `day` is given, only that
/// weekday's entries are rendered. Sections with nothing to show are omitted,
/// so an empty extraction renders as just the header and footer.
///
/// # Arguments
///
/// * `sections` - The extraction result
/// * `day` - Weekday to render for; `None` renders every entry
///
/// # Returns
///
/// The message text, header first and footer last, ready to post.
pub fn format_message(sections: &Sections, day: Option<Weekday>) -> String {
    let day = if sections.day_aware { day } else { None };
    let mut out = String::new();
    writeln!(out, "{HEADER}\n").unwrap();

    for (kind, section) in sections.iter() {
        let texts = section.texts_for(day);
        if texts.is_empty() {
            continue;
        }
        writeln!(out, "{}", section_title(kind)).unwrap();
        for text in texts {
            writeln!(out, "{}", render_entry(kind, text)).unwrap();
        }
        out.push('\n');
    }

    out.push_str(FOOTER);
    out
}

fn render_entry(kind: SectionKind, text: &str) -> String {
    match (kind, split_key_value(text)) {
        (SectionKind::Link, Some((_, value))) => format!("🔗 {}", value.trim()),
        (SectionKind::Link, None) => format!("🔗 {}", text.trim()),
        (_, Some((key, value))) => {
            let value = value.trim().trim_end_matches(',').trim();
            format!("• *{}*: {}", key.trim(), value)
        }
        (_, None) => format!("• {}", text.trim()),
    }
}
