//! Section extraction from a reminder document.
//!
//! The markup is lowered into a small typed tree (see [`tree`]) and walked in
//! document order. A heading, paragraph or list item labelled with a marker
//! phrase ("Joke of the day", "QA tip of the day", "Important reminder",
//! "Metrics goals") becomes the current section; every later list item or
//! paragraph, at any nesting depth, is filed under it until the next marker.
//!
//! # Weekday tags
//!
//! With [`ExtractOptions::day_aware`] set, an item such as
//! `(Monday) retro at 3pm` is stored as `retro at 3pm` for Monday only.
//! Untagged items apply to every day.
//!
//! # Links
//!
//! Items mentioning "the following link" are moved to
//! [`SectionKind::Link`] whatever section they appear under.

pub mod tree;

use std::str::FromStr;

use chrono::Weekday;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, trace};

use crate::models::{Entry, SectionKind, Sections};
use crate::utils::truncate_for_log;
use tree::Node;

/// Marker phrases, most specific first.
const MARKERS: &[(&str, SectionKind)] = &[
    ("joke of the day", SectionKind::Joke),
    ("qa tip of the day", SectionKind::Tip),
    ("tip of the day", SectionKind::Tip),
    ("important reminder", SectionKind::Important),
    ("metrics goal", SectionKind::Metrics),
];

const LINK_PHRASES: &[&str] = &["remember to use the following link", "following link"];

static WEEKDAY_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(\s*([A-Za-z]+)\s*\)\s*").expect("weekday token regex"));

#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    pub day_aware: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { day_aware: true }
    }
}

/// Extract every section from `markup`.
///
/// Never fails: markup the parser cannot make sense of simply yields fewer
/// (or no) entries.
#[instrument(level = "info", skip_all, fields(bytes = markup.len(), day_aware = options.day_aware))]
pub fn extract(markup: &str, options: ExtractOptions) -> Sections {
    trace!(preview = %truncate_for_log(markup, 500), "Extracting from markup");

    let nodes = tree::parse(markup);
    let mut sections = Sections::new(options.day_aware);
    let mut current: Option<SectionKind> = None;

    tree::walk(&nodes, &mut |node| {
        let text = match node {
            Node::Heading(text) | Node::Paragraph(text) | Node::ListItem { text, .. } => text,
            Node::List(_) | Node::Text(_) => return,
        };
        if text.is_empty() {
            return;
        }

        if let Some((kind, rest)) = match_marker(text) {
            debug!(?kind, marker = %text, "Section marker");
            current = Some(kind);
            if let Some(rest) = rest {
                file_entry(&mut sections, Some(kind), rest, options);
            }
        } else if matches!(node, Node::ListItem { .. } | Node::Paragraph(_)) {
            file_entry(&mut sections, current, text, options);
        }
    });

    for (kind, section) in sections.iter() {
        if options.day_aware {
            let per_day: Vec<(Weekday, usize)> = section
                .day_buckets()
                .iter()
                .map(|(day, entries)| (day, entries.len()))
                .collect();
            debug!(?kind, count = section.entries.len(), ?per_day, "Section entries");
        } else {
            debug!(?kind, count = section.entries.len(), "Section entries");
        }
    }
    info!(entries = sections.total_entries(), "Extraction finished");
    sections
}

/// If `text` names a marker phrase, return its section and the content
/// following the marker's colon, if any.
///
/// The phrase may sit anywhere in the text (`Today's joke of the day`) but
/// must stand as a label: it is followed by a colon, or by nothing but
/// punctuation and emoji. `Share the joke of the day with the team` is an
/// ordinary entry.
fn match_marker(text: &str) -> Option<(SectionKind, Option<&str>)> {
    // ASCII lowering keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();
    MARKERS.iter().find_map(|(phrase, kind)| {
        lowered.match_indices(phrase).find_map(|(at, _)| {
            let starts_word = lowered[..at]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric());
            if !starts_word {
                return None;
            }
            let tail = &text[at + phrase.len()..];
            let tail = tail.strip_prefix(['s', 'S']).unwrap_or(tail).trim_start();
            if let Some(rest) = tail.strip_prefix(':') {
                let rest = rest.trim();
                Some((*kind, (!rest.is_empty()).then_some(rest)))
            } else if tail.chars().all(|c| !c.is_alphanumeric()) {
                Some((*kind, None))
            } else {
                None
            }
        })
    })
}

fn file_entry(
    sections: &mut Sections,
    current: Option<SectionKind>,
    text: &str,
    options: ExtractOptions,
) {
    let entry = if options.day_aware {
        parse_day_tag(text)
    } else {
        Entry::new(text)
    };
    if entry.text.is_empty() {
        return;
    }

    let lowered = entry.text.to_lowercase();
    let kind = if LINK_PHRASES.iter().any(|p| lowered.contains(p)) {
        SectionKind::Link
    } else {
        match current {
            Some(kind) => kind,
            None => {
                trace!(text = %entry.text, "Item before any section marker; skipped");
                return;
            }
        }
    };
    sections.push(kind, entry);
}

/// Strip a leading `(Weekday)` token and tag the entry with it.
///
/// Parenthesised words that are not weekdays are left in place.
fn parse_day_tag(text: &str) -> Entry {
    if let Some(caps) = WEEKDAY_TOKEN.captures(text) {
        if let Ok(day) = Weekday::from_str(&caps[1]) {
            return Entry::on(day, text[caps[0].len()..].trim());
        }
    }
    Entry::new(text.trim())
}
