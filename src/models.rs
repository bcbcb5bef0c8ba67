//! Data model for extracted reminder content.
//!
//! - [`SectionKind`]: the closed set of sections a reminder document can carry
//! - [`Entry`]: one extracted line, optionally tagged with a weekday
//! - [`Section`]: ordered entries for one kind, with a per-weekday view
//! - [`Sections`]: the full extraction result handed to the formatter

use chrono::Weekday;

/// Every weekday, Sunday first, matching the document's own week layout.
pub const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// A named section of the reminder document.
///
/// The declaration order is the render order used by the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    Joke,
    Tip,
    Important,
    Metrics,
    Link,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Joke,
        SectionKind::Tip,
        SectionKind::Important,
        SectionKind::Metrics,
        SectionKind::Link,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// A single extracted line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The entry text with any weekday token already stripped.
    pub text: String,
    /// The weekday this entry is restricted to; `None` means every day.
    pub day: Option<Weekday>,
}

impl Entry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            day: None,
        }
    }

    pub fn on(day: Weekday, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            day: Some(day),
        }
    }

    pub fn applies_to(&self, day: Weekday) -> bool {
        self.day.is_none_or(|d| d == day)
    }
}

/// Entries bucketed per weekday. Always holds all seven days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayBuckets {
    buckets: [Vec<String>; 7],
}

impl DayBuckets {
    pub fn get(&self, day: Weekday) -> &[String] {
        &self.buckets[day.num_days_from_sunday() as usize]
    }

    /// `(weekday, entries)` pairs, Sunday through Saturday.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[String])> {
        WEEK.into_iter().map(move |d| (d, self.get(d)))
    }
}

/// The entries gathered for one [`SectionKind`], in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub entries: Vec<Entry>,
}

impl Section {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Per-weekday view: untagged entries appear in every bucket, tagged ones
    /// only in their own.
    pub fn day_buckets(&self) -> DayBuckets {
        let mut out = DayBuckets::default();
        for entry in &self.entries {
            for day in WEEK {
                if entry.applies_to(day) {
                    out.buckets[day.num_days_from_sunday() as usize].push(entry.text.clone());
                }
            }
        }
        out
    }

    /// Entry texts to render for `day`; `None` selects everything.
    pub fn texts_for(&self, day: Option<Weekday>) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| day.is_none_or(|d| e.applies_to(d)))
            .map(|e| e.text.as_str())
            .collect()
    }
}

/// Result of extracting a reminder document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    sections: [Section; 5],
    /// Whether weekday tokens were honoured during extraction.
    pub day_aware: bool,
}

impl Sections {
    pub fn new(day_aware: bool) -> Self {
        Self {
            day_aware,
            ..Default::default()
        }
    }

    pub fn get(&self, kind: SectionKind) -> &Section {
        &self.sections[kind.index()]
    }

    pub fn push(&mut self, kind: SectionKind, entry: Entry) {
        self.sections[kind.index()].entries.push(entry);
    }

    /// `(kind, section)` pairs in render order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, &Section)> {
        SectionKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(Section::is_empty)
    }

    pub fn total_entries(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_buckets_cover_whole_week() {
        let section = Section::default();
        let buckets = section.day_buckets();
        let days: Vec<Weekday> = buckets.iter().map(|(d, _)| d).collect();
        assert_eq!(days, WEEK.to_vec());
        assert!(buckets.iter().all(|(_, entries)| entries.is_empty()));
    }

    #[test]
    fn test_untagged_entry_replicated_into_every_bucket() {
        let section = Section {
            entries: vec![Entry::new("stand-up at 10")],
        };
        let buckets = section.day_buckets();
        for (_, entries) in buckets.iter() {
            assert_eq!(entries, ["stand-up at 10"]);
        }
    }

    #[test]
    fn test_tagged_entry_only_in_its_bucket() {
        let section = Section {
            entries: vec![
                Entry::on(Weekday::Mon, "foo: bar"),
                Entry::new("always"),
            ],
        };
        let buckets = section.day_buckets();
        assert_eq!(buckets.get(Weekday::Mon), ["foo: bar", "always"]);
        assert_eq!(buckets.get(Weekday::Tue), ["always"]);
        assert_eq!(buckets.get(Weekday::Sun), ["always"]);
    }

    #[test]
    fn test_texts_for_without_day_returns_everything() {
        let section = Section {
            entries: vec![Entry::on(Weekday::Fri, "a"), Entry::new("b")],
        };
        assert_eq!(section.texts_for(None), vec!["a", "b"]);
        assert_eq!(section.texts_for(Some(Weekday::Thu)), vec!["b"]);
    }

    #[test]
    fn test_sections_iterate_in_render_order() {
        let mut sections = Sections::new(true);
        sections.push(SectionKind::Link, Entry::new("link"));
        sections.push(SectionKind::Joke, Entry::new("joke"));
        let kinds: Vec<SectionKind> = sections.iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, SectionKind::ALL.to_vec());
        assert_eq!(sections.total_entries(), 2);
        assert!(!sections.is_empty());
        assert!(Sections::default().is_empty());
    }
}
