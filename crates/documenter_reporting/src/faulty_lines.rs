//! Tallies the source locations that failing tests trace back to.

use std::{collections::HashMap, sync::OnceLock};

use regex::Regex;

/// `<file>:<line>` directly followed by `:in`, as in `calc.src:42:in 'divide'`.
fn local_frame_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\A(\S+:\d+):in").expect("local frame pattern is valid"))
}

/// The `<file>:<line>` a frame points at, if it is shaped like a local frame.
pub fn local_location(frame: &str) -> Option<&str> {
    local_frame_pattern()
        .captures(frame)
        .and_then(|captures| captures.get(1))
        .map(|location| location.as_str())
}

/// Finds the innermost local frame among already-filtered frames.
pub fn innermost_local_frame<'a>(frames: &[&'a str]) -> Option<(usize, &'a str)> {
    frames
        .iter()
        .enumerate()
        .find_map(|(i, frame)| local_location(frame).map(|location| (i, location)))
}

/// Counts of failing tests per local source location, across one run.
#[derive(Debug, Default)]
pub struct FaultyLines {
    counts: HashMap<String, u64>,
}

impl FaultyLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the innermost local frame of one failure's backtrace.
    ///
    /// Returns the index of that frame, or [None] if no frame is locatable, in which case
    /// nothing is recorded.
    pub fn record(&mut self, frames: &[&str]) -> Option<usize> {
        let (index, location) = innermost_local_frame(frames)?;
        *self.counts.entry(location.to_owned()).or_insert(0) += 1;
        Some(index)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// All recorded locations, most frequent first; ties are ordered by location.
    pub fn report(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .counts
            .iter()
            .map(|(location, count)| (location.as_str(), *count))
            .collect();
        ranked.sort_by(|(loc1, count1), (loc2, count2)| {
            count2.cmp(count1).then_with(|| loc1.cmp(loc2))
        });
        ranked
    }
}
