//! Backtrace relevance policies.
//!
//! Deciding which frames of a backtrace are relevant belongs to the test-execution engine; a
//! reporter only ever sees frames that passed through a [BacktraceFilter].

/// Given raw stack frames, selects those considered relevant to the code under test.
pub trait BacktraceFilter: Send {
    fn filter<'a>(&self, backtrace: &'a [String]) -> Vec<&'a str>;
}

/// Keeps every frame.
#[derive(Default, Debug, Clone, Copy)]
pub struct KeepAll;

impl BacktraceFilter for KeepAll {
    fn filter<'a>(&self, backtrace: &'a [String]) -> Vec<&'a str> {
        backtrace.iter().map(String::as_str).collect()
    }
}

/// Drops engine-internal frames, identified by a path prefix.
///
/// Frames are kept up to the first engine-internal frame. If that leaves nothing (the backtrace
/// starts inside the engine), every non-internal frame is kept instead; if that still leaves
/// nothing, the backtrace is kept whole.
#[derive(Default, Debug, Clone)]
pub struct PrefixFilter {
    excluded: Vec<String>,
}

impl PrefixFilter {
    pub fn new(excluded: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    fn is_internal(&self, frame: &str) -> bool {
        self.excluded.iter().any(|prefix| frame.starts_with(prefix))
    }
}

impl BacktraceFilter for PrefixFilter {
    fn filter<'a>(&self, backtrace: &'a [String]) -> Vec<&'a str> {
        if self.excluded.is_empty() {
            return KeepAll.filter(backtrace);
        }

        let leading: Vec<&str> = backtrace
            .iter()
            .map(String::as_str)
            .take_while(|frame| !self.is_internal(frame))
            .collect();
        if !leading.is_empty() {
            return leading;
        }

        let non_internal: Vec<&str> = backtrace
            .iter()
            .map(String::as_str)
            .filter(|frame| !self.is_internal(frame))
            .collect();
        if !non_internal.is_empty() {
            return non_internal;
        }

        KeepAll.filter(backtrace)
    }
}
