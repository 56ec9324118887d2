/// Outcome definitions for harvest jobs
///
/// Every job ends in exactly one outcome. Skipped jobs are decided before the
/// fetch pool starts; the others are terminal states of a fetch attempt.
use std::fmt;

/// Result of one harvest job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text was extracted and written
    Downloaded {
        /// Title from the item payload (the slug when absent)
        title: String,
        /// Length of the written text in characters, always > 0
        chars: usize,
    },

    /// An artifact already existed; nothing was fetched
    Skipped,

    /// Page fetched but the text was too thin; a zero-length marker was written
    Blank,

    /// Page fetched but had no usable embedded payload; a zero-length marker was written
    NoExtractableContent,

    /// Fetch or write failed; no artifact, so the next run retries
    Error(String),
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Downloaded { .. } => OutcomeKind::Downloaded,
            Self::Skipped => OutcomeKind::Skipped,
            Self::Blank => OutcomeKind::Blank,
            Self::NoExtractableContent => OutcomeKind::NoExtractableContent,
            Self::Error(_) => OutcomeKind::Error,
        }
    }
}

/// Discriminant of [`Outcome`], used for tallies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Downloaded,
    Skipped,
    Blank,
    NoExtractableContent,
    Error,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 5] = [
        Self::Downloaded,
        Self::Blank,
        Self::NoExtractableContent,
        Self::Error,
        Self::Skipped,
    ];

    /// True if the artifact is a zero-length negative-cache marker
    pub fn is_negative_cache(&self) -> bool {
        matches!(self, Self::Blank | Self::NoExtractableContent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Downloaded => "downloaded",
            Self::Skipped => "skipped",
            Self::Blank => "blank",
            Self::NoExtractableContent => "no_extractable_content",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
