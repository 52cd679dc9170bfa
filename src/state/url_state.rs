/// Per-URL state definitions for the crawl driver
///
/// Each detail page URL moves through these states exactly once per run.
use std::fmt;

/// Represents where a detail page URL is in its processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    // ===== Active States =====
    /// URL is known but has not been requested yet
    Pending,

    /// A request for the URL is in flight
    Fetching,

    /// The last attempt failed transiently; waiting out the backoff delay
    Retrying,

    // ===== Terminal States =====
    /// The page was fetched and handed to the assembler (with or without a record)
    Extracted,

    /// The site redirected: there is no book at this address
    Absent,

    /// The backoff delay grew past the ceiling
    GivenUp,

    /// The page did not have the expected structure
    Failed,
}

impl UrlState {
    /// Returns true if no further processing will happen for the URL
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Fetching | Self::Retrying)
    }

    /// Returns true if moving from `self` to `to` is a legal transition
    ///
    /// ```text
    /// Pending  -> Fetching
    /// Fetching -> Extracted | Absent | Retrying | GivenUp | Failed
    /// Retrying -> Fetching | GivenUp
    /// ```
    pub fn can_transition_to(&self, to: UrlState) -> bool {
        match self {
            Self::Pending => matches!(to, Self::Fetching),
            Self::Fetching => matches!(
                to,
                Self::Extracted | Self::Absent | Self::Retrying | Self::GivenUp | Self::Failed
            ),
            Self::Retrying => matches!(to, Self::Fetching | Self::GivenUp),
            Self::Extracted | Self::Absent | Self::GivenUp | Self::Failed => false,
        }
    }

    /// Moves to `to`, or reports the illegal transition
    pub fn transition(self, to: UrlState) -> crate::Result<UrlState> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(crate::TululuError::InvalidTransition { from: self, to })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Retrying => "retrying",
            Self::Extracted => "extracted",
            Self::Absent => "absent",
            Self::GivenUp => "given_up",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
