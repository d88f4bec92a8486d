/// Resolution state definitions for one carrier/region pair
///
/// A resolution starts `Pending`, walks its sources in priority order and
/// ends `Resolved`, either on the first success or after the last source.
use std::fmt;

/// Represents the progress of a fallback-chain resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionState {
    /// No source has been tried yet
    Pending,

    /// The source at this priority index is being fetched
    Attempting(usize),

    /// A chosen outcome exists; no further sources will be tried
    Resolved,
}

impl ResolutionState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// Returns true while the resolution may still invoke sources
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Checks whether moving to `next` follows the chain's state machine
    ///
    /// | From | Allowed next states |
    /// |------|---------------------|
    /// | Pending | Attempting(0), Resolved (carrier without sources) |
    /// | Attempting(i) | Attempting(i + 1), Resolved |
    /// | Resolved | none |
    pub fn can_transition_to(&self, next: &ResolutionState) -> bool {
        match (self, next) {
            (Self::Pending, Self::Attempting(0)) => true,
            (Self::Pending, Self::Resolved) => true,
            (Self::Attempting(i), Self::Attempting(j)) => *j == i + 1,
            (Self::Attempting(_), Self::Resolved) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Attempting(index) => write!(f, "attempting(source {})", index),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}
