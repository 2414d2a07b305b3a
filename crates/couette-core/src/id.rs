//! Strongly-typed identifiers for ranks and message tags.

use std::fmt;

/// Identifies one unit of spatial domain decomposition.
///
/// Ranks are numbered `0..size` within a communicator; the Cartesian
/// decomposition maps per-axis coordinates onto these linear ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RankId(pub usize);

impl fmt::Display for RankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for RankId {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// Distinguishes concurrent point-to-point transfers between one rank pair.
///
/// Matching is by `(source, tag)`; messages with equal keys are delivered
/// in send order, so two in-flight transfers between the same pair must
/// carry distinct tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageTag(pub u32);

impl fmt::Display for MessageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MessageTag {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_display_and_from() {
        let r: RankId = 3.into();
        assert_eq!(r, RankId(3));
        assert_eq!(r.to_string(), "3");
    }

    #[test]
    fn tag_ordering() {
        assert!(MessageTag(1) < MessageTag(2));
        assert_eq!(MessageTag::from(7).to_string(), "7");
    }
}
