//! Step keyword types and conjunction resolution.
//!
//! A step line carries two keywords: the literal one written in the
//! specification text ([`StepKeyword`], which includes `And` and `But`) and
//! the semantic role it plays ([`PrimaryKeyword`]). Conjunctions inherit the
//! role of the nearest preceding primary step, so the two only diverge for
//! `And`/`But` lines.

use std::fmt;
use std::str::FromStr;

/// Literal keyword written at the start of a step line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKeyword {
    /// Setup preconditions for a scenario.
    Given,
    /// Perform the action under test.
    When,
    /// Assert the expected outcome.
    Then,
    /// Continuation that shares the role of the previous step.
    And,
    /// Contrasting continuation, also inheriting the previous role.
    But,
}

/// Semantic role of a step once conjunctions have been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimaryKeyword {
    /// Precondition.
    Given,
    /// Action.
    When,
    /// Assertion.
    Then,
}

impl StepKeyword {
    /// Return the canonical keyword token.
    ///
    /// # Examples
    ///
    /// ```
    /// use specsync::StepKeyword;
    ///
    /// assert_eq!(StepKeyword::Given.as_str(), "Given");
    /// assert_eq!(StepKeyword::But.as_str(), "But");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
            Self::But => "But",
        }
    }

    /// Return `true` for the connective keywords `And` and `But`.
    #[must_use]
    pub const fn is_conjunction(self) -> bool {
        matches!(self, Self::And | Self::But)
    }

    /// Return the primary role this keyword names, or `None` for
    /// conjunctions.
    #[must_use]
    pub const fn primary(self) -> Option<PrimaryKeyword> {
        match self {
            Self::Given => Some(PrimaryKeyword::Given),
            Self::When => Some(PrimaryKeyword::When),
            Self::Then => Some(PrimaryKeyword::Then),
            Self::And | Self::But => None,
        }
    }

    /// Resolve this keyword against the role of the preceding step.
    ///
    /// Primary keywords update `prev` and return their own role.
    /// Conjunctions return whatever `prev` holds; a conjunction with no
    /// predecessor yields `None` and callers must reject it.
    ///
    /// # Examples
    ///
    /// ```
    /// use specsync::{PrimaryKeyword, StepKeyword};
    ///
    /// let mut prev = None;
    /// assert_eq!(
    ///     StepKeyword::Given.resolve(&mut prev),
    ///     Some(PrimaryKeyword::Given)
    /// );
    /// assert_eq!(
    ///     StepKeyword::And.resolve(&mut prev),
    ///     Some(PrimaryKeyword::Given)
    /// );
    /// assert_eq!(StepKeyword::When.resolve(&mut prev), Some(PrimaryKeyword::When));
    /// ```
    #[must_use]
    pub fn resolve(self, prev: &mut Option<PrimaryKeyword>) -> Option<PrimaryKeyword> {
        match self.primary() {
            Some(primary) => {
                *prev = Some(primary);
                Some(primary)
            }
            None => *prev,
        }
    }
}

impl PrimaryKeyword {
    /// Return the canonical keyword token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
        }
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PrimaryKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a token is not a recognised step keyword.
///
/// Matching is case-sensitive on the canonical token, so `given` is rejected
/// even though `Given` is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepKeywordParseError(pub String);

impl fmt::Display for StepKeywordParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid step keyword: {}", self.0)
    }
}

impl std::error::Error for StepKeywordParseError {}

impl FromStr for StepKeyword {
    type Err = StepKeywordParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Given" => Ok(Self::Given),
            "When" => Ok(Self::When),
            "Then" => Ok(Self::Then),
            "And" => Ok(Self::And),
            "But" => Ok(Self::But),
            other => Err(StepKeywordParseError(other.to_string())),
        }
    }
}
