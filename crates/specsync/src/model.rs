//! Intermediate model shared by all transformation directions.
//!
//! Instances are transient: built in one pass by either the introspector or
//! the parser, then consumed once by either the writer or the stub
//! generator. Nothing here persists between runs.

use crate::keyword::{PrimaryKeyword, StepKeyword};

/// Top-level grouping of scenarios plus a free-text narrative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Feature name; never empty in a valid instance.
    pub name: String,
    /// Narrative lines with the uniform leading indent already stripped.
    /// May be empty.
    pub narrative: Vec<String>,
    /// Scenarios in declaration order.
    pub scenarios: Vec<Scenario>,
}

/// One behavioural example: an ordered list of steps, optionally
/// parameterized by an examples table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Steps in order; a valid scenario has at least one.
    pub steps: Vec<Step>,
    /// Present only for outline scenarios.
    pub examples: Option<ExampleTable>,
}

/// One line of behaviour description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Keyword as literally written (`And`/`But` stay distinct).
    pub keyword: StepKeyword,
    /// Semantic role after conjunction resolution.
    pub kind: PrimaryKeyword,
    /// Step text, possibly containing `<name>` placeholder markers.
    pub template: String,
    /// Literal arguments substituted positionally into the template.
    /// Always empty for steps of an outline scenario, where values come
    /// from the examples table instead.
    pub args: Vec<String>,
}

/// Examples table attached to an outline scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleTable {
    /// Column names in first-appearance order; unique.
    pub columns: Vec<String>,
    /// Data rows; every row has exactly `columns.len()` cells.
    pub rows: Vec<Vec<String>>,
}

impl Scenario {
    /// Return `true` when this scenario is a `Scenario Outline`.
    #[must_use]
    pub const fn is_outline(&self) -> bool {
        self.examples.is_some()
    }
}

impl ExampleTable {
    /// Number of columns in the table.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}
