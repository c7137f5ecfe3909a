//! Error taxonomy for the synchronization pipeline.
//!
//! Every error names the construct it concerns so a failing unit can be
//! located and fixed without re-running the whole batch. Per-feature errors
//! are collected into the run report rather than aborting the batch; only
//! module loading is fatal for a run as a whole.

use thiserror::Error;

use crate::keyword::StepKeyword;

/// Malformed specification text.
///
/// Carries the one-based line number and the expected-versus-actual
/// construct. Parsing is fail-fast: one malformed file yields one error and
/// no partial model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The input contained no `Feature:` header at all.
    #[error("specification is empty: no `Feature:` header found")]
    MissingFeatureHeader,

    /// A line did not fit the construct the parser was positioned for.
    #[error("line {line}: expected {expected}, found `{actual}`")]
    Unexpected {
        /// One-based line number.
        line: usize,
        /// Description of the construct that was expected.
        expected: &'static str,
        /// The offending line, trimmed.
        actual: String,
    },

    /// An `And`/`But` step opened a scenario, leaving it no role to inherit.
    #[error("line {line}: `{keyword}` has no preceding Given/When/Then to inherit from")]
    LeadingConjunction {
        /// One-based line number.
        line: usize,
        /// The conjunction that was written.
        keyword: StepKeyword,
    },

    /// An examples data row disagreed with the header's column count.
    #[error("line {line}: table row has {actual} cells but the header declares {expected}")]
    TableWidth {
        /// One-based line number.
        line: usize,
        /// Cell count declared by the header row.
        expected: usize,
        /// Cell count found on this row.
        actual: usize,
    },

    /// A header row repeated a column name.
    #[error("line {line}: duplicate examples column `{column}`")]
    DuplicateColumn {
        /// One-based line number.
        line: usize,
        /// The repeated column name.
        column: String,
    },

    /// A scenario block closed without a single step.
    #[error("line {line}: scenario `{scenario}` has no steps")]
    ScenarioWithoutSteps {
        /// Line the scenario was declared on.
        line: usize,
        /// Scenario name.
        scenario: String,
    },

    /// A `Scenario Outline` block closed without an `Examples:` table.
    #[error("line {line}: scenario outline `{scenario}` is missing its Examples table")]
    MissingExamples {
        /// Line the outline was declared on.
        line: usize,
        /// Scenario name.
        scenario: String,
    },
}

/// Failure while serializing the model to specification text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WriteError {
    /// A step template references more placeholders than it has literal
    /// arguments.
    #[error(
        "template mismatch in {feature}/{scenario}: step `{template}` references \
         {markers} placeholder(s) but only {args} literal argument(s) are available"
    )]
    TemplateMismatch {
        /// Owning feature name.
        feature: String,
        /// Owning scenario name.
        scenario: String,
        /// The offending step template.
        template: String,
        /// Placeholder markers found in the template.
        markers: usize,
        /// Literal arguments available for substitution.
        args: usize,
    },

    /// The feature carries an empty name and cannot be written.
    #[error("feature name is empty")]
    EmptyFeatureName,
}

/// Failure while rendering test-source skeletons.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// An outline's examples table has no data rows, so parameter types
    /// cannot be inferred.
    #[error("scenario `{scenario}`: examples table has no rows to infer parameter types from")]
    EmptyExamples {
        /// Scenario name.
        scenario: String,
    },

    /// A step template references a placeholder the examples table does not
    /// define.
    #[error("scenario `{scenario}`: step placeholder `<{placeholder}>` names no examples column")]
    UnknownPlaceholder {
        /// Scenario name.
        scenario: String,
        /// Placeholder name without its angle brackets.
        placeholder: String,
    },

    /// Identifier derivation failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// The tagged source module could not be loaded or understood.
///
/// Fatal for an introspection run as a whole: without the module no feature
/// can be discovered.
#[derive(Debug, Error)]
pub enum ModuleLoadError {
    /// The module file could not be read.
    #[error("failed to read module: {0}")]
    Io(#[from] std::io::Error),

    /// The module is not valid Rust source.
    #[error("failed to parse module source: {0}")]
    Syntax(#[from] syn::Error),

    /// A function carries more than one step attribute.
    #[error("function `{function}` carries multiple step attributes")]
    MultipleStepAttributes {
        /// Function name.
        function: String,
    },

    /// A declarative tag could not be read.
    #[error("malformed attribute on `{element}`: {message}")]
    MalformedAttribute {
        /// Name of the tagged element.
        element: String,
        /// What was wrong with the tag.
        message: String,
    },

    /// A scenario's first step is a conjunction.
    #[error("scenario element `{element}` opens with `{keyword}`, which has no role to inherit")]
    LeadingConjunction {
        /// Name of the scenario element.
        element: String,
        /// The conjunction keyword.
        keyword: StepKeyword,
    },
}

/// Identifier or path derivation failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Sanitization removed every character of the name.
    #[error("`{name}` sanitizes to an empty identifier")]
    EmptyIdentifier {
        /// The original free-text name.
        name: String,
    },

    /// Suffix generation failed to find a free name within the retry bound.
    /// Practically unreachable; defined as a safety net.
    #[error("cannot derive a unique name from `{base}` after {attempts} attempts")]
    CollisionUnresolvable {
        /// Sanitized base identifier.
        base: String,
        /// Number of suffixes tried.
        attempts: usize,
    },
}

/// Umbrella error for pipeline units and run-fatal conditions.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Specification text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The writer rejected the model.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Stub generation could not proceed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The source module could not be loaded.
    #[error(transparent)]
    ModuleLoad(#[from] ModuleLoadError),

    /// Identifier or output-path resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Filesystem failure while reading specs or writing outputs.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Short machine-readable name of the error kind, used by report
    /// serializers.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::Write(_) => "template-mismatch",
            Self::Generation(_) => "generation",
            Self::ModuleLoad(_) => "module-load",
            Self::Resolve(_) => "resolve",
            Self::Io(_) => "io",
        }
    }
}
