//! Bidirectional synchronization between business-readable specification
//! text and structured Rust test definitions.
//!
//! Both directions share one intermediate model ([`Feature`], [`Scenario`],
//! [`Step`], [`ExampleTable`]):
//!
//! - **code → spec**: [`introspect_source`] reads declaratively tagged test
//!   source into the model and [`write_feature`] serializes it to
//!   specification text;
//! - **spec → code**: [`parse_spec`] reads specification text into the
//!   model and [`generate_feature`] renders test-source skeletons.
//!
//! The two directions are round-trip stable on the elements they share:
//! names, ordering, step text, and example data.
//!
//! [`generate_specs_from_module`] and [`generate_stubs_from_specs`] wrap
//! the transformations into batch operations with per-feature failure
//! isolation; a command surface builds its exit code on the returned
//! [`RunReport`].

pub mod error;
pub mod introspect;
pub mod keyword;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod resolve;
pub mod stubgen;
pub mod write;

pub use error::{
    GenerationError, ModuleLoadError, ParseError, ResolveError, SyncError, WriteError,
};
pub use introspect::{introspect_file, introspect_source};
pub use keyword::{PrimaryKeyword, StepKeyword, StepKeywordParseError};
pub use model::{ExampleTable, Feature, Scenario, Step};
pub use parse::parse_spec;
pub use pipeline::{RunReport, UnitFailure, generate_specs_from_module, generate_stubs_from_specs};
pub use resolve::{NameResolver, sanitize};
pub use stubgen::{StubConfig, StubLayout, StubUnit, generate_feature};
pub use write::{placeholders, write_feature};
