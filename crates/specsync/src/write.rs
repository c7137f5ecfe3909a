//! Deterministic specification text writer.
//!
//! The writer serializes one feature per text unit using a fixed grammar:
//! a `Feature:` header, the narrative indented by two spaces, then
//! blank-separated scenario blocks whose steps indent by two spaces.
//! Outline scenarios keep their placeholder markers literal and append a
//! pipe-delimited `Examples:` table with columns padded to their widest
//! entry. Given the same model the output is byte-identical across runs.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::WriteError;
use crate::model::{ExampleTable, Feature, Scenario, Step};

/// Placeholder markers are `<name>` spans inside a step template.
#[expect(clippy::expect_used, reason = "the marker pattern is a constant")]
static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<>]+)>").expect("valid placeholder regex"));

const INDENT: &str = "  ";
const TABLE_INDENT: &str = "    ";

/// List the placeholder names referenced by a step template, in order.
///
/// # Examples
///
/// ```
/// let markers = specsync::placeholders("I divide <number> by <divideby>");
/// assert_eq!(markers, vec!["number", "divideby"]);
/// ```
#[must_use]
pub fn placeholders(template: &str) -> Vec<String> {
    MARKER_RE
        .captures_iter(template)
        .filter_map(|captures| captures.get(1))
        .map(|marker| marker.as_str().to_string())
        .collect()
}

/// Serialize one feature to specification text.
///
/// # Errors
///
/// Returns [`WriteError::EmptyFeatureName`] when the feature has no name,
/// and [`WriteError::TemplateMismatch`] when a non-outline step references
/// more placeholders than it has literal arguments.
///
/// # Examples
///
/// ```
/// use specsync::{Feature, PrimaryKeyword, Scenario, Step, StepKeyword};
///
/// let feature = Feature {
///     name: "Calculator".into(),
///     narrative: vec![],
///     scenarios: vec![Scenario {
///         name: "Add".into(),
///         steps: vec![Step {
///             keyword: StepKeyword::Given,
///             kind: PrimaryKeyword::Given,
///             template: "I have entered <n>".into(),
///             args: vec!["1".into()],
///         }],
///         examples: None,
///     }],
/// };
/// let text = specsync::write_feature(&feature)?;
/// assert!(text.contains("Given I have entered 1"));
/// # Ok::<(), specsync::WriteError>(())
/// ```
pub fn write_feature(feature: &Feature) -> Result<String, WriteError> {
    if feature.name.is_empty() {
        return Err(WriteError::EmptyFeatureName);
    }
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("Feature: {}", feature.name));
    for narrative_line in &feature.narrative {
        if narrative_line.is_empty() {
            lines.push(String::new());
        } else {
            lines.push(format!("{INDENT}{narrative_line}"));
        }
    }
    for scenario in &feature.scenarios {
        lines.push(String::new());
        write_scenario(&mut lines, &feature.name, scenario)?;
    }
    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

fn write_scenario(
    lines: &mut Vec<String>,
    feature: &str,
    scenario: &Scenario,
) -> Result<(), WriteError> {
    let header = if scenario.is_outline() {
        "Scenario Outline:"
    } else {
        "Scenario:"
    };
    lines.push(format!("{header} {}", scenario.name));
    for step in &scenario.steps {
        let text = if scenario.is_outline() {
            // The table has precedence: markers stay literal and expand
            // per example row downstream.
            step.template.clone()
        } else {
            render_template(feature, &scenario.name, step)?
        };
        lines.push(format!("{INDENT}{} {text}", step.keyword));
    }
    if let Some(table) = scenario.examples.as_ref() {
        lines.push(String::new());
        lines.push(format!("{INDENT}Examples:"));
        write_table(lines, table);
    }
    Ok(())
}

/// Substitute placeholder markers positionally from the step's literal
/// arguments.
fn render_template(feature: &str, scenario: &str, step: &Step) -> Result<String, WriteError> {
    let markers = placeholders(&step.template);
    if markers.len() > step.args.len() {
        return Err(WriteError::TemplateMismatch {
            feature: feature.to_string(),
            scenario: scenario.to_string(),
            template: step.template.clone(),
            markers: markers.len(),
            args: step.args.len(),
        });
    }
    let mut next = step.args.iter();
    let rendered = MARKER_RE.replace_all(&step.template, |_: &regex::Captures<'_>| {
        next.next().cloned().unwrap_or_default()
    });
    Ok(rendered.into_owned())
}

fn write_table(lines: &mut Vec<String>, table: &ExampleTable) {
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(idx))
                .map(String::len)
                .chain(std::iter::once(column.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    lines.push(render_row(&table.columns, &widths));
    for row in &table.rows {
        lines.push(render_row(row, &widths));
    }
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from(TABLE_INDENT);
    line.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        let _ = write!(line, " {cell:<width$} |");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::{PrimaryKeyword, StepKeyword};

    fn step(keyword: StepKeyword, kind: PrimaryKeyword, template: &str, args: &[&str]) -> Step {
        Step {
            keyword,
            kind,
            template: template.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    fn calculator() -> Feature {
        Feature {
            name: "Calculator".into(),
            narrative: vec!["As a user".into(), "I want sums".into()],
            scenarios: vec![Scenario {
                name: "Add two numbers".into(),
                steps: vec![
                    step(
                        StepKeyword::Given,
                        PrimaryKeyword::Given,
                        "I have entered <n> into the calculator",
                        &["1"],
                    ),
                    step(StepKeyword::When, PrimaryKeyword::When, "I press add", &[]),
                    step(
                        StepKeyword::Then,
                        PrimaryKeyword::Then,
                        "the result should be <n>",
                        &["1"],
                    ),
                ],
                examples: None,
            }],
        }
    }

    #[test]
    fn substitutes_literals_in_non_outline_steps() {
        let text = write_feature(&calculator()).unwrap();
        assert!(text.contains("Given I have entered 1 into the calculator"));
        assert!(text.contains("Then the result should be 1"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn output_is_byte_identical_across_runs() {
        let feature = calculator();
        assert_eq!(write_feature(&feature), write_feature(&feature));
    }

    #[test]
    fn output_ends_with_exactly_one_newline() {
        let text = write_feature(&calculator()).unwrap();
        assert!(text.ends_with('\n'));
        assert!(!text.ends_with("\n\n"));
    }

    #[test]
    fn unmatched_placeholder_is_a_template_mismatch() {
        let mut feature = calculator();
        feature.scenarios[0].steps[0].args.clear();
        let error = write_feature(&feature).unwrap_err();
        assert!(matches!(
            error,
            WriteError::TemplateMismatch { markers: 1, args: 0, .. }
        ));
    }

    #[test]
    fn outline_keeps_markers_and_pads_the_table() {
        let feature = Feature {
            name: "Division".into(),
            narrative: Vec::new(),
            scenarios: vec![Scenario {
                name: "Divide".into(),
                steps: vec![step(
                    StepKeyword::Given,
                    PrimaryKeyword::Given,
                    "I divide <number> by <divideby>",
                    &[],
                )],
                examples: Some(ExampleTable {
                    columns: vec!["number".into(), "divideby".into()],
                    rows: vec![
                        vec!["10".into(), "2".into()],
                        vec!["100".into(), "4".into()],
                    ],
                }),
            }],
        };
        let text = write_feature(&feature).unwrap();
        assert!(text.contains("Scenario Outline: Divide"));
        assert!(text.contains("Given I divide <number> by <divideby>"));
        assert!(text.contains("    | number | divideby |"));
        assert!(text.contains("    | 10     | 2        |"));
        assert!(text.contains("    | 100    | 4        |"));
    }

    #[test]
    fn empty_feature_name_is_rejected() {
        let feature = Feature {
            name: String::new(),
            narrative: Vec::new(),
            scenarios: Vec::new(),
        };
        assert_eq!(write_feature(&feature), Err(WriteError::EmptyFeatureName));
    }

    #[test]
    fn placeholder_listing_preserves_order() {
        assert_eq!(
            placeholders("<b> then <a> then <b>"),
            vec!["b", "a", "b"]
        );
        assert!(placeholders("no markers here").is_empty());
    }
}
