//! Line-oriented specification text parser.
//!
//! The parser is stateful and fail-fast: it classifies each line by its
//! leading keyword token, accumulates the model as it goes, and reports the
//! first malformed line with its one-based number and the construct it
//! expected. A malformed file yields one error, never partial output.
//!
//! Keyword matching is case-sensitive on the canonical tokens but tolerant
//! of surrounding whitespace. Blank lines act as separators and terminate
//! narrative blocks and examples tables.

use std::str::FromStr;

use crate::error::ParseError;
use crate::keyword::{PrimaryKeyword, StepKeyword};
use crate::model::{ExampleTable, Feature, Scenario, Step};

/// Parse specification text into the features it declares.
///
/// A text unit normally holds one feature, but the parser accepts any
/// number of `Feature:` blocks and returns them in order.
///
/// # Errors
///
/// Returns a [`ParseError`] for malformed input: a missing `Feature:`
/// header, a leading `And`/`But` with nothing to inherit from, a table row
/// whose cell count disagrees with its header, an outline without an
/// `Examples:` table, or any line that does not fit the construct the
/// parser is positioned for.
///
/// # Examples
///
/// ```
/// let text = "\
/// Feature: Calculator
///
/// Scenario: Add two numbers
///   Given I have entered 1 into the calculator
///   When I press add
///   Then the result should be 1
/// ";
/// let features = specsync::parse_spec(text)?;
/// assert_eq!(features.len(), 1);
/// assert_eq!(features[0].scenarios[0].steps.len(), 3);
/// # Ok::<(), specsync::ParseError>(())
/// ```
pub fn parse_spec(input: &str) -> Result<Vec<Feature>, ParseError> {
    let mut parser = Parser::default();
    for (idx, raw) in input.lines().enumerate() {
        parser.consume(idx + 1, raw)?;
    }
    parser.finish()
}

#[derive(Default)]
struct Parser {
    features: Vec<Feature>,
    feature: Option<FeatureBuilder>,
}

struct FeatureBuilder {
    name: String,
    /// Raw narrative lines, leading indent intact until finalization.
    narrative: Vec<String>,
    /// True between the `Feature:` line and the first blank or scenario.
    narrative_open: bool,
    scenarios: Vec<Scenario>,
    scenario: Option<ScenarioBuilder>,
}

struct ScenarioBuilder {
    name: String,
    line: usize,
    outline: bool,
    steps: Vec<Step>,
    prev: Option<PrimaryKeyword>,
    table: Option<TableBuilder>,
}

struct TableBuilder {
    /// Still accepting rows; a blank line closes the table.
    open: bool,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Parser {
    fn consume(&mut self, line: usize, raw: &str) -> Result<(), ParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.on_blank();
            return Ok(());
        }
        if let Some(rest) = trimmed.strip_prefix("Feature:") {
            return self.start_feature(line, rest.trim(), trimmed);
        }
        if let Some(rest) = trimmed.strip_prefix("Scenario Outline:") {
            return self.start_scenario(line, rest.trim(), true, trimmed);
        }
        if let Some(rest) = trimmed.strip_prefix("Scenario:") {
            return self.start_scenario(line, rest.trim(), false, trimmed);
        }

        let Some(feature) = self.feature.as_mut() else {
            return Err(ParseError::Unexpected {
                line,
                expected: "`Feature:` header",
                actual: trimmed.to_string(),
            });
        };

        // Anything between the feature header and the first scenario that
        // is not blank accumulates into the narrative, keyword-shaped or
        // not.
        if feature.scenario.is_none() && feature.narrative_open {
            feature.narrative.push(raw.trim_end().to_string());
            return Ok(());
        }

        if trimmed == "Examples:" {
            return feature.open_examples(line);
        }
        if trimmed.starts_with('|') {
            return feature.table_row(line, trimmed);
        }
        feature.step_line(line, trimmed)
    }

    fn on_blank(&mut self) {
        if let Some(feature) = self.feature.as_mut() {
            feature.narrative_open = false;
            if let Some(scenario) = feature.scenario.as_mut() {
                if let Some(table) = scenario.table.as_mut() {
                    table.open = false;
                }
            }
        }
    }

    fn start_feature(
        &mut self,
        line: usize,
        name: &str,
        actual: &str,
    ) -> Result<(), ParseError> {
        if name.is_empty() {
            return Err(ParseError::Unexpected {
                line,
                expected: "a feature name after `Feature:`",
                actual: actual.to_string(),
            });
        }
        if let Some(finished) = self.feature.take() {
            self.features.push(finished.finish()?);
        }
        self.feature = Some(FeatureBuilder {
            name: name.to_string(),
            narrative: Vec::new(),
            narrative_open: true,
            scenarios: Vec::new(),
            scenario: None,
        });
        Ok(())
    }

    fn start_scenario(
        &mut self,
        line: usize,
        name: &str,
        outline: bool,
        actual: &str,
    ) -> Result<(), ParseError> {
        let Some(feature) = self.feature.as_mut() else {
            return Err(ParseError::Unexpected {
                line,
                expected: "`Feature:` header",
                actual: actual.to_string(),
            });
        };
        if name.is_empty() {
            return Err(ParseError::Unexpected {
                line,
                expected: "a scenario name",
                actual: actual.to_string(),
            });
        }
        feature.close_scenario()?;
        feature.narrative_open = false;
        feature.scenario = Some(ScenarioBuilder {
            name: name.to_string(),
            line,
            outline,
            steps: Vec::new(),
            prev: None,
            table: None,
        });
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Feature>, ParseError> {
        if let Some(feature) = self.feature.take() {
            self.features.push(feature.finish()?);
        }
        if self.features.is_empty() {
            return Err(ParseError::MissingFeatureHeader);
        }
        Ok(self.features)
    }
}

impl FeatureBuilder {
    fn close_scenario(&mut self) -> Result<(), ParseError> {
        if let Some(scenario) = self.scenario.take() {
            self.scenarios.push(scenario.finish()?);
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Feature, ParseError> {
        self.close_scenario()?;
        Ok(Feature {
            name: self.name,
            narrative: strip_uniform_indent(&self.narrative),
            scenarios: self.scenarios,
        })
    }

    fn open_examples(&mut self, line: usize) -> Result<(), ParseError> {
        let Some(scenario) = self.scenario.as_mut() else {
            return Err(ParseError::Unexpected {
                line,
                expected: "`Scenario:` or `Scenario Outline:`",
                actual: "Examples:".to_string(),
            });
        };
        if !scenario.outline {
            return Err(ParseError::Unexpected {
                line,
                expected: "a step line (`Examples:` is only valid in a Scenario Outline)",
                actual: "Examples:".to_string(),
            });
        }
        if scenario.table.is_some() {
            return Err(ParseError::Unexpected {
                line,
                expected: "a single `Examples:` block per scenario",
                actual: "Examples:".to_string(),
            });
        }
        scenario.table = Some(TableBuilder {
            open: true,
            columns: Vec::new(),
            rows: Vec::new(),
        });
        Ok(())
    }

    fn table_row(&mut self, line: usize, trimmed: &str) -> Result<(), ParseError> {
        let table = self
            .scenario
            .as_mut()
            .and_then(|scenario| scenario.table.as_mut())
            .filter(|table| table.open)
            .ok_or_else(|| ParseError::Unexpected {
                line,
                expected: "an `Examples:` header before table rows",
                actual: trimmed.to_string(),
            })?;
        let cells = split_cells(line, trimmed)?;
        if table.columns.is_empty() {
            for (idx, cell) in cells.iter().enumerate() {
                if cells[..idx].contains(cell) {
                    return Err(ParseError::DuplicateColumn {
                        line,
                        column: cell.clone(),
                    });
                }
            }
            table.columns = cells;
        } else if cells.len() == table.columns.len() {
            table.rows.push(cells);
        } else {
            return Err(ParseError::TableWidth {
                line,
                expected: table.columns.len(),
                actual: cells.len(),
            });
        }
        Ok(())
    }

    fn step_line(&mut self, line: usize, trimmed: &str) -> Result<(), ParseError> {
        let (token, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));
        let Ok(keyword) = StepKeyword::from_str(token) else {
            let expected = if self.scenario.is_some() {
                "a step, `Examples:`, a table row, or a new scenario"
            } else {
                "`Scenario:` or `Scenario Outline:`"
            };
            return Err(ParseError::Unexpected {
                line,
                expected,
                actual: trimmed.to_string(),
            });
        };
        let Some(scenario) = self.scenario.as_mut() else {
            return Err(ParseError::Unexpected {
                line,
                expected: "`Scenario:` or `Scenario Outline:`",
                actual: trimmed.to_string(),
            });
        };
        if scenario.table.is_some() {
            return Err(ParseError::Unexpected {
                line,
                expected: "a new scenario after the Examples table",
                actual: trimmed.to_string(),
            });
        }
        let Some(kind) = keyword.resolve(&mut scenario.prev) else {
            return Err(ParseError::LeadingConjunction { line, keyword });
        };
        scenario.steps.push(Step {
            keyword,
            kind,
            template: rest.trim().to_string(),
            args: Vec::new(),
        });
        Ok(())
    }
}

impl ScenarioBuilder {
    fn finish(self) -> Result<Scenario, ParseError> {
        if self.steps.is_empty() {
            return Err(ParseError::ScenarioWithoutSteps {
                line: self.line,
                scenario: self.name,
            });
        }
        let examples = match self.table {
            Some(table) if !table.columns.is_empty() => Some(ExampleTable {
                columns: table.columns,
                rows: table.rows,
            }),
            // `Examples:` with no header row is as incomplete as no table.
            Some(_) => {
                return Err(ParseError::MissingExamples {
                    line: self.line,
                    scenario: self.name,
                });
            }
            None if self.outline => {
                return Err(ParseError::MissingExamples {
                    line: self.line,
                    scenario: self.name,
                });
            }
            None => None,
        };
        Ok(Scenario {
            name: self.name,
            steps: self.steps,
            examples,
        })
    }
}

fn split_cells(line: usize, trimmed: &str) -> Result<Vec<String>, ParseError> {
    let inner = trimmed
        .strip_prefix('|')
        .and_then(|rest| rest.strip_suffix('|'))
        .ok_or_else(|| ParseError::Unexpected {
            line,
            expected: "a pipe-delimited table row (`| a | b |`)",
            actual: trimmed.to_string(),
        })?;
    Ok(inner.split('|').map(|cell| cell.trim().to_string()).collect())
}

/// Strip the longest whitespace prefix common to all lines.
fn strip_uniform_indent(lines: &[String]) -> Vec<String> {
    let indent = lines
        .iter()
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| line.chars().skip(indent).collect::<String>().trim_end().to_string())
        .collect()
}
