//! Test-source skeleton generation.
//!
//! Renders the model back into tagged Rust source with `todo!()` bodies,
//! using the same attribute convention the introspector reads. Two layouts
//! exist, selected by configuration rather than by the model:
//!
//! - [`StubLayout::Function`]: one file per feature, one function per
//!   scenario with its step attributes stacked on it;
//! - [`StubLayout::Module`]: one file per scenario, one member function
//!   per step.
//!
//! Outline scenarios infer parameter types from their example columns:
//! `i64` when every row's cell parses as an integer, `String` otherwise.

use std::fmt::Write as _;

use crate::error::GenerationError;
use crate::model::{ExampleTable, Feature, Scenario, Step};
use crate::resolve::NameResolver;
use crate::write::placeholders;

/// Rendering strategy for generated skeletons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubLayout {
    /// One function per scenario, one output unit per feature.
    Function,
    /// One module per scenario, one output unit per scenario.
    Module,
}

/// External configuration consumed by the generator.
#[derive(Debug, Clone)]
pub struct StubConfig {
    /// Which rendering strategy to apply.
    pub layout: StubLayout,
    /// Import path for the tagging attributes in generated files.
    pub namespace: String,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            layout: StubLayout::Function,
            namespace: "specsync".to_string(),
        }
    }
}

/// One rendered source unit.
#[derive(Debug, Clone)]
pub struct StubUnit {
    /// Display name for reports: the feature name, or
    /// `feature::scenario` in module layout.
    pub name: String,
    /// Free-text name the output file stem derives from.
    pub stem: String,
    /// Rendered Rust source, ending with a newline.
    pub source: String,
}

/// Inferred type of an examples column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamType {
    Int,
    Text,
}

impl ParamType {
    const fn rust_type(self) -> &'static str {
        match self {
            Self::Int => "i64",
            Self::Text => "String",
        }
    }
}

/// Render the skeleton unit(s) for one feature.
///
/// # Errors
///
/// Returns [`GenerationError`] when an outline's examples table has no
/// rows, when a step placeholder names no examples column, or when a name
/// sanitizes to an empty identifier.
pub fn generate_feature(
    feature: &Feature,
    config: &StubConfig,
) -> Result<Vec<StubUnit>, GenerationError> {
    for scenario in &feature.scenarios {
        validate_outline(scenario)?;
    }
    match config.layout {
        StubLayout::Function => generate_function_layout(feature, config).map(|unit| vec![unit]),
        StubLayout::Module => generate_module_layout(feature, config),
    }
}

fn validate_outline(scenario: &Scenario) -> Result<(), GenerationError> {
    let Some(table) = scenario.examples.as_ref() else {
        return Ok(());
    };
    if table.rows.is_empty() {
        return Err(GenerationError::EmptyExamples {
            scenario: scenario.name.clone(),
        });
    }
    for step in &scenario.steps {
        for marker in placeholders(&step.template) {
            if !table.columns.contains(&marker) {
                return Err(GenerationError::UnknownPlaceholder {
                    scenario: scenario.name.clone(),
                    placeholder: marker,
                });
            }
        }
    }
    Ok(())
}

fn generate_function_layout(
    feature: &Feature,
    config: &StubConfig,
) -> Result<StubUnit, GenerationError> {
    let mut resolver = NameResolver::new();
    let feature_ident = resolver.resolve_ident(&feature.name)?;

    let mut body = String::new();
    for (idx, scenario) in feature.scenarios.iter().enumerate() {
        if idx > 0 {
            body.push('\n');
        }
        let ident = resolver.resolve_ident(&scenario.name)?;
        push_line(&mut body, 1, &format!("#[scenario({})]", quoted(&scenario.name)));
        for row_attr in example_attrs(scenario) {
            push_line(&mut body, 1, &row_attr);
        }
        for step in &scenario.steps {
            push_line(&mut body, 1, &step_attr(step));
        }
        let params = scenario
            .examples
            .as_ref()
            .map(|table| signature_params(table, &table.columns))
            .unwrap_or_default();
        push_line(&mut body, 1, &format!("fn {ident}({params}) {{"));
        push_line(
            &mut body,
            2,
            &format!("todo!({});", quoted(&format!("implement scenario: {}", scenario.name))),
        );
        push_line(&mut body, 1, "}");
    }

    let mut source = unit_header(feature, config);
    source.push('\n');
    source.push_str(&feature_attr(feature));
    source.push('\n');
    if body.is_empty() {
        let _ = writeln!(source, "mod {feature_ident} {{}}");
    } else {
        let _ = writeln!(source, "mod {feature_ident} {{");
        source.push_str(&body);
        source.push_str("}\n");
    }
    Ok(StubUnit {
        name: feature.name.clone(),
        stem: feature.name.clone(),
        source,
    })
}

fn generate_module_layout(
    feature: &Feature,
    config: &StubConfig,
) -> Result<Vec<StubUnit>, GenerationError> {
    let mut scenario_idents = NameResolver::new();
    let feature_ident = sanitize_required(&feature.name)?;

    let mut units = Vec::with_capacity(feature.scenarios.len());
    for scenario in &feature.scenarios {
        let scenario_ident = scenario_idents.resolve_ident(&scenario.name)?;
        let mut step_idents = NameResolver::new();

        let mut body = String::new();
        for (idx, step) in scenario.steps.iter().enumerate() {
            if idx > 0 {
                body.push('\n');
            }
            let step_ident = step_idents.resolve_ident(&step.template)?;
            let params = scenario
                .examples
                .as_ref()
                .map(|table| signature_params(table, &step_markers(step)))
                .unwrap_or_default();
            push_line(&mut body, 2, &step_attr(step));
            push_line(&mut body, 2, &format!("fn {step_ident}({params}) {{"));
            push_line(
                &mut body,
                3,
                &format!("todo!({});", quoted(&format!("implement step: {}", step.template))),
            );
            push_line(&mut body, 2, "}");
        }

        let mut source = unit_header_for_scenario(scenario, config);
        source.push('\n');
        source.push_str(&feature_attr(feature));
        let _ = writeln!(source, "\nmod {feature_ident} {{");
        push_line(&mut source, 1, &format!("#[scenario({})]", quoted(&scenario.name)));
        for row_attr in example_attrs(scenario) {
            push_line(&mut source, 1, &row_attr);
        }
        let _ = writeln!(source, "    mod {scenario_ident} {{");
        source.push_str(&body);
        source.push_str("    }\n}\n");

        units.push(StubUnit {
            name: format!("{}::{}", feature.name, scenario.name),
            stem: scenario.name.clone(),
            source,
        });
    }
    Ok(units)
}

/// Markers of one step, deduplicated in first-appearance order.
fn step_markers(step: &Step) -> Vec<String> {
    let mut markers: Vec<String> = Vec::new();
    for marker in placeholders(&step.template) {
        if !markers.contains(&marker) {
            markers.push(marker);
        }
    }
    markers
}

/// Render `name: type` pairs for the given columns.
///
/// Callers validate beforehand that every name is a table column, so a
/// missing lookup renders nothing rather than panicking.
fn signature_params(table: &ExampleTable, names: &[String]) -> String {
    names
        .iter()
        .filter_map(|name| {
            let idx = table.columns.iter().position(|column| column == name)?;
            let ty = infer_column_type(table, idx).rust_type();
            let ident = crate::resolve::sanitize(name);
            Some(format!("{ident}: {ty}"))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn infer_column_type(table: &ExampleTable, idx: usize) -> ParamType {
    let all_integers = table
        .rows
        .iter()
        .filter_map(|row| row.get(idx))
        .all(|cell| cell.parse::<i64>().is_ok());
    if all_integers {
        ParamType::Int
    } else {
        ParamType::Text
    }
}

fn unit_header(feature: &Feature, config: &StubConfig) -> String {
    let tags = used_tags(feature.scenarios.iter());
    header_with_tags(&config.namespace, &tags)
}

fn unit_header_for_scenario(scenario: &Scenario, config: &StubConfig) -> String {
    let tags = used_tags(std::iter::once(scenario));
    header_with_tags(&config.namespace, &tags)
}

fn header_with_tags(namespace: &str, tags: &[&'static str]) -> String {
    let mut source = String::from(
        "//! Test skeletons generated from specification text.\n\
         //! Fill in the step bodies and keep the tags in sync.\n\n",
    );
    let _ = writeln!(source, "use {namespace}::{{{}}};", tags.join(", "));
    source
}

/// Tags referenced by the given scenarios, in canonical order.
fn used_tags<'a>(scenarios: impl Iterator<Item = &'a Scenario>) -> Vec<&'static str> {
    let mut given = false;
    let mut when = false;
    let mut then = false;
    let mut and = false;
    let mut but = false;
    let mut example = false;
    for scenario in scenarios {
        example |= scenario.is_outline();
        for step in &scenario.steps {
            match step.keyword {
                crate::keyword::StepKeyword::Given => given = true,
                crate::keyword::StepKeyword::When => when = true,
                crate::keyword::StepKeyword::Then => then = true,
                crate::keyword::StepKeyword::And => and = true,
                crate::keyword::StepKeyword::But => but = true,
            }
        }
    }
    let mut tags = vec!["feature", "scenario"];
    for (used, tag) in [
        (given, "given"),
        (when, "when"),
        (then, "then"),
        (and, "and"),
        (but, "but"),
        (example, "example"),
    ] {
        if used {
            tags.push(tag);
        }
    }
    tags
}

fn feature_attr(feature: &Feature) -> String {
    if feature.narrative.is_empty() {
        format!("#[feature(name = {})]", quoted(&feature.name))
    } else {
        format!(
            "#[feature(name = {}, narrative = {})]",
            quoted(&feature.name),
            quoted(&feature.narrative.join("\n"))
        )
    }
}

fn step_attr(step: &Step) -> String {
    let mut attr = format!(
        "#[{}({}",
        step.keyword.as_str().to_ascii_lowercase(),
        quoted(&step.template)
    );
    for arg in &step.args {
        let _ = write!(attr, ", {}", quoted(arg));
    }
    attr.push_str(")]");
    attr
}

fn example_attrs(scenario: &Scenario) -> Vec<String> {
    let Some(table) = scenario.examples.as_ref() else {
        return Vec::new();
    };
    table
        .rows
        .iter()
        .map(|row| {
            let cells = table
                .columns
                .iter()
                .zip(row)
                .map(|(column, value)| format!("{column} = {}", quoted(value)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("#[example({cells})]")
        })
        .collect()
}

fn sanitize_required(name: &str) -> Result<String, GenerationError> {
    let ident = crate::resolve::sanitize(name);
    if ident.is_empty() {
        return Err(GenerationError::Resolve(
            crate::error::ResolveError::EmptyIdentifier {
                name: name.to_string(),
            },
        ));
    }
    Ok(ident)
}

fn push_line(out: &mut String, level: usize, line: &str) {
    for _ in 0..level {
        out.push_str("    ");
    }
    out.push_str(line);
    out.push('\n');
}

/// Escape text as a Rust string literal, quotes included.
fn quoted(text: &str) -> String {
    format!("{text:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_spec;

    fn calculator() -> Feature {
        let text = "\
Feature: Calculator

Scenario: Add two numbers
  Given I have entered 1 into the calculator
  And I have also entered 2 into the calculator
  When I press add
  Then the result should be 3
";
        parse_spec(text).unwrap().remove(0)
    }

    fn division_outline() -> Feature {
        let text = "\
Feature: Division

Scenario Outline: Divide
  Given I have entered <number> into the calculator
  When I divide by <divideby>
  Then the result should be <result>

  Examples:
    | number | divideby | result |
    | 10     | 2        | 5      |
    | 20     | 4        | 5      |
";
        parse_spec(text).unwrap().remove(0)
    }

    #[test]
    fn function_layout_emits_one_unit_per_feature() {
        let units = generate_feature(&calculator(), &StubConfig::default()).unwrap();
        assert_eq!(units.len(), 1);
        let source = &units[0].source;
        assert!(source.contains("#[feature(name = \"Calculator\")]"));
        assert!(source.contains("#[scenario(\"Add two numbers\")]"));
        assert!(source.contains("fn add_two_numbers() {"));
        assert!(source.contains("todo!"));

        // Step attributes keep their order.
        let given = source.find("#[given(\"I have entered 1").unwrap();
        let and = source.find("#[and(\"I have also entered 2").unwrap();
        let when = source.find("#[when(\"I press add\")]").unwrap();
        let then = source.find("#[then(\"the result should be 3\")]").unwrap();
        assert!(given < and && and < when && when < then);
    }

    #[test]
    fn outline_infers_integer_parameters_and_reproduces_rows() {
        let units = generate_feature(&division_outline(), &StubConfig::default()).unwrap();
        let source = &units[0].source;
        assert!(source.contains("fn divide(number: i64, divideby: i64, result: i64) {"));
        assert!(source.contains(
            "#[example(number = \"10\", divideby = \"2\", result = \"5\")]"
        ));
        assert!(source.contains(
            "#[example(number = \"20\", divideby = \"4\", result = \"5\")]"
        ));
    }

    #[test]
    fn non_numeric_columns_infer_string_parameters() {
        let mut feature = division_outline();
        let table = feature.scenarios[0].examples.as_mut().unwrap();
        table.rows[1][0] = "ten".into();
        let units = generate_feature(&feature, &StubConfig::default()).unwrap();
        assert!(units[0]
            .source
            .contains("fn divide(number: String, divideby: i64, result: i64) {"));
    }

    #[test]
    fn module_layout_emits_one_unit_per_scenario() {
        let config = StubConfig {
            layout: StubLayout::Module,
            namespace: "bddtags".into(),
        };
        let units = generate_feature(&calculator(), &config).unwrap();
        assert_eq!(units.len(), 1);
        let source = &units[0].source;
        assert!(source.contains("use bddtags::{feature, scenario, given, when, then, and};"));
        assert!(source.contains("mod add_two_numbers {"));
        assert!(source.contains("fn i_have_entered_1_into_the_calculator() {"));
        assert_eq!(units[0].name, "Calculator::Add two numbers");
    }

    #[test]
    fn empty_examples_table_cannot_infer_types() {
        let mut feature = division_outline();
        feature.scenarios[0].examples.as_mut().unwrap().rows.clear();
        let error = generate_feature(&feature, &StubConfig::default()).unwrap_err();
        assert!(matches!(error, GenerationError::EmptyExamples { .. }));
    }

    #[test]
    fn unknown_placeholder_is_rejected() {
        let mut feature = division_outline();
        feature.scenarios[0].steps[0].template = "I have entered <missing>".into();
        let error = generate_feature(&feature, &StubConfig::default()).unwrap_err();
        assert!(matches!(
            error,
            GenerationError::UnknownPlaceholder { ref placeholder, .. } if placeholder == "missing"
        ));
    }

    #[test]
    fn unsanitizable_scenario_name_is_rejected() {
        let mut feature = calculator();
        feature.scenarios[0].name = "!!!".into();
        let error = generate_feature(&feature, &StubConfig::default()).unwrap_err();
        assert!(matches!(error, GenerationError::Resolve(_)));
    }

    #[test]
    fn generated_units_round_trip_through_the_introspector() {
        let feature = division_outline();
        let units = generate_feature(&feature, &StubConfig::default()).unwrap();
        let features = crate::introspect::introspect_source(&units[0].source).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].name, feature.name);
        assert_eq!(features[0].scenarios[0].name, feature.scenarios[0].name);
        assert_eq!(
            features[0].scenarios[0].examples,
            feature.scenarios[0].examples
        );
    }
}
