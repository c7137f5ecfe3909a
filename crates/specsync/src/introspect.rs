//! Static introspection of declaratively tagged test source.
//!
//! This module parses Rust source with `syn` and rebuilds the model from
//! the tagging convention the stub generator emits:
//!
//! - `#[feature(name = "...", narrative = "...")]` on an inline `mod`;
//! - `#[scenario("Name")]` on a `fn` (one function per scenario, step
//!   attributes stacked in order) or on a nested `mod` (one module per
//!   scenario, one step attribute per member function);
//! - `#[given("template", "arg", ...)]` and the `when`/`then`/`and`/`but`
//!   equivalents, where literals after the template are the embedded
//!   arguments;
//! - `#[example(column = "value", ...)]` rows on outline scenarios,
//!   columns keyed by first appearance.
//!
//! A bare step attribute on a module-style member infers its template from
//! the function name by replacing underscores with spaces. Introspection is
//! a pure read of the syntax tree; no test logic ever runs.

use camino::Utf8Path;

use crate::error::ModuleLoadError;
use crate::keyword::{PrimaryKeyword, StepKeyword};
use crate::model::{ExampleTable, Feature, Scenario, Step};

const STEP_ATTRS: &[(&str, StepKeyword)] = &[
    ("given", StepKeyword::Given),
    ("when", StepKeyword::When),
    ("then", StepKeyword::Then),
    ("and", StepKeyword::And),
    ("but", StepKeyword::But),
];

/// Introspect a tagged Rust source file from disk.
///
/// # Errors
///
/// Returns [`ModuleLoadError`] when the file cannot be read, is not valid
/// Rust source, or carries a malformed tag. Load failure is fatal for the
/// whole introspection run.
pub fn introspect_file(path: &Utf8Path) -> Result<Vec<Feature>, ModuleLoadError> {
    let source = std::fs::read_to_string(path)?;
    introspect_source(&source)
}

/// Introspect tagged Rust source text.
///
/// Features are returned in declaration order. A module with no
/// feature-tagged elements yields an empty list; a feature with no
/// scenarios is still emitted. Both are non-fatal.
///
/// # Errors
///
/// Returns [`ModuleLoadError`] for unparseable source or malformed tags.
///
/// # Examples
///
/// ```
/// let source = r#"
/// #[feature(name = "Calculator")]
/// mod calculator {
///     #[scenario("Add")]
///     #[given("I have entered 1")]
///     #[when("I press add")]
///     #[then("the result should be 1")]
///     fn add() {}
/// }
/// "#;
/// let features = specsync::introspect_source(source)?;
/// assert_eq!(features[0].name, "Calculator");
/// assert_eq!(features[0].scenarios[0].steps.len(), 3);
/// # Ok::<(), specsync::ModuleLoadError>(())
/// ```
pub fn introspect_source(source: &str) -> Result<Vec<Feature>, ModuleLoadError> {
    let file = syn::parse_file(source)?;
    let mut features = Vec::new();
    collect_features(&file.items, &mut features)?;
    Ok(features)
}

fn collect_features(
    items: &[syn::Item],
    out: &mut Vec<Feature>,
) -> Result<(), ModuleLoadError> {
    for item in items {
        let syn::Item::Mod(module) = item else {
            continue;
        };
        if let Some(attr) = find_attr(&module.attrs, "feature") {
            out.push(read_feature(module, attr)?);
        } else if let Some((_, nested)) = module.content.as_ref() {
            collect_features(nested, out)?;
        }
    }
    Ok(())
}

fn find_attr<'a>(attrs: &'a [syn::Attribute], name: &str) -> Option<&'a syn::Attribute> {
    attrs.iter().find(|attr| attr.path().is_ident(name))
}

fn read_feature(
    module: &syn::ItemMod,
    attr: &syn::Attribute,
) -> Result<Feature, ModuleLoadError> {
    let element = module.ident.to_string();
    let mut name: Option<String> = None;
    let mut narrative: Vec<String> = Vec::new();
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            let lit: syn::LitStr = meta.value()?.parse()?;
            name = Some(lit.value());
            Ok(())
        } else if meta.path.is_ident("narrative") {
            let lit: syn::LitStr = meta.value()?.parse()?;
            let text = lit.value();
            if !text.is_empty() {
                // Blank interior lines cannot round-trip through the text
                // grammar, where a blank line terminates the narrative.
                narrative = text
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string)
                    .collect();
            }
            Ok(())
        } else {
            Err(meta.error("expected `name` or `narrative`"))
        }
    })
    .map_err(|err| malformed(&element, &err.to_string()))?;
    let name = name
        .filter(|value| !value.is_empty())
        .ok_or_else(|| malformed(&element, "feature tag is missing a non-empty `name`"))?;

    let mut scenarios = Vec::new();
    if let Some((_, items)) = module.content.as_ref() {
        for item in items {
            match item {
                syn::Item::Fn(function) => {
                    if let Some(scenario_attr) = find_attr(&function.attrs, "scenario") {
                        scenarios.push(read_function_scenario(function, scenario_attr)?);
                    }
                }
                syn::Item::Mod(nested) => {
                    if let Some(scenario_attr) = find_attr(&nested.attrs, "scenario") {
                        scenarios.push(read_module_scenario(nested, scenario_attr)?);
                    }
                }
                _ => {}
            }
        }
    }

    Ok(Feature {
        name,
        narrative,
        scenarios,
    })
}

/// One function per scenario: step attributes stacked on the function in
/// step order.
fn read_function_scenario(
    function: &syn::ItemFn,
    scenario_attr: &syn::Attribute,
) -> Result<Scenario, ModuleLoadError> {
    let element = function.sig.ident.to_string();
    let name = scenario_name(scenario_attr, &element)?;

    let mut prev: Option<PrimaryKeyword> = None;
    let mut steps = Vec::new();
    for attr in &function.attrs {
        let Some(keyword) = step_attr_keyword(attr) else {
            continue;
        };
        let (template, args) = read_step_args(attr, &element, None)?;
        steps.push(make_step(keyword, &mut prev, template, args, &element)?);
    }
    if steps.is_empty() {
        return Err(malformed(&element, "scenario declares no steps"));
    }

    let examples = read_examples(&function.attrs, &element)?;
    Ok(Scenario {
        name,
        steps,
        examples,
    })
}

/// One module per scenario: each member function carries exactly one step
/// attribute, in declaration order.
fn read_module_scenario(
    module: &syn::ItemMod,
    scenario_attr: &syn::Attribute,
) -> Result<Scenario, ModuleLoadError> {
    let element = module.ident.to_string();
    let name = scenario_name(scenario_attr, &element)?;

    let mut prev: Option<PrimaryKeyword> = None;
    let mut steps = Vec::new();
    if let Some((_, items)) = module.content.as_ref() {
        for item in items {
            let syn::Item::Fn(function) = item else {
                continue;
            };
            let function_name = function.sig.ident.to_string();
            let mut found: Option<(StepKeyword, &syn::Attribute)> = None;
            for attr in &function.attrs {
                let Some(keyword) = step_attr_keyword(attr) else {
                    continue;
                };
                if found.is_some() {
                    return Err(ModuleLoadError::MultipleStepAttributes {
                        function: function_name,
                    });
                }
                found = Some((keyword, attr));
            }
            let Some((keyword, attr)) = found else {
                continue;
            };
            let (template, args) = read_step_args(attr, &function_name, Some(&function_name))?;
            steps.push(make_step(keyword, &mut prev, template, args, &element)?);
        }
    }
    if steps.is_empty() {
        return Err(malformed(&element, "scenario declares no steps"));
    }

    let examples = read_examples(&module.attrs, &element)?;
    Ok(Scenario {
        name,
        steps,
        examples,
    })
}

fn make_step(
    keyword: StepKeyword,
    prev: &mut Option<PrimaryKeyword>,
    template: String,
    args: Vec<String>,
    element: &str,
) -> Result<Step, ModuleLoadError> {
    let Some(kind) = keyword.resolve(prev) else {
        return Err(ModuleLoadError::LeadingConjunction {
            element: element.to_string(),
            keyword,
        });
    };
    Ok(Step {
        keyword,
        kind,
        template,
        args,
    })
}

fn scenario_name(
    attr: &syn::Attribute,
    element: &str,
) -> Result<String, ModuleLoadError> {
    let lit: syn::LitStr = attr
        .parse_args()
        .map_err(|_| malformed(element, "scenario tag expects one string literal name"))?;
    let name = lit.value();
    if name.is_empty() {
        return Err(malformed(element, "scenario name is empty"));
    }
    Ok(name)
}

fn step_attr_keyword(attr: &syn::Attribute) -> Option<StepKeyword> {
    STEP_ATTRS
        .iter()
        .find(|(name, _)| attr.path().is_ident(name))
        .map(|(_, keyword)| *keyword)
}

/// Read `("template", "arg", ...)` from a step attribute.
///
/// `infer_from` enables the bare-attribute form for module-style members,
/// where the template falls back to the function name with underscores
/// replaced by spaces.
fn read_step_args(
    attr: &syn::Attribute,
    element: &str,
    infer_from: Option<&str>,
) -> Result<(String, Vec<String>), ModuleLoadError> {
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return infer_from
            .map(|function| (function.replace('_', " "), Vec::new()))
            .ok_or_else(|| malformed(element, "step attribute needs a text template"));
    }
    let literals = attr
        .parse_args_with(
            syn::punctuated::Punctuated::<syn::Lit, syn::Token![,]>::parse_terminated,
        )
        .map_err(|err| malformed(element, &err.to_string()))?;
    let mut iter = literals.into_iter();
    let template = match iter.next() {
        Some(syn::Lit::Str(lit)) => lit.value(),
        _ => {
            return Err(malformed(
                element,
                "step attribute needs a string template as its first argument",
            ));
        }
    };
    let mut args = Vec::new();
    for lit in iter {
        args.push(literal_value(&lit, element)?);
    }
    Ok((template, args))
}

fn read_examples(
    attrs: &[syn::Attribute],
    element: &str,
) -> Result<Option<ExampleTable>, ModuleLoadError> {
    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("example") {
            continue;
        }
        let mut row: Vec<(String, String)> = Vec::new();
        attr.parse_nested_meta(|meta| {
            let column = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .ok_or_else(|| meta.error("expected a column name"))?;
            let lit: syn::Lit = meta.value()?.parse()?;
            let value = literal_value(&lit, element)
                .map_err(|_| meta.error("expected a string or integer value"))?;
            row.push((column, value));
            Ok(())
        })
        .map_err(|err| malformed(element, &err.to_string()))?;

        if row.is_empty() {
            return Err(malformed(element, "example row has no columns"));
        }
        if columns.is_empty() {
            // First row fixes the column order; names must be unique or
            // the written table could never parse back.
            for (idx, (column, _)) in row.iter().enumerate() {
                if row[..idx].iter().any(|(name, _)| name == column) {
                    return Err(malformed(
                        element,
                        &format!("duplicate example column `{column}`"),
                    ));
                }
            }
            columns = row.iter().map(|(column, _)| column.clone()).collect();
            rows.push(row.into_iter().map(|(_, value)| value).collect());
            continue;
        }
        if row.len() != columns.len() {
            return Err(malformed(
                element,
                "example rows must all provide the same columns",
            ));
        }
        let mut cells = Vec::with_capacity(columns.len());
        for column in &columns {
            let Some((_, value)) = row.iter().find(|(name, _)| name == column) else {
                return Err(malformed(
                    element,
                    &format!("example row is missing column `{column}`"),
                ));
            };
            cells.push(value.clone());
        }
        rows.push(cells);
    }
    if columns.is_empty() {
        return Ok(None);
    }
    Ok(Some(ExampleTable { columns, rows }))
}

fn literal_value(lit: &syn::Lit, element: &str) -> Result<String, ModuleLoadError> {
    match lit {
        syn::Lit::Str(lit) => Ok(lit.value()),
        syn::Lit::Int(lit) => Ok(lit.base10_digits().to_string()),
        syn::Lit::Bool(lit) => Ok(lit.value.to_string()),
        _ => Err(malformed(
            element,
            "tag values must be string, integer, or boolean literals",
        )),
    }
}

fn malformed(element: &str, message: &str) -> ModuleLoadError {
    ModuleLoadError::MalformedAttribute {
        element: element.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_both_scenario_styles() {
        let source = r#"
#[feature(name = "Calculator", narrative = "As a user\nI want sums")]
mod calculator {
    #[scenario("Add two numbers")]
    #[given("I have entered <n> into the calculator", "1")]
    #[and("I have also entered <n> into the calculator", "2")]
    #[when("I press add")]
    #[then("the result should be <n>", "3")]
    fn add_two_numbers() {}

    #[scenario("Clear the display")]
    mod clear_the_display {
        #[given("a previous result")]
        fn a_previous_result() {}

        #[when]
        fn i_press_clear() {}

        #[then("the display shows 0")]
        fn the_display_shows_0() {}
    }
}
"#;
        let features = introspect_source(source).unwrap();
        assert_eq!(features.len(), 1);
        let feature = &features[0];
        assert_eq!(feature.name, "Calculator");
        assert_eq!(feature.narrative, vec!["As a user", "I want sums"]);
        assert_eq!(feature.scenarios.len(), 2);

        let add = &feature.scenarios[0];
        assert_eq!(add.steps.len(), 4);
        assert_eq!(add.steps[0].args, vec!["1"]);
        assert_eq!(add.steps[1].keyword, StepKeyword::And);
        assert_eq!(add.steps[1].kind, PrimaryKeyword::Given);

        let clear = &feature.scenarios[1];
        assert_eq!(clear.steps.len(), 3);
        // Bare attribute infers the template from the function name.
        assert_eq!(clear.steps[1].template, "i press clear");
    }

    #[test]
    fn collects_example_rows_into_one_table() {
        let source = r#"
#[feature(name = "Division")]
mod division {
    #[scenario("Divide")]
    #[example(number = "10", divideby = "2", result = "5")]
    #[example(number = 20, divideby = 4, result = 5)]
    #[given("I have entered <number> into the calculator")]
    #[when("I divide by <divideby>")]
    #[then("the result should be <result>")]
    fn divide() {}
}
"#;
        let features = introspect_source(source).unwrap();
        let table = features[0].scenarios[0].examples.as_ref().unwrap();
        assert_eq!(table.columns, vec!["number", "divideby", "result"]);
        assert_eq!(table.rows, vec![vec!["10", "2", "5"], vec!["20", "4", "5"]]);
    }

    #[test]
    fn feature_without_scenarios_is_still_emitted() {
        let source = r#"
#[feature(name = "Placeholder")]
mod placeholder {}
"#;
        let features = introspect_source(source).unwrap();
        assert_eq!(features[0].name, "Placeholder");
        assert!(features[0].scenarios.is_empty());
    }

    #[test]
    fn module_without_features_yields_an_empty_result() {
        let features = introspect_source("fn main() {}").unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn multiple_step_attributes_on_one_member_are_rejected() {
        let source = r#"
#[feature(name = "F")]
mod f {
    #[scenario("S")]
    mod s {
        #[given("a")]
        #[when("b")]
        fn confused() {}
    }
}
"#;
        let error = introspect_source(source).unwrap_err();
        assert!(matches!(
            error,
            ModuleLoadError::MultipleStepAttributes { ref function } if function == "confused"
        ));
    }

    #[test]
    fn duplicate_example_columns_are_rejected() {
        let source = r#"
#[feature(name = "F")]
mod f {
    #[scenario("S")]
    #[example(n = "1", n = "2")]
    #[given("uses <n>")]
    fn s() {}
}
"#;
        let error = introspect_source(source).unwrap_err();
        assert!(matches!(
            error,
            ModuleLoadError::MalformedAttribute { ref message, .. }
                if message.contains("duplicate example column `n`")
        ));
    }

    #[test]
    fn leading_conjunction_in_tags_is_rejected() {
        let source = r#"
#[feature(name = "F")]
mod f {
    #[scenario("S")]
    #[and("something")]
    fn s() {}
}
"#;
        let error = introspect_source(source).unwrap_err();
        assert!(matches!(error, ModuleLoadError::LeadingConjunction { .. }));
    }

    #[test]
    fn invalid_rust_source_is_a_load_error() {
        assert!(matches!(
            introspect_source("mod {"),
            Err(ModuleLoadError::Syntax(_))
        ));
    }

    #[test]
    fn features_nest_below_plain_modules() {
        let source = r#"
mod outer {
    #[feature(name = "Inner")]
    mod inner {
        #[scenario("S")]
        #[given("a step")]
        fn s() {}
    }
}
"#;
        let features = introspect_source(source).unwrap();
        assert_eq!(features[0].name, "Inner");
    }
}
