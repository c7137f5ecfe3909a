//! End-to-end behaviour on the calculator example: specification text in,
//! structured model and generated stub out.

use specsync::{PrimaryKeyword, StubConfig, generate_feature, parse_spec};

const CALCULATOR: &str = "\
Feature: Calculator

Scenario: Add two numbers
  Given I have entered 1 into the calculator
  And I have also entered 2 into the calculator
  When I press add
  Then the result should be 3
";

#[test]
fn parses_to_one_feature_with_four_steps() {
    let features = parse_spec(CALCULATOR).unwrap();
    assert_eq!(features.len(), 1);
    let feature = &features[0];
    assert_eq!(feature.name, "Calculator");
    assert_eq!(feature.scenarios.len(), 1);

    let scenario = &feature.scenarios[0];
    assert_eq!(scenario.name, "Add two numbers");
    assert_eq!(scenario.steps.len(), 4);
    let kinds: Vec<_> = scenario.steps.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PrimaryKeyword::Given,
            PrimaryKeyword::Given,
            PrimaryKeyword::When,
            PrimaryKeyword::Then,
        ]
    );
}

#[test]
fn generates_one_stub_unit_with_the_scenario_member() {
    let features = parse_spec(CALCULATOR).unwrap();
    let units = generate_feature(&features[0], &StubConfig::default()).unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].name, "Calculator");

    let source = &units[0].source;
    assert!(source.contains("mod calculator {"));
    assert!(source.contains("fn add_two_numbers() {"));

    // Four step placeholders, in step order.
    let positions: Vec<usize> = [
        "#[given(\"I have entered 1 into the calculator\")]",
        "#[and(\"I have also entered 2 into the calculator\")]",
        "#[when(\"I press add\")]",
        "#[then(\"the result should be 3\")]",
    ]
    .iter()
    .map(|needle| source.find(needle).unwrap())
    .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn outline_expands_into_typed_parameters_and_data_rows() {
    let text = "\
Feature: Division

Scenario Outline: Divide two numbers
  Given I have entered <number> into the calculator
  When I divide by <divideby>
  Then the result should be <result>

  Examples:
    | number | divideby | result |
    | 10     | 2        | 5      |
    | 20     | 4        | 5      |
";
    let features = parse_spec(text).unwrap();
    let units = generate_feature(&features[0], &StubConfig::default()).unwrap();
    let source = &units[0].source;

    assert!(source.contains(
        "fn divide_two_numbers(number: i64, divideby: i64, result: i64) {"
    ));
    assert!(source.contains("#[example(number = \"10\", divideby = \"2\", result = \"5\")]"));
    assert!(source.contains("#[example(number = \"20\", divideby = \"4\", result = \"5\")]"));
}
