use std::collections::HashMap;
use std::path::PathBuf;

use recmatch_engine::combine::{
    create_new_by_match, match_and_add_keys, match_and_merge, partition_by_match,
    unmatch_and_create_new, unmatch_and_merge,
};
use recmatch_engine::engine::{load_collection, run};
use recmatch_engine::filter::{keep_by_key_value, remove_by_key_value};
use recmatch_engine::load::{collection_from_csv, collection_from_json, collection_to_json};
use recmatch_engine::model::{record, KeyValue, MergeField};
use recmatch_engine::{Collection, LogicalOperator, MatchError, MatchRule, PlanConfig, PlanInput, Value};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> Collection {
    let path = fixtures_dir().join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    if name.ends_with(".csv") {
        collection_from_csv(&text).unwrap()
    } else {
        collection_from_json(&text).unwrap()
    }
}

fn load_and_run(config_toml: &str) -> recmatch_engine::PlanResult {
    let dir = fixtures_dir();
    let config = PlanConfig::from_toml(config_toml).unwrap();

    let mut collections = HashMap::new();
    for (name, input) in &config.inputs {
        let path = dir.join(&input.file);
        let text = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
        let rows = load_collection(input.resolved_format().unwrap(), &text).unwrap();
        collections.insert(name.clone(), rows);
    }

    run(&config, &PlanInput { collections }).unwrap()
}

fn names(rows: &[recmatch_engine::Record]) -> Vec<String> {
    rows.iter()
        .map(|r| r.get("name").and_then(Value::as_str).unwrap_or("").to_string())
        .collect()
}

// -------------------------------------------------------------------------
// Plan runs
// -------------------------------------------------------------------------

#[test]
fn payroll_plan_end_to_end() {
    let toml = std::fs::read_to_string(fixtures_dir().join("payroll.plan.toml")).unwrap();
    let result = load_and_run(&toml);

    assert_eq!(result.meta.plan_name, "Payroll roster");
    assert_eq!(result.meta.output_step, "roster");

    let counts: Vec<(String, usize)> = result
        .steps
        .iter()
        .map(|s| (s.id.clone(), s.output_records))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("active".to_string(), 4),
            ("current".to_string(), 3),
            ("with_dept".to_string(), 3),
            ("roster".to_string(), 3),
        ]
    );

    assert_eq!(names(&result.output), ["Alice", "Bob", "Eva"]);
    assert_eq!(
        result.output[0],
        record([
            ("id", Value::from(1)),
            ("name", Value::from("Alice")),
            ("department", Value::from("Engineering")),
            ("manager", Value::from("Marta")),
        ])
    );
    assert_eq!(result.output[1]["department"], Value::from("Sales"));
}

#[test]
fn plan_output_serializes_as_plain_json() {
    let toml = std::fs::read_to_string(fixtures_dir().join("payroll.plan.toml")).unwrap();
    let result = load_and_run(&toml);
    let text = collection_to_json(&result.output).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed[0]["id"], serde_json::json!(1));
    assert_eq!(parsed[2]["name"], serde_json::json!("Eva"));
}

#[test]
fn plan_merge_and_rename() {
    let toml = r#"
name = "Merge + rename"

[inputs.employees]
file = "employees.json"

[inputs.terminated]
file = "terminated.json"

[[steps]]
id = "leavers"
op = "merge"
left = "employees"
right = "terminated"
fields = ["id"]

[[steps]]
id = "renamed"
op = "rename_keys"
left = "leavers"
renames = [{ from = "reason", to = "exit_reason" }]

[[steps]]
id = "slim"
op = "strip_keys"
left = "renamed"
fields = ["dept_code", "site", "status"]
"#;
    let result = load_and_run(toml);
    assert_eq!(result.output.len(), 1);
    assert_eq!(
        result.output[0],
        record([
            ("id", Value::from(4)),
            ("name", Value::from("Dinis")),
            ("exit_reason", Value::from("contract end")),
        ])
    );
}

#[test]
fn plan_type_mismatch_aborts_run() {
    // `id` is numeric in the JSON fixture
    let toml = r#"
name = "Bad substring"

[inputs.employees]
file = "employees.json"

[inputs.terminated]
file = "terminated.json"

[[steps]]
id = "x"
op = "add_keys"
left = "employees"
right = "terminated"
rules = [{ field = "id", substring = { start = 0, end = 1 } }]
merge = [{ source = "reason", target = "reason" }]
"#;
    let config = PlanConfig::from_toml(toml).unwrap();
    let collections = HashMap::from([
        ("employees".to_string(), fixture("employees.json")),
        ("terminated".to_string(), fixture("terminated.json")),
    ]);
    let err = run(&config, &PlanInput { collections }).unwrap_err();
    assert_eq!(err, MatchError::TypeMismatch { field: "id".into(), found: "number" });
}

// -------------------------------------------------------------------------
// Combinators over fixtures
// -------------------------------------------------------------------------

#[test]
fn keep_and_remove_partition_fixture() {
    let employees = fixture("employees.json");
    let pairs = [KeyValue::new("site", "Lisbon"), KeyValue::new("status", "leave")];
    for op in [LogicalOperator::Or, LogicalOperator::And] {
        let kept = keep_by_key_value(&employees, &pairs, op);
        let removed = remove_by_key_value(&employees, &pairs, op);
        assert_eq!(kept.len() + removed.len(), employees.len());
    }
    let kept = keep_by_key_value(&employees, &pairs, LogicalOperator::Or);
    assert_eq!(names(&kept), ["Alice", "Carla", "Dinis", "Eva"]);
}

#[test]
fn substring_add_keys_against_csv() {
    let employees = fixture("employees.json");
    let departments = fixture("departments.csv");
    let out = match_and_add_keys(
        &employees,
        &departments,
        &[MatchRule::substring("dept_code", 0, 3)],
        &[MergeField::new("title", "department")],
        LogicalOperator::And,
    )
    .unwrap();
    // Every employee's prefix appears exactly once in departments
    assert_eq!(out.len(), employees.len());
    assert_eq!(out[3]["department"], Value::from("Operations"));
}

#[test]
fn substring_or_site_fans_out() {
    let employees = fixture("employees.json");
    let departments = fixture("departments.csv");
    let out = match_and_add_keys(
        &employees,
        &departments,
        &[MatchRule::substring("dept_code", 0, 3), MatchRule::exact("site")],
        &[MergeField::new("title", "department")],
        LogicalOperator::Or,
    )
    .unwrap();
    // Alice: ENG + Lisbon both hit ENG-00 -> one output, not two
    let alice: Vec<_> = out.iter().filter(|r| r["name"] == Value::from("Alice")).collect();
    assert_eq!(alice.len(), 1);
    // Bob: SAL-00 by prefix and by Porto -> one; no other Porto department
    let bob: Vec<_> = out.iter().filter(|r| r["name"] == Value::from("Bob")).collect();
    assert_eq!(bob.len(), 1);
    // Carla: ENG prefix -> ENG-00, Porto -> SAL-00
    let carla: Vec<_> = out.iter().filter(|r| r["name"] == Value::from("Carla")).collect();
    assert_eq!(carla.len(), 2);
}

#[test]
fn match_and_unmatch_merge_split_the_product() {
    let employees = fixture("employees.json");
    let terminated = fixture("terminated.json");
    let matched = match_and_merge(&employees, &terminated, &["id"], LogicalOperator::And).unwrap();
    let unmatched = unmatch_and_merge(&employees, &terminated, &["id"], LogicalOperator::And).unwrap();
    assert_eq!(matched.len() + unmatched.len(), employees.len() * terminated.len());
    assert_eq!(matched.len(), 1);
}

#[test]
fn filter_variants_agree_with_partition() {
    let employees = fixture("employees.json");
    let terminated = fixture("terminated.json");
    let p = partition_by_match(&terminated, &employees, &["id"], LogicalOperator::And).unwrap();
    assert_eq!(
        create_new_by_match(&terminated, &employees, &["id"], LogicalOperator::And).unwrap(),
        p.matched
    );
    assert_eq!(
        unmatch_and_create_new(&terminated, &employees, &["id"], LogicalOperator::And).unwrap(),
        p.unmatched
    );
    assert_eq!(names(&p.matched), ["Dinis"]);
}

#[test]
fn csv_strings_never_equal_json_numbers() {
    let left = fixture("employees.json");
    let right = collection_from_csv("id,badge\n1,A-1\n2,B-2\n").unwrap();
    let out = match_and_merge(&left, &right, &["id"], LogicalOperator::And).unwrap();
    assert!(out.is_empty());
}

#[test]
fn invalid_operator_rejected_before_touching_collections() {
    let err = "xor".parse::<LogicalOperator>().unwrap_err();
    assert!(matches!(err, MatchError::InvalidArgument(_)));

    let toml = r#"
name = "xor"
[inputs.a]
file = "employees.json"
[inputs.b]
file = "terminated.json"
[[steps]]
id = "s"
op = "merge"
left = "a"
right = "b"
fields = ["id"]
operator = "xor"
"#;
    // Fails at parse/validate time; no input data is ever needed.
    let err = PlanConfig::from_toml(toml).unwrap_err();
    assert!(matches!(err, MatchError::InvalidArgument(_)));
}
