use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use serde_yaml::Value;

use cooklang::{Component, Document};

use crate::error::CliError;

// ---------------------------------------------------------------------------
// Corpus format
// ---------------------------------------------------------------------------

/// One canonical corpus file.
#[derive(Debug, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub version: Option<Value>,
    pub tests: BTreeMap<String, TestCase>,
}

#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub source: String,

    #[serde(default)]
    pub result: ExpectedResult,

    /// If true, the test expects parsing to fail.
    #[serde(default)]
    pub error: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpectedResult {
    #[serde(default)]
    pub steps: Vec<Vec<ExpectedComponent>>,

    /// Compared against the display text of each metadata value.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

/// Missing fields mean "". Numbers compare by their YAML text.
#[derive(Debug, Deserialize)]
pub struct ExpectedComponent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub quantity: Value,
    #[serde(default)]
    pub units: Value,
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(", "),
        Value::Mapping(_) => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
    }
}

pub fn load_corpus(path: &Path) -> Result<Corpus, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| CliError::Corpus {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Component flattened to the corpus field names.
#[derive(Debug, PartialEq, Eq)]
struct Flat {
    kind: String,
    value: String,
    name: String,
    quantity: String,
    units: String,
}

impl From<&ExpectedComponent> for Flat {
    fn from(c: &ExpectedComponent) -> Self {
        Flat {
            kind: c.kind.clone(),
            value: scalar_text(&c.value),
            name: scalar_text(&c.name),
            quantity: scalar_text(&c.quantity),
            units: scalar_text(&c.units),
        }
    }
}

impl From<&Component> for Flat {
    fn from(c: &Component) -> Self {
        let mut flat = Flat {
            kind: c.kind().to_string(),
            value: String::new(),
            name: String::new(),
            quantity: String::new(),
            units: String::new(),
        };
        match c {
            Component::Text { value } => flat.value = value.clone(),
            Component::Ingredient {
                name,
                quantity,
                unit,
                ..
            } => {
                flat.name = name.clone();
                flat.quantity = quantity.clone();
                flat.units = unit.clone();
            }
            Component::Cookware { name, quantity } => {
                flat.name = name.clone();
                flat.quantity = quantity.clone();
            }
            Component::Timer {
                name,
                duration,
                unit,
            } => {
                flat.name = name.clone();
                flat.quantity = duration.clone();
                flat.units = unit.clone();
            }
        }
        flat
    }
}

impl fmt::Display for Flat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == "text" {
            write!(f, "text {:?}", self.value)
        } else {
            write!(
                f,
                "{} name={:?} quantity={:?} units={:?}",
                self.kind, self.name, self.quantity, self.units
            )
        }
    }
}

fn check_steps(expected: &[Vec<ExpectedComponent>], doc: &Document) -> Option<String> {
    let actual: Vec<Vec<Flat>> = doc
        .steps()
        .map(|s| s.components.iter().map(Flat::from).collect())
        .collect();

    if actual.len() != expected.len() {
        return Some(format!(
            "expected {} step(s), got {}\n{}",
            expected.len(),
            actual.len(),
            describe_steps(&actual)
        ));
    }

    for (i, (want, got)) in expected.iter().zip(&actual).enumerate() {
        let want: Vec<Flat> = want.iter().map(Flat::from).collect();
        if want.len() != got.len() {
            return Some(format!(
                "step[{}]: expected {} component(s), got {}\n{}",
                i,
                want.len(),
                got.len(),
                describe_steps(&actual)
            ));
        }
        for (j, (w, g)) in want.iter().zip(got).enumerate() {
            if w != g {
                return Some(format!(
                    "step[{}] component[{}]\n  expected: {}\n  actual:   {}",
                    i, j, w, g
                ));
            }
        }
    }
    None
}

fn describe_steps(steps: &[Vec<Flat>]) -> String {
    if steps.is_empty() {
        return "  actual steps: (none)".to_string();
    }
    let mut out = String::from("  actual steps:");
    for (i, step) in steps.iter().enumerate() {
        out.push_str(&format!("\n    [{}]", i));
        for component in step {
            out.push_str(&format!("\n      {}", component));
        }
    }
    out
}

fn check_metadata(expected: &BTreeMap<String, Value>, doc: &Document) -> Option<String> {
    for (key, want) in expected {
        let want = scalar_text(want);
        match doc.metadata.get(key) {
            Some(got) if got.to_string() == want => {}
            Some(got) => {
                return Some(format!(
                    "metadata {:?}\n  expected: {:?}\n  actual:   {:?}",
                    key,
                    want,
                    got.to_string()
                ));
            }
            None => return Some(format!("missing metadata key {:?}", key)),
        }
    }
    for (key, _) in doc.metadata.iter() {
        if !expected.contains_key(key) {
            return Some(format!("unexpected metadata key {:?}", key));
        }
    }
    None
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub fn run_case(case: &TestCase) -> TestOutcome {
    let parsed = cooklang::parse(&case.source);

    if case.error {
        return match parsed {
            Err(_) => TestOutcome::Pass,
            Ok(_) => TestOutcome::Fail("expected parse error, but parsing succeeded".into()),
        };
    }

    let doc = match parsed {
        Ok(doc) => doc,
        Err(e) => return TestOutcome::Fail(format!("unexpected parse error: {}", e)),
    };

    match check_steps(&case.result.steps, &doc)
        .or_else(|| check_metadata(&case.result.metadata, &doc))
    {
        Some(reason) => TestOutcome::Fail(reason),
        None => TestOutcome::Pass,
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Corpus files grouped by file stem. A single file is its own group.
fn discover(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    if root.is_file() {
        groups.entry(stem(root)).or_default().push(root.to_path_buf());
    } else {
        collect_corpora(root, &mut groups);
    }
    for files in groups.values_mut() {
        files.sort();
    }
    groups
}

fn collect_corpora(dir: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_corpora(&path, out);
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        ) {
            out.entry(stem(&path)).or_default().push(path);
        }
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("?")
        .to_string()
}

/// Print `group::test` for every test under `path`.
pub fn list_tests(path: &Path) -> Result<(), CliError> {
    let groups = discover(path);
    if groups.is_empty() {
        return Err(CliError::EmptyCorpus(path.to_path_buf()));
    }
    for (group, files) in &groups {
        for file in files {
            let corpus = load_corpus(file)?;
            for name in corpus.tests.keys() {
                println!("{}::{}", group, name);
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

fn pass_label(no_color: bool) -> &'static str {
    if no_color { "PASS" } else { "\x1b[32mPASS\x1b[0m" }
}

fn fail_label(no_color: bool) -> &'static str {
    if no_color { "FAIL" } else { "\x1b[31mFAIL\x1b[0m" }
}

fn bold(s: &str, no_color: bool) -> String {
    if no_color {
        s.to_string()
    } else {
        format!("\x1b[1m{}\x1b[0m", s)
    }
}

/// Run every corpus under `path`, keeping tests whose name contains
/// `filter`. Returns the exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, filter: Option<&str>) -> Result<i32, CliError> {
    let groups = discover(path);
    if groups.is_empty() {
        return Err(CliError::EmptyCorpus(path.to_path_buf()));
    }

    let mut passed = 0usize;
    let mut failed = 0usize;
    let mut failures: Vec<(String, String)> = Vec::new();

    for (group, files) in &groups {
        eprintln!();
        eprintln!("{}", bold(group, no_color));

        for file in files {
            let corpus = load_corpus(file)?;
            debug!(
                "{}: version {:?}, {} tests",
                file.display(),
                corpus.version.as_ref().map(scalar_text),
                corpus.tests.len()
            );
            for (name, case) in &corpus.tests {
                if filter.is_some_and(|f| !name.contains(f)) {
                    continue;
                }
                match run_case(case) {
                    TestOutcome::Pass => {
                        passed += 1;
                        eprintln!("  {}  {}", pass_label(no_color), name);
                    }
                    TestOutcome::Fail(reason) => {
                        failed += 1;
                        eprintln!("  {}  {}", fail_label(no_color), name);
                        failures.push((format!("{}::{}", group, name), reason));
                    }
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for (label, reason) in &failures {
            eprintln!();
            eprintln!("  --- {} ---", label);
            for line in reason.lines() {
                eprintln!("  {}", line);
            }
        }
    }

    eprintln!();
    if failed == 0 {
        let ok = if no_color { "ok" } else { "\x1b[32mok\x1b[0m" };
        eprintln!("test result: {}. {} passed, 0 failed", ok, passed);
        Ok(0)
    } else {
        let label = if no_color { "FAILED" } else { "\x1b[31mFAILED\x1b[0m" };
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            label,
            passed,
            failed,
            passed + failed
        );
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(yaml: &str) -> TestCase {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn passes(outcome: TestOutcome) -> bool {
        matches!(outcome, TestOutcome::Pass)
    }

    #[test]
    fn numbers_compare_by_text() {
        let c = case(
            r#"
source: "@eggs{3}"
result:
  steps:
    - - type: ingredient
        name: eggs
        quantity: 3
  metadata: {}
"#,
        );
        assert!(passes(run_case(&c)));
    }

    #[test]
    fn mismatch_reports_the_component() {
        let c = case(
            r#"
source: "Add @salt"
result:
  steps:
    - - type: text
        value: "Add "
      - type: ingredient
        name: pepper
"#,
        );
        let TestOutcome::Fail(reason) = run_case(&c) else {
            panic!("expected failure");
        };
        assert!(reason.contains("step[0] component[1]"));
        assert!(reason.contains("\"pepper\""));
    }

    #[test]
    fn timer_fields_map_to_quantity_and_units() {
        let c = case(
            r#"
source: "~{25%minutes}"
result:
  steps:
    - - type: timer
        quantity: 25
        units: minutes
"#,
        );
        assert!(passes(run_case(&c)));
    }

    #[test]
    fn metadata_must_match_exactly() {
        let c = case(
            r#"
source: ">> servings: 4"
result:
  steps: []
  metadata:
    servings: 4
"#,
        );
        assert!(passes(run_case(&c)));

        let c = case("source: \">> servings: 4\"\n");
        assert!(!passes(run_case(&c)));
    }

    #[test]
    fn expected_errors() {
        assert!(passes(run_case(&case("source: \"@salt{1\"\nerror: true\n"))));
        assert!(!passes(run_case(&case("source: \"@salt{1}\"\nerror: true\n"))));
    }

    #[test]
    fn scalar_text_joins_lists() {
        let value: Value = serde_yaml::from_str("[a, 2, true]").unwrap();
        assert_eq!(scalar_text(&value), "a, 2, true");
        assert_eq!(scalar_text(&Value::Null), "");
    }
}
