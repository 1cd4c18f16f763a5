//! Fixture loading from YAML files

use serde::Deserialize;

use std::path::Path;

/// A single test case from a fixture file
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub desc: String,
    pub input: String,
    /// Serialized form after parsing. Absent means the input is already canonical.
    #[serde(default)]
    pub expected: Option<String>,
    /// The parse must fail with this kind of error
    #[serde(default)]
    pub error: Option<ExpectedError>,
    /// Substring the error message must contain
    #[serde(default)]
    pub error_contains: Option<String>,
    /// Whether the input survives re-indentation and wrapping
    #[serde(default = "default_true")]
    pub variations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedError {
    Syntax,
    TypeMismatch,
}

fn default_true() -> bool {
    true
}

impl TestCase {
    pub fn expected_text(&self) -> &str {
        self.expected.as_deref().unwrap_or(&self.input)
    }
}

/// Load all test cases from a YAML fixture file
pub fn load_fixtures(path: &Path) -> Vec<TestCase> {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));
    serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e))
}

/// Load fixtures from the standard fixtures directory
pub fn load_fixtures_by_name(name: &str) -> Vec<TestCase> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.yaml", name));
    load_fixtures(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_params() {
        let cases = load_fixtures_by_name("params");
        assert!(!cases.is_empty());
        assert!(cases.iter().any(|c| c.id == "scalar_types"));
    }

    #[test]
    fn test_error_kind() {
        let cases = load_fixtures_by_name("errors");
        assert!(cases.iter().all(|c| c.error.is_some()));
    }
}
