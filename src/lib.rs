//! Hamlet: bidirectional transpiler between Python test dialects
//!
//! This library rewrites test files between the class-based `unittest`
//! dialect and the function-based `pytest` dialect while preserving
//! comments, formatting, and unrelated code. Constructs with no faithful
//! equivalent in the target dialect are transported verbatim and annotated
//! with a structured `HAMLET-TODO` comment block.

pub mod annotate;
pub mod config;
pub mod edit;
pub mod engine;
pub mod fixture_graph;
pub mod imports;
pub mod model;
pub mod parser;
pub mod recognizer;
pub mod reporter;
pub mod rules;

use serde::{Deserialize, Serialize};

/// Direction of a transform run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// unittest-style classes become pytest-style free functions
    XunitToFixture,
    /// pytest-style free functions become a generated unittest class
    FixtureToXunit,
}

impl Direction {
    /// Framework name of the dialect this direction emits
    pub fn target_framework(&self) -> &'static str {
        match self {
            Direction::XunitToFixture => "pytest",
            Direction::FixtureToXunit => "unittest",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xunit-to-fixture" | "unittest-to-pytest" => Ok(Direction::XunitToFixture),
            "fixture-to-xunit" | "pytest-to-unittest" => Ok(Direction::FixtureToXunit),
            other => Err(format!(
                "unknown direction '{}' (expected xunit-to-fixture or fixture-to-xunit)",
                other
            )),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::XunitToFixture => write!(f, "xunit-to-fixture"),
            Direction::FixtureToXunit => write!(f, "fixture-to-xunit"),
        }
    }
}

/// Diagnostic categories; hard categories abort the transform for the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "PARSE-ERROR")]
    ParseError,
    #[serde(rename = "FIXTURE-CYCLE")]
    FixtureCycle,
    #[serde(rename = "UNCONVERTIBLE-FIXTURE")]
    UnconvertibleFixture,
    #[serde(rename = "UNCONVERTIBLE-PARAMETRIZE")]
    UnconvertibleParametrize,
    #[serde(rename = "UNCONVERTIBLE-MONKEYPATCH")]
    UnconvertibleMonkeypatch,
    #[serde(rename = "UNCONVERTIBLE-CAPTURE")]
    UnconvertibleCapture,
    #[serde(rename = "UNCONVERTIBLE-TMPPATH")]
    UnconvertibleTmpPath,
    #[serde(rename = "UNCONVERTIBLE-NOSE-PLUGIN")]
    UnconvertibleNosePlugin,
    #[serde(rename = "UNCONVERTIBLE-ASSERTION")]
    UnconvertibleAssertion,
}

impl Category {
    /// Hard categories produce a diagnostic and no output bytes
    pub fn is_hard(&self) -> bool {
        matches!(self, Category::ParseError | Category::FixtureCycle)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::ParseError => "PARSE-ERROR",
            Category::FixtureCycle => "FIXTURE-CYCLE",
            Category::UnconvertibleFixture => "UNCONVERTIBLE-FIXTURE",
            Category::UnconvertibleParametrize => "UNCONVERTIBLE-PARAMETRIZE",
            Category::UnconvertibleMonkeypatch => "UNCONVERTIBLE-MONKEYPATCH",
            Category::UnconvertibleCapture => "UNCONVERTIBLE-CAPTURE",
            Category::UnconvertibleTmpPath => "UNCONVERTIBLE-TMPPATH",
            Category::UnconvertibleNosePlugin => "UNCONVERTIBLE-NOSE-PLUGIN",
            Category::UnconvertibleAssertion => "UNCONVERTIBLE-ASSERTION",
        };
        write!(f, "{}", name)
    }
}

/// Location in a source file (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A diagnostic produced by the transform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Category of the diagnostic
    pub category: Category,
    /// Location of the construct that produced it
    pub location: Location,
    /// Human-readable message
    pub message: String,
}

/// How the generated TestCase class is named when converting to xUnit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassNameStrategy {
    /// Name derived from the first test function (`test_increment` -> `TestIncrement`)
    #[default]
    PerFunction,
    /// Name derived from the module name supplied in the options
    PerModule,
}

impl std::str::FromStr for ClassNameStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-function" => Ok(ClassNameStrategy::PerFunction),
            "per-module" | "per-file-suffix" => Ok(ClassNameStrategy::PerModule),
            other => Err(format!("unknown class name strategy '{}'", other)),
        }
    }
}

/// Options controlling a transform run
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Naming of the generated TestCase class (fixture-to-xunit only)
    pub class_name_strategy: ClassNameStrategy,
    /// Maximum number of setUp attributes converted to individually named
    /// fixtures; above this a single namespace bundle fixture is emitted
    pub autouse_inline_threshold: usize,
    /// Keep unrecognised `pytest.mark.*` decorators on converted tests
    pub preserve_unknown_markers: bool,
    /// Module name used by the per-module class naming strategy
    pub module_name: Option<String>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            class_name_strategy: ClassNameStrategy::PerFunction,
            autouse_inline_threshold: 3,
            preserve_unknown_markers: true,
            module_name: None,
        }
    }
}

/// Result of transforming a single file
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    /// Transformed source; None on a hard failure
    pub output: Option<String>,
    /// Diagnostics produced during the transform
    pub diagnostics: Vec<Diagnostic>,
}

impl TransformOutcome {
    /// True if any diagnostic is a hard failure
    pub fn has_hard_failure(&self) -> bool {
        self.diagnostics.iter().any(|d| d.category.is_hard())
    }

    /// True if the output differs from the given source
    pub fn changed(&self, source: &str) -> bool {
        match &self.output {
            Some(out) => out != source,
            None => false,
        }
    }
}

/// Transform a single source file between dialects.
///
/// Output is a deterministic function of (source, direction, options). Soft
/// unconvertibility surfaces as `HAMLET-TODO` annotations in the output plus
/// a diagnostic; hard failures (`PARSE-ERROR`, `FIXTURE-CYCLE`) yield
/// diagnostics and no output.
pub fn transform(
    source: &str,
    direction: Direction,
    options: &TransformOptions,
) -> TransformOutcome {
    engine::TransformEngine::new(direction, options.clone()).run(source)
}

/// Public API: transform a file on disk. Used by the CLI and programmatic consumers.
pub fn transform_file(
    path: &std::path::Path,
    direction: Direction,
    options: &TransformOptions,
) -> anyhow::Result<TransformOutcome> {
    use anyhow::Context;
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read test file: {}", path.display()))?;
    let mut options = options.clone();
    if options.module_name.is_none() {
        options.module_name = path.file_stem().and_then(|s| s.to_str()).map(String::from);
    }
    Ok(transform(&source, direction, &options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_both_spellings() {
        assert_eq!(
            "unittest-to-pytest".parse::<Direction>().unwrap(),
            Direction::XunitToFixture
        );
        assert_eq!(
            "fixture-to-xunit".parse::<Direction>().unwrap(),
            Direction::FixtureToXunit
        );
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn hard_categories() {
        assert!(Category::ParseError.is_hard());
        assert!(Category::FixtureCycle.is_hard());
        assert!(!Category::UnconvertibleParametrize.is_hard());
    }

    #[test]
    fn category_display_matches_wire_form() {
        assert_eq!(
            Category::UnconvertibleMonkeypatch.to_string(),
            "UNCONVERTIBLE-MONKEYPATCH"
        );
        assert_eq!(Category::ParseError.to_string(), "PARSE-ERROR");
    }
}
