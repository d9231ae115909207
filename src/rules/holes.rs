//! Framework-hole and fixture annotations for the fixture-to-xunit direction
//!
//! Parametrize decorators, pytest framework fixtures (monkeypatch, capsys,
//! capfd, tmp_path), fixtures with no local definition, and fixtures the
//! lifecycle matrix cannot absorb are preserved verbatim under HAMLET-TODO
//! blocks.

use super::functions_to_class::consumed_fixture_names;
use super::{Candidate, RewriteRule, RuleCtx, RuleOutcome};
use crate::annotate::{annotated_with, AnnotationSite};
use crate::model::{DecoKind, FixtureDef, FixtureScope, FreeTest, ModuleModel};
use crate::parser::ast_helpers::{
    code_statements, decorator_parts, plain_identifier_uses, string_value,
};
use crate::recognizer::FRAMEWORK_FIXTURES;
use crate::{Category, Direction};

pub struct ParametrizeAnnotationRule;

impl RewriteRule for ParametrizeAnnotationRule {
    fn name(&self) -> &'static str {
        "parametrize-annotation"
    }

    fn direction(&self) -> Option<Direction> {
        Some(Direction::FixtureToXunit)
    }

    fn find(&self, module: &ModuleModel, ctx: &RuleCtx) -> Option<Candidate> {
        for test in module.tests.iter().filter(|t| !t.excluded) {
            for deco in &test.decorators {
                if deco.kind != DecoKind::PytestParametrize {
                    continue;
                }
                let start = deco.node.start_byte();
                if annotated_with(ctx.source, start, Category::UnconvertibleParametrize) {
                    continue;
                }
                let site = AnnotationSite::new(
                    start,
                    Category::UnconvertibleParametrize,
                    "@pytest.mark.parametrize has no direct unittest equivalent",
                    "Use subTest() or create individual test methods for each parameter set",
                );
                return Some(Candidate {
                    anchor: start,
                    outcome: RuleOutcome::Reject(vec![site]),
                });
            }
        }
        None
    }
}

/// Category and message for a fixture name with no unittest analogue
fn hole_details(name: &str) -> (Category, String, String) {
    match name {
        "monkeypatch" => (
            Category::UnconvertibleMonkeypatch,
            "monkeypatch fixture has no direct unittest equivalent".to_string(),
            "Use unittest.mock.patch() or similar mocking approach".to_string(),
        ),
        "capsys" | "capfd" => (
            Category::UnconvertibleCapture,
            "pytest capture fixtures have no direct unittest equivalent".to_string(),
            "Use contextlib.redirect_stdout or unittest.mock to capture output".to_string(),
        ),
        "tmp_path" | "tmp_path_factory" => (
            Category::UnconvertibleTmpPath,
            format!("{} fixture has no direct unittest equivalent", name),
            "Use tempfile.mkdtemp() in setUp/tearDown".to_string(),
        ),
        other => (
            Category::UnconvertibleFixture,
            format!("fixture '{}' is not defined in this module", other),
            "Define the fixture or provide the value in setUp".to_string(),
        ),
    }
}

/// First line of the def as it will read once the test is a method of the
/// generated class: `self` first, consumed fixture parameters dropped
fn converted_def_line(test: &FreeTest, consumed: &[String]) -> String {
    let mut params = vec!["self".to_string()];
    for param in &test.params {
        if !consumed.iter().any(|c| c == param) {
            params.push(param.clone());
        }
    }
    format!("def {}({}):", test.name, params.join(", "))
}

/// Parameter names introduced by the test's parametrize decorators
pub fn parametrize_names(test: &FreeTest, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for deco in &test.decorators {
        if deco.kind != DecoKind::PytestParametrize {
            continue;
        }
        let Some((_, Some(parts))) = decorator_parts(deco.node, source) else {
            continue;
        };
        let Some(first) = parts.args.first() else {
            continue;
        };
        if first.kind() == "string" {
            for name in string_value(*first, source).split(',') {
                names.push(name.trim().to_string());
            }
        }
    }
    names
}

pub struct FrameworkHoleRule;

impl RewriteRule for FrameworkHoleRule {
    fn name(&self) -> &'static str {
        "framework-holes"
    }

    fn direction(&self) -> Option<Direction> {
        Some(Direction::FixtureToXunit)
    }

    fn find(&self, module: &ModuleModel, ctx: &RuleCtx) -> Option<Candidate> {
        let source = ctx.source;
        let consumed = consumed_fixture_names(module);
        for test in module.tests.iter().filter(|t| !t.excluded) {
            let param_names = parametrize_names(test, source);
            for param in &test.params {
                if param == "self" || param.starts_with('*') {
                    continue;
                }
                let is_hole = if FRAMEWORK_FIXTURES.contains(&param.as_str()) {
                    true
                } else {
                    module.fixture(param).is_none() && !param_names.contains(param)
                };
                if !is_hole {
                    continue;
                }
                let (category, summary, guidance) = hole_details(param);
                let mut sites = Vec::new();
                let def_start = test.def_node.start_byte();
                if !annotated_with(source, def_start, category) {
                    // the block ends up preceding the generated method, so the
                    // Original line quotes the converted signature
                    sites.push(
                        AnnotationSite::new(
                            def_start,
                            category,
                            summary.clone(),
                            guidance.clone(),
                        )
                        .with_original(converted_def_line(test, &consumed)),
                    );
                }
                if let Some(body) = test.def_node.child_by_field_name("body") {
                    for stmt in code_statements(body) {
                        if plain_identifier_uses(stmt, source, param).is_empty() {
                            continue;
                        }
                        let start = stmt.start_byte();
                        if annotated_with(source, start, category) {
                            continue;
                        }
                        sites.push(AnnotationSite::new(
                            start,
                            category,
                            summary.clone(),
                            guidance.clone(),
                        ));
                    }
                }
                if !sites.is_empty() {
                    return Some(Candidate {
                        anchor: sites[0].node_start,
                        outcome: RuleOutcome::Reject(sites),
                    });
                }
            }
        }
        None
    }
}

pub struct FixtureAnnotationRule;

impl RewriteRule for FixtureAnnotationRule {
    fn name(&self) -> &'static str {
        "fixture-annotation"
    }

    fn direction(&self) -> Option<Direction> {
        Some(Direction::FixtureToXunit)
    }

    fn find(&self, module: &ModuleModel, ctx: &RuleCtx) -> Option<Candidate> {
        let consumed = consumed_fixture_names(module);
        for fixture in &module.fixtures {
            if fixture.annotated || consumed.contains(&fixture.name) {
                continue;
            }
            let start = fixture.outer.start_byte();
            let site = AnnotationSite::new(
                start,
                Category::UnconvertibleFixture,
                fixture_summary(fixture),
                "Manually convert this fixture to setUp/tearDown or pass the value directly",
            );
            return Some(Candidate {
                anchor: start,
                outcome: RuleOutcome::Reject(vec![site]),
            });
        }
        None
    }
}

fn fixture_summary(fixture: &FixtureDef) -> String {
    if !fixture.autouse {
        "pytest fixture without autouse=True has no direct unittest equivalent".to_string()
    } else if fixture.parametrized {
        "parametrised pytest fixture has no unittest equivalent".to_string()
    } else if matches!(fixture.scope, FixtureScope::Module | FixtureScope::Session) {
        "module- or session-scoped autouse fixture has no unittest equivalent".to_string()
    } else {
        "fixture setup cannot be expressed in setUp/tearDown".to_string()
    }
}
