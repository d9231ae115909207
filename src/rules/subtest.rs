//! subTest loops with single-assertion bodies become parametrize decorators
//!
//! A test whose body is exactly `for ... in ...: with self.subTest(...):
//! <assert>` is flattened; anything else keeps its loop and is transported
//! verbatim without annotation (the original is still valid).

use super::{Candidate, RewriteRule, RuleCtx, RuleOutcome};
use crate::edit::{Edit, Span};
use crate::model::{MemberKind, ModuleModel};
use crate::parser::ast_helpers::{indent_at, line_start, node_text};
use crate::recognizer::subtest_pattern;
use crate::Direction;

pub struct SubtestToParametrizeRule;

impl RewriteRule for SubtestToParametrizeRule {
    fn name(&self) -> &'static str {
        "subtest-to-parametrize"
    }

    fn direction(&self) -> Option<Direction> {
        Some(Direction::XunitToFixture)
    }

    fn find(&self, module: &ModuleModel, ctx: &RuleCtx) -> Option<Candidate> {
        for class in module.classes.iter().filter(|c| c.eligible) {
            for member in &class.members {
                if member.kind != MemberKind::Test {
                    continue;
                }
                let Some(pattern) = subtest_pattern(member.def_node, ctx.source) else {
                    continue;
                };
                // the inner assertion is rewritten to a plain assert first
                if !pattern.assert_is_plain {
                    continue;
                }
                let source = ctx.source;
                let def_node = member.def_node;
                let indent = indent_at(source, def_node.start_byte());
                let names = pattern.target_names.join(",");
                let decorator = format!(
                    "{}@pytest.mark.parametrize(\"{}\", {})\n",
                    indent,
                    names,
                    node_text(pattern.iter_node, source)
                );

                let params = def_node.child_by_field_name("parameters")?;
                let param_insert = format!(", {}", pattern.target_names.join(", "));

                let edits = vec![
                    Edit::insert(line_start(source, def_node.start_byte()), decorator),
                    Edit::insert(params.end_byte() - 1, param_insert),
                    Edit::replace(
                        Span::of(&pattern.for_node),
                        node_text(pattern.assert_stmt, source).to_string(),
                    ),
                ];
                return Some(Candidate {
                    anchor: def_node.start_byte(),
                    outcome: RuleOutcome::Replace(edits),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply_edits;
    use crate::parser::python::PythonParser;
    use crate::recognizer::recognize;
    use crate::TransformOptions;

    fn rewrite_once(source: &str) -> Option<String> {
        let tree = PythonParser::new().unwrap().parse(source).unwrap();
        let model = recognize(&tree, source);
        let options = TransformOptions::default();
        let ctx = RuleCtx {
            source,
            direction: Direction::XunitToFixture,
            options: &options,
        };
        let candidate = SubtestToParametrizeRule.find(&model, &ctx)?;
        match candidate.outcome {
            RuleOutcome::Replace(edits) => Some(apply_edits(source, &edits)),
            _ => None,
        }
    }

    #[test]
    fn flattens_single_assert_subtest_loop() {
        let src = "import unittest\n\nclass TestSub(unittest.TestCase):\n    def test_subtests(self):\n        for i in range(3):\n            with self.subTest(i=i):\n                assert i >= 0\n";
        let out = rewrite_once(src).unwrap();
        assert!(out.contains("    @pytest.mark.parametrize(\"i\", range(3))\n"));
        assert!(out.contains("    def test_subtests(self, i):\n"));
        assert!(out.contains("        assert i >= 0\n"));
        assert!(!out.contains("subTest"));
    }

    #[test]
    fn tuple_targets_become_parameter_list() {
        let src = "import unittest\n\nclass TestSub(unittest.TestCase):\n    def test_values(self):\n        for a, b in cases:\n            with self.subTest(a=a, b=b):\n                assert a == b\n";
        let out = rewrite_once(src).unwrap();
        assert!(out.contains("@pytest.mark.parametrize(\"a,b\", cases)"));
        assert!(out.contains("def test_values(self, a, b):"));
        assert!(out.contains("assert a == b\n"));
    }

    #[test]
    fn waits_for_inner_assertion_rewrite() {
        let src = "import unittest\n\nclass TestSub(unittest.TestCase):\n    def test_subtests(self):\n        for i in range(3):\n            with self.subTest(i=i):\n                self.assertTrue(i >= 0)\n";
        assert!(rewrite_once(src).is_none());
    }

    #[test]
    fn extra_statements_leave_the_loop_alone() {
        let src = "import unittest\n\nclass TestSub(unittest.TestCase):\n    def test_values(self):\n        cases = [(1, 1)]\n        for a, b in cases:\n            with self.subTest(a=a, b=b):\n                assert a == b\n";
        assert!(rewrite_once(src).is_none());
    }
}
