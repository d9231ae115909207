//! Assertion rewrites: `self.assertX(...)` <-> plain `assert` statements
//!
//! These run before any class/function conversion so that moved bodies
//! already carry target-dialect assertions.

use super::{Candidate, RewriteRule, RuleCtx, RuleOutcome};
use crate::edit::{Edit, Span};
use crate::model::{AssertionKind, MemberKind, ModuleModel};
use crate::parser::ast_helpers::{
    call_parts, node_text, operand_text, walk_no_nested_defs,
};
use crate::recognizer::self_assert_calls;
use crate::Direction;
use tree_sitter::Node;

pub struct XunitAssertRule;

impl RewriteRule for XunitAssertRule {
    fn name(&self) -> &'static str {
        "xunit-assertions"
    }

    fn direction(&self) -> Option<Direction> {
        Some(Direction::XunitToFixture)
    }

    fn find(&self, module: &ModuleModel, ctx: &RuleCtx) -> Option<Candidate> {
        for class in module.classes.iter().filter(|c| c.eligible) {
            for member in &class.members {
                if !matches!(
                    member.kind,
                    MemberKind::Test | MemberKind::Lifecycle(_) | MemberKind::Helper
                ) {
                    continue;
                }
                for (method, call) in self_assert_calls(member.def_node, ctx.source) {
                    let Some(kind) = AssertionKind::from_unittest_method(&method) else {
                        continue;
                    };
                    if matches!(kind, AssertionKind::Raises | AssertionKind::RaisesMatch) {
                        continue;
                    }
                    if let Some(replacement) = method_call_to_assert(kind, call, ctx.source) {
                        return Some(Candidate {
                            anchor: call.start_byte(),
                            outcome: RuleOutcome::Replace(vec![Edit::replace(
                                Span::of(&call),
                                replacement,
                            )]),
                        });
                    }
                }
            }
        }
        None
    }
}

/// Render a plain assert statement for one `self.assertX(...)` call
fn method_call_to_assert(kind: AssertionKind, call: Node, source: &str) -> Option<String> {
    let parts = call_parts(call, source)?;
    let args = &parts.args;
    let msg = |index: usize| -> String {
        args.get(index)
            .map(|m| format!(", {}", node_text(*m, source)))
            .unwrap_or_default()
    };
    let text = match kind {
        AssertionKind::Equal
        | AssertionKind::NotEqual
        | AssertionKind::Greater
        | AssertionKind::GreaterEqual
        | AssertionKind::Less
        | AssertionKind::LessEqual
        | AssertionKind::In
        | AssertionKind::NotIn => {
            let a = operand_text(*args.first()?, source);
            let b = operand_text(*args.get(1)?, source);
            format!("assert {} {} {}{}", a, kind.operator()?, b, msg(2))
        }
        AssertionKind::IsTrue => {
            format!("assert {}{}", bare_operand(*args.first()?, source), msg(1))
        }
        AssertionKind::IsFalse => {
            format!("assert not {}{}", not_operand(*args.first()?, source), msg(1))
        }
        AssertionKind::IsNone => {
            format!(
                "assert {} is None{}",
                operand_text(*args.first()?, source),
                msg(1)
            )
        }
        AssertionKind::IsNotNone => {
            format!(
                "assert {} is not None{}",
                operand_text(*args.first()?, source),
                msg(1)
            )
        }
        AssertionKind::Raises | AssertionKind::RaisesMatch | AssertionKind::SubtestScope => {
            return None;
        }
    };
    Some(text)
}

/// Operand in bare assert position: only lambdas and walrus bindings need parens
fn bare_operand(node: Node, source: &str) -> String {
    let text = node_text(node, source);
    match node.kind() {
        "lambda" | "named_expression" => format!("({})", text),
        _ => text.to_string(),
    }
}

/// Operand under `not`: parenthesise anything that binds looser than `not`
fn not_operand(node: Node, source: &str) -> String {
    let text = node_text(node, source);
    match node.kind() {
        "boolean_operator" | "conditional_expression" | "lambda" | "named_expression" => {
            format!("({})", text)
        }
        _ => text.to_string(),
    }
}

/// Annotates `self.assertX` calls outside the translatable set. The class
/// containing one stays in the source dialect; the block records why.
pub struct UnknownAssertRule;

impl RewriteRule for UnknownAssertRule {
    fn name(&self) -> &'static str {
        "unknown-assertions"
    }

    fn direction(&self) -> Option<Direction> {
        Some(Direction::XunitToFixture)
    }

    fn find(&self, module: &ModuleModel, ctx: &RuleCtx) -> Option<Candidate> {
        use crate::annotate::{annotated_with, AnnotationSite};
        use crate::Category;

        for class in module.classes.iter().filter(|c| c.is_testcase) {
            for (method, call) in self_assert_calls(class.class_node, ctx.source) {
                if crate::recognizer::KNOWN_ASSERT_METHODS.contains(&method.as_str()) {
                    continue;
                }
                let anchor = call.start_byte();
                if annotated_with(ctx.source, anchor, Category::UnconvertibleAssertion) {
                    continue;
                }
                let site = AnnotationSite::new(
                    anchor,
                    Category::UnconvertibleAssertion,
                    format!("{} has no plain-assert equivalent", method),
                    "Rewrite this assertion manually in pytest style".to_string(),
                );
                return Some(Candidate {
                    anchor,
                    outcome: RuleOutcome::Reject(vec![site]),
                });
            }
        }
        None
    }
}

pub struct FixtureAssertRule;

impl RewriteRule for FixtureAssertRule {
    fn name(&self) -> &'static str {
        "fixture-assertions"
    }

    fn direction(&self) -> Option<Direction> {
        Some(Direction::FixtureToXunit)
    }

    fn find(&self, module: &ModuleModel, ctx: &RuleCtx) -> Option<Candidate> {
        for test in module.tests.iter().filter(|t| !t.excluded) {
            let Some(body) = test.def_node.child_by_field_name("body") else {
                continue;
            };
            let mut asserts = Vec::new();
            walk_no_nested_defs(body, &mut |n| {
                if n.kind() == "assert_statement" {
                    asserts.push(n);
                }
            });
            for stmt in asserts {
                if let Some(replacement) = assert_to_method_call(stmt, ctx.source) {
                    return Some(Candidate {
                        anchor: stmt.start_byte(),
                        outcome: RuleOutcome::Replace(vec![Edit::replace(
                            Span::of(&stmt),
                            replacement,
                        )]),
                    });
                }
            }
        }
        None
    }
}

/// Render a `self.assertX(...)` call for one plain assert statement.
/// Unmatched shapes return None and are transported verbatim.
pub fn assert_to_method_call(stmt: Node, source: &str) -> Option<String> {
    let mut cursor = stmt.walk();
    let exprs: Vec<Node> = stmt
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect();
    let cond = *exprs.first()?;
    let msg = exprs
        .get(1)
        .map(|m| format!(", {}", node_text(*m, source)))
        .unwrap_or_default();

    // one level of parens around the whole condition is transparent
    let cond = if cond.kind() == "parenthesized_expression" {
        cond.named_child(0)?
    } else {
        cond
    };

    let text = match cond.kind() {
        "comparison_operator" => {
            let mut c2 = cond.walk();
            let operands: Vec<Node> = cond
                .named_children(&mut c2)
                .filter(|n| n.kind() != "comment")
                .collect();
            if operands.len() != 2 {
                return None; // chained comparisons are transported
            }
            let (a, b) = (operands[0], operands[1]);
            let op = source[a.end_byte()..b.start_byte()]
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            match op.as_str() {
                "is" => {
                    if b.kind() == "none" {
                        format!("self.assertIsNone({}{})", node_text(a, source), msg)
                    } else {
                        return None;
                    }
                }
                "is not" => {
                    if b.kind() == "none" {
                        format!("self.assertIsNotNone({}{})", node_text(a, source), msg)
                    } else {
                        return None;
                    }
                }
                other => {
                    let kind = AssertionKind::from_operator(other)?;
                    format!(
                        "self.{}({}, {}{})",
                        kind.unittest_method()?,
                        node_text(a, source),
                        node_text(b, source),
                        msg
                    )
                }
            }
        }
        "not_operator" => {
            let arg = cond.child_by_field_name("argument")?;
            format!("self.assertFalse({}{})", node_text(arg, source), msg)
        }
        _ => format!("self.assertTrue({}{})", node_text(cond, source), msg),
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply_edits;
    use crate::parser::python::PythonParser;
    use crate::recognizer::recognize;
    use crate::TransformOptions;

    fn rewrite_once(source: &str, direction: Direction) -> Option<String> {
        let tree = PythonParser::new().unwrap().parse(source).unwrap();
        let model = recognize(&tree, source);
        let options = TransformOptions::default();
        let ctx = RuleCtx {
            source,
            direction,
            options: &options,
        };
        let rule: Box<dyn RewriteRule> = match direction {
            Direction::XunitToFixture => Box::new(XunitAssertRule),
            Direction::FixtureToXunit => Box::new(FixtureAssertRule),
        };
        let candidate = rule.find(&model, &ctx)?;
        match candidate.outcome {
            RuleOutcome::Replace(edits) => Some(apply_edits(source, &edits)),
            _ => None,
        }
    }

    fn in_class(body: &str) -> String {
        format!(
            "import unittest\n\nclass TestX(unittest.TestCase):\n    def test_x(self):\n        {}\n",
            body
        )
    }

    #[test]
    fn assert_equal_to_plain() {
        let out = rewrite_once(&in_class("self.assertEqual(x + 1, expected)"), Direction::XunitToFixture).unwrap();
        assert!(out.contains("assert x + 1 == expected\n"));
    }

    #[test]
    fn assert_true_and_false() {
        let out = rewrite_once(&in_class("self.assertTrue(flag)"), Direction::XunitToFixture).unwrap();
        assert!(out.contains("assert flag\n"));
        let out = rewrite_once(&in_class("self.assertFalse(a or b)"), Direction::XunitToFixture).unwrap();
        assert!(out.contains("assert not (a or b)\n"));
    }

    #[test]
    fn assert_in_and_none() {
        let out = rewrite_once(&in_class("self.assertIn(item, items)"), Direction::XunitToFixture).unwrap();
        assert!(out.contains("assert item in items\n"));
        let out = rewrite_once(&in_class("self.assertIsNotNone(result)"), Direction::XunitToFixture).unwrap();
        assert!(out.contains("assert result is not None\n"));
    }

    #[test]
    fn message_argument_is_preserved() {
        let out = rewrite_once(
            &in_class("self.assertEqual(a, b, \"mismatch\")"),
            Direction::XunitToFixture,
        )
        .unwrap();
        assert!(out.contains("assert a == b, \"mismatch\"\n"));
    }

    #[test]
    fn comparison_operand_is_parenthesised() {
        let out = rewrite_once(
            &in_class("self.assertEqual(a == b, c)"),
            Direction::XunitToFixture,
        )
        .unwrap();
        assert!(out.contains("assert (a == b) == c\n"));
    }

    #[test]
    fn plain_assert_to_assert_equal() {
        let src = "def test_increment():\n    assert x + 1 == expected\n";
        let out = rewrite_once(src, Direction::FixtureToXunit).unwrap();
        assert!(out.contains("self.assertEqual(x + 1, expected)\n"));
    }

    #[test]
    fn plain_assert_comparison_family() {
        let src = "def test_cmp():\n    assert len(s) > 0\n";
        let out = rewrite_once(src, Direction::FixtureToXunit).unwrap();
        assert!(out.contains("self.assertGreater(len(s), 0)\n"));

        let src = "def test_in():\n    assert '1234' in message\n";
        let out = rewrite_once(src, Direction::FixtureToXunit).unwrap();
        assert!(out.contains("self.assertIn('1234', message)\n"));
    }

    #[test]
    fn plain_assert_none_and_not() {
        let src = "def test_none():\n    assert result is None\n";
        let out = rewrite_once(src, Direction::FixtureToXunit).unwrap();
        assert!(out.contains("self.assertIsNone(result)\n"));

        let src = "def test_not():\n    assert not flag\n";
        let out = rewrite_once(src, Direction::FixtureToXunit).unwrap();
        assert!(out.contains("self.assertFalse(flag)\n"));
    }

    #[test]
    fn bare_expression_becomes_assert_true() {
        let src = "def test_bare():\n    assert response.ok\n";
        let out = rewrite_once(src, Direction::FixtureToXunit).unwrap();
        assert!(out.contains("self.assertTrue(response.ok)\n"));
    }

    #[test]
    fn assert_message_is_preserved() {
        let src = "def test_msg():\n    assert a == b, \"mismatch\"\n";
        let out = rewrite_once(src, Direction::FixtureToXunit).unwrap();
        assert!(out.contains("self.assertEqual(a, b, \"mismatch\")\n"));
    }

    #[test]
    fn chained_comparison_is_transported() {
        let src = "def test_chain():\n    assert a < b < c\n";
        assert!(rewrite_once(src, Direction::FixtureToXunit).is_none());
    }

    #[test]
    fn is_with_non_none_is_transported() {
        let src = "def test_is():\n    assert a is b\n";
        assert!(rewrite_once(src, Direction::FixtureToXunit).is_none());
    }

    #[test]
    fn excluded_test_is_untouched() {
        let src = "@with_setup(setup_func)\ndef test_with_setup():\n    assert True\n";
        assert!(rewrite_once(src, Direction::FixtureToXunit).is_none());
    }
}
