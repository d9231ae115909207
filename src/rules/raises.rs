//! Exception-assertion rewrites: `assertRaises` <-> `pytest.raises`
//!
//! Context-manager forms map directly; the call form is rewritten to the
//! context-manager form in both directions. References to the context
//! variable are renamed (`ctx.exception` <-> `ctx.value`).

use super::{Candidate, RewriteRule, RuleCtx, RuleOutcome};
use crate::edit::{Edit, Span};
use crate::model::{MemberKind, ModuleModel};
use crate::parser::ast_helpers::{
    call_parts, dotted_name, indent_at, node_text, receiver_attrs, walk_no_nested_defs, CallParts,
};
use crate::recognizer::with_items;
use crate::Direction;
use tree_sitter::Node;

pub struct XunitRaisesRule;

impl RewriteRule for XunitRaisesRule {
    fn name(&self) -> &'static str {
        "xunit-raises"
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
                let Some(body) = member.def_node.child_by_field_name("body") else {
                    continue;
                };
                if let Some(candidate) = first_rewrite(body, ctx.source, Dialect::Xunit) {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

pub struct FixtureRaisesRule;

impl RewriteRule for FixtureRaisesRule {
    fn name(&self) -> &'static str {
        "fixture-raises"
    }

    fn direction(&self) -> Option<Direction> {
        Some(Direction::FixtureToXunit)
    }

    fn find(&self, module: &ModuleModel, ctx: &RuleCtx) -> Option<Candidate> {
        for test in module.tests.iter().filter(|t| !t.excluded) {
            let Some(body) = test.def_node.child_by_field_name("body") else {
                continue;
            };
            if let Some(candidate) = first_rewrite(body, ctx.source, Dialect::Fixture) {
                return Some(candidate);
            }
        }
        None
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Dialect {
    Xunit,
    Fixture,
}

/// First raises construct in the body convertible to the other dialect
fn first_rewrite(body: Node, source: &str, from: Dialect) -> Option<Candidate> {
    let mut nodes = Vec::new();
    walk_no_nested_defs(body, &mut |n| {
        if matches!(n.kind(), "with_statement" | "call") {
            nodes.push(n);
        }
    });
    for node in nodes {
        let candidate = match node.kind() {
            "with_statement" => context_form(node, source, from),
            _ => call_form(node, source, from),
        };
        if candidate.is_some() {
            return candidate;
        }
    }
    None
}

fn is_raises_callee(name: &str, from: Dialect) -> bool {
    match from {
        Dialect::Xunit => name == "self.assertRaises" || name == "self.assertRaisesRegex",
        Dialect::Fixture => name == "pytest.raises" || name == "raises",
    }
}

/// `with <raises>(...) [as ctx]:` rewritten in place
fn context_form(with_node: Node, source: &str, from: Dialect) -> Option<Candidate> {
    let items = with_items(with_node);
    let (value, alias) = items.first().copied()?;
    if value.kind() != "call" {
        return None;
    }
    let parts = call_parts(value, source)?;
    let name = parts.func_name.clone()?;
    if !is_raises_callee(&name, from) {
        return None;
    }
    let header = render_header(&name, &parts, source, from)?;

    let mut edits = vec![Edit::replace(Span::of(&value), header)];
    if let Some(alias) = alias {
        let alias_name = node_text(alias, source).to_string();
        // the alias outlives the with block; rename through the whole function
        let scope = enclosing_function_body(with_node).unwrap_or(with_node);
        let (old_attr, new_attr) = match from {
            Dialect::Xunit => ("exception", "value"),
            Dialect::Fixture => ("value", "exception"),
        };
        for (attr, attr_node) in receiver_attrs(scope, source, &alias_name) {
            if attr == old_attr {
                edits.push(Edit::replace(
                    Span::of(&attr_node),
                    format!("{}.{}", alias_name, new_attr),
                ));
            }
        }
    }
    Some(Candidate {
        anchor: with_node.start_byte(),
        outcome: RuleOutcome::Replace(edits),
    })
}

fn enclosing_function_body<'t>(mut node: Node<'t>) -> Option<Node<'t>> {
    while let Some(parent) = node.parent() {
        if parent.kind() == "function_definition" {
            return parent.child_by_field_name("body");
        }
        node = parent;
    }
    None
}

/// Context expression for the target dialect, or None when extra arguments
/// make the construct untranslatable
fn render_header(
    name: &str,
    parts: &CallParts,
    source: &str,
    from: Dialect,
) -> Option<String> {
    match from {
        Dialect::Xunit => {
            let exc = node_text(*parts.args.first()?, source);
            if name.ends_with("Regex") {
                let pattern = node_text(*parts.args.get(1)?, source);
                Some(format!("pytest.raises({}, match={})", exc, pattern))
            } else {
                if parts.args.len() > 1 || !parts.kwargs.is_empty() {
                    return None;
                }
                Some(format!("pytest.raises({})", exc))
            }
        }
        Dialect::Fixture => {
            let exc = node_text(*parts.args.first()?, source);
            if parts.args.len() > 1 {
                return None;
            }
            let mut match_arg = None;
            for (key, value) in &parts.kwargs {
                if key == "match" {
                    match_arg = Some(*value);
                } else {
                    return None;
                }
            }
            Some(match match_arg {
                Some(pattern) => format!(
                    "self.assertRaisesRegex({}, {})",
                    exc,
                    node_text(pattern, source)
                ),
                None => format!("self.assertRaises({})", exc),
            })
        }
    }
}

/// `<raises>(E, fn, *args)` as a statement becomes the context-manager form
fn call_form(call: Node, source: &str, from: Dialect) -> Option<Candidate> {
    let stmt = call.parent()?;
    if stmt.kind() != "expression_statement" {
        return None;
    }
    let parts = call_parts(call, source)?;
    let name = parts.func_name.clone()?;
    if !is_raises_callee(&name, from) {
        return None;
    }

    // assertRaisesRegex call form carries the pattern before the callable
    let regex = name.ends_with("Regex");
    let callable_index = if regex { 2 } else { 1 };
    let exc = node_text(*parts.args.first()?, source);
    let callable = node_text(*parts.args.get(callable_index)?, source);
    let mut call_args: Vec<String> = parts.args[callable_index + 1..]
        .iter()
        .map(|a| node_text(*a, source).to_string())
        .collect();
    for (key, value) in &parts.kwargs {
        call_args.push(format!("{}={}", key, node_text(*value, source)));
    }

    let header = match (from, regex) {
        (Dialect::Xunit, false) => format!("pytest.raises({})", exc),
        (Dialect::Xunit, true) => format!(
            "pytest.raises({}, match={})",
            exc,
            node_text(*parts.args.get(1)?, source)
        ),
        (Dialect::Fixture, _) => format!("self.assertRaises({})", exc),
    };
    let indent = indent_at(source, stmt.start_byte());
    let replacement = format!(
        "with {}:\n{}    {}({})",
        header,
        indent,
        callable,
        call_args.join(", ")
    );
    Some(Candidate {
        anchor: stmt.start_byte(),
        outcome: RuleOutcome::Replace(vec![Edit::replace(Span::of(&stmt), replacement)]),
    })
}

/// True when the expression is a raises-family callee in the source dialect;
/// used by conversion guards
pub fn is_raises_call(node: Node, source: &str) -> bool {
    if node.kind() != "call" {
        return false;
    }
    node.child_by_field_name("function")
        .and_then(|f| dotted_name(f, source))
        .map(|n| {
            n == "pytest.raises"
                || n == "raises"
                || n == "self.assertRaises"
                || n == "self.assertRaisesRegex"
        })
        .unwrap_or(false)
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
            Direction::XunitToFixture => Box::new(XunitRaisesRule),
            Direction::FixtureToXunit => Box::new(FixtureRaisesRule),
        };
        let candidate = rule.find(&model, &ctx)?;
        match candidate.outcome {
            RuleOutcome::Replace(edits) => Some(apply_edits(source, &edits)),
            _ => None,
        }
    }

    #[test]
    fn context_manager_to_pytest_raises() {
        let src = "import unittest\n\nclass TestX(unittest.TestCase):\n    def test_x(self):\n        with self.assertRaises(ValueError):\n            int('x')\n";
        let out = rewrite_once(src, Direction::XunitToFixture).unwrap();
        assert!(out.contains("with pytest.raises(ValueError):\n"));
    }

    #[test]
    fn context_variable_is_renamed() {
        let src = "import unittest\n\nclass TestX(unittest.TestCase):\n    def test_x(self):\n        with self.assertRaises(ValueError) as ctx:\n            int('x')\n        self.assertIn('x', str(ctx.exception))\n";
        let out = rewrite_once(src, Direction::XunitToFixture).unwrap();
        assert!(out.contains("with pytest.raises(ValueError) as ctx:"));
        assert!(out.contains("str(ctx.value)"));
    }

    #[test]
    fn raises_regex_maps_to_match() {
        let src = "import unittest\n\nclass TestX(unittest.TestCase):\n    def test_x(self):\n        with self.assertRaisesRegex(ValueError, 'bad input'):\n            int('x')\n";
        let out = rewrite_once(src, Direction::XunitToFixture).unwrap();
        assert!(out.contains("with pytest.raises(ValueError, match='bad input'):"));
    }

    #[test]
    fn call_form_becomes_context_form() {
        let src = "import unittest\n\nclass TestX(unittest.TestCase):\n    def test_x(self):\n        self.assertRaises(ValueError, int, 'x')\n";
        let out = rewrite_once(src, Direction::XunitToFixture).unwrap();
        assert!(out.contains("with pytest.raises(ValueError):\n            int('x')\n"));
    }

    #[test]
    fn pytest_raises_to_assert_raises() {
        let src = "import pytest\n\ndef test_x():\n    with pytest.raises(ValueError):\n        int('x')\n";
        let out = rewrite_once(src, Direction::FixtureToXunit).unwrap();
        assert!(out.contains("with self.assertRaises(ValueError):\n"));
    }

    #[test]
    fn pytest_match_to_assert_raises_regex() {
        let src = "import pytest\n\ndef test_x():\n    with pytest.raises(OutOfStockError, match='Insufficient stock'):\n        warehouse.reserve('B', 20)\n";
        let out = rewrite_once(src, Direction::FixtureToXunit).unwrap();
        assert!(out.contains("with self.assertRaisesRegex(OutOfStockError, 'Insufficient stock'):"));
    }

    #[test]
    fn exc_info_value_is_renamed() {
        let src = "import pytest\n\ndef test_x():\n    with pytest.raises(ValueError) as exc_info:\n        int('x')\n    assert 'x' in str(exc_info.value)\n";
        let out = rewrite_once(src, Direction::FixtureToXunit).unwrap();
        assert!(out.contains("with self.assertRaises(ValueError) as exc_info:"));
        assert!(!out.contains("exc_info.value"));
        assert!(out.contains("exc_info.exception"));
    }

    #[test]
    fn unknown_kwargs_are_transported() {
        let src = "import pytest\n\ndef test_x():\n    with pytest.raises(ValueError, check=callback):\n        int('x')\n";
        assert!(rewrite_once(src, Direction::FixtureToXunit).is_none());
    }
}
