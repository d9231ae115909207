//! Module conversion for the fixture-to-xunit direction
//!
//! Free `test_*` functions collapse into a single generated
//! `unittest.TestCase` class. Convertible autouse fixtures are lowered into
//! lifecycle methods (their dependency chains inlined in resolution order);
//! everything else moves into the class carrying its annotation, with its
//! parameter list preserved verbatim.

use super::{class_name_from, Candidate, RewriteRule, RuleCtx, RuleOutcome};
use crate::edit::{rewrite_slice, Edit, Span};
use crate::fixture_graph::dependency_order;
use crate::model::{DecoKind, FixtureDef, FixtureScope, FixtureShape, FreeTest, ModuleModel};
use crate::parser::ast_helpers::{
    code_statements, indent_at, leading_comment_start, line_end, line_start, node_text, params_of,
    plain_identifier_uses, reindent,
};
use crate::{ClassNameStrategy, Direction};
use std::collections::HashSet;
use tree_sitter::Node;

/// A fixture the lifecycle matrix can absorb: autouse, unparametrised,
/// per-test or per-class scope, simple return/yield shape, with a dependency
/// chain of local non-autouse return-only fixtures that no test requests
/// directly
pub fn consumable(fixture: &FixtureDef, module: &ModuleModel) -> bool {
    if !fixture.autouse
        || fixture.parametrized
        || !fixture.shape_ok
        || !matches!(fixture.scope, FixtureScope::Function | FixtureScope::Class)
    {
        return false;
    }
    let Ok(order) = dependency_order(module, &fixture.name) else {
        return false;
    };
    for name in &order {
        let Some(entry) = module.fixture(name) else {
            return false;
        };
        for dep in &entry.deps {
            if module.fixture(dep).is_none() {
                return false;
            }
        }
        if name != &fixture.name {
            if entry.autouse
                || entry.shape != FixtureShape::Return
                || entry.parametrized
                || !entry.shape_ok
                || referenced_by_tests(module, name)
            {
                return false;
            }
        }
    }
    true
}

fn referenced_by_tests(module: &ModuleModel, name: &str) -> bool {
    module
        .tests
        .iter()
        .filter(|t| !t.excluded)
        .any(|t| t.params.iter().any(|p| p == name))
}

/// Names of every fixture removed from the module by conversion: consumable
/// autouse fixtures plus their inlined dependency closures
pub fn consumed_fixture_names(module: &ModuleModel) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for fixture in module.fixtures.iter().filter(|f| consumable(f, module)) {
        if let Ok(order) = dependency_order(module, &fixture.name) {
            for name in order {
                if !out.contains(&name) {
                    out.push(name);
                }
            }
        }
    }
    out
}

pub struct FunctionsToClassRule;

impl RewriteRule for FunctionsToClassRule {
    fn name(&self) -> &'static str {
        "functions-to-class"
    }

    fn direction(&self) -> Option<Direction> {
        Some(Direction::FixtureToXunit)
    }

    fn is_conversion(&self) -> bool {
        true
    }

    fn find(&self, module: &ModuleModel, ctx: &RuleCtx) -> Option<Candidate> {
        let movable: Vec<&FreeTest> = module.tests.iter().filter(|t| !t.excluded).collect();
        if movable.is_empty() {
            return None;
        }
        let edits = build_conversion(module, ctx, &movable);
        Some(Candidate {
            anchor: movable[0].outer.start_byte(),
            outcome: RuleOutcome::Replace(edits),
        })
    }
}

fn build_conversion(module: &ModuleModel, ctx: &RuleCtx, movable: &[&FreeTest]) -> Vec<Edit> {
    let source = ctx.source;
    let consumed = consumed_fixture_names(module);
    let consumed_set: HashSet<&str> = consumed.iter().map(|s| s.as_str()).collect();

    let roots_fn: Vec<&FixtureDef> = module
        .fixtures
        .iter()
        .filter(|f| f.scope == FixtureScope::Function && consumable(f, module))
        .collect();
    let roots_class: Vec<&FixtureDef> = module
        .fixtures
        .iter()
        .filter(|f| f.scope == FixtureScope::Class && consumable(f, module))
        .collect();

    let mut blocks: Vec<String> = Vec::new();
    let (setup_class, teardown_class) = lifecycle_blocks(&roots_class, module, source, "cls");
    let (setup, teardown) = lifecycle_blocks(&roots_fn, module, source, "self");
    blocks.extend(setup_class);
    blocks.extend(teardown_class);
    blocks.extend(setup);
    blocks.extend(teardown);

    // moved members in document order
    let mut moved: Vec<(Node, Option<String>)> = Vec::new();
    for fixture in &module.fixtures {
        if consumed_set.contains(fixture.name.as_str()) {
            moved.push((fixture.outer, None));
        } else {
            moved.push((fixture.outer, Some(render_fixture_method(fixture, source))));
        }
    }
    for test in movable {
        moved.push((
            test.outer,
            Some(render_test_method(test, &consumed_set, source, ctx)),
        ));
    }
    moved.sort_by_key(|(node, _)| node.start_byte());
    for (_, rendered) in &moved {
        if let Some(text) = rendered {
            blocks.push(text.clone());
        }
    }

    let class_name = match ctx.options.class_name_strategy {
        ClassNameStrategy::PerFunction => class_name_from(&movable[0].name),
        ClassNameStrategy::PerModule => {
            class_name_from(ctx.options.module_name.as_deref().unwrap_or("module"))
        }
    };
    let mut class_text = format!(
        "class {}(unittest.TestCase):\n{}",
        class_name,
        blocks.join("\n")
    );
    if !class_text.ends_with('\n') {
        class_text.push('\n');
    }

    // deletions for every moved node; the first becomes the insertion point
    let mut edits = Vec::new();
    let first_del_start = leading_comment_start(source, moved[0].0.start_byte());
    let bytes = source.as_bytes();
    for (i, (outer, _)) in moved.iter().enumerate() {
        let del_start = leading_comment_start(source, outer.start_byte());
        let del_end = swallow_blank_lines(source, outer.end_byte());
        if i == 0 {
            let mut pre = del_start;
            while pre >= 2 && bytes[pre - 1] == b'\n' && bytes[pre - 2] == b'\n' {
                pre -= 1;
            }
            let prefix = if pre > 0 { "\n\n" } else { "" };
            let suffix = if retained_content_follows(module, &moved, first_del_start) {
                "\n\n"
            } else {
                ""
            };
            edits.push(Edit::replace(
                Span::new(pre, del_end),
                format!("{}{}{}", prefix, class_text, suffix),
            ));
        } else {
            edits.push(Edit::delete(Span::new(del_start, del_end)));
        }
    }
    edits
}

fn swallow_blank_lines(source: &str, mut end: usize) -> usize {
    let bytes = source.as_bytes();
    while end < bytes.len() && bytes[end] == b'\n' {
        end += 1;
    }
    end
}

/// True when some module item that is not moved starts after the class site
fn retained_content_follows(
    module: &ModuleModel,
    moved: &[(Node, Option<String>)],
    first_del_start: usize,
) -> bool {
    let mut cursor = module.root.walk();
    let children: Vec<Node> = module.root.named_children(&mut cursor).collect();
    for child in children {
        if child.start_byte() <= first_del_start {
            continue;
        }
        let inside_moved = moved.iter().any(|(outer, _)| {
            child.start_byte() >= outer.start_byte() && child.end_byte() <= outer.end_byte()
        });
        if !inside_moved {
            return true;
        }
    }
    false
}

/// setUp/tearDown (or setUpClass/tearDownClass) blocks for a set of root
/// fixtures; teardown parts run in reverse acquisition order
fn lifecycle_blocks(
    roots: &[&FixtureDef],
    module: &ModuleModel,
    source: &str,
    receiver: &str,
) -> (Option<String>, Option<String>) {
    if roots.is_empty() {
        return (None, None);
    }
    let mut setup_body = String::new();
    let mut teardown_parts: Vec<String> = Vec::new();
    let mut inlined: HashSet<String> = HashSet::new();

    for root in roots {
        let order = dependency_order(module, &root.name).unwrap_or_default();
        for name in &order {
            if !inlined.insert(name.clone()) {
                continue;
            }
            let Some(fixture) = module.fixture(name) else {
                continue;
            };
            if name == &root.name {
                setup_body.push_str(&inline_setup_body(fixture, receiver, source));
            } else {
                setup_body.push_str(&inline_dep_body(fixture, source));
            }
        }
        if root.shape == FixtureShape::Yield {
            let part = teardown_body(root, receiver, source);
            if !part.is_empty() {
                teardown_parts.push(part);
            }
        }
    }

    let setup = if setup_body.is_empty() {
        None
    } else if receiver == "cls" {
        Some(format!(
            "    @classmethod\n    def setUpClass(cls):\n{}",
            setup_body
        ))
    } else {
        Some(format!("    def setUp(self):\n{}", setup_body))
    };

    teardown_parts.reverse();
    let teardown_text: String = teardown_parts.concat();
    let teardown = if teardown_text.is_empty() {
        None
    } else if receiver == "cls" {
        Some(format!(
            "    @classmethod\n    def tearDownClass(cls):\n{}",
            teardown_text
        ))
    } else {
        Some(format!("    def tearDown(self):\n{}", teardown_text))
    };
    (setup, teardown)
}

/// The expression statement holding the fixture's top-level yield
fn yield_statement<'t>(body: Node<'t>) -> Option<Node<'t>> {
    code_statements(body).into_iter().find(|stmt| {
        stmt.kind() == "expression_statement"
            && stmt
                .named_child(0)
                .map(|n| n.kind() == "yield")
                .unwrap_or(false)
    })
}

fn trailing_return<'t>(body: Node<'t>) -> Option<Node<'t>> {
    code_statements(body)
        .last()
        .copied()
        .filter(|n| n.kind() == "return_statement")
}

/// Pre-yield (or whole return-only) body of a root fixture, rebound to the
/// lifecycle receiver and re-indented for a method body
fn inline_setup_body(fixture: &FixtureDef, receiver: &str, source: &str) -> String {
    let Some(body) = fixture.def_node.child_by_field_name("body") else {
        return String::new();
    };
    let body_indent = indent_at(source, body.start_byte()).len();
    let name = &fixture.name;
    let mut edits: Vec<Edit> = Vec::new();
    let mut span_end = body.end_byte();

    match fixture.shape {
        FixtureShape::Return => {
            if let Some(ret) = trailing_return(body) {
                match ret.named_child(0) {
                    Some(v) => edits.push(Edit::replace(
                        Span::of(&ret),
                        format!("{}.{} = {}", receiver, name, node_text(v, source)),
                    )),
                    None => edits.push(Edit::delete(Span::new(
                        line_start(source, ret.start_byte()),
                        ret.end_byte(),
                    ))),
                }
            }
        }
        FixtureShape::Yield => {
            let Some(yield_stmt) = yield_statement(body) else {
                return String::new();
            };
            span_end = yield_stmt.end_byte();
            let yield_line = Span::new(line_start(source, yield_stmt.start_byte()), span_end);
            let value = yield_stmt.named_child(0).and_then(|y| y.named_child(0));
            match value {
                Some(v) => match foldable_assignment(body, yield_stmt, v, source) {
                    Some(target) => {
                        edits.push(Edit::replace(
                            Span::of(&target),
                            format!("{}.{}", receiver, name),
                        ));
                        edits.push(Edit::delete(yield_line));
                    }
                    None => edits.push(Edit::replace(
                        Span::of(&yield_stmt),
                        format!("{}.{} = {}", receiver, name, node_text(v, source)),
                    )),
                },
                None => edits.push(Edit::delete(yield_line)),
            }
        }
    }

    let span = Span::new(line_start(source, body.start_byte()), span_end);
    finish_block(rewrite_slice(source, span, &edits), body_indent)
}

/// When the yield value is a local bound by the immediately preceding
/// assignment and not otherwise used before the yield, the assignment target
/// is rebound directly to the lifecycle attribute
fn foldable_assignment<'t>(
    body: Node<'t>,
    yield_stmt: Node<'t>,
    value: Node<'t>,
    source: &str,
) -> Option<Node<'t>> {
    if value.kind() != "identifier" {
        return None;
    }
    let var = node_text(value, source);
    let stmts = code_statements(body);
    let yield_index = stmts.iter().position(|s| *s == yield_stmt)?;
    if yield_index == 0 {
        return None;
    }
    let prev = stmts[yield_index - 1];
    if prev.kind() != "expression_statement" {
        return None;
    }
    let assign = prev.named_child(0)?;
    if assign.kind() != "assignment" {
        return None;
    }
    let left = assign.child_by_field_name("left")?;
    if left.kind() != "identifier" || node_text(left, source) != var {
        return None;
    }
    // only the binding itself may use the name before the yield
    let pre_uses = plain_identifier_uses(body, source, var)
        .into_iter()
        .filter(|n| n.start_byte() < yield_stmt.start_byte())
        .count();
    if pre_uses != 1 {
        return None;
    }
    Some(left)
}

/// A dependency fixture's body inlined as local bindings
fn inline_dep_body(fixture: &FixtureDef, source: &str) -> String {
    let Some(body) = fixture.def_node.child_by_field_name("body") else {
        return String::new();
    };
    let body_indent = indent_at(source, body.start_byte()).len();
    let mut edits: Vec<Edit> = Vec::new();
    if let Some(ret) = trailing_return(body) {
        match ret.named_child(0) {
            Some(v) => edits.push(Edit::replace(
                Span::of(&ret),
                format!("{} = {}", fixture.name, node_text(v, source)),
            )),
            None => edits.push(Edit::delete(Span::new(
                line_start(source, ret.start_byte()),
                ret.end_byte(),
            ))),
        }
    }
    let span = Span::new(line_start(source, body.start_byte()), body.end_byte());
    finish_block(rewrite_slice(source, span, &edits), body_indent)
}

/// Post-yield statements of a root fixture, with the yielded local renamed
/// to the lifecycle attribute
fn teardown_body(fixture: &FixtureDef, receiver: &str, source: &str) -> String {
    let Some(body) = fixture.def_node.child_by_field_name("body") else {
        return String::new();
    };
    let Some(yield_stmt) = yield_statement(body) else {
        return String::new();
    };
    let region_start = line_end(source, yield_stmt.end_byte() - 1);
    if region_start >= body.end_byte() {
        return String::new();
    }
    let body_indent = indent_at(source, body.start_byte()).len();
    let mut edits: Vec<Edit> = Vec::new();
    if let Some(value) = yield_stmt.named_child(0).and_then(|y| y.named_child(0)) {
        if value.kind() == "identifier" {
            let var = node_text(value, source);
            for use_node in plain_identifier_uses(body, source, var) {
                if use_node.start_byte() >= region_start {
                    edits.push(Edit::replace(
                        Span::of(&use_node),
                        format!("{}.{}", receiver, fixture.name),
                    ));
                }
            }
        }
    }
    let span = Span::new(region_start, body.end_byte());
    finish_block(rewrite_slice(source, span, &edits), body_indent)
}

/// Reindent a rendered body fragment to method depth and normalise newlines
fn finish_block(text: String, from_indent: usize) -> String {
    let delta = 8 - from_indent as isize;
    let mut out = reindent(text.trim_end_matches('\n'), delta);
    // deleting statements can leave blank lines behind
    while out.contains("\n\n\n") {
        out = out.replace("\n\n\n", "\n\n");
    }
    let out = out.trim_end().to_string();
    if out.is_empty() {
        return String::new();
    }
    format!("{}\n", out)
}

/// An unconvertible fixture moved into the class with `self` inserted
fn render_fixture_method(fixture: &FixtureDef, source: &str) -> String {
    let span = Span::new(
        leading_comment_start(source, fixture.outer.start_byte()),
        fixture.outer.end_byte(),
    );
    let edits = vec![rebuild_params(fixture.def_node, source, &HashSet::new())];
    let text = rewrite_slice(source, span, &edits);
    ensure_newline(reindent(&text, 4))
}

/// A test function moved into the class: `self` first, consumed fixture
/// parameters dropped and their uses rebound to attributes
fn render_test_method(
    test: &FreeTest,
    consumed: &HashSet<&str>,
    source: &str,
    ctx: &RuleCtx,
) -> String {
    let span = Span::new(
        leading_comment_start(source, test.outer.start_byte()),
        test.outer.end_byte(),
    );
    let dropped: HashSet<&str> = test
        .params
        .iter()
        .map(|p| p.as_str())
        .filter(|p| consumed.contains(*p))
        .collect();
    let mut edits = vec![rebuild_params(test.def_node, source, &dropped)];
    if let Some(body) = test.def_node.child_by_field_name("body") {
        for name in &dropped {
            for use_node in plain_identifier_uses(body, source, name) {
                edits.push(Edit::replace(
                    Span::of(&use_node),
                    format!("self.{}", name),
                ));
            }
        }
    }
    if !ctx.options.preserve_unknown_markers {
        for deco in &test.decorators {
            if matches!(deco.kind, DecoKind::PytestMarkOther(_)) {
                edits.push(Edit::delete(Span::new(
                    line_start(source, deco.node.start_byte()),
                    line_end(source, deco.node.end_byte() - 1),
                )));
            }
        }
    }
    let text = rewrite_slice(source, span, &edits);
    ensure_newline(reindent(&text, 4))
}

/// Replace a def's parameter list with `(self, <kept params>)`
fn rebuild_params(def_node: Node, source: &str, dropped: &HashSet<&str>) -> Edit {
    let mut parts = vec!["self".to_string()];
    for param in params_of(def_node, source) {
        if param.name == "self" || dropped.contains(param.name.as_str()) {
            continue;
        }
        parts.push(node_text(param.node, source).to_string());
    }
    match def_node.child_by_field_name("parameters") {
        Some(params_node) => {
            Edit::replace(Span::of(&params_node), format!("({})", parts.join(", ")))
        }
        None => Edit::insert(def_node.start_byte(), String::new()),
    }
}

fn ensure_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::python::PythonParser;
    use crate::recognizer::recognize;
    use crate::TransformOptions;

    fn convert(source: &str) -> String {
        let tree = PythonParser::new().unwrap().parse(source).unwrap();
        let model = recognize(&tree, source);
        let options = TransformOptions::default();
        let ctx = RuleCtx {
            source,
            direction: Direction::FixtureToXunit,
            options: &options,
        };
        let candidate = FunctionsToClassRule.find(&model, &ctx).unwrap();
        match candidate.outcome {
            RuleOutcome::Replace(edits) => crate::edit::apply_edits(source, &edits),
            _ => panic!("expected replacement"),
        }
    }

    #[test]
    fn class_named_after_first_test() {
        let src = "def test_increment():\n    pass\n";
        let out = convert(src);
        assert!(out.starts_with("class TestIncrement(unittest.TestCase):\n"));
        assert!(out.contains("    def test_increment(self):\n"));
    }

    #[test]
    fn autouse_yield_fixture_becomes_setup() {
        let src = "import pytest\n\n\n@pytest.fixture(autouse=True)\ndef processor():\n    processor = TextProcessor()\n    yield processor\n\n\ndef test_slugify(processor):\n    assert processor.slugify('Hello World') == 'hello-world'\n";
        let out = convert(src);
        assert!(out.contains("    def setUp(self):\n        self.processor = TextProcessor()\n"));
        assert!(out.contains("    def test_slugify(self):\n"));
        assert!(out.contains("self.processor.slugify('Hello World')"));
        assert!(!out.contains("yield"));
    }

    #[test]
    fn post_yield_statements_become_teardown() {
        let src = "import pytest\n\n\n@pytest.fixture(autouse=True)\ndef conn():\n    conn = connect()\n    yield conn\n    conn.close()\n\n\ndef test_conn(conn):\n    assert conn.ok\n";
        let out = convert(src);
        assert!(out.contains("    def setUp(self):\n        self.conn = connect()\n"));
        assert!(out.contains("    def tearDown(self):\n        self.conn.close()\n"));
    }

    #[test]
    fn class_scoped_fixture_becomes_setupclass() {
        let src = "import pytest\n\n\n@pytest.fixture(scope=\"class\", autouse=True)\ndef db():\n    return make_db()\n\n\ndef test_db():\n    assert True\n";
        let out = convert(src);
        assert!(out.contains(
            "    @classmethod\n    def setUpClass(cls):\n        cls.db = make_db()\n"
        ));
    }

    #[test]
    fn dependency_chain_is_inlined_in_order() {
        let src = "import pytest\n\n\n@pytest.fixture\ndef base():\n    return 1\n\n\n@pytest.fixture(autouse=True)\ndef doubled(base):\n    return base * 2\n\n\ndef test_doubled():\n    assert True\n";
        let out = convert(src);
        let setup = out.find("def setUp(self):").unwrap();
        let base = out.find("base = 1").unwrap();
        let doubled = out.find("self.doubled = base * 2").unwrap();
        assert!(setup < base && base < doubled);
    }

    #[test]
    fn unconvertible_fixture_moves_with_self() {
        let src = "import pytest\n\n\n@pytest.fixture\ndef my_data():\n    return 42\n\n\ndef test_example(my_data):\n    assert my_data == 42\n";
        let out = convert(src);
        assert!(out.contains("    @pytest.fixture\n    def my_data(self):\n        return 42\n"));
        assert!(out.contains("    def test_example(self, my_data):\n"));
    }

    #[test]
    fn excluded_tests_stay_at_module_level() {
        let src = "def test_plain():\n    pass\n\n\n@with_setup(setup_func)\ndef test_nose():\n    assert True\n";
        let out = convert(src);
        assert!(out.contains("class TestPlain(unittest.TestCase):\n"));
        assert!(out.contains("\n@with_setup(setup_func)\ndef test_nose():\n    assert True\n"));
    }

    #[test]
    fn teardowns_run_in_reverse_acquisition_order() {
        let src = "import pytest\n\n\n@pytest.fixture(autouse=True)\ndef first():\n    first = acquire_first()\n    yield first\n    first.release()\n\n\n@pytest.fixture(autouse=True)\ndef second():\n    second = acquire_second()\n    yield second\n    second.release()\n\n\ndef test_pair():\n    assert True\n";
        let out = convert(src);
        let td = out.find("def tearDown(self):").unwrap();
        let second_rel = out.find("self.second.release()").unwrap();
        let first_rel = out.find("self.first.release()").unwrap();
        assert!(td < second_rel && second_rel < first_rel);
    }

    #[test]
    fn comments_above_tests_move_into_the_class() {
        let src = "# checks the happy path\ndef test_ok():\n    pass\n";
        let out = convert(src);
        assert!(out.contains("    # checks the happy path\n    def test_ok(self):\n"));
    }
}
