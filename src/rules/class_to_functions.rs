//! Class conversion for the xunit-to-fixture direction
//!
//! An eligible TestCase class becomes a module section: lifecycle methods
//! are lifted into autouse fixtures, test methods become free functions with
//! fixture parameters, helpers become free functions, and fixture methods
//! from an earlier reverse run become free fixtures again (their stale
//! annotation blocks removed). Runs only once assertions, raises, markers,
//! and subTest loops inside the class are already in target form.

use super::{snake_case, Candidate, RewriteRule, RuleCtx, RuleOutcome};
use crate::edit::{rewrite_slice, Edit, Span};
use crate::model::{
    ClassModel, DecoKind, LifecycleKind, Member, MemberKind, ModuleModel, SetupAttr,
};
use crate::parser::ast_helpers::{
    code_statements, leading_comment_start, line_end, line_start, node_text, params_of,
    receiver_attrs, reindent, statements_of, string_value,
};
use crate::recognizer::{lifecycle_is_simple, self_assert_calls};
use crate::Direction;
use tree_sitter::Node;

pub struct ClassToFunctionsRule;

impl RewriteRule for ClassToFunctionsRule {
    fn name(&self) -> &'static str {
        "class-to-functions"
    }

    fn direction(&self) -> Option<Direction> {
        Some(Direction::XunitToFixture)
    }

    fn is_conversion(&self) -> bool {
        true
    }

    fn find(&self, module: &ModuleModel, ctx: &RuleCtx) -> Option<Candidate> {
        for class in module.classes.iter().filter(|c| c.eligible) {
            // inner rewrites must be complete before the class moves
            if !self_assert_calls(class.class_node, ctx.source).is_empty() {
                continue;
            }
            let has_unittest_markers = class
                .decorators
                .iter()
                .chain(class.members.iter().flat_map(|m| m.decorators.iter()))
                .any(|d| {
                    matches!(
                        d.kind,
                        DecoKind::UnittestSkip
                            | DecoKind::UnittestSkipIf
                            | DecoKind::UnittestSkipUnless
                            | DecoKind::UnittestExpectedFailure
                    )
                });
            if has_unittest_markers {
                continue;
            }
            let section = render_section(class, ctx);
            return Some(Candidate {
                anchor: class.outer.start_byte(),
                outcome: RuleOutcome::Replace(vec![Edit::replace(
                    Span::of(&class.outer),
                    section,
                )]),
            });
        }
        None
    }
}

/// Where setUp state lives after conversion
#[derive(Debug, Clone, PartialEq)]
enum Strategy {
    /// One named autouse fixture per attribute, injected by name
    PerAttr,
    /// A single autouse fixture yielding a SimpleNamespace bundle
    Bundle,
    /// No attributes: a single anonymous autouse setup fixture
    Plain,
    /// No lifecycle at this level
    None,
}

struct Plan<'m, 't> {
    strategy: Strategy,
    attrs: &'m [SetupAttr<'t>],
    setup: Option<&'m Member<'t>>,
    teardown: Option<&'m Member<'t>>,
    env_name: String,
    fixture_prefix: String,
    scope_kwarg: &'static str,
    receiver: &'static str,
}

fn make_plan<'m, 't>(
    class: &'m ClassModel<'t>,
    ctx: &RuleCtx,
    class_level: bool,
) -> Plan<'m, 't> {
    let source = ctx.source;
    let snake = snake_case(&class.name);
    let (setup_kind, teardown_kind, attrs, receiver, scope_kwarg, env_name, fixture_prefix) =
        if class_level {
            (
                LifecycleKind::SetUpClass,
                LifecycleKind::TearDownClass,
                &class.class_attrs[..],
                "cls",
                "scope=\"module\", ",
                format!("{}_class_env", snake),
                format!("{}_class_setup", snake),
            )
        } else {
            (
                LifecycleKind::SetUp,
                LifecycleKind::TearDown,
                &class.setup_attrs[..],
                "self",
                "",
                format!("{}_env", snake),
                format!("{}_setup", snake),
            )
        };
    let setup = class.lifecycle(setup_kind);
    let teardown = class.lifecycle(teardown_kind);

    let strategy = if setup.is_none() && teardown.is_none() {
        Strategy::None
    } else if attrs.is_empty() {
        Strategy::Plain
    } else {
        let simple = setup
            .map(|m| lifecycle_is_simple(m.def_node, source, receiver))
            .unwrap_or(true);
        let teardown_ok = teardown
            .map(|m| teardown_splittable(m, attrs, source, receiver))
            .unwrap_or(true);
        if simple && attrs.len() <= ctx.options.autouse_inline_threshold && teardown_ok {
            Strategy::PerAttr
        } else {
            Strategy::Bundle
        }
    };
    Plan {
        strategy,
        attrs,
        setup,
        teardown,
        env_name,
        fixture_prefix,
        scope_kwarg,
        receiver,
    }
}

/// Each teardown statement must touch exactly one known attribute so it can
/// follow that attribute's fixture yield
fn teardown_splittable(
    teardown: &Member,
    attrs: &[SetupAttr],
    source: &str,
    receiver: &str,
) -> bool {
    let Some(body) = teardown.def_node.child_by_field_name("body") else {
        return false;
    };
    let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
    code_statements(body).iter().all(|stmt| {
        let mut touched: Vec<String> = Vec::new();
        for (attr, _) in receiver_attrs(*stmt, source, receiver) {
            if names.contains(&attr.as_str()) && !touched.contains(&attr) {
                touched.push(attr);
            }
        }
        touched.len() == 1
    })
}

fn render_section(class: &ClassModel, ctx: &RuleCtx) -> String {
    let source = ctx.source;
    let class_plan = make_plan(class, ctx, true);
    let test_plan = make_plan(class, ctx, false);

    // (text, attaches to the following piece)
    let mut pieces: Vec<(String, bool)> = Vec::new();

    if let Some(doc) = class_docstring(class, source) {
        pieces.push((doc, true));
    }
    if let Some(mark) = pytestmark_line(class, source) {
        pieces.push((mark, false));
    }
    for plan in [&class_plan, &test_plan] {
        for fixture in render_lifecycle_fixtures(plan, class, ctx) {
            pieces.push((fixture, false));
        }
    }

    let member_by_start: Vec<(usize, &Member)> = class
        .members
        .iter()
        .map(|m| (m.outer.start_byte(), m))
        .collect();

    let body_items = statements_of(class.body);
    for (index, item) in body_items.iter().enumerate() {
        if index == 0 && is_docstring(*item) {
            continue;
        }
        if item.kind() == "comment" {
            // leading comments travel with the member's slice, except for
            // lifecycle methods, whose slices are not re-rendered
            let owned_by_member = class.members.iter().any(|m| {
                let start = leading_comment_start(source, m.outer.start_byte());
                item.start_byte() >= start
                    && item.start_byte() < m.outer.start_byte()
                    && !matches!(m.kind, MemberKind::Lifecycle(_))
            });
            if !owned_by_member {
                pieces.push((reindent(node_text(*item, source), -4), true));
            }
            continue;
        }
        if let Some((_, member)) = member_by_start
            .iter()
            .find(|(start, _)| *start == item.start_byte())
        {
            match member.kind {
                MemberKind::Lifecycle(_) => continue,
                MemberKind::Test | MemberKind::Helper => {
                    pieces.push((
                        render_free_function(member, class, &test_plan, &class_plan, source),
                        false,
                    ));
                }
                MemberKind::FixtureMethod => {
                    pieces.push((render_free_fixture(member, source), false));
                }
                MemberKind::NestedClass => continue,
            }
        } else {
            // class-level statement (constants and the like)
            pieces.push((reindent(node_text(*item, source), -4), false));
        }
    }

    assemble(pieces)
}

fn is_docstring(node: Node) -> bool {
    node.kind() == "expression_statement"
        && node
            .named_child(0)
            .map(|n| n.kind() == "string")
            .unwrap_or(false)
}

fn class_docstring(class: &ClassModel, source: &str) -> Option<String> {
    let first = statements_of(class.body).into_iter().next()?;
    if !is_docstring(first) {
        return None;
    }
    let string_node = first.named_child(0)?;
    let text = string_value(string_node, source);
    let lines: Vec<String> = text
        .lines()
        .map(|l| {
            let l = l.trim();
            if l.is_empty() {
                "#".to_string()
            } else {
                format!("# {}", l)
            }
        })
        .collect();
    if lines.is_empty() {
        return None;
    }
    Some(lines.join("\n"))
}

fn pytestmark_line(class: &ClassModel, source: &str) -> Option<String> {
    let exprs: Vec<String> = class
        .decorators
        .iter()
        .map(|d| {
            node_text(d.node, source)
                .trim_start_matches('@')
                .to_string()
        })
        .collect();
    match exprs.len() {
        0 => None,
        1 => Some(format!("pytestmark = {}", exprs[0])),
        _ => Some(format!("pytestmark = [{}]", exprs.join(", "))),
    }
}

/// Autouse fixtures replacing the lifecycle methods of one level
fn render_lifecycle_fixtures(plan: &Plan, class: &ClassModel, ctx: &RuleCtx) -> Vec<String> {
    let source = ctx.source;
    match plan.strategy {
        Strategy::None => Vec::new(),
        Strategy::PerAttr => {
            let mut out = Vec::new();
            for attr in plan.attrs {
                out.push(render_attr_fixture(attr, plan, class, source));
            }
            out
        }
        Strategy::Bundle => vec![render_bundle_fixture(plan, class, source)],
        Strategy::Plain => vec![render_plain_fixture(plan, class, source)],
    }
}

/// `self.x = expr` becomes `@pytest.fixture(autouse=True) def x(deps): ...`
fn render_attr_fixture(attr: &SetupAttr, plan: &Plan, class: &ClassModel, source: &str) -> String {
    let attr_names: Vec<&str> = plan.attrs.iter().map(|a| a.name.as_str()).collect();

    // attributes referenced in the value become fixture parameters
    let mut deps: Vec<String> = Vec::new();
    let mut value_edits: Vec<Edit> = Vec::new();
    for (name, node) in receiver_attrs(attr.value, source, plan.receiver) {
        if attr_names.contains(&name.as_str()) {
            if !deps.contains(&name) {
                deps.push(name.clone());
            }
            value_edits.push(Edit::replace(Span::of(&node), name));
        } else if class.members.iter().any(|m| m.name == name) {
            value_edits.push(Edit::replace(Span::of(&node), name));
        }
    }
    let value_text = rewrite_slice(source, Span::of(&attr.value), &value_edits);

    let mut text = format!(
        "@pytest.fixture({}autouse=True)\ndef {}({}):\n    {} = {}\n    yield {}\n",
        plan.scope_kwarg,
        attr.name,
        deps.join(", "),
        attr.name,
        value_text,
        attr.name
    );

    if let Some(teardown) = plan.teardown {
        if let Some(body) = teardown.def_node.child_by_field_name("body") {
            for stmt in code_statements(body) {
                let touched: Vec<String> = receiver_attrs(stmt, source, plan.receiver)
                    .into_iter()
                    .map(|(n, _)| n)
                    .filter(|n| attr_names.contains(&n.as_str()))
                    .collect();
                if touched.first().map(|n| n == &attr.name).unwrap_or(false) {
                    let mut edits = Vec::new();
                    for (name, node) in receiver_attrs(stmt, source, plan.receiver) {
                        if attr_names.contains(&name.as_str())
                            || class.members.iter().any(|m| m.name == name)
                        {
                            edits.push(Edit::replace(Span::of(&node), name));
                        }
                    }
                    let stmt_span = Span::new(line_start(source, stmt.start_byte()), stmt.end_byte());
                    let rendered = rewrite_slice(source, stmt_span, &edits);
                    text.push_str(&reindent(rendered.trim_end(), -4));
                    text.push('\n');
                }
            }
        }
    }
    text
}

/// setUp/tearDown fold into one autouse fixture yielding a namespace bundle
fn render_bundle_fixture(plan: &Plan, class: &ClassModel, source: &str) -> String {
    let env = &plan.env_name;
    let mut text = format!(
        "@pytest.fixture({}autouse=True)\ndef {}():\n    {} = SimpleNamespace()\n",
        plan.scope_kwarg, env, env
    );
    if let Some(setup) = plan.setup {
        text.push_str(&method_body_at(setup, class, plan, source, 4, Some(env)));
    }
    text.push_str(&format!("    yield {}\n", env));
    if let Some(teardown) = plan.teardown {
        text.push_str(&method_body_at(teardown, class, plan, source, 4, Some(env)));
    }
    text
}

/// Lifecycle bodies with no instance state become a single setup fixture
fn render_plain_fixture(plan: &Plan, class: &ClassModel, source: &str) -> String {
    let mut text = format!(
        "@pytest.fixture({}autouse=True)\ndef {}():\n",
        plan.scope_kwarg, plan.fixture_prefix
    );
    if let Some(setup) = plan.setup {
        text.push_str(&method_body_at(setup, class, plan, source, 4, None));
    }
    text.push_str("    yield\n");
    if let Some(teardown) = plan.teardown {
        text.push_str(&method_body_at(teardown, class, plan, source, 4, None));
    }
    text
}

/// A lifecycle method body re-indented to fixture depth, with attribute and
/// helper references rebound
fn method_body_at(
    member: &Member,
    class: &ClassModel,
    plan: &Plan,
    source: &str,
    indent: usize,
    env: Option<&str>,
) -> String {
    let Some(body) = member.def_node.child_by_field_name("body") else {
        return String::new();
    };
    let attr_names: Vec<&str> = plan.attrs.iter().map(|a| a.name.as_str()).collect();
    let mut edits: Vec<Edit> = Vec::new();
    for (name, node) in receiver_attrs(body, source, plan.receiver) {
        if attr_names.contains(&name.as_str()) {
            let replacement = match env {
                Some(env) => format!("{}.{}", env, name),
                None => name.clone(),
            };
            edits.push(Edit::replace(Span::of(&node), replacement));
        } else if class.members.iter().any(|m| m.name == name) {
            edits.push(Edit::replace(Span::of(&node), name));
        }
    }
    let span = Span::new(line_start(source, body.start_byte()), body.end_byte());
    let text = rewrite_slice(source, span, &edits);
    let delta = indent as isize - 8;
    let out = reindent(text.trim_end_matches('\n'), delta);
    if out.trim().is_empty() {
        String::new()
    } else {
        format!("{}\n", out.trim_end())
    }
}

/// A test or helper method becomes a free function
fn render_free_function(
    member: &Member,
    class: &ClassModel,
    test_plan: &Plan,
    class_plan: &Plan,
    source: &str,
) -> String {
    let span = Span::new(
        leading_comment_start(source, member.outer.start_byte()),
        member.outer.end_byte(),
    );
    let mut edits: Vec<Edit> = Vec::new();
    let mut injected: Vec<String> = Vec::new();

    if let Some(body) = member.def_node.child_by_field_name("body") {
        // instance access reaches both per-test and per-class state
        for receiver in ["self", "cls"] {
            for (name, node) in receiver_attrs(body, source, receiver) {
                let plan = if receiver == "self"
                    && test_plan.attrs.iter().any(|a| a.name == name)
                {
                    test_plan
                } else if class_plan.attrs.iter().any(|a| a.name == name) {
                    class_plan
                } else if class.members.iter().any(|m| m.name == name) {
                    edits.push(Edit::replace(Span::of(&node), name));
                    continue;
                } else {
                    continue;
                };
                match plan.strategy {
                    Strategy::PerAttr => {
                        if !injected.contains(&name) {
                            injected.push(name.clone());
                        }
                        edits.push(Edit::replace(Span::of(&node), name));
                    }
                    Strategy::Bundle => {
                        if !injected.contains(&plan.env_name) {
                            injected.push(plan.env_name.clone());
                        }
                        edits.push(Edit::replace(
                            Span::of(&node),
                            format!("{}.{}", plan.env_name, name),
                        ));
                    }
                    _ => {}
                }
            }
        }
    }

    // drop the staticmethod decorator along with its line
    for deco in &member.decorators {
        if matches!(deco.kind, DecoKind::StaticMethod) {
            edits.push(Edit::delete(Span::new(
                line_start(source, deco.node.start_byte()),
                line_end(source, deco.node.end_byte() - 1),
            )));
        }
    }

    edits.push(rebuild_free_params(member, source, &injected));
    let text = rewrite_slice(source, span, &edits);
    ensure_newline(reindent(&text, -4))
}

/// A fixture method moves back to module level; stale annotation blocks on it
/// are dropped so a clean round trip does not re-accumulate TODOs
fn render_free_fixture(member: &Member, source: &str) -> String {
    let comment_start = leading_comment_start(source, member.outer.start_byte());
    let comment_slice = &source[comment_start..line_start(source, member.outer.start_byte())];
    let kept_comments: Vec<&str> = comment_slice
        .lines()
        .filter(|line| {
            let t = line.trim_start();
            !(t.starts_with("# HAMLET-TODO [")
                || t.starts_with("# Original:")
                || t.starts_with("# Manual action required:"))
        })
        .collect();

    let span = Span::new(member.outer.start_byte(), member.outer.end_byte());
    let edits = vec![rebuild_free_params(member, source, &[])];
    let def_text = rewrite_slice(source, span, &edits);

    let mut text = String::new();
    for line in kept_comments {
        text.push_str(&reindent(line, -4));
        text.push('\n');
    }
    text.push_str(&reindent(&def_text, -4));
    ensure_newline(text)
}

/// Parameter list without `self`, with injected fixture names appended
fn rebuild_free_params(member: &Member, source: &str, injected: &[String]) -> Edit {
    let mut parts: Vec<String> = Vec::new();
    for param in params_of(member.def_node, source) {
        if param.name == "self" {
            continue;
        }
        parts.push(node_text(param.node, source).to_string());
    }
    for name in injected {
        if !parts.iter().any(|p| p == name || p.starts_with(&format!("{}=", name))) {
            parts.push(name.clone());
        }
    }
    match member.def_node.child_by_field_name("parameters") {
        Some(params_node) => {
            Edit::replace(Span::of(&params_node), format!("({})", parts.join(", ")))
        }
        None => Edit::insert(member.def_node.start_byte(), String::new()),
    }
}

fn ensure_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Join section pieces: comments attach to what follows; definitions are
/// separated by two blank lines. No trailing newline: the replacement slots
/// into the class node's span, whose own trailing newline survives outside.
fn assemble(pieces: Vec<(String, bool)>) -> String {
    let mut out = String::new();
    for (index, (text, attaches)) in pieces.iter().enumerate() {
        out.push_str(text.trim_end_matches('\n'));
        if index + 1 < pieces.len() {
            out.push('\n');
            if !attaches {
                out.push_str("\n\n");
            }
        }
    }
    out
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
            direction: Direction::XunitToFixture,
            options: &options,
        };
        let candidate = ClassToFunctionsRule.find(&model, &ctx).expect("candidate");
        match candidate.outcome {
            RuleOutcome::Replace(edits) => crate::edit::apply_edits(source, &edits),
            _ => panic!("expected replacement"),
        }
    }

    #[test]
    fn setup_attribute_becomes_named_fixture() {
        let src = "import unittest\n\nclass TestTextProcessor(unittest.TestCase):\n    def setUp(self):\n        self.processor = TextProcessor()\n\n    def test_slugify(self):\n        assert self.processor.slugify('Hello World') == 'hello-world'\n";
        let out = convert(src);
        assert!(out.contains(
            "@pytest.fixture(autouse=True)\ndef processor():\n    processor = TextProcessor()\n    yield processor\n"
        ));
        assert!(out.contains("def test_slugify(processor):\n"));
        assert!(out.contains("assert processor.slugify('Hello World') == 'hello-world'\n"));
        assert!(!out.contains("class TestTextProcessor"));
    }

    #[test]
    fn teardown_statements_follow_their_attribute_yield() {
        let src = "import unittest\n\nclass TestProc(unittest.TestCase):\n    def setUp(self):\n        self.processor = TextProcessor()\n\n    def tearDown(self):\n        self.processor = None\n\n    def test_x(self):\n        assert self.processor is not None\n";
        let out = convert(src);
        assert!(out.contains(
            "def processor():\n    processor = TextProcessor()\n    yield processor\n    processor = None\n"
        ));
    }

    #[test]
    fn attribute_dependencies_become_fixture_parameters() {
        let src = "import unittest\n\nclass TestSvc(unittest.TestCase):\n    def setUp(self):\n        self.client = Client()\n        self.service = Service(self.client)\n\n    def test_x(self):\n        assert self.service.ok\n";
        let out = convert(src);
        assert!(out.contains("def client():\n    client = Client()\n    yield client\n"));
        assert!(out.contains("def service(client):\n    service = Service(client)\n    yield service\n"));
        assert!(out.contains("def test_x(service):\n"));
    }

    #[test]
    fn many_attributes_fall_back_to_bundle() {
        let src = "import unittest\n\nclass TestBig(unittest.TestCase):\n    def setUp(self):\n        self.a = 1\n        self.b = 2\n        self.c = 3\n        self.d = 4\n\n    def test_sum(self):\n        assert self.a + self.b + self.c + self.d == 10\n";
        let out = convert(src);
        assert!(out.contains("def big_env():\n    big_env = SimpleNamespace()\n"));
        assert!(out.contains("    big_env.a = 1\n"));
        assert!(out.contains("    yield big_env\n"));
        assert!(out.contains("def test_sum(big_env):\n"));
        assert!(out.contains("big_env.a + big_env.b + big_env.c + big_env.d == 10"));
    }

    #[test]
    fn plain_setup_without_attributes() {
        let src = "import unittest\n\nclass TestEnv(unittest.TestCase):\n    def setUp(self):\n        configure_logging()\n\n    def test_x(self):\n        assert True\n";
        let out = convert(src);
        assert!(out.contains(
            "@pytest.fixture(autouse=True)\ndef env_setup():\n    configure_logging()\n    yield\n"
        ));
        assert!(out.contains("def test_x():\n"));
    }

    #[test]
    fn setupclass_gets_module_scope() {
        let src = "import unittest\n\nclass TestDb(unittest.TestCase):\n    @classmethod\n    def setUpClass(cls):\n        cls.db = make_db()\n\n    def test_db(self):\n        assert self.db is not None\n";
        let out = convert(src);
        assert!(out.contains(
            "@pytest.fixture(scope=\"module\", autouse=True)\ndef db():\n    db = make_db()\n    yield db\n"
        ));
        assert!(out.contains("def test_db(db):\n"));
        assert!(out.contains("assert db is not None"));
    }

    #[test]
    fn helper_methods_become_free_functions() {
        let src = "import unittest\n\nclass TestH(unittest.TestCase):\n    def make_widget(self):\n        return Widget()\n\n    def test_widget(self):\n        w = self.make_widget()\n        assert w is not None\n";
        let out = convert(src);
        assert!(out.contains("def make_widget():\n    return Widget()\n"));
        assert!(out.contains("w = make_widget()"));
    }

    #[test]
    fn fixture_methods_return_to_module_level_without_todos() {
        let src = "import unittest\n\nclass TestExample(unittest.TestCase):\n    # HAMLET-TODO [UNCONVERTIBLE-FIXTURE]: pytest fixture without autouse=True has no direct unittest equivalent\n    # Original: @pytest.fixture\n    # Manual action required: Manually convert this fixture to setUp/tearDown or pass the value directly\n    @pytest.fixture\n    def my_data(self):\n        return 42\n\n    def test_example(self, my_data):\n        assert my_data == 42\n";
        let out = convert(src);
        assert!(!out.contains("HAMLET-TODO"));
        assert!(out.contains("@pytest.fixture\ndef my_data():\n    return 42\n"));
        assert!(out.contains("def test_example(my_data):\n"));
    }

    #[test]
    fn class_markers_become_pytestmark() {
        let src = "import unittest\n\n@pytest.mark.slow\nclass TestSlow(unittest.TestCase):\n    def test_x(self):\n        assert True\n";
        let out = convert(src);
        assert!(out.contains("pytestmark = pytest.mark.slow\n"));
        assert!(out.contains("def test_x():\n"));
    }

    #[test]
    fn comments_between_members_survive() {
        let src = "import unittest\n\nclass TestC(unittest.TestCase):\n    # boundary cases below\n    def test_a(self):\n        assert True\n";
        let out = convert(src);
        assert!(out.contains("# boundary cases below\ndef test_a():\n"));
    }

    #[test]
    fn docstring_is_kept_as_comment() {
        let src = "import unittest\n\nclass TestDoc(unittest.TestCase):\n    \"\"\"Checks the slug generator.\"\"\"\n\n    def test_x(self):\n        assert True\n";
        let out = convert(src);
        assert!(out.contains("# Checks the slug generator.\n"));
    }
}
