//! Recogniser: structural pattern-matching of test constructs
//!
//! Recognition is purely structural, driven by syntactic form and a small
//! closed set of known names. It never fails; anything unmatched is left
//! unannotated and transported verbatim by the driver.

use crate::annotate::has_any_annotation;
use crate::model::{
    ClassModel, DecoKind, DecoratorInfo, FixtureDef, FixtureScope, FixtureShape, FreeTest, Import,
    LifecycleKind, Member, MemberKind, ModuleModel, SetupAttr,
};
use crate::parser::ast_helpers::{
    code_statements, decorator_parts, dotted_name, has_disruptive_multiline_string, node_text,
    params_of, receiver_attrs, statements_of, string_value, walk_named, walk_no_nested_defs,
};
use tree_sitter::{Node, Tree};

/// unittest assertion methods the engine can translate
pub const KNOWN_ASSERT_METHODS: &[&str] = &[
    "assertEqual",
    "assertNotEqual",
    "assertTrue",
    "assertFalse",
    "assertGreater",
    "assertGreaterEqual",
    "assertLess",
    "assertLessEqual",
    "assertIn",
    "assertNotIn",
    "assertIsNone",
    "assertIsNotNone",
    "assertRaises",
    "assertRaisesRegex",
];

/// pytest framework fixtures with no local definition
pub const FRAMEWORK_FIXTURES: &[&str] = &[
    "monkeypatch",
    "capsys",
    "capfd",
    "tmp_path",
    "tmp_path_factory",
];

/// Build the Test-IR for a module
pub fn recognize<'t>(tree: &'t Tree, source: &str) -> ModuleModel<'t> {
    let root = tree.root_node();
    let mut model = ModuleModel {
        root,
        imports: Vec::new(),
        classes: Vec::new(),
        tests: Vec::new(),
        fixtures: Vec::new(),
    };

    let mut cursor = root.walk();
    let items: Vec<Node> = root.named_children(&mut cursor).collect();
    for item in items {
        match item.kind() {
            "import_statement" | "import_from_statement" => {
                if let Some(import) = recognize_import(item, source) {
                    model.imports.push(import);
                }
            }
            "decorated_definition" => {
                let Some(def) = item.child_by_field_name("definition") else {
                    continue;
                };
                match def.kind() {
                    "function_definition" => {
                        recognize_free_function(item, def, source, &mut model);
                    }
                    "class_definition" => {
                        if let Some(class) = recognize_class(item, def, source) {
                            model.classes.push(class);
                        }
                    }
                    _ => {}
                }
            }
            "function_definition" => {
                recognize_free_function(item, item, source, &mut model);
            }
            "class_definition" => {
                if let Some(class) = recognize_class(item, item, source) {
                    model.classes.push(class);
                }
            }
            _ => {}
        }
    }
    model
}

fn recognize_import<'t>(node: Node<'t>, source: &str) -> Option<Import<'t>> {
    let module = match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            let first = node.named_children(&mut cursor).next()?;
            match first.kind() {
                "dotted_name" => node_text(first, source).to_string(),
                "aliased_import" => {
                    let name = first.child_by_field_name("name")?;
                    node_text(name, source).to_string()
                }
                _ => return None,
            }
        }
        "import_from_statement" => {
            let module = node.child_by_field_name("module_name")?;
            node_text(module, source).to_string()
        }
        _ => return None,
    };
    let is_nose = module == "nose" || module.starts_with("nose.") || module == "nose2"
        || module.starts_with("nose2.");
    Some(Import {
        node,
        annotated: has_any_annotation(source, node.start_byte()),
        module,
        is_nose,
    })
}

/// Classify a single decorator node
pub fn classify_decorator<'t>(node: Node<'t>, source: &str) -> DecoratorInfo<'t> {
    let kind = match decorator_parts(node, source) {
        Some((name, call)) => match name.as_str() {
            "pytest.fixture" | "fixture" => {
                let mut scope = FixtureScope::Function;
                let mut autouse = false;
                let mut parametrized = false;
                if let Some(parts) = &call {
                    for (kw, value) in &parts.kwargs {
                        match kw.as_str() {
                            "scope" => {
                                scope = FixtureScope::from_keyword(string_value(*value, source));
                            }
                            "autouse" => {
                                autouse = node_text(*value, source) == "True";
                            }
                            "params" => parametrized = true,
                            _ => {}
                        }
                    }
                }
                DecoKind::PytestFixture {
                    scope,
                    autouse,
                    parametrized,
                }
            }
            "pytest.mark.parametrize" | "mark.parametrize" | "parametrize" => {
                DecoKind::PytestParametrize
            }
            "pytest.mark.skip" | "mark.skip" => DecoKind::PytestMarkSkip,
            "pytest.mark.skipif" | "mark.skipif" => DecoKind::PytestMarkSkipif,
            "pytest.mark.xfail" | "mark.xfail" => DecoKind::PytestMarkXfail,
            "unittest.skip" | "skip" => DecoKind::UnittestSkip,
            "unittest.skipIf" | "skipIf" => DecoKind::UnittestSkipIf,
            "unittest.skipUnless" | "skipUnless" => DecoKind::UnittestSkipUnless,
            "unittest.expectedFailure" | "expectedFailure" => DecoKind::UnittestExpectedFailure,
            "classmethod" => DecoKind::ClassMethod,
            "staticmethod" => DecoKind::StaticMethod,
            "with_setup" | "with_teardown" => DecoKind::Nose,
            other if other.starts_with("pytest.mark.") || other.starts_with("mark.") => {
                let marker = other.rsplit('.').next().unwrap_or(other).to_string();
                DecoKind::PytestMarkOther(marker)
            }
            other if other.starts_with("nose.") || other.starts_with("nose2.") => DecoKind::Nose,
            _ => DecoKind::Unknown,
        },
        None => DecoKind::Unknown,
    };
    DecoratorInfo { node, kind }
}

fn decorators_of<'t>(outer: Node<'t>, source: &str) -> Vec<DecoratorInfo<'t>> {
    if outer.kind() != "decorated_definition" {
        return Vec::new();
    }
    let mut cursor = outer.walk();
    outer
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "decorator")
        .map(|n| classify_decorator(n, source))
        .collect()
}

fn recognize_free_function<'t>(
    outer: Node<'t>,
    def_node: Node<'t>,
    source: &str,
    model: &mut ModuleModel<'t>,
) {
    let Some(name_node) = def_node.child_by_field_name("name") else {
        return;
    };
    let name = node_text(name_node, source).to_string();
    let decorators = decorators_of(outer, source);
    let annotated = has_any_annotation(source, outer.start_byte());

    let fixture_deco = decorators.iter().find_map(|d| match d.kind {
        DecoKind::PytestFixture {
            scope,
            autouse,
            parametrized,
        } => Some((scope, autouse, parametrized)),
        _ => None,
    });

    if let Some((scope, autouse, parametrized)) = fixture_deco {
        let (shape, shape_ok) = fixture_shape(def_node);
        let deps = params_of(def_node, source)
            .into_iter()
            .map(|p| p.name)
            .filter(|n| n != "request" && n != "self")
            .collect();
        model.fixtures.push(FixtureDef {
            outer,
            def_node,
            name,
            scope,
            autouse,
            parametrized,
            shape,
            deps,
            decorators,
            annotated,
            shape_ok,
        });
        return;
    }

    if name.starts_with("test_") {
        let excluded = decorators
            .iter()
            .any(|d| matches!(d.kind, DecoKind::Unknown | DecoKind::Nose))
            || has_disruptive_multiline_string(outer, source);
        let params = params_of(def_node, source)
            .into_iter()
            .map(|p| p.name)
            .collect();
        model.tests.push(FreeTest {
            outer,
            def_node,
            name,
            params,
            decorators,
            excluded,
            annotated,
        });
    }
}

/// Yield/return shape of a fixture body, plus whether the shape is simple
/// enough to inline (a single trailing statement-level return/yield)
fn fixture_shape(def_node: Node) -> (FixtureShape, bool) {
    let Some(body) = def_node.child_by_field_name("body") else {
        return (FixtureShape::Return, false);
    };
    let mut yields = Vec::new();
    let mut returns = Vec::new();
    walk_no_nested_defs(body, &mut |n| match n.kind() {
        "yield" => yields.push(n),
        "return_statement" => returns.push(n),
        _ => {}
    });

    if !yields.is_empty() {
        let ok = yields.len() == 1 && {
            let y = yields[0];
            y.parent()
                .map(|p| p.kind() == "expression_statement" && p.parent() == Some(body))
                .unwrap_or(false)
        };
        return (FixtureShape::Yield, ok);
    }
    let ok = match returns.len() {
        0 => true,
        1 => {
            let r = returns[0];
            r.parent() == Some(body)
                && code_statements(body).last().copied() == Some(r)
        }
        _ => false,
    };
    (FixtureShape::Return, ok)
}

fn recognize_class<'t>(
    outer: Node<'t>,
    class_node: Node<'t>,
    source: &str,
) -> Option<ClassModel<'t>> {
    let name_node = class_node.child_by_field_name("name")?;
    let name = node_text(name_node, source).to_string();

    let mut bases = Vec::new();
    if let Some(superclasses) = class_node.child_by_field_name("superclasses") {
        let mut cursor = superclasses.walk();
        for base in superclasses.named_children(&mut cursor) {
            if let Some(dotted) = dotted_name(base, source) {
                bases.push(dotted);
            } else {
                bases.push(node_text(base, source).to_string());
            }
        }
    }
    let is_testcase = bases
        .iter()
        .any(|b| b == "TestCase" || b.ends_with(".TestCase"));
    if !name.starts_with("Test") && !is_testcase {
        return None;
    }

    let body = class_node.child_by_field_name("body")?;
    let decorators = decorators_of(outer, source);

    let mut members = Vec::new();
    for item in statements_of(body) {
        let (member_outer, def) = if item.kind() == "decorated_definition" {
            match item.child_by_field_name("definition") {
                Some(d) => (item, d),
                None => continue,
            }
        } else {
            (item, item)
        };
        match def.kind() {
            "function_definition" => {
                let Some(n) = def.child_by_field_name("name") else {
                    continue;
                };
                let member_name = node_text(n, source).to_string();
                let member_decos = decorators_of(member_outer, source);
                let is_fixture = member_decos
                    .iter()
                    .any(|d| matches!(d.kind, DecoKind::PytestFixture { .. }));
                let kind = if let Some(lk) = LifecycleKind::from_name(&member_name) {
                    MemberKind::Lifecycle(lk)
                } else if is_fixture {
                    MemberKind::FixtureMethod
                } else if member_name.starts_with("test_") {
                    MemberKind::Test
                } else {
                    MemberKind::Helper
                };
                let params = params_of(def, source).into_iter().map(|p| p.name).collect();
                members.push(Member {
                    outer: member_outer,
                    def_node: def,
                    name: member_name,
                    kind,
                    decorators: member_decos,
                    params,
                });
            }
            "class_definition" => {
                let nested_name = def
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source).to_string())
                    .unwrap_or_default();
                members.push(Member {
                    outer: member_outer,
                    def_node: def,
                    name: nested_name,
                    kind: MemberKind::NestedClass,
                    decorators: Vec::new(),
                    params: Vec::new(),
                });
            }
            _ => {}
        }
    }

    let setup_attrs = members
        .iter()
        .find(|m| m.kind == MemberKind::Lifecycle(LifecycleKind::SetUp))
        .map(|m| lifecycle_attrs(m.def_node, source, "self"))
        .unwrap_or_default();
    let class_attrs = members
        .iter()
        .find(|m| m.kind == MemberKind::Lifecycle(LifecycleKind::SetUpClass))
        .map(|m| lifecycle_attrs(m.def_node, source, "cls"))
        .unwrap_or_default();
    let setup_simple = members
        .iter()
        .find(|m| m.kind == MemberKind::Lifecycle(LifecycleKind::SetUp))
        .map(|m| lifecycle_is_simple(m.def_node, source, "self"))
        .unwrap_or(true);

    let mut class = ClassModel {
        outer,
        class_node,
        name,
        bases,
        decorators,
        body,
        members,
        is_testcase,
        eligible: false,
        setup_attrs,
        class_attrs,
        setup_simple,
    };
    class.eligible = compute_eligibility(&class, source);
    Some(class)
}

/// `receiver.x = expr` assignments at the top level of a lifecycle body
fn lifecycle_attrs<'t>(def_node: Node<'t>, source: &str, receiver: &str) -> Vec<SetupAttr<'t>> {
    let Some(body) = def_node.child_by_field_name("body") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for stmt in code_statements(body) {
        if let Some((name, value)) = simple_attr_assignment(stmt, source, receiver) {
            out.push(SetupAttr {
                name,
                value,
                stmt,
            });
        }
    }
    out
}

/// True when every statement in the body is a `receiver.x = expr` assignment
pub fn lifecycle_is_simple(def_node: Node, source: &str, receiver: &str) -> bool {
    let Some(body) = def_node.child_by_field_name("body") else {
        return false;
    };
    code_statements(body)
        .iter()
        .all(|stmt| simple_attr_assignment(*stmt, source, receiver).is_some())
}

fn simple_attr_assignment<'t>(
    stmt: Node<'t>,
    source: &str,
    receiver: &str,
) -> Option<(String, Node<'t>)> {
    if stmt.kind() != "expression_statement" {
        return None;
    }
    let assign = stmt.named_child(0)?;
    if assign.kind() != "assignment" {
        return None;
    }
    let left = assign.child_by_field_name("left")?;
    let right = assign.child_by_field_name("right")?;
    if left.kind() != "attribute" {
        return None;
    }
    let object = left.child_by_field_name("object")?;
    if object.kind() != "identifier" || node_text(object, source) != receiver {
        return None;
    }
    let attr = left.child_by_field_name("attribute")?;
    Some((node_text(attr, source).to_string(), right))
}

/// `self.assertX(...)` calls anywhere below `scope`: (method name, call node)
pub fn self_assert_calls<'t>(scope: Node<'t>, source: &str) -> Vec<(String, Node<'t>)> {
    let mut out = Vec::new();
    walk_named(scope, &mut |n| {
        if n.kind() != "call" {
            return;
        }
        let Some(func) = n.child_by_field_name("function") else {
            return;
        };
        if func.kind() != "attribute" {
            return;
        }
        let Some(object) = func.child_by_field_name("object") else {
            return;
        };
        if object.kind() != "identifier" || node_text(object, source) != "self" {
            return;
        }
        let Some(attr) = func.child_by_field_name("attribute") else {
            return;
        };
        let method = node_text(attr, source);
        if method.starts_with("assert") {
            out.push((method.to_string(), n));
        }
    });
    out
}

/// Matched convertible subTest loop inside a test method
#[derive(Debug, Clone)]
pub struct SubtestPattern<'t> {
    pub for_node: Node<'t>,
    pub target_names: Vec<String>,
    pub iter_node: Node<'t>,
    pub assert_stmt: Node<'t>,
    /// Assertion is already a plain `assert` statement
    pub assert_is_plain: bool,
}

/// Match a test method body of exactly
/// `for <targets> in <iter>: with self.subTest(...): <single assertion>`
pub fn subtest_pattern<'t>(def_node: Node<'t>, source: &str) -> Option<SubtestPattern<'t>> {
    let body = def_node.child_by_field_name("body")?;
    let stmts = code_statements(body);
    if stmts.len() != 1 || stmts[0].kind() != "for_statement" {
        return None;
    }
    let for_node = stmts[0];
    let left = for_node.child_by_field_name("left")?;
    let target_names = match left.kind() {
        "identifier" => vec![node_text(left, source).to_string()],
        "pattern_list" | "tuple_pattern" => {
            let mut cursor = left.walk();
            let names: Vec<String> = left
                .named_children(&mut cursor)
                .map(|n| {
                    if n.kind() == "identifier" {
                        Some(node_text(n, source).to_string())
                    } else {
                        None
                    }
                })
                .collect::<Option<Vec<_>>>()?;
            names
        }
        _ => return None,
    };
    let iter_node = for_node.child_by_field_name("right")?;

    let for_body = for_node.child_by_field_name("body")?;
    let for_stmts = code_statements(for_body);
    if for_stmts.len() != 1 || for_stmts[0].kind() != "with_statement" {
        return None;
    }
    let with_node = for_stmts[0];
    if !with_is_subtest(with_node, source) {
        return None;
    }
    let with_body = with_node.child_by_field_name("body")?;
    let with_stmts = code_statements(with_body);
    if with_stmts.len() != 1 {
        return None;
    }
    let assert_stmt = with_stmts[0];
    let assert_is_plain = assert_stmt.kind() == "assert_statement";
    let is_self_assert = assert_stmt.kind() == "expression_statement"
        && !self_assert_calls(assert_stmt, source).is_empty();
    if !assert_is_plain && !is_self_assert {
        return None;
    }
    Some(SubtestPattern {
        for_node,
        target_names,
        iter_node,
        assert_stmt,
        assert_is_plain,
    })
}

fn with_is_subtest(with_node: Node, source: &str) -> bool {
    with_items(with_node)
        .first()
        .map(|(value, _)| {
            if value.kind() != "call" {
                return false;
            }
            value
                .child_by_field_name("function")
                .and_then(|f| dotted_name(f, source))
                .map(|n| n == "self.subTest")
                .unwrap_or(false)
        })
        .unwrap_or(false)
}

/// (context expression, optional `as` alias) for each item of a with
/// statement's own clause (nested withs are not visited)
pub fn with_items<'t>(with_node: Node<'t>) -> Vec<(Node<'t>, Option<Node<'t>>)> {
    let mut out = Vec::new();
    let mut cursor = with_node.walk();
    let clauses: Vec<Node> = with_node
        .children(&mut cursor)
        .filter(|n| n.kind() == "with_clause")
        .collect();
    for clause in clauses {
        let mut c2 = clause.walk();
        for item in clause.named_children(&mut c2) {
            if item.kind() != "with_item" {
                continue;
            }
            let Some(value) = item.child_by_field_name("value") else {
                continue;
            };
            if value.kind() == "as_pattern" {
                let expr = value.named_child(0);
                let alias = value
                    .child_by_field_name("alias")
                    .and_then(|a| a.named_child(0).or(Some(a)));
                if let Some(expr) = expr {
                    out.push((expr, alias));
                }
            } else {
                out.push((value, None));
            }
        }
    }
    out
}

fn compute_eligibility(class: &ClassModel, source: &str) -> bool {
    if !class.is_testcase || class.bases.len() != 1 {
        return false;
    }
    if has_disruptive_multiline_string(class.body, source) {
        return false;
    }
    for deco in &class.decorators {
        match deco.kind {
            DecoKind::UnittestSkip
            | DecoKind::UnittestSkipIf
            | DecoKind::UnittestSkipUnless
            | DecoKind::UnittestExpectedFailure
            | DecoKind::PytestMarkSkip
            | DecoKind::PytestMarkSkipif
            | DecoKind::PytestMarkXfail
            | DecoKind::PytestMarkOther(_) => {}
            _ => return false,
        }
    }

    // one of each lifecycle kind at most
    for kind in [
        LifecycleKind::SetUp,
        LifecycleKind::TearDown,
        LifecycleKind::SetUpClass,
        LifecycleKind::TearDownClass,
    ] {
        let count = class
            .members
            .iter()
            .filter(|m| m.kind == MemberKind::Lifecycle(kind))
            .count();
        if count > 1 {
            return false;
        }
    }

    let method_names: Vec<&str> = class.members.iter().map(|m| m.name.as_str()).collect();
    let attr_names: Vec<&str> = class.setup_attrs.iter().map(|a| a.name.as_str()).collect();
    let class_attr_names: Vec<&str> = class.class_attrs.iter().map(|a| a.name.as_str()).collect();

    for member in &class.members {
        match member.kind {
            MemberKind::NestedClass => return false,
            _ => {}
        }
        if member.name == "__init__" || member.name == "__new__" {
            return false;
        }
        if !member_decorators_allowed(member) {
            return false;
        }
        if !member_params_allowed(member) {
            return false;
        }

        // every self./cls. reference must resolve to something we can rename
        for (attr, node) in receiver_attrs(member.def_node, source, "self") {
            let in_call_position = node
                .parent()
                .map(|p| p.kind() == "call" && p.child_by_field_name("function") == Some(node))
                .unwrap_or(false);
            let allowed = match member.kind {
                MemberKind::Test | MemberKind::Lifecycle(_) => {
                    attr_names.contains(&attr.as_str())
                        || class_attr_names.contains(&attr.as_str())
                        || (in_call_position
                            && (method_names.contains(&attr.as_str())
                                || KNOWN_ASSERT_METHODS.contains(&attr.as_str())
                                || attr == "subTest"))
                }
                MemberKind::Helper => {
                    in_call_position && method_names.contains(&attr.as_str())
                }
                MemberKind::FixtureMethod => false,
                MemberKind::NestedClass => false,
            };
            if !allowed {
                return false;
            }
        }
        for (attr, node) in receiver_attrs(member.def_node, source, "cls") {
            let in_call_position = node
                .parent()
                .map(|p| p.kind() == "call" && p.child_by_field_name("function") == Some(node))
                .unwrap_or(false);
            let is_assignment_target = node
                .parent()
                .map(|p| p.kind() == "assignment" && p.child_by_field_name("left") == Some(node))
                .unwrap_or(false);
            let allowed = class_attr_names.contains(&attr.as_str())
                || is_assignment_target
                || (in_call_position && method_names.contains(&attr.as_str()));
            if !allowed {
                return false;
            }
        }

        // self.assertX must be a known method, well-formed, in a rewritable position
        for (method, call) in self_assert_calls(member.def_node, source) {
            if !KNOWN_ASSERT_METHODS.contains(&method.as_str()) {
                return false;
            }
            if !assert_call_position_ok(call) || !assert_arity_ok(&method, call, source) {
                return false;
            }
        }

        // subTest only in the convertible shape
        if member.kind == MemberKind::Test {
            let uses_subtest = receiver_attrs(member.def_node, source, "self")
                .iter()
                .any(|(a, _)| a == "subTest");
            if uses_subtest && subtest_pattern(member.def_node, source).is_none() {
                return false;
            }
        }
    }
    true
}

fn member_decorators_allowed(member: &Member) -> bool {
    member.decorators.iter().all(|d| match (&member.kind, &d.kind) {
        (MemberKind::Test, DecoKind::UnittestSkip)
        | (MemberKind::Test, DecoKind::UnittestSkipIf)
        | (MemberKind::Test, DecoKind::UnittestSkipUnless)
        | (MemberKind::Test, DecoKind::UnittestExpectedFailure)
        | (MemberKind::Test, DecoKind::PytestMarkSkip)
        | (MemberKind::Test, DecoKind::PytestMarkSkipif)
        | (MemberKind::Test, DecoKind::PytestMarkXfail)
        | (MemberKind::Test, DecoKind::PytestMarkOther(_))
        | (MemberKind::Test, DecoKind::PytestParametrize) => true,
        (MemberKind::FixtureMethod, DecoKind::PytestFixture { .. }) => true,
        (MemberKind::Helper, DecoKind::StaticMethod) => true,
        (MemberKind::Lifecycle(LifecycleKind::SetUpClass), DecoKind::ClassMethod)
        | (MemberKind::Lifecycle(LifecycleKind::TearDownClass), DecoKind::ClassMethod) => true,
        _ => false,
    })
}

fn member_params_allowed(member: &Member) -> bool {
    match member.kind {
        MemberKind::Lifecycle(LifecycleKind::SetUp)
        | MemberKind::Lifecycle(LifecycleKind::TearDown) => member.params == ["self"],
        MemberKind::Lifecycle(LifecycleKind::SetUpClass)
        | MemberKind::Lifecycle(LifecycleKind::TearDownClass) => member.params == ["cls"],
        _ => member.params.first().map(|p| p == "self").unwrap_or(false)
            || member
                .decorators
                .iter()
                .any(|d| matches!(d.kind, DecoKind::StaticMethod)),
    }
}

fn assert_arity_ok(method: &str, call: Node, source: &str) -> bool {
    let Some(parts) = crate::parser::ast_helpers::call_parts(call, source) else {
        return false;
    };
    let n = parts.args.len();
    let in_with = call
        .parent()
        .map(|p| matches!(p.kind(), "with_item" | "as_pattern"))
        .unwrap_or(false);
    match method {
        "assertTrue" | "assertFalse" | "assertIsNone" | "assertIsNotNone" => n >= 1,
        // the statement (call) form needs the callable after the exception
        "assertRaises" => {
            if in_with {
                n == 1
            } else {
                n >= 2
            }
        }
        "assertRaisesRegex" => {
            if in_with {
                n == 2
            } else {
                n >= 3
            }
        }
        _ => n >= 2,
    }
}

/// A translatable assertion call sits in an expression statement, or (for the
/// raises family) in a with-item context
fn assert_call_position_ok(call: Node) -> bool {
    let Some(parent) = call.parent() else {
        return false;
    };
    match parent.kind() {
        "expression_statement" => true,
        "with_item" => true,
        "as_pattern" => parent
            .parent()
            .map(|p| p.kind() == "with_item")
            .unwrap_or(false),
        _ => false,
    }
}
