//! Test-IR: dialect-neutral model of test constructs layered over the CST
//!
//! Nodes reference the tree of the current pass; rewrites invalidate the
//! model, which is rebuilt by re-recognising the reparsed source.

use tree_sitter::Node;

/// Lifecycle method kinds; at most one of each per class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleKind {
    SetUp,
    TearDown,
    SetUpClass,
    TearDownClass,
}

impl LifecycleKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "setUp" => Some(LifecycleKind::SetUp),
            "tearDown" => Some(LifecycleKind::TearDown),
            "setUpClass" => Some(LifecycleKind::SetUpClass),
            "tearDownClass" => Some(LifecycleKind::TearDownClass),
            _ => None,
        }
    }
}

/// Fixture lifetime scope; ordering follows lifetime width
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FixtureScope {
    Function,
    Class,
    Module,
    Session,
}

impl FixtureScope {
    pub fn from_keyword(value: &str) -> Self {
        match value {
            "class" => FixtureScope::Class,
            "module" | "package" => FixtureScope::Module,
            "session" => FixtureScope::Session,
            _ => FixtureScope::Function,
        }
    }
}

/// Whether a fixture tears down after a yield point or only returns a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureShape {
    Return,
    Yield,
}

/// Tagged assertion kinds; rewrites dispatch with an exhaustive match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionKind {
    Equal,
    NotEqual,
    IsTrue,
    IsFalse,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    In,
    NotIn,
    IsNone,
    IsNotNone,
    Raises,
    RaisesMatch,
    SubtestScope,
}

impl AssertionKind {
    /// The unittest assertion method for this kind, when one exists
    pub fn unittest_method(&self) -> Option<&'static str> {
        match self {
            AssertionKind::Equal => Some("assertEqual"),
            AssertionKind::NotEqual => Some("assertNotEqual"),
            AssertionKind::IsTrue => Some("assertTrue"),
            AssertionKind::IsFalse => Some("assertFalse"),
            AssertionKind::Greater => Some("assertGreater"),
            AssertionKind::GreaterEqual => Some("assertGreaterEqual"),
            AssertionKind::Less => Some("assertLess"),
            AssertionKind::LessEqual => Some("assertLessEqual"),
            AssertionKind::In => Some("assertIn"),
            AssertionKind::NotIn => Some("assertNotIn"),
            AssertionKind::IsNone => Some("assertIsNone"),
            AssertionKind::IsNotNone => Some("assertIsNotNone"),
            AssertionKind::Raises => Some("assertRaises"),
            AssertionKind::RaisesMatch => Some("assertRaisesRegex"),
            AssertionKind::SubtestScope => None,
        }
    }

    /// Parse a unittest assertion method name
    pub fn from_unittest_method(method: &str) -> Option<Self> {
        match method {
            "assertEqual" => Some(AssertionKind::Equal),
            "assertNotEqual" => Some(AssertionKind::NotEqual),
            "assertTrue" => Some(AssertionKind::IsTrue),
            "assertFalse" => Some(AssertionKind::IsFalse),
            "assertGreater" => Some(AssertionKind::Greater),
            "assertGreaterEqual" => Some(AssertionKind::GreaterEqual),
            "assertLess" => Some(AssertionKind::Less),
            "assertLessEqual" => Some(AssertionKind::LessEqual),
            "assertIn" => Some(AssertionKind::In),
            "assertNotIn" => Some(AssertionKind::NotIn),
            "assertIsNone" => Some(AssertionKind::IsNone),
            "assertIsNotNone" => Some(AssertionKind::IsNotNone),
            "assertRaises" => Some(AssertionKind::Raises),
            "assertRaisesRegex" => Some(AssertionKind::RaisesMatch),
            _ => None,
        }
    }

    /// The comparison operator for binary kinds
    pub fn operator(&self) -> Option<&'static str> {
        match self {
            AssertionKind::Equal => Some("=="),
            AssertionKind::NotEqual => Some("!="),
            AssertionKind::Greater => Some(">"),
            AssertionKind::GreaterEqual => Some(">="),
            AssertionKind::Less => Some("<"),
            AssertionKind::LessEqual => Some("<="),
            AssertionKind::In => Some("in"),
            AssertionKind::NotIn => Some("not in"),
            _ => None,
        }
    }

    /// Parse a single comparison operator
    pub fn from_operator(op: &str) -> Option<Self> {
        match op {
            "==" => Some(AssertionKind::Equal),
            "!=" => Some(AssertionKind::NotEqual),
            ">" => Some(AssertionKind::Greater),
            ">=" => Some(AssertionKind::GreaterEqual),
            "<" => Some(AssertionKind::Less),
            "<=" => Some(AssertionKind::LessEqual),
            "in" => Some(AssertionKind::In),
            "not in" => Some(AssertionKind::NotIn),
            _ => None,
        }
    }
}

/// Classified decorator
#[derive(Debug, Clone, PartialEq)]
pub enum DecoKind {
    PytestFixture {
        scope: FixtureScope,
        autouse: bool,
        parametrized: bool,
    },
    PytestParametrize,
    PytestMarkSkip,
    PytestMarkSkipif,
    PytestMarkXfail,
    /// Other `pytest.mark.*` marker, preserved but not rewritten
    PytestMarkOther(String),
    UnittestSkip,
    UnittestSkipIf,
    UnittestSkipUnless,
    UnittestExpectedFailure,
    ClassMethod,
    StaticMethod,
    /// nose/nose2 plugin decorator (`with_setup` et al.)
    Nose,
    Unknown,
}

/// A decorator node with its classification
#[derive(Debug, Clone)]
pub struct DecoratorInfo<'t> {
    pub node: Node<'t>,
    pub kind: DecoKind,
}

/// A free `@pytest.fixture` function
#[derive(Debug, Clone)]
pub struct FixtureDef<'t> {
    /// Outermost node (decorated_definition)
    pub outer: Node<'t>,
    pub def_node: Node<'t>,
    pub name: String,
    pub scope: FixtureScope,
    pub autouse: bool,
    pub parametrized: bool,
    pub shape: FixtureShape,
    /// Parameter names excluding `request` (other fixtures this one depends on)
    pub deps: Vec<String>,
    pub decorators: Vec<DecoratorInfo<'t>>,
    /// A HAMLET-TODO block already precedes this definition
    pub annotated: bool,
    /// Body ends in a single top-level return/yield (inlining-safe shape)
    pub shape_ok: bool,
}

/// A free `test_*` function
#[derive(Debug, Clone)]
pub struct FreeTest<'t> {
    pub outer: Node<'t>,
    pub def_node: Node<'t>,
    pub name: String,
    pub params: Vec<String>,
    pub decorators: Vec<DecoratorInfo<'t>>,
    /// Unknown or plugin decorators exclude the test from conversion
    pub excluded: bool,
    pub annotated: bool,
}

/// Kind of a class member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Lifecycle(LifecycleKind),
    Test,
    FixtureMethod,
    Helper,
    NestedClass,
}

/// A member of a test class
#[derive(Debug, Clone)]
pub struct Member<'t> {
    pub outer: Node<'t>,
    pub def_node: Node<'t>,
    pub name: String,
    pub kind: MemberKind,
    pub decorators: Vec<DecoratorInfo<'t>>,
    pub params: Vec<String>,
}

/// A `self.x = expr` (or `cls.x = expr`) assignment in a lifecycle body
#[derive(Debug, Clone)]
pub struct SetupAttr<'t> {
    pub name: String,
    pub value: Node<'t>,
    pub stmt: Node<'t>,
}

/// A test class (xUnit dialect)
#[derive(Debug, Clone)]
pub struct ClassModel<'t> {
    pub outer: Node<'t>,
    pub class_node: Node<'t>,
    pub name: String,
    pub bases: Vec<String>,
    pub decorators: Vec<DecoratorInfo<'t>>,
    pub body: Node<'t>,
    pub members: Vec<Member<'t>>,
    /// Base is unittest.TestCase-like
    pub is_testcase: bool,
    /// Convertible to the fixture dialect without loss
    pub eligible: bool,
    /// Attributes assigned in setUp, in assignment order
    pub setup_attrs: Vec<SetupAttr<'t>>,
    /// Attributes assigned in setUpClass
    pub class_attrs: Vec<SetupAttr<'t>>,
    /// setUp consists solely of simple attribute assignments
    pub setup_simple: bool,
}

impl<'t> ClassModel<'t> {
    pub fn member(&self, kind: MemberKind) -> Option<&Member<'t>> {
        self.members.iter().find(|m| m.kind == kind)
    }

    pub fn lifecycle(&self, kind: LifecycleKind) -> Option<&Member<'t>> {
        self.member(MemberKind::Lifecycle(kind))
    }
}

/// A module-level import
#[derive(Debug, Clone)]
pub struct Import<'t> {
    pub node: Node<'t>,
    /// Dotted module path (`nose2.tools.decorators`)
    pub module: String,
    pub is_nose: bool,
    pub annotated: bool,
}

/// Root of the Test-IR for one module
#[derive(Debug, Clone)]
pub struct ModuleModel<'t> {
    pub root: Node<'t>,
    pub imports: Vec<Import<'t>>,
    pub classes: Vec<ClassModel<'t>>,
    pub tests: Vec<FreeTest<'t>>,
    pub fixtures: Vec<FixtureDef<'t>>,
}

impl<'t> ModuleModel<'t> {
    pub fn fixture(&self, name: &str) -> Option<&FixtureDef<'t>> {
        self.fixtures.iter().find(|f| f.name == name)
    }

    pub fn has_nose(&self) -> bool {
        self.imports.iter().any(|i| i.is_nose)
    }
}
