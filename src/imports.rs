//! Import reconciler: add, remove, and de-duplicate imports implied by rewrites
//!
//! Runs once, after the fixed-point loop. An import is added only when the
//! output uses it; an import is removed only when nothing uses it any more.

use crate::edit::{Edit, Span};
use crate::parser::ast_helpers::{line_end, line_start, node_text, walk_named};
use crate::Direction;
use tree_sitter::{Node, Tree};

/// Compute the import edits for the transformed module
pub fn reconcile(tree: &Tree, source: &str, direction: Direction) -> Vec<Edit> {
    let root = tree.root_node();
    let imports = module_imports(root);
    let import_spans: Vec<(usize, usize)> = imports
        .iter()
        .map(|n| (n.start_byte(), n.end_byte()))
        .collect();

    let mut edits = Vec::new();
    let mut removed: Vec<usize> = Vec::new();

    // de-duplicate exact duplicates
    let mut seen: Vec<&str> = Vec::new();
    for (i, node) in imports.iter().enumerate() {
        let text = node_text(*node, source).trim_end();
        if seen.contains(&text) {
            edits.push(Edit::delete(line_span(source, *node)));
            removed.push(i);
        } else {
            seen.push(text);
        }
    }

    let uses_unittest = name_used(root, source, "unittest", &import_spans);
    let uses_pytest = name_used(root, source, "pytest", &import_spans);
    let uses_namespace = name_used(root, source, "SimpleNamespace", &import_spans);

    match direction {
        Direction::FixtureToXunit => {
            let adding = uses_unittest && !imports_module(&imports, source, "unittest");
            if !uses_pytest {
                remove_module_imports(source, &imports, "pytest", !adding, &mut edits, &mut removed);
            }
            if adding {
                edits.push(plain_import_edit(source, root, &imports, &removed, "unittest"));
            }
        }
        Direction::XunitToFixture => {
            let adding = (uses_pytest && !imports_module(&imports, source, "pytest"))
                || (uses_namespace && !imports_name(&imports, source, "SimpleNamespace"));
            if !uses_unittest {
                remove_module_imports(
                    source,
                    &imports,
                    "unittest",
                    !adding,
                    &mut edits,
                    &mut removed,
                );
            }
            if uses_pytest && !imports_module(&imports, source, "pytest") {
                edits.push(plain_import_edit(source, root, &imports, &removed, "pytest"));
            }
            if uses_namespace && !imports_name(&imports, source, "SimpleNamespace") {
                let text = "from types import SimpleNamespace\n".to_string();
                let pos = from_import_insert_pos(source, root, &imports, &removed);
                edits.push(Edit::insert(pos, text));
            }
        }
    }
    edits
}

/// Module-level import statements, in document order
fn module_imports<'t>(root: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = root.walk();
    root.named_children(&mut cursor)
        .filter(|n| matches!(n.kind(), "import_statement" | "import_from_statement"))
        .collect()
}

fn line_span(source: &str, node: Node) -> Span {
    Span::new(
        line_start(source, node.start_byte()),
        line_end(source, node.end_byte() - 1),
    )
}

/// True when an identifier with this name is used outside import statements
fn name_used(root: Node, source: &str, name: &str, import_spans: &[(usize, usize)]) -> bool {
    let mut used = false;
    walk_named(root, &mut |n| {
        if used || n.kind() != "identifier" || node_text(n, source) != name {
            return;
        }
        let pos = n.start_byte();
        if import_spans.iter().any(|(s, e)| pos >= *s && pos < *e) {
            return;
        }
        // the attribute half of x.y is not a use of y
        if let Some(parent) = n.parent() {
            if parent.kind() == "attribute" && parent.child_by_field_name("attribute") == Some(n) {
                return;
            }
        }
        used = true;
    });
    used
}

/// True when `import <module>` (or `import <module> as _`) is present
fn imports_module(imports: &[Node], source: &str, module: &str) -> bool {
    imports.iter().any(|node| {
        if node.kind() != "import_statement" {
            return false;
        }
        let mut cursor = node.walk();
        let matched = node.named_children(&mut cursor).any(|child| match child.kind() {
            "dotted_name" => node_text(child, source) == module,
            "aliased_import" => child
                .child_by_field_name("name")
                .map(|n| node_text(n, source) == module)
                .unwrap_or(false),
            _ => false,
        });
        matched
    })
}

/// True when `from _ import <name>` is present
fn imports_name(imports: &[Node], source: &str, name: &str) -> bool {
    imports.iter().any(|node| {
        if node.kind() != "import_from_statement" {
            return false;
        }
        imported_names(*node, source).iter().any(|n| n == name)
    })
}

/// Names bound by a from-import
fn imported_names(node: Node, source: &str) -> Vec<String> {
    let module = node.child_by_field_name("module_name");
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| Some(*child) != module)
        .filter_map(|child| match child.kind() {
            "dotted_name" => Some(node_text(child, source).to_string()),
            "aliased_import" => child
                .child_by_field_name("alias")
                .map(|a| node_text(a, source).to_string()),
            _ => None,
        })
        .collect()
}

/// Remove every import line that binds only this module's names
fn remove_module_imports(
    source: &str,
    imports: &[Node],
    module: &str,
    allow_swallow: bool,
    edits: &mut Vec<Edit>,
    removed: &mut Vec<usize>,
) {
    for (i, node) in imports.iter().enumerate() {
        if removed.contains(&i) {
            continue;
        }
        let matches_module = match node.kind() {
            "import_statement" => {
                let mut cursor = node.walk();
                let matched = node.named_children(&mut cursor).all(|child| match child.kind() {
                    "dotted_name" => {
                        let text = node_text(child, source);
                        text == module || text.starts_with(&format!("{}.", module))
                    }
                    "aliased_import" => false,
                    _ => false,
                });
                matched
            }
            "import_from_statement" => node
                .child_by_field_name("module_name")
                .map(|m| {
                    let text = node_text(m, source);
                    text == module || text.starts_with(&format!("{}.", module))
                })
                .unwrap_or(false),
            _ => false,
        };
        if matches_module {
            let mut span = line_span(source, *node);
            // a removed head-of-file import takes its blank lines with it,
            // unless another import is about to land in its place
            if allow_swallow && span.start == 0 {
                while source[span.end..].starts_with('\n') {
                    span.end += 1;
                }
            }
            edits.push(Edit::delete(span));
            removed.push(i);
        }
    }
}

/// Edit adding `import <module>` at its alphabetical place among the
/// retained plain imports, or after the last import, or at the module head
fn plain_import_edit(
    source: &str,
    root: Node,
    imports: &[Node],
    removed: &[usize],
    module: &str,
) -> Edit {
    let retained: Vec<&Node> = imports
        .iter()
        .enumerate()
        .filter(|(i, _)| !removed.contains(i))
        .map(|(_, n)| n)
        .collect();

    let mut position: Option<usize> = None;
    for node in &retained {
        if node.kind() != "import_statement" {
            continue;
        }
        let mut cursor = node.walk();
        let name = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "dotted_name")
            .map(|c| node_text(c, source).to_string());
        if let Some(name) = name {
            if name.as_str() > module {
                position = Some(line_start(source, node.start_byte()));
                break;
            }
        }
    }
    let position = position
        .or_else(|| {
            retained
                .iter()
                .filter(|n| n.kind() == "import_statement")
                .last()
                .map(|n| line_end(source, n.end_byte() - 1))
        })
        .or_else(|| {
            retained
                .first()
                .map(|n| line_start(source, n.start_byte()))
        });
    match position {
        Some(pos) => Edit::insert(pos, format!("import {}\n", module)),
        // every import was removed: take the first one's place so the
        // surrounding blank lines keep their shape
        None => match imports.first() {
            Some(first) => Edit::insert(
                line_start(source, first.start_byte()),
                format!("import {}\n", module),
            ),
            None => Edit::insert(
                module_head(source, root),
                format!("import {}\n\n", module),
            ),
        },
    }
}

/// Insertion point for a from-import: after the last retained import
fn from_import_insert_pos(
    source: &str,
    root: Node,
    imports: &[Node],
    removed: &[usize],
) -> usize {
    let retained: Vec<&Node> = imports
        .iter()
        .enumerate()
        .filter(|(i, _)| !removed.contains(i))
        .map(|(_, n)| n)
        .collect();
    match retained.last() {
        Some(node) => line_end(source, node.end_byte() - 1),
        None => module_head(source, root),
    }
}

/// First position after leading comments and a module docstring
fn module_head(source: &str, root: Node) -> usize {
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() == "comment" {
            continue;
        }
        if child.kind() == "expression_statement"
            && child
                .named_child(0)
                .map(|n| n.kind() == "string")
                .unwrap_or(false)
        {
            continue;
        }
        return line_start(source, child.start_byte());
    }
    source.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply_edits;
    use crate::parser::python::PythonParser;

    fn reconciled(source: &str, direction: Direction) -> String {
        let tree = PythonParser::new().unwrap().parse(source).unwrap();
        let edits = reconcile(&tree, source, direction);
        apply_edits(source, &edits)
    }

    #[test]
    fn adds_unittest_alphabetically_after_pytest() {
        let src = "import pytest\n\n\nclass TestX(unittest.TestCase):\n    @pytest.mark.parametrize(\"x\", [1])\n    def test_x(self, x):\n        pass\n";
        let out = reconciled(src, Direction::FixtureToXunit);
        assert!(out.starts_with("import pytest\nimport unittest\n"));
    }

    #[test]
    fn removes_pytest_when_unused() {
        let src = "import pytest\n\n\nclass TestX(unittest.TestCase):\n    def test_x(self):\n        self.assertTrue(True)\n";
        let out = reconciled(src, Direction::FixtureToXunit);
        assert!(!out.contains("import pytest"));
        assert!(out.starts_with("import unittest\n"));
    }

    #[test]
    fn keeps_pytest_when_annotated_code_uses_it() {
        let src = "import pytest\n\n\nclass TestX(unittest.TestCase):\n    @pytest.fixture\n    def my_data(self):\n        return 42\n";
        let out = reconciled(src, Direction::FixtureToXunit);
        assert!(out.contains("import pytest\nimport unittest\n"));
    }

    #[test]
    fn removes_unittest_after_conversion_to_pytest() {
        let src = "import unittest\n\n\ndef test_x(processor):\n    assert processor is not None\n";
        let out = reconciled(src, Direction::XunitToFixture);
        assert!(!out.contains("import unittest"));
    }

    #[test]
    fn adds_pytest_when_marks_are_used() {
        let src = "import unittest\n\n\n@pytest.mark.skip(reason=\"x\")\ndef test_x():\n    assert True\n";
        let out = reconciled(src, Direction::XunitToFixture);
        assert!(out.starts_with("import pytest\n"));
        assert!(!out.contains("import unittest"));
    }

    #[test]
    fn adds_simplenamespace_from_import() {
        let src = "import pytest\n\n\n@pytest.fixture(autouse=True)\ndef env():\n    env = SimpleNamespace()\n    yield env\n";
        let out = reconciled(src, Direction::XunitToFixture);
        assert!(out.contains("import pytest\nfrom types import SimpleNamespace\n"));
    }

    #[test]
    fn deduplicates_exact_duplicates() {
        let src = "import pytest\nimport pytest\n\n\ndef test_x():\n    assert pytest is not None\n";
        let out = reconciled(src, Direction::XunitToFixture);
        assert_eq!(out.matches("import pytest").count(), 1);
    }

    #[test]
    fn untouched_module_gets_no_edits() {
        let src = "import os\n\n\ndef helper():\n    return os.getcwd()\n";
        let tree = PythonParser::new().unwrap().parse(src).unwrap();
        assert!(reconcile(&tree, src, Direction::XunitToFixture).is_empty());
        assert!(reconcile(&tree, src, Direction::FixtureToXunit).is_empty());
    }
}
