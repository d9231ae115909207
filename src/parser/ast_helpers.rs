//! Shared CST helpers: node text, traversal, indentation, signatures

use crate::edit::{Edit, Span};
use crate::Location;
use tree_sitter::Node;

/// Text of a node
pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// 1-indexed location of a node's start
pub fn node_location(node: Node) -> Location {
    let p = node.start_position();
    Location::new(p.row + 1, p.column + 1)
}

/// 1-indexed location of a byte offset
pub fn node_location_at(source: &str, byte: usize) -> Location {
    let byte = byte.min(source.len());
    let line = source[..byte].matches('\n').count() + 1;
    let column = byte - line_start(source, byte) + 1;
    Location::new(line, column)
}

/// Byte offset of the start of the line containing `byte`
pub fn line_start(source: &str, byte: usize) -> usize {
    source[..byte.min(source.len())]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Byte offset just past the end of the line containing `byte` (after the newline)
pub fn line_end(source: &str, byte: usize) -> usize {
    match source[byte.min(source.len())..].find('\n') {
        Some(i) => byte + i + 1,
        None => source.len(),
    }
}

/// Leading whitespace of the line containing `byte`
pub fn indent_at(source: &str, byte: usize) -> &str {
    let start = line_start(source, byte);
    let line = &source[start..];
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// Start byte of the contiguous block of comment-only lines directly above
/// the line containing `node_start`. Returns the node's own line start when
/// there is no such block. A blank line terminates the block.
pub fn leading_comment_start(source: &str, node_start: usize) -> usize {
    let mut start = line_start(source, node_start);
    loop {
        if start == 0 {
            return start;
        }
        let prev_start = line_start(source, start - 1);
        let prev_line = source[prev_start..start].trim_end_matches('\n');
        if prev_line.trim_start().starts_with('#') {
            start = prev_start;
        } else {
            return start;
        }
    }
}

/// Preorder walk over all named nodes
pub fn walk_named<'t, F: FnMut(Node<'t>)>(node: Node<'t>, f: &mut F) {
    f(node);
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    for child in children {
        walk_named(child, f);
    }
}

/// Preorder walk that does not descend into nested function or class bodies
pub fn walk_no_nested_defs<'t, F: FnMut(Node<'t>)>(node: Node<'t>, f: &mut F) {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    for child in children {
        f(child);
        if !matches!(
            child.kind(),
            "function_definition" | "class_definition" | "lambda"
        ) {
            walk_no_nested_defs(child, f);
        }
    }
}

/// Collect named nodes matching a predicate, in document order
pub fn find_nodes<'t>(root: Node<'t>, pred: &dyn Fn(Node<'t>) -> bool) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    walk_named(root, &mut |n| {
        if pred(n) {
            out.push(n);
        }
    });
    out
}

/// Named statements of a block, comments included
pub fn statements_of(block: Node) -> Vec<Node> {
    let mut cursor = block.walk();
    block.named_children(&mut cursor).collect()
}

/// Named statements of a block, comments excluded
pub fn code_statements(block: Node) -> Vec<Node> {
    statements_of(block)
        .into_iter()
        .filter(|n| n.kind() != "comment")
        .collect()
}

/// The expression of a decorator node (the part after `@`)
pub fn decorator_expr(decorator: Node) -> Option<Node> {
    let mut cursor = decorator.walk();
    let first = decorator.named_children(&mut cursor).next();
    first
}

/// Render an identifier or attribute chain as `a.b.c`
pub fn dotted_name(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(node_text(node, source).to_string()),
        "attribute" => {
            let object = node.child_by_field_name("object")?;
            let attr = node.child_by_field_name("attribute")?;
            let base = dotted_name(object, source)?;
            Some(format!("{}.{}", base, node_text(attr, source)))
        }
        _ => None,
    }
}

/// Decomposed call expression
#[derive(Debug, Clone)]
pub struct CallParts<'t> {
    pub func: Node<'t>,
    /// Dotted name of the callee, when it is a plain name chain
    pub func_name: Option<String>,
    pub args: Vec<Node<'t>>,
    pub kwargs: Vec<(String, Node<'t>)>,
}

/// Split a `call` node into callee, positional args, and keyword args
pub fn call_parts<'t>(node: Node<'t>, source: &str) -> Option<CallParts<'t>> {
    if node.kind() != "call" {
        return None;
    }
    let func = node.child_by_field_name("function")?;
    let arguments = node.child_by_field_name("arguments")?;
    let mut args = Vec::new();
    let mut kwargs = Vec::new();
    let mut cursor = arguments.walk();
    for child in arguments.named_children(&mut cursor) {
        if child.kind() == "comment" {
            continue;
        }
        if child.kind() == "keyword_argument" {
            let name = child
                .child_by_field_name("name")
                .map(|n| node_text(n, source).to_string())
                .unwrap_or_default();
            let value = child.child_by_field_name("value")?;
            kwargs.push((name, value));
        } else {
            args.push(child);
        }
    }
    Some(CallParts {
        func,
        func_name: dotted_name(func, source),
        args,
        kwargs,
    })
}

/// Name and optional call parts of a decorator expression.
/// `@pytest.fixture` yields ("pytest.fixture", None); `@pytest.fixture(scope="class")`
/// yields ("pytest.fixture", Some(parts)).
pub fn decorator_parts<'t>(
    decorator: Node<'t>,
    source: &str,
) -> Option<(String, Option<CallParts<'t>>)> {
    let expr = decorator_expr(decorator)?;
    if expr.kind() == "call" {
        let parts = call_parts(expr, source)?;
        let name = parts.func_name.clone()?;
        Some((name, Some(parts)))
    } else {
        dotted_name(expr, source).map(|name| (name, None))
    }
}

/// A single parameter of a function definition
#[derive(Debug, Clone)]
pub struct ParamInfo<'t> {
    pub name: String,
    pub node: Node<'t>,
}

/// Parameters of a `function_definition`, in order
pub fn params_of<'t>(def_node: Node<'t>, source: &str) -> Vec<ParamInfo<'t>> {
    let mut out = Vec::new();
    let Some(params) = def_node.child_by_field_name("parameters") else {
        return out;
    };
    let mut cursor = params.walk();
    for child in params.named_children(&mut cursor) {
        let name = match child.kind() {
            "identifier" => node_text(child, source).to_string(),
            "typed_parameter" | "default_parameter" | "typed_default_parameter" => {
                match child.child_by_field_name("name") {
                    Some(n) => node_text(n, source).to_string(),
                    None => {
                        let mut c2 = child.walk();
                        let first_child = child.named_children(&mut c2).next();
                        match first_child {
                            Some(first) => node_text(first, source).to_string(),
                            None => continue,
                        }
                    }
                }
            }
            "list_splat_pattern" | "dictionary_splat_pattern" => {
                node_text(child, source).to_string()
            }
            _ => continue,
        };
        out.push(ParamInfo { name, node: child });
    }
    out
}

/// True when wrapping the expression in a larger expression requires parens
pub fn needs_parens(node: Node) -> bool {
    matches!(
        node.kind(),
        "lambda"
            | "conditional_expression"
            | "boolean_operator"
            | "named_expression"
            | "comparison_operator"
            | "not_operator"
    )
}

/// Expression text, parenthesised when composition requires it
pub fn operand_text(node: Node, source: &str) -> String {
    let text = node_text(node, source);
    if needs_parens(node) {
        format!("({})", text)
    } else {
        text.to_string()
    }
}

/// Shift the indentation of every non-empty line by `delta` spaces
pub fn reindent(text: &str, delta: isize) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if line.trim().is_empty() {
            continue;
        }
        if delta >= 0 {
            for _ in 0..delta {
                out.push(' ');
            }
            out.push_str(line);
        } else {
            let strip = (-delta) as usize;
            let available = line.len() - line.trim_start_matches(' ').len();
            out.push_str(&line[strip.min(available)..]);
        }
    }
    out
}

/// True when the subtree contains a string literal spanning multiple lines
pub fn contains_multiline_string(node: Node, source: &str) -> bool {
    let mut found = false;
    walk_named(node, &mut |n| {
        if n.kind() == "string" && node_text(n, source).contains('\n') {
            found = true;
        }
    });
    found
}

/// True when the subtree contains a multi-line string that re-indenting
/// would corrupt. Docstrings (a string expression heading a body) shift
/// harmlessly and are not counted.
pub fn has_disruptive_multiline_string(scope: Node, source: &str) -> bool {
    let mut found = false;
    walk_named(scope, &mut |n| {
        if found || n.kind() != "string" || !node_text(n, source).contains('\n') {
            return;
        }
        let is_docstring = n
            .parent()
            .map(|p| {
                p.kind() == "expression_statement"
                    && p.parent()
                        .map(|b| {
                            matches!(b.kind(), "block" | "module")
                                && b.named_child(0) == Some(p)
                        })
                        .unwrap_or(false)
            })
            .unwrap_or(false);
        if !is_docstring {
            found = true;
        }
    });
    found
}

/// Literal value of a simple string node, quotes stripped
pub fn string_value<'a>(node: Node, source: &'a str) -> &'a str {
    let text = node_text(node, source);
    let text = text
        .trim_start_matches(|c| c == 'r' || c == 'b' || c == 'u' || c == 'f');
    for q in ["\"\"\"", "'''", "\"", "'"] {
        if text.len() >= 2 * q.len() && text.starts_with(q) && text.ends_with(q) {
            return &text[q.len()..text.len() - q.len()];
        }
    }
    text
}

/// Identifier nodes with the given name used as plain names (not as the
/// attribute part of `x.name`, a keyword-argument name, or a parameter)
pub fn plain_identifier_uses<'t>(scope: Node<'t>, source: &str, name: &str) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    walk_named(scope, &mut |n| {
        if n.kind() != "identifier" || node_text(n, source) != name {
            return;
        }
        if let Some(parent) = n.parent() {
            match parent.kind() {
                "attribute" => {
                    if parent.child_by_field_name("attribute") == Some(n) {
                        return;
                    }
                }
                "keyword_argument" => {
                    if parent.child_by_field_name("name") == Some(n) {
                        return;
                    }
                }
                "parameters" | "typed_parameter" | "default_parameter"
                | "typed_default_parameter" => {
                    if parent.kind() != "default_parameter"
                        || parent.child_by_field_name("name") == Some(n)
                    {
                        return;
                    }
                }
                _ => {}
            }
        }
        out.push(n);
    });
    out
}

/// Edits renaming every plain use of `name` in `scope` to `replacement`
pub fn rename_identifier_edits(
    scope: Node,
    source: &str,
    name: &str,
    replacement: &str,
) -> Vec<Edit> {
    plain_identifier_uses(scope, source, name)
        .into_iter()
        .map(|n| Edit::replace(Span::of(&n), replacement))
        .collect()
}

/// Attribute accesses `receiver.attr` within `scope`: (attr name, attribute node)
pub fn receiver_attrs<'t>(scope: Node<'t>, source: &str, receiver: &str) -> Vec<(String, Node<'t>)> {
    let mut out = Vec::new();
    walk_named(scope, &mut |n| {
        if n.kind() != "attribute" {
            return;
        }
        let Some(object) = n.child_by_field_name("object") else {
            return;
        };
        if object.kind() != "identifier" || node_text(object, source) != receiver {
            return;
        }
        if let Some(attr) = n.child_by_field_name("attribute") {
            out.push((node_text(attr, source).to_string(), n));
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::python::PythonParser;

    fn parse(source: &str) -> tree_sitter::Tree {
        PythonParser::new().unwrap().parse(source).unwrap()
    }

    #[test]
    fn indent_and_line_helpers() {
        let src = "def f():\n    x = 1\n";
        let pos = src.find("x = 1").unwrap();
        assert_eq!(indent_at(src, pos), "    ");
        assert_eq!(line_start(src, pos), 9);
        assert_eq!(&src[line_start(src, pos)..line_end(src, pos)], "    x = 1\n");
    }

    #[test]
    fn leading_comments_are_found() {
        let src = "x = 1\n# one\n# two\ny = 2\n";
        let pos = src.find("y = 2").unwrap();
        let start = leading_comment_start(src, pos);
        assert_eq!(&src[start..pos], "# one\n# two\n");
    }

    #[test]
    fn blank_line_terminates_leading_comments() {
        let src = "# far away\n\ny = 2\n";
        let pos = src.find("y = 2").unwrap();
        assert_eq!(leading_comment_start(src, pos), pos);
    }

    #[test]
    fn dotted_names() {
        let src = "pytest.mark.parametrize\n";
        let tree = parse(src);
        let expr = tree.root_node().named_child(0).unwrap().named_child(0).unwrap();
        assert_eq!(
            dotted_name(expr, src).as_deref(),
            Some("pytest.mark.parametrize")
        );
    }

    #[test]
    fn call_parts_splits_args_and_kwargs() {
        let src = "f(1, x, reason=\"slow\")\n";
        let tree = parse(src);
        let call = tree.root_node().named_child(0).unwrap().named_child(0).unwrap();
        let parts = call_parts(call, src).unwrap();
        assert_eq!(parts.func_name.as_deref(), Some("f"));
        assert_eq!(parts.args.len(), 2);
        assert_eq!(parts.kwargs.len(), 1);
        assert_eq!(parts.kwargs[0].0, "reason");
    }

    #[test]
    fn params_listed_in_order() {
        let src = "def f(self, a, b=2, *rest):\n    pass\n";
        let tree = parse(src);
        let def = tree.root_node().named_child(0).unwrap();
        let params = params_of(def, src);
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["self", "a", "b", "*rest"]);
    }

    #[test]
    fn reindent_shifts_lines() {
        assert_eq!(reindent("a\n    b", 4), "    a\n        b");
        assert_eq!(reindent("    a\n        b", -4), "a\n    b");
    }

    #[test]
    fn reindent_keeps_blank_lines_empty() {
        assert_eq!(reindent("a\n\nb", 4), "    a\n\n    b");
    }

    #[test]
    fn string_values() {
        let src = "x = \"hello\"\n";
        let tree = parse(src);
        let assign = tree.root_node().named_child(0).unwrap().named_child(0).unwrap();
        let rhs = assign.child_by_field_name("right").unwrap();
        assert_eq!(string_value(rhs, src), "hello");
    }

    #[test]
    fn plain_identifier_uses_skip_attribute_names() {
        let src = "value = obj.value + value\n";
        let tree = parse(src);
        let uses = plain_identifier_uses(tree.root_node(), src, "value");
        // lhs target and final operand count; obj.value's attribute does not
        assert_eq!(uses.len(), 2);
    }

    #[test]
    fn receiver_attrs_finds_self_accesses() {
        let src = "self.processor = TextProcessor()\nresult = self.processor.run()\n";
        let tree = parse(src);
        let attrs = receiver_attrs(tree.root_node(), src, "self");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].0, "processor");
    }
}
