//! Python parser using tree-sitter

use crate::Location;
use anyhow::{Context, Result};
use tree_sitter::{Language, Parser, Tree};

/// Parser for Python files using tree-sitter
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language: Language = tree_sitter_python::LANGUAGE.into();
        parser
            .set_language(&language)
            .context("Failed to set Python language")?;
        Ok(Self { parser })
    }

    /// Parse source code into a syntax tree
    pub fn parse(&mut self, source: &str) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .context("Failed to parse Python source")
    }

    /// Get the tree-sitter language for Python
    pub fn language() -> Language {
        tree_sitter_python::LANGUAGE.into()
    }
}

/// Location of the first syntax error in the tree, if any
pub fn first_error(tree: &Tree) -> Option<Location> {
    if !tree.root_node().has_error() {
        return None;
    }
    find_error(tree.root_node())
}

fn find_error(node: tree_sitter::Node) -> Option<Location> {
    if node.is_error() || node.is_missing() {
        let p = node.start_position();
        return Some(Location::new(p.row + 1, p.column + 1));
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    for child in children {
        if child.has_error() {
            if let Some(loc) = find_error(child) {
                return Some(loc);
            }
        }
    }
    // has_error is set but no ERROR node found below; report the node itself
    let p = node.start_position();
    Some(Location::new(p.row + 1, p.column + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let mut parser = PythonParser::new().unwrap();
        let tree = parser.parse("x = 1\n").unwrap();
        assert!(!tree.root_node().has_error());
        assert!(first_error(&tree).is_none());
    }

    #[test]
    fn parse_function() {
        let mut parser = PythonParser::new().unwrap();
        let source = "def greet(name):\n    return f'Hello, {name}!'\n";
        let tree = parser.parse(source).unwrap();
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn detects_syntax_error() {
        let mut parser = PythonParser::new().unwrap();
        let tree = parser.parse("def broken(:\n").unwrap();
        assert!(first_error(&tree).is_some());
    }
}
