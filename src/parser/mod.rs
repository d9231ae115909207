//! Parser module: tree-sitter Python front end and CST helpers

pub mod ast_helpers;
pub mod python;

pub use ast_helpers::{
    call_parts, contains_multiline_string, decorator_expr, dotted_name, indent_at,
    leading_comment_start, line_start, needs_parens, node_location, node_text, params_of,
    reindent, statements_of, CallParts, ParamInfo,
};
pub use python::{first_error, PythonParser};
