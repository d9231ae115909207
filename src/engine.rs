//! Transformation driver
//!
//! Fixed-point loop: reparse, re-recognise, apply the first applicable
//! rewrite or annotation, repeat until quiescent. Every firing either turns
//! a source-dialect construct into target dialect (which the recogniser no
//! longer offers to the rules) or annotates it (which suppresses re-firing),
//! so the loop terminates in O(n) firings. Import reconciliation runs last.

use crate::annotate;
use crate::edit::apply_edits;
use crate::fixture_graph::autouse_cycle;
use crate::imports;
use crate::parser::ast_helpers::node_location;
use crate::parser::python::{first_error, PythonParser};
use crate::recognizer::recognize;
use crate::rules::{next_action, RuleCtx, RuleOutcome};
use crate::{
    Category, Diagnostic, Direction, Location, TransformOptions, TransformOutcome,
};

// far above any real firing count; bounds the blast radius of a rule bug
const MAX_PASSES: usize = 10_000;

/// Applies the rule registry to one source file
pub struct TransformEngine {
    direction: Direction,
    options: TransformOptions,
}

impl TransformEngine {
    pub fn new(direction: Direction, options: TransformOptions) -> Self {
        Self { direction, options }
    }

    /// Run the transform. Pure: no shared state, deterministic output.
    pub fn run(&self, source: &str) -> TransformOutcome {
        let mut parser = match PythonParser::new() {
            Ok(parser) => parser,
            Err(e) => return hard_failure(Category::ParseError, Location::new(1, 1), e.to_string()),
        };

        match parser.parse(source) {
            Ok(tree) => {
                if let Some(location) = first_error(&tree) {
                    return hard_failure(
                        Category::ParseError,
                        location,
                        "source file contains a syntax error".to_string(),
                    );
                }
            }
            Err(e) => {
                return hard_failure(Category::ParseError, Location::new(1, 1), e.to_string());
            }
        }

        let mut src = source.to_string();
        let mut diagnostics = Vec::new();

        for _ in 0..MAX_PASSES {
            let action = {
                let Ok(tree) = parser.parse(&src) else {
                    break;
                };
                let model = recognize(&tree, &src);

                if self.direction == Direction::FixtureToXunit {
                    if let Some(name) = autouse_cycle(&model) {
                        let location = model
                            .fixture(&name)
                            .map(|f| node_location(f.outer))
                            .unwrap_or(Location::new(1, 1));
                        diagnostics.push(Diagnostic {
                            category: Category::FixtureCycle,
                            location,
                            message: format!("fixture dependency cycle involving '{}'", name),
                        });
                        return TransformOutcome {
                            output: None,
                            diagnostics,
                        };
                    }
                }

                let ctx = RuleCtx {
                    source: &src,
                    direction: self.direction,
                    options: &self.options,
                };
                next_action(&model, &ctx)
            };

            match action {
                Some(RuleOutcome::Replace(edits)) => {
                    src = apply_edits(&src, &edits);
                }
                Some(RuleOutcome::Reject(sites)) => {
                    let (edits, diags) = annotate::annotation_action(&src, &sites);
                    diagnostics.extend(diags);
                    src = apply_edits(&src, &edits);
                }
                Some(RuleOutcome::Fail(diagnostic)) => {
                    diagnostics.push(diagnostic);
                    return TransformOutcome {
                        output: None,
                        diagnostics,
                    };
                }
                None => break,
            }
        }

        if let Ok(tree) = parser.parse(&src) {
            let edits = imports::reconcile(&tree, &src, self.direction);
            src = apply_edits(&src, &edits);
        }

        TransformOutcome {
            output: Some(src),
            diagnostics,
        }
    }
}

fn hard_failure(category: Category, location: Location, message: String) -> TransformOutcome {
    TransformOutcome {
        output: None,
        diagnostics: vec![Diagnostic {
            category,
            location,
            message,
        }],
    }
}
