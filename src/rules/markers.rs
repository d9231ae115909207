//! Skip-marker rewrites between the dialects
//!
//! `skip(reason)` <-> `mark.skip(reason=...)`; `skipIf(cond, reason)` <->
//! `mark.skipif(cond, reason=...)`; `skipUnless(cond, reason)` becomes
//! `mark.skipif(not cond, ...)`; `expectedFailure` <-> `mark.xfail`.

use super::{Candidate, RewriteRule, RuleCtx, RuleOutcome};
use crate::edit::{Edit, Span};
use crate::model::{DecoKind, DecoratorInfo, MemberKind, ModuleModel};
use crate::parser::ast_helpers::{decorator_parts, node_text};
use crate::Direction;
use tree_sitter::Node;

pub struct XunitMarkerRule;

impl RewriteRule for XunitMarkerRule {
    fn name(&self) -> &'static str {
        "xunit-markers"
    }

    fn direction(&self) -> Option<Direction> {
        Some(Direction::XunitToFixture)
    }

    fn find(&self, module: &ModuleModel, ctx: &RuleCtx) -> Option<Candidate> {
        let mut decorators: Vec<&DecoratorInfo> = Vec::new();
        for class in module.classes.iter().filter(|c| c.eligible) {
            decorators.extend(class.decorators.iter());
            for member in &class.members {
                if matches!(member.kind, MemberKind::Test | MemberKind::Helper) {
                    decorators.extend(member.decorators.iter());
                }
            }
        }
        decorators.sort_by_key(|d| d.node.start_byte());

        for deco in decorators {
            if let Some(replacement) = unittest_to_mark(deco, ctx.source) {
                return Some(Candidate {
                    anchor: deco.node.start_byte(),
                    outcome: RuleOutcome::Replace(vec![Edit::replace(
                        Span::of(&deco.node),
                        replacement,
                    )]),
                });
            }
        }
        None
    }
}

fn unittest_to_mark(deco: &DecoratorInfo, source: &str) -> Option<String> {
    let (_, call) = decorator_parts(deco.node, source)?;
    match &deco.kind {
        DecoKind::UnittestSkip => {
            let reason = call.as_ref().and_then(|c| c.args.first().copied());
            Some(match reason {
                Some(r) => format!("@pytest.mark.skip(reason={})", node_text(r, source)),
                None => "@pytest.mark.skip".to_string(),
            })
        }
        DecoKind::UnittestSkipIf => {
            let parts = call?;
            let cond = parts.args.first()?;
            let reason = parts.args.get(1);
            Some(match reason {
                Some(r) => format!(
                    "@pytest.mark.skipif({}, reason={})",
                    node_text(*cond, source),
                    node_text(*r, source)
                ),
                None => format!("@pytest.mark.skipif({})", node_text(*cond, source)),
            })
        }
        DecoKind::UnittestSkipUnless => {
            let parts = call?;
            let cond = parts.args.first()?;
            let reason = parts.args.get(1);
            let negated = negate(*cond, source);
            Some(match reason {
                Some(r) => format!(
                    "@pytest.mark.skipif({}, reason={})",
                    negated,
                    node_text(*r, source)
                ),
                None => format!("@pytest.mark.skipif({})", negated),
            })
        }
        DecoKind::UnittestExpectedFailure => Some("@pytest.mark.xfail".to_string()),
        _ => None,
    }
}

/// `not <cond>`, parenthesising conditions that bind looser than `not`
fn negate(cond: Node, source: &str) -> String {
    let text = node_text(cond, source);
    match cond.kind() {
        "boolean_operator" | "conditional_expression" | "lambda" | "named_expression" => {
            format!("not ({})", text)
        }
        _ => format!("not {}", text),
    }
}

pub struct FixtureMarkerRule;

impl RewriteRule for FixtureMarkerRule {
    fn name(&self) -> &'static str {
        "fixture-markers"
    }

    fn direction(&self) -> Option<Direction> {
        Some(Direction::FixtureToXunit)
    }

    fn find(&self, module: &ModuleModel, ctx: &RuleCtx) -> Option<Candidate> {
        for test in module.tests.iter().filter(|t| !t.excluded) {
            for deco in &test.decorators {
                if let Some(replacement) = mark_to_unittest(deco, ctx.source) {
                    return Some(Candidate {
                        anchor: deco.node.start_byte(),
                        outcome: RuleOutcome::Replace(vec![Edit::replace(
                            Span::of(&deco.node),
                            replacement,
                        )]),
                    });
                }
            }
        }
        None
    }
}

fn mark_to_unittest(deco: &DecoratorInfo, source: &str) -> Option<String> {
    let (_, call) = decorator_parts(deco.node, source)?;
    match &deco.kind {
        DecoKind::PytestMarkSkip => {
            let reason = call.as_ref().and_then(|c| {
                c.kwargs
                    .iter()
                    .find(|(k, _)| k == "reason")
                    .map(|(_, v)| *v)
                    .or_else(|| c.args.first().copied())
            });
            Some(match reason {
                Some(r) => format!("@unittest.skip({})", node_text(r, source)),
                None => "@unittest.skip(\"skipped\")".to_string(),
            })
        }
        DecoKind::PytestMarkSkipif => {
            let parts = call?;
            let cond = parts.args.first()?;
            let reason = parts
                .kwargs
                .iter()
                .find(|(k, _)| k == "reason")
                .map(|(_, v)| *v)
                .or_else(|| parts.args.get(1).copied());
            let reason_text = reason
                .map(|r| node_text(r, source).to_string())
                .unwrap_or_else(|| "\"skipped\"".to_string());
            Some(format!(
                "@unittest.skipIf({}, {})",
                node_text(*cond, source),
                reason_text
            ))
        }
        DecoKind::PytestMarkXfail => Some("@unittest.expectedFailure".to_string()),
        _ => None,
    }
}
