//! Rule registry: named, directional rewrite rules
//!
//! A rule locates the first construct it can act on (in document order) and
//! either replaces it or rejects it with annotation sites for the
//! unconvertibility annotator. Whole-construct conversions (class to
//! functions and back) run only once every other rule is quiescent, so
//! inlined bodies already carry target-dialect assertions and markers.

pub mod assertions;
pub mod class_to_functions;
pub mod functions_to_class;
pub mod holes;
pub mod markers;
pub mod nose;
pub mod raises;
pub mod subtest;

use crate::annotate::AnnotationSite;
use crate::edit::Edit;
use crate::model::ModuleModel;
use crate::{Diagnostic, Direction, TransformOptions};

/// Context shared by all rules during one pass
pub struct RuleCtx<'a> {
    pub source: &'a str,
    pub direction: Direction,
    pub options: &'a TransformOptions,
}

/// What a rule wants to do at its anchor
pub enum RuleOutcome {
    /// Substitute these edits into the source
    Replace(Vec<Edit>),
    /// No faithful equivalent: annotate and transport verbatim
    Reject(Vec<AnnotationSite>),
    /// Hard failure; the transform aborts for this file
    Fail(Diagnostic),
}

/// A rule's proposed action, anchored at a byte offset for ordering
pub struct Candidate {
    pub anchor: usize,
    pub outcome: RuleOutcome,
}

/// A named, directional rewrite rule
pub trait RewriteRule {
    fn name(&self) -> &'static str;
    /// Direction the rule fires in; None fires in both
    fn direction(&self) -> Option<Direction>;
    /// Conversions run only when every other rule is quiescent
    fn is_conversion(&self) -> bool {
        false
    }
    /// First action this rule can take, in document order
    fn find(&self, module: &ModuleModel, ctx: &RuleCtx) -> Option<Candidate>;
}

/// The fixed rule registry for a direction. Order is registration order and
/// is part of the engine's determinism contract.
pub fn registry(direction: Direction) -> Vec<Box<dyn RewriteRule>> {
    let all: Vec<Box<dyn RewriteRule>> = vec![
        Box::new(nose::NoseImportRule),
        Box::new(assertions::XunitAssertRule),
        Box::new(assertions::UnknownAssertRule),
        Box::new(raises::XunitRaisesRule),
        Box::new(markers::XunitMarkerRule),
        Box::new(subtest::SubtestToParametrizeRule),
        Box::new(assertions::FixtureAssertRule),
        Box::new(raises::FixtureRaisesRule),
        Box::new(markers::FixtureMarkerRule),
        Box::new(holes::ParametrizeAnnotationRule),
        Box::new(holes::FrameworkHoleRule),
        Box::new(holes::FixtureAnnotationRule),
        Box::new(class_to_functions::ClassToFunctionsRule),
        Box::new(functions_to_class::FunctionsToClassRule),
    ];
    all.into_iter()
        .filter(|r| r.direction().map(|d| d == direction).unwrap_or(true))
        .collect()
}

/// Pick the next action: a hard failure preempts everything; otherwise the
/// smallest anchor among non-conversion rules, registry order breaking ties;
/// conversions fire only when no other rule has work left.
pub fn next_action(module: &ModuleModel, ctx: &RuleCtx) -> Option<RuleOutcome> {
    let rules = registry(ctx.direction);
    let mut plain: Option<(usize, usize, RuleOutcome)> = None;
    let mut conversion: Option<(usize, usize, RuleOutcome)> = None;

    for (index, rule) in rules.iter().enumerate() {
        let Some(candidate) = rule.find(module, ctx) else {
            continue;
        };
        if matches!(candidate.outcome, RuleOutcome::Fail(_)) {
            return Some(candidate.outcome);
        }
        let slot = if rule.is_conversion() {
            &mut conversion
        } else {
            &mut plain
        };
        let better = match slot {
            Some((anchor, idx, _)) => (candidate.anchor, index) < (*anchor, *idx),
            None => true,
        };
        if better {
            *slot = Some((candidate.anchor, index, candidate.outcome));
        }
    }
    plain.or(conversion).map(|(_, _, outcome)| outcome)
}

/// `TestTextProcessor` -> `text_processor`
pub fn snake_case(name: &str) -> String {
    let stripped = name.strip_prefix("Test").unwrap_or(name);
    let mut out = String::new();
    for (i, c) in stripped.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    if out.is_empty() {
        "case".to_string()
    } else {
        out
    }
}

/// `test_increment` / `inventory_service` -> `TestIncrement` / `TestInventoryService`
pub fn class_name_from(name: &str) -> String {
    let stripped = name.strip_prefix("test_").unwrap_or(name);
    let mut out = String::from("Test");
    for part in stripped.split('_').filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out == "Test" {
        out.push_str("Case");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_strips_test_prefix() {
        assert_eq!(snake_case("TestTextProcessor"), "text_processor");
        assert_eq!(snake_case("TestDB"), "d_b");
        assert_eq!(snake_case("Test"), "case");
    }

    #[test]
    fn class_names_from_test_functions() {
        assert_eq!(class_name_from("test_increment"), "TestIncrement");
        assert_eq!(class_name_from("test_combo"), "TestCombo");
        assert_eq!(class_name_from("test_"), "TestCase");
        assert_eq!(class_name_from("inventory"), "TestInventory");
    }

    #[test]
    fn registry_is_direction_filtered() {
        let to_fixture = registry(Direction::XunitToFixture);
        assert!(to_fixture.iter().any(|r| r.name() == "class-to-functions"));
        assert!(!to_fixture.iter().any(|r| r.name() == "functions-to-class"));
        let to_xunit = registry(Direction::FixtureToXunit);
        assert!(to_xunit.iter().any(|r| r.name() == "functions-to-class"));
        assert!(to_xunit.iter().any(|r| r.name() == "nose-plugin"));
    }
}
