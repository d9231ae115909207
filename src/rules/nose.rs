//! Plugin-dialect handling: nose/nose2 constructs are transported verbatim
//! beneath a single annotation on the import

use super::{Candidate, RewriteRule, RuleCtx, RuleOutcome};
use crate::annotate::AnnotationSite;
use crate::model::ModuleModel;
use crate::Category;

pub struct NoseImportRule;

impl RewriteRule for NoseImportRule {
    fn name(&self) -> &'static str {
        "nose-plugin"
    }

    fn direction(&self) -> Option<crate::Direction> {
        None
    }

    fn find(&self, module: &ModuleModel, ctx: &RuleCtx) -> Option<Candidate> {
        let import = module
            .imports
            .iter()
            .find(|i| i.is_nose && !i.annotated)?;
        let target = ctx.direction.target_framework();
        let site = AnnotationSite::new(
            import.node.start_byte(),
            Category::UnconvertibleNosePlugin,
            format!("nose2 plugin has no direct {} equivalent", target),
            format!(
                "Find a {} plugin or built-in feature that provides equivalent functionality",
                target
            ),
        );
        Some(Candidate {
            anchor: import.node.start_byte(),
            outcome: RuleOutcome::Reject(vec![site]),
        })
    }
}
