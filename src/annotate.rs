//! Unconvertibility annotator: structured HAMLET-TODO comment blocks
//!
//! A block is three comment lines injected as leading trivia of the target
//! node. Running the engine twice never re-emits an existing block; the
//! leading comment block of a node is scanned for the category tag first.

use crate::edit::Edit;
use crate::parser::ast_helpers::{indent_at, leading_comment_start, line_end, line_start};
use crate::{Category, Diagnostic};

/// Tag that opens every annotation block
pub const TODO_TAG: &str = "HAMLET-TODO";

/// A single annotation request: a block placed above the line containing
/// `node_start`. The Original line quotes the trimmed first line of the
/// node, or the supplied override when the node will be rewritten after
/// annotation (a test signature gaining `self`, for instance).
#[derive(Debug, Clone)]
pub struct AnnotationSite {
    pub node_start: usize,
    pub category: Category,
    pub summary: String,
    pub guidance: String,
    pub original: Option<String>,
}

impl AnnotationSite {
    pub fn new(
        node_start: usize,
        category: Category,
        summary: impl Into<String>,
        guidance: impl Into<String>,
    ) -> Self {
        Self {
            node_start,
            category,
            summary: summary.into(),
            guidance: guidance.into(),
            original: None,
        }
    }

    /// Quote this text on the Original line instead of the source slice
    pub fn with_original(mut self, original: impl Into<String>) -> Self {
        self.original = Some(original.into());
        self
    }
}

/// True if the contiguous comment block directly above the node already
/// carries an annotation of this category
pub fn annotated_with(source: &str, node_start: usize, category: Category) -> bool {
    let tag = format!("# {} [{}]", TODO_TAG, category);
    leading_block(source, node_start).contains(&tag)
}

/// True if any annotation block directly precedes the node
pub fn has_any_annotation(source: &str, node_start: usize) -> bool {
    leading_block(source, node_start).contains(&format!("# {} [", TODO_TAG))
}

fn leading_block(source: &str, node_start: usize) -> &str {
    let node_line = line_start(source, node_start);
    let block_start = leading_comment_start(source, node_start);
    &source[block_start..node_line]
}

/// Render the block text for one site (without the separator)
fn render_block(source: &str, site: &AnnotationSite) -> String {
    let indent = indent_at(source, site.node_start);
    let first_line_end = line_end(source, site.node_start);
    let original = match &site.original {
        Some(text) => text.as_str(),
        None => source[site.node_start..first_line_end].trim_end(),
    };
    format!(
        "{i}# {tag} [{cat}]: {summary}\n{i}# Original: {original}\n{i}# Manual action required: {guidance}\n",
        i = indent,
        tag = TODO_TAG,
        cat = site.category,
        summary = site.summary,
        original = original,
        guidance = site.guidance,
    )
}

/// Build the edits and diagnostics for a set of annotation sites.
/// Successive blocks above the same anchor are separated by a blank line.
pub fn annotation_action(
    source: &str,
    sites: &[AnnotationSite],
) -> (Vec<Edit>, Vec<Diagnostic>) {
    let mut edits = Vec::new();
    let mut diagnostics = Vec::new();
    for site in sites {
        let insert_pos = line_start(source, site.node_start);
        let mut text = render_block(source, site);
        // A block already sitting directly above gets a blank separator line
        if leading_block(source, site.node_start).contains(TODO_TAG) {
            text = format!("\n{}", text);
        }
        edits.push(Edit::insert(insert_pos, text));
        let location = crate::parser::ast_helpers::node_location_at(source, site.node_start);
        diagnostics.push(Diagnostic {
            category: site.category,
            location,
            message: site.summary.clone(),
        });
    }
    (edits, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply_edits;

    #[test]
    fn block_wire_form() {
        let src = "@pytest.mark.parametrize(\"x\", [1, 2])\ndef test_x(x):\n    assert x\n";
        let site = AnnotationSite::new(
            0,
            Category::UnconvertibleParametrize,
            "@pytest.mark.parametrize has no direct unittest equivalent",
            "Use subTest() or create individual test methods for each parameter set",
        );
        let (edits, diags) = annotation_action(src, &[site]);
        let out = apply_edits(src, &edits);
        assert!(out.starts_with(
            "# HAMLET-TODO [UNCONVERTIBLE-PARAMETRIZE]: @pytest.mark.parametrize has no direct unittest equivalent\n\
             # Original: @pytest.mark.parametrize(\"x\", [1, 2])\n\
             # Manual action required: Use subTest() or create individual test methods for each parameter set\n\
             @pytest.mark.parametrize"
        ));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].category, Category::UnconvertibleParametrize);
    }

    #[test]
    fn indented_anchor_gets_indented_block() {
        let src = "class T:\n    def test_x(self, tmp_path):\n        pass\n";
        let pos = src.find("def test_x").unwrap();
        let site = AnnotationSite::new(
            pos,
            Category::UnconvertibleTmpPath,
            "tmp_path fixture has no direct unittest equivalent",
            "Use tempfile.mkdtemp() in setUp/tearDown",
        );
        let (edits, _) = annotation_action(src, &[site]);
        let out = apply_edits(src, &edits);
        assert!(out.contains("\n    # HAMLET-TODO [UNCONVERTIBLE-TMPPATH]:"));
        assert!(out.contains("\n    # Original: def test_x(self, tmp_path):\n"));
    }

    #[test]
    fn annotated_with_detects_existing_block() {
        let src = "# HAMLET-TODO [UNCONVERTIBLE-PARAMETRIZE]: x\n# Original: y\n# Manual action required: z\n@dec\ndef test_a():\n    pass\n";
        let pos = src.find("@dec").unwrap();
        assert!(annotated_with(
            src,
            pos,
            Category::UnconvertibleParametrize
        ));
        assert!(!annotated_with(src, pos, Category::UnconvertibleTmpPath));
        assert!(has_any_annotation(src, pos));
    }

    #[test]
    fn second_block_on_same_anchor_gets_blank_separator() {
        let src = "# HAMLET-TODO [UNCONVERTIBLE-MONKEYPATCH]: a\n# Original: b\n# Manual action required: c\ndef test_a(monkeypatch, capsys):\n    pass\n";
        let pos = src.find("def test_a").unwrap();
        let site = AnnotationSite::new(
            pos,
            Category::UnconvertibleCapture,
            "pytest capture fixtures have no direct unittest equivalent",
            "Use contextlib.redirect_stdout or unittest.mock to capture output",
        );
        let (edits, _) = annotation_action(src, &[site]);
        let out = apply_edits(src, &edits);
        assert!(out.contains("# Manual action required: c\n\n# HAMLET-TODO [UNCONVERTIBLE-CAPTURE]"));
    }
}
