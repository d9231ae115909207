//! Byte-span text edits, applied bottom-up so earlier offsets stay valid

/// Half-open byte range into the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span for pure insertions
    pub fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn of(node: &tree_sitter::Node) -> Self {
        Self {
            start: node.start_byte(),
            end: node.end_byte(),
        }
    }
}

/// A single replacement: the span is replaced by the text
#[derive(Debug, Clone)]
pub struct Edit {
    pub span: Span,
    pub replacement: String,
}

impl Edit {
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn insert(pos: usize, text: impl Into<String>) -> Self {
        Self {
            span: Span::at(pos),
            replacement: text.into(),
        }
    }

    pub fn delete(span: Span) -> Self {
        Self {
            span,
            replacement: String::new(),
        }
    }
}

/// Apply a set of non-overlapping edits. Edits are applied from the bottom of
/// the file upward so byte offsets of pending edits remain valid.
pub fn apply_edits(source: &str, edits: &[Edit]) -> String {
    if edits.is_empty() {
        return source.to_string();
    }
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by(|a, b| (b.span.start, b.span.end).cmp(&(a.span.start, a.span.end)));

    let mut out = source.to_string();
    for edit in sorted {
        if edit.span.start <= edit.span.end && edit.span.end <= out.len() {
            out.replace_range(edit.span.start..edit.span.end, &edit.replacement);
        }
    }
    out
}

/// Apply absolute-coordinate edits that all fall inside `span` to the slice
/// of the source covered by `span`, returning the rewritten slice.
pub fn rewrite_slice(source: &str, span: Span, edits: &[Edit]) -> String {
    let slice = &source[span.start..span.end];
    let shifted: Vec<Edit> = edits
        .iter()
        .filter(|e| e.span.start >= span.start && e.span.end <= span.end)
        .map(|e| Edit {
            span: Span::new(e.span.start - span.start, e.span.end - span.start),
            replacement: e.replacement.clone(),
        })
        .collect();
    apply_edits(slice, &shifted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_single_replacement() {
        let edits = vec![Edit::replace(Span::new(4, 9), "world")];
        assert_eq!(apply_edits("say hello", &edits), "say world");
    }

    #[test]
    fn apply_preserves_offsets_bottom_up() {
        let src = "aaa bbb ccc";
        let edits = vec![
            Edit::replace(Span::new(0, 3), "x"),
            Edit::replace(Span::new(8, 11), "zzzz"),
        ];
        assert_eq!(apply_edits(src, &edits), "x bbb zzzz");
    }

    #[test]
    fn insert_and_delete() {
        let src = "one two three";
        let edits = vec![
            Edit::insert(0, ">> "),
            Edit::delete(Span::new(3, 7)),
        ];
        assert_eq!(apply_edits(src, &edits), ">> one three");
    }

    #[test]
    fn empty_edit_list_is_identity() {
        assert_eq!(apply_edits("unchanged", &[]), "unchanged");
    }
}
