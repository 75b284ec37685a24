use crate::services::emoji;
use crate::services::markdown::{ParsedDocument, highlight_code_blocks, parse_blocks};
use std::sync::Arc;

#[derive(Clone)]
pub struct PreviewState {
    pub document: Arc<ParsedDocument>,
    pub source_revision: u64,
}

impl PreviewState {
    pub fn new() -> Self {
        Self {
            document: Arc::new(ParsedDocument::default()),
            source_revision: 0,
        }
    }

    /// Publishes a rebuilt document unless a newer revision is already shown.
    pub fn apply(&mut self, revision: u64, document: ParsedDocument) -> bool {
        if revision < self.source_revision {
            return false;
        }
        self.document = Arc::new(document);
        self.source_revision = revision;
        true
    }
}

/// Full preview pipeline: emoji shortcodes, markdown blocks, then code highlighting.
pub fn build_preview(text: &str, theme: &str) -> ParsedDocument {
    let text = emoji::substitute(text);
    let mut document = parse_blocks(&text);
    highlight_code_blocks(&mut document, theme);
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::highlight::DEFAULT_THEME;
    use crate::services::markdown::Block;

    #[test]
    fn pipeline_substitutes_emoji_and_highlights() {
        let doc = build_preview("Ship it :rocket:\n\n```python\nprint(1)\n```\n", DEFAULT_THEME);
        match &doc.blocks[0] {
            Block::Paragraph(runs) => assert_eq!(runs[0].text, "Ship it 🚀"),
            other => panic!("unexpected {other:?}"),
        }
        match &doc.blocks[1] {
            Block::CodeBlock { lines, .. } => assert!(!lines.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut state = PreviewState::new();
        assert!(state.apply(3, build_preview("three", DEFAULT_THEME)));
        assert!(!state.apply(2, build_preview("two", DEFAULT_THEME)));
        assert_eq!(state.source_revision, 3);
        match &state.document.blocks[0] {
            Block::Paragraph(runs) => assert_eq!(runs[0].text, "three"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_text_gives_empty_preview() {
        assert!(build_preview("", DEFAULT_THEME).blocks.is_empty());
    }
}
