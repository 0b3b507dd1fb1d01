/*!
 * Surrounding-dialogue context for translation.
 *
 * A small window of statements before and after the current line is
 * formatted and attached to translation and selection requests so the
 * collaborator sees the conversational flow, not an isolated sentence.
 */

use crate::script_codec::DialogueStatement;

/// Window sizes for context extraction
#[derive(Debug, Clone)]
pub struct ContextWindow {
    /// Number of preceding statements to include
    pub before: usize,

    /// Number of following statements to include
    pub after: usize,
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self { before: 4, after: 2 }
    }
}

impl ContextWindow {
    /// Create a window with explicit sizes
    pub fn new(before: usize, after: usize) -> Self {
        Self { before, after }
    }

    /// Format the dialogue surrounding `statement_index` as one statement
    /// per line. Returns `None` when the window is empty (single-statement
    /// scripts, or a zero-sized window).
    pub fn build(
        &self,
        statements: &[DialogueStatement],
        statement_index: usize,
    ) -> Option<String> {
        let position = statements
            .iter()
            .position(|s| s.statement_index == statement_index)?;

        let start = position.saturating_sub(self.before);
        let end = (position + self.after + 1).min(statements.len());

        let lines: Vec<String> = statements[start..end]
            .iter()
            .filter(|s| s.statement_index != statement_index)
            .map(|s| format!("{}: {}", s.character, s.text))
            .collect();

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}
