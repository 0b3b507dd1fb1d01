/*!
 * Affinity-ordered synthesis queue.
 *
 * The synthesis backend holds one character's model pair at a time, so
 * switching characters costs a model reload. The queue is FIFO within a
 * character; across characters, a task for the currently loaded character
 * is rotated to the front ahead of a head task that would force a reload.
 */

use std::collections::VecDeque;

use crate::translation::TranslateResult;

/// FIFO queue of completed translations awaiting synthesis, with
/// character-affinity rotation on pop
#[derive(Debug, Default)]
pub struct SynthesisQueue {
    items: VecDeque<TranslateResult>,
}

impl SynthesisQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self { items: VecDeque::new() }
    }

    /// Append a completed translation
    pub fn push(&mut self, result: TranslateResult) {
        self.items.push_back(result);
    }

    /// Number of queued tasks
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pop the next task to synthesize.
    ///
    /// Pops the head, unless the head's character differs from the loaded
    /// one and a task for the loaded character waits further back; that
    /// task is rotated to the front instead, avoiding a model reload.
    pub fn pop_for(&mut self, loaded_character: Option<&str>) -> Option<TranslateResult> {
        let head = self.items.front()?;
        let Some(loaded) = loaded_character else {
            return self.items.pop_front();
        };

        if head.task.character == loaded {
            return self.items.pop_front();
        }

        let affine = self
            .items
            .iter()
            .position(|item| item.task.character == loaded);
        match affine {
            Some(position) => self.items.remove(position),
            None => self.items.pop_front(),
        }
    }
}
