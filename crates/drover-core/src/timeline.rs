//! Append-only snapshot history with a movable cursor.
//!
//! Orchestration layers hold the current state plus a [`Timeline`] of
//! every state they have produced. Stepping back only moves the cursor;
//! recording a new state from a rewound cursor discards the abandoned
//! future first, so the history is always one linear sequence.

/// Linear history of snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline<S> {
    frames: Vec<S>,
    cursor: usize,
}

impl<S> Timeline<S> {
    /// Start a history at `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            frames: vec![initial],
            cursor: 0,
        }
    }

    /// Snapshot under the cursor.
    pub fn current(&self) -> &S {
        // `frames` is never empty and `cursor` always indexes into it.
        &self.frames[self.cursor]
    }

    /// Cursor position, `0` for the initial snapshot.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; a timeline holds at least its initial snapshot.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Record `next` after the cursor and move onto it.
    pub fn record(&mut self, next: S) {
        self.frames.truncate(self.cursor + 1);
        self.frames.push(next);
        self.cursor += 1;
    }

    /// Move the cursor one snapshot back. Returns `None` at the start.
    pub fn back(&mut self) -> Option<&S> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.frames[self.cursor])
    }

    /// Move the cursor one recorded snapshot forward, if one exists.
    pub fn forward(&mut self) -> Option<&S> {
        if self.cursor + 1 >= self.frames.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.frames[self.cursor])
    }

    /// Drop all history and restart at `initial`.
    pub fn reset(&mut self, initial: S) {
        self.frames.clear();
        self.frames.push(initial);
        self.cursor = 0;
    }

    /// All snapshots, oldest first.
    pub fn frames(&self) -> &[S] {
        &self.frames
    }
}
