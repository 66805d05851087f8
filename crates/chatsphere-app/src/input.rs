//! Terminal-agnostic keyboard input and line editing.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) enabling deterministic simulation testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key (submit line).
    Enter,
    /// Backspace key (delete character before cursor).
    Backspace,
    /// Delete key (delete character at cursor).
    Delete,
    /// Escape key (quit).
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key (scroll chat back).
    Up,
    /// Down arrow key (scroll chat forward).
    Down,
    /// Home key (cursor to start).
    Home,
    /// End key (cursor to end).
    End,
}

/// Result of feeding a key to [`InputState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Buffer or cursor changed
    Changed,
    /// Nothing to do
    Unchanged,
    /// Enter on a non-empty line. The buffer has been cleared.
    Submitted(String),
}

/// Single-line input buffer with a cursor.
///
/// The cursor counts characters, not bytes, so multi-byte input edits
/// correctly.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Text buffer for user input.
    buffer: String,
    /// Cursor position in characters.
    cursor: usize,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text in the input buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Apply an editing key.
    ///
    /// Keys that are not editing keys (Esc, Up, Down) are `Unchanged`.
    pub fn handle_key(&mut self, key: KeyInput) -> Edit {
        let len = self.buffer.chars().count();

        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
                Edit::Changed
            },
            KeyInput::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
                Edit::Changed
            },
            KeyInput::Delete if self.cursor < len => {
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
                Edit::Changed
            },
            KeyInput::Left if self.cursor > 0 => {
                self.cursor -= 1;
                Edit::Changed
            },
            KeyInput::Right if self.cursor < len => {
                self.cursor += 1;
                Edit::Changed
            },
            KeyInput::Home if self.cursor > 0 => {
                self.cursor = 0;
                Edit::Changed
            },
            KeyInput::End if self.cursor < len => {
                self.cursor = len;
                Edit::Changed
            },
            KeyInput::Enter if len > 0 => {
                self.cursor = 0;
                Edit::Submitted(std::mem::take(&mut self.buffer))
            },
            _ => Edit::Unchanged,
        }
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(i, _)| i)
    }
}
