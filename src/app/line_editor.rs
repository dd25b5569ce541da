/// Upper bound for a session display name, in characters.
pub const MAX_NAME_CHARS: usize = 120;

/// Single-line editor backing the rename prompt. The cursor is a char index.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineEditor {
    pub text: String,
    pub cursor_col: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        let mut editor = Self::new();
        editor.insert_str(text);
        editor
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut buffer = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buffer));
    }

    /// Control characters become spaces and runs of spaces collapse, so a
    /// pasted multi-line block still yields a one-line name.
    pub fn insert_str(&mut self, text: &str) {
        let room = MAX_NAME_CHARS.saturating_sub(self.len());
        if room == 0 {
            return;
        }

        let before = self.text.chars().take(self.cursor_col).last();
        let mut last_was_space = before == Some(' ');
        let mut normalized = String::new();
        for ch in text.chars() {
            let ch = if ch.is_control() { ' ' } else { ch };
            if ch == ' ' && last_was_space {
                continue;
            }
            last_was_space = ch == ' ';
            normalized.push(ch);
        }
        let normalized = normalized.chars().take(room).collect::<String>();
        if normalized.is_empty() {
            return;
        }

        let byte_index = self.byte_index(self.cursor_col);
        self.text.insert_str(byte_index, &normalized);
        self.cursor_col += normalized.chars().count();
    }

    pub fn backspace(&mut self) {
        if self.cursor_col == 0 {
            return;
        }
        self.cursor_col -= 1;
        let byte_index = self.byte_index(self.cursor_col);
        self.text.remove(byte_index);
    }

    pub fn delete_forward(&mut self) {
        if self.cursor_col >= self.len() {
            return;
        }
        let byte_index = self.byte_index(self.cursor_col);
        self.text.remove(byte_index);
    }

    /// Ctrl+W: drop the word left of the cursor plus the spaces before it.
    pub fn delete_word_back(&mut self) {
        let chars = self.text.chars().collect::<Vec<_>>();
        let mut start = self.cursor_col.min(chars.len());
        while start > 0 && chars[start - 1] == ' ' {
            start -= 1;
        }
        while start > 0 && chars[start - 1] != ' ' {
            start -= 1;
        }
        let from = self.byte_index(start);
        let to = self.byte_index(self.cursor_col);
        self.text.replace_range(from..to, "");
        self.cursor_col = start;
    }

    /// Ctrl+U: drop everything left of the cursor.
    pub fn clear_to_start(&mut self) {
        let to = self.byte_index(self.cursor_col);
        self.text.replace_range(..to, "");
        self.cursor_col = 0;
    }

    pub fn move_left(&mut self) {
        self.cursor_col = self.cursor_col.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor_col = (self.cursor_col + 1).min(self.len());
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_col = self.len();
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        match self.text.char_indices().nth(char_index) {
            Some((idx, _)) => idx,
            None => self.text.len(),
        }
    }
}
