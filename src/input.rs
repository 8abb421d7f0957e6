use unicode_width::UnicodeWidthStr;

/// Single-line text buffer with a char-based cursor, shared by every
/// editable field (todo input, search bar, contact fields).
#[derive(Debug, Default)]
pub struct Input {
    value: String,
    char_index: usize,
}

impl Input {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.char_index = 0;
    }

    pub fn enter_char(&mut self, new_char: char) {
        let index = self.byte_index();
        self.value.insert(index, new_char);
        self.move_right();
    }

    /// Removes the char left of the cursor. Works on char positions rather
    /// than `String::remove` so multi-byte boundaries need no special care.
    pub fn delete_char(&mut self) {
        if self.char_index == 0 {
            return;
        }
        let before = self.value.chars().take(self.char_index - 1);
        let after = self.value.chars().skip(self.char_index);
        self.value = before.chain(after).collect();
        self.move_left();
    }

    pub fn move_left(&mut self) {
        self.char_index = self.clamp_cursor(self.char_index.saturating_sub(1));
    }

    pub fn move_right(&mut self) {
        self.char_index = self.clamp_cursor(self.char_index.saturating_add(1));
    }

    /// Display columns between the start of the value and the cursor, for
    /// terminal cursor placement. Wide chars count as two columns.
    pub fn cursor_offset(&self) -> u16 {
        self.value[..self.byte_index()].width() as u16
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.char_index)
            .unwrap_or(self.value.len())
    }

    fn clamp_cursor(&self, new_pos: usize) -> usize {
        new_pos.clamp(0, self.value.chars().count())
    }

    #[cfg(test)]
    pub fn with_value(value: &str) -> Self {
        Self {
            char_index: value.chars().count(),
            value: value.to_string(),
        }
    }
}
