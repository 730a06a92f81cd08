/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single text field with a character cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    /// Field holding `value` with the cursor at the end.
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn set(&mut self, value: &str) {
        *self = Self::with_value(value);
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    /// Start of the current line.
    pub fn home(&mut self) {
        let before: Vec<char> = self.value.chars().take(self.cursor).collect();
        self.cursor = before
            .iter()
            .rposition(|&c| c == '\n')
            .map(|i| i + 1)
            .unwrap_or(0);
    }

    /// End of the current line.
    pub fn end(&mut self) {
        let rest = self.value.chars().skip(self.cursor).take_while(|&c| c != '\n').count();
        self.cursor += rest;
    }

    /// (row, column) of the cursor, in characters.
    pub fn cursor_position(&self) -> (usize, usize) {
        let before: String = self.value.chars().take(self.cursor).collect();
        let row = before.matches('\n').count();
        let col = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0);
        (row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace_multibyte() {
        let mut input = TextInput::with_value("héllo");
        input.left();
        input.backspace();
        assert_eq!(input.value, "hélo");
        input.insert('→');
        assert_eq!(input.value, "hél→o");
        assert_eq!(input.cursor, 4);
    }

    #[test]
    fn test_home_end_stay_on_line() {
        let mut input = TextInput::with_value("first\nsecond");
        input.home();
        assert_eq!(input.cursor_position(), (1, 0));
        input.end();
        assert_eq!(input.cursor_position(), (1, 6));
    }

    #[test]
    fn test_delete_at_end_is_noop() {
        let mut input = TextInput::with_value("ab");
        input.delete();
        assert_eq!(input.value, "ab");
    }
}
