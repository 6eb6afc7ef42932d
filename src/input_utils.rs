//! Line editing for the input box
//!
//! The cursor is a character index. Byte offsets are computed only at the
//! points where the underlying string is spliced, so multi-byte input never
//! lands an edit inside a UTF-8 sequence.

/// Single-line edit buffer backing the input widget.
#[derive(Debug, Default)]
pub struct InputBuffer {
    text: String,
    cursor: usize,
}

impl InputBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position as a character index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self) -> usize {
        byte_index(&self.text, self.cursor)
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.byte_index(), c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.text.remove(self.byte_index());
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            self.text.remove(self.byte_index());
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Replace the contents, placing the cursor at the end.
    pub fn set(&mut self, text: String) {
        self.cursor = text.chars().count();
        self.text = text;
    }

    /// Take the contents, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }
}

/// Byte offset of character index `cursor` in `text`, clamped to the end.
pub fn byte_index(text: &str, cursor: usize) -> usize {
    text.char_indices()
        .nth(cursor)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_after_multibyte_char_lands_on_boundary() {
        let mut buffer = InputBuffer::default();
        buffer.insert('é');
        buffer.insert('a');
        assert_eq!(buffer.text(), "éa");
        assert_eq!(buffer.cursor(), 2);
    }

    #[test]
    fn test_backspace_removes_a_whole_char() {
        let mut buffer = InputBuffer::default();
        buffer.set("José".to_string());
        buffer.backspace();
        assert_eq!(buffer.text(), "Jos");

        // No-op at the start
        buffer.move_home();
        buffer.backspace();
        assert_eq!(buffer.text(), "Jos");
    }

    #[test]
    fn test_cursor_movement_is_clamped_to_chars() {
        let mut buffer = InputBuffer::default();
        buffer.set("héllo".to_string());
        assert_eq!(buffer.cursor(), 5);
        buffer.move_right();
        assert_eq!(buffer.cursor(), 5);

        buffer.move_home();
        buffer.move_right();
        buffer.move_right();
        buffer.insert('x');
        assert_eq!(buffer.text(), "héxllo");
    }

    #[test]
    fn test_delete_removes_char_under_cursor() {
        let mut buffer = InputBuffer::default();
        buffer.set("héllo".to_string());
        buffer.move_home();
        buffer.move_right();
        buffer.delete();
        assert_eq!(buffer.text(), "hllo");

        // No-op at the end
        buffer.move_end();
        buffer.delete();
        assert_eq!(buffer.text(), "hllo");
    }

    #[test]
    fn test_byte_index_clamps_past_the_end() {
        assert_eq!(byte_index("héllo", 2), 3);
        assert_eq!(byte_index("héllo", 99), 6);
    }

    #[test]
    fn test_take_resets_buffer() {
        let mut buffer = InputBuffer::default();
        buffer.set("héllo".to_string());
        assert_eq!(buffer.take(), "héllo");
        assert!(buffer.is_empty());
        assert_eq!(buffer.cursor(), 0);
    }
}
