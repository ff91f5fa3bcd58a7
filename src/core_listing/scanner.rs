/// Splits a listing line on spaces while keeping track of what is left.
///
/// Each call to `next_field` skips leading spaces and consumes exactly one
/// separator after the field, so `remaining` still holds file names that
/// contain spaces.
pub struct Scanner<'a> {
    line: &'a str,
    position: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { line, position: 0 }
    }

    /// The next space-separated field, or `""` at the end of the line.
    pub fn next_field(&mut self) -> &'a str {
        let bytes = self.line.as_bytes();

        while self.position < bytes.len() && bytes[self.position] == b' ' {
            self.position += 1;
        }

        let start = self.position;
        while self.position < bytes.len() {
            if bytes[self.position] == b' ' {
                let end = self.position;
                self.position += 1;
                return &self.line[start..end];
            }
            self.position += 1;
        }

        &self.line[start..]
    }

    /// Up to `count` fields; stops early at the end of the line.
    pub fn next_fields(&mut self, count: usize) -> Vec<&'a str> {
        let mut fields = Vec::with_capacity(count);
        for _ in 0..count {
            let field = self.next_field();
            if field.is_empty() {
                break;
            }
            fields.push(field);
        }
        fields
    }

    pub fn remaining(&self) -> &'a str {
        &self.line[self.position..]
    }
}
