use std::fmt::Display;

/// A resolved source location, used for diagnostics only.
/// Tokens carry a plain byte offset; the line and column are recovered by
/// rescanning the buffer from the start when something has to be reported.
// .file is the name of the source file as given on the command line
// .line is the line number of the offset, starting at 1
// .column is the column number of the offset, starting at 1
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Span {
    file: String,
    line: u32,
    column: u32,
}

impl Span {
    pub fn new(file: &str, line: u32, column: u32) -> Self {
        Span {
            file: file.to_string(),
            line,
            column,
        }
    }

    /// Find the line and column of `offset` by walking `text` from its start.
    /// Offsets past the end are clamped to the end of the buffer.
    pub fn locate(file: &str, text: &str, offset: usize) -> Span {
        let offset = offset.min(text.len());
        let mut line = 1;
        let mut column = 1;
        for (index, c) in text.char_indices() {
            if index >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Span::new(file, line, column)
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::Span;

    #[test]
    fn locate_counts_lines_and_columns() {
        let text = "ab\ncd\n\nef";
        assert_eq!(Span::locate("f.b", text, 0), Span::new("f.b", 1, 1));
        assert_eq!(Span::locate("f.b", text, 4), Span::new("f.b", 2, 2));
        assert_eq!(Span::locate("f.b", text, 7), Span::new("f.b", 4, 1));
        assert_eq!(Span::locate("f.b", text, 100), Span::new("f.b", 4, 3));
    }
}
