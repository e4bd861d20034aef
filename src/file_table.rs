// The source file being compiled, read into memory in one go.
// Diagnostics use it to turn byte offsets back into file:line:column.
use std::fs::read_to_string;

use colored::Colorize;

use crate::span::Span;

#[derive(Clone, Debug)]
pub struct SourceFile {
    name: String,
    text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> SourceFile {
        SourceFile {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn open(filename: &str) -> Result<SourceFile, String> {
        match read_to_string(filename) {
            Ok(text) => Ok(SourceFile::new(filename, text)),
            Err(err) => Err(format!(
                "{} {}: {}",
                "error: failed to open file".bright_red(),
                filename,
                err
            )),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn locate(&self, offset: usize) -> Span {
        Span::locate(&self.name, &self.text, offset)
    }
}
