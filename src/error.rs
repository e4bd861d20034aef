use std::fmt::Display;

use colored::Colorize;

use crate::file_table::SourceFile;

/// The class of a diagnostic. Everything except `Warning` aborts compilation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Semantic,
    Warning,
}

/// A single diagnostic anchored at a byte offset into the source buffer.
/// The line and column are only computed when the diagnostic is rendered.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub at: usize,
    pub message: String,
    pub note: Option<(usize, String)>,
}

pub type CompileResult<T> = Result<T, Diagnostic>;

impl Diagnostic {
    pub fn new(kind: ErrorKind, at: usize, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            kind,
            at,
            message: message.into(),
            note: None,
        }
    }

    /// Attach a `note:` line pointing somewhere else in the source,
    /// used for unbalanced delimiters and redefinitions.
    pub fn with_note(mut self, at: usize, message: impl Into<String>) -> Diagnostic {
        self.note = Some((at, message.into()));
        self
    }

    // 2 for syntax errors, 1 for every other fatal error
    pub fn exit_code(&self) -> i32 {
        match self.kind {
            ErrorKind::Syntax => 2,
            ErrorKind::Lexical | ErrorKind::Semantic => 1,
            ErrorKind::Warning => 0,
        }
    }

    pub fn render(&self, source: &SourceFile) -> String {
        let label = match self.kind {
            ErrorKind::Warning => format!("warning: {}", self.message.purple()),
            _ => format!("error: {}", self.message.red()),
        };
        let mut result = format!("{}: {}", source.locate(self.at), label);
        if let Some((at, note)) = &self.note {
            result.push_str(&format!("\n{}: note: {}", source.locate(*at), note));
        }
        result
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} at offset {}: {}", self.kind, self.at, self.message)
    }
}

#[macro_export]
macro_rules! error {
    ($kind:ident, $at:expr, $( $exp:expr ),*) => {
        $crate::error::Diagnostic::new(
            $crate::error::ErrorKind::$kind,
            $at,
            format!($($exp,)*),
        )
    };
}

#[macro_export]
macro_rules! warning {
    ($at:expr, $( $exp:expr ),*) => {
        $crate::error::Diagnostic::new(
            $crate::error::ErrorKind::Warning,
            $at,
            format!($($exp,)*),
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        assert_eq!(crate::error!(Syntax, 0, "expected {}", ";").exit_code(), 2);
        assert_eq!(crate::error!(Semantic, 0, "undefined").exit_code(), 1);
        assert_eq!(crate::error!(Lexical, 0, "bad escape").exit_code(), 1);
        assert_eq!(crate::warning!(0, "ignored").exit_code(), 0);
    }

    #[test]
    fn render_points_at_line_and_column() {
        colored::control::set_override(false);
        let source = SourceFile::new("test.b", "main() {\n  return(x);\n}\n");
        let diagnostic = crate::error!(Semantic, 18, "'{}' has not been defined yet", "x")
            .with_note(7, "curly was open here");
        assert_eq!(
            diagnostic.render(&source),
            "test.b:2:10: error: 'x' has not been defined yet\ntest.b:1:8: note: curly was open here"
        );
    }
}
