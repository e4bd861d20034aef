use std::fs;

use colored::Colorize;

use crate::backend::{self, Backend};
use crate::error::{CompileResult, Diagnostic};
use crate::file_table::SourceFile;
use crate::lexer::Lexer;
use crate::parser::Parser;

const ARCHITECTURE: &str = "amd64";

/// The result of compiling one B source.
#[derive(Clone, Debug)]
pub struct Compilation {
    pub assembly: String,
    pub warnings: Vec<Diagnostic>,
}

/// Compiles B source text to assembly for the given backend.
pub fn compile_with(source: &str, backend: Box<dyn Backend>) -> CompileResult<Compilation> {
    log::info!("compiling {} bytes for {}", source.len(), backend.backend_type());
    let (assembly, warnings) = Parser::new(source, backend).parse()?;
    Ok(Compilation { assembly, warnings })
}

pub fn compile(source: &str) -> CompileResult<Compilation> {
    let backend = backend::get_backend(ARCHITECTURE)
        .map_err(|message| Diagnostic::new(crate::error::ErrorKind::Semantic, 0, message))?;
    compile_with(source, backend)
}

/// Compiles `input` and writes the assembly to `output`.
/// Diagnostics are printed; the error is the process exit code.
pub fn compile_file(input: &str, output: &str) -> Result<(), i32> {
    let file = SourceFile::open(input).map_err(|message| {
        eprintln!("{}", message);
        1
    })?;

    let compilation = compile(file.text()).map_err(|diagnostic| {
        eprintln!("{}", diagnostic.render(&file));
        diagnostic.exit_code()
    })?;
    for warning in &compilation.warnings {
        eprintln!("{}", warning.render(&file));
    }

    fs::write(output, compilation.assembly).map_err(|error| {
        eprintln!(
            "{} {}: {}",
            "error: failed to write".bright_red(),
            output,
            error
        );
        1
    })
}

// One line per token: position, token and the source text it covers
fn token_listing(file: &SourceFile) -> CompileResult<Vec<String>> {
    let tokens = Lexer::new(file.text()).tokenize()?;
    let lines = tokens
        .iter()
        .map(|token| {
            let text = file
                .text()
                .get(token.offset()..token.offset() + token.length())
                .unwrap_or("");
            format!("{}: {} `{}`", file.locate(token.offset()), token, text)
        })
        .collect();
    Ok(lines)
}

/// Prints every token of `input` with its position.
pub fn dump_tokens(input: &str) -> Result<(), i32> {
    let file = SourceFile::open(input).map_err(|message| {
        eprintln!("{}", message);
        1
    })?;
    let lines = token_listing(&file).map_err(|diagnostic| {
        eprintln!("{}", diagnostic.render(&file));
        diagnostic.exit_code()
    })?;
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}
