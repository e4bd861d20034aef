use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use colored::Colorize;

use crate::compiler;
use crate::options::Options;

#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum Stage {
    Exe,
    Obj,
    Asm,
    B,
}

/// Derive the starting stage from the filename
fn filename2stage(filename: &str) -> Stage {
    let extension = Path::new(filename)
        .extension()
        .and_then(OsStr::to_str)
        .unwrap_or("");
    match extension {
        "b" => Stage::B,
        "s" | "asm" => Stage::Asm,
        _ => Stage::Obj,
    }
}

// Runs an external tool, its output is logged and a failure is reported
fn run(program: &str, arguments: &[&str]) -> Result<(), i32> {
    log::info!("running {} {}", program, arguments.join(" "));
    let output = Command::new(program).args(arguments).output().map_err(|error| {
        eprintln!("{}", format!("failed to run {}: {}", program, error).bright_red());
        1
    })?;
    log::debug!(
        "status {}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    if !output.status.success() {
        eprint!("{}", String::from_utf8_lossy(&output.stderr));
        eprintln!("{}", format!("{} failed with {}", program, output.status).bright_red());
        return Err(1);
    }
    Ok(())
}

/// Runs every input through the stages up to the requested one and links
/// the resulting objects into one executable.
/// Returns the exit code of the first failure.
pub fn drive(options: Options) -> Result<(), i32> {
    log::info!("driver started");
    let last_stage = options.last_stage.stage();
    let mut objects = Vec::new();

    for filename in &options.input {
        let file_stem = Path::new(filename)
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or(filename)
            .to_string();
        let begin_stage = filename2stage(filename);
        log::debug!("Going from {:?} to {:?}", begin_stage, last_stage);

        if options.dump_tokens {
            if begin_stage == Stage::B {
                compiler::dump_tokens(filename)?;
            }
            continue;
        }

        let mut next_filename = filename.clone();
        if begin_stage >= Stage::B && last_stage < Stage::B {
            log::info!("Compiler started");
            let assembler_filename = "./".to_string() + &file_stem + ".s";
            compiler::compile_file(&next_filename, &assembler_filename)?;
            next_filename = assembler_filename;
            log::info!("Compiler finished");
        }
        if begin_stage >= Stage::Asm && last_stage < Stage::Asm {
            log::info!("Assembler started");
            let object_filename = "./".to_string() + &file_stem + ".o";
            run(
                &options.assembler,
                &["-felf64", "-o", &object_filename, &next_filename],
            )?;
            next_filename = object_filename;
        }
        if last_stage < Stage::Obj {
            objects.push(next_filename);
        }
    }

    if !objects.is_empty() {
        log::info!("Linker started");
        let mut arguments = vec!["-o", options.output.as_str()];
        arguments.extend(objects.iter().map(String::as_str));
        run(&options.linker, &arguments)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_follow_extensions() {
        assert_eq!(filename2stage("hello.b"), Stage::B);
        assert_eq!(filename2stage("dir/hello.s"), Stage::Asm);
        assert_eq!(filename2stage("hello.asm"), Stage::Asm);
        assert_eq!(filename2stage("hello.o"), Stage::Obj);
        assert_eq!(filename2stage("hello"), Stage::Obj);
        assert!(Stage::Exe < Stage::Obj && Stage::Asm < Stage::B);
    }
}
