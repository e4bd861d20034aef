use std::{
    fs, io,
    path::{Path, PathBuf},
    process::Command,
};
use bcc_lib as bcc;

// Reads a `/* key: N */` header comment from a test program
fn header(source: &str, key: &str) -> Option<i32> {
    let pattern = format!("/* {}: ", key);
    let start = source.find(&pattern)? + pattern.len();
    let end = source[start..].find("*/")? + start;
    source[start..end].trim().parse().ok()
}

fn is_b_file(path: &PathBuf) -> bool {
    if let Some("b") = &path.extension().iter().filter_map(|s| s.to_str()).next() {
        true
    } else {
        false
    }
}

// Programs are only assembled and run when the toolchain is installed
fn tools_available() -> bool {
    Command::new("nasm").arg("-v").output().is_ok()
        && Command::new("cc").arg("--version").output().is_ok()
}

// Unique name per test program, test areas run in parallel
fn build_name(path: &PathBuf) -> String {
    let area = path
        .parent()
        .and_then(Path::parent)
        .and_then(Path::file_name)
        .and_then(|s| s.to_str())
        .unwrap_or("area");
    let stem = path.file_stem().unwrap().to_str().unwrap();
    format!("{}-{}", area, stem)
}

fn test_stage<F, G>(
    dir: PathBuf,
    failures: &mut Vec<String>,
    valid: &F,
    invalid: &G,
) -> io::Result<i32>
where
    F: Fn(PathBuf, &mut Vec<String>, &mut i32),
    G: Fn(PathBuf, &mut Vec<String>, &mut i32),
{
    let mut valid_dir = dir.clone();
    let mut invalid_dir = dir.clone();
    valid_dir.push("valid/");
    invalid_dir.push("invalid/");
    let fail_count = test_files(valid_dir.as_path(), failures, valid)?
        + test_files(invalid_dir.as_path(), failures, invalid)?;
    Ok(fail_count)
}

fn test_files<F>(dir: &Path, failures: &mut Vec<String>, test: &F) -> io::Result<i32>
where
    F: Fn(PathBuf, &mut Vec<String>, &mut i32),
{
    let mut fail_count = 0;
    if !dir.is_dir() {
        return Ok(0);
    }
    for file in fs::read_dir(dir)? {
        let file = file?;
        let path = file.path();
        if is_b_file(&path) {
            eprintln!("Testing {}", path.to_str().unwrap());
            test(path, failures, &mut fail_count);
        }
    }
    Ok(fail_count)
}

fn run(program: &str, arguments: &[&str]) -> Result<(), String> {
    let output = Command::new(program)
        .args(arguments)
        .output()
        .map_err(|error| format!("failed to run {}: {}", program, error))?;
    if !output.status.success() {
        return Err(format!(
            "{} failed\n{}",
            program,
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    Ok(())
}

// Assembles, links and runs the program, returning its exit status
fn build_and_run(name: &str, assembly: &str) -> Result<i32, String> {
    let directory = std::env::temp_dir().join("bcc-full-scale");
    fs::create_dir_all(&directory).map_err(|error| error.to_string())?;
    let assembly_path = directory.join(format!("{}.s", name));
    let object_path = directory.join(format!("{}.o", name));
    let executable_path = directory.join(name);
    let assembly_file = assembly_path.to_str().unwrap();
    let object_file = object_path.to_str().unwrap();
    let executable = executable_path.to_str().unwrap();

    fs::write(&assembly_path, assembly).map_err(|error| error.to_string())?;
    run("nasm", &["-felf64", "-o", object_file, assembly_file])?;
    run("cc", &["-o", executable, object_file])?;
    let output = Command::new(executable)
        .output()
        .map_err(|error| format!("running {} failed: {}", executable, error))?;
    output
        .status
        .code()
        .ok_or_else(|| format!("{} was killed by a signal", executable))
}

fn test_valid_full_scale(path: PathBuf, failures: &mut Vec<String>, fail_count: &mut i32) {
    let filename = path.to_str().unwrap().to_string();
    let source = fs::read_to_string(&path).expect("reading test program");
    let compilation = match bcc::compiler::compile(&source) {
        Ok(compilation) => compilation,
        Err(diagnostic) => {
            failures.push(format!("{}: compilation failed: {}", filename, diagnostic));
            *fail_count += 1;
            return;
        }
    };
    let expected = match header(&source, "expect") {
        Some(expected) => expected,
        None => {
            failures.push(format!("{}: missing expect header", filename));
            *fail_count += 1;
            return;
        }
    };
    if !compilation.assembly.contains("global $main\n") {
        failures.push(format!("{}: no main function was emitted", filename));
        *fail_count += 1;
        return;
    }
    if !(0..=255).contains(&expected) {
        failures.push(format!("{}: exit status {} cannot be observed", filename, expected));
        *fail_count += 1;
        return;
    }
    if !tools_available() {
        eprintln!(
            "skipping run of {}: nasm or cc not found, expecting {} unchecked",
            filename, expected
        );
        return;
    }
    match build_and_run(&build_name(&path), &compilation.assembly) {
        Ok(status) if status == expected => (),
        Ok(status) => {
            failures.push(format!(
                "{}: exited with {}, expected {}",
                filename, status, expected
            ));
            *fail_count += 1;
        }
        Err(error) => {
            failures.push(format!("{}: {}", filename, error));
            *fail_count += 1;
        }
    }
}

fn test_invalid_full_scale(path: PathBuf, failures: &mut Vec<String>, fail_count: &mut i32) {
    let filename = path.to_str().unwrap().to_string();
    let source = fs::read_to_string(&path).expect("reading test program");
    let expected = header(&source, "exit").unwrap_or(1);
    match bcc::compiler::compile(&source) {
        Err(diagnostic) if diagnostic.exit_code() == expected => (),
        Err(diagnostic) => {
            failures.push(format!(
                "{}: failed with exit code {} ({}), expected {}",
                filename,
                diagnostic.exit_code(),
                diagnostic,
                expected
            ));
            *fail_count += 1;
        }
        Ok(_) => {
            failures.push(format!(
                "Invalid example did not produce error: {}",
                filename
            ));
            *fail_count += 1;
        }
    }
}

macro_rules! tests {
    ($($name:ident: ($file:literal, $valid:ident, $invalid:ident))*) => {
        $(
            #[test]
            fn $name() {
                let mut failures = Vec::<String>::new();
                let home_dir = env!("CARGO_MANIFEST_DIR");
                let test_dir = format!("{}/tests/{}", home_dir,$file);
                let test_path = Path::new(&test_dir);
                let fail_count = test_stage(
                    test_path.to_path_buf(),
                    &mut failures,
                    &$valid,
                    &$invalid,
                )
                .expect("File error");
                let mut string = String::new();
                for failure in failures {
                    string.push_str(&format!("{}\n", failure));
                }
                assert_eq!(
                    fail_count, 0,
                    "Failures occured during testing\n {}",
                    string
                );
            }
        )*
    };
}

tests! {
    full_scale_lexer: ("src/lexer",test_valid_full_scale,test_invalid_full_scale)
    full_scale_expressions: ("src/expressions",test_valid_full_scale,test_invalid_full_scale)
    full_scale_statements: ("src/statements",test_valid_full_scale,test_invalid_full_scale)
    full_scale_functions: ("src/functions",test_valid_full_scale,test_invalid_full_scale)
    full_scale_globals: ("src/globals",test_valid_full_scale,test_invalid_full_scale)
}

#[test]
fn headers_are_read() {
    assert_eq!(header("/* expect: 42 */\nmain() {}", "expect"), Some(42));
    assert_eq!(header("/* exit: 2 */", "exit"), Some(2));
    assert_eq!(header("main() {}", "expect"), None);
}
