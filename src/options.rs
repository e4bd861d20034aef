use clap::{ArgGroup, Args, Parser};

use crate::driver::Stage;

#[derive(Clone, Debug, Parser)]
#[clap(author, version, about)]
pub struct Options {
    /// Input files
    #[clap(required = true)]
    pub input: Vec<String>,

    /// Output file
    #[clap(short, long, default_value_t = String::from("./a.out"))]
    pub output: String,

    #[clap(flatten)]
    pub last_stage: OptionStage,

    /// Print the tokens of every B input and stop
    #[clap(long = "dump-tokens")]
    pub dump_tokens: bool,

    /// Log more, may be repeated
    #[clap(short, long, parse(from_occurrences))]
    pub verbose: u64,

    /// Assembler invoked on the generated code
    #[clap(long, default_value_t = String::from("nasm"))]
    pub assembler: String,

    /// Compiler driver used to link the objects
    #[clap(long, default_value_t = String::from("cc"))]
    pub linker: String,
}

#[derive(Clone, Debug, Args)]
#[clap(group(
    ArgGroup::new("stage")
        .required(false)
        .args(&["obj", "asm"])
))]
pub struct OptionStage {
    /// Compiles and assembles code, but does not link
    #[clap(short = 'c')]
    pub obj: bool,

    /// Compiles code, but does not assemble
    #[clap(short = 'S')]
    pub asm: bool,
}

impl OptionStage {
    /// The last stage the driver runs.
    pub fn stage(&self) -> Stage {
        if self.asm {
            Stage::Asm
        } else if self.obj {
            Stage::Obj
        } else {
            Stage::Exe
        }
    }
}

/// Gets command line options and input using clap.
pub fn get() -> Options {
    Options::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = Options::try_parse_from(&["bcc", "hello.b"]).unwrap();
        assert_eq!(options.input, vec!["hello.b".to_string()]);
        assert_eq!(options.output, "./a.out");
        assert_eq!(options.last_stage.stage(), Stage::Exe);
        assert_eq!(options.assembler, "nasm");
        assert_eq!(options.linker, "cc");
        assert_eq!(options.verbose, 0);
    }

    #[test]
    fn stage_flags_and_verbosity() {
        let options = Options::try_parse_from(&["bcc", "-S", "-vv", "a.b", "b.b"]).unwrap();
        assert_eq!(options.last_stage.stage(), Stage::Asm);
        assert_eq!(options.verbose, 2);
        assert_eq!(options.input.len(), 2);
    }

    #[test]
    fn stage_flags_are_exclusive() {
        assert!(Options::try_parse_from(&["bcc", "-S", "-c", "a.b"]).is_err());
        assert!(Options::try_parse_from(&["bcc"]).is_err());
    }
}
