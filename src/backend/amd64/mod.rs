// Appends one line of assembly to the function buffer, or to the program
// text outside of functions
macro_rules! emit {
    ($self:ident, $($arg:tt)*) => {{
        use std::fmt::Write;
        let _ = writeln!($self.text(), $($arg)*);
    }};
}

mod backend;
mod emit;
mod registers;

/// NASM code generator for x86-64 ELF targets.
///
/// Every value lives in a frame slot; `rax` and `rcx` are the only scratch
/// registers apart from the argument registers around a call.
pub struct BackendAMD64 {
    output: String,
    body: String,
    function_name: String,
    function_id: usize,
    in_function: bool,
}

impl BackendAMD64 {
    pub fn new() -> BackendAMD64 {
        BackendAMD64 {
            output: String::new(),
            body: String::new(),
            function_name: String::new(),
            function_id: 0,
            in_function: false,
        }
    }

    fn text(&mut self) -> &mut String {
        if self.in_function {
            &mut self.body
        } else {
            &mut self.output
        }
    }
}
