mod amd64;
mod value;

pub use self::value::Value;

use crate::table::{StringPool, Symbol};

/// Returns the code generator for `architecture`.
pub fn get_backend(architecture: &str) -> Result<Box<dyn Backend>, String> {
    let backend: Box<dyn Backend> = match architecture {
        "amd64" => Box::new(amd64::BackendAMD64::new()),
        _ => {
            log::error!("There is no backend implemented for {}", architecture);
            return Err(format!("unsupported architecture {}", architecture));
        }
    };
    Ok(backend)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Equal,
    Inequal,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnaryOp {
    Negate,
    Complement,
    Not,
}

/// What a call jumps to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CallTarget<'a> {
    /// A function imported with `extrn`, called through the PLT.
    External(&'a str),
    /// A function defined earlier in this program, by symbol id.
    Global(usize),
    /// A word holding the address of a function.
    Indirect(Value),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DataValue {
    Integer(i64),
    // distance of a literal from the end of the literal section
    String(usize),
}

/// Storage of one global variable, written once the program is complete.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DataEntry {
    pub id: usize,
    pub vector: bool,
    pub size: Option<usize>,
    pub values: Vec<DataValue>,
}

impl DataEntry {
    /// Number of data cells, not counting the leading pointer of a vector.
    pub fn cells(&self) -> usize {
        let minimum = if self.vector { 0 } else { 1 };
        std::cmp::max(
            std::cmp::max(self.size.unwrap_or(0), self.values.len()),
            minimum,
        )
    }
}

/// Instruction selection for the single pass compiler.
///
/// The parser calls one method per construct as soon as it is recognised.
/// Everything between `begin_function` and `end_function` is buffered, so
/// the prologue can be written once the frame size is known.
pub trait Backend {
    // Gives the backend type for processing
    fn backend_type(&self) -> &'static str;

    /// Registers used for the first arguments of a call.
    fn argument_count(&self) -> usize;

    fn generate_global_prologue(&mut self);
    fn generate_global_epilogue(&mut self);
    fn declare_extern(&mut self, name: &str);

    fn begin_function(&mut self, name: &str, id: usize);
    fn end_function(&mut self, frame_size: usize, implicit_zero: bool);
    fn store_argument(&mut self, index: usize, slot: usize);
    fn comment(&mut self, text: &str);

    fn load_constant(&mut self, slot: usize, value: i64);
    fn load_string(&mut self, slot: usize, offset: usize);
    fn load_symbol_address(&mut self, slot: usize, symbol: &Symbol);
    fn copy(&mut self, slot: usize, value: Value);
    fn store(&mut self, target: Value, value: Value);

    fn binary(&mut self, op: BinaryOp, slot: usize, left: Value, right: Value);
    fn compound_assign(&mut self, op: BinaryOp, target: Value, value: Value);
    fn unary(&mut self, op: UnaryOp, slot: usize, value: Value);
    fn to_bool(&mut self, slot: usize, value: Value);
    fn address_of(&mut self, slot: usize, value: Value);
    fn index(&mut self, slot: usize, base: Value, index: Value);
    fn increment(&mut self, target: Value, delta: i64, old: Option<usize>);
    fn call(&mut self, target: CallTarget, arguments: &[Value], slot: usize);

    fn label(&mut self, label: usize);
    fn user_label(&mut self, name: &str);
    fn jump(&mut self, label: usize);
    fn jump_user_label(&mut self, name: &str);
    fn jump_if_zero(&mut self, value: Value, label: usize);
    fn jump_if_not_zero(&mut self, value: Value, label: usize);
    fn jump_if_not_equal(&mut self, value: Value, constant: i64, label: usize);
    /// Leave the function; `Value::Empty` returns 0.
    fn return_value(&mut self, value: Value);

    fn generate_globals(&mut self, globals: &[DataEntry]);
    fn generate_strings(&mut self, strings: &StringPool);

    /// The assembly written so far.
    fn take_output(&mut self) -> String;
}
