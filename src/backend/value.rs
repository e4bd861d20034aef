/// Where the result of an expression lives. Every slot is a word in the
/// current frame, addressed by its offset below the frame pointer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Value {
    Empty,
    /// A temporary slot owned by the expression.
    RValue(usize),
    /// The slot of a named local, assignable in place.
    LValueAuto(usize),
    /// A slot holding the address of the value.
    LValuePtr(usize),
}

impl Value {
    pub fn is_lvalue(&self) -> bool {
        matches!(self, Value::LValueAuto(_) | Value::LValuePtr(_))
    }
}
