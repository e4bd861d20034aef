mod control_stack;
mod label_table;
mod string_pool;
mod symbol_table;

pub use self::control_stack::*;
pub use self::label_table::*;
pub use self::string_pool::*;
pub use self::symbol_table::*;
