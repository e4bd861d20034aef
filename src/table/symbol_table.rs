/// Deepest allowed scope nesting, the global scope included.
pub const MAX_SCOPE_NESTING: usize = 64;
/// Every B value is one machine word.
pub const WORD_SIZE: usize = 8;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolKind {
    External,
    Global,
    Local,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: String,
    // unique per program, used for the sym.<id> labels of globals
    pub id: usize,
    // frame offset, only meaningful for locals
    pub offset: usize,
    // a global that names a function rather than data
    pub callable: bool,
}

#[derive(Clone, Debug, Default)]
struct Scope {
    symbols: Vec<Symbol>,
    stack_offset: usize,
}

/// The scope stack together with the frame slot allocator of the function
/// currently being compiled.
///
/// Leaving a scope rewinds the slot cursor, so sibling statements reuse the
/// same frame slots. The high-water mark of the cursor sizes the frame.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    last_id: usize,
    stack_offset: usize,
    stack_capacity: usize,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable {
            scopes: vec![Scope::default()],
            last_id: 0,
            stack_offset: WORD_SIZE,
            stack_capacity: WORD_SIZE,
        }
    }

    /// Number of scopes above the global one.
    #[cfg(test)]
    pub fn nesting(&self) -> usize {
        self.scopes.len() - 1
    }

    // Fails when the nesting limit is reached
    pub fn enter_scope(&mut self) -> Result<(), ()> {
        if self.scopes.len() >= MAX_SCOPE_NESTING {
            return Err(());
        }
        log::debug!(target: "parser", "enter scope {}", self.scopes.len());
        self.scopes.push(Scope {
            symbols: Vec::new(),
            stack_offset: self.stack_offset,
        });
        Ok(())
    }

    pub fn leave_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "leaving the global scope");
        if let Some(scope) = self.scopes.pop() {
            self.stack_offset = scope.stack_offset;
            log::debug!(target: "parser", "leave scope {}", self.scopes.len());
        }
    }

    /// Define `name` in the innermost scope.
    /// Returns the previous symbol if the name already exists in that scope.
    pub fn define(
        &mut self,
        name: &str,
        kind: SymbolKind,
        offset: usize,
        callable: bool,
    ) -> Result<Symbol, Symbol> {
        let innermost = self.scopes.len() - 1;
        let scope = &mut self.scopes[innermost];
        if let Some(previous) = scope.symbols.iter().find(|symbol| symbol.name == name) {
            return Err(previous.clone());
        }
        self.last_id += 1;
        let symbol = Symbol {
            kind,
            name: name.to_string(),
            id: self.last_id,
            offset,
            callable,
        };
        log::trace!(target: "parser", "define {:?}", symbol);
        scope.symbols.push(symbol.clone());
        Ok(symbol)
    }

    /// Find the innermost symbol called `name`.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.symbols.iter())
            .find(|symbol| symbol.name == name)
    }

    /// Reset the slot allocator at the start of a function.
    pub fn begin_function(&mut self) {
        self.stack_offset = WORD_SIZE;
        self.stack_capacity = WORD_SIZE;
    }

    /// Hand out one word of frame and return its offset below the frame pointer.
    pub fn alloc_stack_slot(&mut self) -> usize {
        let offset = self.stack_offset;
        self.stack_offset += WORD_SIZE;
        if self.stack_offset > self.stack_capacity {
            self.stack_capacity = self.stack_offset;
        }
        offset
    }

    pub fn stack_offset(&self) -> usize {
        self.stack_offset
    }

    pub fn set_stack_offset(&mut self, offset: usize) {
        self.stack_offset = offset;
    }

    /// Bytes to reserve below the frame pointer, rounded up so calls stay
    /// 16 byte aligned.
    pub fn frame_size(&self) -> usize {
        let used = self.stack_capacity - WORD_SIZE;
        (used + 15) / 16 * 16
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redefinition_in_same_scope_fails() {
        let mut table = SymbolTable::new();
        table.enter_scope().unwrap();
        assert!(table.define("x", SymbolKind::Local, 8, false).is_ok());
        let previous = table.define("x", SymbolKind::Local, 16, false).unwrap_err();
        assert_eq!(previous.offset, 8);
    }

    #[test]
    fn shadowing_in_nested_scope_succeeds() {
        let mut table = SymbolTable::new();
        table.define("x", SymbolKind::Global, 0, false).unwrap();
        table.enter_scope().unwrap();
        table.define("x", SymbolKind::Local, 8, false).unwrap();
        assert_eq!(table.lookup("x").unwrap().kind, SymbolKind::Local);
        table.leave_scope();
        assert_eq!(table.lookup("x").unwrap().kind, SymbolKind::Global);
        assert!(table.lookup("y").is_none());
    }

    #[test]
    fn ids_are_monotonic() {
        let mut table = SymbolTable::new();
        let a = table.define("a", SymbolKind::Global, 0, true).unwrap();
        let b = table.define("b", SymbolKind::External, 0, false).unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn leave_scope_restores_stack_cursor_at_every_depth() {
        let mut table = SymbolTable::new();
        table.begin_function();
        let mut cursors = Vec::new();
        for depth in 1..MAX_SCOPE_NESTING {
            cursors.push(table.stack_offset());
            table.enter_scope().unwrap();
            for _ in 0..depth % 3 + 1 {
                table.alloc_stack_slot();
            }
        }
        assert!(table.enter_scope().is_err());
        while let Some(cursor) = cursors.pop() {
            table.leave_scope();
            assert_eq!(table.stack_offset(), cursor);
        }
        assert_eq!(table.nesting(), 0);
    }

    #[test]
    fn slots_are_reused_and_frame_tracks_high_water() {
        let mut table = SymbolTable::new();
        table.begin_function();
        assert_eq!(table.frame_size(), 0);
        table.enter_scope().unwrap();
        assert_eq!(table.alloc_stack_slot(), 8);
        assert_eq!(table.alloc_stack_slot(), 16);
        assert_eq!(table.alloc_stack_slot(), 24);
        table.leave_scope();
        table.enter_scope().unwrap();
        assert_eq!(table.alloc_stack_slot(), 8);
        table.leave_scope();
        assert_eq!(table.frame_size(), 32);
        table.begin_function();
        table.alloc_stack_slot();
        assert_eq!(table.frame_size(), 16);
    }
}
