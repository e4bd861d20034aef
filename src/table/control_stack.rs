use crate::backend::Value;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ControlKind {
    While,
    Switch,
}

/// Labels of one enclosing `while` or `switch`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ControlEntry {
    pub kind: ControlKind,
    // the value compared by `case`, Empty for loops
    pub scrutinee: Value,
    // label of the next case comparison, switches only
    pub next_case: usize,
    // re-test label, loops only
    pub again: usize,
    pub exit: usize,
}

impl ControlEntry {
    pub fn new_while(again: usize, exit: usize) -> ControlEntry {
        ControlEntry {
            kind: ControlKind::While,
            scrutinee: Value::Empty,
            next_case: 0,
            again,
            exit,
        }
    }

    pub fn new_switch(scrutinee: Value, next_case: usize, exit: usize) -> ControlEntry {
        ControlEntry {
            kind: ControlKind::Switch,
            scrutinee,
            next_case,
            again: 0,
            exit,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ControlStack {
    entries: Vec<ControlEntry>,
}

impl ControlStack {
    pub fn new() -> ControlStack {
        ControlStack {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ControlEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<ControlEntry> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// `break` leaves the innermost construct, whatever its kind.
    pub fn break_target(&self) -> Option<usize> {
        self.entries.last().map(|entry| entry.exit)
    }

    /// `continue` re-tests the innermost loop, looking through switches.
    pub fn continue_target(&self) -> Option<usize> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.kind == ControlKind::While)
            .map(|entry| entry.again)
    }

    pub fn innermost_switch_mut(&mut self) -> Option<&mut ControlEntry> {
        self.entries
            .iter_mut()
            .rev()
            .find(|entry| entry.kind == ControlKind::Switch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_in_switch_inside_while_exits_switch() {
        let mut stack = ControlStack::new();
        stack.push(ControlEntry::new_while(1, 2));
        stack.push(ControlEntry::new_switch(Value::RValue(8), 3, 4));
        assert_eq!(stack.break_target(), Some(4));
        assert_eq!(stack.continue_target(), Some(1));
        stack.pop();
        assert_eq!(stack.break_target(), Some(2));
    }

    #[test]
    fn continue_in_while_inside_switch_targets_while() {
        let mut stack = ControlStack::new();
        stack.push(ControlEntry::new_switch(Value::RValue(8), 1, 2));
        assert_eq!(stack.continue_target(), None);
        stack.push(ControlEntry::new_while(3, 4));
        assert_eq!(stack.continue_target(), Some(3));
        assert_eq!(stack.innermost_switch_mut().unwrap().next_case, 1);
    }

    #[test]
    fn empty_stack_has_no_targets() {
        let mut stack = ControlStack::new();
        assert_eq!(stack.break_target(), None);
        assert!(stack.innermost_switch_mut().is_none());
        stack.push(ControlEntry::new_while(1, 2));
        stack.clear();
        assert_eq!(stack.continue_target(), None);
    }
}
