use super::registers::{Register, ARGUMENT_REGISTERS};
use super::BackendAMD64;
use crate::backend::{Backend, BinaryOp, CallTarget, DataEntry, UnaryOp, Value};
use crate::table::{StringPool, Symbol, SymbolKind};

impl Backend for BackendAMD64 {
    fn backend_type(&self) -> &'static str {
        "nasm"
    }

    fn argument_count(&self) -> usize {
        ARGUMENT_REGISTERS.len()
    }

    fn generate_global_prologue(&mut self) {
        self.output.push_str("bits 64\ndefault rel\nsection .text\n");
    }

    fn generate_global_epilogue(&mut self) {
        self.output
            .push_str("section .note.GNU-stack noalloc noexec nowrite progbits\n");
    }

    fn declare_extern(&mut self, name: &str) {
        self.output.push_str(&format!("extern ${}\n", name));
    }

    fn begin_function(&mut self, name: &str, id: usize) {
        log::debug!(target: "backend", "begin function {} (sym.{})", name, id);
        self.function_name = name.to_string();
        self.function_id = id;
        self.body.clear();
        self.in_function = true;
    }

    fn end_function(&mut self, frame_size: usize, implicit_zero: bool) {
        log::info!(
            target: "backend",
            "function {} uses a frame of {} bytes",
            self.function_name,
            frame_size
        );
        self.in_function = false;
        let prologue = self.emit_prologue(frame_size);
        self.output.push_str(&prologue);
        let body = std::mem::take(&mut self.body);
        self.output.push_str(&body);
        if implicit_zero {
            self.output.push_str("\txor eax, eax\n");
        }
        let epilogue = self.emit_epilogue();
        self.output.push_str(epilogue);
    }

    fn store_argument(&mut self, index: usize, slot: usize) {
        emit!(self, "\tmov [rbp-{}], {:.64}", slot, ARGUMENT_REGISTERS[index]);
    }

    fn comment(&mut self, text: &str) {
        emit!(self, "\t; {}", text);
    }

    fn load_constant(&mut self, slot: usize, value: i64) {
        emit!(self, "\tmov rax, {}", value);
        self.store_slot(slot);
    }

    fn load_string(&mut self, slot: usize, offset: usize) {
        emit!(self, "\tlea rax, [str.end-{}]", offset);
        self.store_slot(slot);
    }

    fn load_symbol_address(&mut self, slot: usize, symbol: &Symbol) {
        match symbol.kind {
            SymbolKind::External => {
                emit!(self, "\tmov rax, [rel ${} wrt ..gotpcrel]", symbol.name)
            }
            SymbolKind::Global => emit!(self, "\tlea rax, [sym.{}]", symbol.id),
            SymbolKind::Local => emit!(self, "\tlea rax, [rbp-{}]", symbol.offset),
        }
        self.store_slot(slot);
    }

    fn copy(&mut self, slot: usize, value: Value) {
        self.load(Register::Rax, value);
        self.store_slot(slot);
    }

    fn store(&mut self, target: Value, value: Value) {
        self.load(Register::Rax, value);
        self.store_rax(target);
    }

    fn binary(&mut self, op: BinaryOp, slot: usize, left: Value, right: Value) {
        self.load(Register::Rax, left);
        self.load(Register::Rcx, right);
        self.emit_operation(op);
        self.store_slot(slot);
    }

    fn compound_assign(&mut self, op: BinaryOp, target: Value, value: Value) {
        self.load(Register::Rax, target);
        self.load(Register::Rcx, value);
        self.emit_operation(op);
        self.store_rax(target);
    }

    fn unary(&mut self, op: UnaryOp, slot: usize, value: Value) {
        self.load(Register::Rax, value);
        match op {
            UnaryOp::Negate => emit!(self, "\tneg rax"),
            UnaryOp::Complement => emit!(self, "\tnot rax"),
            UnaryOp::Not => {
                emit!(self, "\ttest rax, rax");
                emit!(self, "\tsete al");
                emit!(self, "\tmovzx eax, al");
            }
        }
        self.store_slot(slot);
    }

    fn to_bool(&mut self, slot: usize, value: Value) {
        self.load(Register::Rax, value);
        emit!(self, "\ttest rax, rax");
        emit!(self, "\tsetne al");
        emit!(self, "\tmovzx eax, al");
        self.store_slot(slot);
    }

    fn address_of(&mut self, slot: usize, value: Value) {
        match value {
            Value::LValueAuto(offset) => emit!(self, "\tlea rax, [rbp-{}]", offset),
            Value::LValuePtr(offset) => emit!(self, "\tmov rax, [rbp-{}]", offset),
            _ => unreachable!("taking the address of {:?}", value),
        }
        self.store_slot(slot);
    }

    fn index(&mut self, slot: usize, base: Value, index: Value) {
        self.load(Register::Rax, base);
        self.load(Register::Rcx, index);
        emit!(self, "\tlea rax, [rax+rcx*8]");
        self.store_slot(slot);
    }

    fn increment(&mut self, target: Value, delta: i64, old: Option<usize>) {
        if let Some(old) = old {
            self.load(Register::Rax, target);
            self.store_slot(old);
        }
        let mnemonic = if delta < 0 { "sub" } else { "add" };
        match target {
            Value::LValueAuto(offset) => {
                emit!(self, "\t{} qword [rbp-{}], {}", mnemonic, offset, delta.abs())
            }
            Value::LValuePtr(offset) => {
                emit!(self, "\tmov rcx, [rbp-{}]", offset);
                emit!(self, "\t{} qword [rcx], {}", mnemonic, delta.abs());
            }
            _ => unreachable!("incrementing {:?}", target),
        }
    }

    fn call(&mut self, target: CallTarget, arguments: &[Value], slot: usize) {
        for (argument, register) in arguments.iter().zip(ARGUMENT_REGISTERS.iter()) {
            self.load(*register, *argument);
        }
        match target {
            CallTarget::External(name) => {
                emit!(self, "\txor eax, eax");
                emit!(self, "\tcall ${} wrt ..plt", name);
            }
            CallTarget::Global(id) => {
                emit!(self, "\txor eax, eax");
                emit!(self, "\tcall sym.{}", id);
            }
            CallTarget::Indirect(value) => {
                self.load(Register::R10, value);
                emit!(self, "\txor eax, eax");
                emit!(self, "\tcall {:.64}", Register::R10);
            }
        }
        self.store_slot(slot);
    }

    fn label(&mut self, label: usize) {
        emit!(self, ".local_{}:", label);
    }

    fn user_label(&mut self, name: &str) {
        emit!(self, ".label_{}:", name);
    }

    fn jump(&mut self, label: usize) {
        emit!(self, "\tjmp .local_{}", label);
    }

    fn jump_user_label(&mut self, name: &str) {
        emit!(self, "\tjmp .label_{}", name);
    }

    fn jump_if_zero(&mut self, value: Value, label: usize) {
        self.load(Register::Rax, value);
        emit!(self, "\ttest rax, rax");
        emit!(self, "\tjz .local_{}", label);
    }

    fn jump_if_not_zero(&mut self, value: Value, label: usize) {
        self.load(Register::Rax, value);
        emit!(self, "\ttest rax, rax");
        emit!(self, "\tjnz .local_{}", label);
    }

    fn jump_if_not_equal(&mut self, value: Value, constant: i64, label: usize) {
        self.load(Register::Rax, value);
        emit!(self, "\tmov rcx, {}", constant);
        emit!(self, "\tcmp rax, rcx");
        emit!(self, "\tjne .local_{}", label);
    }

    fn return_value(&mut self, value: Value) {
        match value {
            Value::Empty => emit!(self, "\txor eax, eax"),
            _ => self.load(Register::Rax, value),
        }
        emit!(self, "\tleave");
        emit!(self, "\tret");
    }

    fn generate_globals(&mut self, globals: &[DataEntry]) {
        if globals.is_empty() {
            return;
        }
        log::info!(target: "backend", "writing {} globals", globals.len());
        self.output.push_str("section .data\n");
        for entry in globals {
            let definition = self.emit_global_definition(entry);
            self.output.push_str(&definition);
        }
    }

    fn generate_strings(&mut self, strings: &StringPool) {
        if strings.is_empty() {
            return;
        }
        log::info!(target: "backend", "writing {} bytes of literals", strings.total() + 1);
        let section = self.emit_strings(&strings.blob());
        self.output.push_str(&section);
    }

    fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}
