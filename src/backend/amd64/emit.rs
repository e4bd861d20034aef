use super::registers::Register;
use super::BackendAMD64;
use crate::backend::{BinaryOp, DataEntry, DataValue, Value};

impl BackendAMD64 {
    // Reads the word described by `value` into `register`.
    // Only `register` itself is clobbered.
    pub(super) fn load(&mut self, register: Register, value: Value) {
        match value {
            Value::RValue(offset) | Value::LValueAuto(offset) => {
                emit!(self, "\tmov {:.64}, [rbp-{}]", register, offset)
            }
            Value::LValuePtr(offset) => {
                emit!(self, "\tmov {:.64}, [rbp-{}]", register, offset);
                emit!(self, "\tmov {:.64}, [{:.64}]", register, register);
            }
            Value::Empty => unreachable!("reading a value that was never computed"),
        }
    }

    // Writes rax to the word described by `target`, clobbers rcx
    pub(super) fn store_rax(&mut self, target: Value) {
        match target {
            Value::RValue(offset) | Value::LValueAuto(offset) => self.store_slot(offset),
            Value::LValuePtr(offset) => {
                emit!(self, "\tmov rcx, [rbp-{}]", offset);
                emit!(self, "\tmov [rcx], rax");
            }
            Value::Empty => unreachable!("storing to a value that has no storage"),
        }
    }

    pub(super) fn store_slot(&mut self, slot: usize) {
        emit!(self, "\tmov [rbp-{}], rax", slot);
    }

    // rax = rax <op> rcx
    pub(super) fn emit_operation(&mut self, op: BinaryOp) {
        use BinaryOp::*;
        match op {
            Add => emit!(self, "\tadd rax, rcx"),
            Sub => emit!(self, "\tsub rax, rcx"),
            Mul => emit!(self, "\timul rax, rcx"),
            Div => {
                emit!(self, "\tcqo");
                emit!(self, "\tidiv rcx");
            }
            Mod => {
                emit!(self, "\tcqo");
                emit!(self, "\tidiv rcx");
                emit!(self, "\tmov rax, rdx");
            }
            And => emit!(self, "\tand rax, rcx"),
            Or => emit!(self, "\tor rax, rcx"),
            Xor => emit!(self, "\txor rax, rcx"),
            Shl => emit!(self, "\tshl rax, cl"),
            Shr => emit!(self, "\tsar rax, cl"),
            Equal | Inequal | Less | LessEqual | Greater | GreaterEqual => {
                let condition = match op {
                    Equal => "e",
                    Inequal => "ne",
                    Less => "l",
                    LessEqual => "le",
                    Greater => "g",
                    _ => "ge",
                };
                emit!(self, "\tcmp rax, rcx");
                emit!(self, "\tset{} {:.8}", condition, Register::Rax);
                emit!(self, "\tmovzx eax, {:.8}", Register::Rax);
            }
        }
    }

    pub(super) fn emit_prologue(&self, frame_size: usize) -> String {
        let mut prologue = format!(
            "global ${name}\n${name}:\nsym.{id}:\n",
            name = self.function_name,
            id = self.function_id
        );
        prologue.push_str("\tpush rbp\n\tmov rbp, rsp\n");
        if frame_size != 0 {
            prologue.push_str(&format!("\tsub rsp, {}\n", frame_size));
        }
        prologue
    }

    pub(super) fn emit_epilogue(&self) -> &'static str {
        "\tleave\n\tret\n"
    }

    pub(super) fn emit_global_definition(&self, entry: &DataEntry) -> String {
        let mut result = format!("\talign 8\nsym.{}:\n", entry.id);
        if entry.vector {
            result.push_str(&format!("\tdq sym.{}+8\n", entry.id));
        }
        for value in &entry.values {
            match value {
                DataValue::Integer(value) => result.push_str(&format!("\tdq {}\n", value)),
                DataValue::String(offset) => {
                    result.push_str(&format!("\tdq str.end-{}\n", offset))
                }
            }
        }
        let zeroes = entry.cells() - entry.values.len();
        if zeroes != 0 {
            result.push_str(&format!("\ttimes {} dq 0\n", zeroes));
        }
        result
    }

    pub(super) fn emit_strings(&self, blob: &[u8]) -> String {
        let mut result = String::from("section .rodata\n");
        for line in blob.chunks(16) {
            let bytes: Vec<String> = line.iter().map(|b| format!("0x{:02x}", b)).collect();
            result.push_str(&format!("\tdb {}\n", bytes.join(",")));
        }
        result.push_str("str.end:\n");
        result
    }
}
