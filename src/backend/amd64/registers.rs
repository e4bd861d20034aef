use std::fmt::Display;

/// Registers in System V argument order.
pub const ARGUMENT_REGISTERS: [Register; 6] = {
    use Register::*;
    [Rdi, Rsi, Rdx, Rcx, R8, R9]
};

// Only the registers the code generator ever names
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Register {
    Rax,
    Rcx,
    Rdx,
    Rdi,
    Rsi,
    R8,
    R9,
    R10,
}

impl Register {
    pub fn to_string_i64(&self) -> &'static str {
        match self {
            Self::Rax => "rax",
            Self::Rcx => "rcx",
            Self::Rdx => "rdx",
            Self::Rdi => "rdi",
            Self::Rsi => "rsi",
            Self::R8 => "r8",
            Self::R9 => "r9",
            Self::R10 => "r10",
        }
    }

    pub fn to_string_i8(&self) -> &'static str {
        match self {
            Self::Rax => "al",
            Self::Rcx => "cl",
            Self::Rdx => "dl",
            Self::Rdi => "dil",
            Self::Rsi => "sil",
            Self::R8 => "r8b",
            Self::R9 => "r9b",
            Self::R10 => "r10b",
        }
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match f.precision() {
            Some(8) => write!(f, "{}", self.to_string_i8())?,
            Some(64) | None => write!(f, "{}", self.to_string_i64())?,
            Some(s) => log::error!("Unsupported precision {}", s),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_selects_width() {
        assert_eq!(format!("{:.8}", Register::Rax), "al");
        assert_eq!(format!("{:.8}", Register::R8), "r8b");
        assert_eq!(format!("{:.64}", Register::Rdi), "rdi");
        assert_eq!(format!("{}", Register::R10), "r10");
    }
}
