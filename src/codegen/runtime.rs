use crate::diagnostics::CompileError;
use crate::ir::{Instr, Operand, Type, Value};

/// Symbol of the private `"%d\n"` constant used by every print.
pub const FORMAT_STRING: &str = ".formatting.string";
pub const PRINT_FORMAT: &[u8] = b"%d\n";

pub const PRINTF: &str = "printf";
pub const MALLOC: &str = "malloc";

/// An external C function the generated module calls.
#[derive(Debug, Clone)]
pub struct Intrinsic {
    pub name: &'static str,
    pub ret: Type,
    /// Parameter types; a trailing [`Type::VarArgs`] marks a variadic function.
    pub params: Vec<Type>,
}

impl Intrinsic {
    pub fn is_variadic(&self) -> bool {
        matches!(self.params.last(), Some(Type::VarArgs))
    }

    pub fn call(&self, dest: Option<String>, args: Vec<Operand>) -> Instr {
        Instr::Call {
            dest,
            ret: self.ret.clone(),
            sig: self.is_variadic().then(|| self.params.clone()),
            callee: self.name.to_string(),
            args,
        }
    }

    fn declaration(&self) -> Instr {
        Instr::Declare { ret: self.ret.clone(), name: self.name.to_string(), params: self.params.clone() }
    }
}

/// Registry of the C runtime functions declared at the end of every module.
#[derive(Debug, Clone)]
pub struct RuntimeRegistry {
    intrinsics: Vec<Intrinsic>,
}

impl RuntimeRegistry {
    pub fn new() -> Self {
        let mut reg = RuntimeRegistry { intrinsics: Vec::new() };

        // Formatted output
        reg.declare(PRINTF, Type::I32, vec![Type::I8.ptr(), Type::VarArgs]);
        // Memory
        reg.declare(MALLOC, Type::I8.ptr(), vec![Type::I32]);

        reg
    }

    fn declare(&mut self, name: &'static str, ret: Type, params: Vec<Type>) {
        self.intrinsics.push(Intrinsic { name, ret, params });
    }

    pub fn get(&self, name: &str) -> Result<&Intrinsic, CompileError> {
        self.intrinsics
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| CompileError::codegen(format!("runtime function '{name}' is not declared")))
    }

    /// External declarations, in registration order.
    pub fn declarations(&self) -> impl Iterator<Item = Instr> + '_ {
        self.intrinsics.iter().map(Intrinsic::declaration)
    }

    pub fn format_constant(&self) -> Instr {
        Instr::GlobalString { name: FORMAT_STRING.to_string(), bytes: PRINT_FORMAT.to_vec() }
    }

    /// Type of the format constant, `[4 x i8]`.
    pub fn format_type(&self) -> Type {
        Type::Array(PRINT_FORMAT.len() as u32 + 1, Box::new(Type::I8))
    }

    pub fn format_ptr(&self) -> Operand {
        Operand::new(self.format_type().ptr(), Value::Global(FORMAT_STRING.to_string()))
    }
}

impl Default for RuntimeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
