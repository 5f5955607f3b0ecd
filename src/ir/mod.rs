//! Textual IR nodes.
//!
//! Every type, value and instruction renders itself through `Display`; code
//! generation only ever pushes nodes into a [`Module`] and never formats IR
//! text by hand.

pub mod instr;
pub mod types;
pub mod value;

use std::fmt;

pub use instr::{BinaryOp, IcmpCond, Instr};
pub use types::Type;
pub use value::{Operand, Value};

/// Ordered, append-only buffer of IR items. Emission order is the only
/// structure the rendered module has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    items: Vec<Instr>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: Instr) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[Instr] {
        &self.items
    }
}

impl Extend<Instr> for Module {
    fn extend<I: IntoIterator<Item = Instr>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{item}")?;
        }
        Ok(())
    }
}
