//! Text rendering of terms, statements and programs.

use std::fmt;

use crate::location::MemoryLocation;
use crate::program::Program;
use crate::stmt::{Jump, JumpTarget, Statement};
use crate::term::{BinaryOp, IntrinsicKind, Term, UnaryOp};

/// Source of human-readable names for storage locations.
pub trait LocationNames {
    fn name_of(&self, location: &MemoryLocation) -> Option<&str>;
}

/// Names nothing; locations print as raw bit ranges.
pub struct NoNames;

impl LocationNames for NoNames {
    fn name_of(&self, _location: &MemoryLocation) -> Option<&str> {
        None
    }
}

const fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::SignedDiv => "/s",
        BinaryOp::UnsignedDiv => "/u",
        BinaryOp::SignedRem => "%s",
        BinaryOp::UnsignedRem => "%u",
        BinaryOp::And => "&",
        BinaryOp::Or => "|",
        BinaryOp::Xor => "^",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>u",
        BinaryOp::Sar => ">>s",
        BinaryOp::Equal => "==",
        BinaryOp::SignedLess => "<s",
        BinaryOp::SignedLessOrEqual => "<=s",
        BinaryOp::UnsignedLess => "<u",
        BinaryOp::UnsignedLessOrEqual => "<=u",
    }
}

/// Display adapter pairing an IR value with a naming scheme.
pub struct Named<'a, T: ?Sized> {
    value: &'a T,
    names: &'a dyn LocationNames,
}

impl<'a, T: ?Sized> Named<'a, T> {
    pub fn new(value: &'a T, names: &'a dyn LocationNames) -> Self {
        Self { value, names }
    }

    fn with<U: ?Sized>(&self, value: &'a U) -> Named<'a, U> {
        Named {
            value,
            names: self.names,
        }
    }
}

impl fmt::Display for Named<'_, MemoryLocation> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.names.name_of(self.value) {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.value),
        }
    }
}

impl fmt::Display for Named<'_, Term> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Term::Constant { value, .. } => write!(f, "0x{value:x}"),
            Term::Access(location) => write!(f, "{}", self.with(location)),
            Term::Dereference { address, size, .. } => {
                write!(f, "[{}]:{size}", self.with(address.as_ref()))
            }
            Term::Unary { op, operand, size } => {
                let operand = self.with(operand.as_ref());
                match op {
                    UnaryOp::Not => write!(f, "~{operand}"),
                    UnaryOp::Negation => write!(f, "-{operand}"),
                    UnaryOp::SignExtend => write!(f, "sext{size}({operand})"),
                    UnaryOp::ZeroExtend => write!(f, "zext{size}({operand})"),
                    UnaryOp::Truncate => write!(f, "trunc{size}({operand})"),
                }
            }
            Term::Binary {
                op, left, right, ..
            } => write!(
                f,
                "({} {} {})",
                self.with(left.as_ref()),
                binary_symbol(*op),
                self.with(right.as_ref())
            ),
            Term::Intrinsic { kind, .. } => match kind {
                IntrinsicKind::ReturnAddress => f.write_str("return_address()"),
                IntrinsicKind::Undefined => f.write_str("undefined()"),
            },
        }
    }
}

impl fmt::Display for Named<'_, JumpTarget> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            JumpTarget::Address(term) => write!(f, "{}", self.with(term)),
            JumpTarget::Block(id) => write!(f, "{id}"),
        }
    }
}

impl fmt::Display for Named<'_, Jump> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let jump = self.value;
        match (&jump.condition, &jump.else_target) {
            (Some(condition), Some(else_target)) => write!(
                f,
                "if {} goto {} else goto {}",
                self.with(condition),
                self.with(&jump.then_target),
                self.with(else_target)
            ),
            _ => write!(f, "goto {}", self.with(&jump.then_target)),
        }
    }
}

impl fmt::Display for Named<'_, Statement> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Statement::Assignment { left, right } => {
                write!(f, "{} := {}", self.with(left), self.with(right))
            }
            Statement::Jump(jump) => write!(f, "{}", self.with(jump)),
            Statement::Call { target } => write!(f, "call {}", self.with(target)),
            Statement::Return => f.write_str("return"),
            Statement::OpaqueEffect => f.write_str("opaque"),
        }
    }
}

impl fmt::Display for Named<'_, Program> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in self.value.blocks() {
            match block.address() {
                Some(addr) => writeln!(f, "{} @ 0x{addr:x}:", block.id())?,
                None => writeln!(f, "{}:", block.id())?,
            }
            for statement in block.statements() {
                writeln!(f, "    {}", self.with(statement))?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Named::new(self, &NoNames))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Named::new(self, &NoNames))
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Named::new(self, &NoNames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Domain;

    struct OneName;

    impl LocationNames for OneName {
        fn name_of(&self, location: &MemoryLocation) -> Option<&str> {
            (location.addr == 0).then_some("r0")
        }
    }

    #[test]
    fn test_term_display() {
        let term = Term::add(
            Term::access(MemoryLocation::register(0, 64)),
            Term::constant(16, 64),
        );
        assert_eq!(term.to_string(), "(reg[0:64] + 0x10)");
        assert_eq!(Named::new(&term, &OneName).to_string(), "(r0 + 0x10)");
    }

    #[test]
    fn test_statement_display() {
        let load = Statement::assign(
            Term::access(MemoryLocation::register(64, 64)),
            Term::dereference(
                Term::access(MemoryLocation::register(0, 64)),
                Domain::Memory,
                32,
            ),
        );
        assert_eq!(
            Named::new(&load, &OneName).to_string(),
            "reg[64:64] := [r0]:32"
        );
        assert_eq!(Statement::OpaqueEffect.to_string(), "opaque");
    }
}
