//! Operator schemas

use super::value::{IValue, ValueKind};
use crate::error::{Error, Result};
use std::fmt;

/// Declared kind of one operator argument
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    /// `Tensor`
    Tensor,
    /// `Tensor?`, a tensor or `None`
    OptionalTensor,
    /// `float`; integers are accepted and widened
    Double,
    /// `int`
    Int,
}

impl ArgKind {
    /// Whether `value` can be passed for an argument of this kind
    pub fn accepts(self, value: &IValue) -> bool {
        matches!(
            (self, value.kind()),
            (ArgKind::Tensor, ValueKind::Tensor)
                | (ArgKind::OptionalTensor, ValueKind::Tensor | ValueKind::None)
                | (ArgKind::Double, ValueKind::Double | ValueKind::Int)
                | (ArgKind::Int, ValueKind::Int)
        )
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgKind::Tensor => "Tensor",
            ArgKind::OptionalTensor => "Tensor?",
            ArgKind::Double => "float",
            ArgKind::Int => "int",
        };
        f.write_str(name)
    }
}

/// Declared return kind of an operator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnKind {
    /// Returns a tensor
    Tensor,
    /// Returns an integer
    Int,
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnKind::Tensor => f.write_str("Tensor"),
            ReturnKind::Int => f.write_str("int"),
        }
    }
}

/// Named argument of an operator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arg {
    /// Argument name
    pub name: &'static str,
    /// Argument kind
    pub kind: ArgKind,
}

impl Arg {
    /// Create an argument declaration
    pub const fn new(name: &'static str, kind: ArgKind) -> Self {
        Self { name, kind }
    }
}

/// Namespaced name plus typed argument list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorSchema {
    /// Fully qualified name, `namespace::op`
    pub name: &'static str,
    /// Arguments in call order
    pub args: Vec<Arg>,
    /// Return kind
    pub returns: ReturnKind,
}

impl OperatorSchema {
    /// Create a schema
    pub fn new(name: &'static str, args: Vec<Arg>, returns: ReturnKind) -> Self {
        Self {
            name,
            args,
            returns,
        }
    }

    /// Namespace part of the name (before `::`)
    pub fn namespace(&self) -> &'static str {
        self.name.split_once("::").map_or("", |(ns, _)| ns)
    }

    /// Textual signature, e.g. `ns::op(Tensor x, float r) -> Tensor`
    pub fn signature(&self) -> String {
        self.to_string()
    }

    /// Check call arguments against this schema
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` on a wrong argument count or kind.
    pub fn check_args(&self, args: &[IValue]) -> Result<()> {
        if args.len() != self.args.len() {
            return Err(Error::schema_mismatch(
                self.name,
                format!("expected {} arguments, got {}", self.args.len(), args.len()),
            ));
        }
        for (decl, value) in self.args.iter().zip(args) {
            if !decl.kind.accepts(value) {
                return Err(Error::schema_mismatch(
                    self.name,
                    format!(
                        "argument '{}' expects {}, got {}",
                        decl.name,
                        decl.kind,
                        value.kind()
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for OperatorSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", arg.kind, arg.name)?;
        }
        write!(f, ") -> {}", self.returns)
    }
}
