//! Explicit operator registry
//!
//! Operators are registered under namespaced names (`topocluster::vector_radius`)
//! with a typed [`OperatorSchema`] and invoked dynamically with [`IValue`]
//! arguments. There is no process-global registry: a host builds one at
//! startup and keeps it.
//!
//! ```
//! use topocluster::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let registry = OperatorRegistry::with_cluster_ops()?;
//! let x = HostTensor::from_slice(&[0i64, 1], &[2, 1], Placement::Cpu)?;
//! let y = HostTensor::from_slice(&[0i64, 1], &[1, 2], Placement::Cpu)?;
//!
//! let out = registry.call(
//!     "topocluster::centerline_group",
//!     &[x.into(), y.into(), IValue::None, IValue::None, 32i64.into(), 1i64.into()],
//! )?;
//! let edges = out.into_tensor().expect("tensor result");
//! assert_eq!(edges.tensor().to_vec::<i64>(), vec![0, 1]);
//! # Ok(())
//! # }
//! ```

mod cluster;
mod schema;
mod value;

pub use cluster::{CENTERLINE_GROUP, CUDA_VERSION, VECTOR_RADIUS, register_cluster_ops};
pub use schema::{Arg, ArgKind, OperatorSchema, ReturnKind};
pub use value::{HostTensor, IValue, ValueKind, common_placement};

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Operator entry point
pub type OperatorFn = fn(&[IValue]) -> Result<IValue>;

/// A registered operator: schema plus implementation
#[derive(Clone, Debug)]
pub struct Operator {
    schema: OperatorSchema,
    func: OperatorFn,
}

impl Operator {
    /// Pair a schema with its implementation
    pub fn new(schema: OperatorSchema, func: OperatorFn) -> Self {
        Self { schema, func }
    }

    /// Operator schema
    pub fn schema(&self) -> &OperatorSchema {
        &self.schema
    }

    /// Fully qualified name
    pub fn name(&self) -> &'static str {
        self.schema.name
    }

    /// Check `args` against the schema and run the operator
    pub fn invoke(&self, args: &[IValue]) -> Result<IValue> {
        self.schema.check_args(args)?;
        (self.func)(args)
    }
}

/// Name-keyed operator table
#[derive(Clone, Debug, Default)]
pub struct OperatorRegistry {
    ops: BTreeMap<&'static str, Operator>,
}

impl OperatorRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the cluster operators
    pub fn with_cluster_ops() -> Result<Self> {
        let mut registry = Self::new();
        register_cluster_ops(&mut registry)?;
        Ok(registry)
    }

    /// Register an operator
    ///
    /// # Errors
    ///
    /// `DuplicateOperator` if the name is taken.
    pub fn register(&mut self, schema: OperatorSchema, func: OperatorFn) -> Result<()> {
        let name = schema.name;
        if self.ops.contains_key(name) {
            return Err(Error::DuplicateOperator {
                name: name.to_string(),
            });
        }
        log::debug!("registering {}", schema);
        self.ops.insert(name, Operator::new(schema, func));
        Ok(())
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Look up an operator
    pub fn get(&self, name: &str) -> Option<&Operator> {
        self.ops.get(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ops.keys().copied()
    }

    /// Schema of a registered operator
    pub fn schema(&self, name: &str) -> Option<&OperatorSchema> {
        self.get(name).map(Operator::schema)
    }

    /// Number of registered operators
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Call an operator by name
    ///
    /// # Errors
    ///
    /// `UnknownOperator` for an unregistered name, `SchemaMismatch` for
    /// ill-typed arguments, and whatever the operator itself returns.
    pub fn call(&self, name: &str, args: &[IValue]) -> Result<IValue> {
        let op = self.get(name).ok_or_else(|| Error::UnknownOperator {
            name: name.to_string(),
        })?;
        log::trace!("calling {} with {} arguments", name, args.len());
        op.invoke(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(_: &[IValue]) -> Result<IValue> {
        Ok(IValue::Int(42))
    }

    fn answer_schema() -> OperatorSchema {
        OperatorSchema::new("test::answer", vec![], ReturnKind::Int)
    }

    #[test]
    fn test_register_and_call() {
        let mut registry = OperatorRegistry::new();
        assert!(registry.is_empty());
        registry.register(answer_schema(), answer).unwrap();

        assert!(registry.contains("test::answer"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.call("test::answer", &[]).unwrap().as_int(), Some(42));
        assert_eq!(
            registry.schema("test::answer").unwrap().signature(),
            "test::answer() -> int"
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = OperatorRegistry::new();
        registry.register(answer_schema(), answer).unwrap();
        let err = registry.register(answer_schema(), answer).unwrap_err();
        assert!(matches!(err, Error::DuplicateOperator { name } if name == "test::answer"));
    }

    #[test]
    fn test_unknown_and_mismatch() {
        let mut registry = OperatorRegistry::new();
        registry.register(answer_schema(), answer).unwrap();

        assert!(matches!(
            registry.call("test::missing", &[]),
            Err(Error::UnknownOperator { .. })
        ));
        assert!(matches!(
            registry.call("test::answer", &[IValue::Int(1)]),
            Err(Error::SchemaMismatch { .. })
        ));
    }
}
