//! Capability descriptors: the operations a substitute must answer.

use std::any::{type_name, TypeId};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{MockError, Result};
use crate::value::ReturnKind;

/// One declared parameter of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub type_name: String,
}

/// Declared error type of a fallible operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpec {
    pub type_id: TypeId,
    pub type_name: String,
}

impl ErrorSpec {
    pub fn of<E: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            type_name: type_name::<E>().to_string(),
        }
    }
}

/// Name, parameters and return type of one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSignature {
    pub name: String,
    pub params: Vec<ParamSpec>,
    pub returns: ReturnKind,
    pub error: Option<ErrorSpec>,
}

impl OperationSignature {
    /// A parameterless operation returning `()`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: ReturnKind::Unit,
            error: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            type_name: type_name.into(),
        });
        self
    }

    pub fn returns(mut self, kind: ReturnKind) -> Self {
        self.returns = kind;
        self
    }

    /// Mark the operation as returning `Result<_, E>`
    pub fn fails_with<E: 'static>(mut self) -> Self {
        self.error = Some(ErrorSpec::of::<E>());
        self
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_fallible(&self) -> bool {
        self.error.is_some()
    }
}

/// The full set of operations a substitute supports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    name: String,
    operations: Vec<OperationSignature>,
}

impl Capability {
    pub fn builder(name: impl Into<String>) -> CapabilityBuilder {
        CapabilityBuilder {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operations(&self) -> &[OperationSignature] {
        &self.operations
    }

    pub fn operation(&self, name: &str) -> Option<&OperationSignature> {
        self.operations.iter().find(|op| op.name == name)
    }

    /// Look up an operation, failing with [`MockError::UnknownOperation`]
    pub fn require(&self, name: &str) -> Result<&OperationSignature> {
        self.operation(name).ok_or_else(|| MockError::UnknownOperation {
            capability: self.name.clone(),
            operation: name.to_string(),
        })
    }
}

/// Collects operations before freezing them into a [`Capability`]
#[derive(Debug, Clone)]
pub struct CapabilityBuilder {
    name: String,
    operations: Vec<OperationSignature>,
}

impl CapabilityBuilder {
    pub fn operation(mut self, signature: OperationSignature) -> Self {
        self.operations.push(signature);
        self
    }

    /// Freeze the descriptor. Operation names must be unique.
    pub fn build(self) -> Result<Arc<Capability>> {
        let mut seen = HashSet::new();
        for op in &self.operations {
            if !seen.insert(op.name.as_str()) {
                return Err(MockError::DuplicateOperation {
                    capability: self.name.clone(),
                    operation: op.name.clone(),
                });
            }
        }

        Ok(Arc::new(Capability {
            name: self.name,
            operations: self.operations,
        }))
    }
}
