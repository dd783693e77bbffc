use crate::operation::{Operation, StageError};
use crate::operator::RunContext;
use crate::registry::ModuleRegistry;
use bimqa_types::config::to_config_json;
use bimqa_types::{
    ConfigError, ConfigType, OperationDoc, OperationSetDoc, ReportSection, peek_config_type,
};

/// An operation failed; the rest of the set was not run.
#[derive(Debug, thiserror::Error)]
#[error("operation {} of {total} failed: {source}", .index + 1)]
pub struct OperationSetError {
    /// Sections of the operations that finished before the failure.
    pub completed: Vec<ReportSection>,
    pub index: usize,
    pub total: usize,
    #[source]
    pub source: StageError,
}

/// Ordered, named list of operations.
#[derive(Clone, Debug)]
pub struct OperationSet {
    pub name: String,
    pub description: String,
    operations: Vec<Operation>,
}

impl OperationSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            operations: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operations_mut(&mut self) -> &mut [Operation] {
        &mut self.operations
    }

    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn remove(&mut self, index: usize) -> Option<Operation> {
        (index < self.operations.len()).then(|| self.operations.remove(index))
    }

    /// Replace or extend the operation list.
    pub fn load_operations(&mut self, operations: Vec<Operation>, preserve_existing: bool) {
        if !preserve_existing {
            self.operations.clear();
        }
        self.operations.extend(operations);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Run every operation in order. The first failure aborts the set.
    pub fn run(&mut self, ctx: &mut RunContext<'_>) -> Result<Vec<ReportSection>, OperationSetError> {
        let total = self.operations.len();
        tracing::info!(set = %self.name, operations = total, "running operation set");
        let mut sections = Vec::with_capacity(total);
        for (index, operation) in self.operations.iter_mut().enumerate() {
            match operation.run(ctx) {
                Ok(section) => sections.push(section),
                Err(source) => {
                    return Err(OperationSetError {
                        completed: sections,
                        index,
                        total,
                        source,
                    });
                }
            }
        }
        Ok(sections)
    }

    pub fn to_document(&self) -> OperationSetDoc {
        OperationSetDoc {
            config_type: ConfigType::OperationSet,
            name: self.name.clone(),
            description: self.description.clone(),
            operations: self.operations.iter().map(Operation::to_document).collect(),
        }
    }

    pub fn from_document(doc: &OperationSetDoc, registry: &ModuleRegistry) -> Self {
        Self {
            name: doc.name.clone(),
            description: doc.description.clone(),
            operations: doc
                .operations
                .iter()
                .map(|op| Operation::from_document(op, registry))
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        to_config_json(&self.to_document())
    }

    pub fn from_json(text: &str, registry: &ModuleRegistry) -> Result<Self, ConfigError> {
        match ConfigInstance::from_json(text, registry)? {
            ConfigInstance::OperationSet(set) => Ok(set),
            ConfigInstance::Operation(_) => Err(ConfigError::UnknownType(
                "operation (expected operation_set)".to_string(),
            )),
        }
    }

    /// Whether this set differs from the `saved` document.
    pub fn has_unsaved_changes(&self, saved: &OperationSetDoc) -> bool {
        self.to_document() != *saved
    }
}

/// A parsed config document of either type.
#[derive(Debug)]
pub enum ConfigInstance {
    Operation(Operation),
    OperationSet(OperationSet),
}

impl ConfigInstance {
    pub fn from_json(text: &str, registry: &ModuleRegistry) -> Result<Self, ConfigError> {
        match peek_config_type(text)? {
            ConfigType::Operation => {
                let doc: OperationDoc = serde_json::from_str(text)?;
                Ok(ConfigInstance::Operation(Operation::from_document(
                    &doc, registry,
                )))
            }
            ConfigType::OperationSet => {
                let doc: OperationSetDoc = serde_json::from_str(text)?;
                Ok(ConfigInstance::OperationSet(OperationSet::from_document(
                    &doc, registry,
                )))
            }
        }
    }
}
