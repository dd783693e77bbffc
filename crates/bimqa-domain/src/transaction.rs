use crate::document::{Document, DocumentError};
use std::ops::{Deref, DerefMut};

/// Temporary transaction group: every change made through it is rolled back
/// when it is dropped, whether the work inside succeeded or not.
pub struct TransactionGroup<'d> {
    doc: &'d mut dyn Document,
    name: String,
}

impl<'d> TransactionGroup<'d> {
    pub fn start(doc: &'d mut dyn Document, name: &str) -> Result<Self, DocumentError> {
        doc.begin_transaction_group(name)?;
        tracing::debug!(group = name, "transaction group started");
        Ok(Self {
            doc,
            name: name.to_string(),
        })
    }
}

impl<'d> Deref for TransactionGroup<'d> {
    type Target = dyn Document + 'd;

    fn deref(&self) -> &Self::Target {
        self.doc
    }
}

impl<'d> DerefMut for TransactionGroup<'d> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.doc
    }
}

impl Drop for TransactionGroup<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.doc.rollback_transaction_group() {
            tracing::error!(group = %self.name, error = %err, "failed to roll back transaction group");
        }
    }
}
