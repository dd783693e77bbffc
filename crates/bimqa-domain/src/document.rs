use crate::model::{BoundingBox, Category, CategoryKind, Element, ElementId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("element {0} does not exist")]
    UnknownElement(ElementId),
    #[error("element {0} is not a tag")]
    NotATag(ElementId),
    #[error("tag {0} has no leader end to move to")]
    NoLeaderEnd(ElementId),
    #[error("element {element} has no parameter '{name}'")]
    UnknownParameter { element: ElementId, name: String },
    #[error("model modification requires an open transaction group")]
    NoTransaction,
    #[error("transaction group '{0}' is already open")]
    TransactionOpen(String),
}

/// Read/modify access to a host model.
///
/// Modifications are only allowed inside a transaction group, and every
/// group opened by the QA engine is rolled back (see
/// [`TransactionGroup`](crate::TransactionGroup)).
pub trait Document {
    fn title(&self) -> &str;

    fn active_view(&self) -> Option<&Element>;

    fn selection(&self) -> Vec<ElementId>;

    fn categories(&self) -> &[Category];

    fn element(&self, id: ElementId) -> Option<&Element>;

    /// All elements in model order.
    fn elements(&self) -> Vec<&Element>;

    /// Elements visible in `view`, including the view's own annotations.
    fn elements_in_view(&self, view: ElementId) -> Vec<&Element>;

    /// Bounding box of `id`, as drawn in `view` when given.
    fn bounding_box(&self, id: ElementId, view: Option<ElementId>) -> Option<BoundingBox>;

    /// Tags whose references include `id`.
    fn dependent_tags(&self, id: ElementId) -> Vec<ElementId>;

    fn is_hidden_in_view(&self, id: ElementId, view: ElementId) -> bool;

    /// Detach a tag's leader and move its head onto the leader end.
    fn free_tag_leader(&mut self, tag: ElementId) -> Result<(), DocumentError>;

    fn begin_transaction_group(&mut self, name: &str) -> Result<(), DocumentError>;

    fn rollback_transaction_group(&mut self) -> Result<(), DocumentError>;

    /// Non-template and template views alike.
    fn views(&self) -> Vec<&Element> {
        self.elements().into_iter().filter(|e| e.is_view()).collect()
    }

    fn category(&self, name: &str) -> Option<&Category> {
        self.categories().iter().find(|c| c.name == name)
    }

    /// Sorted model category names.
    fn model_category_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .categories()
            .iter()
            .filter(|c| c.kind == CategoryKind::Model)
            .map(|c| c.name.clone())
            .collect();
        names.sort();
        names
    }
}
