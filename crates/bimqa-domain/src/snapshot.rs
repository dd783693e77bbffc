//! In-memory host model loaded from a JSON snapshot.
//!
//! `MemoryDocument` is the `Document` used by the CLI and the tests. Tag
//! geometry follows the host's behaviour: while a leader is attached the
//! tag's box spans the head and the leader end; freeing the leader moves the
//! head onto the leader end.

use crate::document::{Document, DocumentError};
use crate::model::{BoundingBox, Category, Element, ElementId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModelSnapshot {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_view: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selection: Vec<ElementId>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("invalid model snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("element id {0} appears more than once")]
    DuplicateElement(ElementId),
    #[error("active view {0} is not a view in the model")]
    ActiveViewNotAView(ElementId),
}

pub fn parse_snapshot(text: &str) -> Result<ModelSnapshot, SnapshotError> {
    let snapshot: ModelSnapshot = serde_json::from_str(text)?;
    Ok(snapshot)
}

#[derive(Debug)]
struct OpenGroup {
    name: String,
    saved: Vec<Element>,
}

#[derive(Debug)]
pub struct MemoryDocument {
    snapshot: ModelSnapshot,
    index: HashMap<ElementId, usize>,
    group: Option<OpenGroup>,
}

impl MemoryDocument {
    pub fn new(snapshot: ModelSnapshot) -> Result<Self, SnapshotError> {
        let mut index = HashMap::with_capacity(snapshot.elements.len());
        for (i, e) in snapshot.elements.iter().enumerate() {
            if index.insert(e.id, i).is_some() {
                return Err(SnapshotError::DuplicateElement(e.id));
            }
        }
        if let Some(active) = snapshot.active_view {
            let is_view = index
                .get(&active)
                .is_some_and(|&i| snapshot.elements[i].is_view());
            if !is_view {
                return Err(SnapshotError::ActiveViewNotAView(active));
            }
        }
        Ok(Self {
            snapshot,
            index,
            group: None,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Self::new(parse_snapshot(text)?)
    }

    pub fn snapshot(&self) -> &ModelSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> ModelSnapshot {
        self.snapshot
    }

    /// Overwrite an existing parameter value. The write is committed
    /// directly, outside any transaction group.
    pub fn set_parameter(
        &mut self,
        id: ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), DocumentError> {
        let element = self
            .element_mut(id)
            .ok_or(DocumentError::UnknownElement(id))?;
        let slot = element
            .parameters
            .get_mut(name)
            .ok_or_else(|| DocumentError::UnknownParameter {
                element: id,
                name: name.to_string(),
            })?;
        *slot = value.to_string();
        Ok(())
    }

    pub fn in_transaction(&self) -> bool {
        self.group.is_some()
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        let i = *self.index.get(&id)?;
        self.snapshot.elements.get_mut(i)
    }
}

impl Document for MemoryDocument {
    fn title(&self) -> &str {
        &self.snapshot.title
    }

    fn active_view(&self) -> Option<&Element> {
        self.snapshot.active_view.and_then(|id| self.element(id))
    }

    fn selection(&self) -> Vec<ElementId> {
        self.snapshot.selection.clone()
    }

    fn categories(&self) -> &[Category] {
        &self.snapshot.categories
    }

    fn element(&self, id: ElementId) -> Option<&Element> {
        self.index.get(&id).map(|&i| &self.snapshot.elements[i])
    }

    fn elements(&self) -> Vec<&Element> {
        self.snapshot.elements.iter().collect()
    }

    fn elements_in_view(&self, view: ElementId) -> Vec<&Element> {
        self.snapshot
            .elements
            .iter()
            .filter(|e| {
                e.owner_view == Some(view)
                    || (e.views.contains(&view) && !e.hidden_in_views.contains(&view))
            })
            .collect()
    }

    fn bounding_box(&self, id: ElementId, view: Option<ElementId>) -> Option<BoundingBox> {
        let element = self.element(id)?;
        if let Some(v) = view
            && element.hidden_in_views.contains(&v)
        {
            return None;
        }
        match element.as_tag() {
            Some(tag) => {
                let head = tag.head_box();
                match (tag.has_leader, tag.leader_end) {
                    (true, Some(end)) => Some(head.union(&BoundingBox::point(end))),
                    _ => Some(head),
                }
            }
            None => element.bounding_box,
        }
    }

    fn dependent_tags(&self, id: ElementId) -> Vec<ElementId> {
        self.snapshot
            .elements
            .iter()
            .filter(|e| e.as_tag().is_some_and(|t| t.tagged.contains(&id)))
            .map(|e| e.id)
            .collect()
    }

    fn is_hidden_in_view(&self, id: ElementId, view: ElementId) -> bool {
        self.element(id)
            .is_some_and(|e| e.hidden_in_views.contains(&view))
    }

    fn free_tag_leader(&mut self, tag: ElementId) -> Result<(), DocumentError> {
        if self.group.is_none() {
            return Err(DocumentError::NoTransaction);
        }
        let element = self
            .element_mut(tag)
            .ok_or(DocumentError::UnknownElement(tag))?;
        let facet = element.as_tag_mut().ok_or(DocumentError::NotATag(tag))?;
        let end = facet.leader_end.ok_or(DocumentError::NoLeaderEnd(tag))?;
        facet.head = end;
        facet.has_leader = false;
        Ok(())
    }

    fn begin_transaction_group(&mut self, name: &str) -> Result<(), DocumentError> {
        if let Some(open) = &self.group {
            return Err(DocumentError::TransactionOpen(open.name.clone()));
        }
        self.group = Some(OpenGroup {
            name: name.to_string(),
            saved: self.snapshot.elements.clone(),
        });
        Ok(())
    }

    fn rollback_transaction_group(&mut self) -> Result<(), DocumentError> {
        let group = self.group.take().ok_or(DocumentError::NoTransaction)?;
        tracing::debug!(group = %group.name, "rolling back transaction group");
        self.snapshot.elements = group.saved;
        Ok(())
    }
}
