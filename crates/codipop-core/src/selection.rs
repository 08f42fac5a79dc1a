//! Ordered, bounded selection of garment ids for one fitting session.
//!
//! Insertion order is the order garments are attached to the composition
//! request. The set never holds duplicates and never exceeds its capacity;
//! an add at capacity is rejected and leaves the selection untouched.

use serde::Serialize;

/// Result of a [`SelectionSet::toggle`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    /// False only when an add was rejected at capacity.
    pub accepted: bool,
    /// Selection after the call, in insertion order.
    pub selection: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<String>,
    max: usize,
}

impl SelectionSet {
    pub fn new(max: usize) -> Self {
        Self {
            ids: Vec::with_capacity(max),
            max,
        }
    }

    /// Remove `garment_id` if present, otherwise append it if there is room.
    pub fn toggle(&mut self, garment_id: &str) -> ToggleOutcome {
        let accepted = if let Some(pos) = self.ids.iter().position(|id| id == garment_id) {
            self.ids.remove(pos);
            true
        } else if self.ids.len() < self.max {
            self.ids.push(garment_id.to_string());
            true
        } else {
            false
        };

        ToggleOutcome {
            accepted,
            selection: self.ids.clone(),
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that no longer refer to a wardrobe item.
    pub fn retain_existing<S: AsRef<str>>(&mut self, existing: &[S]) {
        self.ids
            .retain(|id| existing.iter().any(|e| e.as_ref() == id.as_str()));
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, garment_id: &str) -> bool {
        self.ids.iter().any(|id| id == garment_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }
}
