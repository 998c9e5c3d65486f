//! Editable pros and cons lists
//!
//! Stands in for the data-entry form that owns the collections. Every edit is
//! validated here; a rejected edit leaves the ledger as it was.

use thiserror::Error;

use crate::model::{Side, Tally, WeightedItem, MAX_WEIGHT, MIN_WEIGHT};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("an item needs a non-empty label")]
    BlankLabel,

    #[error("weight {0} is outside {min}..={max}", min = MIN_WEIGHT, max = MAX_WEIGHT)]
    WeightOutOfRange(u8),

    #[error("no item with id {0}")]
    UnknownItem(u64),
}

/// The two collections, owned and edited outside the visualization
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pros: Vec<WeightedItem>,
    cons: Vec<WeightedItem>,
    next_id: u64,
}

fn check_weight(weight: u8) -> Result<u8, LedgerError> {
    if (MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
        Ok(weight)
    } else {
        Err(LedgerError::WeightOutOfRange(weight))
    }
}

fn check_label(label: &str) -> Result<String, LedgerError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        Err(LedgerError::BlankLabel)
    } else {
        Ok(trimmed.to_string())
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item to `side` and return its id
    pub fn add(&mut self, side: Side, label: &str, weight: u8) -> Result<u64, LedgerError> {
        let label = check_label(label)?;
        let weight = check_weight(weight)?;

        self.next_id += 1;
        let id = self.next_id;
        self.side_mut(side).push(WeightedItem { id, label, weight });
        log::debug!("Added {} item {} with weight {}", side.label(), id, weight);
        Ok(id)
    }

    pub fn set_weight(&mut self, id: u64, weight: u8) -> Result<(), LedgerError> {
        let weight = check_weight(weight)?;
        self.find_mut(id)?.weight = weight;
        Ok(())
    }

    pub fn set_label(&mut self, id: u64, label: &str) -> Result<(), LedgerError> {
        let label = check_label(label)?;
        self.find_mut(id)?.label = label;
        Ok(())
    }

    pub fn remove(&mut self, id: u64) -> Result<WeightedItem, LedgerError> {
        for side in Side::BOTH {
            let items = self.side_mut(side);
            if let Some(index) = items.iter().position(|item| item.id == id) {
                return Ok(items.remove(index));
            }
        }
        Err(LedgerError::UnknownItem(id))
    }

    /// Remove the most recently added item on `side`, if any
    pub fn remove_last(&mut self, side: Side) -> Option<WeightedItem> {
        self.side_mut(side).pop()
    }

    pub fn clear(&mut self) {
        self.pros.clear();
        self.cons.clear();
    }

    pub fn pros(&self) -> &[WeightedItem] {
        &self.pros
    }

    pub fn cons(&self) -> &[WeightedItem] {
        &self.cons
    }

    pub fn is_empty(&self) -> bool {
        self.pros.is_empty() && self.cons.is_empty()
    }

    pub fn tally(&self) -> Tally {
        Tally::of(&self.pros, &self.cons)
    }

    /// Owned copies of both collections, as handed to the visualization
    pub fn snapshot(&self) -> (Vec<WeightedItem>, Vec<WeightedItem>) {
        (self.pros.clone(), self.cons.clone())
    }

    fn side_mut(&mut self, side: Side) -> &mut Vec<WeightedItem> {
        match side {
            Side::Pro => &mut self.pros,
            Side::Con => &mut self.cons,
        }
    }

    fn find_mut(&mut self, id: u64) -> Result<&mut WeightedItem, LedgerError> {
        self.pros
            .iter_mut()
            .chain(self.cons.iter_mut())
            .find(|item| item.id == id)
            .ok_or(LedgerError::UnknownItem(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_trims_and_assigns_ids() {
        let mut ledger = Ledger::new();
        let a = ledger.add(Side::Pro, "  Closer to work ", 7).unwrap();
        let b = ledger.add(Side::Con, "Higher rent", 9).unwrap();
        assert_ne!(a, b);
        assert_eq!(ledger.pros()[0].label, "Closer to work");
        assert_eq!(ledger.cons()[0].weight, 9);
        assert_eq!(ledger.tally().con_weight, 9);
    }

    #[test]
    fn test_invalid_input_is_rejected_without_change() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.add(Side::Pro, "   ", 5), Err(LedgerError::BlankLabel));
        assert_eq!(
            ledger.add(Side::Pro, "Too heavy", 11),
            Err(LedgerError::WeightOutOfRange(11))
        );
        assert_eq!(
            ledger.add(Side::Pro, "Weightless", 0),
            Err(LedgerError::WeightOutOfRange(0))
        );
        assert!(ledger.is_empty());

        let id = ledger.add(Side::Pro, "Fine", 5).unwrap();
        assert!(ledger.set_weight(id, 12).is_err());
        assert!(ledger.set_label(id, "").is_err());
        assert_eq!(ledger.pros()[0], WeightedItem::new(id, "Fine", 5));
    }

    #[test]
    fn test_edits_and_removal() {
        let mut ledger = Ledger::new();
        let id = ledger.add(Side::Con, "Noisy", 2).unwrap();
        ledger.set_weight(id, 8).unwrap();
        ledger.set_label(id, "Very noisy").unwrap();
        assert_eq!(ledger.cons()[0], WeightedItem::new(id, "Very noisy", 8));

        assert_eq!(ledger.remove(id).unwrap().weight, 8);
        assert_eq!(ledger.remove(id), Err(LedgerError::UnknownItem(id)));
        assert_eq!(ledger.set_weight(id, 3), Err(LedgerError::UnknownItem(id)));
    }

    #[test]
    fn test_remove_last_and_clear() {
        let mut ledger = Ledger::new();
        ledger.add(Side::Pro, "first", 1).unwrap();
        ledger.add(Side::Pro, "second", 2).unwrap();
        ledger.add(Side::Con, "third", 3).unwrap();

        assert_eq!(ledger.remove_last(Side::Pro).unwrap().label, "second");
        let (pros, cons) = ledger.snapshot();
        assert_eq!(pros.len(), 1);
        assert_eq!(cons.len(), 1);

        ledger.clear();
        assert!(ledger.is_empty());
        assert!(ledger.remove_last(Side::Con).is_none());
    }
}
