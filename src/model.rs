//! Weighted items and per-side aggregates
//!
//! Items are owned by whoever edits them; the visualization only reads them.

use serde::{Deserialize, Serialize};

/// Lowest weight an item may carry
pub const MIN_WEIGHT: u8 = 1;
/// Highest weight an item may carry
pub const MAX_WEIGHT: u8 = 10;

/// Which pan of the balance an item belongs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Pro,
    Con,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Pro, Side::Con];

    pub fn label(&self) -> &'static str {
        match self {
            Side::Pro => "pro",
            Side::Con => "con",
        }
    }
}

/// One labeled item with an importance weight in `MIN_WEIGHT..=MAX_WEIGHT`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedItem {
    pub id: u64,
    pub label: String,
    pub weight: u8,
}

impl WeightedItem {
    pub fn new(id: u64, label: impl Into<String>, weight: u8) -> Self {
        Self {
            id,
            label: label.into(),
            weight,
        }
    }
}

/// Item counts and weight sums for both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub pro_count: usize,
    pub con_count: usize,
    pub pro_weight: u32,
    pub con_weight: u32,
}

impl Tally {
    pub fn of(pros: &[WeightedItem], cons: &[WeightedItem]) -> Self {
        let sum = |items: &[WeightedItem]| items.iter().map(|i| u32::from(i.weight)).sum();
        Self {
            pro_count: pros.len(),
            con_count: cons.len(),
            pro_weight: sum(pros),
            con_weight: sum(cons),
        }
    }

    /// The side with the larger weight sum, if any
    pub fn leaning(&self) -> Option<Side> {
        match self.pro_weight.cmp(&self.con_weight) {
            std::cmp::Ordering::Greater => Some(Side::Pro),
            std::cmp::Ordering::Less => Some(Side::Con),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// One-line readout, e.g. for a window title
    pub fn summary(&self) -> String {
        format!(
            "Pros: {} items ({}) | Cons: {} items ({})",
            self.pro_count, self.pro_weight, self.con_count, self.con_weight
        )
    }
}
