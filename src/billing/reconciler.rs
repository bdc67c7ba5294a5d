use serde::Serialize;
use tracing::debug;

use super::directory::Directory;
use super::domain::{BillItem, BillItemId, Employee, RateSettings, Taka};
use super::form::EntryForm;
use super::rates::rate;

/// Ordered bill lines. Insertion order is the serial order and is never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BillList {
    items: Vec<BillItem>,
}

impl BillList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[BillItem] {
        &self.items
    }

    pub fn get(&self, id: &BillItemId) -> Option<&BillItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.taka)).sum()
    }

    pub fn push(&mut self, item: BillItem) {
        self.items.push(item);
    }

    /// Returns `true` when an item with this id existed.
    pub fn remove(&mut self, id: &BillItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Rewrite every amount from the item's stored rank. Manual edits do not survive.
    pub fn recompute(&mut self, settings: &RateSettings) {
        for item in &mut self.items {
            item.taka = rate(settings, &item.designation);
        }
    }

    /// Free-text edit; the directory is not consulted and amounts are untouched.
    pub fn update_card_no(&mut self, id: &BillItemId, card_no: impl Into<String>) -> bool {
        match self.item_mut(id) {
            Some(item) => {
                item.card_no = card_no.into();
                true
            }
            None => false,
        }
    }

    pub fn update_taka(&mut self, id: &BillItemId, taka: Taka) -> bool {
        match self.item_mut(id) {
            Some(item) => {
                item.taka = taka;
                true
            }
            None => false,
        }
    }

    fn item_mut(&mut self, id: &BillItemId) -> Option<&mut BillItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }
}

/// Raw amount field input. Blank means zero.
pub fn parse_amount_input(raw: &str) -> Option<Taka> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    trimmed.parse().ok()
}

/// Result of a successful [`add_entry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryOutcome {
    pub item: BillItem,
    pub directory_added: bool,
}

/// Append the form as a bill line, register unknown card numbers, and reset the form.
///
/// Returns `None` and changes nothing when the trimmed name or card number is blank.
pub fn add_entry(
    form: &mut EntryForm,
    settings: &RateSettings,
    directory: &mut Directory,
    bill: &mut BillList,
) -> Option<EntryOutcome> {
    if !form.is_complete() {
        debug!("ignoring entry with blank name or card number");
        return None;
    }

    let rank = form.effective_rank();
    let taka = rate(settings, &rank);
    let name = form.name.trim().to_string();
    let card_no = form.card_no.trim().to_string();

    let item = BillItem {
        id: BillItemId::next(),
        name: name.clone(),
        card_no: card_no.clone(),
        designation: rank.clone(),
        taka,
        remarks: form.remarks.clone(),
    };
    bill.push(item.clone());

    let directory_added = directory.insert_if_absent(Employee::new(name, card_no, rank, taka));

    form.reset(settings.category);

    Some(EntryOutcome {
        item,
        directory_added,
    })
}
