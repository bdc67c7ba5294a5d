use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Whole taka. Rates, default amounts and edited amounts all use this unit.
pub type Taka = u32;

pub const RANK_SO: &str = "S/O";
pub const RANK_LABOUR: &str = "LABOUR";
pub const RANK_STORE_ASSISTANT: &str = "STORE ASSISTANT";
pub const RANK_OTHER: &str = "OTHER";

static EMPLOYEE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ITEM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for a directory record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    pub fn next() -> Self {
        let id = EMPLOYEE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("emp-{id:06}"))
    }
}

/// Opaque identifier for a bill line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillItemId(pub String);

impl BillItemId {
    pub fn next() -> Self {
        let id = ITEM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("item-{id:06}"))
    }
}

impl fmt::Display for BillItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directory record keyed by card number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(default = "EmployeeId::next")]
    pub id: EmployeeId,
    pub name: String,
    pub card_no: String,
    pub designation: String,
    pub default_taka: Taka,
}

impl Employee {
    pub fn new(
        name: impl Into<String>,
        card_no: impl Into<String>,
        designation: impl Into<String>,
        default_taka: Taka,
    ) -> Self {
        Self {
            id: EmployeeId::next(),
            name: name.into(),
            card_no: card_no.into(),
            designation: designation.into(),
            default_taka,
        }
    }
}

/// One line of the bill being composed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    pub id: BillItemId,
    pub name: String,
    pub card_no: String,
    pub designation: String,
    pub taka: Taka,
    pub remarks: String,
}

/// Billing rule-set selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillCategory {
    #[default]
    Tiffin,
    DailyLabour,
    Holiday,
    NightEntertainment,
}

impl BillCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BillCategory::Tiffin => "TIFFIN",
            BillCategory::DailyLabour => "DAILY LABOUR",
            BillCategory::Holiday => "HOLIDAY",
            BillCategory::NightEntertainment => "NIGHT ENTERTAINMENT",
        }
    }

    /// Accepts `night_entertainment`, `Night Entertainment`, `night-entertainment`, etc.
    pub fn from_label(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        match normalized.as_str() {
            "TIFFIN" => Some(BillCategory::Tiffin),
            "DAILY_LABOUR" => Some(BillCategory::DailyLabour),
            "HOLIDAY" => Some(BillCategory::Holiday),
            "NIGHT_ENTERTAINMENT" => Some(BillCategory::NightEntertainment),
            _ => None,
        }
    }

    /// Rank the entry form falls back to after a reset.
    pub fn default_rank(&self) -> &'static str {
        match self {
            BillCategory::DailyLabour => RANK_LABOUR,
            _ => RANK_SO,
        }
    }
}

impl fmt::Display for BillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Night entertainment amount for non-labour ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum NightRate {
    #[default]
    Standard,
    Reduced,
}

impl NightRate {
    pub fn amount(&self) -> Taka {
        match self {
            NightRate::Standard => 350,
            NightRate::Reduced => 250,
        }
    }

    pub fn from_amount(amount: Taka) -> Option<Self> {
        match amount {
            350 => Some(NightRate::Standard),
            250 => Some(NightRate::Reduced),
            _ => None,
        }
    }
}

impl TryFrom<u32> for NightRate {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_amount(value).ok_or_else(|| format!("night rate must be 350 or 250, got {value}"))
    }
}

impl From<NightRate> for u32 {
    fn from(value: NightRate) -> Self {
        value.amount()
    }
}

/// Explicit rate configuration threaded through every rate computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RateSettings {
    pub category: BillCategory,
    pub night_rate: NightRate,
}

impl RateSettings {
    pub fn new(category: BillCategory) -> Self {
        Self {
            category,
            night_rate: NightRate::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_parse_loosely() {
        assert_eq!(
            BillCategory::from_label("night entertainment"),
            Some(BillCategory::NightEntertainment)
        );
        assert_eq!(
            BillCategory::from_label(" daily-labour "),
            Some(BillCategory::DailyLabour)
        );
        assert_eq!(BillCategory::from_label("HOLIDAY"), Some(BillCategory::Holiday));
        assert_eq!(BillCategory::from_label("overtime"), None);
    }

    #[test]
    fn night_rate_only_accepts_known_amounts() {
        assert_eq!(NightRate::from_amount(250), Some(NightRate::Reduced));
        assert!(NightRate::try_from(300).is_err());
        let parsed: NightRate = serde_json::from_str("350").expect("valid rate");
        assert_eq!(parsed, NightRate::Standard);
    }

    #[test]
    fn identifiers_are_unique() {
        let first = BillItemId::next();
        let second = BillItemId::next();
        assert_ne!(first, second);
        assert!(first.0.starts_with("item-"));
    }
}
