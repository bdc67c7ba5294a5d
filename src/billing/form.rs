use serde::{Deserialize, Serialize};

use super::directory::Directory;
use super::domain::{
    BillCategory, Employee, RANK_LABOUR, RANK_OTHER, RANK_SO, RANK_STORE_ASSISTANT,
};

/// Rank selector on the entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankChoice {
    #[default]
    #[serde(rename = "S/O")]
    So,
    #[serde(rename = "LABOUR")]
    Labour,
    #[serde(rename = "STORE ASSISTANT")]
    StoreAssistant,
    /// Free-text rank carried in [`EntryForm::custom_rank`].
    #[serde(rename = "OTHER")]
    Other,
}

impl RankChoice {
    pub fn label(&self) -> &'static str {
        match self {
            RankChoice::So => RANK_SO,
            RankChoice::Labour => RANK_LABOUR,
            RankChoice::StoreAssistant => RANK_STORE_ASSISTANT,
            RankChoice::Other => RANK_OTHER,
        }
    }

    /// Canonical choice for an exact rank string, if there is one.
    pub fn canonical(rank: &str) -> Option<Self> {
        match rank {
            RANK_SO => Some(RankChoice::So),
            RANK_LABOUR => Some(RankChoice::Labour),
            RANK_STORE_ASSISTANT => Some(RankChoice::StoreAssistant),
            _ => None,
        }
    }

    fn default_for(category: BillCategory) -> Self {
        Self::canonical(category.default_rank()).unwrap_or_default()
    }
}

/// In-progress entry, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntryForm {
    pub name: String,
    pub card_no: String,
    pub rank: RankChoice,
    pub custom_rank: String,
    pub remarks: String,
}

impl EntryForm {
    pub fn for_category(category: BillCategory) -> Self {
        Self {
            rank: RankChoice::default_for(category),
            ..Self::default()
        }
    }

    /// Blank fields and the category's default rank.
    pub fn reset(&mut self, category: BillCategory) {
        *self = Self::for_category(category);
    }

    /// Rank and custom text revert to the category default; typed fields stay.
    pub fn reset_rank(&mut self, category: BillCategory) {
        self.rank = RankChoice::default_for(category);
        self.custom_rank.clear();
    }

    /// `OTHER` resolves to the trimmed custom text, or the literal `OTHER` when blank.
    pub fn effective_rank(&self) -> String {
        match self.rank {
            RankChoice::Other => {
                let custom = self.custom_rank.trim();
                if custom.is_empty() {
                    RANK_OTHER.to_string()
                } else {
                    custom.to_string()
                }
            }
            canonical => canonical.label().to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.card_no.trim().is_empty()
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.name = value.into();
    }

    /// Typing a card number that exactly matches a directory record pulls in its
    /// name and rank.
    pub fn set_card_no(&mut self, value: impl Into<String>, directory: &Directory) {
        self.card_no = value.into();
        if let Some(found) = directory.get(self.card_no.trim()) {
            self.name = found.name.clone();
            self.apply_rank(&found.designation);
        }
    }

    pub fn set_rank(&mut self, rank: RankChoice, custom_rank: impl Into<String>) {
        self.rank = rank;
        self.custom_rank = match rank {
            RankChoice::Other => custom_rank.into(),
            _ => String::new(),
        };
    }

    /// Overwrite the form with a chosen suggestion.
    pub fn select(&mut self, employee: &Employee) {
        self.name = employee.name.clone();
        self.card_no = employee.card_no.clone();
        self.apply_rank(&employee.designation);
        self.remarks.clear();
    }

    fn apply_rank(&mut self, designation: &str) {
        match RankChoice::canonical(designation) {
            Some(choice) => {
                self.rank = choice;
                self.custom_rank.clear();
            }
            None => {
                self.rank = RankChoice::Other;
                self.custom_rank = designation.to_string();
            }
        }
    }
}
