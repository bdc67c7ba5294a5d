use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::autocomplete;
use super::codec::{self, CodecError};
use super::directory::Directory;
use super::document::{BillDocument, DocumentError};
use super::domain::{
    BillCategory, BillItemId, Employee, NightRate, RateSettings, Taka, RANK_SO,
};
use super::form::{EntryForm, RankChoice};
use super::gate::SettingsGate;
use super::rates::rate;
use super::reconciler::{self, parse_amount_input, BillList, EntryOutcome};
use super::store::{DirectoryStore, SnapshotSource};

/// Outcome of the one-shot snapshot load at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    Loading,
    Connected,
    NotFound,
}

/// Failures surfaced by session transitions. None of them leave partial state behind.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("settings are locked")]
    Locked,
    #[error("clearing the directory requires confirmation")]
    ConfirmationRequired,
    #[error("night rate can only be chosen for S/O entries on a night entertainment bill")]
    NightRateUnavailable,
    #[error("no bill item with id {0}")]
    UnknownItem(BillItemId),
    #[error("no employee with card number '{0}'")]
    UnknownEmployee(String),
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// All state behind one billing form: settings, the form, the bill, and the directory.
pub struct BillingSession<S> {
    settings: RateSettings,
    form: EntryForm,
    bill: BillList,
    directory: Directory,
    gate: SettingsGate,
    snapshot_status: SnapshotStatus,
    store: Arc<S>,
}

impl<S> BillingSession<S>
where
    S: DirectoryStore + 'static,
{
    /// Session over an already-built directory. Nothing is read from the store.
    pub fn new(store: Arc<S>, directory: Directory, settings_key: impl Into<String>) -> Self {
        let settings = RateSettings::default();
        Self {
            settings,
            form: EntryForm::for_category(settings.category),
            bill: BillList::new(),
            directory,
            gate: SettingsGate::new(settings_key),
            snapshot_status: SnapshotStatus::Loading,
            store,
        }
    }

    /// Merge the snapshot over the local mirror, fall back to the seed, and rewrite
    /// the mirror.
    pub fn bootstrap(
        store: Arc<S>,
        snapshot: &dyn SnapshotSource,
        settings_key: impl Into<String>,
    ) -> Self {
        let local = read_mirror(store.as_ref());
        let (remote, status) = load_snapshot(snapshot);
        let directory = Directory::load(remote, local);

        info!(
            records = directory.len(),
            snapshot = ?status,
            "employee directory loaded"
        );

        let mut session = Self::new(store, directory, settings_key);
        session.snapshot_status = status;
        session.persist();
        session
    }

    pub fn settings(&self) -> RateSettings {
        self.settings
    }

    pub fn form(&self) -> &EntryForm {
        &self.form
    }

    pub fn bill(&self) -> &BillList {
        &self.bill
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn snapshot_status(&self) -> SnapshotStatus {
        self.snapshot_status
    }

    pub fn is_unlocked(&self) -> bool {
        self.gate.is_unlocked()
    }

    /// Amount the current form would be billed at.
    pub fn current_taka(&self) -> Taka {
        rate(&self.settings, &self.form.effective_rank())
    }

    pub fn night_rate_selectable(&self) -> bool {
        self.settings.category == BillCategory::NightEntertainment
            && self.form.effective_rank() == RANK_SO
    }

    /// Switch category; every bill amount is recomputed and the form rank resets.
    pub fn set_category(&mut self, category: BillCategory) {
        self.settings.category = category;
        self.bill.recompute(&self.settings);
        self.form.reset_rank(category);
        debug!(%category, items = self.bill.len(), "bill category changed");
    }

    pub fn set_night_rate(&mut self, night_rate: NightRate) -> Result<(), BillingError> {
        if !self.night_rate_selectable() {
            return Err(BillingError::NightRateUnavailable);
        }
        self.settings.night_rate = night_rate;
        self.bill.recompute(&self.settings);
        debug!(rate = night_rate.amount(), "night rate changed");
        Ok(())
    }

    pub fn replace_form(&mut self, form: EntryForm) {
        self.form = form;
    }

    /// Name keystroke; returns the suggestions to show.
    pub fn type_name(&mut self, value: &str) -> Vec<Employee> {
        self.form.set_name(value);
        self.suggestions(value)
    }

    /// Card-number keystroke; an exact directory match fills name and rank.
    pub fn type_card_no(&mut self, value: &str) -> Vec<Employee> {
        self.form.set_card_no(value, &self.directory);
        self.suggestions(value)
    }

    pub fn set_rank(&mut self, rank: RankChoice, custom_rank: &str) {
        self.form.set_rank(rank, custom_rank);
    }

    pub fn set_remarks(&mut self, remarks: &str) {
        self.form.remarks = remarks.to_string();
    }

    /// Fill the form from the directory record with this card number.
    pub fn select_suggestion(&mut self, card_no: &str) -> Result<(), BillingError> {
        let employee = self
            .directory
            .get(card_no)
            .ok_or_else(|| BillingError::UnknownEmployee(card_no.to_string()))?;
        self.form.select(employee);
        Ok(())
    }

    pub fn suggestions(&self, query: &str) -> Vec<Employee> {
        autocomplete::suggest(query, &self.directory)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Add the current form to the bill. Blank name or card number is a no-op.
    pub fn add_entry(&mut self) -> Option<EntryOutcome> {
        let outcome = reconciler::add_entry(
            &mut self.form,
            &self.settings,
            &mut self.directory,
            &mut self.bill,
        )?;

        if outcome.directory_added {
            self.persist();
        }
        Some(outcome)
    }

    /// Add a complete form in one step. A rejected form leaves the staged form as it was.
    pub fn submit(&mut self, form: EntryForm) -> Option<EntryOutcome> {
        let staged = std::mem::replace(&mut self.form, form);
        let outcome = self.add_entry();
        if outcome.is_none() {
            self.form = staged;
        }
        outcome
    }

    pub fn update_card_no(&mut self, id: &BillItemId, card_no: &str) -> Result<(), BillingError> {
        if self.bill.update_card_no(id, card_no) {
            Ok(())
        } else {
            Err(BillingError::UnknownItem(id.clone()))
        }
    }

    /// Raw amount field edit; blank means zero.
    pub fn update_amount(&mut self, id: &BillItemId, raw: &str) -> Result<(), BillingError> {
        let taka =
            parse_amount_input(raw).ok_or_else(|| BillingError::InvalidAmount(raw.to_string()))?;
        if self.bill.update_taka(id, taka) {
            Ok(())
        } else {
            Err(BillingError::UnknownItem(id.clone()))
        }
    }

    pub fn remove_item(&mut self, id: &BillItemId) -> Result<(), BillingError> {
        if self.bill.remove(id) {
            Ok(())
        } else {
            Err(BillingError::UnknownItem(id.clone()))
        }
    }

    /// Empties the bill; the directory is untouched.
    pub fn clear_bill(&mut self) {
        self.bill.clear();
    }

    pub fn document(&self, date: NaiveDate) -> Result<BillDocument, BillingError> {
        Ok(BillDocument::new(
            self.settings.category,
            date,
            self.bill.items(),
        )?)
    }

    pub fn unlock(&mut self, key: &str) -> bool {
        let unlocked = self.gate.unlock(key);
        if !unlocked {
            warn!("settings unlock rejected");
        }
        unlocked
    }

    pub fn export_directory(&self) -> Result<String, BillingError> {
        self.ensure_unlocked()?;
        Ok(self.directory.export_all()?)
    }

    /// Merge CSV bytes into the directory; returns the resulting record count.
    /// Rows that are not valid UTF-8 are skipped like any other malformed row.
    pub fn import_directory(&mut self, csv: impl AsRef<[u8]>) -> Result<usize, BillingError> {
        self.ensure_unlocked()?;
        let imported = codec::parse(csv.as_ref());
        let parsed = imported.len();
        let total = self.directory.merge(imported);
        self.persist();
        info!(parsed, total, "directory import merged");
        Ok(total)
    }

    /// Irreversible. `confirmed` must carry the caller's explicit confirmation.
    pub fn clear_directory(&mut self, confirmed: bool) -> Result<(), BillingError> {
        self.ensure_unlocked()?;
        if !confirmed {
            return Err(BillingError::ConfirmationRequired);
        }
        self.directory.clear();
        if let Err(err) = self.store.remove() {
            warn!(error = %err, "failed to remove directory mirror");
        }
        info!("employee directory cleared");
        Ok(())
    }

    fn ensure_unlocked(&self) -> Result<(), BillingError> {
        if self.gate.is_unlocked() {
            Ok(())
        } else {
            Err(BillingError::Locked)
        }
    }

    fn persist(&self) {
        if let Err(err) = self.store.write(self.directory.records()) {
            warn!(error = %err, "failed to persist directory mirror");
        }
    }
}

fn read_mirror<S: DirectoryStore + ?Sized>(store: &S) -> Vec<Employee> {
    match store.read() {
        Ok(Some(records)) => records,
        Ok(None) => Vec::new(),
        Err(err) => {
            warn!(error = %err, "ignoring unreadable directory mirror");
            Vec::new()
        }
    }
}

fn load_snapshot(snapshot: &dyn SnapshotSource) -> (Vec<Employee>, SnapshotStatus) {
    match snapshot.fetch() {
        Ok(bytes) => {
            let records = codec::parse(&bytes[..]);
            if records.is_empty() {
                debug!("snapshot contained no usable records");
                (records, SnapshotStatus::NotFound)
            } else {
                (records, SnapshotStatus::Connected)
            }
        }
        Err(err) => {
            debug!(error = %err, "snapshot unavailable");
            (Vec::new(), SnapshotStatus::NotFound)
        }
    }
}
