use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::codec::{self, CodecError};
use super::domain::{Employee, RANK_SO};

/// How a source treats card numbers that are already present when it is folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    /// Replace existing records that share a card number.
    Override,
    /// Only add card numbers that are not yet present.
    FillGaps,
}

/// One input to [`Directory::fold`].
#[derive(Debug, Clone)]
pub struct DirectorySource {
    pub label: &'static str,
    pub precedence: Precedence,
    pub records: Vec<Employee>,
}

impl DirectorySource {
    pub fn new(label: &'static str, precedence: Precedence, records: Vec<Employee>) -> Self {
        Self {
            label,
            precedence,
            records,
        }
    }
}

/// Card-number keyed employee profiles, kept in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Directory {
    records: Vec<Employee>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = Employee>) -> Self {
        let mut directory = Self::new();
        for record in records {
            directory.upsert(record);
        }
        directory
    }

    /// Built-in records used when no other source yields anything.
    pub fn seed() -> Vec<Employee> {
        vec![Employee::new("Demo Employee", "000", RANK_SO, 50)]
    }

    /// Fold sources left to right. Each source applies its own precedence against
    /// everything folded before it.
    pub fn fold(sources: impl IntoIterator<Item = DirectorySource>) -> Self {
        sources
            .into_iter()
            .fold(Self::new(), |mut directory, source| {
                let before = directory.len();
                let offered = source.records.len();
                for record in source.records {
                    match source.precedence {
                        Precedence::Override => directory.upsert(record),
                        Precedence::FillGaps => {
                            directory.insert_if_absent(record);
                        }
                    }
                }
                debug!(
                    source = source.label,
                    offered,
                    added = directory.len() - before,
                    "directory source folded"
                );
                directory
            })
    }

    /// Startup merge: the snapshot wins ties, local records fill gaps, and the seed
    /// is used only when both are empty.
    pub fn load(snapshot: Vec<Employee>, local: Vec<Employee>) -> Self {
        let directory = Self::fold([
            DirectorySource::new("snapshot", Precedence::Override, snapshot),
            DirectorySource::new("local", Precedence::FillGaps, local),
        ]);

        if directory.is_empty() {
            Self::from_records(Self::seed())
        } else {
            directory
        }
    }

    pub fn upsert(&mut self, record: Employee) {
        match self.index.get(&record.card_no) {
            Some(&position) => self.records[position] = record,
            None => {
                self.index.insert(record.card_no.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Returns `true` when the record was added.
    pub fn insert_if_absent(&mut self, record: Employee) -> bool {
        if self.index.contains_key(&record.card_no) {
            return false;
        }
        self.upsert(record);
        true
    }

    /// Imported records replace existing ones on card-number collision.
    pub fn merge(&mut self, imported: impl IntoIterator<Item = Employee>) -> usize {
        for record in imported {
            self.upsert(record);
        }
        self.len()
    }

    pub fn get(&self, card_no: &str) -> Option<&Employee> {
        self.index.get(card_no).map(|&position| &self.records[position])
    }

    pub fn contains(&self, card_no: &str) -> bool {
        self.index.contains_key(card_no)
    }

    pub fn export_all(&self) -> Result<String, CodecError> {
        codec::serialize(&self.records)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Employee> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Employee] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(card_no: &str, name: &str) -> Employee {
        Employee::new(name, card_no, RANK_SO, 50)
    }

    fn names(directory: &Directory) -> Vec<(&str, &str)> {
        directory
            .iter()
            .map(|e| (e.card_no.as_str(), e.name.as_str()))
            .collect()
    }

    #[test]
    fn merge_prefers_imported_records_and_keeps_the_rest() {
        let mut directory =
            Directory::from_records([employee("1", "Old"), employee("2", "B")]);

        let total = directory.merge([employee("1", "A")]);

        assert_eq!(total, 2);
        assert_eq!(names(&directory), vec![("1", "A"), ("2", "B")]);
    }

    #[test]
    fn load_lets_snapshot_win_and_local_fill_gaps() {
        let snapshot = vec![employee("1", "Server"), employee("3", "C")];
        let local = vec![employee("1", "Local"), employee("2", "B")];

        let directory = Directory::load(snapshot, local);

        assert_eq!(
            names(&directory),
            vec![("1", "Server"), ("3", "C"), ("2", "B")]
        );
    }

    #[test]
    fn duplicate_cards_within_one_source_follow_its_precedence() {
        let snapshot = vec![
            employee("1", "Server First"),
            employee("2", "Server Only"),
            employee("1", "Server Last"),
        ];
        let local = vec![
            employee("3", "Local First"),
            employee("3", "Local Last"),
            employee("1", "Local"),
        ];

        let directory = Directory::load(snapshot, local);

        assert_eq!(
            names(&directory),
            vec![("1", "Server Last"), ("2", "Server Only"), ("3", "Local First")]
        );
    }

    #[test]
    fn load_falls_back_to_seed_when_everything_is_empty() {
        let directory = Directory::load(Vec::new(), Vec::new());
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.get("000").expect("seed").name, "Demo Employee");

        let directory = Directory::load(Vec::new(), vec![employee("7", "Local")]);
        assert!(!directory.contains("000"));
    }

    #[test]
    fn fold_respects_source_order() {
        let directory = Directory::fold([
            DirectorySource::new("base", Precedence::Override, vec![employee("1", "First")]),
            DirectorySource::new("gaps", Precedence::FillGaps, vec![employee("1", "Ignored")]),
            DirectorySource::new("import", Precedence::Override, vec![employee("1", "Last")]),
        ]);
        assert_eq!(names(&directory), vec![("1", "Last")]);
    }

    #[test]
    fn card_numbers_stay_unique() {
        let mut directory = Directory::new();
        directory.upsert(employee("9", "A"));
        directory.upsert(employee("9", "B"));
        assert!(!directory.insert_if_absent(employee("9", "C")));
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.get("9").expect("present").name, "B");
    }

    #[test]
    fn clear_empties_the_directory() {
        let mut directory = Directory::from_records([employee("1", "A")]);
        directory.clear();
        assert!(directory.is_empty());
        assert!(!directory.contains("1"));
        assert_eq!(
            directory.export_all().expect("export"),
            "Name,CardNo,Designation,DefaultTaka\n"
        );
    }
}
