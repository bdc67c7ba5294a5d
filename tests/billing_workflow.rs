use std::sync::Arc;

use chrono::NaiveDate;
use daily_bill::billing::{
    codec, suggest, BillCategory, BillingSession, Directory, DirectoryStore, Employee, EntryForm,
    InlineSnapshot, MemoryStore, NightRate, RankChoice, SnapshotStatus, TextBillRenderer,
    BillRenderer,
};

const KEY: &str = "Fabric2038";

fn entry(name: &str, card_no: &str, rank: RankChoice) -> EntryForm {
    EntryForm {
        name: name.to_string(),
        card_no: card_no.to_string(),
        rank,
        ..EntryForm::default()
    }
}

fn fresh_session(store: Arc<MemoryStore>) -> BillingSession<MemoryStore> {
    BillingSession::bootstrap(store, &InlineSnapshot(None), KEY)
}

#[test]
fn alice_tiffin_bill_follows_category_changes() {
    let mut session = fresh_session(Arc::new(MemoryStore::default()));

    session
        .submit(entry("Alice", "5", RankChoice::So))
        .expect("entry added");
    assert_eq!(session.bill().len(), 1);
    assert_eq!(session.bill().items()[0].taka, 50);

    session.set_category(BillCategory::Holiday);
    let item = &session.bill().items()[0];
    assert_eq!(item.taka, 800);
    assert_eq!(item.designation, "S/O");
    assert_eq!(item.name, "Alice");
}

#[test]
fn every_category_switch_rewrites_all_amounts_in_place() {
    let mut session = fresh_session(Arc::new(MemoryStore::default()));
    session.set_category(BillCategory::NightEntertainment);
    for (name, card, rank) in [
        ("Karim", "1", RankChoice::So),
        ("Rahim", "2", RankChoice::Labour),
        ("Jamal", "3", RankChoice::StoreAssistant),
    ] {
        session.submit(entry(name, card, rank)).expect("entry added");
    }
    let ids: Vec<_> = session.bill().items().iter().map(|i| i.id.clone()).collect();

    let expectations = [
        (BillCategory::Tiffin, [50, 50, 50]),
        (BillCategory::DailyLabour, [600, 600, 600]),
        (BillCategory::Holiday, [800, 600, 800]),
        (BillCategory::NightEntertainment, [350, 150, 350]),
    ];
    for (category, amounts) in expectations {
        session.set_category(category);
        let actual: Vec<_> = session.bill().items().iter().map(|i| i.taka).collect();
        assert_eq!(actual, amounts, "{category}");
        let order: Vec<_> = session.bill().items().iter().map(|i| i.id.clone()).collect();
        assert_eq!(order, ids);
    }

    session.set_night_rate(NightRate::Reduced).expect("S/O form on night bill");
    let actual: Vec<_> = session.bill().items().iter().map(|i| i.taka).collect();
    assert_eq!(actual, vec![250, 150, 250]);
}

#[test]
fn new_cards_register_once_and_known_cards_are_left_alone() {
    let store = Arc::new(MemoryStore::default());
    let mut session = fresh_session(store.clone());
    let seeded = session.directory().len();

    session
        .submit(entry("Alice", "5", RankChoice::So))
        .expect("entry added");
    assert_eq!(session.directory().len(), seeded + 1);

    let before = session.directory().clone();
    session
        .submit(entry("Someone Else", "5", RankChoice::Labour))
        .expect("entry added");
    assert_eq!(session.directory(), &before);
    assert_eq!(session.bill().len(), 2);

    let mirrored = store.read().expect("mirror readable").expect("mirror written");
    assert_eq!(mirrored.len(), seeded + 1);
    assert!(mirrored.iter().any(|e| e.card_no == "5" && e.name == "Alice"));
}

#[test]
fn blank_entries_change_nothing() {
    let mut session = fresh_session(Arc::new(MemoryStore::default()));
    let before = session.directory().clone();

    assert!(session.submit(entry("", "5", RankChoice::So)).is_none());
    assert!(session.submit(entry("Alice", "   ", RankChoice::So)).is_none());

    assert!(session.bill().is_empty());
    assert_eq!(session.directory(), &before);
}

#[test]
fn removing_and_clearing_bill_items() {
    let mut session = fresh_session(Arc::new(MemoryStore::default()));
    for card in ["1", "2", "3"] {
        session
            .submit(entry("Worker", card, RankChoice::So))
            .expect("entry added");
    }
    let middle = session.bill().items()[1].id.clone();
    session.remove_item(&middle).expect("removed");

    let cards: Vec<_> = session
        .bill()
        .items()
        .iter()
        .map(|i| i.card_no.as_str())
        .collect();
    assert_eq!(cards, vec!["1", "3"]);

    let directory_size = session.directory().len();
    session.clear_bill();
    assert!(session.bill().is_empty());
    assert_eq!(session.directory().len(), directory_size);
}

#[test]
fn import_merges_and_mirror_survives_restart() {
    let store = Arc::new(MemoryStore::default());
    let mut session = fresh_session(store.clone());
    assert!(session.unlock(KEY));

    let total = session
        .import_directory("Name,CardNo,Designation,DefaultTaka\nKarim,1,S/O,50\nRahim,2,LABOUR,600\n")
        .expect("import");
    assert_eq!(total, 3);

    let restarted = BillingSession::bootstrap(
        store,
        &InlineSnapshot(Some("Karim Server,1,S/O,50\n".to_string())),
        KEY,
    );
    assert_eq!(restarted.snapshot_status(), SnapshotStatus::Connected);
    assert_eq!(restarted.directory().len(), 3);
    assert_eq!(
        restarted.directory().get("1").expect("present").name,
        "Karim Server"
    );
    assert!(!restarted.is_unlocked());
}

#[test]
fn merge_example_from_directory_contract() {
    let mut directory = Directory::from_records([
        Employee::new("Old", "1", "S/O", 0),
        Employee::new("B", "2", "S/O", 0),
    ]);
    directory.merge([Employee::new("A", "1", "S/O", 0)]);

    let pairs: Vec<_> = directory
        .iter()
        .map(|e| (e.card_no.as_str(), e.name.as_str()))
        .collect();
    assert_eq!(pairs, vec![("1", "A"), ("2", "B")]);
}

#[test]
fn csv_round_trip_and_suggestions() {
    let text = "Name,CardNo,Designation,DefaultTaka\n Zed ,000,S/O,50\nYan,001, LABOUR ,600\nXia,999,S/O\nbroken,row\n";
    let directory = Directory::from_records(codec::parse_str(text));
    assert_eq!(directory.len(), 3);

    let exported = directory.export_all().expect("export");
    assert_eq!(
        exported,
        "Name,CardNo,Designation,DefaultTaka\nZed,000,S/O,50\nYan,001,LABOUR,600\nXia,999,S/O,0\n"
    );

    let cards: Vec<_> = suggest("00", &directory)
        .into_iter()
        .map(|e| e.card_no.as_str())
        .collect();
    assert_eq!(cards, vec!["000", "001"]);
}

#[test]
fn rendered_document_lists_entries_in_order() {
    let mut session = fresh_session(Arc::new(MemoryStore::default()));
    session.set_category(BillCategory::DailyLabour);
    session
        .submit(entry("Rahim", "2", RankChoice::Labour))
        .expect("entry added");
    session
        .submit(entry("Karim", "1", RankChoice::So))
        .expect("entry added");

    let date = NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date");
    let document = session.document(date).expect("document");
    assert_eq!(document.date, "31-12-25");
    assert_eq!(document.total, 1200);

    let text = String::from_utf8(TextBillRenderer.render(&document).expect("renders"))
        .expect("utf-8");
    let rahim = text.find("Rahim").expect("first row");
    let karim = text.find("Karim").expect("second row");
    assert!(rahim < karim);
    assert!(text.starts_with("DAILY LABOUR BILL"));
}
