//! Bill composition: rate rules, the employee directory, and the entry workflow.

pub mod autocomplete;
pub mod codec;
pub mod directory;
pub mod document;
pub mod domain;
pub mod form;
pub mod gate;
pub mod rates;
pub mod reconciler;
pub mod router;
pub mod session;
pub mod store;

pub use autocomplete::{suggest, SUGGESTION_LIMIT};
pub use codec::CodecError;
pub use directory::{Directory, DirectorySource, Precedence};
pub use document::{parse_bill_date, BillDocument, BillRenderer, DocumentError, TextBillRenderer};
pub use domain::{
    BillCategory, BillItem, BillItemId, Employee, EmployeeId, NightRate, RateSettings, Taka,
};
pub use form::{EntryForm, RankChoice};
pub use gate::SettingsGate;
pub use rates::{rate, rate_for_label};
pub use reconciler::{add_entry, BillList, EntryOutcome};
pub use router::{billing_router, SharedSession};
pub use session::{BillingError, BillingSession, SnapshotStatus};
pub use store::{
    DirectoryStore, FileSnapshot, InlineSnapshot, JsonFileStore, MemoryStore, SnapshotError,
    SnapshotSource, StoreError,
};
