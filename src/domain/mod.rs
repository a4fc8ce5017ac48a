pub mod changes;
pub mod event;
pub mod money;
pub mod status;

pub use changes::{detect_changes, ChangeKind, Snapshot, SnapshotEntry, StatusChange};
pub use event::{client_key, Event, ResolvedStatus, UniqueSale, NOT_INFORMED, NO_CRM_RECORD};
pub use money::Money;
pub use status::{classify, StatusCode};
