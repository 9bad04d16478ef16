pub mod clock;
pub mod error;
pub mod ledger;
pub mod record;
pub mod registry;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SnapError;
pub use ledger::{LedgerPolicy, UserLedger, MAX_HISTORY, MAX_IN_WINDOW, WINDOW_SECONDS};
pub use record::Record;
pub use registry::{LedgerHandle, UserRegistry};
pub use types::{Language, UserId};
