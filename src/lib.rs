// Finance Dashboard - Core Library
// Exposes the session state model for the TUI, the API server, and tests

pub mod config;
pub mod error;
pub mod format;
pub mod ledger;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod summary;

// Only compile the HTTP layer when the server feature is enabled
#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use format::{deficit_annotation, format_currency, format_currency_with};
pub use ledger::AmountTable;
pub use session::{Session, SessionId, SessionInfo, SessionRegistry};
pub use snapshot::{FinancialSnapshot, DEFAULT_DEBTS, DEFAULT_EXPENSES, DEFAULT_INCOME};
pub use store::SessionStore;
pub use summary::{
    debt_portfolio, expense_distribution, spending_breakdown, ChartData, ChartPoint,
    Distribution, Slice, SliceKind, Summary, REMAINING_LABEL,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
