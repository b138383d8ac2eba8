//! # Progress Ledger
//!
//! Validation and aggregation rules for construction/contract projects, shared by
//! every entry form that records financial valuations, physical progress and
//! costs before they are sent to the project backend.
//!
//! ## Core Concepts
//!
//! - **Snapshot**: the project and its entries as last fetched from the backend.
//!   Every check is a pure function of a snapshot and a candidate entry.
//! - **Ceiling**: an upper bound cumulative entries may never exceed (offered
//!   amount for valuations, supplier advance for amortization).
//! - **Monotonic progress**: real and planned completion never decrease, and a
//!   project is locked once real progress reaches 100%.
//! - **Status lifecycle**: `PendingValuation -> PendingInvoicing -> Invoiced`,
//!   with `Invoiced` terminal.
//!
//! The backend stays the system of record. These checks reject bad input before
//! any request is made; they are advisory under concurrent edits.
//!
//! ## Example
//!
//! ```rust,ignore
//! use progress_ledger::*;
//! use chrono::NaiveDate;
//!
//! let snapshot = LedgerSnapshot::new(Project {
//!     id: 1,
//!     name: "Puente Norte".to_string(),
//!     client_reference: None,
//!     region: None,
//!     offered_amount: 10_000.0,
//!     estimated_cost: 8_000.0,
//!     advance_amount: 1_000.0,
//!     start_date: None,
//!     end_date: None,
//! });
//!
//! let ledger = snapshot.ledger()?;
//! let request = ledger.check_new_valuation(&ValuationDraft {
//!     number: Some("V-1".to_string()),
//!     amount: Some(2_500.0),
//!     start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
//!     end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
//! })?;
//! ```

pub mod aggregator;
pub mod config;
pub mod cost;
pub mod error;
pub mod format;
pub mod ledger;
pub mod progress;
pub mod report;
pub mod schema;
pub mod status;
pub mod submission;
pub mod utils;
pub mod valuation;

#[cfg(feature = "backend")]
pub mod backend;

pub use aggregator::{max_field, sum_field, ProjectTotals};
pub use config::BackendConfig;
pub use cost::{
    transition_cost, validate_amortization_edit, validate_cost_amount_edit,
    validate_cost_status_transition, validate_new_cost,
};
pub use error::{
    CostError, DateRangeError, LedgerError, ProgressError, ReportError, Result, ValuationError,
    ViolationKind,
};
pub use format::{format_amount, format_currency, format_percentage, PercentScale};
pub use ledger::ProjectLedger;
pub use progress::{progress_lock, validate_new_progress, ProgressLock};
pub use report::{
    cost_report, progress_report, project_summary_report, valuation_report, Page, ReportTable,
};
pub use schema::*;
pub use status::STATUS_TABLE;
pub use submission::{SubmissionGuard, SubmissionTicket};
pub use utils::validate_date_range;
pub use valuation::{
    transition_valuation, validate_amount_edit, validate_new_valuation,
    validate_status_transition,
};

#[cfg(feature = "backend")]
pub use backend::BackendClient;

use log::{debug, info};

/// Verifies a batch of fetched snapshots and returns their running totals.
pub fn summarize_portfolio(snapshots: &[LedgerSnapshot]) -> Result<Vec<ProjectTotals>> {
    info!("Summarizing {} projects", snapshots.len());

    snapshots
        .iter()
        .map(|snapshot| -> Result<ProjectTotals> {
            let ledger = snapshot.ledger()?;
            let totals = ledger.totals();
            debug!(
                "Project {}: valuated {:.2} of {:.2}, real progress {}%",
                totals.project_id, totals.valuated, totals.offered_amount, totals.last_real_progress
            );
            Ok(totals)
        })
        .collect()
}
