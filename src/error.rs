use crate::schema::{EntryId, EntryKind, ProcessStatus, ProjectId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable failure taxonomy that entry forms translate into user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ViolationKind {
    MissingFields,
    InvalidDateRange,
    OutOfBounds,
    DuplicateValuationNumber,
    BudgetExceeded,
    AmortizationExceeded,
    RegressionReal,
    RegressionPlanned,
    ProjectLocked,
    InvalidTransition,
    InvoiceNumberRequired,
    UnknownEntry,
    SubmissionInFlight,
    BackendError,
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DateRangeError {
    #[error("Both start and end dates are required")]
    MissingDate,

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    #[error("Missing required valuation fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid valuation period: {0}")]
    InvalidDateRange(#[from] DateRangeError),

    #[error("Valuation number '{0}' already exists for this project")]
    DuplicateValuationNumber(String),

    #[error("Valuations would total {total:.2}, exceeding the offered amount {ceiling:.2} (remaining {remaining:.2})")]
    BudgetExceeded {
        total: f64,
        ceiling: f64,
        remaining: f64,
    },

    #[error("Status change from {from} to {to} is not allowed")]
    InvalidTransition {
        from: ProcessStatus,
        to: ProcessStatus,
    },

    #[error("An invoice number is required to mark a valuation as invoiced")]
    InvoiceNumberRequired,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgressError {
    #[error("Missing required progress fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid progress period: {0}")]
    InvalidDateRange(#[from] DateRangeError),

    #[error("{field} progress {value} must be between 1 and 100")]
    OutOfBounds { field: &'static str, value: f64 },

    #[error("Real progress already reached 100%; no further entries are accepted")]
    ProjectLocked,

    #[error("Real progress {attempted} is below the last recorded {last}")]
    RegressionReal { attempted: f64, last: f64 },

    #[error("Planned progress {attempted} is below the last recorded {last}")]
    RegressionPlanned { attempted: f64, last: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CostError {
    #[error("Missing required cost fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid cost period: {0}")]
    InvalidDateRange(#[from] DateRangeError),

    #[error("Amortization {requested:.2} exceeds the remaining advance {remaining:.2}")]
    AmortizationExceeded { requested: f64, remaining: f64 },

    #[error("No cost entry with id {0}")]
    UnknownEntry(EntryId),

    #[error("Status change from {from} to {to} is not allowed")]
    InvalidTransition {
        from: ProcessStatus,
        to: ProcessStatus,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Page size must be greater than zero")]
    InvalidPageSize,

    #[error("Page numbers start at 1, got {0}")]
    InvalidPage(usize),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error(transparent)]
    Cost(#[from] CostError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("{kind} entry {id} is not part of the current snapshot")]
    UnknownEntry { kind: EntryKind, id: EntryId },

    #[error("{kind} entry {id} belongs to project {found}, not {expected}")]
    ForeignEntry {
        kind: EntryKind,
        id: EntryId,
        expected: ProjectId,
        found: ProjectId,
    },

    #[error("A {kind} submission for project {project_id} is already in progress")]
    SubmissionInFlight { kind: EntryKind, project_id: ProjectId },

    #[error("Backend rejected the request (status {status}): {message}")]
    Backend { status: u16, message: String },

    #[cfg(feature = "backend")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DateRangeError {
    pub fn kind(&self) -> ViolationKind {
        ViolationKind::InvalidDateRange
    }
}

impl ValuationError {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Self::MissingFields(_) => ViolationKind::MissingFields,
            Self::InvalidDateRange(_) => ViolationKind::InvalidDateRange,
            Self::DuplicateValuationNumber(_) => ViolationKind::DuplicateValuationNumber,
            Self::BudgetExceeded { .. } => ViolationKind::BudgetExceeded,
            Self::InvalidTransition { .. } => ViolationKind::InvalidTransition,
            Self::InvoiceNumberRequired => ViolationKind::InvoiceNumberRequired,
        }
    }
}

impl ProgressError {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Self::MissingFields(_) => ViolationKind::MissingFields,
            Self::InvalidDateRange(_) => ViolationKind::InvalidDateRange,
            Self::OutOfBounds { .. } => ViolationKind::OutOfBounds,
            Self::ProjectLocked => ViolationKind::ProjectLocked,
            Self::RegressionReal { .. } => ViolationKind::RegressionReal,
            Self::RegressionPlanned { .. } => ViolationKind::RegressionPlanned,
        }
    }
}

impl CostError {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Self::MissingFields(_) => ViolationKind::MissingFields,
            Self::InvalidDateRange(_) => ViolationKind::InvalidDateRange,
            Self::AmortizationExceeded { .. } => ViolationKind::AmortizationExceeded,
            Self::UnknownEntry(_) => ViolationKind::UnknownEntry,
            Self::InvalidTransition { .. } => ViolationKind::InvalidTransition,
        }
    }
}

impl LedgerError {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Self::DateRange(e) => e.kind(),
            Self::Valuation(e) => e.kind(),
            Self::Progress(e) => e.kind(),
            Self::Cost(e) => e.kind(),
            Self::UnknownEntry { .. } | Self::ForeignEntry { .. } => ViolationKind::UnknownEntry,
            Self::SubmissionInFlight { .. } => ViolationKind::SubmissionInFlight,
            Self::Backend { .. } => ViolationKind::BackendError,
            #[cfg(feature = "backend")]
            Self::Http(_) => ViolationKind::BackendError,
            Self::Report(_)
            | Self::Config(_)
            | Self::Serialization(_)
            | Self::Csv(_)
            | Self::Io(_) => ViolationKind::Internal,
        }
    }

    /// True for failures detected locally, before any request was issued.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::DateRange(_)
                | Self::Valuation(_)
                | Self::Progress(_)
                | Self::Cost(_)
                | Self::UnknownEntry { .. }
                | Self::ForeignEntry { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
