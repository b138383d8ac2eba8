use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use crate::status::ProcessStatus;

pub type ProjectId = i64;
pub type EntryId = i64;

/// The three ledgers tracked per project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Valuation,
    PhysicalProgress,
    Cost,
}

impl EntryKind {
    /// Path segment used by the backend for collections of this kind.
    pub fn route_segment(self) -> &'static str {
        match self {
            Self::Valuation => "valuations",
            Self::PhysicalProgress => "physical-progress",
            Self::Cost => "costs",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Valuation => "valuation",
            Self::PhysicalProgress => "physical progress",
            Self::Cost => "cost",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Project {
    pub id: ProjectId,

    pub name: String,

    #[serde(default)]
    pub client_reference: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[schemars(description = "Offered amount in USD. Ceiling for the sum of all financial valuations.")]
    pub offered_amount: f64,

    #[schemars(description = "Estimated cost in USD. Reference ceiling for the sum of cost entries.")]
    pub estimated_cost: f64,

    #[schemars(description = "Supplier advance ('anticipo') in USD. Ceiling for the sum of amortizations.")]
    pub advance_amount: f64,

    pub start_date: Option<NaiveDate>,

    pub end_date: Option<NaiveDate>,
}

/// A billable progress claim ("avance financiero") against the offered amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct FinancialValuation {
    pub id: EntryId,
    pub project_id: ProjectId,

    #[schemars(description = "Valuation number, unique within the project after trimming")]
    pub number: String,

    #[schemars(description = "Valuated amount in USD")]
    pub amount: Option<f64>,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[serde(default)]
    pub status: ProcessStatus,

    #[serde(default)]
    #[schemars(description = "Present if and only if the status is Invoiced")]
    pub invoice_number: Option<String>,
}

/// A real vs. planned completion snapshot ("avance físico").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct PhysicalProgress {
    pub id: EntryId,
    pub project_id: ProjectId,

    #[schemars(description = "Real completion percentage, 1 to 100")]
    pub real_progress: Option<f64>,

    #[schemars(description = "Planned completion percentage, 1 to 100")]
    pub planned_progress: Option<f64>,

    #[serde(default)]
    pub attention_points: Option<String>,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A cost record carrying the share of the supplier advance it amortizes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct CostEntry {
    pub id: EntryId,
    pub project_id: ProjectId,

    pub amount: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Portion of the advance recovered by this cost. Never negative.")]
    pub amortization: Option<f64>,

    pub valuation_number: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[serde(default)]
    pub status: ProcessStatus,
}

/// Persisted entries addressable by id within a project.
pub trait LedgerEntry {
    const KIND: EntryKind;

    fn entry_id(&self) -> EntryId;
    fn project_id(&self) -> ProjectId;
}

impl LedgerEntry for FinancialValuation {
    const KIND: EntryKind = EntryKind::Valuation;

    fn entry_id(&self) -> EntryId {
        self.id
    }

    fn project_id(&self) -> ProjectId {
        self.project_id
    }
}

impl LedgerEntry for PhysicalProgress {
    const KIND: EntryKind = EntryKind::PhysicalProgress;

    fn entry_id(&self) -> EntryId {
        self.id
    }

    fn project_id(&self) -> ProjectId {
        self.project_id
    }
}

impl LedgerEntry for CostEntry {
    const KIND: EntryKind = EntryKind::Cost;

    fn entry_id(&self) -> EntryId {
        self.id
    }

    fn project_id(&self) -> ProjectId {
        self.project_id
    }
}

// Raw form input. Every required field is optional so absence can be reported.

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValuationDraft {
    pub number: Option<String>,
    pub amount: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProgressDraft {
    pub real_progress: Option<f64>,
    pub planned_progress: Option<f64>,
    pub attention_points: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CostDraft {
    pub amount: Option<f64>,
    pub amortization: Option<f64>,
    pub valuation_number: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// Request bodies sent to the backend once a draft has passed validation.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct NewValuation {
    pub project_id: ProjectId,
    pub number: String,
    pub amount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ProcessStatus,
    pub invoice_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct NewProgress {
    pub project_id: ProjectId,
    pub real_progress: f64,
    pub planned_progress: f64,
    pub attention_points: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct NewCost {
    pub project_id: ProjectId,
    pub amount: f64,
    pub amortization: Option<f64>,
    pub valuation_number: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ProcessStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct AmountUpdate {
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct AmortizationUpdate {
    pub amortization: f64,
}

/// Normalized result of a legal status change, also the body of a status update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct StatusChange {
    pub status: ProcessStatus,
    pub status_id: u8,
    pub invoice_number: Option<String>,
}

impl StatusChange {
    pub fn new(status: ProcessStatus, invoice_number: Option<String>) -> Self {
        Self {
            status,
            status_id: status.id(),
            invoice_number,
        }
    }
}

/// One project together with the entries fetched for it.
///
/// This is the immutable input of every check; it is never cached beyond the
/// caller's current view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct LedgerSnapshot {
    pub project: Project,

    #[serde(default)]
    pub valuations: Vec<FinancialValuation>,

    #[serde(default)]
    #[schemars(description = "Physical progress history, in any order")]
    pub physical_progress: Vec<PhysicalProgress>,

    #[serde(default)]
    pub costs: Vec<CostEntry>,
}

impl LedgerSnapshot {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            valuations: Vec::new(),
            physical_progress: Vec::new(),
            costs: Vec::new(),
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(LedgerSnapshot)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
