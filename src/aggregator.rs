use crate::progress::{progress_lock, ProgressLock};
use crate::schema::{EntryId, LedgerEntry, LedgerSnapshot, ProcessStatus, ProjectId};
use crate::utils::{finite, remaining_under, to_cents};
use serde::{Deserialize, Serialize};

/// Sums a numeric field across entries. Missing and non-finite values count as 0.
/// `exclude_id` skips the entry being edited so its old value does not count twice.
pub fn sum_field<T, F>(entries: &[T], field: F, exclude_id: Option<EntryId>) -> f64
where
    T: LedgerEntry,
    F: Fn(&T) -> Option<f64>,
{
    entries
        .iter()
        .filter(|entry| exclude_id.map_or(true, |id| entry.entry_id() != id))
        .map(|entry| finite(field(entry)).unwrap_or(0.0))
        .sum()
}

/// Maximum of a numeric field, or 0 for an empty collection.
pub fn max_field<T, F>(entries: &[T], field: F) -> f64
where
    F: Fn(&T) -> Option<f64>,
{
    entries
        .iter()
        .map(|entry| finite(field(entry)).unwrap_or(0.0))
        .fold(None, |acc: Option<f64>, value| {
            Some(acc.map_or(value, |current| current.max(value)))
        })
        .unwrap_or(0.0)
}

/// Running totals of one project, recomputed from the fetched snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTotals {
    pub project_id: ProjectId,

    pub offered_amount: f64,
    pub valuated: f64,
    pub invoiced: f64,
    pub pending_invoicing: f64,
    pub remaining_budget: f64,
    /// Valuated share of the offered amount, 0.0 to 1.0
    pub financial_progress: f64,

    pub estimated_cost: f64,
    pub cost_total: f64,
    pub cost_overrun: f64,

    pub advance_amount: f64,
    pub amortized: f64,
    pub remaining_advance: f64,

    pub last_real_progress: f64,
    pub last_planned_progress: f64,
    pub progress_lock: ProgressLock,
}

impl ProjectTotals {
    pub fn compute(snapshot: &LedgerSnapshot) -> Self {
        let project = &snapshot.project;
        let valuations = &snapshot.valuations;
        let costs = &snapshot.costs;

        let valuated = sum_field(valuations, |v| v.amount, None);
        let invoiced = sum_field(
            valuations,
            |v| v.amount.filter(|_| v.status == ProcessStatus::Invoiced),
            None,
        );
        let pending_invoicing = sum_field(
            valuations,
            |v| v.amount.filter(|_| v.status == ProcessStatus::PendingInvoicing),
            None,
        );

        let financial_progress = if to_cents(project.offered_amount) > 0.0 {
            valuated / project.offered_amount
        } else {
            0.0
        };

        let cost_total = sum_field(costs, |c| c.amount, None);
        let amortized = sum_field(costs, |c| c.amortization, None);

        Self {
            project_id: project.id,
            offered_amount: project.offered_amount,
            valuated,
            invoiced,
            pending_invoicing,
            remaining_budget: remaining_under(project.offered_amount, valuated),
            financial_progress,
            estimated_cost: project.estimated_cost,
            cost_total,
            cost_overrun: remaining_under(cost_total, project.estimated_cost),
            advance_amount: project.advance_amount,
            amortized,
            remaining_advance: remaining_under(project.advance_amount, amortized),
            last_real_progress: max_field(&snapshot.physical_progress, |p| p.real_progress),
            last_planned_progress: max_field(&snapshot.physical_progress, |p| {
                p.planned_progress
            }),
            progress_lock: progress_lock(&snapshot.physical_progress),
        }
    }
}
