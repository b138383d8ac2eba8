use crate::aggregator::sum_field;
use crate::error::CostError;
use crate::schema::{CostDraft, CostEntry, EntryId, NewCost, ProcessStatus, Project, ProjectId, StatusChange};
use crate::utils::{exceeds_ceiling, finite, non_blank, remaining_under, validate_date_range};
use log::debug;

type Result<T> = std::result::Result<T, CostError>;

/// Amortization may never push the project's total past the supplier advance.
pub fn validate_new_cost(project: &Project, existing: &[CostEntry], candidate: &CostDraft) -> Result<()> {
    let mut missing = Vec::new();
    if finite(candidate.amount).is_none() {
        missing.push("amount");
    }
    if non_blank(candidate.valuation_number.as_deref()).is_none() {
        missing.push("valuation_number");
    }
    if candidate.start_date.is_none() {
        missing.push("start_date");
    }
    if candidate.end_date.is_none() {
        missing.push("end_date");
    }
    if !missing.is_empty() {
        return Err(CostError::MissingFields(missing));
    }

    validate_date_range(candidate.start_date, candidate.end_date)?;

    let amortization = finite(candidate.amortization).unwrap_or(0.0);
    check_amortization(project, existing, None, amortization)
}

pub fn validate_amortization_edit(
    project: &Project,
    existing: &[CostEntry],
    edited_id: EntryId,
    new_amortization: f64,
) -> Result<()> {
    if !new_amortization.is_finite() {
        return Err(CostError::MissingFields(vec!["amortization"]));
    }
    check_amortization(project, existing, Some(edited_id), new_amortization)
}

/// The cost amount is not capped, and negative amounts are accepted as
/// corrections. Overruns against the estimated cost surface in the totals.
pub fn validate_cost_amount_edit(existing: &[CostEntry], edited_id: EntryId, new_amount: f64) -> Result<()> {
    if !existing.iter().any(|c| c.id == edited_id) {
        return Err(CostError::UnknownEntry(edited_id));
    }
    if !new_amount.is_finite() {
        return Err(CostError::MissingFields(vec!["amount"]));
    }
    Ok(())
}

pub fn validate_cost_status_transition(current: ProcessStatus, target: ProcessStatus) -> Result<()> {
    if current.can_transition_to(target) {
        Ok(())
    } else {
        debug!("Rejected cost status change {:?} -> {:?}", current, target);
        Err(CostError::InvalidTransition {
            from: current,
            to: target,
        })
    }
}

/// Costs carry no invoice number, so the change never has one.
pub fn transition_cost(current: ProcessStatus, target: ProcessStatus) -> Result<StatusChange> {
    validate_cost_status_transition(current, target)?;
    Ok(StatusChange::new(target, None))
}

fn check_amortization(
    project: &Project,
    existing: &[CostEntry],
    exclude_id: Option<EntryId>,
    amortization: f64,
) -> Result<()> {
    let base = sum_field(existing, |c| c.amortization, exclude_id);
    let remaining = remaining_under(project.advance_amount, base);

    if amortization < 0.0 || exceeds_ceiling(base + amortization, project.advance_amount) {
        debug!(
            "Project {}: amortization {:.2} rejected, {:.2} of advance {:.2} left",
            project.id, amortization, remaining, project.advance_amount
        );
        return Err(CostError::AmortizationExceeded {
            requested: amortization,
            remaining,
        });
    }

    Ok(())
}

impl CostDraft {
    pub fn to_request(&self, project_id: ProjectId) -> Result<NewCost> {
        match (
            finite(self.amount),
            non_blank(self.valuation_number.as_deref()),
            self.start_date,
            self.end_date,
        ) {
            (Some(amount), Some(valuation_number), Some(start_date), Some(end_date)) => Ok(NewCost {
                project_id,
                amount,
                amortization: finite(self.amortization),
                valuation_number: valuation_number.to_string(),
                start_date,
                end_date,
                status: ProcessStatus::PendingValuation,
            }),
            _ => Err(CostError::MissingFields(vec![
                "amount",
                "valuation_number",
                "start_date",
                "end_date",
            ])),
        }
    }
}
