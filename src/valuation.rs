use crate::aggregator::sum_field;
use crate::error::ValuationError;
use crate::schema::{
    EntryId, FinancialValuation, NewValuation, ProcessStatus, Project, ProjectId, StatusChange,
    ValuationDraft,
};
use crate::utils::{exceeds_ceiling, finite, non_blank, remaining_under, validate_date_range};
use log::debug;

type Result<T> = std::result::Result<T, ValuationError>;

/// Checks are applied in order: required fields, period, unique number, budget.
///
/// Negative amounts are accepted as corrections and reduce the running sum.
pub fn validate_new_valuation(
    project: &Project,
    existing: &[FinancialValuation],
    candidate: &ValuationDraft,
) -> Result<()> {
    let mut missing = Vec::new();
    let number = non_blank(candidate.number.as_deref());
    if number.is_none() {
        missing.push("number");
    }
    let amount = finite(candidate.amount);
    if amount.is_none() {
        missing.push("amount");
    }
    if candidate.start_date.is_none() {
        missing.push("start_date");
    }
    if candidate.end_date.is_none() {
        missing.push("end_date");
    }

    let (Some(number), Some(amount)) = (number, amount) else {
        return Err(ValuationError::MissingFields(missing));
    };
    if !missing.is_empty() {
        return Err(ValuationError::MissingFields(missing));
    }

    validate_date_range(candidate.start_date, candidate.end_date)?;

    if existing.iter().any(|v| v.number.trim() == number) {
        debug!(
            "Project {}: valuation number '{}' already recorded",
            project.id, number
        );
        return Err(ValuationError::DuplicateValuationNumber(number.to_string()));
    }

    check_budget(project, existing, None, amount)
}

/// Re-checks the budget ceiling with the edited entry's previous amount excluded.
pub fn validate_amount_edit(
    project: &Project,
    existing: &[FinancialValuation],
    edited_id: EntryId,
    new_amount: f64,
) -> Result<()> {
    if !new_amount.is_finite() {
        return Err(ValuationError::MissingFields(vec!["amount"]));
    }
    check_budget(project, existing, Some(edited_id), new_amount)
}

pub fn validate_status_transition(
    current: ProcessStatus,
    target: ProcessStatus,
    invoice_number: Option<&str>,
) -> Result<()> {
    if !current.can_transition_to(target) {
        debug!("Rejected valuation status change {:?} -> {:?}", current, target);
        return Err(ValuationError::InvalidTransition {
            from: current,
            to: target,
        });
    }

    if target == ProcessStatus::Invoiced && non_blank(invoice_number).is_none() {
        return Err(ValuationError::InvoiceNumberRequired);
    }

    Ok(())
}

/// Validates a status change and returns it normalized: the invoice number is
/// kept (trimmed) only when the target is `Invoiced`.
pub fn transition_valuation(
    current: ProcessStatus,
    target: ProcessStatus,
    invoice_number: Option<&str>,
) -> Result<StatusChange> {
    validate_status_transition(current, target, invoice_number)?;

    let invoice_number = match target {
        ProcessStatus::Invoiced => non_blank(invoice_number).map(str::to_string),
        _ => None,
    };

    Ok(StatusChange::new(target, invoice_number))
}

impl ValuationDraft {
    /// Builds the creation request. New valuations always start as `PendingValuation`.
    pub fn to_request(&self, project_id: ProjectId) -> Result<NewValuation> {
        match (
            non_blank(self.number.as_deref()),
            finite(self.amount),
            self.start_date,
            self.end_date,
        ) {
            (Some(number), Some(amount), Some(start_date), Some(end_date)) => Ok(NewValuation {
                project_id,
                number: number.to_string(),
                amount,
                start_date,
                end_date,
                status: ProcessStatus::PendingValuation,
                invoice_number: None,
            }),
            _ => Err(ValuationError::MissingFields(vec![
                "number",
                "amount",
                "start_date",
                "end_date",
            ])),
        }
    }
}

fn check_budget(
    project: &Project,
    existing: &[FinancialValuation],
    exclude_id: Option<EntryId>,
    amount: f64,
) -> Result<()> {
    let base = sum_field(existing, |v| v.amount, exclude_id);
    let total = base + amount;

    if exceeds_ceiling(total, project.offered_amount) {
        debug!(
            "Project {}: valuations would reach {:.2} over offered {:.2}",
            project.id, total, project.offered_amount
        );
        return Err(ValuationError::BudgetExceeded {
            total,
            ceiling: project.offered_amount,
            remaining: remaining_under(project.offered_amount, base),
        });
    }

    Ok(())
}
