use crate::aggregator::ProjectTotals;
use crate::cost::{transition_cost, validate_amortization_edit, validate_cost_amount_edit, validate_new_cost};
use crate::error::{LedgerError, Result};
use crate::progress::{progress_lock, validate_new_progress, ProgressLock};
use crate::schema::{
    AmortizationUpdate, AmountUpdate, CostDraft, EntryId, LedgerEntry, LedgerSnapshot, NewCost,
    NewProgress, NewValuation, ProcessStatus, ProgressDraft, Project, ProjectId, StatusChange, ValuationDraft,
};
use crate::valuation::{transition_valuation, validate_amount_edit, validate_new_valuation};
use log::{debug, info, warn};

/// Runs every entry rule against one fetched project snapshot.
///
/// Each `check_*` method returns the request body to send on success, so a
/// caller can never submit something that did not pass validation.
pub struct ProjectLedger<'a> {
    snapshot: &'a LedgerSnapshot,
}

impl<'a> ProjectLedger<'a> {
    pub fn new(snapshot: &'a LedgerSnapshot) -> Result<Self> {
        snapshot.verify_integrity()?;
        Ok(Self { snapshot })
    }

    pub fn project(&self) -> &Project {
        &self.snapshot.project
    }

    pub fn totals(&self) -> ProjectTotals {
        let totals = ProjectTotals::compute(self.snapshot);
        if totals.cost_overrun > 0.0 {
            warn!(
                "Project {}: costs {:.2} exceed the estimated cost {:.2}",
                totals.project_id, totals.cost_total, totals.estimated_cost
            );
        }
        totals
    }

    pub fn progress_lock(&self) -> ProgressLock {
        progress_lock(&self.snapshot.physical_progress)
    }

    pub fn check_new_valuation(&self, draft: &ValuationDraft) -> Result<NewValuation> {
        let project = self.project();
        validate_new_valuation(project, &self.snapshot.valuations, draft)?;
        let request = draft.to_request(project.id)?;
        info!(
            "Project {}: valuation {} for {:.2} accepted",
            project.id, request.number, request.amount
        );
        Ok(request)
    }

    pub fn check_valuation_amount_edit(&self, id: EntryId, new_amount: f64) -> Result<AmountUpdate> {
        find_entry(&self.snapshot.valuations, id)?;
        validate_amount_edit(self.project(), &self.snapshot.valuations, id, new_amount)?;
        Ok(AmountUpdate { amount: new_amount })
    }

    pub fn check_valuation_transition(
        &self,
        id: EntryId,
        target: ProcessStatus,
        invoice_number: Option<&str>,
    ) -> Result<StatusChange> {
        let valuation = find_entry(&self.snapshot.valuations, id)?;
        let change = transition_valuation(valuation.status, target, invoice_number)?;
        debug!("Valuation {}: {:?} -> {:?}", id, valuation.status, change.status);
        Ok(change)
    }

    pub fn check_new_progress(&self, draft: &ProgressDraft) -> Result<NewProgress> {
        validate_new_progress(&self.snapshot.physical_progress, draft)?;
        let request = draft.to_request(self.project().id)?;
        info!(
            "Project {}: progress real {}% / planned {}% accepted",
            request.project_id, request.real_progress, request.planned_progress
        );
        Ok(request)
    }

    pub fn check_new_cost(&self, draft: &CostDraft) -> Result<NewCost> {
        let project = self.project();
        validate_new_cost(project, &self.snapshot.costs, draft)?;
        let request = draft.to_request(project.id)?;
        info!(
            "Project {}: cost {:.2} (amortization {:.2}) accepted",
            project.id,
            request.amount,
            request.amortization.unwrap_or(0.0)
        );
        Ok(request)
    }

    pub fn check_cost_amount_edit(&self, id: EntryId, new_amount: f64) -> Result<AmountUpdate> {
        validate_cost_amount_edit(&self.snapshot.costs, id, new_amount)?;
        Ok(AmountUpdate { amount: new_amount })
    }

    pub fn check_amortization_edit(
        &self,
        id: EntryId,
        new_amortization: f64,
    ) -> Result<AmortizationUpdate> {
        find_entry(&self.snapshot.costs, id)?;
        validate_amortization_edit(self.project(), &self.snapshot.costs, id, new_amortization)?;
        Ok(AmortizationUpdate {
            amortization: new_amortization,
        })
    }

    pub fn check_cost_transition(&self, id: EntryId, target: ProcessStatus) -> Result<StatusChange> {
        let cost = find_entry(&self.snapshot.costs, id)?;
        Ok(transition_cost(cost.status, target)?)
    }
}

impl LedgerSnapshot {
    /// Every entry must belong to the snapshot's project.
    pub fn verify_integrity(&self) -> Result<()> {
        let expected = self.project.id;
        check_ownership(&self.valuations, expected)?;
        check_ownership(&self.physical_progress, expected)?;
        check_ownership(&self.costs, expected)?;
        Ok(())
    }

    pub fn ledger(&self) -> Result<ProjectLedger<'_>> {
        ProjectLedger::new(self)
    }
}

fn check_ownership<T: LedgerEntry>(entries: &[T], expected: ProjectId) -> Result<()> {
    match entries.iter().find(|e| e.project_id() != expected) {
        Some(entry) => Err(LedgerError::ForeignEntry {
            kind: T::KIND,
            id: entry.entry_id(),
            expected,
            found: entry.project_id(),
        }),
        None => Ok(()),
    }
}

fn find_entry<T: LedgerEntry>(entries: &[T], id: EntryId) -> Result<&T> {
    entries
        .iter()
        .find(|e| e.entry_id() == id)
        .ok_or(LedgerError::UnknownEntry { kind: T::KIND, id })
}
