use crate::error::{LedgerError, Result};
use crate::schema::{EntryKind, ProjectId};
use log::debug;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

type InFlight = HashSet<(EntryKind, ProjectId)>;

/// Allows at most one in-flight submission per entry form (entry kind + project).
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    in_flight: Arc<Mutex<InFlight>>,
}

/// Held for the duration of a submission; releases the form when dropped.
#[derive(Debug)]
pub struct SubmissionTicket {
    key: (EntryKind, ProjectId),
    in_flight: Arc<Mutex<InFlight>>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, kind: EntryKind, project_id: ProjectId) -> Result<SubmissionTicket> {
        let key = (kind, project_id);
        if !self.in_flight.lock().insert(key) {
            debug!("Duplicate {} submission for project {} refused", kind, project_id);
            return Err(LedgerError::SubmissionInFlight { kind, project_id });
        }

        Ok(SubmissionTicket {
            key,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_in_flight(&self, kind: EntryKind, project_id: ProjectId) -> bool {
        self.in_flight.lock().contains(&(kind, project_id))
    }
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.key);
    }
}
