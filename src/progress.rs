use crate::aggregator::max_field;
use crate::error::ProgressError;
use crate::schema::{NewProgress, PhysicalProgress, ProgressDraft, ProjectId};
use crate::utils::{finite, non_blank, validate_date_range};
use log::debug;
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, ProgressError>;

pub const MIN_PERCENT: f64 = 1.0;
pub const MAX_PERCENT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressLock {
    Open,
    /// Real progress reached 100%; the entry form should be disabled.
    Locked,
}

impl ProgressLock {
    pub fn is_locked(self) -> bool {
        self == Self::Locked
    }
}

pub fn progress_lock(existing: &[PhysicalProgress]) -> ProgressLock {
    if max_field(existing, |p| p.real_progress) >= MAX_PERCENT {
        ProgressLock::Locked
    } else {
        ProgressLock::Open
    }
}

pub fn validate_new_progress(existing: &[PhysicalProgress], candidate: &ProgressDraft) -> Result<()> {
    let real = finite(candidate.real_progress);
    let planned = finite(candidate.planned_progress);

    let mut missing = Vec::new();
    if real.is_none() {
        missing.push("real_progress");
    }
    if planned.is_none() {
        missing.push("planned_progress");
    }
    if candidate.start_date.is_none() {
        missing.push("start_date");
    }
    if candidate.end_date.is_none() {
        missing.push("end_date");
    }

    let (Some(real), Some(planned)) = (real, planned) else {
        return Err(ProgressError::MissingFields(missing));
    };
    if !missing.is_empty() {
        return Err(ProgressError::MissingFields(missing));
    }

    validate_date_range(candidate.start_date, candidate.end_date)?;

    check_bounds("real", real)?;
    check_bounds("planned", planned)?;

    if progress_lock(existing).is_locked() {
        debug!("Progress entry rejected: project already at 100% real progress");
        return Err(ProgressError::ProjectLocked);
    }

    let last_real = max_field(existing, |p| p.real_progress);
    if real < last_real {
        debug!("Real progress regression: {} < {}", real, last_real);
        return Err(ProgressError::RegressionReal {
            attempted: real,
            last: last_real,
        });
    }

    let last_planned = max_field(existing, |p| p.planned_progress);
    if planned < last_planned {
        debug!("Planned progress regression: {} < {}", planned, last_planned);
        return Err(ProgressError::RegressionPlanned {
            attempted: planned,
            last: last_planned,
        });
    }

    Ok(())
}

fn check_bounds(field: &'static str, value: f64) -> Result<()> {
    if (MIN_PERCENT..=MAX_PERCENT).contains(&value) {
        Ok(())
    } else {
        Err(ProgressError::OutOfBounds { field, value })
    }
}

impl ProgressDraft {
    pub fn to_request(&self, project_id: ProjectId) -> Result<NewProgress> {
        match (
            finite(self.real_progress),
            finite(self.planned_progress),
            self.start_date,
            self.end_date,
        ) {
            (Some(real_progress), Some(planned_progress), Some(start_date), Some(end_date)) => {
                Ok(NewProgress {
                    project_id,
                    real_progress,
                    planned_progress,
                    attention_points: non_blank(self.attention_points.as_deref())
                        .map(str::to_string),
                    start_date,
                    end_date,
                })
            }
            _ => Err(ProgressError::MissingFields(vec![
                "real_progress",
                "planned_progress",
                "start_date",
                "end_date",
            ])),
        }
    }
}
