use crate::config::BackendConfig;
use crate::error::{LedgerError, Result};
use crate::schema::{
    CostDraft, CostEntry, EntryId, EntryKind, FinancialValuation, LedgerSnapshot,
    PhysicalProgress, ProcessStatus, ProgressDraft, Project, ProjectId, ValuationDraft,
};
use crate::submission::SubmissionGuard;
use log::{info, warn};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Validates every write against the caller's snapshot before issuing it.
/// Failed requests are reported, never retried.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    config: BackendConfig,
    guard: SubmissionGuard,
}

pub fn project_path(project_id: ProjectId) -> String {
    format!("projects/{}", project_id)
}

pub fn collection_path(kind: EntryKind, project_id: ProjectId) -> String {
    format!("projects/{}/{}", project_id, kind.route_segment())
}

pub fn entry_field_path(kind: EntryKind, id: EntryId, field: &str) -> String {
    format!("{}/{}/{}", kind.route_segment(), id, field)
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            guard: SubmissionGuard::new(),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(BackendConfig::from_env()?)
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub async fn fetch_project(&self, project_id: ProjectId) -> Result<Project> {
        self.get_json(&project_path(project_id)).await
    }

    pub async fn fetch_valuations(&self, project_id: ProjectId) -> Result<Vec<FinancialValuation>> {
        self.get_json(&collection_path(EntryKind::Valuation, project_id))
            .await
    }

    pub async fn fetch_progress(&self, project_id: ProjectId) -> Result<Vec<PhysicalProgress>> {
        self.get_json(&collection_path(EntryKind::PhysicalProgress, project_id))
            .await
    }

    pub async fn fetch_costs(&self, project_id: ProjectId) -> Result<Vec<CostEntry>> {
        self.get_json(&collection_path(EntryKind::Cost, project_id))
            .await
    }

    /// Fetches the project and its three ledgers concurrently.
    pub async fn fetch_snapshot(&self, project_id: ProjectId) -> Result<LedgerSnapshot> {
        let (project, valuations, physical_progress, costs) = futures::try_join!(
            self.fetch_project(project_id),
            self.fetch_valuations(project_id),
            self.fetch_progress(project_id),
            self.fetch_costs(project_id),
        )?;

        let snapshot = LedgerSnapshot {
            project,
            valuations,
            physical_progress,
            costs,
        };
        snapshot.verify_integrity()?;

        info!(
            "Fetched project {}: {} valuations, {} progress entries, {} costs",
            project_id,
            snapshot.valuations.len(),
            snapshot.physical_progress.len(),
            snapshot.costs.len()
        );
        Ok(snapshot)
    }

    pub async fn create_valuation(
        &self,
        snapshot: &LedgerSnapshot,
        draft: &ValuationDraft,
    ) -> Result<FinancialValuation> {
        let body = snapshot.ledger()?.check_new_valuation(draft)?;
        let project_id = snapshot.project.id;
        let _ticket = self.guard.begin(EntryKind::Valuation, project_id)?;
        self.send_json(
            Method::POST,
            &collection_path(EntryKind::Valuation, project_id),
            &body,
        )
        .await
    }

    pub async fn update_valuation_amount(
        &self,
        snapshot: &LedgerSnapshot,
        id: EntryId,
        amount: f64,
    ) -> Result<FinancialValuation> {
        let body = snapshot.ledger()?.check_valuation_amount_edit(id, amount)?;
        let _ticket = self.guard.begin(EntryKind::Valuation, snapshot.project.id)?;
        self.send_json(
            Method::PUT,
            &entry_field_path(EntryKind::Valuation, id, "amount"),
            &body,
        )
        .await
    }

    pub async fn transition_valuation_status(
        &self,
        snapshot: &LedgerSnapshot,
        id: EntryId,
        target: ProcessStatus,
        invoice_number: Option<&str>,
    ) -> Result<FinancialValuation> {
        let body = snapshot
            .ledger()?
            .check_valuation_transition(id, target, invoice_number)?;
        let _ticket = self.guard.begin(EntryKind::Valuation, snapshot.project.id)?;
        self.send_json(
            Method::PUT,
            &entry_field_path(EntryKind::Valuation, id, "status"),
            &body,
        )
        .await
    }

    pub async fn create_progress(
        &self,
        snapshot: &LedgerSnapshot,
        draft: &ProgressDraft,
    ) -> Result<PhysicalProgress> {
        let body = snapshot.ledger()?.check_new_progress(draft)?;
        let project_id = snapshot.project.id;
        let _ticket = self.guard.begin(EntryKind::PhysicalProgress, project_id)?;
        self.send_json(
            Method::POST,
            &collection_path(EntryKind::PhysicalProgress, project_id),
            &body,
        )
        .await
    }

    pub async fn create_cost(&self, snapshot: &LedgerSnapshot, draft: &CostDraft) -> Result<CostEntry> {
        let body = snapshot.ledger()?.check_new_cost(draft)?;
        let project_id = snapshot.project.id;
        let _ticket = self.guard.begin(EntryKind::Cost, project_id)?;
        self.send_json(
            Method::POST,
            &collection_path(EntryKind::Cost, project_id),
            &body,
        )
        .await
    }

    pub async fn update_cost_amount(
        &self,
        snapshot: &LedgerSnapshot,
        id: EntryId,
        amount: f64,
    ) -> Result<CostEntry> {
        let body = snapshot.ledger()?.check_cost_amount_edit(id, amount)?;
        let _ticket = self.guard.begin(EntryKind::Cost, snapshot.project.id)?;
        self.send_json(Method::PUT, &entry_field_path(EntryKind::Cost, id, "amount"), &body)
            .await
    }

    pub async fn update_cost_amortization(
        &self,
        snapshot: &LedgerSnapshot,
        id: EntryId,
        amortization: f64,
    ) -> Result<CostEntry> {
        let body = snapshot.ledger()?.check_amortization_edit(id, amortization)?;
        let _ticket = self.guard.begin(EntryKind::Cost, snapshot.project.id)?;
        self.send_json(
            Method::PUT,
            &entry_field_path(EntryKind::Cost, id, "amortization"),
            &body,
        )
        .await
    }

    pub async fn transition_cost_status(
        &self,
        snapshot: &LedgerSnapshot,
        id: EntryId,
        target: ProcessStatus,
    ) -> Result<CostEntry> {
        let body = snapshot.ledger()?.check_cost_transition(id, target)?;
        let _ticket = self.guard.begin(EntryKind::Cost, snapshot.project.id)?;
        self.send_json(Method::PUT, &entry_field_path(EntryKind::Cost, id, "status"), &body)
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let res = self.client.get(self.config.url(path)).send().await?;
        let res = Self::check_status(res).await?;
        Ok(res.json().await?)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.config.url(path);
        let res = self
            .client
            .request(method.clone(), &url)
            .json(body)
            .send()
            .await?;
        let res = Self::check_status(res).await?;
        info!("{} {} succeeded", method, url);
        Ok(res.json().await?)
    }

    async fn check_status(res: Response) -> Result<Response> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let url = res.url().to_string();
        let message = res.text().await.unwrap_or_default();
        warn!("Backend error {} for {}: {}", status, url, message);
        Err(LedgerError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_building() {
        assert_eq!(project_path(4), "projects/4");
        assert_eq!(
            collection_path(EntryKind::PhysicalProgress, 4),
            "projects/4/physical-progress"
        );
        assert_eq!(
            entry_field_path(EntryKind::Cost, 17, "amortization"),
            "costs/17/amortization"
        );
    }

    #[tokio::test]
    async fn test_invalid_write_never_reaches_the_network() {
        // Nothing listens on this port; a request would fail with an HTTP error
        let client = BackendClient::new(BackendConfig::new("http://127.0.0.1:9")).unwrap();
        let snapshot = LedgerSnapshot::new(Project {
            id: 1,
            name: "Presa".to_string(),
            client_reference: None,
            region: None,
            offered_amount: 100.0,
            estimated_cost: 80.0,
            advance_amount: 10.0,
            start_date: None,
            end_date: None,
        });

        let err = client
            .create_valuation(
                &snapshot,
                &ValuationDraft {
                    number: Some("V-1".to_string()),
                    amount: Some(100.01),
                    start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
                    end_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 31),
                },
            )
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.kind(), crate::error::ViolationKind::BudgetExceeded);
    }
}
