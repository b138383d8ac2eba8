use progress_ledger::*;

/// Fetches one project from the backend configured in `.env` and prints its summary.
///
/// ```text
/// PROGRESS_LEDGER_API_URL=http://localhost:8000/api
/// PROGRESS_LEDGER_TIMEOUT_SECS=10
/// ```
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let project_id: ProjectId = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(1);

    let client = BackendClient::from_env()?;
    println!("🔗 Backend: {}", client.config().base_url);

    let snapshot = client.fetch_snapshot(project_id).await?;
    let ledger = snapshot.ledger()?;
    let totals = ledger.totals();

    println!("🏗️  {}", snapshot.project.name);
    println!(
        "  Financial progress: {}",
        format_percentage(Some(totals.financial_progress), PercentScale::Fraction)
    );
    println!(
        "  Physical progress:  {} real / {} planned",
        format_percentage(Some(totals.last_real_progress), PercentScale::Whole),
        format_percentage(Some(totals.last_planned_progress), PercentScale::Whole)
    );
    println!(
        "  Advance remaining:  {}",
        format_currency(Some(totals.remaining_advance))
    );
    if ledger.progress_lock().is_locked() {
        println!("  🔒 Physical progress is complete; new entries are disabled");
    }

    let summary = project_summary_report(std::slice::from_ref(&snapshot));
    summary.write_csv(std::io::stdout())?;

    Ok(())
}
