use chrono::NaiveDate;
use progress_ledger::*;

fn main() -> anyhow::Result<()> {
    println!("📊 Progress Ledger Walkthrough\n");

    let date = |m: u32, d: u32| NaiveDate::from_ymd_opt(2024, m, d);

    let mut snapshot = LedgerSnapshot::new(Project {
        id: 1,
        name: "Puente Río Claro".to_string(),
        client_reference: Some("MOP-2024-07".to_string()),
        region: Some("Maule".to_string()),
        offered_amount: 10_000.0,
        estimated_cost: 8_000.0,
        advance_amount: 1_000.0,
        start_date: date(1, 1),
        end_date: date(12, 31),
    });

    snapshot.valuations.push(FinancialValuation {
        id: 1,
        project_id: 1,
        number: "V-1".to_string(),
        amount: Some(9_500.0),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        status: ProcessStatus::PendingInvoicing,
        invoice_number: None,
    });

    let ledger = snapshot.ledger()?;
    let totals = ledger.totals();
    println!(
        "Offered ${} | valuated ${} | remaining ${}\n",
        format_amount(Some(totals.offered_amount)),
        format_amount(Some(totals.valuated)),
        format_amount(Some(totals.remaining_budget))
    );

    for amount in [600.0, 500.0] {
        let draft = ValuationDraft {
            number: Some("V-2".to_string()),
            amount: Some(amount),
            start_date: date(2, 1),
            end_date: date(2, 29),
        };
        match ledger.check_new_valuation(&draft) {
            Ok(request) => println!("✅ V-2 for ${} accepted: {:?}", format_amount(Some(amount)), request.status),
            Err(e) => println!("❌ V-2 for ${} rejected ({:?}): {}", format_amount(Some(amount)), e.kind(), e),
        }
    }

    match ledger.check_valuation_transition(1, ProcessStatus::Invoiced, None) {
        Ok(change) => println!("✅ V-1 moved to {}", change.status),
        Err(e) => println!("❌ V-1 not invoiced: {}", e),
    }
    let change = ledger.check_valuation_transition(1, ProcessStatus::Invoiced, Some("F-0031"))?;
    println!("✅ V-1 moved to {} with invoice {:?}\n", change.status, change.invoice_number);

    println!("📋 Valuation report (CSV):");
    print!("{}", valuation_report(&snapshot.valuations).to_csv_string()?);

    Ok(())
}
