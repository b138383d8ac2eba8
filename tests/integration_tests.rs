use chrono::NaiveDate;
use progress_ledger::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn highway_project() -> Project {
    Project {
        id: 42,
        name: "Autopista Costera Tramo II".to_string(),
        client_reference: Some("MTC-2023-118".to_string()),
        region: Some("Litoral".to_string()),
        offered_amount: 10_000.0,
        estimated_cost: 7_500.0,
        advance_amount: 1_000.0,
        start_date: Some(date(2023, 1, 1)),
        end_date: Some(date(2024, 6, 30)),
    }
}

fn valuation(id: EntryId, number: &str, amount: f64, status: ProcessStatus) -> FinancialValuation {
    FinancialValuation {
        id,
        project_id: 42,
        number: number.to_string(),
        amount: Some(amount),
        start_date: date(2023, id as u32, 1),
        end_date: date(2023, id as u32, 28),
        status,
        invoice_number: if status == ProcessStatus::Invoiced {
            Some(format!("F-{:04}", id))
        } else {
            None
        },
    }
}

fn progress(id: EntryId, real: f64, planned: f64) -> PhysicalProgress {
    PhysicalProgress {
        id,
        project_id: 42,
        real_progress: Some(real),
        planned_progress: Some(planned),
        attention_points: None,
        start_date: date(2023, id as u32, 1),
        end_date: date(2023, id as u32, 28),
    }
}

fn cost(id: EntryId, amount: f64, amortization: Option<f64>) -> CostEntry {
    CostEntry {
        id,
        project_id: 42,
        amount: Some(amount),
        amortization,
        valuation_number: format!("V-{}", id),
        start_date: date(2023, id as u32, 1),
        end_date: date(2023, id as u32, 28),
        status: ProcessStatus::PendingValuation,
    }
}

fn snapshot() -> LedgerSnapshot {
    LedgerSnapshot {
        project: highway_project(),
        valuations: vec![
            valuation(1, "V-1", 3_000.0, ProcessStatus::Invoiced),
            valuation(2, "V-2", 4_000.0, ProcessStatus::PendingInvoicing),
            valuation(3, "V-3", 2_500.0, ProcessStatus::PendingValuation),
        ],
        physical_progress: vec![progress(1, 10.0, 12.0), progress(2, 30.0, 35.0), progress(3, 55.0, 60.0)],
        costs: vec![
            cost(1, 2_000.0, Some(200.0)),
            cost(2, 1_500.0, Some(350.0)),
            cost(3, 1_800.0, Some(250.0)),
        ],
    }
}

fn valuation_draft(number: &str, amount: f64) -> ValuationDraft {
    ValuationDraft {
        number: Some(number.to_string()),
        amount: Some(amount),
        start_date: Some(date(2023, 4, 1)),
        end_date: Some(date(2023, 4, 30)),
    }
}

fn progress_draft(real: f64, planned: f64) -> ProgressDraft {
    ProgressDraft {
        real_progress: Some(real),
        planned_progress: Some(planned),
        attention_points: Some("Frente 2 detenido por permisos".to_string()),
        start_date: Some(date(2023, 4, 1)),
        end_date: Some(date(2023, 4, 30)),
    }
}

#[test]
fn test_budget_scenario_from_existing_valuations() {
    let snapshot = snapshot();
    let ledger = snapshot.ledger().unwrap();

    // Existing valuations sum to 9500 against an offered amount of 10000
    let err = ledger
        .check_new_valuation(&valuation_draft("V-4", 600.0))
        .unwrap_err();
    assert_eq!(err.kind(), ViolationKind::BudgetExceeded);
    assert!(matches!(
        err,
        LedgerError::Valuation(ValuationError::BudgetExceeded { remaining, .. }) if remaining == 500.0
    ));

    let request = ledger
        .check_new_valuation(&valuation_draft("V-4", 500.0))
        .unwrap();
    assert_eq!(request.amount, 500.0);
    assert_eq!(request.project_id, 42);
}

#[test]
fn test_remaining_budget_boundary_is_cent_exact() {
    let mut snapshot = snapshot();
    snapshot.valuations = vec![
        valuation(1, "V-1", 3_333.33, ProcessStatus::Invoiced),
        valuation(2, "V-2", 3_333.33, ProcessStatus::Invoiced),
        valuation(3, "V-3", 0.1, ProcessStatus::PendingValuation),
        valuation(4, "V-4", 0.2, ProcessStatus::PendingValuation),
    ];
    let ledger = snapshot.ledger().unwrap();
    let remaining = ledger.totals().remaining_budget;
    assert_eq!(remaining, 3_333.04);

    assert!(ledger
        .check_new_valuation(&valuation_draft("V-5", remaining))
        .is_ok());
    assert!(ledger
        .check_new_valuation(&valuation_draft("V-5", remaining + 0.01))
        .is_err());
}

#[test]
fn test_new_valuation_succeeds_only_when_every_rule_holds() {
    let snapshot = snapshot();
    let ledger = snapshot.ledger().unwrap();

    let cases: Vec<(ValuationDraft, Option<ViolationKind>)> = vec![
        (valuation_draft("V-4", 100.0), None),
        (
            ValuationDraft {
                amount: None,
                ..valuation_draft("V-4", 100.0)
            },
            Some(ViolationKind::MissingFields),
        ),
        (
            ValuationDraft {
                end_date: Some(date(2023, 3, 31)),
                ..valuation_draft("V-4", 100.0)
            },
            Some(ViolationKind::InvalidDateRange),
        ),
        (
            valuation_draft("  V-2  ", 100.0),
            Some(ViolationKind::DuplicateValuationNumber),
        ),
        (
            valuation_draft("V-4", 500.01),
            Some(ViolationKind::BudgetExceeded),
        ),
    ];

    for (draft, expected) in cases {
        let outcome = ledger.check_new_valuation(&draft).err().map(|e| e.kind());
        assert_eq!(outcome, expected, "draft: {:?}", draft);
    }
}

#[test]
fn test_validators_are_idempotent() {
    let snapshot = snapshot();
    let project = &snapshot.project;
    let draft = valuation_draft("V-4", 600.0);

    let first = validate_new_valuation(project, &snapshot.valuations, &draft);
    let second = validate_new_valuation(project, &snapshot.valuations, &draft);
    assert_eq!(first, second);

    let p1 = validate_new_progress(&snapshot.physical_progress, &progress_draft(54.0, 60.0));
    let p2 = validate_new_progress(&snapshot.physical_progress, &progress_draft(54.0, 60.0));
    assert_eq!(p1, p2);
}

#[test]
fn test_progress_monotonicity_and_lock() {
    let mut snapshot = snapshot();

    {
        let ledger = snapshot.ledger().unwrap();
        let err = ledger.check_new_progress(&progress_draft(54.0, 60.0)).unwrap_err();
        assert_eq!(err.kind(), ViolationKind::RegressionReal);

        let request = ledger.check_new_progress(&progress_draft(55.0, 60.0)).unwrap();
        assert_eq!(request.real_progress, 55.0);
        assert_eq!(ledger.progress_lock(), ProgressLock::Open);
    }

    snapshot.physical_progress.push(progress(4, 100.0, 100.0));
    let ledger = snapshot.ledger().unwrap();
    assert_eq!(ledger.progress_lock(), ProgressLock::Locked);
    assert!(ledger.totals().progress_lock.is_locked());

    let err = ledger.check_new_progress(&progress_draft(100.0, 100.0)).unwrap_err();
    assert_eq!(err.kind(), ViolationKind::ProjectLocked);
}

#[test]
fn test_valuation_status_lifecycle() {
    let snapshot = snapshot();
    let ledger = snapshot.ledger().unwrap();

    // V-2 is PendingInvoicing
    let err = ledger
        .check_valuation_transition(2, ProcessStatus::Invoiced, None)
        .unwrap_err();
    assert_eq!(err.kind(), ViolationKind::InvoiceNumberRequired);

    let change = ledger
        .check_valuation_transition(2, ProcessStatus::Invoiced, Some("F-0002"))
        .unwrap();
    assert_eq!(change.status, ProcessStatus::Invoiced);
    assert_eq!(change.invoice_number.as_deref(), Some("F-0002"));

    // V-1 is already invoiced
    for target in [
        ProcessStatus::PendingValuation,
        ProcessStatus::PendingInvoicing,
        ProcessStatus::Invoiced,
    ] {
        let err = ledger
            .check_valuation_transition(1, target, Some("F-9999"))
            .unwrap_err();
        assert_eq!(err.kind(), ViolationKind::InvalidTransition);
    }

    // V-3 cannot skip straight to invoiced
    let err = ledger
        .check_valuation_transition(3, ProcessStatus::Invoiced, Some("F-0003"))
        .unwrap_err();
    assert_eq!(err.kind(), ViolationKind::InvalidTransition);
}

#[test]
fn test_amortization_edit_excludes_the_edited_cost() {
    let snapshot = snapshot();
    let ledger = snapshot.ledger().unwrap();
    assert_eq!(ledger.totals().amortized, 800.0);

    // Cost 1 contributed 200; the others sum to 600
    assert_eq!(ledger.check_amortization_edit(1, 150.0).unwrap().amortization, 150.0);
    assert!(ledger.check_amortization_edit(1, 400.0).is_ok());

    let err = ledger.check_amortization_edit(1, 401.0).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Cost(CostError::AmortizationExceeded { remaining, .. }) if remaining == 400.0
    ));

    let err = ledger.check_amortization_edit(1, -10.0).unwrap_err();
    assert_eq!(err.kind(), ViolationKind::AmortizationExceeded);
}

#[test]
fn test_new_cost_against_remaining_advance() {
    let snapshot = snapshot();
    let ledger = snapshot.ledger().unwrap();

    let draft = CostDraft {
        amount: Some(900.0),
        amortization: Some(200.0),
        valuation_number: Some("V-4".to_string()),
        start_date: Some(date(2023, 4, 1)),
        end_date: Some(date(2023, 4, 30)),
    };
    let request = ledger.check_new_cost(&draft).unwrap();
    assert_eq!(request.status, ProcessStatus::PendingValuation);

    let over = CostDraft {
        amortization: Some(200.01),
        ..draft.clone()
    };
    assert_eq!(
        ledger.check_new_cost(&over).unwrap_err().kind(),
        ViolationKind::AmortizationExceeded
    );

    let no_amortization = CostDraft {
        amortization: None,
        ..draft
    };
    assert!(ledger.check_new_cost(&no_amortization).is_ok());
}

#[test]
fn test_cost_amount_edit_and_status() {
    let snapshot = snapshot();
    let ledger = snapshot.ledger().unwrap();

    assert_eq!(ledger.check_cost_amount_edit(2, 9_999.0).unwrap().amount, 9_999.0);
    assert_eq!(
        ledger.check_cost_amount_edit(2, f64::NAN).unwrap_err().kind(),
        ViolationKind::MissingFields
    );

    let change = ledger
        .check_cost_transition(2, ProcessStatus::PendingInvoicing)
        .unwrap();
    assert_eq!(change.status_id, 2);
    assert_eq!(change.invoice_number, None);
}

#[test]
fn test_reports_from_snapshot() {
    let snapshot = snapshot();

    let valuations = valuation_report(&snapshot.valuations);
    assert_eq!(valuations.rows[0][5], "F-0001");
    assert_eq!(valuations.filter("pendiente").len(), 2);

    let costs = cost_report(&snapshot.costs);
    assert_eq!(costs.rows[1][2], "350.00");

    let summary = project_summary_report(std::slice::from_ref(&snapshot));
    assert_eq!(summary.rows[0][3], "10,000.00");
    assert_eq!(summary.rows[0][6], "95.00%");
    assert_eq!(summary.rows[0][7], "55.00%");
    assert_eq!(summary.rows[0][10], "200.00");

    let csv = summary.to_csv_string().unwrap();
    assert!(csv.starts_with("Project,Client,Region,"));
    assert!(csv.contains("Autopista Costera Tramo II,MTC-2023-118,Litoral"));
}

#[test]
fn test_snapshot_round_trips_through_backend_json() {
    let snapshot = snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: LedgerSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, snapshot);
    assert!(json.contains("\"status\":\"PendingInvoicing\""));
}
