use crate::aggregator::ProjectTotals;
use crate::error::{ReportError, Result};
use crate::format::{format_amount, format_percentage, PercentScale};
use crate::schema::{CostEntry, FinancialValuation, LedgerSnapshot, PhysicalProgress};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub number: usize,
    pub page_size: usize,
    pub total_rows: usize,
    pub total_pages: usize,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keeps rows where any cell contains `query`, ignoring case. A blank query keeps everything.
    pub fn filter(&self, query: &str) -> ReportTable {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.clone();
        }

        ReportTable {
            title: self.title.clone(),
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| row.iter().any(|cell| cell.to_lowercase().contains(&needle)))
                .cloned()
                .collect(),
        }
    }

    /// 1-based pagination. Pages past the end are empty.
    pub fn page(&self, number: usize, page_size: usize) -> std::result::Result<Page, ReportError> {
        if page_size == 0 {
            return Err(ReportError::InvalidPageSize);
        }
        if number == 0 {
            return Err(ReportError::InvalidPage(number));
        }

        let total_rows = self.rows.len();
        let rows = self
            .rows
            .iter()
            .skip((number - 1).saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect();

        Ok(Page {
            number,
            page_size,
            total_rows,
            total_pages: total_rows.div_ceil(page_size),
            rows,
        })
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn valuation_report(valuations: &[FinancialValuation]) -> ReportTable {
    let mut table = ReportTable::new(
        "Financial valuations",
        &["Valuation", "Amount (USD)", "Start", "End", "Status", "Invoice"],
    );

    let mut sorted: Vec<&FinancialValuation> = valuations.iter().collect();
    sorted.sort_by_key(|v| (v.start_date, v.id));

    for v in sorted {
        table.rows.push(vec![
            v.number.trim().to_string(),
            format_amount(v.amount),
            iso(v.start_date),
            iso(v.end_date),
            v.status.display_name().to_string(),
            v.invoice_number.clone().unwrap_or_default(),
        ]);
    }

    table
}

pub fn progress_report(entries: &[PhysicalProgress]) -> ReportTable {
    let mut table = ReportTable::new(
        "Physical progress",
        &["Start", "End", "Real", "Planned", "Deviation", "Attention points"],
    );

    let mut sorted: Vec<&PhysicalProgress> = entries.iter().collect();
    sorted.sort_by_key(|p| (p.start_date, p.id));

    for p in sorted {
        let deviation = match (p.real_progress, p.planned_progress) {
            (Some(real), Some(planned)) => Some(real - planned),
            _ => None,
        };
        table.rows.push(vec![
            iso(p.start_date),
            iso(p.end_date),
            format_percentage(p.real_progress, PercentScale::Whole),
            format_percentage(p.planned_progress, PercentScale::Whole),
            format_percentage(deviation, PercentScale::Whole),
            p.attention_points.clone().unwrap_or_default(),
        ]);
    }

    table
}

pub fn cost_report(costs: &[CostEntry]) -> ReportTable {
    let mut table = ReportTable::new(
        "Costs",
        &["Valuation", "Amount (USD)", "Amortization (USD)", "Start", "End", "Status"],
    );

    let mut sorted: Vec<&CostEntry> = costs.iter().collect();
    sorted.sort_by_key(|c| (c.start_date, c.id));

    for c in sorted {
        table.rows.push(vec![
            c.valuation_number.trim().to_string(),
            format_amount(c.amount),
            format_amount(c.amortization),
            iso(c.start_date),
            iso(c.end_date),
            c.status.display_name().to_string(),
        ]);
    }

    table
}

/// One row per project with its running totals.
pub fn project_summary_report(snapshots: &[LedgerSnapshot]) -> ReportTable {
    let mut table = ReportTable::new(
        "Project summary",
        &[
            "Project",
            "Client",
            "Region",
            "Offered (USD)",
            "Valuated (USD)",
            "Invoiced (USD)",
            "Financial progress",
            "Real progress",
            "Planned progress",
            "Amortized (USD)",
            "Remaining advance (USD)",
        ],
    );

    for snapshot in snapshots {
        let project = &snapshot.project;
        let totals = ProjectTotals::compute(snapshot);
        table.rows.push(vec![
            project.name.clone(),
            project.client_reference.clone().unwrap_or_default(),
            project.region.clone().unwrap_or_default(),
            format_amount(Some(totals.offered_amount)),
            format_amount(Some(totals.valuated)),
            format_amount(Some(totals.invoiced)),
            format_percentage(Some(totals.financial_progress), PercentScale::Fraction),
            format_percentage(Some(totals.last_real_progress), PercentScale::Whole),
            format_percentage(Some(totals.last_planned_progress), PercentScale::Whole),
            format_amount(Some(totals.amortized)),
            format_amount(Some(totals.remaining_advance)),
        ]);
    }

    table
}
