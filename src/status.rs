use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Processing state shared by valuations and cost entries.
///
/// The lifecycle is strictly linear: `PendingValuation -> PendingInvoicing -> Invoiced`.
/// `Invoiced` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum ProcessStatus {
    #[schemars(description = "Work recorded, waiting for the valuation to be approved")]
    PendingValuation,

    #[schemars(description = "Valuation approved, waiting for the invoice to be issued")]
    PendingInvoicing,

    #[schemars(description = "Invoice issued. Terminal state, no further changes allowed")]
    Invoiced,
}

impl Default for ProcessStatus {
    fn default() -> Self {
        Self::PendingValuation
    }
}

pub struct StatusRow {
    pub id: u8,
    pub status: ProcessStatus,
    pub display_name: &'static str,
}

/// Canonical mapping between backend status ids, variants and display names.
pub static STATUS_TABLE: [StatusRow; 3] = [
    StatusRow {
        id: 1,
        status: ProcessStatus::PendingValuation,
        display_name: "Pendiente de valuación",
    },
    StatusRow {
        id: 2,
        status: ProcessStatus::PendingInvoicing,
        display_name: "Pendiente de facturación",
    },
    StatusRow {
        id: 3,
        status: ProcessStatus::Invoiced,
        display_name: "Facturado",
    },
];

impl ProcessStatus {
    fn row(self) -> &'static StatusRow {
        match self {
            Self::PendingValuation => &STATUS_TABLE[0],
            Self::PendingInvoicing => &STATUS_TABLE[1],
            Self::Invoiced => &STATUS_TABLE[2],
        }
    }

    pub fn id(self) -> u8 {
        self.row().id
    }

    pub fn display_name(self) -> &'static str {
        self.row().display_name
    }

    pub fn from_id(id: u8) -> Option<Self> {
        STATUS_TABLE
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.status)
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::PendingValuation => Some(Self::PendingInvoicing),
            Self::PendingInvoicing => Some(Self::Invoiced),
            Self::Invoiced => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Only the immediate successor is reachable; no skipping, no regression.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProcessStatus {
    type Err = String;

    /// Accepts the backend id, the variant name or the display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Ok(id) = trimmed.parse::<u8>() {
            return Self::from_id(id).ok_or_else(|| format!("Unknown status id: {}", id));
        }

        STATUS_TABLE
            .iter()
            .find(|row| {
                row.display_name.eq_ignore_ascii_case(trimmed)
                    || format!("{:?}", row.status).eq_ignore_ascii_case(trimmed)
            })
            .map(|row| row.status)
            .ok_or_else(|| format!("Unknown status: {}", trimmed))
    }
}
