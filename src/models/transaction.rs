use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single income or expense record as served by the transaction-service.
/// `amount` is always a positive magnitude; the effect on the balance is
/// determined by `kind`, never by a negative amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Transaction {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: String,
    pub(crate) amount: Decimal,
    #[serde(rename = "type")]
    pub(crate) kind: TransactionType,
    pub(crate) status: TransactionStatus,
    #[serde(default)]
    pub(crate) due_date: Option<String>,
    #[serde(default)]
    pub(crate) created_at: String,
}

impl Transaction {
    /// Display text: title when present and non-empty, otherwise description.
    pub(crate) fn display_title(&self) -> &str {
        match &self.title {
            Some(t) if !t.is_empty() => t,
            _ => &self.description,
        }
    }

    /// `(year, month)` embedded in the due date string, when there is one.
    pub(crate) fn due_year_month(&self) -> Option<(i32, u32)> {
        self.due_date.as_deref().and_then(year_month)
    }

    /// `(year, month)` embedded in the server-set creation timestamp.
    pub(crate) fn created_year_month(&self) -> Option<(i32, u32)> {
        year_month(&self.created_at)
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.status.is_pending()
    }
}

/// Payload for creating a transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewTransaction {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) amount: Decimal,
    pub(crate) due_date: String,
    #[serde(rename = "type")]
    pub(crate) kind: TransactionType,
}

/// Partial update payload. Absent fields are left untouched by the server,
/// so a status-only change is just a patch with only `status` set.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) due_date: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub(crate) kind: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) status: Option<TransactionStatus>,
}

impl TransactionPatch {
    pub(crate) fn status_only(status: TransactionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum TransactionType {
    #[serde(rename = "INCOME")]
    Income,
    #[serde(rename = "EXPENSE")]
    Expense,
}

impl TransactionType {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INCOME" => Some(Self::Income),
            "EXPENSE" => Some(Self::Expense),
            _ => None,
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    pub(crate) fn icon(&self) -> &'static str {
        match self {
            Self::Income => "💰",
            Self::Expense => "📋",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Transaction status. The services are inconsistent about casing
/// ("PENDING" vs "pending"), so parsing is case-insensitive and unknown
/// values keep their raw string form instead of failing the whole fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
    Other(String),
}

impl TransactionStatus {
    pub(crate) fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            _ => Self::Other(s.to_string()),
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Other(s) => s,
        }
    }

    /// Outbound representation. The services expect uppercase on writes.
    pub(crate) fn wire_value(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }

    /// Next status in the pending → completed → cancelled rotation.
    /// Unknown statuses re-enter the rotation at pending.
    pub(crate) fn cycled(&self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub(crate) fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for TransactionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.wire_value())
    }
}

impl<'de> Deserialize<'de> for TransactionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// `(year, month)` from the `YYYY-MM` prefix of a wire date string.
/// No timezone conversion: bucketing keys on the literal text.
pub(crate) fn year_month(s: &str) -> Option<(i32, u32)> {
    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(5..7)?.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month))
}

/// Reformat a `YYYY-MM-DD...` wire date as `DD/MM/YYYY`, again by string
/// slicing only. Anything that does not look like a date passes through.
pub(crate) fn format_wire_date(s: &str) -> String {
    match (s.get(0..4), s.get(5..7), s.get(8..10)) {
        (Some(y), Some(m), Some(d))
            if y.bytes().all(|b| b.is_ascii_digit())
                && m.bytes().all(|b| b.is_ascii_digit())
                && d.bytes().all(|b| b.is_ascii_digit()) =>
        {
            format!("{d}/{m}/{y}")
        }
        _ => s.to_string(),
    }
}
