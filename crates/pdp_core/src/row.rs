use std::fmt;

/// Fields pulled from a parsed PDP payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFields {
    pub code: String,
    pub title: String,
    pub regular_price: Option<f64>,
    pub discount_price: Option<f64>,
    pub seller: String,
}

/// Fixed status vocabulary for report rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowStatus {
    /// Page fetched and payload parsed.
    Ok,
    /// Retries exhausted without a terminal response.
    HttpError,
    /// The site answered 404 for this item.
    NotFound,
    /// Page fetched but the embedded payload was missing or unreadable.
    UnknownFormat,
    /// Unexpected processing failure, with its description.
    Failed(String),
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Ok => write!(f, "OK"),
            RowStatus::HttpError => write!(f, "HTTP error"),
            RowStatus::NotFound => write!(f, "404"),
            RowStatus::UnknownFormat => write!(f, "unknown format"),
            RowStatus::Failed(message) => write!(f, "error: {message}"),
        }
    }
}

/// One report row per processed work item, in processing order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub timestamp: String,
    pub item_key: String,
    pub url: String,
    pub fields: Option<ProductFields>,
    pub status: RowStatus,
}
