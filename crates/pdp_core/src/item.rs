/// PDP address for a bare product code. The site routes on the trailing
/// numeric code; the slug segment is arbitrary.
pub const PDP_URL_TEMPLATE: &str = "https://www.liverpool.com.mx/tienda/pdp/lo-que-sea/{code}";

/// One unit of fetch work. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// A bare product code, resolved through [`PDP_URL_TEMPLATE`].
    Code(String),
    /// A complete PDP URL supplied directly in the input list.
    DirectUrl(String),
}

impl WorkItem {
    /// The URL this item is fetched from.
    pub fn resolved_url(&self) -> String {
        match self {
            WorkItem::Code(code) => PDP_URL_TEMPLATE.replace("{code}", code),
            WorkItem::DirectUrl(url) => url.clone(),
        }
    }

    /// Key recorded in the report's ITEM column; direct URLs carry no code.
    pub fn key(&self) -> &str {
        match self {
            WorkItem::Code(code) => code,
            WorkItem::DirectUrl(_) => "",
        }
    }

    /// Raw identifier, as written to the pending-work file.
    pub fn raw_id(&self) -> &str {
        match self {
            WorkItem::Code(code) => code,
            WorkItem::DirectUrl(url) => url,
        }
    }

    /// Parses an input list: one entry per line, blank lines and `#`
    /// comments skipped, `http…` lines taken as direct URLs.
    pub fn parse_list(raw: &str) -> Vec<WorkItem> {
        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                if line.starts_with("http") {
                    WorkItem::DirectUrl(line.to_string())
                } else {
                    WorkItem::Code(line.to_string())
                }
            })
            .collect()
    }
}
