/// Terminal result of one fetch, after retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// HTTP 200 with the decoded body.
    Success { body: String },
    /// HTTP 404; terminal, never retried.
    NotFound,
    /// Retries exhausted; carries the last status seen, if any.
    Failed { last_status: Option<u16> },
}

/// Fetch result plus the signals the pacing layer needs.
///
/// `pushback` replaces the mutable flag the retry loop would otherwise have
/// to thread through by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    pub outcome: FetchOutcome,
    /// True when any attempt hit a rate-limit/forbidden response.
    pub pushback: bool,
    /// Attempts actually issued.
    pub attempts: u32,
}
