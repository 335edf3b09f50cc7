use serde::{Deserialize, Serialize};

/// Terminal outcome of one hook invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    accepted: bool,
    summary: String,
    detail: String,
}

impl ExecutionResult {
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            summary: String::new(),
            detail: String::new(),
        }
    }

    pub fn rejected(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            accepted: false,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// The veto this result casts, if it is a rejection.
    pub fn veto(&self) -> Option<Veto> {
        (!self.accepted).then(|| Veto::new(self.summary.clone(), self.detail.clone()))
    }
}

/// One reason a host operation was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Veto {
    pub summary: String,
    pub detail: String,
}

impl Veto {
    pub fn new(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

/// The host's combined decision over all checks of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostOutcome {
    pub vetoes: Vec<Veto>,
}

impl HostOutcome {
    pub fn is_rejected(&self) -> bool {
        !self.vetoes.is_empty()
    }
}

impl From<&ExecutionResult> for HostOutcome {
    fn from(result: &ExecutionResult) -> Self {
        Self {
            vetoes: result.veto().into_iter().collect(),
        }
    }
}
