use std::fmt;
use std::str::FromStr;

/// A single branch or tag update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefChange {
    pub from_hash: String,
    pub to_hash: String,
    pub ref_id: String,
}

impl RefChange {
    pub fn new(
        from_hash: impl Into<String>,
        to_hash: impl Into<String>,
        ref_id: impl Into<String>,
    ) -> Self {
        Self {
            from_hash: from_hash.into(),
            to_hash: to_hash.into(),
            ref_id: ref_id.into(),
        }
    }

    /// The wire line written to the hook's stdin: `<from> <to> <ref>\n`.
    pub fn protocol_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for RefChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.from_hash, self.to_hash, self.ref_id)
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("malformed ref change line: {0:?}")]
pub struct ParseRefChangeError(pub String);

/// Parses a git pre-receive line (`<old> <new> <ref>`).
impl FromStr for RefChange {
    type Err = ParseRefChangeError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.trim_end_matches(['\r', '\n']).splitn(3, ' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(from), Some(to), Some(ref_id))
                if !from.is_empty() && !to.is_empty() && !ref_id.is_empty() =>
            {
                Ok(RefChange::new(from, to, ref_id))
            }
            _ => Err(ParseRefChangeError(line.to_string())),
        }
    }
}
