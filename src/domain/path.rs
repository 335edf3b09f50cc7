/// A path normalized for anchoring under a sandbox directory.
///
/// `.` and empty components are dropped and `..` collapses the previous
/// component, all logically (no filesystem access). A leading `/` is not
/// preserved: the result is always relative, so joining it onto a base
/// directory can never leave that directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SandboxedPath(String);

impl SandboxedPath {
    /// Normalize `raw` for sandboxing.
    ///
    /// Returns `None` when a `..` component would climb above the root,
    /// e.g. `../../etc/passwd` or `a/../../b`.
    pub fn new(raw: &str) -> Option<Self> {
        let mut components: Vec<&str> = Vec::new();
        for part in raw.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    components.pop()?;
                }
                other => components.push(other),
            }
        }
        Some(SandboxedPath(components.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
