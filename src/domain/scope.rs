use std::fmt;

/// The unit of hook configuration granularity.
///
/// Scopes form a strict inheritance chain: a repository inherits from its
/// project, a project inherits from the global scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Project { id: i64 },
    Repository { id: i64, project_id: i64 },
}

/// Scope kind without the resource identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeType {
    Global,
    Project,
    Repository,
}

impl ScopeType {
    /// Stable identifier used in persisted keys (`global`, `project`, `repository`).
    pub fn id(self) -> &'static str {
        match self {
            ScopeType::Global => "global",
            ScopeType::Project => "project",
            ScopeType::Repository => "repository",
        }
    }
}

impl Scope {
    pub fn project(id: i64) -> Self {
        Scope::Project { id }
    }

    pub fn repository(id: i64, project_id: i64) -> Self {
        Scope::Repository { id, project_id }
    }

    pub fn scope_type(&self) -> ScopeType {
        match self {
            Scope::Global => ScopeType::Global,
            Scope::Project { .. } => ScopeType::Project,
            Scope::Repository { .. } => ScopeType::Repository,
        }
    }

    /// Identity of the project or repository; `None` for the global scope.
    pub fn resource_id(&self) -> Option<i64> {
        match self {
            Scope::Global => None,
            Scope::Project { id } | Scope::Repository { id, .. } => Some(*id),
        }
    }

    /// The next scope up the inheritance chain.
    pub fn parent(&self) -> Option<Scope> {
        match self {
            Scope::Global => None,
            Scope::Project { .. } => Some(Scope::Global),
            Scope::Repository { project_id, .. } => Some(Scope::Project { id: *project_id }),
        }
    }

    /// Whether `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Scope) -> bool {
        let mut current = other.parent();
        while let Some(scope) = current {
            if scope == *self {
                return true;
            }
            current = scope.parent();
        }
        false
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource_id() {
            Some(id) => write!(f, "{}:{}", self.scope_type().id(), id),
            None => f.write_str(self.scope_type().id()),
        }
    }
}
