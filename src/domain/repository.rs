use super::Scope;

/// A host user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub slug: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    pub key: String,
    pub name: String,
}

/// A named hyperlink, e.g. a clone URL labelled `ssh` or `http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedLink {
    pub name: String,
    pub href: String,
}

impl NamedLink {
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub project: Project,
    pub is_fork: bool,
    pub clone_links: Vec<NamedLink>,
}

impl Repository {
    pub fn scope(&self) -> Scope {
        Scope::repository(self.id, self.project.id)
    }

    /// First clone link for `protocol` (`ssh`, `http`), or an empty string.
    pub fn clone_url(&self, protocol: &str) -> &str {
        self.clone_links
            .iter()
            .find(|link| link.name.eq_ignore_ascii_case(protocol))
            .map(|link| link.href.as_str())
            .unwrap_or("")
    }
}

/// What the acting user may do in the repository being updated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepositoryPermissions {
    pub admin: bool,
    pub write: bool,
    pub direct_admin: bool,
    pub direct_write: bool,
}
