pub mod path;
pub mod pull_request;
pub mod ref_change;
pub mod repository;
pub mod scope;

pub use path::SandboxedPath;
pub use pull_request::{PullRequest, PullRequestRef};
pub use ref_change::{ParseRefChangeError, RefChange};
pub use repository::{NamedLink, Project, Repository, RepositoryPermissions, User};
pub use scope::{Scope, ScopeType};
