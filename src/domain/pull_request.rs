use super::{RefChange, Repository, User};

/// One side of a pull request: a branch in a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    /// Fully qualified ref, e.g. `refs/heads/feature`.
    pub id: String,
    /// Short branch name, e.g. `feature`.
    pub display_id: String,
    pub latest_commit: String,
    pub repository: Repository,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub id: i64,
    pub version: i32,
    pub title: String,
    pub author: User,
    pub from_ref: PullRequestRef,
    pub to_ref: PullRequestRef,
}

impl PullRequest {
    /// The ref change a merge would apply to the target branch.
    pub fn merge_ref_change(&self) -> RefChange {
        RefChange::new(
            self.to_ref.latest_commit.clone(),
            self.from_ref.latest_commit.clone(),
            self.to_ref.id.clone(),
        )
    }

    pub fn url(&self, base_url: &str) -> String {
        let target = &self.to_ref.repository;
        format!(
            "{}/projects/{}/repos/{}/pull-requests/{}",
            base_url.trim_end_matches('/'),
            target.project.key,
            target.slug,
            self.id
        )
    }
}
