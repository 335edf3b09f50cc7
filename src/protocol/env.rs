//! Environment variables handed to the hook executable.

use std::collections::BTreeMap;

use tracing::warn;

use crate::domain::{PullRequest, PullRequestRef, Repository, RepositoryPermissions, User};

/// Extra variables layered on top of the host process environment.
pub type Environment = BTreeMap<String, String>;

/// Who is updating which repository.
#[derive(Debug, Clone)]
pub struct PushContext {
    pub user: User,
    pub repository: Repository,
    pub permissions: RepositoryPermissions,
    pub base_url: String,
}

/// `STASH_*` variables describing the acting user and target repository.
pub fn push_environment(ctx: &PushContext) -> Environment {
    let mut env = Environment::new();
    env.insert("STASH_USER_NAME".into(), ctx.user.name.clone());
    match &ctx.user.email {
        Some(email) => {
            env.insert("STASH_USER_EMAIL".into(), email.clone());
        }
        None => warn!(user = %ctx.user.name, "user has no email address, STASH_USER_EMAIL not set"),
    }
    env.insert("STASH_REPO_NAME".into(), ctx.repository.name.clone());
    env.insert("STASH_IS_ADMIN".into(), ctx.permissions.admin.to_string());
    env.insert("STASH_IS_WRITE".into(), ctx.permissions.write.to_string());
    env.insert(
        "STASH_IS_DIRECT_ADMIN".into(),
        ctx.permissions.direct_admin.to_string(),
    );
    env.insert(
        "STASH_IS_DIRECT_WRITE".into(),
        ctx.permissions.direct_write.to_string(),
    );
    env.insert(
        "STASH_REPO_IS_FORK".into(),
        ctx.repository.is_fork.to_string(),
    );
    for link in &ctx.repository.clone_links {
        env.insert(
            format!("STASH_REPO_CLONE_{}", link.name.to_uppercase()),
            link.href.clone(),
        );
    }
    env.insert("STASH_BASE_URL".into(), ctx.base_url.clone());
    env.insert(
        "STASH_PROJECT_NAME".into(),
        ctx.repository.project.name.clone(),
    );
    env.insert(
        "STASH_PROJECT_KEY".into(),
        ctx.repository.project.key.clone(),
    );
    env
}

/// `PULL_REQUEST_*` variables describing the pull request being merged.
pub fn pull_request_environment(pr: &PullRequest, base_url: &str) -> Environment {
    let mut env = Environment::new();
    insert_ref(&mut env, "PULL_REQUEST_FROM", &pr.from_ref);
    insert_ref(&mut env, "PULL_REQUEST_TO", &pr.to_ref);
    env.insert("PULL_REQUEST_URL".into(), pr.url(base_url));
    env.insert("PULL_REQUEST_ID".into(), pr.id.to_string());
    env.insert("PULL_REQUEST_VERSION".into(), pr.version.to_string());
    env.insert("PULL_REQUEST_AUTHOR_ID".into(), pr.author.id.to_string());
    env.insert(
        "PULL_REQUEST_AUTHOR_DISPLAY_NAME".into(),
        pr.author.display_name.clone(),
    );
    env.insert("PULL_REQUEST_AUTHOR_NAME".into(), pr.author.name.clone());
    env.insert(
        "PULL_REQUEST_AUTHOR_EMAIL".into(),
        pr.author.email.clone().unwrap_or_default(),
    );
    env.insert("PULL_REQUEST_AUTHOR_SLUG".into(), pr.author.slug.clone());
    env.insert("PULL_REQUEST_TITLE".into(), pr.title.clone());
    env
}

fn insert_ref(env: &mut Environment, prefix: &str, side: &PullRequestRef) {
    let repo: &Repository = &side.repository;
    let mut put = |name: &str, value: String| {
        env.insert(format!("{prefix}_{name}"), value);
    };
    put("HASH", side.latest_commit.clone());
    put("ID", side.id.clone());
    put("BRANCH", side.display_id.clone());
    put("REPO_ID", repo.id.to_string());
    put("REPO_NAME", repo.name.clone());
    put("REPO_PROJECT_ID", repo.project.id.to_string());
    put("REPO_PROJECT_KEY", repo.project.key.clone());
    put("REPO_SLUG", repo.slug.clone());
    put("SSH_CLONE_URL", repo.clone_url("ssh").to_string());
    put("HTTP_CLONE_URL", repo.clone_url("http").to_string());
}
