//! Lazy enumeration of every project and repository scope.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::domain::{Project, Repository, Scope};
use crate::host::{Directory, HostError, PageRequest};

/// Yields each project scope followed by the scopes of its repositories.
///
/// Pages are fetched on demand. A host error is yielded once and ends the
/// walk; the walker cannot be restarted.
pub struct ScopeWalker<'a> {
    directory: &'a dyn Directory,
    projects: VecDeque<Project>,
    next_projects: Option<PageRequest>,
    repositories: VecDeque<Repository>,
    next_repositories: Option<(Project, PageRequest)>,
    done: bool,
}

impl<'a> ScopeWalker<'a> {
    pub fn new(directory: &'a dyn Directory) -> Self {
        Self {
            directory,
            projects: VecDeque::new(),
            next_projects: Some(PageRequest::first()),
            repositories: VecDeque::new(),
            next_repositories: None,
            done: false,
        }
    }

    fn fail(&mut self, error: HostError) -> Option<Result<Scope, HostError>> {
        self.done = true;
        Some(Err(error))
    }
}

impl Iterator for ScopeWalker<'_> {
    type Item = Result<Scope, HostError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if let Some(repository) = self.repositories.pop_front() {
                return Some(Ok(repository.scope()));
            }
            if let Some((project, request)) = self.next_repositories.take() {
                match self.directory.repositories(&project, request) {
                    Ok(page) => {
                        self.repositories.extend(page.values);
                        self.next_repositories = page.next.map(|next| (project, next));
                    }
                    Err(e) => return self.fail(e),
                }
                continue;
            }
            if let Some(project) = self.projects.pop_front() {
                let scope = Scope::project(project.id);
                self.next_repositories = Some((project, PageRequest::first()));
                return Some(Ok(scope));
            }
            if let Some(request) = self.next_projects.take() {
                match self.directory.projects(request) {
                    Ok(page) => {
                        self.projects.extend(page.values);
                        self.next_projects = page.next;
                    }
                    Err(e) => return self.fail(e),
                }
                continue;
            }
            self.done = true;
        }
    }
}

impl FusedIterator for ScopeWalker<'_> {}
