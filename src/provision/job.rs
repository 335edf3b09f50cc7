use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{error, info, warn};

use super::HookProvisioner;
use crate::host::{Directory, HostError, Scheduler};
use crate::walker::ScopeWalker;

pub const JOB_ID: &str = "external-hooks-enable-job";

/// Upper bound of the start delay on clustered deployments.
pub const MAX_CLUSTER_DELAY: Duration = Duration::from_millis(2000);

/// Totals of one provisioning sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scopes: usize,
    pub created: usize,
    pub failed: usize,
}

/// One-shot job that re-creates hook scripts across the whole instance.
pub struct ProvisioningJob {
    scheduler: Arc<dyn Scheduler>,
    directory: Arc<dyn Directory>,
    provisioner: HookProvisioner,
    clustered: bool,
}

impl ProvisioningJob {
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        directory: Arc<dyn Directory>,
        provisioner: HookProvisioner,
        clustered: bool,
    ) -> Self {
        Self {
            scheduler,
            directory,
            provisioner,
            clustered,
        }
    }

    /// Schedule the sweep. Nodes of a cluster start racing for the job at
    /// once, so each picks a random delay.
    pub fn start(&self) -> Result<Duration, HostError> {
        let delay = if self.clustered {
            let millis = MAX_CLUSTER_DELAY.as_millis() as u64;
            Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
        } else {
            Duration::ZERO
        };
        info!(job = JOB_ID, ?delay, "scheduling hook script creation");
        self.scheduler.schedule_once(JOB_ID, delay)?;
        Ok(delay)
    }

    /// Walk every project and repository, install their scripts, then
    /// unschedule the job.
    pub fn run(&self) -> SweepReport {
        info!(job = JOB_ID, "started creating hook scripts");
        let mut report = SweepReport::default();

        for item in ScopeWalker::new(self.directory.as_ref()) {
            let scope = match item {
                Ok(scope) => scope,
                Err(e) => {
                    error!(error = %e, "unable to list scopes, sweep stopped");
                    report.failed += 1;
                    break;
                }
            };
            report.scopes += 1;
            match self.provisioner.install(scope) {
                Ok(scope_report) => {
                    report.created += scope_report.created;
                    report.failed += scope_report.failed;
                }
                Err(e) => {
                    error!(%scope, error = %e, "unable to list hooks");
                    report.failed += 1;
                }
            }
        }

        if let Err(e) = self.scheduler.unschedule(JOB_ID) {
            warn!(job = JOB_ID, error = %e, "unable to unschedule job");
        }
        info!(
            scopes = report.scopes,
            created = report.created,
            failed = report.failed,
            "finished creating hook scripts"
        );
        report
    }
}
