use std::sync::Arc;
use std::time::SystemTime;

use crate::protocol::ExecutionResult;

pub const REJECTED_SUMMARY: &str = "License is not valid.";
pub const REJECTED_DETAIL: &str = "License for External Hooks Plugin is expired.\n\
    Visit the add-on management page of your installation for more info.";

/// A license entity as installed on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct License {
    expires_at: Option<SystemTime>,
}

impl License {
    /// `None` means the license never expires.
    pub fn new(expires_at: Option<SystemTime>) -> Self {
        Self { expires_at }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(SystemTime::now())
    }

    pub fn is_valid_at(&self, now: SystemTime) -> bool {
        self.expires_at.is_none_or(|expiry| now < expiry)
    }
}

/// Where the current license comes from. Consulted on every decision so a
/// renewed or expired license takes effect without a restart.
pub trait LicenseSource: Send + Sync {
    fn current(&self) -> Option<License>;
}

impl LicenseSource for Option<License> {
    fn current(&self) -> Option<License> {
        *self
    }
}

/// Decides whether hook execution and provisioning are permitted.
#[derive(Clone)]
pub struct LicenseGate {
    source: Arc<dyn LicenseSource>,
}

impl LicenseGate {
    pub fn new(source: impl LicenseSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn is_defined(&self) -> bool {
        self.source.current().is_some()
    }

    /// No license entity counts as valid (trial posture).
    pub fn is_valid(&self) -> bool {
        self.source.current().is_none_or(|license| license.is_valid())
    }

    /// Fixed rejection used by every hook family when the license is invalid.
    pub fn rejection() -> ExecutionResult {
        ExecutionResult::rejected(REJECTED_SUMMARY, REJECTED_DETAIL)
    }
}

impl std::fmt::Debug for LicenseGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseGate")
            .field("license", &self.source.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn expired() -> License {
        License::new(Some(SystemTime::now() - Duration::from_secs(60)))
    }

    fn current() -> License {
        License::new(Some(SystemTime::now() + Duration::from_secs(3600)))
    }

    #[test]
    fn missing_license_is_valid_but_undefined() {
        let gate = LicenseGate::new(None);
        assert!(gate.is_valid());
        assert!(!gate.is_defined());
    }

    #[test]
    fn unexpired_license_is_valid() {
        let gate = LicenseGate::new(Some(current()));
        assert!(gate.is_defined());
        assert!(gate.is_valid());
    }

    #[test]
    fn expired_license_is_invalid() {
        let gate = LicenseGate::new(Some(expired()));
        assert!(gate.is_defined());
        assert!(!gate.is_valid());
    }

    #[test]
    fn perpetual_license_is_valid() {
        assert!(License::new(None).is_valid());
    }

    #[test]
    fn expiry_instant_itself_is_invalid() {
        let at = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);
        let license = License::new(Some(at));
        assert!(license.is_valid_at(at - Duration::from_secs(1)));
        assert!(!license.is_valid_at(at));
    }

    #[test]
    fn rejection_carries_fixed_messages() {
        let result = LicenseGate::rejection();
        assert!(!result.is_accepted());
        assert_eq!(result.summary(), REJECTED_SUMMARY);
        assert_eq!(result.detail(), REJECTED_DETAIL);
    }
}
