use crate::host::{HookScriptType, Trigger, PUSH_TRIGGERS};

/// Key of the plugin every hook family belongs to.
pub const PLUGIN_KEY: &str = "com.ngs.stash.externalhooks.external-hooks";

/// One kind of hook this crate provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookFamily {
    pub component_id: &'static str,
    /// Kind of host script installed for the family; `None` for families
    /// that only run in-process.
    pub script_type: Option<HookScriptType>,
    pub triggers: &'static [Trigger],
}

pub const PRE_RECEIVE: HookFamily = HookFamily {
    component_id: "external-pre-receive-hook",
    script_type: Some(HookScriptType::Pre),
    triggers: PUSH_TRIGGERS,
};

pub const POST_RECEIVE: HookFamily = HookFamily {
    component_id: "external-post-receive-hook",
    script_type: Some(HookScriptType::Post),
    triggers: PUSH_TRIGGERS,
};

pub const MERGE_CHECK: HookFamily = HookFamily {
    component_id: "external-merge-check-hook",
    script_type: None,
    triggers: &[Trigger::PullRequestMerge],
};

pub const FAMILIES: [HookFamily; 3] = [PRE_RECEIVE, POST_RECEIVE, MERGE_CHECK];

impl HookFamily {
    /// `<plugin-key>:<component-id>`, the key the host knows the hook by.
    pub fn key(&self) -> String {
        format!("{PLUGIN_KEY}:{}", self.component_id)
    }

    pub fn matches(&self, hook_key: &str) -> bool {
        hook_key
            .strip_prefix(PLUGIN_KEY)
            .and_then(|rest| rest.strip_prefix(':'))
            == Some(self.component_id)
    }

    pub fn find(hook_key: &str) -> Option<HookFamily> {
        FAMILIES.into_iter().find(|family| family.matches(hook_key))
    }
}

/// Whether `hook_key` names any hook of this plugin.
pub fn is_own_hook(hook_key: &str) -> bool {
    hook_key.starts_with(PLUGIN_KEY)
}
