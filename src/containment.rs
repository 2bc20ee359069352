//! Parent/child containment rules.
//!
//! A parent's template lists the child types it accepts in `allowed_children`
//! (`"*"` accepts anything). Root-level contexts are always allowed.

use crate::context::Context;
use crate::error::ApiError;
use crate::template::TemplateSource;
use serde::{Deserialize, Serialize};
use tracing::debug;

const WILDCARD: &str = "*";

/// How a context is being created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreateMode {
    #[default]
    Standard,
    /// Structure discovered after the fact; containment is not enforced
    Emergent,
}

/// Options for `create_context`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOptions {
    /// Skip the containment check
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub mode: CreateMode,
}

impl CreateOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    pub fn emergent() -> Self {
        Self {
            mode: CreateMode::Emergent,
            ..Self::default()
        }
    }

    fn bypasses_containment(&self) -> bool {
        self.force || self.mode == CreateMode::Emergent
    }
}

/// Check that a `child_type` may be created under `parent`.
pub fn validate_containment(
    templates: &dyn TemplateSource,
    child_type: &str,
    parent: Option<&Context>,
    options: CreateOptions,
) -> Result<(), ApiError> {
    let Some(parent) = parent else {
        return Ok(());
    };
    if options.bypasses_containment() {
        debug!(
            child_type,
            parent_type = %parent.context_type,
            "Containment check bypassed"
        );
        return Ok(());
    }

    let template = templates.load(&parent.context_type)?;
    let allowed = template.allowed_children(&parent.context_type);
    if allowed.iter().any(|c| c == WILDCARD || c == child_type) {
        return Ok(());
    }

    Err(ApiError::ContainmentViolation {
        child_type: child_type.to_string(),
        parent_type: parent.context_type.clone(),
        allowed_children: allowed.to_vec(),
        suggestion: suggest_alternative(child_type, &parent.context_type).to_string(),
    })
}

/// Hint shown alongside a containment violation.
pub fn suggest_alternative(child_type: &str, parent_type: &str) -> &'static str {
    match (child_type, parent_type) {
        ("workspace", "task") => "Consider creating the workspace at root level instead.",
        ("portfolio", "task") => "Portfolios should be root level containers.",
        ("workspace", "epic") => "Workspaces should contain epics, not the other way around.",
        ("project", "task") => "Tasks should be contained within projects.",
        ("epic", "task") => "Tasks should be contained within epics.",
        ("task", "workspace") => "Consider creating a project first, then add tasks to it.",
        _ => "Consider the logical hierarchy of your contexts.",
    }
}
