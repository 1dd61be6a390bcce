use crate::config::ProjectLayout;
use crate::diagnostics::Diagnostics;
use serde::Serialize;

pub const MISSING_MANIFEST: &str = "No public API manifest found. Run atlas index.";

/// Failure reason naming the configured snapshot file
pub fn drifted_reason(approved_api: &str) -> String {
    format!("Public API has drifted from {}", approved_api)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftResult {
    pub status: DriftStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DriftResult {
    pub fn pass() -> Self {
        Self {
            status: DriftStatus::Pass,
            reason: None,
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            status: DriftStatus::Fail,
            reason: Some(reason.into()),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == DriftStatus::Pass
    }
}

/// Compare the generated public-API manifest with the approved snapshot.
///
/// Never errors: an unreadable file is reported as a failed check.
pub fn check_drift(layout: &ProjectLayout, diagnostics: &dyn Diagnostics) -> DriftResult {
    let current_path = layout.public_api_path();
    if !current_path.is_file() {
        return DriftResult::fail(MISSING_MANIFEST);
    }

    let approved_path = layout.approved_api_path();
    if !approved_path.exists() {
        return DriftResult::pass();
    }

    let approved = match std::fs::read(&approved_path) {
        Ok(bytes) => bytes,
        Err(err) => return DriftResult::fail(format!("Failed to read {}: {}", approved_path.display(), err)),
    };
    let current = match std::fs::read(&current_path) {
        Ok(bytes) => bytes,
        Err(err) => return DriftResult::fail(format!("Failed to read {}: {}", current_path.display(), err)),
    };

    if approved != current {
        diagnostics.debug(&format!("Public API differs from {}", approved_path.display()));
        return DriftResult::fail(drifted_reason(&layout.config().approved_api));
    }
    DriftResult::pass()
}
