//! Auth Flow Tracking
//!
//! Login and refresh move forward through fixed stages. A failure is logged
//! once, tagged with the stage it happened in.

use std::fmt;

use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FlowStage {
    /// Checking the presented credential or refresh token
    Verifying,
    /// Resolving the local user
    Syncing,
    /// Signing the access token
    Issuing,
    /// Writing the access-token entry and the refresh session
    Persisting,
    Done,
}

impl FlowStage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FlowStage::Verifying => "verifying",
            FlowStage::Syncing => "syncing",
            FlowStage::Issuing => "issuing",
            FlowStage::Persisting => "persisting",
            FlowStage::Done => "done",
        }
    }
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage tracker for one login or refresh
#[derive(Debug)]
pub struct AuthFlow {
    name: &'static str,
    stage: FlowStage,
}

impl AuthFlow {
    pub fn begin(name: &'static str) -> Self {
        Self {
            name,
            stage: FlowStage::Verifying,
        }
    }

    pub fn stage(&self) -> FlowStage {
        self.stage
    }

    /// Move to `next`. Backward moves are ignored.
    pub fn advance(&mut self, next: FlowStage) {
        if next <= self.stage {
            return;
        }
        tracing::trace!(flow = self.name, from = %self.stage, to = %next, "Auth flow stage");
        self.stage = next;
    }

    pub fn complete(&mut self) {
        self.advance(FlowStage::Done);
    }

    /// Record the failure against the current stage and hand the error back
    pub fn fail(&self, err: AuthError) -> AuthError {
        if err.kind().is_server_error() {
            tracing::error!(flow = self.name, stage = %self.stage, error = %err, "Auth flow failed");
        } else {
            tracing::info!(flow = self.name, stage = %self.stage, error = %err, "Auth flow rejected");
        }
        err
    }
}
