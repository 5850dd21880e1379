//! What an inspect query last displayed.

use rollclaim_core::config::EmptyReportPolicy;

/// Effect of one inspect result on a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewUpdate {
    /// New text replaced what was shown.
    Replaced,
    /// Same text as before.
    Unchanged,
    /// No reports; previous text kept.
    Retained,
    /// No reports; previous text dropped.
    Cleared,
}

impl ViewUpdate {
    /// The result carried no reports.
    pub fn was_empty(&self) -> bool {
        matches!(self, Self::Retained | Self::Cleared)
    }
}

#[derive(Debug, Clone)]
pub struct InspectView {
    policy: EmptyReportPolicy,
    shown: Option<String>,
}

impl InspectView {
    pub fn new(policy: EmptyReportPolicy) -> Self {
        Self {
            policy,
            shown: None,
        }
    }

    pub fn shown(&self) -> Option<&str> {
        self.shown.as_deref()
    }

    pub fn apply(&mut self, result: Option<String>) -> ViewUpdate {
        match result {
            Some(text) if self.shown.as_deref() == Some(text.as_str()) => ViewUpdate::Unchanged,
            Some(text) => {
                self.shown = Some(text);
                ViewUpdate::Replaced
            }
            None => match self.policy {
                EmptyReportPolicy::Retain => ViewUpdate::Retained,
                EmptyReportPolicy::Clear => {
                    self.shown = None;
                    ViewUpdate::Cleared
                }
            },
        }
    }
}
