//! Subscription plans.
//!
//! Plan durations come from a small fixed set; the plan code travels inside
//! external payment references (`P15`, `P30`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Available plan durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Days15,
    Days30,
}

impl Plan {
    /// Access duration granted on activation.
    pub fn duration_days(&self) -> i64 {
        match self {
            Plan::Days15 => 15,
            Plan::Days30 => 30,
        }
    }

    /// Code embedded in external payment references.
    pub fn code(&self) -> &'static str {
        match self {
            Plan::Days15 => "P15",
            Plan::Days30 => "P30",
        }
    }

    /// Decodes a plan code recovered from a payment reference.
    ///
    /// Unknown codes resolve to the 30-day plan, matching how references
    /// from older bot versions are interpreted.
    pub fn from_code(code: &str) -> Self {
        if code.contains("P15") {
            Plan::Days15
        } else {
            Plan::Days30
        }
    }

    /// Looks up the plan for an exact duration.
    pub fn from_days(days: i64) -> Option<Self> {
        match days {
            15 => Some(Plan::Days15),
            30 => Some(Plan::Days30),
            _ => None,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dias", self.duration_days())
    }
}
