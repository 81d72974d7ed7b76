//! Plan pricing configuration

use serde::Deserialize;

use crate::domain::subscription::Plan;

use super::error::ValidationError;

/// Plan pricing table, in integer cents.
#[derive(Debug, Clone, Deserialize)]
pub struct PlansConfig {
    /// 15-day plan price
    #[serde(default = "default_plan_15_price_cents")]
    pub plan_15_price_cents: i64,

    /// 30-day plan price
    #[serde(default = "default_plan_30_price_cents")]
    pub plan_30_price_cents: i64,
}

impl PlansConfig {
    /// Price for a plan, in cents.
    pub fn price_cents(&self, plan: Plan) -> i64 {
        match plan {
            Plan::Days15 => self.plan_15_price_cents,
            Plan::Days30 => self.plan_30_price_cents,
        }
    }

    /// Validate pricing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.plan_15_price_cents <= 0 {
            return Err(ValidationError::InvalidPlanPrice("PLAN_15_PRICE_CENTS"));
        }
        if self.plan_30_price_cents <= 0 {
            return Err(ValidationError::InvalidPlanPrice("PLAN_30_PRICE_CENTS"));
        }
        Ok(())
    }
}

impl Default for PlansConfig {
    fn default() -> Self {
        Self {
            plan_15_price_cents: default_plan_15_price_cents(),
            plan_30_price_cents: default_plan_30_price_cents(),
        }
    }
}

fn default_plan_15_price_cents() -> i64 {
    590
}

fn default_plan_30_price_cents() -> i64 {
    990
}
