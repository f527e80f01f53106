//! Plan selection and customer form input.
//!
//! A [`FormInput`] carries everything a video render needs about one
//! customer. Validation runs before any payload is built or submitted;
//! an invalid form never reaches the render service.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Product whose video template a job renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanKind {
    /// Savings-first endowment product (shared base template).
    SecureSavings,
    /// Protection-first endowment product (shared base template).
    SecureLife,
    /// Child goal product with milestone withdrawals and maturity slides.
    GoalMaximizer,
}

impl PlanKind {
    /// Stable identifier used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKind::SecureSavings => "secure-savings",
            PlanKind::SecureLife => "secure-life",
            PlanKind::GoalMaximizer => "goal-maximizer",
        }
    }

    /// Parse a plan identifier, case-insensitive on the dashed form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.to_ascii_lowercase().as_str() {
            "secure-savings" => Ok(PlanKind::SecureSavings),
            "secure-life" => Ok(PlanKind::SecureLife),
            "goal-maximizer" => Ok(PlanKind::GoalMaximizer),
            other => Err(CoreError::Validation(format!("Unknown plan: {other}"))),
        }
    }
}

/// Validated customer input for one render job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub plan: PlanKind,
    pub customer_name: String,
    /// Annual premium in whole rupees.
    pub premium_amount: u64,
    /// Premium payment term in years.
    pub tenure_years: u32,
    /// Required for [`PlanKind::GoalMaximizer`].
    #[serde(default)]
    pub child_name: Option<String>,
    /// Customer age in years, required for [`PlanKind::GoalMaximizer`].
    #[serde(default)]
    pub customer_age: Option<u32>,
}

impl FormInput {
    /// Check that every field the selected plan needs is present and
    /// non-empty. The first violation wins.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.customer_name.trim().is_empty() {
            return Err(CoreError::Validation("customer_name is required".into()));
        }
        if self.premium_amount == 0 {
            return Err(CoreError::Validation(
                "premium_amount must be greater than zero".into(),
            ));
        }
        if self.tenure_years == 0 {
            return Err(CoreError::Validation(
                "tenure_years must be greater than zero".into(),
            ));
        }
        if self.plan == PlanKind::GoalMaximizer {
            match &self.child_name {
                Some(name) if !name.trim().is_empty() => {}
                _ => {
                    return Err(CoreError::Validation(
                        "child_name is required for the goal-maximizer plan".into(),
                    ));
                }
            }
            match self.customer_age {
                Some(age) if age > 0 => {}
                _ => {
                    return Err(CoreError::Validation(
                        "customer_age is required for the goal-maximizer plan".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> FormInput {
        FormInput {
            plan: PlanKind::SecureSavings,
            customer_name: "Asha Rao".to_string(),
            premium_amount: 100_000,
            tenure_years: 10,
            child_name: None,
            customer_age: None,
        }
    }

    fn goal_input() -> FormInput {
        FormInput {
            plan: PlanKind::GoalMaximizer,
            customer_name: "Asha Rao".to_string(),
            premium_amount: 100_000,
            tenure_years: 10,
            child_name: Some("Meera".to_string()),
            customer_age: Some(30),
        }
    }

    #[test]
    fn parse_known_plans() {
        assert_eq!(PlanKind::parse("secure-savings").unwrap(), PlanKind::SecureSavings);
        assert_eq!(PlanKind::parse("SECURE-LIFE").unwrap(), PlanKind::SecureLife);
        assert_eq!(PlanKind::parse("goal-maximizer").unwrap(), PlanKind::GoalMaximizer);
    }

    #[test]
    fn parse_unknown_plan_fails() {
        let err = PlanKind::parse("retirement-plus").unwrap_err();
        assert!(err.to_string().contains("Unknown plan"));
    }

    #[test]
    fn as_str_round_trips() {
        for plan in [PlanKind::SecureSavings, PlanKind::SecureLife, PlanKind::GoalMaximizer] {
            assert_eq!(PlanKind::parse(plan.as_str()).unwrap(), plan);
        }
    }

    #[test]
    fn valid_base_input_passes() {
        assert!(base_input().validate().is_ok());
    }

    #[test]
    fn valid_goal_input_passes() {
        assert!(goal_input().validate().is_ok());
    }

    #[test]
    fn blank_customer_name_rejected() {
        let mut input = base_input();
        input.customer_name = "   ".to_string();
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("customer_name"));
    }

    #[test]
    fn zero_premium_rejected() {
        let mut input = base_input();
        input.premium_amount = 0;
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("premium_amount"));
    }

    #[test]
    fn zero_tenure_rejected() {
        let mut input = base_input();
        input.tenure_years = 0;
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("tenure_years"));
    }

    #[test]
    fn goal_plan_requires_child_name() {
        let mut input = goal_input();
        input.child_name = None;
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("child_name"));

        input.child_name = Some(String::new());
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("child_name"));
    }

    #[test]
    fn goal_plan_requires_customer_age() {
        let mut input = goal_input();
        input.customer_age = None;
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("customer_age"));

        input.customer_age = Some(0);
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("customer_age"));
    }

    #[test]
    fn base_plans_ignore_goal_fields() {
        let mut input = base_input();
        input.child_name = None;
        input.customer_age = None;
        assert!(input.validate().is_ok());
    }
}
