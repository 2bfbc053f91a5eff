//! Outcome classification for skill checks.
//!
//! A check's net successes are compared against its difficulty class and the
//! margin sorts the result into one of six tiers. The tiers are ordered, so
//! "did this succeed" is a single comparison against [`SkillOutcome::MarginalSuccess`].

pub mod check;

pub use check::{CheckRequest, SkillCheckResult, perform_check};

use serde::{Deserialize, Serialize};

/// The six outcome tiers, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillOutcome {
    /// Missed the DC with nothing to show for it. A fumble.
    CriticalFailure,
    /// Missed the DC.
    Failure,
    /// Met the DC exactly.
    MarginalSuccess,
    /// Beat the DC by one or two.
    FullSuccess,
    /// Beat the DC by three or four.
    ExceptionalSuccess,
    /// Beat the DC by five or more.
    CriticalSuccess,
}

impl SkillOutcome {
    /// Classify net successes against a difficulty class.
    ///
    /// A miss with exactly zero net successes is a critical failure; a miss
    /// with any other net (including negative) is an ordinary failure.
    pub fn classify(net_successes: i32, difficulty_class: i32) -> Self {
        let margin = net_successes - difficulty_class;
        match margin {
            m if m < 0 && net_successes == 0 => Self::CriticalFailure,
            m if m < 0 => Self::Failure,
            0 => Self::MarginalSuccess,
            1 | 2 => Self::FullSuccess,
            3 | 4 => Self::ExceptionalSuccess,
            _ => Self::CriticalSuccess,
        }
    }

    /// Marginal success or better.
    pub fn is_success(self) -> bool {
        self >= Self::MarginalSuccess
    }

    /// The worst tier.
    pub fn is_fumble(self) -> bool {
        self == Self::CriticalFailure
    }

    /// The best tier.
    pub fn is_critical_success(self) -> bool {
        self == Self::CriticalSuccess
    }
}

impl std::fmt::Display for SkillOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CriticalFailure => write!(f, "Critical Failure"),
            Self::Failure => write!(f, "Failure"),
            Self::MarginalSuccess => write!(f, "Marginal Success"),
            Self::FullSuccess => write!(f, "Full Success"),
            Self::ExceptionalSuccess => write!(f, "Exceptional Success"),
            Self::CriticalSuccess => write!(f, "Critical Success"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn classification_table() {
        assert_eq!(SkillOutcome::classify(0, 2), SkillOutcome::CriticalFailure);
        assert_eq!(SkillOutcome::classify(1, 2), SkillOutcome::Failure);
        assert_eq!(SkillOutcome::classify(-3, 2), SkillOutcome::Failure);
        assert_eq!(SkillOutcome::classify(2, 2), SkillOutcome::MarginalSuccess);
        assert_eq!(SkillOutcome::classify(3, 2), SkillOutcome::FullSuccess);
        assert_eq!(SkillOutcome::classify(4, 2), SkillOutcome::FullSuccess);
        assert_eq!(SkillOutcome::classify(5, 2), SkillOutcome::ExceptionalSuccess);
        assert_eq!(SkillOutcome::classify(6, 2), SkillOutcome::ExceptionalSuccess);
        assert_eq!(SkillOutcome::classify(7, 2), SkillOutcome::CriticalSuccess);
    }

    #[test]
    fn zero_net_against_zero_dc_is_marginal() {
        assert_eq!(SkillOutcome::classify(0, 0), SkillOutcome::MarginalSuccess);
    }

    #[test]
    fn negative_dc_is_allowed() {
        assert_eq!(SkillOutcome::classify(0, -5), SkillOutcome::CriticalSuccess);
        assert_eq!(SkillOutcome::classify(-1, -1), SkillOutcome::MarginalSuccess);
    }

    #[test]
    fn ordering_and_flags() {
        assert!(SkillOutcome::CriticalFailure < SkillOutcome::Failure);
        assert!(SkillOutcome::Failure < SkillOutcome::MarginalSuccess);
        assert!(SkillOutcome::ExceptionalSuccess < SkillOutcome::CriticalSuccess);
        assert!(!SkillOutcome::Failure.is_success());
        assert!(SkillOutcome::MarginalSuccess.is_success());
        assert!(SkillOutcome::CriticalFailure.is_fumble());
        assert!(!SkillOutcome::Failure.is_fumble());
        assert!(SkillOutcome::CriticalSuccess.is_critical_success());
    }

    #[test]
    fn outcome_display() {
        assert_eq!(SkillOutcome::CriticalFailure.to_string(), "Critical Failure");
        assert_eq!(SkillOutcome::MarginalSuccess.to_string(), "Marginal Success");
        assert_eq!(
            SkillOutcome::ExceptionalSuccess.to_string(),
            "Exceptional Success"
        );
    }

    proptest! {
        #[test]
        fn classify_is_pure(net in -20i32..40, dc in -10i32..30) {
            prop_assert_eq!(SkillOutcome::classify(net, dc), SkillOutcome::classify(net, dc));
        }

        #[test]
        fn margin_of_five_is_always_critical(dc in -20i32..30, extra in 0i32..30) {
            let net = dc + 5 + extra;
            prop_assert_eq!(SkillOutcome::classify(net, dc), SkillOutcome::CriticalSuccess);
        }

        #[test]
        fn success_iff_net_meets_dc(net in -20i32..40, dc in -10i32..30) {
            prop_assert_eq!(SkillOutcome::classify(net, dc).is_success(), net >= dc);
        }
    }
}
