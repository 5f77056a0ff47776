// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{RiskLevel, SystemicFlag};

pub const RECOMMEND_IMMEDIATE: &str =
    "Immediate remediation required; Conduct full security audit";
pub const RECOMMEND_ENHANCE: &str = "Enhance monitoring; Update incident response plan";
pub const RECOMMEND_ROUTINE: &str = "Regular maintenance; Staff training recommended";

/// The full output of one classification. The three fields are derived
/// independently of each other from the same inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub risk_level: RiskLevel,
    pub recommendations: &'static str,
    pub systemic_flag: SystemicFlag,
}

/// Weighted composite score. Wrapping u32 arithmetic: inputs large enough to
/// wrap are outside any realistic measurement range and the function stays
/// total rather than panicking on them.
pub fn risk_score(breaches: u32, response_time_minutes: u32, vulnerabilities: u32) -> u32 {
    breaches
        .wrapping_mul(3)
        .wrapping_add(response_time_minutes.wrapping_mul(2))
        .wrapping_add(vulnerabilities.wrapping_mul(5))
}

/// Classify one institution's revealed measurements.
///
/// Pure and total. Thresholds are strict-greater and evaluated in descending
/// order; the recommendation tier is keyed on the raw inputs rather than the
/// score, so a high score with moderate individual inputs can legitimately
/// pair with the routine recommendation.
pub fn classify(breaches: u32, response_time_minutes: u32, vulnerabilities: u32) -> Classification {
    let score = risk_score(breaches, response_time_minutes, vulnerabilities);

    let risk_level = if score > 100 {
        RiskLevel::Critical
    } else if score > 70 {
        RiskLevel::High
    } else if score > 40 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let recommendations = if breaches > 5 || response_time_minutes > 120 || vulnerabilities > 10 {
        RECOMMEND_IMMEDIATE
    } else if breaches > 2 || response_time_minutes > 60 || vulnerabilities > 5 {
        RECOMMEND_ENHANCE
    } else {
        RECOMMEND_ROUTINE
    };

    let systemic_flag = if breaches > 10 && response_time_minutes > 180 {
        SystemicFlag::High
    } else if breaches > 5 && response_time_minutes > 120 {
        SystemicFlag::Potential
    } else {
        SystemicFlag::None
    };

    Classification {
        risk_level,
        recommendations,
        systemic_flag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn score_thresholds_are_strict_greater() {
        // (breaches, rt, vulns) tuples pinned to land exactly on the
        // interesting scores.
        let cases = [
            (0, 20, 0, 40, RiskLevel::Low),
            (12, 0, 1, 41, RiskLevel::Medium),
            (0, 35, 0, 70, RiskLevel::Medium),
            (2, 30, 1, 71, RiskLevel::High),
            (0, 50, 0, 100, RiskLevel::High),
            (32, 0, 1, 101, RiskLevel::Critical),
        ];
        for (b, rt, v, score, expected) in cases {
            assert_eq!(risk_score(b, rt, v), score);
            assert_eq!(classify(b, rt, v).risk_level, expected, "score {}", score);
        }
    }

    #[test]
    fn moderate_inputs_high_score_diverge() {
        // Score 71 puts this at High while every individual input sits below
        // its recommendation threshold, so the routine tier applies.
        let c = classify(2, 30, 1);
        assert_eq!(risk_score(2, 30, 1), 71);
        assert_eq!(c.risk_level, RiskLevel::High);
        assert_eq!(c.recommendations, RECOMMEND_ROUTINE);
        assert_eq!(c.systemic_flag, SystemicFlag::None);
    }

    #[test]
    fn severe_inputs_trip_every_tier() {
        let c = classify(6, 130, 11);
        assert_eq!(risk_score(6, 130, 11), 333);
        assert_eq!(c.risk_level, RiskLevel::Critical);
        assert_eq!(c.recommendations, RECOMMEND_IMMEDIATE);
        assert_eq!(c.systemic_flag, SystemicFlag::Potential);
    }

    #[test]
    fn systemic_flag_ignores_vulnerabilities() {
        assert_eq!(classify(11, 181, 0).systemic_flag, SystemicFlag::High);
        assert_eq!(classify(11, 181, 1000).systemic_flag, SystemicFlag::High);
        assert_eq!(classify(6, 121, 0).systemic_flag, SystemicFlag::Potential);
        assert_eq!(classify(0, 0, 1000).systemic_flag, SystemicFlag::None);
    }

    proptest! {
        #[test]
        fn classify_is_deterministic(b in 0u32..1000, rt in 0u32..10_000, v in 0u32..1000) {
            prop_assert_eq!(classify(b, rt, v), classify(b, rt, v));
        }

        #[test]
        fn risk_level_matches_score_bands(b in 0u32..1000, rt in 0u32..10_000, v in 0u32..1000) {
            let score = risk_score(b, rt, v);
            let expected = if score > 100 {
                RiskLevel::Critical
            } else if score > 70 {
                RiskLevel::High
            } else if score > 40 {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            };
            prop_assert_eq!(classify(b, rt, v).risk_level, expected);
        }
    }
}
