//! Risk scoring for a single token record.
//!
//! Four independent sub-scores, each bounded to 100, combined by fixed
//! weights into one composite score in `[0, 100]`. The three-way risk
//! classification lives here too and is the single authoritative source for
//! both scoring display and filtering.

use crate::token::TokenRecord;
use serde::{Deserialize, Serialize};

/// Sub-model weights for the composite score.
const WEIGHT_MARKET: f64 = 0.15;
const WEIGHT_SECURITY: f64 = 0.40;
const WEIGHT_LIQUIDITY: f64 = 0.25;
const WEIGHT_GROWTH: f64 = 0.20;

/// Gas asymmetry beyond this is treated as suspicious.
const GAS_SYMMETRY_BUDGET: u64 = 50_000;

/// Tax above this percentage flags a warning.
const TAX_WARNING_THRESHOLD: f64 = 10.0;

/// Three-way danger classification.
///
/// The partition is exhaustive and mutually exclusive: a record is exactly
/// one of danger, warning or safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Danger,
    Warning,
    Safe,
}

/// Scoring breakdown for one record.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RiskScore {
    pub market_behavior: f64,
    pub contract_security: f64,
    pub liquidity_risk: f64,
    pub growth_momentum: f64,
    /// `0.15*market + 0.40*security + 0.25*liquidity + 0.20*growth`.
    pub composite: f64,
    pub level: RiskLevel,
}

impl RiskScore {
    pub fn compute(record: &TokenRecord) -> Self {
        let market_behavior = market_behavior(record);
        let contract_security = contract_security(record);
        let liquidity_risk = liquidity_risk(record);
        let growth_momentum = growth_momentum(record);

        let composite = (WEIGHT_MARKET * market_behavior
            + WEIGHT_SECURITY * contract_security
            + WEIGHT_LIQUIDITY * liquidity_risk
            + WEIGHT_GROWTH * growth_momentum)
            .clamp(0.0, 100.0);

        Self {
            market_behavior,
            contract_security,
            liquidity_risk,
            growth_momentum,
            composite,
            level: classify(record),
        }
    }
}

/// Classify one record as danger, warning or safe.
///
/// Danger: confirmed honeypot, or blacklisting without an anti-whale
/// mechanism. Warning: any one of the fixed risk-flag list below. Safe:
/// everything else.
pub fn classify(record: &TokenRecord) -> RiskLevel {
    if record.is_honeypot || (record.is_blacklisted && !record.is_anti_whale) {
        return RiskLevel::Danger;
    }

    let warning = !record.is_open_source
        || record.is_proxy
        || record.is_mintable
        || record.external_call
        || record.cannot_buy
        || record.cannot_sell_all
        || record.trading_cooldown
        || record.is_transfer_pausable
        || record.hidden_owner
        || record.can_take_back_ownership
        || record.owner_change_balance
        || record.gp_buy_tax > TAX_WARNING_THRESHOLD
        || record.gp_sell_tax > TAX_WARNING_THRESHOLD
        || record.anti_whale_modifiable
        || record.slippage_modifiable;

    if warning {
        RiskLevel::Warning
    } else {
        RiskLevel::Safe
    }
}

/// Scan success ratio, gas symmetry, holder distribution and tax symmetry.
fn market_behavior(record: &TokenRecord) -> f64 {
    let scans = record.total_scans.max(1) as f64;
    let clean_scans = record.total_scans.saturating_sub(record.honeypot_failures) as f64;
    let mut score = (clean_scans / scans) * 25.0;

    let gas_delta = record.buy_gas.abs_diff(record.sell_gas);
    if gas_delta < GAS_SYMMETRY_BUDGET {
        score += 25.0;
    }

    score += holder_tier(record.gp_holder_count);

    let tax_delta = (record.gp_buy_tax - record.gp_sell_tax).abs();
    score += if record.gp_buy_tax == record.gp_sell_tax {
        25.0
    } else if tax_delta < 2.0 {
        15.0
    } else {
        5.0
    };

    score.clamp(0.0, 100.0)
}

/// Source visibility and ownership hygiene, 25 points per property.
fn contract_security(record: &TokenRecord) -> f64 {
    let mut score: f64 = 0.0;
    if record.is_open_source {
        score += 25.0;
    }
    if !record.hidden_owner && !record.can_take_back_ownership {
        score += 25.0;
    }
    if !record.is_mintable {
        score += 25.0;
    }
    if !record.external_call {
        score += 25.0;
    }
    score.clamp(0.0, 100.0)
}

/// Pool depth, LP concentration and exit viability.
fn liquidity_risk(record: &TokenRecord) -> f64 {
    let mut score = liquidity_tier(record.liquidity);

    score += if record.lp_holder_count > 2 {
        25.0
    } else if record.lp_holder_count == 2 {
        15.0
    } else {
        5.0
    };

    if !record.cannot_sell_all {
        score += 25.0;
    }
    if record.lp_holder_count > 1 {
        score += 25.0;
    }

    score.clamp(0.0, 100.0)
}

/// Holder base, pool depth, scan volume and owner concentration, each
/// contributing up to 25. Lower owner concentration scores higher.
fn growth_momentum(record: &TokenRecord) -> f64 {
    let mut score = holder_tier(record.gp_holder_count);
    score += liquidity_tier(record.liquidity);
    score += scan_volume_tier(record.total_scans);
    score += owner_concentration_tier(record.owner_percent);
    score.clamp(0.0, 100.0)
}

fn holder_tier(holders: u64) -> f64 {
    if holders > 100 {
        25.0
    } else if holders > 50 {
        15.0
    } else if holders > 20 {
        10.0
    } else {
        5.0
    }
}

fn liquidity_tier(liquidity: f64) -> f64 {
    if liquidity > 50_000.0 {
        25.0
    } else if liquidity > 10_000.0 {
        20.0
    } else if liquidity > 5_000.0 {
        15.0
    } else if liquidity > 1_000.0 {
        10.0
    } else {
        5.0
    }
}

fn scan_volume_tier(scans: u64) -> f64 {
    if scans > 100 {
        25.0
    } else if scans > 50 {
        15.0
    } else if scans > 20 {
        10.0
    } else {
        5.0
    }
}

fn owner_concentration_tier(owner_percent: f64) -> f64 {
    if owner_percent < 5.0 {
        25.0
    } else if owner_percent < 20.0 {
        15.0
    } else if owner_percent < 50.0 {
        10.0
    } else {
        5.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A record with clean scan history and every risk flag clear.
    fn benign() -> TokenRecord {
        TokenRecord {
            is_open_source: true,
            total_scans: 150,
            honeypot_failures: 0,
            buy_gas: 120_000,
            sell_gas: 120_000,
            gp_holder_count: 150,
            gp_buy_tax: 5.0,
            gp_sell_tax: 5.0,
            liquidity: 60_000.0,
            lp_holder_count: 4,
            owner_percent: 2.0,
            ..Default::default()
        }
    }

    /// A record with every risk flag set.
    fn hostile() -> TokenRecord {
        TokenRecord {
            is_open_source: false,
            is_proxy: true,
            is_mintable: true,
            hidden_owner: true,
            is_blacklisted: true,
            is_transfer_pausable: true,
            trading_cooldown: true,
            external_call: true,
            cannot_buy: true,
            cannot_sell_all: true,
            can_take_back_ownership: true,
            owner_change_balance: true,
            anti_whale_modifiable: true,
            slippage_modifiable: true,
            self_destruct: true,
            is_honeypot: true,
            gp_buy_tax: 99.0,
            gp_sell_tax: 99.0,
            owner_percent: 95.0,
            total_scans: 40,
            honeypot_failures: 40,
            ..Default::default()
        }
    }

    #[test]
    fn test_market_behavior_full_marks_scenario() {
        // totalScans=100, honeypotFailures=0, symmetric gas, 150 holders,
        // symmetric 5% taxes: every market component maxes out.
        let record = TokenRecord {
            total_scans: 100,
            honeypot_failures: 0,
            buy_gas: 50_000,
            sell_gas: 50_000,
            gp_holder_count: 150,
            gp_buy_tax: 5.0,
            gp_sell_tax: 5.0,
            ..Default::default()
        };
        assert_eq!(market_behavior(&record), 100.0);
    }

    #[test]
    fn test_security_extremes() {
        assert_eq!(contract_security(&benign()), 100.0);
        assert_eq!(contract_security(&hostile()), 0.0);
    }

    #[test]
    fn test_composite_bounded_for_extremes() {
        for record in [TokenRecord::default(), benign(), hostile()] {
            let score = RiskScore::compute(&record);
            assert!((0.0..=100.0).contains(&score.composite), "composite out of range");
            for sub in [
                score.market_behavior,
                score.contract_security,
                score.liquidity_risk,
                score.growth_momentum,
            ] {
                assert!((0.0..=100.0).contains(&sub), "sub-score out of range");
            }
        }
    }

    #[test]
    fn test_benign_composite_is_maximal() {
        let score = RiskScore::compute(&benign());
        assert_eq!(score.market_behavior, 100.0);
        assert_eq!(score.liquidity_risk, 100.0);
        assert_eq!(score.growth_momentum, 100.0);
        assert_eq!(score.composite, 100.0);
        assert_eq!(score.level, RiskLevel::Safe);
    }

    #[test]
    fn test_classification() {
        struct TestCase {
            input: TokenRecord,
            expected: RiskLevel,
        }

        let tests = vec![
            TestCase {
                // TC0: honeypot is always danger
                input: TokenRecord {
                    is_honeypot: true,
                    ..benign()
                },
                expected: RiskLevel::Danger,
            },
            TestCase {
                // TC1: blacklisted without anti-whale is danger
                input: TokenRecord {
                    is_blacklisted: true,
                    ..benign()
                },
                expected: RiskLevel::Danger,
            },
            TestCase {
                // TC2: blacklisted with anti-whale drops to warning-check,
                // and a benign record stays safe
                input: TokenRecord {
                    is_blacklisted: true,
                    is_anti_whale: true,
                    ..benign()
                },
                expected: RiskLevel::Safe,
            },
            TestCase {
                // TC3: closed source alone is a warning
                input: TokenRecord {
                    is_open_source: false,
                    ..benign()
                },
                expected: RiskLevel::Warning,
            },
            TestCase {
                // TC4: sell tax above 10% is a warning
                input: TokenRecord {
                    gp_sell_tax: 12.0,
                    ..benign()
                },
                expected: RiskLevel::Warning,
            },
            TestCase {
                // TC5: modifiable slippage is a warning
                input: TokenRecord {
                    slippage_modifiable: true,
                    ..benign()
                },
                expected: RiskLevel::Warning,
            },
            TestCase {
                // TC6: everything clear is safe
                input: benign(),
                expected: RiskLevel::Safe,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(classify(&test.input), test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_classification_is_a_partition() {
        // Danger, warning and safe are mutually exclusive by construction;
        // spot-check representative records map to exactly one level.
        for record in [TokenRecord::default(), benign(), hostile()] {
            let level = classify(&record);
            match level {
                RiskLevel::Danger => assert!(
                    record.is_honeypot || (record.is_blacklisted && !record.is_anti_whale)
                ),
                RiskLevel::Warning => {
                    assert!(!record.is_honeypot);
                    assert!(!(record.is_blacklisted && !record.is_anti_whale));
                }
                RiskLevel::Safe => {
                    assert!(!record.is_honeypot);
                    assert!(record.is_open_source);
                }
            }
        }
    }

    #[test]
    fn test_zero_scans_does_not_divide_by_zero() {
        let record = TokenRecord::default();
        let score = market_behavior(&record);
        assert!(score.is_finite());
        assert!((0.0..=100.0).contains(&score));
    }
}
