//! Swap-and-transfer redirection policy.
//!
//! 1inch lets a single order swap assets and forward the proceeds to another
//! address. For a vault that should only ever swap into itself, a receiver
//! different from the swapping vault is a redirection of funds.
//!
//! ## Record Shape
//!
//! ```text
//! mined_result.effects.transfers[0].from.vault.address        -> origin
//! mined_result.effects.balance_changes[1].address.vault.address -> receiver
//! ```
//!
//! Evaluation is pure and performs no I/O.

use thiserror::Error;

use crate::platform::TransactionRecord;

/// Index of the balance change that credits the swap output.
const RECEIVER_BALANCE_CHANGE_INDEX: usize = 1;

/// What to do with the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskDecision {
    Allow,
    Abort,
}

/// A decision together with the addresses it was based on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskAssessment {
    pub decision: RiskDecision,
    pub origin_vault: String,
    pub receiver_vault: Option<String>,
}

/// The record does not have the shape the policy needs; no decision can be
/// made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiskError {
    #[error("Vault address not found in the transaction data.")]
    MissingVaultAddress,

    #[error("Expected at least {expected} balance changes in the transaction data, found {found}.")]
    UnexpectedBalanceChanges { expected: usize, found: usize },

    #[error("Receiver address not found in the transaction data.")]
    MissingReceiverAddress,
}

/// Decide whether a fetched transaction redirects swap proceeds.
///
/// A receiver vault whose address is `null` or empty is treated as a match.
/// A receiver entry without an `address.vault.address` key at all is a
/// shape error: the proceeds may be going to a non-vault address.
pub fn evaluate(record: &TransactionRecord) -> Result<RiskAssessment, RiskError> {
    // A fetched but empty record (`{}`) lands here too. It was fetched
    // successfully yet lacks the fields the policy needs, so it is rejected
    // rather than acknowledged as if no data had been obtained.
    let origin_vault = record
        .transfers()
        .first()
        .and_then(|t| t.from.as_ref())
        .and_then(|from| from.vault_address())
        .ok_or(RiskError::MissingVaultAddress)?;

    let balance_changes = record.balance_changes();
    let receiver_vault = balance_changes
        .get(RECEIVER_BALANCE_CHANGE_INDEX)
        .ok_or(RiskError::UnexpectedBalanceChanges {
            expected: RECEIVER_BALANCE_CHANGE_INDEX + 1,
            found: balance_changes.len(),
        })?
        .address
        .as_ref()
        .and_then(|party| party.vault.as_ref())
        .filter(|vault| vault.address.is_some())
        .ok_or(RiskError::MissingReceiverAddress)?
        .address_value();

    let decision = match receiver_vault {
        Some(receiver) if !receiver.eq_ignore_ascii_case(origin_vault) => RiskDecision::Abort,
        _ => RiskDecision::Allow,
    };

    Ok(RiskAssessment {
        decision,
        origin_vault: origin_vault.to_string(),
        receiver_vault: receiver_vault.map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> TransactionRecord {
        serde_json::from_value(value).unwrap()
    }

    fn swap_record(origin: &str, receiver: serde_json::Value) -> TransactionRecord {
        record(json!({
            "mined_result": {"effects": {
                "transfers": [
                    {"from": {"vault": {"address": origin}}},
                    {"from": {"vault": {"address": "0xPOOL"}}}
                ],
                "balance_changes": [
                    {"address": {"vault": {"address": origin}}},
                    {"address": {"vault": {"address": receiver}}}
                ]
            }}
        }))
    }

    #[test]
    fn test_same_address_allows() {
        let assessment = evaluate(&swap_record("0xAAA", json!("0xAAA"))).unwrap();
        assert_eq!(assessment.decision, RiskDecision::Allow);
        assert_eq!(assessment.origin_vault, "0xAAA");
        assert_eq!(assessment.receiver_vault.as_deref(), Some("0xAAA"));
    }

    #[test]
    fn test_comparison_ignores_case() {
        let assessment = evaluate(&swap_record("0xABC", json!("0xabc"))).unwrap();
        assert_eq!(assessment.decision, RiskDecision::Allow);
    }

    #[test]
    fn test_different_address_aborts() {
        let assessment = evaluate(&swap_record("0xAAA", json!("0xBBB"))).unwrap();
        assert_eq!(assessment.decision, RiskDecision::Abort);
        assert_eq!(assessment.receiver_vault.as_deref(), Some("0xBBB"));
    }

    #[test]
    fn test_null_or_empty_receiver_allows() {
        for receiver in [json!(null), json!("")] {
            let assessment = evaluate(&swap_record("0xAAA", receiver)).unwrap();
            assert_eq!(assessment.decision, RiskDecision::Allow);
            assert_eq!(assessment.receiver_vault, None);
        }
    }

    #[test]
    fn test_receiver_without_vault_is_error() {
        let receivers = [
            json!({"address": {"type": "external", "address": "0xEVIL"}}),
            json!({"address": {"vault": null}}),
            json!({"address": {"vault": {}}}),
            json!({"address": null}),
            json!({}),
        ];
        for receiver in receivers {
            let result = evaluate(&record(json!({
                "mined_result": {"effects": {
                    "transfers": [{"from": {"vault": {"address": "0xAAA"}}}],
                    "balance_changes": [
                        {"address": {"vault": {"address": "0xAAA"}}},
                        receiver
                    ]
                }}
            })));
            assert_eq!(result, Err(RiskError::MissingReceiverAddress));
        }
    }

    #[test]
    fn test_missing_vault_address() {
        let cases = [
            json!({}),
            json!({"mined_result": {"effects": {"transfers": []}}}),
            json!({"mined_result": {"effects": {"transfers": [{"from": {}}]}}}),
            json!({"mined_result": {"effects": {
                "transfers": [{"from": {"vault": {"address": ""}}}]
            }}}),
        ];
        for case in cases {
            assert_eq!(evaluate(&record(case)), Err(RiskError::MissingVaultAddress));
        }
    }

    #[test]
    fn test_too_few_balance_changes() {
        let result = evaluate(&record(json!({
            "mined_result": {"effects": {
                "transfers": [{"from": {"vault": {"address": "0xAAA"}}}],
                "balance_changes": [{"address": {"vault": {"address": "0xAAA"}}}]
            }}
        })));
        assert_eq!(
            result,
            Err(RiskError::UnexpectedBalanceChanges {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let record = swap_record("0xAAA", json!("0xBBB"));
        let first = evaluate(&record);
        for _ in 0..10 {
            assert_eq!(evaluate(&record), first);
        }
    }
}
