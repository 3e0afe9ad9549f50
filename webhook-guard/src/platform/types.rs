//! Typed view of a Fordefi transaction record.
//!
//! Only the parts of the record the risk policy reads are modelled. Every
//! level is optional so that a record with missing levels still
//! deserializes and the evaluator can report exactly what is missing. A
//! level with the wrong JSON type is a decode error.

use serde::{Deserialize, Deserializer};

/// Transaction returned by `GET /api/v1/transactions/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub mined_result: Option<MinedResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MinedResult {
    #[serde(default)]
    pub effects: Option<Effects>,
}

/// Simulated on-chain effects of the transaction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Effects {
    #[serde(default)]
    pub transfers: Option<Vec<Transfer>>,
    #[serde(default)]
    pub balance_changes: Option<Vec<BalanceChange>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Transfer {
    #[serde(default)]
    pub from: Option<EffectParty>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalanceChange {
    #[serde(default)]
    pub address: Option<EffectParty>,
}

/// A participant in an effect; set when the party is one of our vaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EffectParty {
    #[serde(default)]
    pub vault: Option<VaultRef>,
}

/// `address` is `None` when the key is absent and `Some(None)` when it is
/// `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaultRef {
    #[serde(default, deserialize_with = "present")]
    pub address: Option<Option<String>>,
}

/// Wrap any value that is present, `null` included, in `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl VaultRef {
    /// The address value, if non-null and non-empty.
    pub fn address_value(&self) -> Option<&str> {
        self.address
            .as_ref()
            .and_then(|a| a.as_deref())
            .filter(|a| !a.is_empty())
    }
}

impl EffectParty {
    /// The vault address, if present and non-empty.
    pub fn vault_address(&self) -> Option<&str> {
        self.vault.as_ref().and_then(VaultRef::address_value)
    }
}

impl TransactionRecord {
    fn effects(&self) -> Option<&Effects> {
        self.mined_result.as_ref().and_then(|m| m.effects.as_ref())
    }

    /// Transfers in the order reported by the platform.
    pub fn transfers(&self) -> &[Transfer] {
        self.effects()
            .and_then(|e| e.transfers.as_deref())
            .unwrap_or_default()
    }

    /// Balance changes in the order reported by the platform.
    pub fn balance_changes(&self) -> &[BalanceChange] {
        self.effects()
            .and_then(|e| e.balance_changes.as_deref())
            .unwrap_or_default()
    }
}
