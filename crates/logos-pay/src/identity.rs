//! Wallet resolution over linked-account payloads.
//!
//! Identity providers hand us loosely-shaped user objects whose field names
//! drift between snake_case and camelCase across SDK versions. The reputation
//! lookup needs exactly one wallet address out of that payload: the smart
//! wallet of the `cross_app` account when present, the embedded wallet
//! otherwise.

use serde::Deserialize;
use serde_json::Value;

/// Wallet slots probed, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletCapability {
    Smart,
    Embedded,
}

impl WalletCapability {
    pub const fn label(self) -> &'static str {
        match self {
            WalletCapability::Smart => "smart_wallet",
            WalletCapability::Embedded => "embedded_wallet",
        }
    }
}

const CAPABILITY_ORDER: [WalletCapability; 2] = [WalletCapability::Smart, WalletCapability::Embedded];

/// Single typed result of the capability chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWallet {
    pub address: String,
    pub capability: WalletCapability,
}

/// Linked-account view of an identity payload. Tolerates both field-name
/// conventions; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountProfile {
    #[serde(default, alias = "linkedAccounts")]
    linked_accounts: Vec<LinkedAccount>,
}

#[derive(Debug, Clone, Deserialize)]
struct LinkedAccount {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default, alias = "smartWallets")]
    smart_wallets: Vec<WalletRef>,
    #[serde(default, alias = "embeddedWallets")]
    embedded_wallets: Vec<WalletRef>,
}

#[derive(Debug, Clone, Deserialize)]
struct WalletRef {
    #[serde(default)]
    address: String,
}

impl AccountProfile {
    pub fn from_value(payload: &Value) -> Option<Self> {
        serde_json::from_value(payload.clone()).ok()
    }

    /// Address used for reputation lookups, or `None` when the payload has no
    /// `cross_app` account or that account carries no usable wallet.
    pub fn reputation_wallet(&self) -> Option<ResolvedWallet> {
        let cross_app = self
            .linked_accounts
            .iter()
            .find(|account| account.kind == "cross_app")?;

        CAPABILITY_ORDER
            .iter()
            .find_map(|capability| cross_app.wallet(*capability))
    }
}

impl LinkedAccount {
    fn wallet(&self, capability: WalletCapability) -> Option<ResolvedWallet> {
        let slots = match capability {
            WalletCapability::Smart => &self.smart_wallets,
            WalletCapability::Embedded => &self.embedded_wallets,
        };

        slots
            .iter()
            .map(|wallet| wallet.address.trim())
            .find(|address| !address.is_empty())
            .map(|address| ResolvedWallet {
                address: address.to_string(),
                capability,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(payload: Value) -> Option<ResolvedWallet> {
        AccountProfile::from_value(&payload)
            .expect("payload parses")
            .reputation_wallet()
    }

    #[test]
    fn prefers_the_smart_wallet() {
        let wallet = resolve(json!({
            "linked_accounts": [{
                "type": "cross_app",
                "smart_wallets": [{ "address": "0xsmart" }],
                "embedded_wallets": [{ "address": "0xembedded" }]
            }]
        }))
        .expect("wallet resolves");

        assert_eq!(wallet.address, "0xsmart");
        assert_eq!(wallet.capability, WalletCapability::Smart);
    }

    #[test]
    fn falls_back_to_the_embedded_wallet() {
        let wallet = resolve(json!({
            "linkedAccounts": [{
                "type": "cross_app",
                "embeddedWallets": [{ "address": "0xembedded" }]
            }]
        }))
        .expect("wallet resolves");

        assert_eq!(wallet.address, "0xembedded");
        assert_eq!(wallet.capability, WalletCapability::Embedded);
    }

    #[test]
    fn ignores_accounts_of_other_kinds() {
        let resolved = resolve(json!({
            "linked_accounts": [{
                "type": "email",
                "smart_wallets": [{ "address": "0xsmart" }]
            }]
        }));
        assert!(resolved.is_none());
    }

    #[test]
    fn skips_blank_wallet_slots() {
        let wallet = resolve(json!({
            "linked_accounts": [{
                "type": "cross_app",
                "smart_wallets": [{ "address": "  " }],
                "embedded_wallets": [{ "address": "0xembedded" }]
            }]
        }))
        .expect("wallet resolves");

        assert_eq!(wallet.capability, WalletCapability::Embedded);
    }

    #[test]
    fn empty_payloads_resolve_to_none() {
        assert!(resolve(json!({})).is_none());
        assert!(resolve(json!({ "linked_accounts": [] })).is_none());
    }
}
