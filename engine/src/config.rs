//! Engine configuration.

use std::collections::HashMap;

use card2card_common::Pan;

use crate::commission::KIND_C2C;

/// Configuration injected into the transfer engine at construction.
///
/// Defaults carry the stock seed accounts and the single C2C tariff so a
/// bare process can serve the documented scenarios out of the box.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Commission rates in integer percent, keyed by transfer kind.
    pub commission_rates: HashMap<String, i64>,
    /// Fixed account that collects all commission debits.
    pub commission_account: Pan,
    /// Initial account balances, in minor currency units.
    pub seed_accounts: Vec<(Pan, i64)>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let commission_account = Pan::new("7060100000000001");
        Self {
            commission_rates: HashMap::from([(KIND_C2C.to_string(), 1)]),
            commission_account: commission_account.clone(),
            seed_accounts: vec![
                (Pan::new("4548987854653322"), 10000),
                (Pan::new("4548987854653311"), 50),
                (commission_account, 0),
            ],
        }
    }
}

impl EngineConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.commission_rates.is_empty() {
            return Err("Commission rate table cannot be empty".to_string());
        }

        for (kind, rate) in &self.commission_rates {
            if !(0..=100).contains(rate) {
                return Err(format!("Commission rate for {kind} must be within 0..=100"));
            }
        }

        if !self.commission_account.is_valid() {
            return Err("Commission account PAN must be 16 digits".to_string());
        }

        for (pan, balance) in &self.seed_accounts {
            if !pan.is_valid() {
                return Err(format!("Seed account PAN {pan} must be 16 digits"));
            }
            if *balance < 0 {
                return Err(format!("Seed balance for {pan} cannot be negative"));
            }
        }

        if !self
            .seed_accounts
            .iter()
            .any(|(pan, _)| pan == &self.commission_account)
        {
            return Err("Commission account must be present in the seed table".to_string());
        }

        Ok(())
    }
}
