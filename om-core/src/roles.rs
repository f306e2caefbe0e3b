//! Capability Table
//!
//! Authorization is an explicit `(account, role)` lookup rather than a
//! permission hierarchy. The table is seeded at deployment with the admin
//! account and the registry's protocol identity; changes afterwards go
//! through the admin-gated grant/revoke operations.

use crate::error::{MarketError, MarketResult};
use crate::types::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Capability kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Pause/resume/delist opinions, grant and revoke roles
    Admin,
    /// Invoke the fee manager's distribution path
    FeeDistributor,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::FeeDistributor => "FeeDistributor",
        }
    }
}

/// Explicit capability table
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoleTable {
    grants: HashSet<(AccountId, Role)>,
}

impl RoleTable {
    /// Seed the table for a deployment: `admin` administers, `registry`
    /// may distribute fees
    pub fn seeded(admin: &AccountId, registry: &AccountId) -> Self {
        let mut grants = HashSet::new();
        grants.insert((admin.clone(), Role::Admin));
        grants.insert((registry.clone(), Role::FeeDistributor));
        Self { grants }
    }

    /// Direct capability lookup
    pub fn has_role(&self, account: &AccountId, role: Role) -> bool {
        self.grants.contains(&(account.clone(), role))
    }

    /// Fail with `Unauthorized` unless `account` holds `role`
    pub fn require(&self, account: &AccountId, role: Role) -> MarketResult<()> {
        if self.has_role(account, role) {
            return Ok(());
        }
        Err(MarketError::Unauthorized {
            caller: account.to_string(),
            role: role.name().to_string(),
        })
    }

    /// Grant `role` to `account`; `caller` must be an admin
    pub fn grant(&mut self, caller: &AccountId, account: AccountId, role: Role) -> MarketResult<()> {
        self.require(caller, Role::Admin)?;
        self.grants.insert((account, role));
        Ok(())
    }

    /// Revoke `role` from `account`; `caller` must be an admin
    pub fn revoke(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        role: Role,
    ) -> MarketResult<()> {
        self.require(caller, Role::Admin)?;
        self.grants.remove(&(account.clone(), role));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_table() -> RoleTable {
        RoleTable::seeded(&AccountId::new("admin"), &AccountId::registry())
    }

    #[test]
    fn test_seeded_grants() {
        let table = create_test_table();
        assert!(table.has_role(&AccountId::new("admin"), Role::Admin));
        assert!(table.has_role(&AccountId::registry(), Role::FeeDistributor));
        assert!(!table.has_role(&AccountId::new("admin"), Role::FeeDistributor));
    }

    #[test]
    fn test_require_fails_with_unauthorized() {
        let table = create_test_table();
        let err = table
            .require(&AccountId::new("mallory"), Role::Admin)
            .unwrap_err();
        assert!(matches!(err, MarketError::Unauthorized { .. }));
    }

    #[test]
    fn test_grant_is_admin_gated() {
        let mut table = create_test_table();
        let mallory = AccountId::new("mallory");
        assert!(table
            .grant(&mallory, mallory.clone(), Role::Admin)
            .is_err());

        let admin = AccountId::new("admin");
        table
            .grant(&admin, AccountId::new("ops"), Role::Admin)
            .unwrap();
        assert!(table.has_role(&AccountId::new("ops"), Role::Admin));
    }

    #[test]
    fn test_revoke_round_trip() {
        let mut table = create_test_table();
        let admin = AccountId::new("admin");
        table
            .grant(&admin, AccountId::new("ops"), Role::FeeDistributor)
            .unwrap();
        table
            .revoke(&admin, &AccountId::new("ops"), Role::FeeDistributor)
            .unwrap();
        assert!(!table.has_role(&AccountId::new("ops"), Role::FeeDistributor));
    }
}
