//! Role-based access control with roles packed into a single bitmask per
//! account.
//!
//! Every account carries a `U256` of role bits. A capability check passes
//! when the account holds any of the requested bits, so compound checks
//! like "admin or dedicated caller" are a single storage read. Roles are
//! granted and revoked by holders of [`Permissions::ADMIN_ROLE`]; bit zero
//! is never assigned so that a zeroed storage slot grants nothing.
//!
//! The token cores consult this module for the two hook-registry
//! capabilities: [`Permissions::ADMIN_ROLE`] gates hook installation and
//! [`Permissions::HOOK_CALLER_ROLE`] gates the generic write gateway.

use alloc::{vec, vec::Vec};

use alloy_primitives::{uint, Address, U256};
pub use sol::*;
use stylus_sdk::{
    call::MethodError,
    evm, msg,
    prelude::*,
    storage::{StorageMap, StorageU256},
};

#[cfg_attr(coverage_nightly, coverage(off))]
mod sol {
    use alloy_sol_macro::sol;

    sol! {
        /// Emitted when `account` is granted the `roles` bits.
        ///
        /// `sender` is the account that originated the call.
        #[allow(missing_docs)]
        event RoleGranted(address indexed account, uint256 roles, address indexed sender);

        /// Emitted when the `roles` bits are revoked from `account`.
        ///
        /// `sender` is the account that originated the call.
        #[allow(missing_docs)]
        event RoleRevoked(address indexed account, uint256 roles, address indexed sender);
    }

    sol! {
        /// The account holds none of the required role bits.
        ///
        /// * `account` - Account that was found to not be authorized.
        /// * `needed_roles` - Bitmask of roles that would have authorized it.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error PermissionsUnauthorizedAccount(address account, uint256 needed_roles);
    }
}

/// An error that occurred in the [`Permissions`] contract.
#[derive(SolidityError, Debug)]
pub enum Error {
    /// The account holds none of the required role bits.
    UnauthorizedAccount(PermissionsUnauthorizedAccount),
}

impl MethodError for Error {
    fn encode(self) -> alloc::vec::Vec<u8> {
        self.into()
    }
}

/// State of a [`Permissions`] contract.
#[storage]
pub struct Permissions {
    /// Role bitmask of each account.
    #[allow(clippy::used_underscore_binding)]
    pub _role_bits: StorageMap<Address, StorageU256>,
}

#[public]
impl Permissions {
    /// Returns the full role bitmask of `account`.
    ///
    /// # Arguments
    ///
    /// * `&self` - Read access to the contract's state.
    /// * `account` - The account to inspect.
    #[must_use]
    pub fn roles_of(&self, account: Address) -> U256 {
        self._role_bits.get(account)
    }

    /// Returns `true` if `account` holds any of the `roles` bits.
    ///
    /// # Arguments
    ///
    /// * `&self` - Read access to the contract's state.
    /// * `account` - The account to check.
    /// * `roles` - Bitmask of acceptable roles.
    #[must_use]
    pub fn has_role(&self, account: Address, roles: U256) -> bool {
        self._role_bits.get(account) & roles != U256::ZERO
    }

    /// Grants the `roles` bits to `account`.
    ///
    /// # Arguments
    ///
    /// * `&mut self` - Write access to the contract's state.
    /// * `account` - The account receiving the roles.
    /// * `roles` - Bitmask of roles to add.
    ///
    /// # Errors
    ///
    /// * [`Error::UnauthorizedAccount`] - If [`msg::sender`] does not hold
    ///   [`Permissions::ADMIN_ROLE`].
    ///
    /// # Events
    ///
    /// * [`RoleGranted`] - If the account's bitmask changed.
    pub fn grant_role(
        &mut self,
        account: Address,
        roles: U256,
    ) -> Result<(), Error> {
        self.ensure_role(msg::sender(), Self::ADMIN_ROLE)?;
        self._set_role(account, roles);
        Ok(())
    }

    /// Revokes the `roles` bits from `account`.
    ///
    /// # Arguments
    ///
    /// * `&mut self` - Write access to the contract's state.
    /// * `account` - The account losing the roles.
    /// * `roles` - Bitmask of roles to remove.
    ///
    /// # Errors
    ///
    /// * [`Error::UnauthorizedAccount`] - If [`msg::sender`] does not hold
    ///   [`Permissions::ADMIN_ROLE`].
    ///
    /// # Events
    ///
    /// * [`RoleRevoked`] - If the account's bitmask changed.
    pub fn revoke_role(
        &mut self,
        account: Address,
        roles: U256,
    ) -> Result<(), Error> {
        self.ensure_role(msg::sender(), Self::ADMIN_ROLE)?;
        self._clear_role(account, roles);
        Ok(())
    }

    /// Removes the `roles` bits from the calling account.
    ///
    /// Lets a compromised or retired account drop its own privileges
    /// without admin involvement.
    ///
    /// # Arguments
    ///
    /// * `&mut self` - Write access to the contract's state.
    /// * `roles` - Bitmask of roles to drop.
    ///
    /// # Events
    ///
    /// * [`RoleRevoked`] - If the account's bitmask changed.
    pub fn renounce_role(&mut self, roles: U256) {
        self._clear_role(msg::sender(), roles);
    }
}

impl Permissions {
    /// Role bit required to administer roles and hook installations.
    pub const ADMIN_ROLE: U256 = uint!(2_U256);
    /// Role bit required to call the generic hook write gateway.
    pub const HOOK_CALLER_ROLE: U256 = uint!(4_U256);

    /// Checks that `account` holds any of the `roles` bits.
    ///
    /// # Errors
    ///
    /// * [`Error::UnauthorizedAccount`] - If it holds none of them.
    pub fn ensure_role(
        &self,
        account: Address,
        roles: U256,
    ) -> Result<(), Error> {
        if !self.has_role(account, roles) {
            return Err(Error::UnauthorizedAccount(
                PermissionsUnauthorizedAccount {
                    account,
                    needed_roles: roles,
                },
            ));
        }
        Ok(())
    }

    /// Adds the `roles` bits to `account` without any access restriction.
    ///
    /// # Events
    ///
    /// * [`RoleGranted`] - If the account's bitmask changed.
    pub fn _set_role(&mut self, account: Address, roles: U256) {
        let held = self._role_bits.get(account);
        let updated = held | roles;
        if updated != held {
            self._role_bits.insert(account, updated);
            evm::log(RoleGranted { account, roles, sender: msg::sender() });
        }
    }

    /// Removes the `roles` bits from `account` without any access
    /// restriction.
    ///
    /// # Events
    ///
    /// * [`RoleRevoked`] - If the account's bitmask changed.
    pub fn _clear_role(&mut self, account: Address, roles: U256) {
        let held = self._role_bits.get(account);
        let updated = held & !roles;
        if updated != held {
            self._role_bits.insert(account, updated);
            evm::log(RoleRevoked { account, roles, sender: msg::sender() });
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{uint, Address, U256};
    use motsu::prelude::*;
    use stylus_sdk::prelude::*;

    use super::{Error, Permissions};

    const ADMIN: U256 = Permissions::ADMIN_ROLE;
    const CALLER: U256 = Permissions::HOOK_CALLER_ROLE;

    unsafe impl TopLevelStorage for Permissions {}

    #[motsu::test]
    fn fresh_account_has_no_roles(
        contract: Contract<Permissions>,
        alice: Address,
        bob: Address,
    ) {
        assert_eq!(U256::ZERO, contract.sender(alice).roles_of(bob));
        assert!(!contract.sender(alice).has_role(bob, ADMIN));
        assert!(!contract.sender(alice).has_role(bob, CALLER));
    }

    #[motsu::test]
    fn admin_grants_and_revokes(
        contract: Contract<Permissions>,
        alice: Address,
        bob: Address,
    ) {
        contract.sender(alice)._set_role(alice, ADMIN);

        contract.sender(alice).grant_role(bob, CALLER).motsu_unwrap();
        assert!(contract.sender(alice).has_role(bob, CALLER));

        contract.sender(alice).revoke_role(bob, CALLER).motsu_unwrap();
        assert!(!contract.sender(alice).has_role(bob, CALLER));
    }

    #[motsu::test]
    fn non_admin_cannot_grant(
        contract: Contract<Permissions>,
        alice: Address,
        bob: Address,
    ) {
        let err =
            contract.sender(alice).grant_role(bob, CALLER).motsu_unwrap_err();
        assert!(matches!(err, Error::UnauthorizedAccount(_)));
        assert!(!contract.sender(alice).has_role(bob, CALLER));
    }

    #[motsu::test]
    fn non_admin_cannot_revoke(
        contract: Contract<Permissions>,
        alice: Address,
        bob: Address,
    ) {
        contract.sender(alice)._set_role(bob, CALLER);

        let err =
            contract.sender(alice).revoke_role(bob, CALLER).motsu_unwrap_err();
        assert!(matches!(err, Error::UnauthorizedAccount(_)));
        assert!(contract.sender(alice).has_role(bob, CALLER));
    }

    #[motsu::test]
    fn any_bit_of_the_mask_authorizes(
        contract: Contract<Permissions>,
        alice: Address,
        bob: Address,
    ) {
        contract.sender(alice)._set_role(bob, CALLER);

        assert!(contract.sender(alice).has_role(bob, ADMIN | CALLER));
        assert!(!contract.sender(alice).has_role(bob, ADMIN));
    }

    #[motsu::test]
    fn grants_accumulate_bits(
        contract: Contract<Permissions>,
        alice: Address,
        bob: Address,
    ) {
        contract.sender(alice)._set_role(alice, ADMIN);

        contract.sender(alice).grant_role(bob, ADMIN).motsu_unwrap();
        contract.sender(alice).grant_role(bob, CALLER).motsu_unwrap();
        assert_eq!(ADMIN | CALLER, contract.sender(alice).roles_of(bob));

        contract.sender(alice).revoke_role(bob, ADMIN).motsu_unwrap();
        assert_eq!(CALLER, contract.sender(alice).roles_of(bob));
    }

    #[motsu::test]
    fn bearer_can_renounce(
        contract: Contract<Permissions>,
        alice: Address,
        bob: Address,
    ) {
        contract.sender(alice)._set_role(bob, ADMIN | CALLER);

        contract.sender(bob).renounce_role(ADMIN);
        assert_eq!(CALLER, contract.sender(alice).roles_of(bob));

        // Renouncing bits that are not held is a no-op.
        contract.sender(bob).renounce_role(ADMIN);
        assert_eq!(CALLER, contract.sender(alice).roles_of(bob));
    }

    #[motsu::test]
    fn custom_role_bits_are_usable(
        contract: Contract<Permissions>,
        alice: Address,
        bob: Address,
    ) {
        let auditor = uint!(256_U256);
        contract.sender(alice)._set_role(alice, ADMIN);

        contract.sender(alice).grant_role(bob, auditor).motsu_unwrap();
        assert!(contract.sender(alice).has_role(bob, auditor));
        assert!(!contract.sender(alice).has_role(bob, ADMIN | CALLER));
    }
}
