//! ERC-20 token core with pluggable lifecycle hooks.
//!
//! [`Erc20Core`] keeps the standard balance and allowance bookkeeping
//! fixed and delegates policy to installed hook contracts. Minting is
//! gated: without a [`HookType::BeforeMint`] implementation installed,
//! [`Erc20Core::mint`] is disabled, and the quantity actually minted is
//! whatever the hook authorizes. The transfer, burn and approval hooks are
//! advisory; when absent, the operation proceeds unimpeded.
//!
//! We have followed general `OpenZeppelin` Contracts guidelines: functions
//! revert instead of returning `false` on failure.

use alloc::{vec, vec::Vec};

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
pub use sol::*;
use stylus_sdk::{
    abi::Bytes,
    call::MethodError,
    evm, msg,
    prelude::*,
    storage::{StorageMap, StorageU256},
};

use crate::{
    access::permissions::{self, Permissions},
    hooks::{installer, HookHost, HookInstaller, HookType},
};

#[cfg_attr(coverage_nightly, coverage(off))]
mod sol {
    use alloy_sol_macro::sol;

    sol! {
        /// Emitted when `value` tokens are moved from one account (`from`)
        /// to another (`to`).
        ///
        /// Note that `value` may be zero.
        #[allow(missing_docs)]
        event Transfer(address indexed from, address indexed to, uint256 value);

        /// Emitted when the allowance of a `spender` for an `owner` is set
        /// by a call to `approve`. `value` is the new allowance.
        #[allow(missing_docs)]
        event Approval(address indexed owner, address indexed spender, uint256 value);
    }

    sol! {
        /// Indicates an error related to the current `balance` of `sender`.
        /// Used in transfers.
        ///
        /// * `sender` - Address whose tokens are being transferred.
        /// * `balance` - Current balance for the interacting account.
        /// * `needed` - Minimum amount required to perform a transfer.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC20InsufficientBalance(address sender, uint256 balance, uint256 needed);

        /// Indicates a failure with the token `sender`. Used in transfers.
        ///
        /// * `sender` - Address whose tokens are being transferred.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC20InvalidSender(address sender);

        /// Indicates a failure with the token `receiver`. Used in transfers.
        ///
        /// * `receiver` - Address to which the tokens are being transferred.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC20InvalidReceiver(address receiver);

        /// Indicates a failure with the `spender`'s `allowance`. Used in
        /// transfers.
        ///
        /// * `spender` - Address that may be allowed to operate on tokens
        ///   without being their owner.
        /// * `allowance` - Amount of tokens a `spender` is allowed to
        ///   operate with.
        /// * `needed` - Minimum amount required to perform a transfer.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC20InsufficientAllowance(address spender, uint256 allowance, uint256 needed);

        /// Indicates a failure with the `spender` to be approved. Used in
        /// approvals.
        ///
        /// * `spender` - Address that may be allowed to operate on tokens
        ///   without being their owner.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC20InvalidSpender(address spender);

        /// Indicates a failure with the `approver` of a token to be
        /// approved. Used in approvals.
        ///
        /// * `approver` - Address initiating an approval operation.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC20InvalidApprover(address approver);

        /// Minting is disabled: no before-mint hook is installed.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC20CoreMintDisabled();
    }
}

pub use hook_abi::IErc20Hook;
mod hook_abi {
    #![allow(missing_docs)]
    #![cfg_attr(coverage_nightly, coverage(off))]
    alloy_sol_types::sol! {
        /// Lifecycle entrypoints an ERC-20 hook contract implements, one
        /// per flag it declares.
        interface IErc20Hook {
            function beforeMint(address to, uint256 amount, bytes calldata data) external payable returns (uint256);
            function beforeTransfer(address from, address to, uint256 amount) external;
            function beforeBurn(address from, uint256 amount, bytes calldata data) external;
            function beforeApprove(address owner, address spender, uint256 amount) external;
        }
    }
}

/// An [`Erc20Core`] error, following [ERC-6093] where the standard token
/// operations are concerned.
///
/// [ERC-6093]: https://eips.ethereum.org/EIPS/eip-6093
#[derive(SolidityError, Debug)]
pub enum Error {
    /// Indicates an error related to the current balance of `sender`.
    InsufficientBalance(ERC20InsufficientBalance),
    /// Indicates a failure with the token `sender`.
    InvalidSender(ERC20InvalidSender),
    /// Indicates a failure with the token `receiver`.
    InvalidReceiver(ERC20InvalidReceiver),
    /// Indicates a failure with the `spender`'s allowance.
    InsufficientAllowance(ERC20InsufficientAllowance),
    /// Indicates a failure with the `spender` to be approved.
    InvalidSpender(ERC20InvalidSpender),
    /// Indicates a failure with the `approver` of an approval.
    InvalidApprover(ERC20InvalidApprover),
    /// Minting is disabled: no before-mint hook is installed.
    MintDisabled(ERC20CoreMintDisabled),
    /// An error reported by the hook registry or bubbled from a hook.
    Hook(installer::Error),
}

impl MethodError for Error {
    fn encode(self) -> alloc::vec::Vec<u8> {
        self.into()
    }
}

/// State of an [`Erc20Core`] token.
#[storage]
pub struct Erc20Core {
    /// Maps users to balances.
    #[allow(clippy::used_underscore_binding)]
    pub _balances: StorageMap<Address, StorageU256>,
    /// Maps users to a mapping of each spender's allowance.
    #[allow(clippy::used_underscore_binding)]
    pub _allowances: StorageMap<Address, StorageMap<Address, StorageU256>>,
    /// The total supply of the token.
    #[allow(clippy::used_underscore_binding)]
    pub _total_supply: StorageU256,
    /// The lifecycle hook registry.
    pub hooks: HookInstaller,
    /// Role storage backing the registry's capability checks.
    pub permissions: Permissions,
}

/// NOTE: Implementation of [`TopLevelStorage`] to be able use `&mut self`
/// when calling other contracts and not `&mut (impl TopLevelStorage +
/// BorrowMut<Self>)`. Should be fixed in the future by the Stylus team.
unsafe impl TopLevelStorage for Erc20Core {}

impl HookHost for Erc20Core {
    const LAST_HOOK: HookType = HookType::BeforeApprove;

    fn installer(&self) -> &HookInstaller {
        &self.hooks
    }

    fn installer_mut(&mut self) -> &mut HookInstaller {
        &mut self.hooks
    }

    fn can_update_hooks(&self, account: Address) -> bool {
        self.permissions.has_role(account, Permissions::ADMIN_ROLE)
    }

    fn can_call_hooks(&self, account: Address) -> bool {
        self.permissions.has_role(
            account,
            Permissions::ADMIN_ROLE | Permissions::HOOK_CALLER_ROLE,
        )
    }
}

#[public]
impl Erc20Core {
    /// Returns the number of tokens in existence.
    #[must_use]
    pub fn total_supply(&self) -> U256 {
        self._total_supply.get()
    }

    /// Returns the number of tokens owned by `account`.
    #[must_use]
    pub fn balance_of(&self, account: Address) -> U256 {
        self._balances.get(account)
    }

    /// Moves a `value` amount of tokens from the caller's account to `to`.
    ///
    /// Consults the before-transfer hook first, when one is installed.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidReceiver`] - If `to` is `Address::ZERO`.
    /// * [`Error::InsufficientBalance`] - If the caller's balance is below
    ///   `value`.
    /// * [`Error::Hook`] - If an installed before-transfer hook rejects the
    ///   transfer; the hook's revert data is bubbled unchanged.
    ///
    /// # Events
    ///
    /// * [`Transfer`]
    pub fn transfer(
        &mut self,
        to: Address,
        value: U256,
    ) -> Result<bool, Error> {
        let from = msg::sender();
        self.dispatch_before_transfer(from, to, value)?;
        self._transfer(from, to, value)?;
        Ok(true)
    }

    /// Returns the remaining number of tokens that `spender` will be
    /// allowed to spend on behalf of `owner` through `transfer_from`. This
    /// is zero by default.
    #[must_use]
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self._allowances.getter(owner).get(spender)
    }

    /// Sets a `value` number of tokens as the allowance of `spender` over
    /// the caller's tokens.
    ///
    /// Consults the before-approve hook first, when one is installed.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidSpender`] - If `spender` is `Address::ZERO`.
    /// * [`Error::Hook`] - If an installed before-approve hook rejects the
    ///   approval.
    ///
    /// # Events
    ///
    /// * [`Approval`]
    pub fn approve(
        &mut self,
        spender: Address,
        value: U256,
    ) -> Result<bool, Error> {
        let owner = msg::sender();
        self.dispatch_before_approve(owner, spender, value)?;
        self._approve(owner, spender, value, true)?;
        Ok(true)
    }

    /// Moves a `value` number of tokens from `from` to `to` using the
    /// allowance mechanism. `value` is then deducted from the caller's
    /// allowance.
    ///
    /// NOTE: If the allowance is the maximum `U256::MAX`, it is not updated
    /// on `transfer_from`. This is semantically equivalent to an infinite
    /// approval.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidSender`] - If `from` is `Address::ZERO`.
    /// * [`Error::InvalidReceiver`] - If `to` is `Address::ZERO`.
    /// * [`Error::InsufficientAllowance`] - If the caller's allowance is
    ///   below `value`.
    /// * [`Error::InsufficientBalance`] - If `from`'s balance is below
    ///   `value`.
    /// * [`Error::Hook`] - If an installed before-transfer hook rejects the
    ///   transfer.
    ///
    /// # Events
    ///
    /// * [`Transfer`]
    pub fn transfer_from(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<bool, Error> {
        let spender = msg::sender();
        self.dispatch_before_transfer(from, to, value)?;
        self._spend_allowance(from, spender, value)?;
        self._transfer(from, to, value)?;
        Ok(true)
    }

    /// Mints tokens to `to`.
    ///
    /// Minting is controlled entirely by the before-mint hook: the hook
    /// receives the requested `amount` together with `data` and the
    /// attached value, and returns the quantity it authorizes, which is
    /// the quantity actually minted.
    ///
    /// # Errors
    ///
    /// * [`Error::MintDisabled`] - If no before-mint hook is installed.
    /// * [`Error::InvalidReceiver`] - If `to` is `Address::ZERO`.
    /// * [`Error::Hook`] - If the hook rejects the mint; its revert data is
    ///   bubbled unchanged.
    ///
    /// # Panics
    ///
    /// * If the total supply would exceed `U256::MAX`.
    ///
    /// # Events
    ///
    /// * [`Transfer`]
    #[payable]
    pub fn mint(
        &mut self,
        to: Address,
        amount: U256,
        data: Bytes,
    ) -> Result<(), Error> {
        let quantity = self.dispatch_before_mint(to, amount, &data)?;
        self._mint(to, quantity)
    }

    /// Destroys a `value` amount of tokens from the caller's account.
    ///
    /// Consults the before-burn hook first, when one is installed.
    ///
    /// # Errors
    ///
    /// * [`Error::InsufficientBalance`] - If the caller's balance is below
    ///   `value`.
    /// * [`Error::Hook`] - If an installed before-burn hook rejects the
    ///   burn.
    ///
    /// # Events
    ///
    /// * [`Transfer`]
    pub fn burn(&mut self, value: U256, data: Bytes) -> Result<(), Error> {
        let from = msg::sender();
        self.dispatch_before_burn(from, value, &data)?;
        self._burn(from, value)
    }

    /// Installs `hook`, binding every lifecycle flag it declares.
    ///
    /// See [`HookHost::install_hook`]. The caller must hold
    /// [`Permissions::ADMIN_ROLE`].
    ///
    /// # Errors
    ///
    /// * [`installer::Error`] - See [`HookHost::install_hook`].
    pub fn install_hook(
        &mut self,
        hook: Address,
    ) -> Result<(), installer::Error> {
        HookHost::install_hook(self, hook)
    }

    /// Uninstalls `hook`, clearing every flag granted at install time.
    ///
    /// See [`HookHost::uninstall_hook`]. The caller must hold
    /// [`Permissions::ADMIN_ROLE`].
    ///
    /// # Errors
    ///
    /// * [`installer::Error`] - See [`HookHost::uninstall_hook`].
    pub fn uninstall_hook(
        &mut self,
        hook: Address,
    ) -> Result<(), installer::Error> {
        HookHost::uninstall_hook(self, hook)
    }

    /// Returns the implementation installed for `flag`, or `Address::ZERO`
    /// if the flag is unbound.
    ///
    /// # Errors
    ///
    /// * [`installer::Error::InvalidFlag`] - If `flag` is not dispatched by
    ///   this contract.
    pub fn get_hook_implementation(
        &self,
        flag: U256,
    ) -> Result<Address, installer::Error> {
        HookHost::hook_implementation(self, flag)
    }

    /// Snapshot of the implementations of all four lifecycle flags, from
    /// before-mint up to before-approve.
    #[must_use]
    pub fn get_all_hooks(&self) -> Vec<Address> {
        HookHost::all_hooks(self)
    }

    /// Bitmask of flags with an installed implementation.
    #[must_use]
    pub fn active_hooks(&self) -> U256 {
        self.hooks.active_hooks()
    }

    /// Whether `hook` is currently installed.
    #[must_use]
    pub fn is_hook_installed(&self, hook: Address) -> bool {
        self.hooks.is_installed(hook)
    }

    /// Forwards `data` to the hook installed for `flag` as a read-only
    /// call. Open to any caller.
    ///
    /// # Errors
    ///
    /// * [`installer::Error`] - See [`HookHost::hook_read`].
    pub fn hook_read(
        &self,
        flag: U256,
        data: Bytes,
    ) -> Result<Bytes, installer::Error> {
        HookHost::hook_read(self, flag, &data).map(Bytes::from)
    }

    /// Forwards `data` and the attached value to the hook installed for
    /// `flag`. The caller must hold [`Permissions::ADMIN_ROLE`] or
    /// [`Permissions::HOOK_CALLER_ROLE`], and `value` must equal the value
    /// attached to the call.
    ///
    /// # Errors
    ///
    /// * [`installer::Error`] - See [`HookHost::hook_write`].
    #[payable]
    pub fn hook_write(
        &mut self,
        flag: U256,
        value: U256,
        data: Bytes,
    ) -> Result<Bytes, installer::Error> {
        HookHost::hook_write(self, flag, value, &data).map(Bytes::from)
    }

    /// Returns the full role bitmask of `account`.
    #[must_use]
    pub fn roles_of(&self, account: Address) -> U256 {
        self.permissions.roles_of(account)
    }

    /// Returns `true` if `account` holds any of the `roles` bits.
    #[must_use]
    pub fn has_role(&self, account: Address, roles: U256) -> bool {
        self.permissions.has_role(account, roles)
    }

    /// Grants the `roles` bits to `account`. The caller must hold
    /// [`Permissions::ADMIN_ROLE`].
    ///
    /// # Errors
    ///
    /// * [`permissions::Error::UnauthorizedAccount`] - If it does not.
    pub fn grant_role(
        &mut self,
        account: Address,
        roles: U256,
    ) -> Result<(), permissions::Error> {
        self.permissions.grant_role(account, roles)
    }

    /// Revokes the `roles` bits from `account`. The caller must hold
    /// [`Permissions::ADMIN_ROLE`].
    ///
    /// # Errors
    ///
    /// * [`permissions::Error::UnauthorizedAccount`] - If it does not.
    pub fn revoke_role(
        &mut self,
        account: Address,
        roles: U256,
    ) -> Result<(), permissions::Error> {
        self.permissions.revoke_role(account, roles)
    }

    /// Removes the `roles` bits from the calling account.
    pub fn renounce_role(&mut self, roles: U256) {
        self.permissions.renounce_role(roles);
    }
}

impl Erc20Core {
    /// Moves a `value` amount of tokens from `from` to `to`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidSender`] - If `from` is `Address::ZERO`.
    /// * [`Error::InvalidReceiver`] - If `to` is `Address::ZERO`.
    /// * [`Error::InsufficientBalance`] - If `from`'s balance is below
    ///   `value`.
    fn _transfer(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<(), Error> {
        if from.is_zero() {
            return Err(Error::InvalidSender(ERC20InvalidSender {
                sender: Address::ZERO,
            }));
        }
        if to.is_zero() {
            return Err(Error::InvalidReceiver(ERC20InvalidReceiver {
                receiver: Address::ZERO,
            }));
        }

        self._update(from, to, value)
    }

    /// Creates a `value` amount of tokens assigned to `account`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidReceiver`] - If `account` is `Address::ZERO`.
    ///
    /// # Panics
    ///
    /// * If `_total_supply` exceeds `U256::MAX`.
    pub fn _mint(
        &mut self,
        account: Address,
        value: U256,
    ) -> Result<(), Error> {
        if account.is_zero() {
            return Err(Error::InvalidReceiver(ERC20InvalidReceiver {
                receiver: Address::ZERO,
            }));
        }
        self._update(Address::ZERO, account, value)
    }

    /// Destroys a `value` amount of tokens from `account`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidSender`] - If `account` is `Address::ZERO`.
    /// * [`Error::InsufficientBalance`] - If `account`'s balance is below
    ///   `value`.
    pub fn _burn(
        &mut self,
        account: Address,
        value: U256,
    ) -> Result<(), Error> {
        if account.is_zero() {
            return Err(Error::InvalidSender(ERC20InvalidSender {
                sender: Address::ZERO,
            }));
        }
        self._update(account, Address::ZERO, value)
    }

    /// Transfers a `value` amount of tokens from `from` to `to`, or
    /// alternatively mints (or burns) if `from` (or `to`) is the zero
    /// address. All customizations to transfers, mints, and burns should
    /// be done by using this function.
    ///
    /// # Errors
    ///
    /// * [`Error::InsufficientBalance`] - If `from`'s balance is below
    ///   `value`.
    ///
    /// # Panics
    ///
    /// * If `_total_supply` exceeds `U256::MAX`; can only happen while
    ///   minting.
    ///
    /// # Events
    ///
    /// * [`Transfer`]
    fn _update(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<(), Error> {
        if from.is_zero() {
            // Mint operation. Overflow check required: the rest of the code
            // assumes that `_total_supply` never overflows.
            let total_supply = self
                ._total_supply
                .get()
                .checked_add(value)
                .expect("should not exceed `U256::MAX` for `_total_supply`");
            self._total_supply.set(total_supply);
        } else {
            let from_balance = self._balances.get(from);
            if from_balance < value {
                return Err(Error::InsufficientBalance(
                    ERC20InsufficientBalance {
                        sender: from,
                        balance: from_balance,
                        needed: value,
                    },
                ));
            }
            // Overflow not possible:
            // `value` <= `from_balance` <= `_total_supply`.
            self._balances.setter(from).set(from_balance - value);
        }

        if to.is_zero() {
            let total_supply = self._total_supply.get();
            // Overflow not possible:
            // `value` <= `_total_supply` or
            // `value` <= `from_balance` <= `_total_supply`.
            self._total_supply.set(total_supply - value);
        } else {
            let balance_to = self._balances.get(to);
            // Overflow not possible:
            // `balance_to` + `value` is at most the total supply.
            self._balances.setter(to).set(balance_to + value);
        }

        evm::log(Transfer { from, to, value });
        Ok(())
    }

    /// Sets `value` as the allowance of `spender` over the `owner`'s
    /// tokens, emitting an [`Approval`] event when `emit_event` is set.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidApprover`] - If `owner` is `Address::ZERO`.
    /// * [`Error::InvalidSpender`] - If `spender` is `Address::ZERO`.
    fn _approve(
        &mut self,
        owner: Address,
        spender: Address,
        value: U256,
        emit_event: bool,
    ) -> Result<(), Error> {
        if owner.is_zero() {
            return Err(Error::InvalidApprover(ERC20InvalidApprover {
                approver: Address::ZERO,
            }));
        }
        if spender.is_zero() {
            return Err(Error::InvalidSpender(ERC20InvalidSpender {
                spender: Address::ZERO,
            }));
        }

        self._allowances.setter(owner).insert(spender, value);
        if emit_event {
            evm::log(Approval { owner, spender, value });
        }
        Ok(())
    }

    /// Updates `owner`'s allowance for `spender` based on spent `value`.
    /// Does not update the allowance on infinite approval.
    ///
    /// # Errors
    ///
    /// * [`Error::InsufficientAllowance`] - If the allowance is below
    ///   `value`.
    fn _spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        value: U256,
    ) -> Result<(), Error> {
        let current_allowance = self.allowance(owner, spender);
        if current_allowance == U256::MAX {
            return Ok(());
        }

        if current_allowance < value {
            return Err(Error::InsufficientAllowance(
                ERC20InsufficientAllowance {
                    spender,
                    allowance: current_allowance,
                    needed: value,
                },
            ));
        }
        self._approve(owner, spender, current_allowance - value, false)
    }

    /// Resolves the before-mint hook and forwards the mint request,
    /// attaching the call value. Returns the quantity the hook authorizes.
    fn dispatch_before_mint(
        &mut self,
        to: Address,
        amount: U256,
        data: &Bytes,
    ) -> Result<U256, Error> {
        let Some(hook) = self.hooks.resolve(HookType::BeforeMint) else {
            return Err(ERC20CoreMintDisabled {}.into());
        };
        let calldata = IErc20Hook::beforeMintCall {
            to,
            amount,
            data: data.to_vec().into(),
        }
        .abi_encode();
        let returned = installer::invoke_write(hook, msg::value(), &calldata)?;
        let decoded =
            IErc20Hook::beforeMintCall::abi_decode_returns(&returned, true)
                .map_err(|_| {
                    installer::Error::from(
                        installer::HookInstallerCallFailed { hook },
                    )
                })?;
        Ok(decoded._0)
    }

    /// Consults the before-transfer hook, when one is installed.
    fn dispatch_before_transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Error> {
        if let Some(hook) = self.hooks.resolve(HookType::BeforeTransfer) {
            let calldata =
                IErc20Hook::beforeTransferCall { from, to, amount }
                    .abi_encode();
            installer::invoke_write(hook, U256::ZERO, &calldata)?;
        }
        Ok(())
    }

    /// Consults the before-burn hook, when one is installed.
    fn dispatch_before_burn(
        &mut self,
        from: Address,
        amount: U256,
        data: &Bytes,
    ) -> Result<(), Error> {
        if let Some(hook) = self.hooks.resolve(HookType::BeforeBurn) {
            let calldata = IErc20Hook::beforeBurnCall {
                from,
                amount,
                data: data.to_vec().into(),
            }
            .abi_encode();
            installer::invoke_write(hook, U256::ZERO, &calldata)?;
        }
        Ok(())
    }

    /// Consults the before-approve hook, when one is installed.
    fn dispatch_before_approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), Error> {
        if let Some(hook) = self.hooks.resolve(HookType::BeforeApprove) {
            let calldata =
                IErc20Hook::beforeApproveCall { owner, spender, amount }
                    .abi_encode();
            installer::invoke_write(hook, U256::ZERO, &calldata)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use alloy_primitives::{uint, Address, U256};
    use motsu::prelude::*;
    use stylus_sdk::{
        abi::Bytes,
        prelude::*,
        storage::{StorageBool, StorageU256},
    };

    use super::{Erc20Core, Error};
    use crate::{
        access::permissions::Permissions,
        hooks::{installer, HookType},
    };

    impl Erc20Core {
        fn grant_admin(&mut self, account: Address) {
            self.permissions._set_role(account, Permissions::ADMIN_ROLE);
        }
    }

    /// Authorizes minting up to a configurable cap per call.
    #[storage]
    struct MintGateHook {
        cap: StorageU256,
    }

    unsafe impl TopLevelStorage for MintGateHook {}

    #[public]
    impl MintGateHook {
        fn hook_flags(&self) -> U256 {
            HookType::BeforeMint.flag()
        }

        fn set_cap(&mut self, cap: U256) {
            self.cap.set(cap);
        }

        #[payable]
        fn before_mint(
            &mut self,
            _to: Address,
            amount: U256,
            _data: Bytes,
        ) -> U256 {
            let cap = self.cap.get();
            if amount > cap {
                cap
            } else {
                amount
            }
        }
    }

    /// Advisory hook for transfers, burns and approvals that can be
    /// toggled to reject everything.
    #[storage]
    struct PolicyHook {
        blocked: StorageBool,
    }

    unsafe impl TopLevelStorage for PolicyHook {}

    impl PolicyHook {
        fn check(&self) -> Result<(), Vec<u8>> {
            if self.blocked.get() {
                Err(b"policy rejected".to_vec())
            } else {
                Ok(())
            }
        }
    }

    #[public]
    impl PolicyHook {
        fn hook_flags(&self) -> U256 {
            HookType::BeforeTransfer.flag()
                | HookType::BeforeBurn.flag()
                | HookType::BeforeApprove.flag()
        }

        fn set_blocked(&mut self, blocked: bool) {
            self.blocked.set(blocked);
        }

        fn before_transfer(
            &self,
            _from: Address,
            _to: Address,
            _amount: U256,
        ) -> Result<(), Vec<u8>> {
            self.check()
        }

        fn before_burn(
            &self,
            _from: Address,
            _amount: U256,
            _data: Bytes,
        ) -> Result<(), Vec<u8>> {
            self.check()
        }

        fn before_approve(
            &self,
            _owner: Address,
            _spender: Address,
            _amount: U256,
        ) -> Result<(), Vec<u8>> {
            self.check()
        }
    }

    const CAP: U256 = uint!(1000_U256);

    fn install_mint_gate(
        token: &Contract<Erc20Core>,
        gate: &Contract<MintGateHook>,
        admin: Address,
    ) {
        gate.sender(admin).set_cap(CAP);
        token.sender(admin).grant_admin(admin);
        token.sender(admin).install_hook(gate.address()).motsu_unwrap();
    }

    #[motsu::test]
    fn mint_is_disabled_without_hook(
        token: Contract<Erc20Core>,
        alice: Address,
    ) {
        let err = token
            .sender(alice)
            .mint(alice, uint!(10_U256), vec![].into())
            .motsu_unwrap_err();
        assert!(matches!(err, Error::MintDisabled(_)));
        assert_eq!(U256::ZERO, token.sender(alice).total_supply());
    }

    #[motsu::test]
    fn mint_quantity_comes_from_hook(
        token: Contract<Erc20Core>,
        gate: Contract<MintGateHook>,
        alice: Address,
        bob: Address,
    ) {
        install_mint_gate(&token, &gate, alice);

        // Under the cap the requested amount is authorized as is.
        token
            .sender(bob)
            .mint(bob, uint!(10_U256), vec![].into())
            .motsu_unwrap();
        assert_eq!(uint!(10_U256), token.sender(bob).balance_of(bob));

        // Above the cap the hook authorizes only the cap.
        token
            .sender(bob)
            .mint(bob, uint!(5000_U256), vec![].into())
            .motsu_unwrap();
        assert_eq!(uint!(10_U256) + CAP, token.sender(bob).balance_of(bob));
        assert_eq!(uint!(10_U256) + CAP, token.sender(bob).total_supply());
    }

    #[motsu::test]
    fn mint_is_disabled_again_after_uninstall(
        token: Contract<Erc20Core>,
        gate: Contract<MintGateHook>,
        alice: Address,
    ) {
        install_mint_gate(&token, &gate, alice);
        token
            .sender(alice)
            .mint(alice, uint!(1_U256), vec![].into())
            .motsu_unwrap();

        token.sender(alice).uninstall_hook(gate.address()).motsu_unwrap();
        let err = token
            .sender(alice)
            .mint(alice, uint!(1_U256), vec![].into())
            .motsu_unwrap_err();
        assert!(matches!(err, Error::MintDisabled(_)));
        assert_eq!(uint!(1_U256), token.sender(alice).total_supply());
    }

    #[motsu::test]
    fn second_mint_hook_cannot_displace_first(
        token: Contract<Erc20Core>,
        first: Contract<MintGateHook>,
        second: Contract<MintGateHook>,
        alice: Address,
    ) {
        install_mint_gate(&token, &first, alice);

        let err = token
            .sender(alice)
            .install_hook(second.address())
            .motsu_unwrap_err();
        assert!(matches!(err, installer::Error::AlreadyInstalled(_)));

        // The original binding still serves mints.
        assert_eq!(
            first.address(),
            token
                .sender(alice)
                .get_hook_implementation(HookType::BeforeMint.flag())
                .motsu_unwrap()
        );
        token
            .sender(alice)
            .mint(alice, uint!(3_U256), vec![].into())
            .motsu_unwrap();
        assert_eq!(uint!(3_U256), token.sender(alice).balance_of(alice));
    }

    #[motsu::test]
    fn install_requires_admin_role(
        token: Contract<Erc20Core>,
        gate: Contract<MintGateHook>,
        alice: Address,
    ) {
        let err = token
            .sender(alice)
            .install_hook(gate.address())
            .motsu_unwrap_err();
        assert!(matches!(err, installer::Error::UnauthorizedCaller(_)));
        assert!(!token.sender(alice).is_hook_installed(gate.address()));
    }

    #[motsu::test]
    fn transfers_move_balances(
        token: Contract<Erc20Core>,
        alice: Address,
        bob: Address,
    ) {
        token.sender(alice)._mint(alice, uint!(100_U256)).motsu_unwrap();

        token.sender(alice).transfer(bob, uint!(40_U256)).motsu_unwrap();
        assert_eq!(uint!(60_U256), token.sender(alice).balance_of(alice));
        assert_eq!(uint!(40_U256), token.sender(alice).balance_of(bob));
        assert_eq!(uint!(100_U256), token.sender(alice).total_supply());
    }

    #[motsu::test]
    fn transfer_errors_on_insufficient_balance(
        token: Contract<Erc20Core>,
        alice: Address,
        bob: Address,
    ) {
        token.sender(alice)._mint(alice, uint!(5_U256)).motsu_unwrap();

        let err = token
            .sender(alice)
            .transfer(bob, uint!(6_U256))
            .motsu_unwrap_err();
        assert!(matches!(err, Error::InsufficientBalance(_)));
        assert_eq!(uint!(5_U256), token.sender(alice).balance_of(alice));
    }

    #[motsu::test]
    fn transfer_to_zero_address_fails(
        token: Contract<Erc20Core>,
        alice: Address,
    ) {
        token.sender(alice)._mint(alice, uint!(5_U256)).motsu_unwrap();

        let err = token
            .sender(alice)
            .transfer(Address::ZERO, uint!(1_U256))
            .motsu_unwrap_err();
        assert!(matches!(err, Error::InvalidReceiver(_)));
    }

    #[motsu::test]
    fn approve_and_transfer_from_spend_allowance(
        token: Contract<Erc20Core>,
        alice: Address,
        bob: Address,
    ) {
        token.sender(alice)._mint(alice, uint!(100_U256)).motsu_unwrap();
        token.sender(alice).approve(bob, uint!(50_U256)).motsu_unwrap();
        assert_eq!(
            uint!(50_U256),
            token.sender(alice).allowance(alice, bob)
        );

        token
            .sender(bob)
            .transfer_from(alice, bob, uint!(30_U256))
            .motsu_unwrap();
        assert_eq!(
            uint!(20_U256),
            token.sender(alice).allowance(alice, bob)
        );
        assert_eq!(uint!(30_U256), token.sender(alice).balance_of(bob));
    }

    #[motsu::test]
    fn transfer_from_errors_without_allowance(
        token: Contract<Erc20Core>,
        alice: Address,
        bob: Address,
    ) {
        token.sender(alice)._mint(alice, uint!(100_U256)).motsu_unwrap();

        let err = token
            .sender(bob)
            .transfer_from(alice, bob, uint!(1_U256))
            .motsu_unwrap_err();
        assert!(matches!(err, Error::InsufficientAllowance(_)));
    }

    #[motsu::test]
    fn infinite_allowance_is_not_reduced(
        token: Contract<Erc20Core>,
        alice: Address,
        bob: Address,
    ) {
        token.sender(alice)._mint(alice, uint!(100_U256)).motsu_unwrap();
        token.sender(alice).approve(bob, U256::MAX).motsu_unwrap();

        token
            .sender(bob)
            .transfer_from(alice, bob, uint!(30_U256))
            .motsu_unwrap();
        assert_eq!(U256::MAX, token.sender(alice).allowance(alice, bob));
    }

    #[motsu::test]
    fn approve_zero_spender_fails(
        token: Contract<Erc20Core>,
        alice: Address,
    ) {
        let err = token
            .sender(alice)
            .approve(Address::ZERO, uint!(1_U256))
            .motsu_unwrap_err();
        assert!(matches!(err, Error::InvalidSpender(_)));
    }

    #[motsu::test]
    fn burn_reduces_balance_and_supply(
        token: Contract<Erc20Core>,
        alice: Address,
    ) {
        token.sender(alice)._mint(alice, uint!(100_U256)).motsu_unwrap();

        token
            .sender(alice)
            .burn(uint!(40_U256), vec![].into())
            .motsu_unwrap();
        assert_eq!(uint!(60_U256), token.sender(alice).balance_of(alice));
        assert_eq!(uint!(60_U256), token.sender(alice).total_supply());
    }

    #[motsu::test]
    fn advisory_points_are_optional(
        token: Contract<Erc20Core>,
        alice: Address,
        bob: Address,
    ) {
        // No hooks installed at all: transfers, approvals and burns
        // proceed unimpeded.
        token.sender(alice)._mint(alice, uint!(10_U256)).motsu_unwrap();
        token.sender(alice).transfer(bob, uint!(1_U256)).motsu_unwrap();
        token.sender(alice).approve(bob, uint!(1_U256)).motsu_unwrap();
        token.sender(alice).burn(uint!(1_U256), vec![].into()).motsu_unwrap();
    }

    #[motsu::test]
    fn policy_hook_gates_transfer(
        token: Contract<Erc20Core>,
        policy: Contract<PolicyHook>,
        alice: Address,
        bob: Address,
    ) {
        token.sender(alice)._mint(alice, uint!(10_U256)).motsu_unwrap();
        token.sender(alice).grant_admin(alice);
        token.sender(alice).install_hook(policy.address()).motsu_unwrap();
        policy.sender(alice).set_blocked(true);

        let err = token
            .sender(alice)
            .transfer(bob, uint!(1_U256))
            .motsu_unwrap_err();
        // The hook's own revert data reaches the caller unchanged.
        assert_eq!(b"policy rejected".to_vec(), Vec::<u8>::from(err));
        assert_eq!(uint!(10_U256), token.sender(alice).balance_of(alice));

        policy.sender(alice).set_blocked(false);
        token.sender(alice).transfer(bob, uint!(1_U256)).motsu_unwrap();
        assert_eq!(uint!(1_U256), token.sender(alice).balance_of(bob));
    }

    #[motsu::test]
    fn policy_hook_gates_burn_and_approve(
        token: Contract<Erc20Core>,
        policy: Contract<PolicyHook>,
        alice: Address,
        bob: Address,
    ) {
        token.sender(alice)._mint(alice, uint!(10_U256)).motsu_unwrap();
        token.sender(alice).grant_admin(alice);
        token.sender(alice).install_hook(policy.address()).motsu_unwrap();
        policy.sender(alice).set_blocked(true);

        let err = token
            .sender(alice)
            .burn(uint!(1_U256), vec![].into())
            .motsu_unwrap_err();
        assert!(matches!(
            err,
            Error::Hook(installer::Error::HookReverted(_))
        ));

        let err = token
            .sender(alice)
            .approve(bob, uint!(1_U256))
            .motsu_unwrap_err();
        assert!(matches!(
            err,
            Error::Hook(installer::Error::HookReverted(_))
        ));
        assert_eq!(U256::ZERO, token.sender(alice).allowance(alice, bob));
    }

    #[motsu::test]
    fn write_gateway_honors_roles(
        token: Contract<Erc20Core>,
        gate: Contract<MintGateHook>,
        alice: Address,
        bob: Address,
    ) {
        install_mint_gate(&token, &gate, alice);

        // A selector the hook does not route.
        let data = vec![0xde, 0xad, 0xbe, 0xef];
        let err = token
            .sender(bob)
            .hook_write(
                HookType::BeforeMint.flag(),
                U256::ZERO,
                data.clone().into(),
            )
            .motsu_unwrap_err();
        assert!(matches!(err, installer::Error::UnauthorizedCaller(_)));

        token
            .sender(alice)
            .grant_role(bob, Permissions::HOOK_CALLER_ROLE)
            .motsu_unwrap();
        // Authorized now, so the call is forwarded and the hook's failure
        // to route it is surfaced.
        let err = token
            .sender(bob)
            .hook_write(HookType::BeforeMint.flag(), U256::ZERO, data.into())
            .motsu_unwrap_err();
        assert!(matches!(
            err,
            installer::Error::CallFailed(_)
                | installer::Error::HookReverted(_)
        ));
    }

    #[motsu::test]
    fn introspection_reports_four_slots(
        token: Contract<Erc20Core>,
        gate: Contract<MintGateHook>,
        alice: Address,
    ) {
        install_mint_gate(&token, &gate, alice);

        let all = token.sender(alice).get_all_hooks();
        assert_eq!(
            vec![gate.address(), Address::ZERO, Address::ZERO, Address::ZERO],
            all
        );
        assert_eq!(
            HookType::BeforeMint.flag(),
            token.sender(alice).active_hooks()
        );

        // Metadata flags are out of range for the ERC-20 core.
        let err = token
            .sender(alice)
            .get_hook_implementation(HookType::TokenUri.flag())
            .motsu_unwrap_err();
        assert!(matches!(err, installer::Error::InvalidFlag(_)));
    }
}
