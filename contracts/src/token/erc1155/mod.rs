//! ERC-1155 multi-token core with pluggable lifecycle hooks.
//!
//! [`Erc1155Core`] keeps per-id balance and operator bookkeeping fixed and
//! delegates policy to installed hook contracts. Minting is gated by the
//! [`HookType::BeforeMint`] hook, which authorizes the quantity of a token
//! id to mint. Transfer, burn and approval hooks are advisory and receive
//! the unified ids/values arrays used by both single and batch operations.
//! Metadata is external: `uri` and `royaltyInfo` resolve through the
//! [`HookType::TokenUri`] and [`HookType::Royalty`] read dispatch.

use alloc::{string::String, vec, vec::Vec};

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
pub use sol::*;
use stylus_sdk::{
    abi::Bytes,
    call::{self, MethodError},
    evm, function_selector, msg,
    prelude::*,
    storage::{StorageBool, StorageMap, StorageU256},
};

use crate::{
    access::permissions::{self, Permissions},
    hooks::{
        installer::{
            self, HookInstallerCallFailed, HookInstallerNoHookForFlag,
        },
        HookHost, HookInstaller, HookType,
    },
    utils::math::storage::{AddAssignChecked, SubAssignUnchecked},
};

/// The expected value returned from
/// [`IERC1155Receiver::onERC1155Received`][receiver].
///
/// [receiver]: https://eips.ethereum.org/EIPS/eip-1155
pub const SINGLE_TRANSFER_FN_SELECTOR: [u8; 4] = function_selector!(
    "onERC1155Received",
    Address,
    Address,
    U256,
    U256,
    Bytes
);

/// The expected value returned from
/// [`IERC1155Receiver::onERC1155BatchReceived`][receiver].
///
/// [receiver]: https://eips.ethereum.org/EIPS/eip-1155
pub const BATCH_TRANSFER_FN_SELECTOR: [u8; 4] = function_selector!(
    "onERC1155BatchReceived",
    Address,
    Address,
    Vec<U256>,
    Vec<U256>,
    Bytes
);

#[cfg_attr(coverage_nightly, coverage(off))]
mod sol {
    use alloy_sol_macro::sol;

    sol! {
        /// Emitted when `value` amount of tokens of type `id` are
        /// transferred from `from` to `to` by `operator`.
        #[allow(missing_docs)]
        event TransferSingle(
            address indexed operator,
            address indexed from,
            address indexed to,
            uint256 id,
            uint256 value
        );

        /// Equivalent to multiple [`TransferSingle`] events, where
        /// `operator`, `from` and `to` are the same for all transfers.
        #[allow(missing_docs)]
        event TransferBatch(
            address indexed operator,
            address indexed from,
            address indexed to,
            uint256[] ids,
            uint256[] values
        );

        /// Emitted when `account` grants or revokes permission to
        /// `operator` to transfer their tokens, according to `approved`.
        #[allow(missing_docs)]
        event ApprovalForAll(
            address indexed account,
            address indexed operator,
            bool approved
        );
    }

    sol! {
        /// Indicates an error related to the current `balance` of a
        /// `sender`. Used in transfers.
        ///
        /// * `sender` - Address whose tokens are being transferred.
        /// * `balance` - Current balance for the interacting account.
        /// * `needed` - Minimum amount required to perform a transfer.
        /// * `token_id` - Identifier number of a token.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC1155InsufficientBalance(
            address sender,
            uint256 balance,
            uint256 needed,
            uint256 token_id
        );

        /// Indicates a failure with the token `sender`. Used in transfers.
        ///
        /// * `sender` - Address whose tokens are being transferred.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC1155InvalidSender(address sender);

        /// Indicates a failure with the token `receiver`. Used in
        /// transfers.
        ///
        /// * `receiver` - Address to which tokens are being transferred.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC1155InvalidReceiver(address receiver);

        /// Indicates a failure with the `operator`'s approval. Used in
        /// transfers.
        ///
        /// * `operator` - Address that may be allowed to operate on tokens
        ///   without being their owner.
        /// * `owner` - Address of the current owner of a token.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC1155MissingApprovalForAll(address operator, address owner);

        /// Indicates a failure with the `operator` to be approved. Used in
        /// approvals.
        ///
        /// * `operator` - Address that may be allowed to operate on tokens
        ///   without being their owner.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC1155InvalidOperator(address operator);

        /// Indicates an array length mismatch between ids and values in a
        /// batch operation.
        ///
        /// * `ids_length` - Length of the array of token identifiers.
        /// * `values_length` - Length of the array of token amounts.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC1155InvalidArrayLength(uint256 ids_length, uint256 values_length);

        /// Minting is disabled: no before-mint hook is installed.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC1155CoreMintDisabled();
    }
}

pub use hook_abi::IErc1155Hook;
mod hook_abi {
    #![allow(missing_docs)]
    #![cfg_attr(coverage_nightly, coverage(off))]
    alloy_sol_types::sol! {
        /// Lifecycle entrypoints an ERC-1155 hook contract implements, one
        /// per flag it declares.
        interface IErc1155Hook {
            function beforeMint(address to, uint256 token_id, uint256 value, bytes calldata data) external payable returns (uint256);
            function beforeTransfer(address from, address to, uint256[] memory ids, uint256[] memory values) external;
            function beforeBurn(address from, uint256[] memory ids, uint256[] memory values, bytes calldata data) external;
            function beforeApprove(address owner, address operator, bool approved) external;
            function uri(uint256 token_id) external view returns (string memory);
            function royaltyInfo(uint256 token_id, uint256 sale_price) external view returns (address, uint256);
        }
    }
}

pub use receiver_abi::IERC1155Receiver;
mod receiver_abi {
    #![allow(missing_docs)]
    #![cfg_attr(coverage_nightly, coverage(off))]
    alloy_sol_types::sol! {
        /// Interface for any contract that wants to support transfers from
        /// ERC-1155 asset contracts.
        interface IERC1155Receiver {
            function onERC1155Received(address operator, address from, uint256 token_id, uint256 value, bytes calldata data) external returns (bytes4);
            function onERC1155BatchReceived(address operator, address from, uint256[] memory ids, uint256[] memory values, bytes calldata data) external returns (bytes4);
        }
    }
}

/// An [`Erc1155Core`] error, following [ERC-6093] where the standard token
/// operations are concerned.
///
/// [ERC-6093]: https://eips.ethereum.org/EIPS/eip-6093
#[derive(SolidityError, Debug)]
pub enum Error {
    /// Indicates an error related to the current balance of a sender.
    InsufficientBalance(ERC1155InsufficientBalance),
    /// Indicates a failure with the token `sender`.
    InvalidSender(ERC1155InvalidSender),
    /// Indicates a failure with the token `receiver`.
    InvalidReceiver(ERC1155InvalidReceiver),
    /// Indicates a failure with the token `receiver`, with the reason
    /// specified by it.
    ///
    /// Since encoding [`stylus_sdk::call::Error`] returns the underlying
    /// revert data, the receiver's own error reaches the caller unchanged.
    InvalidReceiverWithReason(call::Error),
    /// Indicates a failure with the `operator`'s approval.
    MissingApprovalForAll(ERC1155MissingApprovalForAll),
    /// Indicates a failure with the `operator` to be approved.
    InvalidOperator(ERC1155InvalidOperator),
    /// Indicates an array length mismatch in a batch operation.
    InvalidArrayLength(ERC1155InvalidArrayLength),
    /// Minting is disabled: no before-mint hook is installed.
    MintDisabled(ERC1155CoreMintDisabled),
    /// An error reported by the hook registry or bubbled from a hook.
    Hook(installer::Error),
}

impl MethodError for Error {
    fn encode(self) -> alloc::vec::Vec<u8> {
        self.into()
    }
}

/// State of an [`Erc1155Core`] token.
#[storage]
pub struct Erc1155Core {
    /// Maps token ids to a mapping of user balances.
    #[allow(clippy::used_underscore_binding)]
    pub _balances: StorageMap<U256, StorageMap<Address, StorageU256>>,
    /// Maps owners to a mapping of operator approvals.
    #[allow(clippy::used_underscore_binding)]
    pub _operator_approvals:
        StorageMap<Address, StorageMap<Address, StorageBool>>,
    /// The lifecycle hook registry.
    pub hooks: HookInstaller,
    /// Role storage backing the registry's capability checks.
    pub permissions: Permissions,
}

/// NOTE: Implementation of [`TopLevelStorage`] to be able use `&mut self`
/// when calling other contracts and not `&mut (impl TopLevelStorage +
/// BorrowMut<Self>)`. Should be fixed in the future by the Stylus team.
unsafe impl TopLevelStorage for Erc1155Core {}

impl HookHost for Erc1155Core {
    const LAST_HOOK: HookType = HookType::Royalty;

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
impl Erc1155Core {
    /// Returns the value of tokens of type `token_id` owned by `account`.
    #[must_use]
    pub fn balance_of(&self, account: Address, token_id: U256) -> U256 {
        self._balances.getter(token_id).get(account)
    }

    /// Batched version of [`Erc1155Core::balance_of`].
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidArrayLength`] - If `accounts` and `token_ids`
    ///   have different lengths.
    pub fn balance_of_batch(
        &self,
        accounts: Vec<Address>,
        token_ids: Vec<U256>,
    ) -> Result<Vec<U256>, Error> {
        Self::require_equal_arrays(accounts.len(), token_ids.len())?;
        let balances = accounts
            .iter()
            .zip(token_ids.iter())
            .map(|(&account, &token_id)| self.balance_of(account, token_id))
            .collect();
        Ok(balances)
    }

    /// Grants or revokes permission to `operator` to transfer the caller's
    /// tokens, according to `approved`.
    ///
    /// Consults the before-approve hook first, when one is installed.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidOperator`] - If `operator` is `Address::ZERO`.
    /// * [`Error::Hook`] - If an installed before-approve hook rejects the
    ///   approval.
    ///
    /// # Events
    ///
    /// * [`ApprovalForAll`]
    pub fn set_approval_for_all(
        &mut self,
        operator: Address,
        approved: bool,
    ) -> Result<(), Error> {
        let owner = msg::sender();
        self.dispatch_before_approve(owner, operator, approved)?;

        if operator.is_zero() {
            return Err(Error::InvalidOperator(ERC1155InvalidOperator {
                operator: Address::ZERO,
            }));
        }
        self._operator_approvals.setter(owner).insert(operator, approved);
        evm::log(ApprovalForAll { account: owner, operator, approved });
        Ok(())
    }

    /// Returns whether `operator` is allowed to manage all of the tokens
    /// of `account`.
    #[must_use]
    pub fn is_approved_for_all(
        &self,
        account: Address,
        operator: Address,
    ) -> bool {
        self._operator_approvals.getter(account).get(operator)
    }

    /// Transfers a `value` amount of tokens of type `token_id` from `from`
    /// to `to`, checking that a contract recipient implements
    /// `onERC1155Received`.
    ///
    /// Consults the before-transfer hook first, when one is installed.
    ///
    /// # Errors
    ///
    /// * [`Error::MissingApprovalForAll`] - If the caller is neither
    ///   `from` nor an approved operator.
    /// * [`Error::InvalidSender`] - If `from` is `Address::ZERO`.
    /// * [`Error::InvalidReceiver`] - If `to` is `Address::ZERO` or
    ///   refuses the transfer.
    /// * [`Error::InvalidReceiverWithReason`] - If the receiver reverts
    ///   with a reason.
    /// * [`Error::InsufficientBalance`] - If `from`'s balance of
    ///   `token_id` is below `value`.
    /// * [`Error::Hook`] - If an installed before-transfer hook rejects
    ///   the transfer; its revert data is bubbled unchanged.
    ///
    /// # Events
    ///
    /// * [`TransferSingle`]
    pub fn safe_transfer_from(
        &mut self,
        from: Address,
        to: Address,
        token_id: U256,
        value: U256,
        data: Bytes,
    ) -> Result<(), Error> {
        self.authorize_transfer(from)?;
        if to.is_zero() {
            return Err(Error::InvalidReceiver(ERC1155InvalidReceiver {
                receiver: Address::ZERO,
            }));
        }
        if from.is_zero() {
            return Err(Error::InvalidSender(ERC1155InvalidSender {
                sender: Address::ZERO,
            }));
        }

        let ids = vec![token_id];
        let values = vec![value];
        self.dispatch_before_transfer(from, to, &ids, &values)?;
        self._update_with_acceptance_check(from, to, ids, values, &data)
    }

    /// Batched version of [`Erc1155Core::safe_transfer_from`].
    ///
    /// # Errors
    ///
    /// * The errors of [`Erc1155Core::safe_transfer_from`].
    /// * [`Error::InvalidArrayLength`] - If `token_ids` and `values` have
    ///   different lengths.
    ///
    /// # Events
    ///
    /// * [`TransferBatch`]
    pub fn safe_batch_transfer_from(
        &mut self,
        from: Address,
        to: Address,
        token_ids: Vec<U256>,
        values: Vec<U256>,
        data: Bytes,
    ) -> Result<(), Error> {
        self.authorize_transfer(from)?;
        if to.is_zero() {
            return Err(Error::InvalidReceiver(ERC1155InvalidReceiver {
                receiver: Address::ZERO,
            }));
        }
        if from.is_zero() {
            return Err(Error::InvalidSender(ERC1155InvalidSender {
                sender: Address::ZERO,
            }));
        }

        self.dispatch_before_transfer(from, to, &token_ids, &values)?;
        self._update_with_acceptance_check(from, to, token_ids, values, &data)
    }

    /// Mints a `value` amount of tokens of type `token_id` to `to`.
    ///
    /// Minting is controlled entirely by the before-mint hook: it receives
    /// the requested `value` together with `data` and the attached value,
    /// and returns the quantity it authorizes, which is the quantity
    /// actually minted.
    ///
    /// # Errors
    ///
    /// * [`Error::MintDisabled`] - If no before-mint hook is installed.
    /// * [`Error::InvalidReceiver`] - If `to` is `Address::ZERO` or
    ///   refuses the mint.
    /// * [`Error::Hook`] - If the hook rejects the mint; its revert data
    ///   is bubbled unchanged.
    ///
    /// # Panics
    ///
    /// * If `to`'s balance of `token_id` exceeds `U256::MAX`.
    ///
    /// # Events
    ///
    /// * [`TransferSingle`]
    #[payable]
    pub fn mint(
        &mut self,
        to: Address,
        token_id: U256,
        value: U256,
        data: Bytes,
    ) -> Result<(), Error> {
        if to.is_zero() {
            return Err(Error::InvalidReceiver(ERC1155InvalidReceiver {
                receiver: Address::ZERO,
            }));
        }

        let value = self.dispatch_before_mint(to, token_id, value, &data)?;
        self._update_with_acceptance_check(
            Address::ZERO,
            to,
            vec![token_id],
            vec![value],
            &data,
        )
    }

    /// Destroys a `value` amount of tokens of type `token_id` from `from`.
    /// The caller must be `from` or an approved operator.
    ///
    /// Consults the before-burn hook first, when one is installed.
    ///
    /// # Errors
    ///
    /// * [`Error::MissingApprovalForAll`] - If the caller is neither
    ///   `from` nor an approved operator.
    /// * [`Error::InvalidSender`] - If `from` is `Address::ZERO`.
    /// * [`Error::InsufficientBalance`] - If `from`'s balance of
    ///   `token_id` is below `value`.
    /// * [`Error::Hook`] - If an installed before-burn hook rejects the
    ///   burn.
    ///
    /// # Events
    ///
    /// * [`TransferSingle`]
    pub fn burn(
        &mut self,
        from: Address,
        token_id: U256,
        value: U256,
        data: Bytes,
    ) -> Result<(), Error> {
        self.authorize_transfer(from)?;
        if from.is_zero() {
            return Err(Error::InvalidSender(ERC1155InvalidSender {
                sender: Address::ZERO,
            }));
        }

        let ids = vec![token_id];
        let values = vec![value];
        self.dispatch_before_burn(from, &ids, &values, &data)?;
        self._update(from, Address::ZERO, &ids, &values)
    }

    /// Batched version of [`Erc1155Core::burn`].
    ///
    /// # Errors
    ///
    /// * The errors of [`Erc1155Core::burn`].
    /// * [`Error::InvalidArrayLength`] - If `token_ids` and `values` have
    ///   different lengths.
    ///
    /// # Events
    ///
    /// * [`TransferBatch`]
    pub fn burn_batch(
        &mut self,
        from: Address,
        token_ids: Vec<U256>,
        values: Vec<U256>,
        data: Bytes,
    ) -> Result<(), Error> {
        self.authorize_transfer(from)?;
        if from.is_zero() {
            return Err(Error::InvalidSender(ERC1155InvalidSender {
                sender: Address::ZERO,
            }));
        }

        self.dispatch_before_burn(from, &token_ids, &values, &data)?;
        self._update(from, Address::ZERO, &token_ids, &values)
    }

    /// Returns the metadata URI for token type `token_id`, resolved
    /// through the token-URI hook.
    ///
    /// # Errors
    ///
    /// * [`Error::Hook`] - If no token-URI hook is installed, or the hook
    ///   fails.
    pub fn uri(&self, token_id: U256) -> Result<String, Error> {
        let hook = self.metadata_hook(HookType::TokenUri)?;
        let calldata = IErc1155Hook::uriCall { token_id }.abi_encode();
        let returned = installer::invoke_read(hook, &calldata)?;
        let decoded =
            IErc1155Hook::uriCall::abi_decode_returns(&returned, true)
                .map_err(|_| {
                    installer::Error::from(HookInstallerCallFailed { hook })
                })?;
        Ok(decoded._0)
    }

    /// Returns the royalty receiver and amount owed for a sale of
    /// `token_id` at `sale_price`, resolved through the royalty hook.
    ///
    /// # Errors
    ///
    /// * [`Error::Hook`] - If no royalty hook is installed, or the hook
    ///   fails.
    pub fn royalty_info(
        &self,
        token_id: U256,
        sale_price: U256,
    ) -> Result<(Address, U256), Error> {
        let hook = self.metadata_hook(HookType::Royalty)?;
        let calldata = IErc1155Hook::royaltyInfoCall { token_id, sale_price }
            .abi_encode();
        let returned = installer::invoke_read(hook, &calldata)?;
        let decoded =
            IErc1155Hook::royaltyInfoCall::abi_decode_returns(&returned, true)
                .map_err(|_| {
                    installer::Error::from(HookInstallerCallFailed { hook })
                })?;
        Ok((decoded._0, decoded._1))
    }

    /// Installs `hook`, binding every lifecycle flag it declares. The
    /// caller must hold [`Permissions::ADMIN_ROLE`].
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
    /// The caller must hold [`Permissions::ADMIN_ROLE`].
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
    /// * [`installer::Error::InvalidFlag`] - If `flag` is not dispatched
    ///   by this contract.
    pub fn get_hook_implementation(
        &self,
        flag: U256,
    ) -> Result<Address, installer::Error> {
        HookHost::hook_implementation(self, flag)
    }

    /// Snapshot of the implementations of all six lifecycle flags, from
    /// before-mint up to royalty.
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

impl Erc1155Core {
    /// Moves the `values` amounts of the `ids` token types from `from` to
    /// `to`, or alternatively mints (or burns) if `from` (or `to`) is the
    /// zero address.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidArrayLength`] - If `ids` and `values` have
    ///   different lengths.
    /// * [`Error::InsufficientBalance`] - If `from`'s balance of an id is
    ///   below its value.
    ///
    /// # Panics
    ///
    /// * If a receiving balance exceeds `U256::MAX`.
    ///
    /// # Events
    ///
    /// * [`TransferSingle`] - For a single-element update.
    /// * [`TransferBatch`] - Otherwise.
    fn _update(
        &mut self,
        from: Address,
        to: Address,
        ids: &[U256],
        values: &[U256],
    ) -> Result<(), Error> {
        Self::require_equal_arrays(ids.len(), values.len())?;
        let operator = msg::sender();

        for (&token_id, &value) in ids.iter().zip(values.iter()) {
            if !from.is_zero() {
                let from_balance = self._balances.getter(token_id).get(from);
                if from_balance < value {
                    return Err(Error::InsufficientBalance(
                        ERC1155InsufficientBalance {
                            sender: from,
                            balance: from_balance,
                            needed: value,
                            token_id,
                        },
                    ));
                }
                self._balances
                    .setter(token_id)
                    .setter(from)
                    .sub_assign_unchecked(value);
            }
            if !to.is_zero() {
                self._balances.setter(token_id).setter(to).add_assign_checked(
                    value,
                    "should not exceed `U256::MAX` for balance",
                );
            }
        }

        if ids.len() == 1 {
            evm::log(TransferSingle {
                operator,
                from,
                to,
                id: ids[0],
                value: values[0],
            });
        } else {
            evm::log(TransferBatch {
                operator,
                from,
                to,
                ids: ids.to_vec(),
                values: values.to_vec(),
            });
        }
        Ok(())
    }

    /// Version of [`Erc1155Core::_update`] that performs the receiver
    /// acceptance check when `to` is a contract.
    fn _update_with_acceptance_check(
        &mut self,
        from: Address,
        to: Address,
        ids: Vec<U256>,
        values: Vec<U256>,
        data: &Bytes,
    ) -> Result<(), Error> {
        self._update(from, to, &ids, &values)?;

        if !to.is_zero() {
            let operator = msg::sender();
            if ids.len() == 1 {
                self._check_on_erc1155_received(
                    operator, from, to, ids[0], values[0], data,
                )?;
            } else {
                self._check_on_erc1155_batch_received(
                    operator, from, to, ids, values, data,
                )?;
            }
        }
        Ok(())
    }

    /// Calls `onERC1155Received` on `to`, if `to` is a contract, and
    /// checks the returned acceptance magic value.
    fn _check_on_erc1155_received(
        &mut self,
        operator: Address,
        from: Address,
        to: Address,
        token_id: U256,
        value: U256,
        data: &Bytes,
    ) -> Result<(), Error> {
        if !to.has_code() {
            return Ok(());
        }

        let calldata = IERC1155Receiver::onERC1155ReceivedCall {
            operator,
            from,
            token_id,
            value,
            data: data.to_vec().into(),
        }
        .abi_encode();
        let returned = self.acceptance_call(to, &calldata)?;

        let decoded =
            IERC1155Receiver::onERC1155ReceivedCall::abi_decode_returns(
                &returned, true,
            )
            .map_err(|_| {
                Error::InvalidReceiver(ERC1155InvalidReceiver { receiver: to })
            })?;
        if decoded._0 != SINGLE_TRANSFER_FN_SELECTOR {
            return Err(Error::InvalidReceiver(ERC1155InvalidReceiver {
                receiver: to,
            }));
        }
        Ok(())
    }

    /// Calls `onERC1155BatchReceived` on `to`, if `to` is a contract, and
    /// checks the returned acceptance magic value.
    fn _check_on_erc1155_batch_received(
        &mut self,
        operator: Address,
        from: Address,
        to: Address,
        ids: Vec<U256>,
        values: Vec<U256>,
        data: &Bytes,
    ) -> Result<(), Error> {
        if !to.has_code() {
            return Ok(());
        }

        let calldata = IERC1155Receiver::onERC1155BatchReceivedCall {
            operator,
            from,
            ids,
            values,
            data: data.to_vec().into(),
        }
        .abi_encode();
        let returned = self.acceptance_call(to, &calldata)?;

        let decoded =
            IERC1155Receiver::onERC1155BatchReceivedCall::abi_decode_returns(
                &returned, true,
            )
            .map_err(|_| {
                Error::InvalidReceiver(ERC1155InvalidReceiver { receiver: to })
            })?;
        if decoded._0 != BATCH_TRANSFER_FN_SELECTOR {
            return Err(Error::InvalidReceiver(ERC1155InvalidReceiver {
                receiver: to,
            }));
        }
        Ok(())
    }

    /// Forwards an acceptance check to `to`, mapping a reasonless failure
    /// to [`Error::InvalidReceiver`] and bubbling reasoned reverts.
    fn acceptance_call(
        &mut self,
        to: Address,
        calldata: &[u8],
    ) -> Result<Vec<u8>, Error> {
        match installer::invoke_write(to, U256::ZERO, calldata) {
            Ok(returned) => Ok(returned),
            Err(installer::Error::HookReverted(e)) => {
                // Non-IERC1155Receiver implementer.
                Err(Error::InvalidReceiverWithReason(e))
            }
            Err(_) => Err(Error::InvalidReceiver(ERC1155InvalidReceiver {
                receiver: to,
            })),
        }
    }

    /// Checks that the caller is `from` or an operator approved by `from`.
    fn authorize_transfer(&self, from: Address) -> Result<(), Error> {
        let sender = msg::sender();
        if from != sender && !self.is_approved_for_all(from, sender) {
            return Err(Error::MissingApprovalForAll(
                ERC1155MissingApprovalForAll { operator: sender, owner: from },
            ));
        }
        Ok(())
    }

    fn require_equal_arrays(
        ids_length: usize,
        values_length: usize,
    ) -> Result<(), Error> {
        if ids_length != values_length {
            return Err(Error::InvalidArrayLength(ERC1155InvalidArrayLength {
                ids_length: U256::from(ids_length),
                values_length: U256::from(values_length),
            }));
        }
        Ok(())
    }

    /// Resolves a metadata hook, failing when none is installed.
    fn metadata_hook(
        &self,
        hook_type: HookType,
    ) -> Result<Address, installer::Error> {
        self.hooks.resolve(hook_type).ok_or_else(|| {
            HookInstallerNoHookForFlag { flag: hook_type.flag() }.into()
        })
    }

    /// Resolves the before-mint hook and forwards the mint request,
    /// attaching the call value. Returns the quantity the hook authorizes.
    fn dispatch_before_mint(
        &mut self,
        to: Address,
        token_id: U256,
        value: U256,
        data: &Bytes,
    ) -> Result<U256, Error> {
        let Some(hook) = self.hooks.resolve(HookType::BeforeMint) else {
            return Err(ERC1155CoreMintDisabled {}.into());
        };
        let calldata = IErc1155Hook::beforeMintCall {
            to,
            token_id,
            value,
            data: data.to_vec().into(),
        }
        .abi_encode();
        let returned = installer::invoke_write(hook, msg::value(), &calldata)?;
        let decoded =
            IErc1155Hook::beforeMintCall::abi_decode_returns(&returned, true)
                .map_err(|_| {
                    installer::Error::from(HookInstallerCallFailed { hook })
                })?;
        Ok(decoded._0)
    }

    /// Consults the before-transfer hook, when one is installed.
    fn dispatch_before_transfer(
        &mut self,
        from: Address,
        to: Address,
        ids: &[U256],
        values: &[U256],
    ) -> Result<(), Error> {
        if let Some(hook) = self.hooks.resolve(HookType::BeforeTransfer) {
            let calldata = IErc1155Hook::beforeTransferCall {
                from,
                to,
                ids: ids.to_vec(),
                values: values.to_vec(),
            }
            .abi_encode();
            installer::invoke_write(hook, U256::ZERO, &calldata)?;
        }
        Ok(())
    }

    /// Consults the before-burn hook, when one is installed.
    fn dispatch_before_burn(
        &mut self,
        from: Address,
        ids: &[U256],
        values: &[U256],
        data: &Bytes,
    ) -> Result<(), Error> {
        if let Some(hook) = self.hooks.resolve(HookType::BeforeBurn) {
            let calldata = IErc1155Hook::beforeBurnCall {
                from,
                ids: ids.to_vec(),
                values: values.to_vec(),
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
        operator: Address,
        approved: bool,
    ) -> Result<(), Error> {
        if let Some(hook) = self.hooks.resolve(HookType::BeforeApprove) {
            let calldata =
                IErc1155Hook::beforeApproveCall { owner, operator, approved }
                    .abi_encode();
            installer::invoke_write(hook, U256::ZERO, &calldata)?;
        }
        Ok(())
    }
}
