//! ERC-721 token core with pluggable lifecycle hooks.
//!
//! [`Erc721Core`] keeps ownership and approval bookkeeping fixed and
//! delegates policy to installed hook contracts. Minting is gated by the
//! [`HookType::BeforeMint`] hook, which authorizes the quantity of
//! sequential token ids to mint. Transfer, burn and approval hooks are
//! advisory. Metadata is fully external: `tokenURI` and `royaltyInfo`
//! resolve through the [`HookType::TokenUri`] and [`HookType::Royalty`]
//! read dispatch.

use alloc::{string::String, vec, vec::Vec};

use alloy_primitives::{uint, Address, U256};
use alloy_sol_types::SolCall;
pub use sol::*;
use stylus_sdk::{
    abi::Bytes,
    call::{self, MethodError},
    evm, function_selector, msg,
    prelude::*,
    storage::{StorageAddress, StorageBool, StorageMap, StorageU256},
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
/// [`IERC721Receiver::onERC721Received`][receiver].
///
/// [receiver]: https://eips.ethereum.org/EIPS/eip-721
pub const RECEIVER_FN_SELECTOR: [u8; 4] =
    function_selector!("onERC721Received", Address, Address, U256, Bytes);

#[cfg_attr(coverage_nightly, coverage(off))]
mod sol {
    use alloy_sol_macro::sol;

    sol! {
        /// Emitted when the `token_id` token is transferred from `from` to
        /// `to`.
        #[allow(missing_docs)]
        event Transfer(address indexed from, address indexed to, uint256 indexed token_id);

        /// Emitted when `owner` enables `approved` to manage the
        /// `token_id` token.
        #[allow(missing_docs)]
        event Approval(address indexed owner, address indexed approved, uint256 indexed token_id);

        /// Emitted when `owner` enables or disables (`approved`) `operator`
        /// to manage all of its assets.
        #[allow(missing_docs)]
        event ApprovalForAll(address indexed owner, address indexed operator, bool approved);
    }

    sol! {
        /// Indicates that an address can't be an owner. For example,
        /// `address(0)` is a forbidden owner. Used in balance queries.
        ///
        /// * `owner` - The address deemed to be an invalid owner.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC721InvalidOwner(address owner);

        /// Indicates a `token_id` whose `owner` is the zero address.
        ///
        /// * `token_id` - Token id as a number.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC721NonexistentToken(uint256 token_id);

        /// Indicates an error related to the ownership over a particular
        /// token. Used in transfers.
        ///
        /// * `sender` - Address whose token is being transferred.
        /// * `token_id` - Token id as a number.
        /// * `owner` - Address of the current owner of the token.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC721IncorrectOwner(address sender, uint256 token_id, address owner);

        /// Indicates a failure with the token `sender`. Used in transfers.
        ///
        /// * `sender` - Address whose token is being transferred.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC721InvalidSender(address sender);

        /// Indicates a failure with the token `receiver`. Used in
        /// transfers.
        ///
        /// * `receiver` - Address that receives the token.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC721InvalidReceiver(address receiver);

        /// Indicates a failure with the `operator`'s approval. Used in
        /// transfers.
        ///
        /// * `operator` - Address that may be allowed to operate on tokens
        ///   without being their owner.
        /// * `token_id` - Token id as a number.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC721InsufficientApproval(address operator, uint256 token_id);

        /// Indicates a failure with the `approver` of a token to be
        /// approved. Used in approvals.
        ///
        /// * `approver` - Address initiating an approval operation.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC721InvalidApprover(address approver);

        /// Indicates a failure with the `operator` to be approved. Used in
        /// approvals.
        ///
        /// * `operator` - Address that may be allowed to operate on tokens
        ///   without being their owner.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC721InvalidOperator(address operator);

        /// Minting is disabled: no before-mint hook is installed.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error ERC721CoreMintDisabled();
    }
}

pub use hook_abi::IErc721Hook;
mod hook_abi {
    #![allow(missing_docs)]
    #![cfg_attr(coverage_nightly, coverage(off))]
    alloy_sol_types::sol! {
        /// Lifecycle entrypoints an ERC-721 hook contract implements, one
        /// per flag it declares.
        interface IErc721Hook {
            function beforeMint(address to, uint256 quantity, bytes calldata data) external payable returns (uint256);
            function beforeTransfer(address from, address to, uint256 token_id) external;
            function beforeBurn(address from, uint256 token_id, bytes calldata data) external;
            function beforeApprove(address owner, address approved, uint256 token_id) external;
            function tokenURI(uint256 token_id) external view returns (string memory);
            function royaltyInfo(uint256 token_id, uint256 sale_price) external view returns (address, uint256);
        }
    }
}

pub use receiver_abi::IERC721Receiver;
mod receiver_abi {
    #![allow(missing_docs)]
    #![cfg_attr(coverage_nightly, coverage(off))]
    alloy_sol_types::sol! {
        /// Interface for any contract that wants to support safe transfers
        /// from ERC-721 asset contracts.
        interface IERC721Receiver {
            function onERC721Received(address operator, address from, uint256 token_id, bytes calldata data) external returns (bytes4);
        }
    }
}

/// An [`Erc721Core`] error, following [ERC-6093] where the standard token
/// operations are concerned.
///
/// [ERC-6093]: https://eips.ethereum.org/EIPS/eip-6093
#[derive(SolidityError, Debug)]
pub enum Error {
    /// Indicates that an address can't be an owner.
    InvalidOwner(ERC721InvalidOwner),
    /// Indicates a `token_id` whose `owner` is the zero address.
    NonexistentToken(ERC721NonexistentToken),
    /// Indicates an error related to the ownership over a particular
    /// token.
    IncorrectOwner(ERC721IncorrectOwner),
    /// Indicates a failure with the token `sender`.
    InvalidSender(ERC721InvalidSender),
    /// Indicates a failure with the token `receiver`.
    InvalidReceiver(ERC721InvalidReceiver),
    /// Indicates a failure with the token `receiver`, with the reason
    /// specified by it.
    ///
    /// Since encoding [`stylus_sdk::call::Error`] returns the underlying
    /// revert data, the receiver's own error reaches the caller unchanged.
    InvalidReceiverWithReason(call::Error),
    /// Indicates a failure with the `operator`'s approval.
    InsufficientApproval(ERC721InsufficientApproval),
    /// Indicates a failure with the `approver` of an approval.
    InvalidApprover(ERC721InvalidApprover),
    /// Indicates a failure with the `operator` to be approved.
    InvalidOperator(ERC721InvalidOperator),
    /// Minting is disabled: no before-mint hook is installed.
    MintDisabled(ERC721CoreMintDisabled),
    /// An error reported by the hook registry or bubbled from a hook.
    Hook(installer::Error),
}

impl MethodError for Error {
    fn encode(self) -> alloc::vec::Vec<u8> {
        self.into()
    }
}

/// State of an [`Erc721Core`] token.
#[storage]
pub struct Erc721Core {
    /// Maps tokens to owners.
    #[allow(clippy::used_underscore_binding)]
    pub _owners: StorageMap<U256, StorageAddress>,
    /// Maps users to balances.
    #[allow(clippy::used_underscore_binding)]
    pub _balances: StorageMap<Address, StorageU256>,
    /// Maps tokens to approvals.
    #[allow(clippy::used_underscore_binding)]
    pub _token_approvals: StorageMap<U256, StorageAddress>,
    /// Maps owners to a mapping of operator approvals.
    #[allow(clippy::used_underscore_binding)]
    pub _operator_approvals:
        StorageMap<Address, StorageMap<Address, StorageBool>>,
    /// The next sequential token id to mint.
    #[allow(clippy::used_underscore_binding)]
    pub _next_token_id: StorageU256,
    /// The lifecycle hook registry.
    pub hooks: HookInstaller,
    /// Role storage backing the registry's capability checks.
    pub permissions: Permissions,
}

/// NOTE: Implementation of [`TopLevelStorage`] to be able use `&mut self`
/// when calling other contracts and not `&mut (impl TopLevelStorage +
/// BorrowMut<Self>)`. Should be fixed in the future by the Stylus team.
unsafe impl TopLevelStorage for Erc721Core {}

impl HookHost for Erc721Core {
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
impl Erc721Core {
    /// Returns the number of tokens in `owner`'s account.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidOwner`] - If `owner` is `Address::ZERO`.
    pub fn balance_of(&self, owner: Address) -> Result<U256, Error> {
        if owner.is_zero() {
            return Err(Error::InvalidOwner(ERC721InvalidOwner {
                owner: Address::ZERO,
            }));
        }
        Ok(self._balances.get(owner))
    }

    /// Returns the owner of the `token_id` token.
    ///
    /// # Errors
    ///
    /// * [`Error::NonexistentToken`] - If the token does not exist.
    pub fn owner_of(&self, token_id: U256) -> Result<Address, Error> {
        self._require_owned(token_id)
    }

    /// Transfers `token_id` from `from` to `to`, without checking that
    /// `to` is aware of the ERC-721 protocol.
    ///
    /// Consults the before-transfer hook first, when one is installed.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidReceiver`] - If `to` is `Address::ZERO`.
    /// * [`Error::NonexistentToken`] - If the token does not exist.
    /// * [`Error::InsufficientApproval`] - If the caller is not the owner
    ///   and has no approval for the token.
    /// * [`Error::IncorrectOwner`] - If `from` is not the current owner.
    /// * [`Error::Hook`] - If an installed before-transfer hook rejects
    ///   the transfer; its revert data is bubbled unchanged.
    ///
    /// # Events
    ///
    /// * [`Transfer`]
    pub fn transfer_from(
        &mut self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<(), Error> {
        if to.is_zero() {
            return Err(Error::InvalidReceiver(ERC721InvalidReceiver {
                receiver: Address::ZERO,
            }));
        }
        self.dispatch_before_transfer(from, to, token_id)?;

        let previous_owner = self._update(to, token_id, msg::sender())?;
        if previous_owner.is_zero() {
            return Err(Error::NonexistentToken(ERC721NonexistentToken {
                token_id,
            }));
        }
        if previous_owner != from {
            return Err(Error::IncorrectOwner(ERC721IncorrectOwner {
                sender: from,
                token_id,
                owner: previous_owner,
            }));
        }
        Ok(())
    }

    /// Safely transfers `token_id` from `from` to `to`, checking that a
    /// contract recipient implements `onERC721Received`.
    ///
    /// # Errors
    ///
    /// * The errors of [`Erc721Core::transfer_from`].
    /// * [`Error::InvalidReceiver`] - If the receiver refuses the token.
    /// * [`Error::InvalidReceiverWithReason`] - If the receiver reverts
    ///   with a reason; the reason is bubbled unchanged.
    ///
    /// # Events
    ///
    /// * [`Transfer`]
    pub fn safe_transfer_from(
        &mut self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<(), Error> {
        self.transfer_from(from, to, token_id)?;
        self._check_on_erc721_received(
            msg::sender(),
            from,
            to,
            token_id,
            &Bytes::from(vec![]),
        )
    }

    /// Same as [`Erc721Core::safe_transfer_from`], with additional `data`
    /// passed to the receiver.
    ///
    /// # Errors
    ///
    /// * The errors of [`Erc721Core::safe_transfer_from`].
    ///
    /// # Events
    ///
    /// * [`Transfer`]
    #[selector(name = "safeTransferFrom")]
    pub fn safe_transfer_from_with_data(
        &mut self,
        from: Address,
        to: Address,
        token_id: U256,
        data: Bytes,
    ) -> Result<(), Error> {
        self.transfer_from(from, to, token_id)?;
        self._check_on_erc721_received(msg::sender(), from, to, token_id, &data)
    }

    /// Gives permission to `to` to transfer `token_id` to another account.
    /// The approval is cleared when the token is transferred.
    ///
    /// Consults the before-approve hook first, when one is installed.
    ///
    /// # Errors
    ///
    /// * [`Error::NonexistentToken`] - If the token does not exist.
    /// * [`Error::InvalidApprover`] - If the caller is neither the owner
    ///   nor an approved operator.
    /// * [`Error::Hook`] - If an installed before-approve hook rejects the
    ///   approval.
    ///
    /// # Events
    ///
    /// * [`Approval`]
    pub fn approve(
        &mut self,
        to: Address,
        token_id: U256,
    ) -> Result<(), Error> {
        let owner = self._require_owned(token_id)?;
        self.dispatch_before_approve(owner, to, token_id)?;
        self._approve(to, token_id, msg::sender(), true)
    }

    /// Returns the account approved for the `token_id` token.
    ///
    /// # Errors
    ///
    /// * [`Error::NonexistentToken`] - If the token does not exist.
    pub fn get_approved(&self, token_id: U256) -> Result<Address, Error> {
        self._require_owned(token_id)?;
        Ok(self._token_approvals.get(token_id))
    }

    /// Approves or removes `operator` for all tokens owned by the caller.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidOperator`] - If `operator` is `Address::ZERO`.
    ///
    /// # Events
    ///
    /// * [`ApprovalForAll`]
    pub fn set_approval_for_all(
        &mut self,
        operator: Address,
        approved: bool,
    ) -> Result<(), Error> {
        self._set_approval_for_all(msg::sender(), operator, approved)
    }

    /// Returns whether `operator` is allowed to manage all of the tokens
    /// of `owner`.
    #[must_use]
    pub fn is_approved_for_all(
        &self,
        owner: Address,
        operator: Address,
    ) -> bool {
        self._operator_approvals.getter(owner).get(operator)
    }

    /// Mints a quantity of sequential token ids to `to`.
    ///
    /// Minting is controlled entirely by the before-mint hook: it receives
    /// the requested `quantity` together with `data` and the attached
    /// value, and returns the quantity it authorizes, which is the number
    /// of tokens actually minted.
    ///
    /// # Errors
    ///
    /// * [`Error::MintDisabled`] - If no before-mint hook is installed.
    /// * [`Error::InvalidReceiver`] - If `to` is `Address::ZERO`.
    /// * [`Error::Hook`] - If the hook rejects the mint; its revert data
    ///   is bubbled unchanged.
    ///
    /// # Panics
    ///
    /// * If the token id space is exhausted.
    ///
    /// # Events
    ///
    /// * [`Transfer`] - One per minted token.
    #[payable]
    pub fn mint(
        &mut self,
        to: Address,
        quantity: U256,
        data: Bytes,
    ) -> Result<(), Error> {
        let quantity = self.dispatch_before_mint(to, quantity, &data)?;

        let mut token_id = self._next_token_id.get();
        let mut minted = U256::ZERO;
        while minted < quantity {
            self._mint(to, token_id)?;
            token_id += uint!(1_U256);
            minted += uint!(1_U256);
        }
        self._next_token_id.set(token_id);
        Ok(())
    }

    /// The next sequential token id [`Erc721Core::mint`] will assign.
    #[must_use]
    pub fn next_token_id(&self) -> U256 {
        self._next_token_id.get()
    }

    /// Destroys `token_id`. The caller must own the token or be an
    /// approved operator.
    ///
    /// Consults the before-burn hook first, when one is installed.
    ///
    /// # Errors
    ///
    /// * [`Error::NonexistentToken`] - If the token does not exist.
    /// * [`Error::InsufficientApproval`] - If the caller is not authorized
    ///   for the token.
    /// * [`Error::Hook`] - If an installed before-burn hook rejects the
    ///   burn.
    ///
    /// # Events
    ///
    /// * [`Transfer`]
    pub fn burn(&mut self, token_id: U256, data: Bytes) -> Result<(), Error> {
        let from = msg::sender();
        self.dispatch_before_burn(from, token_id, &data)?;

        let previous_owner =
            self._update(Address::ZERO, token_id, msg::sender())?;
        if previous_owner.is_zero() {
            return Err(Error::NonexistentToken(ERC721NonexistentToken {
                token_id,
            }));
        }
        Ok(())
    }

    /// Returns the metadata URI of `token_id`, resolved through the
    /// token-URI hook.
    ///
    /// # Errors
    ///
    /// * [`Error::NonexistentToken`] - If the token does not exist.
    /// * [`Error::Hook`] - If no token-URI hook is installed, or the hook
    ///   fails.
    #[selector(name = "tokenURI")]
    pub fn token_uri(&self, token_id: U256) -> Result<String, Error> {
        self._require_owned(token_id)?;

        let hook = self.metadata_hook(HookType::TokenUri)?;
        let calldata = IErc721Hook::tokenURICall { token_id }.abi_encode();
        let returned = installer::invoke_read(hook, &calldata)?;
        let decoded =
            IErc721Hook::tokenURICall::abi_decode_returns(&returned, true)
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
        let calldata =
            IErc721Hook::royaltyInfoCall { token_id, sale_price }.abi_encode();
        let returned = installer::invoke_read(hook, &calldata)?;
        let decoded =
            IErc721Hook::royaltyInfoCall::abi_decode_returns(&returned, true)
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

impl Erc721Core {
    /// Returns the owner of `token_id`, which may be `Address::ZERO` if
    /// the token does not exist.
    fn _owner_of(&self, token_id: U256) -> Address {
        self._owners.get(token_id)
    }

    /// Returns the owner of `token_id`.
    ///
    /// # Errors
    ///
    /// * [`Error::NonexistentToken`] - If the token does not exist.
    fn _require_owned(&self, token_id: U256) -> Result<Address, Error> {
        let owner = self._owner_of(token_id);
        if owner.is_zero() {
            return Err(Error::NonexistentToken(ERC721NonexistentToken {
                token_id,
            }));
        }
        Ok(owner)
    }

    /// Whether `spender` can manage `owner`'s `token_id` token.
    fn _is_authorized(
        &self,
        owner: Address,
        spender: Address,
        token_id: U256,
    ) -> bool {
        !spender.is_zero()
            && (owner == spender
                || self.is_approved_for_all(owner, spender)
                || self._token_approvals.get(token_id) == spender)
    }

    /// Checks that `spender` can manage `owner`'s `token_id` token.
    ///
    /// # Errors
    ///
    /// * [`Error::NonexistentToken`] - If the token does not exist.
    /// * [`Error::InsufficientApproval`] - If `spender` has no approval.
    fn _check_authorized(
        &self,
        owner: Address,
        spender: Address,
        token_id: U256,
    ) -> Result<(), Error> {
        if self._is_authorized(owner, spender, token_id) {
            return Ok(());
        }
        if owner.is_zero() {
            Err(Error::NonexistentToken(ERC721NonexistentToken { token_id }))
        } else {
            Err(Error::InsufficientApproval(ERC721InsufficientApproval {
                operator: spender,
                token_id,
            }))
        }
    }

    /// Transfers `token_id` from its current owner to `to`, or mints (or
    /// burns) if the current owner (or `to`) is the zero address. Returns
    /// the previous owner.
    ///
    /// The `auth` argument is optional. If non-zero, it checks that
    /// `auth` is either the owner of the token, or approved to operate on
    /// it.
    ///
    /// # Errors
    ///
    /// * [`Error::NonexistentToken`] or [`Error::InsufficientApproval`] -
    ///   If `auth` fails the authorization check.
    ///
    /// # Events
    ///
    /// * [`Transfer`]
    fn _update(
        &mut self,
        to: Address,
        token_id: U256,
        auth: Address,
    ) -> Result<Address, Error> {
        let from = self._owner_of(token_id);

        if !auth.is_zero() {
            self._check_authorized(from, auth, token_id)?;
        }

        if !from.is_zero() {
            // Clear the approval for the departing owner.
            self._token_approvals.setter(token_id).set(Address::ZERO);
            self._balances.setter(from).sub_assign_unchecked(uint!(1_U256));
        }
        if !to.is_zero() {
            self._balances.setter(to).add_assign_checked(
                uint!(1_U256),
                "should not exceed `U256::MAX` for balance",
            );
        }

        self._owners.setter(token_id).set(to);
        evm::log(Transfer { from, to, token_id });
        Ok(from)
    }

    /// Mints `token_id` to `to`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidReceiver`] - If `to` is `Address::ZERO`.
    /// * [`Error::InvalidSender`] - If the token already exists.
    ///
    /// # Events
    ///
    /// * [`Transfer`]
    pub fn _mint(&mut self, to: Address, token_id: U256) -> Result<(), Error> {
        if to.is_zero() {
            return Err(Error::InvalidReceiver(ERC721InvalidReceiver {
                receiver: Address::ZERO,
            }));
        }

        let previous_owner = self._update(to, token_id, Address::ZERO)?;
        if !previous_owner.is_zero() {
            return Err(Error::InvalidSender(ERC721InvalidSender {
                sender: Address::ZERO,
            }));
        }
        Ok(())
    }

    /// Approves `to` to operate on `token_id`.
    ///
    /// The `auth` argument is optional. If non-zero, it checks that
    /// `auth` is either the owner of the token, or approved to operate on
    /// all of its tokens.
    ///
    /// # Errors
    ///
    /// * [`Error::NonexistentToken`] - If the token does not exist and
    ///   `auth` is non-zero.
    /// * [`Error::InvalidApprover`] - If `auth` has no approval power.
    fn _approve(
        &mut self,
        to: Address,
        token_id: U256,
        auth: Address,
        emit_event: bool,
    ) -> Result<(), Error> {
        if emit_event || !auth.is_zero() {
            let owner = self._require_owned(token_id)?;

            if !auth.is_zero()
                && owner != auth
                && !self.is_approved_for_all(owner, auth)
            {
                return Err(Error::InvalidApprover(ERC721InvalidApprover {
                    approver: auth,
                }));
            }

            if emit_event {
                evm::log(Approval { owner, approved: to, token_id });
            }
        }

        self._token_approvals.setter(token_id).set(to);
        Ok(())
    }

    /// Approves or removes `operator` for all tokens owned by `owner`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidOperator`] - If `operator` is `Address::ZERO`.
    ///
    /// # Events
    ///
    /// * [`ApprovalForAll`]
    fn _set_approval_for_all(
        &mut self,
        owner: Address,
        operator: Address,
        approved: bool,
    ) -> Result<(), Error> {
        if operator.is_zero() {
            return Err(Error::InvalidOperator(ERC721InvalidOperator {
                operator: Address::ZERO,
            }));
        }

        self._operator_approvals.setter(owner).insert(operator, approved);
        evm::log(ApprovalForAll { owner, operator, approved });
        Ok(())
    }

    /// Calls `onERC721Received` on `to`, if `to` is a contract, and checks
    /// the returned acceptance magic value.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidReceiver`] - If the receiver refuses the token or
    ///   reverts without a reason.
    /// * [`Error::InvalidReceiverWithReason`] - If the receiver reverts
    ///   with a reason.
    fn _check_on_erc721_received(
        &mut self,
        operator: Address,
        from: Address,
        to: Address,
        token_id: U256,
        data: &Bytes,
    ) -> Result<(), Error> {
        if !to.has_code() {
            return Ok(());
        }

        let calldata = IERC721Receiver::onERC721ReceivedCall {
            operator,
            from,
            token_id,
            data: data.to_vec().into(),
        }
        .abi_encode();

        let returned = match installer::invoke_write(to, U256::ZERO, &calldata)
        {
            Ok(returned) => returned,
            Err(installer::Error::HookReverted(e)) => {
                // Non-IERC721Receiver implementer.
                return Err(Error::InvalidReceiverWithReason(e));
            }
            Err(_) => {
                return Err(Error::InvalidReceiver(ERC721InvalidReceiver {
                    receiver: to,
                }));
            }
        };

        let decoded = IERC721Receiver::onERC721ReceivedCall::abi_decode_returns(
            &returned, true,
        )
        .map_err(|_| {
            Error::InvalidReceiver(ERC721InvalidReceiver { receiver: to })
        })?;

        // Token rejected.
        if decoded._0 != RECEIVER_FN_SELECTOR {
            return Err(Error::InvalidReceiver(ERC721InvalidReceiver {
                receiver: to,
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
        quantity: U256,
        data: &Bytes,
    ) -> Result<U256, Error> {
        let Some(hook) = self.hooks.resolve(HookType::BeforeMint) else {
            return Err(ERC721CoreMintDisabled {}.into());
        };
        let calldata = IErc721Hook::beforeMintCall {
            to,
            quantity,
            data: data.to_vec().into(),
        }
        .abi_encode();
        let returned = installer::invoke_write(hook, msg::value(), &calldata)?;
        let decoded =
            IErc721Hook::beforeMintCall::abi_decode_returns(&returned, true)
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
        token_id: U256,
    ) -> Result<(), Error> {
        if let Some(hook) = self.hooks.resolve(HookType::BeforeTransfer) {
            let calldata =
                IErc721Hook::beforeTransferCall { from, to, token_id }
                    .abi_encode();
            installer::invoke_write(hook, U256::ZERO, &calldata)?;
        }
        Ok(())
    }

    /// Consults the before-burn hook, when one is installed.
    fn dispatch_before_burn(
        &mut self,
        from: Address,
        token_id: U256,
        data: &Bytes,
    ) -> Result<(), Error> {
        if let Some(hook) = self.hooks.resolve(HookType::BeforeBurn) {
            let calldata = IErc721Hook::beforeBurnCall {
                from,
                token_id,
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
        approved: Address,
        token_id: U256,
    ) -> Result<(), Error> {
        if let Some(hook) = self.hooks.resolve(HookType::BeforeApprove) {
            let calldata =
                IErc721Hook::beforeApproveCall { owner, approved, token_id }
                    .abi_encode();
            installer::invoke_write(hook, U256::ZERO, &calldata)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::String, vec, vec::Vec};

    use alloy_primitives::{uint, Address, FixedBytes, U256};
    use motsu::prelude::*;
    use stylus_sdk::{
        abi::Bytes,
        prelude::*,
        storage::{StorageAddress, StorageBool, StorageU256},
    };

    use super::{Erc721Core, Error, RECEIVER_FN_SELECTOR};
    use crate::{
        access::permissions::Permissions,
        hooks::{installer, HookType},
    };

    impl Erc721Core {
        fn grant_admin(&mut self, account: Address) {
            self.permissions._set_role(account, Permissions::ADMIN_ROLE);
        }
    }

    /// Authorizes minting up to a configurable quantity per call.
    #[storage]
    struct NftMintHook {
        cap: StorageU256,
    }

    unsafe impl TopLevelStorage for NftMintHook {}

    #[public]
    impl NftMintHook {
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
            quantity: U256,
            _data: Bytes,
        ) -> U256 {
            let cap = self.cap.get();
            if quantity > cap {
                cap
            } else {
                quantity
            }
        }
    }

    /// Serves token URIs and royalties for the metadata flags.
    #[storage]
    struct MetadataHook {
        royalty_receiver: StorageAddress,
    }

    unsafe impl TopLevelStorage for MetadataHook {}

    #[public]
    impl MetadataHook {
        fn hook_flags(&self) -> U256 {
            HookType::TokenUri.flag() | HookType::Royalty.flag()
        }

        fn set_royalty_receiver(&mut self, receiver: Address) {
            self.royalty_receiver.set(receiver);
        }

        #[selector(name = "tokenURI")]
        fn token_uri(&self, token_id: U256) -> String {
            format!("ipfs://collection/{token_id}")
        }

        fn royalty_info(
            &self,
            _token_id: U256,
            sale_price: U256,
        ) -> (Address, U256) {
            (self.royalty_receiver.get(), sale_price / uint!(10_U256))
        }
    }

    /// Advisory hook that can be toggled to reject transfers.
    #[storage]
    struct TransferGuard {
        blocked: StorageBool,
    }

    unsafe impl TopLevelStorage for TransferGuard {}

    #[public]
    impl TransferGuard {
        fn hook_flags(&self) -> U256 {
            HookType::BeforeTransfer.flag()
        }

        fn set_blocked(&mut self, blocked: bool) {
            self.blocked.set(blocked);
        }

        fn before_transfer(
            &self,
            _from: Address,
            _to: Address,
            _token_id: U256,
        ) -> Result<(), Vec<u8>> {
            if self.blocked.get() {
                Err(b"transfer frozen".to_vec())
            } else {
                Ok(())
            }
        }
    }

    /// Receiver with selectable behavior: accept, reject, or revert.
    #[storage]
    struct ReceiverMock {
        mode: StorageU256,
    }

    unsafe impl TopLevelStorage for ReceiverMock {}

    #[public]
    impl ReceiverMock {
        fn set_mode(&mut self, mode: U256) {
            self.mode.set(mode);
        }

        #[selector(name = "onERC721Received")]
        fn on_erc721_received(
            &mut self,
            _operator: Address,
            _from: Address,
            _token_id: U256,
            _data: Bytes,
        ) -> Result<FixedBytes<4>, Vec<u8>> {
            match self.mode.get().to::<u64>() {
                0 => Ok(RECEIVER_FN_SELECTOR.into()),
                1 => Ok(FixedBytes::from([0xde, 0xad, 0xbe, 0xef])),
                _ => Err(b"nft rejected".to_vec()),
            }
        }
    }

    fn setup_minting(
        token: &Contract<Erc721Core>,
        gate: &Contract<NftMintHook>,
        admin: Address,
    ) {
        gate.sender(admin).set_cap(uint!(100_U256));
        token.sender(admin).grant_admin(admin);
        token.sender(admin).install_hook(gate.address()).motsu_unwrap();
    }

    fn mint(token: &Contract<Erc721Core>, to: Address, quantity: u64) {
        token
            .sender(to)
            .mint(to, U256::from(quantity), vec![].into())
            .motsu_unwrap();
    }

    #[motsu::test]
    fn mint_is_disabled_without_hook(
        token: Contract<Erc721Core>,
        alice: Address,
    ) {
        let err = token
            .sender(alice)
            .mint(alice, uint!(1_U256), vec![].into())
            .motsu_unwrap_err();
        assert!(matches!(err, Error::MintDisabled(_)));
    }

    #[motsu::test]
    fn mints_sequential_ids(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        alice: Address,
        bob: Address,
    ) {
        setup_minting(&token, &gate, alice);

        mint(&token, alice, 3);
        for token_id in 0_u64..3 {
            assert_eq!(
                alice,
                token
                    .sender(alice)
                    .owner_of(U256::from(token_id))
                    .motsu_unwrap()
            );
        }
        assert_eq!(
            uint!(3_U256),
            token.sender(alice).balance_of(alice).motsu_unwrap()
        );
        assert_eq!(uint!(3_U256), token.sender(alice).next_token_id());

        // A second mint continues from the counter.
        mint(&token, bob, 2);
        assert_eq!(
            bob,
            token.sender(alice).owner_of(uint!(3_U256)).motsu_unwrap()
        );
        assert_eq!(
            bob,
            token.sender(alice).owner_of(uint!(4_U256)).motsu_unwrap()
        );
    }

    #[motsu::test]
    fn mint_quantity_capped_by_hook(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        alice: Address,
    ) {
        setup_minting(&token, &gate, alice);
        gate.sender(alice).set_cap(uint!(5_U256));

        token
            .sender(alice)
            .mint(alice, uint!(9_U256), vec![].into())
            .motsu_unwrap();
        assert_eq!(
            uint!(5_U256),
            token.sender(alice).balance_of(alice).motsu_unwrap()
        );
        assert_eq!(uint!(5_U256), token.sender(alice).next_token_id());
    }

    #[motsu::test]
    fn transfer_moves_ownership(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        alice: Address,
        bob: Address,
    ) {
        setup_minting(&token, &gate, alice);
        mint(&token, alice, 1);

        token
            .sender(alice)
            .transfer_from(alice, bob, U256::ZERO)
            .motsu_unwrap();
        assert_eq!(
            bob,
            token.sender(alice).owner_of(U256::ZERO).motsu_unwrap()
        );
        assert_eq!(
            U256::ZERO,
            token.sender(alice).balance_of(alice).motsu_unwrap()
        );
        assert_eq!(
            uint!(1_U256),
            token.sender(alice).balance_of(bob).motsu_unwrap()
        );
    }

    #[motsu::test]
    fn transfer_clears_token_approval(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        alice: Address,
        bob: Address,
        charlie: Address,
    ) {
        setup_minting(&token, &gate, alice);
        mint(&token, alice, 1);

        token.sender(alice).approve(charlie, U256::ZERO).motsu_unwrap();
        assert_eq!(
            charlie,
            token.sender(alice).get_approved(U256::ZERO).motsu_unwrap()
        );

        token
            .sender(alice)
            .transfer_from(alice, bob, U256::ZERO)
            .motsu_unwrap();
        assert_eq!(
            Address::ZERO,
            token.sender(alice).get_approved(U256::ZERO).motsu_unwrap()
        );
    }

    #[motsu::test]
    fn transfer_with_wrong_from_fails(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        alice: Address,
        bob: Address,
    ) {
        setup_minting(&token, &gate, alice);
        mint(&token, alice, 1);

        let err = token
            .sender(alice)
            .transfer_from(bob, alice, U256::ZERO)
            .motsu_unwrap_err();
        assert!(matches!(err, Error::IncorrectOwner(_)));
    }

    #[motsu::test]
    fn transfer_requires_authorization(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        alice: Address,
        bob: Address,
    ) {
        setup_minting(&token, &gate, alice);
        mint(&token, alice, 1);

        let err = token
            .sender(bob)
            .transfer_from(alice, bob, U256::ZERO)
            .motsu_unwrap_err();
        assert!(matches!(err, Error::InsufficientApproval(_)));
    }

    #[motsu::test]
    fn approved_account_can_transfer(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        alice: Address,
        bob: Address,
    ) {
        setup_minting(&token, &gate, alice);
        mint(&token, alice, 1);

        token.sender(alice).approve(bob, U256::ZERO).motsu_unwrap();
        token
            .sender(bob)
            .transfer_from(alice, bob, U256::ZERO)
            .motsu_unwrap();
        assert_eq!(
            bob,
            token.sender(alice).owner_of(U256::ZERO).motsu_unwrap()
        );
    }

    #[motsu::test]
    fn operator_can_transfer(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        alice: Address,
        bob: Address,
    ) {
        setup_minting(&token, &gate, alice);
        mint(&token, alice, 1);

        token.sender(alice).set_approval_for_all(bob, true).motsu_unwrap();
        assert!(token.sender(alice).is_approved_for_all(alice, bob));

        token
            .sender(bob)
            .transfer_from(alice, bob, U256::ZERO)
            .motsu_unwrap();
        assert_eq!(
            bob,
            token.sender(alice).owner_of(U256::ZERO).motsu_unwrap()
        );
    }

    #[motsu::test]
    fn approve_requires_owner_or_operator(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        alice: Address,
        bob: Address,
    ) {
        setup_minting(&token, &gate, alice);
        mint(&token, alice, 1);

        let err = token
            .sender(bob)
            .approve(bob, U256::ZERO)
            .motsu_unwrap_err();
        assert!(matches!(err, Error::InvalidApprover(_)));
    }

    #[motsu::test]
    fn queries_on_nonexistent_tokens_fail(
        token: Contract<Erc721Core>,
        alice: Address,
    ) {
        let err =
            token.sender(alice).owner_of(uint!(7_U256)).motsu_unwrap_err();
        assert!(matches!(err, Error::NonexistentToken(_)));

        let err = token
            .sender(alice)
            .get_approved(uint!(7_U256))
            .motsu_unwrap_err();
        assert!(matches!(err, Error::NonexistentToken(_)));

        let err =
            token.sender(alice).balance_of(Address::ZERO).motsu_unwrap_err();
        assert!(matches!(err, Error::InvalidOwner(_)));
    }

    #[motsu::test]
    fn safe_transfer_to_accepting_receiver(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        receiver: Contract<ReceiverMock>,
        alice: Address,
    ) {
        setup_minting(&token, &gate, alice);
        mint(&token, alice, 1);

        token
            .sender(alice)
            .safe_transfer_from(alice, receiver.address(), U256::ZERO)
            .motsu_unwrap();
        assert_eq!(
            receiver.address(),
            token.sender(alice).owner_of(U256::ZERO).motsu_unwrap()
        );
    }

    #[motsu::test]
    fn safe_transfer_to_rejecting_receiver_fails(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        receiver: Contract<ReceiverMock>,
        alice: Address,
    ) {
        setup_minting(&token, &gate, alice);
        mint(&token, alice, 1);
        receiver.sender(alice).set_mode(uint!(1_U256));

        let err = token
            .sender(alice)
            .safe_transfer_from(alice, receiver.address(), U256::ZERO)
            .motsu_unwrap_err();
        assert!(matches!(err, Error::InvalidReceiver(_)));
    }

    #[motsu::test]
    fn safe_transfer_bubbles_receiver_reason(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        receiver: Contract<ReceiverMock>,
        alice: Address,
    ) {
        setup_minting(&token, &gate, alice);
        mint(&token, alice, 1);
        receiver.sender(alice).set_mode(uint!(2_U256));

        let err = token
            .sender(alice)
            .safe_transfer_from_with_data(
                alice,
                receiver.address(),
                U256::ZERO,
                vec![1, 2].into(),
            )
            .motsu_unwrap_err();
        assert!(matches!(err, Error::InvalidReceiverWithReason(_)));
        assert_eq!(b"nft rejected".to_vec(), Vec::<u8>::from(err));
    }

    #[motsu::test]
    fn safe_transfer_to_plain_account(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        alice: Address,
        bob: Address,
    ) {
        setup_minting(&token, &gate, alice);
        mint(&token, alice, 1);

        token
            .sender(alice)
            .safe_transfer_from(alice, bob, U256::ZERO)
            .motsu_unwrap();
        assert_eq!(
            bob,
            token.sender(alice).owner_of(U256::ZERO).motsu_unwrap()
        );
    }

    #[motsu::test]
    fn burn_destroys_token(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        alice: Address,
    ) {
        setup_minting(&token, &gate, alice);
        mint(&token, alice, 1);

        token.sender(alice).burn(U256::ZERO, vec![].into()).motsu_unwrap();
        let err =
            token.sender(alice).owner_of(U256::ZERO).motsu_unwrap_err();
        assert!(matches!(err, Error::NonexistentToken(_)));
        assert_eq!(
            U256::ZERO,
            token.sender(alice).balance_of(alice).motsu_unwrap()
        );
    }

    #[motsu::test]
    fn burn_requires_authorization(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        alice: Address,
        bob: Address,
    ) {
        setup_minting(&token, &gate, alice);
        mint(&token, alice, 1);

        let err = token
            .sender(bob)
            .burn(U256::ZERO, vec![].into())
            .motsu_unwrap_err();
        assert!(matches!(err, Error::InsufficientApproval(_)));
    }

    #[motsu::test]
    fn token_uri_resolves_through_hook(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        metadata: Contract<MetadataHook>,
        alice: Address,
    ) {
        setup_minting(&token, &gate, alice);
        token.sender(alice).install_hook(metadata.address()).motsu_unwrap();
        mint(&token, alice, 1);

        let uri = token.sender(alice).token_uri(U256::ZERO).motsu_unwrap();
        assert_eq!(String::from("ipfs://collection/0"), uri);
    }

    #[motsu::test]
    fn token_uri_requires_metadata_hook(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        alice: Address,
    ) {
        setup_minting(&token, &gate, alice);
        mint(&token, alice, 1);

        let err =
            token.sender(alice).token_uri(U256::ZERO).motsu_unwrap_err();
        assert!(matches!(
            err,
            Error::Hook(installer::Error::NoHookForFlag(_))
        ));

        // A token that does not exist fails earlier.
        let err =
            token.sender(alice).token_uri(uint!(9_U256)).motsu_unwrap_err();
        assert!(matches!(err, Error::NonexistentToken(_)));
    }

    #[motsu::test]
    fn royalty_info_resolves_through_hook(
        token: Contract<Erc721Core>,
        metadata: Contract<MetadataHook>,
        alice: Address,
        bob: Address,
    ) {
        token.sender(alice).grant_admin(alice);
        token.sender(alice).install_hook(metadata.address()).motsu_unwrap();
        metadata.sender(alice).set_royalty_receiver(bob);

        let (receiver, amount) = token
            .sender(alice)
            .royalty_info(U256::ZERO, uint!(1000_U256))
            .motsu_unwrap();
        assert_eq!(bob, receiver);
        assert_eq!(uint!(100_U256), amount);
    }

    #[motsu::test]
    fn guard_hook_gates_transfers(
        token: Contract<Erc721Core>,
        gate: Contract<NftMintHook>,
        guard: Contract<TransferGuard>,
        alice: Address,
        bob: Address,
    ) {
        setup_minting(&token, &gate, alice);
        token.sender(alice).install_hook(guard.address()).motsu_unwrap();
        mint(&token, alice, 1);

        guard.sender(alice).set_blocked(true);
        let err = token
            .sender(alice)
            .transfer_from(alice, bob, U256::ZERO)
            .motsu_unwrap_err();
        assert_eq!(b"transfer frozen".to_vec(), Vec::<u8>::from(err));
        assert_eq!(
            alice,
            token.sender(alice).owner_of(U256::ZERO).motsu_unwrap()
        );

        guard.sender(alice).set_blocked(false);
        token
            .sender(alice)
            .transfer_from(alice, bob, U256::ZERO)
            .motsu_unwrap();
    }

    #[motsu::test]
    fn introspection_reports_six_slots(
        token: Contract<Erc721Core>,
        metadata: Contract<MetadataHook>,
        alice: Address,
    ) {
        token.sender(alice).grant_admin(alice);
        token.sender(alice).install_hook(metadata.address()).motsu_unwrap();

        let all = token.sender(alice).get_all_hooks();
        assert_eq!(6, all.len());
        assert_eq!(metadata.address(), all[4]);
        assert_eq!(metadata.address(), all[5]);
        assert_eq!(
            HookType::TokenUri.flag() | HookType::Royalty.flag(),
            token.sender(alice).active_hooks()
        );
    }
}
