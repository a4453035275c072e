//! Registry binding lifecycle extension points to externally deployed hook
//! contracts, plus the dispatch gateway that forwards calls to them.
//!
//! A token contract embeds a [`HookInstaller`] and implements [`HookHost`]
//! for it. Installing a hook contract binds every lifecycle flag the hook
//! declares through its [`IHook`] capability query; at most one
//! implementation can own a flag at a time, and a hook is either fully
//! installed or not installed at all. Swapping the implementation of a flag
//! requires uninstalling the current owner first.
//!
//! Dispatch forwards raw calldata to the implementation bound to a flag and
//! returns the callee's bytes untouched. Revert data in particular is
//! bubbled byte-for-byte, so a caller debugging a failing hook sees the
//! hook's own error rather than a generic wrapper.

use alloc::{vec, vec::Vec};

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
pub use sol::*;
use stylus_sdk::{
    call::{self, MethodError, RawCall},
    evm, msg,
    prelude::*,
    storage::{StorageAddress, StorageBool, StorageMap, StorageU256},
    ArbResult,
};

use crate::hooks::flags::HookType;

#[cfg_attr(coverage_nightly, coverage(off))]
mod sol {
    use alloy_sol_macro::sol;

    sol! {
        /// Emitted when `hook` is installed.
        ///
        /// `hook_flags` is the bitmask of lifecycle flags actually bound to
        /// the hook, which together with [`HooksUninstalled`] is enough to
        /// reconstruct the registry state by replaying events.
        #[allow(missing_docs)]
        event HooksInstalled(address indexed hook, uint256 hook_flags);

        /// Emitted when `hook` is uninstalled, clearing the `hook_flags`
        /// bitmask it was granted at install time.
        #[allow(missing_docs)]
        event HooksUninstalled(address indexed hook, uint256 hook_flags);
    }

    sol! {
        /// The caller lacks the capability required for the operation.
        ///
        /// * `caller` - Account that attempted the operation.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error HookInstallerUnauthorizedCaller(address caller);

        /// The flag is not a lifecycle point this contract dispatches.
        ///
        /// * `flag` - The rejected flag value.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error HookInstallerInvalidFlag(uint256 flag);

        /// The hook is already installed, or declares a flag that is
        /// already bound to an installed implementation.
        ///
        /// * `hook` - Address of the offending hook contract.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error HookInstallerHookAlreadyInstalled(address hook);

        /// The hook is not a member of the installed set.
        ///
        /// * `hook` - Address of the unknown hook contract.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error HookInstallerHookNotInstalled(address hook);

        /// No implementation is installed for the flag being dispatched.
        ///
        /// * `flag` - The unresolvable flag value.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error HookInstallerNoHookForFlag(uint256 flag);

        /// The declared call value does not match the value attached to
        /// the call.
        ///
        /// * `declared` - Value the caller claimed to forward.
        /// * `actual` - Value actually attached to the call.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error HookInstallerValueMismatch(uint256 declared, uint256 actual);

        /// A forwarded call failed without a revert reason, or returned
        /// data the caller could not decode.
        ///
        /// * `hook` - Address of the callee.
        #[derive(Debug)]
        #[allow(missing_docs)]
        error HookInstallerCallFailed(address hook);
    }
}

pub use capability::IHook;
mod capability {
    #![allow(missing_docs)]
    #![cfg_attr(coverage_nightly, coverage(off))]
    alloy_sol_types::sol! {
        /// Capability declaration every installable hook contract exposes.
        interface IHook {
            /// Bitmask of the lifecycle flags this hook implements.
            function hookFlags() external view returns (uint256);
        }
    }
}

/// An error reported by the hook registry or surfaced from a forwarded
/// hook call.
#[derive(SolidityError, Debug)]
pub enum Error {
    /// The caller lacks the capability required for the operation.
    UnauthorizedCaller(HookInstallerUnauthorizedCaller),
    /// The flag is not a lifecycle point this contract dispatches.
    InvalidFlag(HookInstallerInvalidFlag),
    /// The hook, or a flag it declares, is already installed.
    AlreadyInstalled(HookInstallerHookAlreadyInstalled),
    /// The hook is not a member of the installed set.
    NotInstalled(HookInstallerHookNotInstalled),
    /// No implementation is installed for the flag being dispatched.
    NoHookForFlag(HookInstallerNoHookForFlag),
    /// The declared call value does not match the attached value.
    ValueMismatch(HookInstallerValueMismatch),
    /// A forwarded call failed without a revert reason.
    CallFailed(HookInstallerCallFailed),
    /// A forwarded call reverted with a reason.
    ///
    /// Encoding [`stylus_sdk::call::Error`] returns the underlying revert
    /// data, so the hook's original error reaches the caller unchanged.
    HookReverted(call::Error),
}

impl MethodError for Error {
    fn encode(self) -> alloc::vec::Vec<u8> {
        self.into()
    }
}

/// State of the hook registry embedded in a token contract.
#[storage]
pub struct HookInstaller {
    /// Bitmask of flags with an installed implementation.
    active: StorageU256,
    /// Maps a flag value to the implementation bound to it.
    implementations: StorageMap<U256, StorageAddress>,
    /// Membership set of installed hook addresses.
    installed: StorageMap<Address, StorageBool>,
    /// Flags granted to each installed hook at install time. Uninstalling
    /// works from this snapshot, so a hook changing its declaration after
    /// install cannot desynchronize the registry.
    granted: StorageMap<Address, StorageU256>,
}

impl HookInstaller {
    /// Returns the implementation bound to `hook_type`, or `Address::ZERO`
    /// if the flag is unbound.
    #[must_use]
    pub fn implementation(&self, hook_type: HookType) -> Address {
        self.implementations.get(hook_type.flag())
    }

    /// Returns the implementation bound to `hook_type`, or `None` if the
    /// flag is unbound.
    #[must_use]
    pub fn resolve(&self, hook_type: HookType) -> Option<Address> {
        let hook = self.implementation(hook_type);
        (!hook.is_zero()).then_some(hook)
    }

    /// Bitmask of flags with an installed implementation.
    #[must_use]
    pub fn active_hooks(&self) -> U256 {
        self.active.get()
    }

    /// Whether `hook` is a member of the installed set.
    #[must_use]
    pub fn is_installed(&self, hook: Address) -> bool {
        self.installed.get(hook)
    }

    /// The flags granted to `hook` when it was installed.
    #[must_use]
    pub fn granted_flags(&self, hook: Address) -> U256 {
        self.granted.get(hook)
    }

    fn bind(&mut self, hook_type: HookType, hook: Address) {
        self.implementations.setter(hook_type.flag()).set(hook);
        let active = self.active.get();
        self.active.set(active | hook_type.flag());
    }

    fn unbind(&mut self, hook_type: HookType) {
        self.implementations.setter(hook_type.flag()).set(Address::ZERO);
        let active = self.active.get();
        self.active.set(active & !hook_type.flag());
    }

    fn record_membership(&mut self, hook: Address, granted: U256) {
        self.installed.insert(hook, true);
        self.granted.insert(hook, granted);
    }

    fn clear_membership(&mut self, hook: Address) {
        self.installed.insert(hook, false);
        self.granted.insert(hook, U256::ZERO);
    }
}

/// A contract hosting a hook registry.
///
/// Implementors provide access to the registry state and the two capability
/// checks; the provided methods implement the install, uninstall and
/// dispatch protocol. The capability checks are trusted completely and no
/// further authorization logic is applied.
pub trait HookHost {
    /// The highest lifecycle point this contract dispatches. Flags above
    /// this bound are rejected and never bound to an implementation.
    const LAST_HOOK: HookType;

    /// Read access to the registry state.
    fn installer(&self) -> &HookInstaller;

    /// Write access to the registry state.
    fn installer_mut(&mut self) -> &mut HookInstaller;

    /// Whether `account` may install and uninstall hooks.
    fn can_update_hooks(&self, account: Address) -> bool;

    /// Whether `account` may call the generic write gateway.
    fn can_call_hooks(&self, account: Address) -> bool;

    /// Parses `flag` and checks it against this contract's dispatchable
    /// set.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidFlag`] - If `flag` is not the flag value of a
    ///   hook type at most [`HookHost::LAST_HOOK`].
    fn checked_flag(flag: U256) -> Result<HookType, Error> {
        match HookType::from_flag(flag) {
            Some(hook_type) if hook_type <= Self::LAST_HOOK => Ok(hook_type),
            _ => Err(HookInstallerInvalidFlag { flag }.into()),
        }
    }

    /// Installs `hook`, binding every in-bound lifecycle flag it declares.
    ///
    /// The hook's declaration is obtained with a single static call to its
    /// [`IHook`] capability query before any state is written. The sweep
    /// over declared flags runs from the highest flag down to the lowest
    /// and validates in full before the first write, so a conflicting
    /// install leaves the registry untouched. Declared flags above
    /// [`HookHost::LAST_HOOK`] are ignored.
    ///
    /// # Errors
    ///
    /// * [`Error::UnauthorizedCaller`] - If the caller fails
    ///   [`HookHost::can_update_hooks`].
    /// * [`Error::AlreadyInstalled`] - If `hook` is already a member of the
    ///   installed set, or declares a flag that is already bound.
    /// * [`Error::CallFailed`] or [`Error::HookReverted`] - If the
    ///   capability query fails.
    ///
    /// # Events
    ///
    /// * [`HooksInstalled`] - With the bitmask of flags actually bound.
    fn install_hook(&mut self, hook: Address) -> Result<(), Error> {
        let caller = msg::sender();
        if !self.can_update_hooks(caller) {
            return Err(HookInstallerUnauthorizedCaller { caller }.into());
        }
        if self.installer().is_installed(hook) {
            return Err(HookInstallerHookAlreadyInstalled { hook }.into());
        }

        let declared = query_declared_flags(hook)?;

        // Check the whole sweep for conflicts before binding anything.
        for hook_type in HookType::ALL.iter().rev().copied() {
            if hook_type > Self::LAST_HOOK || !hook_type.in_mask(declared) {
                continue;
            }
            if !self.installer().implementation(hook_type).is_zero() {
                return Err(
                    HookInstallerHookAlreadyInstalled { hook }.into()
                );
            }
        }

        let mut granted = U256::ZERO;
        let installer = self.installer_mut();
        for hook_type in HookType::ALL.iter().rev().copied() {
            if hook_type > Self::LAST_HOOK || !hook_type.in_mask(declared) {
                continue;
            }
            installer.bind(hook_type, hook);
            granted |= hook_type.flag();
        }
        // Membership is recorded last, after the flag map is consistent.
        installer.record_membership(hook, granted);

        evm::log(HooksInstalled { hook, hook_flags: granted });
        Ok(())
    }

    /// Uninstalls `hook`, clearing every flag granted at install time.
    ///
    /// Works entirely from the granted-flags snapshot recorded by
    /// [`HookHost::install_hook`]; no call is made into the hook. Clearing
    /// a flag that is already unbound is a no-op.
    ///
    /// # Errors
    ///
    /// * [`Error::UnauthorizedCaller`] - If the caller fails
    ///   [`HookHost::can_update_hooks`].
    /// * [`Error::NotInstalled`] - If `hook` is not a member of the
    ///   installed set.
    ///
    /// # Events
    ///
    /// * [`HooksUninstalled`] - With the bitmask of flags cleared.
    fn uninstall_hook(&mut self, hook: Address) -> Result<(), Error> {
        let caller = msg::sender();
        if !self.can_update_hooks(caller) {
            return Err(HookInstallerUnauthorizedCaller { caller }.into());
        }
        if !self.installer().is_installed(hook) {
            return Err(HookInstallerHookNotInstalled { hook }.into());
        }

        let granted = self.installer().granted_flags(hook);
        let installer = self.installer_mut();
        for hook_type in HookType::ALL.iter().rev().copied() {
            if hook_type > Self::LAST_HOOK || !hook_type.in_mask(granted) {
                continue;
            }
            installer.unbind(hook_type);
        }
        installer.clear_membership(hook);

        evm::log(HooksUninstalled { hook, hook_flags: granted });
        Ok(())
    }

    /// Looks up the implementation installed for `flag`.
    ///
    /// Returns `Address::ZERO` for a valid flag with no implementation.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidFlag`] - If `flag` is outside the dispatchable
    ///   set.
    fn hook_implementation(&self, flag: U256) -> Result<Address, Error> {
        Ok(self.installer().implementation(Self::checked_flag(flag)?))
    }

    /// Snapshot of the implementation of every dispatchable flag, ordered
    /// from the lowest flag to the highest. Unbound flags report
    /// `Address::ZERO`.
    fn all_hooks(&self) -> Vec<Address> {
        HookType::ALL
            .iter()
            .copied()
            .filter(|hook_type| *hook_type <= Self::LAST_HOOK)
            .map(|hook_type| self.installer().implementation(hook_type))
            .collect()
    }

    /// Forwards `data` to the implementation installed for `flag` as a
    /// read-only call, returning the callee's raw return data.
    ///
    /// Open to any caller; installed hooks choose what they expose.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidFlag`] - If `flag` is outside the dispatchable
    ///   set.
    /// * [`Error::NoHookForFlag`] - If no implementation is installed.
    /// * [`Error::HookReverted`] or [`Error::CallFailed`] - If the callee
    ///   reverts; reasoned reverts are bubbled unchanged.
    fn hook_read(&self, flag: U256, data: &[u8]) -> Result<Vec<u8>, Error> {
        let hook_type = Self::checked_flag(flag)?;
        let hook = self
            .installer()
            .resolve(hook_type)
            .ok_or(HookInstallerNoHookForFlag { flag })?;
        invoke_read(hook, data)
    }

    /// Forwards `data` to the implementation installed for `flag`,
    /// attaching `value`, and returns the callee's raw return data.
    ///
    /// # Errors
    ///
    /// * [`Error::UnauthorizedCaller`] - If the caller fails
    ///   [`HookHost::can_call_hooks`].
    /// * [`Error::InvalidFlag`] - If `flag` is outside the dispatchable
    ///   set.
    /// * [`Error::ValueMismatch`] - If `value` differs from the value
    ///   attached to the call; checked before any forwarding.
    /// * [`Error::NoHookForFlag`] - If no implementation is installed.
    /// * [`Error::HookReverted`] or [`Error::CallFailed`] - If the callee
    ///   reverts; reasoned reverts are bubbled unchanged.
    fn hook_write(
        &mut self,
        flag: U256,
        value: U256,
        data: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let caller = msg::sender();
        if !self.can_call_hooks(caller) {
            return Err(HookInstallerUnauthorizedCaller { caller }.into());
        }
        let hook_type = Self::checked_flag(flag)?;
        if msg::value() != value {
            return Err(HookInstallerValueMismatch {
                declared: value,
                actual: msg::value(),
            }
            .into());
        }
        let hook = self
            .installer()
            .resolve(hook_type)
            .ok_or(HookInstallerNoHookForFlag { flag })?;
        invoke_write(hook, value, data)
    }
}

/// Queries `hook` for the bitmask of lifecycle flags it implements.
fn query_declared_flags(hook: Address) -> Result<U256, Error> {
    let calldata = IHook::hookFlagsCall {}.abi_encode();
    let returned = invoke_read(hook, &calldata)?;
    let decoded = IHook::hookFlagsCall::abi_decode_returns(&returned, true)
        .map_err(|_| HookInstallerCallFailed { hook })?;
    Ok(decoded._0)
}

/// Forwards `calldata` to `hook` as a read-only call, returning the raw
/// return data and bubbling revert data untouched.
pub(crate) fn invoke_read(
    hook: Address,
    calldata: &[u8],
) -> Result<Vec<u8>, Error> {
    bubble(hook, raw_static_call(hook, calldata))
}

/// Forwards `calldata` to `hook`, attaching `value`, returning the raw
/// return data and bubbling revert data untouched.
pub(crate) fn invoke_write(
    hook: Address,
    value: U256,
    calldata: &[u8],
) -> Result<Vec<u8>, Error> {
    bubble(hook, raw_call(hook, value, calldata))
}

fn raw_static_call(hook: Address, calldata: &[u8]) -> ArbResult {
    #[cfg(feature = "reentrant")]
    unsafe {
        RawCall::new_static().flush_storage_cache().call(hook, calldata)
    }
    #[cfg(not(feature = "reentrant"))]
    unsafe {
        RawCall::new_static().call(hook, calldata)
    }
}

fn raw_call(hook: Address, value: U256, calldata: &[u8]) -> ArbResult {
    #[cfg(feature = "reentrant")]
    unsafe {
        RawCall::new_with_value(value)
            .flush_storage_cache()
            .call(hook, calldata)
    }
    #[cfg(not(feature = "reentrant"))]
    unsafe {
        RawCall::new_with_value(value).call(hook, calldata)
    }
}

fn bubble(hook: Address, result: ArbResult) -> Result<Vec<u8>, Error> {
    match result {
        Ok(data) => Ok(data),
        Err(revert) if revert.is_empty() => {
            Err(HookInstallerCallFailed { hook }.into())
        }
        Err(revert) => Err(Error::HookReverted(call::Error::Revert(revert))),
    }
}
