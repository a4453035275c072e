//! Runtime-pluggable lifecycle hooks for token contracts.
//!
//! A token contract built on this module keeps its balance bookkeeping
//! fixed while delegating policy decisions to independently deployed hook
//! contracts. Each lifecycle point (minting, transfers, burns, approvals,
//! metadata, royalties) is a [`HookType`] flag; the embedded
//! [`HookInstaller`] registry maps every flag to at most one installed
//! implementation, and the [`HookHost`] trait supplies the install,
//! uninstall and dispatch protocol to the embedding contract.
//!
//! Hooks are shared infrastructure: one deployed hook contract can be
//! installed into any number of token contracts, each of which keeps its
//! own independent registry.

pub mod flags;
pub mod installer;

pub use flags::HookType;
pub use installer::{Error, HookHost, HookInstaller, IHook};
