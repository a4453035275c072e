/*!
# Hook-extensible token cores for Stylus

A library of ERC-20, ERC-721 and ERC-1155 token contracts for [Arbitrum
Stylus](https://docs.arbitrum.io/stylus/stylus-gentle-introduction) whose
lifecycle behavior is pluggable at runtime. Each core keeps the standard
balance and ownership bookkeeping fixed and delegates policy (minting
rules, transfer restrictions, metadata, royalties) to independently
deployed hook contracts, installed and uninstalled through an embedded
registry.

The registry binds each lifecycle flag to at most one hook implementation,
installs and uninstalls atomically, and forwards generic reads and writes
to hooks while bubbling their revert data byte-for-byte.

## Usage

Embed a core in your contract and re-export the operations you want:

```rust,ignore
use hooked_tokens_stylus::token::erc20::Erc20Core;
use stylus_sdk::prelude::*;

#[storage]
#[entrypoint]
struct MyToken {
    #[borrow]
    core: Erc20Core,
}
```

Deploy a hook contract exposing `hookFlags()` and the entrypoints for the
flags it declares, then bind it with `installHook`. Minting stays disabled
until a before-mint hook is installed.
*/

#![allow(clippy::pub_underscore_fields, clippy::module_name_repetitions)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(rustdoc::broken_intra_doc_links)]
extern crate alloc;

pub mod access;
pub mod hooks;
pub mod token;
pub mod utils;
