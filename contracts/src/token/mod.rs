//! Hook-extensible token cores.

pub mod erc1155;
pub mod erc20;
pub mod erc721;
