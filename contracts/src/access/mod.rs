//! Contract modules for authorization.

pub mod permissions;
