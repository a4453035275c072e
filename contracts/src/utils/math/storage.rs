//! Simple math operations missing in `stylus_sdk::storage`.
use alloy_primitives::{ruint::UintTryFrom, Uint};
use alloy_sol_types::sol_data::{IntBitCount, SupportedInt};
use stylus_sdk::storage::StorageUint;

/// Adds value and assigns the result to `self`, ignoring overflow.
pub(crate) trait AddAssignUnchecked<T> {
    /// Adds `rhs` and assigns the result to `self`, ignoring overflow.
    fn add_assign_unchecked(&mut self, rhs: T);
}

impl<T, const B: usize, const L: usize> AddAssignUnchecked<T>
    for StorageUint<B, L>
where
    Uint<B, L>: UintTryFrom<T>,
    IntBitCount<B>: SupportedInt,
{
    fn add_assign_unchecked(&mut self, rhs: T) {
        let new_balance = self.get() + Uint::<B, L>::from(rhs);
        self.set(new_balance);
    }
}

/// Adds value and assigns the result to `self`, panicking on overflow.
pub(crate) trait AddAssignChecked<T> {
    /// Adds `rhs` and assigns the result to `self`, panicking with `msg`
    /// on overflow.
    fn add_assign_checked(&mut self, rhs: T, msg: &str);
}

impl<T, const B: usize, const L: usize> AddAssignChecked<T>
    for StorageUint<B, L>
where
    Uint<B, L>: UintTryFrom<T>,
    IntBitCount<B>: SupportedInt,
{
    fn add_assign_checked(&mut self, rhs: T, msg: &str) {
        let new_balance =
            self.get().checked_add(Uint::<B, L>::from(rhs)).expect(msg);
        self.set(new_balance);
    }
}

/// Subtracts value and assigns the result to `self`, ignoring overflow.
pub(crate) trait SubAssignUnchecked<T> {
    /// Subtracts `rhs` and assigns the result to `self`, ignoring overflow.
    fn sub_assign_unchecked(&mut self, rhs: T);
}

impl<T, const B: usize, const L: usize> SubAssignUnchecked<T>
    for StorageUint<B, L>
where
    Uint<B, L>: UintTryFrom<T>,
    IntBitCount<B>: SupportedInt,
{
    fn sub_assign_unchecked(&mut self, rhs: T) {
        let new_balance = self.get() - Uint::<B, L>::from(rhs);
        self.set(new_balance);
    }
}
