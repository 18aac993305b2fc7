//! API handlers for the loan ledger backend

pub mod loan;

pub use loan::*;
