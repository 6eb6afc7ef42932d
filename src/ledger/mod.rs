//! Flat-file ledger mapping usernames to recorded sample paths

mod store;


pub use store::*;
