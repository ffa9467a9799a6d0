//! Core library for Vestibule.
//!
//! Contains the maintenance status store, the cross-instance change bus, the
//! remote status source contract, the access gate, and the presence-only
//! session credential store. This crate depends on `vestibule-storage` for
//! the profile storage trait and knows nothing about HTTP routing or the
//! server process.

pub mod bus;
pub mod error;
pub mod gate;
pub mod session;
pub mod source;
pub mod status;
pub mod store;
