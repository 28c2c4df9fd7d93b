//! Manual reconciliation of items the remote matcher left unmatched

pub mod downloads;
pub mod drag;
pub mod pairing;
pub mod session;

pub use downloads::*;
pub use drag::*;
pub use pairing::*;
pub use session::*;
