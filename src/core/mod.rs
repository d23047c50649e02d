//! Token ledgers: the base token, the rebasing staked token, the
//! index-wrapped token, and external reserve tokens.

pub mod base_token;
pub mod reserve;
pub mod staked_token;
pub mod wrapped_token;

pub use base_token::BaseToken;
pub use reserve::{base_value, ReserveToken};
pub use staked_token::StakedToken;
pub use wrapped_token::WrappedToken;
