//! Credential-shielding status proxy.
//!
//! Holds the upstream application secret, exchanges it for an app token, and
//! answers `GET /status?streamers=a,b,c` with one normalized status record per
//! requested channel.

pub mod error;
pub mod helix;
pub mod server;
pub mod token;

pub use error::ProxyError;
pub use server::{router, start_server, AppState};
