//! # Banana Core
//!
//! Core logic for Banana Studio: everything the HTTP layer does that is not
//! route plumbing.
//!
//! ```text
//! banana-core/src/
//! ├── origin.rs     # external base-URL resolution (proxies, previews, tunnels)
//! ├── generate/     # request normalization + response image extraction
//! ├── checkout.rs   # plan/cycle product map and readiness reporting
//! ├── upstream/     # OpenRouter / Creem / auth provider clients
//! ├── config.rs     # env-driven typed configuration, read once at startup
//! └── error.rs      # unified error type
//! ```

pub mod checkout;
pub mod config;
pub mod error;
pub mod generate;
pub mod http;
pub mod origin;
pub mod upstream;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use origin::{resolve_origin, OriginHints};
