//! Thin clients for the third-party HTTP APIs this layer proxies to.
//!
//! Single-shot calls, explicit per-request timeouts, no retries anywhere:
//! a failed upstream call surfaces immediately as an error response.

mod creem;
mod openrouter;
mod supabase;

pub use creem::CreemClient;
pub use openrouter::OpenRouterClient;
pub use supabase::{AuthSession, SupabaseAuthClient};
