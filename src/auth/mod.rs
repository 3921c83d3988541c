//! Authentication state.
//!
//! # Data Flow
//! ```text
//! POST /api/login
//!     → rate_limit.rs (per-IP sliding window)
//!     → bcrypt verify against configured hash
//!     → session.rs (opaque token, 1h expiry, HttpOnly cookie)
//!
//! Authenticated request:
//!     → cookie token → session.rs lookup (lazy sweep of expired entries)
//! ```
//!
//! # Design Decisions
//! - Sessions live in process memory only; a restart logs everyone out
//! - Expired sessions are evicted lazily on lookup rather than by a
//!   background task
//! - The login limiter counts every attempt in the window, successful or not

pub mod rate_limit;
pub mod session;

pub use rate_limit::LoginRateLimiter;
pub use session::{SessionStore, SESSION_COOKIE, SESSION_TTL};
