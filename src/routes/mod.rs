//! Routers, split by audience. Access control for all of them is applied once,
//! by the `access_gate` layer in `create_router`; the split only mirrors which
//! gate rule covers each group.

/// Anonymous-friendly pages: the blog, feeds, ads and affiliate redirects.
pub mod public;

/// Login, logout and registration. Signed-in users are bounced off the login
/// and register pages by the gate.
pub mod auth;

/// Mounted under `/account`. Any signed-in user.
pub mod account;

/// Mounted under `/admin`. Allowlisted emails or the `admin` role.
pub mod admin;
