//! Authentication and authorization.
//!
//! `session` resolves who is calling (optionally through `provider`), `roles`
//! answers what they may do, `gate` turns both into an allow/redirect decision
//! and `middleware` wires the gate into the router.

pub mod gate;
pub mod middleware;
pub mod provider;
pub mod roles;
pub mod session;

pub use gate::{AccessDecision, AccessGate, RoutePolicy};
pub use middleware::{AuthUser, access_gate};
pub use provider::AuthProviderClient;
pub use roles::{RoleLookup, RoleLookupState};
pub use session::{
    JwtSessionResolver, RemoteSessionResolver, SessionResolver, SessionResolverState, SessionUser,
};
