//! Route guarding.

use crate::error::Result;
use crate::storage::{KeyValueStore, VISITED_HOME_KEY};
use crate::store::AuthState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteKind {
    /// Login and signup screens.
    Public,
    /// Everything that needs a session.
    Protected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectHome,
    RedirectLogin,
}

/// Decide whether `route` may be shown for the current session.
///
/// The first protected navigation after sign-in lands on home once; the
/// marker is stored so later navigations go straight through.
pub fn guard_route(
    auth: &AuthState,
    storage: &dyn KeyValueStore,
    route: RouteKind,
) -> Result<RouteDecision> {
    let signed_in = auth.is_signed_in();

    Ok(match route {
        RouteKind::Public if signed_in => RouteDecision::RedirectHome,
        RouteKind::Public => RouteDecision::Allow,
        RouteKind::Protected if !signed_in => RouteDecision::RedirectLogin,
        RouteKind::Protected => {
            if storage.get(VISITED_HOME_KEY)?.as_deref() == Some("true") {
                RouteDecision::Allow
            } else {
                storage.set(VISITED_HOME_KEY, "true")?;
                RouteDecision::RedirectHome
            }
        }
    })
}
