//! Route guard: protected views render only for a resolved, signed-in session.

use crate::session::SessionState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Reservations,
    Expenses,
}

impl Route {
    /// Routes reachable from the navigation bar.
    pub const NAV: [Route; 3] = [Self::Dashboard, Self::Reservations, Self::Expenses];

    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/",
            Self::Reservations => "/reservations",
            Self::Expenses => "/expenses",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Dashboard => "Dashboard",
            Self::Reservations => "Reservations",
            Self::Expenses => "Expenses",
        }
    }

    pub fn is_protected(self) -> bool {
        !matches!(self, Self::Login)
    }
}

/// What the caller should show for a requested route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Guard {
    /// The initial session lookup is still running.
    Loading,
    Redirect(Route),
    Render(Route),
}

pub fn guard(route: Route, state: &SessionState) -> Guard {
    if state.loading {
        return Guard::Loading;
    }

    match (route.is_protected(), state.is_signed_in()) {
        (true, false) => Guard::Redirect(Route::Login),
        (false, true) => Guard::Redirect(Route::Dashboard),
        _ => Guard::Render(route),
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::provider::Principal;

    fn signed_in() -> SessionState {
        SessionState {
            principal: Some(Principal {
                id: Uuid::new_v4(),
                email: Some("host@example.com".to_string()),
                full_name: None,
            }),
            loading: false,
        }
    }

    fn signed_out() -> SessionState {
        SessionState {
            principal: None,
            loading: false,
        }
    }

    #[test]
    fn loading_wins_over_everything() {
        for route in [Route::Login, Route::Dashboard, Route::Expenses] {
            assert_eq!(guard(route, &SessionState::resolving()), Guard::Loading);
        }
    }

    #[test]
    fn protected_routes_redirect_to_login() {
        for route in Route::NAV {
            assert_eq!(guard(route, &signed_out()), Guard::Redirect(Route::Login));
        }
        assert_eq!(
            guard(Route::Login, &signed_out()),
            Guard::Render(Route::Login)
        );
    }

    #[test]
    fn signed_in_user_leaves_login() {
        assert_eq!(
            guard(Route::Login, &signed_in()),
            Guard::Redirect(Route::Dashboard)
        );
        assert_eq!(
            guard(Route::Reservations, &signed_in()),
            Guard::Render(Route::Reservations)
        );
    }
}
