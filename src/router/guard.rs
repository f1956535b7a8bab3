//! Before-each navigation guard.
//!
//! Evaluated in order:
//!
//! | target | authenticated | decision |
//! |---|---|---|
//! | requires auth | no | redirect to login, `redirect` = target full path |
//! | login/register | yes | redirect to dashboard |
//! | anything else | either | allow |

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::routes::{Location, NavigationTarget, RouteName};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin { redirect: String },
    RedirectToDashboard,
}

impl GuardDecision {
    /// Where a redirect decision sends the navigation.
    pub fn redirect_location(&self) -> Option<Location> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin { redirect } => Some(Location::login_redirect(redirect)),
            Self::RedirectToDashboard => Some(Location::from(RouteName::Dashboard)),
        }
    }
}

pub fn decide(target: &NavigationTarget, authenticated: bool) -> GuardDecision {
    if target.requires_auth() && !authenticated {
        GuardDecision::RedirectToLogin { redirect: target.full_path() }
    } else if target.name.is_auth_route() && authenticated {
        GuardDecision::RedirectToDashboard
    } else {
        GuardDecision::Allow
    }
}
