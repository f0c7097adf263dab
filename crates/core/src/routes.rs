//! Route classification table and the shared authorization decision.
//!
//! Both gates call [`authorize`] (or [`check_role`] when the required role is
//! already known) so "which pages need which role" has a single definition.
//!
//! # Table
//!
//! ```text
//! /admin/login           - Public (must stay reachable when signed out)
//! /admin, /admin/...     - Protected(Admin)
//! /player, /player/...   - Protected(Player)
//! everything else        - Public
//! ```
//!
//! Prefixes match on a segment boundary: `/administrator` is public.

use crate::types::Role;

/// General login page.
pub const LOGIN_PATH: &str = "/login";

/// Admin login page.
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";

/// Deals page, the only path carrying referral capture.
pub const DEALS_PATH: &str = "/deals";

/// Protected areas, checked in order.
pub const PROTECTED_AREAS: &[(&str, Role)] = &[
    (Role::Admin.area_prefix(), Role::Admin),
    (Role::Player.area_prefix(), Role::Player),
];

/// Paths inside a protected area that are nevertheless public.
pub const PUBLIC_EXCEPTIONS: &[&str] = &[ADMIN_LOGIN_PATH];

/// Classification of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Served to anyone.
    Public,
    /// Requires a member holding this role.
    Protected(Role),
}

/// Who is asking, as far as the gate could tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    /// No session, or a session whose identity or role could not be resolved.
    Anonymous,
    /// Authenticated with a resolved role.
    Member(Role),
}

impl From<Option<Role>> for Viewer {
    fn from(role: Option<Role>) -> Self {
        role.map_or(Self::Anonymous, Self::Member)
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Serve the page.
    Allow,
    /// Sign-in required for the area owned by `area`.
    SignIn {
        /// Role owning the requested area.
        area: Role,
    },
    /// Signed in, but the area belongs to another role.
    WrongRole {
        /// The viewer's actual role.
        actual: Role,
    },
}

impl Decision {
    /// Where the edge redirects for this decision, if anywhere.
    #[must_use]
    pub const fn redirect_path(self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::SignIn { area } => Some(area.login_path()),
            Self::WrongRole { actual } => Some(actual.dashboard_path()),
        }
    }
}

/// Classify a request path. Only the path is consulted, never the query.
#[must_use]
pub fn classify(path: &str) -> RouteClass {
    if PUBLIC_EXCEPTIONS.contains(&path) {
        return RouteClass::Public;
    }

    PROTECTED_AREAS
        .iter()
        .find(|(prefix, _)| in_area(path, prefix))
        .map_or(RouteClass::Public, |&(_, role)| RouteClass::Protected(role))
}

/// Decide whether `viewer` may see `path`.
#[must_use]
pub fn authorize(path: &str, viewer: Viewer) -> Decision {
    match classify(path) {
        RouteClass::Public => Decision::Allow,
        RouteClass::Protected(required) => check_role(required, viewer),
    }
}

/// Decide whether `viewer` may see a page that requires `required`.
#[must_use]
pub fn check_role(required: Role, viewer: Viewer) -> Decision {
    match viewer {
        Viewer::Anonymous => Decision::SignIn { area: required },
        Viewer::Member(actual) if actual == required => Decision::Allow,
        Viewer::Member(actual) => Decision::WrongRole { actual },
    }
}

fn in_area(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_public_paths() {
        for path in ["/", "/deals", "/login", "/news/some-article", "/administrator", "/players"] {
            assert_eq!(classify(path), RouteClass::Public, "{path}");
        }
    }

    #[test]
    fn test_classify_admin_login_is_public() {
        assert_eq!(classify(ADMIN_LOGIN_PATH), RouteClass::Public);
        // Only the exact path is exempt
        assert_eq!(
            classify("/admin/login/extra"),
            RouteClass::Protected(Role::Admin)
        );
    }

    #[test]
    fn test_classify_protected_areas() {
        assert_eq!(classify("/admin"), RouteClass::Protected(Role::Admin));
        assert_eq!(
            classify("/admin/news/edit/4"),
            RouteClass::Protected(Role::Admin)
        );
        assert_eq!(classify("/player"), RouteClass::Protected(Role::Player));
        assert_eq!(
            classify("/player/dashboard"),
            RouteClass::Protected(Role::Player)
        );
    }

    #[test]
    fn test_anonymous_redirects_to_area_login() {
        let admin = authorize("/admin/dashboard", Viewer::Anonymous);
        assert_eq!(admin.redirect_path(), Some(ADMIN_LOGIN_PATH));

        let player = authorize("/player/dashboard", Viewer::Anonymous);
        assert_eq!(player.redirect_path(), Some(LOGIN_PATH));
    }

    #[test]
    fn test_wrong_role_redirects_to_own_dashboard() {
        assert_eq!(
            authorize("/admin/team", Viewer::Member(Role::Player)),
            Decision::WrongRole {
                actual: Role::Player
            }
        );
        assert_eq!(
            authorize("/admin/team", Viewer::Member(Role::Player)).redirect_path(),
            Some("/player/dashboard")
        );
        assert_eq!(
            authorize("/player/deals", Viewer::Member(Role::Admin)).redirect_path(),
            Some("/admin/dashboard")
        );
    }

    #[test]
    fn test_matching_role_is_allowed() {
        assert_eq!(
            authorize("/admin/dashboard", Viewer::Member(Role::Admin)),
            Decision::Allow
        );
        assert_eq!(
            authorize("/player/dashboard", Viewer::Member(Role::Player)),
            Decision::Allow
        );
    }

    #[test]
    fn test_public_paths_allow_everyone() {
        for viewer in [
            Viewer::Anonymous,
            Viewer::Member(Role::Admin),
            Viewer::Member(Role::Player),
        ] {
            assert_eq!(authorize("/deals", viewer), Decision::Allow);
            assert_eq!(authorize(ADMIN_LOGIN_PATH, viewer), Decision::Allow);
        }
    }

    #[test]
    fn test_unresolved_role_is_anonymous() {
        assert_eq!(Viewer::from(None), Viewer::Anonymous);
        assert_eq!(Viewer::from(Some(Role::Admin)), Viewer::Member(Role::Admin));
    }
}
