//! Render-boundary gate for protected pages.
//!
//! `ProtectedPage` wraps a page's content and decides, from the auth-state
//! provider's current [`AuthState`], whether to show a loading placeholder,
//! redirect, or render the content. It is advisory: the edge gate has
//! already made the authoritative decision for this navigation, this only
//! keeps wrong-role content from flashing while client state catches up.
//!
//! Protected content is only ever handed out in [`GatePhase::Authorized`].

use crate::auth_state::AuthState;
use crate::routes::{Decision, LOGIN_PATH, check_role};
use crate::types::Role;

/// Host navigation (soft client-side redirect).
pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

impl<F: FnMut(&str)> Navigator for F {
    fn navigate(&mut self, path: &str) {
        self(path);
    }
}

/// Gate state for one page mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    /// Provider has not finished loading.
    Pending,
    /// Loaded, nobody signed in (or the role is unknown).
    Unauthenticated,
    /// Signed in with a different role.
    WrongRole(Role),
    /// Signed in with the required role.
    Authorized,
}

impl GatePhase {
    #[must_use]
    pub fn evaluate(required: Role, state: &AuthState) -> Self {
        if state.is_loading {
            return Self::Pending;
        }

        match check_role(required, state.viewer()) {
            Decision::Allow => Self::Authorized,
            Decision::SignIn { .. } => Self::Unauthenticated,
            Decision::WrongRole { actual } => Self::WrongRole(actual),
        }
    }

    /// Client-side redirect target. Signed-out visitors always go to the
    /// general login page.
    #[must_use]
    pub const fn redirect_path(self) -> Option<&'static str> {
        match self {
            Self::Pending | Self::Authorized => None,
            Self::Unauthenticated => Some(LOGIN_PATH),
            Self::WrongRole(actual) => Some(actual.dashboard_path()),
        }
    }
}

/// Render output of a [`ProtectedPage`].
#[derive(Debug, PartialEq, Eq)]
pub enum Rendered<'a, T> {
    /// Loading placeholder.
    Loading,
    /// Nothing; a navigation to this path was requested.
    Redirecting(&'static str),
    /// The protected content.
    Content(&'a T),
}

/// Wrapper for content that requires a role.
#[derive(Debug)]
pub struct ProtectedPage<T> {
    required: Role,
    children: T,
    issued: Option<&'static str>,
}

impl<T> ProtectedPage<T> {
    #[must_use]
    pub const fn new(required: Role, children: T) -> Self {
        Self {
            required,
            children,
            issued: None,
        }
    }

    #[must_use]
    pub const fn required_role(&self) -> Role {
        self.required
    }

    /// Render against the current auth state.
    ///
    /// Called on every auth-state change. A redirect target is sent to the
    /// navigator once per redirecting phase; repeated renders in the same
    /// phase do not navigate again. Leaving that phase re-arms the redirect.
    pub fn render<N>(&mut self, state: &AuthState, navigator: &mut N) -> Rendered<'_, T>
    where
        N: Navigator + ?Sized,
    {
        let phase = GatePhase::evaluate(self.required, state);
        match phase.redirect_path() {
            None if phase == GatePhase::Pending => {
                self.issued = None;
                Rendered::Loading
            }
            None => {
                self.issued = None;
                Rendered::Content(&self.children)
            }
            Some(path) => {
                if self.issued != Some(path) {
                    tracing::debug!(required = %self.required, to = path, "Client gate redirect");
                    navigator.navigate(path);
                    self.issued = Some(path);
                }
                Rendered::Redirecting(path)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingNavigator(Vec<String>);

    impl Navigator for RecordingNavigator {
        fn navigate(&mut self, path: &str) {
            self.0.push(path.to_owned());
        }
    }

    #[test]
    fn test_loading_never_renders_children() {
        let mut page = ProtectedPage::new(Role::Player, "earnings");
        let mut nav = RecordingNavigator::default();

        assert_eq!(page.render(&AuthState::LOADING, &mut nav), Rendered::Loading);
        assert!(nav.0.is_empty());
    }

    #[test]
    fn test_signed_out_navigates_to_login_once() {
        let mut page = ProtectedPage::new(Role::Player, "earnings");
        let mut nav = RecordingNavigator::default();

        for _ in 0..3 {
            assert_eq!(
                page.render(&AuthState::SIGNED_OUT, &mut nav),
                Rendered::Redirecting("/login")
            );
        }
        assert_eq!(nav.0, vec!["/login".to_string()]);
    }

    #[test]
    fn test_signed_out_admin_page_uses_general_login() {
        let mut page = ProtectedPage::new(Role::Admin, "cms");
        let mut nav = RecordingNavigator::default();

        assert_eq!(
            page.render(&AuthState::SIGNED_OUT, &mut nav),
            Rendered::Redirecting("/login")
        );
    }

    #[test]
    fn test_wrong_role_navigates_to_own_dashboard() {
        let mut page = ProtectedPage::new(Role::Admin, "cms");
        let mut nav = RecordingNavigator::default();

        assert_eq!(
            page.render(&AuthState::signed_in(Role::Player), &mut nav),
            Rendered::Redirecting("/player/dashboard")
        );
        assert_eq!(nav.0, vec!["/player/dashboard".to_string()]);
    }

    #[test]
    fn test_authorized_renders_children_without_navigation() {
        let mut page = ProtectedPage::new(Role::Player, "earnings");
        let mut nav = RecordingNavigator::default();

        assert_eq!(
            page.render(&AuthState::signed_in(Role::Player), &mut nav),
            Rendered::Content(&"earnings")
        );
        assert!(nav.0.is_empty());
    }

    #[test]
    fn test_lifecycle_loading_then_authorized() {
        let mut page = ProtectedPage::new(Role::Admin, "cms");
        let mut nav = RecordingNavigator::default();

        assert_eq!(page.render(&AuthState::LOADING, &mut nav), Rendered::Loading);
        assert_eq!(
            page.render(&AuthState::signed_in(Role::Admin), &mut nav),
            Rendered::Content(&"cms")
        );
        assert!(nav.0.is_empty());
    }

    #[test]
    fn test_signing_out_again_navigates_again() {
        let mut page = ProtectedPage::new(Role::Player, "earnings");
        let mut nav = RecordingNavigator::default();

        assert_eq!(
            page.render(&AuthState::SIGNED_OUT, &mut nav),
            Rendered::Redirecting("/login")
        );
        assert_eq!(
            page.render(&AuthState::signed_in(Role::Player), &mut nav),
            Rendered::Content(&"earnings")
        );
        assert_eq!(
            page.render(&AuthState::SIGNED_OUT, &mut nav),
            Rendered::Redirecting("/login")
        );
        assert_eq!(nav.0, vec!["/login".to_string(), "/login".to_string()]);
    }

    #[test]
    fn test_closure_navigator() {
        let mut seen = Vec::new();
        let mut nav = |path: &str| seen.push(path.to_owned());
        let mut page = ProtectedPage::new(Role::Player, ());

        let _ = page.render(&AuthState::signed_in(Role::Admin), &mut nav);
        assert_eq!(seen, vec!["/admin/dashboard".to_string()]);
    }

    #[test]
    fn test_phase_evaluation() {
        assert_eq!(
            GatePhase::evaluate(Role::Admin, &AuthState::LOADING),
            GatePhase::Pending
        );
        assert_eq!(
            GatePhase::evaluate(Role::Admin, &AuthState::SIGNED_OUT),
            GatePhase::Unauthenticated
        );
        assert_eq!(
            GatePhase::evaluate(Role::Admin, &AuthState::signed_in(Role::Player)),
            GatePhase::WrongRole(Role::Player)
        );
        assert_eq!(
            GatePhase::evaluate(Role::Admin, &AuthState::signed_in(Role::Admin)),
            GatePhase::Authorized
        );
    }
}
