//! Session gating
//!
//! Page-level composition renders exactly one of three views depending on
//! the session: a loading placeholder, the login prompt, or the protected
//! content.

use crate::session::{Readiness, SessionSnapshot, SessionStore};

/// View selected for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Loading,
    LoginPrompt,
    Protected,
}

impl View {
    pub fn select(session: &SessionStore) -> Self {
        Self::for_snapshot(&session.snapshot())
    }

    pub fn for_snapshot(snapshot: &SessionSnapshot) -> Self {
        match snapshot.readiness {
            Readiness::Loading => View::Loading,
            _ if snapshot.is_authenticated() => View::Protected,
            _ => View::LoginPrompt,
        }
    }
}

/// Render the view chosen for `session` with the matching closure
pub fn gate<T>(
    session: &SessionStore,
    loading: impl FnOnce() -> T,
    login_prompt: impl FnOnce() -> T,
    protected: impl FnOnce(&SessionSnapshot) -> T,
) -> T {
    let snapshot = session.snapshot();
    match View::for_snapshot(&snapshot) {
        View::Loading => loading(),
        View::LoginPrompt => login_prompt(),
        View::Protected => protected(&snapshot),
    }
}
