//! Account and storage settings.

use std::sync::Arc;

use super::LOGIN_ROUTE;
use crate::deps::{Library, SessionStore};
use crate::error::NavigationError;
use crate::mvi::{Intent, ViewState};
use crate::unit::{Effects, Screen};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsView {
    pub user: Option<String>,
    pub downloaded: usize,
    pub notice: Option<String>,
}

impl ViewState for SettingsView {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsIntent {
    ClearLibrary,
    SignOut,
    Close,
}

impl Intent for SettingsIntent {}

pub struct SettingsScreen {
    sessions: Arc<dyn SessionStore>,
    library: Arc<dyn Library>,
    notice: Option<String>,
}

impl SettingsScreen {
    pub fn new(sessions: Arc<dyn SessionStore>, library: Arc<dyn Library>) -> Self {
        Self {
            sessions,
            library,
            notice: None,
        }
    }
}

impl Screen for SettingsScreen {
    type State = SettingsView;
    type Intent = SettingsIntent;
    const NAME: &'static str = "settings";

    fn view_state(&self) -> SettingsView {
        SettingsView {
            user: self.sessions.current().map(|session| session.user),
            downloaded: self.library.count(),
            notice: self.notice.clone(),
        }
    }

    fn handle(&mut self, intent: SettingsIntent, fx: &mut Effects<'_>) {
        match intent {
            SettingsIntent::ClearLibrary => {
                let dropped = self.library.clear();
                self.notice = Some(format!("Removed {dropped} downloads"));
            }
            SettingsIntent::SignOut => {
                self.sessions.sign_out();
                fx.navigate(LOGIN_ROUTE);
            }
            SettingsIntent::Close => fx.finish(),
        }
    }

    fn on_navigation_failed(&mut self, error: &NavigationError) {
        self.notice = Some(error.to_string());
    }
}
