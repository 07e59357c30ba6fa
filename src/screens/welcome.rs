//! Greets the signed-in user and ends the login flow.

use std::sync::Arc;

use crate::deps::SessionStore;
use crate::mvi::{Intent, ViewState};
use crate::unit::{Effects, Screen};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeView {
    pub greeting: String,
}

impl ViewState for WelcomeView {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WelcomeIntent {
    Continue,
}

impl Intent for WelcomeIntent {}

pub struct WelcomeScreen {
    user: Option<String>,
}

impl WelcomeScreen {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            user: sessions.current().map(|session| session.user),
        }
    }
}

impl Screen for WelcomeScreen {
    type State = WelcomeView;
    type Intent = WelcomeIntent;
    const NAME: &'static str = "welcome";

    fn view_state(&self) -> WelcomeView {
        let greeting = match &self.user {
            Some(user) => format!("Welcome, {user}"),
            None => "Welcome".to_string(),
        };
        WelcomeView { greeting }
    }

    fn handle(&mut self, intent: WelcomeIntent, fx: &mut Effects<'_>) {
        match intent {
            WelcomeIntent::Continue => fx.finish(),
        }
    }
}
