//! Credentials entry, the first step of the login flow.

mod form;

use std::sync::Arc;

pub use form::{CredentialsForm, FormIntent, FormReducer};

use crate::deps::SessionStore;
use crate::mvi::{dispatch_mvi, Intent, ViewState};
use crate::unit::{Effects, Screen};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsView {
    pub user: String,
    /// Password is never rendered, only its length.
    pub password_len: usize,
    pub can_submit: bool,
    pub error: Option<String>,
    pub attempts: u32,
}

impl ViewState for CredentialsView {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsIntent {
    UserChanged(String),
    PasswordChanged(String),
    Submit,
}

impl Intent for CredentialsIntent {}

pub struct CredentialsScreen {
    sessions: Arc<dyn SessionStore>,
    form: CredentialsForm,
}

impl CredentialsScreen {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            sessions,
            form: CredentialsForm::default(),
        }
    }

    /// Start with the user field filled in.
    pub fn with_user(mut self, user: &str) -> Self {
        dispatch_mvi!(self.form, FormReducer, FormIntent::EditUser(user.to_string()));
        self
    }

    fn submit(&mut self, fx: &mut Effects<'_>) {
        if !self.form.is_complete() {
            dispatch_mvi!(
                self.form,
                FormReducer,
                FormIntent::Rejected("user and password are required".into())
            );
            return;
        }
        dispatch_mvi!(self.form, FormReducer, FormIntent::Attempted);
        match self.sessions.sign_in(self.form.user.trim(), &self.form.password) {
            Ok(_) => {
                dispatch_mvi!(self.form, FormReducer, FormIntent::Accepted);
                fx.advance();
            }
            Err(err) => {
                dispatch_mvi!(self.form, FormReducer, FormIntent::Rejected(err.to_string()));
            }
        }
    }
}

impl Screen for CredentialsScreen {
    type State = CredentialsView;
    type Intent = CredentialsIntent;
    const NAME: &'static str = "credentials";

    fn view_state(&self) -> CredentialsView {
        CredentialsView {
            user: self.form.user.clone(),
            password_len: self.form.password.chars().count(),
            can_submit: self.form.is_complete(),
            error: self.form.error.clone(),
            attempts: self.form.attempts,
        }
    }

    fn handle(&mut self, intent: CredentialsIntent, fx: &mut Effects<'_>) {
        match intent {
            CredentialsIntent::UserChanged(user) => {
                dispatch_mvi!(self.form, FormReducer, FormIntent::EditUser(user));
            }
            CredentialsIntent::PasswordChanged(password) => {
                dispatch_mvi!(self.form, FormReducer, FormIntent::EditPassword(password));
            }
            CredentialsIntent::Submit => self.submit(fx),
        }
    }
}
