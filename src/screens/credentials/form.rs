//! Pure credentials form state machine.

use crate::mvi::Reducer;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsForm {
    pub user: String,
    pub password: String,
    pub error: Option<String>,
    pub attempts: u32,
}

impl CredentialsForm {
    pub fn is_complete(&self) -> bool {
        !self.user.trim().is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormIntent {
    EditUser(String),
    EditPassword(String),
    /// A sign-in attempt was made.
    Attempted,
    Rejected(String),
    Accepted,
}

pub struct FormReducer;

impl Reducer for FormReducer {
    type State = CredentialsForm;
    type Intent = FormIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            FormIntent::EditUser(user) => CredentialsForm {
                user,
                error: None,
                ..state
            },
            FormIntent::EditPassword(password) => CredentialsForm {
                password,
                error: None,
                ..state
            },
            FormIntent::Attempted => CredentialsForm {
                attempts: state.attempts + 1,
                ..state
            },
            // Keep the user name, make them retype the password.
            FormIntent::Rejected(message) => CredentialsForm {
                password: String::new(),
                error: Some(message),
                ..state
            },
            FormIntent::Accepted => CredentialsForm {
                password: String::new(),
                error: None,
                ..state
            },
        }
    }
}
