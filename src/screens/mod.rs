//! Demo screens wired by the composition factory.

mod credentials;
mod gallery;
mod quota;
mod settings;
mod welcome;

pub use credentials::{
    CredentialsForm, CredentialsIntent, CredentialsScreen, CredentialsView, FormIntent,
    FormReducer,
};
pub use gallery::{GalleryIntent, GalleryScreen, GalleryView, DOWNLOAD_COMPLETE};
pub use quota::{QuotaIntent, QuotaScreen, QuotaView, RESET_TOPIC};
pub use settings::{SettingsIntent, SettingsScreen, SettingsView};
pub use welcome::{WelcomeIntent, WelcomeScreen, WelcomeView};

/// Route screens navigate to when the user signs out.
pub const LOGIN_ROUTE: &str = "login";
/// Route the gallery opens for its settings button.
pub const SETTINGS_ROUTE: &str = "settings";
