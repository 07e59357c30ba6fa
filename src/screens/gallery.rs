//! Image gallery with asynchronous downloads and an embedded quota counter.

use std::sync::Arc;

use super::quota::RESET_TOPIC;
use super::{LOGIN_ROUTE, SETTINGS_ROUTE};
use crate::app::LifecycleEvent;
use crate::deps::{Image, ImageService, Library, LibraryEntry, SessionStore};
use crate::error::{DependencyError, NavigationError};
use crate::mvi::{Intent, ViewState};
use crate::unit::{Completion, Effects, Screen};

pub const DOWNLOAD_COMPLETE: &str = "Download complete";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryView {
    pub user: Option<String>,
    pub items: Vec<String>,
    pub downloading: Option<String>,
    pub banner_text: Option<String>,
    pub error_flag: bool,
    pub error_message: Option<String>,
    pub downloaded: usize,
}

impl ViewState for GalleryView {}

impl GalleryView {
    pub fn is_busy(&self) -> bool {
        self.downloading.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryIntent {
    Download(String),
    Reload,
    DismissBanner,
    OpenSettings,
    SignOut,
}

impl Intent for GalleryIntent {}

pub struct GalleryScreen {
    images: Arc<dyn ImageService>,
    library: Arc<dyn Library>,
    sessions: Arc<dyn SessionStore>,
    items: Vec<String>,
    downloading: Option<String>,
    banner: Option<String>,
    error: Option<String>,
}

impl GalleryScreen {
    pub fn new(
        images: Arc<dyn ImageService>,
        library: Arc<dyn Library>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let mut screen = Self {
            images,
            library,
            sessions,
            items: Vec::new(),
            downloading: None,
            banner: None,
            error: None,
        };
        screen.reload();
        screen
    }

    fn reload(&mut self) {
        match self.images.catalog() {
            Ok(items) => {
                self.items = items;
                self.error = None;
            }
            Err(err) => self.fail(&err),
        }
    }

    fn download(&mut self, name: String, fx: &mut Effects<'_>) {
        if self.downloading.is_some() {
            // One download at a time; the newer request wins.
            fx.discard_pending();
        }
        self.banner = None;
        self.error = None;
        let reply = fx.reply();
        self.images.fetch(&name, reply);
        self.downloading = Some(name);
    }

    fn fail(&mut self, err: &DependencyError) {
        tracing::debug!(error = %err, "Gallery dependency failed");
        self.downloading = None;
        self.banner = None;
        self.error = Some(err.to_string());
    }
}

/// Second path segment of a link such as `flowkit://gallery/cat.png`.
fn link_image(url: &str) -> Option<String> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = rest.split(['?', '#']).next().unwrap_or_default();
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .nth(1)
        .map(str::to_string)
}

/// Image requested by a lifecycle event: a link's second segment or an
/// activity payload `{"image": "cat.png"}`.
fn requested_image(event: &LifecycleEvent) -> Option<String> {
    match event {
        LifecycleEvent::OpenUrl(url) => link_image(url),
        LifecycleEvent::Launch(options) => options.url.as_deref().and_then(link_image),
        LifecycleEvent::Continue(activity) => activity
            .payload
            .get("image")
            .and_then(|value| value.as_str())
            .map(str::to_string),
        _ => None,
    }
}

impl Screen for GalleryScreen {
    type State = GalleryView;
    type Intent = GalleryIntent;
    const NAME: &'static str = "gallery";

    fn view_state(&self) -> GalleryView {
        GalleryView {
            user: self.sessions.current().map(|session| session.user),
            items: self.items.clone(),
            downloading: self.downloading.clone(),
            banner_text: self.banner.clone(),
            error_flag: self.error.is_some(),
            error_message: self.error.clone(),
            downloaded: self.library.count(),
        }
    }

    fn handle(&mut self, intent: GalleryIntent, fx: &mut Effects<'_>) {
        match intent {
            GalleryIntent::Download(name) => self.download(name, fx),
            GalleryIntent::Reload => self.reload(),
            GalleryIntent::DismissBanner => {
                self.banner = None;
                self.error = None;
            }
            GalleryIntent::OpenSettings => fx.navigate(SETTINGS_ROUTE),
            GalleryIntent::SignOut => {
                fx.discard_pending();
                self.downloading = None;
                self.sessions.sign_out();
                fx.navigate(LOGIN_ROUTE);
            }
        }
    }

    fn on_completion(&mut self, completion: Completion, fx: &mut Effects<'_>) {
        match completion.into_value::<Result<Image, DependencyError>>() {
            Some(Ok(image)) => {
                self.library.record(LibraryEntry {
                    name: image.name,
                    bytes: image.bytes.len(),
                });
                self.downloading = None;
                self.error = None;
                self.banner = Some(DOWNLOAD_COMPLETE.to_string());
                fx.refresh_children();
            }
            Some(Err(err)) => self.fail(&err),
            None => self.fail(&DependencyError::Failed(
                "unexpected download result".to_string(),
            )),
        }
    }

    fn on_child_signal(&mut self, from: &'static str, topic: &'static str, _fx: &mut Effects<'_>) {
        if topic == RESET_TOPIC {
            tracing::debug!(child = from, "Library reset by child");
            self.banner = Some("Library cleared".to_string());
            self.error = None;
        }
    }

    fn on_lifecycle(&mut self, event: &LifecycleEvent, fx: &mut Effects<'_>) {
        if let Some(name) = requested_image(event) {
            self.download(name, fx);
        }
    }

    fn on_navigation_failed(&mut self, error: &NavigationError) {
        self.error = Some(error.to_string());
    }
}
