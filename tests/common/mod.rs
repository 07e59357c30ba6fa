#![allow(dead_code, unused_imports)]

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use flowkit::app::LaunchOptions;
use flowkit::deps::{FetchReply, Image, ImageService, LogSurfaceProvider};
use flowkit::error::DependencyError;
use flowkit::flow::FlowSpec;
use flowkit::harness::SubstitutionEnvironment;
use flowkit::mvi::{Intent, ViewState};
use flowkit::router::{RouterPlan, Switchboard};
use flowkit::screens::{CredentialsIntent, CredentialsScreen, WelcomeIntent, WelcomeScreen};
use flowkit::unit::{factory, Effects, Frame, Postbox, Screen, Surface, SurfaceProvider, UnitEnv, UnitId};

// -- Fake image service -------------------------------------------------------

/// How [`FakeImages`] answers a fetch.
#[derive(Debug, Clone)]
pub enum FetchMode {
    /// Complete immediately with the image's name as its bytes.
    Succeed,
    /// Complete immediately with this error.
    Fail(DependencyError),
    /// Keep the reply until the test completes it.
    Hold,
}

pub struct FakeImages {
    catalog: Vec<String>,
    mode: Mutex<FetchMode>,
    held: Mutex<Vec<(String, FetchReply)>>,
    requested: Mutex<Vec<String>>,
}

impl FakeImages {
    pub fn new(mode: FetchMode) -> Arc<Self> {
        Arc::new(Self {
            catalog: vec!["cat.png".to_string(), "dog.png".to_string()],
            mode: Mutex::new(mode),
            held: Mutex::new(Vec::new()),
            requested: Mutex::new(Vec::new()),
        })
    }

    pub fn succeeding() -> Arc<Self> {
        Self::new(FetchMode::Succeed)
    }

    pub fn failing(error: DependencyError) -> Arc<Self> {
        Self::new(FetchMode::Fail(error))
    }

    pub fn holding() -> Arc<Self> {
        Self::new(FetchMode::Hold)
    }

    pub fn set_mode(&self, mode: FetchMode) {
        *self.mode.lock() = mode;
    }

    /// Every name passed to `fetch`, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }

    pub fn held(&self) -> usize {
        self.held.lock().len()
    }

    /// Take the held replies, oldest first.
    pub fn take_held(&self) -> Vec<(String, FetchReply)> {
        std::mem::take(&mut *self.held.lock())
    }

    /// Complete every held reply successfully. Returns how many there were.
    pub fn complete_held(&self) -> usize {
        let held = self.take_held();
        let count = held.len();
        for (name, reply) in held {
            reply.complete(Ok(image(&name)));
        }
        count
    }
}

impl ImageService for FakeImages {
    fn catalog(&self) -> Result<Vec<String>, DependencyError> {
        Ok(self.catalog.clone())
    }

    fn fetch(&self, name: &str, reply: FetchReply) {
        self.requested.lock().push(name.to_string());
        let mode = self.mode.lock().clone();
        match mode {
            FetchMode::Succeed => reply.complete(Ok(image(name))),
            FetchMode::Fail(error) => reply.complete(Err(error)),
            FetchMode::Hold => self.held.lock().push((name.to_string(), reply)),
        }
    }
}

pub fn image(name: &str) -> Image {
    Image {
        name: name.to_string(),
        bytes: name.as_bytes().to_vec(),
    }
}

// -- Recording surfaces -------------------------------------------------------

/// Surface provider that writes every render and dismissal to a shared tape.
#[derive(Clone, Default)]
pub struct RecordingSurfaces {
    tape: Arc<Mutex<Vec<String>>>,
}

impl RecordingSurfaces {
    pub fn tape(&self) -> Vec<String> {
        self.tape.lock().clone()
    }

    /// Tape entries for one screen.
    pub fn entries_for(&self, screen: &str) -> Vec<String> {
        let prefix = format!("{screen}#");
        let dismissed = format!("{screen} dismissed");
        self.tape()
            .into_iter()
            .filter(|entry| entry.starts_with(&prefix) || *entry == dismissed)
            .collect()
    }
}

struct RecordingSurface {
    tape: Arc<Mutex<Vec<String>>>,
}

impl Surface for RecordingSurface {
    fn render(&self, frame: &Frame<'_>) {
        self.tape
            .lock()
            .push(format!("{}#{}", frame.screen, frame.sequence));
    }

    fn dismiss(&self, _unit: UnitId, screen: &'static str) {
        self.tape.lock().push(format!("{screen} dismissed"));
    }
}

impl SurfaceProvider for RecordingSurfaces {
    fn surface(&self, _screen: &'static str) -> Box<dyn Surface> {
        Box::new(RecordingSurface {
            tape: Arc::clone(&self.tape),
        })
    }
}

// -- Environments -------------------------------------------------------------

/// Injected environment with the given image service substituted.
pub fn env_with(images: Arc<FakeImages>) -> SubstitutionEnvironment {
    let mut env = SubstitutionEnvironment::default();
    env.substitute::<dyn ImageService>(images)
        .expect("substitute images");
    env.inject().expect("inject");
    env
}

/// Type demo/demo into the credentials screen and continue past the welcome.
pub fn sign_in(env: &SubstitutionEnvironment) {
    env.press::<CredentialsScreen>(CredentialsIntent::UserChanged("demo".into()))
        .expect("type user");
    env.press::<CredentialsScreen>(CredentialsIntent::PasswordChanged("demo".into()))
        .expect("type password");
    env.press::<CredentialsScreen>(CredentialsIntent::Submit)
        .expect("submit");
    env.press::<WelcomeScreen>(WelcomeIntent::Continue)
        .expect("continue");
}

/// Launched, signed in and looking at the gallery.
pub fn gallery_env(images: Arc<FakeImages>) -> SubstitutionEnvironment {
    let env = env_with(images);
    env.root()
        .expect("root")
        .launch(LaunchOptions::default())
        .expect("launch");
    sign_in(&env);
    env
}

// -- Step screens -------------------------------------------------------------

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepView {
    pub label: String,
}

impl ViewState for StepView {}

#[derive(Debug)]
pub enum StepIntent {
    Next,
    Done,
    Leave(&'static str),
}

impl Intent for StepIntent {}

/// Screen that records its mount and release in a shared log.
pub struct StepScreen {
    label: String,
    log: Log,
}

impl StepScreen {
    pub fn new(label: &str, log: &Log) -> Self {
        log.borrow_mut().push(format!("mount {label}"));
        Self {
            label: label.to_string(),
            log: Rc::clone(log),
        }
    }
}

impl Screen for StepScreen {
    type State = StepView;
    type Intent = StepIntent;
    const NAME: &'static str = "step";

    fn view_state(&self) -> StepView {
        StepView {
            label: self.label.clone(),
        }
    }

    fn handle(&mut self, intent: StepIntent, fx: &mut Effects<'_>) {
        match intent {
            StepIntent::Next => fx.advance(),
            StepIntent::Done => fx.finish(),
            StepIntent::Leave(route) => fx.navigate(route),
        }
    }

    fn on_release(&mut self) {
        self.log.borrow_mut().push(format!("release {}", self.label));
    }
}

/// A flow of step screens, one per label.
pub fn step_flow(name: &str, labels: &[&str], log: &Log) -> FlowSpec {
    labels.iter().fold(FlowSpec::new(name), |spec, label| {
        let label = label.to_string();
        let log = Rc::clone(log);
        spec.step(factory(move |_| StepScreen::new(&label, &log)))
    })
}

/// Switchboard wired over a fresh postbox with log-only surfaces.
pub fn switchboard(plans: Vec<RouterPlan>) -> (Postbox, Rc<Switchboard>) {
    let postbox = Postbox::new();
    let env = UnitEnv::new(&postbox, Arc::new(LogSurfaceProvider));
    let switchboard = Switchboard::new(plans, env).expect("switchboard");
    (postbox, switchboard)
}

// -- Config files -------------------------------------------------------------

/// Write `contents` to a config.toml inside a fresh temp dir.
pub fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).expect("write config");
    (dir, path)
}
