//! Download counter embedded in the gallery.

use std::sync::Arc;

use crate::deps::Library;
use crate::mvi::{Intent, ViewState};
use crate::unit::{Effects, Screen};

/// Topic sent to the parent after the library was cleared.
pub const RESET_TOPIC: &str = "reset";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaView {
    pub downloaded: usize,
    pub label: String,
}

impl ViewState for QuotaView {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaIntent {
    Reset,
}

impl Intent for QuotaIntent {}

pub struct QuotaScreen {
    library: Arc<dyn Library>,
}

impl QuotaScreen {
    pub fn new(library: Arc<dyn Library>) -> Self {
        Self { library }
    }
}

impl Screen for QuotaScreen {
    type State = QuotaView;
    type Intent = QuotaIntent;
    const NAME: &'static str = "quota";

    fn view_state(&self) -> QuotaView {
        let downloaded = self.library.count();
        let label = match downloaded {
            0 => "No downloads".to_string(),
            1 => "1 download".to_string(),
            n => format!("{n} downloads"),
        };
        QuotaView { downloaded, label }
    }

    fn handle(&mut self, intent: QuotaIntent, fx: &mut Effects<'_>) {
        match intent {
            QuotaIntent::Reset => {
                let dropped = self.library.clear();
                tracing::debug!(dropped, "Library reset from quota");
                fx.signal_parent(RESET_TOPIC);
            }
        }
    }
}
