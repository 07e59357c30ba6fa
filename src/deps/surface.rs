//! Default presentation surface: every frame becomes a tracing event.

use crate::unit::{Frame, Surface, SurfaceProvider, UnitId};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogSurfaceProvider;

struct LogSurface;

impl Surface for LogSurface {
    fn render(&self, frame: &Frame<'_>) {
        tracing::debug!(
            unit = %frame.unit,
            screen = frame.screen,
            frame = frame.sequence,
            state = ?frame.state,
            "Render"
        );
    }

    fn dismiss(&self, unit: UnitId, screen: &'static str) {
        tracing::trace!(unit = %unit, screen, "Dismiss");
    }
}

impl SurfaceProvider for LogSurfaceProvider {
    fn surface(&self, _screen: &'static str) -> Box<dyn Surface> {
        Box::new(LogSurface)
    }
}
