//! Event types and sinks for observing render passes.
//!
//! This module defines [`RenderEvent`] and sinks that collect or forward events while
//! [`crate::render::render_frame`] or a [`crate::host::ConnectedLines`] handle runs.
use crate::render::FrameStats;

/// Describes events emitted while attaching and rendering.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum RenderEvent {
    /// Emitted when a pass starts.
    PassStarted {
        /// Region width in px.
        width: u32,
        /// Region height in px.
        height: u32,
        /// Generator seed used for this pass.
        seed: u32,
    },

    /// Emitted when the source image could not be loaded and sampling falls back to a
    /// uniform field.
    ImageFallback {
        /// Image source as given by the container.
        source: String,
        /// Human-readable reason.
        message: String,
    },

    /// Emitted after sampling.
    PointsSampled {
        /// Number of points kept.
        count: usize,
        /// Whether sampling stopped at the point cap.
        capped: bool,
    },

    /// Emitted after the spatial index is built.
    IndexBuilt {
        /// Grid columns.
        cols: usize,
        /// Grid rows.
        rows: usize,
        /// Cell side in px.
        cell_size: f32,
    },

    /// Emitted when a pass finishes.
    PassFinished {
        /// Summary of the pass.
        stats: FrameStats,
    },

    /// Non-fatal warning, e.g. a rejected attribute override.
    Warning {
        /// Context string (e.g. attribute name).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// A generic event sink that accepts [`RenderEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: RenderEvent);
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: RenderEvent) {}
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(RenderEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(RenderEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(RenderEvent),
{
    #[inline]
    fn send(&mut self, event: RenderEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<RenderEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<RenderEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[RenderEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: RenderEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(context: &str) -> RenderEvent {
        RenderEvent::Warning {
            context: context.into(),
            message: "msg".into(),
        }
    }

    #[test]
    fn vec_sink_collects_events() {
        let mut sink = VecSink::new();
        assert!(sink.is_empty());
        sink.send(warning("a"));
        sink.send(warning("b"));
        assert_eq!(sink.len(), 2);
        sink.clear();
        assert!(sink.is_empty());
        sink.send(warning("c"));
        assert!(matches!(
            sink.into_inner().as_slice(),
            [RenderEvent::Warning { context, .. }] if context == "c"
        ));
    }

    #[test]
    fn fn_sink_invokes_callback() {
        let mut count = 0;
        let mut sink = FnSink::new(|_event| {
            count += 1;
        });
        sink.send(warning("ctx"));
        sink.send(warning("ctx"));
        drop(sink);
        assert_eq!(count, 2);
    }
}
