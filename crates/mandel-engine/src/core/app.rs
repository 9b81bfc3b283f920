use crate::input::InputEvent;

use super::ctx::{FrameCtx, StartCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    /// Ask the runtime for a redraw as soon as the event queue drains.
    Redraw,
    Exit,
}

/// Something that can be asked for one more frame callback.
///
/// Requests are coalesced: asking twice before the frame runs yields one frame.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Application contract implemented by higher layers.
///
/// The runtime owns the window and GPU; the app sees them only through the
/// contexts passed to each callback. Callbacks never overlap.
pub trait App {
    /// Called once after the window and GPU are ready, before the first frame.
    ///
    /// An error here is fatal: the runtime exits and returns it from `Runtime::run`.
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called for each translated input event, between frames.
    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called after the surface was reconfigured for a new physical size.
    fn on_resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Called for each redraw of the window.
    ///
    /// Frames are not continuous: the app must request the next one through
    /// `FrameCtx` (it implements [`FrameScheduler`]) or return [`AppControl::Redraw`].
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
