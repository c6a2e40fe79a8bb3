use winit::event::WindowEvent;

use super::ctx::FrameCtx;

/// What the runtime should do after an app callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Host application driven by `window::Runtime`.
///
/// There is a single window, so events carry no window id. Raw `winit`
/// events are forwarded untouched; key bindings belong to the host.
pub trait App {
    /// Sees every window event first, before resize and close handling.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Records and presents one frame, typically through `FrameCtx::render`.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
