//! Everything that talks to the X server or to control clients.
//!
//! The dispatcher only sees the server through [`DisplayServer`], which keeps
//! the window manager's state engine testable without a display.

pub(crate) mod event;
pub(crate) mod stream;
#[cfg(test)]
pub(crate) mod testing;
pub(crate) mod utils;
pub(crate) mod xconnection;

use crate::{
    core::{Protocol, Rgb, Window},
    geometry::{Point, Rectangle},
    x::event::ConfigureRequestData,
};
use anyhow::Result;
use std::collections::HashSet;

/// A physical output reported by RandR
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Output {
    /// RandR output ID
    pub(crate) id:   u32,
    /// Name of the output, i.e., `HDMI-1`
    pub(crate) name: String,
    /// Area of the screen covered by the output
    pub(crate) rect: Rectangle,
}

/// The requests the window manager makes of the X server
pub(crate) trait DisplayServer {
    /// The root window of the managed screen
    fn root(&self) -> Window;

    /// The area of the whole screen
    fn screen_rect(&self) -> Rectangle;

    /// Redirect the root window's substructure, failing if another window
    /// manager holds it
    fn become_wm(&self) -> Result<()>;

    /// Connected outputs with an active CRTC, deduplicated by origin and
    /// ordered by `x` then `y`. Empty when RandR can't tell
    fn outputs(&self) -> Result<Vec<Output>>;

    /// Mapped top-level windows that aren't override-redirect, with the
    /// origin of each
    fn top_level_windows(&self) -> Result<Vec<(Window, Point)>>;

    /// Whether the window asked not to be managed
    fn is_override_redirect(&self, window: Window) -> Result<bool>;

    /// The title of the window; empty if it has none
    fn window_name(&self, window: Window) -> String;

    /// The `WM_PROTOCOLS` the window takes part in
    fn window_protocols(&self, window: Window) -> HashSet<Protocol>;

    /// The window this one is a dialog for
    fn transient_for(&self, window: Window) -> Option<Window>;

    /// Subscribe to property and structure changes of a managed window
    fn watch_window(&self, window: Window) -> Result<()>;

    /// Make the window visible
    fn map_window(&self, window: Window) -> Result<()>;

    /// Move and resize a window
    fn set_geometry(&self, window: Window, rect: Rectangle) -> Result<()>;

    /// Change the width of a window's border
    fn set_border_width(&self, window: Window, width: u32) -> Result<()>;

    /// Change the color of a window's border
    fn set_border_color(&self, window: Window, pixel: u32) -> Result<()>;

    /// Tell a client where it is with a synthetic `ConfigureNotify`
    fn send_configure_notify(&self, window: Window, rect: Rectangle, border_width: u32)
        -> Result<()>;

    /// Carry out a configure request of an unmanaged window as asked
    fn apply_configure_request(&self, request: &ConfigureRequestData) -> Result<()>;

    /// Put a window above its siblings
    fn raise_window(&self, window: Window) -> Result<()>;

    /// Give a window the input focus
    fn focus_window(&self, window: Window) -> Result<()>;

    /// The top-level window under the pointer
    fn pointer_window(&self) -> Result<Option<Window>>;

    /// Resolve a color into a pixel of the default colormap
    fn alloc_color(&self, rgb: Rgb) -> Result<u32>;

    /// Politely ask a client to close a window with `WM_DELETE_WINDOW`
    fn send_delete_window(&self, window: Window) -> Result<()>;

    /// Forcefully disconnect the client owning a window
    fn kill_window(&self, window: Window) -> Result<()>;

    /// Send all queued requests
    fn flush(&self) -> Result<()>;
}
