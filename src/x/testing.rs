//! A [`DisplayServer`] that records what it is asked to do

use crate::{
    core::{Protocol, Rgb, Window},
    geometry::{Point, Rectangle},
    x::{event::ConfigureRequestData, DisplayServer, Output},
};
use anyhow::Result;
use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
};

/// Root window of the mock screen
pub(crate) const ROOT: Window = 0x100;

/// A request made of the [`MockDisplay`]
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Request {
    Watch(Window),
    Map(Window),
    Geometry(Window, Rectangle),
    BorderWidth(Window, u32),
    BorderColor(Window, u32),
    ConfigureNotify(Window, Rectangle, u32),
    ApplyConfigure(ConfigureRequestData),
    Raise(Window),
    Focus(Window),
    Delete(Window),
    Kill(Window),
}

/// What the mock knows about a window
#[derive(Debug, Clone, Default)]
pub(crate) struct MockWindow {
    pub(crate) name:              String,
    pub(crate) protocols:         HashSet<Protocol>,
    pub(crate) transient_for:     Option<Window>,
    pub(crate) override_redirect: bool,
    /// Origin of an already mapped window, `None` if it isn't mapped
    pub(crate) mapped_at:         Option<Point>,
}

/// A fake X server
#[derive(Debug, Default)]
pub(crate) struct MockDisplay {
    pub(crate) screen:   Rectangle,
    pub(crate) outputs:  RefCell<Vec<Output>>,
    pub(crate) windows:  RefCell<HashMap<Window, MockWindow>>,
    pub(crate) pointer:  RefCell<Option<Window>>,
    pub(crate) requests: RefCell<Vec<Request>>,
}

impl MockDisplay {
    /// A single 1920x1080 screen without `RandR` outputs
    pub(crate) fn new() -> Self {
        Self {
            screen: Rectangle::new(0, 0, 1920, 1080),
            ..Self::default()
        }
    }

    /// A screen made of the given outputs
    pub(crate) fn with_outputs(outputs: &[(&str, Rectangle)]) -> Self {
        let mock = Self::new();
        mock.outputs.replace(
            outputs
                .iter()
                .enumerate()
                .map(|(i, (name, rect))| Output {
                    id:   0x40 + i as u32,
                    name: (*name).to_owned(),
                    rect: *rect,
                })
                .collect(),
        );
        mock
    }

    /// Register a window the server knows about
    pub(crate) fn add_window(&self, id: Window, window: MockWindow) {
        self.windows.borrow_mut().insert(id, window);
    }

    /// Put the pointer over a window
    pub(crate) fn point_at(&self, window: Option<Window>) {
        self.pointer.replace(window);
    }

    /// Take the recorded requests, leaving the log empty
    pub(crate) fn take(&self) -> Vec<Request> {
        self.requests.take()
    }

    /// The last border color set on a window
    pub(crate) fn border_color_of(&self, window: Window) -> Option<u32> {
        self.requests.borrow().iter().rev().find_map(|r| match r {
            Request::BorderColor(w, pixel) if *w == window => Some(*pixel),
            _ => None,
        })
    }

    /// The last geometry given to a window
    pub(crate) fn geometry_of(&self, window: Window) -> Option<Rectangle> {
        self.requests.borrow().iter().rev().find_map(|r| match r {
            Request::Geometry(w, rect) if *w == window => Some(*rect),
            _ => None,
        })
    }

    fn record(&self, request: Request) -> Result<()> {
        self.requests.borrow_mut().push(request);
        Ok(())
    }
}

impl DisplayServer for MockDisplay {
    fn root(&self) -> Window {
        ROOT
    }

    fn screen_rect(&self) -> Rectangle {
        self.screen
    }

    fn become_wm(&self) -> Result<()> {
        Ok(())
    }

    fn outputs(&self) -> Result<Vec<Output>> {
        Ok(self.outputs.borrow().clone())
    }

    fn top_level_windows(&self) -> Result<Vec<(Window, Point)>> {
        let mut windows = self
            .windows
            .borrow()
            .iter()
            .filter(|(_, w)| !w.override_redirect)
            .filter_map(|(id, w)| w.mapped_at.map(|at| (*id, at)))
            .collect::<Vec<_>>();
        windows.sort_unstable();
        Ok(windows)
    }

    fn is_override_redirect(&self, window: Window) -> Result<bool> {
        Ok(self
            .windows
            .borrow()
            .get(&window)
            .map_or(false, |w| w.override_redirect))
    }

    fn window_name(&self, window: Window) -> String {
        self.windows
            .borrow()
            .get(&window)
            .map(|w| w.name.clone())
            .unwrap_or_default()
    }

    fn window_protocols(&self, window: Window) -> HashSet<Protocol> {
        self.windows
            .borrow()
            .get(&window)
            .map(|w| w.protocols.clone())
            .unwrap_or_default()
    }

    fn transient_for(&self, window: Window) -> Option<Window> {
        self.windows.borrow().get(&window).and_then(|w| w.transient_for)
    }

    fn watch_window(&self, window: Window) -> Result<()> {
        self.record(Request::Watch(window))
    }

    fn map_window(&self, window: Window) -> Result<()> {
        self.record(Request::Map(window))
    }

    fn set_geometry(&self, window: Window, rect: Rectangle) -> Result<()> {
        self.record(Request::Geometry(window, rect))
    }

    fn set_border_width(&self, window: Window, width: u32) -> Result<()> {
        self.record(Request::BorderWidth(window, width))
    }

    fn set_border_color(&self, window: Window, pixel: u32) -> Result<()> {
        self.record(Request::BorderColor(window, pixel))
    }

    fn send_configure_notify(
        &self,
        window: Window,
        rect: Rectangle,
        border_width: u32,
    ) -> Result<()> {
        self.record(Request::ConfigureNotify(window, rect, border_width))
    }

    fn apply_configure_request(&self, request: &ConfigureRequestData) -> Result<()> {
        self.record(Request::ApplyConfigure(*request))
    }

    fn raise_window(&self, window: Window) -> Result<()> {
        self.record(Request::Raise(window))
    }

    fn focus_window(&self, window: Window) -> Result<()> {
        self.record(Request::Focus(window))
    }

    fn pointer_window(&self) -> Result<Option<Window>> {
        Ok(*self.pointer.borrow())
    }

    fn alloc_color(&self, rgb: Rgb) -> Result<u32> {
        Ok(rgb.packed())
    }

    fn send_delete_window(&self, window: Window) -> Result<()> {
        self.record(Request::Delete(window))
    }

    fn kill_window(&self, window: Window) -> Result<()> {
        self.record(Request::Kill(window))
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
