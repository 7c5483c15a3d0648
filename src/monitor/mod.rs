//! Representation and interaction with physical monitors connected to the
//! X-Server

pub(crate) mod client;

use crate::{
    core::{Identify, Xid},
    cycle::Ring,
    geometry::{Padding, Rectangle},
    layout::{Layout, LayoutParams},
    utils::LogError,
    x::DisplayServer,
};
use client::Client;
use std::fmt;

/// The settings a new [`Monitor`] starts with, and returns to on reset
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Defaults {
    /// Gap between windows
    pub(crate) window_gap:   u32,
    /// Border width of windows
    pub(crate) border_width: u32,
    /// Portion of the monitor given to the root windows
    pub(crate) ratio:        f64,
    /// Number of root windows
    pub(crate) root_count:   usize,
}

// ============================== Monitor =============================

/// Represents a monitor connected to the window manager
#[derive(Debug, Clone)]
pub(crate) struct Monitor {
    /// `RandR` output ID, or the root window for the fallback monitor
    id:                 Xid,
    /// Name of the output
    name:               String,
    /// Area covered by the monitor
    geometry:           Rectangle,
    /// Ratio and root count restored by [`Monitor::reset`]
    reset_ratio:        f64,
    reset_root_count:   usize,
    /// Managed windows, in layout order
    pub(crate) windows: Ring<Client>,
    /// Available layouts; the focused one is in use
    pub(crate) layouts: Ring<Layout>,

    pub(crate) ratio:        f64,
    pub(crate) root_count:   usize,
    pub(crate) window_gap:   u32,
    pub(crate) border_width: u32,
    pub(crate) mirrored:     bool,
    pub(crate) fullscreen:   bool,
    pub(crate) padding:      Padding,
}

impl Monitor {
    /// Create a new [`Monitor`] without any windows
    pub(crate) fn new(id: Xid, name: &str, geometry: Rectangle, defaults: Defaults) -> Self {
        let mut monitor = Self {
            id,
            name: name.to_owned(),
            geometry,
            reset_ratio: defaults.ratio,
            reset_root_count: defaults.root_count,
            windows: Ring::new(),
            layouts: Ring::new(),
            ratio: defaults.ratio,
            root_count: defaults.root_count,
            window_gap: defaults.window_gap,
            border_width: defaults.border_width,
            mirrored: false,
            fullscreen: false,
            padding: Padding::default(),
        };
        monitor.reset();

        log::info!("monitor: {}", monitor);
        monitor
    }

    /// Name of the monitor
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Area covered by the monitor
    pub(crate) const fn geometry(&self) -> Rectangle {
        self.geometry
    }

    /// Take over the identity of the output now covering this monitor's area
    pub(crate) fn relabel(&mut self, id: Xid, name: &str) {
        if self.id != id || self.name != name {
            log::debug!("monitor {} is now {} ({:#x})", self, name, id);
            self.id = id;
            self.name = name.to_owned();
        }
    }

    /// The focused window of this monitor
    pub(crate) fn focused(&self) -> Option<&Client> {
        self.windows.focused()
    }

    /// ID of the focused window of this monitor
    pub(crate) fn focused_id(&self) -> Option<Xid> {
        self.windows.focused().map(Identify::id)
    }

    /// Restore the built in layouts, the ratio, the root count and unmirror
    pub(crate) fn reset(&mut self) {
        self.layouts = Layout::defaults().collect();
        self.mirrored = false;
        self.ratio = self.reset_ratio;
        self.root_count = self.reset_root_count;
    }

    /// The area windows are tiled in
    fn area(&self) -> Rectangle {
        self.geometry - self.padding
    }

    /// Place every window where the current layout says. In fullscreen only
    /// the focused window is placed, covering the whole area
    pub(crate) fn arrange<D: DisplayServer>(&mut self, display: &D) {
        let area = self.area();
        let layout = match self.layouts.focused() {
            Some(layout) if !self.fullscreen => *layout,
            _ => {
                if let Some(client) = self.windows.focused_mut() {
                    log::debug!("arrange: fullscreen {} at {}", client, area);
                    client.place(area, 0);

                    let id = client.id();
                    display.set_geometry(id, area).log_err();
                    display.send_configure_notify(id, area, 0).log_err();
                    display.set_border_width(id, 0).log_err();
                    display.raise_window(id).log_err();
                }
                return;
            },
        };

        let params = LayoutParams {
            area,
            root_count: self.root_count,
            ratio: self.ratio,
            mirrored: self.mirrored,
            window_gap: self.window_gap,
            border_width: self.border_width,
        };

        let rects = layout.arrange(&params, self.windows.len());
        let border_width = if rects.len() == 1 { 0 } else { self.border_width };
        log::debug!("arrange: {} windows with {} on {}", rects.len(), layout, self.name);

        for (i, (client, rect)) in self.windows.iter_mut().zip(rects).enumerate() {
            let id = client.id();
            display.set_border_width(id, border_width).log_err();
            display.set_geometry(id, rect).log_err();
            display.send_configure_notify(id, rect, border_width).log_err();

            client.place(rect, border_width);
            log::trace!("arrange: {} at {}, root: {}", client, rect, i < self.root_count);
        }
    }
}

impl Identify for Monitor {
    fn id(&self) -> Xid {
        self.id
    }
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.geometry)
        } else {
            write!(f, "{} {}", self.name, self.geometry)
        }
    }
}
