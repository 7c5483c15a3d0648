//! Metadata about a managed X-window

use crate::{
    core::{Identify, Protocol, Window, Xid},
    geometry::Rectangle,
    x::DisplayServer,
};
use std::{collections::HashSet, fmt};

// =============================== Client =============================

/// Information about a managed top-level [`Window`]
#[derive(Debug, Clone)]
pub(crate) struct Client {
    /// ID of the window
    id:        Window,
    /// Title, refreshed whenever the client renames itself
    name:      String,
    /// Where the window was last placed
    geometry:  Rectangle,
    /// Border width the window was last given
    border:    u32,
    /// The `WM_PROTOCOLS` of the window
    protocols: HashSet<Protocol>,
}

impl Client {
    /// Create a new [`Client`] from what the server knows about the window
    pub(crate) fn new<D: DisplayServer>(display: &D, id: Window) -> Self {
        let client = Self {
            id,
            name: display.window_name(id),
            geometry: Rectangle::default(),
            border: 0,
            protocols: display.window_protocols(id),
        };
        log::info!("window: {}", client);
        client
    }

    /// Name of the window
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Change the name of the window
    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Last placement of the window
    pub(crate) const fn geometry(&self) -> Rectangle {
        self.geometry
    }

    /// Border width of the last placement
    pub(crate) const fn border_width(&self) -> u32 {
        self.border
    }

    /// Record a new placement
    pub(crate) fn place(&mut self, geometry: Rectangle, border_width: u32) {
        self.geometry = geometry;
        self.border = border_width;
    }

    /// Can the window be asked to close itself?
    pub(crate) fn supports_delete(&self) -> bool {
        self.protocols.contains(&Protocol::DeleteWindow)
    }

    /// Close the window, politely if the client allows it
    pub(crate) fn close<D: DisplayServer>(&self, display: &D) -> anyhow::Result<()> {
        if self.supports_delete() {
            display.send_delete_window(self.id)
        } else {
            display.kill_window(self.id)
        }
    }
}

impl Identify for Client {
    fn id(&self) -> Xid {
        self.id
    }
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{:#010x}", self.id)
        } else {
            write!(f, "{} ({:#010x})", self.name, self.id)
        }
    }
}
