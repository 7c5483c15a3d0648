//! X11 Events

use crate::{
    core::{Atom, Window},
    x::xconnection::Atoms,
};
use x11rb::protocol::{
    xproto::{ConfigWindow, ConfigureRequestEvent, StackMode},
    Event,
};

// ============================== XEvent ==============================

/// Low-level wrapper around X-server events. Only the events the window
/// manager reacts to are kept, everything else becomes [`XEvent::Unknown`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum XEvent {
    /// A client is requesting to be mapped
    MapRequest(Window),
    /// A client has unmapped a window
    UnmapNotify(Window),
    /// A client has destroyed a window
    DestroyNotify(Window),
    /// Request for configuration from a client
    ConfigureRequest(ConfigureRequestData),
    /// A client window changed its configuration. Root window notifications
    /// are reported as [`XEvent::ScreenChange`]
    ConfigureNotify(Window),
    /// The title of a window was changed
    PropertyNotify(Window),
    /// The output topology has changed
    ScreenChange,
    /// Unknown event type, used as a catchall for events not tracked by
    /// ltwm
    Unknown(u8),
}

/// Data associated with a configure request. Only the fields the client set
/// in its value mask are `Some`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConfigureRequestData {
    /// The window associated with the event
    pub(crate) id:           Window,
    /// Sibling window of id. Used if stack_mode is set
    pub(crate) sibling:      Option<Window>,
    /// X coordinate to configure to
    pub(crate) x:            Option<i32>,
    /// Y coordinate to configure to
    pub(crate) y:            Option<i32>,
    /// Window width to configure to
    pub(crate) width:        Option<u32>,
    /// Window height to configure to
    pub(crate) height:       Option<u32>,
    /// Border width to configure to
    pub(crate) border_width: Option<u32>,
    /// Stack mode to configure to
    pub(crate) stack_mode:   Option<StackMode>,
}

impl ConfigureRequestData {
    /// A request for `window` that sets nothing
    pub(crate) const fn empty(window: Window) -> Self {
        Self {
            id:           window,
            sibling:      None,
            x:            None,
            y:            None,
            width:        None,
            height:       None,
            border_width: None,
            stack_mode:   None,
        }
    }
}

impl From<&ConfigureRequestEvent> for ConfigureRequestData {
    fn from(event: &ConfigureRequestEvent) -> Self {
        let mask = u16::from(event.value_mask);
        let is_set = |flag: ConfigWindow| mask & u16::from(flag) != 0;

        Self {
            id:           event.window,
            sibling:      is_set(ConfigWindow::SIBLING).then(|| event.sibling),
            x:            is_set(ConfigWindow::X).then(|| i32::from(event.x)),
            y:            is_set(ConfigWindow::Y).then(|| i32::from(event.y)),
            width:        is_set(ConfigWindow::WIDTH).then(|| u32::from(event.width)),
            height:       is_set(ConfigWindow::HEIGHT).then(|| u32::from(event.height)),
            border_width: is_set(ConfigWindow::BORDER_WIDTH)
                .then(|| u32::from(event.border_width)),
            stack_mode:   is_set(ConfigWindow::STACK_MODE).then(|| event.stack_mode),
        }
    }
}

/// Is the property one that carries the window's title?
fn is_name_atom(atom: Atom, atoms: &Atoms) -> bool {
    atom == atoms.WM_NAME || atom == atoms._NET_WM_NAME
}

/// Translate a raw [`Event`] into an [`XEvent`]
pub(crate) fn translate(event: &Event, root: Window, atoms: &Atoms) -> XEvent {
    match event {
        Event::MapRequest(e) => XEvent::MapRequest(e.window),
        Event::UnmapNotify(e) => XEvent::UnmapNotify(e.window),
        Event::DestroyNotify(e) => XEvent::DestroyNotify(e.window),
        Event::ConfigureRequest(e) => XEvent::ConfigureRequest(e.into()),
        Event::ConfigureNotify(e) if e.window == root => XEvent::ScreenChange,
        Event::ConfigureNotify(e) => XEvent::ConfigureNotify(e.window),
        Event::PropertyNotify(e) if is_name_atom(e.atom, atoms) => XEvent::PropertyNotify(e.window),
        Event::RandrScreenChangeNotify(_) => XEvent::ScreenChange,
        Event::Error(e) => {
            log::warn!("X11 error: {:?}", e);
            XEvent::Unknown(0)
        },
        other => XEvent::Unknown(other.response_type()),
    }
}
