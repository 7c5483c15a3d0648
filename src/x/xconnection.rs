//! The connection to the X-Server

use crate::{
    core::{Atom, Protocol, Rgb, Window},
    error::Error,
    geometry::{Point, Rectangle},
    x::{event::ConfigureRequestData, DisplayServer, Output},
};
use anyhow::{Context, Result};
use std::{collections::HashSet, sync::Arc};
use x11rb::{
    atom_manager,
    connection::{Connection, RequestConnection},
    errors::ReplyError,
    protocol::{
        randr::{self, ConnectionExt as _},
        xproto::{
            AtomEnum,
            ChangeWindowAttributesAux,
            ClientMessageEvent,
            ConfigureNotifyEvent,
            ConfigureWindowAux,
            ConnectionExt,
            EventMask,
            InputFocus,
            MapState,
            StackMode,
            CONFIGURE_NOTIFY_EVENT,
        },
        ErrorKind,
    },
    rust_connection::RustConnection,
};

// === Atoms === [[[

/// The [`Atom`]s used by ltwm. See the [Client Properties][1] for the `WM_*`
/// properties and [Application Window Properties][2] for `_NET_WM_NAME`
///
/// [1]: https://tronche.com/gui/x/icccm/sec-4.html#s-4.1.2
/// [2]: https://specifications.freedesktop.org/wm-spec/latest/ar01s05.html
atom_manager! {
    pub(crate) Atoms: AtomsCookie {
        UTF8_STRING,
        // Legacy title, read when `_NET_WM_NAME` is absent
        WM_NAME,
        // Parent of a dialog
        WM_TRANSIENT_FOR,
        WM_PROTOCOLS,
        // Supported clients are asked to close rather than killed
        WM_DELETE_WINDOW,
        WM_TAKE_FOCUS,
        _NET_WM_NAME,
    }
}

// ]]] === Atoms ===

// ============================ XConnection =========================== [[[

/// The main connection to the X-Server
pub(crate) struct XConnection {
    /// Connection to the X-Server, shared with the event reader
    conn:      Arc<RustConnection>,
    /// The [`Atoms`] of the connection
    atoms:     Atoms,
    /// Root window of the screen
    root:      Window,
    /// Default colormap of the screen
    colormap:  u32,
    /// Size of the screen
    screen:    Rectangle,
    /// Whether the server speaks `RandR`
    has_randr: bool,
}

impl XConnection {
    /// Create a new [`XConnection`]
    pub(crate) fn new(conn: Arc<RustConnection>, screen_num: usize) -> Result<Self> {
        log::trace!("creating a new `XConnection`");

        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .context(format!("screen {} does not exist", screen_num))?
            .clone();

        let has_randr = Self::check_extensions(&conn)?;

        log::debug!("interning Atoms");
        let atoms = Atoms::new(conn.as_ref())
            .context("failed to get `Atoms`")?
            .reply()
            .context("failed to get `Atoms` reply")?;

        Ok(Self {
            atoms,
            root: screen.root,
            colormap: screen.default_colormap,
            screen: Rectangle::new(
                0,
                0,
                i32::from(screen.width_in_pixels),
                i32::from(screen.height_in_pixels),
            ),
            has_randr,
            conn,
        })
    }

    // ========================= Accessor ========================= [[[

    /// Shorter way to access the [`RustConnection`]
    pub(crate) fn aux(&self) -> &RustConnection {
        &self.conn
    }

    /// A handle to the connection for a thread that waits on events
    pub(crate) fn shared(&self) -> Arc<RustConnection> {
        Arc::clone(&self.conn)
    }

    /// Return the [`Atoms`]
    pub(crate) const fn atoms(&self) -> Atoms {
        self.atoms
    }

    // ]]] === Accessor ===

    // =========================== Helper ========================= [[[

    /// Check whether the `RandR` extension is available and recent enough. An
    /// absent `RandR` is not fatal; a single monitor is used instead
    fn check_extensions(conn: &RustConnection) -> Result<bool> {
        log::debug!("checking that extensions are installed");

        if conn
            .extension_information(randr::X11_EXTENSION_NAME)
            .context("failed to query extensions")?
            .is_none()
        {
            log::warn!("`randr` X11 extension is unsupported");
            return Ok(false);
        }

        let (min, max) = randr::X11_XML_VERSION;
        match conn.randr_query_version(min, max).map(|cookie| cookie.reply()) {
            Ok(Ok(_)) => {
                log::debug!("`randr` extension is up to date: {}-{}", min, max);
                Ok(true)
            },
            Ok(Err(e)) => {
                log::warn!("`randr` version is unsupported: {}", e);
                Ok(false)
            },
            Err(e) => {
                log::warn!("`randr` version is unsupported: {}", e);
                Ok(false)
            },
        }
    }

    /// Send a [`ClientMessageEvent`] using `WM_PROTOCOLS`
    fn send_protocol_client_message(&self, window: Window, atom: Atom) -> Result<()> {
        let data = [atom, x11rb::CURRENT_TIME, 0, 0, 0];
        let event = ClientMessageEvent::new(32, window, self.atoms.WM_PROTOCOLS, data);
        log::debug!("sending a `ClientMessage` for Window({:#0x}); atom: {}", window, atom);

        self.aux()
            .send_event(false, window, EventMask::NO_EVENT, &event)
            .context(format!("failed to send event. Window: {:#0x}", window))?
            .check()
            .context(format!("failed to check sending event. Window: {:#0x}", window))?;

        Ok(())
    }

    /// Read a text property, `None` if it is missing or empty
    fn get_text_property(&self, window: Window, atom: Atom, type_: Atom) -> Option<String> {
        self.aux()
            .get_property(false, window, atom, type_, 0, u32::MAX)
            .ok()?
            .reply()
            .ok()
            .map(|reply| String::from_utf8_lossy(&reply.value).into_owned())
            .filter(|name| !name.is_empty())
    }

    /// The [`Output`] driven by a connected, active `RandR` output
    fn output_info(&self, output: randr::Output) -> Result<Option<Output>> {
        let info = self
            .aux()
            .randr_get_output_info(output, x11rb::CURRENT_TIME)
            .context("failed to get output info")?
            .reply()
            .context("failed to get output info reply")?;

        if info.connection != randr::Connection::CONNECTED || info.crtc == x11rb::NONE {
            return Ok(None);
        }

        let crtc = self
            .aux()
            .randr_get_crtc_info(info.crtc, x11rb::CURRENT_TIME)
            .context("failed to get crtc info")?
            .reply()
            .context("failed to get crtc info reply")?;

        Ok(Some(Output {
            id:   output,
            name: String::from_utf8_lossy(&info.name).into_owned(),
            rect: Rectangle::new(
                i32::from(crtc.x),
                i32::from(crtc.y),
                i32::from(crtc.width),
                i32::from(crtc.height),
            ),
        }))
    }

    // ]]] === Helper ===
}

impl DisplayServer for XConnection {
    fn root(&self) -> Window {
        self.root
    }

    fn screen_rect(&self) -> Rectangle {
        self.screen
    }

    // ====================== Window Manager ====================== [[[

    fn become_wm(&self) -> Result<()> {
        log::debug!("attempting to become the window manager");

        if let Err(ReplyError::X11Error(err)) = self
            .aux()
            .change_window_attributes(
                self.root,
                &ChangeWindowAttributesAux::new().event_mask(
                    EventMask::SUBSTRUCTURE_REDIRECT
                        | EventMask::SUBSTRUCTURE_NOTIFY
                        | EventMask::STRUCTURE_NOTIFY,
                ),
            )
            .context("failed to change root window attributes")?
            .check()
        {
            if err.error_kind == ErrorKind::Access {
                return Err(Error::AnotherWindowManager.into());
            }

            return Err(anyhow::anyhow!("failed to setup the window manager: {:?}", err));
        }

        if self.has_randr {
            self.aux()
                .randr_select_input(self.root, randr::NotifyMask::SCREEN_CHANGE)
                .context("failed to select `randr` input")?
                .check()
                .context("failed to check selecting `randr` input")?;
        }

        Ok(())
    }

    fn outputs(&self) -> Result<Vec<Output>> {
        if !self.has_randr {
            return Ok(vec![]);
        }

        let resources = self
            .aux()
            .randr_get_screen_resources(self.root)
            .context("failed to get screen resources")?
            .reply()
            .context("failed to get screen resources reply")?;

        let mut outputs: Vec<Output> = vec![];
        for output in resources.outputs {
            if let Some(output) = self.output_info(output)? {
                if outputs.iter().all(|o| o.rect.point != output.rect.point) {
                    outputs.push(output);
                }
            }
        }

        outputs.sort_by(|a, b| a.rect.cmp(&b.rect));
        Ok(outputs)
    }

    // ]]] === Window Manager ===

    // ===================== Window Information ==================== [[[

    fn top_level_windows(&self) -> Result<Vec<(Window, Point)>> {
        log::debug!("getting top-level windows");
        let tree = self
            .aux()
            .query_tree(self.root)
            .context("failed to query the root window tree")?
            .reply()
            .context("failed to get the root window tree")?;

        Ok(tree
            .children
            .into_iter()
            .filter_map(|window| {
                let attr = self.aux().get_window_attributes(window).ok()?.reply().ok()?;
                if attr.override_redirect || attr.map_state == MapState::UNMAPPED {
                    return None;
                }

                let geom = self.aux().get_geometry(window).ok()?.reply().ok()?;
                Some((window, Point::new(i32::from(geom.x), i32::from(geom.y))))
            })
            .collect())
    }

    fn is_override_redirect(&self, window: Window) -> Result<bool> {
        Ok(self
            .aux()
            .get_window_attributes(window)
            .context(format!("failed to get attributes of Window({:#0x})", window))?
            .reply()
            .context(format!("failed to get attributes reply of Window({:#0x})", window))?
            .override_redirect)
    }

    fn window_name(&self, window: Window) -> String {
        log::trace!("requesting Window({:#0x})'s name", window);
        self.get_text_property(window, self.atoms._NET_WM_NAME, self.atoms.UTF8_STRING)
            .or_else(|| self.get_text_property(window, self.atoms.WM_NAME, AtomEnum::ANY.into()))
            .unwrap_or_default()
    }

    fn window_protocols(&self, window: Window) -> HashSet<Protocol> {
        log::trace!("requesting Window({:#0x})'s `WM_PROTOCOLS`", window);
        self.aux()
            .get_property(false, window, self.atoms.WM_PROTOCOLS, AtomEnum::ATOM, 0, u32::MAX)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .and_then(|reply| {
                reply.value32().map(|atoms| {
                    atoms
                        .map(|atom| match atom {
                            a if a == self.atoms.WM_DELETE_WINDOW => Protocol::DeleteWindow,
                            a if a == self.atoms.WM_TAKE_FOCUS => Protocol::TakeFocus,
                            a => Protocol::Other(a),
                        })
                        .collect()
                })
            })
            .unwrap_or_default()
    }

    fn transient_for(&self, window: Window) -> Option<Window> {
        self.aux()
            .get_property(
                false,
                window,
                self.atoms.WM_TRANSIENT_FOR,
                AtomEnum::WINDOW,
                0,
                u32::MAX,
            )
            .ok()?
            .reply()
            .ok()?
            .value32()?
            .next()
            .filter(|&parent| parent != x11rb::NONE)
    }

    fn pointer_window(&self) -> Result<Option<Window>> {
        let reply = self
            .aux()
            .query_pointer(self.root)
            .context("failed to query pointer")?
            .reply()
            .context("failed to get pointer reply")?;

        Ok((reply.child != x11rb::NONE).then(|| reply.child))
    }

    // ]]] === Window Information ===

    // ========================= Actions ========================== [[[

    fn watch_window(&self, window: Window) -> Result<()> {
        self.aux()
            .change_window_attributes(
                window,
                &ChangeWindowAttributesAux::new()
                    .event_mask(EventMask::PROPERTY_CHANGE | EventMask::STRUCTURE_NOTIFY),
            )
            .context(format!("failed to watch Window({:#0x})", window))?
            .check()
            .context(format!("failed to check watching Window({:#0x})", window))?;

        Ok(())
    }

    fn map_window(&self, window: Window) -> Result<()> {
        log::debug!("attempting to map Window({:#0x})", window);
        self.aux()
            .map_window(window)
            .context(format!("failed to map Window({:#0x})", window))?
            .check()
            .context(format!("failed to check mapping Window({:#0x})", window))?;

        Ok(())
    }

    fn set_geometry(&self, window: Window, rect: Rectangle) -> Result<()> {
        log::trace!("placing Window({:#0x}) at {}", window, rect);
        self.aux()
            .configure_window(window, &rect.to_aux())
            .context(format!("failed to place Window({:#0x}) at {}", window, rect))?
            .check()
            .context(format!("failed to check placing Window({:#0x})", window))?;

        Ok(())
    }

    fn set_border_width(&self, window: Window, width: u32) -> Result<()> {
        log::trace!("setting Window({:#0x}) border width {}", window, width);
        self.aux()
            .configure_window(window, &ConfigureWindowAux::new().border_width(width))
            .context(format!(
                "failed to set Window({:#0x}) border width to {}",
                window, width
            ))?
            .check()
            .context(format!("failed to check setting border width to {}", width))?;

        Ok(())
    }

    fn set_border_color(&self, window: Window, pixel: u32) -> Result<()> {
        log::trace!("setting Window({:#0x}) border color {:#08x}", window, pixel);
        self.aux()
            .change_window_attributes(window, &ChangeWindowAttributesAux::new().border_pixel(pixel))
            .context(format!(
                "failed to set Window({:#0x}) border color to {:#08x}",
                window, pixel
            ))?
            .check()
            .context(format!("failed to check setting border color to {:#08x}", pixel))?;

        Ok(())
    }

    fn send_configure_notify(
        &self,
        window: Window,
        rect: Rectangle,
        border_width: u32,
    ) -> Result<()> {
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: window,
            window,
            above_sibling: x11rb::NONE,
            x: rect.x() as i16,
            y: rect.y() as i16,
            width: rect.width().max(1) as u16,
            height: rect.height().max(1) as u16,
            border_width: border_width as u16,
            override_redirect: false,
        };

        self.aux()
            .send_event(false, window, EventMask::STRUCTURE_NOTIFY, &event)
            .context(format!("failed to send `ConfigureNotify` to Window({:#0x})", window))?
            .check()
            .context(format!(
                "failed to check sending `ConfigureNotify` to Window({:#0x})",
                window
            ))?;

        Ok(())
    }

    fn apply_configure_request(&self, request: &ConfigureRequestData) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(request.x)
            .y(request.y)
            .width(request.width)
            .height(request.height)
            .border_width(request.border_width)
            .sibling(request.sibling)
            .stack_mode(request.stack_mode);

        self.aux()
            .configure_window(request.id, &aux)
            .context(format!("failed to configure Window({:#0x})", request.id))?
            .check()
            .context(format!("failed to check configuring Window({:#0x})", request.id))?;

        Ok(())
    }

    fn raise_window(&self, window: Window) -> Result<()> {
        self.aux()
            .configure_window(window, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))
            .context(format!("failed to raise Window({:#0x})", window))?
            .check()
            .context(format!("failed to check raising Window({:#0x})", window))?;

        Ok(())
    }

    fn focus_window(&self, window: Window) -> Result<()> {
        log::debug!("focusing Window({:#0x})", window);
        self.aux()
            .set_input_focus(InputFocus::POINTER_ROOT, window, x11rb::CURRENT_TIME)
            .context(format!(
                "failed to `set_input_focus` for Window({:#0x})",
                window
            ))?
            .check()
            .context(format!(
                "failed to check `set_input_focus` for Window({:#0x})",
                window
            ))?;

        Ok(())
    }

    fn alloc_color(&self, rgb: Rgb) -> Result<u32> {
        let (red, green, blue) = rgb.to_u16();
        Ok(self
            .aux()
            .alloc_color(self.colormap, red, green, blue)
            .context(format!("failed to allocate color {}", rgb))?
            .reply()
            .context(format!("failed to get color {} reply", rgb))?
            .pixel)
    }

    fn send_delete_window(&self, window: Window) -> Result<()> {
        self.send_protocol_client_message(window, self.atoms.WM_DELETE_WINDOW)?;
        log::debug!("closed Window({:#0x})", window);
        Ok(())
    }

    fn kill_window(&self, window: Window) -> Result<()> {
        self.aux()
            .kill_client(window)
            .context(format!("failed to kill Window({:#0x})", window))?
            .check()
            .context(format!("failed to check killing Window({:#0x})", window))?;

        log::debug!("killed client for Window({:#0x})", window);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.aux()
            .flush()
            .context("failed to flush actions to the X-Server")
    }

    // ]]] === Actions ===
}

// ]]] === XConnection ===

// vim: ft=rust:et:sw=4:ts=2:sts=4:tw=99:fdm=marker:fmr=[[[,]]]:
