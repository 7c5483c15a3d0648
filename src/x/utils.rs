//! Various utilities specifically dealing with X

use crate::{
    core::Window,
    error::Error,
    x::{
        event::{self, XEvent},
        xconnection::Atoms,
    },
};
use anyhow::{anyhow, Context, Result};
use crossbeam_channel::Sender;
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};
use x11rb::{connection::Connection, rust_connection::RustConnection};

// ============================= XUtility =============================

/// Wrapper to do basic X11 commands
pub(crate) struct XUtility;

impl XUtility {
    /// Setup the X11 [`Connection`](RustConnection)
    pub(crate) fn setup_connection() -> Result<(Arc<RustConnection>, usize), Error> {
        let (conn, screen_num) = RustConnection::connect(None)?;
        Ok((Arc::new(conn), screen_num))
    }

    /// Read events on a new thread, sending each translated event on
    /// `sender`. The thread ends when the connection breaks, dropping
    /// `sender`, which is how the dispatcher learns that the display is gone
    pub(crate) fn spawn_event_reader(
        conn: Arc<RustConnection>,
        root: Window,
        atoms: Atoms,
        sender: Sender<XEvent>,
        errors: Sender<anyhow::Error>,
    ) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(String::from("ltwm-x11"))
            .spawn(move || loop {
                match conn.wait_for_event() {
                    Ok(raw) => match event::translate(&raw, root, &atoms) {
                        XEvent::Unknown(_) => {},
                        event =>
                            if sender.send(event).is_err() {
                                break;
                            },
                    },
                    Err(e) => {
                        drop(errors.send(anyhow!(e).context("failed to wait for next event")));
                        break;
                    },
                }
            })
            .context("failed to spawn event thread")
    }
}
