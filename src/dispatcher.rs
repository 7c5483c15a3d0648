//! The [`WindowManager`] owns the entity model and is the only thing that
//! changes it. Everything else hands it messages over channels, and
//! [`WindowManager::run`] takes them one at a time.

use crate::{
    config::Config,
    core::{BorderKind, Xid},
    manager::Manager,
    utils::LogError,
    x::{event::XEvent, stream::Request, DisplayServer},
};
use anyhow::{anyhow, Result};
use crossbeam_channel::{at, never, select, Receiver};
use std::time::{Duration, Instant};

/// The receiving ends of everything the dispatcher waits on
#[derive(Debug)]
pub(crate) struct Channels {
    /// Commands from control clients
    pub(crate) requests: Receiver<Request>,
    /// Events from the X server
    pub(crate) events:   Receiver<XEvent>,
    /// Failures of the threads feeding the other channels
    pub(crate) errors:   Receiver<anyhow::Error>,
    /// Signals asking the window manager to quit
    pub(crate) signals:  Receiver<i32>,
}

// =========================== WindowManager ========================== [[[

/// The window manager state and the loop driving it
#[derive(Debug)]
pub(crate) struct WindowManager<D: DisplayServer> {
    /// Connection to the display
    pub(crate) display:   D,
    /// Monitors, windows and border colors
    pub(crate) manager:   Manager,
    /// The selected window, if any
    pub(crate) selection: Option<Xid>,
    /// How long the selection survives without a command
    timeout:              Duration,
    /// When the selection is cleared
    expiry:               Option<Instant>,
}

impl<D: DisplayServer> WindowManager<D> {
    /// Create a new [`WindowManager`]. Nothing is managed until
    /// [`WindowManager::setup`] is called
    pub(crate) fn new(display: D, config: &Config) -> Result<Self> {
        let manager = Manager::new(&display, config)?;
        Ok(Self {
            display,
            manager,
            selection: None,
            timeout: config.selection_timeout(),
            expiry: None,
        })
    }

    /// Discover the monitors and manage the windows that already exist
    pub(crate) fn setup(&mut self) -> Result<()> {
        self.manager.setup(&self.display)?;
        self.display.flush()
    }

    /// Handle messages until a signal arrives. Losing the X server is fatal
    pub(crate) fn run(&mut self, channels: Channels) -> Result<()> {
        let Channels {
            mut requests,
            events,
            mut errors,
            signals,
        } = channels;

        log::info!("entering event loop");
        loop {
            let timer = self.expiry.map_or_else(never, at);

            select! {
                recv(signals) -> signal => {
                    log::info!("received signal {:?}, exiting", signal.ok());
                    return Ok(());
                },
                recv(timer) -> _ => self.expire_selection(),
                recv(requests) -> request => match request {
                    Ok(request) => {
                        let reply = self.process_command(&request.tokens);
                        request.reply(reply.as_deref()).log_err();
                    },
                    Err(_) => {
                        log::warn!("control socket is gone, no more commands will be read");
                        requests = never();
                    },
                },
                recv(events) -> event => match event {
                    Ok(event) => self.process_event(event),
                    Err(_) => return Err(anyhow!("lost the connection to the X server")),
                },
                recv(errors) -> error => match error {
                    Ok(e) => log::error!("{:#}", e),
                    Err(_) => errors = never(),
                },
            }

            self.display.flush().log_err();
        }
    }

    /// Run a control command, then update the selection and focus. Returns
    /// the reply for the client
    pub(crate) fn process_command(&mut self, tokens: &[String]) -> Option<String> {
        let previous_window = self.manager.focused_window_id();
        let previous_selection = self.selection;
        log::debug!("command: {}", tokens.join(" "));

        let reply = match self.command(tokens) {
            Ok(reply) => reply,
            Err(e) => {
                log::debug!("command failed: {}", e);
                Some(e.to_string())
            },
        };

        self.reset_selection(previous_selection);
        self.reset_focus(previous_window);
        reply
    }

    /// Handle an X event, then update the focus
    pub(crate) fn process_event(&mut self, event: XEvent) {
        let previous_window = self.manager.focused_window_id();
        log::debug!("event: {:?}", event);

        self.handle_event(event);
        self.reset_focus(previous_window);
    }

    // ============================ Borders =========================== [[[

    /// The color a window's border should have right now
    pub(crate) fn border_kind(&self, id: Xid) -> BorderKind {
        if self.selection == Some(id) {
            BorderKind::Selected
        } else if self.manager.focused_window_id() == Some(id) {
            BorderKind::Focused
        } else {
            BorderKind::Normal
        }
    }

    /// Give a window the border it should have right now
    pub(crate) fn recolor(&self, id: Xid) {
        let pixel = self.manager.color(self.border_kind(id)).pixel;
        self.display.set_border_color(id, pixel).log_err();
    }

    /// Recolor a window that used to be special, if it is still managed
    fn revert(&self, id: Xid) {
        if self.manager.find_window(id).is_some() {
            self.recolor(id);
        }
    }

    // ]]] === Borders ===

    // =========================== Selection ========================== [[[

    /// Highlight a new selection and restart its timer. An untouched
    /// selection only has its timer restarted
    fn reset_selection(&mut self, previous: Option<Xid>) {
        if self.selection == previous {
            if self.selection.is_some() {
                self.expiry = Some(Instant::now() + self.timeout);
            }
            return;
        }

        match self.selection {
            Some(id) => {
                log::info!("select: {:#010x}", id);
                self.recolor(id);
                self.expiry = Some(Instant::now() + self.timeout);
            },
            None => self.expiry = None,
        }

        if let Some(id) = previous {
            self.revert(id);
        }
    }

    /// Forget the selection once it timed out
    pub(crate) fn expire_selection(&mut self) {
        self.expiry = None;
        if let Some(id) = self.selection.take() {
            log::info!("selection expired: {:#010x}", id);
            self.revert(id);
        }
    }

    /// Whether a selection is waiting to expire
    pub(crate) const fn selection_armed(&self) -> bool {
        self.expiry.is_some()
    }

    // ]]] === Selection ===

    /// Raise and give input focus to the focused window of the active monitor
    /// if it changed
    fn reset_focus(&mut self, previous: Option<Xid>) {
        let current = self.manager.focused_window_id();
        if current == previous {
            return;
        }

        if let Some(id) = current {
            self.recolor(id);
            self.display.raise_window(id).log_err();
            self.display.focus_window(id).log_err();

            if let Some((_, client)) = self.manager.find_window(id) {
                log::info!("focus: {}", client);
            }
        }

        if let Some(id) = previous {
            self.revert(id);
        }
    }
}

// ]]] === WindowManager ===

#[cfg(test)]
pub(crate) mod tests {
    use super::{Channels, WindowManager};
    use crate::{
        config::Config,
        core::Identify,
        x::{
            event::XEvent,
            testing::{MockDisplay, MockWindow, Request},
        },
    };
    use crossbeam_channel::Receiver;
    use std::{thread, time::Duration};

    /// A signal that arrives after `timeout`
    fn signal_after(timeout: Duration) -> Receiver<i32> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        thread::spawn(move || {
            thread::sleep(timeout);
            drop(tx.send(signal_hook::consts::signal::SIGTERM));
        });
        rx
    }

    pub(crate) fn line(tokens: &str) -> Vec<String> {
        tokens.split_whitespace().map(ToOwned::to_owned).collect()
    }

    /// A window manager on one 1920x1080 monitor managing the given windows,
    /// with the first window focused
    pub(crate) fn wm(windows: &[u32]) -> WindowManager<MockDisplay> {
        wm_with(MockDisplay::new(), windows)
    }

    /// A window manager on the given display, mapping the windows on the
    /// active monitor. The request log starts out empty
    pub(crate) fn wm_with(display: MockDisplay, windows: &[u32]) -> WindowManager<MockDisplay> {
        let mut config = Config::default();
        config.global.selection_timeout = 10;

        let mut wm = WindowManager::new(display, &config).unwrap();
        wm.setup().unwrap();
        map(&mut wm, windows);
        wm
    }

    /// Map new windows and forget the requests this caused
    pub(crate) fn map(wm: &mut WindowManager<MockDisplay>, windows: &[u32]) {
        for id in windows {
            if !wm.display.windows.borrow().contains_key(id) {
                wm.display.add_window(*id, MockWindow::default());
            }
            wm.process_event(XEvent::MapRequest(*id));
        }
        wm.display.take();
    }

    #[test]
    fn selection_is_highlighted_then_expires() {
        let mut wm = wm(&[0x10, 0x20, 0x30]);
        let (selected, normal) = (wm.manager.selected_border.pixel, wm.manager.normal_border.pixel);

        assert_eq!(wm.process_command(&line("select-window +1")), None);
        assert_eq!(wm.selection, Some(0x20));
        assert!(wm.selection_armed());
        assert_eq!(wm.display.border_color_of(0x20), Some(selected));

        wm.expire_selection();
        assert_eq!(wm.selection, None);
        assert!(!wm.selection_armed());
        assert_eq!(wm.display.border_color_of(0x20), Some(normal));
        // Focus never moved
        assert_eq!(wm.manager.focused_window_id(), Some(0x10));
        assert_eq!(wm.display.border_color_of(0x10), None);
    }

    #[test]
    fn overwritten_selection_reverts_immediately() {
        let mut wm = wm(&[0x10, 0x20, 0x30]);
        let (selected, normal) = (wm.manager.selected_border.pixel, wm.manager.normal_border.pixel);

        wm.process_command(&line("select-window +1"));
        wm.process_command(&line("select-window 0x30"));

        assert_eq!(wm.selection, Some(0x30));
        assert_eq!(wm.display.border_color_of(0x30), Some(selected));
        assert_eq!(wm.display.border_color_of(0x20), Some(normal));
    }

    #[test]
    fn focus_change_raises_and_focuses() {
        let mut wm = wm(&[0x10, 0x20]);
        wm.process_command(&line("focus-window +1"));

        assert_eq!(wm.manager.focused_window_id(), Some(0x20));
        let requests = wm.display.take();
        assert!(requests.contains(&Request::Raise(0x20)));
        assert!(requests.contains(&Request::Focus(0x20)));
        assert!(requests.contains(&Request::BorderColor(0x10, wm.manager.normal_border.pixel)));
        assert!(requests.contains(&Request::BorderColor(0x20, wm.manager.focused_border.pixel)));
    }

    #[test]
    fn errors_are_replies() {
        let mut wm = wm(&[0x10]);
        assert_eq!(
            wm.process_command(&line("frobnicate")),
            Some(String::from("command not found: frobnicate"))
        );
        assert_eq!(
            wm.process_command(&line("ratio half")),
            Some(String::from("invalid ratio: half"))
        );
        assert!(wm.display.take().is_empty());
    }

    #[test]
    fn loop_expires_selection_and_stops_on_signal() {
        let mut wm = wm(&[0x10, 0x20]);
        wm.process_command(&line("select-window -1"));
        assert_eq!(wm.selection, Some(0x20));

        let (_requests_tx, requests) = crossbeam_channel::unbounded();
        let (_events_tx, events) = crossbeam_channel::unbounded();
        let (errors_tx, errors) = crossbeam_channel::unbounded();
        drop(errors_tx);

        wm.run(Channels {
            requests,
            events,
            errors,
            signals: signal_after(Duration::from_millis(200)),
        })
        .unwrap();

        assert_eq!(wm.selection, None);
        assert_eq!(wm.display.border_color_of(0x20), Some(wm.manager.normal_border.pixel));
        assert!(wm.manager.windows().any(|c| c.id() == 0x20));
    }

    #[test]
    fn losing_the_display_is_fatal() {
        let mut wm = wm(&[]);
        let (_requests_tx, requests) = crossbeam_channel::unbounded();
        let (events_tx, events) = crossbeam_channel::unbounded::<XEvent>();
        let (_errors_tx, errors) = crossbeam_channel::unbounded();
        let (_signals_tx, signals) = crossbeam_channel::unbounded();
        drop(events_tx);

        assert!(wm
            .run(Channels {
                requests,
                events,
                errors,
                signals,
            })
            .is_err());
    }
}

// vim: ft=rust:et:sw=4:ts=2:sts=4:tw=99:fdm=marker:fmr=[[[,]]]:
