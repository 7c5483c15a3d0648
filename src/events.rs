//! Handlers for the events the X server sends

use crate::{
    core::{Identify, Window},
    dispatcher::WindowManager,
    monitor::client::Client,
    utils::LogError,
    x::{
        event::{ConfigureRequestData, XEvent},
        DisplayServer,
    },
};

impl<D: DisplayServer> WindowManager<D> {
    /// Apply an event to the entity model
    pub(crate) fn handle_event(&mut self, event: XEvent) {
        match event {
            XEvent::MapRequest(window) => self.map_request(window),
            XEvent::UnmapNotify(window) | XEvent::DestroyNotify(window) => self.unmanage(window),
            XEvent::ConfigureRequest(request) => self.configure_request(&request),
            XEvent::ConfigureNotify(window) | XEvent::PropertyNotify(window) =>
                self.refresh_name(window),
            XEvent::ScreenChange => self.manager.refresh_monitors(&self.display),
            XEvent::Unknown(kind) => log::trace!("ignoring event of type {}", kind),
        }
    }

    /// Manage a window that wants to be shown. Dialogs open next to their
    /// parent, anything else is appended to the active monitor
    fn map_request(&mut self, window: Window) {
        if self.manager.find_window(window).is_some() {
            log::debug!("{:#010x} is already managed", window);
            return;
        }

        match self.display.is_override_redirect(window) {
            Ok(false) => {},
            Ok(true) => {
                log::debug!("{:#010x} is override-redirect, not managing it", window);
                return;
            },
            Err(e) => {
                log::warn!("{:#}", e);
                return;
            },
        }

        let client = Client::new(&self.display, window);
        self.display
            .set_border_color(window, self.manager.normal_border.pixel)
            .log_err();
        self.display.watch_window(window).log_err();

        let parent = self
            .display
            .transient_for(window)
            .filter(|&parent| self.manager.find_window(parent).is_some());

        let host = match parent {
            Some(parent) => self.manager.monitor_of_mut(parent).map(|m| (m, parent)),
            None => None,
        };

        match host {
            Some((monitor, parent)) => {
                log::debug!("{} is a dialog of {:#010x}", client, parent);
                let follow = !monitor.fullscreen && monitor.focused_id() == Some(parent);

                monitor.windows.insert_after_focus(client);
                if follow {
                    monitor.windows.focus_for(&window.into());
                }
                monitor.arrange(&self.display);
            },
            None =>
                if let Some(monitor) = self.manager.focused_mut() {
                    monitor.windows.insert(client);
                    monitor.arrange(&self.display);
                },
        }

        self.display.map_window(window).log_err();
    }

    /// Forget a window that was hidden or destroyed
    fn unmanage(&mut self, window: Window) {
        let monitor = match self.manager.monitor_of_mut(window) {
            Some(monitor) => monitor,
            None => return,
        };

        if let Some(client) = monitor.windows.remove_for(&window.into()) {
            log::info!("unmanaged: {}", client);
        }
        monitor.arrange(&self.display);

        if self.selection == Some(window) {
            self.expire_selection();
        }
    }

    /// Managed windows are told where they are, anything else gets what it
    /// asked for
    fn configure_request(&mut self, request: &ConfigureRequestData) {
        match self.manager.find_window(request.id) {
            Some((_, client)) => {
                log::trace!("restating the geometry of {}", client);
                self.display
                    .send_configure_notify(client.id(), client.geometry(), client.border_width())
                    .log_err();
            },
            None => {
                self.display.apply_configure_request(request).log_err();
            },
        }
    }

    /// Pick up a new title
    fn refresh_name(&mut self, window: Window) {
        let name = self.display.window_name(window);
        if let Some(monitor) = self.manager.monitor_of_mut(window) {
            if let Some(client) = monitor.windows.get_for_mut(&window.into()) {
                if client.name() != name {
                    log::debug!("renamed: {} -> {}", client, name);
                    client.set_name(name);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        core::Identify,
        dispatcher::tests::{line, wm},
        geometry::Rectangle,
        x::{
            event::{ConfigureRequestData, XEvent},
            testing::{MockWindow, Request},
        },
    };

    fn order(windows: impl Iterator<Item = u32>) -> Vec<u32> {
        windows.collect()
    }

    #[test]
    fn map_appends_without_stealing_focus() {
        let mut wm = wm(&[0x10]);
        wm.display.add_window(0x20, MockWindow::default());
        wm.process_event(XEvent::MapRequest(0x20));

        let monitor = wm.manager.focused().unwrap();
        assert_eq!(order(monitor.windows.iter().map(Identify::id)), vec![0x10, 0x20]);
        assert_eq!(monitor.focused_id(), Some(0x10));

        let requests = wm.display.take();
        assert_eq!(requests.first(), Some(&Request::BorderColor(0x20, wm.manager.normal_border.pixel)));
        assert_eq!(requests.get(1), Some(&Request::Watch(0x20)));
        assert_eq!(requests.last(), Some(&Request::Map(0x20)));

        // Mapping it again changes nothing
        wm.process_event(XEvent::MapRequest(0x20));
        assert!(wm.display.take().is_empty());
    }

    #[test]
    fn override_redirect_is_left_alone() {
        let mut wm = wm(&[]);
        wm.display.add_window(0x10, MockWindow {
            override_redirect: true,
            ..MockWindow::default()
        });
        wm.process_event(XEvent::MapRequest(0x10));

        assert!(wm.manager.find_window(0x10).is_none());
        assert!(wm.display.take().is_empty());
    }

    #[test]
    fn dialogs_open_next_to_their_parent() {
        let mut wm = wm(&[0x10, 0x20]);
        wm.display.add_window(0x30, MockWindow {
            transient_for: Some(0x10),
            ..MockWindow::default()
        });
        wm.process_event(XEvent::MapRequest(0x30));

        let monitor = wm.manager.focused().unwrap();
        assert_eq!(order(monitor.windows.iter().map(Identify::id)), vec![0x10, 0x30, 0x20]);
        assert_eq!(monitor.focused_id(), Some(0x30));
        assert!(wm.display.take().contains(&Request::Focus(0x30)));

        // A dialog of an unfocused window doesn't take focus
        wm.display.add_window(0x40, MockWindow {
            transient_for: Some(0x20),
            ..MockWindow::default()
        });
        wm.process_event(XEvent::MapRequest(0x40));
        let monitor = wm.manager.focused().unwrap();
        assert_eq!(order(monitor.windows.iter().map(Identify::id)), vec![0x10, 0x30, 0x40, 0x20]);
        assert_eq!(monitor.focused_id(), Some(0x30));
    }

    #[test]
    fn unmap_removes_and_clears_selection() {
        let mut wm = wm(&[0x10, 0x20, 0x30]);
        wm.process_command(&line("select-window 0x20"));
        wm.display.take();

        wm.process_event(XEvent::UnmapNotify(0x20));
        assert!(wm.manager.find_window(0x20).is_none());
        assert_eq!(wm.selection, None);
        assert!(!wm.selection_armed());
        assert_eq!(wm.display.border_color_of(0x20), None);
        assert_eq!(wm.display.geometry_of(0x30).map(|r| r.height()), Some(1072));

        // Destroying the focused window hands focus to its neighbour
        wm.process_event(XEvent::DestroyNotify(0x10));
        assert_eq!(wm.manager.focused_window_id(), Some(0x30));
        assert!(wm.display.take().contains(&Request::Focus(0x30)));
    }

    #[test]
    fn configure_requests() {
        let mut wm = wm(&[0x10, 0x20]);
        let placed = wm.manager.find_window(0x20).unwrap().1.geometry();

        wm.process_event(XEvent::ConfigureRequest(ConfigureRequestData {
            width: Some(10),
            ..ConfigureRequestData::empty(0x20)
        }));
        assert_eq!(wm.display.take(), vec![Request::ConfigureNotify(0x20, placed, 4)]);

        let request = ConfigureRequestData {
            x: Some(5),
            height: Some(300),
            ..ConfigureRequestData::empty(0x99)
        };
        wm.process_event(XEvent::ConfigureRequest(request));
        assert_eq!(wm.display.take(), vec![Request::ApplyConfigure(request)]);
        assert_ne!(placed, Rectangle::default());
    }

    #[test]
    fn renames() {
        let mut wm = wm(&[0x10]);
        wm.display.windows.borrow_mut().get_mut(&0x10).unwrap().name = String::from("vim");

        wm.process_event(XEvent::PropertyNotify(0x10));
        assert_eq!(wm.manager.find_window(0x10).unwrap().1.name(), "vim");

        wm.display.windows.borrow_mut().get_mut(&0x10).unwrap().name = String::from("man");
        wm.process_event(XEvent::ConfigureNotify(0x10));
        assert_eq!(wm.manager.find_window(0x10).unwrap().1.name(), "man");
    }
}
