//! The [`Manager`] holds every [`Monitor`] and the settings shared between
//! them

use crate::{
    config::Config,
    core::{BorderKind, Color, Identify, Rgb, Xid},
    cycle::{Ring, Selector},
    geometry::Point,
    monitor::{client::Client, Defaults, Monitor},
    utils::LogError,
    x::{DisplayServer, Output},
};
use anyhow::{Context, Result};
use std::mem;

// ============================== Manager ============================= [[[

/// The entity model of the window manager
#[derive(Debug)]
pub(crate) struct Manager {
    /// Every monitor. The focused one is the active monitor
    pub(crate) monitors:        Ring<Monitor>,
    /// Border of the selected window
    pub(crate) selected_border: Color,
    /// Border of windows that are neither selected nor focused
    pub(crate) normal_border:   Color,
    /// Border of the focused window of the active monitor
    pub(crate) focused_border:  Color,
    /// Settings given to monitors when they are created
    pub(crate) defaults:        Defaults,
}

impl Manager {
    /// Create a [`Manager`] without monitors, allocating the configured
    /// border colors
    pub(crate) fn new<D: DisplayServer>(display: &D, config: &Config) -> Result<Self> {
        let global = &config.global;
        let alloc = |rgb: Rgb| -> Result<Color> {
            let pixel = display
                .alloc_color(rgb)
                .context(format!("failed to allocate border color {}", rgb))?;
            Ok(Color::new(rgb, pixel))
        };

        Ok(Self {
            monitors:        Ring::new(),
            selected_border: alloc(global.selected_border_color)?,
            normal_border:   alloc(global.normal_border_color)?,
            focused_border:  alloc(global.focused_border_color)?,
            defaults:        Defaults {
                window_gap:   global.window_gap,
                border_width: global.border_width,
                ratio:        global.split_ratio,
                root_count:   global.root_count,
            },
        })
    }

    /// The color of a border
    pub(crate) const fn color(&self, kind: BorderKind) -> &Color {
        match kind {
            BorderKind::Selected => &self.selected_border,
            BorderKind::Focused => &self.focused_border,
            BorderKind::Normal => &self.normal_border,
        }
    }

    pub(crate) fn color_mut(&mut self, kind: BorderKind) -> &mut Color {
        match kind {
            BorderKind::Selected => &mut self.selected_border,
            BorderKind::Focused => &mut self.focused_border,
            BorderKind::Normal => &mut self.normal_border,
        }
    }

    /// The active monitor
    pub(crate) fn focused(&self) -> Option<&Monitor> {
        self.monitors.focused()
    }

    /// The active monitor, mutably
    pub(crate) fn focused_mut(&mut self) -> Option<&mut Monitor> {
        self.monitors.focused_mut()
    }

    /// The focused window of the active monitor
    pub(crate) fn focused_window_id(&self) -> Option<Xid> {
        self.focused().and_then(Monitor::focused_id)
    }

    /// Every managed window
    pub(crate) fn windows(&self) -> impl Iterator<Item = &Client> + '_ {
        self.monitors.iter().flat_map(|m| m.windows.iter())
    }

    /// Find a managed window and the monitor holding it
    pub(crate) fn find_window(&self, id: Xid) -> Option<(&Monitor, &Client)> {
        self.monitors.iter().find_map(|monitor| {
            monitor
                .windows
                .get_for(&Selector::Ident(id))
                .map(|client| (monitor, client))
        })
    }

    /// The monitor holding a managed window
    pub(crate) fn monitor_of_mut(&mut self, id: Xid) -> Option<&mut Monitor> {
        let holds = |monitor: &Monitor| monitor.windows.contains(id);
        self.monitors.get_for_mut(&Selector::Condition(&holds))
    }

    /// The first monitor containing the point
    pub(crate) fn find_monitor_at(&self, point: Point) -> Option<&Monitor> {
        self.monitor_index_at(point)
            .and_then(|idx| self.monitors.get_for(&Selector::Index(idx)))
    }

    /// Position in the ring of the first monitor containing the point
    fn monitor_index_at(&self, point: Point) -> Option<usize> {
        let contains = |m: &Monitor| m.geometry().contains(point);
        self.monitors.index_for(&Selector::Condition(&contains))
    }

    /// The managed window under the pointer
    pub(crate) fn find_window_at_pointer<D: DisplayServer>(
        &self,
        display: &D,
    ) -> Option<(&Monitor, &Client)> {
        display
            .pointer_window()
            .log_err()
            .flatten()
            .and_then(|id| self.find_window(id))
    }

    /// Arrange the windows of every monitor
    pub(crate) fn arrange_all<D: DisplayServer>(&mut self, display: &D) {
        for monitor in self.monitors.iter_mut() {
            monitor.arrange(display);
        }
    }

    // ============================ Startup =========================== [[[

    /// Discover the monitors, adopt the windows that are already mapped, and
    /// arrange everything
    pub(crate) fn setup<D: DisplayServer>(&mut self, display: &D) -> Result<()> {
        self.monitors = discover(display)
            .into_iter()
            .map(|output| Monitor::new(output.id, &output.name, output.rect, self.defaults))
            .collect();

        self.adopt_windows(display)?;
        self.arrange_all(display);
        Ok(())
    }

    /// Manage every mapped top-level window. Each one goes to the monitor
    /// containing its origin, else to the active monitor
    fn adopt_windows<D: DisplayServer>(&mut self, display: &D) -> Result<()> {
        let windows = display
            .top_level_windows()
            .context("failed to query existing windows")?;

        for (id, origin) in windows {
            let client = Client::new(display, id);
            display.set_border_color(id, self.normal_border.pixel).log_err();
            display.watch_window(id).log_err();

            let monitor = match self.monitor_index_at(origin) {
                Some(idx) => self.monitors.get_for_mut(&Selector::Index(idx)),
                None => self.monitors.focused_mut(),
            };

            if let Some(monitor) = monitor {
                log::debug!("adopting {} on {}", client, monitor);
                monitor.windows.insert(client);
            }
        }

        if let Some(id) = self.focused_window_id() {
            display.set_border_color(id, self.focused_border.pixel).log_err();
        }

        Ok(())
    }

    // ]]] === Startup ===

    // ============================ Topology ========================== [[[

    /// Rediscover the monitors after the outputs changed. Monitors whose
    /// area survives keep their windows and settings; windows of monitors
    /// that vanished move to the monitor containing their origin, else to
    /// the first monitor
    pub(crate) fn refresh_monitors<D: DisplayServer>(&mut self, display: &D) {
        let outputs = discover(display);

        let unchanged = outputs.len() == self.monitors.len()
            && outputs
                .iter()
                .zip(self.monitors.iter())
                .all(|(o, m)| o.name == m.name() && o.rect == m.geometry());
        if unchanged {
            log::debug!("screen change: monitors unchanged");
            return;
        }

        let active = self.focused().map(Monitor::geometry);
        let mut previous = mem::take(&mut self.monitors);

        for output in outputs {
            let rect = output.rect;
            let same_area = |m: &Monitor| m.geometry() == rect;

            let monitor = match previous.remove_for(&Selector::Condition(&same_area)) {
                Some(mut monitor) => {
                    monitor.relabel(output.id, &output.name);
                    monitor
                },
                None => Monitor::new(output.id, &output.name, rect, self.defaults),
            };
            self.monitors.insert(monitor);
        }

        let mut orphans = Vec::new();
        while let Some(mut gone) = previous.remove_for(&Selector::Index(0)) {
            log::info!("monitor removed: {}", gone);
            while let Some(client) = gone.windows.remove_for(&Selector::Index(0)) {
                orphans.push(client);
            }
        }

        for client in orphans {
            let idx = self.monitor_index_at(client.geometry().point).unwrap_or(0);

            if let Some(monitor) = self.monitors.get_for_mut(&Selector::Index(idx)) {
                log::debug!("moving {} to {}", client, monitor);
                monitor.windows.insert(client);
            }
        }

        if let Some(rect) = active {
            let same_area = |m: &Monitor| m.geometry() == rect;
            self.monitors.focus_for(&Selector::Condition(&same_area));
        }

        self.arrange_all(display);
    }

    // ]]] === Topology ===
}

// ]]] === Manager ===

/// The outputs to create monitors for. Without usable outputs the whole
/// screen is one monitor, identified by the root window
fn discover<D: DisplayServer>(display: &D) -> Vec<Output> {
    let outputs = display.outputs().log_err().unwrap_or_default();
    if outputs.is_empty() {
        return vec![Output {
            id:   display.root(),
            name: String::new(),
            rect: display.screen_rect(),
        }];
    }
    outputs
}

#[cfg(test)]
mod tests {
    use super::Manager;
    use crate::{
        config::Config,
        core::Identify,
        geometry::{Point, Rectangle},
        monitor::Monitor,
        x::{
            testing::{MockDisplay, MockWindow, Request, ROOT},
            Output,
        },
    };

    const LEFT: Rectangle = Rectangle::new(0, 0, 1920, 1080);
    const RIGHT: Rectangle = Rectangle::new(1920, 0, 1280, 1024);

    fn mapped(x: i32, y: i32) -> MockWindow {
        MockWindow {
            mapped_at: Some(Point::new(x, y)),
            ..MockWindow::default()
        }
    }

    fn names(manager: &Manager) -> Vec<String> {
        manager.monitors.iter().map(|m| m.name().to_owned()).collect()
    }

    fn windows_of(monitor: &Monitor) -> Vec<u32> {
        monitor.windows.iter().map(Identify::id).collect()
    }

    #[test]
    fn whole_screen_without_outputs() {
        let display = MockDisplay::new();
        let mut manager = Manager::new(&display, &Config::default()).unwrap();
        manager.setup(&display).unwrap();

        assert_eq!(manager.monitors.len(), 1);
        let monitor = manager.focused().unwrap();
        assert_eq!(monitor.id(), ROOT);
        assert_eq!(monitor.geometry(), LEFT);
    }

    #[test]
    fn adopts_mapped_windows() {
        let display = MockDisplay::with_outputs(&[("DP-1", LEFT), ("HDMI-1", RIGHT)]);
        display.add_window(0x10, mapped(10, 10));
        display.add_window(0x20, mapped(2000, 10));
        display.add_window(0x30, mapped(-50, -50));
        display.add_window(0x40, MockWindow::default());

        let mut manager = Manager::new(&display, &Config::default()).unwrap();
        manager.setup(&display).unwrap();

        assert_eq!(names(&manager), vec!["DP-1", "HDMI-1"]);
        // Off-screen windows land on the active monitor
        assert_eq!(windows_of(manager.monitors.iter().next().unwrap()), vec![0x10, 0x30]);
        assert_eq!(windows_of(manager.monitors.iter().nth(1).unwrap()), vec![0x20]);

        let requests = display.take();
        assert!(requests.contains(&Request::Watch(0x20)));
        assert!(!requests.contains(&Request::Watch(0x40)));
        assert_eq!(display_color(&requests, 0x10), Some(manager.focused_border.pixel));
        assert_eq!(display_color(&requests, 0x20), Some(manager.normal_border.pixel));
    }

    fn display_color(requests: &[Request], window: u32) -> Option<u32> {
        requests.iter().rev().find_map(|r| match r {
            Request::BorderColor(w, pixel) if *w == window => Some(*pixel),
            _ => None,
        })
    }

    #[test]
    fn find_helpers() {
        let display = MockDisplay::with_outputs(&[("DP-1", LEFT), ("HDMI-1", RIGHT)]);
        display.add_window(0x20, mapped(2000, 10));

        let mut manager = Manager::new(&display, &Config::default()).unwrap();
        manager.setup(&display).unwrap();

        assert_eq!(manager.find_monitor_at(Point::new(1920, 5)).map(Monitor::name), Some("HDMI-1"));
        assert!(manager.find_monitor_at(Point::new(5000, 5)).is_none());
        assert_eq!(manager.find_window(0x20).map(|(m, _)| m.name()), Some("HDMI-1"));
        assert!(manager.find_window(0x99).is_none());

        assert!(manager.find_window_at_pointer(&display).is_none());
        display.point_at(Some(0x20));
        assert_eq!(manager.find_window_at_pointer(&display).map(|(_, c)| c.id()), Some(0x20));
    }

    #[test]
    fn unchanged_topology_is_a_noop() {
        let display = MockDisplay::with_outputs(&[("DP-1", LEFT)]);
        display.add_window(0x10, mapped(10, 10));

        let mut manager = Manager::new(&display, &Config::default()).unwrap();
        manager.setup(&display).unwrap();
        display.take();

        manager.refresh_monitors(&display);
        assert!(display.take().is_empty());
    }

    #[test]
    fn added_monitor_starts_with_defaults() {
        let display = MockDisplay::with_outputs(&[("DP-1", LEFT)]);
        display.add_window(0x10, mapped(10, 10));

        let mut manager = Manager::new(&display, &Config::default()).unwrap();
        manager.setup(&display).unwrap();
        manager.focused_mut().unwrap().ratio = 0.4;

        display.outputs.replace(vec![
            Output {
                id:   0x40,
                name: String::from("DP-1"),
                rect: LEFT,
            },
            Output {
                id:   0x51,
                name: String::from("HDMI-1"),
                rect: RIGHT,
            },
        ]);
        manager.refresh_monitors(&display);

        assert_eq!(names(&manager), vec!["DP-1", "HDMI-1"]);
        assert_eq!(manager.focused().map(Monitor::name), Some("DP-1"));

        let kept = manager.monitors.iter().next().unwrap();
        assert!((kept.ratio - 0.4).abs() < f64::EPSILON);
        assert_eq!(windows_of(kept), vec![0x10]);

        let added = manager.monitors.iter().nth(1).unwrap();
        assert_eq!(added.id(), 0x51);
        assert_eq!(added.geometry(), RIGHT);
        assert!((added.ratio - manager.defaults.ratio).abs() < f64::EPSILON);
        assert_eq!(added.root_count, manager.defaults.root_count);
        assert!(windows_of(added).is_empty());
    }

    #[test]
    fn vanished_monitor_hands_over_its_windows() {
        let display = MockDisplay::with_outputs(&[("DP-1", LEFT), ("HDMI-1", RIGHT)]);
        display.add_window(0x10, mapped(10, 10));
        display.add_window(0x20, mapped(2000, 10));

        let mut manager = Manager::new(&display, &Config::default()).unwrap();
        manager.setup(&display).unwrap();
        manager.monitors.focus(1);
        manager.focused_mut().unwrap().ratio = 0.4;

        display.outputs.replace(vec![Output {
            id:   0x50,
            name: String::from("HDMI-1"),
            rect: RIGHT,
        }]);
        manager.refresh_monitors(&display);

        assert_eq!(names(&manager), vec!["HDMI-1"]);
        let monitor = manager.focused().unwrap();
        assert_eq!(monitor.id(), 0x50);
        assert!((monitor.ratio - 0.4).abs() < f64::EPSILON);
        assert_eq!(windows_of(monitor), vec![0x20, 0x10]);
        assert_eq!(display.geometry_of(0x10).map(|r| r.x() >= 1920), Some(true));
    }
}

// vim: ft=rust:et:sw=4:ts=2:sts=4:tw=99:fdm=marker:fmr=[[[,]]]:
