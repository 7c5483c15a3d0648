//! Execution of control commands.
//!
//! Arguments are parsed before anything changes, so a malformed command has
//! no effect besides its error reply. A well formed command whose target
//! can't be found, or whose new value is out of range, does nothing.

use crate::{
    core::{BorderKind, Color, Identify, Rgb, State, Xid, MAX_RATIO, MIN_RATIO},
    cycle::Selector,
    dispatcher::WindowManager,
    error::Error,
    geometry::Edge,
    layout::Layout,
    messages::{parse_size, Adjust, Command, Message, Target},
    monitor::{Defaults, Monitor},
    utils::LogError,
    x::DisplayServer,
};

/// The outcome of a command: an optional line for the client, or an error
/// that is sent instead
type Reply = Result<Option<String>, Error>;

/// Relative ratio changes are rounded to this many decimal places
const RATIO_PRECISION: f64 = 1e6;

/// Get the focused monitor or bail out of the command without a reply
macro_rules! focused_monitor {
    ($wm:expr) => {
        match $wm.manager.focused_mut() {
            Some(monitor) => monitor,
            None => return Ok(None),
        }
    };
}

impl<D: DisplayServer> WindowManager<D> {
    /// Parse and run a control command, returning the reply for the client
    pub(crate) fn command(&mut self, tokens: &[String]) -> Reply {
        match Message::parse(tokens)? {
            Command::SelectedBorder { color } =>
                self.border_color(BorderKind::Selected, color.as_deref()),
            Command::NormalBorder { color } =>
                self.border_color(BorderKind::Normal, color.as_deref()),
            Command::FocusedBorder { color } =>
                self.border_color(BorderKind::Focused, color.as_deref()),
            Command::BorderWidth { default, size } => self.monitor_setting(
                "border width",
                default,
                size.as_deref(),
                |d| &mut d.border_width,
                |m| &mut m.border_width,
            ),
            Command::WindowGap { default, size } => self.monitor_setting(
                "window gap",
                default,
                size.as_deref(),
                |d| &mut d.window_gap,
                |m| &mut m.window_gap,
            ),
            Command::RootCount { count } => self.root_count(count.as_deref()),
            Command::Ratio { ratio } => self.ratio(ratio.as_deref()),
            Command::Padding { direction, size } => self.padding(&direction, size.as_deref()),
            Command::Fullscreen { state } => self.flag(state.as_deref(), |m| &mut m.fullscreen),
            Command::SelectLayout { layout } => self.select_layout(layout.as_deref()),
            Command::ResetLayout => {
                let monitor = focused_monitor!(self);
                monitor.reset();
                monitor.arrange(&self.display);
                Ok(None)
            },
            Command::MirrorLayout { state } => self.flag(state.as_deref(), |m| &mut m.mirrored),
            Command::FocusMonitor { selector } => self.focus_monitor(&selector),
            Command::FocusWindow { selector } => self.focus_window(selector.as_deref()),
            Command::SelectWindow { selector } => self.select_window(&selector),
            Command::MoveWindow { selector } => self.move_window(selector.as_deref()),
            Command::RootWindow { focus, selector } => self.root_window(focus, selector.as_deref()),
            Command::CloseWindow { selector } => self.close_window(selector.as_deref()),
        }
    }

    // ============================ Settings ========================== [[[

    /// `selected-border`, `normal-border`, `focused-border`
    fn border_color(&mut self, kind: BorderKind, color: Option<&str>) -> Reply {
        let rgb = match color {
            None => return Ok(Some(self.manager.color(kind).to_string())),
            Some(color) => color.parse::<Rgb>()?,
        };

        let pixel = match self.display.alloc_color(rgb).log_err() {
            Some(pixel) => pixel,
            None => return Ok(None),
        };
        *self.manager.color_mut(kind) = Color::new(rgb, pixel);

        let wearing = self
            .manager
            .windows()
            .map(Identify::id)
            .filter(|&id| self.border_kind(id) == kind)
            .collect::<Vec<_>>();
        for id in wearing {
            self.recolor(id);
        }

        Ok(None)
    }

    /// `border-width` and `window-gap`. With `-default` only monitors created
    /// later are affected
    fn monitor_setting(
        &mut self,
        name: &'static str,
        default: bool,
        size: Option<&str>,
        of_defaults: fn(&mut Defaults) -> &mut u32,
        of_monitor: fn(&mut Monitor) -> &mut u32,
    ) -> Reply {
        let size = size.map(|s| parse_size(name, s)).transpose()?;

        if default {
            let value = of_defaults(&mut self.manager.defaults);
            return Ok(match size {
                Some(size) => {
                    *value = size;
                    None
                },
                None => Some(value.to_string()),
            });
        }

        let monitor = focused_monitor!(self);
        match size {
            Some(size) => {
                *of_monitor(monitor) = size;
                monitor.arrange(&self.display);
                Ok(None)
            },
            None => Ok(Some(of_monitor(monitor).to_string())),
        }
    }

    /// `root-count`. Counts outside of one to the number of windows are
    /// ignored
    fn root_count(&mut self, count: Option<&str>) -> Reply {
        let adjust = count
            .map(|s| Adjust::<isize>::parse("root count", s))
            .transpose()?;
        let monitor = focused_monitor!(self);

        let adjust = match adjust {
            Some(adjust) => adjust,
            None => return Ok(Some(monitor.root_count.to_string())),
        };

        match adjust.apply(monitor.root_count as isize) {
            Some(count) if count >= 1 && count as usize <= monitor.windows.len() => {
                monitor.root_count = count as usize;
                monitor.arrange(&self.display);
            },
            count => log::debug!("root count {:?} is out of range", count),
        }

        Ok(None)
    }

    /// `ratio`. Ratios outside of `[MIN_RATIO, MAX_RATIO]` are ignored
    fn ratio(&mut self, ratio: Option<&str>) -> Reply {
        let adjust = ratio.map(|s| Adjust::<f64>::parse("ratio", s)).transpose()?;
        let monitor = focused_monitor!(self);

        let adjust = match adjust {
            Some(adjust) => adjust,
            None => return Ok(Some(monitor.ratio.to_string())),
        };

        let ratio = adjust
            .apply(monitor.ratio)
            .map(|ratio| (ratio * RATIO_PRECISION).round() / RATIO_PRECISION);
        match ratio {
            Some(ratio) if (MIN_RATIO..=MAX_RATIO).contains(&ratio) => {
                monitor.ratio = ratio;
                monitor.arrange(&self.display);
            },
            ratio => log::debug!("ratio {:?} is out of range", ratio),
        }

        Ok(None)
    }

    /// `padding <direction> [size]`
    fn padding(&mut self, direction: &str, size: Option<&str>) -> Reply {
        let edge = direction.parse::<Edge>()?;
        let size = size.map(|s| parse_size("padding", s)).transpose()?;
        let monitor = focused_monitor!(self);

        match size {
            Some(size) => {
                monitor.padding.set(edge, size);
                monitor.arrange(&self.display);
                Ok(None)
            },
            None => Ok(Some(monitor.padding.get(edge).to_string())),
        }
    }

    /// `fullscreen` and `mirror-layout`
    fn flag(
        &mut self,
        state: Option<&str>,
        field: fn(&mut Monitor) -> &mut bool,
    ) -> Reply {
        let state = state.map(str::parse::<State>).transpose()?;
        let monitor = focused_monitor!(self);
        let current = *field(monitor);

        match state {
            Some(state) => {
                let wanted = state.apply(current);
                if wanted != current {
                    *field(monitor) = wanted;
                    monitor.arrange(&self.display);
                }
                Ok(None)
            },
            None => Ok(Some(current.to_string())),
        }
    }

    /// `select-layout [±N|name]`
    fn select_layout(&mut self, layout: Option<&str>) -> Reply {
        let invalid = |value: &str| Error::InvalidArgument {
            name:  "layout",
            value: value.to_owned(),
        };
        let monitor = focused_monitor!(self);

        match layout {
            None => Ok(monitor.layouts.focused().map(ToString::to_string)),
            Some(count) if count.starts_with('+') || count.starts_with('-') => {
                let count = count.parse::<isize>().map_err(|_| invalid(count))?;
                monitor.layouts.focus(count);
                monitor.arrange(&self.display);
                Ok(None)
            },
            Some(name) => {
                let layout = name.parse::<Layout>().map_err(|_| invalid(name))?;
                let previous = monitor.layouts.focused().copied();
                monitor.layouts.focus_for(&Selector::Ident(layout.id()));

                if monitor.layouts.focused().copied() != previous {
                    monitor.arrange(&self.display);
                }
                Ok(None)
            },
        }
    }

    // ]]] === Settings ===

    // ============================ Windows =========================== [[[

    /// Find the monitor and window a [`Target`] points at. A relative target
    /// counts from the focused window of the active monitor, skipping it
    fn resolve(&self, target: Target) -> Option<(Xid, Xid)> {
        let found = match target {
            Target::Pointer => self.manager.find_window_at_pointer(&self.display),
            Target::Id(id) => self.manager.find_window(id),
            Target::Relative(n) => {
                let monitor = self.manager.focused()?;
                monitor.windows.select(n).map(|client| (monitor, client))
            },
            Target::Absolute(n) => {
                let monitor = self.manager.focused()?;
                monitor
                    .windows
                    .get_for(&Selector::Index(n - 1))
                    .map(|client| (monitor, client))
            },
        };

        found.map(|(monitor, client)| (monitor.id(), client.id()))
    }

    /// The monitor and window of the selection, if it is still managed
    fn resolve_selection(&self, selection: Option<Xid>) -> Option<(Xid, Xid)> {
        selection
            .and_then(|id| self.manager.find_window(id))
            .map(|(monitor, client)| (monitor.id(), client.id()))
    }

    /// Make the monitor active and focus the window on it
    fn focus_on(&mut self, monitor: Xid, window: Xid) {
        self.manager.monitors.focus_for(&Selector::Ident(monitor));
        if let Some(monitor) = self.manager.monitors.get_for_mut(&Selector::Ident(monitor)) {
            monitor.windows.focus_for(&Selector::Ident(window));
            if monitor.fullscreen {
                monitor.arrange(&self.display);
            }
        }
    }

    /// Arrange a monitor after its windows were reordered
    fn arrange_monitor(&mut self, monitor: Xid) {
        if let Some(monitor) = self.manager.monitors.get_for_mut(&Selector::Ident(monitor)) {
            monitor.arrange(&self.display);
        }
    }

    /// `focus-monitor <±N|N>`
    fn focus_monitor(&mut self, selector: &str) -> Reply {
        match selector.parse::<Target>()? {
            Target::Relative(n) => self.manager.monitors.focus(n),
            Target::Absolute(n) => {
                self.manager.monitors.focus_for(&Selector::Index(n - 1));
            },
            Target::Pointer | Target::Id(_) =>
                return Err(Error::InvalidArgument {
                    name:  "monitor",
                    value: selector.to_owned(),
                }),
        }

        if let Some(monitor) = self.manager.focused() {
            log::info!("focused monitor: {}", monitor);
        }
        Ok(None)
    }

    /// `focus-window [pointer|0xID|±N|N]`. Without a selector, or with a
    /// relative one while a window is selected, the selection is focused
    fn focus_window(&mut self, selector: Option<&str>) -> Reply {
        let target = parse_target(selector)?;
        let selection = self.selection.take();

        let found = match (target, selection) {
            (None | Some(Target::Relative(_)), Some(_)) => self.resolve_selection(selection),
            (None, None) => None,
            (Some(Target::Relative(n)), None) => {
                let monitor = focused_monitor!(self);
                monitor.windows.focus(n);
                if monitor.fullscreen {
                    monitor.arrange(&self.display);
                }
                None
            },
            (Some(target), _) => self.resolve(target),
        };

        if let Some((monitor, window)) = found {
            self.focus_on(monitor, window);
        }
        Ok(None)
    }

    /// `select-window <0xID|±N|N>`. A target that can't be found clears the
    /// selection
    fn select_window(&mut self, selector: &str) -> Reply {
        let target = selector.parse::<Target>()?;
        self.selection = self.resolve(target).map(|(_, window)| window);
        Ok(None)
    }

    /// `move-window [pointer|0xID|±N|N]`. Swaps the focused window of the
    /// target's monitor with the target. Without a selector the selection is
    /// the target
    fn move_window(&mut self, selector: Option<&str>) -> Reply {
        let target = parse_target(selector)?;
        let selection = self.selection.take();

        let found = match target {
            Some(Target::Relative(n)) => {
                let monitor = focused_monitor!(self);
                monitor.windows.move_focus(n);
                monitor.arrange(&self.display);
                return Ok(None);
            },
            Some(target) => self.resolve(target),
            None => self.resolve_selection(selection),
        };

        if let Some((monitor, window)) = found {
            if let Some(monitor) = self.manager.monitors.get_for_mut(&Selector::Ident(monitor)) {
                monitor.windows.move_focus_for(&Selector::Ident(window));
                monitor.arrange(&self.display);
            }
        }
        Ok(None)
    }

    /// `root-window [-focus] [pointer|0xID|±N|N]`. Without a selector the
    /// selection is promoted, else the focused window
    fn root_window(&mut self, focus: bool, selector: Option<&str>) -> Reply {
        let target = parse_target(selector)?;
        let selection = self.selection.take();

        let found = match target {
            Some(target) => self.resolve(target),
            None => self.resolve_selection(selection).or_else(|| {
                let monitor = self.manager.focused()?;
                monitor.focused_id().map(|window| (monitor.id(), window))
            }),
        };

        if let Some((monitor, window)) = found {
            if let Some(m) = self.manager.monitors.get_for_mut(&Selector::Ident(monitor)) {
                m.windows.swap_front_for(&Selector::Ident(window));
            }
            if focus {
                self.focus_on(monitor, window);
            }
            self.arrange_monitor(monitor);
        }
        Ok(None)
    }

    /// `close-window [pointer|0xID|±N|N]`. Without a selector the selection
    /// is closed, else the focused window
    fn close_window(&mut self, selector: Option<&str>) -> Reply {
        let target = parse_target(selector)?;
        let selection = self.selection.take();

        let found = match target {
            Some(target) => self.resolve(target),
            None => self.resolve_selection(selection).or_else(|| {
                let monitor = self.manager.focused()?;
                monitor.focused_id().map(|window| (monitor.id(), window))
            }),
        };

        if let Some((_, client)) = found.and_then(|(_, window)| self.manager.find_window(window)) {
            log::info!("closing {}", client);
            client.close(&self.display).log_err();
        }
        Ok(None)
    }

    // ]]] === Windows ===
}

/// Parse an optional selector
fn parse_target(selector: Option<&str>) -> Result<Option<Target>, Error> {
    selector.map(str::parse::<Target>).transpose()
}


// vim: ft=rust:et:sw=4:ts=2:sts=4:tw=99:fdm=marker:fmr=[[[,]]]:
