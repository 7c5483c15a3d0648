//! A small tiling window manager for X11, controlled over a unix socket

#![deny(
    clippy::all,
    clippy::correctness,
    clippy::nursery,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    unsafe_code
)]
#![warn(
    absolute_paths_not_starting_with_crate,
    bad_style,
    keyword_idents,
    macro_use_extern_crate,
    meta_variable_misuse,
    noop_method_call,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    while_true
)]
#![allow(
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::doc_markdown,
    clippy::similar_names,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::print_stdout
)]
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::too_many_lines
    )
)]

mod cli;
mod commands;
mod config;
mod core;
mod cycle;
mod dispatcher;
mod error;
mod events;
mod geometry;
mod layout;
mod macros;
mod manager;
mod messages;
mod monitor;
mod utils;
mod x;

use anyhow::{Context, Result};
use clap::{crate_version, Parser};
use cli::{Opts, Subcmd};
use colored::Colorize;
use config::Config;
use crossbeam_channel::Sender;
use dispatcher::{Channels, WindowManager};
use signal_hook::{
    consts::signal::{SIGINT, SIGTERM},
    iterator::Signals,
};
use std::{path::Path, process, thread};
use x::{
    stream::{self, Server},
    utils::XUtility,
    xconnection::XConnection,
    DisplayServer,
};

fn main() {
    let opts = Opts::parse();

    let path = opts.config.clone().or_else(Config::default_path);
    let config = match path.as_ref().map_or_else(|| Ok(Config::default()), Config::load) {
        Ok(config) => config,
        Err(e) => ltwm_fatal!("{:#}", e),
    };

    let socket = opts.socket.clone().unwrap_or_else(|| config.socket());

    if let Some(Subcmd::Msg { args }) = &opts.subcommand {
        match stream::send_message(&socket, args) {
            Ok(Some(reply)) => println!("{}", reply),
            Ok(None) => {},
            Err(e) => {
                ltwm_error!("{:#}", e);
                process::exit(1);
            },
        }
        return;
    }

    let _logger = match utils::initialize_logging(&config, &opts) {
        Ok(logger) => logger,
        Err(e) => ltwm_fatal!("failed to start logging: {:#}", e),
    };
    log::info!("starting {} {}", WM_NAME!(), crate_version!());
    match &path {
        Some(path) => log::debug!("{}: {}", "Configuration path".bright_blue(), path.display()),
        None => log::debug!("no configuration file found, using defaults"),
    }
    log::debug!("{}: {:#?}", "Configuration options".bright_blue(), config);

    if let Err(e) = run(&config, &socket) {
        log::error!("{:#}", e);
        ltwm_fatal!("{:#}", e);
    }
}

/// Take over the display and handle messages until asked to quit
fn run(config: &Config, socket: &Path) -> Result<()> {
    let (conn, screen_num) = XUtility::setup_connection()?;
    let display = XConnection::new(conn, screen_num)?;
    display.become_wm()?;

    let server = Server::bind(socket)?;

    let (requests_tx, requests) = crossbeam_channel::unbounded();
    let (events_tx, events) = crossbeam_channel::unbounded();
    let (errors_tx, errors) = crossbeam_channel::unbounded();
    let (signals_tx, signals) = crossbeam_channel::bounded(1);

    watch_signals(signals_tx)?;
    server.spawn(requests_tx, errors_tx.clone())?;
    XUtility::spawn_event_reader(
        display.shared(),
        display.root(),
        display.atoms(),
        events_tx,
        errors_tx,
    )?;

    let mut wm = WindowManager::new(display, config)?;
    wm.setup()?;
    wm.run(Channels {
        requests,
        events,
        errors,
        signals,
    })
}

/// Forward `SIGINT` and `SIGTERM` to the dispatcher
fn watch_signals(sender: Sender<i32>) -> Result<()> {
    let mut signals =
        Signals::new(&[SIGINT, SIGTERM]).context("failed to register signal handlers")?;

    thread::Builder::new()
        .name(String::from("ltwm-signal"))
        .spawn(move || {
            for signal in signals.forever() {
                if sender.send(signal).is_err() {
                    break;
                }
            }
        })
        .context("failed to spawn signal thread")?;

    Ok(())
}
