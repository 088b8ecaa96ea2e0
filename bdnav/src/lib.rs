/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Bridges a Blu-ray navigation engine and a media playback engine.
//!
//! # Overview
//!
//! Neither engine knows about the other. The navigation engine owns the disc structure
//! (playlists, clips, chapters, menus, button graphics) and reacts to user input with its own
//! logic. The playback engine decodes and presents a continuous stream. This crate is the
//! adapter that keeps them in lock-step:
//!
//! 1. [`overlay`] decodes the navigation engine's palette + run-length overlay graphics and
//!    composites them for display.
//! 2. [`info`] holds the last observed value of every navigation event kind.
//! 3. [`pump`] drains the navigation event queue and derives what has to happen next.
//! 4. [`timestamp`] translates playback positions into navigation timestamps.
//! 5. [`controller`] decides which stream file the playback engine must load and where.
//! 6. [`input`] routes key and pointer input into the navigation engine.
//!
//! [`session::Session`] owns both engines and ties the pieces together on a single dispatch
//! queue.

pub mod controller;
pub mod engine;
pub mod event;
pub mod info;
pub mod input;
pub mod overlay;
pub mod pump;
pub mod session;
pub mod sim;
pub mod timestamp;
pub mod ycbcr;

pub use session::{
    Dispatcher,
    HostEvent,
    Notification,
    Session,
    SessionConfig,
    SessionError,
};
