/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Owns both engines and serializes everything that happens to them.
//!
//! The playback engine and the host report from their own threads. They do so through a
//! [`Dispatcher`], which only queues [`Notification`]s. The thread owning the [`Session`] drains
//! that queue with [`Session::run_pending`], so no two handlers ever run at the same time and the
//! event pump is never re-entered. Everything the host has to show is sent back on the channel
//! returned by [`Session::host_events`].


use super::{
    controller::{segment_end, PlayController, PlayError, SegmentEnd, StreamLayout},
    engine::{EngineError, NavigationEngine, PlaybackEngine, Property},
    event::NavEventKind,
    info::{resolve_clip, PlayerInfo, StateError},
    input::InputEvent,
    overlay::{Compositor, OverlayCommand, OverlayInstruction, OverlayPlane, OverlayView, PlacedOverlay, Rect},
    pump::{drain_to_end_of_title, pump, Capability, PumpOutcome, StreamSelection},
    timestamp::{current_nav_timestamp, playback_position, title_timestamp},
};
use std::path::{Path, PathBuf};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use tracing::{debug, info, trace, warn};

/// A specialized [`Result`](std::result::Result) type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The directory does not hold a disc structure. Nothing was changed.
    #[error("{} is not a valid disc", .0.display())]
    NotADisc(PathBuf),
    /// The current position could not be resolved while playback depended on it.
    #[error("cannot continue navigation: {source}")]
    State {
        #[from]
        source: StateError,
    },
    #[error("engine call failed: {source}")]
    Engine {
        #[from]
        source: EngineError,
    },
    /// The navigation engine raised an error, read-error or encrypted event. The disc was closed.
    #[error("navigation aborted by {0:?} event")]
    Aborted(NavEventKind),
}

impl From<PlayError> for SessionError {
    fn from(err: PlayError) -> Self {
        match err {
            PlayError::State { source } => Self::State { source },
            PlayError::Engine { source } => Self::Engine { source },
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Jump over the disc's first-play title straight into its first real title.
    pub skip_first_play: bool,
    /// Subdirectory whose presence marks a disc root.
    pub marker_dir: PathBuf,
    /// Directory of stream files, relative to the disc root.
    pub stream_dir: PathBuf,
    pub stream_extension: String,
    /// How many consecutive playlist stops are drained before playback is reloaded anyway.
    pub max_stop_restarts: usize,
    /// Upper bound on single-byte reads when reading a title to its end.
    pub max_eof_reads: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let layout = StreamLayout::default();
        Self {
            skip_first_play: true,
            marker_dir: PathBuf::from("BDMV"),
            stream_dir: layout.stream_dir,
            stream_extension: layout.extension,
            max_stop_restarts: 8,
            max_eof_reads: 4096,
        }
    }
}

impl SessionConfig {
    pub fn stream_layout(&self) -> StreamLayout {
        StreamLayout {
            stream_dir: self.stream_dir.clone(),
            extension: self.stream_extension.clone(),
        }
    }
}

/// Why the playback engine stopped playing a file.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndReason {
    /// The file played to its end.
    Eof,
    Stop,
    Quit,
    Error,
    Redirect,
}

/// Something the playback engine reported.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackEvent {
    /// Seconds into the current file.
    PositionChanged(f64),
    DurationChanged(f64),
    FileLoaded,
    EndFile(EndReason),
    /// Playback jumped, whether by a seek or a stream discontinuity.
    Discontinuity,
    /// Playback resumed after a jump.
    PlaybackRestart,
}

/// Something the navigation engine's overlay callbacks reported.
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayEvent {
    Instruction(OverlayInstruction),
    /// A high-colour overlay. These are accepted but never decoded.
    HighColor {
        plane: OverlayPlane,
        command: OverlayCommand,
        rect: Rect,
    },
    /// The navigation engine stopped delivering overlays.
    Closed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    Playback(PlaybackEvent),
    Overlay(OverlayEvent),
    Input(InputEvent),
}

/// Something the host should show.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostEvent {
    /// Seconds into the current file.
    Position(f64),
    Duration(f64),
    MenuAvailable(bool),
    PopupAvailable(bool),
}

/// Queues notifications for a [`Session`] from any thread.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    sender: Sender<Notification>,
}

impl Dispatcher {

    /// Queues a notification, returning `false` if the session is gone.
    pub fn send(&self, notification: Notification) -> bool {
        self.sender.send(notification).is_ok()
    }

    pub fn playback(&self, event: PlaybackEvent) -> bool {
        self.send(Notification::Playback(event))
    }

    pub fn overlay(&self, event: OverlayEvent) -> bool {
        self.send(Notification::Overlay(event))
    }

    pub fn input(&self, event: InputEvent) -> bool {
        self.send(Notification::Input(event))
    }
}

pub struct Session<N, P> {
    nav: N,
    playback: P,
    config: SessionConfig,
    info: PlayerInfo,
    streams: StreamSelection,
    compositor: Compositor,
    controller: Option<PlayController>,
    pending_seek: bool,
    dispatcher: Dispatcher,
    inbox: Receiver<Notification>,
    host: Sender<HostEvent>,
    host_events: Receiver<HostEvent>,
}

impl<N, P> Session<N, P> where
    N: NavigationEngine,
    P: PlaybackEngine,
{

    pub fn new(nav: N, playback: P, config: SessionConfig) -> Self {

        let (sender, inbox) = unbounded();
        let (host, host_events) = unbounded();

        Self {
            nav,
            playback,
            config,
            info: PlayerInfo::new(),
            streams: StreamSelection::default(),
            compositor: Compositor::new(),
            controller: None,
            pending_seek: false,
            dispatcher: Dispatcher { sender },
            inbox,
            host,
            host_events,
        }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// The receiving end of everything meant for the host.
    pub fn host_events(&self) -> Receiver<HostEvent> {
        self.host_events.clone()
    }

    pub fn overlay_view(&self) -> OverlayView {
        self.compositor.view()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    pub fn navigation(&self) -> &N {
        &self.nav
    }

    pub fn navigation_mut(&mut self) -> &mut N {
        &mut self.nav
    }

    pub fn playback(&self) -> &P {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut P {
        &mut self.playback
    }

    pub fn info(&self) -> &PlayerInfo {
        &self.info
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn controller(&self) -> Option<&PlayController> {
        self.controller.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.controller.is_some()
    }

    /// Opens the disc rooted at `dir` and starts playing it.
    ///
    /// A directory without the disc marker is rejected before either engine is touched.
    pub fn open_disc<D: AsRef<Path>>(&mut self, dir: D) -> SessionResult<()> {

        let dir = dir.as_ref();

        if !dir.join(&self.config.marker_dir).is_dir() {
            return Err(SessionError::NotADisc(dir.to_path_buf()))
        }

        self.close_disc();

        info!("opening {}", dir.display());

        let disc = self.nav.open(dir)?;

        if !disc.bluray_detected {
            warn!("no disc detected at {}", dir.display());
            self.nav.close();
            return Err(SessionError::NotADisc(dir.to_path_buf()))
        }

        self.info.reset();
        self.streams = StreamSelection::default();
        self.pending_seek = false;
        self.compositor.clear();
        self.controller = Some(PlayController::new(dir, self.config.stream_layout()));

        self.nav.play()?;
        self.pump_events()?;

        if disc.first_play_supported && self.config.skip_first_play {
            info!("skipping first play");
            let last_byte = self.nav.title_size().saturating_sub(1);
            self.nav.seek(last_byte)?;
            self.pump_events()?;
            self.end_of_segment()
        } else {
            self.play_current_segment().map(|_| ())
        }
    }

    pub fn close_disc(&mut self) {
        if let Some(controller) = self.controller.take() {
            info!("closing {}", controller.disc_dir().display());
            self.nav.close();
            self.info.reset();
            self.streams = StreamSelection::default();
            self.pending_seek = false;
            self.compositor.clear();
        }
    }

    /// Handles every queued notification in order, returning how many were handled.
    ///
    /// Stops at the first fatal error; later notifications stay queued.
    pub fn run_pending(&mut self) -> SessionResult<usize> {

        let mut handled = 0;

        while let Ok(notification) = self.inbox.try_recv() {
            handled += 1;
            self.dispatch(notification)?;
        }

        Ok(handled)
    }

    pub fn dispatch(&mut self, notification: Notification) -> SessionResult<()> {
        match notification {
            Notification::Playback(event) => self.handle_playback(event),
            Notification::Overlay(event) => {
                self.handle_overlay(event);
                Ok(())
            }
            Notification::Input(event) => self.handle_input(event),
        }
    }

    /// Drains the navigation event queue and forwards capability changes to the host.
    ///
    /// A playlist stop drains again, at most `max_stop_restarts` times in a row, and is then
    /// reported so the caller reloads playback. An error event closes the disc.
    pub fn pump_events(&mut self) -> SessionResult<PumpOutcome> {

        let mut stops = 0;

        loop {

            let report = pump(&mut self.nav, &mut self.playback, &mut self.info, &mut self.streams);

            self.forward_capabilities(&report.capabilities);

            if let Some(kind) = report.error {
                return Err(self.abort(kind))
            }

            if report.outcome != PumpOutcome::PlaylistStopped {
                if stops > 0 {
                    return Ok(PumpOutcome::PlaylistStopped)
                }
                return Ok(report.outcome)
            }

            stops += 1;

            if stops > self.config.max_stop_restarts {
                warn!("playlist stopped {} times in a row", stops);
                return Ok(PumpOutcome::PlaylistStopped)
            }

            debug!("playlist stopped, draining again");
        }
    }

    /// Loads whatever the navigation engine currently points at.
    pub fn play_current_segment(&mut self) -> SessionResult<PathBuf> {

        let controller = self.controller.as_mut().ok_or(StateError::NoDisc)?;

        Ok(controller.play_current_segment(&self.info, &self.nav, &mut self.playback)?)
    }

    /// Moves navigation past the end of the current clip and plays what follows.
    pub fn end_of_segment(&mut self) -> SessionResult<()> {

        let end = match segment_end(&self.info, &self.nav) {
            Ok(end) => end,
            Err(StateError::PositionUnknown(kind)) => {
                debug!("no {:?} observed, reading the title to its end", kind);
                SegmentEnd::EndOfPlaylist
            }
            Err(err) => return Err(err.into()),
        };

        match end {
            SegmentEnd::EndOfPlaylist => {

                let report = drain_to_end_of_title(
                    &mut self.nav,
                    &mut self.playback,
                    &mut self.info,
                    &mut self.streams,
                    self.config.max_eof_reads,
                );

                self.forward_capabilities(&report.capabilities);

                if let Some(kind) = report.error {
                    return Err(self.abort(kind))
                }

                let outcome = self.pump_events()?;

                if outcome == PumpOutcome::Idle && !report.position_changed {
                    info!("end of title");
                    return Ok(())
                }
            }
            SegmentEnd::Seek(tick) => {
                debug!("continuing at tick {}", tick);
                self.nav.seek_time(tick)?;
                self.pump_events()?;
            }
        }

        self.play_current_segment().map(|_| ())
    }

    /// Re-synchronizes the navigation engine with the playback position.
    ///
    /// Does nothing while the position is not yet known.
    pub fn refresh_player_info(&mut self) -> SessionResult<()> {

        if !self.is_open() {
            return Ok(())
        }

        let clip = match resolve_clip(&self.info, &self.nav) {
            Ok(clip) => clip,
            Err(err) => {
                debug!("not refreshing: {}", err);
                return Ok(())
            }
        };
        let tick = title_timestamp(&clip, playback_position(&self.playback));

        trace!("refreshing at tick {}", tick);
        self.nav.seek_time(tick)?;

        let outcome = self.pump_events()?;

        self.follow(outcome, false)
    }

    /// Composites the visible overlays for an output surface of the given size.
    pub fn composite(&self, output_width: u32, output_height: u32) -> Vec<PlacedOverlay> {

        let nav_width = self.video_dimension(Property::Width);
        let nav_height = self.video_dimension(Property::Height);

        self.compositor.composite(output_width, output_height, nav_width, nav_height)
    }

    /// The navigation timestamp of what is playing, or `None` when it cannot be known yet.
    pub(crate) fn input_timestamp(&self) -> Option<u64> {
        match current_nav_timestamp(&self.info, &self.nav, &self.playback) {
            Ok(pts) => Some(pts),
            Err(err) => {
                debug!("ignoring input: {}", err);
                None
            }
        }
    }

    /// Reloads playback if a pump outcome calls for it.
    ///
    /// A playlist stop always reloads; a new position only when `on_position` is set.
    pub(crate) fn follow(&mut self, outcome: PumpOutcome, on_position: bool) -> SessionResult<()> {
        match outcome {
            PumpOutcome::PlaylistStopped => {
                self.play_current_segment()?;
            }
            PumpOutcome::PositionChanged if on_position => {
                self.play_current_segment()?;
            }
            _ => {
            }
        }
        Ok(())
    }

    pub(crate) fn notify(&self, event: HostEvent) {
        trace!("host: {:?}", event);
        let _ = self.host.send(event);
    }

    /// The playback engine's video size along one axis, zero while unknown.
    pub(crate) fn video_dimension(&self, property: Property) -> u32 {
        self.playback
            .get_property(property)
            .and_then(|value| value.as_f64())
            .map_or(0, |value| value.max(0.0) as u32)
    }

    fn abort(&mut self, kind: NavEventKind) -> SessionError {
        warn!("aborting playback after {:?}", kind);
        self.close_disc();
        SessionError::Aborted(kind)
    }

    fn forward_capabilities(&self, capabilities: &[Capability]) {
        for capability in capabilities {
            match *capability {
                Capability::Menu(available) => self.notify(HostEvent::MenuAvailable(available)),
                Capability::Popup(available) => self.notify(HostEvent::PopupAvailable(available)),
            }
        }
    }

    fn handle_playback(&mut self, event: PlaybackEvent) -> SessionResult<()> {

        trace!("playback: {:?}", event);

        match event {
            PlaybackEvent::PositionChanged(seconds) => {
                self.notify(HostEvent::Position(seconds));
                if !self.info.title_active() {
                    self.refresh_player_info()?;
                }
            }
            PlaybackEvent::DurationChanged(seconds) => {
                self.notify(HostEvent::Duration(seconds));
            }
            PlaybackEvent::Discontinuity => {
                self.pending_seek = true;
            }
            PlaybackEvent::PlaybackRestart => {
                if self.pending_seek {
                    self.refresh_player_info()?;
                    self.pending_seek = false;
                }
            }
            PlaybackEvent::FileLoaded => {
                if let Some(controller) = self.controller.as_mut() {
                    controller.on_file_loaded(&mut self.playback)?;
                }
            }
            PlaybackEvent::EndFile(EndReason::Eof) => {
                if self.is_open() {
                    self.end_of_segment()?;
                }
            }
            PlaybackEvent::EndFile(reason) => {
                debug!("playback ended: {:?}", reason);
            }
        }

        Ok(())
    }

    fn handle_overlay(&mut self, event: OverlayEvent) {
        match event {
            OverlayEvent::Instruction(instruction) => {
                if let Err(err) = self.compositor.apply(&instruction) {
                    warn!("dropping overlay at pts {}: {}", instruction.pts, err);
                }
            }
            OverlayEvent::HighColor { plane, command, rect } => {
                debug!(
                    "ignoring high-colour overlay {:?} on {:?} at {},{} {}x{}",
                    command,
                    plane,
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                );
            }
            OverlayEvent::Closed => {
                debug!("overlay channel closed");
            }
        }
    }
}
