/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Scripted stand-ins for both engines.
//!
//! [`SimulatedNavigation`] describes a disc in plain data and produces navigation events from a
//! script: events can be queued up front, or attached as one-shot reactions to the calls the
//! adapter makes. [`RecordingPlayback`] keeps every command it receives so the adapter's
//! behavior can be inspected afterwards.

use super::{
    engine::{
        DiscInfo,
        EngineError,
        EngineResult,
        NavigationEngine,
        PlaybackEngine,
        Property,
        PropertyValue,
        UserKey,
    },
    event::{NavEvent, NavEventKind},
    info::{ChapterInfo, ClipInfo, PlaylistInfo},
};
use std::{
    collections::{BTreeMap, VecDeque},
    fmt,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SimulatedDisc {
    pub bluray_detected: bool,
    pub first_play_supported: bool,
    /// Size of every title in bytes.
    pub title_size: u64,
    pub playlists: Vec<SimulatedPlaylist>,
}

impl Default for SimulatedDisc {
    fn default() -> Self {
        Self {
            bluray_detected: true,
            first_play_supported: false,
            title_size: 6144,
            playlists: vec![],
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SimulatedPlaylist {
    pub playlist: u32,
    #[serde(default)]
    pub angle: u32,
    /// Chapter starts on the playlist's timeline.
    #[serde(default)]
    pub chapters: Vec<u64>,
    pub clips: Vec<SimulatedClip>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SimulatedClip {
    pub clip_id: String,
    pub in_time: u64,
    pub out_time: u64,
}

impl SimulatedPlaylist {

    /// Describes the playlist the way a navigation engine would.
    pub fn info(&self) -> PlaylistInfo {

        let mut start_time = 0;
        let clips = self.clips
            .iter()
            .map(|clip| {
                let info = ClipInfo {
                    clip_id: clip.clip_id.clone(),
                    in_time: clip.in_time,
                    out_time: clip.out_time,
                    start_time,
                };
                start_time += info.duration();
                info
            })
            .collect::<Vec<ClipInfo>>();
        let duration = start_time;
        let chapters = self.chapters
            .iter()
            .enumerate()
            .map(|(index, start)| {
                let end = self.chapters.get(index + 1).copied().unwrap_or(duration);
                ChapterInfo {
                    start: *start,
                    duration: end.saturating_sub(*start),
                }
            })
            .collect();

        PlaylistInfo {
            playlist: self.playlist,
            angle: self.angle,
            duration,
            chapters,
            clips,
        }
    }
}

/// Navigation calls a reaction can be attached to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trigger {
    Play,
    Seek,
    SeekTime,
    UserInput,
    MouseSelect,
    MenuCall,
    /// The end of a title was read.
    EndOfTitle,
}

/// Events queued the first time a matching call is made.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Reaction {
    pub on: Trigger,
    /// Restricts a user-input reaction to one key.
    #[serde(default)]
    pub key: Option<UserKey>,
    #[serde(default)]
    pub events: Vec<NavEvent>,
}

impl Reaction {

    pub fn new(on: Trigger, events: Vec<NavEvent>) -> Self {
        Self { on, key: None, events }
    }

    pub fn on_key(key: UserKey, events: Vec<NavEvent>) -> Self {
        Self { on: Trigger::UserInput, key: Some(key), events }
    }

    fn matches(&self, trigger: Trigger, key: Option<UserKey>) -> bool {
        self.on == trigger && (self.key.is_none() || self.key == key)
    }
}

/// A call made to [`SimulatedNavigation`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum NavCall {
    Open(PathBuf),
    Close,
    Play,
    Seek(u64),
    SeekTime(u64),
    UserInput {
        pts: u64,
        key: UserKey,
    },
    MouseSelect {
        pts: u64,
        x: u16,
        y: u16,
    },
    MenuCall(u64),
}

#[derive(Clone, Debug, Default)]
pub struct SimulatedNavigation {
    disc: SimulatedDisc,
    queue: VecDeque<NavEvent>,
    reactions: Vec<Reaction>,
    calls: Vec<NavCall>,
    at_end: bool,
}

impl SimulatedNavigation {

    pub fn new(disc: SimulatedDisc) -> Self {
        Self {
            disc,
            ..Default::default()
        }
    }

    pub fn with_reactions(mut self, reactions: Vec<Reaction>) -> Self {
        self.reactions.extend(reactions);
        self
    }

    /// Queues events as if the engine had raised them on its own.
    pub fn push_events<I>(&mut self, events: I) where
        I: IntoIterator<Item = NavEvent>,
    {
        self.queue.extend(events);
    }

    pub fn add_reaction(&mut self, reaction: Reaction) {
        self.reactions.push(reaction);
    }

    pub fn calls(&self) -> &[NavCall] {
        &self.calls
    }

    /// Number of queued events not yet consumed.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn disc(&self) -> &SimulatedDisc {
        &self.disc
    }

    fn fire(&mut self, trigger: Trigger, key: Option<UserKey>) {
        if let Some(index) = self.reactions.iter().position(|r| r.matches(trigger, key)) {
            let reaction = self.reactions.remove(index);
            self.queue.extend(reaction.events);
        }
    }
}

impl NavigationEngine for SimulatedNavigation {

    fn open(&mut self, path: &Path) -> EngineResult<DiscInfo> {
        self.calls.push(NavCall::Open(path.to_path_buf()));
        Ok(
            DiscInfo {
                bluray_detected: self.disc.bluray_detected,
                first_play_supported: self.disc.first_play_supported,
            }
        )
    }

    fn close(&mut self) {
        self.calls.push(NavCall::Close);
        self.queue.clear();
        self.at_end = false;
    }

    fn play(&mut self) -> EngineResult<()> {
        self.calls.push(NavCall::Play);
        self.fire(Trigger::Play, None);
        Ok(())
    }

    fn seek(&mut self, offset: u64) -> EngineResult<u64> {
        self.calls.push(NavCall::Seek(offset));
        self.at_end = offset + 1 >= self.disc.title_size;
        self.fire(Trigger::Seek, None);
        Ok(offset)
    }

    fn seek_time(&mut self, tick: u64) -> EngineResult<u64> {
        self.calls.push(NavCall::SeekTime(tick));
        self.at_end = false;
        self.fire(Trigger::SeekTime, None);
        Ok(tick)
    }

    fn user_input(&mut self, pts: u64, key: UserKey) -> EngineResult<()> {
        self.calls.push(NavCall::UserInput { pts, key });
        self.fire(Trigger::UserInput, Some(key));
        Ok(())
    }

    fn mouse_select(&mut self, pts: u64, x: u16, y: u16) -> EngineResult<()> {
        self.calls.push(NavCall::MouseSelect { pts, x, y });
        self.fire(Trigger::MouseSelect, None);
        Ok(())
    }

    fn menu_call(&mut self, pts: u64) -> EngineResult<()> {
        self.calls.push(NavCall::MenuCall(pts));
        self.fire(Trigger::MenuCall, None);
        Ok(())
    }

    fn title_size(&self) -> u64 {
        self.disc.title_size
    }

    fn playlist_info(&self, playlist: u32, angle: u32) -> Option<PlaylistInfo> {
        self.disc.playlists
            .iter()
            .find(|p| p.playlist == playlist && p.angle == angle)
            .or_else(|| self.disc.playlists.iter().find(|p| p.playlist == playlist))
            .map(SimulatedPlaylist::info)
    }

    fn next_event(&mut self) -> NavEvent {
        self.queue.pop_front().unwrap_or_else(NavEvent::none)
    }

    fn read(&mut self, buf: &mut [u8]) -> EngineResult<(usize, NavEvent)> {
        if let Some(event) = self.queue.pop_front() {
            return Ok((0, event))
        }
        if self.at_end {
            self.at_end = false;
            self.fire(Trigger::EndOfTitle, None);
            return Ok((buf.len().min(1), NavEvent::new(NavEventKind::EndOfTitle, 0)))
        }
        Err(EngineError::Navigation("no title data left".to_string()))
    }
}

/// A command received by [`RecordingPlayback`].
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackCommand {
    Load(PathBuf),
    Seek(f64),
    SetProperty(Property, PropertyValue),
}

impl fmt::Display for PlaybackCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(path) => write!(f, "loadfile {}", path.display()),
            Self::Seek(seconds) => write!(f, "seek {:.3} absolute", seconds),
            Self::SetProperty(property, value) => write!(f, "set {} {}", property, value),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RecordingPlayback {
    properties: BTreeMap<Property, PropertyValue>,
    commands: Vec<PlaybackCommand>,
}

impl RecordingPlayback {

    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property as if the engine had changed it on its own.
    pub fn with_property(mut self, property: Property, value: PropertyValue) -> Self {
        self.properties.insert(property, value);
        self
    }

    /// Changes a property without recording a command.
    pub fn update(&mut self, property: Property, value: PropertyValue) {
        self.properties.insert(property, value);
    }

    pub fn commands(&self) -> &[PlaybackCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<PlaybackCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Every file loaded so far, in order.
    pub fn loads(&self) -> Vec<&Path> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                PlaybackCommand::Load(path) => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    /// Every absolute seek so far, in order.
    pub fn seeks(&self) -> Vec<f64> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                PlaybackCommand::Seek(seconds) => Some(*seconds),
                _ => None,
            })
            .collect()
    }
}

impl PlaybackEngine for RecordingPlayback {

    fn load(&mut self, path: &Path) -> EngineResult<()> {
        self.commands.push(PlaybackCommand::Load(path.to_path_buf()));
        self.properties.insert(Property::TimePos, PropertyValue::Double(0.0));
        Ok(())
    }

    fn seek(&mut self, seconds: f64) -> EngineResult<()> {
        self.commands.push(PlaybackCommand::Seek(seconds));
        self.properties.insert(Property::TimePos, PropertyValue::Double(seconds));
        Ok(())
    }

    fn set_property(&mut self, property: Property, value: PropertyValue) -> EngineResult<()> {
        self.commands.push(PlaybackCommand::SetProperty(property, value));
        self.properties.insert(property, value);
        Ok(())
    }

    fn get_property(&self, property: Property) -> Option<PropertyValue> {
        self.properties.get(&property).copied()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn playlist() -> SimulatedPlaylist {
        SimulatedPlaylist {
            playlist: 800,
            angle: 0,
            chapters: vec![0, 900_000, 2_700_000],
            clips: vec![
                SimulatedClip { clip_id: "00010".into(), in_time: 100, out_time: 1_800_100 },
                SimulatedClip { clip_id: "00011".into(), in_time: 0, out_time: 1_800_000 },
            ],
        }
    }

    #[test]
    fn test_playlist_info_derives_timeline() {

        let info = playlist().info();

        assert_eq!(info.duration, 3_600_000);
        assert_eq!(info.clips[0].start_time, 0);
        assert_eq!(info.clips[1].start_time, 1_800_000);
        assert_eq!(info.chapters[1].duration, 1_800_000);
        assert_eq!(info.chapters[2].duration, 900_000);
    }

    #[test]
    fn test_reactions_fire_once() {

        let mut nav = SimulatedNavigation::new(SimulatedDisc::default()).with_reactions(vec![
            Reaction::on_key(UserKey::Enter, vec![NavEvent::new(NavEventKind::Title, 2)]),
        ]);

        nav.user_input(0, UserKey::Left).unwrap();

        assert_eq!(nav.pending(), 0);

        nav.user_input(0, UserKey::Enter).unwrap();
        nav.user_input(0, UserKey::Enter).unwrap();

        assert_eq!(nav.next_event(), NavEvent::new(NavEventKind::Title, 2));
        assert_eq!(nav.next_event(), NavEvent::none());
        assert_eq!(nav.calls().len(), 3);
    }

    #[test]
    fn test_read_reports_end_of_title_after_seek_to_end() {

        let mut nav = SimulatedNavigation::new(SimulatedDisc::default());
        let mut buf = [0u8; 1];

        assert!(nav.read(&mut buf).is_err());

        nav.seek(nav.title_size() - 1).unwrap();

        let (bytes, event) = nav.read(&mut buf).unwrap();

        assert_eq!(bytes, 1);
        assert_eq!(event.kind, NavEventKind::EndOfTitle);
        assert!(nav.read(&mut buf).is_err());
    }

    #[test]
    fn test_recording_playback() {

        let mut playback = RecordingPlayback::new();

        playback.load(Path::new("/disc/BDMV/STREAM/00010.m2ts")).unwrap();
        playback.seek(12.5).unwrap();

        assert_eq!(playback.loads(), vec![Path::new("/disc/BDMV/STREAM/00010.m2ts")]);
        assert_eq!(playback.seeks(), vec![12.5]);
        assert_eq!(playback.get_property(Property::TimePos), Some(PropertyValue::Double(12.5)));
        assert_eq!(playback.commands()[1].to_string(), "seek 12.500 absolute");
    }
}
