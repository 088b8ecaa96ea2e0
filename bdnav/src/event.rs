/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! The navigation engine's event vocabulary.
//!
//! Every event the navigation engine produces is a kind plus a single numeric parameter. The
//! numeric codes follow the engine's published event contract so that a binding can convert
//! raw events with [`NavEventKind::from_code`].

use serde::{Deserialize, Serialize};

/// Bit in the user operation mask (`UoMaskChanged` parameter) that, when set, forbids calling
/// the disc menu.
pub const UO_MENU_CALL: u32 = 0x0001;

/// Every kind of event the navigation engine can report.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavEventKind {
    /// The event queue is empty.
    None,
    Error,
    ReadError,
    Encrypted,
    Angle,
    Title,
    Playlist,
    PlayItem,
    Chapter,
    PlayMark,
    EndOfTitle,
    AudioStream,
    IgStream,
    PgTextstStream,
    PipPgTextstStream,
    SecondaryAudioStream,
    SecondaryVideoStream,
    PgTextst,
    PipPgTextst,
    SecondaryAudio,
    SecondaryVideo,
    SecondaryVideoSize,
    PlaylistStop,
    Discontinuity,
    Seek,
    Still,
    StillTime,
    SoundEffect,
    Idle,
    Popup,
    Menu,
    StereoscopicStatus,
    KeyInterestTable,
    UoMaskChanged,
}

impl NavEventKind {

    /// Number of distinct event kinds.
    pub const COUNT: usize = 34;

    /// All event kinds in code order.
    pub const ALL: [NavEventKind; Self::COUNT] = [
        Self::None,
        Self::Error,
        Self::ReadError,
        Self::Encrypted,
        Self::Angle,
        Self::Title,
        Self::Playlist,
        Self::PlayItem,
        Self::Chapter,
        Self::PlayMark,
        Self::EndOfTitle,
        Self::AudioStream,
        Self::IgStream,
        Self::PgTextstStream,
        Self::PipPgTextstStream,
        Self::SecondaryAudioStream,
        Self::SecondaryVideoStream,
        Self::PgTextst,
        Self::PipPgTextst,
        Self::SecondaryAudio,
        Self::SecondaryVideo,
        Self::SecondaryVideoSize,
        Self::PlaylistStop,
        Self::Discontinuity,
        Self::Seek,
        Self::Still,
        Self::StillTime,
        Self::SoundEffect,
        Self::Idle,
        Self::Popup,
        Self::Menu,
        Self::StereoscopicStatus,
        Self::KeyInterestTable,
        Self::UoMaskChanged,
    ];

    /// The engine's numeric code for this kind.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Converts an engine event code, returning `None` for codes this crate does not know.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Whether this kind reports that a new playable position has been selected.
    pub fn selects_position(self) -> bool {
        matches!(
            self,
            Self::Angle
                | Self::Title
                | Self::Playlist
                | Self::PlayItem
                | Self::PlayMark
                | Self::Chapter
        )
    }

    pub fn is_error(self) -> bool {
        matches!(self, Self::Error | Self::ReadError | Self::Encrypted)
    }
}

/// A single navigation event.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct NavEvent {
    pub kind: NavEventKind,
    #[serde(default)]
    pub param: u32,
}

impl NavEvent {

    pub fn new(kind: NavEventKind, param: u32) -> Self {
        Self { kind, param }
    }

    /// The event returned when the queue has been drained.
    pub fn none() -> Self {
        Self::new(NavEventKind::None, 0)
    }
}
