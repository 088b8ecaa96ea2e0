/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: CC0-1.0
 */

use super::*;
use crate::{
    event::NavEvent,
    sim::{PlaybackCommand, RecordingPlayback, SimulatedClip, SimulatedDisc, SimulatedNavigation, SimulatedPlaylist},
    timestamp::TICKS_PER_SECOND,
};

/*
 * Playlist 1 plays three ten second clips back to back. Chapters start at 0s, 5s (inside the
 * first clip), 10s (exactly on the second clip), and 25s (inside the third clip).
 */
fn navigation() -> SimulatedNavigation {
    SimulatedNavigation::new(
        SimulatedDisc {
            playlists: vec![
                SimulatedPlaylist {
                    playlist: 1,
                    angle: 0,
                    chapters: vec![
                        0,
                        5 * TICKS_PER_SECOND,
                        10 * TICKS_PER_SECOND,
                        25 * TICKS_PER_SECOND,
                    ],
                    clips: vec![
                        SimulatedClip {
                            clip_id: "00100".into(),
                            in_time: 900_000,
                            out_time: 1_800_000,
                        },
                        SimulatedClip {
                            clip_id: "00101".into(),
                            in_time: 0,
                            out_time: 900_000,
                        },
                        SimulatedClip {
                            clip_id: "00102".into(),
                            in_time: 4_500_000,
                            out_time: 5_400_000,
                        },
                    ],
                },
            ],
            ..Default::default()
        }
    )
}

fn at(title: u32, play_item: u32, chapter: u32) -> PlayerInfo {

    let mut info = PlayerInfo::new();

    info.record(NavEvent::new(NavEventKind::Title, title));
    info.record(NavEvent::new(NavEventKind::Playlist, 1));
    info.record(NavEvent::new(NavEventKind::PlayItem, play_item));
    info.record(NavEvent::new(NavEventKind::Chapter, chapter));

    info
}

fn controller() -> PlayController {
    PlayController::new("/media/disc", StreamLayout::default())
}

#[test]
fn test_stream_path() {

    let clip = ClipInfo {
        clip_id: "00055".into(),
        ..Default::default()
    };

    assert_eq!(
        controller().stream_path(&clip),
        PathBuf::from("/media/disc/BDMV/STREAM/00055.m2ts"),
    );

    let layout = StreamLayout {
        stream_dir: PathBuf::from("STREAMS"),
        extension: "mts".into(),
    };

    assert_eq!(
        PlayController::new("/disc", layout).stream_path(&clip),
        PathBuf::from("/disc/STREAMS/00055.mts"),
    );
}

#[test]
fn test_plays_current_clip_from_its_start() {

    let nav = navigation();
    let mut playback = RecordingPlayback::new();
    let mut controller = controller();

    let path = controller.play_current_segment(&at(1, 1, 3), &nav, &mut playback).unwrap();

    assert_eq!(path, PathBuf::from("/media/disc/BDMV/STREAM/00101.m2ts"));
    assert_eq!(playback.commands(), &[PlaybackCommand::Load(path)]);
    assert_eq!(controller.deferred_start(), None);
}

#[test]
fn test_defers_chapter_start_inside_clip() {

    let nav = navigation();
    let mut playback = RecordingPlayback::new();
    let mut controller = controller();

    controller.play_current_segment(&at(1, 2, 4), &nav, &mut playback).unwrap();

    assert_eq!(controller.deferred_start(), Some(5.0));
    assert!(playback.seeks().is_empty());

    assert_eq!(controller.on_file_loaded(&mut playback).unwrap(), Some(5.0));
    assert_eq!(controller.on_file_loaded(&mut playback).unwrap(), None);
    assert_eq!(playback.seeks(), vec![5.0]);
}

#[test]
fn test_no_offset_without_active_title() {

    let nav = navigation();
    let mut playback = RecordingPlayback::new();
    let mut controller = controller();

    controller.play_current_segment(&at(0, 0, 2), &nav, &mut playback).unwrap();

    assert_eq!(controller.deferred_start(), None);
    assert_eq!(controller.on_file_loaded(&mut playback).unwrap(), None);
}

#[test]
fn test_later_load_supersedes_deferred_start() {

    let nav = navigation();
    let mut playback = RecordingPlayback::new();
    let mut controller = controller();

    controller.play_current_segment(&at(1, 0, 2), &nav, &mut playback).unwrap();

    assert_eq!(controller.deferred_start(), Some(5.0));

    controller.play_current_segment(&at(1, 1, 3), &nav, &mut playback).unwrap();

    assert_eq!(controller.deferred_start(), None);
    assert_eq!(playback.loads().len(), 2);
}

#[test]
fn test_unresolvable_position_loads_nothing() {

    let nav = navigation();
    let mut playback = RecordingPlayback::new();
    let mut controller = controller();
    let mut info = PlayerInfo::new();

    assert_eq!(
        controller.play_current_segment(&info, &nav, &mut playback),
        Err(PlayError::State { source: StateError::PositionUnknown(NavEventKind::Playlist) }),
    );

    info.record(NavEvent::new(NavEventKind::Playlist, 7));

    assert_eq!(
        controller.play_current_segment(&info, &nav, &mut playback),
        Err(PlayError::State { source: StateError::MissingPlaylist { playlist: 7, angle: 0 } }),
    );

    assert_eq!(
        controller.play_current_segment(&at(1, 3, 1), &nav, &mut playback),
        Err(PlayError::State { source: StateError::ClipOutOfRange { play_item: 3, clips: 3 } }),
    );
    assert!(playback.commands().is_empty());
}

#[test]
fn test_chapter_start_offset() {

    let playlist = navigation().playlist_info(1, 0).unwrap();

    assert_eq!(chapter_start_offset(&playlist, 0, 1), None);
    assert_eq!(chapter_start_offset(&playlist, 0, 2), Some(5 * TICKS_PER_SECOND));
    assert_eq!(chapter_start_offset(&playlist, 1, 3), None);
    assert_eq!(chapter_start_offset(&playlist, 2, 4), Some(5 * TICKS_PER_SECOND));
    assert_eq!(chapter_start_offset(&playlist, 0, 4), None);
    assert_eq!(chapter_start_offset(&playlist, 2, 2), None);
    assert_eq!(chapter_start_offset(&playlist, 0, 9), None);
}

#[test]
fn test_segment_end() {

    let nav = navigation();

    assert_eq!(segment_end(&at(1, 0, 1), &nav), Ok(SegmentEnd::Seek(10 * TICKS_PER_SECOND)));
    assert_eq!(segment_end(&at(1, 1, 3), &nav), Ok(SegmentEnd::Seek(20 * TICKS_PER_SECOND)));
    assert_eq!(segment_end(&at(1, 2, 4), &nav), Ok(SegmentEnd::EndOfPlaylist));
    assert_eq!(
        segment_end(&PlayerInfo::new(), &nav),
        Err(StateError::PositionUnknown(NavEventKind::Playlist)),
    );
}
