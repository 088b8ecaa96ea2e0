/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Routes host key and pointer input into the navigation engine.
//!
//! Every input is stamped with the navigation timestamp of what is playing. Pointer input is only
//! forwarded while the navigation engine reports an active menu, and is scaled from the host's
//! output surface into navigation space first.

use super::{
    engine::{NavigationEngine, PlaybackEngine, Property, UserKey},
    event::NavEventKind,
    session::{Session, SessionResult},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Keys the host forwards.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Activate,
    Popup,
    /// Calls the disc's main menu.
    Menu,
}

impl Key {

    /// The navigation engine key sent for this key, if it is sent as plain user input.
    pub fn user_key(self) -> Option<UserKey> {
        match self {
            Self::Left => Some(UserKey::Left),
            Self::Right => Some(UserKey::Right),
            Self::Up => Some(UserKey::Up),
            Self::Down => Some(UserKey::Down),
            Self::Activate => Some(UserKey::Enter),
            Self::Popup => Some(UserKey::Popup),
            Self::Menu => None,
        }
    }
}

/// Size of the host's output surface in pixels.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Key(Key),
    /// A pointer press at output surface coordinates.
    PointerPress {
        x: f64,
        y: f64,
        surface: Surface,
    },
    /// A pointer double-click at output surface coordinates.
    PointerActivate {
        x: f64,
        y: f64,
        surface: Surface,
    },
}

/// Scales a point on the output surface into navigation space.
///
/// Returns `None` for an empty surface or a point that is not a number.
pub fn to_nav_space(
    x: f64,
    y: f64,
    surface: Surface,
    nav_width: f64,
    nav_height: f64,
) -> Option<(u16, u16)> {

    if surface.width == 0 || surface.height == 0 || !x.is_finite() || !y.is_finite() {
        return None
    }

    let rx = nav_width / surface.width as f64;
    let ry = nav_height / surface.height as f64;

    Some(((x * rx) as u16, (y * ry) as u16))
}

impl<N, P> Session<N, P> where
    N: NavigationEngine,
    P: PlaybackEngine,
{

    /// Handles one input event. Input arriving while no disc is open is ignored.
    pub fn handle_input(&mut self, event: InputEvent) -> SessionResult<()> {

        if !self.is_open() {
            debug!("ignoring {:?}: no disc is open", event);
            return Ok(())
        }

        match event {
            InputEvent::Key(Key::Menu) => self.open_menu(),
            InputEvent::Key(Key::Popup) => self.open_popup(),
            InputEvent::Key(key) => self.press_key(key),
            InputEvent::PointerPress { x, y, surface } => self.pointer_press(x, y, surface),
            InputEvent::PointerActivate { .. } => self.pointer_activate(),
        }
    }

    /// Calls the disc menu and plays whatever it selects.
    pub fn open_menu(&mut self) -> SessionResult<()> {

        let pts = match self.input_timestamp() {
            Some(pts) => pts,
            None => return Ok(()),
        };

        self.navigation_mut().menu_call(pts)?;
        self.pump_events()?;
        self.play_current_segment()?;

        Ok(())
    }

    /// Toggles the pop-up menu. Playback is not reloaded.
    pub fn open_popup(&mut self) -> SessionResult<()> {

        let pts = match self.input_timestamp() {
            Some(pts) => pts,
            None => return Ok(()),
        };

        self.navigation_mut().user_input(pts, UserKey::Popup)?;

        let outcome = self.pump_events()?;

        self.follow(outcome, false)
    }

    fn press_key(&mut self, key: Key) -> SessionResult<()> {

        let user_key = match key.user_key() {
            Some(user_key) => user_key,
            None => return Ok(()),
        };
        let pts = match self.input_timestamp() {
            Some(pts) => pts,
            None => return Ok(()),
        };

        self.navigation_mut().user_input(pts, user_key)?;

        if key == Key::Activate {
            let outcome = self.pump_events()?;
            self.follow(outcome, true)?;
        }

        Ok(())
    }

    fn pointer_press(&mut self, x: f64, y: f64, surface: Surface) -> SessionResult<()> {

        if !self.menu_active() {
            debug!("ignoring pointer press outside a menu");
            return Ok(())
        }

        let nav_width = self.video_dimension(Property::Width) as f64;
        let nav_height = self.video_dimension(Property::Height) as f64;
        let (nav_x, nav_y) = match to_nav_space(x, y, surface, nav_width, nav_height) {
            Some(point) => point,
            None => return Ok(()),
        };
        let pts = match self.input_timestamp() {
            Some(pts) => pts,
            None => return Ok(()),
        };

        self.navigation_mut().mouse_select(pts, nav_x, nav_y)?;

        Ok(())
    }

    fn pointer_activate(&mut self) -> SessionResult<()> {

        if !self.menu_active() {
            debug!("ignoring pointer activation outside a menu");
            return Ok(())
        }

        let pts = match self.input_timestamp() {
            Some(pts) => pts,
            None => return Ok(()),
        };

        self.navigation_mut().user_input(pts, UserKey::MouseActivate)?;

        let outcome = self.pump_events()?;

        self.follow(outcome, true)
    }

    fn menu_active(&self) -> bool {
        self.info().flag(NavEventKind::Menu)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_scales_into_nav_space() {

        let surface = Surface { width: 960, height: 540 };

        assert_eq!(to_nav_space(100.0, 50.0, surface, 1920.0, 1080.0), Some((200, 100)));
        assert_eq!(to_nav_space(959.0, 539.0, surface, 1920.0, 1080.0), Some((1918, 1078)));
        assert_eq!(to_nav_space(0.0, 0.0, surface, 720.0, 480.0), Some((0, 0)));
    }

    #[test]
    fn test_rejects_degenerate_input() {

        assert_eq!(to_nav_space(1.0, 1.0, Surface::default(), 1920.0, 1080.0), None);
        assert_eq!(
            to_nav_space(f64::NAN, 1.0, Surface { width: 10, height: 10 }, 1920.0, 1080.0),
            None,
        );
    }

    #[test]
    fn test_menu_key_is_not_user_input() {
        assert_eq!(Key::Menu.user_key(), None);
        assert_eq!(Key::Activate.user_key(), Some(UserKey::Enter));
        assert_eq!(Key::Popup.user_key(), Some(UserKey::Popup));
    }
}
