/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

use super::{
    decode,
    DecodeResult,
    OverlayCommand,
    OverlayInstruction,
    OverlayPlane,
    Raster,
    Rect,
};
use std::{
    collections::BTreeSet,
    sync::Arc,
};
use parking_lot::RwLock;
use tracing::{debug, trace};

/// A decoded image placed on one of the graphics planes.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayRegion {
    pub plane: OverlayPlane,
    pub rect: Rect,
    pub raster: Arc<Raster>,
}

/// A region scaled into output space, ready to be blended over the video frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedOverlay {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub raster: Arc<Raster>,
}

/// An immutable picture of the compositor's state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    regions: Vec<OverlayRegion>,
    flushed: bool,
}

impl Frame {

    /// Regions in presentation order, later ones on top.
    pub fn regions(&self) -> &[OverlayRegion] {
        &self.regions
    }

    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    /// Whether anything would be drawn.
    pub fn has_content(&self) -> bool {
        self.flushed && !self.regions.is_empty()
    }

    /// Scales every region from navigation space into an output surface.
    ///
    /// Returns nothing unless the regions have been flushed.
    pub fn composite(
        &self,
        output_width: u32,
        output_height: u32,
        nav_width: u32,
        nav_height: u32,
    ) -> Vec<PlacedOverlay> {

        if !self.flushed || nav_width == 0 || nav_height == 0 {
            return vec![]
        }

        let rx = output_width as f64 / nav_width as f64;
        let ry = output_height as f64 / nav_height as f64;

        self.regions
            .iter()
            .map(|region| PlacedOverlay {
                x: region.rect.x as f64 * rx,
                y: region.rect.y as f64 * ry,
                width: region.rect.width as f64 * rx,
                height: region.rect.height as f64 * ry,
                raster: region.raster.clone(),
            })
            .collect()
    }
}

/// A read-only handle to the compositor's most recently published frame.
///
/// Handles may be cloned and moved to a presentation thread. Reading never blocks the
/// compositor for longer than an [`Arc`] clone.
#[derive(Clone, Debug, Default)]
pub struct OverlayView {
    frame: Arc<RwLock<Arc<Frame>>>,
}

impl OverlayView {

    pub fn snapshot(&self) -> Arc<Frame> {
        self.frame.read().clone()
    }

    pub fn composite(
        &self,
        output_width: u32,
        output_height: u32,
        nav_width: u32,
        nav_height: u32,
    ) -> Vec<PlacedOverlay> {
        self.snapshot().composite(output_width, output_height, nav_width, nav_height)
    }

    pub fn has_content(&self) -> bool {
        self.snapshot().has_content()
    }

    fn publish(&self, frame: Frame) {
        *self.frame.write() = Arc::new(frame);
    }
}

/// Accumulates decoded overlays between flush and clear instructions.
#[derive(Debug, Default)]
pub struct Compositor {
    regions: Vec<OverlayRegion>,
    flushed: bool,
    closed: BTreeSet<OverlayPlane>,
    view: OverlayView,
}

impl Compositor {

    pub fn new() -> Self {
        Self::default()
    }

    /// A handle for readers on other threads.
    pub fn view(&self) -> OverlayView {
        self.view.clone()
    }

    /// Applies one overlay instruction.
    ///
    /// A draw that fails to decode leaves the compositor exactly as it was. A draw on a rectangle
    /// that already holds a region replaces it in its original stacking position.
    pub fn apply(&mut self, instruction: &OverlayInstruction) -> DecodeResult<()> {

        let plane = instruction.plane;

        trace!(
            "overlay {:?} on {:?} at {},{} {}x{}",
            instruction.command,
            plane,
            instruction.rect.x,
            instruction.rect.y,
            instruction.rect.width,
            instruction.rect.height,
        );

        match instruction.command {
            OverlayCommand::Open => {
                self.closed.remove(&plane);
            }
            OverlayCommand::Draw => {
                if self.closed.contains(&plane) {
                    debug!("dropping draw on closed {:?} plane", plane);
                    return Ok(())
                }
                let region = OverlayRegion {
                    plane,
                    rect: instruction.rect,
                    raster: Arc::new(decode(instruction)?),
                };
                match self.regions.iter_mut().find(|r| r.plane == plane && r.rect == region.rect) {
                    Some(existing) => *existing = region,
                    None => self.regions.push(region),
                }
            }
            OverlayCommand::Wipe => {
                self.regions.retain(|r| !(r.plane == plane && instruction.rect.contains(&r.rect)));
            }
            OverlayCommand::Flush => {
                self.flushed = true;
            }
            OverlayCommand::Hide => {
                self.flushed = false;
            }
            OverlayCommand::Clear => {
                self.clear_plane(plane);
            }
            OverlayCommand::Close => {
                self.clear_plane(plane);
                self.closed.insert(plane);
            }
        }

        self.publish();

        Ok(())
    }

    /// Discards every region on every plane.
    pub fn clear(&mut self) {
        self.regions.clear();
        self.flushed = false;
        self.closed.clear();
        self.publish();
    }

    pub fn regions(&self) -> &[OverlayRegion] {
        &self.regions
    }

    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    pub fn is_closed(&self, plane: OverlayPlane) -> bool {
        self.closed.contains(&plane)
    }

    pub fn has_content(&self) -> bool {
        self.flushed && !self.regions.is_empty()
    }

    pub fn composite(
        &self,
        output_width: u32,
        output_height: u32,
        nav_width: u32,
        nav_height: u32,
    ) -> Vec<PlacedOverlay> {
        self.frame().composite(output_width, output_height, nav_width, nav_height)
    }

    fn clear_plane(&mut self, plane: OverlayPlane) {
        self.regions.retain(|r| r.plane != plane);
        self.flushed = false;
    }

    fn frame(&self) -> Frame {
        Frame {
            regions: self.regions.clone(),
            flushed: self.flushed,
        }
    }

    fn publish(&self) {
        self.view.publish(self.frame());
    }
}
