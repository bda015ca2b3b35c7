//! Debug overlay rendering.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::processors::geometry::Region;

/// Draws detected regions as hollow rectangles over a copy of the page.
///
/// Produced only when debug artifacts are enabled; has no effect on the
/// record output.
pub fn draw_region_overlay(page: &RgbImage, regions: &[Region]) -> RgbImage {
    let mut canvas = page.clone();
    for region in regions {
        let rect = Rect::at(region.x as i32, region.y as i32)
            .of_size(region.width.max(1), region.height.max(1));
        draw_hollow_rect_mut(&mut canvas, rect, Rgb([255u8, 0, 0]));
    }
    canvas
}
