use std::collections::HashSet;

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::models::{BBox, Detection, Status, Verdict};

const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const RED: Rgb<u8> = Rgb([255, 0, 0]);

const MISPLACED_THICKNESS: i32 = 3;
const PLACED_THICKNESS: i32 = 2;
const STATUS_SWATCH: (i32, i32, u32, u32) = (30, 15, 40, 40);

/// Draw the verdict over a copy of the shelf image.
///
/// Misplaced detections get a red circle around their box, the rest a green
/// rectangle. A swatch in the top-left corner shows the overall status.
/// Degenerate boxes are skipped.
pub fn annotate(image: &DynamicImage, detections: &[Detection], verdict: &Verdict) -> RgbImage {
    let mut canvas = image.to_rgb8();
    let wrong: HashSet<BBox> = verdict.wrong_boxes.iter().copied().collect();

    for detection in detections {
        let bbox = detection.bbox;
        if bbox.is_degenerate() {
            continue;
        }
        if wrong.contains(&bbox) {
            let (cx, cy) = bbox.center();
            let radius = bbox.width().max(bbox.height()) / 2;
            for offset in 0..MISPLACED_THICKNESS {
                draw_hollow_circle_mut(&mut canvas, (cx, cy), radius + offset, RED);
            }
        } else {
            for offset in 0..PLACED_THICKNESS {
                let width = bbox.width() - 2 * offset;
                let height = bbox.height() - 2 * offset;
                if width <= 0 || height <= 0 {
                    break;
                }
                let rect = Rect::at(bbox.x1 + offset, bbox.y1 + offset)
                    .of_size(width as u32, height as u32);
                draw_hollow_rect_mut(&mut canvas, rect, GREEN);
            }
        }
    }

    let color = match verdict.status {
        Status::Correct => GREEN,
        Status::Incorrect => RED,
    };
    let (x, y, w, h) = STATUS_SWATCH;
    draw_filled_rect_mut(&mut canvas, Rect::at(x, y).of_size(w, h), color);

    canvas
}
