use image::Rgb;
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use nalgebra as na;

use crate::bbox::BBox;
use crate::tracks::{Color, TrackId, TrackStore};
use crate::Frame;

const ELLIPSE_START_DEG: f32 = -45.0;
const ELLIPSE_END_DEG: f32 = 235.0;
const ELLIPSE_RY_RATIO: f32 = 0.35;
const ELLIPSE_SEGMENTS: usize = 140;

const LABEL_WIDTH: i32 = 40;
const LABEL_HEIGHT: i32 = 20;
const LABEL_Y_OFFSET: i32 = 15;

const TRIANGLE_HALF_WIDTH: f32 = 10.0;
const TRIANGLE_HEIGHT: f32 = 20.0;

pub struct AnnotatorConfig {
    /// Fallback for players without an assigned team color.
    pub player_color: Color,
    pub referee_color: Color,
    pub ball_color: Color,
    pub label_text_color: Color,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            player_color: Color::RED,
            referee_color: Color::YELLOW,
            ball_color: Color::GREEN,
            label_text_color: Color::BLACK,
        }
    }
}

/// Renders track overlays onto frames: an elliptic ground marker under
/// every player and referee, an ID label for players, and a triangle over
/// the ball. Stateless and deterministic; input frames are cloned, never
/// written.
pub struct Annotator {
    config: AnnotatorConfig,
}

impl Annotator {
    pub fn new(config: AnnotatorConfig) -> Self {
        Self { config }
    }

    pub fn annotate(&self, frames: &[Frame], tracks: &TrackStore) -> Vec<Frame> {
        frames
            .iter()
            .enumerate()
            .map(|(idx, frame)| {
                let mut frame = frame.clone();
                self.annotate_frame(&mut frame, tracks, idx);
                frame
            })
            .collect()
    }

    fn annotate_frame(&self, frame: &mut Frame, tracks: &TrackStore, idx: usize) {
        if let Some(players) = tracks.players.get(idx) {
            // id order keeps overlapping markers pixel-stable across runs
            let mut ids: Vec<TrackId> = players.keys().copied().collect();
            ids.sort_unstable();

            for id in ids {
                let entry = &players[&id];
                let color = entry.team_color.unwrap_or(self.config.player_color);
                self.draw_ellipse(frame, &entry.bbox, color, Some(id));
            }
        }

        if let Some(referees) = tracks.referees.get(idx) {
            let mut ids: Vec<TrackId> = referees.keys().copied().collect();
            ids.sort_unstable();

            for id in ids {
                self.draw_ellipse(frame, &referees[&id].bbox, self.config.referee_color, None);
            }
        }

        if let Some(ball) = tracks.ball.get(idx) {
            let mut ids: Vec<TrackId> = ball.keys().copied().collect();
            ids.sort_unstable();

            for id in ids {
                self.draw_triangle(frame, &ball[&id].bbox, self.config.ball_color);
            }
        }
    }

    /// Partial elliptic arc under the feet, the stylized ground shadow of
    /// one tracked person, plus an optional ID label below it.
    fn draw_ellipse(&self, frame: &mut Frame, bbox: &BBox, color: Color, track_id: Option<TrackId>) {
        let center = na::Point2::new(bbox.center().x, bbox.y2);
        let rx = bbox.width();
        let ry = ELLIPSE_RY_RATIO * rx;

        // two concentric passes for a 2 px stroke
        draw_arc_mut(frame, center, rx, ry, color.rgb());
        draw_arc_mut(frame, center, (rx - 1.0).max(0.0), (ry - 1.0).max(0.0), color.rgb());

        if let Some(id) = track_id {
            let x1_rect = center.x as i32 - LABEL_WIDTH / 2;
            let y1_rect = center.y as i32 - LABEL_HEIGHT / 2 + LABEL_Y_OFFSET;

            draw_filled_rect_mut(
                frame,
                Rect::at(x1_rect, y1_rect).of_size(LABEL_WIDTH as u32, LABEL_HEIGHT as u32),
                color.rgb(),
            );

            let mut x_text = x1_rect + 12;
            if id > 99 {
                x_text -= 10;
            }
            draw_number(frame, id, x_text, y1_rect + 5, self.config.label_text_color.rgb());
        }
    }

    /// Downward-pointing marker, apex touching the top of the ball box,
    /// outlined in black.
    fn draw_triangle(&self, frame: &mut Frame, bbox: &BBox, color: Color) {
        let apex = na::Point2::new(bbox.center().x, bbox.y1);
        let left = na::Point2::new(apex.x - TRIANGLE_HALF_WIDTH, apex.y - TRIANGLE_HEIGHT);
        let right = na::Point2::new(apex.x + TRIANGLE_HALF_WIDTH, apex.y - TRIANGLE_HEIGHT);

        let poly = [
            Point::new(apex.x as i32, apex.y as i32),
            Point::new(left.x as i32, left.y as i32),
            Point::new(right.x as i32, right.y as i32),
        ];
        draw_polygon_mut(frame, &poly, color.rgb());

        let outline = Color::BLACK.rgb();
        for (a, b) in [(apex, left), (left, right), (right, apex)] {
            draw_line_segment_mut(frame, (a.x, a.y), (b.x, b.y), outline);
        }
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(AnnotatorConfig::default())
    }
}

/// Polyline approximation of the arc from -45 to 235 degrees, x axis
/// rightwards, y axis down, matching screen coordinates.
fn draw_arc_mut(frame: &mut Frame, center: na::Point2<f32>, rx: f32, ry: f32, color: Rgb<u8>) {
    let start = ELLIPSE_START_DEG.to_radians();
    let end = ELLIPSE_END_DEG.to_radians();
    let step = (end - start) / ELLIPSE_SEGMENTS as f32;

    let mut prev: Option<(f32, f32)> = None;
    for i in 0..=ELLIPSE_SEGMENTS {
        let t = start + step * i as f32;
        let p = (center.x + rx * t.cos(), center.y + ry * t.sin());

        if let Some(q) = prev {
            draw_line_segment_mut(frame, q, p, color);
        }
        prev = Some(p);
    }
}

/// Track ids are plain decimal numbers, rasterized from an embedded 3x5
/// digit face so rendering needs no font assets.
fn draw_number(frame: &mut Frame, value: TrackId, x: i32, y: i32, color: Rgb<u8>) {
    const SCALE: i32 = 2;
    const ADVANCE: i32 = 4 * SCALE;

    let mut ox = x;
    for ch in value.to_string().bytes() {
        let glyph = &DIGIT_FACE[(ch - b'0') as usize];

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..3i32 {
                if bits & (0b100 >> col) != 0 {
                    draw_filled_rect_mut(
                        frame,
                        Rect::at(ox + col * SCALE, y + row as i32 * SCALE)
                            .of_size(SCALE as u32, SCALE as u32),
                        color,
                    );
                }
            }
        }

        ox += ADVANCE;
    }
}

#[rustfmt::skip]
const DIGIT_FACE: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b001, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::{FrameTracks, TrackEntry, BALL_TRACK_ID};

    fn test_frame() -> Frame {
        // gradient so overdrawn pixels are visible
        Frame::from_fn(120, 90, |x, y| Rgb([x as u8, y as u8, 128]))
    }

    fn test_store() -> TrackStore {
        let mut store = TrackStore::with_capacity(1);

        let mut players = FrameTracks::new();
        players.insert(4, TrackEntry::new(BBox::new(20.0, 10.0, 40.0, 50.0)));
        players.insert(
            108,
            TrackEntry {
                bbox: BBox::new(60.0, 15.0, 80.0, 55.0),
                team_color: Some(Color([10, 200, 90])),
            },
        );
        let mut referees = FrameTracks::new();
        referees.insert(31, TrackEntry::new(BBox::new(90.0, 20.0, 105.0, 60.0)));
        let mut ball = FrameTracks::new();
        ball.insert(BALL_TRACK_ID, TrackEntry::new(BBox::new(50.0, 62.0, 56.0, 68.0)));
        store.push_frame(players, referees, ball);

        store
    }

    #[test]
    fn output_matches_input_length() {
        let annotator = Annotator::default();
        let frames = vec![test_frame(); 3];
        let mut store = test_store();
        store.push_frame(FrameTracks::new(), FrameTracks::new(), FrameTracks::new());
        store.push_frame(FrameTracks::new(), FrameTracks::new(), FrameTracks::new());

        assert_eq!(annotator.annotate(&frames, &store).len(), 3);
    }

    #[test]
    fn rendering_is_deterministic() {
        let annotator = Annotator::default();
        let frames = vec![test_frame()];
        let store = test_store();

        let first = annotator.annotate(&frames, &store);
        let second = annotator.annotate(&frames, &store);

        assert_eq!(first, second);
    }

    #[test]
    fn input_frames_are_not_mutated() {
        let annotator = Annotator::default();
        let frames = vec![test_frame()];
        let pristine = frames.clone();

        let rendered = annotator.annotate(&frames, &test_store());

        assert_eq!(frames, pristine);
        assert_ne!(rendered[0], frames[0]);
    }

    #[test]
    fn boxes_partially_outside_the_frame_are_clipped() {
        let annotator = Annotator::default();
        let frames = vec![test_frame()];

        let mut store = TrackStore::with_capacity(1);
        let mut players = FrameTracks::new();
        players.insert(2, TrackEntry::new(BBox::new(-15.0, -5.0, 10.0, 85.0)));
        let mut ball = FrameTracks::new();
        ball.insert(BALL_TRACK_ID, TrackEntry::new(BBox::new(110.0, 5.0, 125.0, 15.0)));
        store.push_frame(players, FrameTracks::new(), ball);

        let rendered = annotator.annotate(&frames, &store);
        assert_eq!(rendered.len(), 1);
    }
}
