use std::collections::HashMap;

use serde_derive::{Deserialize, Serialize};

use crate::bbox::BBox;

pub type TrackId = u32;

/// Fixed identity for the ball. A match has one ball, so its detections
/// need no cross-frame disambiguation.
pub const BALL_TRACK_ID: TrackId = 1;

/// RGB color.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const RED: Color = Color([255, 0, 0]);
    pub const YELLOW: Color = Color([255, 255, 0]);
    pub const GREEN: Color = Color([0, 255, 0]);
    pub const BLACK: Color = Color([0, 0, 0]);

    #[inline]
    pub fn rgb(self) -> image::Rgb<u8> {
        image::Rgb(self.0)
    }
}

/// Per-frame state of one tracked object. The team color is assigned
/// after tracking, if at all; rendering falls back to a default when it
/// is absent.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct TrackEntry {
    pub bbox: BBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_color: Option<Color>,
}

impl TrackEntry {
    #[inline]
    pub fn new(bbox: BBox) -> Self {
        Self {
            bbox,
            team_color: None,
        }
    }
}

/// Track id -> entry for one frame, one category.
pub type FrameTracks = HashMap<TrackId, TrackEntry>;

/// All tracks of one video, one map per frame per category. Frame index is
/// the vector position; the three sequences always have equal length.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TrackStore {
    pub players: Vec<FrameTracks>,
    pub referees: Vec<FrameTracks>,
    pub ball: Vec<FrameTracks>,
}

impl TrackStore {
    pub fn with_capacity(frames: usize) -> Self {
        Self {
            players: Vec::with_capacity(frames),
            referees: Vec::with_capacity(frames),
            ball: Vec::with_capacity(frames),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Append one frame's worth of tracks to every category.
    pub fn push_frame(&mut self, players: FrameTracks, referees: FrameTracks, ball: FrameTracks) {
        self.players.push(players);
        self.referees.push(referees);
        self.ball.push(ball);
    }

    /// Assign a team color to a player track in one frame. Returns false
    /// when the frame or track is unknown.
    pub fn set_team_color(&mut self, frame: usize, track_id: TrackId, color: Color) -> bool {
        match self.players.get_mut(frame).and_then(|f| f.get_mut(&track_id)) {
            Some(entry) => {
                entry.team_color = Some(color);
                true
            }
            None => false,
        }
    }
}
