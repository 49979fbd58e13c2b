use std::collections::HashMap;

use crate::bbox::BBox;
use crate::error::Error;
use crate::tracks::TrackId;

pub const CLASS_PLAYER: &str = "player";
pub const CLASS_GOALKEEPER: &str = "goalkeeper";
pub const CLASS_REFEREE: &str = "referee";
pub const CLASS_BALL: &str = "ball";

/// One raw detected box in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub bbox: BBox,
    pub class: i32,
    pub confidence: f32,
}

/// A detection annotated with a stable cross-frame identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedDetection {
    pub bbox: BBox,
    pub class: i32,
    pub confidence: f32,
    pub track_id: TrackId,
}

/// Class-id <-> class-name mapping reported by the detection model.
#[derive(Debug, Clone, Default)]
pub struct ClassMap {
    names: HashMap<i32, String>,
    ids: HashMap<String, i32>,
}

impl ClassMap {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = (i32, S)>,
        S: Into<String>,
    {
        let names: HashMap<i32, String> =
            names.into_iter().map(|(id, name)| (id, name.into())).collect();
        let ids = names.iter().map(|(&id, name)| (name.clone(), id)).collect();

        Self { names, ids }
    }

    #[inline]
    pub fn name_of(&self, id: i32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    #[inline]
    pub fn id_of(&self, name: &str) -> Option<i32> {
        self.ids.get(name).copied()
    }
}

/// Raw per-frame output of the detection capability.
#[derive(Debug, Clone, Default)]
pub struct DetectionBatch {
    pub detections: Vec<Detection>,
    pub classes: ClassMap,
}

/// Rewrite every goalkeeper detection to the player class id. Goalkeepers
/// move and render exactly like field players, so they share one identity
/// space. Must run before identity assignment.
pub fn remap_goalkeepers(batch: &mut DetectionBatch) -> Result<(), Error> {
    let goalkeeper = match batch.classes.id_of(CLASS_GOALKEEPER) {
        Some(id) => id,
        None => return Ok(()),
    };

    if !batch.detections.iter().any(|d| d.class == goalkeeper) {
        return Ok(());
    }

    let player = batch
        .classes
        .id_of(CLASS_PLAYER)
        .ok_or_else(|| Error::UnknownClass(CLASS_PLAYER.to_string()))?;

    for det in &mut batch.detections {
        if det.class == goalkeeper {
            det.class = player;
        }
    }

    Ok(())
}
