use std::path::Path;

use crate::cache;
use crate::detection::{remap_goalkeepers, Detection, DetectionBatch, CLASS_BALL, CLASS_PLAYER, CLASS_REFEREE};
use crate::detector::{BatchedDetector, Detector, DetectorConfig};
use crate::error::Error;
use crate::tracks::{FrameTracks, TrackEntry, TrackStore, BALL_TRACK_ID};
use crate::{Frame, IdentityTracker};

/// End-to-end tracking over a video: detection in chunks, goalkeeper
/// remap, identity assignment for people, fixed-identity ball recording.
///
/// The identity tracker is driven strictly once per frame, in frame
/// order, with one instance per video. Ball detections never reach it.
pub struct TrackPipeline<D: Detector, T: IdentityTracker> {
    detector: BatchedDetector<D>,
    identity: T,
}

impl<D: Detector, T: IdentityTracker> TrackPipeline<D, T> {
    pub fn new(detector: D, identity: T, config: DetectorConfig) -> Self {
        Self {
            detector: BatchedDetector::new(detector, config),
            identity,
        }
    }

    /// Run detection and identity assignment over all frames and build
    /// the per-frame track maps.
    pub fn track(&mut self, frames: &[Frame]) -> Result<TrackStore, Error> {
        let batches = self.detector.detect(frames)?;

        let mut store = TrackStore::with_capacity(frames.len());
        for mut batch in batches {
            remap_goalkeepers(&mut batch)?;

            let (players, referees, ball) = self.track_frame(&batch)?;
            store.push_frame(players, referees, ball);
        }

        log::info!("tracked {} frames", store.len());
        Ok(store)
    }

    /// Like [`track`](Self::track), backed by a cache file: when
    /// `read_cache` is set and the blob at `cache_path` loads, it is
    /// returned verbatim and detection is skipped entirely. The computed
    /// store is always written back to `cache_path`.
    pub fn track_cached(
        &mut self,
        frames: &[Frame],
        cache_path: &Path,
        read_cache: bool,
    ) -> Result<TrackStore, Error> {
        if read_cache {
            if let Some(tracks) = cache::load(cache_path)? {
                log::info!("loaded track cache from {}", cache_path.display());
                return Ok(tracks);
            }
        }

        let tracks = self.track(frames)?;
        cache::save(&tracks, cache_path)?;

        Ok(tracks)
    }

    fn track_frame(
        &mut self,
        batch: &DetectionBatch,
    ) -> Result<(FrameTracks, FrameTracks, FrameTracks), Error> {
        let ball_id = batch.classes.id_of(CLASS_BALL);
        let player_id = batch.classes.id_of(CLASS_PLAYER);
        let referee_id = batch.classes.id_of(CLASS_REFEREE);

        let people: Vec<Detection> = batch
            .detections
            .iter()
            .filter(|d| Some(d.class) != ball_id)
            .copied()
            .collect();
        let tracked = self.identity.update(&people)?;

        let mut players = FrameTracks::new();
        let mut referees = FrameTracks::new();
        for det in tracked {
            if Some(det.class) == player_id {
                players.insert(det.track_id, TrackEntry::new(det.bbox));
            } else if Some(det.class) == referee_id {
                referees.insert(det.track_id, TrackEntry::new(det.bbox));
            }
        }

        // last one wins when a frame has several ball boxes
        let mut ball = FrameTracks::new();
        for det in batch.detections.iter().filter(|d| Some(d.class) == ball_id) {
            ball.insert(BALL_TRACK_ID, TrackEntry::new(det.bbox));
        }

        Ok((players, referees, ball))
    }

    pub fn detector(&self) -> &BatchedDetector<D> {
        &self.detector
    }

    pub fn identity(&self) -> &T {
        &self.identity
    }

    /// Release the underlying capabilities.
    pub fn into_parts(self) -> (D, T) {
        (self.detector.into_inner(), self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::detection::{ClassMap, TrackedDetection, CLASS_GOALKEEPER};

    const BALL: i32 = 0;
    const GOALKEEPER: i32 = 1;
    const PLAYER: i32 = 2;
    const REFEREE: i32 = 3;

    fn classes() -> ClassMap {
        ClassMap::new([
            (BALL, CLASS_BALL),
            (GOALKEEPER, CLASS_GOALKEEPER),
            (PLAYER, CLASS_PLAYER),
            (REFEREE, CLASS_REFEREE),
        ])
    }

    fn det(class: i32, x1: f32) -> Detection {
        Detection {
            bbox: BBox::new(x1, 0.0, x1 + 10.0, 20.0),
            class,
            confidence: 0.8,
        }
    }

    /// Replays a scripted set of per-frame detections.
    struct ScriptedDetector {
        script: Vec<Vec<Detection>>,
        next_frame: usize,
        calls: usize,
    }

    impl ScriptedDetector {
        fn new(script: Vec<Vec<Detection>>) -> Self {
            Self {
                script,
                next_frame: 0,
                calls: 0,
            }
        }
    }

    impl Detector for ScriptedDetector {
        fn detect(&mut self, frames: &[Frame], _: f32) -> Result<Vec<DetectionBatch>, Error> {
            self.calls += 1;

            Ok(frames
                .iter()
                .map(|_| {
                    let detections = self.script[self.next_frame].clone();
                    self.next_frame += 1;

                    DetectionBatch {
                        detections,
                        classes: classes(),
                    }
                })
                .collect())
        }
    }

    /// Hands out ids per frame by detection order and records every slice
    /// it was given.
    struct SequentialIdentity {
        seen: Vec<Vec<i32>>,
    }

    impl SequentialIdentity {
        fn new() -> Self {
            Self { seen: Vec::new() }
        }
    }

    impl IdentityTracker for SequentialIdentity {
        fn reset(&mut self) {
            self.seen.clear();
        }

        fn update(&mut self, detections: &[Detection]) -> Result<Vec<TrackedDetection>, Error> {
            self.seen.push(detections.iter().map(|d| d.class).collect());

            Ok(detections
                .iter()
                .enumerate()
                .map(|(idx, d)| TrackedDetection {
                    bbox: d.bbox,
                    class: d.class,
                    confidence: d.confidence,
                    track_id: idx as u32 + 1,
                })
                .collect())
        }
    }

    fn frames(n: usize) -> Vec<Frame> {
        (0..n).map(|_| Frame::new(4, 4)).collect()
    }

    fn pipeline(
        script: Vec<Vec<Detection>>,
    ) -> TrackPipeline<ScriptedDetector, SequentialIdentity> {
        TrackPipeline::new(
            ScriptedDetector::new(script),
            SequentialIdentity::new(),
            DetectorConfig::default(),
        )
    }

    #[test]
    fn one_entry_per_frame_even_when_empty() {
        let script = vec![vec![det(PLAYER, 0.0)], vec![], vec![det(REFEREE, 5.0)]];
        let mut pipeline = pipeline(script);

        let store = pipeline.track(&frames(3)).unwrap();

        assert_eq!(store.players.len(), 3);
        assert_eq!(store.referees.len(), 3);
        assert_eq!(store.ball.len(), 3);
        assert!(store.players[1].is_empty());
        assert!(store.ball[1].is_empty());
    }

    #[test]
    fn goalkeepers_land_in_the_players_map() {
        let script = vec![vec![det(GOALKEEPER, 0.0), det(PLAYER, 30.0)]];
        let mut pipeline = pipeline(script);

        let store = pipeline.track(&frames(1)).unwrap();

        assert_eq!(store.players[0].len(), 2);
        assert!(store.referees[0].is_empty());
    }

    #[test]
    fn ball_keeps_fixed_identity_and_last_box_wins() {
        let script = vec![vec![det(BALL, 10.0), det(PLAYER, 40.0), det(BALL, 70.0)]];
        let mut pipeline = pipeline(script);

        let store = pipeline.track(&frames(1)).unwrap();

        let ball = &store.ball[0];
        assert_eq!(ball.len(), 1);
        assert_eq!(ball[&BALL_TRACK_ID].bbox.x1, 70.0);
    }

    #[test]
    fn ball_never_reaches_the_identity_tracker() {
        let script = vec![
            vec![det(BALL, 0.0), det(PLAYER, 20.0)],
            vec![det(BALL, 1.0)],
        ];
        let mut pipeline = pipeline(script);

        pipeline.track(&frames(2)).unwrap();

        let seen = &pipeline.identity().seen;
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], vec![PLAYER]);
        assert!(seen[1].is_empty());
    }

    #[test]
    fn identity_tracker_runs_once_per_frame_in_order() {
        let script: Vec<Vec<Detection>> =
            (0..25).map(|i| vec![det(PLAYER, i as f32)]).collect();
        let mut pipeline = pipeline(script);

        let store = pipeline.track(&frames(25)).unwrap();

        assert_eq!(store.len(), 25);
        assert_eq!(pipeline.identity().seen.len(), 25);
        for (idx, frame) in store.players.iter().enumerate() {
            assert_eq!(frame[&1].bbox.x1, idx as f32);
        }
    }

    #[test]
    fn remap_happens_before_identity_assignment() {
        let script = vec![vec![det(GOALKEEPER, 0.0)]];
        let mut pipeline = pipeline(script);

        pipeline.track(&frames(1)).unwrap();

        // the tracker saw the player class id, not the goalkeeper one
        assert_eq!(pipeline.identity().seen[0], vec![PLAYER]);
    }

    #[test]
    fn cache_round_trip_skips_recomputation() {
        let path = std::env::temp_dir().join(format!(
            "pitchtrack-{}-pipeline-cache.json",
            std::process::id()
        ));
        let script = vec![vec![det(PLAYER, 0.0), det(BALL, 50.0)]];

        let mut first = pipeline(script.clone());
        let computed = first.track_cached(&frames(1), &path, true).unwrap();
        assert_eq!(first.detector().inner().calls, 1);

        // second pipeline never runs detection, the blob answers
        let mut second = pipeline(script);
        let cached = second.track_cached(&frames(1), &path, true).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(cached, computed);
        assert_eq!(second.detector().inner().calls, 0);
    }
}
