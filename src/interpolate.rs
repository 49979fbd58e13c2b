use ndarray::prelude::*;

use crate::bbox::BBox;
use crate::tracks::{FrameTracks, TrackEntry, BALL_TRACK_ID};

/// Fill gaps in the per-frame ball sequence. Interior gaps are linearly
/// interpolated per coordinate between the nearest detected boxes, trailing
/// gaps hold the last detected box, and leading gaps take the first one.
/// Frames stay empty only when the whole sequence has no detection at all.
///
/// Interpolating an already complete sequence returns it unchanged.
pub fn interpolate_ball(ball: &[FrameTracks]) -> Vec<FrameTracks> {
    let n = ball.len();
    let mut table = Array2::<f32>::from_elem((n, 4), f32::NAN);

    let mut missing = 0usize;
    for (row, tracks) in ball.iter().enumerate() {
        match tracks.get(&BALL_TRACK_ID) {
            Some(entry) => {
                let coords: [f32; 4] = entry.bbox.into();
                for (col, value) in coords.into_iter().enumerate() {
                    table[[row, col]] = value;
                }
            }
            None => missing += 1,
        }
    }

    for col in 0..4 {
        fill_column(table.column_mut(col));
    }

    let mut out = Vec::with_capacity(n);
    let mut unresolved = 0usize;
    for row in table.rows() {
        let mut tracks = FrameTracks::new();

        if row.iter().all(|v| !v.is_nan()) {
            let bbox = BBox::new(row[0], row[1], row[2], row[3]);
            tracks.insert(BALL_TRACK_ID, TrackEntry::new(bbox));
        } else {
            unresolved += 1;
        }

        out.push(tracks);
    }

    log::debug!(
        "ball interpolation: {} of {} frames filled, {} unresolved",
        missing - unresolved,
        n,
        unresolved
    );

    out
}

/// One coordinate over all frames. NaN marks a missing value.
fn fill_column(mut col: ArrayViewMut1<'_, f32>) {
    let n = col.len();
    let mut last_valid: Option<usize> = None;
    let mut i = 0;

    while i < n {
        if !col[i].is_nan() {
            last_valid = Some(i);
            i += 1;
            continue;
        }

        let mut j = i;
        while j < n && col[j].is_nan() {
            j += 1;
        }

        match (last_valid, j < n) {
            // interior gap: lerp between the bracketing values
            (Some(a), true) => {
                let start = col[a];
                let step = (col[j] - start) / (j - a) as f32;
                for k in i..j {
                    col[k] = start + step * (k - a) as f32;
                }
            }
            // trailing gap: hold the last value
            (Some(a), false) => {
                let v = col[a];
                for k in i..j {
                    col[k] = v;
                }
            }
            // leading gap: backward-fill from the first value
            (None, true) => {
                let v = col[j];
                for k in i..j {
                    col[k] = v;
                }
            }
            // no valid value anywhere in the column
            (None, false) => {}
        }

        i = j;
    }
}
