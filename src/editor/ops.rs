//! Edit algorithms on single clips
//!
//! Pure functions: they compute new clip geometry and never touch history or
//! tracks. Every result is quantized.

use uuid::Uuid;

use crate::timeline::{quantize, Clip};

/// Which edge a trim drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimEdge {
    Start,
    End,
}

/// Split `clip` at absolute timeline time `at`.
///
/// The first fragment keeps the original id; the second gets a suffixed one.
/// Returns `None` when either fragment would be shorter than `min_len`.
pub fn split_clip(clip: &Clip, at: f64, min_len: f64) -> Option<(Clip, Clip)> {
    let relative = quantize(at - clip.start_time);
    let remainder = quantize(clip.duration - relative);
    if relative < min_len || remainder < min_len {
        return None;
    }

    let mut first = clip.clone();
    first.duration = relative;
    first.trim_end = quantize(clip.trim_start + relative);

    let mut second = clip.clone();
    second.id = split_id(&clip.id);
    second.start_time = quantize(clip.start_time + relative);
    second.trim_start = first.trim_end;
    second.duration = remainder;

    Some((first, second))
}

fn split_id(base: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-split-{}", base, &suffix[..8])
}

/// Candidate start for a drag of `delta_px` at the given zoom.
pub fn drag_target(origin_start: f64, delta_px: f64, pixels_per_second: f64) -> f64 {
    quantize((origin_start + delta_px / pixels_per_second).max(0.0))
}

/// Snap distance in seconds for a pixel threshold.
pub fn snap_threshold(threshold_px: f64, pixels_per_second: f64) -> f64 {
    threshold_px / pixels_per_second
}

/// Snap `candidate` to the nearest boundary (or zero) closer than `threshold`.
pub fn snap_time(candidate: f64, boundaries: &[f64], threshold: f64) -> f64 {
    boundaries
        .iter()
        .copied()
        .chain(std::iter::once(0.0))
        .map(|b| ((candidate - b).abs(), b))
        .filter(|(distance, _)| *distance < threshold)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, b)| b)
        .unwrap_or(candidate)
}

/// Move one edge of `clip` to absolute time `time`, keeping the source
/// window consistent. Returns `None` if nothing would change.
pub fn trim_clip(clip: &Clip, edge: TrimEdge, time: f64, min_len: f64) -> Option<Clip> {
    let mut trimmed = clip.clone();
    let time = quantize(time.max(0.0));

    match edge {
        TrimEdge::Start => {
            let mut delta = time - clip.start_time;
            if clip.kind.is_media_backed() {
                // Cannot reveal source before its first frame.
                delta = delta.max(-clip.trim_start);
            }
            delta = quantize(delta.min(clip.duration - min_len));

            trimmed.start_time = quantize(clip.start_time + delta);
            trimmed.duration = quantize(clip.duration - delta);
            trimmed.trim_start = quantize((clip.trim_start + delta).max(0.0));
            trimmed.trim_end = quantize(trimmed.trim_start + trimmed.duration);
        }
        TrimEdge::End => {
            let mut duration = time - clip.start_time;
            if clip.kind.is_media_backed() {
                duration = duration.min(clip.original_duration - clip.trim_start);
            }
            trimmed.duration = quantize(duration.max(min_len));
            trimmed.trim_end = quantize(clip.trim_start + trimmed.duration);
        }
    }

    if !clip.kind.is_media_backed() {
        // Stills and text have no intrinsic length; the source grows with them.
        trimmed.original_duration = trimmed.original_duration.max(trimmed.trim_end);
    }
    trimmed.fade_in = trimmed.fade_in.min(trimmed.duration);
    trimmed.fade_out = trimmed.fade_out.min(trimmed.duration);

    if trimmed == *clip {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{time_eq, ClipKind};
    use approx::assert_abs_diff_eq;

    fn video(start: f64, duration: f64) -> Clip {
        let mut clip = Clip::new(ClipKind::Video, "v", duration).with_start(start);
        clip.id = "v1".to_string();
        clip
    }

    #[test]
    fn test_split_preserves_total_and_source_window() {
        let clip = video(2.0, 10.0);
        let (a, b) = split_clip(&clip, 5.5, 0.1).unwrap();

        assert_eq!(a.id, "v1");
        assert!(b.id.starts_with("v1-split-"));
        assert_abs_diff_eq!(a.duration + b.duration, 10.0, epsilon = 1e-4);
        assert!(time_eq(a.trim_end, b.trim_start));
        assert!(time_eq(b.start_time, 5.5));
        assert!(time_eq(a.duration, 3.5));
        assert_eq!(b.trim_end, clip.trim_end);
    }

    #[test]
    fn test_split_inherits_properties() {
        let mut clip = video(0.0, 4.0);
        clip.opacity = 40.0;
        clip.fade_in = 1.0;
        let (a, b) = split_clip(&clip, 2.0, 0.1).unwrap();
        assert_eq!(a.opacity, 40.0);
        assert_eq!(b.opacity, 40.0);
        assert_eq!(b.fade_in, 1.0);
    }

    #[test]
    fn test_split_guard_near_edges() {
        let clip = video(0.0, 4.0);
        assert!(split_clip(&clip, 0.05, 0.1).is_none());
        assert!(split_clip(&clip, 3.95, 0.1).is_none());
        assert!(split_clip(&clip, -1.0, 0.1).is_none());
        assert!(split_clip(&clip, 9.0, 0.1).is_none());
        assert!(split_clip(&clip, 0.1, 0.1).is_some());
    }

    #[test]
    fn test_split_of_trimmed_clip() {
        let mut clip = video(10.0, 4.0);
        clip.original_duration = 20.0;
        clip.trim_start = 6.0;
        clip.trim_end = 10.0;
        let (a, b) = split_clip(&clip, 11.0, 0.1).unwrap();
        assert!(time_eq(a.trim_end, 7.0));
        assert!(time_eq(b.trim_start, 7.0));
        assert!(time_eq(b.trim_end, 10.0));
    }

    #[test]
    fn test_drag_target_clamps_at_zero() {
        assert_eq!(drag_target(1.0, -500.0, 50.0), 0.0);
        assert!(time_eq(drag_target(1.0, 100.0, 50.0), 3.0));
    }

    #[test]
    fn test_snap_picks_nearest_boundary() {
        let bounds = [0.0, 5.0, 9.0];
        assert_eq!(snap_time(3.0, &bounds, 3.5), 5.0);
        assert_eq!(snap_time(8.8, &bounds, 0.3), 9.0);
        assert_eq!(snap_time(7.0, &bounds, 0.3), 7.0);
    }

    #[test]
    fn test_snap_to_zero_without_boundaries() {
        assert_eq!(snap_time(0.2, &[], 0.3), 0.0);
        assert_eq!(snap_time(0.4, &[], 0.3), 0.4);
    }

    #[test]
    fn test_trim_start_cannot_reveal_before_source() {
        let clip = video(5.0, 4.0);
        let trimmed = trim_clip(&clip, TrimEdge::Start, 2.0, 0.1);
        assert!(trimmed.is_none());

        let trimmed = trim_clip(&clip, TrimEdge::Start, 6.0, 0.1).unwrap();
        assert!(time_eq(trimmed.start_time, 6.0));
        assert!(time_eq(trimmed.duration, 3.0));
        assert!(time_eq(trimmed.trim_start, 1.0));
        assert!(time_eq(trimmed.trim_end, 4.0));
        assert!(trimmed.validate().is_ok());
    }

    #[test]
    fn test_trim_end_bounded_by_source() {
        let clip = video(0.0, 4.0);
        assert!(trim_clip(&clip, TrimEdge::End, 8.0, 0.1).is_none());

        let trimmed = trim_clip(&clip, TrimEdge::End, 2.5, 0.1).unwrap();
        assert!(time_eq(trimmed.duration, 2.5));
        assert!(time_eq(trimmed.trim_end, 2.5));
    }

    #[test]
    fn test_trim_keeps_minimum_length() {
        let clip = video(0.0, 4.0);
        let trimmed = trim_clip(&clip, TrimEdge::End, 0.0, 0.1).unwrap();
        assert!(time_eq(trimmed.duration, 0.1));

        let trimmed = trim_clip(&clip, TrimEdge::Start, 10.0, 0.1).unwrap();
        assert!(time_eq(trimmed.duration, 0.1));
        assert!(time_eq(trimmed.start_time, 3.9));
    }

    #[test]
    fn test_trim_extends_stills() {
        let clip = Clip::new(ClipKind::Image, "still", 5.0);
        let trimmed = trim_clip(&clip, TrimEdge::End, 9.0, 0.1).unwrap();
        assert!(time_eq(trimmed.duration, 9.0));
        assert!(time_eq(trimmed.original_duration, 9.0));
        assert!(trimmed.validate().is_ok());
    }
}
