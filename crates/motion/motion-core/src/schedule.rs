//! Reference playback driver: derives per-clip `(weight, local_time)` samples
//! from clip bounds, the way a timeline mixes overlapping clips.
//!
//! Model:
//! - outside `[start, end)` a clip has weight 0; its local time is clamped
//! - inside, weight = min(fade-in ramp, fade-out ramp)
//! - fade-in lasts `max(ease_in, overlap with the previous clip)`, fade-out
//!   lasts `max(ease_out, overlap with the next clip)`, so two overlapping
//!   clips cross-fade with weights summing to 1
//! - clips that are not playable get weight 0 and are not overlap neighbours

use crate::blend::ClipSample;
use crate::clip::ClipInstance;
use crate::value::MotionValue;

/// Normalized local time of `time` within `[start, end]`, clamped to [0,1].
#[inline]
pub fn local_time(start: f64, end: f64, time: f64) -> f32 {
    let span = end - start;
    if span <= 0.0 {
        return if time >= end { 1.0 } else { 0.0 };
    }
    ((time - start) / span).clamp(0.0, 1.0) as f32
}

/// Sample every clip (sorted by start) at `time`.
pub fn sample_clips<V: MotionValue>(clips: &[ClipInstance<V>], time: f64) -> Vec<ClipSample> {
    sample_playable_clips(clips, time, |_| true)
}

/// Like [`sample_clips`], but clips for which `playable` is false are left
/// at weight 0 and do not fade their neighbours.
pub fn sample_playable_clips<V, F>(
    clips: &[ClipInstance<V>],
    time: f64,
    playable: F,
) -> Vec<ClipSample>
where
    V: MotionValue,
    F: Fn(&ClipInstance<V>) -> bool,
{
    let mut out = Vec::with_capacity(clips.len());
    for (i, clip) in clips.iter().enumerate() {
        let (start, end) = (clip.start(), clip.end());
        let local = local_time(start, end, time);
        if time < start || time >= end || !playable(clip) {
            out.push(ClipSample::new(0.0, local));
            continue;
        }

        let overlap_in = clips[..i]
            .iter()
            .rev()
            .find(|prev| playable(prev))
            .map(|prev| (prev.end() - start).min(end - start))
            .unwrap_or(0.0)
            .max(0.0);
        let overlap_out = clips[i + 1..]
            .iter()
            .find(|next| playable(next))
            .map(|next| (end - next.start()).min(end - start))
            .unwrap_or(0.0)
            .max(0.0);
        let fade_in = clip.schedule.ease_in.max(overlap_in);
        let fade_out = clip.schedule.ease_out.max(overlap_out);

        let mut weight = 1.0f64;
        if fade_in > 0.0 && time < start + fade_in {
            weight = weight.min((time - start) / fade_in);
        }
        if fade_out > 0.0 && time > end - fade_out {
            weight = weight.min((end - time) / fade_out);
        }
        out.push(ClipSample::new(weight.clamp(0.0, 1.0) as f32, local));
    }
    out
}
