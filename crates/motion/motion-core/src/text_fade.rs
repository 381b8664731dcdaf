//! Staggered per-character text fade, advanced explicitly by the driver.
//!
//! Timeline of one fade: `pre_delay`, then characters fade one after another
//! (each starting `stagger` seconds after the previous and lasting
//! `char_duration`), then `post_delay`, then done.

use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::interp::functions::lerp_f32;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextFadeConfig {
    pub pre_delay: f64,
    pub char_duration: f64,
    pub stagger: f64,
    pub post_delay: f64,
    /// Fade characters out (1 -> 0) instead of in.
    pub fade_out: bool,
    pub curve: Curve,
}

impl Default for TextFadeConfig {
    fn default() -> Self {
        Self {
            pre_delay: 0.0,
            char_duration: 0.25,
            stagger: 0.05,
            post_delay: 0.0,
            fade_out: false,
            curve: Curve::Linear,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FadePhase {
    PreDelay,
    Animating,
    PostDelay,
    Done,
}

#[derive(Clone, Debug)]
pub struct TextFade {
    cfg: TextFadeConfig,
    char_count: usize,
    elapsed: f64,
    phase: FadePhase,
}

impl TextFade {
    pub fn new(cfg: TextFadeConfig, char_count: usize) -> Self {
        let mut fade = Self {
            cfg,
            char_count,
            elapsed: 0.0,
            phase: FadePhase::PreDelay,
        };
        fade.phase = fade.phase_at(0.0);
        fade
    }

    /// Seconds from the first character starting to the last one finishing.
    pub fn animating_duration(&self) -> f64 {
        if self.char_count == 0 {
            return 0.0;
        }
        self.cfg.stagger.max(0.0) * (self.char_count - 1) as f64 + self.cfg.char_duration.max(0.0)
    }

    pub fn total_duration(&self) -> f64 {
        self.cfg.pre_delay.max(0.0) + self.animating_duration() + self.cfg.post_delay.max(0.0)
    }

    fn phase_at(&self, elapsed: f64) -> FadePhase {
        let pre = self.cfg.pre_delay.max(0.0);
        let anim_end = pre + self.animating_duration();
        if elapsed < pre {
            FadePhase::PreDelay
        } else if elapsed < anim_end {
            FadePhase::Animating
        } else if elapsed < self.total_duration() {
            FadePhase::PostDelay
        } else {
            FadePhase::Done
        }
    }

    /// Advance by `dt` seconds (negative steps are ignored).
    pub fn advance(&mut self, dt: f64) -> FadePhase {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        self.phase = self.phase_at(self.elapsed);
        self.phase
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.phase = self.phase_at(0.0);
    }

    #[inline]
    pub fn phase(&self) -> FadePhase {
        self.phase
    }

    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.phase == FadePhase::Done
    }

    /// Alpha of character `index` at the current time.
    pub fn alpha_for(&self, index: usize) -> f32 {
        let (from, to) = if self.cfg.fade_out { (1.0, 0.0) } else { (0.0, 1.0) };
        if index >= self.char_count {
            return from;
        }
        let since_start = self.elapsed
            - self.cfg.pre_delay.max(0.0)
            - self.cfg.stagger.max(0.0) * index as f64;
        let local = if self.cfg.char_duration > 0.0 {
            (since_start / self.cfg.char_duration).clamp(0.0, 1.0)
        } else if since_start >= 0.0 {
            1.0
        } else {
            0.0
        };
        lerp_f32(from, to, self.cfg.curve.evaluate(local as f32))
    }

    pub fn alphas(&self) -> Vec<f32> {
        (0..self.char_count).map(|i| self.alpha_for(i)).collect()
    }
}
