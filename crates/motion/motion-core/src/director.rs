//! Director: owns every track mixer of a timeline and evaluates them per tick.

use crate::binding::{TargetBinding, TargetResolver, WriteStatus};
use crate::config::Config;
use crate::error::MotionError;
use crate::mixer::{Mixer, TrackMixer};
use crate::outputs::{Change, CoreEvent, Outputs};
use crate::timeline_json::{AnyTrack, TimelineData};
use crate::track::Track;
use crate::value::{ColorBlendSpace, MotionValue};

pub struct Director {
    cfg: Config,
    mixers: Vec<Box<dyn Mixer>>,
    unbound: Vec<String>,
    binding_errors: Vec<(String, MotionError)>,
    outputs: Outputs,
}

impl Director {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            mixers: Vec::new(),
            unbound: Vec::new(),
            binding_errors: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    /// Bind every track of a loaded timeline through `resolver`. Tracks whose
    /// target cannot be resolved are skipped and listed in
    /// [`Director::unbound_targets`]. Tracks whose target currently holds a
    /// different kind are skipped and listed in [`Director::binding_errors`].
    pub fn from_timeline(
        data: TimelineData,
        resolver: &mut dyn TargetResolver,
        cfg: Config,
    ) -> Self {
        let mut director = Self::new(cfg);
        for track in data.tracks {
            let kind = track.kind();
            let Some(sink) = resolver.resolve(track.target(), kind) else {
                log::warn!(
                    "timeline '{}': no target for '{}' ({kind:?}); track skipped",
                    data.name,
                    track.target()
                );
                director.unbound.push(track.target().to_string());
                continue;
            };
            if let Some(found) = sink.read().map(|v| v.kind()).filter(|found| *found != kind) {
                let err = MotionError::KindMismatch {
                    expected: kind,
                    found,
                };
                log::warn!(
                    "timeline '{}': target '{}': {err}; track skipped",
                    data.name,
                    track.target()
                );
                director.binding_errors.push((track.target().to_string(), err));
                continue;
            }
            match track {
                AnyTrack::Float(t) => director.add_track(t, TargetBinding::from_value_sink(sink)),
                AnyTrack::Vec2(t) => director.add_track(t, TargetBinding::from_value_sink(sink)),
                AnyTrack::Vec3(t) => director.add_track(t, TargetBinding::from_value_sink(sink)),
                AnyTrack::Vec4(t) => director.add_track(t, TargetBinding::from_value_sink(sink)),
                AnyTrack::Quat(t) => director.add_track(t, TargetBinding::from_value_sink(sink)),
                AnyTrack::Color(t) => director.add_track(t, TargetBinding::from_value_sink(sink)),
                AnyTrack::Sprite(t) => director.add_track(t, TargetBinding::from_value_sink(sink)),
            }
        }
        director
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn add_mixer(&mut self, mixer: Box<dyn Mixer>) {
        self.mixers.push(mixer);
    }

    pub fn add_track<V: MotionValue>(&mut self, track: Track<V>, binding: TargetBinding<V>) {
        let mixer = TrackMixer::new(track, binding, self.cfg.clone());
        self.mixers.push(Box::new(mixer));
    }

    pub fn mixer_count(&self) -> usize {
        self.mixers.len()
    }

    pub fn unbound_targets(&self) -> &[String] {
        &self.unbound
    }

    pub fn binding_errors(&self) -> &[(String, MotionError)] {
        &self.binding_errors
    }

    /// Evaluate every track at `time`. A failing track is reported as an
    /// event and does not affect the others.
    pub fn evaluate(&mut self, time: f64) -> &Outputs {
        self.outputs.clear();
        for mixer in &mut self.mixers {
            let track = mixer.track_id();
            let frame = match mixer.tick(time) {
                Ok(frame) => frame,
                Err(err) => {
                    log::warn!("track {track:?} ('{}') failed: {err}", mixer.target());
                    self.outputs.push_event(CoreEvent::Error {
                        track,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            if frame.layout_refreshed {
                self.outputs.push_event(CoreEvent::LayoutRefreshed { track });
                for (clip, reason) in mixer.rejected_clips() {
                    self.outputs
                        .push_event(CoreEvent::ClipRejected { track, clip, reason });
                }
            }
            match frame.write {
                Some(WriteStatus::Written) => self.outputs.push_change(Change {
                    track,
                    key: mixer.target().to_string(),
                    value: frame.value,
                    state: frame.state,
                }),
                Some(WriteStatus::TargetLost { first: true }) => {
                    self.outputs.push_event(CoreEvent::TargetLost {
                        track,
                        key: mixer.target().to_string(),
                    })
                }
                _ => {}
            }
        }
        &self.outputs
    }

    /// Force every track to recalculate its layout on the next tick.
    pub fn invalidate(&mut self) {
        for mixer in &mut self.mixers {
            mixer.invalidate();
        }
    }

    pub fn set_color_space(&mut self, space: ColorBlendSpace) {
        self.cfg.color_space = space;
        for mixer in &mut self.mixers {
            mixer.set_color_space(space);
        }
    }

    /// Restore every target's default. Returns how many were restored.
    pub fn teardown(&mut self) -> usize {
        let mut restored = 0;
        for mixer in &mut self.mixers {
            if mixer.teardown() {
                restored += 1;
            }
        }
        restored
    }
}
