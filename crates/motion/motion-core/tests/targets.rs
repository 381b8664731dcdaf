use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use motion_core::{
    parse_timeline_json, BlendState, ClipId, ClipInstance, ClipSample, ClipSchedule,
    ColorBlendSpace, ComponentPropertyBinding, Config, CoreEvent, DirectFieldBinding, Director,
    Extrapolation, MotionError, PropertyHost, Rgba, ShaderGlobals, ShaderParameterBinding,
    TargetBinding, TargetResolver, Track, TrackId, TrackMixer, Value, ValueKind, ValueSink,
    WriteStatus,
};

/// Minimal scene object with a handful of named properties.
struct SceneNode {
    name: String,
    alive: bool,
    names: Vec<String>,
    values: Vec<Value>,
}

impl SceneNode {
    fn new(name: &str, props: &[(&str, Value)]) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            name: name.to_string(),
            alive: true,
            names: props.iter().map(|(n, _)| n.to_string()).collect(),
            values: props.iter().map(|(_, v)| v.clone()).collect(),
        }))
    }

    fn get(&self, prop: &str) -> Option<&Value> {
        let slot = self.names.iter().position(|n| n == prop)?;
        self.values.get(slot)
    }
}

impl PropertyHost for SceneNode {
    fn host_name(&self) -> &str {
        &self.name
    }
    fn is_alive(&self) -> bool {
        self.alive
    }
    fn property_slot(&self, property: &str) -> Option<usize> {
        self.names.iter().position(|n| n == property)
    }
    fn get_property(&self, slot: usize) -> Option<Value> {
        self.values.get(slot).cloned()
    }
    fn set_property(&mut self, slot: usize, value: Value) -> bool {
        match self.values.get_mut(slot) {
            Some(v) if v.kind() == value.kind() => {
                *v = value;
                true
            }
            _ => false,
        }
    }
}

/// Resolves "node.property" paths against scene nodes and "shader:Name"
/// paths against shader globals.
struct SceneResolver {
    nodes: HashMap<String, Rc<RefCell<SceneNode>>>,
    shaders: Rc<RefCell<ShaderGlobals>>,
}

impl TargetResolver for SceneResolver {
    fn resolve(&mut self, path: &str, _kind: ValueKind) -> Option<Box<dyn ValueSink>> {
        if let Some(name) = path.strip_prefix("shader:") {
            return Some(Box::new(ShaderParameterBinding::bind(&self.shaders, name)));
        }
        let (node, prop) = path.split_once('.')?;
        let node = self.nodes.get(node)?;
        let sink = ComponentPropertyBinding::bind(node, prop).ok()?;
        Some(Box::new(sink))
    }
}

fn alpha_mixer(field: &Rc<RefCell<f32>>, extrapolation: Extrapolation) -> TrackMixer<f32> {
    let clip = ClipInstance::new(ClipId(0), "fade", ClipSchedule::new(1.0, 2.0), 0.0, 1.0)
        .with_extrapolation(extrapolation);
    let track = Track::new(TrackId(0), "alpha", "panel.alpha").with_clips(vec![clip]);
    TrackMixer::new(
        track,
        TargetBinding::new(DirectFieldBinding::new("panel.alpha", field)),
        Config::default(),
    )
}

#[test]
fn default_is_captured_on_first_frame_only() {
    let field = Rc::new(RefCell::new(0.8f32));
    let mut mixer = alpha_mixer(&field, Extrapolation::Default);
    mixer.process_at(2.0).unwrap();
    assert_eq!(*field.borrow(), 0.5);
    // Someone else writes the target mid-playback; the default stays.
    *field.borrow_mut() = 0.1;
    let frame = mixer.process_at(4.0).unwrap();
    assert_eq!(frame.state, BlendState::DefaultExtrapolation { clip: ClipId(0) });
    assert_eq!(frame.value, 0.8);
    assert_eq!(*field.borrow(), 0.8);
    assert_eq!(mixer.binding().default_value(), Some(0.8));
}

#[test]
fn externally_supplied_samples_drive_the_blend() {
    let field = Rc::new(RefCell::new(0.0f32));
    let mut mixer = alpha_mixer(&field, Extrapolation::Hold);
    let frame = mixer.process_frame(1.5, &[ClipSample::new(0.5, 0.5)]).unwrap();
    assert_eq!(frame.value, 0.25);
    let err = mixer.process_frame(1.5, &[]).unwrap_err();
    assert_eq!(err, MotionError::SampleCountMismatch { expected: 1, found: 0 });
}

#[test]
fn destroyed_target_is_skipped_without_failing() {
    let field = Rc::new(RefCell::new(0.0f32));
    let mut mixer = alpha_mixer(&field, Extrapolation::Hold);
    mixer.process_at(1.5).unwrap();
    drop(field);
    let frame = mixer.process_at(2.0).unwrap();
    assert_eq!(frame.write, Some(WriteStatus::TargetLost { first: true }));
    let frame = mixer.process_at(2.5).unwrap();
    assert_eq!(frame.write, Some(WriteStatus::TargetLost { first: false }));
    assert!(!mixer.teardown());
}

#[test]
fn color_space_switch_rebuilds_caches() {
    let field = Rc::new(RefCell::new(Rgba::TRANSPARENT));
    let clip = ClipInstance::new(
        ClipId(0),
        "tint",
        ClipSchedule::new(0.0, 1.0),
        Rgba::new(0.0, 0.0, 0.0, 1.0),
        Rgba::WHITE,
    );
    let track = Track::new(TrackId(0), "tint", "sprite.color").with_clips(vec![clip]);
    let binding = TargetBinding::new(DirectFieldBinding::new("sprite.color", &field));
    let mut mixer = TrackMixer::new(track, binding, Config::default());

    let srgb = mixer.process_at(0.5).unwrap().value;
    mixer.set_color_space(ColorBlendSpace::Linear);
    let frame = mixer.process_at(0.5).unwrap();
    assert!(frame.layout_refreshed);
    assert!(frame.value.0[0] > srgb.0[0]);
    assert_eq!(frame.value.0[3], 1.0);
}

#[test]
fn director_binds_timeline_through_resolver() -> anyhow::Result<()> {
    let json = serde_json::json!({
        "name": "intro",
        "tracks": [
            {
                "kind": "float",
                "target": "panel.alpha",
                "clips": [
                    { "start": 0.0, "duration": 1.0, "from": 0.0, "to": 1.0, "extrapolation": "hold" }
                ]
            },
            {
                "kind": "vec2",
                "target": "panel.offset",
                "clips": [
                    { "start": 0.0, "duration": 2.0, "from": [0, 0], "to": [4, 8],
                      "axes": [true, false] }
                ]
            },
            {
                "kind": "float",
                "target": "shader:_Glow",
                "clips": [
                    { "start": 0.5, "duration": 1.0, "from": 0.0, "to": 2.0,
                      "curve": { "constant": 0.5 } }
                ]
            },
            {
                "kind": "float",
                "target": "missing.alpha",
                "clips": []
            }
        ]
    });
    let data = parse_timeline_json(&json.to_string())?;

    let panel = SceneNode::new(
        "panel",
        &[("alpha", Value::Float(1.0)), ("offset", Value::Vec2([3.0, 3.0]))],
    );
    let shaders = Rc::new(RefCell::new(ShaderGlobals::new()));
    let mut resolver = SceneResolver {
        nodes: [("panel".to_string(), panel.clone())].into_iter().collect(),
        shaders: shaders.clone(),
    };

    let mut director = Director::from_timeline(data, &mut resolver, Config::default());
    assert_eq!(director.mixer_count(), 3);
    assert_eq!(director.unbound_targets(), &["missing.alpha".to_string()]);

    let out = director.evaluate(1.0);
    assert_eq!(out.change_for("panel.alpha"), Some(&Value::Float(1.0)));
    assert_eq!(out.change_for("panel.offset"), Some(&Value::Vec2([2.0, 3.0])));
    assert_eq!(out.change_for("shader:_Glow"), Some(&Value::Float(1.0)));
    let refreshed = out
        .events
        .iter()
        .filter(|e| matches!(e, CoreEvent::LayoutRefreshed { .. }))
        .count();
    assert_eq!(refreshed, 3);

    assert_eq!(panel.borrow().get("offset"), Some(&Value::Vec2([2.0, 3.0])));
    assert_eq!(shaders.borrow().get_by_name("_Glow"), Some(&Value::Float(1.0)));

    // Killing the node is reported once, and nothing else breaks.
    panel.borrow_mut().alive = false;
    let out = director.evaluate(1.2);
    let lost = out
        .events
        .iter()
        .filter(|e| matches!(e, CoreEvent::TargetLost { .. }))
        .count();
    assert_eq!(lost, 2);
    assert!(out.change_for("shader:_Glow").is_some());
    let out = director.evaluate(1.3);
    assert!(!out.events.iter().any(|e| matches!(e, CoreEvent::TargetLost { .. })));

    // Shader globals never had a readable default, so there is nothing to restore.
    assert_eq!(director.teardown(), 0);
    Ok(())
}

#[test]
fn teardown_restores_component_property() {
    let node = SceneNode::new("hud", &[("alpha", Value::Float(0.6))]);
    let sink = ComponentPropertyBinding::bind(&node, "alpha").unwrap();
    let clip = ClipInstance::new(ClipId(0), "pulse", ClipSchedule::new(0.0, 1.0), 0.0, 1.0);
    let track = Track::new(TrackId(0), "hud", "hud.alpha").with_clips(vec![clip]);
    let mut director = Director::new(Config::default());
    director.add_track(track, TargetBinding::from_value_sink(Box::new(sink)));

    director.evaluate(0.25);
    assert_eq!(node.borrow().get("alpha"), Some(&Value::Float(0.25)));
    assert_eq!(director.teardown(), 1);
    assert_eq!(node.borrow().get("alpha"), Some(&Value::Float(0.6)));
}

#[test]
fn unset_shader_global_keeps_the_neutral_default() {
    let shaders = Rc::new(RefCell::new(ShaderGlobals::new()));
    let sink = ShaderParameterBinding::bind(&shaders, "_Glow");
    let clip = ClipInstance::new(ClipId(0), "glow", ClipSchedule::new(1.0, 2.0), 0.0, 1.0)
        .with_extrapolation(Extrapolation::Default);
    let track = Track::new(TrackId(0), "glow", "shader:_Glow").with_clips(vec![clip]);
    let binding = TargetBinding::<f32>::from_value_sink(Box::new(sink));
    let mut mixer = TrackMixer::new(track, binding, Config::default());

    assert_eq!(mixer.process_at(2.0).unwrap().value, 0.5);
    // The global is readable now, but it only holds our own write.
    let frame = mixer.process_at(4.0).unwrap();
    assert_eq!(frame.state, BlendState::DefaultExtrapolation { clip: ClipId(0) });
    assert_eq!(frame.value, 0.0);
    assert_eq!(mixer.binding().default_value(), None);
    assert!(!mixer.teardown());
}

#[test]
fn rejected_clip_leaves_neighbour_at_full_weight() {
    let field = Rc::new(RefCell::new(0.0f32));
    let steady = ClipInstance::new(ClipId(0), "steady", ClipSchedule::new(0.0, 2.0), 10.0, 10.0);
    let broken = ClipInstance::new(ClipId(1), "broken", ClipSchedule::new(1.0, 2.0), 0.0, 0.0)
        .with_curve(None);
    let track = Track::new(TrackId(0), "x", "x").with_clips(vec![steady, broken]);
    let binding = TargetBinding::new(DirectFieldBinding::new("x", &field));
    let mut mixer = TrackMixer::new(track, binding, Config::default());

    let frame = mixer.process_at(1.5).unwrap();
    assert_eq!(mixer.track().rejected().len(), 1);
    assert_eq!(frame.state, BlendState::OnClips { active: 1 });
    assert_eq!(frame.value, 10.0);
    assert_eq!(*field.borrow(), 10.0);
}

#[test]
fn track_bound_to_target_of_another_kind_is_skipped() -> anyhow::Result<()> {
    let json = serde_json::json!({
        "tracks": [
            {
                "kind": "float",
                "target": "panel.offset",
                "clips": [ { "start": 0.0, "duration": 1.0, "from": 0.0, "to": 1.0 } ]
            },
            {
                "kind": "float",
                "target": "panel.alpha",
                "clips": [ { "start": 0.0, "duration": 1.0, "from": 0.0, "to": 1.0 } ]
            }
        ]
    });
    let data = parse_timeline_json(&json.to_string())?;
    let panel = SceneNode::new(
        "panel",
        &[("alpha", Value::Float(1.0)), ("offset", Value::Vec2([3.0, 3.0]))],
    );
    let mut resolver = SceneResolver {
        nodes: [("panel".to_string(), panel.clone())].into_iter().collect(),
        shaders: Rc::new(RefCell::new(ShaderGlobals::new())),
    };

    let mut director = Director::from_timeline(data, &mut resolver, Config::default());
    assert_eq!(director.mixer_count(), 1);
    let errors = director.binding_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "panel.offset");
    assert_eq!(
        errors[0].1,
        MotionError::KindMismatch {
            expected: ValueKind::Float,
            found: ValueKind::Vec2
        }
    );

    director.evaluate(0.5);
    assert_eq!(panel.borrow().get("offset"), Some(&Value::Vec2([3.0, 3.0])));
    assert_eq!(panel.borrow().get("alpha"), Some(&Value::Float(0.5)));
    Ok(())
}
