use motion_core::{
    bake_timeline, export_baked_json, parse_timeline_json, AnyTrack, AxisMask, BakingConfig,
    CacheToken, Curve, CurveUsageMode, Extrapolation, MotionError, Quat, Rgba, Value, ValueKind,
};

fn fixture() -> serde_json::Value {
    serde_json::json!({
        "name": "menu-intro",
        "tracks": [
            {
                "name": "logo move",
                "kind": "vec3",
                "target": "logo/Transform.position",
                "clips": [
                    {
                        "name": "rise",
                        "start": 2.0, "duration": 1.0,
                        "from": [0, -5, 0], "to": [0, 0, 0],
                        "curve": "easeInOut",
                        "axes": [false, true, false]
                    },
                    {
                        "name": "settle",
                        "start": 0.0, "duration": 1.5, "easeOut": 0.25,
                        "from": [0, 0, 0], "to": [1, 1, 1],
                        "curve": { "bezier": [0.25, 0.1, 0.25, 1.0] },
                        "extrapolation": "default"
                    }
                ]
            },
            {
                "kind": "color",
                "target": "logo/Image.color",
                "clips": [
                    { "start": 0.0, "duration": 1.0, "from": [1, 1, 1, 0], "to": [1, 0.5, 0] }
                ]
            },
            {
                "kind": "quat",
                "target": "logo/Transform.rotation",
                "clips": [
                    { "start": 0.0, "duration": 1.0, "from": [0, 0, 0, 1], "to": [0, 0, 0.7071068, 0.7071068] }
                ]
            },
            {
                "kind": "float",
                "target": "logo/CanvasGroup.alpha",
                "clips": [
                    {
                        "start": 0.0, "duration": 1.0,
                        "curve": { "keys": [
                            { "time": 0.0, "value": 0.0 },
                            { "time": 0.5, "value": 1.0, "inTangent": 0.0, "outTangent": 0.0 },
                            { "time": 1.0, "value": 0.0 }
                        ] },
                        "curveUsage": { "mode": "directWithScale", "scale": 0.5 },
                        "from": 0, "to": 0
                    }
                ]
            },
            {
                "kind": "vec2",
                "target": "logo/Transform.scale",
                "clips": [
                    { "start": 0.0, "duration": 1.0, "from": [1, 1], "to": [2, 2],
                      "axisCurves": ["linear", null] }
                ]
            }
        ]
    })
}

#[test]
fn loads_every_track_kind_and_clip_option() -> anyhow::Result<()> {
    let data = parse_timeline_json(&fixture().to_string())?;
    assert_eq!(data.name, "menu-intro");
    let kinds: Vec<ValueKind> = data.tracks.iter().map(AnyTrack::kind).collect();
    assert_eq!(
        kinds,
        vec![
            ValueKind::Vec3,
            ValueKind::ColorRgba,
            ValueKind::Quat,
            ValueKind::Float,
            ValueKind::Vec2
        ]
    );
    assert_eq!(data.tracks[0].name(), "logo move");
    assert_eq!(data.tracks[1].name(), "logo/Image.color");

    let AnyTrack::Vec3(track) = &data.tracks[0] else {
        panic!("expected vec3 track");
    };
    // File order is kept until the layout is recalculated.
    let rise = &track.clips()[0];
    assert_eq!(rise.name, "rise");
    assert_eq!(rise.axes, AxisMask::from_flags(&[false, true, false]));
    assert_eq!(rise.curve, Some(Curve::ease_in_out()));
    let settle = &track.clips()[1];
    assert_eq!(settle.schedule.ease_out, 0.25);
    assert_eq!(settle.extrapolation, Extrapolation::Default);
    assert_eq!(settle.curve, Some(Curve::Bezier([0.25, 0.1, 0.25, 1.0])));

    let AnyTrack::Color(track) = &data.tracks[1] else {
        panic!("expected color track");
    };
    assert_eq!(track.clips()[0].end_value, Rgba::new(1.0, 0.5, 0.0, 1.0));

    let AnyTrack::Quat(track) = &data.tracks[2] else {
        panic!("expected quat track");
    };
    assert_eq!(track.clips()[0].start_value, Quat::IDENTITY);

    let AnyTrack::Float(track) = &data.tracks[3] else {
        panic!("expected float track");
    };
    assert_eq!(
        track.clips()[0].curve_usage,
        CurveUsageMode::DirectWithScale { scale: 0.5 }
    );

    let AnyTrack::Vec2(track) = &data.tracks[4] else {
        panic!("expected vec2 track");
    };
    assert_eq!(track.clips()[0].curve, None);
    assert_eq!(track.clips()[0].axis_curves, vec![Some(Curve::Linear), None]);
    Ok(())
}

#[test]
fn missing_axis_curve_is_rejected_at_layout_not_load() -> anyhow::Result<()> {
    let mut data = parse_timeline_json(&fixture().to_string())?;
    let AnyTrack::Vec2(track) = &mut data.tracks[4] else {
        panic!("expected vec2 track");
    };
    let rejected = track.recalculate_all_clips_start_and_end();
    assert_eq!(rejected.len(), 1);
    assert!(matches!(rejected[0].1, MotionError::MissingCurve { axis: 1, .. }));
    assert!(track.refresh(CacheToken::default()));
    assert!(!track.is_playable(track.clips()[0].id));
    Ok(())
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(parse_timeline_json("{ nope"), Err(MotionError::Parse(_))));
    let wrong_kind = r#"{ "tracks": [ { "kind": "matrix", "target": "x" } ] }"#;
    assert!(matches!(parse_timeline_json(wrong_kind), Err(MotionError::Parse(_))));
}

#[test]
fn baked_timeline_exports_stable_json() -> anyhow::Result<()> {
    let mut data = parse_timeline_json(&fixture().to_string())?;
    let cfg = BakingConfig {
        frame_rate: 2.0,
        start_time: Some(0.0),
        end_time: Some(1.0),
        ..Default::default()
    };
    let baked = bake_timeline(&mut data, &cfg)?;
    assert_eq!(baked.tracks.len(), 5);
    for track in &baked.tracks {
        assert_eq!(track.values.len(), 3);
    }

    // Direct-with-scale alpha: keyed curve peaks at 1.0 mid-clip.
    let alpha = &baked.tracks[3];
    assert_eq!(alpha.target_path, "logo/CanvasGroup.alpha");
    assert_eq!(alpha.values[1], Value::Float(0.5));

    // Scale track has a rejected clip, so every frame is the neutral value.
    assert!(baked.tracks[4].values.iter().all(|v| *v == Value::Vec2([0.0, 0.0])));

    let json = export_baked_json(&baked);
    assert_eq!(json["name"], "menu-intro");
    assert_eq!(json["tracks"][3]["kind"], "float");
    assert_eq!(json["tracks"][3]["frameRate"], 2.0);
    assert_eq!(json["tracks"][3]["values"][1]["type"], "float");
    Ok(())
}
