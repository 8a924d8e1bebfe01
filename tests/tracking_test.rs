use trackeval_rs::integration::{InMemoryFrames, to_json_string};
use trackeval_rs::{
    AssignmentStrategy, ContinuityEngine, EngineConfig, Error, EvaluationPipeline,
    EvaluationResult, Frame, ObservationBuilder, Recording, Report, TrackEvent, TrackState,
    evaluate_recording, load_recording, write_report,
};

fn config(localisation_max_diff: f64, max_occluded_frames: u32) -> EngineConfig {
    EngineConfig {
        localisation_max_diff,
        max_occluded_frames,
        ..Default::default()
    }
}

fn point(x: f64, y: f64) -> trackeval_rs::Observation {
    ObservationBuilder::new().xy(x, y).build()
}

fn evaluate(frames: Vec<Frame>, config: EngineConfig) -> EvaluationResult {
    EvaluationPipeline::new(InMemoryFrames::new(frames), config)
        .unwrap()
        .run()
        .unwrap()
}

/// One object at the origin, observed at `present` frames out of `0..len`.
fn intermittent(present: &[u64], len: u64) -> Vec<Frame> {
    (0..len)
        .map(|i| {
            let observations = if present.contains(&i) {
                vec![point(0.0, 0.0)]
            } else {
                vec![]
            };
            Frame::new(i, observations)
        })
        .collect()
}

#[test]
fn test_single_drifting_track() {
    // Frame 0..5, drifting 0.1m per frame
    let frames = (0..5)
        .map(|i| Frame::new(i, vec![point(i as f64 * 0.1, 0.0)]))
        .collect();
    let result = evaluate(frames, config(0.5, 0));

    assert_eq!(result.summary.total_tracks, 1);
    assert_eq!(result.summary.total_matches, 5);
    assert_eq!(result.summary.lost_tracks, 0);
    assert_eq!(result.tracks[0].frames_active, 5);
    assert_eq!(result.tracks[0].final_state, TrackState::Active);
}

#[test]
fn test_occlusion_within_budget_recovers() {
    let frames = intermittent(&[0, 1, 4], 5);
    let result = evaluate(frames, config(0.5, 2));

    assert_eq!(result.summary.recovered_after_occlusion, 1);
    assert_eq!(result.summary.total_tracks, 1);
    assert_eq!(result.summary.lost_tracks, 0);

    let track = &result.tracks[0];
    assert_eq!(track.first_frame, 0);
    assert_eq!(track.last_frame, 4);
    assert_eq!(track.frames_occluded, 2);
}

#[test]
fn test_occlusion_beyond_budget_loses_track() {
    let mut engine = ContinuityEngine::new(config(0.5, 1)).unwrap();
    for frame in intermittent(&[0, 1, 4], 5) {
        let outcome = engine.update_frame(&frame).unwrap();
        let lost = outcome.count(|e| matches!(e, TrackEvent::Lost { .. }));
        assert_eq!(lost, usize::from(frame.index == 3), "frame {}", frame.index);
    }
    let result = engine.finalize();

    assert_eq!(result.summary.lost_tracks, 1);
    assert_eq!(result.summary.total_tracks, 2);
    assert_eq!(result.summary.recovered_after_occlusion, 0);
    assert_eq!(result.summary.fragmentations, 1);
    assert_eq!(result.track(1).unwrap().final_state, TrackState::Lost);
    assert_eq!(result.track(2).unwrap().first_frame, 4);
}

#[test]
fn test_competing_observations_spawn_new_track() {
    let frames = vec![
        Frame::new(0, vec![point(0.0, 0.0)]),
        Frame::new(1, vec![point(0.3, 0.0), point(0.1, 0.0)]),
    ];
    let mut engine = ContinuityEngine::new(config(0.5, 0)).unwrap();
    engine.update_frame(&frames[0]).unwrap();
    let outcome = engine.update_frame(&frames[1]).unwrap();

    assert_eq!(outcome.count(|e| matches!(e, TrackEvent::Matched { .. })), 1);
    assert!(outcome.events.iter().any(|e| matches!(
        e,
        TrackEvent::Matched { track_id: 1, frame: 1, distance } if (distance - 0.1).abs() < 1e-9
    )));
    assert_eq!(outcome.count(|e| matches!(e, TrackEvent::Created { .. })), 1);

    let positions: Vec<f64> = engine.active_tracks().iter().map(|t| t.position.x()).collect();
    assert_eq!(positions, vec![0.1, 0.3]);
}

#[test]
fn test_lost_track_takes_no_further_matches() {
    let frames = intermittent(&[0, 3, 4, 5], 6);
    let mut engine = ContinuityEngine::new(config(0.5, 1)).unwrap();
    let mut lost_at = None;
    for frame in &frames {
        let outcome = engine.update_frame(frame).unwrap();
        for event in &outcome.events {
            match event {
                TrackEvent::Lost { track_id: 1, frame, .. } => lost_at = Some(*frame),
                TrackEvent::Matched { track_id: 1, frame, .. } => {
                    assert!(lost_at.is_none(), "track 1 matched at {frame} after loss");
                }
                _ => {}
            }
        }
    }
    assert_eq!(lost_at, Some(2));
}

#[test]
fn test_larger_occlusion_budget_is_monotonic() {
    let mut frames = intermittent(&[0, 1, 3, 6, 10], 11);
    for frame in &mut frames {
        frame.observations.push(point(50.0, 0.0));
    }

    let runs: Vec<EvaluationResult> = (0..5)
        .map(|max| evaluate(frames.clone(), config(0.5, max)))
        .collect();

    let lost: Vec<u64> = runs.iter().map(|r| r.summary.lost_tracks).collect();
    let recovered: Vec<u64> = runs.iter().map(|r| r.summary.recovered_after_occlusion).collect();
    assert_eq!(lost, vec![3, 2, 1, 0, 0]);
    assert_eq!(recovered, vec![0, 1, 2, 3, 3]);

    for pair in runs.windows(2) {
        assert!(pair[1].summary.total_matches >= pair[0].summary.total_matches);
        assert!(pair[1].summary.lost_tracks <= pair[0].summary.lost_tracks);
    }
}

#[test]
fn test_greedy_budget_increase_can_cost_a_track() {
    // An occluded track kept alive by the larger budget steals a neighbour's
    // observation, and the neighbour is lost instead.
    let xs: [&[f64]; 8] = [
        &[0.0, 0.0],
        &[0.75, 0.9],
        &[0.15],
        &[0.0, 0.3],
        &[],
        &[0.15, 0.6],
        &[0.15, 0.45],
        &[0.75, 0.75],
    ];
    let frames: Vec<Frame> = xs
        .iter()
        .zip(0..)
        .map(|(xs, i)| Frame::new(i, xs.iter().map(|&x| point(x, 0.0)).collect()))
        .collect();

    let lost = |max_occluded_frames, assignment| {
        let config = EngineConfig {
            assignment,
            ..config(0.5, max_occluded_frames)
        };
        evaluate(frames.clone(), config).summary.lost_tracks
    };

    assert_eq!(lost(1, AssignmentStrategy::Greedy), 2);
    assert_eq!(lost(2, AssignmentStrategy::Greedy), 3);
    assert_eq!(lost(2, AssignmentStrategy::Optimal), 2);
}

#[test]
fn test_identity_switch_on_source_id_change() {
    let frames = (0..4)
        .map(|i| {
            let source_id = if i < 2 { 7_i64 } else { 9_i64 };
            let obs = ObservationBuilder::new()
                .xy(10.0, 10.0)
                .source_id(source_id)
                .build();
            Frame::new(i, vec![obs])
        })
        .collect();
    let result = evaluate(frames, config(0.5, 1));

    assert_eq!(result.summary.identity_switches, 1);
    assert_eq!(result.summary.total_tracks, 1);
}

#[test]
fn test_object_class_consistency() {
    let json = r#"{
        "frames": [
            {"frame": 0, "objects": [
                {"position": [0.0, 0.0], "id": 1, "type": "CAR"},
                {"position": [30.0, 0.0], "id": 2, "type": "PEDESTRIAN"}
            ]},
            {"frame": 1, "objects": [
                {"position": [0.1, 0.0], "id": 1, "type": "TRUCK"},
                {"position": [30.0, 0.1], "id": 2, "type": "UNKNOWN"}
            ]}
        ]
    }"#;
    let recording = Recording::from_json(json).unwrap();
    let report = evaluate_recording(&recording, EngineConfig::default()).unwrap();

    assert_eq!(report.class_switches.raw.len(), 1);
    assert_eq!(report.class_switches.raw[0].track_id, 1);
    assert_eq!(report.class_switches.summary.len(), 1);
    assert_eq!(report.class_switches.summary["car_2_truck"], 1);
}

#[test]
fn test_identical_input_gives_identical_report() {
    let json = r#"{
        "frames": [
            {"frame": 0, "objects": [{"position": [0.0, 0.0]}, {"position": [0.4, 0.0]}]},
            {"frame": 1, "objects": [{"position": [0.2, 0.0]}, {"position": [0.2, 0.0]}]},
            {"frame": 4, "objects": [{"position": [0.2, 0.1]}]}
        ]
    }"#;
    let recording = Recording::from_json(json).unwrap();
    let first = to_json_string(&evaluate_recording(&recording, EngineConfig::default()).unwrap());
    let second = to_json_string(&evaluate_recording(&recording, EngineConfig::default()).unwrap());
    assert_eq!(first.unwrap(), second.unwrap());
}

#[test]
fn test_end_to_end_file_round() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("drive.json");
    let output = dir.path().join("results.json");
    std::fs::write(
        &input,
        r#"{
            "fps": 10.0,
            "ego": {"x": [0.0, 1.0], "y": [0.0, 0.0], "speed": [10.0, 10.0], "yaw": [0.0, 0.0]},
            "frames": [
                {"frame": 0, "objects": [{"position": [5.0, 1.0], "id": 3, "type": "CAR"}]},
                {"frame": 1, "objects": [{"position": [5.2, 1.0], "id": 3, "type": "CAR"}]}
            ]
        }"#,
    )
    .unwrap();

    let recording = load_recording(&input).unwrap();
    let report = evaluate_recording(&recording, EngineConfig::default()).unwrap();
    write_report(&report, &output).unwrap();

    let written: Report = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written.summary.total_matches, 2);
    assert_eq!(written.tracks.len(), 1);
    assert_eq!(written.tracks[0].object_type.as_deref(), Some("CAR"));
    assert!(written.localisation.is_empty());
}

#[test]
fn test_invalid_input_is_rejected_before_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("drive.json");
    std::fs::write(
        &input,
        r#"{"frames": [{"frame": 1, "objects": []}, {"frame": 1, "objects": []}]}"#,
    )
    .unwrap();

    let err = load_recording(&input).unwrap_err();
    assert!(matches!(err, Error::NonMonotonicFrame { previous: 1, current: 1 }));
    assert!(load_recording(&dir.path().join("missing.json")).is_err());
}
