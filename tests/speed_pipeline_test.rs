use std::collections::VecDeque;
use std::path::PathBuf;

use approx::assert_relative_eq;
use image::RgbImage;
use speedcam_rs::{
    DetectionBuilder, DetectionSource, SpeedConfig, SpeedEstimator, SpeedPipeline,
    TrackedDetection, ViolationWriter,
};

/// Replays pre-recorded tracker output, one batch per frame.
struct ScriptedTracker {
    frames: VecDeque<Vec<TrackedDetection>>,
}

impl DetectionSource for ScriptedTracker {
    type Error = String;

    fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<TrackedDetection>, Self::Error> {
        self.frames
            .pop_front()
            .ok_or_else(|| "frame source exhausted".to_string())
    }
}

fn vehicle(track_id: u64, bottom: f32) -> TrackedDetection {
    DetectionBuilder::new()
        .tlbr(40.0, bottom - 8.0, 60.0, bottom)
        .score(0.9)
        .track_id(track_id)
        .build()
}

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("speedcam-it-{}-{}", name, std::process::id()))
}

#[test]
fn test_one_second_window_speed() {
    // 10 px square mapped onto a 3 x 100 road: 10 units per pixel row.
    let config = SpeedConfig {
        source: vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]],
        target: Some(vec![[0.0, 0.0], [3.0, 0.0], [3.0, 100.0], [0.0, 100.0]]),
        fps: 10,
        truncate_coordinates: false,
        speed_limit_kmh: 1000.0,
        ..SpeedConfig::default()
    };
    let frames = (0..10)
        .map(|i| {
            vec![
                DetectionBuilder::new()
                    .tlbr(4.0, 0.0, 6.0, i as f32)
                    .score(0.9)
                    .track_id(7)
                    .build(),
            ]
        })
        .collect();
    let mut pipeline = SpeedPipeline::new(
        ScriptedTracker { frames },
        ViolationWriter::new(scratch_dir("unused")),
        config,
    )
    .unwrap();

    let frame = RgbImage::new(10, 10);
    for i in 0..10 {
        let report = pipeline.process_frame(&frame).unwrap();
        assert_eq!(report.labels.len(), 1);
        // Five samples (half a second) are needed before a label appears.
        assert_eq!(report.labels[0].is_empty(), i < 4, "frame {i}");
        assert!(report.captures.is_empty());
    }

    let window = pipeline.session().history().get(7);
    assert_eq!(window.len(), 10);
    for (i, y) in window.iter().enumerate() {
        assert_relative_eq!(*y, i as f64 * 10.0, epsilon = 1e-6);
    }

    let speed = SpeedEstimator::new(10).estimate(&window).unwrap();
    assert_relative_eq!(speed.kmh(), 324.0, epsilon = 1e-4);

    // The source is exhausted now.
    assert!(pipeline.process_frame(&frame).is_err());
}

#[test]
fn test_single_capture_per_speeding_track() {
    let dir = scratch_dir("violations");
    let _ = std::fs::remove_dir_all(&dir);

    let config = SpeedConfig {
        source: vec![[0.0, 0.0], [100.0, 0.0], [100.0, 100.0], [0.0, 100.0]],
        target: Some(vec![[0.0, 0.0], [3.0, 0.0], [3.0, 100.0], [0.0, 100.0]]),
        fps: 10,
        speed_limit_kmh: 95.0,
        violations_dir: dir.clone(),
        ..SpeedConfig::default()
    };

    // Track 7 covers 5 units per frame (about 144-162 km/h once measurable),
    // track 8 covers 1 unit per frame (under 36 km/h).
    let frames = (0..15)
        .map(|i| {
            let i = i as f32;
            vec![vehicle(7, 10.5 + 5.0 * i), vehicle(8, 20.5 + i)]
        })
        .collect();
    let mut pipeline =
        SpeedPipeline::with_writer(ScriptedTracker { frames }, config).unwrap();

    let frame = RgbImage::new(100, 100);
    let mut capture_frames = Vec::new();
    for _ in 0..15 {
        let report = pipeline.process_frame(&frame).unwrap();
        for request in &report.captures {
            assert_eq!(request.track_id, 7);
            assert!(request.speed.kmh() > 95.0);
            capture_frames.push(request.frame_number);
        }
    }

    // First measurable frame is the fifth; the ten after it stay silent.
    assert_eq!(capture_frames, vec![4]);

    let files: Vec<String> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, vec!["vehicle_7_frame_4.jpg".to_string()]);

    let summary = pipeline.finish();
    assert_eq!(summary.frames_processed, 15);
    assert_eq!(summary.tracks_observed, 2);
    assert_eq!(summary.violations, 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_reset_rearms_violations() {
    let config = SpeedConfig {
        source: vec![[0.0, 0.0], [100.0, 0.0], [100.0, 100.0], [0.0, 100.0]],
        target: Some(vec![[0.0, 0.0], [3.0, 0.0], [3.0, 100.0], [0.0, 100.0]]),
        fps: 2,
        violations_dir: scratch_dir("reset"),
        ..SpeedConfig::default()
    };
    let mut pipeline = SpeedPipeline::with_writer(
        ScriptedTracker {
            frames: VecDeque::new(),
        },
        config,
    )
    .unwrap();
    let frame = RgbImage::new(100, 100);

    pipeline.update(&frame, vec![vehicle(1, 10.5)]);
    let report = pipeline.update(&frame, vec![vehicle(1, 60.5)]);
    assert_eq!(report.captures.len(), 1);

    pipeline.reset();
    assert_eq!(pipeline.session().frames_processed(), 0);

    pipeline.update(&frame, vec![vehicle(1, 10.5)]);
    let report = pipeline.update(&frame, vec![vehicle(1, 60.5)]);
    assert_eq!(report.captures.len(), 1);
    assert_eq!(report.captures[0].frame_number, 1);

    std::fs::remove_dir_all(scratch_dir("reset")).unwrap();
}
