// Unit tests for domain models

use std::path::PathBuf;

use crate::domain::errors::*;
use crate::domain::model::*;

#[test]
fn test_clip_range_parse_fields() {
    let range = ClipRange::parse("00:10", "1:02:03.500").unwrap();
    assert_eq!(range.start_seconds, 10.0);
    assert_eq!(range.end_seconds, Some(3723.5));
}

#[test]
fn test_clip_range_empty_fields() {
    let range = ClipRange::parse("", "  ").unwrap();
    assert_eq!(range, ClipRange::full());
    assert_eq!(range.duration_seconds(), None);
}

#[test]
fn test_clip_range_rejects_end_before_start() {
    assert!(matches!(
        ClipRange::new(20.0, Some(10.0)),
        Err(DomainError::InvalidRange(_))
    ));
    assert!(matches!(
        ClipRange::parse("00:30", "00:10"),
        Err(DomainError::InvalidRange(_))
    ));
}

#[test]
fn test_clip_range_rejects_negative_start() {
    assert!(ClipRange::new(-1.0, None).is_err());
    assert!(ClipRange::parse("-5", "").is_err());
}

#[test]
fn test_clip_range_propagates_time_format_errors() {
    assert!(matches!(
        ClipRange::parse("1:2:3:4", ""),
        Err(DomainError::InvalidTimeFormat(_))
    ));
}

#[test]
fn test_clip_range_duration_floor() {
    let range = ClipRange::new(5.0, Some(5.0)).unwrap();
    assert_eq!(range.duration_seconds(), Some(MIN_CLIP_SECONDS));

    let range = ClipRange::new(5.0, Some(65.0)).unwrap();
    assert_eq!(range.duration_seconds(), Some(60.0));
}

#[test]
fn test_clip_range_resolve_end() {
    let open = ClipRange::new(15.0, None).unwrap();
    let closed = open.resolve_end(Some(120.0)).unwrap();
    assert_eq!(closed.end_seconds, Some(120.0));

    // Explicit end wins over the probe
    let explicit = ClipRange::new(0.0, Some(30.0)).unwrap();
    assert_eq!(explicit.resolve_end(Some(120.0)).unwrap().end_seconds, Some(30.0));

    assert!(open.resolve_end(None).is_err());
    // Start past the probed end
    assert!(ClipRange::new(200.0, None).unwrap().resolve_end(Some(120.0)).is_err());
}

#[test]
fn test_clip_range_display() {
    let range = ClipRange::new(90.5, Some(3723.5)).unwrap();
    assert_eq!(range.to_string(), "01:30.500 - 01:02:03.500");
    assert_eq!(ClipRange::full().to_string(), "00:00.000 - end");
}

#[test]
fn test_media_properties_merge() {
    let probed = MediaProperties {
        duration_seconds: Some(42.0),
        width: None,
        height: Some(720),
        frame_rate: None,
    };
    let overrides = MediaProperties {
        width: Some(1280),
        height: Some(1080),
        ..MediaProperties::default()
    };
    let merged = probed.or(overrides);
    assert_eq!(merged.duration_seconds, Some(42.0));
    assert_eq!(merged.width, Some(1280));
    assert_eq!(merged.height, Some(720));
    assert_eq!(merged.frame_rate, None);
    assert!(MediaProperties::default().is_empty());
    assert!(!merged.is_empty());
}

#[test]
fn test_bitrate_plan_estimate() {
    let plan = BitratePlan {
        video_kbps: 1233,
        audio_kbps: 137,
    };
    assert_eq!(plan.total_kbps(), 1370);
    assert_eq!(plan.estimated_bytes(60.0), 10_275_000);

    let extreme = BitratePlan {
        video_kbps: u32::MAX,
        audio_kbps: 160,
    };
    assert_eq!(extreme.total_kbps(), u32::MAX as u64 + 160);
}

#[test]
fn test_scale_plan_filter() {
    let plan = ScalePlan {
        target_width: 544,
        target_height: 306,
    };
    assert_eq!(plan.filter(), "scale=544:306:flags=lanczos");
}

#[test]
fn test_encode_plan_stats_artifacts() {
    let plan = EncodePlan {
        pass1_args: vec![],
        pass2_args: vec![],
        log_path: PathBuf::from("/out/clip.log"),
        destination: PathBuf::from("/out/clip.mp4"),
    };
    let artifacts = plan.stats_artifacts();
    assert!(artifacts.contains(&PathBuf::from("/out/clip.log")));
    assert!(artifacts.contains(&PathBuf::from("/out/clip.log.mbtree")));
    assert!(artifacts.contains(&PathBuf::from("/out/clip.log-0.log")));
    assert!(artifacts.contains(&PathBuf::from("/out/clip.log-0.log.mbtree")));
    assert!(!artifacts.contains(&plan.destination));
}

#[test]
fn test_planner_settings_defaults_are_valid() {
    let settings = PlannerSettings::default();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.min_audio_kbps, 48);
    assert_eq!(settings.max_audio_kbps, 160);
    assert_eq!(settings.size_tolerance, 0.08);
}

#[test]
fn test_planner_settings_validation() {
    let inverted = PlannerSettings {
        min_audio_kbps: 192,
        ..PlannerSettings::default()
    };
    assert!(matches!(inverted.validate(), Err(DomainError::Config(_))));

    let odd = PlannerSettings {
        min_scaled_dimension: 161,
        ..PlannerSettings::default()
    };
    assert!(odd.validate().is_err());

    let overhead = PlannerSettings {
        overhead_ratio: 1.5,
        ..PlannerSettings::default()
    };
    assert!(overhead.validate().is_err());
}

fn outcome(succeeded: bool, failed_pass: Option<u8>, message: &str) -> ExportOutcome {
    ExportOutcome {
        succeeded,
        phase: if succeeded {
            ExportPhase::Succeeded
        } else {
            ExportPhase::Failed
        },
        output_path: PathBuf::from("out.mp4"),
        output_size_bytes: 0,
        target_bytes: 1024,
        deviation_ratio: 1.0,
        message: message.to_string(),
        warning: None,
        failed_pass,
        aborted: false,
        elapsed_seconds: 0.0,
        completed_at: chrono::Local::now(),
    }
}

#[test]
fn test_export_outcome_into_result() {
    assert!(outcome(true, None, "done").into_result().is_ok());

    match outcome(false, Some(2), "boom").into_result() {
        Err(DomainError::EncodeFailure { pass, detail }) => {
            assert_eq!(pass, 2);
            assert_eq!(detail, "boom");
        }
        other => panic!("unexpected {:?}", other),
    }

    let aborted = ExportOutcome {
        aborted: true,
        ..outcome(false, None, ABORTED_MESSAGE)
    };
    assert_eq!(aborted.into_result(), Err(DomainError::Aborted));

    // The abort flag decides, not the message text
    assert!(matches!(
        outcome(false, None, ABORTED_MESSAGE).into_result(),
        Err(DomainError::ProcessFail(_))
    ));
    let relabelled = ExportOutcome {
        aborted: true,
        ..outcome(false, None, "stopped by user")
    };
    assert_eq!(relabelled.into_result(), Err(DomainError::Aborted));
}

#[test]
fn test_export_phase_display() {
    assert_eq!(ExportPhase::Pass1Running.to_string(), "pass 1");
    assert_eq!(ExportPhase::Succeeded.to_string(), "succeeded");
}
