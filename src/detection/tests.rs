use super::*;
use crate::config::DetectorConfig;
use crate::events::EventBus;
use crate::test_support::blank_frame_uri;
use crate::timer::DetectionState;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn create_detector(classifier: Arc<dyn RegionClassifier>) -> (EyeDetector, Arc<DetectionState>) {
    let state = Arc::new(DetectionState::new(
        Duration::from_secs(300),
        Duration::from_secs(2),
    ));
    let event_bus = Arc::new(EventBus::new(10));
    (
        EyeDetector::new(classifier, Arc::clone(&state), event_bus),
        state,
    )
}

#[test]
fn test_blank_frame_has_no_eyes() {
    let (detector, state) = create_detector(Arc::new(MockClassifier::new()));
    let before = state.snapshot().last_detection;

    let outcome = detector.detect(&blank_frame_uri(64, 48));
    assert!(!outcome.eyes_found);
    assert_eq!(outcome.message, "No eyes detected");
    assert_eq!(state.snapshot().last_detection, before);
}

#[test]
fn test_face_with_two_eyes_is_detected() {
    let classifier = MockClassifier::new().with_face(Region::new(10, 10, 30, 30), 2);
    let (detector, state) = create_detector(Arc::new(classifier));

    let call_time = Instant::now();
    let outcome = detector.detect(&blank_frame_uri(64, 48));
    assert!(outcome.eyes_found);
    assert_eq!(outcome.message, "Eyes detected");

    assert!(state.snapshot().last_detection >= call_time);
}

#[test]
fn test_single_eye_is_not_enough() {
    let classifier = MockClassifier::new().with_face(Region::new(10, 10, 30, 30), 1);
    let (detector, _state) = create_detector(Arc::new(classifier));

    let outcome = detector.detect(&blank_frame_uri(64, 48));
    assert!(!outcome.eyes_found);
}

#[test]
fn test_scan_stops_at_first_qualifying_face() {
    let classifier = Arc::new(
        MockClassifier::new()
            .with_face(Region::new(0, 0, 20, 20), 0)
            .with_face(Region::new(20, 0, 22, 22), 2)
            .with_face(Region::new(40, 20, 24, 24), 2),
    );
    let (detector, _state) = create_detector(classifier.clone());

    let outcome = detector.detect(&blank_frame_uri(64, 48));
    assert!(outcome.eyes_found);
    assert_eq!(classifier.eye_calls(), 2);
}

#[test]
fn test_detection_clears_active_timer() {
    let classifier = MockClassifier::new().with_face(Region::new(10, 10, 30, 30), 2);
    let (detector, state) = create_detector(Arc::new(classifier));

    assert!(state.check_threshold_at(Instant::now() + Duration::from_secs(5)));
    assert!(state.is_active());

    let outcome = detector.detect(&blank_frame_uri(64, 48));
    assert!(outcome.eyes_found);
    assert!(!state.is_active());
    assert!(!state.status().timer_active);
}

#[test]
fn test_malformed_base64_reports_processing_error() {
    let (detector, _state) = create_detector(Arc::new(MockClassifier::new()));

    let outcome = detector.detect("data:image/png;base64,%%%");
    assert!(!outcome.eyes_found);
    assert!(outcome.message.starts_with("Error processing image"));
}

#[test]
fn test_missing_comma_reports_processing_error() {
    let (detector, _state) = create_detector(Arc::new(MockClassifier::new()));

    let outcome = detector.detect("just-some-text");
    assert!(!outcome.eyes_found);
    assert!(outcome.message.starts_with("Error processing image"));
}

#[test]
fn test_undecodable_image_bytes() {
    let (detector, _state) = create_detector(Arc::new(MockClassifier::new()));

    let outcome = detector.detect("data:image/png;base64,aGVsbG8gd29ybGQ=");
    assert!(!outcome.eyes_found);
    assert_eq!(outcome.message, "Invalid image data");
}

#[test]
fn test_classifier_failure_is_contained() {
    let classifier = MockClassifier::new()
        .with_face(Region::new(10, 10, 30, 30), 2)
        .failing("cascade exploded");
    let (detector, state) = create_detector(Arc::new(classifier));
    let before = state.snapshot().last_detection;

    let outcome = detector.detect(&blank_frame_uri(64, 48));
    assert!(!outcome.eyes_found);
    assert!(outcome.message.starts_with("Error processing image"));
    assert!(outcome.message.contains("cascade exploded"));
    assert_eq!(state.snapshot().last_detection, before);
}

#[test]
fn test_detection_publishes_event() {
    let classifier = MockClassifier::new().with_face(Region::new(10, 10, 30, 30), 2);
    let state = Arc::new(DetectionState::new(
        Duration::from_secs(300),
        Duration::from_secs(2),
    ));
    let event_bus = Arc::new(EventBus::new(10));
    let mut receiver = event_bus.subscribe();
    let detector = EyeDetector::new(Arc::new(classifier), state, Arc::clone(&event_bus));

    detector.detect(&blank_frame_uri(64, 48));
    let event = receiver.try_recv().unwrap();
    assert_eq!(event.event_type(), "eyes_detected");
}

#[test]
fn test_build_mock_classifier() {
    let config = DetectorConfig {
        backend: crate::config::DetectorBackend::Mock,
        ..crate::config::EyewatchConfig::default().detector
    };

    let classifier = build_classifier(&config).unwrap();
    assert_eq!(classifier.name(), "mock");
}

#[cfg(not(feature = "cascade"))]
#[test]
fn test_cascade_backend_requires_feature() {
    let config = crate::config::EyewatchConfig::default().detector;

    let result = build_classifier(&config);
    assert!(matches!(
        result,
        Err(crate::error::DetectorError::BackendUnavailable { .. })
    ));
}
