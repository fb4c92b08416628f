use realitydefender::{
    AnalysisResult, DetectionModelResult, DetectionResult, DetectionResultList,
    DetectionResultPage, DetectionStatus, GetResultsOptions,
};
use serde_json::json;

fn model(name: &str, status: DetectionStatus) -> DetectionModelResult {
    DetectionModelResult {
        name: name.to_string(),
        status,
        score: Some(0.4),
        error: None,
        code: None,
    }
}

#[test]
fn test_not_applicable_dropped_on_construction() {
    let result = DetectionResult::new(
        "req-1",
        DetectionStatus::Authentic,
        Some(0.1),
        vec![
            model("visual", DetectionStatus::Authentic),
            model("audio", DetectionStatus::NotApplicable),
            model("text", DetectionStatus::NotApplicable),
        ],
    );

    assert_eq!(result.models().len(), 1);
    assert_eq!(result.models()[0].name, "visual");
}

#[test]
fn test_not_applicable_dropped_after_round_trip() {
    let result = DetectionResult::new(
        "req-1",
        DetectionStatus::Manipulated,
        Some(0.9),
        vec![model("visual", DetectionStatus::Manipulated)],
    );

    let encoded = serde_json::to_value(&result).unwrap();
    let decoded: DetectionResult = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded, result);

    // A payload written by someone else still loses its NOT_APPLICABLE models
    let decoded: DetectionResult = serde_json::from_value(json!({
        "requestId": "req-2",
        "status": "FAKE",
        "score": 0.8,
        "models": [
            { "name": "visual", "status": "FAKE", "score": 0.8 },
            { "name": "audio", "status": "NOT_APPLICABLE", "score": null }
        ]
    }))
    .unwrap();

    assert_eq!(decoded.status(), &DetectionStatus::Manipulated);
    assert_eq!(decoded.models().len(), 1);
    assert_eq!(decoded.models()[0].status, DetectionStatus::Manipulated);
}

#[test]
fn test_null_status_becomes_unknown() {
    let decoded: DetectionResult = serde_json::from_value(json!({
        "requestId": "req-3",
        "status": null,
        "score": null,
        "models": null
    }))
    .unwrap();

    assert_eq!(decoded.status(), &DetectionStatus::Unknown);
    assert!(!decoded.is_terminal());
    assert!(decoded.models().is_empty());

    let raw: AnalysisResult = serde_json::from_value(json!({ "requestId": "req-4" })).unwrap();
    let result = DetectionResult::from(raw.into_raw());
    assert_eq!(result.status(), &DetectionStatus::Unknown);
    assert_eq!(result.score(), None);
}

#[test]
fn test_results_page_from_wire() {
    let list: DetectionResultList = serde_json::from_value(json!({
        "totalItems": 12,
        "totalPages": 2,
        "currentPage": 0,
        "currentPageItemsCount": 2,
        "mediaList": [
            {
                "requestId": "a",
                "overallStatus": "FAKE",
                "resultsSummary": { "status": "FAKE", "metadata": { "finalScore": 99 } },
                "models": [
                    { "name": "visual", "status": "FAKE", "predictionNumber": 0.99 },
                    { "name": "audio", "status": "NOT_APPLICABLE",
                      "predictionNumber": { "reason": "no audio track" } }
                ]
            },
            { "requestId": "b", "overallStatus": "ANALYZING" }
        ]
    }))
    .unwrap();

    let page = DetectionResultPage::from(list.into_raw());

    assert_eq!(page.total_items, 12);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].status(), &DetectionStatus::Manipulated);
    assert_eq!(page.items[0].score(), Some(0.99));
    assert_eq!(page.items[0].models().len(), 1);
    assert!(!page.is_settled());
}

#[test]
fn test_get_results_defaults() {
    let options = GetResultsOptions::default();
    let query = options.page_query();

    assert_eq!(query.page_number, 0);
    assert_eq!(query.size, 10);
    assert_eq!(options.get_max_attempts(), 1);
    assert_eq!(options.get_polling_interval().as_millis(), 2000);
    assert_eq!(query.params(), vec![("size", "10".to_string())]);
}
