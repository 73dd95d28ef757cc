//! Integration tests for the identify pipeline against a scripted chat API.

use std::sync::Arc;
use std::time::Duration;

use identifier::testing::MockChatApi;
use identifier::{
    ComponentType, IdentifyError, IdentifyOptions, IdentifyRequest, IdentifyService,
    ServiceConfig,
};

fn gcp_reply() -> String {
    serde_json::json!([{
        "type": "boilerplate",
        "title": "GCP Compliance Statement",
        "text": "This study follows GCP guidelines.",
        "confidence": 0.97,
        "reuse_potential": "high",
        "rationale": "Standard regulatory compliance statement"
    }])
    .to_string()
}

fn service(api: &MockChatApi) -> IdentifyService {
    IdentifyService::new(Arc::new(api.clone()), "ft:gpt-4o-mini-2024-07-18:test:cc:1")
        .with_config(ServiceConfig {
            max_retries: 3,
            retry_delay: Duration::from_millis(1),
        })
}

#[tokio::test]
async fn test_gcp_boilerplate_scenario() {
    let api = MockChatApi::new().with_reply(gcp_reply());
    let service = service(&api);

    let request = IdentifyRequest::new("This study follows GCP guidelines.")
        .with_options(IdentifyOptions::default().with_min_confidence(0.7));
    let result = service.identify(&request).await.unwrap();

    assert_eq!(result.components.len(), 1);
    let component = &result.components[0];
    assert_eq!(component.component_type, ComponentType::Boilerplate);
    assert!(component.confidence >= 0.7);
    assert_eq!(result.model_used, "ft:gpt-4o-mini-2024-07-18:test:cc:1");
    assert_eq!(result.usage.total_tokens, 150);
}

#[tokio::test]
async fn test_high_confidence_floor_filters_everything() {
    let api = MockChatApi::new().with_reply(gcp_reply());
    let service = service(&api);

    let request = IdentifyRequest::new("This study follows GCP guidelines.")
        .with_options(IdentifyOptions::default().with_min_confidence(0.99));
    let result = service.identify(&request).await.unwrap();

    // Filtered to nothing, but still a successful result
    assert!(result.components.is_empty());
}

#[tokio::test]
async fn test_returned_components_respect_bounds_and_order() {
    let reply = serde_json::json!([
        {"type": "safety", "title": "a", "text": "a", "confidence": 1.7},
        {"type": "definition", "title": "b", "text": "b", "confidence": 0.85},
        {"type": "procedure", "title": "c", "text": "c", "confidence": 0.91},
        {"type": "boilerplate", "title": "d", "text": "d", "confidence": 0.2},
    ])
    .to_string();

    let api = MockChatApi::new().with_reply(reply);
    let service = service(&api);

    let request = IdentifyRequest::new("doc")
        .with_options(IdentifyOptions::default().with_min_confidence(0.7));
    let result = service.identify(&request).await.unwrap();

    assert_eq!(result.components.len(), 3);
    for component in &result.components {
        assert!((0.0..=1.0).contains(&component.confidence));
        assert!(component.confidence >= 0.7);
    }
    // Descending by confidence; the 1.7 was clamped to 1.0
    assert_eq!(result.components[0].confidence, 1.0);
    assert_eq!(result.components[1].confidence, 0.91);
    assert_eq!(result.components[2].confidence, 0.85);
}

#[tokio::test]
async fn test_max_components_truncates() {
    let reply = serde_json::json!([
        {"type": "safety", "title": "a", "text": "a", "confidence": 0.9},
        {"type": "definition", "title": "b", "text": "b", "confidence": 0.85},
        {"type": "procedure", "title": "c", "text": "c", "confidence": 0.95},
    ])
    .to_string();

    let api = MockChatApi::new().with_reply(reply);
    let service = service(&api);

    let request = IdentifyRequest::new("doc").with_options(
        IdentifyOptions::default()
            .with_min_confidence(0.0)
            .with_max_components(2),
    );
    let result = service.identify(&request).await.unwrap();

    assert_eq!(result.components.len(), 2);
    assert_eq!(result.components[0].confidence, 0.95);
}

#[tokio::test]
async fn test_identify_is_deterministic_for_identical_input() {
    let api = MockChatApi::new().with_reply(gcp_reply());
    let service = service(&api);

    let request = IdentifyRequest::new("This study follows GCP guidelines.");
    let first = service.identify(&request).await.unwrap();
    let second = service.identify(&request).await.unwrap();

    assert_eq!(first.components.len(), second.components.len());
    let ids = |r: &identifier::IdentifyResult| {
        r.components
            .iter()
            .map(|c| (c.component_id.clone(), c.confidence))
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
}

#[tokio::test]
async fn test_malformed_reply_recovered_by_corrective_retry() {
    let api = MockChatApi::new()
        .with_reply("Sorry, here is prose instead of data.")
        .with_reply(gcp_reply());
    let service = service(&api);

    let request = IdentifyRequest::new("This study follows GCP guidelines.");
    let result = service.identify(&request).await.unwrap();

    assert_eq!(result.components.len(), 1);
    assert_eq!(api.call_count(), 2);

    // The second call used the amended instruction
    let calls = api.calls();
    assert!(calls[1].user.contains("ONLY a JSON array"));
    // Usage from both calls is accounted
    assert_eq!(result.usage.total_tokens, 300);
}

#[tokio::test]
async fn test_malformed_reply_twice_is_schema_error() {
    let api = MockChatApi::new()
        .with_reply("not json")
        .with_reply("still not json");
    let service = service(&api);

    let err = service
        .identify(&IdentifyRequest::new("doc"))
        .await
        .unwrap_err();

    assert!(matches!(err, IdentifyError::Schema(_)));
    // Exactly one corrective retry, never more
    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn test_transient_upstream_failure_is_retried() {
    let api = MockChatApi::new()
        .with_transient_error("rate limit exceeded")
        .with_reply(gcp_reply());
    let service = service(&api);

    let result = service
        .identify(&IdentifyRequest::new("doc"))
        .await
        .unwrap();

    assert_eq!(result.components.len(), 1);
    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn test_permanent_upstream_failure_is_not_retried() {
    let api = MockChatApi::new().with_permanent_error("invalid api key");
    let service = service(&api);

    let err = service
        .identify(&IdentifyRequest::new("doc"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IdentifyError::Upstream {
            transient: false,
            ..
        }
    ));
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn test_transient_failures_exhaust_retry_budget() {
    let api = MockChatApi::new().with_transient_error("rate limit exceeded");
    let service = service(&api);

    let err = service
        .identify(&IdentifyRequest::new("doc"))
        .await
        .unwrap_err();

    assert!(err.is_transient());
    // 1 initial attempt + 3 retries
    assert_eq!(api.call_count(), 4);
}

#[tokio::test]
async fn test_invalid_request_never_reaches_upstream() {
    let api = MockChatApi::new().with_reply(gcp_reply());
    let service = service(&api);

    let err = service
        .identify(&IdentifyRequest::new("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentifyError::Validation(_)));

    let err = service
        .identify(
            &IdentifyRequest::new("doc")
                .with_options(IdentifyOptions::default().with_min_confidence(2.0)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, IdentifyError::Validation(_)));

    assert_eq!(api.call_count(), 0);
}
