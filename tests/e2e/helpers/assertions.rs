use serde_json::Value;

pub fn assert_event_response(event: &Value, expected_feed: &str, expected_title: &str) {
    assert_eq!(
        event.get("title").and_then(|v| v.as_str()),
        Some(expected_title)
    );
    assert_eq!(
        event.get("feed_name").and_then(|v| v.as_str()),
        Some(expected_feed)
    );
    assert!(event.get("link").and_then(|v| v.as_str()).is_some());
    assert!(event.get("occurrences").and_then(|v| v.as_array()).is_some());
    assert!(event.get("first_seen").is_some());
    assert!(event.get("last_seen").is_some());
    assert!(event.get("is_active").is_none());
}

pub fn titles(events: &Value) -> Vec<String> {
    events
        .as_array()
        .expect("array of events")
        .iter()
        .filter_map(|e| e.get("title").and_then(|t| t.as_str()).map(str::to_string))
        .collect()
}
