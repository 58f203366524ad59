use mockito::Matcher;
use serde_json::json;

use newspost::news::exa::ExaNewsClient;
use newspost::news::NewsProvider;

const EXA_BODY: &str = r#"{
    "requestId": "abc",
    "resolvedSearchType": "neural",
    "results": [
        {
            "title": "EV sales hit record",
            "url": "https://news.example.com/ev-sales",
            "publishedDate": "2024-05-01T10:00:00.000Z",
            "author": "Jane Doe",
            "text": "Electric vehicle sales rose sharply...",
            "highlights": ["Sales rose 40% year over year."],
            "highlightScores": [0.92],
            "summary": "EV sales reached a new record in April."
        },
        {
            "title": "New battery plant announced",
            "url": "https://news.example.com/battery",
            "publishedDate": "2024-04-29T08:00:00.000Z",
            "author": "",
            "text": "A new battery plant...",
            "highlights": [{"text": "The plant will employ 2,000 people.", "score": 0.8}],
            "summary": ""
        },
        {
            "title": "Charging networks expand",
            "url": "https://news.example.com/charging",
            "publishedDate": "2024-04-28T08:00:00.000Z",
            "author": null,
            "text": "Charging networks continue to grow across the country."
        }
    ]
}"#;

#[tokio::test]
async fn test_fetch_news_sends_search_request_and_maps_results() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_header("authorization", "Bearer test-exa-key")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "query": "electric vehicles",
                "category": "news",
                "type": "neural",
                "useAutoprompt": true,
                "numResults": 3,
                "contents": { "text": true, "highlights": true, "summary": true }
            })),
            Matcher::Regex(r#""startPublishedDate":"\d{4}-\d{2}-\d{2}""#.to_string()),
            Matcher::Regex(r#""endPublishedDate":"\d{4}-\d{2}-\d{2}""#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(EXA_BODY)
        .create_async()
        .await;

    let client = ExaNewsClient::new(server.url(), "test-exa-key").expect("client");
    let articles = client
        .fetch_news("electric vehicles")
        .await
        .expect("fetch succeeds");

    assert_eq!(articles.len(), 3);

    assert_eq!(articles[0].title, "EV sales hit record");
    assert_eq!(articles[0].source, "Jane Doe");
    assert_eq!(articles[0].description, "EV sales reached a new record in April.");
    assert_eq!(articles[0].last_updated, "2024-05-01T10:00:00.000Z");
    assert_eq!(articles[0].date_created, articles[0].last_updated);
    assert_eq!(articles[0].url.as_deref(), Some("https://news.example.com/ev-sales"));

    assert_eq!(articles[1].source, "Unknown Source");
    assert_eq!(articles[1].description, "The plant will employ 2,000 people.");

    assert_eq!(articles[2].source, "Unknown Source");
    assert_eq!(
        articles[2].description,
        "Charging networks continue to grow across the country."
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_news_error_status_is_news_fetch_error() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "invalid api key"}"#)
        .create_async()
        .await;

    let client = ExaNewsClient::new(server.url(), "bad-key").expect("client");
    let err = client.fetch_news("anything").await.unwrap_err();

    assert_eq!(err.to_string(), "failed to fetch news articles");
    assert!(err.cause().to_string().contains("401"));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_news_malformed_payload_fails_whole_call() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "ok", "items": []}"#)
        .create_async()
        .await;

    let client = ExaNewsClient::new(server.url(), "key").expect("client");
    let result = client.fetch_news("anything").await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_fetch_news_transport_error() {
    // Nothing listens on port 9 locally.
    let client = ExaNewsClient::new("http://127.0.0.1:9/search", "key").expect("client");
    let result = client.fetch_news("anything").await;

    assert!(result.is_err());
}
