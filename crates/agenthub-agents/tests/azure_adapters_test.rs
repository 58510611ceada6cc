use std::sync::Arc;
use std::time::Duration;

use agenthub_agents::{
    aggregate, AgentRunner, AzureAgentsClient, AzureBlobStore, BlobStore, FileService,
    StaticTokenCredential, ThreadService, VectorStoreService,
};
use mockito::Matcher;

fn path(prefix: &str) -> Matcher {
    // Exact path, with or without the api-version query attached
    Matcher::Regex(format!(r"^{}(\?|$)", regex_escape(prefix)))
}

fn regex_escape(s: &str) -> String {
    s.replace('.', r"\.")
}

fn client_for(url: &str) -> AzureAgentsClient {
    AzureAgentsClient::builder()
        .endpoint(url)
        .credential(Arc::new(StaticTokenCredential::new("test-token").unwrap()))
        .poll_interval(Duration::from_millis(1))
        .poll_attempts(3)
        .build()
        .unwrap()
}

const RUN_STREAM: &str = "event: thread.run.created\n\
data: {\"id\":\"run_1\",\"object\":\"thread.run\",\"thread_id\":\"thread_1\",\"status\":\"queued\"}\n\n\
event: thread.message.delta\n\
data: {\"id\":\"msg_1\",\"object\":\"thread.message.delta\",\"delta\":{\"content\":[{\"index\":0,\"type\":\"text\",\"text\":{\"value\":\"Model \"}}]}}\n\n\
event: thread.message.delta\n\
data: {\"id\":\"msg_1\",\"object\":\"thread.message.delta\",\"delta\":{\"content\":[{\"index\":0,\"type\":\"text\",\"text\":{\"value\":\"X-200\",\"annotations\":[{\"index\":0,\"type\":\"file_citation\",\"text\":\"[1]\",\"start_index\":6,\"end_index\":9,\"file_citation\":{\"file_id\":\"assistant-1\"}}]}}]}}\n\n\
event: done\n\
data: [DONE]\n\n";

#[tokio::test]
async fn test_invoke_stream_posts_message_and_streams_run() {
    let mut server = mockito::Server::new_async().await;
    let message_mock = server
        .mock("POST", path("/threads/thread_1/messages"))
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::PartialJsonString(r#"{"role":"user","content":"Which model?"}"#.to_string()))
        .with_status(200)
        .with_body(r#"{"id":"msg_0","object":"thread.message"}"#)
        .create_async()
        .await;
    let run_mock = server
        .mock("POST", path("/threads/thread_1/runs"))
        .match_body(Matcher::PartialJsonString(r#"{"assistant_id":"asst_1","stream":true}"#.to_string()))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(RUN_STREAM)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let stream = client
        .invoke_stream("asst_1", Some("thread_1"), "Which model?")
        .await
        .unwrap();
    let result = aggregate(stream, Some("thread_1".to_string())).await.unwrap();

    message_mock.assert_async().await;
    run_mock.assert_async().await;
    assert_eq!(result.content, "Model X-200");
    assert_eq!(result.thread_id, "thread_1");
    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.sources[0].quote, "[1]");
    assert_eq!(result.sources[0].start_index, "6");
}

#[tokio::test]
async fn test_invoke_stream_creates_thread_when_missing() {
    let mut server = mockito::Server::new_async().await;
    let thread_mock = server
        .mock("POST", path("/threads"))
        .with_status(200)
        .with_body(r#"{"id":"thread_new","object":"thread","tool_resources":{}}"#)
        .create_async()
        .await;
    server
        .mock("POST", path("/threads/thread_new/messages"))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    server
        .mock("POST", path("/threads/thread_new/runs"))
        .with_status(200)
        .with_body("data: [DONE]\n\n")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let stream = client.invoke_stream("asst_1", None, "Hello").await.unwrap();
    let result = aggregate(stream, None).await.unwrap();

    thread_mock.assert_async().await;
    assert_eq!(result.thread_id, "thread_new");
    assert!(result.content.is_empty());
}

#[tokio::test]
async fn test_run_error_status_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", path("/threads/thread_1/messages"))
        .with_status(404)
        .with_body(r#"{"error":{"message":"No thread found"}}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client
        .invoke_stream("asst_1", Some("thread_1"), "Hi")
        .await
        .err()
        .unwrap();

    let message = err.to_string();
    assert!(message.contains("404"));
    assert!(message.contains("No thread found"));
}

#[tokio::test]
async fn test_get_thread_reads_vector_stores() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", path("/threads/thread_1"))
        .with_status(200)
        .with_body(r#"{"id":"thread_1","object":"thread","tool_resources":{"file_search":{"vector_store_ids":["vs_a"]}}}"#)
        .create_async()
        .await;

    let thread = client_for(&server.url()).get_thread("thread_1").await.unwrap();
    assert_eq!(thread.vector_store_ids, vec!["vs_a"]);
}

#[tokio::test]
async fn test_update_thread_sends_file_search_resources() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", path("/threads/thread_1"))
        .match_body(Matcher::Json(serde_json::json!({
            "tool_resources": {"file_search": {"vector_store_ids": ["vs_b"]}}
        })))
        .with_status(200)
        .with_body(r#"{"id":"thread_1","tool_resources":{"file_search":{"vector_store_ids":["vs_b"]}}}"#)
        .create_async()
        .await;

    let thread = client_for(&server.url())
        .update_thread("thread_1", &["vs_b".to_string()])
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(thread.vector_store_ids, vec!["vs_b"]);
}

#[tokio::test]
async fn test_create_vector_store_polls_until_completed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", path("/vector_stores"))
        .match_body(Matcher::PartialJsonString(r#"{"file_ids":["file_1"]}"#.to_string()))
        .with_status(200)
        .with_body(r#"{"id":"vs_1","object":"vector_store","status":"in_progress"}"#)
        .create_async()
        .await;
    let poll = server
        .mock("GET", path("/vector_stores/vs_1"))
        .with_status(200)
        .with_body(r#"{"id":"vs_1","object":"vector_store","status":"completed"}"#)
        .expect(1)
        .create_async()
        .await;

    let id = client_for(&server.url())
        .create_vector_store("agenthub_vs_test", &["file_1".to_string()])
        .await
        .unwrap();

    poll.assert_async().await;
    assert_eq!(id, "vs_1");
}

#[tokio::test]
async fn test_add_file_reports_failed_indexing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", path("/vector_stores/vs_1/files"))
        .with_status(200)
        .with_body(r#"{"id":"file_1","status":"failed","last_error":{"code":"unsupported_file","message":"bad format"}}"#)
        .create_async()
        .await;

    let err = client_for(&server.url())
        .add_file("vs_1", "file_1")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("bad format"));
}

#[tokio::test]
async fn test_upload_file_is_multipart() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", path("/files"))
        .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
        .match_body(Matcher::Regex("assistants".to_string()))
        .with_status(200)
        .with_body(r#"{"id":"assistant-file_9","object":"file","purpose":"assistants"}"#)
        .create_async()
        .await;

    let file = client_for(&server.url())
        .upload_file("manual.pdf", b"%PDF".to_vec())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(file.id, "assistant-file_9");
}

#[tokio::test]
async fn test_blob_download_uses_sas_and_content_type() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Regex(r"^/images/labels/plate\.png".to_string()))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("sv".to_string(), "1".to_string()),
            Matcher::UrlEncoded("sig".to_string(), "x".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body([1u8, 2, 3])
        .create_async()
        .await;

    let store = AzureBlobStore::from_connection_string(
        &format!("BlobEndpoint={};SharedAccessSignature=sv=1&sig=x", server.url()),
        "images",
    )
    .unwrap();
    let blob = store.download("labels/plate.png").await.unwrap();

    mock.assert_async().await;
    assert_eq!(blob.bytes, vec![1, 2, 3]);
    assert_eq!(blob.content_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_blob_download_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let store = AzureBlobStore::from_connection_string(
        &format!("BlobEndpoint={};SharedAccessSignature=sv=1", server.url()),
        "images",
    )
    .unwrap();

    let err = store.download("missing.png").await.unwrap_err();
    assert!(err.to_string().contains("missing.png"));
}

#[tokio::test]
async fn test_blob_download_signs_with_account_key() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", path("/images/labels/plate.png"))
        .match_header(
            "authorization",
            Matcher::Regex(r"^SharedKey acme:[A-Za-z0-9+/]{43}=$".to_string()),
        )
        .match_header("x-ms-date", Matcher::Regex(r"^\w{3}, \d{2} \w{3} \d{4} \d{2}:\d{2}:\d{2} GMT$".to_string()))
        .match_header("x-ms-version", "2023-11-03")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body([7u8])
        .create_async()
        .await;

    let store = AzureBlobStore::from_connection_string(
        &format!("BlobEndpoint={};AccountName=acme;AccountKey=c2VjcmV0LWtleQ==", server.url()),
        "images",
    )
    .unwrap();
    let blob = store.download("labels/plate.png").await.unwrap();

    mock.assert_async().await;
    assert_eq!(blob.bytes, vec![7]);
}
