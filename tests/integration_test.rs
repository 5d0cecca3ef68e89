//! End to end tests running the app against a mock OpenAI compatible
//! backend

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use solace::chat::phased::CONCLUSION_NOTICE;
    use solace::core::ChatVariant;
    use solace::openai::{CONNECTION_FALLBACK, PROCESSING_FALLBACK};

    use crate::test_utils::{get_json, post_json, test_app_with_backend_url};

    fn completion_body(content: &str) -> String {
        json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
            ]
        })
        .to_string()
    }

    /// Tests a reply makes it from the backend to the client
    #[tokio::test]
    async fn it_proxies_a_completion() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-api-key")
            .match_body(mockito::Matcher::PartialJson(json!({
                "model": "test-model",
                "stream": false,
                "max_tokens": 300
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("## Your Feelings\nThat sounds heavy."))
            .create_async()
            .await;

        let app = test_app_with_backend_url(ChatVariant::Phased, &server.url());
        let (status, body) =
            post_json(&app, "/api/chat", json!({"message": "Long day", "id": "u1"})).await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "## Your Feelings\nThat sounds heavy.");
    }

    /// Tests a failing backend still gives the client a 200 and keeps
    /// the session growing in pairs
    #[tokio::test]
    async fn it_falls_back_when_the_backend_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .with_body("internal error")
            .expect_at_least(1)
            .create_async()
            .await;

        let app = test_app_with_backend_url(ChatVariant::Phased, &server.url());
        for n in 1..=5 {
            let (status, body) =
                post_json(&app, "/api/chat", json!({"message": "hello", "id": "u1"})).await;
            assert_eq!(status, StatusCode::OK);
            let response = body["response"].as_str().unwrap();
            assert!(response.starts_with(CONNECTION_FALLBACK));
            assert_eq!(response.ends_with(CONCLUSION_NOTICE), n == 5);
        }

        let (_, view) = get_json(&app, "/api/sessions/u1").await;
        assert_eq!(view["messages"].as_array().unwrap().len(), 10);
        assert_eq!(view["diagnosis"]["conditions"], json!(["General stress"]));
        assert_eq!(view["diagnosis"]["severity"], 3);
        assert_eq!(view["diagnosis"]["confidence"], 80);
    }

    /// Tests an unusable backend body maps to the processing fallback
    #[tokio::test]
    async fn it_falls_back_on_a_malformed_completion() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant"}}]}"#)
            .create_async()
            .await;

        let app = test_app_with_backend_url(ChatVariant::Windowed, &server.url());
        let (status, body) = post_json(&app, "/api/chat", json!({"message": "hello"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], PROCESSING_FALLBACK);
        assert!(body["id"].is_string());
    }

    /// Tests an unreachable backend degrades the windowed chat too
    #[tokio::test]
    async fn it_falls_back_when_the_backend_is_unreachable() {
        // Nothing listens on port 9 locally
        let app = test_app_with_backend_url(ChatVariant::Windowed, "http://127.0.0.1:9");
        let (status, body) = post_json(&app, "/api/chat", json!({"message": "hello"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], CONNECTION_FALLBACK);

        let (_, body) = get_json(&app, "/api/messages").await;
        assert_eq!(body["messages"].as_array().unwrap().len(), 5);
    }
}
