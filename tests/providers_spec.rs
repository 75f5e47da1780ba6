//! HTTP-level checks for the Gemini, Cloudinary and Google clients against a local mock server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use brainboard::ai::{AiError, GeminiClient, GeminiConfig, TextGenerator, SUMMARY_OPTIONS};
use brainboard::auth::{AuthError, GoogleConfig, GoogleOAuth, IdentityProvider};
use brainboard::storage::{CloudinaryConfig, CloudinaryStorage, ObjectStorage, StorageError};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn gemini(server: &MockServer) -> GeminiClient {
    let mut config = GeminiConfig::new("test-key");
    config.base_url = server.uri();
    GeminiClient::new(config).expect("Failed to create client")
}

fn cloudinary(server: &MockServer) -> CloudinaryStorage {
    let mut config = CloudinaryConfig::new("demo", "key-123", "shh");
    config.base_url = server.uri();
    CloudinaryStorage::new(config).expect("Failed to create storage")
}

fn google(server: &MockServer) -> GoogleOAuth {
    let mut config = GoogleConfig::new("client-id", "client-secret");
    config.token_url = format!("{}/token", server.uri());
    config.userinfo_url = format!("{}/userinfo", server.uri());
    GoogleOAuth::new(config).expect("Failed to create oauth client")
}

mod gemini {
    use super::*;

    #[tokio::test]
    async fn sends_key_and_generation_config() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Summarize this" }] }],
                "generationConfig": { "maxOutputTokens": 500 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "  A summary.\n" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = gemini(&server)
            .generate("Summarize this", SUMMARY_OPTIONS)
            .await
            .expect("generation should succeed");
        assert_eq!(text, "A summary.");
    }

    #[tokio::test]
    async fn empty_candidates_are_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = gemini(&server).generate("hi", SUMMARY_OPTIONS).await.unwrap_err();
        assert!(matches!(err, AiError::EmptyResponse));
    }

    #[tokio::test]
    async fn maps_rate_limits_and_outages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "code": 429, "message": "Resource has been exhausted" }
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = gemini(&server);
        let first = client.generate("hi", SUMMARY_OPTIONS).await.unwrap_err();
        assert!(matches!(first, AiError::RateLimited));
        let second = client.generate("hi", SUMMARY_OPTIONS).await.unwrap_err();
        assert!(matches!(second, AiError::Unavailable));
    }

    #[tokio::test]
    async fn bad_request_carries_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": "Invalid JSON payload" }
            })))
            .mount(&server)
            .await;

        let err = gemini(&server).generate("hi", SUMMARY_OPTIONS).await.unwrap_err();
        match err {
            AiError::InvalidRequest(msg) => assert_eq!(msg, "Invalid JSON payload"),
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }
}

mod cloudinary {
    use super::*;

    #[tokio::test]
    async fn uploads_signed_raw_files() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/raw/upload"))
            .and(body_string_contains("name=\"signature\""))
            .and(body_string_contains("key-123"))
            .and(body_string_contains("lecture.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "secure_url": "https://res.cloudinary.com/demo/raw/upload/v1712/notes/lecture.pdf",
                "public_id": "notes/lecture.pdf"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let stored = cloudinary(&server)
            .upload(b"%PDF-1.4".to_vec(), "lecture.pdf", "notes")
            .await
            .expect("upload should succeed");
        assert_eq!(
            stored.url,
            "https://res.cloudinary.com/demo/raw/upload/v1712/notes/lecture.pdf"
        );
    }

    #[tokio::test]
    async fn upload_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/raw/upload"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Signature"))
            .mount(&server)
            .await;

        let err = cloudinary(&server)
            .upload(b"text".to_vec(), "a.txt", "notes")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Upload(msg) if msg.contains("Invalid Signature")));
    }

    #[tokio::test]
    async fn destroys_by_public_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/raw/destroy"))
            .and(header_exists("content-type"))
            .and(body_string_contains("public_id=notes%2Flecture"))
            .and(body_string_contains("signature_algorithm=sha256"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        cloudinary(&server)
            .delete("https://res.cloudinary.com/demo/raw/upload/v1712/notes/lecture.pdf")
            .await
            .expect("delete should succeed");
    }

    #[tokio::test]
    async fn missing_remote_file_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/raw/destroy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "not found" })))
            .mount(&server)
            .await;

        cloudinary(&server)
            .delete("https://res.cloudinary.com/demo/raw/upload/v1712/notes/gone.txt")
            .await
            .expect("a not-found result still succeeds");
    }

    #[tokio::test]
    async fn rejects_urls_without_a_public_id() {
        let server = MockServer::start().await;
        let err = cloudinary(&server).delete("https://example.com/x").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidUrl(_)));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}

mod google {
    use super::*;

    #[tokio::test]
    async fn exchanges_code_for_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("code=auth-code"))
            .and(body_string_contains("redirect_uri=postmessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-123",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer access-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "email": "grace@example.com",
                "name": "Grace Hopper"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let identity = google(&server)
            .exchange_code("auth-code")
            .await
            .expect("exchange should succeed");
        assert_eq!(identity.email, "grace@example.com");
        assert_eq!(identity.name, "Grace Hopper");
    }

    #[tokio::test]
    async fn falls_back_to_email_local_part_for_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-123",
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "email": "grace@example.com"
            })))
            .mount(&server)
            .await;

        let identity = google(&server).exchange_code("auth-code").await.unwrap();
        assert_eq!(identity.name, "grace");
    }

    #[tokio::test]
    async fn rejected_codes_fail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Bad Request"
            })))
            .mount(&server)
            .await;

        let err = google(&server).exchange_code("stale").await.unwrap_err();
        assert!(matches!(err, AuthError::OAuth(_)));
    }
}
