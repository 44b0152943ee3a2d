use super::*;
use config::{LlmTimeouts, default_base_url};

fn config(provider: LlmProviderKind, api_key: Option<&str>) -> LlmConfig {
    LlmConfig {
        provider,
        api_key: api_key.map(str::to_owned),
        model: "test-model".into(),
        base_url: default_base_url(provider).into(),
        params: GenerationParams::default(),
        timeouts: LlmTimeouts::default(),
    }
}

#[tokio::test]
async fn missing_key_surfaces_at_generate_time() {
    let client = LlmClient::from_config(config(LlmProviderKind::Gemini, None)).unwrap();
    assert!(!client.is_configured());
    let err = client
        .generate(&[Message::user("hi")], &GenerationParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { ref var } if var == "LLM_API_KEY"));
}

#[test]
fn empty_key_is_a_configured_client() {
    let client = LlmClient::from_config(config(LlmProviderKind::Gemini, Some(""))).unwrap();
    assert!(client.is_configured());
    assert_eq!(client.model(), "test-model");
}

#[test]
fn dispatch_records_provider_kind() {
    let client = LlmClient::from_config(config(LlmProviderKind::OpenAi, Some("sk"))).unwrap();
    assert_eq!(client.provider(), LlmProviderKind::OpenAi);
}
