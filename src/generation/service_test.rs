use std::sync::Mutex;

use super::*;
use crate::conversation::{Status, TurnBody};
use crate::error::{ErrorCode, Surface};
use crate::generation::config::GenerationConfig;
use crate::generation::prompt::ExistingSource;
use crate::llm::{LlmError, Role};

// =========================================================================
// MockProvider
// =========================================================================

struct MockProvider {
    replies: Mutex<Vec<Result<String, LlmError>>>,
    seen: Mutex<Vec<(Vec<Message>, GenerationParams)>>,
}

impl MockProvider {
    fn new(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self { replies: Mutex::new(replies), seen: Mutex::new(Vec::new()) })
    }

    fn calls(&self) -> Vec<(Vec<Message>, GenerationParams)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ModelProvider for MockProvider {
    async fn generate(&self, messages: &[Message], params: &GenerationParams) -> Result<String, LlmError> {
        self.seen.lock().unwrap().push((messages.to_vec(), *params));
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() { Err(LlmError::EmptyCompletion) } else { replies.remove(0) }
    }

    fn model(&self) -> &str {
        "mock"
    }
}

/// Never answers; only cancellation ends a call.
struct StalledProvider;

#[async_trait::async_trait]
impl ModelProvider for StalledProvider {
    async fn generate(&self, _messages: &[Message], _params: &GenerationParams) -> Result<String, LlmError> {
        std::future::pending().await
    }

    fn model(&self) -> &str {
        "stalled"
    }
}

const BUTTON_PROMPT: &str = "Create a reusable button component with hover effects";
const BUTTON_REPLY: &str = "```jsx\nfunction Btn(){return <button/>;}\n```";

fn generator(provider: Arc<MockProvider>) -> Generator {
    Generator::new(provider, GenerationParams::default())
}

// =========================================================================
// chat
// =========================================================================

#[tokio::test]
async fn chat_button_scenario() {
    let mock = MockProvider::new(vec![Ok(BUTTON_REPLY.into())]);
    let reply = generator(mock.clone()).chat(&[], BUTTON_PROMPT, Preset::React).await.unwrap();

    assert_eq!(reply.markup, "function Btn(){return <button/>;}");
    assert_eq!(reply.style, "");
    assert_eq!(reply.raw, BUTTON_REPLY);

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    let (messages, params) = &calls[0];
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);
    assert!(messages[0].text.starts_with(&chat_instruction(Preset::React)));
    assert!(messages[0].text.ends_with(BUTTON_PROMPT));
    assert!(!params.json_response);
}

#[tokio::test]
async fn chat_missing_markup_is_rephrase_error() {
    let mock = MockProvider::new(vec![Ok("I can't do that.".into())]);
    let err = generator(mock).chat(&[], "make a card", Preset::React).await.unwrap_err();
    assert!(matches!(err, AppError::MissingArtifact(_)));
    assert_eq!(err.surface(), Surface::RephraseBanner);
}

#[tokio::test]
async fn chat_provider_error_passes_through() {
    let mock = MockProvider::new(vec![Err(LlmError::Provider { status: 503, message: "overloaded".into() })]);
    let err = generator(mock).chat(&[], "make a card", Preset::React).await.unwrap_err();
    assert_eq!(err.to_string(), "overloaded");
    assert!(err.retryable());
    assert_eq!(err.surface(), Surface::Banner);
}

#[tokio::test]
async fn chat_blank_prompt_never_calls_provider() {
    let mock = MockProvider::new(vec![Ok(BUTTON_REPLY.into())]);
    let err = generator(mock.clone()).chat(&[], "   ", Preset::React).await.unwrap_err();
    assert_eq!(err.surface(), Surface::Inline);
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn chat_reject_policy_refuses_consecutive_users() {
    let mock = MockProvider::new(vec![Ok(BUTTON_REPLY.into())]);
    let svc = generator(mock.clone()).with_policy(SameRolePolicy::Reject);
    let context = vec![Message::user("one"), Message::user("two")];
    let err = svc.chat(&context, "three", Preset::React).await.unwrap_err();
    assert_eq!(err.error_code(), "E_CONSECUTIVE_ROLES");
    assert!(mock.calls().is_empty());
}

// =========================================================================
// generate_component
// =========================================================================

#[tokio::test]
async fn generate_component_uses_json_mode() {
    let body = serde_json::json!({
        "componentName": "PrimaryButton",
        "jsx": "export default function PrimaryButton(){return <button/>;}",
        "css": ".btn{}",
        "explanation": "A button."
    })
    .to_string();
    let mock = MockProvider::new(vec![Ok(body)]);
    let request = GenerationRequest {
        prompt: "primary button".into(),
        config: GenerationConfig::default(),
        existing: Some(ExistingSource { markup: "function Old(){}".into(), style: String::new() }),
    };
    let response = generator(mock.clone()).generate_component(&request).await.unwrap();
    assert_eq!(response.component_name, "PrimaryButton");

    let calls = mock.calls();
    let (messages, params) = &calls[0];
    assert!(params.json_response);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[1].role, Role::User);
    assert!(messages[1].text.contains("function Old(){}"));

    let draft = response.into_draft("primary button");
    assert_eq!(draft.name, "PrimaryButton");
    assert_eq!(draft.style, ".btn{}");
    assert_eq!(draft.origin_prompt, "primary button");
}

#[tokio::test]
async fn generate_component_rejects_prose() {
    let mock = MockProvider::new(vec![Ok("Sure! Here it is.".into())]);
    let request = GenerationRequest { prompt: "x".into(), ..GenerationRequest::default() };
    let err = generator(mock).generate_component(&request).await.unwrap_err();
    assert_eq!(err.error_code(), "E_INVALID_FORMAT");
}

// =========================================================================
// run_turn
// =========================================================================

#[tokio::test]
async fn run_turn_settles_and_replays_context() {
    let mock = MockProvider::new(vec![Ok(BUTTON_REPLY.into()), Ok("```jsx\nfunction Btn2(){}\n```".into())]);
    let svc = generator(mock.clone());
    let mut convo = Conversation::new();
    let cancel = CancellationToken::new();

    svc.run_turn(&mut convo, BUTTON_PROMPT, Preset::React, &cancel).await.unwrap();
    assert_eq!(convo.status(), Status::Idle);
    assert_eq!(convo.view()[1].body, TurnBody::Settled(BUTTON_REPLY.into()));

    let reply = svc.run_turn(&mut convo, "make it red", Preset::React, &cancel).await.unwrap();
    assert_eq!(reply.markup, "function Btn2(){}");

    let calls = mock.calls();
    let (second, _) = &calls[1];
    assert_eq!(second.len(), 3);
    assert_eq!(second[1], Message::assistant(BUTTON_REPLY));
    assert_eq!(second[2], Message::user("make it red"));
}

#[tokio::test]
async fn run_turn_records_provider_failure() {
    let mock = MockProvider::new(vec![Err(LlmError::Transport("connection reset".into()))]);
    let mut convo = Conversation::new();
    let err = generator(mock)
        .run_turn(&mut convo, BUTTON_PROMPT, Preset::React, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.retryable());
    assert_eq!(convo.status(), Status::Idle);
    assert!(convo.view()[1].is_error());
    assert!(convo.context().is_empty());
}

#[tokio::test]
async fn run_turn_blank_prompt_leaves_conversation_untouched() {
    let mock = MockProvider::new(vec![]);
    let mut convo = Conversation::new();
    let err = generator(mock.clone())
        .run_turn(&mut convo, "", Preset::React, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.surface(), Surface::Inline);
    assert!(convo.log().is_empty());
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn run_turn_cancelled_is_recorded() {
    let svc = Generator::new(Arc::new(StalledProvider), GenerationParams::default());
    let mut convo = Conversation::new();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        trigger.cancel();
    });

    let err = svc.run_turn(&mut convo, BUTTON_PROMPT, Preset::React, &cancel).await.unwrap_err();
    assert!(matches!(err, AppError::Cancelled));
    assert_eq!(convo.status(), Status::Idle);
    assert_eq!(convo.view()[1].body, TurnBody::Errored(CANCELLED_MESSAGE.into()));
    assert!(convo.can_submit("again"));
}

#[tokio::test]
async fn failed_turn_never_records_api_key() {
    use crate::llm::LlmClient;
    use crate::llm::config::{LlmConfig, LlmProviderKind, LlmTimeouts};

    let config = LlmConfig {
        provider: LlmProviderKind::Gemini,
        api_key: Some("SECRET-KEY-123".into()),
        model: "gemini-2.0-flash".into(),
        base_url: crate::test_helpers::closed_url().await,
        params: GenerationParams::default(),
        timeouts: LlmTimeouts::default(),
    };
    let svc = Generator::new(Arc::new(LlmClient::from_config(config).unwrap()), GenerationParams::default());
    let mut convo = Conversation::new();

    let err = svc
        .run_turn(&mut convo, BUTTON_PROMPT, Preset::React, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(!err.to_string().contains("SECRET-KEY-123"));
    match &convo.view()[1].body {
        TurnBody::Errored(message) => assert!(!message.contains("SECRET-KEY-123")),
        other => panic!("expected an errored turn, got {other:?}"),
    }
}
