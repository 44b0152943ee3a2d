use std::collections::HashMap;

use super::*;
use crate::llm::GenerationParams;
use crate::llm::config::{LlmProviderKind, LlmTimeouts, default_base_url};

fn llm() -> LlmConfig {
    LlmConfig {
        provider: LlmProviderKind::Gemini,
        api_key: None,
        model: "gemini-2.0-flash".into(),
        base_url: default_base_url(LlmProviderKind::Gemini).into(),
        params: GenerationParams::default(),
        timeouts: LlmTimeouts::default(),
    }
}

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_without_env() {
    let cfg = AppConfig::from_lookup(lookup(&[]), llm());
    assert_eq!(cfg.api.base_url, DEFAULT_API_URL);
    assert_eq!(cfg.api.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    assert_eq!(cfg.api.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
    assert_eq!(cfg.session_file, default_session_file());
}

#[test]
fn overrides_are_applied() {
    let cfg = AppConfig::from_lookup(
        lookup(&[
            ("COMPGEN_API_URL", "http://localhost:5000/api/"),
            ("COMPGEN_SESSION_FILE", "/tmp/compgen-session.json"),
            ("COMPGEN_REQUEST_TIMEOUT_SECS", "5"),
            ("COMPGEN_CONNECT_TIMEOUT_SECS", "2"),
        ]),
        llm(),
    );
    assert_eq!(cfg.api.base_url, "http://localhost:5000/api");
    assert_eq!(cfg.session_file, PathBuf::from("/tmp/compgen-session.json"));
    assert_eq!(cfg.api.request_timeout_secs, 5);
    assert_eq!(cfg.api.connect_timeout_secs, 2);
}

#[test]
fn blank_or_invalid_values_fall_back() {
    let cfg = AppConfig::from_lookup(
        lookup(&[("COMPGEN_API_URL", "  "), ("COMPGEN_REQUEST_TIMEOUT_SECS", "soon")]),
        llm(),
    );
    assert_eq!(cfg.api.base_url, DEFAULT_API_URL);
    assert_eq!(cfg.api.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
}

#[test]
fn default_session_file_name() {
    assert!(default_session_file().ends_with(SESSION_FILE));
}
