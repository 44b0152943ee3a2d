use super::*;
use crate::generation::config::StyleMethod;

const INSTRUCTION: &str = "SYSTEM";

// =============================================================================
// build_chat_messages: contract
// =============================================================================

#[test]
fn empty_context_emits_single_user_message() {
    for preset in [Preset::React, Preset::Mui, Preset::Vue] {
        let instruction = chat_instruction(preset);
        let prompt = "Create a reusable button component with hover effects";
        let out = build_chat_messages(&instruction, &[], prompt, SameRolePolicy::Merge).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].role, Role::User);
        assert_eq!(out[0].text, format!("{instruction}\n\n{prompt}"));
    }
}

#[test]
fn context_opening_on_user_gets_instruction_prepended() {
    let context = vec![Message::user("make a card"), Message::assistant("```jsx\ncard\n```")];
    let out = build_chat_messages(INSTRUCTION, &context, "add a shadow", SameRolePolicy::Merge).unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out[0], Message::user("SYSTEM\n\nmake a card"));
    assert_eq!(out[1], Message::assistant("```jsx\ncard\n```"));
    assert_eq!(out[2], Message::user("add a shadow"));
}

#[test]
fn instruction_prepended_only_once() {
    let context = vec![
        Message::user("one"),
        Message::assistant("a"),
        Message::user("two"),
        Message::assistant("b"),
    ];
    let out = build_chat_messages(INSTRUCTION, &context, "three", SameRolePolicy::Reject).unwrap();
    let with_instruction = out.iter().filter(|m| m.text.contains(INSTRUCTION)).count();
    assert_eq!(with_instruction, 1);
    assert_eq!(out.len(), 5);
}

#[test]
fn context_opening_on_assistant_gets_synthetic_leading_turn() {
    let context = vec![Message::assistant("welcome"), Message::user("make a modal"), Message::assistant("ok")];
    let out = build_chat_messages(INSTRUCTION, &context, "now darker", SameRolePolicy::Merge).unwrap();
    assert_eq!(out[0], Message::user(INSTRUCTION));
    assert_eq!(out[1], Message::assistant("welcome"));
    // The later user turn is replayed untouched.
    assert_eq!(out[2], Message::user("make a modal"));
    assert_eq!(out.last().unwrap(), &Message::user("now darker"));
}

#[test]
fn assistant_only_context_gets_synthetic_leading_turn() {
    let context = vec![Message::assistant("hello")];
    let out = build_chat_messages(INSTRUCTION, &context, "go", SameRolePolicy::Reject).unwrap();
    assert_eq!(out, vec![Message::user(INSTRUCTION), Message::assistant("hello"), Message::user("go")]);
}

#[test]
fn system_entries_in_context_are_dropped() {
    let context = vec![Message::system("old rules"), Message::user("hi"), Message::assistant("yo")];
    let out = build_chat_messages(INSTRUCTION, &context, "next", SameRolePolicy::Merge).unwrap();
    assert!(out.iter().all(|m| m.role != Role::System));
    assert_eq!(out[0].text, "SYSTEM\n\nhi");
}

#[test]
fn blank_prompt_is_rejected() {
    assert_eq!(build_chat_messages(INSTRUCTION, &[], "   \n", SameRolePolicy::Merge), Err(PromptError::EmptyPrompt));
}

// =============================================================================
// build_chat_messages: same-role policy
// =============================================================================

#[test]
fn merge_policy_joins_back_to_back_user_turns() {
    let context = vec![Message::user("first"), Message::user("second")];
    let out = build_chat_messages(INSTRUCTION, &context, "third", SameRolePolicy::Merge).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].role, Role::User);
    assert_eq!(out[0].text, "SYSTEM\n\nfirst\n\nsecond\n\nthird");
}

#[test]
fn merge_policy_output_alternates_roles() {
    let context = vec![
        Message::user("a"),
        Message::assistant("b"),
        Message::assistant("c"),
        Message::user("d"),
    ];
    let out = build_chat_messages(INSTRUCTION, &context, "e", SameRolePolicy::Merge).unwrap();
    for pair in out.windows(2) {
        assert_ne!(pair[0].role, pair[1].role);
    }
    assert_eq!(out[1].text, "b\n\nc");
    assert_eq!(out[2].text, "d\n\ne");
}

#[test]
fn reject_policy_reports_first_conflict() {
    let context = vec![Message::user("first"), Message::user("second")];
    let err = build_chat_messages(INSTRUCTION, &context, "third", SameRolePolicy::Reject).unwrap_err();
    assert_eq!(err, PromptError::ConsecutiveRoles { index: 1, role: Role::User });
}

#[test]
fn reject_policy_catches_context_ending_on_user() {
    let context = vec![Message::user("q"), Message::assistant("a"), Message::user("dangling")];
    let err = build_chat_messages(INSTRUCTION, &context, "new", SameRolePolicy::Reject).unwrap_err();
    assert_eq!(err, PromptError::ConsecutiveRoles { index: 3, role: Role::User });
}

// =============================================================================
// instructions
// =============================================================================

#[test]
fn chat_instruction_names_fence_tags() {
    let react = chat_instruction(Preset::React);
    assert!(react.contains("```jsx"));
    assert!(react.contains("```css"));
    assert!(react.contains("React"));
    assert!(chat_instruction(Preset::Vue).contains("```vue"));
    assert!(chat_instruction(Preset::Mui).contains("Material-UI"));
}

#[test]
fn form_instruction_defaults() {
    let text = form_instruction(&GenerationConfig::default());
    assert!(text.starts_with("You are an expert React component generator."));
    assert!(text.contains("3. Use TypeScript"));
    assert!(text.contains("4. Style with CSS Modules"));
    assert!(!text.contains("tests:"));
    assert!(!text.contains("storybook:"));
    assert!(text.ends_with("- explanation: \"brief description\""));
}

#[test]
fn form_instruction_lists_optional_fields() {
    let config = GenerationConfig {
        preset: Preset::Mui,
        style_method: StyleMethod::Tailwind,
        features: [Feature::Tests, Feature::Storybook].into_iter().collect(),
    };
    let text = form_instruction(&config);
    assert!(text.contains("Material-UI v5+"));
    assert!(text.contains("Use PropTypes"));
    assert!(text.contains("7. Include unit test boilerplate"));
    assert!(text.contains("8. Generate Storybook stories"));
    assert!(text.contains("- tests: \"test code\""));
    assert!(text.contains("- storybook: \"story code\""));
}

#[test]
fn form_instruction_numbers_rules_without_gaps() {
    let config = GenerationConfig { features: [Feature::Storybook].into_iter().collect(), ..Default::default() };
    let text = form_instruction(&config);
    assert!(text.contains("7. Generate Storybook stories"));
    assert!(!text.contains("8."));
}

// =============================================================================
// user_prompt / build_form_messages
// =============================================================================

#[test]
fn user_prompt_create_mode() {
    assert_eq!(user_prompt("a login form", None), "Create new component with: \"a login form\"");
    let blank = ExistingSource::default();
    assert_eq!(user_prompt("x", Some(&blank)), "Create new component with: \"x\"");
}

#[test]
fn user_prompt_refine_mode() {
    let existing = ExistingSource { markup: "function A(){}".into(), style: ".a{}".into() };
    let text = user_prompt("make it blue", Some(&existing));
    assert_eq!(
        text,
        "Refine this component based on: \"make it blue\"\n\nCurrent JSX:\nfunction A(){}\n\nCurrent CSS:\n.a{}"
    );
}

#[test]
fn form_messages_are_system_then_user() {
    let out = build_form_messages(&GenerationConfig::default(), "a card", None).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].role, Role::System);
    assert_eq!(out[1], Message::user("Create new component with: \"a card\""));
}

#[test]
fn form_messages_reject_blank_prompt() {
    assert_eq!(build_form_messages(&GenerationConfig::default(), "", None), Err(PromptError::EmptyPrompt));
}

#[test]
fn quick_actions_are_non_empty() {
    assert_eq!(QUICK_ACTIONS.len(), 3);
    assert!(QUICK_ACTIONS.iter().all(|a| !a.prompt.trim().is_empty()));
}
