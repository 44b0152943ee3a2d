use super::*;
use crate::error::ErrorCode;

fn draft(name: &str, markup: &str) -> ComponentDraft {
    ComponentDraft { name: name.into(), markup: markup.into(), ..ComponentDraft::default() }
}

// =============================================================================
// validate_draft
// =============================================================================

#[test]
fn complete_draft_passes() {
    let d = draft("Btn", "export default function Btn(){return <button/>;}");
    assert_eq!(validate_draft(&d), Ok(()));
}

#[test]
fn name_is_required() {
    let err = validate_draft(&draft("  ", "export default function Btn(){return null}")).unwrap_err();
    assert_eq!(err, ValidationError::Required { field: "name" });
    assert_eq!(err.field(), "name");
    assert_eq!(err.to_string(), "name is required");
}

#[test]
fn prose_is_not_a_component() {
    let err = validate_draft(&draft("Btn", "Here is a nice button for you")).unwrap_err();
    assert_eq!(err, ValidationError::NotAComponent);
    assert_eq!(err.error_code(), "E_NOT_A_COMPONENT");
}

#[test]
fn function_without_return_is_rejected() {
    assert_eq!(check_component_markup("function Btn() { }"), Err(ValidationError::NotAComponent));
}

#[test]
fn arrow_and_class_components_pass() {
    assert_eq!(check_component_markup("const Card = () => <div/>;"), Ok(()));
    assert_eq!(check_component_markup("const Card = props => (<div/>);"), Ok(()));
    assert_eq!(check_component_markup("class Modal extends React.Component { render(){ return null } }"), Ok(()));
    assert_eq!(check_component_markup("<template><p/></template>"), Ok(()));
}

#[test]
fn missing_default_export() {
    let err = validate_draft(&draft("Btn", "function Btn(){return <button/>;}")).unwrap_err();
    assert_eq!(err, ValidationError::MissingDefaultExport);
    assert_eq!(err.to_string(), "Component must have default export");
}

// =============================================================================
// ensure_default_export
// =============================================================================

#[test]
fn default_export_appended_for_defined_component() {
    let out = ensure_default_export("function Btn(){return <button/>;}\n", "Ignored");
    assert_eq!(out, "function Btn(){return <button/>;}\n\nexport default Btn;\n");
    assert_eq!(validate_draft(&draft("Btn", &out)), Ok(()));
}

#[test]
fn default_export_falls_back_to_name() {
    let out = ensure_default_export("<template><p/></template>", "Widget");
    assert!(out.ends_with("export default Widget;\n"));
}

#[test]
fn default_export_left_alone() {
    let src = "export default function A(){return null}";
    assert_eq!(ensure_default_export(src, "A"), src);
    assert_eq!(ensure_default_export("plain text", "not a name"), "plain text");
}

#[test]
fn defined_component_names() {
    assert_eq!(defined_component("function helper(){} function Card(){return 1}").as_deref(), Some("Card"));
    assert_eq!(defined_component("const Modal = ({open}) => null").as_deref(), Some("Modal"));
    assert_eq!(defined_component("let x = 1;"), None);
}

// =============================================================================
// auth forms
// =============================================================================

#[test]
fn registration_rules() {
    let ok = Registration { name: "Ada".into(), email: "ada@example.com".into(), password: "secret".into() };
    assert_eq!(validate_registration(&ok), Ok(()));

    let short = Registration { password: "12345".into(), ..ok.clone() };
    assert_eq!(validate_registration(&short), Err(ValidationError::PasswordTooShort { min: 6 }));

    let bad_email = Registration { email: "ada".into(), ..ok.clone() };
    assert_eq!(validate_registration(&bad_email), Err(ValidationError::InvalidEmail));

    let no_name = Registration { name: String::new(), ..ok };
    assert_eq!(validate_registration(&no_name).unwrap_err().field(), "name");
}

#[test]
fn credentials_rules() {
    let ok = Credentials { email: "a@b.co".into(), password: "x".into() };
    assert_eq!(validate_credentials(&ok), Ok(()));
    let missing = Credentials { password: String::new(), ..ok };
    assert_eq!(validate_credentials(&missing), Err(ValidationError::Required { field: "password" }));
}

#[test]
fn credentials_reject_malformed_email() {
    let creds = Credentials { email: "not-an-email".into(), password: "secret1".into() };
    assert_eq!(validate_credentials(&creds), Err(ValidationError::InvalidEmail));
    let blank = Credentials { email: "  ".into(), password: "secret1".into() };
    assert_eq!(validate_credentials(&blank), Err(ValidationError::Required { field: "email" }));
}
