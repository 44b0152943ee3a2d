use super::*;

#[test]
fn preset_parses_case_insensitively() {
    assert_eq!("react".parse::<Preset>().unwrap(), Preset::React);
    assert_eq!("MUI".parse::<Preset>().unwrap(), Preset::Mui);
    assert_eq!(" Vue ".parse::<Preset>().unwrap(), Preset::Vue);
    assert!("angular".parse::<Preset>().is_err());
}

#[test]
fn preset_markup_tags() {
    assert_eq!(Preset::React.markup_tag(), "jsx");
    assert_eq!(Preset::Mui.markup_tag(), "jsx");
    assert_eq!(Preset::Vue.markup_tag(), "vue");
}

#[test]
fn style_method_accepts_display_and_kebab_forms() {
    assert_eq!("CSS Modules".parse::<StyleMethod>().unwrap(), StyleMethod::CssModules);
    assert_eq!("css-modules".parse::<StyleMethod>().unwrap(), StyleMethod::CssModules);
    assert_eq!("Tailwind".parse::<StyleMethod>().unwrap(), StyleMethod::Tailwind);
    assert_eq!("styled-components".parse::<StyleMethod>().unwrap(), StyleMethod::StyledComponents);
    assert!("sass".parse::<StyleMethod>().is_err());
}

#[test]
fn style_method_serializes_display_name() {
    let json = serde_json::to_string(&StyleMethod::StyledComponents).unwrap();
    assert_eq!(json, "\"Styled Components\"");
}

#[test]
fn feature_parse_and_display_agree() {
    for feature in [Feature::TypeScript, Feature::Tests, Feature::Storybook] {
        assert_eq!(feature.to_string().parse::<Feature>().unwrap(), feature);
    }
}

#[test]
fn default_config_matches_generator_form() {
    let config = GenerationConfig::default();
    assert_eq!(config.preset, Preset::React);
    assert_eq!(config.style_method, StyleMethod::CssModules);
    assert!(config.wants(Feature::TypeScript));
    assert!(!config.wants(Feature::Tests));
    assert!(!config.wants(Feature::Storybook));
}
