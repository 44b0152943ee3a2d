//! Generation presets: target framework, styling method and extra artifacts.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Named bundle selecting framework conventions for generated code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Preset {
    #[default]
    React,
    Mui,
    Vue,
}

impl Preset {
    /// Framework name used in instructions.
    #[must_use]
    pub fn framework(self) -> &'static str {
        match self {
            Self::React => "React",
            Self::Mui => "Material-UI",
            Self::Vue => "Vue",
        }
    }

    /// Version guidance used in instructions.
    #[must_use]
    pub fn best_practices(self) -> &'static str {
        match self {
            Self::React => "React 18+",
            Self::Mui => "Material-UI v5+",
            Self::Vue => "Vue 3 Composition API",
        }
    }

    /// Fence tag the model is asked to use for markup.
    #[must_use]
    pub fn markup_tag(self) -> &'static str {
        match self {
            Self::React | Self::Mui => "jsx",
            Self::Vue => "vue",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::React => "REACT",
            Self::Mui => "MUI",
            Self::Vue => "VUE",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REACT" => Ok(Self::React),
            "MUI" => Ok(Self::Mui),
            "VUE" => Ok(Self::Vue),
            other => Err(format!("unknown preset '{other}' (expected REACT, MUI or VUE)")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleMethod {
    #[default]
    #[serde(rename = "CSS Modules")]
    CssModules,
    #[serde(rename = "Tailwind")]
    Tailwind,
    #[serde(rename = "Styled Components")]
    StyledComponents,
}

impl StyleMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CssModules => "CSS Modules",
            Self::Tailwind => "Tailwind",
            Self::StyledComponents => "Styled Components",
        }
    }
}

impl fmt::Display for StyleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleMethod {
    type Err = String;

    /// Accepts display names and kebab forms (`css-modules`, `tailwind`,
    /// `styled-components`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "cssmodules" | "css" => Ok(Self::CssModules),
            "tailwind" | "tailwindcss" => Ok(Self::Tailwind),
            "styledcomponents" | "styled" => Ok(Self::StyledComponents),
            _ => Err(format!("unknown style method '{}'", s.trim())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    TypeScript,
    Tests,
    Storybook,
}

impl Feature {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Tests => "tests",
            Self::Storybook => "storybook",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "typescript" | "ts" => Ok(Self::TypeScript),
            "tests" | "test" => Ok(Self::Tests),
            "storybook" | "stories" => Ok(Self::Storybook),
            other => Err(format!("unknown feature '{other}' (expected typescript, tests or storybook)")),
        }
    }
}

/// Options chosen on the generator form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub preset: Preset,
    pub style_method: StyleMethod,
    pub features: BTreeSet<Feature>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            preset: Preset::React,
            style_method: StyleMethod::CssModules,
            features: BTreeSet::from([Feature::TypeScript]),
        }
    }
}

impl GenerationConfig {
    #[must_use]
    pub fn wants(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
