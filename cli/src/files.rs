//! Mapping generated artifacts onto files on disk.

use std::path::{Path, PathBuf};

use compgen::api::ComponentRecord;
use compgen::generation::GenerationResponse;
use compgen::generation::config::{Feature, GenerationConfig, Preset, StyleMethod};

/// One file to write: name relative to the output dir, plus contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    pub name: String,
    pub contents: String,
}

fn markup_ext(preset: Preset, typescript: bool) -> &'static str {
    match (preset, typescript) {
        (Preset::Vue, _) => "vue",
        (_, true) => "tsx",
        (_, false) => "jsx",
    }
}

fn style_name(component: &str, method: StyleMethod) -> String {
    match method {
        StyleMethod::CssModules => format!("{component}.module.css"),
        StyleMethod::Tailwind | StyleMethod::StyledComponents => format!("{component}.css"),
    }
}

/// Safe file stem for a component name.
#[must_use]
pub fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if stem.trim_matches('_').is_empty() { "Component".to_string() } else { stem }
}

/// Files for a form generation. Empty style and absent tests/stories are skipped.
#[must_use]
pub fn generation_files(response: &GenerationResponse, config: &GenerationConfig) -> Vec<ArtifactFile> {
    let stem = file_stem(&response.component_name);
    let typescript = config.wants(Feature::TypeScript);
    let ext = markup_ext(config.preset, typescript);
    let test_ext = if typescript { "ts" } else { "js" };

    let mut files = vec![ArtifactFile { name: format!("{stem}.{ext}"), contents: response.markup.clone() }];
    if !response.style.trim().is_empty() {
        files.push(ArtifactFile { name: style_name(&stem, config.style_method), contents: response.style.clone() });
    }
    if let Some(tests) = &response.tests {
        files.push(ArtifactFile { name: format!("{stem}.test.{test_ext}"), contents: tests.clone() });
    }
    if let Some(story) = &response.story {
        files.push(ArtifactFile { name: format!("{stem}.stories.{test_ext}"), contents: story.clone() });
    }
    files
}

/// Files for a stored component.
#[must_use]
pub fn record_files(record: &ComponentRecord) -> Vec<ArtifactFile> {
    let stem = file_stem(&record.name);
    let mut files = vec![ArtifactFile { name: format!("{stem}.jsx"), contents: record.markup.clone() }];
    if !record.style.trim().is_empty() {
        files.push(ArtifactFile { name: format!("{stem}.css"), contents: record.style.clone() });
    }
    if let Some(tests) = record.tests.as_ref().filter(|t| !t.trim().is_empty()) {
        files.push(ArtifactFile { name: format!("{stem}.test.js"), contents: tests.clone() });
    }
    if let Some(story) = record.story.as_ref().filter(|s| !s.trim().is_empty()) {
        files.push(ArtifactFile { name: format!("{stem}.stories.js"), contents: story.clone() });
    }
    files
}

/// Write every file under `dir`, creating it first. Returns the written paths.
pub async fn write_all(dir: &Path, files: &[ArtifactFile]) -> std::io::Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir).await?;
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file.name);
        tokio::fs::write(&path, &file.contents).await?;
        tracing::debug!(path = %path.display(), bytes = file.contents.len(), "cli: wrote file");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
#[path = "files_test.rs"]
mod tests;
