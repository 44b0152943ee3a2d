//! Sandboxed live preview.
//!
//! DESIGN
//! ======
//! [`PreviewDocument::render`] turns generated markup/style into a standalone
//! HTML document that mounts the component into `#root`. The document is
//! meant to run inside an iframe carrying [`SANDBOX`]; [`PreviewDocument::host_page`]
//! produces that wrapper with the document inlined as `srcdoc`.
//!
//! Render failures inside the frame are painted into `#root` in red instead
//! of leaving a blank frame.

use crate::generation::config::Preset;
use crate::validate::defined_component;

/// iframe `sandbox` attribute for previews: scripts run, nothing else.
pub const SANDBOX: &str = "allow-scripts";

const REACT_UMD: &str = "https://unpkg.com/react@18/umd/react.development.js";
const REACT_DOM_UMD: &str = "https://unpkg.com/react-dom@18/umd/react-dom.development.js";
const BABEL_STANDALONE: &str = "https://unpkg.com/@babel/standalone/babel.min.js";
const MUI_UMD: &str = "https://unpkg.com/@mui/material@5/umd/material-ui.development.js";
const VUE_GLOBAL: &str = "https://unpkg.com/vue@3/dist/vue.global.js";

const ERROR_STYLE: &str = "color: red; padding: 20px;";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    html: String,
}

impl PreviewDocument {
    /// Build the preview document for one component.
    #[must_use]
    pub fn render(markup: &str, style: &str, preset: Preset) -> Self {
        let style = neutralize(style, "</style");
        let (scripts, body) = match preset {
            Preset::React => (vec![REACT_UMD, REACT_DOM_UMD, BABEL_STANDALONE], react_mount(markup)),
            Preset::Mui => (vec![REACT_UMD, REACT_DOM_UMD, MUI_UMD, BABEL_STANDALONE], react_mount(markup)),
            Preset::Vue => (vec![VUE_GLOBAL], vue_mount(markup)),
        };
        let script_type = if preset == Preset::Vue { "text/javascript" } else { "text/babel" };

        let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<style>\n{style}\n</style>\n</head>\n<body>\n<div id=\"root\"></div>\n"));
        for src in scripts {
            html.push_str(&format!("<script src=\"{src}\"></script>\n"));
        }
        html.push_str(&format!("<script>\n{}\n</script>\n", error_hook()));
        html.push_str(&format!("<script type=\"{script_type}\">\n{}\n</script>\n", neutralize(&body, "</script")));
        html.push_str("</body>\n</html>\n");
        Self { html }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.html
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.html
    }

    /// Host page embedding this document in a sandboxed iframe.
    #[must_use]
    pub fn host_page(&self, title: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body style=\"margin:0\">\n<iframe sandbox=\"{SANDBOX}\" style=\"border:0;width:100vw;height:100vh\" srcdoc=\"{}\"></iframe>\n</body>\n</html>\n",
            escape_attr(title),
            escape_attr(&self.html)
        )
    }
}

/// Break any `closing` tag sequence (case-insensitive) inside user code so it
/// cannot end the surrounding element early.
fn neutralize(code: &str, closing: &str) -> String {
    let lower = code.to_ascii_lowercase();
    let mut out = String::with_capacity(code.len());
    let mut last = 0;
    for (idx, _) in lower.match_indices(closing) {
        out.push_str(&code[last..idx]);
        out.push_str("<\\/");
        last = idx + 2;
    }
    out.push_str(&code[last..]);
    out
}

fn escape_attr(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// React/MUI: bind the default export to `Component` and mount it.
fn react_mount(markup: &str) -> String {
    let code = if markup.contains("export default") {
        markup.replacen("export default", "const Component =", 1)
    } else if let Some(name) = defined_component(markup) {
        format!("{markup}\nconst Component = {name};")
    } else {
        markup.to_string()
    };
    format!(
        "try {{\n{code}\nReactDOM.createRoot(document.getElementById('root')).render(React.createElement(Component));\n}} catch (error) {{\nshowPreviewError(error);\n}}"
    )
}

/// Vue: mount the single-file component's `<template>` body.
fn vue_mount(markup: &str) -> String {
    let template = markup
        .split_once("<template>")
        .and_then(|(_, rest)| rest.rsplit_once("</template>"))
        .map_or(markup, |(body, _)| body)
        .trim();
    let literal = serde_json::to_string(template).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        "try {{\nVue.createApp({{ template: {literal} }}).mount('#root');\n}} catch (error) {{\nshowPreviewError(error);\n}}"
    )
}

/// Runs before the component script. The window listener also reports
/// errors thrown outside the try block, such as transpiler syntax errors.
fn error_hook() -> String {
    format!(
        "function showPreviewError(error) {{\n  var root = document.getElementById('root');\n  var box = document.createElement('div');\n  box.setAttribute('style', '{ERROR_STYLE}');\n  box.textContent = 'Error: ' + (error && error.message ? error.message : error);\n  root.innerHTML = '';\n  root.appendChild(box);\n}}\nwindow.addEventListener('error', function (e) {{ showPreviewError(e.error || e.message); }});"
    )
}

#[cfg(test)]
#[path = "preview_test.rs"]
mod tests;
