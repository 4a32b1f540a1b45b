//! Theme engine
//!
//! Tera templates for every page. A default set is compiled into the
//! binary; any `.html` file found under the configured templates directory
//! replaces the bundled template of the same relative name (or adds a new
//! one), so a site can restyle single pages without shipping all of them.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fs;
use std::path::Path;
use tera::{Context as TeraContext, Tera};

mod error;

pub use error::ThemeError;

/// Templates compiled into the binary, keyed by template name
const BUNDLED_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("error.html", include_str!("../../templates/error.html")),
    ("home.html", include_str!("../../templates/home.html")),
    (
        "blog/list_base.html",
        include_str!("../../templates/blog/list_base.html"),
    ),
    (
        "blog/blog_list.html",
        include_str!("../../templates/blog/blog_list.html"),
    ),
    (
        "blog/blogs_with_type.html",
        include_str!("../../templates/blog/blogs_with_type.html"),
    ),
    (
        "blog/blogs_with_date.html",
        include_str!("../../templates/blog/blogs_with_date.html"),
    ),
    (
        "blog/blog_detail.html",
        include_str!("../../templates/blog/blog_detail.html"),
    ),
];

pub struct ThemeEngine {
    tera: Tera,
}

impl ThemeEngine {
    /// Load the bundled templates plus any overrides under `templates_path`.
    ///
    /// A missing directory is not an error; the bundled set is used as is.
    pub fn new(templates_path: &Path) -> Result<Self, ThemeError> {
        Ok(Self {
            tera: load_templates(templates_path)?,
        })
    }

    /// Only the bundled templates
    pub fn bundled() -> Result<Self, ThemeError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUNDLED_TEMPLATES.iter().copied())
            .map_err(|e| template_error("Failed to load bundled templates", &e))?;
        Ok(Self { tera })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render a template; the error message includes Tera's cause chain
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String, ThemeError> {
        self.tera
            .render(template, context)
            .map_err(|e| template_error(&format!("Failed to render '{}'", template), &e))
    }

    /// Render `error.html` for an HTTP error status, falling back to a plain
    /// HTML page when the error template itself fails
    pub fn render_error_page(&self, status_code: u16, title: &str, message: &str) -> String {
        let mut context = TeraContext::new();
        context.insert("status_code", &status_code);
        context.insert("error_title", title);
        context.insert("error_message", message);

        match self.render("error.html", &context) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(
                    "Failed to render error template: {}, returning simple HTML error page",
                    e
                );
                simple_error_page(status_code, title, message)
            }
        }
    }
}

/// Bundled templates overlaid with the `.html` files under `templates_path`
fn load_templates(templates_path: &Path) -> Result<Tera, ThemeError> {
    let mut templates: BTreeMap<String, String> = BUNDLED_TEMPLATES
        .iter()
        .map(|(name, content)| (name.to_string(), content.to_string()))
        .collect();

    let mut overrides = Vec::new();
    collect_templates_from_dir(templates_path, templates_path, &mut overrides)?;
    for (name, content) in overrides {
        tracing::debug!("Using template override: {}", name);
        templates.insert(name, content);
    }

    let mut tera = Tera::default();
    // add_raw_templates resolves inheritance once every template is known
    tera.add_raw_templates(templates)
        .map_err(|e| template_error("Failed to load templates", &e))?;
    Ok(tera)
}

fn collect_templates_from_dir(
    base_path: &Path,
    current_path: &Path,
    templates: &mut Vec<(String, String)>,
) -> Result<(), ThemeError> {
    if !current_path.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(current_path)? {
        let path = entry?.path();

        if path.is_dir() {
            collect_templates_from_dir(base_path, &path, templates)?;
        } else if path.extension().is_some_and(|ext| ext == "html") {
            let relative_path = path.strip_prefix(base_path).map_err(|_| {
                ThemeError::TemplateError(format!("Template outside of {:?}: {:?}", base_path, path))
            })?;
            let name = relative_path.to_string_lossy().replace('\\', "/");
            templates.push((name, fs::read_to_string(&path)?));
        }
    }

    Ok(())
}

fn template_error(prefix: &str, error: &tera::Error) -> ThemeError {
    let mut message = format!("{}: {}", prefix, error);
    let mut source = error.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    ThemeError::TemplateError(message)
}

/// Last-resort error page that needs no templates
fn simple_error_page(status_code: u16, title: &str, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{status_code} {title}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 600px;
            margin: 50px auto;
            padding: 20px;
            background: #f5f5f5;
        }}
        .error-box {{
            background: white;
            border-left: 4px solid #e74c3c;
            padding: 20px;
            border-radius: 4px;
        }}
        h1 {{ color: #e74c3c; margin-top: 0; }}
    </style>
</head>
<body>
    <div class="error-box">
        <h1>{status_code} {title}</h1>
        <p>{message}</p>
    </div>
</body>
</html>"#,
        status_code = status_code,
        title = tera::escape_html(title),
        message = tera::escape_html(message),
    )
}

#[cfg(test)]
mod tests;
