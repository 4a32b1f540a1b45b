//! Tests for the theme engine

use super::*;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn write_template(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn list_context() -> TeraContext {
    TeraContext::from_serialize(json!({
        "blogs": [{
            "id": 3,
            "title": "Ownership <explained>",
            "blog_type": { "id": 1, "type_name": "Rust" },
            "content": "<p>Borrowing rules</p>",
            "author": "admin",
            "created_time": "2024-01-05T12:00:00Z",
            "last_updated_time": "2024-01-05T12:00:00Z",
            "read_num": 4
        }],
        "page_of_blogs": {
            "number": 6, "num_pages": 20, "count": 140, "per_page": 7,
            "has_previous": true, "has_next": true,
            "previous_page_number": 5, "next_page_number": 7,
            "start_index": 36, "end_index": 42, "offset": 35, "limit": 7
        },
        "page_range": [1, "...", 4, 5, 6, 7, 8, "...", 20],
        "blog_types": [{ "id": 1, "type_name": "Rust", "blog_count": 140 }],
        "blog_dates": [{ "year": 2024, "month": 1, "blog_count": 140 }],
        "dates": ["01/03", "01/04", "01/05", "01/06", "01/07", "01/08", "01/09"],
        "read_nums": [1, 0, 0, 2, 0, 0, 9],
        "hot_blogs_for_7_days": [{ "id": 3, "title": "Ownership", "read_num_sum": 12 }],
        "get_30_days_hot_blogs": []
    }))
    .unwrap()
}

#[test]
fn test_bundled_templates_are_loaded() {
    let engine = ThemeEngine::bundled().unwrap();

    for (name, _) in BUNDLED_TEMPLATES {
        assert!(engine.has_template(name), "missing bundled template {}", name);
    }
}

#[test]
fn test_missing_directory_uses_bundled_templates() {
    let temp_dir = TempDir::new().unwrap();

    let engine = ThemeEngine::new(&temp_dir.path().join("does-not-exist")).unwrap();

    assert!(engine.has_template("blog/blog_list.html"));
}

#[test]
fn test_render_blog_list() {
    let engine = ThemeEngine::bundled().unwrap();

    let html = engine.render("blog/blog_list.html", &list_context()).unwrap();

    assert!(html.contains("Ownership &lt;explained&gt;"));
    assert!(html.contains(r#"<span class="active">6</span>"#));
    assert!(html.contains(r#"<a href="?page=20">20</a>"#));
    assert!(html.contains("<span>...</span>"));
    assert!(html.contains("2024年1月 (140)"));
    assert!(html.contains("2024-01-05"));
    assert!(html.contains("7天热门博客"));
}

#[test]
fn test_render_missing_variable_is_error() {
    let engine = ThemeEngine::bundled().unwrap();

    let result = engine.render("blog/blog_detail.html", &TeraContext::new());

    assert!(matches!(result, Err(ThemeError::TemplateError(msg)) if msg.contains("blog/blog_detail.html")));
}

#[test]
fn test_render_unknown_template_is_error() {
    let engine = ThemeEngine::bundled().unwrap();

    assert!(engine.render("nope.html", &TeraContext::new()).is_err());
}

#[test]
fn test_error_page_for_not_found() {
    let engine = ThemeEngine::bundled().unwrap();

    let html = engine.render_error_page(404, "Not Found", "Blog not found: 7");

    assert!(html.contains("404 Not Found"));
    assert!(html.contains("Blog not found: 7"));
    assert!(html.contains("返回首页"));
}

#[test]
fn test_override_replaces_bundled_template() {
    let temp_dir = TempDir::new().unwrap();
    write_template(
        temp_dir.path(),
        "blog/blogs_with_type.html",
        r#"{% extends "base.html" %}{% block main %}custom {{ blog_type.type_name }}{% endblock %}"#,
    );

    let engine = ThemeEngine::new(temp_dir.path()).unwrap();
    let mut context = TeraContext::new();
    context.insert("blog_type", &json!({ "id": 1, "type_name": "Rust" }));

    let html = engine.render("blog/blogs_with_type.html", &context).unwrap();
    assert!(html.contains("custom Rust"));
}

#[test]
fn test_override_can_add_templates() {
    let temp_dir = TempDir::new().unwrap();
    write_template(temp_dir.path(), "about.html", "about us");
    write_template(temp_dir.path(), "notes.txt", "ignored");

    let engine = ThemeEngine::new(temp_dir.path()).unwrap();

    assert_eq!(engine.render("about.html", &TeraContext::new()).unwrap(), "about us");
    assert!(!engine.has_template("notes.txt"));
}

#[test]
fn test_invalid_override_fails_to_load() {
    let temp_dir = TempDir::new().unwrap();
    write_template(temp_dir.path(), "home.html", "{% if %}");

    let result = ThemeEngine::new(temp_dir.path());

    assert!(matches!(result, Err(ThemeError::TemplateError(_))));
}

#[test]
fn test_broken_error_template_falls_back_to_plain_page() {
    let temp_dir = TempDir::new().unwrap();
    write_template(temp_dir.path(), "error.html", "{{ not_provided.field }}");
    let engine = ThemeEngine::new(temp_dir.path()).unwrap();

    let html = engine.render_error_page(404, "Not Found", "<script>");

    assert!(html.contains("<h1>404 Not Found</h1>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[test]
fn test_plain_error_page_escapes_like_templates() {
    let message = r#"it's "<b>" & more"#;

    let html = simple_error_page(500, "Internal Server Error", message);

    assert!(html.contains("it&#x27;s &quot;&lt;b&gt;&quot; &amp; more"));
    assert!(html.contains(&tera::escape_html(message)));
}
