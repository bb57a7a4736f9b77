//! Integration tests for the pool against real template directories.
//!
//! Modification times are pinned with `filetime` so staleness checks never
//! depend on filesystem timestamp granularity.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use platepool::{Delimiters, Pool, PoolConfig, PoolError};
use serde::Serialize;
use tempfile::TempDir;

/// Template file to create: (file name, contents).
type TemplateFile<'a> = (&'a str, &'a str);

fn create_test_dir(files: &[TemplateFile<'_>]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        write_file(dir.path(), name, contents);
    }
    dir
}

/// Write `content` and date it a minute in the past, so it reads as older than
/// any parse that follows.
fn write_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    set_mtime(&path, SystemTime::now() - Duration::from_secs(60));
}

fn set_mtime(path: &Path, at: SystemTime) {
    filetime::set_file_mtime(path, FileTime::from_system_time(at)).unwrap();
}

/// Rewrite a template and date it just after the template's last parse.
fn rewrite_after_parse(pool: &Pool, dir: &Path, name: &str, content: &str) {
    let parsed_at = pool.template(name).unwrap().parsed_at();
    let path = dir.join(format!("{name}.tmpl.html"));
    fs::write(&path, content).unwrap();
    set_mtime(&path, parsed_at + Duration::from_millis(10));
    // let the clock pass the new mtime so the reparse is not stale itself
    std::thread::sleep(Duration::from_millis(20));
}

#[derive(Serialize)]
struct Page {
    title: &'static str,
    body: &'static str,
    count: i32,
}

#[test]
fn test_register_string() {
    let mut pool = Pool::new("", false);
    pool.register_from_text(
        "test",
        "<html><head><title>{{ title }}</title></head><body>{{ body }}</body></html>",
        &Delimiters::standard(),
    )
    .unwrap();
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_render_string() {
    let mut pool = Pool::new("", false);
    pool.register_from_text(
        "test",
        "<html><head><title>{{ title }}</title></head><body>{{ body }}</body></html>",
        &Delimiters::standard(),
    )
    .unwrap();

    let data = serde_json::json!({ "title": "the title", "body": "the body" });
    let out = pool.render_no_layout_to_string("test", &data).unwrap();
    assert_eq!(
        out,
        "<html><head><title>the title</title></head><body>the body</body></html>"
    );
}

#[test]
fn test_render_string_with_helper() {
    let mut pool = Pool::new("", false);
    pool.register_from_text(
        "test",
        r#"<html><head><title>{{ title }}</title></head><body>{{ body }} {{ count }} {{ plural(word="example", count=count) }}</body></html>"#,
        &Delimiters::standard(),
    )
    .unwrap();

    let page = Page {
        title: "the title",
        body: "the body",
        count: 2,
    };
    let out = pool.render_no_layout_to_string("test", &page).unwrap();
    assert_eq!(
        out,
        "<html><head><title>the title</title></head><body>the body 2 examples</body></html>"
    );
}

#[test]
fn test_matches_direct_engine_output() {
    let source = "{% for item in items %}<li>{{ item }}</li>{% endfor %}";
    let mut pool = Pool::new("", false);
    pool.register_from_text("list", source, &Delimiters::standard())
        .unwrap();
    let data = serde_json::json!({ "items": ["a", "<b>", "c & d"] });

    let mut tera = tera::Tera::default();
    tera.autoescape_on(vec![""]);
    tera.add_raw_template("list", source).unwrap();
    let direct = tera
        .render("list", &tera::Context::from_value(data.clone()).unwrap())
        .unwrap();

    assert_eq!(pool.render_no_layout_to_string("list", &data).unwrap(), direct);
}

#[test]
fn test_simpleformat_escapes_in_templates() {
    let mut pool = Pool::new("", false);
    pool.register_from_text("post", "{{ text | simpleformat }}", &Delimiters::standard())
        .unwrap();
    let data = serde_json::json!({ "text": "hello <script>alert('message')</script>\n\nline 2\n" });

    assert_eq!(
        pool.render_no_layout_to_string("post", &data).unwrap(),
        "<p>hello &lt;script&gt;alert(&#x27;message&#x27;)&lt;&#x2F;script&gt;</p><p>line 2</p>"
    );
}

#[test]
fn test_register() {
    let dir = create_test_dir(&[("T0.tmpl.html", "T0 template")]);
    let mut pool = Pool::new(dir.path(), false);

    let before = pool.len();
    pool.register("T0", &Delimiters::standard()).unwrap();
    assert_eq!(pool.len() - before, 1);
    assert_eq!(
        pool.render_no_layout_to_string("T0", &()).unwrap(),
        "T0 template"
    );
}

#[test]
fn test_register_missing_file() {
    let dir = create_test_dir(&[]);
    let mut pool = Pool::new(dir.path(), false);

    let err = pool.register("T0", &Delimiters::standard()).unwrap_err();
    assert!(matches!(err, PoolError::ArtifactUnavailable { .. }));
    assert!(pool.is_empty());
}

#[test]
fn test_register_layout() {
    let dir = create_test_dir(&[
        ("header.tmpl.html", "header template"),
        ("footer.tmpl.html", "footer template"),
    ]);
    let mut pool = Pool::new(dir.path(), false);

    pool.register_layout("alayout", "header", "footer", &Delimiters::standard())
        .unwrap();
    assert_eq!(pool.layout_names(), vec!["alayout"]);
    let binding = pool.layout("alayout").unwrap();
    assert_eq!(binding.header(), "header");
    assert_eq!(binding.footer(), "footer");
    assert_eq!(pool.template_names(), vec!["footer", "header"]);
}

#[test]
fn test_render_layout() {
    let dir = create_test_dir(&[
        ("header.tmpl.html", "header template"),
        ("body.tmpl.html", "body template"),
        ("footer.tmpl.html", "footer template"),
    ]);
    let mut pool = Pool::new(dir.path(), false);
    pool.register_layout("alayout", "header", "footer", &Delimiters::standard())
        .unwrap();
    pool.register("body", &Delimiters::standard()).unwrap();

    assert_eq!(
        pool.render_to_string("alayout", "body", &()).unwrap(),
        "header templatebody templatefooter template"
    );
}

#[test]
fn test_render_layout_with_custom_delimiters() {
    let dir = create_test_dir(&[
        ("header.tmpl.html", "<h1><% title %></h1>"),
        ("footer.tmpl.html", "<footer>{{ not_a_var }}</footer>"),
        ("body.tmpl.html", "<p>[[ title ]]</p>"),
    ]);
    let mut pool = Pool::new(dir.path(), false);
    pool.register_layout("alayout", "header", "footer", &Delimiters::new("<%", "%>"))
        .unwrap();
    pool.register("body", &Delimiters::new("[[", "]]")).unwrap();

    let data = serde_json::json!({ "title": "Hi" });
    assert_eq!(
        pool.render_to_string("alayout", "body", &data).unwrap(),
        "<h1>Hi</h1><p>Hi</p><footer>{{ not_a_var }}</footer>"
    );
}

#[test]
fn test_render_multi() {
    let dir = create_test_dir(&[
        ("header.tmpl.html", "<header>"),
        ("footer.tmpl.html", "</footer>"),
        (
            "page.tmpl.html",
            r#"<main>{% include "sidebar.tmpl.html" %}</main>"#,
        ),
        ("sidebar.tmpl.html", "<aside>{{ title }}</aside>"),
    ]);
    let mut pool = Pool::new(dir.path(), false);
    pool.register_layout("alayout", "header", "footer", &Delimiters::standard())
        .unwrap();
    pool.register_multi_source("page", ["page", "sidebar"], &Delimiters::standard())
        .unwrap();

    let data = serde_json::json!({ "title": "nav" });
    assert_eq!(
        pool.render_to_string("alayout", "page", &data).unwrap(),
        "<header><main><aside>nav</aside></main></footer>"
    );
    assert_eq!(
        pool.render_fragment_to_string("alayout", "page", "sidebar", &data)
            .unwrap(),
        "<header><aside>nav</aside></footer>"
    );
}

#[test]
fn test_reload() {
    let dir = create_test_dir(&[("T0.tmpl.html", "T0 template")]);
    let mut pool = Pool::new(dir.path(), false);
    pool.register("T0", &Delimiters::standard()).unwrap();
    assert_eq!(
        pool.render_no_layout_to_string("T0", &()).unwrap(),
        "T0 template"
    );

    write_file(dir.path(), "T0.tmpl.html", "T0 template updated");
    pool.reload_template("T0").unwrap();
    assert_eq!(
        pool.render_no_layout_to_string("T0", &()).unwrap(),
        "T0 template updated"
    );
}

#[test]
fn test_auto_reload() {
    let dir = create_test_dir(&[("T0.tmpl.html", "T0 template")]);
    let mut pool = Pool::new(dir.path(), true);
    pool.register("T0", &Delimiters::standard()).unwrap();
    assert_eq!(
        pool.render_no_layout_to_string("T0", &()).unwrap(),
        "T0 template"
    );

    rewrite_after_parse(&pool, dir.path(), "T0", "T0 template updated");
    assert_eq!(
        pool.render_no_layout_to_string("T0", &()).unwrap(),
        "T0 template updated"
    );

    // make sure it isn't reparsed every request
    let before = pool.template("T0").unwrap().parsed_at();
    pool.render_no_layout_to_string("T0", &()).unwrap();
    assert_eq!(pool.template("T0").unwrap().parsed_at(), before);
}

#[test]
fn test_auto_reload_off() {
    let dir = create_test_dir(&[("T0.tmpl.html", "T0 template")]);
    let mut pool = Pool::new(dir.path(), false);
    pool.register("T0", &Delimiters::standard()).unwrap();
    assert_eq!(
        pool.render_no_layout_to_string("T0", &()).unwrap(),
        "T0 template"
    );

    rewrite_after_parse(&pool, dir.path(), "T0", "T0 template updated");
    assert_eq!(
        pool.render_no_layout_to_string("T0", &()).unwrap(),
        "T0 template"
    );
}

#[test]
fn test_auto_reload_keeps_last_good_version() {
    let dir = create_test_dir(&[("T0.tmpl.html", "T0 template")]);
    let mut pool = Pool::new(dir.path(), true);
    pool.register("T0", &Delimiters::standard()).unwrap();

    rewrite_after_parse(&pool, dir.path(), "T0", "{% if %}");
    assert_eq!(
        pool.render_no_layout_to_string("T0", &()).unwrap(),
        "T0 template"
    );
    assert!(matches!(
        pool.reload_template("T0"),
        Err(PoolError::Compile { .. })
    ));
}

#[test]
fn test_deleted_file_keeps_serving() {
    let dir = create_test_dir(&[("T0.tmpl.html", "T0 template")]);
    let mut pool = Pool::new(dir.path(), true);
    pool.register("T0", &Delimiters::standard()).unwrap();

    fs::remove_file(dir.path().join("T0.tmpl.html")).unwrap();
    assert_eq!(
        pool.render_no_layout_to_string("T0", &()).unwrap(),
        "T0 template"
    );
    assert!(matches!(
        pool.reload_template("T0"),
        Err(PoolError::ArtifactUnavailable { .. })
    ));
}

#[test]
fn test_pool_from_config_file() {
    let dir = create_test_dir(&[("index.html.tera", "<b>{{ name }}</b>")]);
    let config_path = dir.path().join("pool.toml");
    fs::write(
        &config_path,
        format!(
            "content-root = {:?}\nextension = \"html.tera\"\nautoescape = false\n",
            dir.path().display().to_string()
        ),
    )
    .unwrap();

    let config = PoolConfig::load(&config_path).unwrap();
    let mut pool = Pool::with_config(config);
    pool.register("index", &Delimiters::standard()).unwrap();

    let data = serde_json::json!({ "name": "<i>raw</i>" });
    assert_eq!(
        pool.render_no_layout_to_string("index", &data).unwrap(),
        "<b><i>raw</i></b>"
    );
}

#[test]
fn test_streaming_into_writer() {
    let dir = create_test_dir(&[
        ("header.tmpl.html", "H"),
        ("body.tmpl.html", "B"),
        ("footer.tmpl.html", "F"),
    ]);
    let mut pool = Pool::new(dir.path(), false);
    pool.register_layout("alayout", "header", "footer", &Delimiters::standard())
        .unwrap();
    pool.register("body", &Delimiters::standard()).unwrap();

    let mut buf = Vec::new();
    {
        let out: &mut dyn std::io::Write = &mut buf;
        pool.render("alayout", "body", &(), out).unwrap();
    }
    assert_eq!(String::from_utf8(buf).unwrap(), "HBF");

    let out_path = dir.path().join("out.html");
    let mut file = fs::File::create(&out_path).unwrap();
    pool.render("alayout", "body", &(), &mut file).unwrap();
    assert_eq!(fs::read_to_string(out_path).unwrap(), "HBF");
}
