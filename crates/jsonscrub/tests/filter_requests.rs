#![expect(missing_docs)]

use core::fmt::Write;

use bytes::Bytes;
use http::{Request, header::CONTENT_TYPE};
use jsonscrub::{FilterConfig, FilterError, ScrubConfig, TextPolicy, XssFilter};

mod common;
use common::PROFILE_UPDATE;

fn render(request: &Request<Bytes>) -> String {
    let mut out = String::new();
    writeln!(out, "{} {}", request.method(), request.uri()).unwrap();
    for (name, value) in request.headers() {
        writeln!(out, "{name}: {}", value.to_str().unwrap()).unwrap();
    }
    writeln!(out, "{}", String::from_utf8_lossy(request.body())).unwrap();
    out
}

#[test]
fn snapshot_filtered_json_request() {
    let request = Request::put("/api/profile/%3Cb%3E42%3C%2Fb%3E?tab=%3Cscript%3Ex%3C%2Fscript%3Ebio&v=2")
        .header(CONTENT_TYPE, "application/json; charset=utf-8")
        .header("x-requested-with", "<i>app</i><script>x</script>")
        .body(Bytes::from_static(PROFILE_UPDATE.as_bytes()))
        .unwrap();
    let filtered = XssFilter::default().filter(request).unwrap();
    insta::assert_snapshot!(render(&filtered), @r#"
    PUT /api/profile/&lt;b&gt;42&lt;/b&gt;?tab=bio&v=2
    content-type: application/json; charset=utf-8
    x-requested-with: <i>app</i>
    content-length: 147
    {"user":{"name":"Ada Lovelace","bio":"I like <b>engines</b> &amp; <i>maths</i>","site":"<a>me</a>"},"tags":["math","<img>"],"age":36,"active":true}
    "#);
}

#[test]
fn escape_policy_escapes_instead_of_removing() {
    let config = ScrubConfig {
        filter: FilterConfig {
            text_policy: TextPolicy::Escape,
            ..Default::default()
        },
        ..Default::default()
    };
    let request = Request::get("/search?q=%3Cb%3E")
        .header("x-note", "<b>")
        .body(Bytes::new())
        .unwrap();
    let filtered = XssFilter::new(&config).filter(request).unwrap();
    assert_eq!(filtered.headers()["x-note"], "&amp;lt;b&amp;gt;");
    assert_eq!(
        filtered.uri().query(),
        Some("q=%26amp;lt;b%26amp;gt;")
    );
}

#[test]
fn default_exclusions_cover_api_docs() {
    let request = Request::get("/v3/api-docs/swagger-config?x=%3Cscript%3E")
        .body(Bytes::new())
        .unwrap();
    let filtered = XssFilter::default().filter(request).unwrap();
    assert_eq!(filtered.uri().query(), Some("x=%3Cscript%3E"));
}

#[test]
fn oversized_json_body_is_rejected() {
    let config = ScrubConfig {
        filter: FilterConfig {
            max_body_bytes: 16,
            ..Default::default()
        },
        ..Default::default()
    };
    let request = Request::post("/api/profile")
        .header(CONTENT_TYPE, "application/json")
        .body(Bytes::from_static(PROFILE_UPDATE.as_bytes()))
        .unwrap();
    let err = XssFilter::new(&config).filter(request).unwrap_err();
    assert!(matches!(err, FilterError::BodyTooLarge { limit: 16, .. }));
    assert!(err.to_string().contains("exceeds limit of 16 bytes"));
}

#[test]
fn snapshot_filtered_form_request() {
    let request = Request::post("/comments?draft=%3Cb%3E1%3C%2Fb%3E")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Bytes::from_static(
            b"author=Ada+Lovelace&%3Cscript%3Ex%3C%2Fscript%3Ebody=%3Cimg+src%3Dx+onerror%3Dalert(1)%3Enice&notify",
        ))
        .unwrap();
    let filtered = XssFilter::default().filter(request).unwrap();
    insta::assert_snapshot!(render(&filtered), @r"
    POST /comments?draft=%3Cb%3E1%3C/b%3E
    content-type: application/x-www-form-urlencoded
    content-length: 38
    author=Ada%20Lovelace&body=nice&notify
    ");
}
