use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn plugin_dir_with(images: &[(&str, &[u8])]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let img = dir.path().join("static").join("img");
    std::fs::create_dir_all(&img).unwrap();
    for (name, bytes) in images {
        std::fs::write(img.join(name), bytes).unwrap();
    }
    dir
}

#[test]
fn test_data_uri() {
    assert_eq!(data_uri("image/png", b"abc"), "data:image/png;base64,YWJj");
}

#[test]
fn test_protocol_relative_cover() {
    assert_eq!(
        absolute_cover_url("//avatars.yandex.net/a/200x200"),
        "https://avatars.yandex.net/a/200x200"
    );
    assert_eq!(absolute_cover_url("http://x/y"), "http://x/y");
}

#[test]
fn test_cover_cache_evicts_oldest() {
    let mut cache = CoverCache::new(2);
    cache.put("a".into(), "1".into());
    cache.put("b".into(), "2".into());
    assert_eq!(cache.get("a").as_deref(), Some("1"));
    cache.put("c".into(), "3".into());
    assert!(cache.get("b").is_none());
    assert!(cache.get("a").is_some());
    assert!(cache.get("c").is_some());
}

#[tokio::test]
async fn test_static_image_is_read_and_cached() {
    let dir = plugin_dir_with(&[("btn.png", b"abc")]);
    let assets = Assets::new(dir.path());

    let uri = assets.static_image("btn.png").await.unwrap();
    assert_eq!(uri, "data:image/png;base64,YWJj");

    std::fs::remove_file(assets.image_dir().join("btn.png")).unwrap();
    assert_eq!(assets.static_image("btn.png").await.unwrap(), uri);
}

#[tokio::test]
async fn test_missing_static_image() {
    let dir = plugin_dir_with(&[]);
    let assets = Assets::new(dir.path());
    assert!(matches!(
        assets.static_image("nope.png").await,
        Err(PluginError::Asset(_))
    ));
    assert!(matches!(
        assets.static_image("../secret.png").await,
        Err(PluginError::Asset(_))
    ));
}

#[tokio::test]
async fn test_cover_downloaded_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cover/200x200"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/webp")
                .set_body_bytes(b"img".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = plugin_dir_with(&[]);
    let assets = Assets::new(dir.path());
    let url = format!("{}/cover/200x200", server.uri());

    let first = assets.cover(&url).await.unwrap();
    assert_eq!(first, "data:image/webp;base64,aW1n");
    assert_eq!(assets.cover(&url).await.unwrap(), first);
}

#[tokio::test]
async fn test_cover_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = plugin_dir_with(&[]);
    let assets = Assets::new(dir.path());
    let result = assets.cover(&format!("{}/missing", server.uri())).await;
    assert!(matches!(result, Err(PluginError::Http(_))));
}
