// Hot reload tests
//
// A reload swaps the allow-list and upstream settings for new requests;
// an invalid file leaves the running configuration in place.

use super::test_harness::*;
use gallery_proxy::config::Config;
use gallery_proxy::proxy::GalleryProxy;
use gallery_proxy::reload::ConfigHandle;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn write_config(origin: &str, dataset: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "upstream:\n  project_id: abc123\n  dataset: {}\n\
         access:\n  allowed_origins:\n    - \"{}\"\n\
         watermark:\n  enabled: false\n",
        dataset, origin
    )
    .unwrap();
    file.flush().unwrap();
    file
}

fn rewrite(file: &NamedTempFile, contents: &str) {
    std::fs::write(file.path(), contents).unwrap();
}

#[tokio::test]
async fn test_reload_replaces_allow_list_for_new_requests() {
    let file = write_config(GALLERY_ORIGIN, "production");
    let handle = ConfigHandle::new(Config::from_file(file.path()).unwrap());
    let upstream = CountingUpstream::serving(solid_png(8, 8, [0, 0, 0, 255]), "image/png");

    let before = handle.current();
    let response = TestRequest::get("id=a.png")
        .origin("https://new.example.org")
        .send(&before, &upstream)
        .await;
    assert_eq!(response.status, 403);

    rewrite(
        &file,
        "upstream:\n  project_id: abc123\n  dataset: staging\n\
         access:\n  allowed_origins:\n    - \"https://new.example.org\"\n\
         watermark:\n  enabled: false\n",
    );
    assert_eq!(handle.reload(file.path()).unwrap(), 1);

    let after = handle.current();
    let response = TestRequest::get("id=a.png")
        .origin("https://new.example.org")
        .send(&after, &upstream)
        .await;
    assert_eq!(response.status, 200);
    assert_eq!(
        upstream.last_url().as_deref(),
        Some("https://cdn.sanity.io/images/abc123/staging/a.png")
    );

    // The snapshot taken before the reload still answers with the old rules
    let response = TestRequest::get("id=a.png")
        .origin(GALLERY_ORIGIN)
        .send(&before, &upstream)
        .await;
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_invalid_reload_keeps_serving_old_config() {
    let file = write_config(GALLERY_ORIGIN, "production");
    let handle = ConfigHandle::new(Config::from_file(file.path()).unwrap());
    let upstream = CountingUpstream::serving(solid_png(8, 8, [0, 0, 0, 255]), "image/png");

    rewrite(&file, "upstream: [not, a, map");
    assert!(handle.reload(file.path()).is_err());

    let current = handle.current();
    assert_eq!(current.config.generation, 0);
    let response = TestRequest::get("id=a.png")
        .origin(GALLERY_ORIGIN)
        .send(&current, &upstream)
        .await;
    assert_eq!(response.status, 200);
}

#[test]
fn test_proxy_with_reload_exposes_manager() {
    let file = write_config(GALLERY_ORIGIN, "production");
    let config = Config::from_file(file.path()).unwrap();
    let upstream = Arc::new(CountingUpstream::serving(
        solid_png(8, 8, [0, 0, 0, 255]),
        "image/png",
    ));

    let proxy = GalleryProxy::with_reload(
        config.clone(),
        file.path().to_path_buf(),
        upstream.clone(),
    );
    let manager = proxy.reload_manager().expect("reload manager configured");
    assert_eq!(manager.config_path(), &file.path().to_path_buf());
    assert!(!manager.is_reload_requested());

    rewrite(
        &file,
        "upstream:\n  project_id: other99\n\
         access:\n  allowed_origins:\n    - \"https://new.example.org\"\n",
    );
    assert_eq!(manager.reload_into(&proxy.config_handle()).unwrap(), 1);
    assert_eq!(
        proxy.config_handle().current().config.upstream.project_id,
        "other99"
    );

    let plain = GalleryProxy::new(config, upstream);
    assert!(plain.reload_manager().is_none());
}
