// Access guard decision table

use gallery_proxy::access::{evaluate, is_allowed, AllowList, CandidateSource, OriginHeaders};
use rstest::rstest;

fn production_list() -> AllowList {
    AllowList::from_patterns(&[
        "https://gallery.example.com",
        "https://*.vercel.app",
        "http://localhost:3000",
        "photos.example.org",
    ])
}

#[rstest]
#[case::exact_origin(Some("https://gallery.example.com"), None, true)]
#[case::exact_origin_trailing_slash(Some("https://gallery.example.com/"), None, true)]
#[case::uppercase_origin(Some("HTTPS://Gallery.Example.COM"), None, true)]
#[case::wrong_scheme(Some("http://gallery.example.com"), None, false)]
#[case::suffix_attack(Some("https://gallery.example.com.evil.net"), None, false)]
#[case::prefix_attack(Some("https://evilgallery.example.com"), None, false)]
#[case::vercel_preview(Some("https://my-app-abc123.vercel.app"), None, true)]
#[case::vercel_apex(Some("https://vercel.app"), None, false)]
#[case::vercel_http(Some("http://my-app.vercel.app"), None, false)]
#[case::localhost(Some("http://localhost:3000"), None, true)]
#[case::localhost_other_port(Some("http://localhost:3001"), None, false)]
#[case::host_only_entry_any_scheme(Some("http://photos.example.org"), None, true)]
#[case::host_fallback(None, Some("gallery.example.com"), true)]
#[case::host_fallback_wildcard(None, Some("preview.vercel.app"), true)]
#[case::host_fallback_with_port(None, Some("localhost:3000"), true)]
#[case::host_fallback_default_port(None, Some("gallery.example.com:443"), true)]
#[case::host_fallback_wrong_port(None, Some("localhost:3001"), false)]
#[case::host_fallback_unknown(None, Some("evil.example.net"), false)]
#[case::origin_wins_over_host(Some("https://evil.example.net"), Some("gallery.example.com"), false)]
#[case::nothing(None, None, false)]
#[case::empty_origin_uses_host(Some(""), Some("gallery.example.com"), true)]
fn test_guard_decision_table(
    #[case] origin: Option<&str>,
    #[case] host: Option<&str>,
    #[case] expected: bool,
) {
    assert_eq!(
        is_allowed(origin, host, &production_list()),
        expected,
        "origin={:?} host={:?}",
        origin,
        host
    );
}

#[rstest]
#[case("https://gallery.example.com/albums/1", true)]
#[case("https://gallery.example.com?ref=x", true)]
#[case("https://gallery.example.com.evil.net/albums/1", false)]
#[case("https://evil.example.net/https://gallery.example.com", false)]
fn test_referer_candidates(#[case] referer: &str, #[case] expected: bool) {
    let headers = OriginHeaders {
        origin: None,
        referer: Some(referer),
        host: None,
    };
    let decision = evaluate(headers, &production_list());
    assert_eq!(decision.allowed, expected, "referer={}", referer);
    assert_eq!(decision.source, CandidateSource::Referer);
}

#[test]
fn test_denied_decision_lists_every_check() {
    let headers = OriginHeaders {
        origin: Some("https://evil.example.net"),
        referer: None,
        host: None,
    };
    let decision = evaluate(headers, &production_list());

    assert!(!decision.allowed);
    assert_eq!(decision.checks.len(), 4);
    assert!(decision.checks.iter().all(|c| !c.matched));
    assert!(decision.matched_entry.is_none());
    assert!(decision.allowed_origin().is_none());
}
