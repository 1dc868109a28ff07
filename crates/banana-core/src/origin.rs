//! Canonical origin resolution.
//!
//! Redirect and callback URLs (OAuth callback, checkout success page) must be
//! absolute, and the host the request arrived on is not always the host the
//! user should be sent back to: reverse proxies rewrite it, the hosting
//! platform injects preview hostnames, and local development often tunnels
//! through a public domain. [`resolve_origin`] reconciles all of that into a
//! single `scheme://host[:port]` string.
//!
//! The resolver never fails: malformed header or config values are discarded
//! after URL validation, and the worst case degrades to the request's own
//! origin.

use url::Url;

use crate::config::SiteConfig;

/// The subset of inbound headers that participate in origin resolution.
#[derive(Debug, Clone, Default)]
pub struct OriginHints {
    pub host: Option<String>,
    pub forwarded_host: Option<String>,
    pub forwarded_proto: Option<String>,
    pub origin: Option<String>,
    pub referer: Option<String>,
}

fn is_local_hostname(hostname: &str) -> bool {
    hostname == "localhost" || hostname == "127.0.0.1"
}

fn is_vercel_hostname(hostname: &str) -> bool {
    hostname == "vercel.app" || hostname.ends_with(".vercel.app")
}

/// Validate a candidate value as an absolute http(s) URL and reduce it to its
/// origin. Anything else (garbage, relative paths, other schemes) is `None`.
fn safe_origin(value: Option<&str>) -> Option<String> {
    let url = Url::parse(value?).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.origin().ascii_serialization()),
        _ => None,
    }
}

/// Proxies may fold multiple hops into one comma-separated header; only the
/// first (client-nearest) value counts.
fn first_header_value(value: Option<&str>) -> Option<String> {
    let first = value?.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

/// Resolve the external base origin for the given request.
///
/// `fallback_origin` plays the role of the request URL's own origin: the
/// server derives it from its bound address and it is used when no usable
/// host information arrives in headers.
pub fn resolve_origin(hints: &OriginHints, fallback_origin: &Url, site: &SiteConfig) -> String {
    let forwarded_proto = first_header_value(hints.forwarded_proto.as_deref());
    let forwarded_host = first_header_value(hints.forwarded_host.as_deref());
    let host = forwarded_host.or_else(|| hints.host.clone());

    let mut proto = forwarded_proto
        .clone()
        .unwrap_or_else(|| fallback_origin.scheme().to_string());

    // Behind a proxy that strips x-forwarded-proto, a production deployment
    // on a public hostname without an explicit port is terminating TLS.
    if forwarded_proto.is_none() {
        if let Some(h) = &host {
            let hostname = h.split(':').next().unwrap_or("");
            let has_explicit_port = h.contains(':');
            if !has_explicit_port && !is_local_hostname(hostname) && site.production {
                proto = "https".to_string();
            }
        }
    }

    let request_origin = match &host {
        Some(h) => format!("{}://{}", proto, h),
        None => fallback_origin.origin().ascii_serialization(),
    };

    // A host header we cannot parse would poison every comparison below;
    // degrade to the request's own origin instead.
    let (request_url, request_origin) = match Url::parse(&request_origin) {
        Ok(u) if u.host_str().is_some() => (u, request_origin),
        _ => (
            fallback_origin.clone(),
            fallback_origin.origin().ascii_serialization(),
        ),
    };

    let configured_origin = safe_origin(site.site_url.as_deref())
        .or_else(|| safe_origin(site.public_site_url.as_deref()))
        .or_else(|| {
            let derived = site.vercel_url.as_ref().map(|v| format!("https://{}", v));
            safe_origin(derived.as_deref())
        });

    let header_origin = safe_origin(first_header_value(hints.origin.as_deref()).as_deref())
        .or_else(|| safe_origin(first_header_value(hints.referer.as_deref()).as_deref()));

    let request_host = request_url.host_str().unwrap_or("").to_string();
    let configured_host = configured_origin
        .as_deref()
        .and_then(|o| Url::parse(o).ok())
        .and_then(|u| u.host_str().map(str::to_string));
    let header_host = header_origin
        .as_deref()
        .and_then(|o| Url::parse(o).ok())
        .and_then(|u| u.host_str().map(str::to_string));

    let header_is_public = header_host.as_deref().is_some_and(|h| !is_local_hostname(h));

    let Some(configured) = configured_origin else {
        // No canonical site configured. A public origin/referer beats a
        // loopback request host (local dev tunneled through a public domain).
        if is_local_hostname(&request_host) && header_is_public {
            return header_origin.unwrap_or(request_origin);
        }
        return request_origin;
    };

    let configured_host = configured_host.unwrap_or_default();

    if is_vercel_hostname(&request_host) && !is_vercel_hostname(&configured_host) {
        return configured;
    }
    if is_local_hostname(&request_host) && !is_local_hostname(&configured_host) {
        return configured;
    }
    if is_local_hostname(&request_host) && header_is_public {
        return header_origin.unwrap_or(request_origin);
    }
    if request_host == configured_host {
        let configured_scheme = Url::parse(&configured)
            .map(|u| u.scheme().to_string())
            .unwrap_or_default();
        if request_url.scheme() != configured_scheme {
            return configured;
        }
    }

    request_origin
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback() -> Url {
        Url::parse("http://127.0.0.1:3000").unwrap()
    }

    fn site() -> SiteConfig {
        SiteConfig::default()
    }

    fn hints(host: &str) -> OriginHints {
        OriginHints {
            host: Some(host.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn no_headers_falls_back_to_request_url_origin() {
        let origin = resolve_origin(&OriginHints::default(), &fallback(), &site());
        assert_eq!(origin, "http://127.0.0.1:3000");
    }

    #[test]
    fn host_header_without_forwarding_uses_fallback_scheme() {
        let origin = resolve_origin(&hints("localhost:3000"), &fallback(), &site());
        assert_eq!(origin, "http://localhost:3000");
    }

    #[test]
    fn forwarded_headers_take_precedence_over_host() {
        let h = OriginHints {
            host: Some("internal:8080".to_string()),
            forwarded_host: Some("app.example.com".to_string()),
            forwarded_proto: Some("https".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_origin(&h, &fallback(), &site()), "https://app.example.com");
    }

    #[test]
    fn only_first_comma_separated_forwarded_value_is_used() {
        let h = OriginHints {
            forwarded_host: Some("edge.example.com, inner.example.com".to_string()),
            forwarded_proto: Some("https, http".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_origin(&h, &fallback(), &site()), "https://edge.example.com");
    }

    #[test]
    fn production_infers_https_for_public_host_without_port() {
        let site = SiteConfig {
            production: true,
            ..Default::default()
        };
        assert_eq!(
            resolve_origin(&hints("app.example.com"), &fallback(), &site),
            "https://app.example.com"
        );
        // Explicit port suppresses the upgrade.
        assert_eq!(
            resolve_origin(&hints("app.example.com:8080"), &fallback(), &site),
            "http://app.example.com:8080"
        );
    }

    #[test]
    fn local_host_with_public_referer_prefers_referer() {
        let h = OriginHints {
            host: Some("localhost:3000".to_string()),
            referer: Some("https://public.example.com/x".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_origin(&h, &fallback(), &site()), "https://public.example.com");
    }

    #[test]
    fn invalid_configured_site_url_is_ignored() {
        let site = SiteConfig {
            site_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_origin(&hints("localhost:3000"), &fallback(), &site),
            "http://localhost:3000"
        );
    }

    #[test]
    fn non_http_configured_scheme_is_ignored() {
        let site = SiteConfig {
            site_url: Some("ftp://files.example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_origin(&hints("localhost:3000"), &fallback(), &site),
            "http://localhost:3000"
        );
    }

    #[test]
    fn configured_origin_wins_over_local_request_host() {
        let site = SiteConfig {
            site_url: Some("https://bananastudio.app".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_origin(&hints("localhost:3000"), &fallback(), &site),
            "https://bananastudio.app"
        );
    }

    #[test]
    fn configured_origin_wins_over_preview_hostname() {
        let site = SiteConfig {
            site_url: Some("https://bananastudio.app".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_origin(&hints("my-branch-abc123.vercel.app"), &fallback(), &site),
            "https://bananastudio.app"
        );
    }

    #[test]
    fn preview_request_keeps_its_origin_when_configured_is_also_preview() {
        let site = SiteConfig {
            site_url: Some("https://canary.vercel.app".to_string()),
            production: true,
            ..Default::default()
        };
        assert_eq!(
            resolve_origin(&hints("my-branch.vercel.app"), &fallback(), &site),
            "https://my-branch.vercel.app"
        );
    }

    #[test]
    fn configured_scheme_wins_on_host_match_with_protocol_mismatch() {
        let site = SiteConfig {
            site_url: Some("https://bananastudio.app".to_string()),
            ..Default::default()
        };
        let h = OriginHints {
            host: Some("bananastudio.app".to_string()),
            forwarded_proto: Some("http".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_origin(&h, &fallback(), &site), "https://bananastudio.app");
    }

    #[test]
    fn matching_host_and_scheme_keeps_request_origin() {
        let site = SiteConfig {
            site_url: Some("https://bananastudio.app".to_string()),
            ..Default::default()
        };
        let h = OriginHints {
            host: Some("bananastudio.app".to_string()),
            forwarded_proto: Some("https".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_origin(&h, &fallback(), &site), "https://bananastudio.app");
    }

    #[test]
    fn vercel_url_derives_configured_origin_when_site_url_missing() {
        let site = SiteConfig {
            vercel_url: Some("deploy-abc.vercel.app".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_origin(&hints("localhost:3000"), &fallback(), &site),
            "https://deploy-abc.vercel.app"
        );
    }

    #[test]
    fn malformed_origin_header_is_discarded() {
        let h = OriginHints {
            host: Some("localhost:3000".to_string()),
            origin: Some("null".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_origin(&h, &fallback(), &site()), "http://localhost:3000");
    }

    #[test]
    fn unparseable_host_header_degrades_to_fallback() {
        let h = OriginHints {
            host: Some("not a host".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_origin(&h, &fallback(), &site()), "http://127.0.0.1:3000");
    }
}
