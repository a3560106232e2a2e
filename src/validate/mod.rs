use chrono::NaiveDate;
use url::Url;

use crate::wire::Platform;

/// A URL is accepted when it parses and carries both a scheme and a host.
/// Purely syntactic; nothing is resolved or fetched.
pub fn validate_url(url: &str) -> bool {
    match Url::parse(url.trim()) {
        Ok(u) => !u.scheme().is_empty() && u.host_str().map_or(false, |h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Returns true if `url` is valid and its host is on the platform's allow-list.
///
/// Rules:
/// - Host comparison is case-insensitive.
/// - A single leading `www.` is ignored, so `www.twitter.com` matches `twitter.com`.
/// - Subdomains other than `www.` are not accepted (`m.x.com` is rejected).
pub fn validate_platform_url(url: &str, platform: Platform) -> bool {
    if !validate_url(url) {
        return false;
    }
    let Some(host) = host_of(url) else {
        return false;
    };
    let host = host.strip_prefix("www.").unwrap_or(&host);
    platform
        .allowed_hosts()
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(host))
}

/// The posting date may be today or later.
pub fn validate_post_date(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_without_scheme_or_host_are_rejected() {
        for bad in [
            "",
            "x.com/brand",
            "//x.com/brand",
            "https://",
            "mailto:someone@example.com",
            "not a url",
            "data:text/plain,hello",
        ] {
            assert!(!validate_url(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn well_formed_urls_are_accepted() {
        for good in [
            "https://x.com/brand",
            "http://example.com",
            "https://www.instagram.com/some.account/",
            "ftp://files.example.org/path/to",
            "https://shop.example.co.jp/items?id=3",
        ] {
            assert!(validate_url(good), "{good:?} should be accepted");
        }
    }

    #[test]
    fn x_hosts_are_allowed() {
        assert!(validate_platform_url("https://x.com/acct", Platform::X));
        assert!(validate_platform_url("https://www.twitter.com/acct", Platform::X));
        assert!(validate_platform_url("https://X.COM/acct", Platform::X));
        assert!(!validate_platform_url("https://facebook.com/acct", Platform::X));
        assert!(!validate_platform_url("https://m.x.com/acct", Platform::X));
        assert!(!validate_platform_url("x.com/acct", Platform::X));
    }

    #[test]
    fn other_platforms_use_their_own_hosts() {
        assert!(validate_platform_url("https://www.facebook.com/page", Platform::Facebook));
        assert!(validate_platform_url("https://instagram.com/me", Platform::Instagram));
        assert!(validate_platform_url("https://www.linkedin.com/company/acme", Platform::LinkedIn));
        assert!(!validate_platform_url("https://linkedin.com.evil.io/x", Platform::LinkedIn));
    }

    #[test]
    fn post_date_must_not_precede_today() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(validate_post_date(today, today));
        assert!(validate_post_date(today.succ_opt().unwrap(), today));
        assert!(!validate_post_date(today.pred_opt().unwrap(), today));
    }
}
