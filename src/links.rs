/// Username normalization and redirect URL construction
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left untouched by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// What the interaction modal is asking the visitor to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Post,
    Profile,
}

impl TargetKind {
    /// Classify the value of the modal's copy-paste URL field.
    ///
    /// Post URLs end in the numeric status id (`/@alice/110000000000000001`),
    /// profile URLs end in the account name. A value whose last character is
    /// an ASCII digit ends in a digit run and therefore names a post.
    ///
    /// Examples:
    /// - https://example.social/@alice/1100 → Post
    /// - https://example.social/@alice → Profile
    /// - https://example.social/@r2d2x → Profile
    /// - "" → Profile
    pub fn classify(url_value: &str) -> TargetKind {
        if url_value.ends_with(|c: char| c.is_ascii_digit()) {
            TargetKind::Post
        } else {
            TargetKind::Profile
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TargetKind::Post => "View Post",
            TargetKind::Profile => "View Profile",
        }
    }
}

/// Strip a redundant `@{local_domain}` suffix.
///
/// Mastodon sometimes reports local accounts fully qualified
/// (https://github.com/mastodon/mastodon/issues/21469), which would produce
/// `/@bob@example.social` on the home instance itself.
pub fn normalize_username<'a>(user: &'a str, local_domain: &str) -> &'a str {
    if local_domain.is_empty() {
        return user;
    }

    user.strip_suffix(local_domain)
        .and_then(|rest| rest.strip_suffix('@'))
        .unwrap_or(user)
}

/// Percent-encode with `encodeURIComponent` semantics
pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

pub fn profile_url(web_domain: &str, user: &str) -> String {
    format!("https://{}/@{}", web_domain, user)
}

/// Same-site endpoint that resolves a remote post (or account) on the home instance
pub fn authorize_interaction_url(web_domain: &str, target: &str) -> String {
    format!(
        "https://{}/authorize_interaction?uri={}",
        web_domain,
        encode_uri_component(target)
    )
}

/// The anchor inserted into the interaction modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewButton {
    pub label: String,
    pub href: String,
}

impl ViewButton {
    /// Build the control for a target. `user` must already be normalized.
    pub fn for_target(kind: TargetKind, web_domain: &str, user: &str, url_value: &str) -> ViewButton {
        let href = match kind {
            TargetKind::Post => authorize_interaction_url(web_domain, url_value),
            TargetKind::Profile => profile_url(web_domain, user),
        };

        ViewButton {
            label: kind.label().to_string(),
            href,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_local_suffix() {
        assert_eq!(normalize_username("bob@example.social", "example.social"), "bob");
    }

    #[test]
    fn test_normalize_keeps_other_domains() {
        assert_eq!(normalize_username("bob@other.social", "example.social"), "bob@other.social");
        assert_eq!(normalize_username("bob", "example.social"), "bob");
    }

    #[test]
    fn test_normalize_requires_at_separator() {
        // "myexample.social" ends with "example.social" but not "@example.social"
        assert_eq!(normalize_username("bob@myexample.social", "example.social"), "bob@myexample.social");
        assert_eq!(normalize_username("bobexample.social", "example.social"), "bobexample.social");
    }

    #[test]
    fn test_normalize_strips_only_once() {
        assert_eq!(
            normalize_username("bob@example.social@example.social", "example.social"),
            "bob@example.social"
        );
    }

    #[test]
    fn test_normalize_with_empty_local_domain() {
        assert_eq!(normalize_username("bob@", ""), "bob@");
    }

    #[test]
    fn test_classify_post() {
        assert_eq!(TargetKind::classify("https://example.social/@alice/110000000000000001"), TargetKind::Post);
        assert_eq!(TargetKind::classify("abc7"), TargetKind::Post);
        assert_eq!(TargetKind::classify("42"), TargetKind::Post);
    }

    #[test]
    fn test_classify_profile() {
        assert_eq!(TargetKind::classify("https://remote.example/@bob"), TargetKind::Profile);
        assert_eq!(TargetKind::classify("https://remote.example/@r2d2/x"), TargetKind::Profile);
        assert_eq!(TargetKind::classify(""), TargetKind::Profile);
    }

    #[test]
    fn test_classify_ignores_non_ascii_digits() {
        assert_eq!(TargetKind::classify("https://remote.example/@bob٣"), TargetKind::Profile);
    }

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(
            encode_uri_component("https://example.social/@alice/1"),
            "https%3A%2F%2Fexample.social%2F%40alice%2F1"
        );
        assert_eq!(encode_uri_component("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(encode_uri_component("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }

    #[test]
    fn test_profile_url() {
        assert_eq!(profile_url("example.social", "bob"), "https://example.social/@bob");
    }

    #[test]
    fn test_view_button_for_post() {
        let button = ViewButton::for_target(
            TargetKind::Post,
            "example.social",
            "alice",
            "https://example.social/@alice/110000000000000001",
        );

        assert_eq!(button.label, "View Post");
        assert_eq!(
            button.href,
            "https://example.social/authorize_interaction?uri=https%3A%2F%2Fexample.social%2F%40alice%2F110000000000000001"
        );
    }

    #[test]
    fn test_view_button_for_profile() {
        let button = ViewButton::for_target(TargetKind::Profile, "example.social", "bob", "https://remote.example/@bob");

        assert_eq!(button.label, "View Profile");
        assert_eq!(button.href, "https://example.social/@bob");
    }
}
