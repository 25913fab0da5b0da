/// Page-surface contract: the Mastodon markup this extension reads and rewrites
use crate::links::ViewButton;

pub const APP_ROOT: &str = "#mastodon";
pub const MODAL_ROOT: &str = ".modal-root";

pub const OG_TYPE_META: &str = r#"meta[property="og:type"]"#;
pub const PROFILE_USERNAME_META: &str = r#"meta[property="profile:username"]"#;
pub const PROFILE_HEADER_NAME: &str = ".account__header .account__header__tabs__name small";
pub const MOVED_ACCOUNT_LINK: &str = ".moved-account-banner .button";
pub const DETAIL_AUTHOR: &str = ".detailed-status .display-name__account";

pub const ONE_COLUMN_MARKER: &str = ".interaction-modal__login";
pub const URL_INPUT: &str = r#".copypaste input[type="text"]"#;
pub const CHOICE_BOX: &str = ".interaction-modal__choices__choice";
pub const CHOICE_PARAGRAPH: &str = "p";
pub const CHOICE_HEADER: &str = "h3 span";

/// Class carried by the anchor we insert, used to find it again
pub const VIEW_BUTTON_CLASS: &str = "mastodon-redirector__view";
pub const VIEW_BUTTON_CLASSES: [&str; 3] = ["button", "button--block", VIEW_BUTTON_CLASS];

pub const FLAVOUR_MARKER: &str = "[class*=flavour-]";

/// Value of `og:type` on a single-post page
pub const ARTICLE_TYPE: &str = "article";

/// Identity of one interaction dialog container for as long as it stays in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialogId(pub u32);

/// Which structural markers the modal container currently shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutMarkers {
    pub one_column: bool,
    pub two_column: bool,
    pub has_text: bool,
}

/// Everything the modal watcher reads from the page in one notification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalSnapshot {
    pub markers: LayoutMarkers,
    /// The choice box enclosing the URL field
    pub dialog: Option<DialogId>,
    pub url_value: Option<String>,
    pub username: Option<String>,
    pub paragraph_text: Option<String>,
    pub header_text: Option<String>,
    /// A control inserted on an earlier pass, if still present
    pub view_button: Option<ViewButton>,
}

/// A single write against the dialog
#[derive(Debug, Clone, PartialEq)]
pub enum DomEdit {
    SetParagraphText(String),
    SetHeaderText(String),
    InsertViewButton(ViewButton),
    UpdateViewButton(ViewButton),
    RemoveParagraph,
}

/// Resolve the profile username: the meta tag first, then the header text.
///
/// Mastodon sometimes forgets to inject the meta tag, so the `@name` shown in
/// the profile header is the fallback. Empty values count as absent.
pub fn username_from(meta_content: Option<&str>, header_text: Option<&str>) -> Option<String> {
    non_empty(meta_content)
        .or_else(|| non_empty(header_text).map(strip_at))
        .filter(|user| !user.is_empty())
        .map(str::to_string)
}

/// Drop a leading `@` from a displayed account name
pub fn strip_at(text: &str) -> &str {
    text.strip_prefix('@').unwrap_or(text)
}

pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_prefers_meta_tag() {
        assert_eq!(username_from(Some("bob@example.social"), Some("@robert")), Some("bob@example.social".to_string()));
    }

    #[test]
    fn test_username_falls_back_to_header() {
        assert_eq!(username_from(None, Some("@alice")), Some("alice".to_string()));
        assert_eq!(username_from(Some(""), Some("@alice")), Some("alice".to_string()));
    }

    #[test]
    fn test_username_missing() {
        assert_eq!(username_from(None, None), None);
        assert_eq!(username_from(None, Some("@")), None);
        assert_eq!(username_from(Some("  "), Some("")), None);
    }

    #[test]
    fn test_strip_at() {
        assert_eq!(strip_at("@alice"), "alice");
        assert_eq!(strip_at("alice"), "alice");
        assert_eq!(strip_at("@alice@remote.example"), "alice@remote.example");
    }
}
