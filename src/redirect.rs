/// Redirect-on-click: send the current tab to the home instance
use crate::error::{RedirectError, Result};
use crate::links::{authorize_interaction_url, normalize_username, profile_url};
use crate::page::{ARTICLE_TYPE, non_empty, strip_at};
use crate::settings::Settings;

/// The page inputs the redirect decision depends on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageFacts {
    pub href: String,
    pub host: String,
    pub og_type: Option<String>,
    pub moved_account_href: Option<String>,
    pub profile_username: Option<String>,
    pub profile_header_name: Option<String>,
    pub detail_author: Option<String>,
}

impl PageFacts {
    pub fn is_viewing_post(&self) -> bool {
        self.og_type.as_deref() == Some(ARTICLE_TYPE)
    }

    /// Account name to redirect to, in priority order:
    /// 1. the moved-account banner link (follow the account to its new home)
    /// 2. the profile page (meta tag, then header text)
    /// 3. the author of a post detail page
    ///
    /// Returns `None` on a profile page of the home instance itself.
    pub fn account_name(&self, local_domain: &str) -> Option<String> {
        if let Some(moved) = non_empty(self.moved_account_href.as_deref()) {
            return Some(moved_account_name(moved));
        }

        let from_profile = non_empty(self.profile_username.as_deref())
            .or_else(|| non_empty(self.profile_header_name.as_deref()).map(strip_at))
            .filter(|user| !user.is_empty());
        if let Some(user) = from_profile {
            if self.host == local_domain {
                return None;
            }
            return Some(user.to_string());
        }

        non_empty(self.detail_author.as_deref())
            .map(strip_at)
            .filter(|user| !user.is_empty())
            .map(str::to_string)
    }
}

/// Banner links look like `/@alice@new.example`, relative or absolute
fn moved_account_name(href: &str) -> String {
    let path = url::Url::parse(href)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_else(|_| href.to_string());

    path.strip_prefix("/@").unwrap_or(&path).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Post { target_url: String },
    Profile { target_url: String },
}

impl Redirect {
    pub fn target_url(&self) -> &str {
        match self {
            Redirect::Post { target_url } | Redirect::Profile { target_url } => target_url,
        }
    }
}

/// Decide where the current page should be sent.
///
/// `Ok(None)` means there is nothing to do (no account found, or already home).
pub fn plan_redirect(settings: &Settings, page: &PageFacts) -> Result<Option<Redirect>> {
    if !settings.is_configured() {
        return Err(RedirectError::NotConfigured);
    }

    let web_domain = settings.effective_web_domain();

    if page.is_viewing_post() {
        // authorize_interaction resolves the remote post on the home instance
        return Ok(Some(Redirect::Post {
            target_url: authorize_interaction_url(web_domain, &page.href),
        }));
    }

    Ok(page.account_name(&settings.local_domain).map(|user| {
        let user = normalize_username(&user, &settings.local_domain);
        Redirect::Profile {
            target_url: profile_url(web_domain, user),
        }
    }))
}
