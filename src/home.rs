/// Pre-fill the one-column interaction modal with the home instance.
///
/// Mastodon remembers the instance a visitor typed into the modal in the page's
/// localStorage. Writing `local_domain` there up front means the one-column
/// modal opens already filled out. The key depends on the front-end flavour.
use crate::error::{RedirectError, Result};
use crate::settings::Settings;

const FLAVOUR_PREFIX: &str = "flavour-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flavour {
    Vanilla,
    Glitch,
    Other(String),
}

impl Flavour {
    /// Detect the flavour from the classes of the first `[class*=flavour-]`
    /// element, or `None` when the page has no such element.
    pub fn from_class_names<'a, I>(classes: Option<I>) -> Flavour
    where
        I: IntoIterator<Item = &'a str>,
    {
        classes
            .and_then(|classes| {
                classes
                    .into_iter()
                    .find_map(|class| class.strip_prefix(FLAVOUR_PREFIX))
                    .map(|name| match name {
                        "glitch" => Flavour::Glitch,
                        other => Flavour::Other(other.to_string()),
                    })
            })
            .unwrap_or(Flavour::Vanilla)
    }

    /// The localStorage key holding the remembered home instance
    pub fn home_key(&self) -> Result<&'static str> {
        match self {
            Flavour::Vanilla => Ok("mastodon_home"),
            Flavour::Glitch => Ok("flavours/glitch_home"),
            Flavour::Other(name) => Err(RedirectError::UnknownFlavour(name.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeRecord {
    pub key: &'static str,
    pub value: String,
}

/// What to write to localStorage, if anything. Unconfigured settings write nothing.
pub fn plan_home_record(settings: &Settings, flavour: &Flavour) -> Result<Option<HomeRecord>> {
    if !settings.is_configured() {
        return Ok(None);
    }

    Ok(Some(HomeRecord {
        key: flavour.home_key()?,
        value: settings.local_domain.clone(),
    }))
}
