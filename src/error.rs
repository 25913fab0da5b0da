/// Error type shared by the redirect, modal and settings code paths
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RedirectError {
    #[error("Please go to options and set your LOCAL_DOMAIN first")]
    NotConfigured,
    #[error("{0} was not found")]
    MissingElement(&'static str),
    #[error("couldn't provide the home persistence key for this instance, because the flavour was not recognized: {0}")]
    UnknownFlavour(String),
    #[error("storage failed: {0}")]
    Storage(String),
    #[error("DOM operation failed: {0}")]
    Dom(String),
}

impl From<JsValue> for RedirectError {
    fn from(value: JsValue) -> Self {
        RedirectError::Dom(format!("{:?}", value))
    }
}

pub type Result<T> = std::result::Result<T, RedirectError>;
