/// Interaction modal watcher
///
/// Mastodon fills the "authorize interaction" dialog asynchronously, often over
/// several mutation bursts. Every notification re-reads the dialog into a
/// [`ModalSnapshot`], plans the edits for it, and records the per-dialog state
/// only once those edits were applied. A dialog that reached `Done` is never
/// touched again.
use std::collections::HashMap;

use log::{Level, log};

use crate::error::Result;
use crate::links::{TargetKind, ViewButton, normalize_username};
use crate::page::{DialogId, DomEdit, LayoutMarkers, ModalSnapshot};
use crate::settings::Settings;

pub const CONFIGURE_MESSAGE: &str = "Please configure the mastodon-profile-redirect browser extension to more easily follow this account, directly on your Mastodon instance.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessingState {
    #[default]
    Unseen,
    Unconfigured,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalLayout {
    /// Newer instances: embedded login form, no copy-paste field
    OneColumn,
    /// Copy-paste URL field next to a "sign up" column
    TwoColumn,
    /// Container present but still empty
    Loading,
    Unrecognized,
}

impl ModalLayout {
    pub fn classify(markers: &LayoutMarkers) -> ModalLayout {
        if markers.one_column {
            ModalLayout::OneColumn
        } else if markers.two_column {
            ModalLayout::TwoColumn
        } else if !markers.has_text {
            ModalLayout::Loading
        } else {
            ModalLayout::Unrecognized
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    OneColumn,
    Loading,
    Unrecognized,
    AlreadyDone,
    /// A required element is not rendered yet
    NotReady(&'static str),
    Unconfigured,
    Rewritten(TargetKind),
}

/// The plan for one notification
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub outcome: Outcome,
    pub edits: Vec<DomEdit>,
    /// State to record for the dialog once `edits` are applied
    pub settle: Option<(DialogId, ProcessingState)>,
}

impl Reaction {
    fn idle(outcome: Outcome) -> Reaction {
        Reaction {
            outcome,
            edits: Vec::new(),
            settle: None,
        }
    }
}

pub struct ModalWatcher {
    settings: Settings,
    states: HashMap<DialogId, ProcessingState>,
}

impl ModalWatcher {
    pub fn new(settings: Settings) -> ModalWatcher {
        ModalWatcher {
            settings,
            states: HashMap::new(),
        }
    }

    pub fn state_of(&self, dialog: DialogId) -> ProcessingState {
        self.states.get(&dialog).copied().unwrap_or_default()
    }

    /// Plan the reaction to the current dialog contents without changing state
    pub fn react(&self, snapshot: &ModalSnapshot) -> Reaction {
        match ModalLayout::classify(&snapshot.markers) {
            ModalLayout::OneColumn => Reaction::idle(Outcome::OneColumn),
            ModalLayout::Loading => Reaction::idle(Outcome::Loading),
            ModalLayout::Unrecognized => Reaction::idle(Outcome::Unrecognized),
            ModalLayout::TwoColumn => self.react_two_column(snapshot),
        }
    }

    fn react_two_column(&self, snapshot: &ModalSnapshot) -> Reaction {
        let Some(dialog) = snapshot.dialog else {
            return Reaction::idle(Outcome::NotReady("choice box"));
        };
        if self.state_of(dialog) == ProcessingState::Done {
            return Reaction::idle(Outcome::AlreadyDone);
        }

        // This could be a profile URL or a post URL, depending on which
        // interaction made the modal pop up
        let Some(url_value) = snapshot.url_value.as_deref() else {
            return Reaction::idle(Outcome::NotReady("URL field"));
        };
        let Some(paragraph_text) = snapshot.paragraph_text.as_deref() else {
            // Our control replaced the paragraph on an earlier pass
            if snapshot.view_button.is_some() {
                return Reaction {
                    outcome: Outcome::AlreadyDone,
                    edits: Vec::new(),
                    settle: Some((dialog, ProcessingState::Done)),
                };
            }
            return Reaction::idle(Outcome::NotReady("paragraph"));
        };
        let Some(header_text) = snapshot.header_text.as_deref() else {
            return Reaction::idle(Outcome::NotReady("header"));
        };

        let web_domain = self.settings.effective_web_domain();
        if web_domain.is_empty() {
            let mut edits = Vec::new();
            if paragraph_text != CONFIGURE_MESSAGE {
                edits.push(DomEdit::SetParagraphText(CONFIGURE_MESSAGE.to_string()));
            }
            return Reaction {
                outcome: Outcome::Unconfigured,
                edits,
                settle: Some((dialog, ProcessingState::Unconfigured)),
            };
        }

        let kind = TargetKind::classify(url_value);
        let local_domain = &self.settings.local_domain;
        let user = match (kind, snapshot.username.as_deref()) {
            (_, Some(user)) => normalize_username(user, local_domain),
            (TargetKind::Post, None) => "",
            (TargetKind::Profile, None) => return Reaction::idle(Outcome::NotReady("target username")),
        };

        let mut edits = Vec::new();

        let new_header = format!("On {}", local_domain);
        if header_text != new_header {
            edits.push(DomEdit::SetHeaderText(new_header));
        }

        let button = ViewButton::for_target(kind, web_domain, user, url_value);
        match &snapshot.view_button {
            Some(existing) if *existing == button => {}
            Some(_) => edits.push(DomEdit::UpdateViewButton(button)),
            None => edits.push(DomEdit::InsertViewButton(button)),
        }
        edits.push(DomEdit::RemoveParagraph);

        Reaction {
            outcome: Outcome::Rewritten(kind),
            edits,
            settle: Some((dialog, ProcessingState::Done)),
        }
    }

    /// Record the state planned by `reaction`. Call only after its edits landed.
    pub fn settle(&mut self, reaction: &Reaction) {
        if let Some((dialog, state)) = reaction.settle {
            self.states.insert(dialog, state);
        }
    }

    /// Plan, apply through `apply`, and settle on success
    pub fn process<F>(&mut self, snapshot: &ModalSnapshot, apply: F) -> Result<Outcome>
    where
        F: FnOnce(&[DomEdit]) -> Result<()>,
    {
        let reaction = self.react(snapshot);
        log_outcome(&reaction.outcome);

        if !reaction.edits.is_empty() {
            apply(&reaction.edits)?;
        }
        self.settle(&reaction);

        Ok(reaction.outcome)
    }
}

impl Outcome {
    /// How loudly to report this outcome. Waiting for Mastodon to finish
    /// rendering is the normal case, only an unknown layout is a fault.
    pub fn log_level(&self) -> Option<Level> {
        match self {
            Outcome::AlreadyDone => None,
            Outcome::Unrecognized => Some(Level::Error),
            _ => Some(Level::Info),
        }
    }

    fn message(&self) -> String {
        match self {
            Outcome::OneColumn => "Found modal, one-column variant".to_string(),
            Outcome::Loading => "Found modal root but it has no content yet, waiting".to_string(),
            Outcome::Unrecognized => "The modal is unrecognized, cannot inject redirection".to_string(),
            Outcome::AlreadyDone => "Modal already rewritten".to_string(),
            Outcome::NotReady(what) => format!("{} not rendered yet, waiting", what),
            Outcome::Unconfigured => "Found modal, extension is not configured".to_string(),
            Outcome::Rewritten(kind) => format!("Found modal, two-column variant, linked {:?}", kind),
        }
    }
}

fn log_outcome(outcome: &Outcome) {
    if let Some(level) = outcome.log_level() {
        log!(level, "Mastodon Redirector: {}", outcome.message());
    }
}
