/// Scripts injected into Mastodon pages: the modal watcher and the click redirect

use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, PageTransitionEvent};

use crate::dom::{self, CapturedDialog, DialogIds, ObserverHandle};
use crate::error::{RedirectError, Result};
use crate::modal::ModalWatcher;
use crate::page;
use crate::redirect::plan_redirect;
use crate::settings;

#[derive(Default)]
struct Observers {
    /// Waits for `.modal-root` to appear; released once it has
    discovery: Option<ObserverHandle>,
    /// Watches `.modal-root` until the page goes away
    modal: Option<ObserverHandle>,
}

thread_local! {
    static OBSERVERS: RefCell<Observers> = RefCell::new(Observers::default());
}

struct WatchState {
    watcher: ModalWatcher,
    ids: DialogIds,
}

/// Install the modal watcher if this page is a Mastodon web app
pub async fn begin() -> Result<()> {
    let document = dom::document()?;
    let Some(app_root) = dom::select(&document, page::APP_ROOT) else {
        return Ok(());
    };

    info!("Mastodon Redirector: running");

    let settings = settings::load().await?;

    if let Err(e) = dom::record_home(&document, &settings) {
        error!("Mastodon Redirector: {}", e);
    }

    install_watcher(document, app_root, ModalWatcher::new(settings))?;
    release_on_pagehide()
}

/// Watch `.modal-root` inside `app_root`, waiting for it to appear if needed
pub fn install_watcher(document: Document, app_root: Element, watcher: ModalWatcher) -> Result<()> {
    match dom::select_in(&app_root, page::MODAL_ROOT) {
        Some(modal_root) => watch_modal(document, modal_root, watcher),
        None => await_modal_root(document, app_root, watcher),
    }
}

fn await_modal_root(document: Document, app_root: Element, watcher: ModalWatcher) -> Result<()> {
    let scope = app_root.clone();
    let mut pending = Some(watcher);

    let handle = ObserverHandle::observe(&app_root, move || {
        let Some(modal_root) = dom::select_in(&scope, page::MODAL_ROOT) else {
            return;
        };
        let Some(watcher) = pending.take() else {
            return;
        };

        if let Some(discovery) = OBSERVERS.with(|observers| observers.borrow_mut().discovery.take()) {
            discovery.release_later();
        }

        if let Err(e) = watch_modal(document.clone(), modal_root, watcher) {
            error!("Mastodon Redirector: failed to watch the modal: {}", e);
        }
    })?;

    OBSERVERS.with(|observers| observers.borrow_mut().discovery = Some(handle));
    Ok(())
}

fn watch_modal(document: Document, modal_root: Element, watcher: ModalWatcher) -> Result<()> {
    let state = Rc::new(RefCell::new(WatchState {
        watcher,
        ids: DialogIds::new(),
    }));

    // The container may already hold a dialog
    inspect(&state, &document, &modal_root);

    let handle = {
        let state = state.clone();
        let scope = modal_root.clone();
        ObserverHandle::observe(&modal_root, move || inspect(&state, &document, &scope))?
    };

    OBSERVERS.with(|observers| observers.borrow_mut().modal = Some(handle));
    Ok(())
}

fn inspect(state: &RefCell<WatchState>, document: &Document, modal_root: &Element) {
    let mut state = state.borrow_mut();
    let WatchState { watcher, ids } = &mut *state;

    let captured: CapturedDialog = dom::capture_dialog(document, modal_root, ids);
    if let Err(e) = watcher.process(&captured.snapshot, |edits| captured.apply(document, edits)) {
        error!("Mastodon Redirector: {}", e);
    }
}

/// Whether any observer is still connected
pub fn is_watching() -> bool {
    OBSERVERS.with(|observers| {
        let observers = observers.borrow();
        observers.discovery.is_some() || observers.modal.is_some()
    })
}

/// Drop both observers unless the page is only going into the back/forward
/// cache, where it can come back with the same DOM. Returns whether they were released.
pub fn release_observers(persisted: bool) -> bool {
    if persisted {
        info!("Mastodon Redirector: page kept in the back/forward cache, still watching");
        return false;
    }

    // Dropping the handles disconnects both observers
    drop(OBSERVERS.with(|observers| observers.take()));
    true
}

pub fn release_on_pagehide() -> Result<()> {
    let on_pagehide = Closure::wrap(Box::new(move |event: PageTransitionEvent| {
        release_observers(event.persisted());
    }) as Box<dyn FnMut(PageTransitionEvent)>);

    dom::window()?.add_event_listener_with_callback("pagehide", on_pagehide.as_ref().unchecked_ref())?;
    on_pagehide.forget();

    Ok(())
}

/// Toolbar action: send the current tab to the matching page on the home instance
pub async fn redirect_current_page() -> Result<()> {
    let settings = settings::load().await?;
    let document = dom::document()?;
    let facts = dom::read_page_facts(&document)?;

    match plan_redirect(&settings, &facts) {
        Ok(Some(redirect)) => {
            info!("Mastodon Redirector: redirecting to {}", redirect.target_url());
            dom::navigate(redirect.target_url())
        }
        Ok(None) => {
            info!("Mastodon Redirector: nothing to redirect on this page");
            Ok(())
        }
        Err(RedirectError::NotConfigured) => dom::alert(&RedirectError::NotConfigured.to_string()),
        Err(e) => Err(e),
    }
}
