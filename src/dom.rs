/// web-sys layer: read the live page into plain values and apply planned edits

use log::info;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, HtmlAnchorElement, HtmlElement, HtmlInputElement, MutationObserver,
    MutationObserverInit, MutationRecord, Window,
};

use crate::error::{RedirectError, Result};
use crate::home::{Flavour, plan_home_record};
use crate::links::ViewButton;
use crate::page::{self, DialogId, DomEdit, LayoutMarkers, ModalSnapshot};
use crate::redirect::PageFacts;
use crate::settings::Settings;

pub fn window() -> Result<Window> {
    web_sys::window().ok_or(RedirectError::MissingElement("window"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or(RedirectError::MissingElement("document"))
}

pub fn select(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

pub fn select_in(scope: &Element, selector: &str) -> Option<Element> {
    scope.query_selector(selector).ok().flatten()
}

fn inner_text(element: &Element) -> String {
    match element.dyn_ref::<HtmlElement>() {
        Some(html) => html.inner_text(),
        None => element.text_content().unwrap_or_default(),
    }
}

fn set_inner_text(element: &Element, text: &str) {
    match element.dyn_ref::<HtmlElement>() {
        Some(html) => html.set_inner_text(text),
        None => element.set_text_content(Some(text)),
    }
}

fn meta_content(document: &Document, selector: &str) -> Option<String> {
    select(document, selector).and_then(|meta| meta.get_attribute("content"))
}

fn text_of(document: &Document, selector: &str) -> Option<String> {
    select(document, selector).map(|element| inner_text(&element))
}

/// Profile username: meta tag first, profile header as fallback
pub fn read_username(document: &Document) -> Option<String> {
    let meta = meta_content(document, page::PROFILE_USERNAME_META);
    let header = text_of(document, page::PROFILE_HEADER_NAME);
    page::username_from(meta.as_deref(), header.as_deref())
}

pub fn read_page_facts(document: &Document) -> Result<PageFacts> {
    let location = document
        .location()
        .ok_or(RedirectError::MissingElement("location"))?;

    Ok(PageFacts {
        href: location.href()?,
        host: location.host()?,
        og_type: meta_content(document, page::OG_TYPE_META),
        moved_account_href: select(document, page::MOVED_ACCOUNT_LINK)
            .and_then(|link| link.get_attribute("href")),
        profile_username: meta_content(document, page::PROFILE_USERNAME_META),
        profile_header_name: text_of(document, page::PROFILE_HEADER_NAME),
        detail_author: text_of(document, page::DETAIL_AUTHOR),
    })
}

pub fn navigate(url: &str) -> Result<()> {
    window()?.location().set_href(url)?;
    Ok(())
}

pub fn alert(message: &str) -> Result<()> {
    window()?.alert_with_message(message)?;
    Ok(())
}

/// Stable ids for dialog containers, held in a WeakMap so they go away with the element
pub struct DialogIds {
    ids: js_sys::WeakMap,
    next: u32,
}

impl DialogIds {
    pub fn new() -> Self {
        DialogIds {
            ids: js_sys::WeakMap::new(),
            next: 1,
        }
    }

    pub fn id_of(&mut self, element: &Element) -> DialogId {
        let key: &js_sys::Object = element.as_ref();
        if let Some(id) = self.ids.get(key).as_f64() {
            return DialogId(id as u32);
        }

        let id = self.next;
        self.next += 1;
        self.ids.set(key, &JsValue::from(id));
        DialogId(id)
    }
}

impl Default for DialogIds {
    fn default() -> Self {
        Self::new()
    }
}

/// A snapshot of the modal plus the elements its edits target
pub struct CapturedDialog {
    pub snapshot: ModalSnapshot,
    paragraph: Option<Element>,
    header: Option<Element>,
    view_button: Option<HtmlAnchorElement>,
}

pub fn capture_dialog(document: &Document, modal_root: &Element, ids: &mut DialogIds) -> CapturedDialog {
    let url_input = select_in(modal_root, page::URL_INPUT);
    let markers = LayoutMarkers {
        one_column: select_in(modal_root, page::ONE_COLUMN_MARKER).is_some(),
        two_column: url_input.is_some(),
        has_text: !inner_text(modal_root).trim().is_empty(),
    };

    let choice = url_input
        .as_ref()
        .and_then(|input| input.closest(page::CHOICE_BOX).ok().flatten());
    let paragraph = choice
        .as_ref()
        .and_then(|choice| select_in(choice, page::CHOICE_PARAGRAPH));
    let header = choice
        .as_ref()
        .and_then(|choice| select_in(choice, page::CHOICE_HEADER));
    let view_button = choice
        .as_ref()
        .and_then(|choice| select_in(choice, &format!(".{}", page::VIEW_BUTTON_CLASS)))
        .and_then(|element| element.dyn_into::<HtmlAnchorElement>().ok());

    let snapshot = ModalSnapshot {
        markers,
        dialog: choice.as_ref().map(|choice| ids.id_of(choice)),
        url_value: url_input
            .as_ref()
            .and_then(|input| input.dyn_ref::<HtmlInputElement>())
            .map(|input| input.value()),
        username: read_username(document),
        paragraph_text: paragraph.as_ref().map(inner_text),
        header_text: header.as_ref().map(inner_text),
        view_button: view_button.as_ref().map(|anchor| ViewButton {
            label: anchor.inner_text(),
            href: anchor.get_attribute("href").unwrap_or_default(),
        }),
    };

    CapturedDialog {
        snapshot,
        paragraph,
        header,
        view_button,
    }
}

impl CapturedDialog {
    pub fn apply(&self, document: &Document, edits: &[DomEdit]) -> Result<()> {
        for edit in edits {
            match edit {
                DomEdit::SetParagraphText(text) => set_inner_text(self.paragraph()?, text),
                DomEdit::SetHeaderText(text) => {
                    let header = self
                        .header
                        .as_ref()
                        .ok_or(RedirectError::MissingElement("header"))?;
                    set_inner_text(header, text);
                }
                DomEdit::InsertViewButton(button) => {
                    let anchor = create_view_button(document, button)?;
                    self.paragraph()?
                        .insert_adjacent_element("beforebegin", &anchor)?;
                }
                DomEdit::UpdateViewButton(button) => {
                    let anchor = self
                        .view_button
                        .as_ref()
                        .ok_or(RedirectError::MissingElement("view button"))?;
                    fill_view_button(anchor, button);
                }
                DomEdit::RemoveParagraph => self.paragraph()?.remove(),
            }
        }
        Ok(())
    }

    fn paragraph(&self) -> Result<&Element> {
        self.paragraph
            .as_ref()
            .ok_or(RedirectError::MissingElement("paragraph"))
    }
}

fn create_view_button(document: &Document, button: &ViewButton) -> Result<HtmlAnchorElement> {
    let anchor: HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(|_| RedirectError::Dom("created element is not an anchor".to_string()))?;

    for class in page::VIEW_BUTTON_CLASSES {
        anchor.class_list().add_1(class)?;
    }
    fill_view_button(&anchor, button);

    Ok(anchor)
}

fn fill_view_button(anchor: &HtmlAnchorElement, button: &ViewButton) {
    anchor.set_href(&button.href);
    anchor.set_inner_text(&button.label);
}

/// Write the home instance to the page's localStorage for the one-column modal
pub fn record_home(document: &Document, settings: &Settings) -> Result<()> {
    let classes: Option<Vec<String>> = select(document, page::FLAVOUR_MARKER).map(|element| {
        element
            .class_name()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    });
    let flavour = Flavour::from_class_names(classes.as_ref().map(|c| c.iter().map(String::as_str)));

    let Some(record) = plan_home_record(settings, &flavour)? else {
        return Ok(());
    };

    let storage = window()?
        .local_storage()?
        .ok_or_else(|| RedirectError::Storage("localStorage is unavailable".to_string()))?;

    if let Some(existing) = storage.get_item(record.key)? {
        info!(
            "Mastodon Redirector: localstorage has home instance set to {}, overwriting with {}",
            existing, record.value
        );
    }
    storage.set_item(record.key, &record.value)?;

    Ok(())
}

/// A subtree MutationObserver that disconnects when dropped
pub struct ObserverHandle {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl ObserverHandle {
    /// Watch `target` and its subtree; `on_added` runs once per batch that added nodes
    pub fn observe<F>(target: &Element, mut on_added: F) -> Result<ObserverHandle>
    where
        F: FnMut() + 'static,
    {
        let callback = Closure::wrap(Box::new(move |records: js_sys::Array, _observer: MutationObserver| {
            let added = records
                .iter()
                .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                .any(|record| record.added_nodes().length() > 0);

            if added {
                on_added();
            }
        }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        observer.observe_with_options(target, &options)?;

        Ok(ObserverHandle {
            observer,
            _callback: callback,
        })
    }

    pub fn disconnect(&self) {
        self.observer.disconnect();
    }

    /// Disconnect now and free the callback after the running one has returned.
    /// Needed when releasing from inside the observer's own callback.
    pub fn release_later(self) {
        self.disconnect();
        spawn_local(async move {
            drop(self);
        });
    }
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
