/// Mastodon Redirector - Browser extension that takes remote Mastodon pages back to your home instance
/// Built with Rust + WASM + Yew

pub mod content;
pub mod dom;
pub mod error;
pub mod home;
pub mod links;
pub mod modal;
pub mod page;
pub mod redirect;
pub mod settings;
pub mod ui;

use log::error;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the options page
#[wasm_bindgen]
pub fn start_options() {
    yew::Renderer::<ui::options::OptionsPage>::new().render();
}

// Content script entry: watch for the interaction modal
#[wasm_bindgen]
pub fn start_content_script() {
    spawn_local(async {
        if let Err(e) = content::begin().await {
            error!("Mastodon Redirector: {}", e);
        }
    });
}

// Injected on toolbar click: redirect the current tab
#[wasm_bindgen]
pub fn redirect_current_page() {
    spawn_local(async {
        if let Err(e) = content::redirect_current_page().await {
            error!("Mastodon Redirector: {}", e);
        }
    });
}
