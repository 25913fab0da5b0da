/// Options page: where the home instance is configured

use yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use patternfly_yew::prelude::*;
use crate::settings::{self, Settings};

// Layout comes from the PatternFly stylesheet; the extension ships no CSS of its own
const PAGE_CLASS: &str = "pf-v5-c-page__main-section";
const TITLE_CLASS: &str = "pf-v5-c-title pf-m-xl";
const SPINNER_CLASS: &str = "pf-v5-l-bullseye";
const ALERT_CLASS: &str = "pf-v5-u-mt-md";

#[derive(Clone, PartialEq)]
enum OptionsState {
    Loading,
    Idle,
    Saving,
    Saved,
    Error(String),
}

#[function_component(OptionsPage)]
pub fn options_page() -> Html {
    let state = use_state(|| OptionsState::Loading);
    let local_domain = use_state(String::new);
    let web_domain = use_state(String::new);

    // Restore saved settings on mount
    {
        let state = state.clone();
        let local_domain = local_domain.clone();
        let web_domain = web_domain.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match settings::load().await {
                    Ok(saved) => {
                        local_domain.set(saved.local_domain);
                        web_domain.set(saved.web_domain);
                        state.set(OptionsState::Idle);
                    }
                    Err(e) => {
                        state.set(OptionsState::Error(format!("Failed to load: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    let on_local_input = {
        let local_domain = local_domain.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                local_domain.set(input.value());
            }
        })
    };

    let on_web_input = {
        let web_domain = web_domain.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                web_domain.set(input.value());
            }
        })
    };

    let on_save = {
        let state = state.clone();
        let local_domain = local_domain.clone();
        let web_domain = web_domain.clone();

        Callback::from(move |_| {
            let state = state.clone();
            let new_settings = Settings::new((*local_domain).clone(), (*web_domain).clone());

            state.set(OptionsState::Saving);

            spawn_local(async move {
                match settings::save(&new_settings).await {
                    Ok(()) => state.set(OptionsState::Saved),
                    Err(e) => state.set(OptionsState::Error(format!("Failed to save: {}", e))),
                }
            });
        })
    };

    let is_busy = matches!(*state, OptionsState::Loading | OptionsState::Saving);

    html! {
        <div class={PAGE_CLASS}>
            <h1 class={TITLE_CLASS}>{"Mastodon Redirector"}</h1>

            <div class="pf-v5-c-form">
                <div class="pf-v5-c-form__group">
                    <label class="pf-v5-c-form__label" for="local_domain">{"Local domain"}</label>
                    <input
                        id="local_domain"
                        class="pf-v5-c-form-control"
                        type="text"
                        placeholder="example.social"
                        value={(*local_domain).clone()}
                        oninput={on_local_input}
                        disabled={is_busy}
                    />
                    <p class="pf-v5-c-form__helper-text">{"The instance that hosts your account"}</p>
                </div>

                <div class="pf-v5-c-form__group">
                    <label class="pf-v5-c-form__label" for="web_domain">{"Web domain"}</label>
                    <input
                        id="web_domain"
                        class="pf-v5-c-form-control"
                        type="text"
                        placeholder={(*local_domain).clone()}
                        value={(*web_domain).clone()}
                        oninput={on_web_input}
                        disabled={is_busy}
                    />
                    <p class="pf-v5-c-form__helper-text">{"Only needed when your instance serves its web UI from another domain"}</p>
                </div>

                <Button onclick={on_save} disabled={is_busy} variant={ButtonVariant::Primary}>
                    {"Save"}
                </Button>
            </div>

            {match &*state {
                OptionsState::Loading | OptionsState::Saving => html! {
                    <div class={SPINNER_CLASS}>
                        <Spinner />
                    </div>
                },
                OptionsState::Saved => html! {
                    <div class={ALERT_CLASS}>
                        <Alert r#type={AlertType::Success} title={"Settings saved"} inline={true}>
                        </Alert>
                    </div>
                },
                OptionsState::Error(err) => html! {
                    <div class={ALERT_CLASS}>
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                OptionsState::Idle => html! {}
            }}
        </div>
    }
}
