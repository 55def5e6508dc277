use std::rc::Rc;

use gloo::timers::callback::Timeout;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Element, Event, FocusEvent, HtmlInputElement, InputEvent, MouseEvent, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition,
};
use yew::prelude::*;

use morfi_core::{
    build_results_view, fmt_score, group_catalog, split_columns, MealItem, RankedRow,
    ResultsView, SubmitVotes, DEFAULT_SCORE,
};

use crate::api;
use crate::identity;
use crate::persisted_store;
use crate::scheduler::RenderScheduler;

const TOAST_LIFETIME_MS: u32 = 2_700;

#[derive(Clone, Copy, PartialEq, Eq)]
enum SyncTone {
    Ok,
    Saving,
    Warn,
    Err,
}

impl SyncTone {
    fn css_class(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Saving => "saving",
            Self::Warn => "warn",
            Self::Err => "err",
        }
    }
}

#[derive(Clone, PartialEq)]
struct SyncStatus {
    tone: SyncTone,
    text: String,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self {
            tone: SyncTone::Saving,
            text: "Starting...".to_string(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ToastKind {
    Ok,
    Warn,
    Err,
}

impl ToastKind {
    fn css_class(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Err => "err",
        }
    }
}

#[derive(Clone, PartialEq)]
struct Toast {
    id: u32,
    kind: ToastKind,
    message: String,
    detail: String,
}

fn scroll_to(node: &NodeRef) {
    let Some(element) = node.cast::<Element>() else {
        return;
    };
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    options.set_block(ScrollLogicalPosition::Start);
    element.scroll_into_view_with_scroll_into_view_options(&options);
}

fn ranked_rows(rows: &[RankedRow]) -> Html {
    if rows.is_empty() {
        return html! { <div class="muted">{ "—" }</div> };
    }
    rows.iter()
        .map(|row| {
            html! {
                <div class="ritem compact">
                    <div class={classes!("rank-badge", row.tier.css_class())}>
                        { row.rank.to_string() }
                    </div>
                    <div class="rname">
                        { row.meal.clone() }
                        if !row.breakdown_label.is_empty() {
                            <div class="muted small">{ row.breakdown_label.clone() }</div>
                        }
                    </div>
                    <div class="rmeta"><b>{ row.sum_label.clone() }</b></div>
                </div>
            }
        })
        .collect()
}

#[function_component(App)]
pub(crate) fn app() -> Html {
    let catalog = use_state(Vec::<MealItem>::new);
    let selection = use_mut_ref(persisted_store::load_selections);
    let identity_store = use_mut_ref(identity::load);
    let query = use_state(String::new);
    let results = use_state(|| None::<ResultsView>);
    let results_note = use_state(|| None::<String>);
    let sync = use_state(SyncStatus::default);
    let toasts = use_state(Vec::<Toast>::new);
    let toast_seq = use_mut_ref(|| 0u32);
    let catalog_rev = use_state(|| 0u32);
    let podium_rev = use_state(|| 0u32);
    let display_name_ref = use_node_ref();
    let results_ref = use_node_ref();

    // Each view gets its own debounced scheduler so bursty mutations in one
    // never stall the other.
    let catalog_scheduler = {
        let catalog_rev = catalog_rev.clone();
        use_mut_ref(move || {
            RenderScheduler::new(Rc::new(move || {
                catalog_rev.set(catalog_rev.wrapping_add(1));
            }))
        })
    };
    let podium_scheduler = {
        let podium_rev = podium_rev.clone();
        use_mut_ref(move || {
            RenderScheduler::new(Rc::new(move || {
                podium_rev.set(podium_rev.wrapping_add(1));
            }))
        })
    };
    // revision reads keep the debounced bumps driving this render
    let _ = (*catalog_rev, *podium_rev);

    let set_sync: Rc<dyn Fn(SyncTone, String)> = {
        let sync = sync.clone();
        Rc::new(move |tone, text| sync.set(SyncStatus { tone, text }))
    };

    let push_toast: Rc<dyn Fn(ToastKind, String, String)> = {
        let toasts = toasts.clone();
        let toast_seq = toast_seq.clone();
        Rc::new(move |kind, message, detail| {
            let id = {
                let mut seq = toast_seq.borrow_mut();
                *seq = seq.wrapping_add(1);
                *seq
            };
            let mut next = (*toasts).clone();
            next.push(Toast {
                id,
                kind,
                message,
                detail,
            });
            toasts.set(next);
            let toasts = toasts.clone();
            Timeout::new(TOAST_LIFETIME_MS, move || {
                let mut next = (*toasts).clone();
                next.retain(|toast| toast.id != id);
                toasts.set(next);
            })
            .forget();
        })
    };

    let load_status: Rc<dyn Fn()> = {
        let set_sync = set_sync.clone();
        Rc::new(move || {
            let set_sync = set_sync.clone();
            spawn_local(async move {
                match api::fetch_status().await {
                    Ok(status) if status.has_votes => {
                        set_sync(SyncTone::Ok, format!("Votes in ({})", status.participants));
                    }
                    Ok(_) => set_sync(SyncTone::Warn, "No votes yet".to_string()),
                    // a failed status probe never takes the app down
                    Err(err) => gloo::console::warn!("status failed", err.to_string()),
                }
            });
        })
    };

    let load_results: Rc<dyn Fn()> = {
        let results = results.clone();
        let results_note = results_note.clone();
        let results_ref = results_ref.clone();
        let set_sync = set_sync.clone();
        let push_toast = push_toast.clone();
        Rc::new(move || {
            set_sync(SyncTone::Saving, "Crunching results...".to_string());
            let results = results.clone();
            let results_note = results_note.clone();
            let results_ref = results_ref.clone();
            let set_sync = set_sync.clone();
            let push_toast = push_toast.clone();
            spawn_local(async move {
                match api::fetch_results().await {
                    Ok(payload) => {
                        results_note.set(None);
                        results.set(Some(build_results_view(&payload)));
                        set_sync(SyncTone::Ok, "Done".to_string());
                        scroll_to(&results_ref);
                    }
                    Err(err) => {
                        gloo::console::warn!("getResults failed", err.to_string());
                        set_sync(SyncTone::Err, "Could not load results".to_string());
                        results.set(None);
                        results_note.set(Some(format!("Error loading results: {err}")));
                        push_toast(
                            ToastKind::Err,
                            "Error loading results".to_string(),
                            err.to_string(),
                        );
                    }
                }
            });
        })
    };

    let load_meals: Rc<dyn Fn()> = {
        let catalog = catalog.clone();
        let set_sync = set_sync.clone();
        let push_toast = push_toast.clone();
        Rc::new(move || {
            set_sync(SyncTone::Saving, "Loading meals...".to_string());
            let catalog = catalog.clone();
            let set_sync = set_sync.clone();
            let push_toast = push_toast.clone();
            spawn_local(async move {
                match api::fetch_meals().await {
                    Ok(meals) => {
                        let count = meals.len();
                        catalog.set(meals);
                        set_sync(SyncTone::Ok, format!("Ready ({count})"));
                        if count == 0 {
                            push_toast(
                                ToastKind::Warn,
                                "No meals arrived".to_string(),
                                "The catalog came back empty; check the source sheet.".to_string(),
                            );
                        }
                    }
                    Err(err) => {
                        gloo::console::warn!("getMeals failed", err.to_string());
                        set_sync(SyncTone::Err, "Could not load meals".to_string());
                        push_toast(
                            ToastKind::Err,
                            "Error loading meals".to_string(),
                            err.to_string(),
                        );
                    }
                }
            });
        })
    };

    let submit_or_show: Rc<dyn Fn()> = {
        let selection = selection.clone();
        let identity_store = identity_store.clone();
        let display_name_ref = display_name_ref.clone();
        let set_sync = set_sync.clone();
        let push_toast = push_toast.clone();
        let load_results = load_results.clone();
        let load_status = load_status.clone();
        Rc::new(move || {
            // nothing picked locally: just show whatever the sheet has
            if selection.borrow().is_empty() {
                load_results();
                return;
            }
            let raw_name = display_name_ref
                .cast::<HtmlInputElement>()
                .map(|input| input.value())
                .unwrap_or_default();
            let submission = {
                let mut ident = identity_store.borrow_mut();
                identity::ensure_user_id(&mut ident);
                let trimmed = raw_name.trim();
                let display_name = if trimmed.is_empty() {
                    ident.user_id.clone()
                } else {
                    trimmed.to_string()
                };
                ident.display_name = display_name.clone();
                identity::persist(&ident);
                SubmitVotes {
                    user_id: ident.user_id.clone(),
                    display_name,
                    votes: selection.borrow().votes(),
                }
            };
            set_sync(SyncTone::Saving, "Sending votes...".to_string());
            let set_sync = set_sync.clone();
            let push_toast = push_toast.clone();
            let load_results = load_results.clone();
            let load_status = load_status.clone();
            spawn_local(async move {
                match api::submit_votes(&submission).await {
                    Ok(()) => {
                        push_toast(
                            ToastKind::Ok,
                            "Votes sent".to_string(),
                            format!("Voting as {}", submission.display_name),
                        );
                        load_status();
                        load_results();
                    }
                    Err(err) => {
                        set_sync(SyncTone::Err, "Could not send votes".to_string());
                        push_toast(
                            ToastKind::Err,
                            "Error sending votes".to_string(),
                            err.to_string(),
                        );
                    }
                }
            });
        })
    };

    let on_reset = {
        let results = results.clone();
        let results_note = results_note.clone();
        let results_ref = results_ref.clone();
        let set_sync = set_sync.clone();
        let push_toast = push_toast.clone();
        let load_status = load_status.clone();
        Callback::from(move |_: MouseEvent| {
            let confirmed = web_sys::window()
                .and_then(|window| {
                    window
                        .confirm_with_message("Clear ALL votes? This wipes everyone's votes.")
                        .ok()
                })
                .unwrap_or(false);
            if !confirmed {
                return;
            }
            set_sync(SyncTone::Saving, "Clearing votes...".to_string());
            let results = results.clone();
            let results_note = results_note.clone();
            let results_ref = results_ref.clone();
            let set_sync = set_sync.clone();
            let push_toast = push_toast.clone();
            let load_status = load_status.clone();
            spawn_local(async move {
                match api::reset_votes().await {
                    Ok(()) => {
                        push_toast(ToastKind::Ok, "Votes cleared".to_string(), String::new());
                        load_status();
                        results.set(None);
                        results_note.set(Some("No active votes.".to_string()));
                        scroll_to(&results_ref);
                    }
                    Err(err) => {
                        set_sync(SyncTone::Err, "Could not clear votes".to_string());
                        push_toast(
                            ToastKind::Err,
                            "Error clearing votes".to_string(),
                            err.to_string(),
                        );
                    }
                }
            });
        })
    };

    let make_toggle = {
        let selection = selection.clone();
        let catalog_scheduler = catalog_scheduler.clone();
        let podium_scheduler = podium_scheduler.clone();
        move |name: String| {
            let selection = selection.clone();
            let catalog_scheduler = catalog_scheduler.clone();
            let podium_scheduler = podium_scheduler.clone();
            Callback::from(move |_: Event| {
                selection.borrow_mut().toggle(&name);
                persisted_store::save_selections(&selection.borrow());
                podium_scheduler.borrow().schedule();
                catalog_scheduler.borrow().schedule();
            })
        }
    };

    let make_score_change = {
        let selection = selection.clone();
        let catalog_scheduler = catalog_scheduler.clone();
        let podium_scheduler = podium_scheduler.clone();
        let push_toast = push_toast.clone();
        move |name: String| {
            let selection = selection.clone();
            let catalog_scheduler = catalog_scheduler.clone();
            let podium_scheduler = podium_scheduler.clone();
            let push_toast = push_toast.clone();
            Callback::from(move |event: Event| {
                let input: HtmlInputElement = event.target_unchecked_into();
                let outcome = selection.borrow_mut().set_score(&name, &input.value());
                match outcome {
                    Ok(_) => {
                        persisted_store::save_selections(&selection.borrow());
                        podium_scheduler.borrow().schedule();
                        catalog_scheduler.borrow().schedule();
                    }
                    Err(_) => {
                        push_toast(
                            ToastKind::Warn,
                            "Invalid score".to_string(),
                            "Use 0-10 (e.g. 8.3 or 7,25)".to_string(),
                        );
                        let prior = selection
                            .borrow()
                            .score_of(&name)
                            .unwrap_or(DEFAULT_SCORE);
                        input.set_value(&fmt_score(prior));
                    }
                }
            })
        }
    };

    let make_score_focus = {
        let selection = selection.clone();
        let podium_scheduler = podium_scheduler.clone();
        move |name: String| {
            let selection = selection.clone();
            let podium_scheduler = podium_scheduler.clone();
            Callback::from(move |event: FocusEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                // select everything so typing replaces the default
                input.select();
                selection.borrow_mut().mark_touched(&name);
                podium_scheduler.borrow().schedule();
            })
        }
    };

    let make_remove = {
        let selection = selection.clone();
        let catalog_scheduler = catalog_scheduler.clone();
        let podium_scheduler = podium_scheduler.clone();
        move |name: String| {
            let selection = selection.clone();
            let catalog_scheduler = catalog_scheduler.clone();
            let podium_scheduler = podium_scheduler.clone();
            Callback::from(move |_: MouseEvent| {
                selection.borrow_mut().remove(&name);
                persisted_store::save_selections(&selection.borrow());
                podium_scheduler.borrow().schedule();
                catalog_scheduler.borrow().schedule();
            })
        }
    };

    let on_search = {
        let query = query.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            query.set(input.value());
        })
    };

    let on_save_identity = {
        let identity_store = identity_store.clone();
        let display_name_ref = display_name_ref.clone();
        let push_toast = push_toast.clone();
        Callback::from(move |_: MouseEvent| {
            let name = display_name_ref
                .cast::<HtmlInputElement>()
                .map(|input| input.value())
                .unwrap_or_default();
            {
                let mut ident = identity_store.borrow_mut();
                ident.display_name = name.trim().to_string();
                identity::ensure_user_id(&mut ident);
                identity::persist(&ident);
            }
            push_toast(
                ToastKind::Ok,
                "Name saved".to_string(),
                "Stays in this browser".to_string(),
            );
        })
    };

    let on_reload = {
        let load_meals = load_meals.clone();
        Callback::from(move |_: MouseEvent| load_meals())
    };
    let on_submit = {
        let submit_or_show = submit_or_show.clone();
        Callback::from(move |_: MouseEvent| submit_or_show())
    };

    {
        let load_meals = load_meals.clone();
        let load_status = load_status.clone();
        let display_name_ref = display_name_ref.clone();
        let identity_store = identity_store.clone();
        use_effect_with((), move |_| {
            if let Some(input) = display_name_ref.cast::<HtmlInputElement>() {
                input.set_value(&identity_store.borrow().display_name);
            }
            load_meals();
            load_status();
            || ()
        });
    }

    let query_value = (*query).clone();
    let sections = group_catalog(&catalog, &query_value);
    let catalog_view: Html = if sections.is_empty() {
        html! { <div class="muted">{ "No meals to show." }</div> }
    } else {
        sections
            .iter()
            .map(|section| {
                let render_meal = |meal: &MealItem| -> Html {
                    let selected = selection.borrow().is_selected(&meal.name);
                    let score_label = selection
                        .borrow()
                        .score_of(&meal.name)
                        .map(|score| format!("Score: {}", fmt_score(score)))
                        .unwrap_or_else(|| "—".to_string());
                    html! {
                        <div class={classes!("meal", format!("t-{}", meal.category.css_class()))}>
                            <input
                                type="checkbox"
                                checked={selected}
                                onchange={make_toggle(meal.name.clone())}
                            />
                            <div class="name">{ meal.name.clone() }</div>
                            <div class="meal-side">
                                <span class={classes!("tag", meal.category.css_class())}>
                                    { meal.category.tag_label() }
                                </span>
                                <div class="mini">{ score_label }</div>
                            </div>
                        </div>
                    }
                };
                let (left, right) = split_columns(&section.meals);
                html! {
                    <>
                        <div class={classes!("meals-section", section.category.css_class())}>
                            <div class="ttl">{ section.category.section_title() }</div>
                            <div class="sub">{ format!("{} / {}", section.meals.len(), section.total) }</div>
                        </div>
                        <div class="meals-two">
                            <div class="meals-col">{ for left.iter().map(&render_meal) }</div>
                            <div class="meals-col">{ for right.iter().map(&render_meal) }</div>
                        </div>
                    </>
                }
            })
            .collect::<Html>()
    };

    let podium_entries = selection.borrow().podium();
    let podium_view: Html = if podium_entries.is_empty() {
        html! { <div class="muted">{ "No meals selected yet." }</div> }
    } else {
        podium_entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let dimmed = entry.score == DEFAULT_SCORE && !entry.touched;
                html! {
                    <div class="pitem">
                        <div class="rank">{ (idx + 1).to_string() }</div>
                        <div class="mealname">{ entry.meal.clone() }</div>
                        <input
                            class={classes!("score", dimmed.then_some("untouched"))}
                            type="number"
                            min="0"
                            max="10"
                            step="0.01"
                            inputmode="decimal"
                            value={fmt_score(entry.score)}
                            onfocus={make_score_focus(entry.meal.clone())}
                            onchange={make_score_change(entry.meal.clone())}
                        />
                        <button class="ghost" onclick={make_remove(entry.meal.clone())}>
                            { "Remove" }
                        </button>
                    </div>
                }
            })
            .collect::<Html>()
    };

    let results_view: Html = if let Some(note) = (*results_note).clone() {
        html! { <div class="muted">{ note }</div> }
    } else if let Some(view) = (*results).clone() {
        if !view.has_votes {
            html! { <div class="muted">{ "No votes." }</div> }
        } else {
            let winner_card = match view.winner.clone() {
                Some(winner) => html! {
                    <div class="winner-card">
                        <div class="winner-left"><div class="winner-icon">{ "🏆" }</div></div>
                        <div class="winner-mid">
                            <div class="winner-title">{ winner.title }</div>
                            <div class="winner-meal">{ winner.names }</div>
                            if !winner.breakdown_label.is_empty() {
                                <div class="muted small">{ winner.breakdown_label }</div>
                            }
                        </div>
                        <div class="winner-right">
                            <div class="winner-score">{ winner.sum_label }</div>
                            <div class="winner-score-label">{ "score" }</div>
                        </div>
                    </div>
                },
                None => html! { <div class="muted">{ "Could not determine a winner." }</div> },
            };
            html! {
                <>
                    <div class="head">
                        <div class="participants">
                            { "Participants: " }<b>{ view.participants_label.clone() }</b>
                        </div>
                        <div class="mode">{ view.mode_label }</div>
                    </div>
                    { winner_card }
                    <div class="rlist">
                        <div class="rsection-title">{ "Shared" }</div>
                        { ranked_rows(&view.shared) }
                        <div class="rsection-title">{ "Solo" }</div>
                        { ranked_rows(&view.solo) }
                    </div>
                </>
            }
        }
    } else {
        html! { <div class="muted">{ "Results show up after someone submits." }</div> }
    };

    let sync_value = (*sync).clone();
    let toast_view: Html = toasts
        .iter()
        .map(|toast| {
            html! {
                <div class={classes!("toast", toast.kind.css_class())} key={toast.id.to_string()}>
                    { toast.message.clone() }
                    if !toast.detail.is_empty() {
                        <div class="small">{ toast.detail.clone() }</div>
                    }
                </div>
            }
        })
        .collect();

    html! {
        <main class="wrap">
            <header class="top">
                <h1>{ "Morfi" }</h1>
                <div class={classes!("sync", sync_value.tone.css_class())}>
                    <span class="dot"></span>
                    <span class="txt">{ sync_value.text }</span>
                </div>
            </header>
            <section class="card identity-card">
                <label for="display-name">{ "Your name" }</label>
                <input
                    id="display-name"
                    ref={display_name_ref.clone()}
                    placeholder="How should the podium read?"
                />
                <button onclick={on_save_identity}>{ "Save name" }</button>
            </section>
            <section class="card meals-card">
                <div class="card-head">
                    <input
                        class="search"
                        placeholder="Search meals"
                        value={query_value}
                        oninput={on_search}
                    />
                    <button class="ghost" onclick={on_reload}>{ "Reload" }</button>
                    <button onclick={on_submit.clone()}>{ "Send votes & see results" }</button>
                </div>
                <div class="meals">{ catalog_view }</div>
            </section>
            <section class="card podium-card">
                <h2>{ "Your podium" }</h2>
                <div class="podium">{ podium_view }</div>
                <button onclick={on_submit}>{ "Send votes & see results" }</button>
            </section>
            <section class="card results-card" ref={results_ref.clone()}>
                <div class="card-head">
                    <h2>{ "Results" }</h2>
                    <button class="ghost danger" onclick={on_reset}>{ "Clear all votes" }</button>
                </div>
                <div class="results">{ results_view }</div>
            </section>
            <div class="toast-root">{ toast_view }</div>
        </main>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_error_panic_hook::set_once as set_panic_hook;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn app_mounts_without_panicking() {
        set_panic_hook();
        let document = web_sys::window()
            .and_then(|window| window.document())
            .expect("document available");
        let root = document.create_element("div").expect("create test root");
        root.set_id("wasm-test-root");
        document
            .body()
            .expect("body available")
            .append_child(&root)
            .expect("append test root");
        let _handle = yew::Renderer::<App>::with_root(root).render();
    }
}
