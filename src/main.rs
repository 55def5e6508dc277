mod api;
mod app;
mod identity;
mod persisted;
mod persisted_store;
mod scheduler;

use app::App;

fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
