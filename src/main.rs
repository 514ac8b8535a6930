mod app;
mod components;
mod pages;

use app::App;

fn main() {
    console_error_panic_hook::set_once();
    themeshift::logging::init(None);

    leptos::mount::mount_to_body(App);
}
