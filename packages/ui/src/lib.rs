//! Dioxus views for CafeLocate.

use client::Page;
use dioxus::prelude::*;

mod app;
pub use app::{make_controller, make_store, use_app, use_config, AppController, AppProvider, PlatformStore};

mod login;
pub use login::LoginPage;

mod map_page;
pub use map_page::MapPage;

mod map_canvas;
mod report_modal;
mod results;

mod toasts;
pub use toasts::Toasts;

pub const MAIN_CSS: Asset = asset!("/assets/cafelocate.css");

/// Page switch driven by the session lifecycle, plus the toast stack.
#[component]
pub fn AppShell() -> Element {
    let app = use_app();
    let page = app.read().page();

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        match page {
            Page::Login => rsx! { LoginPage {} },
            Page::Map => rsx! { MapPage {} },
        }
        Toasts {}
    }
}
