use client::Notification;
use dioxus::prelude::*;

use crate::app::{sleep, use_app};

/// Stack of transient notifications, newest at the bottom.
#[component]
pub fn Toasts() -> Element {
    let app = use_app();
    let items = app.read().notifications().items().to_vec();

    rsx! {
        div { class: "notifications",
            for item in items {
                Toast { key: "{item.id}", item }
            }
        }
    }
}

#[component]
fn Toast(item: Notification) -> Element {
    let mut app = use_app();
    let id = item.id;

    // Auto-dismiss after the configured timeout.
    use_hook(move || {
        let timeout = app.peek().notifications().timeout();
        spawn(async move {
            sleep(timeout).await;
            app.write().dismiss(id);
        })
    });

    let class = format!("notification {}", item.level.class());
    let icon = item.level.icon();
    rsx! {
        div {
            class: "{class}",
            title: "Click to dismiss",
            onclick: move |_| app.write().dismiss(id),
            span { class: "notification-icon", "{icon}" }
            span { class: "notification-message", "{item.message}" }
        }
    }
}
