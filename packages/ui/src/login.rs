//! Login, registration, and guest entry.

use api::AuthApi;
use client::AuthForm;
use dioxus::prelude::*;

use crate::app::use_app;

#[component]
pub fn LoginPage() -> Element {
    let mut app = use_app();
    let form = app.read().form();

    rsx! {
        div { class: "auth-page",
            div { class: "auth-card",
                h1 { class: "auth-title", "☕ CafeLocate" }
                p { class: "auth-subtitle", "Find the best spot for your next café in Kathmandu" }

                div { class: "auth-tabs",
                    button {
                        class: if form == AuthForm::Login { "auth-tab active" } else { "auth-tab" },
                        onclick: move |_| app.write().show_form(AuthForm::Login),
                        "Login"
                    }
                    button {
                        class: if form == AuthForm::Register { "auth-tab active" } else { "auth-tab" },
                        onclick: move |_| app.write().show_form(AuthForm::Register),
                        "Register"
                    }
                }

                match form {
                    AuthForm::Login => rsx! { LoginForm {} },
                    AuthForm::Register => rsx! { RegisterForm {} },
                }

                div { class: "auth-divider", span { "or" } }
                button {
                    class: "btn btn-guest",
                    onclick: move |_| {
                        app.write().guest_login();
                    },
                    "Continue as Guest"
                }
            }
        }
    }
}

#[component]
fn PasswordInput(value: Signal<String>, placeholder: &'static str) -> Element {
    let mut value = value;
    let mut visible = use_signal(|| false);

    rsx! {
        div { class: "password-field",
            input {
                r#type: if visible() { "text" } else { "password" },
                placeholder,
                value: "{value}",
                oninput: move |evt| value.set(evt.value()),
            }
            button {
                r#type: "button",
                class: "password-toggle",
                title: if visible() { "Hide password" } else { "Show password" },
                onclick: move |_| visible.toggle(),
                if visible() { "🙈" } else { "👁" }
            }
        }
    }
}

#[component]
fn LoginForm() -> Element {
    let mut app = use_app();
    let mut username = use_signal(String::new);
    let password = use_signal(String::new);
    let busy = app.read().is_busy();

    let submit = move |_| async move {
        let Ok(credentials) = app.write().prepare_login(&username(), &password()) else {
            return;
        };
        let api = app.peek().session().api().clone();
        let result = api.login(&credentials.username, &credentials.password).await;
        if let Err(err) = app.write().finish_login(result) {
            tracing::debug!("login not completed: {}", err);
        }
    };

    rsx! {
        div { class: "auth-form",
            input {
                r#type: "text",
                placeholder: "Username",
                value: "{username}",
                oninput: move |evt| username.set(evt.value()),
            }
            PasswordInput { value: password, placeholder: "Password" }
            button {
                class: "btn btn-primary",
                disabled: busy,
                onclick: submit,
                if busy { "Logging in..." } else { "Login" }
            }
        }
    }
}

#[component]
fn RegisterForm() -> Element {
    let mut app = use_app();
    let mut username = use_signal(String::new);
    let mut email = use_signal(String::new);
    let password = use_signal(String::new);
    let busy = app.read().is_busy();

    let submit = move |_| async move {
        let Ok(registration) = app.write().prepare_register(&username(), &email(), &password())
        else {
            return;
        };
        let api = app.peek().session().api().clone();
        let result = api
            .register(&registration.username, &registration.email, &registration.password)
            .await;
        if let Err(err) = app.write().finish_register(result) {
            tracing::debug!("registration not completed: {}", err);
        }
    };

    rsx! {
        div { class: "auth-form",
            input {
                r#type: "text",
                placeholder: "Username",
                value: "{username}",
                oninput: move |evt| username.set(evt.value()),
            }
            input {
                r#type: "email",
                placeholder: "Email",
                value: "{email}",
                oninput: move |evt| email.set(evt.value()),
            }
            PasswordInput { value: password, placeholder: "Password (min. 6 characters)" }
            button {
                class: "btn btn-primary",
                disabled: busy,
                onclick: submit,
                if busy { "Creating account..." } else { "Create Account" }
            }
        }
    }
}
