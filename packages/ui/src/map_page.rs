//! Map page: header, selection controls, results sidebar, and report modal.

use api::CafeType;
use client::FullReport;
use dioxus::prelude::*;

use crate::app::{spawn_analysis, spawn_report, use_app, use_config};
use crate::map_canvas::MapCanvas;
use crate::report_modal::ReportModal;
use crate::results::ResultsView;

#[component]
pub fn MapPage() -> Element {
    let mut app = use_app();
    let config = use_config();
    let mut report = use_signal(|| Option::<FullReport>::None);
    let mut report_loading = use_signal(|| false);

    let (user_name, is_guest, radius, cafe_type, has_point) = {
        let app = app.read();
        let user = app.session().current_user();
        (
            user.map(|u| u.display_name().to_string()).unwrap_or_default(),
            user.is_some_and(|u| u.is_guest),
            (*app).map().radius_m(),
            (*app).map().cafe_type(),
            (*app).map().selection().is_some(),
        )
    };

    let on_category = move |evt: Event<FormData>| match evt.value().parse::<CafeType>() {
        Ok(cafe_type) => {
            let ticket = app.write().set_category(cafe_type);
            spawn_analysis(app, ticket);
        }
        Err(err) => tracing::warn!("{}", err),
    };

    let open_report = move |_| {
        let Some(ticket) = app.write().begin_report() else {
            return;
        };
        report_loading.set(true);
        spawn_report(app, ticket, move |built| {
            report_loading.set(false);
            if built.is_some() {
                report.set(built);
            }
        });
    };

    rsx! {
        div { class: "map-page",
            header { class: "map-header",
                h1 { "☕ CafeLocate" }
                div { class: "user-info",
                    span { class: "user-name",
                        if is_guest { "👤 {user_name} (Guest)" } else { "👤 {user_name}" }
                    }
                    button { class: "btn btn-logout", onclick: move |_| app.write().logout(), "Logout" }
                }
            }
            div { class: "map-layout",
                aside { class: "sidebar",
                    div { class: "control",
                        label { r#for: "cafe-type-select", "Café Type" }
                        select {
                            id: "cafe-type-select",
                            class: if has_point && cafe_type.is_none() { "needs-attention" } else { "" },
                            onchange: on_category,
                            option { value: "", disabled: true, selected: cafe_type.is_none(), "Select a café type" }
                            for t in CafeType::ALL {
                                option {
                                    value: t.as_str(),
                                    selected: cafe_type == Some(t),
                                    "{t.label()}"
                                }
                            }
                        }
                    }
                    div { class: "control",
                        label { r#for: "radius-slider", "Analysis Radius: {radius} m" }
                        input {
                            id: "radius-slider",
                            r#type: "range",
                            min: "{config.map.min_radius_m}",
                            max: "{config.map.max_radius_m}",
                            step: "100",
                            value: "{radius}",
                            oninput: move |evt| {
                                if let Ok(meters) = evt.value().parse::<u32>() {
                                    app.write().preview_radius(meters);
                                }
                            },
                            onchange: move |evt| {
                                if let Ok(meters) = evt.value().parse::<u32>() {
                                    let ticket = app.write().set_radius(meters);
                                    spawn_analysis(app, ticket);
                                }
                            },
                        }
                    }
                    ResultsView {}
                    button {
                        class: "btn btn-primary btn-report",
                        disabled: report_loading(),
                        onclick: open_report,
                        if report_loading() { "Generating report..." } else { "📋 Generate Full Report" }
                    }
                }
                main { class: "map-container", MapCanvas {} }
            }
            if let Some(built) = report() {
                ReportModal { report: built, on_close: move |_| report.set(None) }
            }
        }
    }
}
