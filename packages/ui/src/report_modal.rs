use client::FullReport;
use dioxus::prelude::*;

/// Full-screen overlay with the area report. Clicking outside the card
/// triggers `on_close`.
#[component]
pub fn ReportModal(report: FullReport, on_close: EventHandler<()>) -> Element {
    rsx! {
        div { class: "modal-backdrop", onclick: move |_| on_close.call(()),
            div {
                class: "modal-card",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),
                div { class: "modal-header",
                    h2 { "📋 Full Location Report" }
                    button { class: "modal-close", onclick: move |_| on_close.call(()), "×" }
                }
                div { class: "modal-body",
                    section { class: "report-section",
                        h3 { "📍 Location Details" }
                        div { class: "report-grid",
                            ReportItem { label: "Coordinates", value: report.coordinates.clone() }
                            ReportItem { label: "Analysis Radius", value: report.radius.clone() }
                            ReportItem { label: "Café Type", value: report.cafe_type.clone() }
                        }
                    }
                    section { class: "report-section",
                        h3 { "📊 Suitability Analysis" }
                        div { class: "report-grid",
                            ReportItem { label: "Overall Score", value: format!("{} / 100", report.score_text) }
                            ReportItem { label: "Competitors Nearby", value: report.competitors.clone() }
                            ReportItem { label: "Road Accessibility", value: report.road_length.clone() }
                            ReportItem { label: "Population Density", value: report.population_density.clone() }
                        }
                    }
                    if let Some(population) = report.population.as_ref() {
                        section { class: "report-section",
                            h3 { "👥 Population in Selected Area" }
                            div { class: "report-grid",
                                ReportItem { label: "Total Population", value: population.total.clone() }
                                ReportItem { label: "Affected Wards", value: population.wards_label.clone() }
                            }
                            if !population.wards.is_empty() {
                                ul { class: "report-list",
                                    for ward in population.wards.iter() {
                                        li { "Ward {ward.ward_number}: {ward.population} population, {ward.density}" }
                                    }
                                }
                            }
                        }
                    }
                    if !report.amenities.is_empty() {
                        section { class: "report-section",
                            h3 { "🏘️ Amenities in Selected Area" }
                            div { class: "report-grid",
                                for group in report.amenities.iter() {
                                    ReportItem { label: group.title.clone(), value: group.count.to_string() }
                                }
                            }
                            for group in report.amenities.iter().filter(|g| g.count > 0) {
                                div { class: "amenity-listing",
                                    strong { "{group.title} ({group.count})" }
                                    ul { class: "report-list",
                                        for name in group.names.iter() {
                                            li { "{name}" }
                                        }
                                        if let Some(more) = group.more.as_ref() {
                                            li { em { "{more}" } }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    if !report.probabilities.is_empty() {
                        section { class: "report-section",
                            h3 { "🤖 ML Model Probabilities" }
                            div { class: "report-grid",
                                for (label, value) in report.probabilities.iter() {
                                    ReportItem { label: label.clone(), value: value.clone() }
                                }
                            }
                        }
                    }
                    div { class: "report-insights",
                        h4 { "💡 Key Insights & Recommendations" }
                        ul {
                            for insight in report.insights.iter() {
                                li {
                                    strong { "{insight.title}: " }
                                    "{insight.text}"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ReportItem(label: String, value: String) -> Element {
    rsx! {
        div { class: "report-item",
            strong { "{label}:" }
            br {}
            "{value}"
        }
    }
}
