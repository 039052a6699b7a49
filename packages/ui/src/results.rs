use client::ResultsPanel;
use dioxus::prelude::*;

use crate::app::use_app;

/// Sidebar card showing the latest analysis for the pinned location.
#[component]
pub fn ResultsView() -> Element {
    let app = use_app();
    let app = app.read();
    let map = (*app).map();

    let Some(selection) = map.selection() else {
        return rsx! {
            div { class: "results-empty",
                p { "📍 Click anywhere on the map to pin a location." }
            }
        };
    };
    let coords = format!("{:.6}, {:.6}", selection.point.lat, selection.point.lng);

    let body = if map.is_loading() {
        rsx! { div { class: "results-loading", "Analyzing location..." } }
    } else if let Some(err) = map.analysis_error() {
        rsx! { div { class: "results-error", "{err}" } }
    } else if let Some(analysis) = map.latest() {
        let panel = ResultsPanel::from_analysis(analysis);
        rsx! { PanelBody { panel } }
    } else {
        rsx! { div { class: "results-hint", "Choose a café type to analyse this location." } }
    };

    rsx! {
        div { class: "results",
            div { class: "results-coords", "{coords}" }
            {body}
        }
    }
}

#[component]
fn PanelBody(panel: ResultsPanel) -> Element {
    let score = panel.ring_score.clamp(0.0, 100.0);
    let ring = format!(
        "background: conic-gradient({color} 0% {score}%, #e9ecef {score}% 100%)",
        color = panel.band.color(),
    );

    rsx! {
        div { class: "score-block",
            div { class: "score-circle", style: "{ring}",
                span { class: "score-value", "{panel.score}" }
            }
            div { class: "prediction-card",
                div { class: "prediction-type", "{panel.prediction}" }
                div { class: "prediction-confidence", "Confidence: {panel.confidence}" }
            }
        }
        div { class: "metrics",
            Metric { label: "Competitors", value: panel.competitors.clone() }
            Metric { label: "Road Length", value: panel.road_length.clone() }
            Metric { label: "Population Density", value: panel.population_density.clone() }
        }
        h4 { "Top Cafés Nearby" }
        div { class: "top5-list",
            if panel.cafes.is_empty() {
                p { class: "no-data", "No cafés found in this area" }
            }
            for cafe in panel.cafes.iter() {
                div { class: "cafe-item",
                    div { class: "cafe-name", "{cafe.name}" }
                    div { class: "cafe-rating", "{cafe.rating}" }
                }
            }
        }
    }
}

#[component]
fn Metric(label: &'static str, value: String) -> Element {
    rsx! {
        div { class: "metric",
            div { class: "metric-value", "{value}" }
            div { class: "metric-label", "{label}" }
        }
    }
}
