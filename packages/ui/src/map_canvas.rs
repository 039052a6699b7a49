//! Leaflet map bridge.
//!
//! Leaflet is loaded from a CDN on first mount. Clicks come back through a
//! long-lived eval channel as `[lat, lng]`; overlays go the other way as one
//! JSON document per revision, which the page-side script redraws wholesale.

use client::Overlays;
use dioxus::prelude::*;

use crate::app::{spawn_analysis, use_app, use_config};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const MAP_ID: &str = "cafelocate-map";

#[component]
pub fn MapCanvas() -> Element {
    let app = use_app();
    let config = use_config();
    let mut ready = use_signal(|| false);
    let mut drawn = use_signal(|| Option::<u64>::None);

    // ── Load Leaflet and create the map once ──
    use_effect(move || {
        let map = &config.map;
        let js = format!(
            r#"(function() {{
                function init() {{
                    var el = document.getElementById('{MAP_ID}');
                    if (!el) {{ dioxus.send(false); return; }}
                    if (!el._map) {{
                        var bounds = L.latLngBounds({bounds});
                        var map = L.map(el, {{ maxBounds: bounds, maxBoundsViscosity: 1.0, minZoom: 11 }})
                            .setView({center}, {zoom});
                        L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
                            attribution: '&copy; OpenStreetMap contributors'
                        }}).addTo(map);
                        el._map = map;
                        el._layers = L.layerGroup().addTo(map);
                    }}
                    dioxus.send(true);
                }}
                if (typeof L !== 'undefined') {{ init(); return; }}
                if (!document.getElementById('leaflet-css')) {{
                    var link = document.createElement('link');
                    link.id = 'leaflet-css';
                    link.rel = 'stylesheet';
                    link.href = '{LEAFLET_CSS}';
                    document.head.appendChild(link);
                }}
                var script = document.getElementById('leaflet-js');
                if (!script) {{
                    script = document.createElement('script');
                    script.id = 'leaflet-js';
                    script.src = '{LEAFLET_JS}';
                    document.head.appendChild(script);
                }}
                script.addEventListener('load', init);
                script.addEventListener('error', function() {{ dioxus.send(false); }});
            }})();"#,
            bounds = json_or_null(&map.bounds),
            center = json_or_null(&map.center),
            zoom = map.zoom,
        );
        spawn(async move {
            let mut eval = document::eval(&js);
            match eval.recv::<bool>().await {
                Ok(true) => ready.set(true),
                Ok(false) => tracing::error!("Leaflet failed to load"),
                Err(e) => tracing::error!("map bridge failed: {:?}", e),
            }
        });
    });

    // ── Click bridge ──
    use_effect(move || {
        if !ready() {
            return;
        }
        spawn(async move {
            let mut app = app;
            let js = format!(
                r#"(function() {{
                    var el = document.getElementById('{MAP_ID}');
                    if (!el || !el._map) return;
                    if (el._onClick) el._map.off('click', el._onClick);
                    el._onClick = function(e) {{ dioxus.send([e.latlng.lat, e.latlng.lng]); }};
                    el._map.on('click', el._onClick);
                }})();"#
            );
            let mut eval = document::eval(&js);
            while let Ok([lat, lng]) = eval.recv::<[f64; 2]>().await {
                let ticket = app.write().select_point(lat, lng);
                spawn_analysis(app, ticket);
            }
        });
    });

    // ── Push overlays whenever their revision changes ──
    use_effect(move || {
        let overlays = (*app.read()).map().overlays().clone();
        if !ready() || *drawn.peek() == Some(overlays.revision) {
            return;
        }
        drawn.set(Some(overlays.revision));
        document::eval(&draw_script(&overlays));
    });

    rsx! {
        div { id: MAP_ID, class: "map-canvas" }
    }
}

fn json_or_null<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn draw_script(overlays: &Overlays) -> String {
    format!(
        r#"(function() {{
            var el = document.getElementById('{MAP_ID}');
            if (!el || !el._map) return;
            var o = {overlays};
            el._layers.clearLayers();
            if (o.marker) {{
                L.marker([o.marker.lat, o.marker.lng])
                    .bindPopup('<b>📍 Selected Location</b><br>Lat: ' + o.marker.lat.toFixed(6) + '<br>Lng: ' + o.marker.lng.toFixed(6))
                    .addTo(el._layers);
            }}
            if (o.circle) {{
                L.circle([o.circle.center.lat, o.circle.center.lng], {{
                    radius: o.circle.radius_m, color: '#6c5ce7', fillColor: '#a29bfe', fillOpacity: 0.15
                }}).addTo(el._layers);
            }}
            o.cafes.forEach(function(c) {{
                var popup = document.createElement('div');
                var name = document.createElement('b');
                name.textContent = c.name;
                popup.appendChild(name);
                var info = document.createElement('div');
                info.textContent = (c.cafe_type ? c.cafe_type + ' · ' : '')
                    + (c.rating ? '⭐ ' + c.rating + ' (' + c.review_count + ' reviews)' : 'No rating');
                popup.appendChild(info);
                L.circleMarker([c.position.lat, c.position.lng], {{
                    radius: 7, color: '#e17055', fillColor: '#fab1a0', fillOpacity: 0.9
                }}).bindPopup(popup).addTo(el._layers);
            }});
        }})();"#,
        overlays = json_or_null(overlays),
    )
}
