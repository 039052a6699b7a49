use dioxus::prelude::*;

use store::ClientConfig;
use ui::{AppProvider, AppShell};

/// Deployment settings, fixed at build time.
const CONFIG_TOML: &str = include_str!("../cafelocate.toml");

fn main() {
    dioxus::launch(App);
}

fn load_config() -> ClientConfig {
    match ClientConfig::from_toml(CONFIG_TOML) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to parse {}: {}", ClientConfig::filename(), e);
            ClientConfig::default()
        }
    }
}

#[component]
fn App() -> Element {
    let config = use_hook(load_config);

    rsx! {
        AppProvider { config,
            AppShell {}
        }
    }
}
