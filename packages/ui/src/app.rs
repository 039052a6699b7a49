//! Application context: one [`AppController`] shared by every view.

use api::ApiClient;
use client::{AnalysisTicket, FullReport, MapController, ReportTicket, SessionStore, UiController};
use dioxus::prelude::*;
use store::ClientConfig;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub type PlatformStore = store::LocalStore;
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStore = store::FileStore;
#[cfg(all(target_arch = "wasm32", not(feature = "web")))]
pub type PlatformStore = store::MemoryStore;

pub type AppController = UiController<PlatformStore, ApiClient, ApiClient>;

/// Create the platform-appropriate session store.
///
/// - **Web** (WASM + `web` feature): `window.localStorage`
/// - **Native**: one file per key under `<data_dir>/cafelocate/`
pub fn make_store() -> PlatformStore {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        store::LocalStore::new()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let base = dirs::data_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("cafelocate");
        store::FileStore::new(base)
    }
    #[cfg(all(target_arch = "wasm32", not(feature = "web")))]
    {
        store::MemoryStore::new()
    }
}

/// Build the controller and restore whatever session the last visit left.
pub fn make_controller(config: &ClientConfig) -> AppController {
    let api = ApiClient::new(config.api.base_url.as_str());
    let session = SessionStore::new(make_store(), api.clone());
    let map = MapController::with_config(api, &config.map);
    let mut controller = UiController::new(session, map, config.ui.notification_timeout());
    let page = controller.start();
    tracing::info!(?page, base_url = %config.api.base_url, "CafeLocate started");
    controller
}

pub fn use_app() -> Signal<AppController> {
    use_context::<Signal<AppController>>()
}

pub fn use_config() -> ClientConfig {
    use_context::<ClientConfig>()
}

#[component]
pub fn AppProvider(config: ClientConfig, children: Element) -> Element {
    let controller = use_signal({
        let config = config.clone();
        move || make_controller(&config)
    });
    use_context_provider(|| controller);
    use_context_provider(|| config);

    rsx! {
        {children}
    }
}

/// Run an analysis ticket in the background and apply its result.
pub fn spawn_analysis(mut app: Signal<AppController>, ticket: Option<AnalysisTicket>) {
    let Some(ticket) = ticket else {
        return;
    };
    let api = (*app.peek()).map().api().clone();
    spawn(async move {
        let completion = ticket.run(&api).await;
        app.write().complete_analysis(completion);
    });
}

/// Fetch area data for a report ticket and hand the built report to
/// `on_ready`. A superseded fetch yields `None`.
pub fn spawn_report(
    mut app: Signal<AppController>,
    ticket: ReportTicket,
    on_ready: impl FnOnce(Option<FullReport>) + 'static,
) {
    let api = (*app.peek()).map().api().clone();
    spawn(async move {
        let completion = ticket.run(&api).await;
        let report = app.write().complete_report(completion);
        on_ready(report);
    });
}

pub(crate) async fn sleep(duration: std::time::Duration) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;
}
