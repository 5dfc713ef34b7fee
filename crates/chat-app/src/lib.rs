//! Chat App: WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It assembles the HTTP adapter, the session and the directory and hands
//! them to the egui UI.

#[cfg(target_arch = "wasm32")]
mod app;
mod navigation;


#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
use chat_types::config::ClientConfig;

#[cfg(target_arch = "wasm32")]
const CANVAS_ID: &str = "chat_canvas";
#[cfg(target_arch = "wasm32")]
const API_BASE_ATTR: &str = "data-api-base";

/// Config from the canvas element's attributes; an invalid base URL
/// falls back to the default.
#[cfg(target_arch = "wasm32")]
fn config_from_canvas(canvas: &web_sys::HtmlCanvasElement) -> ClientConfig {
    let config = ClientConfig::default();
    let Some(base) = canvas.get_attribute(API_BASE_ATTR) else {
        return config;
    };
    match config.clone().with_api_base(&base) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring {}: {}", API_BASE_ATTR, e);
            config
        }
    }
}

/// WASM entry point: called from index.html
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn main() {
    // Initialize logging
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Chat client starting...");

    let web_options = eframe::WebOptions::default();

    // Get the canvas element by ID
    let document = web_sys::window()
        .expect("No window")
        .document()
        .expect("No document");
    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .expect("No canvas element with id 'chat_canvas'")
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .expect("Element is not a canvas");
    let config = config_from_canvas(&canvas);

    wasm_bindgen_futures::spawn_local(async move {
        eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(app::ChatApp::new(cc, config)))),
            )
            .await
            .expect("Failed to start eframe");
    });
}
