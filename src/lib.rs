use std::cell::RefCell;
use wasm_bindgen::prelude::*;

pub mod geom;
pub mod map;
pub mod web;

use map::body::BodyKind;
use map::config::MapConfig;
use map::pick::PickEvent;
use map::StarMap;
use web::DomView;

struct App {
    map: StarMap,
    view: Option<DomView>,
    viewport: (f64, f64),
}

thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

fn with_app_mut<R>(f: impl FnOnce(&mut App) -> R) -> Result<R, &'static str> {
    APP.with(|cell| {
        let mut opt = cell.borrow_mut();
        match opt.as_mut() {
            Some(app) => Ok(f(app)),
            None => Err("map not initialized"),
        }
    })
}

fn with_app<R>(f: impl FnOnce(&mut App) -> Result<R, JsValue>) -> Result<R, JsValue> {
    with_app_mut(f).map_err(JsValue::from_str)?
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info)
        .map_err(|err| JsValue::from_str(&format!("failed to init logger: {err}")))
}

#[wasm_bindgen]
pub fn init_map(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json {
        Some(json) => MapConfig::from_json(&json)
            .map_err(|err| JsValue::from_str(&format!("invalid map config: {err}")))?,
        None => MapConfig::default(),
    };
    APP.with(|app| {
        *app.borrow_mut() = Some(App {
            map: StarMap::new(config),
            view: None,
            viewport: (1.0, 1.0),
        });
    });
    Ok(())
}

#[wasm_bindgen]
pub fn mount() -> Result<(), JsValue> {
    with_app(|app| {
        let view = DomView::mount(&app.map.config().dom)?;
        view.on_pointer(on_canvas_move, on_canvas_down)?;
        view.build_filter_buttons(on_filter_click)?;
        view.sync_filters(app.map.filters())?;
        view.render_list(app.map.poi_list())?;
        let (width, height) = view.fit_canvas();
        app.viewport = (width, height);
        app.map.resize(width, height);
        app.view = Some(view);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn load_document(json: &str) -> Result<String, JsValue> {
    with_app(|app| {
        let summary = app.map.load_str(json).map_err(|err| {
            log::error!("{err}");
            JsValue::from_str(&err.to_string())
        })?;
        if let Some(view) = &app.view {
            view.render_list(app.map.poi_list())?;
            view.clear_detail()?;
        }
        serde_json::to_string(&summary).map_err(|err| JsValue::from_str(&err.to_string()))
    })
}

#[wasm_bindgen]
pub async fn load_url(url: String) -> Result<String, JsValue> {
    let text = web::fetch_text(&url).await.map_err(|err| {
        log::error!("failed to fetch {url}: {err:?}");
        err
    })?;
    load_document(&text)
}

#[wasm_bindgen]
pub fn resize(width: f64, height: f64) -> Result<(), JsValue> {
    with_app(|app| {
        let (width, height) = match &app.view {
            Some(view) => view.fit_canvas(),
            None => (width, height),
        };
        app.viewport = (width, height);
        app.map.resize(width, height);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn pointer_move(x: f64, y: f64) -> Result<(), JsValue> {
    with_app(|app| {
        let (width, height) = app.viewport;
        let event = app.map.on_pointer_move(web::pixel_to_ndc(x, y, width, height));
        show_pick(app, event)
    })
}

#[wasm_bindgen]
pub fn pointer_down() -> Result<bool, JsValue> {
    with_app(|app| Ok(app.map.on_pointer_down()))
}

/// Re-picks and repaints. Call once per animation frame.
#[wasm_bindgen]
pub fn frame() -> Result<(), JsValue> {
    with_app(|app| {
        let event = app.map.tick();
        show_pick(app, event)?;
        match &app.view {
            Some(view) => view.paint(app.map.scene(), app.map.camera()),
            None => Ok(()),
        }
    })
}

fn show_pick(app: &App, event: PickEvent) -> Result<(), JsValue> {
    let Some(view) = &app.view else {
        return Ok(());
    };
    match event {
        PickEvent::Highlighted { .. } => match app.map.detail() {
            Some(detail) => view.show_detail(&detail),
            None => Ok(()),
        },
        PickEvent::Cleared => view.clear_detail(),
        PickEvent::Unchanged => Ok(()),
    }
}

/// Flips one POI filter (`planet`, `moons`, ...). Returns whether it is now active.
#[wasm_bindgen]
pub fn toggle_filter(kind: &str) -> Result<bool, JsValue> {
    let kind = BodyKind::from_filter_name(kind)
        .ok_or_else(|| JsValue::from_str(&format!("unknown filter `{kind}`")))?;
    with_app(|app| {
        let active = app.map.toggle_filter(kind);
        if let Some(view) = &app.view {
            view.sync_filters(app.map.filters())?;
            view.render_list(app.map.poi_list())?;
        }
        Ok(active)
    })
}

#[wasm_bindgen]
pub fn poi_list_json() -> Result<String, JsValue> {
    with_app(|app| {
        serde_json::to_string(app.map.poi_list()).map_err(|err| JsValue::from_str(&err.to_string()))
    })
}

#[wasm_bindgen]
pub fn selection_json() -> Result<String, JsValue> {
    with_app(|app| {
        serde_json::to_string(&app.map.detail()).map_err(|err| JsValue::from_str(&err.to_string()))
    })
}

fn on_canvas_move(x: f64, y: f64) {
    if let Err(err) = pointer_move(x, y) {
        log::warn!("pointer move ignored: {err:?}");
    }
}

fn on_canvas_down() {
    if let Err(err) = pointer_down() {
        log::warn!("pointer down ignored: {err:?}");
    }
}

fn on_filter_click(kind: BodyKind) {
    if let Err(err) = toggle_filter(kind.label()) {
        log::warn!("filter toggle failed: {err:?}");
    }
}
