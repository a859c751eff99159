//! Test suite for the Web and headless browsers.

#![cfg(target_arch = "wasm32")]

use star_map::map::body::BodyKind;
use star_map::map::config::DomIds;
use star_map::map::StarMap;
use star_map::web::DomView;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

const SYSTEM: &str = r#"{"star": {"id": "s1", "name": "Helios", "type": "star",
    "center": {"x": 0, "y": 0, "z": 0},
    "children": [
        {"id": "p1", "name": "Terra", "type": "planet",
         "center": {"x": 100000000, "y": 0, "z": 0}, "radius": 1, "gravity": 1,
         "children": [{"id": "m1", "name": "Luna", "type": "moon",
            "center": {"x": 101000000, "y": 0, "z": 0}}]}
    ]}}"#;

fn page(ids: &DomIds) -> Document {
    let document = web_sys::window().unwrap().document().unwrap();
    let body = document.body().unwrap();
    body.set_inner_html(&format!(
        r#"<div id="{map}" style="width: 400px; height: 300px"></div>
           <div id="{filters}"></div>
           <div id="{list}"></div>
           <div id="{detail}">
             <img id="{image}"/>
             <p id="{name}"></p><p id="{gravity}"></p><p id="{size}"></p>
           </div>"#,
        map = ids.map,
        filters = ids.filters,
        list = ids.list,
        detail = ids.detail,
        image = ids.image,
        name = ids.name,
        gravity = ids.gravity,
        size = ids.size,
    ));
    document
}

fn list_names(document: &Document, ids: &DomIds) -> Vec<String> {
    let items = document
        .query_selector_all(&format!("#{} li > span", ids.list))
        .unwrap();
    (0..items.length())
        .filter_map(|i| items.item(i))
        .filter_map(|node| node.text_content())
        .collect()
}

#[wasm_bindgen_test]
fn list_view_follows_filters() {
    let ids = DomIds::default();
    let document = page(&ids);
    let view = DomView::mount(&ids).unwrap();

    let mut map = StarMap::default();
    map.load_str(SYSTEM).unwrap();
    view.render_list(map.poi_list()).unwrap();
    assert_eq!(list_names(&document, &ids), vec!["Helios", "Terra", "Luna"]);

    let nested = document
        .query_selector(&format!("#{} li[data-body-id=\"p1\"] > ul > li", ids.list))
        .unwrap();
    assert!(nested.is_some(), "moon should sit in the planet's sublist");

    map.toggle_filter(BodyKind::Planet);
    view.render_list(map.poi_list()).unwrap();
    assert_eq!(list_names(&document, &ids), vec!["Helios", "Luna"]);
}

#[wasm_bindgen_test]
fn detail_panel_shows_and_clears() {
    let ids = DomIds::default();
    let document = page(&ids);
    let view = DomView::mount(&ids).unwrap();

    let mut map = StarMap::default();
    map.load_str(SYSTEM).unwrap();
    let terra = map.tree().unwrap().get("p1").unwrap();
    let detail = star_map::map::pick::BodyDetail::from_body(terra, &map.config().icon_path);
    view.show_detail(&detail).unwrap();

    let text = |id: &str| document.get_element_by_id(id).unwrap().text_content();
    assert_eq!(text(&ids.name).as_deref(), Some("Terra (1)"));
    assert_eq!(text(&ids.gravity).as_deref(), Some("1g"));
    assert_eq!(text(&ids.size).as_deref(), Some("1"));

    view.clear_detail().unwrap();
    assert_eq!(text(&ids.name).as_deref(), Some(""));
    let panel: HtmlElement = document
        .get_element_by_id(&ids.detail)
        .unwrap()
        .dyn_into()
        .unwrap();
    assert_eq!(panel.style().get_property_value("display").unwrap(), "none");
}

#[wasm_bindgen_test]
fn painting_without_a_document_is_a_no_op() {
    let ids = DomIds::default();
    page(&ids);
    let view = DomView::mount(&ids).unwrap();
    view.fit_canvas();
    let map = StarMap::default();
    view.paint(map.scene(), map.camera()).unwrap();
}

#[wasm_bindgen_test]
fn start_routes_info_logs_to_the_console() {
    let _ = star_map::start();
    assert_eq!(log::max_level(), log::LevelFilter::Info);
    let record = log::Metadata::builder()
        .level(log::Level::Info)
        .target("star_map")
        .build();
    assert!(log::logger().enabled(&record));
    assert!(star_map::start().is_err(), "logger is installed only once");
}
