use crate::geom::{DVec2, DVec3};
use crate::map::body::BodyKind;
use crate::map::config::DomIds;
use crate::map::pick::BodyDetail;
use crate::map::poi::{FilterSet, PoiEntry};
use crate::map::scene::{Camera, Primitive, Scene, Shape};
use std::f64::consts::TAU;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlButtonElement, HtmlCanvasElement,
    HtmlElement, HtmlImageElement, MouseEvent, Response,
};

const RING_SEGMENTS: usize = 48;
const LABEL_OFFSET_PX: f64 = 8.0;

fn js_err(msg: impl AsRef<str>) -> JsValue {
    JsValue::from_str(msg.as_ref())
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| js_err("no document available"))
}

fn element(doc: &Document, id: &str) -> Result<Element, JsValue> {
    doc.get_element_by_id(id)
        .ok_or_else(|| js_err(format!("element #{id} not found")))
}

pub async fn fetch_text(url: &str) -> Result<String, JsValue> {
    let window = web_sys::window().ok_or_else(|| js_err("no window available"))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(js_err(format!(
            "GET {url} failed with status {}",
            response.status()
        )));
    }
    JsFuture::from(response.text()?)
        .await?
        .as_string()
        .ok_or_else(|| js_err("response body is not text"))
}

struct DetailPanel {
    root: Option<HtmlElement>,
    image: Option<HtmlImageElement>,
    name: Option<Element>,
    gravity: Option<Element>,
    size: Option<Element>,
}

impl DetailPanel {
    fn find(doc: &Document, ids: &DomIds) -> Self {
        let get = |id: &str| doc.get_element_by_id(id);
        Self {
            root: get(&ids.detail).and_then(|e| e.dyn_into().ok()),
            image: get(&ids.image).and_then(|e| e.dyn_into().ok()),
            name: get(&ids.name),
            gravity: get(&ids.gravity),
            size: get(&ids.size),
        }
    }

    fn show(&self, detail: &BodyDetail) -> Result<(), JsValue> {
        if let Some(image) = &self.image {
            image.set_src(&detail.image);
            image.style().set_property("opacity", "1.0")?;
        }
        set_text(&self.name, &detail.name);
        set_text(&self.gravity, &detail.gravity);
        set_text(&self.size, &detail.size);
        if let Some(root) = &self.root {
            root.style().remove_property("display")?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), JsValue> {
        if let Some(image) = &self.image {
            image.style().set_property("opacity", "0.0")?;
        }
        set_text(&self.name, "");
        set_text(&self.gravity, "");
        set_text(&self.size, "");
        if let Some(root) = &self.root {
            root.style().set_property("display", "none")?;
        }
        Ok(())
    }
}

fn set_text(el: &Option<Element>, text: &str) {
    if let Some(el) = el {
        el.set_text_content(Some(text));
    }
}

pub struct DomView {
    document: Document,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    list: Element,
    filters: Option<Element>,
    detail: DetailPanel,
}

impl DomView {
    pub fn mount(ids: &DomIds) -> Result<Self, JsValue> {
        let document = document()?;
        let host = element(&document, &ids.map)?;
        let canvas = match host.clone().dyn_into::<HtmlCanvasElement>() {
            Ok(canvas) => canvas,
            Err(host) => {
                let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
                host.append_child(&canvas)?;
                canvas
            }
        };
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| js_err("2d context unavailable"))?
            .dyn_into()?;
        let list = element(&document, &ids.list)?;
        let filters = document.get_element_by_id(&ids.filters);
        let detail = DetailPanel::find(&document, ids);

        let view = Self {
            document,
            canvas,
            ctx,
            list,
            filters,
            detail,
        };
        view.detail.clear()?;
        Ok(view)
    }

    pub fn fit_canvas(&self) -> (f64, f64) {
        let width = self.canvas.client_width().max(1) as u32;
        let height = self.canvas.client_height().max(1) as u32;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        (width as f64, height as f64)
    }

    pub fn on_pointer(&self, on_move: fn(f64, f64), on_down: fn()) -> Result<(), JsValue> {
        let moved = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            on_move(event.offset_x() as f64, event.offset_y() as f64);
        });
        self.canvas
            .add_event_listener_with_callback("mousemove", moved.as_ref().unchecked_ref())?;
        moved.forget();

        let pressed = Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| on_down());
        self.canvas
            .add_event_listener_with_callback("mousedown", pressed.as_ref().unchecked_ref())?;
        pressed.forget();
        Ok(())
    }

    pub fn build_filter_buttons(&self, on_toggle: fn(BodyKind)) -> Result<(), JsValue> {
        let Some(container) = &self.filters else {
            return Ok(());
        };
        container.set_inner_html("");
        for kind in BodyKind::ALL {
            let button: HtmlButtonElement = self.document.create_element("button")?.dyn_into()?;
            button.set_value(kind.label());
            button.set_text_content(Some(kind.label()));
            let click = Closure::<dyn FnMut()>::new(move || on_toggle(kind));
            button.set_onclick(Some(click.as_ref().unchecked_ref()));
            click.forget();
            container.append_child(&button)?;
        }
        Ok(())
    }

    pub fn sync_filters(&self, filters: &FilterSet) -> Result<(), JsValue> {
        let Some(container) = &self.filters else {
            return Ok(());
        };
        let buttons = container.children();
        for i in 0..buttons.length() {
            let Some(button) = buttons
                .item(i)
                .and_then(|b| b.dyn_into::<HtmlButtonElement>().ok())
            else {
                continue;
            };
            let active = BodyKind::from_filter_name(&button.value())
                .map(|kind| filters.contains(kind))
                .unwrap_or(false);
            button.class_list().toggle_with_force("toggled", active)?;
        }
        Ok(())
    }

    pub fn render_list(&self, entries: &[PoiEntry]) -> Result<(), JsValue> {
        self.list.set_inner_html("");
        let root = self.document.create_element("ul")?;
        self.append_entries(&root, entries)?;
        self.list.append_child(&root)?;
        Ok(())
    }

    fn append_entries(&self, parent: &Element, entries: &[PoiEntry]) -> Result<(), JsValue> {
        for entry in entries {
            let li = self.document.create_element("li")?;
            li.set_attribute("data-body-id", &entry.id)?;
            li.set_attribute("data-kind", entry.kind.label())?;
            let label = self.document.create_element("span")?;
            label.set_text_content(Some(&entry.name));
            li.append_child(&label)?;
            if let Some(sublist) = &entry.sublist {
                let ul = self.document.create_element("ul")?;
                self.append_entries(&ul, sublist)?;
                li.append_child(&ul)?;
            }
            parent.append_child(&li)?;
        }
        Ok(())
    }

    pub fn show_detail(&self, detail: &BodyDetail) -> Result<(), JsValue> {
        self.detail.show(detail)
    }

    pub fn clear_detail(&self) -> Result<(), JsValue> {
        self.detail.clear()
    }

    #[allow(deprecated)]
    pub fn paint(&self, scene: Option<&Scene>, camera: &Camera) -> Result<(), JsValue> {
        let width = self.canvas.width() as f64;
        let height = self.canvas.height() as f64;
        let ctx = &self.ctx;
        ctx.set_global_alpha(1.0);
        ctx.set_fill_style(&JsValue::from_str("#000000"));
        ctx.fill_rect(0.0, 0.0, width, height);

        let Some(scene) = scene else {
            return Ok(());
        };

        let to_screen = |ndc: DVec2| ((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height);

        let mut ordered: Vec<(f64, &Primitive)> = scene
            .iter()
            .filter_map(|p| Some((camera.project(anchor(&p.shape))?.depth, p)))
            .collect();
        ordered.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (depth, prim) in ordered {
            let color = JsValue::from_str(&prim.material.color.css());
            ctx.set_global_alpha(prim.material.opacity);
            match &prim.shape {
                Shape::Sphere { center, radius } => {
                    let Some(p) = camera.project(*center) else { continue };
                    let (x, y) = to_screen(p.ndc);
                    let r = (radius * camera.pixels_per_unit(depth, height)).max(1.0);
                    ctx.begin_path();
                    ctx.arc(x, y, r, 0.0, TAU)?;
                    ctx.set_fill_style(&color);
                    ctx.fill();
                }
                Shape::Ring { center, outer, .. } => {
                    ctx.begin_path();
                    let mut started = false;
                    for i in 0..=RING_SEGMENTS {
                        let a = TAU * i as f64 / RING_SEGMENTS as f64;
                        let point = *center + DVec3::new(a.cos() * outer, a.sin() * outer, 0.0);
                        let Some(p) = camera.project(point) else { continue };
                        let (x, y) = to_screen(p.ndc);
                        if started {
                            ctx.line_to(x, y);
                        } else {
                            ctx.move_to(x, y);
                            started = true;
                        }
                    }
                    ctx.set_fill_style(&color);
                    ctx.fill();
                }
                Shape::Line { from, to } => {
                    let (Some(a), Some(b)) = (camera.project(*from), camera.project(*to)) else {
                        continue;
                    };
                    let (ax, ay) = to_screen(a.ndc);
                    let (bx, by) = to_screen(b.ndc);
                    ctx.begin_path();
                    ctx.move_to(ax, ay);
                    ctx.line_to(bx, by);
                    ctx.set_stroke_style(&color);
                    ctx.stroke();
                }
                Shape::Label { anchor, text } => {
                    let Some(p) = camera.project(*anchor) else { continue };
                    let (x, y) = to_screen(p.ndc);
                    ctx.set_fill_style(&color);
                    ctx.set_font("12px sans-serif");
                    ctx.fill_text(text, x + LABEL_OFFSET_PX, y - LABEL_OFFSET_PX)?;
                }
            }
        }
        ctx.set_global_alpha(1.0);
        Ok(())
    }
}

fn anchor(shape: &Shape) -> DVec3 {
    match shape {
        Shape::Sphere { center, .. } | Shape::Ring { center, .. } => *center,
        Shape::Line { from, to } => (*from + *to) * 0.5,
        Shape::Label { anchor, .. } => *anchor,
    }
}

pub fn pixel_to_ndc(px: f64, py: f64, width: f64, height: f64) -> DVec2 {
    DVec2::new(px / width * 2.0 - 1.0, -(py / height) * 2.0 + 1.0)
}
