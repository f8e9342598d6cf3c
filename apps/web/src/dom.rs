//! The browser page as a [`Surface`]: one element per container, looked up
//! by id on every call so panels missing from the page are simply skipped.

use std::cell::RefCell;
use std::collections::HashMap;

use log::{debug, error, warn};
use pitwall_core::render::positions::PlotConfig;
use pitwall_core::render::{PositionPlot, TrackShape};
use pitwall_core::{ContainerId, IndicatorSize, PanelView, Surface};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, HtmlElement, HtmlOptionElement, HtmlSelectElement};

const TRACK_SVG_ID: &str = "track-svg";
const HIDDEN: &str = "hidden";

pub struct DomSurface {
    document: Document,
    overlays: RefCell<HashMap<ContainerId, Element>>,
}

impl DomSurface {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            overlays: RefCell::new(HashMap::new()),
        }
    }

    fn element(&self, id: ContainerId) -> Option<Element> {
        self.document.get_element_by_id(id.dom_id())
    }

    /// The select box cannot hold children, so its loader sits on the parent.
    fn indicator_host(&self, id: ContainerId) -> Option<Element> {
        let element = self.element(id)?;
        if id == ContainerId::EventSelect {
            return element.parent_element();
        }
        Some(element)
    }

    fn create_overlay(&self, size: IndicatorSize) -> Result<Element, JsValue> {
        let overlay = self.document.create_element("div")?;
        let class = match size {
            IndicatorSize::Small => "loading-overlay loading-inline",
            IndicatorSize::Normal | IndicatorSize::Large => "loading-overlay",
        };
        overlay.set_class_name(class);
        let wheel = self.document.create_element("div")?;
        wheel.set_class_name(&format!("loader-wheel {}", size.as_str()));
        overlay.append_child(&wheel)?;
        Ok(overlay)
    }

    fn write(&self, id: ContainerId, element: &Element, view: &PanelView) {
        match view {
            PanelView::PositionChart(plot) => {
                if let Err(e) = new_plot(element, plot) {
                    warn!("Plotting positions failed, writing summary instead: {e:?}");
                    element.set_inner_html(&view.to_html());
                }
            }
            PanelView::TrackMap(shape) if id == ContainerId::TrackMap => {
                self.write_track(element, shape);
            }
            _ => element.set_inner_html(&view.to_html()),
        }
    }

    fn write_track(&self, container: &Element, shape: &TrackShape) {
        match self.document.get_element_by_id(TRACK_SVG_ID) {
            Some(svg) => svg.set_inner_html(&shape.svg()),
            None => container.set_inner_html(&format!(
                r#"<svg id="{TRACK_SVG_ID}" viewBox="0 0 500 500">{}</svg>"#,
                shape.svg()
            )),
        }
    }
}

impl Surface for DomSurface {
    fn contains(&self, id: ContainerId) -> bool {
        self.element(id).is_some()
    }

    fn attach_indicator(&self, id: ContainerId, size: IndicatorSize) {
        let Some(host) = self.indicator_host(id) else {
            return;
        };
        if let Some(host) = host.dyn_ref::<HtmlElement>() {
            if let Err(e) = host.style().set_property("position", "relative") {
                debug!("Could not position #{}: {e:?}", id.dom_id());
            }
        }
        match self.create_overlay(size) {
            Ok(overlay) => {
                if let Err(e) = host.append_child(&overlay) {
                    warn!("Could not attach loader to #{}: {e:?}", id.dom_id());
                    return;
                }
                if let Some(previous) = self.overlays.borrow_mut().insert(id, overlay) {
                    previous.remove();
                }
            }
            Err(e) => warn!("Could not build loader for #{}: {e:?}", id.dom_id()),
        }
    }

    fn set_indicator_visible(&self, id: ContainerId, visible: bool) {
        if let Some(overlay) = self.overlays.borrow().get(&id) {
            if let Err(e) = overlay.class_list().toggle_with_force(HIDDEN, !visible) {
                debug!("Could not toggle loader on #{}: {e:?}", id.dom_id());
            }
        }
    }

    fn detach_indicator(&self, id: ContainerId) {
        if let Some(overlay) = self.overlays.borrow_mut().remove(&id) {
            overlay.remove();
        }
    }

    fn replace(&self, id: ContainerId, view: PanelView) {
        let Some(element) = self.element(id) else {
            return;
        };
        let overlay = self.overlays.borrow().get(&id).cloned();
        if let Some(overlay) = &overlay {
            overlay.remove();
        }

        self.write(id, &element, &view);

        if let Some(overlay) = overlay {
            let host = self.indicator_host(id).unwrap_or(element);
            if let Err(e) = host.append_child(&overlay) {
                warn!("Loader lost on #{}: {e:?}", id.dom_id());
            }
        }
    }

    fn set_event_options(&self, events: &[String], selected: Option<&str>) {
        let Some(select) = self
            .element(ContainerId::EventSelect)
            .and_then(|element| element.dyn_into::<HtmlSelectElement>().ok())
        else {
            return;
        };
        select.set_inner_html("");
        for event in events {
            match HtmlOptionElement::new_with_text_and_value(event, event) {
                Ok(option) => {
                    if let Err(e) = select.append_child(&option) {
                        warn!("Could not add {event} to the race list: {e:?}");
                    }
                }
                Err(e) => warn!("Could not build option for {event}: {e:?}"),
            }
        }
        if let Some(selected) = selected {
            select.set_value(selected);
        }
    }
}

/// `Plotly.newPlot(element, data, layout, config)`. A rejected promise is
/// only logged; the container keeps whatever the library drew.
fn new_plot(element: &Element, plot: &PositionPlot) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let plotly = js_sys::Reflect::get(&window, &JsValue::from_str("Plotly"))?;
    if plotly.is_undefined() {
        return Err(JsValue::from_str("Plotly is not loaded"));
    }
    let new_plot: js_sys::Function =
        js_sys::Reflect::get(&plotly, &JsValue::from_str("newPlot"))?.dyn_into()?;

    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    let data = plot.data.serialize(&serializer)?;
    let layout = plot.layout.serialize(&serializer)?;
    let config = PlotConfig::default().serialize(&serializer)?;

    element.set_inner_html("");
    let result = new_plot.apply(
        &plotly,
        &js_sys::Array::of4(element.as_ref(), &data, &layout, &config),
    )?;
    if let Ok(promise) = result.dyn_into::<js_sys::Promise>() {
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                error!("Position chart failed to draw: {e:?}");
            }
        });
    }
    Ok(())
}
