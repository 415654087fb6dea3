//! On-screen keyboard for touch devices.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

pub const TOUCH_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];

/// Fill `container` with one `.row` per keyboard row; every `.key` feeds its
/// letter to the running session on tap or click.
pub(crate) fn build(doc: &Document, container: &HtmlElement) -> Result<(), JsValue> {
    container.set_inner_html("");
    for row in TOUCH_ROWS {
        let row_el = doc.create_element("div")?;
        row_el.set_class_name("row");
        for ch in row.chars() {
            let key: HtmlElement = doc.create_element("div")?.dyn_into()?;
            key.set_class_name("key");
            key.set_text_content(Some(&ch.to_ascii_uppercase().to_string()));

            // touchstart: suppress the synthetic click so a tap counts once
            let touch = Closure::wrap(Box::new(move |evt: web_sys::Event| {
                evt.prevent_default();
                super::press_char(ch);
            }) as Box<dyn FnMut(_)>);
            key.add_event_listener_with_callback("touchstart", touch.as_ref().unchecked_ref())?;
            touch.forget();

            let click = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
                super::press_char(ch);
            }) as Box<dyn FnMut(_)>);
            key.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
            click.forget();

            row_el.append_child(&key)?;
        }
        container.append_child(&row_el)?;
    }
    Ok(())
}
