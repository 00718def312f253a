use crate::constants::INFO_PANELS;
use crate::dom;
use web_sys as web;

/// Hide the settings and info panels so only the avatar remains.
#[inline]
pub fn hide(document: &web::Document) {
    for id in INFO_PANELS {
        dom::set_visible(document, id, None);
    }
}

#[inline]
pub fn show_start_button(document: &web::Document, show: bool) {
    dom::set_visible(document, crate::constants::ID_START, show.then_some("inline-block"));
    dom::set_visible(document, crate::constants::ID_STOP, (!show).then_some("inline-block"));
}
