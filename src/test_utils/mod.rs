#![allow(missing_docs)]

pub(crate) mod fixtures;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use fixtures::{seeded_stores, test_state};
pub(crate) use form::{
    assert_form_input_with_value, assert_form_method_and_action, assert_form_select,
    assert_form_submit_button, assert_hx_endpoint, must_get_form,
};
pub(crate) use html::{assert_valid_html, must_select_text, parse_html_document};
pub(crate) use http::{assert_content_type, assert_hx_redirect, assert_status_ok};
