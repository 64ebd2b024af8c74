use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let hx_endpoint = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(
        hx_endpoint, endpoint,
        "want form with attribute {attribute}=\"{endpoint}\", got {hx_endpoint:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    for input in form.select(&Selector::parse("input").unwrap()) {
        let input_name = input.value().attr("name").unwrap_or_default();

        if input_name == name {
            let input_type = input.value().attr("type").unwrap_or_default();
            let input_value = input.value().attr("value").unwrap_or_default();

            assert_eq!(
                input_type, type_,
                "want input with type \"{type_}\", got {input_type:?}"
            );
            assert_eq!(
                input_value, value,
                "want input with value \"{value}\", got {input_value:?}"
            );

            return;
        }
    }

    panic!("No input found with name \"{name}\" and type \"{type_}\"");
}

#[track_caller]
pub(crate) fn assert_form_method_and_action(form: &ElementRef<'_>, method: &str, action: &str) {
    let got_method = form.value().attr("method").unwrap_or_default();
    let got_action = form.value().attr("action").unwrap_or_default();

    assert_eq!(
        got_method, method,
        "want form with method=\"{method}\", got {got_method:?}"
    );
    assert_eq!(
        got_action, action,
        "want form with action=\"{action}\", got {got_action:?}"
    );
}

/// Assert that `form` has a select named `name` whose option values are
/// `want_options` and whose selected option is `want_selected`.
#[track_caller]
pub(crate) fn assert_form_select(
    form: &ElementRef<'_>,
    name: &str,
    want_options: &[&str],
    want_selected: &str,
) {
    let select_selector = Selector::parse(&format!("select[name=\"{name}\"]")).unwrap();
    let select = form
        .select(&select_selector)
        .next()
        .unwrap_or_else(|| panic!("No select found with name \"{name}\""));

    let option_selector = Selector::parse("option").unwrap();
    let options: Vec<_> = select.select(&option_selector).collect();

    let got_options: Vec<_> = options
        .iter()
        .map(|option| option.value().attr("value").unwrap_or_default())
        .collect();
    assert_eq!(got_options, want_options, "options for select \"{name}\"");

    let got_selected: Vec<_> = options
        .iter()
        .filter(|option| option.value().attr("selected").is_some())
        .map(|option| option.value().attr("value").unwrap_or_default())
        .collect();
    assert_eq!(
        got_selected,
        [want_selected],
        "selected option for select \"{name}\""
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let submit_button = form
        .select(&Selector::parse("button").unwrap())
        .next()
        .expect("No button found");

    assert_eq!(
        submit_button.value().attr("type").unwrap_or_default(),
        "submit",
        "want submit button with type=\"submit\""
    );
}
