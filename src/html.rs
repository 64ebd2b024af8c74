use std::sync::OnceLock;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use numfmt::{Formatter, Precision};

/// The Tailwind browser build, which generates the page styles from class names.
const TAILWIND_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4";
/// htmx and its response-targets extension, used by the record forms.
const HTMX_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/htmx.org@2.0.8/dist/htmx.min.js";
const HTMX_RESPONSE_TARGETS_SCRIPT_URL: &str =
    "https://cdn.jsdelivr.net/npm/htmx-ext-response-targets@2.0.4/dist/response-targets.min.js";
/// The ECharts build used by the chart scripts.
pub const ECHARTS_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

// Link styles
pub const LINK_STYLE: &str = "text-green-700 hover:text-green-600 \
    dark:text-green-500 dark:hover:text-green-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "px-4 py-2.5 bg-green-600 \
    dark:bg-green-700 hover:bg-green-700 hover:dark:bg-green-800 \
    text-white text-sm font-medium rounded";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_SELECT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white bg-gray-50 dark:bg-gray-700 \
    border border-gray-300 dark:border-gray-600 focus:ring-green-600 \
    focus:border-green-600";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white bg-gray-50 dark:bg-gray-700 \
    border border-gray-300 dark:border-gray-600 dark:placeholder-gray-400 \
    focus:ring-green-600 focus:border-green-600";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Summary cards
pub const CARD_STYLE: &str = "p-4 bg-white rounded-lg shadow dark:bg-gray-800";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Harvest Ledger" }

                script src=(TAILWIND_SCRIPT_URL) {}
                script src=(HTMX_SCRIPT_URL) {}
                script src=(HTMX_RESPONSE_TARGETS_SCRIPT_URL) {}

                style
                {
                    r#"
                    .echarts-tooltip {
                        z-index: 30 !important;
                    }
                    "#
                }

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptSource(text) => script { (text) }
                        HeadElement::ScriptLink(path) => script src=(path) {}
                    }
                }
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900"
            {
                (content)

                // Error alerts from the record forms are swapped in here.
                div
                    id="alert-container"
                    class="w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {}
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    // Template adapted from https://flowbite.com/blocks/marketing/404/
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-green-600 dark:text-green-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    a
                        href="/"
                        class="inline-flex text-white bg-green-600
                            hover:bg-green-800 focus:ring-4 focus:outline-hidden
                            focus:ring-green-300 font-medium rounded text-sm px-5
                            py-2.5 text-center dark:focus:ring-green-900 my-4"
                    {
                        "Back to Homepage"
                    }
                }
            }
        }
    );

    base(title, &[], &content)
}

/// A card with a headline figure for the summary grid at the top of a page.
///
/// The value element gets `id` so that it can be found in the page.
pub fn summary_card(id: &str, title: &str, value: &str, detail: Option<&str>) -> Markup {
    html!(
        div class=(CARD_STYLE)
        {
            p class="text-sm font-medium text-gray-600 dark:text-gray-400" { (title) }
            p id=(id) class="text-2xl font-bold" { (value) }

            @if let Some(detail) = detail {
                p class="text-xs text-gray-500 dark:text-gray-400 mt-1" { (detail) }
            }
        }
    )
}

/// An error alert with a headline `message` and some `details` on how to fix it.
pub fn error_alert(message: &str, details: &str) -> Markup {
    html!(
        div
            role="alert"
            class="p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
                dark:bg-gray-800 dark:text-red-400 border border-red-300 dark:border-red-800"
        {
            p class="font-medium" { (message) }

            @if !details.is_empty() {
                p { (details) }
            }
        }
    )
}

/// Render [error_view] as a complete response with `status_code`.
pub fn error_response(
    status_code: StatusCode,
    title: &str,
    header: &str,
    description: &str,
    fix: &str,
) -> Response {
    (
        status_code,
        Html(error_view(title, header, description, fix).into_string()),
    )
        .into_response()
}

fn currency_formatter(prefix: &'static str) -> Formatter {
    Formatter::currency(prefix)
        .expect("currency prefix should be shorter than the formatter limit")
        .precision(Precision::Decimals(2))
}

pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();
    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| currency_formatter("$"));
    let negative_fmt = NEGATIVE_FMT.get_or_init(|| currency_formatter("-$"));

    let mut formatted_string = if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else if number > 0.0 {
        positive_fmt.fmt_string(number)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        "$0.00".to_owned()
    };

    // numfmt omits trailing zeros, so "12.30" comes out as "12.3" and "12.00" as "12".
    match formatted_string.rfind('.') {
        Some(dot) => {
            for _ in 0..(2 - (formatted_string.len() - dot - 1).min(2)) {
                formatted_string.push('0');
            }
        }
        None => formatted_string.push_str(".00"),
    }

    formatted_string
}

/// Format a percentage with one decimal place, e.g. "82.5%".
pub fn format_percent(percent: f64) -> String {
    format!("{percent:.1}%")
}
