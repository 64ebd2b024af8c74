//! Chart generation and rendering for the analytics pages.
//!
//! This module turns the label/data arrays from the analytics layer into
//! interactive ECharts visualizations:
//! - **Category Chart**: Spending per expense category
//! - **Budget Donut**: Spending against the total budget
//! - **Trend Chart**: Spending per month
//! - **Farm Comparison Chart**: Budgeted against actual spending per farm
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Color, Emphasis, EmphasisFocus,
        JsFunction, Tooltip, Trigger,
    },
    series::{Line, Pie, bar},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    analytics::{BudgetDonut, ChartSeries, FarmComparison, MonthlyTrend},
    html::HeadElement,
};

/// A page chart with its HTML container ID and ECharts configuration.
pub struct PageChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

impl PageChart {
    pub fn new(id: &'static str, chart: &Chart) -> Self {
        Self {
            id,
            options: chart.to_string(),
        }
    }
}

/// Renders the HTML containers for page charts.
pub fn charts_view(charts: &[PageChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for page charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub fn charts_script(charts: &[PageChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

fn value_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .top(80)
        .contain_label(true)
}

fn currency_axis() -> Axis {
    Axis::new()
        .type_(AxisType::Value)
        .axis_label(AxisLabel::new().formatter(currency_formatter()))
}

pub fn category_chart(series: &ChartSeries) -> Chart {
    Chart::new()
        .title(
            Title::new()
                .text("Spending by Category")
                .subtext("Selected expenses"),
        )
        .tooltip(currency_tooltip())
        .grid(value_grid())
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(series.labels.clone()),
        )
        .y_axis(currency_axis())
        .series(
            bar::Bar::new()
                .name("Spending")
                .data(series.data.clone()),
        )
}

pub fn donut_chart(donut: &BudgetDonut) -> Chart {
    let data = donut
        .data
        .iter()
        .zip(donut.labels)
        .map(|(value, label)| (*value, label))
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Budget Usage"))
        .color(donut.colors.iter().map(|color| Color::from(*color)).collect())
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("2%"))
        .series(
            Pie::new()
                .name("Budget")
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}

pub fn trend_chart(trend: &MonthlyTrend) -> Chart {
    Chart::new()
        .title(Title::new().text("Monthly Trend").subtext("Spending per month"))
        .tooltip(currency_tooltip())
        .grid(value_grid())
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(trend.labels.clone()),
        )
        .y_axis(currency_axis())
        .series(Line::new().name("Spending").data(trend.data.clone()))
}

pub fn farm_comparison_chart(comparison: &FarmComparison) -> Chart {
    Chart::new()
        .title(
            Title::new()
                .text("Farm Comparison")
                .subtext("Budgeted against actual spending"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().right("4%").top("1%"))
        .grid(value_grid())
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(comparison.labels.clone()),
        )
        .y_axis(currency_axis())
        .series(
            bar::Bar::new()
                .name("Budgeted")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(comparison.budgeted.clone()),
        )
        .series(
            bar::Bar::new()
                .name("Actual Expenses")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(comparison.actual.clone()),
        )
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
