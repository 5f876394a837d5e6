//! Chart and legend SVG, including axes in the usual bottom/left layout
//! (domain path, one `g.tick` per tick with a 6px line and a label).

use crate::grid::{month_name, Cell};
use crate::legend::Legend;
use crate::render::svg::Element;
use crate::scale::ScaleSet;

const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;
const X_TICK_COUNT: usize = 10;
const MONTHS_TITLE_OFFSET: f64 = 70.0;

fn axis_group(id: &str, transform: String, anchor: &str) -> Element {
    Element::new("g")
        .attr("id", id)
        .attr("transform", transform)
        .attr("fill", "none")
        .attr("font-size", 10)
        .attr("font-family", "sans-serif")
        .attr("text-anchor", anchor)
}

fn axis_bottom(id: &str, transform: String, range: (f64, f64), ticks: &[(f64, String)]) -> Element {
    let domain = Element::new("path")
        .attr("class", "domain")
        .attr("stroke", "currentColor")
        .attr(
            "d",
            format!("M{},{}V0H{}V{}", range.0, TICK_SIZE, range.1, TICK_SIZE),
        );
    let ticks = ticks.iter().map(|(x, label)| {
        Element::new("g")
            .attr("class", "tick")
            .attr("opacity", 1)
            .attr("transform", format!("translate({},0)", x))
            .child(
                Element::new("line")
                    .attr("stroke", "currentColor")
                    .attr("y2", TICK_SIZE),
            )
            .child(
                Element::new("text")
                    .attr("fill", "currentColor")
                    .attr("y", TICK_SIZE + TICK_PADDING)
                    .attr("dy", "0.71em")
                    .text(label.clone()),
            )
    });
    axis_group(id, transform, "middle").child(domain).children(ticks)
}

fn axis_left(id: &str, transform: String, ticks: &[(f64, String)]) -> Element {
    let ticks = ticks.iter().map(|(y, label)| {
        Element::new("g")
            .attr("class", "tick")
            .attr("opacity", 1)
            .attr("transform", format!("translate(0,{})", y))
            .child(
                Element::new("line")
                    .attr("stroke", "currentColor")
                    .attr("x2", -TICK_SIZE),
            )
            .child(
                Element::new("text")
                    .attr("fill", "currentColor")
                    .attr("x", -(TICK_SIZE + TICK_PADDING))
                    .attr("dy", "0.32em")
                    .text(label.clone()),
            )
    });
    axis_group(id, transform, "end").children(ticks)
}

fn cell_rect(cell: &Cell) -> Element {
    Element::new("rect")
        .attr("class", "cell")
        .attr("x", cell.x)
        .attr("y", cell.y)
        .attr("width", cell.width)
        .attr("height", cell.height)
        .attr("fill", cell.color)
        .attr("data-month", cell.month_index)
        .attr("data-year", cell.year)
        .attr("data-temp", cell.temperature)
        .attr("data-tooltip", &cell.tooltip)
        .attr("data-tip-left", cell.placement.css_left())
        .attr("data-tip-top", cell.placement.css_top())
        .attr("data-tip-width", cell.placement.css_width())
        .child(Element::new("title").text(cell.tooltip.replace("<br>", "\n")))
}

/// The heat-map canvas: axes, "Months" title and one rect per cell.
pub fn render_chart(scales: &ScaleSet, cells: &[Cell]) -> Element {
    let layout = scales.layout;
    let p = layout.padding;
    let half_cell = f64::from(scales.cell.height) / 2.0;

    let x_ticks: Vec<(f64, String)> = scales
        .x
        .ticks(X_TICK_COUNT)
        .into_iter()
        .map(|year| (scales.x.apply(year), format!("{}", year as i64)))
        .collect();
    let x_axis = axis_bottom(
        "x-axis",
        format!("translate(0, {})", layout.height - p.bottom + half_cell),
        scales.x.range,
        &x_ticks,
    );

    let y_ticks: Vec<(f64, String)> = (0..12)
        .map(|m| (scales.y.position(m), month_name(m).to_string()))
        .collect();
    let y_axis = axis_left("y-axis", format!("translate({}, 0)", p.left), &y_ticks);

    let title = Element::new("text")
        .attr("x", -(layout.height / 2.0).floor())
        .attr("y", p.left - MONTHS_TITLE_OFFSET)
        .attr("style", "font-size: .8rem; transform: rotate(-90deg)")
        .text("Months");

    Element::new("svg")
        .attr("xmlns", "http://www.w3.org/2000/svg")
        .attr("class", "canvas")
        .attr("width", layout.width)
        .attr("height", layout.height)
        .child(x_axis)
        .child(y_axis)
        .child(title)
        .children(cells.iter().map(cell_rect))
}

/// Legend strip: `legend-axis` plus one stroked swatch per bucket.
pub fn render_legend(legend: &Legend) -> Element {
    let ticks: Vec<(f64, String)> = legend
        .ticks
        .iter()
        .map(|t| (t.x, t.label.clone()))
        .collect();
    let axis = axis_bottom(
        "legend-axis",
        format!("translate(0, {})", legend.axis_y),
        legend.scale.range,
        &ticks,
    );
    let swatches = legend.swatches.iter().map(|s| {
        Element::new("rect")
            .attr("class", "swatch")
            .attr("x", s.x)
            .attr("y", s.y)
            .attr("width", s.width)
            .attr("height", s.height)
            .attr("fill", s.color)
            .attr("stroke", "black")
            .attr("stroke-width", "1px")
    });

    Element::new("svg")
        .attr("xmlns", "http://www.w3.org/2000/svg")
        .attr("id", "legend")
        .attr("width", legend.layout.width)
        .attr("height", legend.layout.height)
        .child(axis)
        .children(swatches)
}
