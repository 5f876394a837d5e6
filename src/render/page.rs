//! Self-contained HTML page holding the chart, the legend and the tooltip.

use anyhow::{Context, Result};
use std::path::Path;

use crate::render::svg::Element;

const STYLE: &str = "body { font-family: sans-serif; margin: 0 auto; max-width: 1280px; }
#chart { position: relative; }
.cell:hover { stroke: black; stroke-width: 1px; }
#tooltip { display: none; position: absolute; padding: .4rem; text-align: center;
  font-size: .8rem; background: rgba(0, 0, 0, .8); color: white; border-radius: 4px;
  pointer-events: none; }";

/// Last hover wins: one tooltip element, shown on mouseover, hidden on mouseout.
const TOOLTIP_SCRIPT: &str = "(function () {
  var tip = document.getElementById('tooltip');
  document.querySelectorAll('.cell').forEach(function (cell) {
    cell.addEventListener('mouseover', function () {
      tip.style.display = 'block';
      tip.style.left = cell.dataset.tipLeft;
      tip.style.top = cell.dataset.tipTop;
      tip.style.width = cell.dataset.tipWidth;
      tip.innerHTML = cell.dataset.tooltip;
      tip.setAttribute('data-year', cell.dataset.year);
    });
    cell.addEventListener('mouseout', function () {
      tip.style.display = 'none';
    });
  });
})();";

pub fn render_page(title: &str, description: &str, chart: &Element, legend: &Element) -> String {
    let head = Element::new("head")
        .child(Element::new("meta").attr("charset", "utf-8"))
        .child(Element::new("title").text(title))
        .child(Element::new("style").text(STYLE));

    let mut body = Element::new("body")
        .child(Element::new("h1").attr("id", "title").text(title))
        .child(Element::new("p").attr("id", "description").text(description))
        .child(
            Element::new("div")
                .attr("id", "chart")
                .child(chart.clone())
                .child(Element::new("div").attr("id", "tooltip").text("")),
        )
        .child(legend.clone())
        .render();
    // The script is emitted raw; the markup tree would escape its quotes.
    let close = "</body>\n";
    if body.ends_with(close) {
        body.truncate(body.len() - close.len());
        body.push_str("  <script>\n");
        body.push_str(TOOLTIP_SCRIPT);
        body.push_str("\n  </script>\n");
        body.push_str(close);
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n{}{}</html>\n",
        head.render(),
        body
    )
}

pub fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    std::fs::write(path, html).with_context(|| format!("writing {}", path.display()))
}
