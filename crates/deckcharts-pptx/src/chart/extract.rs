use roxmltree::{Document, Node};

use super::{ChartData, ChartDataError, PlotKind, SeriesValues};
use crate::xml::{child, child_val, children, CHART_NS};
use crate::PptxError;

/// Read the categories and series values cached in a chart part.
///
/// Series are taken in document order across every plot of the plot area. Categories come from
/// the first series that has a category cache; series values are padded or truncated to the
/// category count so the result always satisfies [`ChartData::new`].
pub fn extract_chart_data(chart_xml: &str) -> Result<ChartData, PptxError> {
    let doc = Document::parse(chart_xml)?;
    let plot_area = plot_area(&doc)
        .ok_or_else(|| ChartDataError::Malformed("chart has no c:plotArea".to_string()))?;

    let series_nodes: Vec<Node<'_, '_>> = series_in(plot_area).collect();
    if series_nodes.is_empty() {
        return Err(ChartDataError::NoSeries.into());
    }

    let categories = series_nodes
        .iter()
        .find_map(|ser| child(*ser, CHART_NS, "cat").and_then(category_cache));

    let mut series = Vec::with_capacity(series_nodes.len());
    for (idx, ser) in series_nodes.iter().enumerate() {
        let name = series_name(*ser).unwrap_or_else(|| format!("Series {}", idx + 1));
        let values = child(*ser, CHART_NS, "val")
            .and_then(number_cache)
            .unwrap_or_default();
        series.push(SeriesValues { name, values });
    }

    let categories = categories.unwrap_or_else(|| {
        let len = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
        (1..=len).map(|n| n.to_string()).collect()
    });
    for s in &mut series {
        s.values.resize(categories.len(), None);
    }

    Ok(ChartData::new(categories, series)?)
}

/// Kind of the first plot in the chart's plot area.
pub(crate) fn detect_plot_kind(doc: &Document<'_>) -> Option<PlotKind> {
    plot_area(doc)?
        .children()
        .filter(|n| n.is_element() && n.tag_name().namespace() == Some(CHART_NS))
        .find_map(|plot| {
            PlotKind::detect(
                plot.tag_name().name(),
                child_val(plot, CHART_NS, "barDir"),
                child_val(plot, CHART_NS, "grouping"),
            )
        })
}

pub(crate) fn plot_area<'a, 'input>(doc: &'a Document<'input>) -> Option<Node<'a, 'input>> {
    doc.descendants()
        .find(|n| n.has_tag_name((CHART_NS, "plotArea")))
}

/// Every `c:ser` of every plot in `plot_area`, in document order.
pub(crate) fn series_in<'a, 'input: 'a>(
    plot_area: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    plot_area
        .children()
        .filter(|n| n.is_element())
        .flat_map(|plot| children(plot, CHART_NS, "ser"))
}

/// `c:tx` text: the first `strCache` point, or a literal `c:v`.
pub(crate) fn series_name(ser: Node<'_, '_>) -> Option<String> {
    let tx = child(ser, CHART_NS, "tx")?;
    if let Some(str_ref) = child(tx, CHART_NS, "strRef") {
        return child(str_ref, CHART_NS, "strCache")
            .and_then(string_cache)
            .and_then(|values| values.into_iter().next());
    }
    child(tx, CHART_NS, "v")
        .and_then(|v| v.text())
        .map(str::to_string)
}

fn category_cache(cat: Node<'_, '_>) -> Option<Vec<String>> {
    for (holder, cache) in [
        ("strRef", "strCache"),
        ("numRef", "numCache"),
        ("multiLvlStrRef", "multiLvlStrCache"),
    ] {
        if let Some(cache) = child(cat, CHART_NS, holder).and_then(|r| child(r, CHART_NS, cache)) {
            if holder == "multiLvlStrRef" {
                // The innermost level carries the leaf labels.
                return child(cache, CHART_NS, "lvl").and_then(string_cache);
            }
            return string_cache(cache);
        }
    }
    child(cat, CHART_NS, "strLit")
        .or_else(|| child(cat, CHART_NS, "numLit"))
        .and_then(string_cache)
}

fn number_cache(val: Node<'_, '_>) -> Option<Vec<Option<f64>>> {
    let cache = child(val, CHART_NS, "numRef")
        .and_then(|r| child(r, CHART_NS, "numCache"))
        .or_else(|| child(val, CHART_NS, "numLit"))?;
    let points = points(cache)?;
    Some(
        points
            .into_iter()
            .map(|raw| {
                let raw = raw?;
                let trimmed = raw.trim();
                match trimmed.parse::<f64>() {
                    Ok(v) if v.is_finite() => Some(v),
                    _ => {
                        log::debug!("ignoring non-numeric cached value {trimmed:?}");
                        None
                    }
                }
            })
            .collect(),
    )
}

fn string_cache(cache: Node<'_, '_>) -> Option<Vec<String>> {
    let points = points(cache)?;
    Some(points.into_iter().map(Option::unwrap_or_default).collect())
}

/// Upper bound on a cache's length; one worksheet column holds at most this many rows.
const MAX_CACHE_POINTS: usize = 1 << 20;

/// `c:pt` values laid out by `@idx`, sized by `c:ptCount` (or the highest index seen).
fn points(cache: Node<'_, '_>) -> Option<Vec<Option<String>>> {
    let pt_count = child_val(cache, CHART_NS, "ptCount").and_then(|v| v.parse::<usize>().ok());

    let mut points = Vec::new();
    let mut max_idx = None::<usize>;
    for pt in children(cache, CHART_NS, "pt") {
        let Some(idx) = pt.attribute("idx").and_then(|v| v.parse::<usize>().ok()) else {
            continue;
        };
        let value = child(pt, CHART_NS, "v")
            .and_then(|v| v.text())
            .unwrap_or("")
            .to_string();
        max_idx = Some(max_idx.map_or(idx, |m| m.max(idx)));
        points.push((idx, value));
    }

    let inferred_len = max_idx.map(|v| v + 1).unwrap_or(0);
    let mut len = pt_count.unwrap_or(inferred_len);
    if len > MAX_CACHE_POINTS {
        log::debug!("cache claims {len} points; keeping the {inferred_len} present");
        len = inferred_len.min(MAX_CACHE_POINTS);
    }
    if len == 0 && points.is_empty() {
        return None;
    }
    let mut values = vec![None; len];
    for (idx, value) in points {
        if idx < len {
            values[idx] = Some(value);
        }
    }
    Some(values)
}
