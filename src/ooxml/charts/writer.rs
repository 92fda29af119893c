//! Chart XML writer.
//!
//! Produces the `c:chartSpace` part for a [`Chart`]. The same part is
//! referenced from Word inline drawings, spreadsheet drawings and slide
//! graphic frames.

use std::io::Write;

use crate::common::Rgb;
use crate::common::xml::escape_xml;
use crate::ooxml::charts::model::{
    AxisStyle, AxisTitle, Chart, ChartKind, NumericData, Series, StringData, format_number,
};

const CATEGORY_AXIS_ID: u32 = 111_111_111;
const VALUE_AXIS_ID: u32 = 222_222_222;

/// Write a chart to XML.
pub fn write_chart<W: Write>(writer: &mut W, chart: &Chart) -> std::io::Result<()> {
    write!(
        writer,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#
    )?;
    write!(
        writer,
        r#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" "#
    )?;
    write!(
        writer,
        r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#
    )?;
    write!(
        writer,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#
    )?;

    write!(writer, r#"<c:date1904 val="0"/>"#)?;
    write!(writer, r#"<c:lang val="en-US"/>"#)?;
    write!(writer, r#"<c:roundedCorners val="0"/>"#)?;

    if let Some(style) = chart.style {
        write!(writer, r#"<c:style val="{}"/>"#, style.clamp(1, 48))?;
    }

    write!(writer, "<c:chart>")?;

    if let Some(ref title) = chart.title {
        write_title(writer, title, chart.title_size, chart.title_color)?;
        write!(writer, r#"<c:autoTitleDeleted val="0"/>"#)?;
    } else {
        write!(writer, r#"<c:autoTitleDeleted val="1"/>"#)?;
    }

    write_plot_area(writer, chart)?;

    if let Some(position) = chart.legend {
        write!(writer, "<c:legend>")?;
        write!(writer, r#"<c:legendPos val="{}"/>"#, position.xml_value())?;
        write!(writer, r#"<c:overlay val="0"/>"#)?;
        if chart.legend_color.is_some() || chart.font_size.is_some() {
            write_text_properties(writer, chart.font_size, chart.legend_color)?;
        }
        write!(writer, "</c:legend>")?;
    }

    write!(writer, r#"<c:plotVisOnly val="1"/>"#)?;
    write!(writer, r#"<c:dispBlanksAs val="gap"/>"#)?;
    write!(writer, "</c:chart>")?;

    if let Some(size) = chart.font_size {
        write_text_properties(writer, Some(size), None)?;
    }

    write!(writer, "</c:chartSpace>")?;

    Ok(())
}

/// Serialize a chart into an owned buffer.
pub fn chart_to_bytes(chart: &Chart) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(4096);
    write_chart(&mut buf, chart)?;
    Ok(buf)
}

fn write_solid_fill<W: Write>(writer: &mut W, color: Rgb) -> std::io::Result<()> {
    write!(
        writer,
        r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
        color.to_hex()
    )
}

fn write_title<W: Write>(
    writer: &mut W,
    title: &str,
    size: Option<u32>,
    color: Option<Rgb>,
) -> std::io::Result<()> {
    write!(writer, "<c:title><c:tx><c:rich>")?;
    write!(writer, "<a:bodyPr/><a:lstStyle/>")?;
    write!(writer, "<a:p><a:pPr>")?;
    write_run_properties(writer, "a:defRPr", size, color)?;
    write!(writer, "</a:pPr><a:r>")?;
    write_run_properties(writer, "a:rPr", size, color)?;
    write!(writer, "<a:t>{}</a:t></a:r></a:p>", escape_xml(title))?;
    write!(writer, "</c:rich></c:tx>")?;
    write!(writer, r#"<c:overlay val="0"/>"#)?;
    write!(writer, "</c:title>")?;
    Ok(())
}

fn write_run_properties<W: Write>(
    writer: &mut W,
    tag: &str,
    size: Option<u32>,
    color: Option<Rgb>,
) -> std::io::Result<()> {
    write!(writer, "<{}", tag)?;
    if tag == "a:rPr" {
        write!(writer, r#" lang="en-US""#)?;
    }
    if let Some(size) = size {
        write!(writer, r#" sz="{}""#, size * 100)?;
    }
    write!(writer, r#" b="0""#)?;
    match color {
        Some(color) => {
            write!(writer, ">")?;
            write_solid_fill(writer, color)?;
            write!(writer, "</{}>", tag)
        },
        None => write!(writer, "/>"),
    }
}

fn write_text_properties<W: Write>(
    writer: &mut W,
    size: Option<u32>,
    color: Option<Rgb>,
) -> std::io::Result<()> {
    write!(writer, "<c:txPr><a:bodyPr/><a:lstStyle/><a:p><a:pPr>")?;
    write_run_properties(writer, "a:defRPr", size, color)?;
    write!(writer, r#"</a:pPr><a:endParaRPr lang="en-US"/></a:p></c:txPr>"#)
}

fn write_plot_area<W: Write>(writer: &mut W, chart: &Chart) -> std::io::Result<()> {
    write!(writer, "<c:plotArea>")?;
    write!(writer, "<c:layout/>")?;

    match chart.kind {
        ChartKind::Bar | ChartKind::BarStacked | ChartKind::HorizontalBar => {
            write_bar_chart(writer, chart)?
        },
        ChartKind::Line | ChartKind::LineNormal | ChartKind::LineStacked => {
            write_line_chart(writer, chart)?
        },
        ChartKind::Area => write_area_chart(writer, chart)?,
        ChartKind::Pie | ChartKind::Doughnut => write_pie_chart(writer, chart)?,
        ChartKind::Scatter => write_scatter_chart(writer, chart)?,
    }

    if chart.kind.has_axes() {
        write_axes(writer, chart)?;
    }

    write!(writer, "</c:plotArea>")?;
    Ok(())
}

fn write_bar_chart<W: Write>(writer: &mut W, chart: &Chart) -> std::io::Result<()> {
    let horizontal = chart.kind == ChartKind::HorizontalBar;
    let stacked = chart.kind == ChartKind::BarStacked;
    write!(writer, "<c:barChart>")?;
    write!(
        writer,
        r#"<c:barDir val="{}"/>"#,
        if horizontal { "bar" } else { "col" }
    )?;
    write!(
        writer,
        r#"<c:grouping val="{}"/>"#,
        if stacked { "stacked" } else { "clustered" }
    )?;
    write!(writer, r#"<c:varyColors val="0"/>"#)?;

    for (i, series) in chart.series.iter().enumerate() {
        write!(writer, "<c:ser>")?;
        write_series_header(writer, i, series)?;
        write_shape_fill(writer, series)?;
        write!(writer, r#"<c:invertIfNegative val="0"/>"#)?;
        write_data_points(writer, series)?;
        write_categories(writer, "c:cat", series)?;
        write_numeric_data(writer, "c:val", &series.values)?;
        write!(writer, "</c:ser>")?;
    }

    write_data_labels(writer, chart.show_data_labels)?;
    write!(writer, r#"<c:gapWidth val="150"/>"#)?;
    if stacked {
        write!(writer, r#"<c:overlap val="100"/>"#)?;
    }
    write_axis_ids(writer)?;
    write!(writer, "</c:barChart>")?;
    Ok(())
}

fn write_line_chart<W: Write>(writer: &mut W, chart: &Chart) -> std::io::Result<()> {
    let markers = chart.kind == ChartKind::Line;
    write!(writer, "<c:lineChart>")?;
    write!(writer, r#"<c:grouping val="{}"/>"#, chart.kind.grouping())?;
    write!(writer, r#"<c:varyColors val="0"/>"#)?;

    for (i, series) in chart.series.iter().enumerate() {
        write!(writer, "<c:ser>")?;
        write_series_header(writer, i, series)?;
        write_line_properties(writer, series)?;
        if !markers {
            write!(writer, r#"<c:marker><c:symbol val="none"/></c:marker>"#)?;
        }
        write_data_points(writer, series)?;
        write_categories(writer, "c:cat", series)?;
        write_numeric_data(writer, "c:val", &series.values)?;
        write!(writer, r#"<c:smooth val="0"/>"#)?;
        write!(writer, "</c:ser>")?;
    }

    write_data_labels(writer, chart.show_data_labels)?;
    write!(
        writer,
        r#"<c:marker val="{}"/>"#,
        if markers { "1" } else { "0" }
    )?;
    write_axis_ids(writer)?;
    write!(writer, "</c:lineChart>")?;
    Ok(())
}

fn write_area_chart<W: Write>(writer: &mut W, chart: &Chart) -> std::io::Result<()> {
    write!(writer, "<c:areaChart>")?;
    write!(writer, r#"<c:grouping val="{}"/>"#, chart.kind.grouping())?;
    write!(writer, r#"<c:varyColors val="0"/>"#)?;

    for (i, series) in chart.series.iter().enumerate() {
        write!(writer, "<c:ser>")?;
        write_series_header(writer, i, series)?;
        write_shape_fill(writer, series)?;
        write_data_points(writer, series)?;
        write_categories(writer, "c:cat", series)?;
        write_numeric_data(writer, "c:val", &series.values)?;
        write!(writer, "</c:ser>")?;
    }

    write_data_labels(writer, chart.show_data_labels)?;
    write_axis_ids(writer)?;
    write!(writer, "</c:areaChart>")?;
    Ok(())
}

fn write_pie_chart<W: Write>(writer: &mut W, chart: &Chart) -> std::io::Result<()> {
    let doughnut = chart.kind == ChartKind::Doughnut;
    let tag = if doughnut { "c:doughnutChart" } else { "c:pieChart" };
    write!(writer, "<{}>", tag)?;
    write!(writer, r#"<c:varyColors val="1"/>"#)?;

    for (i, series) in chart.series.iter().enumerate() {
        write!(writer, "<c:ser>")?;
        write_series_header(writer, i, series)?;
        write_shape_fill(writer, series)?;
        write_data_points(writer, series)?;
        write_categories(writer, "c:cat", series)?;
        write_numeric_data(writer, "c:val", &series.values)?;
        write!(writer, "</c:ser>")?;
    }

    write_data_labels(writer, chart.show_data_labels)?;
    write!(writer, r#"<c:firstSliceAng val="0"/>"#)?;
    if doughnut {
        write!(writer, r#"<c:holeSize val="50"/>"#)?;
    }
    write!(writer, "</{}>", tag)?;
    Ok(())
}

fn write_scatter_chart<W: Write>(writer: &mut W, chart: &Chart) -> std::io::Result<()> {
    write!(writer, "<c:scatterChart>")?;
    write!(writer, r#"<c:scatterStyle val="lineMarker"/>"#)?;
    write!(writer, r#"<c:varyColors val="0"/>"#)?;

    for (i, series) in chart.series.iter().enumerate() {
        write!(writer, "<c:ser>")?;
        write_series_header(writer, i, series)?;
        // markers only, no connecting line
        write!(writer, r#"<c:spPr><a:ln w="19050"><a:noFill/></a:ln></c:spPr>"#)?;
        write!(writer, r#"<c:marker><c:symbol val="circle"/><c:size val="7"/>"#)?;
        write_shape_fill(writer, series)?;
        write!(writer, "</c:marker>")?;
        write_data_points(writer, series)?;
        write_categories(writer, "c:xVal", series)?;
        write_numeric_data(writer, "c:yVal", &series.values)?;
        write!(writer, r#"<c:smooth val="0"/>"#)?;
        write!(writer, "</c:ser>")?;
    }

    write_data_labels(writer, chart.show_data_labels)?;
    write_axis_ids(writer)?;
    write!(writer, "</c:scatterChart>")?;
    Ok(())
}

fn write_series_header<W: Write>(
    writer: &mut W,
    index: usize,
    series: &Series,
) -> std::io::Result<()> {
    write!(writer, r#"<c:idx val="{}"/>"#, index)?;
    write!(writer, r#"<c:order val="{}"/>"#, index)?;

    match (&series.name_ref, &series.name) {
        (Some(formula), name) => {
            write!(writer, "<c:tx><c:strRef>")?;
            write!(writer, "<c:f>{}</c:f>", escape_xml(formula))?;
            if let Some(name) = name {
                write!(
                    writer,
                    r#"<c:strCache><c:ptCount val="1"/><c:pt idx="0"><c:v>{}</c:v></c:pt></c:strCache>"#,
                    escape_xml(name)
                )?;
            }
            write!(writer, "</c:strRef></c:tx>")?;
        },
        (None, Some(name)) => {
            write!(writer, "<c:tx><c:v>{}</c:v></c:tx>", escape_xml(name))?;
        },
        (None, None) => {},
    }
    Ok(())
}

fn write_shape_fill<W: Write>(writer: &mut W, series: &Series) -> std::io::Result<()> {
    if series.fill.is_none() && series.outline.is_none() {
        return Ok(());
    }
    write!(writer, "<c:spPr>")?;
    if let Some(fill) = series.fill {
        write_solid_fill(writer, fill)?;
    }
    if let Some(outline) = series.outline {
        write!(writer, r#"<a:ln w="9525">"#)?;
        write_solid_fill(writer, outline)?;
        write!(writer, "</a:ln>")?;
    }
    write!(writer, "</c:spPr>")?;
    Ok(())
}

fn write_line_properties<W: Write>(writer: &mut W, series: &Series) -> std::io::Result<()> {
    let color = series.fill.or(series.outline);
    if color.is_none() && series.line_width_emu.is_none() {
        return Ok(());
    }
    write!(
        writer,
        r#"<c:spPr><a:ln w="{}" cap="rnd">"#,
        series.line_width_emu.unwrap_or(28_575)
    )?;
    if let Some(color) = color {
        write_solid_fill(writer, color)?;
    }
    write!(writer, "<a:round/></a:ln></c:spPr>")?;
    Ok(())
}

fn write_data_points<W: Write>(writer: &mut W, series: &Series) -> std::io::Result<()> {
    for (i, color) in series.point_fills.iter().enumerate() {
        write!(writer, "<c:dPt>")?;
        write!(writer, r#"<c:idx val="{}"/><c:bubble3D val="0"/>"#, i)?;
        write!(writer, "<c:spPr>")?;
        write_solid_fill(writer, *color)?;
        write!(writer, "</c:spPr></c:dPt>")?;
    }
    Ok(())
}

fn write_data_labels<W: Write>(writer: &mut W, show_values: bool) -> std::io::Result<()> {
    write!(writer, "<c:dLbls>")?;
    write!(writer, r#"<c:showLegendKey val="0"/>"#)?;
    write!(
        writer,
        r#"<c:showVal val="{}"/>"#,
        if show_values { "1" } else { "0" }
    )?;
    write!(writer, r#"<c:showCatName val="0"/><c:showSerName val="0"/>"#)?;
    write!(writer, r#"<c:showPercent val="0"/><c:showBubbleSize val="0"/>"#)?;
    write!(writer, "</c:dLbls>")?;
    Ok(())
}

fn write_axis_ids<W: Write>(writer: &mut W) -> std::io::Result<()> {
    write!(
        writer,
        r#"<c:axId val="{}"/><c:axId val="{}"/>"#,
        CATEGORY_AXIS_ID, VALUE_AXIS_ID
    )
}

fn write_categories<W: Write>(writer: &mut W, tag: &str, series: &Series) -> std::io::Result<()> {
    if let Some(ref numeric) = series.numeric_categories {
        return write_numeric_data(writer, tag, numeric);
    }
    if let Some(ref labels) = series.categories {
        return write_string_data(writer, tag, labels);
    }
    Ok(())
}

fn write_string_points<W: Write>(writer: &mut W, values: &[String]) -> std::io::Result<()> {
    write!(writer, r#"<c:ptCount val="{}"/>"#, values.len())?;
    for (i, val) in values.iter().enumerate() {
        write!(
            writer,
            r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#,
            i,
            escape_xml(val)
        )?;
    }
    Ok(())
}

fn write_string_data<W: Write>(writer: &mut W, tag: &str, data: &StringData) -> std::io::Result<()> {
    write!(writer, "<{}>", tag)?;

    if let Some(ref formula) = data.source_ref {
        write!(writer, "<c:strRef>")?;
        write!(writer, "<c:f>{}</c:f>", escape_xml(formula))?;
        write!(writer, "<c:strCache>")?;
        write_string_points(writer, &data.values)?;
        write!(writer, "</c:strCache>")?;
        write!(writer, "</c:strRef>")?;
    } else {
        write!(writer, "<c:strLit>")?;
        write_string_points(writer, &data.values)?;
        write!(writer, "</c:strLit>")?;
    }

    write!(writer, "</{}>", tag)?;
    Ok(())
}

fn write_numeric_points<W: Write>(writer: &mut W, data: &NumericData) -> std::io::Result<()> {
    write!(
        writer,
        r#"<c:formatCode>{}</c:formatCode>"#,
        escape_xml(data.format_code.as_deref().unwrap_or("General"))
    )?;
    write!(writer, r#"<c:ptCount val="{}"/>"#, data.values.len())?;
    for (i, val) in data.values.iter().enumerate() {
        if let Some(val) = val {
            write!(
                writer,
                r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#,
                i,
                format_number(*val)
            )?;
        }
    }
    Ok(())
}

fn write_numeric_data<W: Write>(
    writer: &mut W,
    tag: &str,
    data: &NumericData,
) -> std::io::Result<()> {
    write!(writer, "<{}>", tag)?;

    if let Some(ref formula) = data.source_ref {
        write!(writer, "<c:numRef>")?;
        write!(writer, "<c:f>{}</c:f>", escape_xml(formula))?;
        write!(writer, "<c:numCache>")?;
        write_numeric_points(writer, data)?;
        write!(writer, "</c:numCache>")?;
        write!(writer, "</c:numRef>")?;
    } else {
        write!(writer, "<c:numLit>")?;
        write_numeric_points(writer, data)?;
        write!(writer, "</c:numLit>")?;
    }

    write!(writer, "</{}>", tag)?;
    Ok(())
}

fn write_gridlines<W: Write>(
    writer: &mut W,
    tag: &str,
    color: Option<Rgb>,
) -> std::io::Result<()> {
    match color {
        Some(color) => {
            write!(writer, r#"<{}><c:spPr><a:ln w="9525">"#, tag)?;
            write_solid_fill(writer, color)?;
            write!(writer, "</a:ln></c:spPr></{}>", tag)
        },
        None => write!(writer, "<{}/>", tag),
    }
}

fn write_axes<W: Write>(writer: &mut W, chart: &Chart) -> std::io::Result<()> {
    let style = &chart.axes;
    let horizontal = chart.kind == ChartKind::HorizontalBar;
    let (cat_pos, val_pos) = if horizontal { ("l", "b") } else { ("b", "l") };

    // The category axis runs horizontally, so its gridlines are the vertical ones.
    let cat_tag = if chart.kind == ChartKind::Scatter { "c:valAx" } else { "c:catAx" };
    write!(writer, "<{}>", cat_tag)?;
    write_axis_common(
        writer,
        CATEGORY_AXIS_ID,
        cat_pos,
        !style.show_category_axis,
        style.major_vertical_gridlines,
        style.minor_vertical_gridlines,
        style.category_title.as_ref(),
        style,
        chart.font_size,
    )?;
    write!(
        writer,
        r#"<c:crossAx val="{}"/><c:crosses val="autoZero"/>"#,
        VALUE_AXIS_ID
    )?;
    if cat_tag == "c:catAx" {
        write!(
            writer,
            r#"<c:auto val="1"/><c:lblAlgn val="ctr"/><c:lblOffset val="100"/><c:noMultiLvlLbl val="0"/>"#
        )?;
    } else {
        write!(writer, r#"<c:crossBetween val="midCat"/>"#)?;
    }
    write!(writer, "</{}>", cat_tag)?;

    write!(writer, "<c:valAx>")?;
    write_axis_common(
        writer,
        VALUE_AXIS_ID,
        val_pos,
        !style.show_value_axis,
        style.major_horizontal_gridlines,
        style.minor_horizontal_gridlines,
        style.value_title.as_ref(),
        style,
        chart.font_size,
    )?;
    write!(
        writer,
        r#"<c:crossAx val="{}"/><c:crosses val="autoZero"/><c:crossBetween val="between"/>"#,
        CATEGORY_AXIS_ID
    )?;
    write!(writer, "</c:valAx>")?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn write_axis_common<W: Write>(
    writer: &mut W,
    axis_id: u32,
    position: &str,
    deleted: bool,
    major_gridlines: bool,
    minor_gridlines: bool,
    title: Option<&AxisTitle>,
    style: &AxisStyle,
    font_size: Option<u32>,
) -> std::io::Result<()> {
    write!(writer, r#"<c:axId val="{}"/>"#, axis_id)?;
    write!(writer, r#"<c:scaling><c:orientation val="minMax"/></c:scaling>"#)?;
    write!(
        writer,
        r#"<c:delete val="{}"/>"#,
        if deleted { "1" } else { "0" }
    )?;
    write!(writer, r#"<c:axPos val="{}"/>"#, position)?;
    if major_gridlines {
        write_gridlines(writer, "c:majorGridlines", style.gridline_color)?;
    }
    if minor_gridlines {
        write_gridlines(writer, "c:minorGridlines", style.gridline_color)?;
    }
    if let Some(title) = title {
        write_title(writer, &title.text, Some(title.size), style.label_color)?;
    }
    write!(writer, r#"<c:numFmt formatCode="General" sourceLinked="1"/>"#)?;
    write!(writer, r#"<c:majorTickMark val="out"/><c:minorTickMark val="none"/>"#)?;
    write!(writer, r#"<c:tickLblPos val="nextTo"/>"#)?;
    if style.label_color.is_some() {
        write_text_properties(writer, font_size, style.label_color)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::charts::model::{GridValue, LegendPosition};

    fn to_string(chart: &Chart) -> String {
        String::from_utf8(chart_to_bytes(chart).unwrap()).unwrap()
    }

    #[test]
    fn test_line_chart_from_arrays() {
        let mut chart = Chart::from_arrays(
            ChartKind::Line,
            &["Revenue"],
            vec![vec![100.0, 120.5, 90.0]],
            &["Jan", "Feb", "Mar"],
        )
        .unwrap();
        chart.set_title("Revenue growth", 14);
        let xml = to_string(&chart);

        assert!(xml.starts_with(r#"<?xml version="1.0""#));
        assert!(xml.contains("<c:lineChart>"));
        assert!(xml.contains("<c:tx><c:v>Revenue</c:v></c:tx>"));
        assert!(xml.contains(r#"<c:pt idx="1"><c:v>120.5</c:v></c:pt>"#));
        assert!(xml.contains(r#"<c:pt idx="2"><c:v>Mar</c:v></c:pt>"#));
        assert!(xml.contains(r#"sz="1400""#));
        assert!(xml.contains("<c:catAx>"));
        assert!(xml.ends_with("</c:chartSpace>"));
    }

    #[test]
    fn test_pie_point_fills_and_no_axes() {
        let mut chart = Chart::from_arrays(
            ChartKind::Pie,
            &["Expenses"],
            vec![vec![50.0, 30.0, 20.0]],
            &["Research and Development", "Marketing", "Other"],
        )
        .unwrap();
        chart.set_point_fill(0, 2, Rgb::new(91, 155, 213)).unwrap();
        let xml = to_string(&chart);

        assert!(xml.contains("<c:pieChart>"));
        assert!(!xml.contains("<c:catAx>"));
        assert_eq!(xml.matches("<c:dPt>").count(), 3);
        assert!(xml.contains("5B9BD5"));
    }

    #[test]
    fn test_range_chart_keeps_references() {
        let grid = vec![
            vec![GridValue::Text("Year".into()), GridValue::Text("Amount".into())],
            vec![GridValue::Number(0.0), GridValue::Number(1000.0)],
            vec![GridValue::Number(1.0), GridValue::Empty],
        ];
        let mut chart =
            Chart::from_range(ChartKind::LineNormal, "Sheet1", 0, 0, &grid, false).unwrap();
        chart.axes.minor_vertical_gridlines = true;
        chart.axes.gridline_color = Some(Rgb::grey(134));
        chart.set_legend(Some(LegendPosition::Top));
        let xml = to_string(&chart);

        assert!(xml.contains("<c:f>Sheet1!$B$2:$B$3</c:f>"));
        assert!(xml.contains("<c:f>Sheet1!$B$1</c:f>"));
        assert!(xml.contains(r#"<c:ptCount val="2"/><c:pt idx="0"><c:v>1000</c:v></c:pt></c:numCache>"#));
        assert!(xml.contains("<c:minorGridlines><c:spPr>"));
        assert!(xml.contains("868686"));
        assert!(xml.contains(r#"<c:legendPos val="t"/>"#));
        assert!(xml.contains(r#"<c:symbol val="none"/>"#));
    }

    #[test]
    fn test_scatter_uses_value_axes() {
        let mut chart = Chart::new(ChartKind::Scatter);
        let mut series = Series::new("Rating", vec![3.0, 4.0]);
        series.numeric_categories = Some(NumericData {
            source_ref: None,
            values: vec![Some(1.0), Some(2.0)],
            format_code: None,
        });
        chart.add_series(series);
        let xml = to_string(&chart);
        assert!(xml.contains("<c:xVal><c:numLit>"));
        assert_eq!(xml.matches("<c:valAx>").count(), 2);
    }

    #[test]
    fn test_axis_titles_precede_number_format() {
        let mut chart =
            Chart::from_arrays(ChartKind::LineNormal, &["Growth"], vec![vec![5.0, 7.5]], &["2024", "2025"])
                .unwrap();
        chart.set_value_axis_title("Growth (%)", 14);
        chart.set_category_axis_title("Year", 14);
        let xml = to_string(&chart);

        assert!(xml.contains("<a:t>Year</a:t>"));
        let title = xml.find("<a:t>Growth (%)</a:t>").unwrap();
        let val_ax = xml.find("<c:valAx>").unwrap();
        assert!(title > val_ax);
        assert!(xml[val_ax..].find("<c:title>").unwrap() < xml[val_ax..].find("<c:numFmt").unwrap());
    }
}
