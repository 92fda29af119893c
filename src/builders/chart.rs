/// Charts built from parallel numeric arrays.
use crate::common::unit::mm_to_emu;
use crate::ooxml::charts::{Chart, ChartKind, LegendPosition, Series};
use crate::ooxml::docx::{InlineChart, Paragraph};
use crate::ooxml::error::{OoxmlError, Result};

/// Data and size of a chart. Series names may be left out, as pie charts
/// usually do.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub series: Vec<(String, Vec<f64>)>,
    pub categories: Vec<String>,
    pub width_mm: f64,
    pub height_mm: f64,
    /// Text and size in points
    pub title: Option<(String, u32)>,
    pub legend: Option<LegendPosition>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            series: Vec::new(),
            categories: Vec::new(),
            width_mm: 170.0,
            height_mm: 90.0,
            title: None,
            legend: Some(LegendPosition::Bottom),
        }
    }

    pub fn series(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.series.push((name.into(), values));
        self
    }

    pub fn categories<S: AsRef<str>>(mut self, categories: &[S]) -> Self {
        self.categories = categories.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    pub fn size_mm(mut self, width: f64, height: f64) -> Self {
        self.width_mm = width;
        self.height_mm = height;
        self
    }

    pub fn title(mut self, text: impl Into<String>, size: u32) -> Self {
        self.title = Some((text.into(), size));
        self
    }

    pub fn legend(mut self, position: Option<LegendPosition>) -> Self {
        self.legend = position;
        self
    }

    pub fn size_emu(&self) -> (i64, i64) {
        (mm_to_emu(self.width_mm), mm_to_emu(self.height_mm))
    }

    /// The chart model, with every series sharing the category labels.
    pub fn build(&self) -> Result<Chart> {
        if self.series.is_empty() {
            return Err(OoxmlError::InvalidFormat("chart has no series".to_string()));
        }
        let mut chart = Chart::new(self.kind);
        for (name, values) in &self.series {
            let mut series = Series::new(name.as_str(), values.clone()).with_categories(&self.categories);
            if name.is_empty() {
                series.name = None;
            }
            chart.add_series(series);
        }
        if let Some((text, size)) = &self.title {
            chart.set_title(text.as_str(), *size);
        }
        chart.set_legend(self.legend);
        Ok(chart)
    }
}

/// Add the chart described by `spec` to `paragraph`.
pub fn add_chart<'p>(paragraph: &'p mut Paragraph, spec: &ChartSpec) -> Result<&'p mut InlineChart> {
    let chart = spec.build()?;
    let (width, height) = spec.size_emu();
    Ok(paragraph.add_chart(chart, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_chart_from_arrays() {
        let spec = ChartSpec::new(ChartKind::LineNormal)
            .series("Revenue", vec![100.0, 120.0, 130.0, 150.0])
            .series("Expenses", vec![80.0, 90.0, 95.0, 100.0])
            .categories(&["Q1", "Q2", "Q3", "Q4"]);
        let mut paragraph = Paragraph::new();
        let inline = add_chart(&mut paragraph, &spec).unwrap();
        assert_eq!(inline.size_emu(), (6_120_000, 3_240_000));
        let chart = inline.chart();
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name.as_deref(), Some("Revenue"));
        assert_eq!(chart.series[1].categories.as_ref().unwrap().values[3], "Q4");
    }

    #[test]
    fn test_unnamed_pie_series() {
        let chart = ChartSpec::new(ChartKind::Pie)
            .series("", vec![40.0, 35.0, 25.0])
            .categories(&["Research and Development", "Marketing", "Other"])
            .build()
            .unwrap();
        assert_eq!(chart.series[0].name, None);
        assert_eq!(chart.series[0].len(), 3);
    }

    #[test]
    fn test_empty_spec_fails() {
        assert!(ChartSpec::new(ChartKind::Bar).build().is_err());
    }
}
