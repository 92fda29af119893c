//! Startup pitch deck assembled from market, audience and financial data
//! (`.pptx`).
//!
//! Amounts arrive as text with a unit after the first space (`"1.2 billion"`,
//! `"500000 USD"`); shares and growth rates as percentages (`"25%"`). Both
//! are checked when the payloads load, so the slide builders can rely on
//! them parsing.
use std::path::PathBuf;

use serde::Deserialize;

use crate::builders::{ChartSpec, TextStyle, add_shape_text};
use crate::common::Rgb;
use crate::common::unit::inch_to_emu;
use crate::config::RunConfig;
use crate::error::Result;
use crate::input::{Validate, load_json};
use crate::ooxml::charts::{Chart, ChartKind, LegendPosition};
use crate::ooxml::docx::Justification;
use crate::ooxml::pptx::{DEFAULT_SLIDE_HEIGHT, Presentation, SchemeColor, Slide, WIDESCREEN_SLIDE_WIDTH};
use crate::session::{DocumentKind, DocumentSession};

pub const MARKET_INPUT: &str = "statista_api_response.json";
pub const COMPETITORS_INPUT: &str = "crunchbase_api_response.json";
pub const AUDIENCE_INPUT: &str = "smi_api_response.json";
pub const TRENDS_INPUT: &str = "google_trends_api_response.json";
pub const FINANCIAL_INPUT: &str = "financial_model_data.json";

const COMPANY: &str = "GreenVibe Solutions";
const PRESENTED_ON: &str = "12.12.2024";

const BACKGROUND: Rgb = Rgb::WHITE;
const TEXT: Rgb = Rgb::new(80, 80, 80);
const SPECIAL: Rgb = Rgb::new(15, 102, 7);
const ALTERNATE: Rgb = Rgb::new(230, 69, 69);
const GRID: Rgb = Rgb::grey(134);

const FONT: &str = "Arial";
const ACCENT_FONT: &str = "Arial Black";

/// Break-even chart points: zero units, the break-even point at the middle,
/// twice the point at the end.
const BREAK_EVEN_POINTS: u32 = 9;

#[derive(Debug, Clone, Deserialize)]
pub struct MarketOverview {
    pub market: Market,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Market {
    pub size: String,
    pub growth_rate: String,
    pub trends: Vec<String>,
}

impl Validate for MarketOverview {}

#[derive(Debug, Clone, Deserialize)]
pub struct CompetitorsOverview {
    pub competitors: Vec<Competitor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Competitor {
    pub name: String,
    /// `"25%"`
    pub market_share: String,
    pub recent_funding: String,
    pub products: Vec<String>,
}

impl Validate for CompetitorsOverview {
    fn validate(&self) -> std::result::Result<(), String> {
        for competitor in &self.competitors {
            if percent(&competitor.market_share).is_none() {
                return Err(format!(
                    "market share of {} is not a percentage: {:?}",
                    competitor.name, competitor.market_share
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudienceOverview {
    pub social_trends: SocialTrends,
    pub demographics: Demographics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SocialTrends {
    pub positive_feedback: Vec<String>,
    pub negative_feedback: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Demographics {
    pub age_range: String,
    pub location: String,
    pub income_level: String,
}

impl Validate for AudienceOverview {}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendsOverview {
    pub search_trends: Vec<SearchTrend>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTrend {
    pub topic: String,
    pub growth: String,
}

impl Validate for TrendsOverview {}

#[derive(Debug, Clone, Deserialize)]
pub struct FinancialModel {
    pub profit_forecast: Vec<YearForecast>,
    pub break_even_analysis: BreakEvenAnalysis,
    pub growth_rates: Vec<YearGrowth>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YearForecast {
    pub year: String,
    pub revenue: String,
    pub cost_of_goods_sold: String,
    pub gross_profit: String,
    pub operating_expenses: String,
    pub net_profit: String,
}

impl YearForecast {
    fn amounts(&self) -> [&str; 5] {
        [
            &self.revenue,
            &self.cost_of_goods_sold,
            &self.gross_profit,
            &self.operating_expenses,
            &self.net_profit,
        ]
    }
}

const FORECAST_SERIES: [&str; 5] = [
    "Revenue",
    "Cost of goods sold",
    "Gross profit",
    "Operating expenses",
    "Net profit",
];

#[derive(Debug, Clone, Deserialize)]
pub struct BreakEvenAnalysis {
    pub fixed_costs: String,
    pub selling_price_per_unit: String,
    pub variable_cost_per_unit: String,
    /// Units
    pub break_even_point: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YearGrowth {
    pub year: String,
    pub growth: String,
}

impl Validate for FinancialModel {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.profit_forecast.is_empty() {
            return Err("profit_forecast must not be empty".to_string());
        }
        for forecast in &self.profit_forecast {
            if let Some(bad) = forecast.amounts().into_iter().find(|a| amount(a).is_none()) {
                return Err(format!("forecast for {} has a bad amount: {:?}", forecast.year, bad));
            }
        }
        let analysis = &self.break_even_analysis;
        for value in [
            &analysis.fixed_costs,
            &analysis.selling_price_per_unit,
            &analysis.variable_cost_per_unit,
        ] {
            if amount(value).is_none() {
                return Err(format!("break even analysis has a bad amount: {:?}", value));
            }
        }
        if let Some(bad) = self.growth_rates.iter().find(|g| percent(&g.growth).is_none()) {
            return Err(format!("growth for {} is not a percentage: {:?}", bad.year, bad.growth));
        }
        Ok(())
    }
}

/// All payloads of the deck.
#[derive(Debug, Clone)]
pub struct StartupData {
    pub market: MarketOverview,
    pub competitors: CompetitorsOverview,
    pub audience: AudienceOverview,
    pub trends: TrendsOverview,
    pub financial: FinancialModel,
}

impl StartupData {
    pub fn load(config: &RunConfig) -> Result<Self> {
        Ok(Self {
            market: load_json(config.data_file(MARKET_INPUT))?,
            competitors: load_json(config.data_file(COMPETITORS_INPUT))?,
            audience: load_json(config.data_file(AUDIENCE_INPUT))?,
            trends: load_json(config.data_file(TRENDS_INPUT))?,
            financial: load_json(config.data_file(FINANCIAL_INPUT))?,
        })
    }
}

/// Split `"1.2 billion"` into `("1.2", "billion")`. Text without a space is
/// all value.
pub fn split_value_unit(text: &str) -> (&str, &str) {
    match text.split_once(' ') {
        Some((value, unit)) => (value, unit),
        None => (text, ""),
    }
}

/// Numeric part of an amount such as `"500,000 USD"`.
fn amount(text: &str) -> Option<f64> {
    split_value_unit(text.trim()).0.replace(',', "").parse().ok()
}

/// `"25%"` as `25.0`.
fn percent(text: &str) -> Option<f64> {
    text.trim().trim_end_matches('%').trim().parse().ok()
}

/// `mark` once per line, `count` lines, to sit beside a list.
fn bullets(mark: char, count: usize) -> String {
    std::iter::repeat_n(format!("{}\n", mark), count).collect()
}

fn lines(items: &[String]) -> String {
    items.iter().map(|item| format!("{}\n", item)).collect()
}

/// Competitor names with their share, then `"Others"` with the rest of 100%.
pub fn market_shares(competitors: &[Competitor]) -> (Vec<String>, Vec<f64>) {
    let mut names: Vec<String> = competitors.iter().map(|c| c.name.clone()).collect();
    let mut shares: Vec<f64> = competitors
        .iter()
        .map(|c| percent(&c.market_share).unwrap_or_default())
        .collect();
    let others = 100.0 - shares.iter().sum::<f64>();
    names.push("Others".to_string());
    shares.push((others * 100.0).round() / 100.0);
    (names, shares)
}

/// `(units, revenue, total costs)` from zero units up to twice the break-even
/// point, in steps of a quarter of it.
pub fn break_even_points(analysis: &BreakEvenAnalysis) -> Vec<(u64, f64, f64)> {
    let fixed = amount(&analysis.fixed_costs).unwrap_or_default();
    let price = amount(&analysis.selling_price_per_unit).unwrap_or_default();
    let variable = amount(&analysis.variable_cost_per_unit).unwrap_or_default();
    // Twice a u32 break-even point does not fit a u32.
    let step = u64::from(analysis.break_even_point / 4);
    (0..BREAK_EVEN_POINTS)
        .map(|i| {
            let units = u64::from(i) * step;
            let sold = units as f64;
            (units, sold * price, fixed + sold * variable)
        })
        .collect()
}

pub fn generate(config: &RunConfig) -> Result<PathBuf> {
    let data = StartupData::load(config)?;
    let mut session = DocumentSession::create(DocumentKind::Presentation);
    build(session.presentation_mut()?, &data)?;
    super::finish(session, config)
}

pub fn build(pres: &mut Presentation, data: &StartupData) -> Result<()> {
    pres.set_slide_size(WIDESCREEN_SLIDE_WIDTH, DEFAULT_SLIDE_HEIGHT);
    pres.color_scheme_mut().change_color(SchemeColor::Accent1, SPECIAL);

    title_slide(pres.slide_mut(0)?)?;
    market_slide(new_slide(pres), &data.market.market)?;
    competitors_slides(pres, &data.competitors.competitors)?;
    audience_slide(new_slide(pres), &data.audience)?;
    search_trends_slide(new_slide(pres), &data.trends.search_trends)?;
    profit_forecast_slide(new_slide(pres), &data.financial.profit_forecast)?;
    break_even_slide(new_slide(pres), &data.financial.break_even_analysis)?;
    growth_rates_slide(new_slide(pres), &data.financial.growth_rates)?;
    Ok(())
}

fn new_slide(pres: &mut Presentation) -> &mut Slide {
    let slide = pres.add_slide();
    slide.set_background_color(BACKGROUND);
    slide
}

fn plain(size: u32) -> TextStyle {
    TextStyle::sized(size).with_font(FONT).with_color(TEXT)
}

fn special(size: u32) -> TextStyle {
    TextStyle::sized(size).with_font(ACCENT_FONT).with_color(SPECIAL)
}

fn centered(style: TextStyle) -> TextStyle {
    style.with_justification(Justification::Center)
}

/// A text box at `x, y` inches from the slide's top-left corner.
fn text_box(slide: &mut Slide, (width, height): (f64, f64), (x, y): (f64, f64), text: &str, style: &TextStyle) -> Result<()> {
    let shape = slide.add_text_shape(inch_to_emu(x), inch_to_emu(y), inch_to_emu(width), inch_to_emu(height));
    add_shape_text(shape.paragraph_mut(0)?, text, style);
    Ok(())
}

fn slide_title(slide: &mut Slide, title: &str) -> Result<()> {
    text_box(slide, (11.8, 0.8), (0.8, 0.4), title, &centered(plain(72)))
}

fn chart_heading(slide: &mut Slide, heading: &str) -> Result<()> {
    text_box(slide, (11.8, 0.8), (0.8, 1.2), heading, &centered(plain(48)))
}

fn place_chart(slide: &mut Slide, chart: Chart, (width, height): (f64, f64), (x, y): (f64, f64)) {
    slide.add_chart(chart, inch_to_emu(x), inch_to_emu(y), inch_to_emu(width), inch_to_emu(height));
}

/// Line chart styling shared by the financial slides.
fn financial_chart(mut chart: Chart, value_title: &str, category_title: &str) -> Chart {
    chart
        .set_value_axis_title(value_title, 14)
        .set_category_axis_title(category_title, 14)
        .set_font_size(14);
    chart.axes.minor_vertical_gridlines = true;
    chart.axes.gridline_color = Some(GRID);
    chart
}

fn title_slide(slide: &mut Slide) -> Result<()> {
    slide.remove_all_objects().set_background_color(BACKGROUND);
    text_box(slide, (11.8, 1.4), (0.8, 2.3), COMPANY, &centered(special(120).bold()))?;
    text_box(slide, (11.8, 0.8), (0.8, 3.9), PRESENTED_ON, &centered(plain(48)))
}

fn market_slide(slide: &mut Slide, market: &Market) -> Result<()> {
    slide_title(slide, "Market Overview")?;
    for (x, label, figure) in [
        (0.8, "Market size:", &market.size),
        (7.0, "Growth rate:", &market.growth_rate),
    ] {
        let (value, unit) = split_value_unit(figure);
        text_box(slide, (5.62, 0.8), (x, 1.58), label, &centered(plain(48)))?;
        text_box(slide, (5.62, 0.8), (x, 1.97), value, &centered(special(144)))?;
        text_box(slide, (5.62, 0.8), (x, 3.06), unit, &centered(plain(48)))?;
    }
    text_box(slide, (11.8, 0.8), (0.8, 3.75), "Trends:", &centered(plain(48)))?;
    text_box(slide, (0.93, 2.92), (1.57, 4.31), &bullets('>', market.trends.len()), &special(72))?;
    text_box(slide, (9.21, 2.92), (2.1, 4.31), &lines(&market.trends), &centered(special(72)))
}

fn competitors_slides(pres: &mut Presentation, competitors: &[Competitor]) -> Result<()> {
    let slide = new_slide(pres);
    slide_title(slide, "Competitors Overview")?;
    chart_heading(slide, "Market shares")?;
    let (names, shares) = market_shares(competitors);
    let mut chart = ChartSpec::new(ChartKind::Pie)
        .series("", shares)
        .categories(&names)
        .legend(Some(LegendPosition::Right))
        .build()?;
    chart.set_font_size(14);
    place_chart(slide, chart, (6.51, 5.9), (4.18, 1.49));

    for competitor in competitors {
        let slide = new_slide(pres);
        slide_title(slide, "Competitors Overview")?;
        text_box(slide, (11.8, 0.8), (0.8, 1.2), &competitor.name, &centered(plain(64)))?;
        text_box(slide, (3.13, 0.8), (1.07, 2.65), "Recent funding:", &plain(48))?;
        text_box(slide, (8.9, 0.8), (4.19, 2.52), &competitor.recent_funding, &special(96))?;
        text_box(slide, (3.13, 0.8), (1.07, 3.72), "Main products:", &plain(48))?;
        text_box(slide, (0.93, 3.53), (4.19, 3.72), &bullets('>', competitor.products.len()), &special(72))?;
        text_box(slide, (7.97, 3.53), (5.12, 3.72), &lines(&competitor.products), &special(72))?;
    }
    Ok(())
}

fn audience_slide(slide: &mut Slide, audience: &AudienceOverview) -> Result<()> {
    slide_title(slide, "Target Audience")?;

    let demographics = &audience.demographics;
    text_box(slide, (5.62, 0.8), (0.8, 1.33), "Demographics:", &centered(plain(48)))?;
    // (value top, value, size, caption top, caption)
    for (y, value, size, caption_y, caption) in [
        (1.97, &demographics.age_range, 128, 2.95, "age range"),
        (3.68, &demographics.location, 72, 4.27, "location"),
        (5.28, &demographics.income_level, 56, 5.83, "income level"),
    ] {
        text_box(slide, (5.62, 0.8), (0.8, y), value, &centered(special(size)))?;
        text_box(slide, (5.62, 0.8), (0.8, caption_y), caption, &centered(plain(40)))?;
    }

    let trends = &audience.social_trends;
    text_box(slide, (5.62, 0.8), (6.0, 1.33), "Social trends:", &centered(plain(48)))?;
    for (y, mark, feedback, color) in [
        (2.06, '+', &trends.positive_feedback, SPECIAL),
        (4.55, '-', &trends.negative_feedback, ALTERNATE),
    ] {
        let style = special(52).with_color(color);
        text_box(slide, (0.63, 2.42), (7.0, y), &bullets(mark, feedback.len()), &style)?;
        text_box(slide, (5.56, 2.42), (7.67, y), &lines(feedback), &style)?;
    }
    Ok(())
}

fn search_trends_slide(slide: &mut Slide, trends: &[SearchTrend]) -> Result<()> {
    slide_title(slide, "Search Trends")?;
    let mut y = 1.43;
    for trend in trends {
        text_box(slide, (11.8, 0.8), (0.8, y), &trend.topic, &centered(special(96)))?;
        text_box(slide, (11.8, 0.8), (0.8, y + 0.8), &trend.growth, &centered(plain(40)))?;
        y += 1.25;
    }
    Ok(())
}

fn profit_forecast_slide(slide: &mut Slide, forecast: &[YearForecast]) -> Result<()> {
    slide_title(slide, "Financial Model")?;
    chart_heading(slide, "Profit forecast")?;

    let years: Vec<&str> = forecast.iter().map(|f| f.year.as_str()).collect();
    let mut spec = ChartSpec::new(ChartKind::LineNormal).categories(&years);
    for (index, name) in FORECAST_SERIES.into_iter().enumerate() {
        let values = forecast
            .iter()
            .map(|f| amount(f.amounts()[index]).unwrap_or_default())
            .collect();
        spec = spec.series(name, values);
    }
    let unit = forecast
        .first()
        .map(|f| split_value_unit(&f.revenue).1)
        .unwrap_or_default();
    let chart = financial_chart(spec.build()?, &format!("Amount ({})", unit), "Year");
    place_chart(slide, chart, (10.06, 5.06), (1.67, 2.0));
    Ok(())
}

fn break_even_slide(slide: &mut Slide, analysis: &BreakEvenAnalysis) -> Result<()> {
    slide_title(slide, "Financial Model")?;
    chart_heading(slide, "Break even analysis")?;

    let points = break_even_points(analysis);
    let units: Vec<String> = points.iter().map(|(units, _, _)| units.to_string()).collect();
    let spec = ChartSpec::new(ChartKind::LineNormal)
        .series("Revenue", points.iter().map(|p| p.1).collect())
        .series("Total costs", points.iter().map(|p| p.2).collect())
        .categories(&units)
        .legend(Some(LegendPosition::Bottom));
    let unit = split_value_unit(&analysis.fixed_costs).1;
    let chart = financial_chart(spec.build()?, &format!("Amount ({})", unit), "Units sold");
    place_chart(slide, chart, (9.17, 5.06), (0.31, 2.0));

    text_box(slide, (5.62, 0.8), (8.4, 3.11), "Break even point:", &centered(plain(48)))?;
    text_box(
        slide,
        (5.62, 0.8),
        (8.4, 3.51),
        &analysis.break_even_point.to_string(),
        &centered(special(128)),
    )?;
    text_box(slide, (5.62, 0.8), (8.4, 4.38), "units", &centered(plain(40)))
}

fn growth_rates_slide(slide: &mut Slide, growth: &[YearGrowth]) -> Result<()> {
    slide_title(slide, "Financial Model")?;
    chart_heading(slide, "Growth rates")?;

    let years: Vec<&str> = growth.iter().map(|g| g.year.as_str()).collect();
    let values = growth
        .iter()
        .map(|g| percent(&g.growth).unwrap_or_default())
        .collect();
    let spec = ChartSpec::new(ChartKind::LineNormal)
        .series("", values)
        .categories(&years);
    let chart = financial_chart(spec.build()?, "Growth (%)", "Year");
    place_chart(slide, chart, (10.06, 5.06), (1.67, 2.0));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::input::InputError;
    use crate::ooxml::pptx::SlideObject;
    use crate::reports::testing::{overwrite_data, sandbox};

    fn competitor(name: &str, share: &str) -> Competitor {
        Competitor {
            name: name.to_string(),
            market_share: share.to_string(),
            recent_funding: "$10M".to_string(),
            products: vec!["Solar kits".to_string()],
        }
    }

    fn charts(slide: &Slide) -> Vec<&Chart> {
        slide
            .objects()
            .iter()
            .filter_map(|object| match object {
                SlideObject::Chart(frame) => Some(frame.chart()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_split_value_unit() {
        assert_eq!(split_value_unit("1.2 billion USD"), ("1.2", "billion USD"));
        assert_eq!(split_value_unit("15%"), ("15%", ""));
        assert_eq!(amount("500,000 USD"), Some(500_000.0));
        assert_eq!(percent(" 12.5% "), Some(12.5));
        assert_eq!(percent("n/a"), None);
    }

    #[test]
    fn test_others_take_the_remaining_share() {
        let (names, shares) = market_shares(&[competitor("EcoHome", "25%"), competitor("SunWorks", "17.5%")]);
        assert_eq!(names, ["EcoHome", "SunWorks", "Others"]);
        assert_eq!(shares, [25.0, 17.5, 57.5]);
    }

    #[test]
    fn test_break_even_points() {
        let analysis = BreakEvenAnalysis {
            fixed_costs: "50000 USD".to_string(),
            selling_price_per_unit: "50 USD".to_string(),
            variable_cost_per_unit: "30 USD".to_string(),
            break_even_point: 2500,
        };
        let points = break_even_points(&analysis);
        assert_eq!(points.len(), 9);
        assert_eq!(points[0], (0, 0.0, 50_000.0));
        // revenue meets total costs at the break-even point
        assert_eq!(points[4], (2500, 125_000.0, 125_000.0));
        assert_eq!(points[8].0, 5000);
    }

    #[test]
    fn test_break_even_points_near_u32_limit() {
        let analysis = BreakEvenAnalysis {
            fixed_costs: "1 USD".to_string(),
            selling_price_per_unit: "2 USD".to_string(),
            variable_cost_per_unit: "1 USD".to_string(),
            break_even_point: u32::MAX,
        };
        let points = break_even_points(&analysis);
        assert_eq!(points[4].0, 4_294_967_292);
        assert_eq!(points[8].0, 8_589_934_584);
        assert_eq!(points[8].1, 17_179_869_168.0);
    }

    #[test]
    fn test_bullets_match_lines() {
        let items = vec!["a".to_string(), "b".to_string()];
        assert_eq!(bullets('>', items.len()), ">\n>\n");
        assert_eq!(lines(&items), "a\nb\n");
    }

    #[test]
    fn test_deck_from_samples() {
        let (_dir, config) = sandbox();
        let data = StartupData::load(&config).unwrap();
        let mut pres = Presentation::new();
        build(&mut pres, &data).unwrap();

        let competitors = data.competitors.competitors.len();
        assert_eq!(pres.slide_count(), 8 + competitors);
        assert_eq!(pres.slide_size().0, WIDESCREEN_SLIDE_WIDTH);
        assert_eq!(pres.color_scheme().color(SchemeColor::Accent1), SPECIAL);

        let pie = charts(&pres.slides()[2]);
        assert_eq!(pie[0].kind, ChartKind::Pie);
        assert_eq!(pie[0].series[0].len(), competitors + 1);

        let last = pres.slides().len() - 1;
        let break_even = charts(&pres.slides()[last - 1]);
        assert_eq!(break_even[0].series.len(), 2);
        assert!(break_even[0].axes.minor_vertical_gridlines);
        let forecast = charts(&pres.slides()[last - 2]);
        assert_eq!(forecast[0].series.len(), FORECAST_SERIES.len());
    }

    #[test]
    fn test_bad_share_is_rejected() {
        let (_dir, config) = sandbox();
        overwrite_data(
            &config,
            COMPETITORS_INPUT,
            r#"{"competitors": [{"name": "A", "market_share": "a lot", "recent_funding": "", "products": []}]}"#,
        );
        assert!(matches!(generate(&config), Err(Error::Input(InputError::Invalid { .. }))));
        assert!(!config.output_file("pptx").exists());
    }

    #[test]
    fn test_generate() {
        let (_dir, config) = sandbox();
        let output = generate(&config).unwrap();
        let file = std::fs::File::open(output).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert!(archive.by_name("ppt/charts/chart4.xml").is_ok());
    }
}
