//! Flow layout of a word processing document onto fixed-size pages.
//!
//! The body is laid out top-down. Paragraphs are broken into lines from
//! approximate glyph widths, lines move to the next page when they do not
//! fit, and table rows are kept whole. The result is a list of pages of
//! [`DrawOp`]s in PDF user space (points, origin at the bottom left).

use std::collections::HashMap;

use log::{debug, warn};

use crate::common::Rgb;
use crate::common::unit::EMUS_PER_PT;
use crate::ooxml::charts::Chart;
use crate::ooxml::docx::styles::{FALLBACK_FONT_FAMILY, FALLBACK_FONT_SIZE};
use crate::ooxml::docx::{
    BodyElement, BorderStyle, ContentControl, Document, Justification, LevelSuffix, Paragraph,
    ParagraphItem, RunContent, RunProperties, Style, Table, VerticalAlign,
};

use super::error::{PdfError, Result};
use super::font::{FontFamily, StandardFont};

/// Ascent and descent of a line of text, as fractions of the font size.
/// Their sum is the usual single line height of 1.15 em.
const ASCENT: f32 = 0.9;
const DESCENT: f32 = 0.25;

const DEFAULT_TAB_STOP: f32 = 36.0;
const DEFAULT_CELL_MARGIN: u32 = 108;
const EPSILON: f32 = 0.01;

fn twips(value: u32) -> f32 {
    value as f32 / 20.0
}

fn signed_twips(value: i32) -> f32 {
    value as f32 / 20.0
}

fn emu_to_pt(value: i64) -> f32 {
    value as f32 / EMUS_PER_PT as f32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f32,
}

/// A drawing operation on a page.
///
/// Text is positioned at its baseline; rectangles and images at their
/// bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        font: StandardFont,
        size: f32,
        color: Rgb,
        text: String,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgb>,
        stroke: Option<Stroke>,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        stroke: Stroke,
    },
    /// Draw image `image` of [`PageLayout::images`]
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text of every text operation, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Decoded picture, 8-bit RGB.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Page size in points
    pub width: f32,
    pub height: f32,
    pub pages: Vec<Page>,
    pub images: Vec<RasterImage>,
}

/// Lay out every body element of `doc`.
pub fn layout_document(doc: &Document) -> Result<PageLayout> {
    let mut engine = LayoutEngine::new(doc)?;
    for element in doc.elements() {
        match element {
            BodyElement::Paragraph(paragraph) => engine.place_paragraph(paragraph)?,
            BodyElement::Table(table) => engine.place_table(table)?,
        }
    }
    Ok(engine.finish())
}

#[derive(Debug, Clone, PartialEq)]
struct TextStyle {
    font: StandardFont,
    size: f32,
    color: Rgb,
    underline: bool,
    highlight: Option<Rgb>,
    border: Option<Rgb>,
}

impl TextStyle {
    fn from_properties(properties: &RunProperties) -> Self {
        let size = properties.font_size.unwrap_or(FALLBACK_FONT_SIZE) as f32 / 2.0;
        Self {
            font: StandardFont::for_run(properties, FALLBACK_FONT_FAMILY),
            size,
            color: properties.color.unwrap_or(Rgb::BLACK),
            underline: properties.underline.unwrap_or(false),
            highlight: properties.highlight.as_deref().and_then(highlight_color),
            border: properties.border,
        }
    }

    fn width(&self, text: &str) -> f32 {
        self.font.text_width(text, self.size)
    }
}

/// Colors of the named highlight values.
fn highlight_color(name: &str) -> Option<Rgb> {
    let color = match name {
        "yellow" => Rgb::new(255, 255, 0),
        "green" => Rgb::new(0, 255, 0),
        "cyan" => Rgb::new(0, 255, 255),
        "magenta" => Rgb::new(255, 0, 255),
        "blue" => Rgb::new(0, 0, 255),
        "red" => Rgb::new(255, 0, 0),
        "darkBlue" => Rgb::new(0, 0, 139),
        "darkCyan" => Rgb::new(0, 139, 139),
        "darkGreen" => Rgb::new(0, 100, 0),
        "darkMagenta" => Rgb::new(128, 0, 128),
        "darkRed" => Rgb::new(139, 0, 0),
        "darkYellow" => Rgb::new(128, 128, 0),
        "darkGray" => Rgb::grey(169),
        "lightGray" => Rgb::grey(211),
        "black" => Rgb::BLACK,
        "white" => Rgb::WHITE,
        _ => return None,
    };
    Some(color)
}

#[derive(Debug, Clone, PartialEq)]
enum ItemKind {
    Text { text: String, style: TextStyle, space: bool },
    /// Blank advance (tab, label gap)
    Gap,
    Image(usize),
    /// Outlined box standing in for content drawn elsewhere (charts, empty
    /// picture fields)
    Frame { title: String, captions: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
struct Item {
    width: f32,
    ascent: f32,
    descent: f32,
    kind: ItemKind,
}

impl Item {
    fn text(text: String, style: &TextStyle, space: bool) -> Self {
        Self {
            width: style.width(&text),
            ascent: style.size * ASCENT,
            descent: style.size * DESCENT,
            kind: ItemKind::Text { text, style: style.clone(), space },
        }
    }

    fn gap(width: f32) -> Self {
        Self { width, ascent: 0.0, descent: 0.0, kind: ItemKind::Gap }
    }

    fn is_space(&self) -> bool {
        matches!(self.kind, ItemKind::Text { space: true, .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Atom {
    Word(Item),
    Space(Item),
    /// Unbreakable content: labels, pictures and frames
    Fixed(Item),
    Tab,
    Break,
    PageBreak,
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    items: Vec<Item>,
    indent: f32,
    ascent: f32,
    descent: f32,
    page_break_before: bool,
    /// Ended by an explicit line break or the paragraph end
    hard_end: bool,
}

impl Line {
    fn new(indent: f32, ascent: f32, descent: f32) -> Self {
        Self {
            items: Vec::new(),
            indent,
            ascent,
            descent,
            page_break_before: false,
            hard_end: false,
        }
    }

    fn width(&self) -> f32 {
        self.items.iter().map(|item| item.width).sum()
    }

    fn has_content(&self) -> bool {
        self.items.iter().any(|item| !item.is_space())
    }

    fn push(&mut self, item: Item) {
        self.ascent = self.ascent.max(item.ascent);
        self.descent = self.descent.max(item.descent);
        self.items.push(item);
    }

    fn trim_end(&mut self) {
        while self.items.last().is_some_and(Item::is_space) {
            self.items.pop();
        }
    }

    fn height(&self, factor: f32) -> f32 {
        (self.ascent + self.descent) * factor
    }
}

/// Horizontal geometry of a paragraph, relative to its column.
#[derive(Debug, Clone, PartialEq)]
struct LineGeometry {
    width: f32,
    first_indent: f32,
    rest_indent: f32,
    /// Custom tab stops from the column's left edge
    tab_stops: Vec<f32>,
}

impl LineGeometry {
    fn available(&self, line: &Line) -> f32 {
        self.width - line.indent
    }

    fn next_tab(&self, position: f32) -> f32 {
        if let Some(stop) = self.tab_stops.iter().copied().find(|stop| *stop > position + EPSILON) {
            return stop;
        }
        ((position + EPSILON) / DEFAULT_TAB_STOP).floor() * DEFAULT_TAB_STOP + DEFAULT_TAB_STOP
    }
}

/// Break `atoms` into lines. `mark` is the ascent and descent of the
/// paragraph mark, which sets the height of empty lines.
fn break_lines(atoms: Vec<Atom>, geometry: &LineGeometry, mark: (f32, f32)) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut line = Line::new(geometry.first_indent, mark.0, mark.1);

    let finish = |lines: &mut Vec<Line>, line: &mut Line| {
        line.trim_end();
        let next = Line::new(geometry.rest_indent, mark.0, mark.1);
        lines.push(std::mem::replace(line, next));
    };

    for atom in atoms {
        match atom {
            Atom::Word(item) => {
                if line.has_content() && line.width() + item.width > geometry.available(&line) + EPSILON {
                    finish(&mut lines, &mut line);
                }
                if item.width > geometry.available(&line) + EPSILON {
                    split_word(item, &mut lines, &mut line, geometry, &finish);
                } else {
                    line.push(item);
                }
            },
            Atom::Space(item) => {
                // spaces that caused a wrap are dropped at the start of the next line
                if line.has_content() || lines.is_empty() {
                    line.push(item);
                }
            },
            Atom::Fixed(item) => {
                if line.has_content() && line.width() + item.width > geometry.available(&line) + EPSILON {
                    finish(&mut lines, &mut line);
                }
                line.push(item);
            },
            Atom::Tab => {
                let position = line.indent + line.width();
                let stop = geometry.next_tab(position);
                if stop - line.indent > geometry.width + EPSILON && line.has_content() {
                    finish(&mut lines, &mut line);
                } else {
                    line.push(Item::gap(stop - position));
                }
            },
            Atom::Break => {
                line.hard_end = true;
                finish(&mut lines, &mut line);
            },
            Atom::PageBreak => {
                line.hard_end = true;
                finish(&mut lines, &mut line);
                line.page_break_before = true;
            },
        }
    }
    line.hard_end = true;
    line.trim_end();
    lines.push(line);
    lines
}

/// Place a word wider than a whole line character by character.
fn split_word(
    item: Item,
    lines: &mut Vec<Line>,
    line: &mut Line,
    geometry: &LineGeometry,
    finish: &impl Fn(&mut Vec<Line>, &mut Line),
) {
    let ItemKind::Text { text, style, .. } = item.kind else {
        line.push(item);
        return;
    };
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        let piece = Item::text(ch.encode_utf8(&mut buf).to_string(), &style, false);
        if line.has_content() && line.width() + piece.width > geometry.available(line) + EPSILON {
            finish(lines, line);
        }
        line.push(piece);
    }
}

/// Split text into word and space atoms.
fn push_text_atoms(atoms: &mut Vec<Atom>, text: &str, style: &TextStyle) {
    let mut word = String::new();
    for ch in text.chars() {
        if ch == ' ' || ch == '\u{3000}' {
            if !word.is_empty() {
                atoms.push(Atom::Word(Item::text(std::mem::take(&mut word), style, false)));
            }
            atoms.push(Atom::Space(Item::text(" ".to_string(), style, true)));
        } else if ch == '\t' {
            if !word.is_empty() {
                atoms.push(Atom::Word(Item::text(std::mem::take(&mut word), style, false)));
            }
            atoms.push(Atom::Tab);
        } else {
            word.push(ch);
        }
    }
    if !word.is_empty() {
        atoms.push(Atom::Word(Item::text(word, style, false)));
    }
}

/// A paragraph broken into lines, ready to be placed.
#[derive(Debug, Clone)]
struct ParagraphBlock {
    lines: Vec<Line>,
    space_before: f32,
    space_after: f32,
    line_factor: f32,
    justification: Justification,
    width: f32,
}

impl ParagraphBlock {
    fn height(&self) -> f32 {
        self.space_before
            + self.lines.iter().map(|line| line.height(self.line_factor)).sum::<f32>()
            + self.space_after
    }
}

struct LayoutEngine<'a> {
    doc: &'a Document,
    page_width: f32,
    page_height: f32,
    left: f32,
    top: f32,
    bottom: f32,
    text_width: f32,
    pages: Vec<Page>,
    current: Page,
    /// Distance of the next line from the top edge of the page
    cursor: f32,
    images: Vec<RasterImage>,
    /// List counters per numbering id, one per level
    counters: HashMap<u32, Vec<u32>>,
}

impl<'a> LayoutEngine<'a> {
    fn new(doc: &'a Document) -> Result<Self> {
        let section = doc.section();
        let page_width = twips(section.page_width);
        let page_height = twips(section.page_height);
        let top = twips(section.margin_top);
        let bottom = page_height - twips(section.margin_bottom);
        let text_width = twips(section.text_width());
        if bottom - top <= 0.0 || text_width <= 0.0 {
            return Err(PdfError::Layout(format!(
                "page margins leave no room for text on a {}x{} page",
                page_width, page_height
            )));
        }
        Ok(Self {
            doc,
            page_width,
            page_height,
            left: twips(section.margin_left),
            top,
            bottom,
            text_width,
            pages: Vec::new(),
            current: Page::default(),
            cursor: top,
            images: Vec::new(),
            counters: HashMap::new(),
        })
    }

    fn finish(mut self) -> PageLayout {
        self.pages.push(std::mem::take(&mut self.current));
        debug!("laid out {} pages with {} images", self.pages.len(), self.images.len());
        PageLayout {
            width: self.page_width,
            height: self.page_height,
            pages: self.pages,
            images: self.images,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.cursor = self.top;
    }

    fn at_page_top(&self) -> bool {
        self.cursor <= self.top + EPSILON
    }

    fn paragraph_style(&self, paragraph: &Paragraph) -> Option<&'a Style> {
        let doc = self.doc;
        let name = paragraph.properties.style.as_deref()?;
        match doc.style(name) {
            Ok(style) => Some(style),
            Err(_) => {
                warn!("paragraph refers to unknown style '{}'", name);
                None
            },
        }
    }

    /// Character formatting of the paragraph mark: document defaults, the
    /// style chain, then the paragraph's own run properties.
    fn mark_properties(&self, paragraph: &Paragraph, style: Option<&Style>) -> RunProperties {
        let mut properties = self.doc.defaults().run.clone();
        if let Some(style) = style {
            if let Some(base) = style.based_on.as_deref().and_then(|name| self.doc.style(name).ok()) {
                properties.apply(&base.run);
            }
            properties.apply(&style.run);
        }
        properties.apply(&paragraph.run_defaults);
        properties
    }

    fn add_image(&mut self, data: &[u8]) -> Result<usize> {
        let decoded = image::load_from_memory(data)?.to_rgb8();
        self.images.push(RasterImage {
            width: decoded.width(),
            height: decoded.height(),
            rgb: decoded.into_raw(),
        });
        Ok(self.images.len() - 1)
    }

    /// Scale an object down to the column width, keeping its aspect ratio.
    fn fit(size_emu: (i64, i64), width: f32) -> (f32, f32) {
        let (w, h) = (emu_to_pt(size_emu.0), emu_to_pt(size_emu.1));
        if w > width && w > 0.0 {
            (width, h * width / w)
        } else {
            (w, h)
        }
    }

    fn chart_frame(chart: &Chart, size: (f32, f32)) -> Item {
        let captions = chart
            .series
            .iter()
            .enumerate()
            .map(|(idx, series)| series.name.clone().unwrap_or_else(|| format!("Series {}", idx + 1)))
            .collect();
        Item {
            width: size.0,
            ascent: size.1,
            descent: 0.0,
            kind: ItemKind::Frame {
                title: chart.title.clone().unwrap_or_default(),
                captions,
            },
        }
    }

    /// Next label of list `num_id` at `level`, advancing the counters.
    fn next_label(&mut self, num_id: u32, level: usize) -> Result<(String, i32, i32, LevelSuffix)> {
        let doc = self.doc;
        let numbering = doc.numbering(num_id)?;
        let definition = numbering.level(level)?;
        let starts: Vec<u32> = numbering.levels.iter().map(|l| l.start).collect();
        let counters = self
            .counters
            .entry(num_id)
            .or_insert_with(|| starts.iter().map(|start| start.saturating_sub(1)).collect());
        counters[level] += 1;
        for deeper in level + 1..counters.len() {
            counters[deeper] = starts[deeper].saturating_sub(1);
        }
        let label = definition.label(&counters[..=level], &numbering.formats());
        Ok((label, definition.indent_left, definition.hanging, definition.suffix))
    }

    /// Break a paragraph into lines for a column `width` points wide.
    fn break_paragraph(&mut self, paragraph: &Paragraph, width: f32) -> Result<ParagraphBlock> {
        let doc = self.doc;
        let props = &paragraph.properties;
        let style = self.paragraph_style(paragraph);
        let mark = self.mark_properties(paragraph, style);
        let mark_style = TextStyle::from_properties(&mark);

        let mut atoms = Vec::new();
        let mut indent_left = props.indent_left.map(signed_twips).unwrap_or(0.0);
        let mut first_indent = indent_left + props.indent_first_line.map(signed_twips).unwrap_or(0.0);

        if let Some(numbering) = props.numbering {
            let (label, level_indent, hanging, suffix) = self.next_label(numbering.num_id, numbering.level as usize)?;
            indent_left = props.indent_left.map(signed_twips).unwrap_or(signed_twips(level_indent));
            first_indent = indent_left - signed_twips(hanging);
            let label_item = Item::text(label, &mark_style, false);
            let label_width = label_item.width;
            let space = mark_style.width(" ");
            if label_width > 0.0 {
                atoms.push(Atom::Fixed(label_item));
            }
            let gap = match suffix {
                LevelSuffix::Tab if label_width + EPSILON < indent_left - first_indent => {
                    indent_left - first_indent - label_width
                },
                LevelSuffix::Tab | LevelSuffix::Space => space,
                LevelSuffix::Nothing => 0.0,
            };
            if gap > 0.0 {
                atoms.push(Atom::Fixed(Item::gap(gap)));
            }
        }

        for item in &paragraph.items {
            match item {
                ParagraphItem::Run(run) => {
                    let mut properties = mark.clone();
                    properties.apply(run.properties());
                    let style = TextStyle::from_properties(&properties);
                    for content in run.content() {
                        match content {
                            RunContent::Text(text) => push_text_atoms(&mut atoms, text, &style),
                            RunContent::Break => atoms.push(Atom::Break),
                            RunContent::PageBreak => atoms.push(Atom::PageBreak),
                            RunContent::Tab => atoms.push(Atom::Tab),
                        }
                    }
                },
                ParagraphItem::Control(ContentControl::Text(form)) => {
                    let mut properties = mark.clone();
                    properties.apply(form.properties());
                    push_text_atoms(&mut atoms, form.display_text(), &TextStyle::from_properties(&properties));
                },
                ParagraphItem::Control(ContentControl::Picture(form)) => {
                    let size = Self::fit(form.size_emu(), width);
                    let item = match form.image() {
                        Some(picture) => Item {
                            width: size.0,
                            ascent: size.1,
                            descent: 0.0,
                            kind: ItemKind::Image(self.add_image(picture.data())?),
                        },
                        None => Item {
                            width: size.0,
                            ascent: size.1,
                            descent: 0.0,
                            kind: ItemKind::Frame { title: form.placeholder.clone(), captions: Vec::new() },
                        },
                    };
                    atoms.push(Atom::Fixed(item));
                },
                ParagraphItem::Chart(chart) => {
                    let size = Self::fit(chart.size_emu(), width);
                    atoms.push(Atom::Fixed(Self::chart_frame(chart.chart(), size)));
                },
                ParagraphItem::Picture(picture) => {
                    let size = Self::fit(picture.size_emu(), width);
                    let image = self.add_image(picture.data())?;
                    atoms.push(Atom::Fixed(Item {
                        width: size.0,
                        ascent: size.1,
                        descent: 0.0,
                        kind: ItemKind::Image(image),
                    }));
                },
            }
        }

        let geometry = LineGeometry {
            width,
            first_indent,
            rest_indent: indent_left,
            tab_stops: props.tab_stops.iter().map(|stop| twips(stop.position)).collect(),
        };
        let lines = break_lines(
            atoms,
            &geometry,
            (mark_style.size * ASCENT, mark_style.size * DESCENT),
        );

        let defaults = doc.defaults();
        let space_before = props
            .spacing_before
            .or(style.and_then(|s| s.spacing_before))
            .unwrap_or(0);
        let space_after = props
            .spacing_after
            .or(style.and_then(|s| s.spacing_after))
            .or(defaults.spacing_after)
            .unwrap_or(0);
        let line = props.spacing_line.or(defaults.spacing_line).unwrap_or(240);

        Ok(ParagraphBlock {
            lines,
            space_before: twips(space_before),
            space_after: twips(space_after),
            line_factor: line as f32 / 240.0,
            justification: props.justification.or(defaults.justification).unwrap_or(Justification::Left),
            width,
        })
    }

    fn place_paragraph(&mut self, paragraph: &Paragraph) -> Result<()> {
        let block = self.break_paragraph(paragraph, self.text_width)?;
        if !self.at_page_top() {
            self.cursor += block.space_before;
        }
        for line in &block.lines {
            let height = line.height(block.line_factor);
            if line.page_break_before || (self.cursor + height > self.bottom + EPSILON && !self.at_page_top()) {
                self.new_page();
            }
            self.emit_line(line, self.left, &block, self.cursor);
            self.cursor += height;
        }
        self.cursor += block.space_after;
        Ok(())
    }

    /// Draw the block's lines starting `top` points below the page top,
    /// ignoring page boundaries.
    fn emit_block(&mut self, block: &ParagraphBlock, left: f32, top: f32) -> f32 {
        let mut y = top + block.space_before;
        for line in &block.lines {
            self.emit_line(line, left, block, y);
            y += line.height(block.line_factor);
        }
        y + block.space_after - top
    }

    fn emit_line(&mut self, line: &Line, left: f32, block: &ParagraphBlock, top: f32) {
        let content_width = line.width();
        let free = (block.width - line.indent - content_width).max(0.0);
        let spaces = line.items.iter().filter(|item| item.is_space()).count();
        let (offset, extra) = match block.justification {
            Justification::Center => (free / 2.0, 0.0),
            Justification::Right => (free, 0.0),
            Justification::Both if !line.hard_end && spaces > 0 => (0.0, free / spaces as f32),
            _ => (0.0, 0.0),
        };
        let baseline = self.page_height - (top + line.ascent);
        let mut x = left + line.indent + offset;

        let mut pending: Option<(f32, String, TextStyle, f32)> = None;
        for item in &line.items {
            let width = if item.is_space() { item.width + extra } else { item.width };
            match &item.kind {
                ItemKind::Text { text, style, space } => {
                    if let Some((_, ref mut buf, ref pending_style, ref mut pending_width)) = pending
                        && pending_style == style
                        && extra == 0.0
                    {
                        buf.push_str(text);
                        *pending_width += width;
                    } else {
                        if let Some((px, buf, pstyle, pw)) = pending.take() {
                            self.emit_text(px, baseline, &buf, &pstyle, pw);
                        }
                        if !(*space && extra > 0.0) {
                            pending = Some((x, text.clone(), style.clone(), width));
                        }
                    }
                },
                ItemKind::Gap => {
                    if let Some((px, buf, pstyle, pw)) = pending.take() {
                        self.emit_text(px, baseline, &buf, &pstyle, pw);
                    }
                },
                ItemKind::Image(image) => {
                    if let Some((px, buf, pstyle, pw)) = pending.take() {
                        self.emit_text(px, baseline, &buf, &pstyle, pw);
                    }
                    self.current.ops.push(DrawOp::Image {
                        x,
                        y: baseline,
                        width: item.width,
                        height: item.ascent,
                        image: *image,
                    });
                },
                ItemKind::Frame { title, captions } => {
                    if let Some((px, buf, pstyle, pw)) = pending.take() {
                        self.emit_text(px, baseline, &buf, &pstyle, pw);
                    }
                    self.emit_frame(x, baseline, item.width, item.ascent, title, captions);
                },
            }
            x += width;
        }
        if let Some((px, buf, pstyle, pw)) = pending.take() {
            self.emit_text(px, baseline, &buf, &pstyle, pw);
        }
    }

    fn emit_text(&mut self, x: f32, baseline: f32, text: &str, style: &TextStyle, width: f32) {
        if let Some(color) = style.highlight {
            self.current.ops.push(DrawOp::Rect {
                x,
                y: baseline - style.size * DESCENT,
                width,
                height: style.size * (ASCENT + DESCENT),
                fill: Some(color),
                stroke: None,
            });
        }
        if !text.trim().is_empty() {
            self.current.ops.push(DrawOp::Text {
                x,
                y: baseline,
                font: style.font,
                size: style.size,
                color: style.color,
                text: text.to_string(),
            });
        }
        if style.underline {
            let y = baseline - style.size * 0.12;
            self.current.ops.push(DrawOp::Line {
                from: (x, y),
                to: (x + width, y),
                stroke: Stroke { color: style.color, width: (style.size * 0.05).max(0.5) },
            });
        }
        if let Some(color) = style.border {
            self.current.ops.push(DrawOp::Rect {
                x: x - 1.0,
                y: baseline - style.size * DESCENT,
                width: width + 2.0,
                height: style.size * (ASCENT + DESCENT),
                fill: None,
                stroke: Some(Stroke { color, width: 0.5 }),
            });
        }
    }

    fn emit_frame(&mut self, x: f32, y: f32, width: f32, height: f32, title: &str, captions: &[String]) {
        self.current.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill: None,
            stroke: Some(Stroke { color: Rgb::grey(160), width: 0.75 }),
        });
        let title_font = StandardFont::new(FontFamily::Helvetica, true, false);
        let caption_font = StandardFont::new(FontFamily::Helvetica, false, false);
        let mut line_top = y + height - 18.0;
        if !title.is_empty() {
            let size = 12.0;
            let text_width = title_font.text_width(title, size);
            self.current.ops.push(DrawOp::Text {
                x: x + ((width - text_width) / 2.0).max(4.0),
                y: line_top,
                font: title_font,
                size,
                color: Rgb::grey(64),
                text: title.to_string(),
            });
            line_top -= 16.0;
        }
        for caption in captions {
            if line_top < y + 4.0 {
                break;
            }
            self.current.ops.push(DrawOp::Text {
                x: x + 8.0,
                y: line_top,
                font: caption_font,
                size: 9.0,
                color: Rgb::grey(96),
                text: caption.clone(),
            });
            line_top -= 12.0;
        }
    }

    /// Column widths in points. Cells of the first row that set a width
    /// fix their column; the rest share what is left.
    fn column_widths(table: &Table, table_width: f32) -> Vec<f32> {
        let cols = table.cols.max(1);
        let mut widths: Vec<Option<f32>> = vec![None; cols];
        if let Some(first) = table.rows.first() {
            for (idx, cell) in first.cells.iter().enumerate().take(cols) {
                if !cell.covered && cell.grid_span <= 1 {
                    widths[idx] = cell.width_pct.map(|pct| table_width * pct as f32 / 100.0);
                }
            }
        }
        let fixed: f32 = widths.iter().flatten().sum();
        let free = widths.iter().filter(|w| w.is_none()).count();
        let share = if free > 0 { ((table_width - fixed) / free as f32).max(0.0) } else { 0.0 };
        widths.into_iter().map(|w| w.unwrap_or(share)).collect()
    }

    fn place_table(&mut self, table: &Table) -> Result<()> {
        let properties = &table.properties;
        let table_width = self.text_width * properties.width_pct.unwrap_or(100) as f32 / 100.0;
        let widths = Self::column_widths(table, table_width);
        let margins = properties.cell_margins;
        let (margin_top, margin_bottom) = (twips(margins.top.unwrap_or(0)), twips(margins.bottom.unwrap_or(0)));
        let margin_left = twips(margins.left.unwrap_or(DEFAULT_CELL_MARGIN));
        let margin_right = twips(margins.right.unwrap_or(DEFAULT_CELL_MARGIN));
        let border = properties
            .borders
            .filter(|border| border.style != BorderStyle::None)
            .map(|border| Stroke { color: border.color, width: border.size as f32 / 8.0 });

        for row in &table.rows {
            // measure every visible cell first so the row is placed whole
            let mut cells = Vec::with_capacity(row.cells.len());
            let mut row_height = row.height.map(twips).unwrap_or(0.0);
            for (col, cell) in row.cells.iter().enumerate() {
                if cell.covered || col >= widths.len() {
                    continue;
                }
                let span = (cell.grid_span.max(1) as usize).min(widths.len() - col);
                let x = self.left + widths[..col].iter().sum::<f32>();
                let width: f32 = widths[col..col + span].iter().sum();
                let inner = (width - margin_left - margin_right).max(1.0);
                let blocks = cell
                    .paragraphs
                    .iter()
                    .map(|paragraph| self.break_paragraph(paragraph, inner))
                    .collect::<Result<Vec<_>>>()?;
                let content: f32 = blocks.iter().map(ParagraphBlock::height).sum();
                row_height = row_height.max(content + margin_top + margin_bottom);
                cells.push((cell, x, width, blocks, content));
            }

            if self.cursor + row_height > self.bottom + EPSILON && !self.at_page_top() {
                self.new_page();
            }
            let top = self.cursor;
            let bottom_y = self.page_height - (top + row_height);
            for (cell, x, width, _, _) in &cells {
                if let Some(color) = cell.shading {
                    self.current.ops.push(DrawOp::Rect {
                        x: *x,
                        y: bottom_y,
                        width: *width,
                        height: row_height,
                        fill: Some(color),
                        stroke: None,
                    });
                }
            }
            for (cell, x, _, blocks, content) in &cells {
                let slack = row_height - margin_top - margin_bottom - content;
                let mut y = top
                    + margin_top
                    + match cell.vertical_align {
                        Some(VerticalAlign::Center) => slack / 2.0,
                        Some(VerticalAlign::Bottom) => slack,
                        _ => 0.0,
                    };
                for block in blocks {
                    y += self.emit_block(block, x + margin_left, y);
                }
            }
            if let Some(stroke) = border {
                for (_, x, width, _, _) in &cells {
                    self.current.ops.push(DrawOp::Rect {
                        x: *x,
                        y: bottom_y,
                        width: *width,
                        height: row_height,
                        fill: None,
                        stroke: Some(stroke),
                    });
                }
            }
            self.cursor += row_height;
        }
        Ok(())
    }
}
