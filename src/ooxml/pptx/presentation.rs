//! The presentation object and its package serialization.
use std::fmt::Write as FmtWrite;
use std::path::Path;

use log::debug;

use crate::ooxml::docprops::add_doc_props;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::{OpcPackage, PackURI, Relationships};

use super::slide::{Slide, SlideWriteContext};
use super::template::{BLANK_LAYOUT_XML, ColorScheme, SLIDE_MASTER_XML, theme_xml};

/// 10 x 7.5 inches.
pub const DEFAULT_SLIDE_WIDTH: i64 = 9_144_000;
pub const DEFAULT_SLIDE_HEIGHT: i64 = 6_858_000;
/// 13.333 x 7.5 inches.
pub const WIDESCREEN_SLIDE_WIDTH: i64 = 12_192_000;

const PRESENTATION_PARTNAME: &str = "/ppt/presentation.xml";
const FIRST_SLIDE_ID: usize = 256;

fn partname(uri: &str) -> Result<PackURI> {
    PackURI::new(uri).map_err(OoxmlError::InvalidFormat)
}

#[derive(Debug, Clone)]
pub struct Presentation {
    slides: Vec<Slide>,
    slide_width: i64,
    slide_height: i64,
    color_scheme: ColorScheme,
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new()
    }
}

impl Presentation {
    /// A 4:3 presentation holding one blank slide.
    pub fn new() -> Self {
        Self {
            slides: vec![Slide::new()],
            slide_width: DEFAULT_SLIDE_WIDTH,
            slide_height: DEFAULT_SLIDE_HEIGHT,
            color_scheme: ColorScheme::default(),
        }
    }

    pub fn slide_size(&self) -> (i64, i64) {
        (self.slide_width, self.slide_height)
    }

    pub fn set_slide_size(&mut self, width: i64, height: i64) -> &mut Self {
        self.slide_width = width;
        self.slide_height = height;
        self
    }

    pub fn color_scheme(&self) -> &ColorScheme {
        &self.color_scheme
    }

    pub fn color_scheme_mut(&mut self) -> &mut ColorScheme {
        &mut self.color_scheme
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn add_slide(&mut self) -> &mut Slide {
        self.slides.push(Slide::new());
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    pub fn slide(&self, index: usize) -> Result<&Slide> {
        self.slides.get(index).ok_or(OoxmlError::IndexOutOfRange {
            what: "slide",
            index,
            len: self.slides.len(),
        })
    }

    pub fn slide_mut(&mut self, index: usize) -> Result<&mut Slide> {
        let len = self.slides.len();
        self.slides
            .get_mut(index)
            .ok_or(OoxmlError::IndexOutOfRange { what: "slide", index, len })
    }

    pub fn remove_slide(&mut self, index: usize) -> Result<Slide> {
        if index >= self.slides.len() {
            return Err(OoxmlError::IndexOutOfRange {
                what: "slide",
                index,
                len: self.slides.len(),
            });
        }
        Ok(self.slides.remove(index))
    }

    fn presentation_xml(&self, slide_rel_ids: &[String]) -> Result<String> {
        let mut xml = String::with_capacity(1024 + slide_rel_ids.len() * 48);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" saveSubsetFonts="1">"#);
        xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
        if !slide_rel_ids.is_empty() {
            xml.push_str("<p:sldIdLst>");
            for (idx, r_id) in slide_rel_ids.iter().enumerate() {
                write!(xml, r#"<p:sldId id="{}" r:id="{}"/>"#, FIRST_SLIDE_ID + idx, r_id)?;
            }
            xml.push_str("</p:sldIdLst>");
        }
        write!(
            xml,
            r#"<p:sldSz cx="{}" cy="{}"/>"#,
            self.slide_width, self.slide_height
        )?;
        xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
        xml.push_str(r#"<p:defaultTextStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr></p:defaultTextStyle>"#);
        xml.push_str("</p:presentation>");
        Ok(xml)
    }

    pub fn to_package(&self) -> Result<OpcPackage> {
        let presentation_uri = partname(PRESENTATION_PARTNAME)?;
        let mut package = OpcPackage::new();
        package
            .rels_mut()
            .get_or_add(rt::OFFICE_DOCUMENT, presentation_uri.membername());

        let mut rels = Relationships::new(presentation_uri.base_uri().to_string());
        rels.get_or_add(rt::SLIDE_MASTER, "slideMasters/slideMaster1.xml");
        rels.get_or_add(rt::THEME, "theme/theme1.xml");

        let mut ctx = SlideWriteContext::new();
        let mut slide_parts = Vec::with_capacity(self.slides.len());
        let mut slide_rel_ids = Vec::with_capacity(self.slides.len());
        for (idx, slide) in self.slides.iter().enumerate() {
            let number = idx + 1;
            ctx.rels.get_or_add(rt::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
            let xml = slide.to_xml(&mut ctx)?;
            slide_parts.push((number, xml, ctx.take_rels()));
            slide_rel_ids.push(rels.get_or_add(rt::SLIDE, &format!("slides/slide{}.xml", number)));
        }

        let body = self.presentation_xml(&slide_rel_ids)?;
        let part = package.add_part(presentation_uri, ct::PML_PRESENTATION_MAIN, body.into_bytes())?;
        *part.rels_mut() = rels;

        let master = package.add_part(
            partname("/ppt/slideMasters/slideMaster1.xml")?,
            ct::PML_SLIDE_MASTER,
            SLIDE_MASTER_XML.as_bytes().to_vec(),
        )?;
        master
            .rels_mut()
            .get_or_add(rt::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
        master.rels_mut().get_or_add(rt::THEME, "../theme/theme1.xml");

        let layout = package.add_part(
            partname("/ppt/slideLayouts/slideLayout1.xml")?,
            ct::PML_SLIDE_LAYOUT,
            BLANK_LAYOUT_XML.as_bytes().to_vec(),
        )?;
        layout
            .rels_mut()
            .get_or_add(rt::SLIDE_MASTER, "../slideMasters/slideMaster1.xml");

        package.add_part(
            partname("/ppt/theme/theme1.xml")?,
            ct::OFC_THEME,
            theme_xml(&self.color_scheme)?.into_bytes(),
        )?;

        for (number, xml, slide_rels) in slide_parts {
            let part = package.add_part(
                partname(&format!("/ppt/slides/slide{}.xml", number))?,
                ct::PML_SLIDE,
                xml.into_bytes(),
            )?;
            *part.rels_mut() = slide_rels;
        }

        let SlideWriteContext { media, charts, .. } = ctx;
        let media_count = media.len();
        let chart_count = charts.len();
        for (uri, blob) in media {
            let content_type = match uri.ext() {
                "png" => ct::PNG,
                "gif" => ct::GIF,
                "bmp" => ct::BMP,
                _ => ct::JPEG,
            };
            package.add_part(uri, content_type, blob)?;
        }
        for (uri, blob) in charts {
            package.add_part(uri, ct::DML_CHART, blob)?;
        }

        add_doc_props(&mut package, None)?;
        debug!(
            "pptx package assembled: {} slides, {} pictures, {} charts",
            self.slides.len(),
            media_count,
            chart_count
        );
        Ok(package)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.to_package()?.to_bytes()?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_package()?.save(path)?;
        Ok(())
    }
}
