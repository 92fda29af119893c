/// Inline drawings (pictures and charts) and the bookkeeping needed to
/// give them parts and relationship ids while the body is serialized.
use std::fmt::Write as FmtWrite;

use crate::common::ImageFormat;
use crate::common::picture;
use crate::common::xml::escape_xml;
use crate::ooxml::charts::{Chart, chart_to_bytes};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::{PackURI, Relationships};

/// Default picture extent when the image size cannot be read: one inch.
const DEFAULT_EXTENT_EMU: i64 = 914_400;

/// An inline chart anchored in a paragraph.
#[derive(Debug, Clone)]
pub struct InlineChart {
    pub(crate) chart: Chart,
    pub(crate) width_emu: i64,
    pub(crate) height_emu: i64,
}

impl InlineChart {
    pub fn new(chart: Chart, width_emu: i64, height_emu: i64) -> Self {
        Self { chart, width_emu, height_emu }
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut Chart {
        &mut self.chart
    }

    pub fn size_emu(&self) -> (i64, i64) {
        (self.width_emu, self.height_emu)
    }
}

/// An inline picture anchored in a paragraph.
#[derive(Debug, Clone)]
pub struct InlinePicture {
    pub(crate) data: Vec<u8>,
    pub(crate) format: ImageFormat,
    pub(crate) width_emu: i64,
    pub(crate) height_emu: i64,
}

impl InlinePicture {
    /// Picture from PNG/JPEG/GIF/BMP bytes. A missing size is taken from the
    /// image itself at 96 dpi.
    pub fn from_bytes(data: Vec<u8>, width_emu: Option<i64>, height_emu: Option<i64>) -> Result<Self> {
        let format = ImageFormat::detect_from_bytes(&data)
            .ok_or_else(|| OoxmlError::UnsupportedImage("unknown image format".to_string()))?;
        let natural = picture::dimensions(&data).map(|(w, h)| {
            (
                crate::common::unit::px_to_emu_96(w),
                crate::common::unit::px_to_emu_96(h),
            )
        });
        let (width_emu, height_emu) = match (width_emu, height_emu, natural) {
            (Some(w), Some(h), _) => (w, h),
            (Some(w), None, Some((nw, nh))) if nw > 0 => (w, w * nh / nw),
            (None, Some(h), Some((nw, nh))) if nh > 0 => (h * nw / nh, h),
            (None, None, Some(size)) => size,
            (w, h, _) => (
                w.unwrap_or(DEFAULT_EXTENT_EMU),
                h.unwrap_or(DEFAULT_EXTENT_EMU),
            ),
        };
        Ok(Self { data, format, width_emu, height_emu })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn size_emu(&self) -> (i64, i64) {
        (self.width_emu, self.height_emu)
    }
}

/// Parts created while serializing the document body.
#[derive(Debug)]
pub(crate) struct WriteContext {
    pub(crate) rels: Relationships,
    pub(crate) media: Vec<(PackURI, Vec<u8>)>,
    pub(crate) charts: Vec<(PackURI, Vec<u8>)>,
    next_drawing_id: u32,
    next_control_id: u32,
}

impl WriteContext {
    pub(crate) fn new(rels: Relationships) -> Self {
        Self {
            rels,
            media: Vec::new(),
            charts: Vec::new(),
            next_drawing_id: 1,
            next_control_id: 1,
        }
    }

    /// Register an image part and return its rId.
    pub(crate) fn add_image(&mut self, data: &[u8], format: ImageFormat) -> Result<String> {
        let n = self.media.len() + 1;
        let target = format!("media/image{}.{}", n, format.extension());
        let partname = PackURI::new(format!("/word/{}", target)).map_err(OoxmlError::InvalidFormat)?;
        self.media.push((partname, data.to_vec()));
        Ok(self.rels.get_or_add(relationship_type::IMAGE, &target))
    }

    /// Serialize a chart into its own part and return its rId.
    pub(crate) fn add_chart(&mut self, chart: &Chart) -> Result<String> {
        let n = self.charts.len() + 1;
        let target = format!("charts/chart{}.xml", n);
        let partname = PackURI::new(format!("/word/{}", target)).map_err(OoxmlError::InvalidFormat)?;
        self.charts.push((partname, chart_to_bytes(chart)?));
        Ok(self.rels.get_or_add(relationship_type::CHART, &target))
    }

    pub(crate) fn next_drawing_id(&mut self) -> u32 {
        let id = self.next_drawing_id;
        self.next_drawing_id += 1;
        id
    }

    pub(crate) fn next_control_id(&mut self) -> u32 {
        let id = self.next_control_id;
        self.next_control_id += 1;
        id
    }
}

pub(crate) fn write_inline_picture(
    xml: &mut String,
    r_id: &str,
    (cx, cy): (i64, i64),
    id: u32,
    name: &str,
) -> Result<()> {
    let name = escape_xml(name);
    write!(
        xml,
        r#"<w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/><wp:docPr id="{id}" name="{name}"/><wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" noChangeAspect="1"/></wp:cNvGraphicFramePr>"#
    )?;
    write!(
        xml,
        r#"<a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:nvPicPr><pic:cNvPr id="0" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="{r_id}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#
    )?;
    write!(
        xml,
        r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>"#
    )?;
    Ok(())
}

pub(crate) fn write_inline_chart(
    xml: &mut String,
    r_id: &str,
    (cx, cy): (i64, i64),
    id: u32,
) -> Result<()> {
    write!(
        xml,
        r#"<w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/><wp:docPr id="{id}" name="Chart {id}"/><wp:cNvGraphicFramePr/>"#
    )?;
    write!(
        xml,
        r#"<a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" r:id="{r_id}"/></a:graphicData></a:graphic></wp:inline></w:drawing>"#
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::picture::PLACEHOLDER_PNG;

    #[test]
    fn test_picture_size_from_image() {
        let pic = InlinePicture::from_bytes(PLACEHOLDER_PNG.to_vec(), None, None).unwrap();
        assert_eq!(pic.size_emu(), (9525, 9525));
        assert_eq!(pic.format(), ImageFormat::Png);
    }

    #[test]
    fn test_picture_rejects_unknown_bytes() {
        assert!(InlinePicture::from_bytes(b"not an image".to_vec(), None, None).is_err());
    }

    #[test]
    fn test_context_allocates_parts() {
        let mut ctx = WriteContext::new(Relationships::new("/word".to_string()));
        let r1 = ctx.add_image(PLACEHOLDER_PNG, ImageFormat::Png).unwrap();
        let r2 = ctx.add_chart(&Chart::new(crate::ooxml::charts::ChartKind::Bar)).unwrap();
        assert_ne!(r1, r2);
        assert_eq!(ctx.media[0].0.as_str(), "/word/media/image1.png");
        assert_eq!(ctx.charts[0].0.as_str(), "/word/charts/chart1.xml");
        assert_eq!(ctx.next_drawing_id(), 1);
        assert_eq!(ctx.next_drawing_id(), 2);
    }
}
