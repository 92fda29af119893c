/// Slides and the objects placed on them.
use std::fmt::Write as FmtWrite;

use crate::common::Rgb;
use crate::common::picture::ImageFormat;
use crate::ooxml::charts::{Chart, chart_to_bytes};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::{PackURI, Relationships};

use super::shape::{Frame, Shape};

/// Fill behind everything else on the slide.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideBackground {
    Color(Rgb),
    /// Picture stretched over the whole slide.
    Image { data: Vec<u8>, format: ImageFormat },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub(crate) frame: Frame,
    data: Vec<u8>,
    format: ImageFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub(crate) frame: Frame,
    chart: Chart,
}

impl ChartFrame {
    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut Chart {
        &mut self.chart
    }
}

/// Object on a slide, in drawing order.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideObject {
    Shape(Shape),
    Picture(Picture),
    Chart(ChartFrame),
}

impl SlideObject {
    pub fn frame(&self) -> Frame {
        match self {
            SlideObject::Shape(shape) => shape.frame,
            SlideObject::Picture(picture) => picture.frame,
            SlideObject::Chart(chart) => chart.frame,
        }
    }
}

/// Collects the parts referenced from slides while they are serialized.
/// Media and chart part numbers are shared across all slides.
pub(crate) struct SlideWriteContext {
    pub(crate) rels: Relationships,
    pub(crate) media: Vec<(PackURI, Vec<u8>)>,
    pub(crate) charts: Vec<(PackURI, Vec<u8>)>,
}

impl SlideWriteContext {
    pub(crate) const SLIDES_BASE: &'static str = "/ppt/slides";

    pub(crate) fn new() -> Self {
        Self {
            rels: Relationships::new(Self::SLIDES_BASE.to_string()),
            media: Vec::new(),
            charts: Vec::new(),
        }
    }

    /// Hand back the relationships gathered for the current slide and start
    /// a fresh set for the next one.
    pub(crate) fn take_rels(&mut self) -> Relationships {
        std::mem::replace(&mut self.rels, Relationships::new(Self::SLIDES_BASE.to_string()))
    }

    fn add_image(&mut self, data: &[u8], format: ImageFormat) -> Result<String> {
        let partname = PackURI::new(format!(
            "/ppt/media/image{}.{}",
            self.media.len() + 1,
            format.extension()
        ))
        .map_err(OoxmlError::InvalidFormat)?;
        let target = partname.relative_ref(Self::SLIDES_BASE);
        self.media.push((partname, data.to_vec()));
        Ok(self.rels.get_or_add(rt::IMAGE, &target))
    }

    fn add_chart(&mut self, chart: &Chart) -> Result<String> {
        let partname = PackURI::new(format!("/ppt/charts/chart{}.xml", self.charts.len() + 1))
            .map_err(OoxmlError::InvalidFormat)?;
        let target = partname.relative_ref(Self::SLIDES_BASE);
        self.charts.push((partname, chart_to_bytes(chart)?));
        Ok(self.rels.get_or_add(rt::CHART, &target))
    }
}

fn detect_image(data: &[u8]) -> Result<ImageFormat> {
    ImageFormat::detect_from_bytes(data).ok_or_else(|| {
        OoxmlError::UnsupportedImage(format!("unrecognized picture data ({} bytes)", data.len()))
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slide {
    background: Option<SlideBackground>,
    objects: Vec<SlideObject>,
}

impl Slide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn background(&self) -> Option<&SlideBackground> {
        self.background.as_ref()
    }

    pub fn set_background_color(&mut self, color: Rgb) -> &mut Self {
        self.background = Some(SlideBackground::Color(color));
        self
    }

    /// Stretch a PNG, JPEG, GIF or BMP picture over the slide.
    pub fn set_background_image(&mut self, data: Vec<u8>) -> Result<&mut Self> {
        let format = detect_image(&data)?;
        self.background = Some(SlideBackground::Image { data, format });
        Ok(self)
    }

    pub fn objects(&self) -> &[SlideObject] {
        &self.objects
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.objects.iter().filter_map(|object| match object {
            SlideObject::Shape(shape) => Some(shape),
            _ => None,
        })
    }

    /// Add an empty rectangle text shape and return it for filling.
    pub fn add_text_shape(&mut self, x: i64, y: i64, width: i64, height: i64) -> &mut Shape {
        self.add_shape(Shape::new(Frame::new(x, y, width, height)))
    }

    pub fn add_shape(&mut self, shape: Shape) -> &mut Shape {
        self.objects.push(SlideObject::Shape(shape));
        match self.objects.last_mut() {
            Some(SlideObject::Shape(shape)) => shape,
            _ => unreachable!("a shape was just pushed"),
        }
    }

    pub fn add_image(&mut self, data: Vec<u8>, x: i64, y: i64, width: i64, height: i64) -> Result<()> {
        let format = detect_image(&data)?;
        self.objects.push(SlideObject::Picture(Picture {
            frame: Frame::new(x, y, width, height),
            data,
            format,
        }));
        Ok(())
    }

    pub fn add_chart(&mut self, chart: Chart, x: i64, y: i64, width: i64, height: i64) -> &mut ChartFrame {
        self.objects.push(SlideObject::Chart(ChartFrame {
            frame: Frame::new(x, y, width, height),
            chart,
        }));
        match self.objects.last_mut() {
            Some(SlideObject::Chart(frame)) => frame,
            _ => unreachable!("a chart was just pushed"),
        }
    }

    /// Drop every object on the slide. The background stays.
    pub fn remove_all_objects(&mut self) -> &mut Self {
        self.objects.clear();
        self
    }

    /// Serialize `ppt/slides/slideN.xml`. The layout relationship must already
    /// be registered in `ctx` as `rId1`.
    pub(crate) fn to_xml(&self, ctx: &mut SlideWriteContext) -> Result<String> {
        let mut xml = String::with_capacity(2048 + self.objects.len() * 1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#);
        xml.push_str("<p:cSld>");

        // the background precedes the shape tree
        match &self.background {
            Some(SlideBackground::Color(color)) => {
                write!(
                    xml,
                    r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
                    color.to_hex()
                )?;
            },
            Some(SlideBackground::Image { data, format }) => {
                let r_id = ctx.add_image(data, *format)?;
                write!(
                    xml,
                    r#"<p:bg><p:bgPr><a:blipFill dpi="0" rotWithShape="1"><a:blip r:embed="{}"/><a:srcRect/><a:stretch><a:fillRect/></a:stretch></a:blipFill><a:effectLst/></p:bgPr></p:bg>"#,
                    r_id
                )?;
            },
            None => {},
        }

        xml.push_str("<p:spTree>");
        xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
        xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);

        // id 1 is the group shape
        for (idx, object) in self.objects.iter().enumerate() {
            let shape_id = idx as u32 + 2;
            match object {
                SlideObject::Shape(shape) => shape.to_xml(&mut xml, shape_id)?,
                SlideObject::Picture(picture) => {
                    let r_id = ctx.add_image(&picture.data, picture.format)?;
                    write!(
                        xml,
                        r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture {}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
                        shape_id,
                        shape_id - 1
                    )?;
                    write!(
                        xml,
                        r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>"#,
                        r_id
                    )?;
                    picture.frame.write_xfrm(&mut xml, "a:xfrm")?;
                    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
                },
                SlideObject::Chart(frame) => {
                    let r_id = ctx.add_chart(&frame.chart)?;
                    write!(
                        xml,
                        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="Chart {}"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr>"#,
                        shape_id,
                        shape_id - 1
                    )?;
                    frame.frame.write_xfrm(&mut xml, "p:xfrm")?;
                    write!(
                        xml,
                        r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" r:id="{}"/></a:graphicData></a:graphic></p:graphicFrame>"#,
                        r_id
                    )?;
                },
            }
        }

        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::picture::PLACEHOLDER_PNG;
    use crate::ooxml::charts::ChartKind;

    fn render(slide: &Slide) -> (String, SlideWriteContext) {
        let mut ctx = SlideWriteContext::new();
        ctx.rels.get_or_add(rt::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
        let xml = slide.to_xml(&mut ctx).unwrap();
        (xml, ctx)
    }

    #[test]
    fn test_background_image_comes_before_shape_tree() {
        let mut slide = Slide::new();
        slide.set_background_image(PLACEHOLDER_PNG.to_vec()).unwrap();
        slide.add_text_shape(0, 0, 100, 100);
        let (xml, ctx) = render(&slide);

        assert!(xml.contains(r#"<a:blip r:embed="rId2"/><a:srcRect/><a:stretch>"#));
        assert!(xml.find("<p:bg>").unwrap() < xml.find("<p:spTree>").unwrap());
        assert_eq!(ctx.media[0].0.as_str(), "/ppt/media/image1.png");
    }

    #[test]
    fn test_chart_frame_and_ids() {
        let mut slide = Slide::new();
        slide.set_background_color(Rgb::new(255, 244, 240));
        slide.add_text_shape(0, 0, 10, 10);
        let chart = Chart::from_arrays(ChartKind::LineStacked, &["Price"], vec![vec![1.0, 2.0]], &["A", "B"]).unwrap();
        slide.add_chart(chart, 720_000, 1_800_000, 6_480_000, 3_600_000);
        let (xml, ctx) = render(&slide);

        assert!(xml.contains(r#"<a:srgbClr val="FFF4F0"/>"#));
        assert!(xml.contains(r#"<p:cNvPr id="3" name="Chart 2"/>"#));
        assert!(xml.contains(r#"<p:xfrm><a:off x="720000" y="1800000"/><a:ext cx="6480000" cy="3600000"/></p:xfrm>"#));
        assert!(xml.contains(r#"r:id="rId2"/>"#));
        assert_eq!(ctx.charts[0].0.as_str(), "/ppt/charts/chart1.xml");
    }

    #[test]
    fn test_unknown_picture_bytes_are_rejected() {
        let mut slide = Slide::new();
        assert!(slide.add_image(b"not a picture".to_vec(), 0, 0, 1, 1).is_err());
        assert!(slide.set_background_image(Vec::new()).is_err());
        assert!(slide.objects().is_empty());
    }

    #[test]
    fn test_remove_all_objects_keeps_background() {
        let mut slide = Slide::new();
        slide.set_background_color(Rgb::WHITE);
        slide.add_text_shape(0, 0, 1, 1);
        slide.remove_all_objects();
        assert!(slide.objects().is_empty());
        assert!(slide.background().is_some());
    }
}
