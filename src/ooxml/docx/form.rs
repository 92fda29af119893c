/// Fillable form fields, stored as inline content controls (`w:sdt`).
///
/// The form key is written as both the tag and the alias of the control, which
/// is how [`FormFiller`](super::FormFiller) finds a field again after the
/// document has been saved. Field settings go into `w:formPr` and
/// `w:textFormPr`/`w:pictureFormPr` inside the control properties.
use std::fmt::Write as FmtWrite;

use crate::common::Rgb;
use crate::common::unit::TWIPS_PER_INCH;
use crate::common::picture::PLACEHOLDER_PNG;
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};

use super::drawing::{InlinePicture, WriteContext, write_inline_picture};
use super::run::{RunContent, RunProperties, write_content};

/// Default picture form extent, 1.5 inch square.
const PICTURE_FORM_EXTENT_EMU: i64 = 1_371_600;

const MM_PER_INCH: f64 = 25.4;

/// A single-line text field.
#[derive(Debug, Clone, Default)]
pub struct TextForm {
    pub key: String,
    pub tip: String,
    pub placeholder: String,
    pub required: bool,
    /// Characters are laid out in equal-width cells.
    pub comb: bool,
    pub max_characters: Option<u32>,
    /// Width of one comb cell in millimetres
    pub cell_width: Option<u32>,
    pub multiline: bool,
    pub auto_fit: bool,
    /// The field keeps its size regardless of content.
    pub fixed_size: bool,
    pub border_color: Option<Rgb>,
    pub(crate) value: Option<String>,
    pub(crate) properties: RunProperties,
}

impl TextForm {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn set_tip(&mut self, tip: impl Into<String>) -> &mut Self {
        self.tip = tip.into();
        self
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) -> &mut Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn set_required(&mut self, required: bool) -> &mut Self {
        self.required = required;
        self
    }

    pub fn set_comb(&mut self, comb: bool) -> &mut Self {
        self.comb = comb;
        self
    }

    pub fn set_max_characters(&mut self, limit: u32) -> &mut Self {
        self.max_characters = Some(limit);
        self
    }

    pub fn set_cell_width(&mut self, width: u32) -> &mut Self {
        self.cell_width = Some(width);
        self
    }

    pub fn set_multiline(&mut self, multiline: bool) -> &mut Self {
        self.multiline = multiline;
        self
    }

    pub fn set_auto_fit(&mut self, auto_fit: bool) -> &mut Self {
        self.auto_fit = auto_fit;
        self
    }

    pub fn set_fixed_size(&mut self, fixed: bool) -> &mut Self {
        self.fixed_size = fixed;
        self
    }

    pub fn set_border_color(&mut self, color: Rgb) -> &mut Self {
        self.border_color = Some(color);
        self.properties.border = Some(color);
        self
    }

    /// Fill the field. Text past the character limit is dropped.
    pub fn set_value(&mut self, value: &str) -> &mut Self {
        let value = match self.max_characters {
            Some(limit) => value.chars().take(limit as usize).collect(),
            None => value.to_string(),
        };
        self.value = Some(value);
        self
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Value when filled, placeholder otherwise.
    pub fn display_text(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.placeholder)
    }

    pub fn properties(&self) -> &RunProperties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut RunProperties {
        &mut self.properties
    }

    /// Comb cell width in twips.
    fn cell_width_twips(&self) -> Option<u32> {
        self.cell_width
            .map(|mm| (f64::from(mm) * TWIPS_PER_INCH as f64 / MM_PER_INCH).round() as u32)
    }

    fn write_text_properties(&self, xml: &mut String) -> Result<()> {
        write!(
            xml,
            r#"<w:textFormPr w:multiLine="{}" w:autoFit="{}">"#,
            flag(self.multiline),
            flag(self.auto_fit)
        )?;
        if self.comb {
            xml.push_str("<w:comb");
            if let Some(width) = self.cell_width_twips() {
                write!(xml, r#" w:width="{}" w:wRule="atLeast""#, width)?;
            }
            xml.push_str("/>");
        }
        if let Some(limit) = self.max_characters {
            write!(xml, r#"<w:maxCharacters w:val="{}"/>"#, limit)?;
        }
        xml.push_str("</w:textFormPr>");
        Ok(())
    }

    pub(crate) fn to_xml(&self, xml: &mut String, ctx: &mut WriteContext) -> Result<()> {
        let showing_placeholder = self.value.is_none();
        write_control_start(xml, &self.key, ctx.next_control_id(), &self.properties, showing_placeholder)?;
        write_form_properties(xml, &self.key, &self.tip, self.required, self.fixed_size)?;
        self.write_text_properties(xml)?;
        xml.push_str("<w:text/></w:sdtPr><w:sdtContent><w:r>");
        self.properties.to_xml(xml)?;
        let mut content = Vec::with_capacity(1);
        let text = self.display_text();
        if !text.is_empty() {
            content.push(RunContent::Text(text.to_string()));
        }
        write_content(xml, &content)?;
        xml.push_str("</w:r></w:sdtContent></w:sdt>");
        Ok(())
    }
}

/// How a picture is scaled into its form frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleFlag {
    #[default]
    Always,
    Never,
    TooBig,
    TooSmall,
}

impl ScaleFlag {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            "tooBig" => Ok(Self::TooBig),
            "tooSmall" => Ok(Self::TooSmall),
            other => Err(OoxmlError::InvalidFormat(format!("unknown scale flag '{}'", other))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Never => "never",
            Self::TooBig => "tooBig",
            Self::TooSmall => "tooSmall",
        }
    }
}

/// A picture field.
#[derive(Debug, Clone)]
pub struct PictureForm {
    pub key: String,
    pub tip: String,
    pub placeholder: String,
    pub required: bool,
    pub scale: ScaleFlag,
    pub lock_aspect_ratio: bool,
    pub respect_borders: bool,
    /// Picture position inside the frame, in percent (50, 50 is centered)
    pub shift: (u32, u32),
    pub(crate) width_emu: i64,
    pub(crate) height_emu: i64,
    pub(crate) image: Option<InlinePicture>,
}

impl PictureForm {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            tip: String::new(),
            placeholder: String::new(),
            required: false,
            scale: ScaleFlag::default(),
            lock_aspect_ratio: true,
            respect_borders: false,
            shift: (50, 50),
            width_emu: PICTURE_FORM_EXTENT_EMU,
            height_emu: PICTURE_FORM_EXTENT_EMU,
            image: None,
        }
    }

    pub fn set_tip(&mut self, tip: impl Into<String>) -> &mut Self {
        self.tip = tip.into();
        self
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) -> &mut Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn set_required(&mut self, required: bool) -> &mut Self {
        self.required = required;
        self
    }

    pub fn set_scale(&mut self, scale: ScaleFlag) -> &mut Self {
        self.scale = scale;
        self
    }

    pub fn set_lock_aspect_ratio(&mut self, lock: bool) -> &mut Self {
        self.lock_aspect_ratio = lock;
        self
    }

    pub fn set_respect_borders(&mut self, respect: bool) -> &mut Self {
        self.respect_borders = respect;
        self
    }

    pub fn set_picture_position(&mut self, shift_x: u32, shift_y: u32) -> &mut Self {
        self.shift = (shift_x.min(100), shift_y.min(100));
        self
    }

    pub fn set_size(&mut self, width_emu: i64, height_emu: i64) -> &mut Self {
        self.width_emu = width_emu;
        self.height_emu = height_emu;
        self
    }

    pub fn size_emu(&self) -> (i64, i64) {
        (self.width_emu, self.height_emu)
    }

    /// Put an image into the frame.
    pub fn set_image(&mut self, data: Vec<u8>) -> Result<&mut Self> {
        let picture = InlinePicture::from_bytes(data, Some(self.width_emu), Some(self.height_emu))?;
        self.image = Some(picture);
        Ok(self)
    }

    pub fn image(&self) -> Option<&InlinePicture> {
        self.image.as_ref()
    }

    pub(crate) fn to_xml(&self, xml: &mut String, ctx: &mut WriteContext) -> Result<()> {
        let showing_placeholder = self.image.is_none();
        write_control_start(xml, &self.key, ctx.next_control_id(), &RunProperties::default(), showing_placeholder)?;
        write_form_properties(xml, &self.key, &self.tip, self.required, false)?;
        write!(
            xml,
            r#"<w:pictureFormPr w:scaleFlag="{}" w:lockProportions="{}" w:respectBorders="{}" w:shiftX="{}" w:shiftY="{}"/>"#,
            self.scale.name(),
            flag(self.lock_aspect_ratio),
            flag(self.respect_borders),
            f64::from(self.shift.0) / 100.0,
            f64::from(self.shift.1) / 100.0
        )?;
        xml.push_str("<w:picture/></w:sdtPr><w:sdtContent><w:r>");
        let r_id = match self.image {
            Some(ref picture) => ctx.add_image(picture.data(), picture.format())?,
            None => ctx.add_image(PLACEHOLDER_PNG, crate::common::ImageFormat::Png)?,
        };
        let id = ctx.next_drawing_id();
        let name = if self.placeholder.is_empty() { &self.key } else { &self.placeholder };
        write_inline_picture(xml, &r_id, self.size_emu(), id, name)?;
        xml.push_str("</w:r></w:sdtContent></w:sdt>");
        Ok(())
    }
}

/// A form field placed in a paragraph.
#[derive(Debug, Clone)]
pub enum ContentControl {
    Text(TextForm),
    Picture(PictureForm),
}

impl ContentControl {
    pub fn key(&self) -> &str {
        match self {
            Self::Text(form) => &form.key,
            Self::Picture(form) => &form.key,
        }
    }
}

impl From<TextForm> for ContentControl {
    fn from(form: TextForm) -> Self {
        Self::Text(form)
    }
}

impl From<PictureForm> for ContentControl {
    fn from(form: PictureForm) -> Self {
        Self::Picture(form)
    }
}

fn write_control_start(
    xml: &mut String,
    key: &str,
    id: u32,
    properties: &RunProperties,
    showing_placeholder: bool,
) -> Result<()> {
    let key = escape_xml(key);
    xml.push_str("<w:sdt><w:sdtPr>");
    properties.to_xml(xml)?;
    write!(xml, r#"<w:alias w:val="{0}"/><w:tag w:val="{0}"/><w:id w:val="{1}"/>"#, key, id)?;
    if showing_placeholder {
        xml.push_str("<w:showingPlcHdr/>");
    }
    Ok(())
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

fn write_form_properties(xml: &mut String, key: &str, tip: &str, required: bool, fixed: bool) -> Result<()> {
    write!(
        xml,
        r#"<w:formPr w:key="{}" w:helpText="{}" w:required="{}""#,
        escape_xml(key),
        escape_xml(tip),
        flag(required)
    )?;
    if fixed {
        xml.push_str(r#" w:fixed="1""#);
    }
    xml.push_str("/>");
    Ok(())
}
