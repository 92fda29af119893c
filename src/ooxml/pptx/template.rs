//! Fixed parts every new presentation carries: one slide master, one blank
//! layout and the theme.
use std::fmt::Write as FmtWrite;

use crate::common::Rgb;
use crate::ooxml::error::{OoxmlError, Result};

/// Slide master with an empty shape tree and plain text styles. Its only
/// layout is `rId1`.
pub(crate) const SLIDE_MASTER_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
    r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld>"#,
    r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
    r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
    r#"<p:txStyles>"#,
    r#"<p:titleStyle><a:lvl1pPr algn="l" defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1"><a:lnSpc><a:spcPct val="90000"/></a:lnSpc><a:spcBef><a:spcPct val="0"/></a:spcBef><a:buNone/><a:defRPr sz="4400" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/><a:ea typeface="+mj-ea"/><a:cs typeface="+mj-cs"/></a:defRPr></a:lvl1pPr></p:titleStyle>"#,
    r#"<p:bodyStyle><a:lvl1pPr marL="0" indent="0" algn="l" defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1"><a:lnSpc><a:spcPct val="90000"/></a:lnSpc><a:spcBef><a:spcPts val="1000"/></a:spcBef><a:buNone/><a:defRPr sz="2800" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/></a:defRPr></a:lvl1pPr></p:bodyStyle>"#,
    r#"<p:otherStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr><a:lvl1pPr marL="0" algn="l" defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1"><a:defRPr sz="1800" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/></a:defRPr></a:lvl1pPr></p:otherStyle>"#,
    r#"</p:txStyles></p:sldMaster>"#
);

/// The blank layout. Its relationship `rId1` points back at the master.
pub(crate) const BLANK_LAYOUT_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1">"#,
    r#"<p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld>"#,
    r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
);

const FONT_SCHEME_XML: &str = concat!(
    r#"<a:fontScheme name="Office">"#,
    r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
    r#"</a:fontScheme>"#
);

const FORMAT_SCHEME_XML: &str = concat!(
    r#"<a:fmtScheme name="Office">"#,
    r#"<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="50000"/></a:schemeClr></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="80000"/></a:schemeClr></a:solidFill></a:fillStyleLst>"#,
    r#"<a:lnStyleLst><a:ln w="6350" cap="flat" cmpd="sng" algn="ctr"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/><a:miter lim="800000"/></a:ln>"#,
    r#"<a:ln w="12700" cap="flat" cmpd="sng" algn="ctr"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/><a:miter lim="800000"/></a:ln>"#,
    r#"<a:ln w="19050" cap="flat" cmpd="sng" algn="ctr"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/><a:miter lim="800000"/></a:ln></a:lnStyleLst>"#,
    r#"<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="95000"/></a:schemeClr></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="90000"/></a:schemeClr></a:solidFill></a:bgFillStyleLst>"#,
    r#"</a:fmtScheme>"#
);

/// Slot in the theme color scheme.
///
/// Indices follow the builder API's color scheme positions: the six accents
/// first, then the background, text and hyperlink colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeColor {
    Accent1,
    Accent2,
    Accent3,
    Accent4,
    Accent5,
    Accent6,
    Light1,
    Light2,
    Dark1,
    Dark2,
    Hyperlink,
    FollowedHyperlink,
}

impl SchemeColor {
    pub const ALL: [SchemeColor; 12] = [
        SchemeColor::Accent1,
        SchemeColor::Accent2,
        SchemeColor::Accent3,
        SchemeColor::Accent4,
        SchemeColor::Accent5,
        SchemeColor::Accent6,
        SchemeColor::Light1,
        SchemeColor::Light2,
        SchemeColor::Dark1,
        SchemeColor::Dark2,
        SchemeColor::Hyperlink,
        SchemeColor::FollowedHyperlink,
    ];

    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(OoxmlError::IndexOutOfRange {
                what: "scheme color",
                index,
                len: Self::ALL.len(),
            })
    }

    fn tag(self) -> &'static str {
        match self {
            SchemeColor::Accent1 => "accent1",
            SchemeColor::Accent2 => "accent2",
            SchemeColor::Accent3 => "accent3",
            SchemeColor::Accent4 => "accent4",
            SchemeColor::Accent5 => "accent5",
            SchemeColor::Accent6 => "accent6",
            SchemeColor::Light1 => "lt1",
            SchemeColor::Light2 => "lt2",
            SchemeColor::Dark1 => "dk1",
            SchemeColor::Dark2 => "dk2",
            SchemeColor::Hyperlink => "hlink",
            SchemeColor::FollowedHyperlink => "folHlink",
        }
    }
}

/// The twelve theme colors, in [`SchemeColor::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    colors: [Rgb; 12],
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            colors: [
                Rgb::new(0x44, 0x72, 0xC4),
                Rgb::new(0xED, 0x7D, 0x31),
                Rgb::new(0xA5, 0xA5, 0xA5),
                Rgb::new(0xFF, 0xC0, 0x00),
                Rgb::new(0x5B, 0x9B, 0xD5),
                Rgb::new(0x70, 0xAD, 0x47),
                Rgb::WHITE,
                Rgb::new(0xE7, 0xE6, 0xE6),
                Rgb::BLACK,
                Rgb::new(0x44, 0x54, 0x6A),
                Rgb::new(0x05, 0x63, 0xC1),
                Rgb::new(0x95, 0x4F, 0x72),
            ],
        }
    }
}

impl ColorScheme {
    pub fn color(&self, slot: SchemeColor) -> Rgb {
        self.colors[slot as usize]
    }

    pub fn change_color(&mut self, slot: SchemeColor, color: Rgb) -> &mut Self {
        self.colors[slot as usize] = color;
        self
    }
}

/// Theme part for `scheme`. The `a:clrScheme` children are written in the
/// order the schema requires, which differs from the slot order.
pub(crate) fn theme_xml(scheme: &ColorScheme) -> Result<String> {
    const SCHEMA_ORDER: [SchemeColor; 12] = [
        SchemeColor::Dark1,
        SchemeColor::Light1,
        SchemeColor::Dark2,
        SchemeColor::Light2,
        SchemeColor::Accent1,
        SchemeColor::Accent2,
        SchemeColor::Accent3,
        SchemeColor::Accent4,
        SchemeColor::Accent5,
        SchemeColor::Accent6,
        SchemeColor::Hyperlink,
        SchemeColor::FollowedHyperlink,
    ];

    let mut xml = String::with_capacity(4096);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">"#);
    xml.push_str(r#"<a:themeElements><a:clrScheme name="Office">"#);
    for slot in SCHEMA_ORDER {
        write!(
            xml,
            r#"<a:{tag}><a:srgbClr val="{}"/></a:{tag}>"#,
            scheme.color(slot).to_hex(),
            tag = slot.tag()
        )?;
    }
    xml.push_str("</a:clrScheme>");
    xml.push_str(FONT_SCHEME_XML);
    xml.push_str(FORMAT_SCHEME_XML);
    xml.push_str("</a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_positions() {
        assert_eq!(SchemeColor::from_index(0).unwrap(), SchemeColor::Accent1);
        assert_eq!(SchemeColor::from_index(11).unwrap(), SchemeColor::FollowedHyperlink);
        assert!(SchemeColor::from_index(12).is_err());
    }

    #[test]
    fn test_theme_writes_changed_accent_in_schema_order() {
        let mut scheme = ColorScheme::default();
        scheme.change_color(SchemeColor::Accent1, Rgb::new(15, 102, 7));
        let xml = theme_xml(&scheme).unwrap();

        assert!(xml.contains(r#"<a:accent1><a:srgbClr val="0F6607"/></a:accent1>"#));
        let dk1 = xml.find("<a:dk1>").unwrap();
        let accent1 = xml.find("<a:accent1>").unwrap();
        let fol = xml.find("<a:folHlink>").unwrap();
        assert!(dk1 < accent1 && accent1 < fol);
        assert_eq!(xml.matches("<a:effectStyle>").count(), 3);
    }

    #[test]
    fn test_master_and_layout_reference_each_other() {
        assert!(SLIDE_MASTER_XML.contains(r#"<p:sldLayoutId id="2147483649" r:id="rId1"/>"#));
        assert!(BLANK_LAYOUT_XML.contains(r#"type="blank""#));
    }
}
