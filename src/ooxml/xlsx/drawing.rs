/// Worksheet drawing part (`xl/drawings/drawingN.xml`) holding chart frames.
use std::fmt::Write as FmtWrite;

use crate::ooxml::error::Result;

/// Placement of one chart frame. Cell indices are zero-based; offsets and
/// size are EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChartAnchor {
    pub from_col: u32,
    pub col_offset: i64,
    pub from_row: u32,
    pub row_offset: i64,
    pub width: i64,
    pub height: i64,
}

/// Drawing XML for `charts`, each paired with the rId of its chart part in
/// the drawing's relationships.
pub(crate) fn drawing_xml(charts: &[(ChartAnchor, String)]) -> Result<String> {
    let mut xml = String::with_capacity(512 + charts.len() * 1024);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#);

    for (idx, (anchor, r_id)) in charts.iter().enumerate() {
        write!(
            xml,
            "<xdr:oneCellAnchor><xdr:from><xdr:col>{}</xdr:col><xdr:colOff>{}</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>{}</xdr:rowOff></xdr:from>",
            anchor.from_col, anchor.col_offset, anchor.from_row, anchor.row_offset
        )?;
        write!(xml, r#"<xdr:ext cx="{}" cy="{}"/>"#, anchor.width, anchor.height)?;
        write!(
            xml,
            r#"<xdr:graphicFrame macro=""><xdr:nvGraphicFramePr><xdr:cNvPr id="{}" name="Chart {}"/><xdr:cNvGraphicFramePr/></xdr:nvGraphicFramePr>"#,
            idx + 2,
            idx + 1
        )?;
        xml.push_str(r#"<xdr:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></xdr:xfrm>"#);
        write!(
            xml,
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" r:id="{}"/></a:graphicData></a:graphic>"#,
            r_id
        )?;
        xml.push_str("</xdr:graphicFrame><xdr:clientData/></xdr:oneCellAnchor>");
    }

    xml.push_str("</xdr:wsDr>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_cell_anchor() {
        let anchor = ChartAnchor {
            from_col: 3,
            col_offset: 0,
            from_row: 2,
            row_offset: 0,
            width: 4_873_680,
            height: 2_926_080,
        };
        let xml = drawing_xml(&[(anchor, "rId1".to_string())]).unwrap();
        assert!(xml.contains("<xdr:col>3</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>2</xdr:row>"));
        assert!(xml.contains(r#"<xdr:ext cx="4873680" cy="2926080"/>"#));
        assert!(xml.contains(r#"r:id="rId1""#));
    }
}
