/// Workbooks: the sheet collection and its serialization into `.xlsx`.
use std::fmt::Write as FmtWrite;
use std::path::Path;

use log::debug;

use crate::common::xml::escape_xml;
use crate::ooxml::charts::chart_to_bytes;
use crate::ooxml::docprops::add_doc_props;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::{OpcPackage, PackURI, Relationships};

use super::comments::{comments_xml, vml_drawing_xml};
use super::drawing::drawing_xml;
use super::sheet::Worksheet;
use super::strings::SharedStrings;
use super::styles::StylesBuilder;

const WORKBOOK_PARTNAME: &str = "/xl/workbook.xml";

/// Selects a sheet by zero-based position or by name.
pub trait SheetSelector {
    fn position(&self, sheets: &[Worksheet]) -> Option<usize>;

    fn describe(&self) -> String;
}

impl SheetSelector for usize {
    fn position(&self, sheets: &[Worksheet]) -> Option<usize> {
        (*self < sheets.len()).then_some(*self)
    }

    fn describe(&self) -> String {
        format!("worksheet #{}", self)
    }
}

impl SheetSelector for &str {
    fn position(&self, sheets: &[Worksheet]) -> Option<usize> {
        sheets.iter().position(|s| s.name() == *self)
    }

    fn describe(&self) -> String {
        format!("worksheet '{}'", self)
    }
}

impl SheetSelector for String {
    fn position(&self, sheets: &[Worksheet]) -> Option<usize> {
        self.as_str().position(sheets)
    }

    fn describe(&self) -> String {
        self.as_str().describe()
    }
}

/// A spreadsheet under construction.
#[derive(Debug, Clone)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
    active: usize,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

fn partname(uri: &str) -> Result<PackURI> {
    PackURI::new(uri).map_err(OoxmlError::InvalidFormat)
}

impl Workbook {
    /// Workbook with a single empty sheet named `Sheet1`.
    pub fn new() -> Self {
        Self {
            sheets: vec![Worksheet::new("Sheet1")],
            active: 0,
        }
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    fn locate<S: SheetSelector>(&self, selector: &S) -> Result<usize> {
        selector
            .position(&self.sheets)
            .ok_or_else(|| OoxmlError::PartNotFound(selector.describe()))
    }

    pub fn sheet<S: SheetSelector>(&self, selector: S) -> Result<&Worksheet> {
        let index = self.locate(&selector)?;
        Ok(&self.sheets[index])
    }

    pub fn sheet_mut<S: SheetSelector>(&mut self, selector: S) -> Result<&mut Worksheet> {
        let index = self.locate(&selector)?;
        Ok(&mut self.sheets[index])
    }

    /// Append a sheet and make it the active one.
    pub fn add_sheet(&mut self, name: &str) -> Result<&mut Worksheet> {
        if self.sheets.iter().any(|s| s.name().eq_ignore_ascii_case(name)) {
            return Err(OoxmlError::Conflict(format!("a sheet named '{}' already exists", name)));
        }
        self.sheets.push(Worksheet::new(name));
        self.active = self.sheets.len() - 1;
        Ok(&mut self.sheets[self.active])
    }

    pub fn active_sheet_mut(&mut self) -> &mut Worksheet {
        &mut self.sheets[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn set_active<S: SheetSelector>(&mut self, selector: S) -> Result<()> {
        self.active = self.locate(&selector)?;
        Ok(())
    }

    fn workbook_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);
        write!(
            xml,
            r#"<bookViews><workbookView activeTab="{}"/></bookViews><sheets>"#,
            self.active
        )?;
        for (i, sheet) in self.sheets.iter().enumerate() {
            write!(
                xml,
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(sheet.name()),
                i + 1,
                i + 1
            )?;
        }
        // cached formula values are recomputed by the reader on open
        xml.push_str(r#"</sheets><calcPr calcId="191029" fullCalcOnLoad="1"/></workbook>"#);
        Ok(xml)
    }

    /// Build the OPC package for this workbook.
    pub fn to_package(&self) -> Result<OpcPackage> {
        let workbook_uri = partname(WORKBOOK_PARTNAME)?;
        let mut package = OpcPackage::new();
        package
            .rels_mut()
            .get_or_add(rt::OFFICE_DOCUMENT, workbook_uri.membername());

        let mut workbook_rels = Relationships::new(workbook_uri.base_uri().to_string());
        for i in 0..self.sheets.len() {
            // sheet rIds are fixed by position in workbook.xml
            workbook_rels.get_or_add(rt::WORKSHEET, &format!("worksheets/sheet{}.xml", i + 1));
        }
        workbook_rels.get_or_add(rt::STYLES, "styles.xml");

        let part = package.add_part(workbook_uri, ct::SML_SHEET_MAIN, self.workbook_xml()?.into_bytes())?;
        *part.rels_mut() = workbook_rels;

        let mut strings = SharedStrings::new();
        let mut styles = StylesBuilder::new();
        let mut drawing_count = 0usize;
        let mut chart_count = 0usize;

        for (i, sheet) in self.sheets.iter().enumerate() {
            let number = i + 1;
            let sheet_uri = partname(&format!("/xl/worksheets/sheet{}.xml", number))?;
            let mut sheet_rels = Relationships::new(sheet_uri.base_uri().to_string());

            let drawing_rid = if sheet.charts.is_empty() {
                None
            } else {
                drawing_count += 1;
                let drawing_uri = partname(&format!("/xl/drawings/drawing{}.xml", drawing_count))?;
                let mut drawing_rels = Relationships::new(drawing_uri.base_uri().to_string());
                let mut frames = Vec::with_capacity(sheet.charts.len());
                for chart in &sheet.charts {
                    chart_count += 1;
                    let source_index = match chart.source().sheet {
                        Some(ref name) => self.locate(&name.as_str())?,
                        None => i,
                    };
                    let source = &self.sheets[source_index];
                    let resolved = chart.resolve(source.name(), &source.grid(chart.source()))?;
                    let chart_uri = partname(&format!("/xl/charts/chart{}.xml", chart_count))?;
                    let r_id = drawing_rels.get_or_add(rt::CHART, &chart_uri.relative_ref(drawing_uri.base_uri()));
                    package.add_part(chart_uri, ct::DML_CHART, chart_to_bytes(&resolved)?)?;
                    frames.push((chart.anchor, r_id));
                }
                let target = drawing_uri.relative_ref(sheet_uri.base_uri());
                let part = package.add_part(drawing_uri, ct::OFC_DRAWING, drawing_xml(&frames)?.into_bytes())?;
                *part.rels_mut() = drawing_rels;
                Some(sheet_rels.get_or_add(rt::DRAWING, &target))
            };

            let legacy_rid = if sheet.comments.is_empty() {
                None
            } else {
                let vml_uri = partname(&format!("/xl/drawings/vmlDrawing{}.vml", number))?;
                let comments_uri = partname(&format!("/xl/comments{}.xml", number))?;
                let vml_rid = sheet_rels.get_or_add(rt::VML_DRAWING, &vml_uri.relative_ref(sheet_uri.base_uri()));
                sheet_rels.get_or_add(rt::COMMENTS, &comments_uri.relative_ref(sheet_uri.base_uri()));
                package.add_part(vml_uri, ct::OFC_VML_DRAWING, vml_drawing_xml(&sheet.comments, number)?.into_bytes())?;
                package.add_part(comments_uri, ct::SML_COMMENTS, comments_xml(&sheet.comments)?.into_bytes())?;
                Some(vml_rid)
            };

            let xml = sheet.to_xml(
                &mut strings,
                &mut styles,
                i == self.active,
                drawing_rid.as_deref(),
                legacy_rid.as_deref(),
            )?;
            let part = package.add_part(sheet_uri, ct::SML_WORKSHEET, xml.into_bytes())?;
            *part.rels_mut() = sheet_rels;
        }

        package.add_part(partname("/xl/styles.xml")?, ct::SML_STYLES, styles.to_xml()?.into_bytes())?;
        if !strings.is_empty() {
            package.add_part(
                partname("/xl/sharedStrings.xml")?,
                ct::SML_SHARED_STRINGS,
                strings.to_xml()?.into_bytes(),
            )?;
            package
                .require_part_mut(WORKBOOK_PARTNAME)?
                .rels_mut()
                .get_or_add(rt::SHARED_STRINGS, "sharedStrings.xml");
        }

        add_doc_props(&mut package, None)?;
        debug!(
            "xlsx package assembled: {} sheets, {} charts, {} cell styles",
            self.sheets.len(),
            chart_count,
            styles.len()
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

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::*;
    use crate::common::Rgb;
    use crate::ooxml::charts::ChartKind;

    fn read_member(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_new_workbook_package() {
        let workbook = Workbook::new();
        let bytes = workbook.to_bytes().unwrap();
        let xml = read_member(&bytes, "xl/workbook.xml");
        assert!(xml.contains(r#"<sheet name="Sheet1" sheetId="1" r:id="rId1"/>"#));
        assert!(xml.contains(r#"fullCalcOnLoad="1""#));
        assert!(read_member(&bytes, "xl/worksheets/sheet1.xml").contains(r#"tabSelected="1""#));
    }

    #[test]
    fn test_sheets_by_name_and_active_tab() {
        let mut workbook = Workbook::new();
        workbook.sheet_mut(0).unwrap().set_name("Average");
        workbook.add_sheet("Comments").unwrap();
        assert_eq!(workbook.active_index(), 1);
        assert!(workbook.add_sheet("comments").is_err());
        workbook.set_active("Average").unwrap();
        assert_eq!(workbook.active_index(), 0);
        assert!(workbook.sheet("Charts").is_err());
        assert_eq!(workbook.sheet(1usize).unwrap().name(), "Comments");
    }

    #[test]
    fn test_shared_strings_and_styles_parts() {
        let mut workbook = Workbook::new();
        let sheet = workbook.sheet_mut(0).unwrap();
        sheet.range("A1:C1").unwrap().set_values(&[vec!["Item".into(), "Quantity".into(), "Status".into()]]).set_bold(true);
        sheet.range("C2").unwrap().set_value("In Stock").set_fill_color(Rgb::new(0, 194, 87));
        let bytes = workbook.to_bytes().unwrap();
        assert!(read_member(&bytes, "xl/sharedStrings.xml").contains("<si><t>In Stock</t></si>"));
        assert!(read_member(&bytes, "xl/_rels/workbook.xml.rels").contains("sharedStrings.xml"));
        let sheet_xml = read_member(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet_xml.contains(r#"<c r="A1" s="1" t="s"><v>0</v></c>"#));
        assert!(sheet_xml.contains(r#"<c r="C2" s="2" t="s"><v>3</v></c>"#));
    }

    #[test]
    fn test_chart_on_other_sheet_and_comments() {
        let mut workbook = Workbook::new();
        workbook.sheet_mut(0).unwrap().set_name("Average");
        let average = workbook.sheet_mut("Average").unwrap();
        average.range("A2:B3").unwrap().set_values(&[
            vec!["Speed".into(), "4.5".into()],
            vec!["Support".into(), "3.2".into()],
        ]);
        average.range("B2").unwrap().add_comment("checked", "QA");
        let charts = workbook.add_sheet("Charts").unwrap();
        charts
            .add_chart("Average!$A$2:$B$3", false, ChartKind::Bar, 4_873_680, 2_926_080)
            .unwrap()
            .set_title("Average ratings", 16);

        let bytes = workbook.to_bytes().unwrap();
        let chart = read_member(&bytes, "xl/charts/chart1.xml");
        assert!(chart.contains("Average!$B$2:$B$3"));
        assert!(chart.contains("Average ratings"));
        assert!(read_member(&bytes, "xl/worksheets/_rels/sheet2.xml.rels").contains("../drawings/drawing1.xml"));
        assert!(read_member(&bytes, "xl/drawings/_rels/drawing1.xml.rels").contains("../charts/chart1.xml"));
        assert!(read_member(&bytes, "xl/worksheets/sheet1.xml").contains(r#"<legacyDrawing r:id="rId1"/>"#));
        assert!(read_member(&bytes, "xl/comments1.xml").contains(r#"<comment ref="B2""#));
        assert!(read_member(&bytes, "[Content_Types].xml").contains(r#"Extension="vml""#));
    }

    #[test]
    fn test_chart_with_unknown_sheet_fails() {
        let mut workbook = Workbook::new();
        workbook
            .sheet_mut(0)
            .unwrap()
            .add_chart("Missing!A1:B2", false, ChartKind::Bar, 100, 100)
            .unwrap();
        assert!(workbook.to_bytes().is_err());
    }

    #[test]
    fn test_output_is_deterministic() {
        let mut workbook = Workbook::new();
        workbook.sheet_mut(0).unwrap().range("A1").unwrap().set_value("same");
        assert_eq!(workbook.to_bytes().unwrap(), workbook.to_bytes().unwrap());
    }
}
