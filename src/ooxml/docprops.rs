/// Core and extended document properties (`docProps/core.xml`, `docProps/app.xml`).
///
/// No timestamps are written so that saving the same content twice yields
/// identical packages.
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::{OpcPackage, PackURI};

const CREATOR: &str = "docforge";

pub(crate) fn add_doc_props(package: &mut OpcPackage, title: Option<&str>) -> Result<()> {
    let mut core = String::with_capacity(512);
    core.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    core.push_str(r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#);
    if let Some(title) = title {
        core.push_str("<dc:title>");
        core.push_str(&escape_xml(title));
        core.push_str("</dc:title>");
    }
    core.push_str("<dc:creator>");
    core.push_str(CREATOR);
    core.push_str("</dc:creator></cp:coreProperties>");

    let app = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><Application>{}</Application></Properties>"#,
        CREATOR
    );

    let core_uri = PackURI::new("/docProps/core.xml").map_err(OoxmlError::InvalidFormat)?;
    let app_uri = PackURI::new("/docProps/app.xml").map_err(OoxmlError::InvalidFormat)?;
    package.add_part(core_uri, ct::OPC_CORE_PROPERTIES, core.into_bytes())?;
    package.add_part(app_uri, ct::OFC_EXTENDED_PROPERTIES, app.into_bytes())?;
    package.rels_mut().get_or_add(rt::CORE_PROPERTIES, "docProps/core.xml");
    package.rels_mut().get_or_add(rt::EXTENDED_PROPERTIES, "docProps/app.xml");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_props_parts_and_rels() {
        let mut package = OpcPackage::new();
        add_doc_props(&mut package, Some("Q&A")).unwrap();
        let core = package.part("/docProps/core.xml").unwrap();
        assert!(core.xml().unwrap().contains("<dc:title>Q&amp;A</dc:title>"));
        assert!(package.contains("/docProps/app.xml"));
        assert_eq!(package.rels().len(), 2);
    }
}
