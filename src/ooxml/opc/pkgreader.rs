//! Low-level reader of a serialized OPC package.
//!
//! Loads every zip member into memory, resolves content types from
//! `[Content_Types].xml` and attaches each `.rels` member to its source part.
//! Members keep their archive order so an edited package is written back in
//! the same order it was read.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use log::debug;
use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;
use zip::ZipArchive;

use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::rel::Relationships;

/// A relationship as read from a `.rels` member.
#[derive(Debug, Clone)]
pub struct SerializedRelationship {
    pub r_id: String,
    pub reltype: String,
    pub target_ref: String,
    pub is_external: bool,
}

struct ContentTypeMap {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self {
            defaults: HashMap::new(),
            overrides: HashMap::new(),
        };
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => {
                                key = Some(attr.unescape_value()?.to_string());
                            },
                            b"ContentType" => {
                                content_type = Some(attr.unescape_value()?.to_string());
                            },
                            _ => {},
                        }
                    }
                    if let (Some(key), Some(content_type)) = (key, content_type) {
                        match e.local_name().as_ref() {
                            b"Default" => {
                                map.defaults.insert(key.to_ascii_lowercase(), content_type);
                            },
                            b"Override" => {
                                map.overrides.insert(key, content_type);
                            },
                            _ => {},
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!(
                        "Content types parse error: {}",
                        e
                    )));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(map)
    }

    fn get(&self, partname: &PackURI) -> &str {
        if let Some(content_type) = self.overrides.get(partname.as_str()) {
            return content_type;
        }
        self.defaults
            .get(&partname.ext().to_ascii_lowercase())
            .map(String::as_str)
            .unwrap_or(ct::OCTET_STREAM)
    }
}

/// Parse the content of a `.rels` member.
pub fn parse_rels_xml(xml: &[u8]) -> Result<SmallVec<[SerializedRelationship; 8]>> {
    let mut rels = SmallVec::new();
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut r_id = String::new();
                let mut reltype = String::new();
                let mut target_ref = String::new();
                let mut is_external = false;
                for attr in e.attributes() {
                    let attr = attr?;
                    let value = attr.unescape_value()?;
                    match attr.key.as_ref() {
                        b"Id" => r_id = value.to_string(),
                        b"Type" => reltype = value.to_string(),
                        b"Target" => target_ref = value.to_string(),
                        b"TargetMode" => is_external = value == "External",
                        _ => {},
                    }
                }
                rels.push(SerializedRelationship {
                    r_id,
                    reltype,
                    target_ref,
                    is_external,
                });
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(OpcError::XmlError(format!(
                    "Relationships parse error: {}",
                    e
                )));
            },
            _ => {},
        }
        buf.clear();
    }

    Ok(rels)
}

pub struct PackageReader {
    members: Vec<(String, Vec<u8>)>,
}

impl PackageReader {
    /// Read every member of the zip container.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut members = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut blob = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut blob)?;
            members.push((file.name().to_string(), blob));
        }
        debug!("read package with {} members", members.len());
        Ok(Self { members })
    }

    fn member(&self, name: &str) -> Option<&[u8]> {
        self.members
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, blob)| blob.as_slice())
    }

    fn load_rels(&self, source: &PackURI) -> Result<Relationships> {
        let mut rels = Relationships::new(source.base_uri().to_string());
        let rels_uri = source.rels_uri().map_err(OpcError::InvalidPackUri)?;
        if let Some(xml) = self.member(rels_uri.membername()) {
            for srel in parse_rels_xml(xml)? {
                rels.add_relationship(srel.reltype, srel.target_ref, srel.r_id, srel.is_external);
            }
        }
        Ok(rels)
    }

    /// Build the in-memory package.
    pub fn into_package(self) -> Result<OpcPackage> {
        let content_types_name = CONTENT_TYPES_URI.trim_start_matches('/');
        let content_types = self
            .member(content_types_name)
            .ok_or_else(|| OpcError::PartNotFound(CONTENT_TYPES_URI.to_string()))
            .and_then(ContentTypeMap::from_xml)?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let pkg_rels = self.load_rels(&package_uri)?;

        let mut parts = Vec::with_capacity(self.members.len());
        for (name, blob) in &self.members {
            if name == content_types_name || name.ends_with(".rels") {
                continue;
            }
            let partname = PackURI::new(format!("/{}", name)).map_err(OpcError::InvalidPackUri)?;
            let mut part = Part::new(
                partname.clone(),
                content_types.get(&partname),
                blob.clone(),
            );
            *part.rels_mut() = self.load_rels(&partname)?;
            parts.push(part);
        }

        Ok(OpcPackage::from_parts(pkg_rels, parts))
    }
}
