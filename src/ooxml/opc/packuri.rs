/// Part names inside an OPC package.
///
/// A part name is an absolute, slash-separated path such as
/// `/word/document.xml`. The zip member name is the same path without the
/// leading slash; relationship targets are written relative to the directory
/// of the source part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackURI {
    uri: String,
}

/// The package pseudo-partname, source of the package-level relationships
pub const PACKAGE_URI: &str = "/";

/// The URI for the [Content_Types].xml part
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

impl PackURI {
    /// Create a new PackURI. The string must begin with a forward slash.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Resolve a relationship target such as `../media/image1.png` against the
    /// directory of its source part.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        if let Some(absolute) = relative_ref.strip_prefix('/') {
            return Self::new(format!("/{}", normalize(absolute)));
        }
        let joined = format!("{}/{}", base_uri.trim_end_matches('/'), relative_ref);
        Self::new(format!("/{}", normalize(&joined)))
    }

    /// Directory portion, e.g. `/ppt/slides` for `/ppt/slides/slide1.xml`.
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// File name portion, e.g. `slide1.xml`. Empty for the package itself.
    pub fn filename(&self) -> &str {
        self.uri.rsplit('/').next().unwrap_or("")
    }

    /// Extension without the leading period.
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        filename.rfind('.').map(|pos| &filename[pos + 1..]).unwrap_or("")
    }

    /// Numeric suffix of tuple partnames (`21` for `slide21.xml`), or None for
    /// singleton partnames such as `presentation.xml`.
    pub fn idx(&self) -> Option<u32> {
        let filename = self.filename();
        let stem = filename.rfind('.').map(|pos| &filename[..pos]).unwrap_or(filename);
        let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 || digits == stem.len() {
            return None;
        }
        atoi_simd::parse::<u32, false, false>(stem[stem.len() - digits..].as_bytes()).ok()
    }

    /// Zip member name: the URI without its leading slash.
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Reference to this part as seen from a part living in `base_uri`.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == "/" {
            return self.membername().to_string();
        }

        let from: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();
        let common = from
            .iter()
            .zip(to.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut segments: Vec<&str> = vec![".."; from.len() - common];
        segments.extend_from_slice(&to[common..]);
        segments.join("/")
    }

    /// The `.rels` part holding this part's relationships,
    /// e.g. `/word/_rels/document.xml.rels`.
    pub fn rels_uri(&self) -> Result<PackURI, String> {
        let base = self.base_uri();
        if base == "/" {
            Self::new(format!("/_rels/{}.rels", self.filename()))
        } else {
            Self::new(format!("{}/_rels/{}.rels", base, self.filename()))
        }
    }

    /// Inverse of [`PackURI::rels_uri`]: the source part of a `.rels` member name.
    pub fn source_of_rels(membername: &str) -> Option<PackURI> {
        let stripped = membername.strip_suffix(".rels")?;
        let (dir, file) = match stripped.rsplit_once("_rels/") {
            Some((dir, file)) => (dir.trim_end_matches('/'), file),
            None => return None,
        };
        if dir.is_empty() {
            if file.is_empty() {
                return Some(PackURI { uri: PACKAGE_URI.to_string() });
            }
            return Some(PackURI { uri: format!("/{}", file) });
        }
        Some(PackURI { uri: format!("/{}/{}", dir, file) })
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

/// Collapse `.` and `..` segments of a slash-separated path.
fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            other => parts.push(other),
        }
    }
    parts.join("/")
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packuri_new() {
        assert!(PackURI::new("/word/document.xml").is_ok());
        assert!(PackURI::new("word/document.xml").is_err());
    }

    #[test]
    fn test_components() {
        let uri = PackURI::new("/ppt/slides/slide12.xml").unwrap();
        assert_eq!(uri.base_uri(), "/ppt/slides");
        assert_eq!(uri.filename(), "slide12.xml");
        assert_eq!(uri.ext(), "xml");
        assert_eq!(uri.idx(), Some(12));
        assert_eq!(uri.membername(), "ppt/slides/slide12.xml");

        let single = PackURI::new("/ppt/presentation.xml").unwrap();
        assert_eq!(single.idx(), None);
        assert_eq!(PackURI::new("/").unwrap().base_uri(), "/");
    }

    #[test]
    fn test_rel_refs() {
        let chart = PackURI::new("/xl/charts/chart1.xml").unwrap();
        assert_eq!(chart.relative_ref("/xl/drawings"), "../charts/chart1.xml");
        assert_eq!(chart.relative_ref("/"), "xl/charts/chart1.xml");

        let resolved = PackURI::from_rel_ref("/xl/drawings", "../charts/chart1.xml").unwrap();
        assert_eq!(resolved, chart);
        let absolute = PackURI::from_rel_ref("/xl", "/xl/worksheets/sheet1.xml").unwrap();
        assert_eq!(absolute.as_str(), "/xl/worksheets/sheet1.xml");
    }

    #[test]
    fn test_rels_uri_round_trip() {
        let doc = PackURI::new("/word/document.xml").unwrap();
        let rels = doc.rels_uri().unwrap();
        assert_eq!(rels.as_str(), "/word/_rels/document.xml.rels");
        assert_eq!(PackURI::source_of_rels(rels.membername()), Some(doc));
        assert_eq!(
            PackURI::source_of_rels("_rels/.rels").map(|u| u.to_string()),
            Some("/".to_string())
        );
    }
}
