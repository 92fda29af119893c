//! Document sessions.
//!
//! A [`DocumentSession`] owns exactly one document from creation (or
//! opening) to save. Reports build through the typed accessors and finish
//! with [`DocumentSession::save`] and [`DocumentSession::close`]. A session
//! dropped on an error path is released and logged.
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::error::Result;
use crate::ooxml::docx::{Document, FormFiller};
use crate::ooxml::pptx::Presentation;
use crate::ooxml::xlsx::{Workbook, WorkbookEditor};
use crate::pdf::PdfExporter;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("unsupported document type: {}", path.display())]
    Unsupported { path: PathBuf },

    #[error("session holds a {actual} document, not a {expected} document")]
    WrongKind { expected: &'static str, actual: &'static str },

    #[error("cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Target format of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Word,
    Spreadsheet,
    Presentation,
    /// A word processing model exported as PDF
    Pdf,
}

impl DocumentKind {
    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Word => "docx",
            DocumentKind::Spreadsheet => "xlsx",
            DocumentKind::Presentation => "pptx",
            DocumentKind::Pdf => "pdf",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "docx" => Some(DocumentKind::Word),
            "xlsx" => Some(DocumentKind::Spreadsheet),
            "pptx" => Some(DocumentKind::Presentation),
            "pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Word => "Word",
            DocumentKind::Spreadsheet => "spreadsheet",
            DocumentKind::Presentation => "presentation",
            DocumentKind::Pdf => "PDF",
        };
        f.write_str(name)
    }
}

/// The live object model of a session.
#[derive(Debug)]
pub enum SessionDocument {
    /// New Word document, also the model behind PDF sessions
    Word(Document),
    Workbook(Workbook),
    Presentation(Presentation),
    /// Existing Word document whose content controls are being filled
    Form(FormFiller),
    /// Existing workbook being read and annotated
    WorkbookEditor(WorkbookEditor),
}

impl SessionDocument {
    fn name(&self) -> &'static str {
        match self {
            SessionDocument::Word(_) => "word",
            SessionDocument::Workbook(_) => "workbook",
            SessionDocument::Presentation(_) => "presentation",
            SessionDocument::Form(_) => "form",
            SessionDocument::WorkbookEditor(_) => "workbook editor",
        }
    }
}

#[derive(Debug)]
pub struct DocumentSession {
    kind: DocumentKind,
    document: SessionDocument,
    source: Option<PathBuf>,
    closed: bool,
}

macro_rules! accessor {
    ($name:ident, $variant:ident, $ty:ty, $label:literal) => {
        pub fn $name(&mut self) -> std::result::Result<&mut $ty, SessionError> {
            let actual = self.document.name();
            match &mut self.document {
                SessionDocument::$variant(inner) => Ok(inner),
                _ => Err(SessionError::WrongKind {
                    expected: $label,
                    actual,
                }),
            }
        }
    };
}

impl DocumentSession {
    /// Start a session on a new, empty document.
    pub fn create(kind: DocumentKind) -> Self {
        let document = match kind {
            DocumentKind::Word | DocumentKind::Pdf => SessionDocument::Word(Document::new()),
            DocumentKind::Spreadsheet => SessionDocument::Workbook(Workbook::new()),
            DocumentKind::Presentation => SessionDocument::Presentation(Presentation::new()),
        };
        debug!("session opened: new {} document", kind);
        Self {
            kind,
            document,
            source: None,
            closed: false,
        }
    }

    /// Start a session on an existing `.docx` or `.xlsx` file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let (kind, document) = match DocumentKind::from_path(path) {
            Some(DocumentKind::Word) => (DocumentKind::Word, SessionDocument::Form(FormFiller::open(path)?)),
            Some(DocumentKind::Spreadsheet) => (
                DocumentKind::Spreadsheet,
                SessionDocument::WorkbookEditor(WorkbookEditor::open(path)?),
            ),
            _ => {
                return Err(SessionError::Unsupported {
                    path: path.to_path_buf(),
                }
                .into());
            },
        };
        debug!("session opened: {}", path.display());
        Ok(Self {
            kind,
            document,
            source: Some(path.to_path_buf()),
            closed: false,
        })
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// File the session was opened from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn document(&self) -> &SessionDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut SessionDocument {
        &mut self.document
    }

    accessor!(word_mut, Word, Document, "word");
    accessor!(workbook_mut, Workbook, Workbook, "workbook");
    accessor!(presentation_mut, Presentation, Presentation, "presentation");
    accessor!(form_mut, Form, FormFiller, "form");
    accessor!(editor_mut, WorkbookEditor, WorkbookEditor, "workbook editor");

    /// Serialize the document in the session's target format.
    pub fn render(&mut self) -> Result<Vec<u8>> {
        let bytes = match (&mut self.document, self.kind) {
            (SessionDocument::Word(doc), DocumentKind::Pdf) => PdfExporter::new(doc).render()?,
            (SessionDocument::Word(doc), _) => doc.to_bytes()?,
            (SessionDocument::Workbook(workbook), _) => workbook.to_bytes()?,
            (SessionDocument::Presentation(pres), _) => pres.to_bytes()?,
            (SessionDocument::Form(filler), _) => filler.to_bytes()?,
            (SessionDocument::WorkbookEditor(editor), _) => editor.to_bytes()?,
        };
        Ok(bytes)
    }

    /// Render and write the document to `path`.
    ///
    /// The bytes go to a temporary file next to `path` which is then renamed
    /// over it, so a failed save leaves no partial document behind.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.render()?;
        write_atomic(path, &bytes)?;
        debug!("session saved: {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    pub fn close(mut self) {
        self.closed = true;
        debug!("session closed: {}", self.kind);
    }
}

impl Drop for DocumentSession {
    fn drop(&mut self) {
        if !self.closed {
            debug!("session released without close: {}", self.kind);
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::result::Result<(), SessionError> {
    let output_error = |source| SessionError::Output {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(output_error)?;

    // The temporary file is removed when dropped before `persist`.
    let mut temp = NamedTempFile::new_in(dir).map_err(output_error)?;
    temp.write_all(bytes).map_err(output_error)?;
    temp.as_file().sync_all().map_err(output_error)?;
    temp.persist(path).map_err(|err| output_error(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(DocumentKind::from_path(Path::new("a/result.DOCX")), Some(DocumentKind::Word));
        assert_eq!(DocumentKind::from_path(Path::new("chart_data.xlsx")), Some(DocumentKind::Spreadsheet));
        assert_eq!(DocumentKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(DocumentKind::Pdf.extension(), "pdf");
    }

    #[test]
    fn test_create_and_save_each_kind() {
        let dir = tempfile::tempdir().unwrap();
        for kind in [
            DocumentKind::Word,
            DocumentKind::Spreadsheet,
            DocumentKind::Presentation,
            DocumentKind::Pdf,
        ] {
            let mut session = DocumentSession::create(kind);
            let path = dir.path().join(format!("result.{}", kind.extension()));
            session.save(&path).unwrap();
            session.close();
            let bytes = fs::read(&path).unwrap();
            assert!(!bytes.is_empty());
            if kind == DocumentKind::Pdf {
                assert!(bytes.starts_with(b"%PDF"));
            } else {
                assert!(bytes.starts_with(b"PK"));
            }
        }
        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["result.docx", "result.pdf", "result.pptx", "result.xlsx"]);
    }

    #[test]
    fn test_wrong_accessor() {
        let mut session = DocumentSession::create(DocumentKind::Spreadsheet);
        assert!(session.workbook_mut().is_ok());
        match session.word_mut() {
            Err(SessionError::WrongKind { expected, actual }) => {
                assert_eq!(expected, "word");
                assert_eq!(actual, "workbook");
            },
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_open_existing_documents() {
        let dir = tempfile::tempdir().unwrap();
        let docx = dir.path().join("form.docx");
        let xlsx = dir.path().join("data.xlsx");
        Document::new().save(&docx).unwrap();
        Workbook::new().save(&xlsx).unwrap();

        let mut form = DocumentSession::open(&docx).unwrap();
        assert_eq!(form.kind(), DocumentKind::Word);
        assert_eq!(form.source(), Some(docx.as_path()));
        assert!(form.form_mut().is_ok());

        let mut editor = DocumentSession::open(&xlsx).unwrap();
        assert!(editor.editor_mut().is_ok());
        editor.save(dir.path().join("copy.xlsx")).unwrap();
    }

    #[test]
    fn test_open_unsupported_or_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = DocumentSession::open(dir.path().join("slides.pptx")).unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::Unsupported { .. })));
        assert!(DocumentSession::open(dir.path().join("missing.docx")).is_err());
    }

    #[test]
    fn test_sessions_coexist() {
        let mut first = DocumentSession::create(DocumentKind::Word);
        let mut second = DocumentSession::create(DocumentKind::Word);
        first.word_mut().unwrap().paragraph_mut(0).unwrap().add_text("first");
        second.word_mut().unwrap().paragraph_mut(0).unwrap().add_text("second");
        assert_eq!(first.word_mut().unwrap().paragraph_texts(), vec!["first".to_string()]);
        assert_eq!(second.word_mut().unwrap().paragraph_texts(), vec!["second".to_string()]);
    }

    #[test]
    fn test_failed_save_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let mut session = DocumentSession::create(DocumentKind::Word);
        assert!(session.save(blocker.join("result.docx")).is_err());
        let names: Vec<_> = fs::read_dir(dir.path()).unwrap().filter_map(|e| e.ok()).collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_failed_rename_removes_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let occupied = dir.path().join("result.docx");
        fs::create_dir(&occupied).unwrap();
        fs::write(occupied.join("keep"), b"x").unwrap();

        let mut session = DocumentSession::create(DocumentKind::Word);
        let err = session.save(&occupied).unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::Output { ref path, .. }) if path == &occupied));
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name())
            .collect();
        assert_eq!(names, ["result.docx"]);
    }

    #[test]
    fn test_save_replaces_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.docx");
        fs::write(&path, b"stale").unwrap();
        let mut session = DocumentSession::create(DocumentKind::Word);
        session.save(&path).unwrap();
        assert!(fs::read(&path).unwrap().starts_with(b"PK"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
