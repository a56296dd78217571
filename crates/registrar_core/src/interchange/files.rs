//! Per-collection JSON files inside one directory.
//!
//! # Invariants
//! - Files are JSON arrays pretty-printed with 4-space indentation.
//! - Writes land in a sibling temp file first and are renamed into place.
//! - A missing file surfaces as [`DocumentError::FileNotFound`].

use super::document::{Collection, RecordDocument};
use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const JSON_INDENT: &[u8] = b"    ";

pub type DocumentResult<T> = Result<T, DocumentError>;

/// File-level failures while reading or writing collection documents.
#[derive(Debug)]
pub enum DocumentError {
    FileNotFound(PathBuf),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileNotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::Io { path, source } => write!(f, "i/o error on {}: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "cannot parse {}: {source}", path.display())
            }
            Self::Serialize { path, source } => {
                write!(f, "cannot serialize {}: {source}", path.display())
            }
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::FileNotFound(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } | Self::Serialize { source, .. } => Some(source),
        }
    }
}

/// Directory holding `students.json`, `instructors.json`, `courses.json` and
/// `registrations.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDir {
    root: PathBuf,
}

impl DocumentDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.file_name())
    }

    /// Overwrites one collection file with `items`.
    pub fn write_collection<T: Serialize>(
        &self,
        collection: Collection,
        items: &[T],
    ) -> DocumentResult<()> {
        let path = self.path(collection);
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        items
            .serialize(&mut serializer)
            .map_err(|source| DocumentError::Serialize {
                path: path.clone(),
                source,
            })?;

        fs::create_dir_all(&self.root).map_err(|source| DocumentError::Io {
            path: self.root.clone(),
            source,
        })?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, &buffer).map_err(|source| DocumentError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| DocumentError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Reads one collection file.
    pub fn read_collection<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> DocumentResult<Vec<T>> {
        let path = self.path(collection);
        let raw = fs::read(&path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                DocumentError::FileNotFound(path.clone())
            } else {
                DocumentError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        serde_json::from_slice(&raw).map_err(|source| DocumentError::Parse { path, source })
    }

    /// Reads one collection, treating a missing file as an empty collection.
    pub fn read_collection_or_empty<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> DocumentResult<Vec<T>> {
        match self.read_collection(collection) {
            Err(DocumentError::FileNotFound(_)) => Ok(Vec::new()),
            other => other,
        }
    }

    /// Writes the listed collections of `document`.
    pub fn write_collections(
        &self,
        document: &RecordDocument,
        collections: &[Collection],
    ) -> DocumentResult<()> {
        for collection in collections {
            let result = match collection {
                Collection::Students => self.write_collection(*collection, &document.students),
                Collection::Instructors => {
                    self.write_collection(*collection, &document.instructors)
                }
                Collection::Courses => self.write_collection(*collection, &document.courses),
                Collection::Registrations => {
                    self.write_collection(*collection, &document.registrations)
                }
            };
            if let Err(err) = result {
                error!(
                    "event=document_write module=interchange status=error collection={} error={err}",
                    collection.file_name()
                );
                return Err(err);
            }
        }
        info!(
            "event=document_write module=interchange status=ok collections={}",
            collections.len()
        );
        Ok(())
    }

    /// Writes all four collection files.
    pub fn write_document(&self, document: &RecordDocument) -> DocumentResult<()> {
        self.write_collections(document, &Collection::ALL)
    }

    /// Reads the listed collections; each file must exist.
    pub fn read_collections(&self, collections: &[Collection]) -> DocumentResult<RecordDocument> {
        let mut document = RecordDocument::default();
        for collection in collections {
            self.read_into(&mut document, *collection, false)?;
        }
        Ok(document)
    }

    /// Reads all four collections; each file must exist.
    pub fn read_document(&self) -> DocumentResult<RecordDocument> {
        self.read_collections(&Collection::ALL)
    }

    /// Reads all four collections, treating missing files as empty.
    pub fn read_document_or_empty(&self) -> DocumentResult<RecordDocument> {
        let mut document = RecordDocument::default();
        for collection in Collection::ALL {
            self.read_into(&mut document, collection, true)?;
        }
        Ok(document)
    }

    fn read_into(
        &self,
        document: &mut RecordDocument,
        collection: Collection,
        missing_is_empty: bool,
    ) -> DocumentResult<()> {
        match collection {
            Collection::Students => {
                document.students = self.load(collection, missing_is_empty)?;
            }
            Collection::Instructors => {
                document.instructors = self.load(collection, missing_is_empty)?;
            }
            Collection::Courses => document.courses = self.load(collection, missing_is_empty)?,
            Collection::Registrations => {
                document.registrations = self.load(collection, missing_is_empty)?;
            }
        }
        Ok(())
    }

    fn load<T: DeserializeOwned>(
        &self,
        collection: Collection,
        missing_is_empty: bool,
    ) -> DocumentResult<Vec<T>> {
        if missing_is_empty {
            self.read_collection_or_empty(collection)
        } else {
            self.read_collection(collection)
        }
    }
}
