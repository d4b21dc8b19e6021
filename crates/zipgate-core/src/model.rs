//! Manifest data model decoded from the lookup store.

use std::fmt;

use serde::de::{Deserialize, Deserializer, IgnoredAny, MapAccess, Visitor};

use crate::sanitize::{DEFAULT_ENTRY_NAME, sanitize};

/// Separator between folder and file name inside the archive.
pub const ARCHIVE_PATH_SEPARATOR: char = '/';

/// One object a manifest names for inclusion in the archive.
///
/// Decoded from the persisted JSON written by the token issuer: keys
/// `S3Path`, `FileName` and `Folder`, matched without regard to case. Absent
/// or `null` fields stay empty and unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Object key in the backing store; empty marks the descriptor unusable.
    pub storage_path: String,
    /// Display name inside the archive, before sanitisation.
    pub file_name: String,
    /// Optional logical folder prefix inside the archive.
    pub folder: String,
}

impl FileDescriptor {
    /// Construct a descriptor from its three persisted fields.
    #[must_use]
    pub fn new(
        storage_path: impl Into<String>,
        file_name: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            storage_path: storage_path.into(),
            file_name: file_name.into(),
            folder: folder.into(),
        }
    }

    /// Whether the descriptor names an object that can be fetched.
    #[must_use]
    pub fn has_storage_path(&self) -> bool {
        !self.storage_path.is_empty()
    }

    /// Sanitised entry name, falling back to [`DEFAULT_ENTRY_NAME`].
    #[must_use]
    pub fn entry_name(&self) -> String {
        let name = sanitize(&self.file_name);
        if name.is_empty() || is_dot_segment(&name) {
            DEFAULT_ENTRY_NAME.to_string()
        } else {
            name
        }
    }

    /// Full in-archive path: sanitised folder, one separator, sanitised name.
    #[must_use]
    pub fn entry_path(&self) -> String {
        let name = self.entry_name();
        let folder = sanitize(&self.folder);
        if folder.is_empty() || is_dot_segment(&folder) {
            return name;
        }
        let mut path = String::with_capacity(folder.len() + 1 + name.len());
        path.push_str(&folder);
        path.push(ARCHIVE_PATH_SEPARATOR);
        path.push_str(&name);
        path
    }
}

#[derive(Clone, Copy)]
enum Field {
    StoragePath,
    FileName,
    Folder,
}

impl Field {
    fn from_key(key: &str) -> Option<Self> {
        [
            ("S3Path", Self::StoragePath),
            ("FileName", Self::FileName),
            ("Folder", Self::Folder),
        ]
        .into_iter()
        .find_map(|(name, field)| key.eq_ignore_ascii_case(name).then_some(field))
    }

    const fn slot(self, descriptor: &mut FileDescriptor) -> &mut String {
        match self {
            Self::StoragePath => &mut descriptor.storage_path,
            Self::FileName => &mut descriptor.file_name,
            Self::Folder => &mut descriptor.folder,
        }
    }
}

impl<'de> Deserialize<'de> for FileDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DescriptorVisitor;

        impl<'de> Visitor<'de> for DescriptorVisitor {
            type Value = FileDescriptor;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a file descriptor object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<FileDescriptor, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut descriptor = FileDescriptor::default();
                while let Some(key) = map.next_key::<String>()? {
                    match Field::from_key(&key) {
                        Some(field) => {
                            if let Some(value) = map.next_value::<Option<String>>()? {
                                *field.slot(&mut descriptor) = value;
                            }
                        }
                        None => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(descriptor)
            }
        }

        deserializer.deserialize_map(DescriptorVisitor)
    }
}

/// `.` and `..` survive sanitisation but would address the parent directory
/// on extraction.
fn is_dot_segment(value: &str) -> bool {
    value == "." || value == ".."
}

/// Ordered descriptors resolved for a single token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    descriptors: Vec<FileDescriptor>,
}

impl Manifest {
    /// Wrap descriptors, preserving their order.
    #[must_use]
    pub const fn new(descriptors: Vec<FileDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Descriptors in archive order.
    #[must_use]
    pub fn descriptors(&self) -> &[FileDescriptor] {
        &self.descriptors
    }

    /// Number of descriptors, including unusable ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the manifest names no descriptors at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

}

impl From<Vec<FileDescriptor>> for Manifest {
    fn from(descriptors: Vec<FileDescriptor>) -> Self {
        Self::new(descriptors)
    }
}

impl IntoIterator for Manifest {
    type Item = FileDescriptor;
    type IntoIter = std::vec::IntoIter<FileDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}
