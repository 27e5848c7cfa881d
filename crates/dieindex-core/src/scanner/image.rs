//! Object file loading and DWARF section access.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gimli::{Dwarf, EndianArcSlice, RunTimeEndian, SectionId};
use object::{Object, ObjectSection};

use crate::error::{IndexError, IndexResult};

pub(crate) type OwnedReader = EndianArcSlice<RunTimeEndian>;
pub(crate) type OwnedDwarf = Dwarf<OwnedReader>;

/// Sections the scanner reads, with their Mach-O spellings.
const DWARF_SECTIONS: &[(SectionId, &[&str])] = &[
    (SectionId::DebugAbbrev, &[".debug_abbrev", "__debug_abbrev"]),
    (SectionId::DebugAddr, &[".debug_addr", "__debug_addr"]),
    (SectionId::DebugInfo, &[".debug_info", "__debug_info"]),
    (SectionId::DebugLine, &[".debug_line", "__debug_line"]),
    (SectionId::DebugLineStr, &[".debug_line_str", "__debug_line_str"]),
    (SectionId::DebugRanges, &[".debug_ranges", "__debug_ranges"]),
    (SectionId::DebugRngLists, &[".debug_rnglists", "__debug_rnglists"]),
    (SectionId::DebugStr, &[".debug_str", "__debug_str"]),
    (SectionId::DebugStrOffsets, &[".debug_str_offsets", "__debug_str_offs"]),
];

fn load_section_bytes(file: &object::File<'_>, names: &[&str]) -> IndexResult<Option<Arc<[u8]>>>
{
    for name in names {
        if let Some(section) = file.section_by_name(name) {
            let data = section
                .uncompressed_data()
                .map_err(|err| IndexError::InvalidArgument(format!("failed to read {name}: {err}")))?;
            return Ok(Some(match data {
                Cow::Borrowed(bytes) => Arc::<[u8]>::from(bytes),
                Cow::Owned(vec) => vec.into(),
            }));
        }
    }

    Ok(None)
}

/// DWARF sections of one object file, copied out of the file so they can be
/// shared across scanning threads.
#[derive(Debug)]
pub struct DebugImage
{
    path: PathBuf,
    endian: RunTimeEndian,
    sections: HashMap<SectionId, Arc<[u8]>>,
}

impl DebugImage
{
    /// Read `path` and copy out its DWARF sections.
    ///
    /// ## Errors
    ///
    /// I/O failures, files `object` cannot parse, and sections that fail to
    /// decompress.
    pub fn open(path: impl AsRef<Path>) -> IndexResult<Self>
    {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        Self::parse(path, &bytes)
    }

    /// Parse an in-memory object file; `path` is only used for messages.
    ///
    /// ## Errors
    ///
    /// See [`open`](Self::open).
    pub fn parse(path: &Path, bytes: &[u8]) -> IndexResult<Self>
    {
        let file = object::File::parse(bytes).map_err(|err| IndexError::ObjectParse {
            path: path.to_path_buf(),
            details: err.to_string(),
        })?;

        let endian = if file.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };

        let mut sections = HashMap::new();
        for (id, aliases) in DWARF_SECTIONS {
            if let Some(data) = load_section_bytes(&file, aliases)? {
                sections.insert(*id, data);
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            endian,
            sections,
        })
    }

    /// Image over sections produced in memory.
    #[cfg(test)]
    pub(crate) fn from_sections(path: &Path, endian: RunTimeEndian, sections: HashMap<SectionId, Arc<[u8]>>) -> Self
    {
        Self {
            path: path.to_path_buf(),
            endian,
            sections,
        }
    }

    pub fn path(&self) -> &Path
    {
        &self.path
    }

    /// Whether the file carries any `.debug_info` at all.
    pub fn has_debug_info(&self) -> bool
    {
        self.sections.get(&SectionId::DebugInfo).is_some_and(|data| !data.is_empty())
    }

    /// A fresh `Dwarf` over the shared section data.
    ///
    /// Each scanning thread loads its own; only the section buffers are shared.
    pub(crate) fn load_dwarf(&self) -> IndexResult<OwnedDwarf>
    {
        Dwarf::load(|section| Ok::<_, gimli::Error>(self.section_reader(section)))
            .map_err(|err| IndexError::dwarf("loading DWARF sections", err))
    }

    fn section_reader(&self, id: SectionId) -> OwnedReader
    {
        let data = self
            .sections
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Arc::<[u8]>::from(Vec::new()));
        EndianArcSlice::new(data, self.endian)
    }
}
