//! # DWARF Scanner
//!
//! Producer side of the cooked index: walks `.debug_info` and feeds every
//! named DIE into a [`CookedIndex`].
//!
//! Units are split into contiguous groups, one per shard. Each shard is
//! scanned on its own thread with its own [`StringPool`] and its own index, so
//! shards share nothing but the read-only section buffers. The resulting
//! indices are handed to a [`CookedIndexVector`], which finalizes them.
//!
//! ## What gets indexed
//!
//! Named subprograms, variables, constants, types, typedefs, enumerators,
//! namespaces and modules. Anything nested in a subprogram or lexical block
//! is local and skipped. Non-type declarations are skipped as well; type
//! declarations are kept and flagged.
//!
//! Out-of-line definitions (`int Foo::bar(int) { ... }`) have no name of
//! their own. They point at the in-class declaration through
//! `DW_AT_specification` (or `DW_AT_abstract_origin` for concrete instances),
//! and take their name, linkage name and scope from it.

mod image;

use std::collections::HashMap;
use std::panic;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use gimli::{
    constants, AttributeValue, DebuggingInformationEntry, DwAt, DwTag, Reader, Unit, UnitHeader, UnitOffset,
};
pub use image::DebugImage;
use image::{OwnedDwarf, OwnedReader};
use tracing::{debug, info, warn};

use crate::config::IndexConfig;
use crate::error::{IndexError, IndexResult};
use crate::index::{CookedIndex, CookedIndexVector, EntryId, IndexOptions, StringPool};
use crate::types::{AddressRange, CompileUnit, DieOffset, EntryFlags, Language, UnitId};

/// Name given to namespaces without `DW_AT_name`.
pub const ANONYMOUS_NAMESPACE: &str = "(anonymous namespace)";

/// Longest `DW_AT_specification`/`DW_AT_abstract_origin` chain followed.
const MAX_ORIGIN_HOPS: usize = 8;

/// Scan the object file at `path`.
///
/// ## Errors
///
/// Fails if the file cannot be read or parsed, or its DWARF is malformed.
pub fn scan_file(path: impl AsRef<Path>, config: &IndexConfig, options: IndexOptions) -> IndexResult<CookedIndexVector>
{
    let image = DebugImage::open(path)?;
    scan_image(&image, config, options)
}

/// Scan an already loaded image into `config.shards` indices.
///
/// ## Errors
///
/// See [`scan_file`].
pub fn scan_image(image: &DebugImage, config: &IndexConfig, options: IndexOptions) -> IndexResult<CookedIndexVector>
{
    let started = Instant::now();
    if !image.has_debug_info() {
        warn!(path = %image.path().display(), "no .debug_info section, index will be empty");
        return Ok(CookedIndexVector::new(Vec::new()));
    }

    let headers = read_unit_headers(&image.load_dwarf()?)?;
    let shard_count = config.shards.get().min(headers.len()).max(1);
    let chunk_size = headers.len().div_ceil(shard_count).max(1);
    debug!(units = headers.len(), shards = shard_count, "scanning compile units");

    let shards = thread::scope(|scope| -> IndexResult<Vec<CookedIndex>> {
        let mut handles = Vec::with_capacity(shard_count);
        for (shard, group) in headers.chunks(chunk_size).enumerate() {
            let options = options.clone();
            let handle = thread::Builder::new()
                .name(format!("dieindex-scan-{shard}"))
                .spawn_scoped(scope, move || scan_shard(image, shard, shard * chunk_size, group, options))?;
            handles.push(handle);
        }

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(payload) => panic::resume_unwind(payload),
            })
            .collect()
    })?;

    info!(
        path = %image.path().display(),
        shards = shards.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "scanned DWARF"
    );
    Ok(CookedIndexVector::new(shards))
}

fn read_unit_headers(dwarf: &OwnedDwarf) -> IndexResult<Vec<UnitHeader<OwnedReader>>>
{
    let mut headers = Vec::new();
    let mut iter = dwarf.units();
    while let Some(header) = iter
        .next()
        .map_err(|err| IndexError::dwarf("reading .debug_info unit header", err))?
    {
        headers.push(header);
    }
    Ok(headers)
}

fn scan_shard(
    image: &DebugImage,
    shard: usize,
    first_unit: usize,
    headers: &[UnitHeader<OwnedReader>],
    options: IndexOptions,
) -> IndexResult<CookedIndex>
{
    let dwarf = image.load_dwarf()?;
    let mut index = CookedIndex::new(options);
    let mut pool = StringPool::new();

    for (position, header) in headers.iter().enumerate() {
        let id = u32::try_from(first_unit + position)
            .map(UnitId)
            .map_err(|_| IndexError::InvalidArgument("too many compile units".to_string()))?;
        let unit = dwarf
            .unit(header.clone())
            .map_err(|err| IndexError::dwarf("parsing compilation unit", err))?;

        UnitScanner {
            dwarf: &dwarf,
            unit: &unit,
            index: &mut index,
            pool: &mut pool,
            declared_in: HashMap::new(),
        }
        .scan(id)?;
    }

    info!(shard, units = headers.len(), entries = index.len(), names = pool.len(), "scanned shard");
    Ok(index)
}

/// What the children of the DIE just visited should do.
#[derive(Debug, Clone, Copy)]
enum Scope
{
    /// Not indexed (function locals, members, ...).
    Skip,
    /// Indexed with this parent.
    Parent(Option<EntryId>),
}

/// What a DIE picks up from the declarations it refers to.
#[derive(Debug, Default)]
struct Inherited
{
    name: Option<Arc<str>>,
    linkage: Option<Arc<str>>,
    external: bool,
    /// Scope of the first referenced declaration already seen in this unit.
    scope: Option<Option<EntryId>>,
}

struct UnitScanner<'a>
{
    dwarf: &'a OwnedDwarf,
    unit: &'a Unit<OwnedReader>,
    index: &'a mut CookedIndex,
    pool: &'a mut StringPool,
    /// Enclosing entry of every non-type declaration seen so far.
    declared_in: HashMap<UnitOffset, Option<EntryId>>,
}

impl UnitScanner<'_>
{
    fn scan(&mut self, id: UnitId) -> IndexResult<()>
    {
        let unit = self.unit;
        let mut cursor = unit.entries();
        let Some((_, root)) = cursor.next_dfs().map_err(|err| IndexError::dwarf("reading unit root DIE", err))? else {
            return Ok(());
        };

        let language = match root
            .attr(constants::DW_AT_language)
            .map_err(|err| IndexError::dwarf("reading DW_AT_language", err))?
            .map(|attr| attr.value())
        {
            Some(AttributeValue::Language(lang)) => Language::from_dw_lang(lang),
            _ => Language::Unknown,
        };
        let offset = unit.header.offset().as_debug_info_offset().map_or(0, |offset| offset.0 as u64);
        let mut owner = CompileUnit::new(id, offset, language);
        if let Some(name) = self.attr_string(root, constants::DW_AT_name)? {
            owner = owner.with_name(&*name);
        }
        let owner = Arc::new(owner);

        let mut ranges = self
            .dwarf
            .unit_ranges(unit)
            .map_err(|err| IndexError::dwarf("reading unit ranges", err))?;
        while let Some(range) = ranges
            .next()
            .map_err(|err| IndexError::dwarf("reading unit ranges", err))?
        {
            self.index
                .add_address_range(AddressRange::new(range.begin, range.end), &owner);
        }

        let mut scopes = vec![(0isize, Scope::Parent(None))];
        let mut depth = 0isize;
        while let Some((delta, entry)) = cursor
            .next_dfs()
            .map_err(|err| IndexError::dwarf("traversing DIE tree", err))?
        {
            depth += delta;
            while scopes.last().is_some_and(|&(level, _)| level >= depth) {
                scopes.pop();
            }

            let parent = match scopes.last() {
                Some(&(_, Scope::Skip)) => continue,
                Some(&(_, Scope::Parent(parent))) => parent,
                None => None,
            };

            let scope = self.visit(entry, parent, &owner)?;
            scopes.push((depth, scope));
        }

        Ok(())
    }

    fn visit(
        &mut self,
        entry: &DebuggingInformationEntry<'_, '_, OwnedReader>,
        parent: Option<EntryId>,
        owner: &Arc<CompileUnit>,
    ) -> IndexResult<Scope>
    {
        let tag = entry.tag();
        let declaration = flag(entry, constants::DW_AT_declaration)?;
        if declaration && !is_type(tag) {
            // Not indexed itself, but definitions elsewhere may refer back to it.
            self.declared_in.insert(entry.offset(), parent);
            return Ok(Scope::Skip);
        }
        if !is_indexed(tag) {
            return Ok(Scope::Skip);
        }

        let inherited = self.inherited(entry)?;
        let parent = inherited.scope.unwrap_or(parent);
        let name = match self.attr_string(entry, constants::DW_AT_name)?.or(inherited.name) {
            Some(name) => name,
            None if tag == constants::DW_TAG_namespace => self.pool.intern(ANONYMOUS_NAMESPACE),
            // Anonymous aggregates and enums are transparent to their members.
            None if is_type(tag) => return Ok(Scope::Parent(parent)),
            None => return Ok(Scope::Skip),
        };

        let mut flags = EntryFlags::empty();
        if declaration {
            flags |= EntryFlags::IS_TYPE_DECLARATION;
        }
        if flag(entry, constants::DW_AT_main_subprogram)? {
            flags |= EntryFlags::IS_MAIN;
        }
        let is_code_or_data = matches!(tag, constants::DW_TAG_subprogram | constants::DW_TAG_variable);
        if is_code_or_data && !inherited.external && !flag(entry, constants::DW_AT_external)? {
            flags |= EntryFlags::IS_STATIC;
        }
        let enum_class = tag == constants::DW_TAG_enumeration_type && flag(entry, constants::DW_AT_enum_class)?;
        if enum_class {
            flags |= EntryFlags::IS_ENUM_CLASS;
        }

        let die_offset = entry
            .offset()
            .to_debug_info_offset(&self.unit.header)
            .map_or(DieOffset(entry.offset().0 as u64), |offset| DieOffset(offset.0 as u64));

        let id = self.index.add(die_offset, tag, flags, Arc::clone(&name), parent, owner);

        if is_code_or_data {
            let linkage = self.linkage_name(entry)?.or(inherited.linkage);
            if let Some(linkage) = linkage.filter(|linkage| !Arc::ptr_eq(linkage, &name)) {
                let linkage_flags = (flags - EntryFlags::IS_MAIN) | EntryFlags::IS_LINKAGE;
                self.index.add(die_offset, tag, linkage_flags, linkage, None, owner);
            }
        }

        Ok(match tag {
            constants::DW_TAG_enumeration_type if enum_class => Scope::Parent(Some(id)),
            // Plain enumerators live in the enclosing scope.
            constants::DW_TAG_enumeration_type => Scope::Parent(parent),
            constants::DW_TAG_namespace
            | constants::DW_TAG_module
            | constants::DW_TAG_structure_type
            | constants::DW_TAG_class_type
            | constants::DW_TAG_union_type
            | constants::DW_TAG_interface_type => Scope::Parent(Some(id)),
            _ => Scope::Skip,
        })
    }

    /// Follow `DW_AT_specification`/`DW_AT_abstract_origin` from `entry`.
    ///
    /// The nearest DIE in the chain wins for each attribute. References into
    /// other units are not followed.
    fn inherited(&mut self, entry: &DebuggingInformationEntry<'_, '_, OwnedReader>) -> IndexResult<Inherited>
    {
        let mut inherited = Inherited::default();
        let Some(mut offset) = origin(entry)? else {
            return Ok(inherited);
        };

        let unit = self.unit;
        for _ in 0..MAX_ORIGIN_HOPS {
            let target = unit
                .entry(offset)
                .map_err(|err| IndexError::dwarf("reading referenced DIE", err))?;

            if inherited.name.is_none() {
                inherited.name = self.attr_string(&target, constants::DW_AT_name)?;
            }
            if inherited.linkage.is_none() {
                inherited.linkage = self.linkage_name(&target)?;
            }
            inherited.external |= flag(&target, constants::DW_AT_external)?;
            if inherited.scope.is_none() {
                inherited.scope = self.declared_in.get(&offset).copied();
            }

            match origin(&target)? {
                Some(next) => offset = next,
                None => break,
            }
        }

        Ok(inherited)
    }

    fn linkage_name(&mut self, entry: &DebuggingInformationEntry<'_, '_, OwnedReader>) -> IndexResult<Option<Arc<str>>>
    {
        match self.attr_string(entry, constants::DW_AT_linkage_name)? {
            Some(linkage) => Ok(Some(linkage)),
            None => self.attr_string(entry, constants::DW_AT_MIPS_linkage_name),
        }
    }

    /// String value of `name`, interned; `None` when absent or empty.
    fn attr_string(
        &mut self,
        entry: &DebuggingInformationEntry<'_, '_, OwnedReader>,
        name: DwAt,
    ) -> IndexResult<Option<Arc<str>>>
    {
        let Some(attr) = entry
            .attr(name)
            .map_err(|err| IndexError::dwarf("reading string attribute", err))?
        else {
            return Ok(None);
        };
        let reader = self
            .dwarf
            .attr_string(self.unit, attr.value())
            .map_err(|err| IndexError::dwarf("resolving DWARF string", err))?;
        let text = reader
            .to_string_lossy()
            .map_err(|err| IndexError::dwarf("decoding DWARF string", err))?;
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.pool.intern(&text)))
    }
}

/// Same-unit target of `DW_AT_specification`, else of `DW_AT_abstract_origin`.
fn origin(entry: &DebuggingInformationEntry<'_, '_, OwnedReader>) -> IndexResult<Option<UnitOffset>>
{
    for name in [constants::DW_AT_specification, constants::DW_AT_abstract_origin] {
        let value = entry
            .attr_value(name)
            .map_err(|err| IndexError::dwarf("reading DIE reference", err))?;
        if let Some(AttributeValue::UnitRef(offset)) = value {
            return Ok(Some(offset));
        }
    }
    Ok(None)
}

fn flag(entry: &DebuggingInformationEntry<'_, '_, OwnedReader>, name: DwAt) -> IndexResult<bool>
{
    let value = entry
        .attr(name)
        .map_err(|err| IndexError::dwarf("reading flag attribute", err))?
        .map(|attr| attr.value());
    Ok(matches!(value, Some(AttributeValue::Flag(true))))
}

fn is_type(tag: DwTag) -> bool
{
    matches!(
        tag,
        constants::DW_TAG_base_type
            | constants::DW_TAG_structure_type
            | constants::DW_TAG_class_type
            | constants::DW_TAG_union_type
            | constants::DW_TAG_enumeration_type
            | constants::DW_TAG_interface_type
            | constants::DW_TAG_typedef
    )
}

fn is_indexed(tag: DwTag) -> bool
{
    is_type(tag)
        || matches!(
            tag,
            constants::DW_TAG_subprogram
                | constants::DW_TAG_variable
                | constants::DW_TAG_constant
                | constants::DW_TAG_enumerator
                | constants::DW_TAG_namespace
                | constants::DW_TAG_module
        )
}
