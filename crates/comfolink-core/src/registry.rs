//! Point registry.
//!
//! Compiles a Register Map into per-category descriptor tables and computes
//! the minimal address envelope per register class. A [`Registry`] is
//! immutable once built; [`RegistryCell`] guarantees it is built at most once.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::classify::{classify, EntityCategory};
use crate::descriptor::{build_descriptor, EntityDescriptor};
use crate::error::{ClassificationGap, DefinitionError, DefinitionResult};
use crate::point::{AddressRange, PointDefinition, RegisterClass};
use crate::register_map;

/// Descriptors of one category, keyed by point key.
pub type CategoryTable = BTreeMap<String, EntityDescriptor>;

/// Compiled view of a Register Map.
#[derive(Debug, Clone)]
pub struct Registry {
    /// Point definitions in Register Map order
    points: Vec<PointDefinition>,
    /// key -> index into `points`
    index: HashMap<String, usize>,
    /// key -> category, for points that produced a descriptor
    categories: HashMap<String, EntityCategory>,
    tables: BTreeMap<EntityCategory, CategoryTable>,
    envelopes: BTreeMap<RegisterClass, AddressRange>,
    gaps: Vec<ClassificationGap>,
}

impl Registry {
    /// Build a registry in one pass over `points`.
    ///
    /// Definition errors abort the build. Points whose descriptor cannot be
    /// built are recorded as gaps and skipped.
    pub fn build<I>(points: I) -> DefinitionResult<Self>
    where
        I: IntoIterator<Item = PointDefinition>,
    {
        let mut registry = Self {
            points: Vec::new(),
            index: HashMap::new(),
            categories: HashMap::new(),
            tables: EntityCategory::ALL
                .iter()
                .map(|c| (*c, CategoryTable::new()))
                .collect(),
            envelopes: BTreeMap::new(),
            gaps: Vec::new(),
        };
        let mut occupied: BTreeMap<RegisterClass, Vec<(AddressRange, String)>> = BTreeMap::new();

        for point in points {
            let range = point.occupied_range()?;
            if registry.index.contains_key(&point.key) {
                return Err(DefinitionError::DuplicateKey(point.key));
            }

            registry
                .envelopes
                .entry(point.register_class)
                .and_modify(|env| *env = env.union(&range))
                .or_insert(range);
            occupied
                .entry(point.register_class)
                .or_default()
                .push((range, point.key.clone()));

            let category = classify(&point);
            match build_descriptor(&point, category) {
                Ok(descriptor) => {
                    debug!(
                        key = %point.key,
                        class = %point.register_class,
                        address = point.address,
                        category = %category,
                        "Descriptor built"
                    );
                    registry.categories.insert(point.key.clone(), category);
                    registry
                        .tables
                        .entry(category)
                        .or_default()
                        .insert(point.key.clone(), descriptor);
                }
                Err(reason) => {
                    let gap = ClassificationGap {
                        key: point.key.clone(),
                        reason,
                    };
                    warn!(key = %gap.key, reason = %gap.reason, "Point skipped");
                    registry.gaps.push(gap);
                }
            }

            registry.index.insert(point.key.clone(), registry.points.len());
            registry.points.push(point);
        }

        for (class, ranges) in occupied.iter_mut() {
            check_overlaps(*class, ranges)?;
        }

        registry.log_summary();
        Ok(registry)
    }

    fn log_summary(&self) {
        for (class, envelope) in &self.envelopes {
            debug!(
                class = %class,
                start = envelope.start,
                end = envelope.end,
                "Address envelope"
            );
        }
        let counts: Vec<String> = self
            .tables
            .iter()
            .map(|(category, table)| format!("{}={}", category, table.len()))
            .collect();
        debug!(
            points = self.points.len(),
            gaps = self.gaps.len(),
            categories = %counts.join(" "),
            "Registry built"
        );
    }

    /// Descriptors of one category. Every category has a table, possibly empty.
    pub fn category_table(&self, category: EntityCategory) -> Option<&CategoryTable> {
        self.tables.get(&category)
    }

    /// Minimal contiguous range covering all points of `class`.
    pub fn envelope(&self, class: RegisterClass) -> Option<AddressRange> {
        self.envelopes.get(&class).copied()
    }

    pub fn envelopes(&self) -> impl Iterator<Item = (RegisterClass, AddressRange)> + '_ {
        self.envelopes.iter().map(|(c, r)| (*c, *r))
    }

    pub fn point(&self, key: &str) -> Option<&PointDefinition> {
        self.index.get(key).map(|i| &self.points[*i])
    }

    /// All point definitions, in Register Map order.
    pub fn points(&self) -> &[PointDefinition] {
        &self.points
    }

    /// Points of one register class, in Register Map order.
    pub fn points_in(&self, class: RegisterClass) -> impl Iterator<Item = &PointDefinition> + '_ {
        self.points.iter().filter(move |p| p.register_class == class)
    }

    pub fn gaps(&self) -> &[ClassificationGap] {
        &self.gaps
    }

    pub fn category(&self, key: &str) -> Option<EntityCategory> {
        self.categories.get(key).copied()
    }

    pub fn descriptor(&self, key: &str) -> Option<&EntityDescriptor> {
        let category = self.category(key)?;
        self.tables.get(&category)?.get(key)
    }

    /// Number of points that produced a descriptor.
    pub fn descriptor_count(&self) -> usize {
        self.tables.values().map(BTreeMap::len).sum()
    }
}

/// Sort by start address and compare each range with the furthest-reaching
/// one seen so far.
fn check_overlaps(
    class: RegisterClass,
    ranges: &mut [(AddressRange, String)],
) -> DefinitionResult<()> {
    ranges.sort_by_key(|(r, _)| (r.start, r.end));

    let mut reach: Option<&(AddressRange, String)> = None;
    for entry in ranges.iter() {
        if let Some(prev) = reach {
            if prev.0.overlaps(&entry.0) {
                return Err(DefinitionError::Overlap {
                    class,
                    first: prev.1.clone(),
                    second: entry.1.clone(),
                    start: entry.0.start,
                    end: prev.0.end.min(entry.0.end),
                });
            }
        }
        if reach.map_or(true, |prev| entry.0.end > prev.0.end) {
            reach = Some(entry);
        }
    }
    Ok(())
}

/// Build-once holder for a [`Registry`].
///
/// Concurrent callers of [`get_or_build`](Self::get_or_build) block until the
/// single build finishes and then all observe the same instance. A failed
/// build leaves the cell empty.
#[derive(Debug, Default)]
pub struct RegistryCell {
    cell: OnceCell<Registry>,
}

impl RegistryCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// The registry, if already built.
    pub fn get(&self) -> Option<&Registry> {
        self.cell.get()
    }

    pub fn get_or_build<F, I>(&self, points: F) -> DefinitionResult<&Registry>
    where
        F: FnOnce() -> I,
        I: IntoIterator<Item = PointDefinition>,
    {
        self.cell.get_or_try_init(|| Registry::build(points()))
    }
}

static SHARED: RegistryCell = RegistryCell::new();

/// Process-wide registry over the ComfoConnect PRO Register Map.
pub fn shared() -> DefinitionResult<&'static Registry> {
    SHARED.get_or_build(register_map::comfoconnect_pro_points)
}
