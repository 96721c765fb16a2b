use crate::accessor::{FieldAccessor, Record};
use crate::key::{display_value, CategoryKey, CategoryType};
use crate::model::{Point, Series};
use crate::series::SeriesDefinition;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// Records grouped by category.
///
/// Labels keep the order in which they are first seen among the records; the
/// grouping never sorts. Records whose category reads as null are left out.
#[derive(Debug, Clone)]
pub struct DataSet<'a> {
    records: &'a [Record],
    groups: IndexMap<CategoryKey, Vec<usize>>,
    // record index -> label slot in `groups`
    slots: Vec<Option<usize>>,
}

impl<'a> DataSet<'a> {
    pub fn new(records: &'a [Record], category: &FieldAccessor, kind: Option<CategoryType>) -> Self {
        let mut groups: IndexMap<CategoryKey, Vec<usize>> = IndexMap::new();
        let mut slots = Vec::with_capacity(records.len());

        for (idx, record) in records.iter().enumerate() {
            let key = CategoryKey::from_value(&category.evaluate(record), kind);
            if key.is_null() {
                log::debug!("Record #{} has no category for {:?}, skipping", idx, category);
                slots.push(None);
                continue;
            }
            let entry = groups.entry(key);
            slots.push(Some(entry.index()));
            entry.or_default().push(idx);
        }

        Self { records, groups, slots }
    }

    pub fn labels(&self) -> impl ExactSizeIterator<Item = &CategoryKey> + '_ {
        self.groups.keys()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn records(&self) -> &'a [Record] {
        self.records
    }

    /// Indices of the records filed under `key`, in input order
    pub fn group(&self, key: &CategoryKey) -> &[usize] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn groups(&self) -> impl Iterator<Item = (&CategoryKey, &[usize])> + '_ {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn first_index(&self, key: &CategoryKey) -> Option<usize> {
        self.group(key).first().copied()
    }

    /// One aligned series per definition (or per distinct name for
    /// record-dependent names), missing cells set to `fill`
    pub fn data(&self, defs: &[SeriesDefinition], fill: &Point) -> Vec<Series> {
        let labels: Vec<CategoryKey> = self.labels().cloned().collect();
        defs.iter()
            .flat_map(|def| self.cells(def))
            .map(|cells| cells.align(&labels, fill))
            .collect()
    }

    /// Fan a definition out into per-name cell maps, first-seen order.
    /// A later record for the same (category, name) replaces the earlier one.
    pub(crate) fn cells(&self, def: &SeriesDefinition) -> Vec<SeriesCells> {
        let mut fanout: IndexMap<String, SeriesCells> = IndexMap::new();

        for (idx, record) in self.records.iter().enumerate() {
            let Some(slot) = self.slots[idx] else { continue };
            let Some((label, _)) = self.groups.get_index(slot) else { continue };

            let name = def.name.resolve(record, idx);
            let target = fanout
                .entry(name.clone())
                .or_insert_with(|| SeriesCells::new(name, def, record));

            let point = def.point(record, label.to_value(), false);
            if target.cells.insert(label.clone(), point).is_some() {
                log::debug!(
                    "Record #{} overwrites series '{}' at category '{}'",
                    idx,
                    target.name,
                    label
                );
            }
        }

        fanout.into_values().collect()
    }

    /// Union of several groupings' labels, ordered by the first record
    /// carrying each label
    pub fn merge_labels(sets: &[&DataSet<'_>]) -> Vec<CategoryKey> {
        let mut firsts: Vec<(usize, &CategoryKey)> = sets
            .iter()
            .flat_map(|set| set.groups.iter().map(|(k, idx)| (idx[0], k)))
            .collect();
        firsts.sort_by_key(|(idx, _)| *idx);

        let merged: IndexSet<&CategoryKey> = firsts.into_iter().map(|(_, k)| k).collect();
        merged.into_iter().cloned().collect()
    }
}

/// Cells of one output series before alignment to the category axis
#[derive(Debug, Clone)]
pub(crate) struct SeriesCells {
    pub name: String,
    pub color: Option<String>,
    pub stack: Option<String>,
    pub cells: HashMap<CategoryKey, Point>,
}

impl SeriesCells {
    fn new(name: String, def: &SeriesDefinition, first: &Record) -> Self {
        Self {
            name,
            color: hint(def.color.as_ref(), first),
            stack: hint(def.stack.as_ref(), first),
            cells: HashMap::new(),
        }
    }

    pub fn align(mut self, labels: &[CategoryKey], fill: &Point) -> Series {
        let data = labels
            .iter()
            .map(|label| self.cells.remove(label).unwrap_or_else(|| fill.clone()))
            .collect();
        Series {
            name: self.name,
            color: self.color,
            stack: self.stack,
            key: None,
            data,
        }
    }
}

pub(crate) fn hint(accessor: Option<&FieldAccessor>, record: &Record) -> Option<String> {
    accessor
        .map(|a| display_value(&a.evaluate(record)))
        .filter(|s| !s.is_empty())
}
