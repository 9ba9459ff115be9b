//! Ordering and grouping of classified records

use serde::Serialize;
use std::collections::HashMap;

use crate::change_record::{ChangeRecord, TemplateItem};
use crate::config::{Grouping, SortDirection};
use crate::urls::GitUrls;

/// Records sharing a group name, in display order
#[derive(Debug, Clone, PartialEq)]
pub struct RecordGroup {
    pub name: String,
    pub records: Vec<ChangeRecord>,
}

/// Sort records by timestamp.
///
/// Order between records with equal timestamps is whatever order they were
/// collected in, which is not deterministic across runs.
pub fn sort_records(records: &mut [ChangeRecord], direction: SortDirection) {
    match direction {
        SortDirection::Descending => records.sort_by(|a, b| b.timestamp().cmp(&a.timestamp())),
        SortDirection::Ascending => records.sort_by(|a, b| a.timestamp().cmp(&b.timestamp())),
    }
}

/// Partition records by group, following the declaration order of `groupings`.
///
/// Ungrouped records are left out. Groupings with no name or no matching
/// records are skipped. Relative order within a group is preserved.
pub fn group_records(records: &[ChangeRecord], groupings: &[Grouping]) -> Vec<RecordGroup> {
    let mut by_name: HashMap<&str, Vec<ChangeRecord>> = HashMap::new();
    for record in records {
        let group = record.group();
        if !group.is_empty() {
            by_name.entry(group).or_default().push(record.clone());
        }
    }

    let mut groups = Vec::new();
    for grouping in groupings {
        if grouping.name.is_empty() {
            continue;
        }
        if let Some(records) = by_name.remove(grouping.name.as_str()) {
            log::debug!(
                "Found template grouping data: name={} count={}",
                grouping.name,
                records.len()
            );
            groups.push(RecordGroup {
                name: grouping.name.clone(),
                records,
            });
        }
    }
    groups
}

/// Group of items handed to templates
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TemplateGroup {
    pub name: String,
    pub items: Vec<TemplateItem>,
}

/// Everything a changelog template can reference
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TemplateData {
    /// Target version label (`to`)
    pub version: String,
    /// Previous version label (`from`)
    pub previous_version: String,
    pub items: Vec<TemplateItem>,
    pub grouped: Vec<TemplateGroup>,
    pub compare_url: String,
    pub diff_url: String,
    pub patch_url: String,
}

/// Sort, group and flatten records into template data
pub fn build_template_data(
    mut records: Vec<ChangeRecord>,
    groupings: &[Grouping],
    direction: SortDirection,
    from: &str,
    to: &str,
    urls: GitUrls,
) -> TemplateData {
    sort_records(&mut records, direction);
    let grouped = group_records(&records, groupings)
        .into_iter()
        .map(|g| TemplateGroup {
            name: g.name,
            items: g.records.iter().map(TemplateItem::from).collect(),
        })
        .collect();

    TemplateData {
        version: to.to_string(),
        previous_version: from.to_string(),
        items: records.iter().map(TemplateItem::from).collect(),
        grouped,
        compare_url: urls.compare_url,
        diff_url: urls.diff_url,
        patch_url: urls.patch_url,
    }
}
