use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::issue::Issue;
use crate::issue::key_number;
use crate::issue::normalize_issue;
use crate::status::classify;

/// Hierarchical view of a flat tracker search result.
///
/// Every non-epic input issue appears exactly once: nested under its epic,
/// nested under a standalone top-level issue, or as a standalone top-level
/// issue itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTree {
    pub epics: Vec<Issue>,
    pub standalone_tasks: Vec<Issue>,
}

/// Ordering by numeric key suffix ascending, so `PROJ-7` comes before
/// `PROJ-12`. Keys without a parseable suffix sort last, by key.
fn compare_by_key_number(a: &Issue, b: &Issue) -> Ordering {
    let a_num = key_number(&a.key).unwrap_or(u64::MAX);
    let b_num = key_number(&b.key).unwrap_or(u64::MAX);
    a_num.cmp(&b_num).then_with(|| a.key.cmp(&b.key))
}

/// Ordering for sibling issues under an epic or at the top level: severity
/// tier first, then numeric key suffix.
fn compare_siblings(a: &Issue, b: &Issue) -> Ordering {
    let a_tier = classify(&a.issue_type.name, &a.status.name).rank();
    let b_tier = classify(&b.issue_type.name, &b.status.name).rank();
    a_tier
        .cmp(&b_tier)
        .then_with(|| compare_by_key_number(a, b))
}

/// Collect the recursively-built subtask chain of `parent_key`.
fn attach_subtasks(parent_key: &str, issues: &[Issue]) -> Vec<Issue> {
    let mut children: Vec<Issue> = issues
        .iter()
        .filter(|issue| issue.parent_key.as_deref() == Some(parent_key))
        .cloned()
        .collect();
    for child in &mut children {
        child.children = attach_subtasks(&child.key, issues);
    }
    children.sort_by(compare_siblings);
    children
}

/// Reconstruct the epic -> story/task -> subtask hierarchy from the flat
/// list of raw search records.
///
/// Never errors: malformed records are normalized to placeholder values and
/// the partition stays total. An issue carrying both a resolvable parent
/// link and an epic link is placed by its parent link; the epic link is
/// ignored in that case.
pub fn build_tree(raw_issues: &[Value]) -> IssueTree {
    let issues: Vec<Issue> = raw_issues.iter().map(normalize_issue).collect();

    let epic_keys: HashSet<&str> = issues
        .iter()
        .filter(|issue| issue.is_epic())
        .map(|issue| issue.key.as_str())
        .collect();
    let by_key: HashMap<&str, &Issue> = issues
        .iter()
        .map(|issue| (issue.key.as_str(), issue))
        .collect();

    // A parent link only counts when the parent record is present; an epic
    // link only counts when it points at an epic in this result set.
    let has_parent = |issue: &Issue| {
        issue
            .parent_key
            .as_deref()
            .is_some_and(|key| by_key.contains_key(key))
    };
    fn epic_of<'i>(issue: &'i Issue, epic_keys: &HashSet<&str>) -> Option<&'i str> {
        issue
            .epic_key
            .as_deref()
            .filter(|key| epic_keys.contains(key))
    }

    let mut epics: Vec<Issue> = issues
        .iter()
        .filter(|issue| issue.is_epic())
        .cloned()
        .collect();
    for epic in &mut epics {
        let mut children: Vec<Issue> = issues
            .iter()
            .filter(|issue| {
                !issue.is_epic()
                    && !has_parent(issue)
                    && epic_of(issue, &epic_keys) == Some(epic.key.as_str())
            })
            .cloned()
            .collect();
        for child in &mut children {
            child.children = attach_subtasks(&child.key, &issues);
        }
        children.sort_by(compare_siblings);
        epic.children = children;
    }
    epics.sort_by(compare_by_key_number);

    let mut standalone_tasks: Vec<Issue> = issues
        .iter()
        .filter(|issue| !issue.is_epic() && !has_parent(issue) && epic_of(issue, &epic_keys).is_none())
        .cloned()
        .collect();
    for task in &mut standalone_tasks {
        task.children = attach_subtasks(&task.key, &issues);
    }
    standalone_tasks.sort_by(compare_siblings);

    IssueTree {
        epics,
        standalone_tasks,
    }
}
