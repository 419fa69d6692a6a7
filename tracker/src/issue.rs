use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// `PROJECT-NUMBER` shape of a tracker issue key.
static ISSUE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9]*-\d+$").unwrap());

/// Issue type as shown in the dashboard badges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTypeInfo {
    pub name: String,
    pub icon_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    pub name: String,
}

/// One issue, normalized from a raw tracker search record.
///
/// `parent_key` links a subtask to its direct parent; `epic_key` links a
/// story or task to its owning epic. `children` is empty until the record is
/// placed into a tree by [`crate::build_tree`]. Tree building layers new
/// composite values over the flat records, it never mutates them in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub key: String,
    pub summary: String,
    pub issue_type: IssueTypeInfo,
    pub status: StatusInfo,
    pub parent_key: Option<String>,
    pub epic_key: Option<String>,
    pub description: String,
    #[serde(default)]
    pub children: Vec<Issue>,
}

impl Issue {
    pub fn is_epic(&self) -> bool {
        self.issue_type.name.trim().eq_ignore_ascii_case("epic")
    }
}

/// File attached to an issue, as exposed to the proxy download endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    pub url: String,
    pub size: u64,
    pub mime_type: String,
}

/// Detail view of a single issue returned by [`crate::TrackerClient::get_issue_detail`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDetail {
    pub key: String,
    pub summary: String,
    pub description: String,
    pub issue_type: IssueTypeInfo,
    pub status: StatusInfo,
    pub parent_key: Option<String>,
    pub parent_summary: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub url: String,
}

/// Numeric suffix of an issue key: `PROJ-12` -> `12`.
///
/// Used for ordering; lexical comparison would put `PROJ-12` before `PROJ-7`.
pub fn key_number(key: &str) -> Option<u64> {
    key.rsplit_once('-')?.1.parse().ok()
}

fn str_field(fields: &Value, name: &str) -> Option<String> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn epic_key_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if ISSUE_KEY_RE.is_match(s) => Some(s.clone()),
        Value::Object(_) => value
            .get("key")
            .and_then(Value::as_str)
            .map(str::to_owned),
        _ => None,
    }
}

/// Resolve the epic link out of a raw `fields` object.
///
/// Checks the primary field, then two known fallback names, then scans every
/// field whose name contains "epic" for a key-shaped value. The scan is a
/// compatibility shim for upstream instances that expose the epic link under
/// an instance-specific custom field; it is not a general reflection
/// mechanism.
fn resolve_epic_key(fields: &Value) -> Option<String> {
    for name in ["epic", "epicKey", "customfield_10014"] {
        if let Some(key) = fields.get(name).and_then(epic_key_from_value) {
            return Some(key);
        }
    }

    let object = fields.as_object()?;
    for (name, value) in object {
        if !name.to_ascii_lowercase().contains("epic") {
            continue;
        }
        if let Some(key) = epic_key_from_value(value) {
            return Some(key);
        }
    }
    None
}

/// Normalize one raw search record into an [`Issue`].
///
/// Never fails: unresolvable fields collapse to `"Unknown"`/empty
/// placeholders so a single malformed record cannot take down the dashboard.
pub fn normalize_issue(raw: &Value) -> Issue {
    static EMPTY: Value = Value::Null;
    let fields = raw.get("fields").unwrap_or(&EMPTY);

    let issue_type = IssueTypeInfo {
        name: fields
            .get("issuetype")
            .and_then(|t| t.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_owned(),
        icon_url: fields
            .get("issuetype")
            .and_then(|t| t.get("iconUrl"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
    };
    let status = StatusInfo {
        name: fields
            .get("status")
            .and_then(|s| s.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_owned(),
    };
    let parent_key = fields
        .get("parent")
        .and_then(|p| p.get("key"))
        .and_then(Value::as_str)
        .map(str::to_owned);

    Issue {
        key: raw
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        summary: str_field(fields, "summary").unwrap_or_else(|| "Unknown".to_owned()),
        issue_type,
        status,
        parent_key,
        epic_key: resolve_epic_key(fields),
        description: str_field(fields, "description").unwrap_or_default(),
        children: Vec::new(),
    }
}
