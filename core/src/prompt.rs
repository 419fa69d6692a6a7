use planmate_tracker::Issue;
use planmate_tracker::IssueDetail;

/// Label under which glossary text is appended to the system prompt.
const GLOSSARY_LABEL: &str = "Информация о проекте: ";

/// The epic fields that end up in the prompt, whether they come from the
/// issue itself (the issue is the epic) or from a detail lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpicContext {
    pub key: String,
    pub summary: String,
    pub description: String,
    pub issue_type_name: String,
}

impl From<&Issue> for EpicContext {
    fn from(issue: &Issue) -> Self {
        Self {
            key: issue.key.clone(),
            summary: issue.summary.clone(),
            description: issue.description.clone(),
            issue_type_name: issue.issue_type.name.clone(),
        }
    }
}

impl From<IssueDetail> for EpicContext {
    fn from(detail: IssueDetail) -> Self {
        Self {
            key: detail.key,
            summary: detail.summary,
            description: detail.description,
            issue_type_name: detail.issue_type.name,
        }
    }
}

pub fn format_epic_block(epic: &EpicContext) -> String {
    format!(
        "Тип задачи: {}\nНомер задачи: {}\nНаименование задачи: {}\nОписание задачи: {}\n",
        epic.issue_type_name, epic.key, epic.summary, epic.description
    )
}

/// Layered system prompt, concatenated in fixed order: instructions, then
/// epic context, then glossary. Ephemeral; rebuilt on every AI-assist call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptContext {
    pub base_instructions: String,
    pub epic_block: Option<String>,
    pub glossary_block: Option<String>,
}

impl PromptContext {
    /// Render the final system prompt. Never empty: the base instructions
    /// are always present.
    pub fn render(&self) -> String {
        let mut prompt = self.base_instructions.clone();
        if let Some(epic) = &self.epic_block {
            prompt.push_str("\n\n");
            prompt.push_str(epic);
        }
        if let Some(glossary) = &self.glossary_block {
            prompt.push_str("\n\n");
            prompt.push_str(GLOSSARY_LABEL);
            prompt.push_str(glossary);
        }
        prompt
    }
}

/// Fixed-shape user turn describing the issue under edit.
pub fn format_user_message(issue: &Issue) -> String {
    let description = issue.description.trim();
    let description = if description.is_empty() {
        "Описание отсутствует"
    } else {
        description
    };
    format!(
        "Тип задачи: {}. Номер задачи: {}. Наименование задачи: {}. Описание задачи: {description}",
        issue.issue_type.name, issue.key, issue.summary
    )
}
