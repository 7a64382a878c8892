//! Statement-picking summary chapter (`H5P.Summary`).
//!
//! Each task lists statements; the first one is the correct pick.

use serde::{Deserialize, Serialize};
use tracing::warn;

use booklet_shared::SubContentId;

use crate::node::ContentNode;

/// One task: statements to pick from, correct one first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryTaskInput {
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub tip: String,
}

/// `summary` chapter record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryChapterInput {
    #[serde(default)]
    pub title: Option<String>,
    /// HTML shown above the task.
    #[serde(default)]
    pub intro: Option<String>,
    /// Instruction inside the task itself.
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub tasks: Vec<SummaryTaskInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTask {
    pub summary: Vec<String>,
    #[serde(rename = "subContentId")]
    pub sub_content_id: SubContentId,
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRange {
    pub from: u8,
    pub to: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLabels {
    solved_label: &'static str,
    score_label: &'static str,
    result_label: &'static str,
    label_correct: &'static str,
    label_incorrect: &'static str,
    alternative_incorrect_label: &'static str,
    label_correct_answers: &'static str,
    tip_button_label: &'static str,
    score_bar_label: &'static str,
    progress_text: &'static str,
}

pub const SUMMARY_LABELS: SummaryLabels = SummaryLabels {
    solved_label: "Fortschritt:",
    score_label: "Falsche Antworten:",
    result_label: "Dein Ergebnis",
    label_correct: "Richtig.",
    label_incorrect: "Falsch! Bitte versuche es noch einmal.",
    alternative_incorrect_label: "Falsch",
    label_correct_answers: "Richtige Antwort(en).",
    tip_button_label: "Tipp anzeigen",
    score_bar_label: "Du hast :num von :total Punkten erreicht.",
    progress_text: "Fortschritt :num von :total",
};

/// `H5P.Summary` parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryParams {
    pub intro: String,
    pub summaries: Vec<SummaryTask>,
    pub overall_feedback: Vec<FeedbackRange>,
    #[serde(flatten)]
    pub labels: SummaryLabels,
}

/// Build the summary chapter.
pub fn build_summary(input: &SummaryChapterInput) -> ContentNode {
    let title = input
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Zusammenfassung".to_string());

    let mut summaries: Vec<SummaryTask> = input
        .tasks
        .iter()
        .map(|task| SummaryTask {
            summary: if task.choices.is_empty() {
                vec!["Placeholder - no choices provided".to_string()]
            } else {
                task.choices.clone()
            },
            sub_content_id: SubContentId::new(),
            tip: task.tip.clone(),
        })
        .collect();

    if summaries.is_empty() {
        warn!(title, "summary chapter has no tasks, adding a placeholder");
        summaries.push(SummaryTask {
            summary: vec!["Placeholder - no statements provided".to_string()],
            sub_content_id: SubContentId::new(),
            tip: "Input JSON had no summary tasks.".to_string(),
        });
    }

    let params = SummaryParams {
        intro: input
            .instruction
            .clone()
            .unwrap_or_else(|| "<p>Wähle die korrekte Aussage.</p>".to_string()),
        summaries,
        overall_feedback: vec![FeedbackRange { from: 0, to: 100 }],
        labels: SUMMARY_LABELS,
    };

    let mut items = Vec::new();
    if let Some(intro) = input.intro.as_deref().filter(|t| !t.trim().is_empty()) {
        items.push(ContentNode::text(intro, "Zusammenfassung Einleitung").into());
    }
    items.push(ContentNode::new(params, title.clone()).into());

    ContentNode::column(title, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Params;

    #[test]
    fn builds_one_task_per_input() {
        let input: SummaryChapterInput = serde_json::from_str(
            r#"{"title": "Aussagen", "intro": "<h2>Zusammenfassung</h2>",
                "tasks": [{"choices": ["Richtig", "Falsch"]}, {"choices": ["A", "B"], "tip": "Denk nach"}]}"#,
        )
        .unwrap();
        let chapter = build_summary(&input);
        let children = chapter.params.children();
        assert_eq!(children.len(), 2);

        match &children[1].params {
            Params::Summary(p) => {
                assert_eq!(p.summaries.len(), 2);
                assert_eq!(p.summaries[0].summary[0], "Richtig");
                assert_eq!(p.summaries[1].tip, "Denk nach");
                assert_ne!(p.summaries[0].sub_content_id, p.summaries[1].sub_content_id);
            }
            other => panic!("expected summary, got {other:?}"),
        }
    }

    #[test]
    fn empty_task_list_gets_placeholder() {
        let chapter = build_summary(&SummaryChapterInput::default());
        let children = chapter.params.children();
        assert_eq!(children.len(), 1);

        let json = serde_json::to_value(children[0]).unwrap();
        assert_eq!(json["library"], "H5P.Summary 1.10");
        assert_eq!(json["params"]["summaries"].as_array().unwrap().len(), 1);
        assert_eq!(json["params"]["tipButtonLabel"], "Tipp anzeigen");
        assert_eq!(json["params"]["overallFeedback"][0]["to"], 100);
    }
}
