//! Question entries (multiple choice, true/false, drag-the-words) and the
//! question-set chapter that bundles them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use booklet_shared::{ImageInput, ImageReference};

use crate::node::ContentNode;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A boolean that may arrive as `true` or as `"true"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    pub fn is_set(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(text) => matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "true" | "wahr" | "yes" | "ja" | "1"
            ),
        }
    }
}

impl Default for Flag {
    fn default() -> Self {
        Self::Bool(false)
    }
}

/// One answer option of a multiple-choice question.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerInput {
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "is_correct")]
    pub correct: Flag,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub tip: String,
}

/// A question record, dispatched on its `type` tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionInput {
    #[serde(rename = "multichoice", alias = "MultipleChoice", alias = "multiple_choice")]
    MultiChoice {
        #[serde(default)]
        question: String,
        #[serde(default, alias = "options")]
        answers: Vec<AnswerInput>,
    },
    #[serde(rename = "truefalse", alias = "TrueFalse", alias = "true_false")]
    TrueFalse {
        #[serde(default)]
        question: String,
        #[serde(default)]
        correct: Flag,
        #[serde(default)]
        feedback_correct: String,
        #[serde(default)]
        feedback_wrong: String,
    },
}

/// A drag-the-words task record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DragTextInput {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub text_content: String,
    #[serde(default)]
    pub distractors: String,
}

/// Intro screen record shared by quiz and cloze chapters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntroScreenInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub background_image: Option<ImageInput>,
}

/// `question_set` chapter record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionSetInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub intro_screen: IntroScreenInput,
    #[serde(default)]
    pub questions: Vec<Value>,
    #[serde(default)]
    pub pool_size: Option<usize>,
}

/// `cloze_set` chapter record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClozeSetInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub intro_screen: IntroScreenInput,
    #[serde(default)]
    pub tasks: Vec<Value>,
}

// ---------------------------------------------------------------------------
// Multiple choice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TipsAndFeedback {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tip: String,
    pub chosen_feedback: String,
    pub not_chosen_feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub text: String,
    pub correct: bool,
    pub tips_and_feedback: TipsAndFeedback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiChoiceBehaviour {
    pub single_answer: bool,
    pub enable_retry: bool,
    pub enable_check_button: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiChoiceUi {
    check_answer_button: &'static str,
    show_solution_button: &'static str,
    try_again_button: &'static str,
    correct_answer: &'static str,
    wrong_answer: &'static str,
}

pub const MULTI_CHOICE_UI: MultiChoiceUi = MultiChoiceUi {
    check_answer_button: "Überprüfen",
    show_solution_button: "Lösung anzeigen",
    try_again_button: "Wiederholen",
    correct_answer: "Richtige Antwort",
    wrong_answer: "Falsche Antwort",
};

/// `H5P.MultiChoice` parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiChoiceParams {
    pub question: String,
    pub answers: Vec<Answer>,
    pub behaviour: MultiChoiceBehaviour,
    #[serde(rename = "UI")]
    pub ui: MultiChoiceUi,
}

// ---------------------------------------------------------------------------
// True / false
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalseBehaviour {
    pub feedback_on_correct: String,
    pub feedback_on_wrong: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalseL10n {
    true_text: &'static str,
    false_text: &'static str,
}

pub const TRUE_FALSE_L10N: TrueFalseL10n = TrueFalseL10n {
    true_text: "Wahr",
    false_text: "Falsch",
};

/// `H5P.TrueFalse` parameters. `correct` is the string `"true"` or `"false"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrueFalseParams {
    pub question: String,
    pub correct: String,
    pub behaviour: TrueFalseBehaviour,
    pub l10n: TrueFalseL10n,
}

// ---------------------------------------------------------------------------
// Drag text
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragTextBehaviour {
    pub enable_retry: bool,
    pub enable_solutions_button: bool,
    pub enable_check_button: bool,
    pub instant_feedback: bool,
}

/// `H5P.DragText` parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragTextParams {
    pub task_description: String,
    pub text_field: String,
    pub distractors: String,
    pub behaviour: DragTextBehaviour,
    check_answer: &'static str,
    submit_answer: &'static str,
    try_again: &'static str,
    show_solution: &'static str,
    score_bar_label: &'static str,
}

// ---------------------------------------------------------------------------
// Question mapping
// ---------------------------------------------------------------------------

fn paragraph(text: &str) -> String {
    if text.trim_start().starts_with('<') {
        text.to_string()
    } else {
        format!("<p>{text}</p>")
    }
}

/// Map one typed question record to its node.
pub fn build_question(input: QuestionInput) -> ContentNode {
    match input {
        QuestionInput::MultiChoice { question, answers } => {
            let correct_count = answers.iter().filter(|a| a.correct.is_set()).count();
            let answers = answers
                .into_iter()
                .map(|a| Answer {
                    correct: a.correct.is_set(),
                    tips_and_feedback: TipsAndFeedback {
                        tip: a.tip,
                        chosen_feedback: if a.feedback.is_empty() {
                            String::new()
                        } else {
                            format!("<div>{}</div>", a.feedback)
                        },
                        not_chosen_feedback: String::new(),
                    },
                    text: a.text,
                })
                .collect();

            ContentNode::new(
                MultiChoiceParams {
                    question: paragraph(&question),
                    answers,
                    behaviour: MultiChoiceBehaviour {
                        single_answer: correct_count <= 1,
                        enable_retry: false,
                        enable_check_button: true,
                    },
                    ui: MULTI_CHOICE_UI,
                },
                "MC",
            )
        }
        QuestionInput::TrueFalse {
            question,
            correct,
            feedback_correct,
            feedback_wrong,
        } => ContentNode::new(
            TrueFalseParams {
                question: paragraph(&question),
                correct: correct.is_set().to_string(),
                behaviour: TrueFalseBehaviour {
                    feedback_on_correct: feedback_correct,
                    feedback_on_wrong: feedback_wrong,
                },
                l10n: TRUE_FALSE_L10N,
            },
            "TF",
        ),
    }
}

/// Map raw question records, dropping unknown or malformed ones.
pub fn map_questions(values: &[Value]) -> Vec<ContentNode> {
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            match serde_json::from_value::<QuestionInput>(value.clone()) {
                Ok(question) => Some(build_question(question)),
                Err(e) => {
                    let kind = value.get("type").and_then(Value::as_str).unwrap_or("<none>");
                    warn!(index, kind, error = %e, "dropping unsupported question");
                    None
                }
            }
        })
        .collect()
}

/// Build a drag-the-words node.
pub fn build_drag_text(input: DragTextInput) -> ContentNode {
    let title = if input.description.trim().is_empty() {
        "Cloze".to_string()
    } else {
        input.description.clone()
    };

    ContentNode::new(
        DragTextParams {
            task_description: format!("<p>{}</p>", input.description),
            text_field: input.text_content,
            distractors: input.distractors,
            behaviour: DragTextBehaviour {
                enable_retry: true,
                enable_solutions_button: false,
                enable_check_button: true,
                instant_feedback: false,
            },
            check_answer: "Überprüfen",
            submit_answer: "Absenden",
            try_again: "Wiederholen",
            show_solution: "Lösung anzeigen",
            score_bar_label: "Du hast :num von :total Punkten erreicht.",
        },
        title,
    )
}

/// Map raw drag-text task records, dropping malformed ones.
pub fn map_drag_texts(values: &[Value]) -> Vec<ContentNode> {
    values
        .iter()
        .enumerate()
        .filter_map(
            |(index, value)| match serde_json::from_value::<DragTextInput>(value.clone()) {
                Ok(task) => Some(build_drag_text(task)),
                Err(e) => {
                    warn!(index, error = %e, "dropping malformed drag-text task");
                    None
                }
            },
        )
        .collect()
}

// ---------------------------------------------------------------------------
// Question set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntroPage {
    pub show_intro_page: bool,
    pub start_button_text: String,
    pub title: String,
    pub introduction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<ImageReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideSettings {
    pub check_button: bool,
    pub show_solution_button: &'static str,
    pub retry_button: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSetTexts {
    prev_button: &'static str,
    next_button: &'static str,
    finish_button: &'static str,
    submit_button: &'static str,
    textual_progress: &'static str,
    question_label: &'static str,
}

pub const QUESTION_SET_TEXTS: QuestionSetTexts = QuestionSetTexts {
    prev_button: "Zurück",
    next_button: "Weiter",
    finish_button: "Beenden",
    submit_button: "Absenden",
    textual_progress: "Frage @current von @total",
    question_label: "Frage",
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndGame {
    pub show_result_page: bool,
    pub show_solution_button: bool,
    pub show_retry_button: bool,
    pub message: &'static str,
    pub score_bar_label: &'static str,
}

/// `H5P.QuestionSet` parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSetParams {
    pub intro_page: IntroPage,
    pub progress_type: &'static str,
    pub pass_percentage: u8,
    pub questions: Vec<ContentNode>,
    pub pool_size: usize,
    pub random_questions: bool,
    #[serde(rename = "override")]
    pub override_settings: OverrideSettings,
    pub texts: QuestionSetTexts,
    pub end_game: EndGame,
}

/// Quiz (choice questions) or cloze (drag-the-words) flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionSetMode {
    Quiz,
    Cloze,
}

/// Knobs for [`build_question_set`].
#[derive(Debug, Clone)]
pub struct QuestionSetOptions {
    pub mode: QuestionSetMode,
    /// Requested pool; clamped to the number of questions. Ignored for cloze.
    pub forced_pool: Option<usize>,
    pub pass_percentage: u8,
}

/// Number of questions drawn per attempt.
///
/// Defaults to `count`; a forced value is clamped to `count`. Zero means
/// "not forced".
pub fn resolve_pool_size(count: usize, forced: Option<usize>) -> usize {
    match forced.filter(|&f| f > 0) {
        Some(f) => f.min(count),
        None => count,
    }
}

/// Build a question-set chapter. Returns `None` when no question survived
/// mapping.
pub fn build_question_set(
    title: &str,
    intro: &IntroScreenInput,
    questions: Vec<ContentNode>,
    options: &QuestionSetOptions,
) -> Option<ContentNode> {
    if questions.is_empty() {
        warn!(title, "question set has no usable questions, skipping chapter");
        return None;
    }

    let cloze = options.mode == QuestionSetMode::Cloze;
    let count = questions.len();
    let pool_size = if cloze {
        count
    } else {
        resolve_pool_size(count, options.forced_pool)
    };
    debug!(title, count, pool_size, cloze, "building question set");

    let params = QuestionSetParams {
        intro_page: IntroPage {
            show_intro_page: true,
            start_button_text: "Quiz starten".into(),
            title: intro
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Quiz".into()),
            introduction: format!("<p style='text-align:center'>{}</p>", intro.text),
            background_image: intro
                .background_image
                .clone()
                .and_then(ImageReference::from_input),
        },
        progress_type: if cloze { "dots" } else { "textual" },
        pass_percentage: options.pass_percentage,
        questions,
        pool_size,
        random_questions: pool_size < count,
        override_settings: OverrideSettings {
            check_button: true,
            show_solution_button: if cloze { "off" } else { "on" },
            retry_button: "on",
        },
        texts: QUESTION_SET_TEXTS,
        end_game: EndGame {
            show_result_page: true,
            show_solution_button: true,
            show_retry_button: true,
            message: "Dein Ergebnis:",
            score_bar_label: "Du hast @score von @total Punkten erreicht.",
        },
    };

    let set = ContentNode::new(params, title);
    Some(ContentNode::column(title, vec![set.into()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Params;
    use booklet_shared::LibraryId;
    use serde_json::json;

    fn quiz(forced_pool: Option<usize>) -> QuestionSetOptions {
        QuestionSetOptions {
            mode: QuestionSetMode::Quiz,
            forced_pool,
            pass_percentage: 50,
        }
    }

    fn sample_questions(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| {
                json!({
                    "type": "truefalse",
                    "question": format!("Frage {i}"),
                    "correct": i % 2 == 0
                })
            })
            .collect()
    }

    fn set_params(chapter: &ContentNode) -> &QuestionSetParams {
        match &chapter.params.children()[0].params {
            Params::QuestionSet(p) => p,
            other => panic!("expected question set, got {other:?}"),
        }
    }

    #[test]
    fn multichoice_mapping() {
        let nodes = map_questions(&[json!({
            "type": "multichoice",
            "question": "Wer?",
            "answers": [
                {"text": "A", "correct": true, "feedback": "Genau"},
                {"text": "B", "correct": false}
            ]
        })]);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].library, LibraryId::MULTI_CHOICE);

        let json = serde_json::to_value(&nodes[0]).unwrap();
        assert_eq!(json["params"]["question"], "<p>Wer?</p>");
        assert_eq!(
            json["params"]["answers"][0]["tipsAndFeedback"]["chosenFeedback"],
            "<div>Genau</div>"
        );
        assert_eq!(json["params"]["behaviour"]["singleAnswer"], true);
        assert_eq!(json["params"]["UI"]["checkAnswerButton"], "Überprüfen");
        assert_eq!(json["metadata"]["title"], "MC");
    }

    #[test]
    fn option_aliases_are_accepted() {
        let nodes = map_questions(&[json!({
            "type": "MultipleChoice",
            "question": "<p>Schon markiert</p>",
            "options": [
                {"text": "A", "is_correct": true},
                {"text": "B", "is_correct": "true"}
            ]
        })]);
        match &nodes[0].params {
            Params::MultiChoice(p) => {
                assert_eq!(p.question, "<p>Schon markiert</p>");
                assert!(p.answers.iter().all(|a| a.correct));
                assert!(!p.behaviour.single_answer);
            }
            other => panic!("expected multichoice, got {other:?}"),
        }
    }

    #[test]
    fn true_false_correct_is_a_string() {
        let nodes = map_questions(&[json!({
            "type": "truefalse",
            "question": "Stimmt das?",
            "correct": false,
            "feedback_correct": "Ja",
            "feedback_wrong": "Nein"
        })]);
        let json = serde_json::to_value(&nodes[0]).unwrap();
        assert_eq!(json["library"], "H5P.TrueFalse 1.8");
        assert_eq!(json["params"]["correct"], "false");
        assert_eq!(json["params"]["behaviour"]["feedbackOnWrong"], "Nein");
        assert_eq!(json["params"]["l10n"]["trueText"], "Wahr");
    }

    #[test]
    fn unknown_types_are_dropped() {
        let nodes = map_questions(&[
            json!({"type": "essay", "question": "?"}),
            json!({"question": "no type"}),
            json!("not an object"),
            json!({"type": "truefalse", "question": "ok"}),
        ]);
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn drag_text_mapping() {
        let nodes = map_drag_texts(&[
            json!({"description": "Ergänze", "text_content": "Der *Hund* bellt.", "distractors": "*Katze*"}),
            json!({"text_content": "Ohne Beschreibung *x*"}),
        ]);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].title(), Some("Ergänze"));
        assert_eq!(nodes[1].title(), Some("Cloze"));

        let json = serde_json::to_value(&nodes[0]).unwrap();
        assert_eq!(json["params"]["taskDescription"], "<p>Ergänze</p>");
        assert_eq!(json["params"]["textField"], "Der *Hund* bellt.");
        assert_eq!(json["params"]["behaviour"]["instantFeedback"], false);
        assert_eq!(json["params"]["checkAnswer"], "Überprüfen");
    }

    #[test]
    fn pool_size_clamps() {
        assert_eq!(resolve_pool_size(8, None), 8);
        assert_eq!(resolve_pool_size(8, Some(5)), 5);
        assert_eq!(resolve_pool_size(3, Some(5)), 3);
        assert_eq!(resolve_pool_size(3, Some(0)), 3);
    }

    #[test]
    fn quiz_set_draws_subset() {
        let questions = map_questions(&sample_questions(8));
        let chapter =
            build_question_set("Quiz", &IntroScreenInput::default(), questions, &quiz(Some(5)))
                .unwrap();
        let params = set_params(&chapter);
        assert_eq!(params.pool_size, 5);
        assert!(params.random_questions);
        assert_eq!(params.progress_type, "textual");
        assert_eq!(params.override_settings.show_solution_button, "on");
        assert_eq!(params.intro_page.title, "Quiz");
    }

    #[test]
    fn short_quiz_uses_every_question() {
        let questions = map_questions(&sample_questions(3));
        let chapter =
            build_question_set("Quiz", &IntroScreenInput::default(), questions, &quiz(Some(5)))
                .unwrap();
        let params = set_params(&chapter);
        assert_eq!(params.pool_size, 3);
        assert!(!params.random_questions);
    }

    #[test]
    fn cloze_set_uses_all_tasks() {
        let tasks = map_drag_texts(&[json!({"text_content": "*a*"}), json!({"text_content": "*b*"})]);
        let options = QuestionSetOptions {
            mode: QuestionSetMode::Cloze,
            forced_pool: Some(1),
            pass_percentage: 50,
        };
        let intro: IntroScreenInput = serde_json::from_value(json!({
            "title": "Lückentext",
            "text": "Zieh die Wörter",
            "background_image": "images/bg.jpg"
        }))
        .unwrap();
        let chapter = build_question_set("Cloze", &intro, tasks, &options).unwrap();
        let params = set_params(&chapter);
        assert_eq!(params.pool_size, 2);
        assert_eq!(params.progress_type, "dots");
        assert_eq!(params.override_settings.show_solution_button, "off");
        assert_eq!(
            params.intro_page.introduction,
            "<p style='text-align:center'>Zieh die Wörter</p>"
        );
        assert_eq!(
            params.intro_page.background_image.as_ref().unwrap().path,
            "images/bg.jpg"
        );
    }

    #[test]
    fn empty_set_is_skipped() {
        assert!(build_question_set("Quiz", &IntroScreenInput::default(), vec![], &quiz(None)).is_none());
    }

    #[test]
    fn serialized_set_uses_h5p_keys() {
        let questions = map_questions(&sample_questions(2));
        let chapter =
            build_question_set("Quiz", &IntroScreenInput::default(), questions, &quiz(None))
                .unwrap();
        let json = serde_json::to_value(&chapter).unwrap();
        let params = &json["params"]["content"][0]["content"]["params"];
        assert_eq!(params["override"]["retryButton"], "on");
        assert_eq!(params["texts"]["textualProgress"], "Frage @current von @total");
        assert_eq!(params["endGame"]["message"], "Dein Ergebnis:");
        assert_eq!(params["poolSize"], 2);
        assert!(params["introPage"].get("backgroundImage").is_none());
    }
}
