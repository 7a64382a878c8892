//! Chapter dispatch: turns raw chapter records into a [`Book`].
//!
//! Records are processed in order. A record that is not an object, lacks a
//! known `type` tag, or has fields of the wrong shape is logged and skipped;
//! the rest of the book is still assembled.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use booklet_shared::{BookletError, ImageReference};

use crate::accordion::{AccordionChapterInput, build_accordion_chapter};
use crate::assignment::{AssignmentInput, build_assignment};
use crate::book::{Behaviour, Book, BookCover, CoverInput};
use crate::embed::{IframePageInput, build_iframe_page};
use crate::intro::{
    IntroductionData, PartNumeral, build_structured_introduction, build_template_introduction,
};
use crate::memory::{MemoryGameInput, build_memory_game};
use crate::node::ContentNode;
use crate::questions::{
    ClozeSetInput, QuestionSetInput, QuestionSetMode, QuestionSetOptions, build_question_set,
    map_drag_texts, map_questions,
};
use crate::summary::{SummaryChapterInput, build_summary};
use crate::video::{VideoPageInput, build_video_page};

/// One chapter record, dispatched on its `type` tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChapterInput {
    Introduction {
        #[serde(default)]
        data: Option<IntroductionData>,
        #[serde(default)]
        part: Option<PartNumeral>,
    },
    MemoryGame(MemoryGameInput),
    Accordion(AccordionChapterInput),
    VideoPage(VideoPageInput),
    QuestionSet(QuestionSetInput),
    ClozeSet(ClozeSetInput),
    IframePage(IframePageInput),
    Summary(SummaryChapterInput),
    Assignment(AssignmentInput),
}

impl ChapterInput {
    /// Parse one raw record.
    pub fn from_value(value: &Value) -> Result<Self, BookletError> {
        if !value.is_object() {
            return Err(BookletError::input("chapter entry is not an object"));
        }
        if value.get("type").and_then(Value::as_str).is_none() {
            return Err(BookletError::input("chapter entry has no type tag"));
        }
        Self::deserialize(value).map_err(|e| BookletError::input(e.to_string()))
    }
}

/// Book-level settings for [`assemble_book`].
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Book title; cover and assignment chapters fall back to it.
    pub title: String,
    pub cover: CoverInput,
    /// Cover image used when `cover.image` is absent.
    pub default_cover_image: String,
    /// Prepend the template introduction with this numeral.
    pub intro_part: Option<PartNumeral>,
    /// Override for the template introduction text.
    pub intro_template: Option<String>,
    pub behaviour: Behaviour,
    /// Forced pool for quiz chapters that set none themselves.
    pub quiz_pool_size: usize,
    pub pass_percentage: u8,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            title: "Interactive Book".into(),
            cover: CoverInput::default(),
            default_cover_image: "images/default_cover.png".into(),
            intro_part: None,
            intro_template: None,
            behaviour: Behaviour::default(),
            quiz_pool_size: 5,
            pass_percentage: 50,
        }
    }
}

/// The assembled book plus bookkeeping.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub book: Book,
    /// Records that produced a chapter.
    pub processed: usize,
    /// Records that were skipped.
    pub skipped: usize,
}

/// Assemble a book from raw chapter records.
#[instrument(skip_all, fields(title = %options.title, entries = entries.len()))]
pub fn assemble_book(entries: &[Value], options: &AssembleOptions) -> Assembly {
    let mut chapters: Vec<ContentNode> = Vec::new();
    let mut recap: Option<ContentNode> = None;
    let mut skipped = 0;

    for (index, entry) in entries.iter().enumerate() {
        let input = match ChapterInput::from_value(entry) {
            Ok(input) => input,
            Err(e) => {
                let kind = entry.get("type").and_then(Value::as_str).unwrap_or("<none>");
                warn!(index, kind, error = %e, "skipping chapter entry");
                skipped += 1;
                continue;
            }
        };

        match build_chapter(input, options, &mut recap) {
            Some(chapter) => {
                debug!(index, title = chapter.title().unwrap_or(""), "built chapter");
                chapters.push(chapter);
            }
            None => skipped += 1,
        }
    }

    let processed = chapters.len();

    match &options.intro_part {
        Some(part) => {
            chapters.insert(
                0,
                build_template_introduction(part, options.intro_template.as_deref()),
            );
        }
        None if chapters.is_empty() => {
            warn!("no chapters produced, inserting the template introduction");
            chapters.push(build_template_introduction(
                &PartNumeral::default(),
                options.intro_template.as_deref(),
            ));
        }
        None => {}
    }

    let cover_image = options
        .cover
        .image
        .clone()
        .and_then(ImageReference::from_input)
        .unwrap_or_else(|| ImageReference::new(options.default_cover_image.as_str()));
    let cover_title = options
        .cover
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(&options.title);
    let cover = BookCover::new(cover_title, options.cover.subtitle.as_deref(), cover_image);

    info!(
        chapters = chapters.len(),
        processed, skipped, "assembled book"
    );

    Assembly {
        book: Book::new(cover, chapters, options.behaviour.clone()),
        processed,
        skipped,
    }
}

fn build_chapter(
    input: ChapterInput,
    options: &AssembleOptions,
    recap: &mut Option<ContentNode>,
) -> Option<ContentNode> {
    match input {
        ChapterInput::Introduction { data: Some(data), .. } => {
            Some(build_structured_introduction(&data))
        }
        ChapterInput::Introduction { data: None, part } => Some(build_template_introduction(
            &part.unwrap_or_default(),
            options.intro_template.as_deref(),
        )),
        ChapterInput::MemoryGame(input) => Some(build_memory_game(input)),
        ChapterInput::Accordion(input) => {
            let (chapter, accordion) = build_accordion_chapter(&input);
            *recap = Some(accordion);
            Some(chapter)
        }
        ChapterInput::VideoPage(input) => {
            let page = build_video_page(&input);
            *recap = Some(page.accordion);
            Some(page.chapter)
        }
        ChapterInput::QuestionSet(input) => {
            let title = chapter_title(input.title.as_deref(), "Quiz");
            let questions = map_questions(&input.questions);
            build_question_set(
                &title,
                &input.intro_screen,
                questions,
                &QuestionSetOptions {
                    mode: QuestionSetMode::Quiz,
                    forced_pool: Some(input.pool_size.unwrap_or(options.quiz_pool_size)),
                    pass_percentage: options.pass_percentage,
                },
            )
        }
        ChapterInput::ClozeSet(input) => {
            let title = chapter_title(input.title.as_deref(), "Lückentext");
            let tasks = map_drag_texts(&input.tasks);
            build_question_set(
                &title,
                &input.intro_screen,
                tasks,
                &QuestionSetOptions {
                    mode: QuestionSetMode::Cloze,
                    forced_pool: None,
                    pass_percentage: options.pass_percentage,
                },
            )
        }
        ChapterInput::IframePage(input) => Some(build_iframe_page(&input, recap.as_ref())),
        ChapterInput::Summary(input) => Some(build_summary(&input)),
        ChapterInput::Assignment(input) => build_assignment(&input, &options.title),
    }
}

fn chapter_title(title: Option<&str>, fallback: &str) -> String {
    title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}
