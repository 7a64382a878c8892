//! Memory-game chapter.
//!
//! Cards are paired positionally: entries `2i` and `2i+1` form one pair, the
//! first being the card image and the second its match. A trailing card
//! without a partner is dropped.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use booklet_shared::{ImageInput, ImageReference};

use crate::node::{ColumnItem, ContentNode};

/// Card back used when a request names none.
pub const DEFAULT_CARD_BACK: &str = "images/card_back.png";

/// Theme color used when a request names none.
pub const DEFAULT_THEME_COLOR: &str = "#002f6c";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One memory card as it arrives: `{"image": ...}` or a bare image.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CardEntry {
    Wrapped { image: ImageInput },
    Bare(ImageInput),
}

impl CardEntry {
    fn into_image(self) -> ImageInput {
        match self {
            Self::Wrapped { image } | Self::Bare(image) => image,
        }
    }
}

/// `memory_game` chapter record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryGameInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub cards: Vec<CardEntry>,
    #[serde(default, alias = "themeColor")]
    pub theme_color: Option<String>,
    #[serde(default)]
    pub card_back_image: Option<ImageInput>,
    #[serde(default, alias = "numCardsToUse")]
    pub num_cards_to_use: Option<usize>,
}

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

/// One card pair of an `H5P.MemoryGame`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryCard {
    pub image: ImageReference,
    #[serde(rename = "match")]
    pub match_image: ImageReference,
    pub image_alt: String,
    pub match_alt: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryBehaviour {
    pub use_grid: bool,
    pub allow_retry: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_cards_to_use: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookAndFeel {
    pub theme_color: String,
    pub card_back: ImageReference,
}

/// Fixed German UI strings of the memory game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryL10n {
    card_turns: &'static str,
    time_spent: &'static str,
    feedback: &'static str,
    try_again: &'static str,
    close_label: &'static str,
    label: &'static str,
    done: &'static str,
    card_prefix: &'static str,
    card_unturned: &'static str,
    card_matched: &'static str,
    card_turned: &'static str,
    #[serde(rename = "cardMatchedA11y")]
    card_matched_a11y: &'static str,
    #[serde(rename = "cardNotMatchedA11y")]
    card_not_matched_a11y: &'static str,
}

pub const MEMORY_L10N: MemoryL10n = MemoryL10n {
    card_turns: "Züge",
    time_spent: "Benötigte Zeit",
    feedback: "Gut gemacht!",
    try_again: "Nochmal spielen?",
    close_label: "Schließen",
    label: "Memory",
    done: "Du hast alle Kartenpaare gefunden!",
    card_prefix: "Karte %num:",
    card_unturned: "Zugedeckt.",
    card_matched: "Paar gefunden.",
    card_turned: "Umgedreht.",
    card_matched_a11y: "Match found",
    card_not_matched_a11y: "No match",
};

/// `H5P.MemoryGame` parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryGameParams {
    pub cards: Vec<MemoryCard>,
    pub behaviour: MemoryBehaviour,
    pub look_n_feel: LookAndFeel,
    pub l10n: MemoryL10n,
}

impl MemoryGameParams {
    pub(crate) fn images(&self) -> Vec<&ImageReference> {
        self.cards
            .iter()
            .flat_map(|card| [&card.image, &card.match_image])
            .chain(std::iter::once(&self.look_n_feel.card_back))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Pair up card entries. Returns `floor(len / 2)` pairs for well-formed input.
pub fn pair_cards(cards: Vec<CardEntry>) -> Vec<MemoryCard> {
    if cards.len() % 2 == 1 {
        debug!(count = cards.len(), "odd number of memory cards, dropping the last one");
    }

    let records: Vec<_> = cards
        .into_iter()
        .map(|card| card.into_image().into_record())
        .collect();

    let mut pairs = Vec::with_capacity(records.len() / 2);
    for (index, pair) in records.chunks_exact(2).enumerate() {
        let (first, second) = (&pair[0], &pair[1]);
        let (Some(image), Some(match_image)) = (
            ImageReference::from_record(first),
            ImageReference::from_record(second),
        ) else {
            warn!(pair = index, "memory card without image path, skipping pair");
            continue;
        };

        pairs.push(MemoryCard {
            image,
            match_image,
            image_alt: first.image_alt.clone(),
            match_alt: second.match_alt.clone(),
            description: first.description.clone(),
        });
    }
    pairs
}

/// Build the memory-game chapter: instruction text followed by the game.
pub fn build_memory_game(input: MemoryGameInput) -> ContentNode {
    let title = input
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Memory".to_string());

    let card_back = input
        .card_back_image
        .and_then(ImageReference::from_input)
        .unwrap_or_else(|| ImageReference::new(DEFAULT_CARD_BACK));

    let cards = pair_cards(input.cards);
    debug!(pairs = cards.len(), "paired memory cards");

    let params = MemoryGameParams {
        cards,
        behaviour: MemoryBehaviour {
            use_grid: false,
            allow_retry: false,
            num_cards_to_use: input.num_cards_to_use,
        },
        look_n_feel: LookAndFeel {
            theme_color: input
                .theme_color
                .unwrap_or_else(|| DEFAULT_THEME_COLOR.to_string()),
            card_back,
        },
        l10n: MEMORY_L10N,
    };

    let instruction = ContentNode::text(
        format!("<p><strong>{}</strong></p>", input.instruction),
        "Instruction",
    );
    let game = ContentNode::new(params, title.clone());

    ContentNode::column(title, vec![instruction.into(), ColumnItem::new(game)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Params;

    fn cards(json: &str) -> Vec<CardEntry> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn pairs_even_number_of_cards() {
        let input = cards(
            r#"[{"image": "images/a.png"}, {"image": "images/b.png"},
                {"image": "images/c.jpg"}, {"image": "images/d.jpg"}]"#,
        );
        let pairs = pair_cards(input);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].image.path, "images/a.png");
        assert_eq!(pairs[0].match_image.path, "images/b.png");
        assert_eq!(pairs[1].match_image.mime, "image/jpeg");
    }

    #[test]
    fn drops_trailing_unpaired_card() {
        let input = cards(r#"["images/a.png", "images/b.png", "images/c.png"]"#);
        let pairs = pair_cards(input);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].image_alt, "");
        assert_eq!(pairs[0].description, "");
    }

    #[test]
    fn pair_count_is_half_for_any_length() {
        for n in 0..9 {
            let entries: Vec<CardEntry> = (0..n)
                .map(|i| CardEntry::Bare(ImageInput::Path(format!("images/{i}.png"))))
                .collect();
            assert_eq!(pair_cards(entries).len(), n / 2);
        }
    }

    #[test]
    fn record_cards_keep_alt_text() {
        let input = cards(
            r#"[{"image": {"path": "images/a.png", "imageAlt": "Face", "description": "Person A"}},
                {"image": {"path": "images/b.png", "matchAlt": "Name"}}]"#,
        );
        let pairs = pair_cards(input);
        assert_eq!(pairs[0].image_alt, "Face");
        assert_eq!(pairs[0].match_alt, "Name");
        assert_eq!(pairs[0].description, "Person A");
    }

    #[test]
    fn pair_with_empty_path_is_skipped() {
        let input = cards(r#"["", "images/b.png", "images/c.png", "images/d.png"]"#);
        assert_eq!(pair_cards(input).len(), 1);
    }

    #[test]
    fn builds_chapter_with_instruction_first() {
        let input: MemoryGameInput = serde_json::from_str(
            r#"{"title": "Gesichter", "instruction": "Finde die Paare",
                "cards": ["images/a.png", "images/b.png"], "num_cards_to_use": 4}"#,
        )
        .unwrap();
        let chapter = build_memory_game(input);
        assert_eq!(chapter.title(), Some("Gesichter"));

        let children = chapter.params.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].title(), Some("Instruction"));
        match &children[1].params {
            Params::MemoryGame(game) => {
                assert_eq!(game.cards.len(), 1);
                assert_eq!(game.look_n_feel.theme_color, DEFAULT_THEME_COLOR);
                assert_eq!(game.look_n_feel.card_back.path, DEFAULT_CARD_BACK);
                assert_eq!(game.behaviour.num_cards_to_use, Some(4));
            }
            other => panic!("expected memory game, got {other:?}"),
        }
    }

    #[test]
    fn serializes_match_key_and_l10n() {
        let input: MemoryGameInput =
            serde_json::from_str(r#"{"cards": ["images/a.png", "images/b.png"]}"#).unwrap();
        let chapter = build_memory_game(input);
        let json = serde_json::to_value(&chapter).unwrap();
        let game = &json["params"]["content"][1]["content"]["params"];
        assert_eq!(game["cards"][0]["match"]["path"], "images/b.png");
        assert_eq!(game["lookNFeel"]["themeColor"], DEFAULT_THEME_COLOR);
        assert_eq!(game["l10n"]["cardMatchedA11y"], "Match found");
        assert!(game["behaviour"].get("numCardsToUse").is_none());
    }
}
