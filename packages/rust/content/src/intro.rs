//! Introduction chapter: either rendered from a structured record or from the
//! fixed year-review template with a part numeral substituted.

use serde::Deserialize;

use crate::node::ContentNode;

/// Chapter title of every introduction.
pub const INTRO_CHAPTER_TITLE: &str = "Einführung";

/// Placeholder replaced by the part numeral in introduction templates.
pub const PART_PLACEHOLDER: &str = "{part}";

/// Built-in introduction text used when a request asks for the template intro.
pub const DEFAULT_INTRO_TEMPLATE: &str = "<h2><strong>Willkommen zum Jahresrückblick 2025, Teil {part}</strong></h2>\
<p>Gemeinsam blicken wir zurück auf bewegende, spannende und teils tragische Ereignisse aus Politik, Gesellschaft und Kultur, die das Jahr 2025 geprägt haben.&nbsp;</p>\
<h3>Lernziele</h3><p>Sie können …</p><ul>\
<li><strong>zentrale Ereignisse des Jahres 2025 beschreiben</strong> und deren Bedeutung erklären.</li>\
<li><strong>Zusammenhänge zwischen verschiedenen Entwicklungen erkennen</strong> und reflektieren.</li>\
<li>eigene Meinungen zu den Geschehnissen formulieren und begründen.</li></ul>\
<h3>Ablauf</h3><ol>\
<li><strong>Memory-Spiel:</strong> Spielen Sie eine Runde Memory, in der Sie Gesichter und Beschreibungen von Personen, die das Jahr 2025 geprägt haben, zuordnen.</li>\
<li><strong>SRF-Beitrag:</strong> Schauen Sie den SRF-Rückblick auf die Ereignisse des Jahres und beantworten Sie die Verständnisfragen.</li>\
<li><strong>Reflexion:</strong> Nutzen Sie Mentimeter, um Ihre Gedanken zu den Geschehnissen zu teilen und mögliche Schlagzeilen für 2026 zu formulieren.</li></ol>";

/// Structured introduction record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntroductionData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub welcome_text: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub workflow: Vec<String>,
}

/// Part numeral for the template introduction: `"III"` or `3`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PartNumeral {
    Number(u32),
    Text(String),
}

impl PartNumeral {
    /// Text substituted into the template. Numbers become Roman numerals.
    pub fn render(&self) -> String {
        match self {
            Self::Number(n) => to_roman(*n),
            Self::Text(text) => text.trim().to_string(),
        }
    }
}

impl Default for PartNumeral {
    fn default() -> Self {
        Self::Number(1)
    }
}

/// Roman numeral for 1..=3999; anything else is rendered in decimal.
pub fn to_roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    if n == 0 || n > 3999 {
        return n.to_string();
    }

    let mut out = String::new();
    for (value, symbol) in TABLE {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

/// Render a structured introduction into a one-item chapter.
pub fn build_structured_introduction(data: &IntroductionData) -> ContentNode {
    let title = data
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or("Willkommen");

    let html = format!(
        "<h2><strong>{title}</strong></h2>\n<p>{welcome}</p>\n<h3>Lernziele</h3>\n<ul>{objectives}</ul>\n<h3>Ablauf</h3>\n<ol>{workflow}</ol>",
        welcome = data.welcome_text,
        objectives = list_items(&data.learning_objectives),
        workflow = list_items(&data.workflow),
    );

    ContentNode::column(
        INTRO_CHAPTER_TITLE,
        vec![ContentNode::text(html, "Einführungstext").into()],
    )
}

/// Render the template introduction. `template` overrides the built-in text.
pub fn build_template_introduction(part: &PartNumeral, template: Option<&str>) -> ContentNode {
    let html = template
        .unwrap_or(DEFAULT_INTRO_TEMPLATE)
        .replace(PART_PLACEHOLDER, &part.render());

    ContentNode::column(
        INTRO_CHAPTER_TITLE,
        vec![ContentNode::text(html, "Unbenannt: Text").into()],
    )
}

fn list_items(items: &[String]) -> String {
    items.iter().map(|item| format!("<li>{item}</li>")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Params;

    fn chapter_text(chapter: &ContentNode) -> String {
        let children = chapter.params.children();
        assert_eq!(children.len(), 1);
        match &children[0].params {
            Params::Text(t) => t.text.clone(),
            other => panic!("expected text node, got {other:?}"),
        }
    }

    #[test]
    fn structured_intro_renders_lists() {
        let data = IntroductionData {
            title: Some("Hallo".into()),
            welcome_text: "Schön, dass du da bist.".into(),
            learning_objectives: vec!["Eins".into(), "Zwei".into()],
            workflow: vec!["Lesen".into()],
        };
        let chapter = build_structured_introduction(&data);
        assert_eq!(chapter.title(), Some(INTRO_CHAPTER_TITLE));

        let html = chapter_text(&chapter);
        assert!(html.starts_with("<h2><strong>Hallo</strong></h2>"));
        assert!(html.contains("<ul><li>Eins</li><li>Zwei</li></ul>"));
        assert!(html.contains("<ol><li>Lesen</li></ol>"));
    }

    #[test]
    fn structured_intro_with_empty_lists() {
        let chapter = build_structured_introduction(&IntroductionData::default());
        let html = chapter_text(&chapter);
        assert!(html.contains("<strong>Willkommen</strong>"));
        assert!(html.contains("<ul></ul>"));
        assert!(html.contains("<ol></ol>"));
    }

    #[test]
    fn template_intro_substitutes_numeral() {
        let chapter = build_template_introduction(&PartNumeral::Number(4), None);
        let html = chapter_text(&chapter);
        assert!(html.contains("Teil IV</strong>"));
        assert!(!html.contains(PART_PLACEHOLDER));

        let chapter =
            build_template_introduction(&PartNumeral::Text("II".into()), Some("Teil {part}"));
        assert_eq!(chapter_text(&chapter), "Teil II");
    }

    #[test]
    fn roman_numerals() {
        assert_eq!(to_roman(1), "I");
        assert_eq!(to_roman(9), "IX");
        assert_eq!(to_roman(14), "XIV");
        assert_eq!(to_roman(2025), "MMXXV");
        assert_eq!(to_roman(0), "0");
    }

    #[test]
    fn part_numeral_accepts_both_shapes() {
        let n: PartNumeral = serde_json::from_str("3").unwrap();
        assert_eq!(n.render(), "III");
        let t: PartNumeral = serde_json::from_str("\"VII\"").unwrap();
        assert_eq!(t.render(), "VII");
    }
}
