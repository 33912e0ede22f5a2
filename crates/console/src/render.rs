//! Plain-text rendering of page state for the terminal.

use comfy_table::Table;
use heritage_core::codec::format_string_list;
use heritage_core::models::{HeritageEntry, ImageRecord, QuizItem};
use heritage_core::vocabulary::{roman_numeral, TagKind, Vocabulary};

use crate::controllers::{AnalysisController, AnalysisState, AnalysisView, DetailState};

pub fn image_table(images: &[ImageRecord]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Filename", "Uploaded"]);
    for image in images {
        table.add_row(vec![
            image.id.to_string(),
            image.filename.clone(),
            image.timestamp.clone(),
        ]);
    }
    table.to_string()
}

/// The analysis panel of the image manager.
pub fn analysis_panel(analysis: &AnalysisController, image_url: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(url) = image_url {
        out.push_str(&format!("Image: {url}\n"));
    }

    match analysis.state() {
        AnalysisState::Idle => out.push_str("No image selected\n"),
        AnalysisState::Loading => out.push_str("Loading analysis...\n"),
        AnalysisState::Analyzing { .. } => out.push_str("Analyzing...\n"),
        AnalysisState::Deleting { .. } => out.push_str("Deleting...\n"),
        AnalysisState::Ready(AnalysisView::NotAnalyzed) => {
            out.push_str("Not analyzed yet. Run `analyze` to extract heritage entries.\n")
        }
        AnalysisState::Ready(AnalysisView::Image) => {
            out.push_str("Analysis hidden, showing the image only.\n")
        }
        AnalysisState::Ready(AnalysisView::Entries)
        | AnalysisState::Editing(_)
        | AnalysisState::Saving(_) => {
            for entry in analysis.visible_entries().unwrap_or_default() {
                out.push_str(&heritage_detail(entry));
                out.push('\n');
            }
        }
    }

    if let Some(draft) = analysis.draft() {
        out.push_str(&format!("Editing entry {}\n", draft.id()));
    }
    out
}

pub fn heritage_table(entries: &[&HeritageEntry]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Criteria", "UNESCO", "Region"]);
    for entry in entries {
        table.add_row(vec![
            entry.id.to_string(),
            entry.title.clone(),
            criteria(entry),
            entry.unesco_tag.clone().unwrap_or_default(),
            format_string_list(entry.region.as_deref(), ", "),
        ]);
    }
    table.to_string()
}

/// Every field of one entry as a two-column table.
pub fn heritage_detail(entry: &HeritageEntry) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["ID".to_string(), entry.id.to_string()]);
    table.add_row(vec!["Title".to_string(), entry.title.clone()]);
    table.add_row(vec![
        "Description".to_string(),
        entry.description.clone().unwrap_or_default(),
    ]);
    table.add_row(vec!["Summary".to_string(), entry.summary.clone().unwrap_or_default()]);
    table.add_row(vec![
        "Key points".to_string(),
        format_string_list(entry.simple_summary.as_deref(), "\n"),
    ]);
    table.add_row(vec!["Criteria".to_string(), criteria(entry)]);
    table.add_row(vec![
        "UNESCO".to_string(),
        entry.unesco_tag.clone().unwrap_or_default(),
    ]);
    table.add_row(vec![
        "Country".to_string(),
        format_string_list(entry.country.as_deref(), ", "),
    ]);
    table.add_row(vec![
        "Region".to_string(),
        format_string_list(entry.region.as_deref(), ", "),
    ]);
    table.add_row(vec![
        "Features".to_string(),
        format_string_list(entry.feature.as_deref(), ", "),
    ]);
    table.to_string()
}

/// Status line for detail states without an entry to show.
pub fn detail_status(state: &DetailState) -> Option<String> {
    match state {
        DetailState::Idle => Some("No heritage entry selected".to_string()),
        DetailState::Invalid(raw) => Some(format!("Invalid heritage id: '{raw}'")),
        DetailState::Loading => Some("Loading...".to_string()),
        DetailState::NotFound(id) => Some(format!("Heritage entry {id} not found")),
        DetailState::Failed => Some("Failed to load heritage entry".to_string()),
        DetailState::Viewing | DetailState::Editing(_) | DetailState::Saving(_) => None,
    }
}

pub fn quiz_list(quizzes: &[QuizItem]) -> String {
    if quizzes.is_empty() {
        return "No quizzes yet. Run `generate-quiz` to create some.\n".to_string();
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Question", "Options", "Answer"]);
    for quiz in quizzes {
        table.add_row(vec![
            quiz.id.to_string(),
            quiz.question.clone(),
            quiz.options.join("\n"),
            quiz.answer.clone(),
        ]);
    }
    table.to_string()
}

pub fn vocabulary(vocab: &Vocabulary) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Kind", "Values"]);
    table.add_row(vec![
        "criteria".to_string(),
        vocab
            .criteria()
            .map(|c| format!("{c} {}", roman_numeral(c)))
            .collect::<Vec<_>>()
            .join("\n"),
    ]);
    for kind in [TagKind::Unesco, TagKind::Region, TagKind::Feature] {
        table.add_row(vec![kind.label().to_string(), vocab.tags(kind).join("\n")]);
    }
    table.to_string()
}

fn criteria(entry: &HeritageEntry) -> String {
    entry
        .criteria
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|c| roman_numeral(*c))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criteria_render_as_roman_numerals() {
        let entry = HeritageEntry {
            id: 1,
            title: "富士山".into(),
            description: None,
            summary: None,
            simple_summary: None,
            criteria: Some(vec![3, 6]),
            unesco_tag: Some("文化遺産".into()),
            country: None,
            region: None,
            feature: None,
        };
        assert_eq!(criteria(&entry), "(iii) (vi)");
        assert!(heritage_table(&[&entry]).contains("(iii) (vi)"));
    }

    #[test]
    fn empty_quiz_list_prompts_generation() {
        assert!(quiz_list(&[]).contains("generate-quiz"));
    }

    #[test]
    fn not_found_has_a_status_line() {
        assert_eq!(
            detail_status(&DetailState::NotFound(9)).as_deref(),
            Some("Heritage entry 9 not found")
        );
        assert_eq!(detail_status(&DetailState::Viewing), None);
    }
}
