//! Field extraction for movie and TV show pages
//!
//! Pages are located by their `data-qa` attributes. Every lookup is
//! tolerant: an element that is not on the page yields a `null` value rather
//! than an error, since the site drops panels for unreleased titles.

use crate::output::Record;
use crate::state::TargetKind;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Number of cast, creator and producer names kept per record
pub const DEFAULT_NAME_LIMIT: usize = 3;

/// Builds records from detail page HTML
#[derive(Debug, Clone, Copy)]
pub struct DetailExtractor {
    name_limit: usize,
}

impl Default for DetailExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_LIMIT)
    }
}

impl DetailExtractor {
    pub fn new(name_limit: usize) -> Self {
        Self { name_limit }
    }

    /// Extracts the record of a detail page; `None` for non-detail kinds
    ///
    /// # Arguments
    ///
    /// * `kind` - Kind of the work item the page was fetched for
    /// * `html` - The page content
    /// * `url` - Final URL of the page, stored in the `url` field
    pub fn extract(&self, kind: TargetKind, html: &str, url: &Url) -> Option<Record> {
        let document = Html::parse_document(html);
        match kind {
            TargetKind::Movie => Some(self.extract_movie(&document, url)),
            TargetKind::TvShow => Some(self.extract_show(&document, url)),
            TargetKind::Listing | TargetKind::Generic => None,
        }
    }

    fn extract_movie(&self, document: &Html, url: &Url) -> Record {
        let mut record = Record::new();

        record.insert("title", data_qa_text(document.root_element(), "score-panel-title"));
        record.insert("synopsis", data_qa_text(document.root_element(), "movie-info-synopsis"));
        record.insert("cast", Some(self.names(document, "cast-crew-item-link")));

        for item in select(document.root_element(), &data_qa("movie-info-item")) {
            let Some(label) = data_qa_text(item, "movie-info-item-label") else {
                continue;
            };
            let label = label.trim_end_matches(':').trim().to_lowercase();
            if label.is_empty() {
                continue;
            }

            let value = data_qa_text(item, "movie-info-item-value").map(|v| clean_detail_values(&v));
            record.insert(label, value);
        }

        let score_panel = select(document.root_element(), &data_qa("score-panel")).into_iter().next();
        let score = |attr: &str| {
            score_panel
                .and_then(|panel| panel.value().attr(attr))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        record.insert("tomatometer", score("tomatometerscore"));
        record.insert("audience score", score("audiencescore"));
        record.insert("url", Some(url.to_string()));

        record
    }

    fn extract_show(&self, document: &Html, url: &Url) -> Record {
        let root = document.root_element();
        let mut record = Record::new();

        record.insert("title", data_qa_text(root, "score-panel-series-title"));
        record.insert("synopsis", css_text(root, "#movieSynopsis"));
        record.insert("cast", Some(self.names(document, "cast-item-name")));
        record.insert("creators", Some(self.names(document, "creator")));
        record.insert("producers", Some(self.names(document, "series-details-producer")));
        record.insert("network", data_qa_text(root, "series-details-network"));
        record.insert("premiere", data_qa_text(root, "series-details-premiere-date"));
        record.insert("genre", data_qa_text(root, "series-details-genre"));
        record.insert("seasons", Some(select(root, "season-list-item").len().to_string()));
        record.insert("tomatometer", data_qa_text(root, "tomatometer").map(strip_percent));
        record.insert("audience score", data_qa_text(root, "audience-score").map(strip_percent));
        record.insert("url", Some(url.to_string()));

        record
    }

    /// First `name_limit` names of a `data-qa` list, comma separated
    fn names(&self, document: &Html, qa: &str) -> String {
        select(document.root_element(), &data_qa(qa))
            .into_iter()
            .map(element_text)
            .filter(|name| !name.is_empty())
            .take(self.name_limit)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Collapses a multi-line detail value into a comma separated list
///
/// Values such as a genre list are rendered one per line with trailing
/// commas. Values with neither a comma nor a newline are kept verbatim.
pub fn clean_detail_values(values: &str) -> String {
    if !values.contains(',') && !values.contains('\n') {
        return values.to_string();
    }

    values
        .split('\n')
        .map(|line| line.replacen(',', "", 1).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn strip_percent(score: String) -> String {
    score.trim_end_matches('%').trim().to_string()
}

fn data_qa(name: &str) -> String {
    format!(r#"[data-qa="{}"]"#, name)
}

fn select<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(_) => {
            tracing::debug!("Invalid selector {}", css);
            Vec::new()
        }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first match, `None` when missing or empty
fn css_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    select(scope, css)
        .into_iter()
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn data_qa_text(scope: ElementRef<'_>, name: &str) -> Option<String> {
    css_text(scope, &data_qa(name))
}
