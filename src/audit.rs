//! Content-quality audit of stored article records
//!
//! Records come straight from the document store, whose field names are not
//! consistent across collections: an image may carry `publicId`,
//! `public_id` or only a `url`, and its alt text may be under `alt` or
//! `altText`. The record types accept every spelling and resolve them in a
//! fixed order.

use serde::{Deserialize, Serialize};

/// Alt text shorter than this is not descriptive enough
pub const MIN_ALT_TEXT_LENGTH: usize = 3;

/// Articles with less trimmed HTML than this count as empty
pub const MIN_ARTICLE_CONTENT_LENGTH: usize = 10;

/// An image reference as stored on an article
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageRecord {
    pub public_id: Option<String>,
    /// Snake-case spelling used by older collections
    #[serde(rename = "public_id")]
    pub public_id_snake: Option<String>,
    pub url: Option<String>,
    pub alt: Option<String>,
    pub alt_text: Option<String>,
    pub caption_name: Option<String>,
    pub caption: Option<String>,
    pub caption_source: Option<String>,
    pub source: Option<String>,
}

impl ImageRecord {
    /// `publicId`, then `public_id`, then `url`
    pub fn resolved_public_id(&self) -> Option<&str> {
        first_non_empty(&[&self.public_id, &self.public_id_snake, &self.url])
    }

    /// `alt`, then `altText`, trimmed
    pub fn resolved_alt(&self) -> Option<&str> {
        first_non_empty(&[&self.alt, &self.alt_text])
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
    }
}

/// Image fields after resolving alternate spellings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedImage {
    pub public_id: String,
    /// `Image` when the record has no alt text
    pub alt: String,
    pub caption_name: String,
    pub caption_source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub normalized: NormalizedImage,
}

/// Check that an image has an id and usable alt text
pub fn validate_image(image: &ImageRecord) -> ImageValidation {
    let mut errors = Vec::new();

    let public_id = image.resolved_public_id().map(str::trim).unwrap_or_default();
    if public_id.is_empty() {
        errors.push("Image publicId is required".to_string());
    }

    let alt = image.resolved_alt();
    match alt {
        None => errors.push("Image alt text is required for accessibility".to_string()),
        Some(alt) if alt.chars().count() < MIN_ALT_TEXT_LENGTH => errors.push(format!(
            "Image alt text is too short (minimum {MIN_ALT_TEXT_LENGTH} characters)"
        )),
        Some(_) => {}
    }

    ImageValidation {
        is_valid: errors.is_empty(),
        errors,
        normalized: NormalizedImage {
            public_id: public_id.to_string(),
            alt: alt.unwrap_or("Image").to_string(),
            caption_name: first_non_empty(&[&image.caption_name, &image.caption])
                .unwrap_or_default()
                .to_string(),
            caption_source: first_non_empty(&[&image.caption_source, &image.source])
                .unwrap_or_default()
                .to_string(),
        },
    }
}

/// An article as stored in the document store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticleRecord {
    pub id: String,
    pub title: Option<String>,
    #[serde(rename = "contentHTML")]
    pub content_html: Option<String>,
    pub content_markdown: Option<String>,
    pub images: Vec<ImageRecord>,
}

/// Aggregate quality of a set of articles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub total_articles: usize,
    pub articles_with_title: usize,
    pub articles_with_content: usize,
    pub total_images: usize,
    pub images_with_alt_text: usize,
    /// 0-100: titles weigh 30, content 40, image alt text 30
    pub quality_score: u32,
    pub issues: Vec<String>,
}

/// Score a set of articles for titles, content and image alt text
///
/// A set without images gets the full image component.
///
/// ```rust
/// use cms_markdown_converter::audit::{generate_quality_report, ArticleRecord};
///
/// let articles = vec![ArticleRecord {
///     id: "charyn".to_string(),
///     title: Some("Charyn Canyon".to_string()),
///     content_html: Some("<p>154 km of canyon.</p>".to_string()),
///     ..Default::default()
/// }];
/// assert_eq!(generate_quality_report(&articles).quality_score, 100);
/// ```
pub fn generate_quality_report(articles: &[ArticleRecord]) -> QualityReport {
    let mut issues = Vec::new();
    let mut articles_with_title = 0;
    let mut articles_with_content = 0;
    let mut total_images = 0;
    let mut images_with_alt_text = 0;

    for (index, article) in articles.iter().enumerate() {
        let number = index + 1;

        if article.title.as_deref().is_some_and(|t| !t.trim().is_empty()) {
            articles_with_title += 1;
        } else {
            issues.push(format!("Article {number} ({}) is missing a title", article.id));
        }

        let content_length = article
            .content_html
            .as_deref()
            .map_or(0, |html| html.trim().chars().count());
        if content_length >= MIN_ARTICLE_CONTENT_LENGTH {
            articles_with_content += 1;
        } else {
            issues.push(format!(
                "Article {number} ({}) has insufficient content ({content_length} characters)",
                article.id
            ));
        }

        total_images += article.images.len();
        images_with_alt_text += article
            .images
            .iter()
            .filter(|image| {
                image
                    .resolved_alt()
                    .is_some_and(|alt| alt.chars().count() >= MIN_ALT_TEXT_LENGTH)
            })
            .count();
    }

    let ratio = |part: usize, whole: usize| part as f64 / whole as f64;
    let (title_score, content_score) = if articles.is_empty() {
        (0.0, 0.0)
    } else {
        (
            ratio(articles_with_title, articles.len()) * 30.0,
            ratio(articles_with_content, articles.len()) * 40.0,
        )
    };
    let image_score = if total_images > 0 {
        ratio(images_with_alt_text, total_images) * 30.0
    } else {
        30.0
    };

    QualityReport {
        total_articles: articles.len(),
        articles_with_title,
        articles_with_content,
        total_images,
        images_with_alt_text,
        quality_score: (title_score + content_score + image_score).round() as u32,
        issues,
    }
}

fn first_non_empty<'a>(values: &[&'a Option<String>]) -> Option<&'a str> {
    values
        .iter()
        .copied()
        .filter_map(Option::as_deref)
        .find(|value| !value.is_empty())
}
