//! AI-generated contextual suggestions attached to a single note.

use serde::{Deserialize, Deserializer, Serialize};

/// A related article, website, video, or other resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawResource")]
pub struct RelatedResource {
    pub title: String,
    pub url: String,
    /// Description, or the analysis text for articles.
    pub description: String,
}

/// Suggestions bundle. Every category is always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSuggestions {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub related_topics: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub related_articles: Vec<RelatedResource>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub related_websites: Vec<RelatedResource>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub related_videos: Vec<RelatedResource>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub related_images: Vec<RelatedResource>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub related_blogs: Vec<RelatedResource>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub related_links: Vec<RelatedResource>,
}

impl NoteSuggestions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.related_topics.is_empty()
            && self.related_articles.is_empty()
            && self.related_websites.is_empty()
            && self.related_videos.is_empty()
            && self.related_images.is_empty()
            && self.related_blogs.is_empty()
            && self.related_links.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawResource {
    Url(String),
    Full {
        #[serde(default)]
        title: String,
        #[serde(default)]
        url: String,
        #[serde(default, alias = "analysis")]
        description: String,
    },
}

impl From<RawResource> for RelatedResource {
    fn from(raw: RawResource) -> Self {
        match raw {
            RawResource::Url(url) => Self {
                title: url.clone(),
                url,
                description: String::new(),
            },
            RawResource::Full {
                title,
                url,
                description,
            } => Self {
                title,
                url,
                description,
            },
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_null_categories_default_to_empty() {
        let suggestions: NoteSuggestions = serde_json::from_str(
            r#"{"relatedTopics":["rust","async"],"relatedVideos":null}"#,
        )
        .unwrap();
        assert_eq!(suggestions.related_topics, vec!["rust", "async"]);
        assert!(suggestions.related_videos.is_empty());
        assert!(suggestions.related_articles.is_empty());
        assert!(suggestions.related_links.is_empty());
    }

    #[test]
    fn article_analysis_maps_to_description() {
        let suggestions: NoteSuggestions = serde_json::from_str(
            r#"{"relatedArticles":[{"title":"Ownership","url":"https://doc.rust-lang.org","analysis":"Core concept"}]}"#,
        )
        .unwrap();
        let article = &suggestions.related_articles[0];
        assert_eq!(article.title, "Ownership");
        assert_eq!(article.description, "Core concept");
    }

    #[test]
    fn bare_url_resources_are_accepted() {
        let suggestions: NoteSuggestions =
            serde_json::from_str(r#"{"relatedLinks":["https://example.com"]}"#).unwrap();
        assert_eq!(suggestions.related_links[0].url, "https://example.com");
        assert!(!suggestions.is_empty());
        assert!(NoteSuggestions::default().is_empty());
    }
}
