//! Typed views of the embedded page payload

use serde::Deserialize;
use serde_json::Value;

/// Path shared by collection and item pages
const PAGE_DATA_POINTER: &str = "/props/pageProps/data/pageData";

/// Collection landing page data needed to list its members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPayload {
    /// Server-side identifier used by the membership listing
    pub category_id: String,

    /// Server-reported item count (advisory); `None` when it is not a
    /// whole non-negative number
    pub total: Option<u64>,
}

#[derive(Deserialize)]
struct RawCollectionPage {
    #[serde(rename = "categoryData")]
    category_data: RawCategory,
    #[serde(default)]
    total: Value,
}

#[derive(Deserialize)]
struct RawCategory {
    #[serde(rename = "_id")]
    id: Value,
}

impl CollectionPayload {
    /// Decodes `pageData.{categoryData._id, total}`
    ///
    /// Only a missing or unusable category id makes the page malformed; an
    /// odd `total` just leaves the count unknown.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let page = payload.pointer(PAGE_DATA_POINTER)?;
        let raw: RawCollectionPage = serde_json::from_value(page.clone()).ok()?;

        // ids show up both as strings and as numbers
        let category_id = match raw.category_data.id {
            Value::String(s) if !s.is_empty() => s,
            Value::Number(n) => n.to_string(),
            _ => return None,
        };

        Some(Self {
            category_id,
            total: whole_count(&raw.total),
        })
    }
}

/// Reads integers, integral floats (`12.0`), and numeric strings (`"12"`)
fn whole_count(value: &Value) -> Option<u64> {
    let number = match value {
        Value::Number(n) => n.clone(),
        Value::String(s) => s.trim().parse::<serde_json::Number>().ok()?,
        _ => return None,
    };

    if let Some(count) = number.as_u64() {
        return Some(count);
    }

    let float = number.as_f64()?;
    if float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64 {
        Some(float as u64)
    } else {
        None
    }
}

/// Item page data: a title and the raw description markup
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ItemPayload {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl ItemPayload {
    /// Decodes `pageData.audioData`; `None` if the object is missing or mistyped
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let audio = payload.pointer(PAGE_DATA_POINTER)?.get("audioData")?;
        if !audio.is_object() {
            return None;
        }
        serde_json::from_value(audio.clone()).ok()
    }

    /// Title, falling back to the item slug
    pub fn title_or<'a>(&'a self, slug: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(slug)
    }

    /// Raw description, empty when absent
    pub fn raw_description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}
