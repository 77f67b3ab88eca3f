use serde::{ser::SerializeMap, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn parse(query: &str) -> Result<Self, String> {
        let query = query.trim();
        match query.is_empty() {
            true => Err("search_query must not be empty".to_string()),
            false => Ok(SearchQuery(query.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub title: String,
    pub price: String,
}

impl ListingRecord {
    /// Collapses the whitespace the marketplace renders around and inside
    /// text nodes. The price string is otherwise kept verbatim.
    pub fn new(title: &str, price: &str) -> Self {
        ListingRecord {
            title: collapse_whitespace(title),
            price: collapse_whitespace(price),
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Listing title -> raw price string, in the order the listings were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceMap {
    records: Vec<ListingRecord>,
}

impl PriceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A title seen twice keeps its first position and takes the newer price.
    pub fn insert(&mut self, record: ListingRecord) {
        match self.records.iter_mut().find(|r| r.title == record.title) {
            Some(existing) => existing.price = record.price,
            None => self.records.push(record),
        }
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.title == title)
            .map(|r| r.price.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListingRecord> {
        self.records.iter()
    }
}

impl FromIterator<ListingRecord> for PriceMap {
    fn from_iter<I: IntoIterator<Item = ListingRecord>>(iter: I) -> Self {
        let mut map = PriceMap::new();
        iter.into_iter().for_each(|record| map.insert(record));
        map
    }
}

impl Serialize for PriceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(&record.title, &record.price)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Listings(PriceMap),
    Failed { reason: String },
}

impl ExtractionOutcome {
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        ExtractionOutcome::Failed {
            reason: reason.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ExtractionOutcome::Failed { .. })
    }

    /// The payload handed back to the model: the listings as a JSON object,
    /// or `{"error": reason}`.
    pub fn to_tool_payload(&self) -> serde_json::Value {
        match self {
            ExtractionOutcome::Listings(listings) => {
                serde_json::to_value(listings).unwrap_or_else(|e| {
                    serde_json::json!({ "error": format!("Could not encode listings: {}", e) })
                })
            }
            ExtractionOutcome::Failed { reason } => serde_json::json!({ "error": reason }),
        }
    }
}
