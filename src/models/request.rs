use serde::{Deserialize, Serialize};

/// Asset category, used to pick subreddits and search phrasing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    #[default]
    Stock,
    Crypto,
    Index,
    Commodity,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Stock => "stock",
            AssetClass::Crypto => "crypto",
            AssetClass::Index => "index",
            AssetClass::Commodity => "commodity",
        }
    }
}

/// Body of `POST /api/analyze`. Echoed back in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub identifier: String,
    #[serde(default)]
    pub asset_class: AssetClass,
}
