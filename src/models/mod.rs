mod insights;
mod report;
mod request;
mod sentiment;
mod source;
mod sources;
mod technical;

pub use insights::{AiInsightBundle, BundleStatus, NewsSentimentInsight, NewsTone};
pub use report::{AppInfo, Report, ReportMetadata, ReportSources};
pub use request::{AnalyzeRequest, AssetClass};
pub use sentiment::{SentimentAssessment, SentimentSnapshot};
pub use source::{Confidence, SourceResult, SourceStatus};
pub use sources::{
    FearGreedReading, Headline, InsiderActivity, InsiderTransaction, InstitutionalHolder,
    InstitutionalOwnership, MarketSeriesInfo, MentionLevel, MentionVolume, OptionsSummary,
    SearchInterest, TrendDirection,
};
pub use technical::{
    MovingAverages, OverallSignal, PricePosition, RiskLevel, RsiReading, RsiZone,
    TechnicalSnapshot, VolumeReading, VolumeStatus,
};
