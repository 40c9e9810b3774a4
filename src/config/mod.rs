//! Configuration module

mod site;

pub use site::AnalyticsConfig;
pub use site::CalendarConfig;
pub use site::ConfigError;
pub use site::ContentConfig;
pub use site::HighlightConfig;
pub use site::MarkdownConfig;
pub use site::SiteConfig;
pub use site::ENV_VARS;
