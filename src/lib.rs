pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::availability::{
    dates_between, day_bounds, free_blocks, free_blocks_on, working_window,
};
pub use application::connections::{connections, connections_with};
pub use application::insights::{insights, insights_with, tag_statistics};
pub use application::journal::{EventInsights, JournalSnapshot};
pub use application::similarity::{score, score_breakdown, score_with, ScoreBreakdown};
pub use domain::models::{
    events_from_records, Category, ColorMarker, Connection, Event, EventRecord, FreeBlock,
    StoredColor, TagCount, TimeWindow, DEFAULT_CATEGORY,
};
pub use domain::policy::{
    AvailabilityPolicy, EngineConfig, GraphPolicy, InsightPolicy, InsightTemplates,
    SimilarityWeights, WallClock,
};
pub use infrastructure::config::{config_path, ensure_default_config, load_config, save_config};
pub use infrastructure::error::DaybookError;
pub use infrastructure::event_mapper::{
    decode_provider_event, decode_provider_events, CalendarEventDateTime, ProviderCalendarEvent,
};
