//! Domain types for RadonLab

pub mod campaign;
pub mod campaign_type;
pub mod room_series;

pub use campaign::{
    Campaign, CampaignRecord, SlotKind, SubsetStatistics, VariationPattern, CAMPAIGN_HOURS,
    CELLAR_HOURS, DAYS, HOURS_PER_DAY, ROOM_HOURS,
};
pub use campaign_type::CampaignType;
pub use room_series::{Role, RoomSeries};
