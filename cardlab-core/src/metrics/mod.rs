//! Metrics engine — pure, read-only projections over a [`crate::domain::NormalizedSeries`].
//!
//! Every function takes the series plus the dates/issuers it needs as
//! explicit parameters; nothing is carried over from a previous view.
//! Rankings use stable sorts, so issuers tied on the sort key keep the
//! source table's column order.

pub mod comparison;
pub mod decline;
pub mod growth;
pub mod share;
pub mod snapshot;
pub mod waterfall;

pub use comparison::{comparison_slice, ComparisonPoint};
pub use decline::{monthly_declines, DeclinePoint, DeclineReport};
pub use growth::{growth_between, trailing_growth, GrowthEntry, GrowthRanking, TrailingEntry, TrailingGrowth};
pub use share::{share_change, share_evolution, SharePoint, ShareChangeEntry, ShareChangeRanking, ShareSeries};
pub use snapshot::{latest_ranking, IssuerCount, SnapshotRanking};
pub use waterfall::{share_waterfall, ShareSegment, ShareWaterfall};
