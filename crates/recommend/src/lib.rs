//! `lishe-recommend`: nutrient-score food recommendation engine.
//!
//! Pure engine crate: receives a parsed catalog and a pre-loaded food table,
//! returns ranked foods per group. No CLI or filesystem dependencies.

pub mod catalog;
pub mod error;
pub mod metrics;
pub mod model;
pub mod nutrient;
pub mod scorer;
pub mod table;

pub use catalog::{Catalog, CodeRange, FoodGroup, HealthGoal};
pub use error::RecommendError;
pub use model::{GroupRecommendation, RankedFood, RecommendRequest, Recommendations};
pub use scorer::recommend;
pub use table::{FoodRecord, FoodTable};
