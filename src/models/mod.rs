pub mod activity;
pub mod plan;
pub mod profile;

pub use activity::Activity;
pub use plan::{DayPlan, PlanDay, PlanDayRow, PlanPayload};
pub use profile::{NewProfile, Profile};
