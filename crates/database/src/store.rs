use async_trait::async_trait;
use core_types::{DietPlan, Food, NewDietPlan};

use crate::error::DbError;

/// The persistence operations the HTTP layer depends on.
///
/// Every write is atomic: it is either fully visible afterwards or not at all.
/// Lookups that match nothing return [`DbError::NotFound`].
#[async_trait]
pub trait DietStore: Send + Sync {
    /// Inserts the plan with all of its meals and foods, returning it with
    /// generated ids. A duplicate `external_user_id` yields
    /// [`DbError::Integrity`].
    async fn create_diet_plan(&self, plan: &NewDietPlan) -> Result<DietPlan, DbError>;

    async fn get_diet_plan_by_external_user_id(
        &self,
        external_user_id: &str,
    ) -> Result<DietPlan, DbError>;

    /// Removes the plan and, transitively, its meals and foods.
    async fn delete_diet_plan_by_external_user_id(
        &self,
        external_user_id: &str,
    ) -> Result<(), DbError>;

    /// Removes the plan and, transitively, its meals and foods.
    async fn delete_diet_plan_by_id(&self, id: i32) -> Result<(), DbError>;

    async fn update_food_quantity(&self, food_id: i32, quantity: &str) -> Result<Food, DbError>;

    /// Removes a single food; its meal and diet plan are left untouched.
    async fn delete_food(&self, food_id: i32) -> Result<(), DbError>;
}
