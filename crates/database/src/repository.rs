use crate::store::DietStore;
use crate::DbError;
use async_trait::async_trait;
use core_types::{DietPlan, Food, Meal, NewDietPlan};
use sqlx::postgres::{PgPool, Postgres};
use sqlx::{FromRow, Transaction};
use std::collections::HashMap;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
///
/// Every operation runs inside its own transaction taken from the pool. An
/// early return drops the transaction, which rolls it back and hands the
/// connection back to the pool.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

// This struct represents a row fetched from the diet_plans table.
#[derive(FromRow, Debug, Clone)]
pub struct DbDietPlan {
    pub id: i32,
    pub external_user_id: String,
}

/// Represents a row from the `meals` table.
#[derive(FromRow, Debug, Clone)]
pub struct DbMeal {
    pub id: i32,
    pub meal_type: String,
    pub diet_plan_id: i32,
}

/// Represents a row from the `foods` table.
#[derive(FromRow, Debug, Clone)]
pub struct DbFood {
    pub id: i32,
    pub name: String,
    pub quantity: String,
    pub meal_id: i32,
}

impl From<DbFood> for Food {
    fn from(row: DbFood) -> Self {
        Food {
            id: row.id,
            name: row.name,
            quantity: row.quantity,
        }
    }
}

/// Nests flat rows into a `DietPlan`. Meals keep the order they were given in,
/// and so do the foods within each meal.
pub fn assemble_diet_plan(plan: DbDietPlan, meals: Vec<DbMeal>, foods: Vec<DbFood>) -> DietPlan {
    let mut foods_by_meal: HashMap<i32, Vec<Food>> = HashMap::new();
    for food in foods {
        foods_by_meal.entry(food.meal_id).or_default().push(food.into());
    }

    let meals = meals
        .into_iter()
        .map(|meal| Meal {
            foods: foods_by_meal.remove(&meal.id).unwrap_or_default(),
            id: meal.id,
            meal_type: meal.meal_type,
        })
        .collect();

    DietPlan {
        id: plan.id,
        external_user_id: plan.external_user_id,
        meals,
    }
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Deletes a diet plan's foods, then its meals, then the plan itself.
    ///
    /// This is the only place the cascade is spelled out; both delete paths go
    /// through it. Returns `false` when no plan had that id.
    async fn delete_diet_plan_tree(
        tx: &mut Transaction<'_, Postgres>,
        diet_plan_id: i32,
    ) -> Result<bool, DbError> {
        sqlx::query(
            "DELETE FROM foods WHERE meal_id IN (SELECT id FROM meals WHERE diet_plan_id = $1)",
        )
        .bind(diet_plan_id)
        .execute(&mut **tx)
        .await?;

        sqlx::query("DELETE FROM meals WHERE diet_plan_id = $1")
            .bind(diet_plan_id)
            .execute(&mut **tx)
            .await?;

        let result = sqlx::query("DELETE FROM diet_plans WHERE id = $1")
            .bind(diet_plan_id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DietStore for DbRepository {
    /// Saves the plan, its meals and their foods within a single transaction for atomicity.
    async fn create_diet_plan(&self, plan: &NewDietPlan) -> Result<DietPlan, DbError> {
        let mut tx = self.pool.begin().await?;

        let diet_plan_id: i32 = sqlx::query_scalar(
            "INSERT INTO diet_plans (external_user_id) VALUES ($1) RETURNING id",
        )
        .bind(&plan.external_user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut meals = Vec::with_capacity(plan.meals.len());
        for new_meal in &plan.meals {
            let meal_id: i32 = sqlx::query_scalar(
                "INSERT INTO meals (meal_type, diet_plan_id) VALUES ($1, $2) RETURNING id",
            )
            .bind(&new_meal.meal_type)
            .bind(diet_plan_id)
            .fetch_one(&mut *tx) // Note: must use the transaction object `tx` here
            .await?;

            let mut foods = Vec::with_capacity(new_meal.foods.len());
            for new_food in &new_meal.foods {
                let row = sqlx::query_as::<_, DbFood>(
                    r#"
                    INSERT INTO foods (name, quantity, meal_id)
                    VALUES ($1, $2, $3)
                    RETURNING id, name, quantity, meal_id
                    "#,
                )
                .bind(&new_food.name)
                .bind(&new_food.quantity)
                .bind(meal_id)
                .fetch_one(&mut *tx)
                .await?;
                foods.push(Food::from(row));
            }

            meals.push(Meal {
                id: meal_id,
                meal_type: new_meal.meal_type.clone(),
                foods,
            });
        }

        tx.commit().await?;

        Ok(DietPlan {
            id: diet_plan_id,
            external_user_id: plan.external_user_id.clone(),
            meals,
        })
    }

    /// Fetches a plan with all its meals and foods from one consistent snapshot.
    async fn get_diet_plan_by_external_user_id(
        &self,
        external_user_id: &str,
    ) -> Result<DietPlan, DbError> {
        let mut tx = self.pool.begin().await?;

        let plan = sqlx::query_as::<_, DbDietPlan>(
            "SELECT id, external_user_id FROM diet_plans WHERE external_user_id = $1",
        )
        .bind(external_user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        let meals = sqlx::query_as::<_, DbMeal>(
            "SELECT id, meal_type, diet_plan_id FROM meals WHERE diet_plan_id = $1 ORDER BY id ASC",
        )
        .bind(plan.id)
        .fetch_all(&mut *tx)
        .await?;

        let foods = sqlx::query_as::<_, DbFood>(
            r#"
            SELECT f.id, f.name, f.quantity, f.meal_id
            FROM foods AS f
            JOIN meals AS m ON f.meal_id = m.id
            WHERE m.diet_plan_id = $1
            ORDER BY f.id ASC
            "#,
        )
        .bind(plan.id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(assemble_diet_plan(plan, meals, foods))
    }

    async fn delete_diet_plan_by_external_user_id(
        &self,
        external_user_id: &str,
    ) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let diet_plan_id: i32 = sqlx::query_scalar(
            "SELECT id FROM diet_plans WHERE external_user_id = $1 FOR UPDATE",
        )
        .bind(external_user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        Self::delete_diet_plan_tree(&mut tx, diet_plan_id).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_diet_plan_by_id(&self, id: i32) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        if !Self::delete_diet_plan_tree(&mut tx, id).await? {
            return Err(DbError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_food_quantity(&self, food_id: i32, quantity: &str) -> Result<Food, DbError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, DbFood>(
            "UPDATE foods SET quantity = $1 WHERE id = $2 RETURNING id, name, quantity, meal_id",
        )
        .bind(quantity)
        .bind(food_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete_food(&self, food_id: i32) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM foods WHERE id = $1")
            .bind(food_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}
