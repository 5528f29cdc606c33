//! Shared fixtures for the HTTP API tests.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use core_types::{DietPlan, Food, Meal, NewDietPlan};
use database::{DbError, DietStore};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use web_server::{build_router, AppState};

#[derive(Default)]
struct Tables {
    next_id: i32,
    plans: Vec<(i32, String)>,
    meals: Vec<(i32, String, i32)>,
    foods: Vec<(i32, String, String, i32)>,
}

impl Tables {
    fn id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn cascade_delete(&mut self, plan_id: i32) -> bool {
        let meal_ids: Vec<i32> = self
            .meals
            .iter()
            .filter(|(_, _, owner)| *owner == plan_id)
            .map(|(id, _, _)| *id)
            .collect();
        self.foods.retain(|(_, _, _, meal)| !meal_ids.contains(meal));
        self.meals.retain(|(_, _, owner)| *owner != plan_id);
        let before = self.plans.len();
        self.plans.retain(|(id, _)| *id != plan_id);
        self.plans.len() != before
    }
}

/// A `DietStore` over in-process tables with the same uniqueness and cascade
/// rules as the PostgreSQL schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn food_rows(&self) -> usize {
        self.tables.lock().unwrap().foods.len()
    }

    pub fn meal_rows(&self) -> usize {
        self.tables.lock().unwrap().meals.len()
    }
}

#[async_trait]
impl DietStore for MemoryStore {
    async fn create_diet_plan(&self, plan: &NewDietPlan) -> Result<DietPlan, DbError> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .plans
            .iter()
            .any(|(_, external)| *external == plan.external_user_id)
        {
            return Err(DbError::Integrity(
                "duplicate key value violates unique constraint".to_string(),
            ));
        }

        let plan_id = tables.id();
        tables.plans.push((plan_id, plan.external_user_id.clone()));

        let mut meals = Vec::new();
        for new_meal in &plan.meals {
            let meal_id = tables.id();
            tables
                .meals
                .push((meal_id, new_meal.meal_type.clone(), plan_id));
            let mut foods = Vec::new();
            for new_food in &new_meal.foods {
                let food_id = tables.id();
                tables.foods.push((
                    food_id,
                    new_food.name.clone(),
                    new_food.quantity.clone(),
                    meal_id,
                ));
                foods.push(Food {
                    id: food_id,
                    name: new_food.name.clone(),
                    quantity: new_food.quantity.clone(),
                });
            }
            meals.push(Meal {
                id: meal_id,
                meal_type: new_meal.meal_type.clone(),
                foods,
            });
        }

        Ok(DietPlan {
            id: plan_id,
            external_user_id: plan.external_user_id.clone(),
            meals,
        })
    }

    async fn get_diet_plan_by_external_user_id(
        &self,
        external_user_id: &str,
    ) -> Result<DietPlan, DbError> {
        let tables = self.tables.lock().unwrap();
        let (plan_id, external) = tables
            .plans
            .iter()
            .find(|(_, external)| external == external_user_id)
            .cloned()
            .ok_or(DbError::NotFound)?;

        let meals = tables
            .meals
            .iter()
            .filter(|(_, _, owner)| *owner == plan_id)
            .map(|(meal_id, meal_type, _)| Meal {
                id: *meal_id,
                meal_type: meal_type.clone(),
                foods: tables
                    .foods
                    .iter()
                    .filter(|(_, _, _, meal)| meal == meal_id)
                    .map(|(id, name, quantity, _)| Food {
                        id: *id,
                        name: name.clone(),
                        quantity: quantity.clone(),
                    })
                    .collect(),
            })
            .collect();

        Ok(DietPlan {
            id: plan_id,
            external_user_id: external,
            meals,
        })
    }

    async fn delete_diet_plan_by_external_user_id(
        &self,
        external_user_id: &str,
    ) -> Result<(), DbError> {
        let mut tables = self.tables.lock().unwrap();
        let plan_id = tables
            .plans
            .iter()
            .find(|(_, external)| external == external_user_id)
            .map(|(id, _)| *id)
            .ok_or(DbError::NotFound)?;
        tables.cascade_delete(plan_id);
        Ok(())
    }

    async fn delete_diet_plan_by_id(&self, id: i32) -> Result<(), DbError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.cascade_delete(id) {
            Ok(())
        } else {
            Err(DbError::NotFound)
        }
    }

    async fn update_food_quantity(&self, food_id: i32, quantity: &str) -> Result<Food, DbError> {
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .foods
            .iter_mut()
            .find(|(id, _, _, _)| *id == food_id)
            .ok_or(DbError::NotFound)?;
        row.2 = quantity.to_string();
        Ok(Food {
            id: row.0,
            name: row.1.clone(),
            quantity: row.2.clone(),
        })
    }

    async fn delete_food(&self, food_id: i32) -> Result<(), DbError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.foods.len();
        tables.foods.retain(|(id, _, _, _)| *id != food_id);
        if tables.foods.len() == before {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}

/// A store whose every call fails the way an unreachable database would.
pub struct BrokenStore;

fn broken() -> DbError {
    DbError::ConnectionConfigError("connection refused".to_string())
}

#[async_trait]
impl DietStore for BrokenStore {
    async fn create_diet_plan(&self, _plan: &NewDietPlan) -> Result<DietPlan, DbError> {
        Err(broken())
    }

    async fn get_diet_plan_by_external_user_id(&self, _id: &str) -> Result<DietPlan, DbError> {
        Err(broken())
    }

    async fn delete_diet_plan_by_external_user_id(&self, _id: &str) -> Result<(), DbError> {
        Err(broken())
    }

    async fn delete_diet_plan_by_id(&self, _id: i32) -> Result<(), DbError> {
        Err(broken())
    }

    async fn update_food_quantity(&self, _food_id: i32, _quantity: &str) -> Result<Food, DbError> {
        Err(broken())
    }

    async fn delete_food(&self, _food_id: i32) -> Result<(), DbError> {
        Err(broken())
    }
}

pub fn app_with(store: Arc<dyn DietStore>) -> Router {
    build_router(AppState::new(store), 1024 * 1024)
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Sends one request through the router. Non-JSON bodies come back as a JSON string.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}
