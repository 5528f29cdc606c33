use crate::{
    error::{AppError, Operation},
    AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    Json,
};
use core_types::{validate_new_diet_plan, validate_quantity_update, DietPlan, Food};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::Span;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalUserIdQuery {
    pub external_user_id: Option<String>,
}

/// Body of the plain `{message}` success responses.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// # GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// # POST /dietas
/// Creates a diet plan together with all of its meals and foods.
pub async fn create_diet_plan(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DietPlan>, AppError> {
    let Json(payload) = payload?;
    let new_plan = validate_new_diet_plan(&payload)?;
    Span::current().record("external_user_id", new_plan.external_user_id.as_str());

    let plan = state
        .store
        .create_diet_plan(&new_plan)
        .await
        .map_err(|e| AppError::database(e, Operation::CreateDietPlan))?;

    tracing::info!(
        diet_plan_id = plan.id,
        meals = plan.meal_count(),
        foods = plan.food_count(),
        "Diet plan created."
    );
    Ok(Json(plan))
}

/// # DELETE /delete_dietas
/// Deletes the diet plan (and its meals and foods) owned by `externalUserId`.
pub async fn delete_diet_plans(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let external_user_id = body_string(payload, "externalUserId")?;
    Span::current().record("external_user_id", external_user_id.as_str());

    state
        .store
        .delete_diet_plan_by_external_user_id(&external_user_id)
        .await
        .map_err(|e| AppError::database(e, Operation::DeleteDietPlans))?;

    tracing::info!("All diet plans for the external user id were deleted.");
    Ok(Json(MessageResponse {
        message: "All diet plans deleted successfully",
    }))
}

/// # GET /dieta?externalUserId=...
pub async fn get_diet_plan(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExternalUserIdQuery>,
) -> Result<Json<DietPlan>, AppError> {
    let external_user_id = query
        .external_user_id
        .filter(|id| !id.is_empty())
        .ok_or(AppError::MissingParameter("externalUserId"))?;
    Span::current().record("external_user_id", external_user_id.as_str());

    let plan = state
        .store
        .get_diet_plan_by_external_user_id(&external_user_id)
        .await
        .map_err(|e| AppError::database(e, Operation::GetDietPlan))?;

    tracing::info!(diet_plan_id = plan.id, "Diet plan found.");
    Ok(Json(plan))
}

/// # DELETE /dietas/:id
/// A non-numeric id names no diet plan, so it is reported as not found.
pub async fn delete_diet_plan_by_id(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = id.map_err(|_| not_found(Operation::DeleteDietPlan))?;
    Span::current().record("diet_plan_id", id);

    state
        .store
        .delete_diet_plan_by_id(id)
        .await
        .map_err(|e| AppError::database(e, Operation::DeleteDietPlan))?;

    tracing::info!("Diet plan deleted.");
    Ok(Json(MessageResponse {
        message: "Diet plan deleted successfully",
    }))
}

/// # PUT /update_quantidade
/// A body without a usable `foodId` names no food, so it is reported as not found.
pub async fn update_food_quantity(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Food>, AppError> {
    let Json(payload) = payload?;
    body_food_id(&payload).ok_or_else(|| not_found(Operation::UpdateFoodQuantity))?;
    let update = validate_quantity_update(&payload)?;
    Span::current().record("food_id", update.food_id);

    let food = state
        .store
        .update_food_quantity(update.food_id, &update.new_quantity)
        .await
        .map_err(|e| AppError::database(e, Operation::UpdateFoodQuantity))?;

    tracing::info!(quantity = %food.quantity, "Food quantity updated.");
    Ok(Json(food))
}

/// # DELETE /delete_alimento
pub async fn delete_food(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let food_id = payload
        .ok()
        .and_then(|Json(body)| body_food_id(&body))
        .ok_or_else(|| not_found(Operation::DeleteFood))?;
    Span::current().record("food_id", food_id);

    state
        .store
        .delete_food(food_id)
        .await
        .map_err(|e| AppError::database(e, Operation::DeleteFood))?;

    tracing::info!("Food deleted.");
    Ok(Json(MessageResponse {
        message: "Food deleted successfully",
    }))
}

// Identifier-only bodies: anything other than a usable value under `key`,
// including an unreadable body, means the identifier was not supplied.
// Food routes treat that as a lookup that found nothing.

fn body_string(
    payload: Result<Json<Value>, JsonRejection>,
    key: &'static str,
) -> Result<String, AppError> {
    payload
        .ok()
        .and_then(|Json(body)| body.get(key).and_then(Value::as_str).map(str::to_owned))
        .filter(|value| !value.is_empty())
        .ok_or(AppError::MissingParameter(key))
}

/// The `foodId` of a food-addressed body, if it is an integer in id range.
fn body_food_id(body: &Value) -> Option<i32> {
    body.get("foodId")
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
}

fn not_found(operation: Operation) -> AppError {
    AppError::NotFound(operation.not_found_message().to_string())
}
