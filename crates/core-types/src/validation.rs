//! Shape validation for inbound JSON payloads.
//!
//! Validators walk the raw document and collect every problem they find
//! instead of stopping at the first one, so a client gets the full list of
//! field errors in a single round trip. Only a fully valid document is turned
//! into a typed payload.

use serde_json::{Map, Value};

use crate::error::{FieldError, FieldErrorReason, ValidationErrors};
use crate::structs::{NewDietPlan, NewFood, NewMeal, QuantityUpdate};

type Object = Map<String, Value>;

/// Validates a create-diet-plan document:
/// `{externalUserId, meals: [{type, foods: [{name, quantity}]}]}`.
pub fn validate_new_diet_plan(payload: &Value) -> Result<NewDietPlan, ValidationErrors> {
    let mut errors = Vec::new();

    let Some(root) = payload.as_object() else {
        return Err(ValidationErrors(vec![FieldError::new(
            "",
            FieldErrorReason::ExpectedObject,
        )]));
    };

    let external_user_id = required_string(root, "", "externalUserId", &mut errors);
    let meals = required_array(root, "", "meals", &mut errors).map(|items| {
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| validate_meal(item, &format!("meals[{i}]"), &mut errors))
            .collect::<Vec<_>>()
    });

    match (external_user_id, meals) {
        (Some(external_user_id), Some(meals)) if errors.is_empty() => Ok(NewDietPlan {
            external_user_id,
            meals,
        }),
        _ => Err(ValidationErrors(errors)),
    }
}

/// Validates an update-quantity document: `{foodId, newQuantity}`.
pub fn validate_quantity_update(payload: &Value) -> Result<QuantityUpdate, ValidationErrors> {
    let mut errors = Vec::new();

    let Some(root) = payload.as_object() else {
        return Err(ValidationErrors(vec![FieldError::new(
            "",
            FieldErrorReason::ExpectedObject,
        )]));
    };

    let food_id = required_id(root, "", "foodId", &mut errors);
    let new_quantity = required_string(root, "", "newQuantity", &mut errors);

    match (food_id, new_quantity) {
        (Some(food_id), Some(new_quantity)) if errors.is_empty() => Ok(QuantityUpdate {
            food_id,
            new_quantity,
        }),
        _ => Err(ValidationErrors(errors)),
    }
}

fn validate_meal(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<NewMeal> {
    let Some(meal) = value.as_object() else {
        errors.push(FieldError::new(path, FieldErrorReason::ExpectedObject));
        return None;
    };

    let meal_type = required_string(meal, path, "type", errors);
    let foods = required_array(meal, path, "foods", errors).map(|items| {
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| validate_food(item, &format!("{path}.foods[{i}]"), errors))
            .collect::<Vec<_>>()
    });

    Some(NewMeal {
        meal_type: meal_type?,
        foods: foods?,
    })
}

fn validate_food(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<NewFood> {
    let Some(food) = value.as_object() else {
        errors.push(FieldError::new(path, FieldErrorReason::ExpectedObject));
        return None;
    };

    let name = required_string(food, path, "name", errors);
    let quantity = required_string(food, path, "quantity", errors);

    Some(NewFood {
        name: name?,
        quantity: quantity?,
    })
}

fn field_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn required<'a>(
    object: &'a Object,
    parent: &str,
    key: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a Value> {
    match object.get(key) {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(
                field_path(parent, key),
                FieldErrorReason::Missing,
            ));
            None
        }
        Some(value) => Some(value),
    }
}

fn required_string(
    object: &Object,
    parent: &str,
    key: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let value = required(object, parent, key, errors)?;
    match value.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            errors.push(FieldError::new(
                field_path(parent, key),
                FieldErrorReason::ExpectedString,
            ));
            None
        }
    }
}

fn required_array<'a>(
    object: &'a Object,
    parent: &str,
    key: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a Vec<Value>> {
    let value = required(object, parent, key, errors)?;
    match value.as_array() {
        Some(items) => Some(items),
        None => {
            errors.push(FieldError::new(
                field_path(parent, key),
                FieldErrorReason::ExpectedArray,
            ));
            None
        }
    }
}

fn required_id(
    object: &Object,
    parent: &str,
    key: &str,
    errors: &mut Vec<FieldError>,
) -> Option<i32> {
    let value = required(object, parent, key, errors)?;
    match value.as_i64().and_then(|n| i32::try_from(n).ok()) {
        Some(id) => Some(id),
        None => {
            errors.push(FieldError::new(
                field_path(parent, key),
                FieldErrorReason::ExpectedInteger,
            ));
            None
        }
    }
}
