use serde::{Deserialize, Serialize};

/// The root entity: one user's diet, identified by an external user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    pub id: i32,
    pub external_user_id: String,
    pub meals: Vec<Meal>,
}

/// A labelled group of foods (e.g. "breakfast") belonging to a diet plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub id: i32,
    #[serde(rename = "type")]
    pub meal_type: String,
    pub foods: Vec<Food>,
}

/// A food item within a meal. `quantity` is free-form text and is never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    pub id: i32,
    pub name: String,
    pub quantity: String,
}

impl DietPlan {
    pub fn meal_count(&self) -> usize {
        self.meals.len()
    }

    pub fn food_count(&self) -> usize {
        self.meals.iter().map(|m| m.foods.len()).sum()
    }
}

// ==============================================================================
// Create payloads
// ==============================================================================
// These only ever come out of `validation`, so they carry no ids.

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDietPlan {
    pub external_user_id: String,
    pub meals: Vec<NewMeal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMeal {
    #[serde(rename = "type")]
    pub meal_type: String,
    pub foods: Vec<NewFood>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFood {
    pub name: String,
    pub quantity: String,
}

/// A validated `PUT /update_quantidade` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityUpdate {
    pub food_id: i32,
    pub new_quantity: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn diet_plan_serializes_to_nested_wire_shape() {
        let plan = DietPlan {
            id: 1,
            external_user_id: "u1".to_string(),
            meals: vec![Meal {
                id: 7,
                meal_type: "breakfast".to_string(),
                foods: vec![Food {
                    id: 9,
                    name: "egg".to_string(),
                    quantity: "2".to_string(),
                }],
            }],
        };

        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "externalUserId": "u1",
                "meals": [{
                    "id": 7,
                    "type": "breakfast",
                    "foods": [{ "id": 9, "name": "egg", "quantity": "2" }]
                }]
            })
        );
        assert_eq!(plan.meal_count(), 1);
        assert_eq!(plan.food_count(), 1);
    }
}
