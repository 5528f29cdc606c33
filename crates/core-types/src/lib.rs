pub mod error;
pub mod structs;
pub mod validation;

// Re-export the core types to provide a clean public API.
pub use error::{FieldError, FieldErrorReason, ValidationErrors};
pub use structs::{DietPlan, Food, Meal, NewDietPlan, NewFood, NewMeal, QuantityUpdate};
pub use validation::{validate_new_diet_plan, validate_quantity_update};
