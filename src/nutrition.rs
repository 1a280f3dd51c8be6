//! Allergy screening of suggested meal plans.
//!
//! An allergen matches an ingredient when the lowercased ingredient contains
//! it as a substring, so `"nut"` flags `"walnuts"` and `"peanut butter"`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            _ => None,
        }
    }
}

/// A recipe as served by the recommendation endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "Name", default)]
    pub name: String,
    /// R-style vector literal, e.g. `c("oats", "milk")`.
    #[serde(rename = "RecipeIngredientParts", default)]
    pub ingredient_parts: String,
}

impl Recipe {
    pub fn ingredients(&self) -> Vec<String> {
        parse_ingredient_list(&self.ingredient_parts)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlan {
    #[serde(default)]
    pub breakfast: Option<Recipe>,
    #[serde(default)]
    pub lunch: Option<Recipe>,
    #[serde(default)]
    pub dinner: Option<Recipe>,
}

impl MealPlan {
    pub fn meal(&self, meal_type: MealType) -> Option<&Recipe> {
        match meal_type {
            MealType::Breakfast => self.breakfast.as_ref(),
            MealType::Lunch => self.lunch.as_ref(),
            MealType::Dinner => self.dinner.as_ref(),
        }
    }

    /// Meals present in the plan, in breakfast → dinner order.
    pub fn meals(&self) -> impl Iterator<Item = (MealType, &Recipe)> + '_ {
        MealType::ALL
            .into_iter()
            .filter_map(move |t| self.meal(t).map(|r| (t, r)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllergyWarning {
    pub meal: MealType,
    pub recipe: String,
    /// Allergens found, in the order of the user's allergy list.
    pub allergens: Vec<String>,
}

/// Split a comma-separated allergy field into lowercased, trimmed names.
pub fn parse_allergies(csv: &str) -> Vec<String> {
    let mut allergies: Vec<String> = Vec::new();
    for allergy in csv.split(',').map(|a| a.trim().to_lowercase()) {
        if !allergy.is_empty() && !allergies.contains(&allergy) {
            allergies.push(allergy);
        }
    }
    allergies
}

/// Parse `c("a", "b")` (or a bare `a, b`) into lowercased ingredients.
pub fn parse_ingredient_list(raw: &str) -> Vec<String> {
    let inner = raw.trim();
    let inner = inner.strip_prefix("c(").unwrap_or(inner);
    let inner = inner.strip_suffix(')').unwrap_or(inner);

    inner
        .split(',')
        .map(|part| part.trim().trim_matches('"').trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Allergies that occur in any of the ingredients.
pub fn allergens_in<S: AsRef<str>>(ingredients: &[S], allergies: &[String]) -> Vec<String> {
    let ingredients: Vec<String> = ingredients.iter().map(|i| i.as_ref().to_lowercase()).collect();

    allergies
        .iter()
        .filter(|allergy| !allergy.is_empty())
        .filter(|allergy| ingredients.iter().any(|i| i.contains(allergy.as_str())))
        .cloned()
        .collect()
}

/// One warning per meal that contains at least one allergen.
pub fn check_meal_plan(plan: &MealPlan, allergies: &[String]) -> Vec<AllergyWarning> {
    let warnings: Vec<AllergyWarning> = plan
        .meals()
        .filter_map(|(meal, recipe)| {
            let found = allergens_in(&recipe.ingredients(), allergies);
            (!found.is_empty()).then(|| AllergyWarning {
                meal,
                recipe: recipe.name.clone(),
                allergens: found,
            })
        })
        .collect();

    for w in &warnings {
        warn!(meal = w.meal.as_str(), recipe = %w.recipe, allergens = ?w.allergens, "Allergen in suggested meal");
    }
    debug!(meals = plan.meals().count(), flagged = warnings.len(), "Meal plan screened");
    warnings
}

/// Meals free of every listed allergen.
pub fn safe_meals<'a>(plan: &'a MealPlan, allergies: &[String]) -> Vec<(MealType, &'a Recipe)> {
    plan.meals()
        .filter(|(_, recipe)| allergens_in(&recipe.ingredients(), allergies).is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(name: &str, parts: &str) -> Recipe {
        Recipe {
            name: name.into(),
            ingredient_parts: parts.into(),
        }
    }

    fn plan() -> MealPlan {
        MealPlan {
            breakfast: Some(recipe("Peanut Oat Bowl", r#"c("rolled oats", "Peanut Butter", "milk")"#)),
            lunch: Some(recipe("Quinoa Salad", r#"c("quinoa", "cucumber", "lemon")"#)),
            dinner: Some(recipe("Shrimp Pasta", r#"c("pasta", "shrimp", "garlic", "parmesan cheese")"#)),
        }
    }

    #[test]
    fn allergy_list_is_normalised() {
        assert_eq!(
            parse_allergies(" Peanut, SHELLFISH ,, peanut,shrimp "),
            vec!["peanut", "shellfish", "shrimp"]
        );
        assert!(parse_allergies("").is_empty());
    }

    #[test]
    fn r_vector_ingredients() {
        assert_eq!(
            parse_ingredient_list(r#"c("Rolled Oats", "milk")"#),
            vec!["rolled oats", "milk"]
        );
        assert_eq!(parse_ingredient_list("eggs, toast"), vec!["eggs", "toast"]);
        assert!(parse_ingredient_list("c()").is_empty());
    }

    #[test]
    fn substring_match() {
        let allergies = parse_allergies("nut, milk");
        let found = allergens_in(&["walnuts", "oat milk", "honey"], &allergies);
        assert_eq!(found, vec!["nut", "milk"]);
        assert!(allergens_in(&["rice"], &allergies).is_empty());
    }

    #[test]
    fn meal_plan_warnings() {
        let warnings = check_meal_plan(&plan(), &parse_allergies("peanut, shrimp"));
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].meal, MealType::Breakfast);
        assert_eq!(warnings[0].allergens, vec!["peanut"]);
        assert_eq!(warnings[1].meal, MealType::Dinner);
        assert_eq!(warnings[1].recipe, "Shrimp Pasta");
    }

    #[test]
    fn safe_meals_skip_flagged() {
        let plan = plan();
        let safe = safe_meals(&plan, &parse_allergies("peanut, shrimp"));
        assert_eq!(safe.len(), 1);
        assert_eq!(safe[0].0, MealType::Lunch);

        assert_eq!(safe_meals(&plan, &[]).len(), 3);
    }

    #[test]
    fn missing_meals_are_skipped() {
        let plan = MealPlan {
            lunch: Some(recipe("Egg Salad", r#"c("egg", "mayonnaise")"#)),
            ..Default::default()
        };
        let warnings = check_meal_plan(&plan, &parse_allergies("egg"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].meal, MealType::Lunch);
    }

    #[test]
    fn plan_deserializes_from_server_shape() {
        let json = r#"{"breakfast": {"Name": "Toast", "RecipeIngredientParts": "c(\"bread\", \"butter\")"}}"#;
        let plan: MealPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.breakfast.as_ref().unwrap().ingredients(), vec!["bread", "butter"]);
        assert!(plan.dinner.is_none());
    }

    #[test]
    fn meal_type_names() {
        assert_eq!(MealType::from_str(" Dinner "), Some(MealType::Dinner));
        assert_eq!(MealType::from_str("brunch"), None);
        assert_eq!(MealType::Lunch.as_str(), "lunch");
    }
}
