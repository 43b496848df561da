//! Advice lookup and recommendation text rendering.
//!
//! A static table keyed by (metric, category) holds the advisory strings.
//! The table is domain data carried over from the medical-advice copy; it is
//! deliberately not exhaustive (some metrics have no entry for the normal
//! category), and missing cells degrade to per-field placeholder text
//! instead of failing.

use crate::classify::{Category, Disease};

/// One cell of the advice table: three fixed advisory strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advice {
    pub diet: &'static str,
    pub food: &'static str,
    pub lifestyle: &'static str,
}

/// Placeholder lines used when a (metric, category) cell is empty.
pub const NO_DIET_ADVICE: &str = "No specific diet advice available.";
pub const NO_FOOD_ADVICE: &str = "No specific food advice available.";
pub const NO_LIFESTYLE_ADVICE: &str = "No specific lifestyle advice available.";

/// Look up advice for a classified reading.
///
/// Returns `None` when the table has no cell for the pair; the caller
/// substitutes the placeholder lines. `Glucose` resolves through the same
/// rows as `Sugar`.
pub fn advice_for(disease: Disease, category: Category) -> Option<&'static Advice> {
    use Category::*;
    use Disease::*;

    match (disease, category) {
        (Diabetes, Normal) => Some(&Advice {
            diet: "Maintain a balanced diet rich in fiber, whole grains, and lean proteins.",
            food: "Consume vegetables, fruits, beans, and nuts.",
            lifestyle: "Engage in regular physical activity and monitor blood sugar levels regularly.",
        }),
        (Diabetes, High) => Some(&Advice {
            diet: "Limit carbohydrate intake, avoid sugary drinks, and choose low glycemic index foods.",
            food: "Focus on lean proteins, non-starchy vegetables, and healthy fats.",
            lifestyle: "Maintain a balanced diet, exercise regularly, and take prescribed medications.",
        }),
        (Diabetes, Low) => Some(&Advice {
            diet: "Increase carbohydrate intake slightly to stabilize blood sugar levels.",
            food: "Consume fruits like apples and bananas, and whole grains.",
            lifestyle: "Monitor blood sugar levels frequently and adjust medication as necessary under a doctor’s guidance.",
        }),

        // Hypertension has no entry for the normal category.
        (Hypertension, Low) => Some(&Advice {
            diet: "Maintain a diet rich in potassium, magnesium, and fiber.",
            food: "Eat bananas, spinach, and whole grains.",
            lifestyle: "Practice stress-reducing techniques like yoga and meditation.",
        }),
        (Hypertension, High) => Some(&Advice {
            diet: "Reduce salt intake, avoid processed foods, and increase fruit and vegetable consumption.",
            food: "Include leafy greens, berries, and fatty fish.",
            lifestyle: "Regular aerobic exercise and monitor blood pressure levels.",
        }),
        (Hypertension, Normal) => None,

        // Fever has no entry for the normal category.
        (Fever, Low) => Some(&Advice {
            diet: "Stay hydrated and eat light, easily digestible foods.",
            food: "Consume soups, broths, and herbal teas.",
            lifestyle: "Get plenty of rest and avoid strenuous activities.",
        }),
        (Fever, High) => Some(&Advice {
            diet: "Stay hydrated, consume cooling foods, and avoid heavy, greasy meals.",
            food: "Include water, fresh fruit juices, and salads.",
            lifestyle: "Rest is crucial, take fever-reducing medications as prescribed.",
        }),
        (Fever, Normal) => None,

        (BloodPressure, Normal) => Some(&Advice {
            diet: "Maintain a balanced diet with moderate salt intake.",
            food: "Include fruits, vegetables, and lean proteins.",
            lifestyle: "Engage in regular physical activity and monitor blood pressure levels.",
        }),
        (BloodPressure, High) => Some(&Advice {
            diet: "Reduce salt intake, avoid processed foods, and increase fruit and vegetable consumption.",
            food: "Include leafy greens, berries, and fatty fish.",
            lifestyle: "Regular aerobic exercise and monitor blood pressure levels.",
        }),
        (BloodPressure, Low) => Some(&Advice {
            diet: "Increase salt intake slightly, consume more fluids.",
            food: "Eat salty foods like olives and soups.",
            lifestyle: "Stay hydrated, avoid standing for long periods.",
        }),

        (Sugar | Glucose, Normal) => Some(&Advice {
            diet: "Maintain a balanced diet rich in fiber, whole grains, and lean proteins.",
            food: "Consume vegetables, fruits, beans, and nuts.",
            lifestyle: "Engage in regular physical activity and monitor sugar levels regularly.",
        }),
        (Sugar | Glucose, High) => Some(&Advice {
            diet: "Limit carbohydrate intake, avoid sugary drinks, and choose low glycemic index foods.",
            food: "Focus on lean proteins, non-starchy vegetables, and healthy fats.",
            lifestyle: "Maintain a balanced diet, exercise regularly, and take prescribed medications.",
        }),
        (Sugar | Glucose, Low) => Some(&Advice {
            diet: "Increase carbohydrate intake slightly to stabilize sugar levels.",
            food: "Consume fruits like apples and bananas, and whole grains.",
            lifestyle: "Monitor sugar levels frequently and adjust medication as necessary under a doctor’s guidance.",
        }),
    }
}

/// Render the persisted recommendation text for a classified reading.
///
/// Format is three lines, one per advice field. Empty cells fall back to
/// the placeholder lines rather than producing an error.
pub fn render_recommendations(disease: Disease, category: Category) -> String {
    match advice_for(disease, category) {
        Some(advice) => format!(
            "Diet: {}\nFood: {}\nLifestyle: {}",
            advice.diet, advice.food, advice.lifestyle
        ),
        None => format!(
            "Diet: {}\nFood: {}\nLifestyle: {}",
            NO_DIET_ADVICE, NO_FOOD_ADVICE, NO_LIFESTYLE_ADVICE
        ),
    }
}
