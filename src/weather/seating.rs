use crate::booking::SeatingPreference;

use super::types::WeatherCondition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatingAdvice {
    pub suggestion: SeatingPreference,
    pub rationale: &'static str,
}

pub struct SeatingAdvisor;

impl SeatingAdvisor {
    /// Total mapping from condition to advice. Never yields `Unspecified`.
    pub fn advise(condition: WeatherCondition) -> SeatingAdvice {
        match condition {
            WeatherCondition::Sunny => SeatingAdvice {
                suggestion: SeatingPreference::Outdoor,
                rationale: "The weather looks great! Outdoor seating should be perfect.",
            },
            WeatherCondition::Rainy => SeatingAdvice {
                suggestion: SeatingPreference::Indoor,
                rationale: "It might rain. Indoor seating would be more comfortable.",
            },
            WeatherCondition::Other => SeatingAdvice {
                suggestion: SeatingPreference::Indoor,
                rationale: "I recommend indoor seating.",
            },
        }
    }
}
