use super::types::{Condition, CurrentResponse, RawSample};

const HIGH_WIND_MS: f64 = 10.0;
const HEAT_ALERT_C: f64 = 33.0;
const FREEZE_C: f64 = 0.0;
const HIGH_UV_INDEX: f64 = 7.0;
const HIGH_POP: f64 = 0.6;

/// Rule-based hazard suggestions for the current conditions and the upcoming
/// forecast. Always returns at least one line; calm weather gets the
/// all-clear message.
pub fn suggestions(current: &CurrentResponse, samples: &[RawSample]) -> Vec<String> {
    let mut out = Vec::new();

    let condition = current
        .weather
        .first()
        .map(|w| Condition::from_name(&w.main));
    if matches!(
        condition,
        Some(Condition::Rain | Condition::Drizzle | Condition::Thunderstorm)
    ) {
        out.push("Rain expected: avoid outdoor events and carry an umbrella.".to_string());
    }
    if current.wind.speed >= HIGH_WIND_MS {
        out.push("High winds: avoid boating and secure loose outdoor objects.".to_string());
    }
    if current.main.temp >= HEAT_ALERT_C {
        out.push(
            "Heat alert: avoid intense outdoor exercise during peak hours and stay hydrated."
                .to_string(),
        );
    }
    if current.main.temp <= FREEZE_C {
        out.push("Freezing temperatures: dress warmly and avoid prolonged exposure.".to_string());
    }
    if current.uvi.is_some_and(|uvi| uvi >= HIGH_UV_INDEX) {
        out.push("High UV index: wear sunscreen and protective clothing.".to_string());
    }
    if samples
        .iter()
        .any(|s| s.pop.is_some_and(|p| p >= HIGH_POP))
    {
        out.push(
            "Some upcoming days have a high rain probability: consider indoor plans for those days."
                .to_string(),
        );
    }

    if out.is_empty() {
        out.push("No major hazards detected. Enjoy your day and check back for updates.".to_string());
    }
    out
}
