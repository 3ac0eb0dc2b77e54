//! Condition label to icon resource lookup.

pub const DEFAULT_ICON: &str = "./assets/default.png";

/// Icon path for a provider condition label. Unknown labels get [`DEFAULT_ICON`].
pub fn icon_for(condition: &str) -> &'static str {
    match condition {
        "Clear" => "./assets/clear.png",
        "Rain" => "./assets/rain.png",
        "Clouds" => "./assets/cloudy.png",
        "Snow" => "./assets/snow.png",
        "Thunderstorm" => "./assets/thunder.png",
        "Drizzle" => "./assets/drizzle.png",
        "Wind" => "./assets/wind.png",
        "Haze" => "./assets/haze.png",
        _ => DEFAULT_ICON,
    }
}
