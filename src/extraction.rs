//! Text-to-number parsing rules shared by the column extractors.
//!
//! Each rule is a named, compiled pattern held by [`ParsingRules`]. There is
//! no global regex state: a registry compiles one `ParsingRules` and hands it
//! to the extractors that need it.

use regex::Regex;

/// Decimal number: digits, optional point, optional digits
pub const NUMBER_PATTERN: &str = r"[0-9]+\.?[0-9]*";

/// Mixing ratio written as `number : number`
pub const RATIO_PATTERN: &str = r"([0-9]+\.?[0-9]*)\s?:\s?([0-9]+\.?[0-9]*)";

/// A number or one of the room-temperature tokens, whichever comes first
pub const TEMPERATURE_PATTERN: &str = r"[0-9]+\.?[0-9]*|室温|常温";

/// Celsius value substituted for "room temperature"
pub const AMBIENT_CELSIUS: f64 = 26.0;

pub const KELVIN_OFFSET: f64 = 273.15;

/// A temperature reading found in a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemperatureReading {
    Celsius(f64),
    Ambient,
}

impl TemperatureReading {
    pub fn celsius(self) -> f64 {
        match self {
            TemperatureReading::Celsius(value) => value,
            TemperatureReading::Ambient => AMBIENT_CELSIUS,
        }
    }
}

/// Compiled parsing rules
#[derive(Debug, Clone)]
pub struct ParsingRules {
    number: Regex,
    ratio: Regex,
    temperature: Regex,
}

impl ParsingRules {
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            number: Regex::new(NUMBER_PATTERN)?,
            ratio: Regex::new(RATIO_PATTERN)?,
            temperature: Regex::new(TEMPERATURE_PATTERN)?,
        })
    }

    /// First decimal number in `text`
    ///
    /// # Example
    ///
    /// ```
    /// use epoxy_prep::extraction::ParsingRules;
    ///
    /// let rules = ParsingRules::compile().unwrap();
    /// assert_eq!(rules.first_number("约 380 g/mol"), Some(380.0));
    /// assert_eq!(rules.first_number("未测"), None);
    /// ```
    pub fn first_number(&self, text: &str) -> Option<f64> {
        self.number
            .find(text)
            .and_then(|m| m.as_str().parse::<f64>().ok())
    }

    /// Every decimal number in `text`, in order of appearance.
    ///
    /// Matches that do not parse are skipped.
    pub fn all_numbers(&self, text: &str) -> Vec<f64> {
        self.number
            .find_iter(text)
            .filter_map(|m| m.as_str().parse::<f64>().ok())
            .collect()
    }

    /// Both sides of the first `a : b` ratio in `text`, rounded to 2 decimals
    pub fn ratio_sides(&self, text: &str) -> Option<(f64, f64)> {
        let caps = self.ratio.captures(text)?;
        let left = caps.get(1)?.as_str().parse::<f64>().ok()?;
        let right = caps.get(2)?.as_str().parse::<f64>().ok()?;
        Some((round2(left), round2(right)))
    }

    pub fn temperature(&self, text: &str) -> Option<TemperatureReading> {
        let found = self.temperature.find(text)?.as_str();
        match found {
            "室温" | "常温" => Some(TemperatureReading::Ambient),
            number => number.parse::<f64>().ok().map(TemperatureReading::Celsius),
        }
    }
}

/// Round half away from zero at 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ParsingRules {
        ParsingRules::compile().unwrap()
    }

    #[test]
    fn test_first_number_skips_leading_text() {
        let rules = rules();
        assert_eq!(rules.first_number("E-51, 约 185.5 g/eq"), Some(51.0));
        assert_eq!(rules.first_number("KIC = 1.234 MPa"), Some(1.234));
        assert_eq!(rules.first_number("12."), Some(12.0));
    }

    #[test]
    fn test_first_number_missing() {
        let rules = rules();
        assert_eq!(rules.first_number(""), None);
        assert_eq!(rules.first_number("无"), None);
        assert_eq!(rules.first_number(".5"), Some(5.0));
    }

    #[test]
    fn test_all_numbers_in_order() {
        let rules = rules();
        assert_eq!(rules.all_numbers("100:32.5"), vec![100.0, 32.5]);
        assert_eq!(rules.all_numbers("3.0 and 1.0 and 7"), vec![3.0, 1.0, 7.0]);
        assert!(rules.all_numbers("适量").is_empty());
    }

    #[test]
    fn test_ratio_sides_allow_single_space() {
        let rules = rules();
        assert_eq!(rules.ratio_sides("30:70"), Some((30.0, 70.0)));
        assert_eq!(rules.ratio_sides("填料 1 : 4"), Some((1.0, 4.0)));
        assert_eq!(rules.ratio_sides("1.256:3"), Some((1.26, 3.0)));
        assert_eq!(rules.ratio_sides("45%"), None);
        assert_eq!(rules.ratio_sides("1  :  4"), None);
    }

    #[test]
    fn test_temperature_takes_leftmost_match() {
        let rules = rules();
        assert_eq!(rules.temperature("25℃"), Some(TemperatureReading::Celsius(25.0)));
        assert_eq!(rules.temperature("室温"), Some(TemperatureReading::Ambient));
        assert_eq!(rules.temperature("常温(约25℃)"), Some(TemperatureReading::Ambient));
        assert_eq!(rules.temperature("-"), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(42.857142), 42.86);
        assert_eq!(round2(1.0), 1.0);
        assert_eq!(round2(0.125), 0.13);
    }
}
