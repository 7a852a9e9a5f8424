use chrono::NaiveTime;
use engine::{EngineError, MoneyCents};

use crate::event::ReminderSetting;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty message")]
    Empty,
    #[error("{0}")]
    Amount(String),
    #[error("expected \"name, price\", for example \"Rice, 25\"")]
    ProductPair,
    #[error("expected on, off or a time such as 20:00")]
    Reminder,
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Amount(message) => EngineError::InvalidAmount(message),
            other => EngineError::MalformedInput(other.to_string()),
        }
    }
}

/// Text typed where an amount or a new product is expected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManualEntry {
    Amount(MoneyCents),
    Product { name: String, price: MoneyCents },
}

pub fn parse_amount(input: &str) -> Result<MoneyCents, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    MoneyCents::parse_positive(trimmed).map_err(|err| match err {
        EngineError::InvalidAmount(message) => ParseError::Amount(message),
        other => ParseError::Amount(other.to_string()),
    })
}

/// Parses `"name, price"`. The name is everything before the first comma.
pub fn parse_product_pair(input: &str) -> Result<(String, MoneyCents), ParseError> {
    let (name, price) = input.split_once(',').ok_or(ParseError::ProductPair)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ParseError::ProductPair);
    }
    let price = parse_amount(price).map_err(|err| match err {
        ParseError::Empty => ParseError::ProductPair,
        other => other,
    })?;
    Ok((name.to_string(), price))
}

/// A bare amount wins over a pair, so `"12,50"` is twelve and a half.
pub fn parse_manual_entry(input: &str) -> Result<ManualEntry, ParseError> {
    if let Ok(amount) = parse_amount(input) {
        return Ok(ManualEntry::Amount(amount));
    }
    if !input.contains(',') {
        return parse_amount(input).map(ManualEntry::Amount);
    }
    let (name, price) = parse_product_pair(input)?;
    Ok(ManualEntry::Product { name, price })
}

/// `on`, `off` or `HH:MM` (24h).
pub fn parse_reminder_setting(input: &str) -> Result<ReminderSetting, ParseError> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("on") {
        return Ok(ReminderSetting::On);
    }
    if trimmed.eq_ignore_ascii_case("off") {
        return Ok(ReminderSetting::Off);
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map(ReminderSetting::At)
        .map_err(|_| ParseError::Reminder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_accepts_comma_and_rejects_zero() {
        assert_eq!(parse_amount(" 12,5 ").unwrap(), MoneyCents::new(1_250));
        assert!(matches!(parse_amount("0"), Err(ParseError::Amount(_))));
        assert!(matches!(parse_amount("abc"), Err(ParseError::Amount(_))));
        assert_eq!(parse_amount("  "), Err(ParseError::Empty));
    }

    #[test]
    fn pair_splits_on_first_comma() {
        let (name, price) = parse_product_pair("Rice, 25").unwrap();
        assert_eq!(name, "Rice");
        assert_eq!(price, MoneyCents::new(2_500));

        let (name, price) = parse_product_pair("Cheese, 3,75").unwrap();
        assert_eq!(name, "Cheese");
        assert_eq!(price, MoneyCents::new(375));
    }

    #[test]
    fn pair_needs_name_and_price() {
        assert_eq!(parse_product_pair("Rice"), Err(ParseError::ProductPair));
        assert_eq!(parse_product_pair(", 25"), Err(ParseError::ProductPair));
        assert_eq!(parse_product_pair("Rice,"), Err(ParseError::ProductPair));
        assert!(matches!(parse_product_pair("Rice, -2"), Err(ParseError::Amount(_))));
    }

    #[test]
    fn manual_entry_prefers_amount() {
        assert_eq!(
            parse_manual_entry("12,50").unwrap(),
            ManualEntry::Amount(MoneyCents::new(1_250))
        );
        assert_eq!(
            parse_manual_entry("Milk, 12").unwrap(),
            ManualEntry::Product {
                name: "Milk".to_string(),
                price: MoneyCents::new(1_200),
            }
        );
        assert!(matches!(parse_manual_entry("lots"), Err(ParseError::Amount(_))));
    }

    #[test]
    fn reminder_settings() {
        assert_eq!(parse_reminder_setting("ON").unwrap(), ReminderSetting::On);
        assert_eq!(parse_reminder_setting("off").unwrap(), ReminderSetting::Off);
        assert_eq!(
            parse_reminder_setting("07:30").unwrap(),
            ReminderSetting::At(NaiveTime::from_hms_opt(7, 30, 0).unwrap())
        );
        assert_eq!(parse_reminder_setting("25:00"), Err(ParseError::Reminder));
        assert_eq!(parse_reminder_setting("later"), Err(ParseError::Reminder));
    }

    #[test]
    fn errors_map_to_engine_kinds() {
        assert!(matches!(
            EngineError::from(ParseError::Amount("bad".into())),
            EngineError::InvalidAmount(_)
        ));
        assert!(matches!(
            EngineError::from(ParseError::ProductPair),
            EngineError::MalformedInput(_)
        ));
    }
}
