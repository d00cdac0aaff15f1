//! Plain-text and JSON rendering

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{AppError, AppResult};

pub fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{}", text);
    Ok(())
}

/// Error body printed in `--json` mode
#[derive(Debug, Serialize)]
pub struct ErrorOutput<'a> {
    pub code: &'a str,
    pub message: String,
}

impl<'a> From<&'a AppError> for ErrorOutput<'a> {
    fn from(err: &'a AppError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

pub fn money(value: Decimal) -> String {
    if value.is_sign_negative() && !value.is_zero() {
        format!("-£{:.2}", value.abs().round_dp(2))
    } else {
        format!("£{:.2}", value.round_dp(2))
    }
}

/// Unit costs need more places than prices
pub fn unit_money(value: Decimal) -> String {
    format!("£{}", value.round_dp(4).normalize())
}

pub fn percent(value: Decimal) -> String {
    format!("{:.1}%", value.round_dp(1))
}

pub fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_money() {
        assert_eq!(money(dec("4.5")), "£4.50");
        assert_eq!(money(dec("-0.47")), "-£0.47");
        assert_eq!(money(Decimal::ZERO), "£0.00");
    }

    #[test]
    fn test_unit_money_and_percent() {
        assert_eq!(unit_money(dec("0.001836")), "£0.0018");
        assert_eq!(unit_money(dec("0.75")), "£0.75");
        assert_eq!(percent(dec("-10.4444")), "-10.4%");
        assert_eq!(or_dash(None), "-");
    }
}
