use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;

/// Card details captured from the payment form.
///
/// Transient: lives only for the duration of a checkout attempt and is
/// never persisted. The expiry and CVN fields hold the raw form input
/// and are validated by [`validate`]; `Debug` redacts the PAN and CVN.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CardInput {
    pub name: String,
    /// Display-formatted number; may contain grouping spaces.
    pub number: String,
    pub expire_month: String,
    pub expire_year: String,
    pub cvn: String,
}

impl CardInput {
    /// The PAN with all formatting stripped.
    pub fn digits(&self) -> String {
        self.number.chars().filter(char::is_ascii_digit).collect()
    }

    /// Last four digits of the PAN, if any were entered.
    pub fn last4(&self) -> Option<String> {
        let digits = self.digits();
        if digits.is_empty() {
            None
        } else {
            let start = digits.len().saturating_sub(4);
            Some(digits[start..].to_string())
        }
    }
}

impl fmt::Debug for CardInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardInput")
            .field("name", &self.name)
            .field("number", &self.last4().map(|l| format!("…{l}")).unwrap_or_default())
            .field("expire_month", &self.expire_month)
            .field("expire_year", &self.expire_year)
            .field("cvn", &"***")
            .finish()
    }
}

/// Keys under which validation errors are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CardField {
    Name,
    Number,
    ExpireMonth,
    ExpireYear,
    /// The combined month/year check, distinct from the per-field ones
    /// so the UI can prioritize its message.
    Expiry,
    Cvn,
}

impl CardField {
    pub fn key(&self) -> &'static str {
        match self {
            CardField::Name => "card_name",
            CardField::Number => "card_number",
            CardField::ExpireMonth => "card_expire_month",
            CardField::ExpireYear => "card_expire_year",
            CardField::Expiry => "expiry",
            CardField::Cvn => "card_cvn",
        }
    }
}

/// Field-keyed validation errors. Empty means the input is valid.
/// Produced fresh on each [`validate`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<CardField, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message(&self, field: CardField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// The message to surface for the expiry inputs: the combined
    /// expiry check wins over the month and year field checks.
    pub fn expiry_message(&self) -> Option<&str> {
        self.message(CardField::Expiry)
            .or_else(|| self.message(CardField::ExpireMonth))
            .or_else(|| self.message(CardField::ExpireYear))
    }

    pub fn iter(&self) -> impl Iterator<Item = (CardField, &str)> {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: CardField, message: &str) {
        self.errors.insert(field, message.to_string());
    }
}

/// Strips formatting and regroups the digits into blocks of four
/// separated by single spaces. Idempotent.
pub fn format_card_number(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 4);
    for (i, digit) in raw.chars().filter(char::is_ascii_digit).enumerate() {
        if i > 0 && i % 4 == 0 {
            out.push(' ');
        }
        out.push(digit);
    }
    out
}

/// Standard Luhn checksum over a digit string: right to left, double
/// every second digit, subtract 9 when doubling exceeds 9, valid iff
/// the sum is divisible by 10.
///
/// Callers strip formatting first (see [`format_card_number`]); any
/// non-digit fails the check.
pub fn is_luhn_valid(digits: &str) -> bool {
    let mut sum = 0u32;
    let mut double = false;
    for ch in digits.chars().rev() {
        let Some(mut digit) = ch.to_digit(10) else {
            return false;
        };
        if double {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        double = !double;
    }
    sum % 10 == 0
}

/// Validates a complete card form against `reference` (today, in the
/// caller's timezone). Returns every failing field; two-digit years are
/// interpreted as 2000 + YY.
pub fn validate(input: &CardInput, reference: NaiveDate) -> ValidationResult {
    let mut result = ValidationResult::default();
    let digits = input.digits();

    if input.name.trim().is_empty() {
        result.insert(CardField::Name, "Name is required.");
    }

    // Length window and checksum share one message.
    if digits.len() < 13 || digits.len() > 19 || !is_luhn_valid(&digits) {
        result.insert(CardField::Number, "Invalid card number.");
    }

    let month = input.expire_month.trim().parse::<u32>().ok();
    if !matches!(month, Some(1..=12)) {
        result.insert(CardField::ExpireMonth, "Invalid month.");
    }

    match input.expire_year.trim().parse::<i32>() {
        Err(_) => result.insert(CardField::ExpireYear, "Invalid year."),
        Ok(year) => {
            let current_year = reference.year() % 100;
            let current_month = reference.month();
            // A month that failed to parse only trips the year comparison.
            let expired = year < current_year
                || (year == current_year && month.is_some_and(|m| m < current_month));
            if expired {
                result.insert(CardField::Expiry, "Card has expired.");
            }
        }
    }

    if input.cvn.len() < 3 {
        result.insert(CardField::Cvn, "Invalid CVN.");
    }

    result
}
