//! Field-level validation for requests and adapter configuration.
//!
//! Request types implement [`Validate`]; adapters call it immediately before
//! dispatch so invalid requests never reach the transport. Implementations
//! collect failures with a [`Validator`] and report all of them at once.
//!
//! ```rust
//! use paygap::validate::{Validate, ValidationErrors, Validator};
//!
//! struct Verify {
//!     amount: u64,
//!     authority: String,
//! }
//!
//! impl Validate for Verify {
//!     fn validate(&self) -> Result<(), ValidationErrors> {
//!         Validator::new()
//!             .min("amount", self.amount, 1000)
//!             .required("authority", &self.authority)
//!             .finish()
//!     }
//! }
//!
//! let err = Verify { amount: 10, authority: String::new() }.validate().unwrap_err();
//! assert_eq!(err.len(), 2);
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^09\d{9}$").expect("static regex"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex")
});
static IBAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^IR\d{24}$").expect("static regex"));

/// Types that can check their own field constraints.
pub trait Validate {
    /// Checks every constraint and returns all violations.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing each failing field.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// The constraint a field violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// The field is missing or blank.
    Required,
    /// The value is below the minimum.
    Min(u64),
    /// The value is above the maximum.
    Max(u64),
    /// The value is shorter than allowed.
    MinLen(usize),
    /// The value is longer than allowed.
    MaxLen(usize),
    /// The value does not have the exact length required.
    Len(usize),
    /// The value is not an absolute `http`/`https` URL.
    Url,
    /// The value is not an email address.
    Email,
    /// The value is not a mobile number of the form `09xxxxxxxxx`.
    Mobile,
    /// The value is not an `IR` IBAN.
    Iban,
    /// The value is not one of the accepted options.
    OneOf(&'static [&'static str]),
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("is required"),
            Self::Min(min) => write!(f, "must be at least {min}"),
            Self::Max(max) => write!(f, "must be at most {max}"),
            Self::MinLen(len) => write!(f, "must be at least {len} characters"),
            Self::MaxLen(len) => write!(f, "must be at most {len} characters"),
            Self::Len(len) => write!(f, "must be exactly {len} characters"),
            Self::Url => f.write_str("must be an absolute http(s) url"),
            Self::Email => f.write_str("must be an email address"),
            Self::Mobile => f.write_str("must be a mobile number like 09123456789"),
            Self::Iban => f.write_str("must be an IR iban"),
            Self::OneOf(options) => write!(f, "must be one of {}", options.join(", ")),
        }
    }
}

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire name of the field.
    pub field: &'static str,
    /// The rule it broke.
    pub rule: Rule,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.rule)
    }
}

/// Every constraint violation found in one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", join(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Returns the individual field errors.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns the number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` if there are no violations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `true` if `field` has at least one violation.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates field violations.
#[derive(Debug, Default)]
#[must_use = "call `finish` to obtain the validation result"]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    /// Starts an empty validation pass.
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    fn check(mut self, ok: bool, field: &'static str, rule: Rule) -> Self {
        if !ok {
            self.errors.push(FieldError { field, rule });
        }
        self
    }

    /// `value` must contain a non-whitespace character.
    pub fn required(self, field: &'static str, value: &str) -> Self {
        self.check(!value.trim().is_empty(), field, Rule::Required)
    }

    /// `value` must be at least `min`.
    pub fn min(self, field: &'static str, value: u64, min: u64) -> Self {
        self.check(value >= min, field, Rule::Min(min))
    }

    /// `value` must be at most `max`.
    pub fn max(self, field: &'static str, value: u64, max: u64) -> Self {
        self.check(value <= max, field, Rule::Max(max))
    }

    /// The sum of `values` must be at most `max`. A sum that overflows `u64`
    /// is reported the same way.
    pub fn sum_max<I>(self, field: &'static str, values: I, max: u64) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let within = values
            .into_iter()
            .try_fold(0u64, u64::checked_add)
            .is_some_and(|total| total <= max);
        self.check(within, field, Rule::Max(max))
    }

    /// `value` must lie in `min..=max`; reports whichever bound it crossed.
    pub fn range(self, field: &'static str, value: u64, min: u64, max: u64) -> Self {
        self.min(field, value, min).max(field, value, max)
    }

    /// `value` must be at least `len` characters.
    pub fn min_len(self, field: &'static str, value: &str, len: usize) -> Self {
        self.check(value.chars().count() >= len, field, Rule::MinLen(len))
    }

    /// `value` must be at most `len` characters.
    pub fn max_len(self, field: &'static str, value: &str, len: usize) -> Self {
        self.check(value.chars().count() <= len, field, Rule::MaxLen(len))
    }

    /// `value` must be exactly `len` characters.
    pub fn exact_len(self, field: &'static str, value: &str, len: usize) -> Self {
        self.check(value.chars().count() == len, field, Rule::Len(len))
    }

    /// `value` must parse as an absolute `http` or `https` URL.
    pub fn url(self, field: &'static str, value: &str) -> Self {
        let ok = url::Url::parse(value)
            .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.has_host());
        self.check(ok, field, Rule::Url)
    }

    /// `value` must look like an email address.
    pub fn email(self, field: &'static str, value: &str) -> Self {
        self.check(EMAIL.is_match(value), field, Rule::Email)
    }

    /// `value` must be a mobile number like `09123456789`.
    pub fn mobile(self, field: &'static str, value: &str) -> Self {
        self.check(MOBILE.is_match(value), field, Rule::Mobile)
    }

    /// `value` must be an `IR` IBAN (`IR` followed by 24 digits).
    pub fn iban(self, field: &'static str, value: &str) -> Self {
        self.check(IBAN.is_match(value), field, Rule::Iban)
    }

    /// `value` must be one of `options`.
    pub fn one_of(self, field: &'static str, value: &str, options: &'static [&'static str]) -> Self {
        self.check(options.contains(&value), field, Rule::OneOf(options))
    }

    /// Applies `rule` only when `value` is present and non-empty.
    pub fn optional<F>(self, value: Option<&str>, rule: F) -> Self
    where
        F: FnOnce(Self, &str) -> Self,
    {
        match value {
            Some(v) if !v.is_empty() => rule(self, v),
            _ => self,
        }
    }

    /// Merges the violations of a nested value under its own field names.
    pub fn nested<V: Validate + ?Sized>(mut self, value: &V) -> Self {
        if let Err(errors) = value.validate() {
            self.errors.extend(errors.errors);
        }
        self
    }

    /// Ends the pass.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] if any check failed.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}
