//! Core rate types shared by the store, the provider client and the engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical date format for snapshot keys. Lexicographic order over this
/// format equals chronological order, which the disk store relies on.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One calendar date's full set of currency rates, as fetched from the
/// provider. Stored at provider precision; rounding happens on the way out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub date: String,
    pub rates: HashMap<String, f64>,
}

impl RateSnapshot {
    pub fn new(date: impl Into<String>, rates: HashMap<String, f64>) -> Self {
        Self {
            date: date.into(),
            rates,
        }
    }

    /// Projection down to a single currency, keeping the response shape
    /// (`rates` stays a map, with exactly one entry).
    pub fn project(&self, sign: &str) -> RateSnapshot {
        let mut rates = HashMap::with_capacity(1);
        if let Some(rate) = self.rates.get(sign) {
            rates.insert(sign.to_string(), *rate);
        }
        RateSnapshot {
            date: self.date.clone(),
            rates,
        }
    }

    /// Rounds every rate to 3 decimal places in place. Display-only; callers
    /// must not write the result back to the store.
    pub fn round_rates(&mut self) {
        for value in self.rates.values_mut() {
            *value = round_rate(*value);
        }
    }
}

/// Rounds a rate to 3 decimal places for the "latest rates" view.
pub fn round_rate(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Static reference entry for a supported currency. Seeded out-of-band via
/// the `seed-list` command; read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyEntry {
    pub name: String,
    pub sign: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_rate() {
        assert_eq!(round_rate(0.91234), 0.912);
        assert_eq!(round_rate(0.91261), 0.913);
        assert_eq!(round_rate(1.0), 1.0);
        assert_eq!(round_rate(103.999_9), 104.0);
    }

    #[test]
    fn test_project_keeps_only_requested_currency() {
        let snapshot = RateSnapshot::new(
            "2024-01-01",
            HashMap::from([("EUR".to_string(), 0.91), ("GBP".to_string(), 0.79)]),
        );

        let projected = snapshot.project("EUR");
        assert_eq!(projected.date, "2024-01-01");
        assert_eq!(projected.rates.len(), 1);
        assert_eq!(projected.rates.get("EUR"), Some(&0.91));
    }

    #[test]
    fn test_project_unknown_currency_is_empty() {
        let snapshot = RateSnapshot::new("2024-01-01", HashMap::new());
        let projected = snapshot.project("EUR");
        assert!(projected.rates.is_empty());
    }

    #[test]
    fn test_round_rates_in_place() {
        let mut snapshot = RateSnapshot::new(
            "2024-01-01",
            HashMap::from([("EUR".to_string(), 0.912_345)]),
        );
        snapshot.round_rates();
        assert_eq!(snapshot.rates.get("EUR"), Some(&0.912));
    }
}
