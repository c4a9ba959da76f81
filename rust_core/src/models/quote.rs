use serde::Serialize;

use crate::error::RecordError;

/// A prediction-market question with its parallel outcome/price lists.
///
/// Prices are implied probabilities in `[0, 1]`. A missing or falsy price
/// (absent, empty, zero) is stored as `None`; the matcher substitutes its
/// neutral price when it reads one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketQuote {
    title: String,
    outcomes: Vec<String>,
    prices: Vec<Option<f64>>,
}

impl MarketQuote {
    pub fn new(
        title: impl Into<String>,
        outcomes: Vec<String>,
        prices: Vec<Option<f64>>,
    ) -> Result<Self, RecordError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(RecordError::MissingField("question"));
        }
        if outcomes.len() != prices.len() {
            return Err(RecordError::LengthMismatch {
                outcomes: outcomes.len(),
                prices: prices.len(),
            });
        }

        let mut normalized = Vec::with_capacity(prices.len());
        for price in prices {
            match price {
                Some(p) if !p.is_finite() || !(0.0..=1.0).contains(&p) => {
                    return Err(RecordError::PriceOutOfRange(p));
                }
                Some(p) if p == 0.0 => normalized.push(None),
                other => normalized.push(other),
            }
        }

        Ok(Self {
            title,
            outcomes,
            prices: normalized,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn outcomes(&self) -> &[String] {
        &self.outcomes
    }

    pub fn prices(&self) -> &[Option<f64>] {
        &self.prices
    }

    /// Price of the outcome at `index`, `None` when missing or out of range.
    pub fn price(&self, index: usize) -> Option<f64> {
        self.prices.get(index).copied().flatten()
    }
}
