use rust_decimal::Decimal;

use crate::blockchain::traits::BalanceReading;
use crate::core::validation;

/// The exact text typed into the amount field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmountInput {
    raw: String,
}

impl AmountInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Replaces the text verbatim. No trimming or reformatting.
    pub fn set(&mut self, raw: impl Into<String>) {
        self.raw = raw.into();
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        validation::is_numeric(&self.raw)
    }

    /// Numeric value of the text, for comparisons only.
    pub fn parsed(&self) -> Option<Decimal> {
        validation::parse_numeric(&self.raw)
    }

    /// Affordability of the typed amount, or `None` when the text is not numeric.
    pub fn affordability(&self, balance: Option<&BalanceReading>) -> Option<Affordability> {
        self.parsed().map(|amount| Affordability::evaluate(amount, balance))
    }
}

/// Amount compared with the latest balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordability {
    Affordable,
    Insufficient,
    /// Balance missing, loading or failed. Never treated as sufficient.
    Unknown,
}

impl Affordability {
    pub fn evaluate(amount: Decimal, balance: Option<&BalanceReading>) -> Self {
        match balance.and_then(BalanceReading::value) {
            None => Affordability::Unknown,
            Some(available) if amount <= available => Affordability::Affordable,
            Some(_) => Affordability::Insufficient,
        }
    }

    pub fn is_affordable(self) -> bool {
        self == Affordability::Affordable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn input(raw: &str) -> AmountInput {
        let mut input = AmountInput::new();
        input.set(raw);
        input
    }

    #[test]
    fn set_keeps_text_verbatim() {
        let input = input("  1.50 ");
        assert_eq!(input.raw(), "  1.50 ");
        assert!(input.is_numeric());
    }

    #[test_case("1", "2.0000", Affordability::Affordable ; "below")]
    #[test_case("2", "2.0000", Affordability::Affordable ; "equal")]
    #[test_case("3", "2.0000", Affordability::Insufficient ; "above")]
    #[test_case("10", "9.5", Affordability::Insufficient ; "not a string compare")]
    #[test_case("0.00000000000000000001", "0", Affordability::Insufficient ; "tiny above zero")]
    fn compares_decimals(raw: &str, balance: &str, expected: Affordability) {
        let reading = BalanceReading::known(balance);
        assert_eq!(input(raw).affordability(Some(&reading)), Some(expected));
    }

    #[test]
    fn unknown_balance_is_never_affordable() {
        let amount = input("0.1");
        assert_eq!(amount.affordability(None), Some(Affordability::Unknown));
        assert_eq!(
            amount.affordability(Some(&BalanceReading::loading())),
            Some(Affordability::Unknown)
        );
        assert_eq!(
            amount.affordability(Some(&BalanceReading::failed("5"))),
            Some(Affordability::Unknown)
        );
        assert!(!Affordability::Unknown.is_affordable());
    }

    #[test]
    fn non_numeric_skips_affordability() {
        let reading = BalanceReading::known("2");
        assert_eq!(input("abc").affordability(Some(&reading)), None);
        assert_eq!(input("").affordability(Some(&reading)), None);
    }
}
