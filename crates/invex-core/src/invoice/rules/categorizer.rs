//! Categorization of extracted amounts into total, net and VAT amount.

use tracing::debug;

use crate::models::invoice::{vat_for_rate, AmountOfMoney, TotalNetAndVatAmount};

use super::patterns::VAT_KEYWORD;

/// Decides which of the amounts on a document are total, net and VAT.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmountCategorizer;

impl AmountCategorizer {
    pub fn new() -> Self {
        Self
    }

    /// Find the triple of amounts where `total == net + vat`.
    ///
    /// Amounts are tried largest first: the outer loop picks the total, the
    /// next one the net amount and the inner one the VAT amount, and the first
    /// triple that adds up wins. Without such a triple the largest amount is
    /// returned as total with no net and VAT amount. Returns `None` only for
    /// an empty slice.
    ///
    /// The search is cubic in the number of amounts; callers cap the input.
    pub fn find_total_net_and_vat_amount<'a>(
        &self,
        amounts: &'a [AmountOfMoney],
    ) -> Option<TotalNetAndVatAmount<'a>> {
        if amounts.is_empty() {
            return None;
        }

        let mut sorted: Vec<&AmountOfMoney> = amounts.iter().collect();
        sorted.sort_by(|a, b| b.value.cmp(&a.value));
        let len = sorted.len();

        for (total_index, total) in sorted.iter().enumerate() {
            // The net amount needs at least one smaller amount after it.
            let nets = sorted.get(total_index + 1..len - 1).unwrap_or(&[]);

            for (offset, net) in nets.iter().enumerate() {
                let net_index = total_index + 1 + offset;

                for vat in &sorted[net_index + 1..] {
                    if net.value.checked_add(vat.value) == Some(total.value) {
                        debug!("Categorized {} = {} + {}", total, net, vat);
                        return Some(TotalNetAndVatAmount::new(*total, *net, *vat));
                    }
                }
            }
        }

        debug!(
            "No amounts add up among {} candidates, using largest {} as total",
            len, sorted[0]
        );
        Some(TotalNetAndVatAmount::total_only(sorted[0]))
    }

    /// Pick the VAT rate among the percentages of a document.
    ///
    /// A single candidate is returned as is. With several, the first one on a
    /// line mentioning VAT (or a translation of it) wins, else the first one.
    pub fn find_value_added_tax_rate<'a>(
        &self,
        percentages: &'a [AmountOfMoney],
    ) -> Option<&'a AmountOfMoney> {
        match percentages {
            [] => None,
            [single] => Some(single),
            _ => percentages
                .iter()
                .find(|percentage| VAT_KEYWORD.is_match(&percentage.line))
                .or_else(|| percentages.first()),
        }
    }

    /// Pick the VAT rate consistent with the categorized amounts.
    ///
    /// When net and VAT amount are known, the first percentage for which
    /// `net * rate / 100` rounds to the VAT amount wins. Otherwise (or if none
    /// fits) this falls back to [`AmountCategorizer::find_value_added_tax_rate`].
    pub fn find_value_added_tax_rate_for<'a>(
        &self,
        percentages: &'a [AmountOfMoney],
        amounts: &TotalNetAndVatAmount<'_>,
    ) -> Option<&'a AmountOfMoney> {
        if let (Some(net), Some(vat)) = (amounts.net, amounts.vat) {
            let consistent = percentages
                .iter()
                .find(|rate| vat_for_rate(net.value, rate.value) == Some(vat.value.round_dp(2)));

            if consistent.is_some() {
                return consistent;
            }
        }

        self.find_value_added_tax_rate(percentages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn amount(value: &str) -> AmountOfMoney {
        AmountOfMoney::new(Decimal::from_str(value).unwrap(), "€", format!("{value} €"), "")
    }

    fn percentage(value: &str, line: &str) -> AmountOfMoney {
        AmountOfMoney::new(Decimal::from_str(value).unwrap(), "%", format!("{value}%"), line)
    }

    fn values(result: &TotalNetAndVatAmount<'_>) -> (String, Option<String>, Option<String>) {
        (
            result.total.value.to_string(),
            result.net.map(|a| a.value.to_string()),
            result.vat.map(|a| a.value.to_string()),
        )
    }

    #[test]
    fn test_empty() {
        assert_eq!(AmountCategorizer::new().find_total_net_and_vat_amount(&[]), None);
    }

    #[test]
    fn test_single_amount() {
        let amounts = [amount("42.00")];
        let result = AmountCategorizer::new()
            .find_total_net_and_vat_amount(&amounts)
            .unwrap();

        assert_eq!(values(&result), ("42.00".to_string(), None, None));
        assert!(!result.is_complete());
    }

    #[test]
    fn test_finds_triple_in_any_order() {
        let amounts = [amount("19.00"), amount("5.00"), amount("119.00"), amount("100.00")];
        let result = AmountCategorizer::new()
            .find_total_net_and_vat_amount(&amounts)
            .unwrap();

        assert_eq!(
            values(&result),
            (
                "119.00".to_string(),
                Some("100.00".to_string()),
                Some("19.00".to_string())
            )
        );
        // References point into the input.
        assert!(std::ptr::eq(result.total, &amounts[2]));
    }

    #[test]
    fn test_no_triple_falls_back_to_largest() {
        let amounts = [amount("10.00"), amount("30.00"), amount("25.00")];
        let result = AmountCategorizer::new()
            .find_total_net_and_vat_amount(&amounts)
            .unwrap();

        assert_eq!(values(&result), ("30.00".to_string(), None, None));
    }

    #[test]
    fn test_largest_total_wins() {
        // 60 = 50 + 10 and 50 = 40 + 10; the larger total is preferred.
        let amounts = [amount("40"), amount("10"), amount("50"), amount("60")];
        let result = AmountCategorizer::new()
            .find_total_net_and_vat_amount(&amounts)
            .unwrap();

        assert_eq!(
            values(&result),
            ("60".to_string(), Some("50".to_string()), Some("10".to_string()))
        );
    }

    #[test]
    fn test_largest_net_wins_for_same_total() {
        // 100 = 80 + 20 = 70 + 30; the net amount closest to the total wins.
        let amounts = [amount("100"), amount("70"), amount("30"), amount("20"), amount("80")];
        let result = AmountCategorizer::new()
            .find_total_net_and_vat_amount(&amounts)
            .unwrap();

        assert_eq!(
            values(&result),
            ("100".to_string(), Some("80".to_string()), Some("20".to_string()))
        );
    }

    #[test]
    fn test_decimal_sum_is_exact() {
        // 0.1 + 0.2 != 0.3 in binary floating point.
        let amounts = [amount("0.30"), amount("0.20"), amount("0.10")];
        let result = AmountCategorizer::new()
            .find_total_net_and_vat_amount(&amounts)
            .unwrap();

        assert!(result.is_complete());
        assert_eq!(result.net.unwrap().value, Decimal::from_str("0.2").unwrap());
    }

    #[test]
    fn test_vat_rate_single_candidate() {
        let percentages = [percentage("19", "19%")];
        let rate = AmountCategorizer::new().find_value_added_tax_rate(&percentages);

        assert_eq!(rate, Some(&percentages[0]));
        assert_eq!(AmountCategorizer::new().find_value_added_tax_rate(&[]), None);
    }

    #[test]
    fn test_vat_rate_prefers_vat_line() {
        let percentages = [
            percentage("3", "Skonto 3% bei Zahlung binnen 10 Tagen"),
            percentage("19", "zzgl. 19% MwSt"),
        ];
        let rate = AmountCategorizer::new()
            .find_value_added_tax_rate(&percentages)
            .unwrap();
        assert_eq!(rate.value, Decimal::from(19));

        let no_keyword = [percentage("3", "Skonto 3%"), percentage("5", "Rabatt 5%")];
        let rate = AmountCategorizer::new()
            .find_value_added_tax_rate(&no_keyword)
            .unwrap();
        assert_eq!(rate.value, Decimal::from(3));
    }

    #[test]
    fn test_vat_rate_consistent_with_amounts() {
        let amounts = [amount("107.00"), amount("100.00"), amount("7.00")];
        let categorized = AmountCategorizer::new()
            .find_total_net_and_vat_amount(&amounts)
            .unwrap();

        let percentages = [
            percentage("19", "VAT 19% on services"),
            percentage("7", "VAT 7% on books"),
        ];
        let rate = AmountCategorizer::new()
            .find_value_added_tax_rate_for(&percentages, &categorized)
            .unwrap();
        assert_eq!(rate.value, Decimal::from(7));

        let partial = TotalNetAndVatAmount::total_only(&amounts[0]);
        let rate = AmountCategorizer::new()
            .find_value_added_tax_rate_for(&percentages, &partial)
            .unwrap();
        assert_eq!(rate.value, Decimal::from(19));
    }
}
