use rust_decimal::{Decimal, RoundingStrategy};

/// Applies the maximum discount to a list price and rounds to cents.
///
/// `final = base * (1 - discount_max/100)`, rounded half away from zero to
/// match the SQL ROUND the catalog tooling uses elsewhere.
pub fn discounted_price(base: Decimal, discount_max: Decimal) -> Decimal {
    let ratio = Decimal::ONE - discount_max / Decimal::ONE_HUNDRED;
    (base * ratio).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::discounted_price;

    #[test]
    fn zero_discount_keeps_the_base_price() {
        let base = Decimal::new(4990, 2);
        assert_eq!(discounted_price(base, Decimal::ZERO), base);
    }

    #[test]
    fn full_discount_reaches_zero() {
        let base = Decimal::new(4990, 2);
        assert_eq!(discounted_price(base, Decimal::ONE_HUNDRED), Decimal::new(0, 2));
    }

    #[test]
    fn result_is_rounded_to_two_decimal_places() {
        // 10.00 * (1 - 15/100) = 8.50; 9.99 * 0.85 = 8.4915 -> 8.49
        assert_eq!(
            discounted_price(Decimal::new(1000, 2), Decimal::new(15, 0)),
            Decimal::new(850, 2)
        );
        assert_eq!(
            discounted_price(Decimal::new(999, 2), Decimal::new(15, 0)),
            Decimal::new(849, 2)
        );
    }

    #[test]
    fn midpoints_round_away_from_zero() {
        // 1.01 * (1 - 50/100) = 0.505 -> 0.51
        assert_eq!(
            discounted_price(Decimal::new(101, 2), Decimal::new(50, 0)),
            Decimal::new(51, 2)
        );
    }

    #[test]
    fn identity_holds_across_the_discount_range() {
        let base = Decimal::new(12_345, 2);
        for discount in 0..=100 {
            let discount = Decimal::from(discount);
            let expected = (base * (Decimal::ONE - discount / Decimal::ONE_HUNDRED))
                .round_dp_with_strategy(
                    2,
                    rust_decimal::RoundingStrategy::MidpointAwayFromZero,
                );
            assert_eq!(discounted_price(base, discount), expected);
        }
    }
}
