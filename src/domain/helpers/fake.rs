use fake::{Dummy, Fake};
use rust_decimal::Decimal;

/// Whole-unit prices in steps of 1000, the way the storefront lists them.
pub struct Price;

impl Dummy<Price> for Decimal {
    fn dummy_with_rng<R: fake::Rng + ?Sized>(_config: &Price, rng: &mut R) -> Self {
        let thousands: i64 = (1..1000).fake_with_rng(rng);
        Decimal::from(thousands * 1000)
    }
}

pub struct Quantity;

impl Dummy<Quantity> for u32 {
    fn dummy_with_rng<R: fake::Rng + ?Sized>(_config: &Quantity, rng: &mut R) -> Self {
        (1..10).fake_with_rng(rng)
    }
}
