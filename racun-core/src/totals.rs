//! Derived money amounts. Nothing here rounds; rounding is a display concern.

use serde::Serialize;

use crate::model::Reservation;

pub fn accommodation_cost(reservation: &Reservation) -> f64 {
    reservation.nights as f64 * reservation.price_per_night
}

pub fn tourist_tax_total(reservation: &Reservation) -> f64 {
    reservation.nights as f64 * reservation.adults * reservation.tourist_tax_per_person_per_night
}

pub fn total_amount(reservation: &Reservation) -> f64 {
    accommodation_cost(reservation) + tourist_tax_total(reservation) + reservation.cleaning_fee
}

/// What the guest still owes after the prepayment. Negative when the guest
/// paid more than the total.
pub fn balance_due(reservation: &Reservation) -> f64 {
    total_amount(reservation) - reservation.prepayment
}

/// All four derived amounts for one reservation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub accommodation_cost: f64,
    pub tourist_tax_total: f64,
    pub total_amount: f64,
    pub balance_due: f64,
}

impl Totals {
    pub fn compute(reservation: &Reservation) -> Self {
        let accommodation_cost = accommodation_cost(reservation);
        let tourist_tax_total = tourist_tax_total(reservation);
        let total_amount = accommodation_cost + tourist_tax_total + reservation.cleaning_fee;
        Totals {
            accommodation_cost,
            tourist_tax_total,
            total_amount,
            balance_due: total_amount - reservation.prepayment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(nights: u32, price: f64, tax: f64, adults: f64, cleaning: f64, prepaid: f64) -> Reservation {
        Reservation {
            nights,
            price_per_night: price,
            tourist_tax_per_person_per_night: tax,
            adults,
            cleaning_fee: cleaning,
            prepayment: prepaid,
            ..Reservation::default()
        }
    }

    #[test]
    fn week_at_the_sea() {
        let totals = Totals::compute(&reservation(7, 120.0, 1.50, 2.0, 50.0, 200.0));
        assert_eq!(totals.accommodation_cost, 840.0);
        assert_eq!(totals.tourist_tax_total, 21.0);
        assert_eq!(totals.total_amount, 911.0);
        assert_eq!(totals.balance_due, 711.0);
    }

    #[test]
    fn compute_agrees_with_the_single_functions() {
        let samples = [
            reservation(0, 120.0, 1.5, 2.0, 50.0, 0.0),
            reservation(3, 99.99, 1.35, 3.0, 0.0, 100.0),
            reservation(14, 65.5, 2.0, 1.0, 35.0, 1000.0),
            reservation(1, 0.0, 0.0, 0.0, 0.0, 25.0),
        ];
        for r in &samples {
            let totals = Totals::compute(r);
            assert_eq!(totals.accommodation_cost, r.nights as f64 * r.price_per_night);
            assert_eq!(totals.accommodation_cost, accommodation_cost(r));
            assert_eq!(totals.tourist_tax_total, tourist_tax_total(r));
            assert_eq!(
                totals.total_amount,
                totals.accommodation_cost + totals.tourist_tax_total + r.cleaning_fee
            );
            assert_eq!(totals.total_amount, total_amount(r));
            assert_eq!(totals.balance_due, totals.total_amount - r.prepayment);
            assert_eq!(totals.balance_due, balance_due(r));
        }
    }

    #[test]
    fn zero_nights_leaves_only_cleaning() {
        let totals = Totals::compute(&reservation(0, 120.0, 1.5, 2.0, 50.0, 200.0));
        assert_eq!(totals.total_amount, 50.0);
        assert_eq!(totals.balance_due, -150.0);
    }
}
