//! Pricing rules - tax codes, discounted prices, GST split and amounts in words.
//!
//! Pure functions only. Entities call into this module from their save hooks and
//! the invoice generator uses it to build the tax breakdown.

use crate::core::money::{Money, Percent, div_round};
use crate::entities::{BillingPeriod, PlanType, ServiceLevel};

/// Derives the HSN/SAC classification code for a plan.
///
/// The code is the concatenation of a sport prefix, the service level and the
/// billing period abbreviation, e.g. `RUNFOCUS1MO` or `TRIPERSONAL1QTR`.
#[must_use]
pub fn derive_hsn_sac(
    plan_type: PlanType,
    service_level: ServiceLevel,
    billing_period: BillingPeriod,
) -> String {
    let prefix = match plan_type {
        PlanType::Running => "RUN",
        PlanType::Triathlon => "TRI",
    };
    let level = match service_level {
        ServiceLevel::Focus => "FOCUS",
        ServiceLevel::Personal => "PERSONAL",
    };
    let period = match billing_period {
        BillingPeriod::Monthly => "1MO",
        BillingPeriod::Quarterly => "1QTR",
    };
    format!("{prefix}{level}{period}")
}

/// `max(0, base − base×percent − flat)`, rounded half up to the paise.
///
/// The percentage part is kept exact until the final rounding so the result
/// matches computing the whole expression in decimal and rounding once.
#[must_use]
pub fn final_price(base: Money, discount_percent: Percent, discount_amount: Money) -> Money {
    let full = i128::from(Percent::FULL.basis_points());
    let scaled = i128::from(base.paise()) * (full - i128::from(discount_percent.basis_points()))
        - i128::from(discount_amount.paise()) * full;
    Money::from_paise(div_round(scaled, full)).max(Money::ZERO)
}

/// Whether the supply crosses state lines, which decides the GST components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TaxSupply {
    /// Supplier and customer in the same state: CGST + SGST
    #[default]
    IntraState,
    /// Different states: IGST
    InterState,
}

/// GST components charged on a taxable amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaxBreakdown {
    /// Central GST rate
    pub cgst_rate: Percent,
    /// Central GST amount
    pub cgst_amount: Money,
    /// State GST rate
    pub sgst_rate: Percent,
    /// State GST amount
    pub sgst_amount: Money,
    /// Integrated GST rate
    pub igst_rate: Percent,
    /// Integrated GST amount
    pub igst_amount: Money,
}

impl TaxBreakdown {
    /// Sum of all components.
    #[must_use]
    pub fn total_tax(&self) -> Money {
        self.cgst_amount + self.sgst_amount + self.igst_amount
    }
}

/// Splits `gst_rate` over `taxable` according to the supply kind.
///
/// The tax is computed once on the full rate and then divided, so an
/// intra-state CGST + SGST pair always adds up to the inter-state IGST on the
/// same amount. An odd paise goes to CGST.
#[must_use]
pub fn gst_breakdown(
    taxable: Money,
    gst_rate: Percent,
    include_gst: bool,
    supply: TaxSupply,
) -> TaxBreakdown {
    if !include_gst {
        return TaxBreakdown::default();
    }

    match supply {
        TaxSupply::IntraState => {
            let total = taxable.percent_of(gst_rate);
            let cgst_amount = total.divide_by(2);
            let cgst_rate = gst_rate.half();
            TaxBreakdown {
                cgst_rate,
                cgst_amount,
                sgst_rate: Percent::from_basis_points(
                    gst_rate.basis_points() - cgst_rate.basis_points(),
                ),
                sgst_amount: total - cgst_amount,
                ..TaxBreakdown::default()
            }
        }
        TaxSupply::InterState => TaxBreakdown {
            igst_rate: gst_rate,
            igst_amount: taxable.percent_of(gst_rate),
            ..TaxBreakdown::default()
        },
    }
}

const ONES: [&str; 20] = [
    "Zero",
    "One",
    "Two",
    "Three",
    "Four",
    "Five",
    "Six",
    "Seven",
    "Eight",
    "Nine",
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Spells out an amount for the invoice footer, e.g.
/// `Rupees One Lakh Twenty Thousand Only` or `Rupees Ten and Fifty Paise Only`.
#[must_use]
pub fn amount_in_words(amount: Money) -> String {
    let paise = amount.paise().unsigned_abs();
    let rupees = paise / 100;
    let fraction = paise % 100;

    let mut words = format!("Rupees {}", number_in_words(rupees));
    if fraction > 0 {
        words.push_str(" and ");
        words.push_str(&number_in_words(fraction));
        words.push_str(" Paise");
    }
    words.push_str(" Only");
    words
}

/// Indian numbering system: crore (10⁷), lakh (10⁵), thousand, hundred.
fn number_in_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    let mut rest = n;

    let crore = rest / 10_000_000;
    rest %= 10_000_000;
    if crore > 0 {
        parts.push(format!("{} Crore", number_in_words(crore)));
    }

    for (scale, label) in [(100_000, "Lakh"), (1_000, "Thousand"), (100, "Hundred")] {
        let count = rest / scale;
        rest %= scale;
        if count > 0 {
            parts.push(format!("{} {label}", below_hundred(count)));
        }
    }

    if rest > 0 {
        parts.push(below_hundred(rest));
    }

    parts.join(" ")
}

#[allow(clippy::cast_possible_truncation)] // n < 100
fn below_hundred(n: u64) -> String {
    let n = n as usize;
    if n < 20 {
        ONES[n].to_string()
    } else if n % 10 == 0 {
        TENS[n / 10].to_string()
    } else {
        format!("{} {}", TENS[n / 10], ONES[n % 10])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_hsn_sac_covers_every_combination() {
        assert_eq!(
            derive_hsn_sac(PlanType::Running, ServiceLevel::Focus, BillingPeriod::Monthly),
            "RUNFOCUS1MO"
        );
        assert_eq!(
            derive_hsn_sac(
                PlanType::Triathlon,
                ServiceLevel::Personal,
                BillingPeriod::Quarterly
            ),
            "TRIPERSONAL1QTR"
        );
        assert_eq!(
            derive_hsn_sac(PlanType::Running, ServiceLevel::Personal, BillingPeriod::Quarterly),
            "RUNPERSONAL1QTR"
        );
        assert_eq!(
            derive_hsn_sac(PlanType::Triathlon, ServiceLevel::Focus, BillingPeriod::Monthly),
            "TRIFOCUS1MO"
        );
    }

    #[test]
    fn test_final_price_applies_both_discounts() {
        let price = final_price(
            Money::from_rupees(2000),
            Percent::from_whole(10),
            Money::from_rupees(50),
        );
        assert_eq!(price, Money::from_paise(175_000));
    }

    #[test]
    fn test_final_price_floors_at_zero() {
        let price = final_price(Money::from_rupees(100), Percent::FULL, Money::from_rupees(50));
        assert_eq!(price, Money::ZERO);

        let price = final_price(Money::from_rupees(100), Percent::ZERO, Money::from_rupees(500));
        assert_eq!(price, Money::ZERO);
    }

    #[test]
    fn test_final_price_rounds_once() {
        // 1999.99 - 10% = 1799.991
        let price = final_price(Money::from_paise(199_999), Percent::from_whole(10), Money::ZERO);
        assert_eq!(price, Money::from_paise(179_999));

        // 333.33 - 12.5% = 291.66375
        let price = final_price(
            Money::from_paise(33_333),
            Percent::from_basis_points(1250),
            Money::ZERO,
        );
        assert_eq!(price, Money::from_paise(29_166));
    }

    #[test]
    fn test_gst_breakdown_intra_state_splits_rate() {
        let tax = gst_breakdown(
            Money::from_rupees(1750),
            Percent::from_whole(18),
            true,
            TaxSupply::IntraState,
        );
        assert_eq!(tax.cgst_rate, Percent::from_whole(9));
        assert_eq!(tax.sgst_rate, Percent::from_whole(9));
        assert_eq!(tax.cgst_amount, Money::from_paise(15_750));
        assert_eq!(tax.sgst_amount, Money::from_paise(15_750));
        assert_eq!(tax.igst_amount, Money::ZERO);
        assert_eq!(tax.total_tax(), Money::from_rupees(315));
    }

    #[test]
    fn test_gst_breakdown_intra_state_matches_inter_state_total() {
        let taxable = Money::from_rupees(10_000);
        let rate = Percent::from_basis_points(25);

        let intra = gst_breakdown(taxable, rate, true, TaxSupply::IntraState);
        let inter = gst_breakdown(taxable, rate, true, TaxSupply::InterState);
        assert_eq!(inter.total_tax(), Money::from_rupees(25));
        assert_eq!(intra.total_tax(), inter.total_tax());
        assert_eq!(intra.cgst_amount, Money::from_paise(1250));
        assert_eq!(intra.sgst_amount, Money::from_paise(1250));
        assert_eq!(
            intra.cgst_rate.basis_points() + intra.sgst_rate.basis_points(),
            rate.basis_points()
        );

        // Odd paise of tax: CGST takes the extra one
        let intra = gst_breakdown(
            Money::from_paise(1_001),
            Percent::from_whole(18),
            true,
            TaxSupply::IntraState,
        );
        assert_eq!(intra.total_tax(), Money::from_paise(180));
        assert_eq!(intra.cgst_amount, Money::from_paise(90));
        assert_eq!(intra.sgst_amount, Money::from_paise(90));

        let intra = gst_breakdown(
            Money::from_paise(1_050),
            Percent::from_whole(18),
            true,
            TaxSupply::IntraState,
        );
        assert_eq!(intra.total_tax(), Money::from_paise(189));
        assert_eq!(intra.cgst_amount, Money::from_paise(95));
        assert_eq!(intra.sgst_amount, Money::from_paise(94));
    }

    #[test]
    fn test_gst_breakdown_inter_state_uses_igst() {
        let tax = gst_breakdown(
            Money::from_rupees(1000),
            Percent::from_whole(18),
            true,
            TaxSupply::InterState,
        );
        assert_eq!(tax.igst_rate, Percent::from_whole(18));
        assert_eq!(tax.igst_amount, Money::from_rupees(180));
        assert_eq!(tax.cgst_amount, Money::ZERO);
        assert_eq!(tax.sgst_amount, Money::ZERO);
    }

    #[test]
    fn test_gst_breakdown_disabled() {
        let tax = gst_breakdown(
            Money::from_rupees(1000),
            Percent::from_whole(18),
            false,
            TaxSupply::IntraState,
        );
        assert_eq!(tax, TaxBreakdown::default());
    }

    #[test]
    fn test_amount_in_words() {
        assert_eq!(amount_in_words(Money::ZERO), "Rupees Zero Only");
        assert_eq!(
            amount_in_words(Money::from_rupees(2065)),
            "Rupees Two Thousand Sixty Five Only"
        );
        assert_eq!(
            amount_in_words(Money::from_paise(1050)),
            "Rupees Ten and Fifty Paise Only"
        );
        assert_eq!(
            amount_in_words(Money::from_rupees(120_000)),
            "Rupees One Lakh Twenty Thousand Only"
        );
        assert_eq!(
            amount_in_words(Money::from_rupees(12_345_678)),
            "Rupees One Crore Twenty Three Lakh Forty Five Thousand Six Hundred Seventy Eight Only"
        );
        assert_eq!(
            amount_in_words(Money::from_paise(101)),
            "Rupees One and One Paise Only"
        );
    }
}
