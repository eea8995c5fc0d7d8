//! Payment business logic - amounts owed per subscription and their collection.
//!
//! Status changes go through [`PaymentStatus::can_transition_to`]; anything the
//! lifecycle does not allow is returned as `Error::InvalidTransition`.

use crate::{
    core::{money::Money, validation},
    entities::{AthleteSubscription, Payment, PaymentMethod, PaymentStatus, payment},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument, warn};

/// Fields of a newly owed payment.
#[derive(Clone, Debug)]
pub struct NewPayment {
    /// Amount owed
    pub amount: Money,
    /// Date the money is due
    pub due_date: Date,
    /// Human label for the covered window, e.g. "February 2026"
    pub months_covered: String,
    /// Free-form notes
    pub notes: String,
}

/// How a pending payment was settled.
#[derive(Clone, Debug)]
pub struct PaymentReceipt {
    /// Date the money arrived
    pub payment_date: Date,
    /// Channel used
    pub payment_method: PaymentMethod,
    /// UPI transaction ID or other reference
    pub transaction_id: String,
}

/// Records an amount owed against a subscription.
///
/// The payment starts `PENDING` with no payment date or method. Only a payment
/// for the subscription's full final price can later be invoiced.
#[instrument(skip(db, new_payment), fields(amount = %new_payment.amount))]
pub async fn create_payment(
    db: &DatabaseConnection,
    subscription_id: i64,
    new_payment: NewPayment,
) -> Result<payment::Model> {
    validation::min_amount("amount", new_payment.amount, Money::from_paise(1))?;
    validation::require_text("months_covered", &new_payment.months_covered)?;

    AthleteSubscription::find_by_id(subscription_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("subscription", subscription_id))?;

    let now = chrono::Utc::now().naive_utc();
    let payment = payment::ActiveModel {
        subscription_id: Set(subscription_id),
        amount: Set(new_payment.amount),
        payment_date: Set(None),
        due_date: Set(new_payment.due_date),
        status: Set(PaymentStatus::Pending),
        payment_method: Set(None),
        transaction_id: Set(String::new()),
        months_covered: Set(new_payment.months_covered),
        notes: Set(new_payment.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(payment_id = payment.id, "Created payment");
    Ok(payment)
}

async fn find_payment(db: &DatabaseConnection, payment_id: i64) -> Result<payment::Model> {
    Payment::find_by_id(payment_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("payment", payment_id))
}

fn check_transition(from: PaymentStatus, to: PaymentStatus) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            entity: "payment",
            from: format!("{from:?}"),
            to: format!("{to:?}"),
        })
    }
}

/// Settles a pending payment with its date, channel and reference.
///
/// Used when the coach logs money that arrived. A payment that is already
/// `PAID`, `FAILED` or `REFUNDED` fails with `InvalidTransition`.
#[instrument(skip(db, receipt))]
pub async fn record_payment(
    db: &DatabaseConnection,
    payment_id: i64,
    receipt: PaymentReceipt,
) -> Result<payment::Model> {
    let existing = find_payment(db, payment_id).await?;
    check_transition(existing.status, PaymentStatus::Paid)?;

    let mut payment: payment::ActiveModel = existing.into();
    payment.status = Set(PaymentStatus::Paid);
    payment.payment_date = Set(Some(receipt.payment_date));
    payment.payment_method = Set(Some(receipt.payment_method));
    payment.transaction_id = Set(receipt.transaction_id);
    payment.updated_at = Set(chrono::Utc::now().naive_utc());

    let payment = payment.update(db).await?;
    info!(payment_id, "Recorded payment");
    Ok(payment)
}

/// Moves a payment to `status`. A payment marked `PAID` without a payment
/// date gets today's date.
#[instrument(skip(db))]
pub async fn update_payment_status(
    db: &DatabaseConnection,
    payment_id: i64,
    status: PaymentStatus,
) -> Result<payment::Model> {
    let existing = find_payment(db, payment_id).await?;
    check_transition(existing.status, status).inspect_err(|e| warn!("{e}"))?;

    let needs_date = status == PaymentStatus::Paid && existing.payment_date.is_none();
    let now = chrono::Utc::now().naive_utc();

    let mut payment: payment::ActiveModel = existing.into();
    payment.status = Set(status);
    if needs_date {
        payment.payment_date = Set(Some(now.date()));
    }
    payment.updated_at = Set(now);

    payment.update(db).await.map_err(Into::into)
}

/// Marks every still-pending payment among `payment_ids` as paid on `paid_on`.
///
/// Payments in any other status are skipped. Returns how many were updated.
#[instrument(skip(db, payment_ids), fields(count = payment_ids.len()))]
pub async fn mark_payments_paid(
    db: &DatabaseConnection,
    payment_ids: &[i64],
    paid_on: Date,
) -> Result<u64> {
    if payment_ids.is_empty() {
        return Ok(0);
    }

    let result = Payment::update_many()
        .set(payment::ActiveModel {
            status: Set(PaymentStatus::Paid),
            payment_date: Set(Some(paid_on)),
            updated_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        })
        .filter(payment::Column::Id.is_in(payment_ids.iter().copied()))
        .filter(payment::Column::Status.eq(PaymentStatus::Pending))
        .exec(db)
        .await?;

    info!(updated = result.rows_affected, "Marked payments as paid");
    Ok(result.rows_affected)
}

/// Finds a payment by id.
pub async fn get_payment(db: &DatabaseConnection, payment_id: i64) -> Result<Option<payment::Model>> {
    Payment::find_by_id(payment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Payments of one subscription, newest due date first.
pub async fn list_payments_for_subscription(
    db: &DatabaseConnection,
    subscription_id: i64,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::SubscriptionId.eq(subscription_id))
        .order_by_desc(payment::Column::DueDate)
        .order_by_desc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Pending payments due before `today`, oldest first.
pub async fn list_overdue_payments(
    db: &DatabaseConnection,
    today: Date,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::Status.eq(PaymentStatus::Pending))
        .filter(payment::Column::DueDate.lt(today))
        .order_by_asc(payment::Column::DueDate)
        .all(db)
        .await
        .map_err(Into::into)
}
