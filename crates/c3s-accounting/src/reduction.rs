use chrono::NaiveDate;
use rust_decimal::Decimal;

use c3s_data::{make_token, Dues, DuesInvoice, Member};

use crate::{errors::DuesError, find_dues, DuesInvoiceRepository, DuesStore};

/// The bookkeeping result of a dues reduction
#[derive(Debug, Clone)]
pub struct Reduction {
    pub dues: Dues,
    /// The invoice that was cancelled
    pub cancelled: DuesInvoice,
    /// Reverses the cancelled invoice
    pub reversal: DuesInvoice,
    /// Charges the reduced amount, none if reduced to zero
    pub invoice: Option<DuesInvoice>,
}

/// Reduce the dues of a member for a year.
///
/// The current invoice is cancelled and reversed. Unless the dues
/// are reduced to zero, a new invoice for the reduced amount follows
/// the reversal. The chain of invoices is linked through the
/// preceding and succeeding invoice numbers.
///
/// All writes happen in one transaction. If any of them fails,
/// neither invoices nor dues are changed.
pub async fn reduce_dues<DB: DuesStore>(
    db: &DB,
    member: &Member,
    year: i32,
    reduced_amount: Decimal,
    confirmed: bool,
    date: NaiveDate,
) -> Result<Reduction, DuesError> {
    db.begin().await?;
    let result = write_reduction(db, member, year, reduced_amount, confirmed, date).await;
    db.finish(result).await
}

async fn write_reduction<DB: DuesStore>(
    db: &DB,
    member: &Member,
    year: i32,
    reduced_amount: Decimal,
    confirmed: bool,
    date: NaiveDate,
) -> Result<Reduction, DuesError> {
    if !confirmed {
        return Err(DuesError::NotConfirmed);
    }
    if reduced_amount < Decimal::ZERO {
        return Err(DuesError::NegativeAmount(reduced_amount));
    }

    let mut dues = find_dues(db, member.id, year)
        .await?
        .ok_or(DuesError::NoDues(member.id, year))?;
    let current_invoice_no = dues
        .invoice_no
        .ok_or(DuesError::NotInvoiced(member.id, year))?;

    let effective = dues.effective_amount();
    if reduced_amount == effective {
        tracing::warn!(member_id = member.id, year, %reduced_amount, "dues unchanged");
        return Err(DuesError::AmountUnchanged(reduced_amount));
    }
    if reduced_amount > effective {
        tracing::warn!(
            member_id = member.id,
            year,
            %reduced_amount,
            %effective,
            "reduction exceeds the charged dues"
        );
        return Err(DuesError::ExceedsAmount(reduced_amount, effective));
    }

    let repo = DuesInvoiceRepository::new(db);
    let mut cancelled = repo.get_by_number(year, current_invoice_no).await?;
    dues.set_amount_reduced(reduced_amount);

    // Reverse the current invoice
    let reversal_no = repo.next_invoice_number(year).await?;
    let mut reversal = db
        .insert(DuesInvoice {
            year,
            invoice_no: reversal_no,
            invoice_no_string: DuesInvoice::format_invoice_no(year, reversal_no, true),
            invoice_date: date,
            invoice_amount: -cancelled.invoice_amount,
            is_reversal: true,
            preceding_invoice_no: Some(cancelled.invoice_no),
            member_id: member.id,
            membership_no: member.membership_number,
            email: member.email.clone(),
            token: make_token(),
            ..Default::default()
        })
        .await?;

    cancelled.is_cancelled = true;
    cancelled.succeeding_invoice_no = Some(reversal.invoice_no);
    let cancelled = db.update(cancelled).await?;

    // Charge the reduced amount
    let invoice = if reduced_amount.is_zero() {
        None
    } else {
        let invoice_no = reversal_no + 1;
        let invoice = db
            .insert(DuesInvoice {
                year,
                invoice_no,
                invoice_no_string: DuesInvoice::format_invoice_no(year, invoice_no, false),
                invoice_date: date,
                invoice_amount: reduced_amount,
                is_altered: true,
                preceding_invoice_no: Some(reversal.invoice_no),
                member_id: member.id,
                membership_no: member.membership_number,
                email: member.email.clone(),
                token: make_token(),
                ..Default::default()
            })
            .await?;
        reversal.succeeding_invoice_no = Some(invoice.invoice_no);
        reversal = db.update(reversal).await?;
        Some(invoice)
    };

    let current = invoice.as_ref().unwrap_or(&reversal);
    dues.invoice_no = Some(current.invoice_no);
    dues.invoice_date = Some(date);
    dues.token = Some(current.token.clone());
    let dues = db.update(dues).await?;

    tracing::info!(
        member_id = member.id,
        year,
        cancelled = %cancelled.invoice_no_string,
        reversal = %reversal.invoice_no_string,
        amount = %reduced_amount,
        balance = %dues.balance,
        "reduced dues"
    );

    Ok(Reduction {
        dues,
        cancelled,
        reversal,
        invoice,
    })
}
