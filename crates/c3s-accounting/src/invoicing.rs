use chrono::NaiveDate;

use c3s_data::{make_token, Dues, DuesInvoice, Member};

use crate::{
    calculation::{CalculateDues, DuesSchedule},
    datetime::{year_end, year_start},
    errors::DuesError,
    find_dues, DuesInvoiceRepository, DuesStore,
};

/// Issue the dues invoice of a member for a year.
///
/// This calculates the dues, stores them with the full amount
/// as open balance and creates the first invoice of the year.
/// Each member is invoiced at most once per year, later changes
/// go through a reduction.
pub async fn issue_dues_invoice<DB: DuesStore>(
    db: &DB,
    member: &Member,
    year: i32,
    schedule: &DuesSchedule,
    invoice_date: NaiveDate,
) -> Result<(Dues, DuesInvoice), DuesError> {
    db.begin().await?;
    let result = write_dues_invoice(db, member, year, schedule, invoice_date).await;
    db.finish(result).await
}

async fn write_dues_invoice<DB: DuesStore>(
    db: &DB,
    member: &Member,
    year: i32,
    schedule: &DuesSchedule,
    invoice_date: NaiveDate,
) -> Result<(Dues, DuesInvoice), DuesError> {
    if !member.is_member_between(year_start(year), year_end(year)) {
        return Err(DuesError::NotAMember(member.id, year));
    }
    let (start, amount) = member.calculate_dues(schedule, year)?;

    let dues = match find_dues(db, member.id, year).await? {
        Some(dues) if dues.invoice_no.is_some() => {
            return Err(DuesError::AlreadyInvoiced(member.id, year));
        }
        Some(dues) => dues,
        None => db.insert(Dues::new(member.id, start, amount)).await?,
    };

    let repo = DuesInvoiceRepository::new(db);
    let invoice_no = repo.next_invoice_number(year).await?;
    let invoice = db
        .insert(DuesInvoice {
            year,
            invoice_no,
            invoice_no_string: DuesInvoice::format_invoice_no(year, invoice_no, false),
            invoice_date,
            invoice_amount: dues.effective_amount(),
            member_id: member.id,
            membership_no: member.membership_number,
            email: member.email.clone(),
            token: make_token(),
            ..Default::default()
        })
        .await?;

    let dues = db
        .update(Dues {
            invoice_no: Some(invoice.invoice_no),
            invoice_date: Some(invoice_date),
            token: Some(invoice.token.clone()),
            ..dues
        })
        .await?;

    tracing::info!(
        member_id = member.id,
        invoice_no = %invoice.invoice_no_string,
        amount = %invoice.invoice_amount,
        start = %dues.start,
        "issued dues invoice"
    );

    Ok((dues, invoice))
}

#[cfg(test)]
mod tests {
    use super::*;

    use c3s_data::{Dues, DuesFilter, Insert, Query};
    use c3s_db::Connection;
    use rust_decimal::Decimal;

    use crate::testing::FailingStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn make_member(db: &Connection, membership_date: NaiveDate, number: u32) -> Member {
        db.insert(Member {
            firstname: "Test".to_string(),
            lastname: "Member".to_string(),
            email: "member@example.org".to_string(),
            membership_accepted: true,
            membership_date: Some(membership_date),
            membership_number: Some(number),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_issue_dues_invoice() {
        let db = Connection::open_test().await;
        let member = make_member(&db, date(2018, 9, 1), 17).await;

        let (dues, invoice) = issue_dues_invoice(
            &db,
            &member,
            2018,
            &DuesSchedule::default(),
            date(2018, 10, 2),
        )
        .await
        .unwrap();

        assert_eq!(dues.start.to_string(), "q3_2018");
        assert_eq!(dues.amount, Decimal::from(25));
        assert_eq!(dues.balance, Decimal::from(25));
        assert!(!dues.balanced);
        assert_eq!(dues.invoice_no, Some(1));
        assert_eq!(dues.invoice_date, Some(date(2018, 10, 2)));
        assert_eq!(dues.token.as_deref(), Some(invoice.token.as_str()));

        assert_eq!(invoice.invoice_no, 1);
        assert_eq!(invoice.invoice_no_string, "C3S-dues2018-0001");
        assert_eq!(invoice.invoice_amount, Decimal::from(25));
        assert_eq!(invoice.membership_no, Some(17));
        assert_eq!(invoice.email, "member@example.org");
        assert!(!invoice.is_reversal);
        assert_eq!(invoice.preceding_invoice_no, None);
    }

    #[tokio::test]
    async fn test_issue_dues_invoice_numbers_are_sequential() {
        let db = Connection::open_test().await;
        let m1 = make_member(&db, date(2015, 1, 1), 1).await;
        let m2 = make_member(&db, date(2016, 1, 1), 2).await;
        let schedule = DuesSchedule::default();

        let (_, first) = issue_dues_invoice(&db, &m1, 2019, &schedule, date(2019, 2, 1))
            .await
            .unwrap();
        let (_, second) = issue_dues_invoice(&db, &m2, 2019, &schedule, date(2019, 2, 1))
            .await
            .unwrap();
        let (_, next_year) = issue_dues_invoice(&db, &m1, 2020, &schedule, date(2020, 2, 1))
            .await
            .unwrap();

        assert_eq!(first.invoice_no, 1);
        assert_eq!(second.invoice_no, 2);
        assert_eq!(next_year.invoice_no, 1);
        assert_eq!(next_year.invoice_amount, Decimal::from(50));
    }

    #[tokio::test]
    async fn test_issue_dues_invoice_only_once() {
        let db = Connection::open_test().await;
        let member = make_member(&db, date(2018, 1, 1), 1).await;
        let schedule = DuesSchedule::default();

        issue_dues_invoice(&db, &member, 2018, &schedule, date(2018, 3, 1))
            .await
            .unwrap();
        let result = issue_dues_invoice(&db, &member, 2018, &schedule, date(2018, 4, 1)).await;
        assert!(matches!(result, Err(DuesError::AlreadyInvoiced(_, 2018))));

        let invoices = DuesInvoiceRepository::new(&db).get_all(2018).await.unwrap();
        assert_eq!(invoices.len(), 1);
    }

    #[tokio::test]
    async fn test_issue_dues_invoice_requires_membership() {
        let db = Connection::open_test().await;
        let schedule = DuesSchedule::default();

        let applicant = db
            .insert(Member {
                firstname: "Applicant".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let result = issue_dues_invoice(&db, &applicant, 2018, &schedule, date(2018, 3, 1)).await;
        assert!(matches!(result, Err(DuesError::NotAMember(_, 2018))));

        // Membership starting in the following year
        let member = make_member(&db, date(2019, 1, 1), 1).await;
        let result = issue_dues_invoice(&db, &member, 2018, &schedule, date(2018, 3, 1)).await;
        assert!(matches!(result, Err(DuesError::NotAMember(_, 2018))));

        let invoices = DuesInvoiceRepository::new(&db).get_all(2018).await.unwrap();
        assert!(invoices.is_empty());
    }

    #[tokio::test]
    async fn test_failed_invoice_leaves_no_dues() {
        let db = Connection::open_test().await;
        let member = make_member(&db, date(2018, 1, 1), 1).await;
        let schedule = DuesSchedule::default();

        let store = FailingStore::new(&db, 1);
        let result = issue_dues_invoice(&store, &member, 2018, &schedule, date(2018, 3, 1)).await;
        assert!(matches!(result, Err(DuesError::Error(_))));

        let dues: Vec<Dues> = db
            .query(&DuesFilter {
                member_id: Some(member.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(dues.is_empty());

        let (_, invoice) = issue_dues_invoice(&db, &member, 2018, &schedule, date(2018, 3, 2))
            .await
            .unwrap();
        assert_eq!(invoice.invoice_no, 1);
    }
}
