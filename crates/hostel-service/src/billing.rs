//! Student bills.

use chrono::Utc;
use hostel_core::Role;
use hostel_core::records::{Bill, BillStatus, NewBill};
use hostel_store::{RecordStore, SharedStore, Store};
use tracing::info;

use crate::auth::AuthSession;
use crate::error::ServiceResult;
use crate::notifications::Notifier;

#[derive(Clone)]
pub struct BillingService {
    store: SharedStore,
    notifier: Notifier,
}

impl BillingService {
    pub fn new(store: SharedStore) -> Self {
        let notifier = Notifier::new(store.clone());
        Self { store, notifier }
    }

    /// Issue a pending bill and notify the student.
    pub async fn create(&self, auth: &AuthSession, new: NewBill) -> ServiceResult<Bill> {
        auth.require(Role::Admin)?;
        new.validate()?;

        let bill = Bill {
            id: uuid::Uuid::new_v4().to_string(),
            student_id: new.student_id,
            amount: new.amount,
            description: new.description.trim().to_string(),
            due_date: new.due_date,
            status: BillStatus::Pending,
            created_at: Utc::now(),
        };
        self.store.insert_bill(&bill).await?;
        info!(bill_id = %bill.id, student_id = %bill.student_id, amount = bill.amount, "Bill created");

        self.notifier
            .bill_created(&bill.student_id, bill.amount, bill.due_date)
            .await;
        Ok(bill)
    }

    /// Students see their own bills; admins see everyone's.
    pub async fn list(&self, auth: &AuthSession) -> ServiceResult<Vec<Bill>> {
        let bills = match auth.role() {
            Role::Admin => self.store.bills(None).await?,
            Role::Student => self.store.bills(Some(auth.user_id())).await?,
        };
        Ok(bills)
    }

    pub async fn mark_paid(&self, auth: &AuthSession, bill_id: &str) -> ServiceResult<Bill> {
        auth.require(Role::Admin)?;
        let bill = self.store.set_bill_status(bill_id, BillStatus::Paid).await?;
        info!(bill_id, "Bill paid");
        self.notifier
            .payment_received(&bill.student_id, bill.amount)
            .await;
        Ok(bill)
    }

    /// Sum of unpaid amounts in `bills`.
    pub fn outstanding(bills: &[Bill]) -> f64 {
        bills
            .iter()
            .filter(|b| b.status == BillStatus::Pending)
            .map(|b| b.amount)
            .sum()
    }
}

impl std::fmt::Debug for BillingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingService")
            .field("backend", &self.store.backend_name())
            .finish_non_exhaustive()
    }
}
