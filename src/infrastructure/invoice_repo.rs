use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::invoice::{Invoice, InvoiceInput, ListResult, NewInvoice};
use crate::domain::ports::InvoiceRepository;
use crate::schema::invoices;

use super::models::{InvoiceChangesRow, InvoiceRow, NewInvoiceRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw)
        .map_err(|e| DomainError::InvalidInput(format!("{field} '{raw}' is not a valid UUID: {e}")))
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DomainError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Invoice {
            id: row.id.to_string(),
            customer_id: row.customer_id.to_string(),
            amount: row.amount,
            status: row
                .status
                .parse()
                .map_err(|e: DomainError| DomainError::Internal(e.to_string()))?,
            date: row.date,
        })
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselInvoiceRepository {
    pool: DbPool,
}

impl DieselInvoiceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl InvoiceRepository for DieselInvoiceRepository {
    fn create(&self, invoice: NewInvoice) -> Result<String, DomainError> {
        let row = NewInvoiceRow {
            id: Uuid::new_v4(),
            customer_id: parse_uuid("customer_id", &invoice.customer_id)?,
            amount: invoice.amount,
            status: invoice.status.as_str().to_string(),
            date: invoice.date,
        };

        let mut conn = self.pool.get()?;
        diesel::insert_into(invoices::table)
            .values(&row)
            .execute(&mut conn)?;

        Ok(row.id.to_string())
    }

    fn update(&self, id: &str, changes: InvoiceInput) -> Result<usize, DomainError> {
        let id = parse_uuid("id", id)?;
        let changes = InvoiceChangesRow {
            customer_id: parse_uuid("customer_id", &changes.customer_id)?,
            amount: changes.amount,
            status: changes.status.as_str().to_string(),
        };

        let mut conn = self.pool.get()?;
        let updated = diesel::update(invoices::table.filter(invoices::id.eq(id)))
            .set(&changes)
            .execute(&mut conn)?;

        Ok(updated)
    }

    fn delete(&self, id: &str) -> Result<usize, DomainError> {
        let id = parse_uuid("id", id)?;

        let mut conn = self.pool.get()?;
        let deleted =
            diesel::delete(invoices::table.filter(invoices::id.eq(id))).execute(&mut conn)?;

        Ok(deleted)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Invoice>, DomainError> {
        // Malformed identifiers cannot match a row.
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let mut conn = self.pool.get()?;
        let row = invoices::table
            .filter(invoices::id.eq(id))
            .select(InvoiceRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(Invoice::try_from).transpose()
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = page.saturating_sub(1).checked_mul(limit);
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = invoices::table.count().get_result(conn)?;

            // Pages past the last row are empty.
            let Some(offset) = offset.filter(|offset| *offset < total) else {
                return Ok(ListResult {
                    items: Vec::new(),
                    total,
                });
            };

            let rows = invoices::table
                .select(InvoiceRow::as_select())
                .order((invoices::date.desc(), invoices::id.asc()))
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .map(Invoice::try_from)
                    .collect::<Result<_, _>>()?,
                total,
            })
        })
    }
}
