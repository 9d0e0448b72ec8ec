//! Equipment repository

use async_trait::async_trait;

use super::postgres::PgUnitOfWork;
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{
            Equipment, EquipmentDetails, EquipmentFilter, EquipmentPageQuery, EquipmentSort,
            EquipmentSortKey, NewEquipment,
        },
        pagination::page_offset,
    },
};

#[async_trait]
pub trait EquipmentRepository: Send {
    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<EquipmentDetails>>;

    /// One page of matches, sorted, plus the number of matches before paging
    async fn get_paged(&mut self, query: &EquipmentPageQuery) -> AppResult<(Vec<EquipmentDetails>, i64)>;

    /// Every match of `filter`, by name
    async fn search(&mut self, filter: &EquipmentFilter) -> AppResult<Vec<EquipmentDetails>>;

    async fn get_by_category(&mut self, category_id: i32) -> AppResult<Vec<EquipmentDetails>>;

    /// Whether a row other than `exclude_id` has exactly this serial number
    async fn serial_number_exists(&mut self, serial_number: &str, exclude_id: Option<i32>) -> AppResult<bool>;

    /// Insert and return the generated id
    async fn add(&mut self, data: &NewEquipment) -> AppResult<i32>;

    /// Overwrite the row with `equipment.equipment_id`; false if it does not exist
    async fn update(&mut self, equipment: &Equipment) -> AppResult<bool>;

    async fn delete(&mut self, id: i32) -> AppResult<bool>;
}

/// Business error for a serial number already in use
pub fn duplicate_serial_number(serial_number: &str) -> AppError {
    AppError::business_rule(
        "Serial number already exists",
        format!("Equipment with serial number '{}' already exists", serial_number),
    )
}

fn map_serial_conflict(error: sqlx::Error, serial_number: &str) -> AppError {
    let error = AppError::from(error);
    if error.is_unique_violation() {
        duplicate_serial_number(serial_number)
    } else {
        error
    }
}

const SELECT_DETAILS: &str = r#"
    SELECT e.equipment_id, e.equipment_name, e.serial_number, e.category_id, e.location_id,
           e.purchase_date, e.status, e.created_date, e.modified_date,
           COALESCE(c.category_name, '') AS category_name,
           COALESCE(l.location_name, '') AS location_name,
           COALESCE(l.building, '') AS building,
           COALESCE(l.floor, '') AS floor
    FROM equipment e
    LEFT JOIN categories c ON c.category_id = e.category_id
    LEFT JOIN locations l ON l.location_id = e.location_id
"#;

/// WHERE clause for `filter` with placeholders numbered from `$1`,
/// and the next free placeholder index
fn filter_clause(filter: &EquipmentFilter) -> (String, usize) {
    let mut conditions = vec!["1=1".to_string()];
    let mut idx = 1;

    if filter.search_term().is_some() {
        conditions.push(format!(
            "(POSITION(LOWER(${i}) IN LOWER(e.equipment_name)) > 0 \
             OR POSITION(LOWER(${i}) IN LOWER(e.serial_number)) > 0)",
            i = idx
        ));
        idx += 1;
    }

    macro_rules! add_condition {
        ($field:expr, $sql:expr) => {
            if $field.is_some() {
                conditions.push(format!("{} ${}", $sql, idx));
                idx += 1;
            }
        };
    }

    add_condition!(filter.category_id, "e.category_id =");
    add_condition!(filter.status, "e.status =");
    add_condition!(filter.purchase_date_from, "e.purchase_date >=");
    add_condition!(filter.purchase_date_to, "e.purchase_date <=");

    (conditions.join(" AND "), idx)
}

/// Bind the values referenced by [`filter_clause`], in the same order
macro_rules! bind_filter {
    ($builder:expr, $filter:expr) => {{
        let mut builder = $builder;
        if let Some(term) = $filter.search_term() {
            builder = builder.bind(term.to_string());
        }
        if let Some(category_id) = $filter.category_id {
            builder = builder.bind(category_id);
        }
        if let Some(status) = $filter.status {
            builder = builder.bind(status);
        }
        if let Some(from) = $filter.purchase_date_from {
            builder = builder.bind(from);
        }
        if let Some(to) = $filter.purchase_date_to {
            builder = builder.bind(to);
        }
        builder
    }};
}

fn order_clause(sort: EquipmentSort) -> String {
    let column = match sort.key {
        EquipmentSortKey::EquipmentName => "e.equipment_name",
        EquipmentSortKey::PurchaseDate => "e.purchase_date",
        EquipmentSortKey::Status => "e.status",
        EquipmentSortKey::CategoryName => "COALESCE(c.category_name, '')",
    };
    // id keeps pages stable when the sort column has duplicates
    format!("{} {}, e.equipment_id ASC", column, sort.direction.as_sql())
}

#[async_trait]
impl EquipmentRepository for PgUnitOfWork {
    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<EquipmentDetails>> {
        let query = format!("{} WHERE e.equipment_id = $1", SELECT_DETAILS);
        let row = sqlx::query_as::<_, EquipmentDetails>(&query)
            .bind(id)
            .fetch_optional(self.conn())
            .await?;
        Ok(row)
    }

    async fn get_paged(&mut self, query: &EquipmentPageQuery) -> AppResult<(Vec<EquipmentDetails>, i64)> {
        let (where_clause, idx) = filter_clause(&query.filter);

        let count_query = format!("SELECT COUNT(*) FROM equipment e WHERE {}", where_clause);
        let total: i64 = bind_filter!(sqlx::query_scalar::<_, i64>(&count_query), query.filter)
            .fetch_one(self.conn())
            .await?;

        let select_query = format!(
            "{} WHERE {} ORDER BY {} LIMIT ${} OFFSET ${}",
            SELECT_DETAILS,
            where_clause,
            order_clause(query.sort),
            idx,
            idx + 1
        );
        let rows = bind_filter!(sqlx::query_as::<_, EquipmentDetails>(&select_query), query.filter)
            .bind(query.page_size)
            .bind(page_offset(query.page_number, query.page_size))
            .fetch_all(self.conn())
            .await?;

        Ok((rows, total))
    }

    async fn search(&mut self, filter: &EquipmentFilter) -> AppResult<Vec<EquipmentDetails>> {
        let (where_clause, _) = filter_clause(filter);
        let query = format!(
            "{} WHERE {} ORDER BY e.equipment_name, e.equipment_id",
            SELECT_DETAILS, where_clause
        );
        let rows = bind_filter!(sqlx::query_as::<_, EquipmentDetails>(&query), filter)
            .fetch_all(self.conn())
            .await?;
        Ok(rows)
    }

    async fn get_by_category(&mut self, category_id: i32) -> AppResult<Vec<EquipmentDetails>> {
        let query = format!(
            "{} WHERE e.category_id = $1 ORDER BY e.equipment_name, e.equipment_id",
            SELECT_DETAILS
        );
        let rows = sqlx::query_as::<_, EquipmentDetails>(&query)
            .bind(category_id)
            .fetch_all(self.conn())
            .await?;
        Ok(rows)
    }

    async fn serial_number_exists(&mut self, serial_number: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM equipment
                WHERE serial_number = $1
                  AND ($2::integer IS NULL OR equipment_id <> $2)
            )
            "#,
        )
        .bind(serial_number)
        .bind(exclude_id)
        .fetch_one(self.conn())
        .await?;
        Ok(exists)
    }

    async fn add(&mut self, data: &NewEquipment) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO equipment (
                equipment_name, serial_number, category_id, location_id,
                purchase_date, status, created_date, modified_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING equipment_id
            "#,
        )
        .bind(&data.equipment_name)
        .bind(&data.serial_number)
        .bind(data.category_id)
        .bind(data.location_id)
        .bind(data.purchase_date)
        .bind(data.status)
        .bind(data.created_date)
        .bind(data.modified_date)
        .fetch_one(self.conn())
        .await
        .map_err(|e| map_serial_conflict(e, &data.serial_number))
    }

    async fn update(&mut self, equipment: &Equipment) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE equipment
            SET equipment_name = $1, serial_number = $2, category_id = $3, location_id = $4,
                purchase_date = $5, status = $6, modified_date = $7
            WHERE equipment_id = $8
            "#,
        )
        .bind(&equipment.equipment_name)
        .bind(&equipment.serial_number)
        .bind(equipment.category_id)
        .bind(equipment.location_id)
        .bind(equipment.purchase_date)
        .bind(equipment.status)
        .bind(equipment.modified_date)
        .bind(equipment.equipment_id)
        .execute(self.conn())
        .await
        .map_err(|e| map_serial_conflict(e, &equipment.serial_number))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&mut self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM equipment WHERE equipment_id = $1")
            .bind(id)
            .execute(self.conn())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
