//! Reference data: employees, customers, rate overrides and weekly comments.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{OptionalExtension, Row, params};

use crate::error::EngineResult;
use crate::models::{Customer, DateRange, Employee, RateOverride, WeeklyComment};

use super::{Database, format_timestamp, parse_optional_text, parse_text};

impl Database {
    /// Inserts or replaces an employee and its aliases.
    pub fn upsert_employee(&mut self, employee: &Employee) -> EngineResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "
            INSERT INTO employees (id, name, category, default_pay_rate, default_client_bill_rate)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                category = excluded.category,
                default_pay_rate = excluded.default_pay_rate,
                default_client_bill_rate = excluded.default_client_bill_rate
            ",
            params![
                employee.id,
                employee.name,
                employee.category.as_str(),
                employee.default_pay_rate.map(|r| r.to_string()),
                employee.default_client_bill_rate.map(|r| r.to_string()),
            ],
        )?;
        tx.execute(
            "DELETE FROM employee_aliases WHERE employee_id = ?1",
            [&employee.id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO employee_aliases (employee_id, alias) VALUES (?1, ?2)",
            )?;
            for alias in &employee.aliases {
                stmt.execute(params![employee.id, alias])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Looks up an employee by id.
    pub fn employee(&self, id: &str) -> EngineResult<Option<Employee>> {
        let employee = self
            .conn
            .query_row(
                "
                SELECT id, name, category, default_pay_rate, default_client_bill_rate
                FROM employees WHERE id = ?1
                ",
                [id],
                employee_from_row,
            )
            .optional()?;

        match employee {
            Some(mut employee) => {
                employee.aliases = self.aliases_for(&employee.id)?;
                Ok(Some(employee))
            }
            None => Ok(None),
        }
    }

    /// Lists every employee ordered by id.
    pub fn employees(&self) -> EngineResult<Vec<Employee>> {
        let mut aliases: HashMap<String, Vec<String>> = HashMap::new();
        {
            let mut stmt = self.conn.prepare(
                "SELECT employee_id, alias FROM employee_aliases ORDER BY employee_id ASC, alias ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (employee_id, alias) = row?;
                aliases.entry(employee_id).or_default().push(alias);
            }
        }

        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, category, default_pay_rate, default_client_bill_rate
            FROM employees ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map([], employee_from_row)?;
        let mut employees = Vec::new();
        for row in rows {
            let mut employee = row?;
            employee.aliases = aliases.remove(&employee.id).unwrap_or_default();
            employees.push(employee);
        }
        Ok(employees)
    }

    fn aliases_for(&self, employee_id: &str) -> EngineResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT alias FROM employee_aliases WHERE employee_id = ?1 ORDER BY alias ASC",
        )?;
        let rows = stmt.query_map([employee_id], |row| row.get::<_, String>(0))?;
        let mut aliases = Vec::new();
        for row in rows {
            aliases.push(row?);
        }
        Ok(aliases)
    }

    /// Inserts or replaces a customer.
    pub fn upsert_customer(&self, customer: &Customer) -> EngineResult<()> {
        self.conn.execute(
            "
            INSERT INTO customers (id, name, address) VALUES (?1, ?2, ?3)
            ON CONFLICT (id) DO UPDATE SET name = excluded.name, address = excluded.address
            ",
            params![customer.id, customer.name, customer.address],
        )?;
        Ok(())
    }

    /// Looks up a customer by id.
    pub fn customer(&self, id: &str) -> EngineResult<Option<Customer>> {
        let customer = self
            .conn
            .query_row(
                "SELECT id, name, address FROM customers WHERE id = ?1",
                [id],
                customer_from_row,
            )
            .optional()?;
        Ok(customer)
    }

    /// Lists every customer ordered by id.
    pub fn customers(&self) -> EngineResult<Vec<Customer>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, address FROM customers ORDER BY id ASC")?;
        let rows = stmt.query_map([], customer_from_row)?;
        let mut customers = Vec::new();
        for row in rows {
            customers.push(row?);
        }
        Ok(customers)
    }

    /// Sets the negotiated rate for a pair, replacing any existing one.
    pub fn set_rate_override(&self, rate: &RateOverride) -> EngineResult<()> {
        self.conn.execute(
            "
            INSERT INTO rate_overrides (employee_id, customer_id, bill_rate) VALUES (?1, ?2, ?3)
            ON CONFLICT (employee_id, customer_id) DO UPDATE SET bill_rate = excluded.bill_rate
            ",
            params![rate.employee_id, rate.customer_id, rate.bill_rate.to_string()],
        )?;
        Ok(())
    }

    /// Lists every rate override ordered by employee then customer.
    pub fn rate_overrides(&self) -> EngineResult<Vec<RateOverride>> {
        let mut stmt = self.conn.prepare(
            "
            SELECT employee_id, customer_id, bill_rate FROM rate_overrides
            ORDER BY employee_id ASC, customer_id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RateOverride {
                employee_id: row.get(0)?,
                customer_id: row.get(1)?,
                bill_rate: parse_text(row, 2)?,
            })
        })?;
        let mut overrides = Vec::new();
        for row in rows {
            overrides.push(row?);
        }
        Ok(overrides)
    }

    /// Inserts or replaces the comment for an employee's week.
    pub fn upsert_weekly_comment(
        &self,
        comment: &WeeklyComment,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        self.conn.execute(
            "
            INSERT INTO weekly_comments (employee_id, week_start, comment, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (employee_id, week_start) DO UPDATE SET
                comment = excluded.comment,
                updated_at = excluded.updated_at
            ",
            params![
                comment.employee_id,
                comment.week_start,
                comment.comment,
                format_timestamp(now),
            ],
        )?;
        Ok(())
    }

    /// Looks up the comment for an employee's week.
    pub fn weekly_comment(
        &self,
        employee_id: &str,
        week_start: NaiveDate,
    ) -> EngineResult<Option<WeeklyComment>> {
        let comment = self
            .conn
            .query_row(
                "
                SELECT employee_id, week_start, comment FROM weekly_comments
                WHERE employee_id = ?1 AND week_start = ?2
                ",
                params![employee_id, week_start],
                comment_from_row,
            )
            .optional()?;
        Ok(comment)
    }

    /// Lists comments for weeks starting inside `range`.
    pub fn weekly_comments_in_range(&self, range: DateRange) -> EngineResult<Vec<WeeklyComment>> {
        let mut stmt = self.conn.prepare(
            "
            SELECT employee_id, week_start, comment FROM weekly_comments
            WHERE week_start BETWEEN ?1 AND ?2
            ORDER BY employee_id ASC, week_start ASC
            ",
        )?;
        let rows = stmt.query_map(params![range.start, range.end], comment_from_row)?;
        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?);
        }
        Ok(comments)
    }
}

fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        name: row.get(1)?,
        category: parse_text(row, 2)?,
        default_pay_rate: parse_optional_text(row, 3)?,
        default_client_bill_rate: parse_optional_text(row, 4)?,
        aliases: Vec::new(),
    })
}

fn customer_from_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<WeeklyComment> {
    Ok(WeeklyComment {
        employee_id: row.get(0)?,
        week_start: row.get(1)?,
        comment: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmployeeCategory;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_employee(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            name: "Boban Abbate".to_string(),
            category: EmployeeCategory::Hourly,
            default_pay_rate: Some(dec("22.50")),
            default_client_bill_rate: None,
            aliases: vec!["Bob".to_string(), "Boban A".to_string()],
        }
    }

    fn create_customer(id: &str) -> Customer {
        Customer {
            id: id.to_string(),
            name: "Boyle".to_string(),
            address: Some("12 Main St".to_string()),
        }
    }

    #[test]
    fn test_employee_round_trips_with_aliases() {
        let mut db = Database::open_in_memory().unwrap();
        let employee = create_employee("emp_boban");
        db.upsert_employee(&employee).unwrap();

        assert_eq!(db.employee("emp_boban").unwrap(), Some(employee));
        assert_eq!(db.employee("emp_missing").unwrap(), None);
    }

    #[test]
    fn test_upsert_employee_replaces_fields_and_aliases() {
        let mut db = Database::open_in_memory().unwrap();
        db.upsert_employee(&create_employee("emp_boban")).unwrap();

        let mut updated = create_employee("emp_boban");
        updated.category = EmployeeCategory::Admin;
        updated.default_pay_rate = None;
        updated.default_client_bill_rate = Some(dec("55"));
        updated.aliases = vec!["B. Abbate".to_string()];
        db.upsert_employee(&updated).unwrap();

        let employees = db.employees().unwrap();
        assert_eq!(employees, vec![updated]);
    }

    #[test]
    fn test_customers_are_listed_by_id() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_customer(&create_customer("cust_watkins")).unwrap();
        db.upsert_customer(&create_customer("cust_boyle")).unwrap();

        let ids: Vec<String> = db.customers().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["cust_boyle", "cust_watkins"]);
        assert_eq!(
            db.customer("cust_boyle").unwrap().unwrap().address.as_deref(),
            Some("12 Main St")
        );
    }

    #[test]
    fn test_rate_override_is_unique_per_pair() {
        let mut db = Database::open_in_memory().unwrap();
        db.upsert_employee(&create_employee("emp_boban")).unwrap();
        db.upsert_customer(&create_customer("cust_boyle")).unwrap();

        let mut rate = RateOverride {
            employee_id: "emp_boban".to_string(),
            customer_id: "cust_boyle".to_string(),
            bill_rate: dec("25"),
        };
        db.set_rate_override(&rate).unwrap();
        rate.bill_rate = dec("27.50");
        db.set_rate_override(&rate).unwrap();

        assert_eq!(db.rate_overrides().unwrap(), vec![rate]);
    }

    #[test]
    fn test_weekly_comment_upsert_and_range() {
        let mut db = Database::open_in_memory().unwrap();
        db.upsert_employee(&create_employee("emp_boban")).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 2, 9, 12, 0, 0).unwrap();

        let mut comment = WeeklyComment {
            employee_id: "emp_boban".to_string(),
            week_start: date(2026, 2, 2),
            comment: "PTO Friday".to_string(),
        };
        db.upsert_weekly_comment(&comment, now).unwrap();
        comment.comment = "PTO Friday afternoon".to_string();
        db.upsert_weekly_comment(&comment, now).unwrap();

        assert_eq!(
            db.weekly_comment("emp_boban", date(2026, 2, 2)).unwrap(),
            Some(comment.clone())
        );
        assert_eq!(db.weekly_comment("emp_boban", date(2026, 2, 9)).unwrap(), None);

        let february = DateRange::new(date(2026, 2, 1), date(2026, 2, 28)).unwrap();
        assert_eq!(db.weekly_comments_in_range(february).unwrap(), vec![comment]);
    }
}
