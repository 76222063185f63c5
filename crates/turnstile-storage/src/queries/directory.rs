// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Departments, services and counters.

use std::str::FromStr;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;
use turnstile_core::{
    AgentId, Counter, CounterId, CounterType, DepartmentId, Directory, Service, ServiceId,
    TurnstileError,
};

use crate::database::{Database, map_tr_err};
use crate::models::uuid_column;

/// Upsert the directory in one transaction.
///
/// Employee assignments are replaced wholesale so an agent can move between
/// counters without tripping the one-counter-per-employee index.
pub async fn sync_directory(db: &Database, directory: Directory) -> Result<(), TurnstileError> {
    let (departments, services, counters) = (
        directory.departments.len(),
        directory.services.len(),
        directory.counters.len(),
    );
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            for department in &directory.departments {
                tx.execute(
                    "INSERT INTO departments (id, name, name_ar) VALUES (?1, ?2, ?3)
                     ON CONFLICT(id) DO UPDATE SET name = excluded.name, name_ar = excluded.name_ar",
                    params![department.id.to_string(), department.name, department.name_ar],
                )?;
            }

            for service in &directory.services {
                tx.execute(
                    "INSERT INTO services (id, symbol, name, name_ar, department_id)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(id) DO UPDATE SET symbol = excluded.symbol, name = excluded.name,
                         name_ar = excluded.name_ar, department_id = excluded.department_id",
                    params![
                        service.id.to_string(),
                        service.symbol,
                        service.name,
                        service.name_ar,
                        service.department.to_string()
                    ],
                )?;
            }

            tx.execute("UPDATE counters SET employee = NULL", [])?;
            for counter in &directory.counters {
                let id = counter.id.to_string();
                tx.execute(
                    "INSERT INTO counters (id, number, counter_type, employee) VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(id) DO UPDATE SET number = excluded.number,
                         counter_type = excluded.counter_type, employee = excluded.employee",
                    params![
                        id,
                        counter.number,
                        counter.counter_type.to_string(),
                        counter.employee.as_ref().map(|a| a.as_str())
                    ],
                )?;
                tx.execute(
                    "DELETE FROM counter_departments WHERE counter_id = ?1",
                    params![id],
                )?;
                for department in &counter.departments {
                    tx.execute(
                        "INSERT INTO counter_departments (counter_id, department_id) VALUES (?1, ?2)",
                        params![id, department.to_string()],
                    )?;
                }
            }

            tx.commit()
        })
        .await
        .map_err(map_tr_err)?;
    debug!(departments, services, counters, "directory synced");
    Ok(())
}

pub async fn get_service(db: &Database, id: ServiceId) -> Result<Option<Service>, TurnstileError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, symbol, name, name_ar, department_id FROM services WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    Ok(Service {
                        id: uuid_column(row, 0)?,
                        symbol: row.get(1)?,
                        name: row.get(2)?,
                        name_ar: row.get(3)?,
                        department: uuid_column(row, 4)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_counter(db: &Database, id: CounterId) -> Result<Option<Counter>, TurnstileError> {
    db.connection()
        .call(move |conn| load_counter(conn, "id", &id.to_string()))
        .await
        .map_err(map_tr_err)
}

/// The counter whose `employee` is `agent`.
pub async fn counter_for_agent(
    db: &Database,
    agent: &AgentId,
) -> Result<Option<Counter>, TurnstileError> {
    let agent = agent.as_str().to_string();
    db.connection()
        .call(move |conn| load_counter(conn, "employee", &agent))
        .await
        .map_err(map_tr_err)
}

pub(crate) fn counter_exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM counters WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

/// `column` is a fixed identifier chosen by this module, never caller input.
fn load_counter(conn: &Connection, column: &str, value: &str) -> rusqlite::Result<Option<Counter>> {
    let sql = format!("SELECT id, number, counter_type, employee FROM counters WHERE {column} = ?1");
    let Some((id, number, counter_type, employee)) = conn
        .query_row(&sql, params![value], |row| {
            Ok((
                uuid_column::<CounterId>(row, 0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })
        .optional()?
    else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT department_id FROM counter_departments WHERE counter_id = ?1 ORDER BY department_id",
    )?;
    let departments = stmt
        .query_map(params![id.to_string()], |row| uuid_column::<DepartmentId>(row, 0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Some(Counter {
        id,
        number,
        counter_type: CounterType::from_str(&counter_type).unwrap_or_default(),
        departments,
        employee: employee.map(AgentId),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::testing::fixture;

    #[tokio::test]
    async fn counters_resolve_by_id_and_agent() {
        let f = fixture().await;
        let by_id = get_counter(&f.db, f.counter_one).await.unwrap().unwrap();
        assert_eq!(by_id.number, 1);
        assert_eq!(by_id.departments.len(), 1);

        let by_agent = counter_for_agent(&f.db, &AgentId::from("agent-2"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_agent.id, f.counter_two);
        assert_eq!(by_agent.counter_type, CounterType::Cashier);

        assert!(
            counter_for_agent(&f.db, &AgentId::from("nobody"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn resync_moves_employee_between_counters() {
        let f = fixture().await;
        let mut one = get_counter(&f.db, f.counter_one).await.unwrap().unwrap();
        let mut two = get_counter(&f.db, f.counter_two).await.unwrap().unwrap();
        std::mem::swap(&mut one.employee, &mut two.employee);

        let directory = Directory {
            departments: vec![],
            services: vec![],
            counters: vec![one, two],
        };
        sync_directory(&f.db, directory).await.unwrap();

        let agent_one = counter_for_agent(&f.db, &AgentId::from("agent-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(agent_one.id, f.counter_two);
    }

    #[tokio::test]
    async fn unknown_service_is_none() {
        let f = fixture().await;
        assert!(get_service(&f.db, ServiceId::new()).await.unwrap().is_none());
        let service = get_service(&f.db, f.licensing).await.unwrap().unwrap();
        assert_eq!(service.symbol, "A");
    }
}
