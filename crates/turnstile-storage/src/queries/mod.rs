// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules. Each public function takes `&Database` and runs one
//! closure on the writer thread; `pub(crate)` helpers take a connection so
//! they compose inside a caller's transaction.

pub mod board;
pub mod directory;
pub mod selector;
pub mod tickets;
pub mod transition;

#[cfg(test)]
pub(crate) mod testing {
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use tempfile::TempDir;
    use turnstile_core::{
        AgentId, Counter, CounterId, CounterType, CustomerContact, Department, DepartmentId,
        Directory, NewTicket, Service, ServiceId,
    };

    use crate::database::Database;

    pub struct Fixture {
        pub db: Database,
        pub licensing: ServiceId,
        pub payments: ServiceId,
        /// Counter 1, licensing department, operated by `agent-1`.
        pub counter_one: CounterId,
        /// Counter 2, payments department, operated by `agent-2`.
        pub counter_two: CounterId,
        _dir: TempDir,
    }

    pub fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    pub fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap() + Duration::minutes(minute)
    }

    pub fn new_ticket(service: ServiceId, name: &str) -> NewTicket {
        NewTicket {
            service,
            customer: CustomerContact {
                customer_name: name.to_string(),
                customer_name_ar: String::new(),
                nationality: String::new(),
                mobile_number: "0501234567".to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
            },
        }
    }

    pub async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        let licensing_dept = DepartmentId::new();
        let payments_dept = DepartmentId::new();
        let licensing = ServiceId::new();
        let payments = ServiceId::new();
        let counter_one = CounterId::new();
        let counter_two = CounterId::new();

        let directory = Directory {
            departments: vec![
                Department {
                    id: licensing_dept,
                    name: "Licensing".into(),
                    name_ar: String::new(),
                },
                Department {
                    id: payments_dept,
                    name: "Payments".into(),
                    name_ar: String::new(),
                },
            ],
            services: vec![
                Service {
                    id: licensing,
                    symbol: "A".into(),
                    name: "Renewals".into(),
                    name_ar: String::new(),
                    department: licensing_dept,
                },
                Service {
                    id: payments,
                    symbol: "P".into(),
                    name: "Fees".into(),
                    name_ar: String::new(),
                    department: payments_dept,
                },
            ],
            counters: vec![
                Counter {
                    id: counter_one,
                    number: 1,
                    counter_type: CounterType::Counter,
                    departments: vec![licensing_dept],
                    employee: Some(AgentId::from("agent-1")),
                },
                Counter {
                    id: counter_two,
                    number: 2,
                    counter_type: CounterType::Cashier,
                    departments: vec![payments_dept],
                    employee: Some(AgentId::from("agent-2")),
                },
            ],
        };
        super::directory::sync_directory(&db, directory).await.unwrap();

        Fixture {
            db,
            licensing,
            payments,
            counter_one,
            counter_two,
            _dir: dir,
        }
    }
}
