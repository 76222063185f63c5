// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Standard directory and ticket builders shared by integration tests.
//!
//! Layout:
//!
//! | counter | type    | agent   | departments  |
//! |---------|---------|---------|--------------|
//! | 1       | counter | agent-1 | front        |
//! | 2       | counter | agent-2 | front        |
//! | 3       | cashier | agent-3 | cash         |
//! | 4       | counter | -       | front, cash  |
//!
//! Services: `A` Licensing and `B` Renewals (front), `P` Payments (cash).

use turnstile_core::{
    Counter, CounterId, CounterType, CustomerContact, Department, DepartmentId, Directory,
    NewTicket, Service, ServiceId,
};

pub const AGENT_ONE: &str = "agent-1";
pub const AGENT_TWO: &str = "agent-2";
pub const CASHIER_AGENT: &str = "agent-3";

/// Ids of everything in the standard directory.
#[derive(Debug, Clone)]
pub struct StandardDirectory {
    pub front: DepartmentId,
    pub cash: DepartmentId,
    pub licensing: ServiceId,
    pub renewals: ServiceId,
    pub payments: ServiceId,
    pub counter_one: CounterId,
    pub counter_two: CounterId,
    pub cashier: CounterId,
    pub spare: CounterId,
}

impl StandardDirectory {
    pub fn new() -> Self {
        Self {
            front: DepartmentId::new(),
            cash: DepartmentId::new(),
            licensing: ServiceId::new(),
            renewals: ServiceId::new(),
            payments: ServiceId::new(),
            counter_one: CounterId::new(),
            counter_two: CounterId::new(),
            cashier: CounterId::new(),
            spare: CounterId::new(),
        }
    }

    pub fn directory(&self) -> Directory {
        let service = |id, symbol: &str, name: &str, department| Service {
            id,
            symbol: symbol.into(),
            name: name.into(),
            name_ar: String::new(),
            department,
        };
        let counter = |id, number, counter_type, departments, employee: Option<&str>| Counter {
            id,
            number,
            counter_type,
            departments,
            employee: employee.map(Into::into),
        };

        Directory {
            departments: vec![
                Department {
                    id: self.front,
                    name: "Front office".into(),
                    name_ar: String::new(),
                },
                Department {
                    id: self.cash,
                    name: "Cash desk".into(),
                    name_ar: String::new(),
                },
            ],
            services: vec![
                service(self.licensing, "A", "Licensing", self.front),
                service(self.renewals, "B", "Renewals", self.front),
                service(self.payments, "P", "Payments", self.cash),
            ],
            counters: vec![
                counter(
                    self.counter_one,
                    1,
                    CounterType::Counter,
                    vec![self.front],
                    Some(AGENT_ONE),
                ),
                counter(
                    self.counter_two,
                    2,
                    CounterType::Counter,
                    vec![self.front],
                    Some(AGENT_TWO),
                ),
                counter(
                    self.cashier,
                    3,
                    CounterType::Cashier,
                    vec![self.cash],
                    Some(CASHIER_AGENT),
                ),
                counter(
                    self.spare,
                    4,
                    CounterType::Counter,
                    vec![self.front, self.cash],
                    None,
                ),
            ],
        }
    }
}

impl Default for StandardDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// A valid ticket request for `service` in the name of `customer_name`.
pub fn new_ticket(service: ServiceId, customer_name: &str) -> NewTicket {
    NewTicket {
        service,
        customer: CustomerContact {
            customer_name: customer_name.into(),
            customer_name_ar: String::new(),
            nationality: "AE".into(),
            mobile_number: "0501234567".into(),
            email: "customer@example.com".into(),
        },
    }
}
