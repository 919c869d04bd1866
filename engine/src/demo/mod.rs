//! Demo records and mapping.
//!
//! A small customer directory used by the `demo` CLI command, the
//! `example-mapping` output and the tests.
//!
//! ```text
//! date,first name,contact,last name,website,budget
//!  0        1        2        3        4       5
//!
//! Customer
//! ├─ Name   ← 1
//! ├─ Id     ← 2
//! ├─ Budget ← 5
//! ├─ Join   ← 0  (%Y-%m-%d)
//! └─ Sub: SubCustomer
//!    ├─ Name ← 3
//!    ├─ Id   ← 2
//!    └─ Sub: Subs
//!       └─ Website ← 4
//! ```

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::impl_record;
use crate::mapping::{MappingNode, ParseOptions};

/// Sample input matching [`example_mapping`].
pub const SAMPLE_CSV: &str = "\
date,first name,contact,last name,website,budget
2011-04-11,Clementine,8305025573,person,abc.com,10000.53
2011-04-11,Barry,83050255735,hello,abc.com,10000.25234
2011-04-11,Barry,83050255735,hello,abc.com,10000.25234
";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Customer {
    pub name: String,
    pub id: i64,
    pub budget: f64,
    pub join: NaiveDateTime,
    pub sub: SubCustomer,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubCustomer {
    pub name: String,
    pub id: i64,
    pub sub: Subs,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Subs {
    pub website: String,
}

impl_record!(Customer {
    name => "Name",
    id => "Id",
    budget => "Budget",
    join => "Join",
    sub => "Sub",
});

impl_record!(SubCustomer {
    name => "Name",
    id => "Id",
    sub => "Sub",
});

impl_record!(Subs { website => "Website" });

/// Mapping of [`SAMPLE_CSV`] onto [`Customer`].
pub fn example_mapping() -> MappingNode {
    MappingNode::branch(
        "Customer",
        vec![
            MappingNode::leaf("Name", 1),
            MappingNode::leaf("Id", 2),
            MappingNode::leaf("Budget", 5),
            MappingNode::leaf_with("Join", 0, ParseOptions::timestamp("%Y-%m-%d")),
            MappingNode::branch(
                "Sub",
                vec![
                    MappingNode::leaf("Name", 3),
                    MappingNode::leaf("Id", 2),
                    MappingNode::branch("Sub", vec![MappingNode::leaf("Website", 4)]),
                ],
            ),
        ],
    )
}
