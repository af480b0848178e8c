#![forbid(unsafe_code)]

pub mod ids;

pub mod model {
    use crate::ids::TableId;
    use serde::{Deserialize, Serialize};

    /// One catalog row: a live dynamic table and its display title.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TableEntry {
        pub identifier: TableId,
        pub title: String,
    }

    /// One row of a dynamic table. `id` is assigned by the store.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Record {
        pub id: i64,
        pub name: String,
        pub flag: bool,
        pub note: Option<String>,
    }

    /// The mutable fields of a [`Record`], as submitted for insert or full
    /// replacement.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RecordDraft {
        pub name: String,
        pub flag: bool,
        #[serde(default)]
        pub note: Option<String>,
    }

    impl RecordDraft {
        pub fn new(name: impl Into<String>, flag: bool, note: Option<String>) -> Self {
            Self {
                name: name.into(),
                flag,
                note,
            }
        }
    }
}
