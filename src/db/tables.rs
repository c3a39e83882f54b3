/// Fixed shape of one table: its name and ordered column list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

impl TableSchema {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }

    /// File name of the table's backing CSV
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name)
    }
}

pub const USERS: &str = "users";
pub const PORTFOLIOS: &str = "portfolios";
pub const HOLDINGS: &str = "holdings";
pub const RISK_SCENARIOS: &str = "risk_scenarios";
pub const RISK_RESULTS: &str = "risk_results";
pub const ORDERS: &str = "orders";
pub const ACCOUNTS: &str = "accounts";
pub const TRANSACTIONS: &str = "transactions";
pub const FUNDS: &str = "funds";
pub const COMMITMENTS: &str = "commitments";
pub const SAVED_REPORTS: &str = "saved_reports";
pub const PORTFOLIO_ESG: &str = "portfolio_esg";
pub const MODEL_PORTFOLIOS: &str = "model_portfolios";
pub const CLIENT_ACCOUNTS: &str = "client_accounts";
pub const INTEGRATIONS: &str = "integrations";
pub const USER_PREFERENCES: &str = "user_preferences";
pub const DESIGN_PRINCIPLES_PREFERENCES: &str = "design_principles_preferences";

/// Every registered table. Column order is the on-disk order.
pub static TABLES: &[TableSchema] = &[
    TableSchema {
        name: USERS,
        columns: &["id", "username", "password_hash", "display_name"],
    },
    TableSchema {
        name: PORTFOLIOS,
        columns: &["id", "user_id", "name", "currency", "created_at"],
    },
    TableSchema {
        name: HOLDINGS,
        columns: &[
            "id",
            "portfolio_id",
            "user_id",
            "symbol",
            "asset_class",
            "quantity",
            "avg_cost",
        ],
    },
    TableSchema {
        name: RISK_SCENARIOS,
        columns: &["id", "user_id", "name", "scenario_type", "params_json"],
    },
    TableSchema {
        name: RISK_RESULTS,
        columns: &["id", "user_id", "scenario_id", "portfolio_id", "metric", "value"],
    },
    TableSchema {
        name: ORDERS,
        columns: &[
            "id",
            "user_id",
            "portfolio_id",
            "symbol",
            "side",
            "quantity",
            "order_type",
            "status",
            "created_at",
        ],
    },
    TableSchema {
        name: ACCOUNTS,
        columns: &["id", "user_id", "name", "account_type", "currency"],
    },
    TableSchema {
        name: TRANSACTIONS,
        columns: &[
            "id",
            "user_id",
            "account_id",
            "type",
            "amount",
            "date",
            "description",
        ],
    },
    TableSchema {
        name: FUNDS,
        columns: &["id", "user_id", "name", "strategy", "vintage_year"],
    },
    TableSchema {
        name: COMMITMENTS,
        columns: &["id", "user_id", "fund_id", "amount", "currency", "date"],
    },
    TableSchema {
        name: SAVED_REPORTS,
        columns: &["id", "user_id", "name", "report_type", "config_json", "created_at"],
    },
    TableSchema {
        name: PORTFOLIO_ESG,
        columns: &["id", "user_id", "portfolio_id", "score_type", "value", "as_of_date"],
    },
    TableSchema {
        name: MODEL_PORTFOLIOS,
        columns: &["id", "user_id", "name", "allocation_json"],
    },
    TableSchema {
        name: CLIENT_ACCOUNTS,
        columns: &["id", "user_id", "model_id", "name"],
    },
    TableSchema {
        name: INTEGRATIONS,
        columns: &[
            "id",
            "user_id",
            "provider",
            "integration_type",
            "status",
            "config_json",
        ],
    },
    TableSchema {
        name: USER_PREFERENCES,
        columns: &["user_id", "key", "value"],
    },
    TableSchema {
        name: DESIGN_PRINCIPLES_PREFERENCES,
        columns: &["user_id", "key", "value"],
    },
];

/// Tables carrying a `user_id` column, children before their parents
pub const OWNED_TABLES: &[&str] = &[
    HOLDINGS,
    PORTFOLIOS,
    RISK_RESULTS,
    RISK_SCENARIOS,
    ORDERS,
    TRANSACTIONS,
    ACCOUNTS,
    COMMITMENTS,
    FUNDS,
    SAVED_REPORTS,
    PORTFOLIO_ESG,
    CLIENT_ACCOUNTS,
    MODEL_PORTFOLIOS,
    INTEGRATIONS,
    USER_PREFERENCES,
    DESIGN_PRINCIPLES_PREFERENCES,
];

/// Look up a registered table by name
pub fn schema(name: &str) -> Option<&'static TableSchema> {
    TABLES.iter().find(|table| table.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_names_unique() {
        let names: HashSet<&str> = TABLES.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), TABLES.len());
    }

    #[test]
    fn test_columns_unique_per_table() {
        for table in TABLES {
            let columns: HashSet<&str> = table.columns.iter().copied().collect();
            assert_eq!(columns.len(), table.columns.len(), "{}", table.name);
        }
    }

    #[test]
    fn test_owned_tables_have_user_id() {
        for name in OWNED_TABLES {
            let table = schema(name).unwrap();
            assert!(table.has_column("user_id"), "{name}");
        }

        let owned: HashSet<&str> = OWNED_TABLES.iter().copied().collect();
        for table in TABLES {
            if table.has_column("user_id") {
                assert!(owned.contains(table.name), "{} missing from OWNED_TABLES", table.name);
            }
        }
    }

    #[test]
    fn test_schema_lookup() {
        assert_eq!(schema("portfolios").unwrap().columns[0], "id");
        assert!(schema("nope").is_none());
        assert_eq!(schema(USERS).unwrap().file_name(), "users.csv");
    }
}
