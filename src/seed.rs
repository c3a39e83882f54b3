//! Demo account and sample data.

use crate::constants::{DEMO_DISPLAY_NAME, DEMO_PASSWORD, DEMO_USERNAME, NEW_ORDER_STATUS};
use crate::db::{generate_id, tables, Row, Store};
use crate::error::Result;
use crate::models::User;
use crate::routes::owned::now_rfc3339;
use crate::security::hash_password;

fn demo_user_row(cost: u32) -> Result<Row> {
    let password_hash = hash_password(DEMO_PASSWORD, cost)?;
    Ok(User::new_row(
        &generate_id(),
        DEMO_USERNAME,
        &password_hash,
        DEMO_DISPLAY_NAME,
    ))
}

/// Create the demo user when the users table is empty.
///
/// Returns true if a user was created.
pub fn ensure_default_user(store: &Store, cost: u32) -> Result<bool> {
    if !store.read_table(tables::USERS)?.is_empty() {
        return Ok(false);
    }

    store.append_row(tables::USERS, demo_user_row(cost)?)?;
    tracing::info!("Created default user '{}'", DEMO_USERNAME);
    Ok(true)
}

/// Id of the demo user, creating it if missing
pub fn ensure_demo_user(store: &Store, cost: u32) -> Result<String> {
    let users = store.read_table(tables::USERS)?;
    if let Some(demo) = users.iter().find(|u| u.value("username") == DEMO_USERNAME) {
        return Ok(demo.value("id").to_string());
    }

    let row = store.append_row(tables::USERS, demo_user_row(cost)?)?;
    Ok(row.value("id").to_string())
}

/// Remove every row owned by `user_id` from the owner-scoped tables
pub fn clear_user_data(store: &Store, user_id: &str) -> Result<usize> {
    let mut removed = 0;
    for table in tables::OWNED_TABLES {
        removed += store.delete_where(table, |row| row.value("user_id") == user_id)?;
    }
    Ok(removed)
}

/// Append rows built from `(column, value)` pairs and return their ids
fn insert_all<const N: usize>(
    store: &Store,
    table: &str,
    user_id: &str,
    rows: &[[(&str, &str); N]],
) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(rows.len());
    for fields in rows {
        let mut row = Row::new().with("user_id", user_id);
        for (column, value) in fields {
            row.set(*column, *value);
        }
        let stored = store.append_row(table, row)?;
        ids.push(stored.value("id").to_string());
    }
    Ok(ids)
}

/// Reset the demo user's data to a believable sample across every feature.
///
/// Returns the demo user's id.
pub fn seed_demo_data(store: &Store, cost: u32) -> Result<String> {
    let user_id = ensure_demo_user(store, cost)?;
    let removed = clear_user_data(store, &user_id)?;
    tracing::info!("Cleared {} existing demo rows", removed);

    let now = now_rfc3339();
    let uid = user_id.as_str();

    let portfolios = insert_all(
        store,
        tables::PORTFOLIOS,
        uid,
        &[
            [("name", "US Growth"), ("currency", "USD"), ("created_at", now.as_str())],
            [("name", "Global Balanced"), ("currency", "USD"), ("created_at", now.as_str())],
            [("name", "Retirement Income"), ("currency", "USD"), ("created_at", now.as_str())],
        ],
    )?;
    let (growth, balanced, income) = (&portfolios[0], &portfolios[1], &portfolios[2]);

    let holdings: Vec<[(&str, &str); 5]> = [
        (growth, "VTI", "equity", "150", "245.50"),
        (growth, "VEA", "equity", "200", "48.20"),
        (growth, "QQQ", "equity", "25", "412.00"),
        (growth, "VWO", "equity", "80", "44.10"),
        (balanced, "VTI", "equity", "100", "245.50"),
        (balanced, "BND", "fixed_income", "120", "72.30"),
        (balanced, "VEA", "equity", "75", "48.20"),
        (balanced, "IUSB", "fixed_income", "50", "52.40"),
        (income, "BND", "fixed_income", "200", "72.30"),
        (income, "VTI", "equity", "40", "245.50"),
        (income, "SCHD", "equity", "60", "82.15"),
    ]
    .iter()
    .map(|&(pid, symbol, asset_class, quantity, avg_cost)| {
        [
            ("portfolio_id", pid.as_str()),
            ("symbol", symbol),
            ("asset_class", asset_class),
            ("quantity", quantity),
            ("avg_cost", avg_cost),
        ]
    })
    .collect();
    insert_all(store, tables::HOLDINGS, uid, &holdings)?;

    let scenarios = insert_all(
        store,
        tables::RISK_SCENARIOS,
        uid,
        &[
            [
                ("name", "Fed Rate Shock"),
                ("scenario_type", "stress"),
                ("params_json", r#"{"rate_change_bps": 100}"#),
            ],
            [
                ("name", "Global Market Correction"),
                ("scenario_type", "historical"),
                ("params_json", r#"{"drawdown_pct": 20}"#),
            ],
            [
                ("name", "Severely Adverse"),
                ("scenario_type", "stress"),
                ("params_json", r#"{"recession": true}"#),
            ],
        ],
    )?;
    let results = [
        (&scenarios[0], growth, "VaR_95_1d", "-1.2%"),
        (&scenarios[0], growth, "Expected_Shortfall_95", "-1.8%"),
        (&scenarios[0], balanced, "VaR_95_1d", "-1.5%"),
        (&scenarios[0], balanced, "Expected_Shortfall_95", "-2.2%"),
        (&scenarios[1], growth, "Max_drawdown", "-18.5%"),
    ]
    .iter()
    .map(|&(sid, pid, metric, value)| {
        [
            ("scenario_id", sid.as_str()),
            ("portfolio_id", pid.as_str()),
            ("metric", metric),
            ("value", value),
        ]
    })
    .collect::<Vec<_>>();
    insert_all(store, tables::RISK_RESULTS, uid, &results)?;

    let orders = [
        (growth, "VTI", "BUY", "10", "FILLED"),
        (growth, "VEA", "BUY", "25", "FILLED"),
        (balanced, "BND", "BUY", "50", NEW_ORDER_STATUS),
        (income, "SCHD", "SELL", "20", "CANCELLED"),
    ]
    .iter()
    .map(|&(pid, symbol, side, quantity, status)| {
        [
            ("portfolio_id", pid.as_str()),
            ("symbol", symbol),
            ("side", side),
            ("quantity", quantity),
            ("order_type", "MARKET"),
            ("status", status),
            ("created_at", now.as_str()),
        ]
    })
    .collect::<Vec<_>>();
    insert_all(store, tables::ORDERS, uid, &orders)?;

    let accounts = insert_all(
        store,
        tables::ACCOUNTS,
        uid,
        &[
            [("name", "Main Brokerage"), ("account_type", "brokerage"), ("currency", "USD")],
            [("name", "IRA Traditional"), ("account_type", "ira"), ("currency", "USD")],
            [("name", "Sweep Cash"), ("account_type", "cash"), ("currency", "USD")],
        ],
    )?;
    let transactions = [
        (&accounts[0], "buy", "12500.00", "2025-01-15", "VTI purchase"),
        (&accounts[0], "dividend", "342.50", "2025-02-01", "Quarterly dividend"),
        (&accounts[0], "sell", "-2100.00", "2025-02-10", "VEA partial sale"),
        (&accounts[1], "contribution", "7000.00", "2025-01-05", "IRA contribution"),
        (&accounts[1], "buy", "6800.00", "2025-01-06", "BND purchase"),
        (&accounts[2], "fee", "-25.00", "2025-02-01", "Account fee"),
    ]
    .iter()
    .map(|&(aid, kind, amount, date, description)| {
        [
            ("account_id", aid.as_str()),
            ("type", kind),
            ("amount", amount),
            ("date", date),
            ("description", description),
        ]
    })
    .collect::<Vec<_>>();
    insert_all(store, tables::TRANSACTIONS, uid, &transactions)?;

    let funds = insert_all(
        store,
        tables::FUNDS,
        uid,
        &[
            [
                ("name", "Blackstone Tactical Opportunities Fund IV"),
                ("strategy", "tactical_opportunities"),
                ("vintage_year", "2021"),
            ],
            [
                ("name", "KKR Americas Fund XIII"),
                ("strategy", "buyout"),
                ("vintage_year", "2022"),
            ],
            [
                ("name", "Carlyle Infrastructure Partners V"),
                ("strategy", "infrastructure"),
                ("vintage_year", "2023"),
            ],
        ],
    )?;
    let commitments = [
        (&funds[0], "5000000", "2021-06-15"),
        (&funds[0], "2500000", "2022-03-01"),
        (&funds[1], "10000000", "2022-09-01"),
        (&funds[2], "7500000", "2023-01-15"),
    ]
    .iter()
    .map(|&(fid, amount, date)| {
        [
            ("fund_id", fid.as_str()),
            ("amount", amount),
            ("currency", "USD"),
            ("date", date),
        ]
    })
    .collect::<Vec<_>>();
    insert_all(store, tables::COMMITMENTS, uid, &commitments)?;

    insert_all(
        store,
        tables::SAVED_REPORTS,
        uid,
        &[
            [
                ("name", "Monthly Performance Summary"),
                ("report_type", "performance"),
                ("config_json", r#"{"period": "1M"}"#),
                ("created_at", now.as_str()),
            ],
            [
                ("name", "Sector Attribution"),
                ("report_type", "attribution"),
                ("config_json", r#"{"benchmark": "SP500"}"#),
                ("created_at", now.as_str()),
            ],
            [
                ("name", "Holdings Export"),
                ("report_type", "holdings"),
                ("config_json", r#"{"format": "csv"}"#),
                ("created_at", now.as_str()),
            ],
        ],
    )?;

    let esg = portfolios
        .iter()
        .flat_map(|pid| {
            [("ESG", "7.2"), ("Carbon", "125")].map(|(score_type, value)| {
                [
                    ("portfolio_id", pid.as_str()),
                    ("score_type", score_type),
                    ("value", value),
                    ("as_of_date", "2025-02-01"),
                ]
            })
        })
        .collect::<Vec<_>>();
    insert_all(store, tables::PORTFOLIO_ESG, uid, &esg)?;

    let models = insert_all(
        store,
        tables::MODEL_PORTFOLIOS,
        uid,
        &[
            [
                ("name", "Moderate Growth 60/40"),
                ("allocation_json", r#"{"equity": 60, "fixed_income": 40}"#),
            ],
            [
                ("name", "Conservative Income"),
                ("allocation_json", r#"{"equity": 30, "fixed_income": 70}"#),
            ],
            [
                ("name", "Aggressive Growth"),
                ("allocation_json", r#"{"equity": 90, "fixed_income": 10}"#),
            ],
        ],
    )?;
    let client_accounts = [
        (&models[0], "Smith Family Trust"),
        (&models[0], "Jones Retirement"),
        (&models[1], "Williams Income Account"),
        (&models[2], "Davis Growth LLC"),
    ]
    .iter()
    .map(|&(mid, name)| [("model_id", mid.as_str()), ("name", name)])
    .collect::<Vec<_>>();
    insert_all(store, tables::CLIENT_ACCOUNTS, uid, &client_accounts)?;

    let integrations = [
        ("State Street", "custodian"),
        ("BNY Mellon", "custodian"),
        ("Goldman Sachs Prime", "broker"),
        ("Bloomberg", "data"),
    ]
    .map(|(provider, kind)| {
        [
            ("provider", provider),
            ("integration_type", kind),
            ("status", "active"),
            ("config_json", "{}"),
        ]
    });
    insert_all(store, tables::INTEGRATIONS, uid, &integrations)?;

    let preferences = [
        ("theme", "dark"),
        ("default_currency", "USD"),
        ("reporting_frequency", "monthly"),
        ("dashboard_layout", "sidebar"),
    ]
    .map(|(key, value)| [("key", key), ("value", value)]);
    insert_all(store, tables::USER_PREFERENCES, uid, &preferences)?;
    insert_all(store, tables::DESIGN_PRINCIPLES_PREFERENCES, uid, &preferences)?;

    tracing::info!("Seeded demo data for user {}", user_id);
    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_store;
    use tempfile::TempDir;

    #[test]
    fn test_default_user_only_on_empty_table() {
        let dir = TempDir::new().unwrap();
        let store = open_store(dir.path()).unwrap();

        assert!(ensure_default_user(&store, 4).unwrap());
        assert!(!ensure_default_user(&store, 4).unwrap());
        assert_eq!(store.read_table(tables::USERS).unwrap().len(), 1);
    }

    #[test]
    fn test_seed_is_repeatable() {
        let dir = TempDir::new().unwrap();
        let store = open_store(dir.path()).unwrap();

        let first = seed_demo_data(&store, 4).unwrap();
        let second = seed_demo_data(&store, 4).unwrap();
        assert_eq!(first, second);

        assert_eq!(store.get_by_owner(tables::PORTFOLIOS, &first).unwrap().len(), 3);
        assert_eq!(store.get_by_owner(tables::HOLDINGS, &first).unwrap().len(), 11);
        assert_eq!(store.get_by_owner(tables::PORTFOLIO_ESG, &first).unwrap().len(), 6);
        assert_eq!(store.get_by_owner(tables::INTEGRATIONS, &first).unwrap().len(), 4);
        assert_eq!(store.read_table(tables::USERS).unwrap().len(), 1);
    }

    #[test]
    fn test_clear_user_data_keeps_other_users() {
        let dir = TempDir::new().unwrap();
        let store = open_store(dir.path()).unwrap();
        let demo = seed_demo_data(&store, 4).unwrap();
        store
            .append_row(
                tables::PORTFOLIOS,
                Row::new().with("user_id", "someone-else").with("name", "Other"),
            )
            .unwrap();

        assert!(clear_user_data(&store, &demo).unwrap() > 0);
        assert!(store.get_by_owner(tables::PORTFOLIOS, &demo).unwrap().is_empty());
        assert_eq!(
            store.get_by_owner(tables::PORTFOLIOS, "someone-else").unwrap().len(),
            1
        );
    }
}
