pub mod auth;
pub mod data_analytics;
pub mod design_principles;
pub mod ecosystem;
pub mod esg_climate;
pub mod extract;
pub mod health;
pub mod operations;
pub mod owned;
pub mod portfolios;
pub mod private_markets;
pub mod risk;
pub mod trading;
pub mod wealth;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub use health::health_check;

use crate::AppState;

/// Build the application router: `/health` plus the versioned API
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/portfolios", portfolio_routes())
        .nest("/risk", risk_routes())
        .nest("/trading", trading_routes())
        .nest("/operations", operations_routes())
        .nest("/private-markets", private_markets_routes())
        .nest("/data-analytics", data_analytics_routes())
        .nest("/esg-climate", esg_climate_routes())
        .nest("/wealth", wealth_routes())
        .nest("/ecosystem", ecosystem_routes())
        .nest("/design-principles", design_principles_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
}

fn portfolio_routes() -> Router<AppState> {
    use portfolios::*;

    Router::new()
        .route("/", get(list_portfolios).post(create_portfolio))
        .route(
            "/:portfolio_id",
            get(get_portfolio).put(update_portfolio).delete(delete_portfolio),
        )
        .route(
            "/:portfolio_id/holdings",
            get(list_holdings).post(create_holding),
        )
        .route(
            "/:portfolio_id/holdings/:holding_id",
            put(update_holding).delete(delete_holding),
        )
}

fn risk_routes() -> Router<AppState> {
    use risk::*;

    Router::new()
        .route("/scenarios", get(list_scenarios).post(create_scenario))
        .route(
            "/scenarios/:scenario_id",
            get(get_scenario).put(update_scenario).delete(delete_scenario),
        )
        .route("/scenarios/:scenario_id/results", get(list_results))
        .route("/results", post(create_result))
        .route("/results/:result_id", delete(delete_result))
}

fn trading_routes() -> Router<AppState> {
    use trading::*;

    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/:order_id",
            get(get_order).put(update_order).delete(delete_order),
        )
}

fn operations_routes() -> Router<AppState> {
    use operations::*;

    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/:account_id",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route("/accounts/:account_id/transactions", get(list_transactions))
        .route("/transactions", post(create_transaction))
        .route(
            "/transactions/:transaction_id",
            put(update_transaction).delete(delete_transaction),
        )
}

fn private_markets_routes() -> Router<AppState> {
    use private_markets::*;

    Router::new()
        .route("/funds", get(list_funds).post(create_fund))
        .route(
            "/funds/:fund_id",
            get(get_fund).put(update_fund).delete(delete_fund),
        )
        .route("/funds/:fund_id/commitments", get(list_commitments))
        .route("/commitments", post(create_commitment))
        .route(
            "/commitments/:commitment_id",
            put(update_commitment).delete(delete_commitment),
        )
}

fn data_analytics_routes() -> Router<AppState> {
    use data_analytics::*;

    Router::new()
        .route("/reports", get(list_reports).post(create_report))
        .route(
            "/reports/:report_id",
            get(get_report).put(update_report).delete(delete_report),
        )
}

fn esg_climate_routes() -> Router<AppState> {
    use esg_climate::*;

    Router::new()
        .route("/", get(list_esg).post(create_esg))
        .route("/:esg_id", get(get_esg).put(update_esg).delete(delete_esg))
}

fn wealth_routes() -> Router<AppState> {
    use wealth::*;

    Router::new()
        .route("/models", get(list_models).post(create_model))
        .route(
            "/models/:model_id",
            get(get_model).put(update_model).delete(delete_model),
        )
        .route(
            "/client-accounts",
            get(list_client_accounts).post(create_client_account),
        )
        .route(
            "/client-accounts/:account_id",
            get(get_client_account)
                .put(update_client_account)
                .delete(delete_client_account),
        )
}

fn ecosystem_routes() -> Router<AppState> {
    use ecosystem::*;

    Router::new()
        .route("/integrations", get(list_integrations).post(create_integration))
        .route(
            "/integrations/:integration_id",
            get(get_integration)
                .put(update_integration)
                .delete(delete_integration),
        )
}

fn design_principles_routes() -> Router<AppState> {
    use design_principles::*;

    Router::new()
        .route("/preferences", get(get_preferences).put(set_preference))
        .route("/preferences/:key", delete(delete_preference))
}
