/// Default directory holding the table CSV files
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Signing key used when SECRET_KEY is unset. Development only.
pub const DEFAULT_SECRET_KEY: &str = "change-me-in-production";

/// Access token lifetime (one week)
pub const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 60 * 24 * 7;

/// Frontend dev server origins
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

/// Credentials of the user created on an empty users table
pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo";
pub const DEMO_DISPLAY_NAME: &str = "Demo User";

// =============================================================================
// Field defaults
// =============================================================================

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_SCENARIO_TYPE: &str = "stress";
pub const DEFAULT_ORDER_TYPE: &str = "MARKET";
pub const NEW_ORDER_STATUS: &str = "NEW";
pub const DEFAULT_ACCOUNT_TYPE: &str = "general";
pub const DEFAULT_REPORT_TYPE: &str = "custom";
pub const DEFAULT_INTEGRATION_TYPE: &str = "custodian";
pub const DEFAULT_INTEGRATION_STATUS: &str = "active";
pub const EMPTY_JSON_OBJECT: &str = "{}";

// =============================================================================
// Error Messages
// =============================================================================

pub const ERR_NOT_AUTHENTICATED: &str = "Not authenticated";
pub const ERR_INVALID_TOKEN: &str = "Invalid or expired token";
pub const ERR_BAD_CREDENTIALS: &str = "Incorrect username or password";
pub const ERR_USERNAME_TAKEN: &str = "Username already taken";
pub const ERR_USERNAME_REQUIRED: &str = "Username must not be empty";
pub const ERR_PASSWORD_REQUIRED: &str = "Password must not be empty";

pub const ERR_PORTFOLIO_NOT_FOUND: &str = "Portfolio not found";
pub const ERR_HOLDING_NOT_FOUND: &str = "Holding not found";
pub const ERR_SCENARIO_NOT_FOUND: &str = "Scenario not found";
pub const ERR_RESULT_NOT_FOUND: &str = "Result not found";
pub const ERR_ORDER_NOT_FOUND: &str = "Order not found";
pub const ERR_ACCOUNT_NOT_FOUND: &str = "Account not found";
pub const ERR_TRANSACTION_NOT_FOUND: &str = "Transaction not found";
pub const ERR_FUND_NOT_FOUND: &str = "Fund not found";
pub const ERR_COMMITMENT_NOT_FOUND: &str = "Commitment not found";
pub const ERR_REPORT_NOT_FOUND: &str = "Report not found";
pub const ERR_ESG_NOT_FOUND: &str = "ESG record not found";
pub const ERR_MODEL_NOT_FOUND: &str = "Model portfolio not found";
pub const ERR_CLIENT_ACCOUNT_NOT_FOUND: &str = "Client account not found";
pub const ERR_INTEGRATION_NOT_FOUND: &str = "Integration not found";
