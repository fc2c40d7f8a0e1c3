use campus_core::TokenSigner;
use campus_db::Database;

/// Shared application state, available to all route handlers via
/// `State<Arc<AppState>>`. The token signer carries the signing secret
/// injected at startup.
pub struct AppState {
    pub db: Database,
    pub tokens: TokenSigner,
}
