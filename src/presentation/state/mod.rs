mod app_state;

pub use app_state::{AppDependencies, AppPolicies, AppState};
