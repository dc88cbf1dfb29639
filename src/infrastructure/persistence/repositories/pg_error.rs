use crate::application::ports::RepositoryError;

/// Maps sqlx failures, surfacing unique violations as `Duplicate`.
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            let field = match db.constraint() {
                Some(c) if c.contains("email") => "email",
                Some(c) if c.contains("username") => "username",
                Some(_) | None => "unknown",
            };
            return RepositoryError::Duplicate {
                field: field.to_string(),
            };
        }
        if db.is_foreign_key_violation() || db.is_check_violation() {
            return RepositoryError::ConstraintViolation(db.message().to_string());
        }
    }
    RepositoryError::QueryFailed(e.to_string())
}

/// Escapes `%`, `_` and `\` for use inside an `ILIKE` pattern.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
