//! Opening and checking the connection pool.

use sqlx_core::pool::PoolOptions;
use sqlx_postgres::{PgPool, Postgres};
use tracing::{debug, info, instrument};

use crate::config::{PoolSettings, PostgresConfig};
use crate::error::{PostgresError, Result};

/// Translates [`PoolSettings`] into sqlx pool options.
pub fn pool_options(settings: &PoolSettings) -> Result<PoolOptions<Postgres>> {
    if settings.max_connections == 0 {
        return Err(PostgresError::config("max_connections must be > 0"));
    }

    Ok(PoolOptions::<Postgres>::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.effective_min_connections())
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(settings.idle_timeout)
        .max_lifetime(settings.max_lifetime)
        .test_before_acquire(false))
}

/// Connects a pool to the configured database.
#[instrument(skip(config), fields(url = %redact_url(&config.url)))]
pub async fn create_pool(config: &PostgresConfig) -> Result<PgPool> {
    let options = pool_options(&config.pool)?;
    info!(
        max_connections = options.get_max_connections(),
        min_connections = options.get_min_connections(),
        "Connecting to the jobs database"
    );

    let pool = options.connect(&config.url).await?;
    debug!("Connection pool ready");
    Ok(pool)
}

/// Round-trips `SELECT 1` through the pool.
#[instrument(skip(pool))]
pub async fn test_connection(pool: &PgPool) -> Result<()> {
    sqlx_core::query::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Hides the password of a connection URL.
fn redact_url(url: &str) -> String {
    let Some((credentials, rest)) = url.split_once('@') else {
        return url.to_string();
    };
    let (scheme, userinfo) = credentials.split_once("://").unwrap_or(("", credentials));
    match userinfo.split_once(':') {
        Some((user, _)) if scheme.is_empty() => format!("{user}:****@{rest}"),
        Some((user, _)) => format!("{scheme}://{user}:****@{rest}"),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn redacts_only_the_password() {
        assert_eq!(
            redact_url("postgres://jobly:secret@db:5432/jobly"),
            "postgres://jobly:****@db:5432/jobly"
        );
        assert_eq!(redact_url("postgres://db/jobly"), "postgres://db/jobly");
        assert_eq!(redact_url("postgres://jobly@db/jobly"), "postgres://jobly@db/jobly");
    }

    #[test]
    fn options_follow_settings() {
        let settings = PoolSettings {
            max_connections: 8,
            min_connections: Some(3),
            acquire_timeout: Duration::from_millis(250),
            idle_timeout: None,
            max_lifetime: Some(Duration::from_secs(60)),
        };
        let options = pool_options(&settings).unwrap();
        assert_eq!(options.get_max_connections(), 8);
        assert_eq!(options.get_min_connections(), 3);
        assert_eq!(options.get_acquire_timeout(), Duration::from_millis(250));
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn zero_max_connections_is_rejected() {
        let settings = PoolSettings {
            max_connections: 0,
            ..Default::default()
        };
        let Err(err) = pool_options(&settings) else {
            panic!("expected config error");
        };
        assert!(matches!(err, PostgresError::Config { .. }));
    }
}
