use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager, ManagerConfig},
    AsyncPgConnection,
};

pub type DbPool = Pool<AsyncPgConnection>;

async fn establish_tls_connection(url: String) -> diesel::ConnectionResult<AsyncPgConnection> {
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

    let (client, connection) = tokio_postgres::connect(&url, tls)
        .await
        .map_err(|e| diesel::ConnectionError::BadConnection(e.to_string()))?;

    // The connection object drives the socket; it must be polled for the
    // client to make progress.
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Postgres connection error: {}", e);
        }
    });

    AsyncPgConnection::try_from(client).await
}

/// Build the deadpool-backed connection pool. With `tls` set every pooled
/// connection goes through rustls; otherwise the plain diesel-async setup.
pub fn establish_connection_pool(database_url: &str, tls: bool) -> anyhow::Result<DbPool> {
    let config = if tls {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup =
            Box::new(|url| Box::pin(establish_tls_connection(url.to_string())));
        AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
            database_url,
            manager_config,
        )
    } else {
        AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url)
    };

    let pool = Pool::builder(config).build()?;
    tracing::info!(tls, "Postgres connection pool ready");
    Ok(pool)
}
