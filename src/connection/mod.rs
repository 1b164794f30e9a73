//! Connectivity probe and server browsing.
//!
//! The probe is a one-shot round trip used to validate a profile: open a
//! connection from the profile's fields, `ping`, read the server version
//! from `buildInfo`, close. It never mutates the profile; the caller
//! decides whether to persist the reported version.
//!
//! Browsing (database and collection listings) goes through the same
//! driver client and honors the profile's database allow-list and
//! collection ignore set.

use std::time::{Duration, Instant};

use bson::doc;
use mongodb::options::{ClientOptions, Credential, ServerAddress};
use mongodb::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ProbeConfig;
use crate::error::{connection_failure, ConnectionError, Result};
use crate::profile::ConnectionProfile;

/// Outcome of one successful probe.
///
/// Transient: created per attempt, discarded after display. Failures
/// travel on the error channel, so this value always means "reachable".
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// Version string reported by `buildInfo`, when the server allowed
    /// the command.
    pub server_version: Option<String>,

    /// Wall-clock duration of the handshake round trip.
    pub round_trip: Duration,
}

/// One-shot connectivity checker for profiles.
pub struct ConnectivityProbe {
    config: ProbeConfig,
}

impl ConnectivityProbe {
    /// Create a probe with the given timeout configuration.
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// Check that the profile's server is reachable and authenticates.
    ///
    /// Returns within the configured timeout for unreachable hosts; all
    /// driver failures are normalized into a single
    /// [`ConnectionError::ConnectionFailed`] carrying a readable message.
    pub async fn probe(&self, profile: &ConnectionProfile) -> Result<ProbeResult> {
        let host = profile.require_host()?;
        info!(host = %host, port = %profile.resolved_port(), "probing server");

        let started = Instant::now();
        let client = self.open_client(profile)?;

        // Backstop over the driver's own selection timeout so a probe can
        // never hang past the configured bound.
        let outcome = tokio::time::timeout(
            self.timeout() + Duration::from_secs(1),
            self.handshake(&client),
        )
        .await;

        client.shutdown().await;

        let server_version = match outcome {
            Ok(result) => result?,
            Err(_) => return Err(ConnectionError::Timeout.into()),
        };

        let round_trip = started.elapsed();
        info!(
            version = server_version.as_deref().unwrap_or("unknown"),
            elapsed_ms = round_trip.as_millis() as u64,
            "probe succeeded"
        );

        Ok(ProbeResult {
            server_version,
            round_trip,
        })
    }

    /// Like [`probe`](Self::probe), but abandons the attempt when the
    /// token fires.
    ///
    /// Cancellation drops the in-flight network call together with its
    /// client; the caller gets [`ConnectionError::Cancelled`].
    pub async fn probe_cancellable(
        &self,
        profile: &ConnectionProfile,
        cancel: CancellationToken,
    ) -> Result<ProbeResult> {
        tokio::select! {
            result = self.probe(profile) => result,
            _ = cancel.cancelled() => Err(ConnectionError::Cancelled.into()),
        }
    }

    /// List database names visible through the profile.
    ///
    /// A non-empty allow-list restricts the result to the listed names.
    pub async fn list_databases(&self, profile: &ConnectionProfile) -> Result<Vec<String>> {
        profile.require_host()?;
        let client = self.open_client(profile)?;

        let outcome = client.list_database_names().await;
        client.shutdown().await;

        let mut names: Vec<String> = outcome
            .map_err(|e| connection_failure(&e))?
            .into_iter()
            .filter(|name| profile.allows_database(name))
            .collect();
        names.sort();

        info!(count = names.len(), "listed databases");
        Ok(names)
    }

    /// List collection names in one database, excluding the profile's
    /// ignore set.
    pub async fn list_collections(
        &self,
        profile: &ConnectionProfile,
        database: &str,
    ) -> Result<Vec<String>> {
        profile.require_host()?;
        if !profile.allows_database(database) {
            return Err(crate::error::ConfigError::DatabaseNotAllowed {
                profile: profile.name.clone(),
                database: database.to_string(),
            }
            .into());
        }

        let client = self.open_client(profile)?;
        let outcome = client.database(database).list_collection_names().await;
        client.shutdown().await;

        let mut names: Vec<String> = outcome
            .map_err(|e| connection_failure(&e))?
            .into_iter()
            .filter(|name| !profile.collections_to_ignore.contains(name))
            .collect();
        names.sort();

        info!(database = %database, count = names.len(), "listed collections");
        Ok(names)
    }

    /// Build a driver client directly from profile fields.
    ///
    /// No URI string assembly: host, port, and credentials map straight
    /// onto `ClientOptions`, so values never need escaping.
    fn open_client(&self, profile: &ConnectionProfile) -> Result<Client> {
        let host = profile.require_host()?;

        let mut options = ClientOptions::default();
        options.hosts = vec![ServerAddress::Tcp {
            host: host.to_string(),
            port: Some(profile.resolved_port()),
        }];
        options.app_name = Some("mongorun".to_string());
        options.server_selection_timeout = Some(self.timeout());
        options.connect_timeout = Some(self.timeout());
        options.credential = profile.username.as_ref().map(|username| {
            let mut credential = Credential::default();
            credential.username = Some(username.clone());
            credential.password = profile.password.clone();
            credential
        });

        debug!(host = %host, "driver client configured");
        Client::with_options(options).map_err(|e| connection_failure(&e).into())
    }

    /// `ping` against admin, then best-effort `buildInfo` for the version.
    async fn handshake(&self, client: &Client) -> Result<Option<String>> {
        let admin = client.database("admin");

        admin
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| connection_failure(&e))?;

        // A server that restricts buildInfo is still a reachable server.
        match admin.run_command(doc! { "buildInfo": 1 }).await {
            Ok(reply) => Ok(reply.get_str("version").ok().map(str::to_string)),
            Err(e) => {
                debug!(error = %e, "buildInfo unavailable, version unknown");
                Ok(None)
            }
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MongorunError;

    fn probe_with_timeout(secs: u64) -> ConnectivityProbe {
        ConnectivityProbe::new(ProbeConfig { timeout: secs })
    }

    fn unreachable_profile() -> ConnectionProfile {
        let mut profile = ConnectionProfile::new("unreachable");
        // TEST-NET-1 address, guaranteed not to answer.
        profile.host = Some("192.0.2.1".to_string());
        profile.port = Some(27017);
        profile
    }

    #[test]
    fn test_probe_requires_host() {
        let probe = probe_with_timeout(1);
        let profile = ConnectionProfile::new("no-host");
        let err = tokio_test::block_on(probe.probe(&profile)).unwrap_err();
        assert!(matches!(err, MongorunError::Config(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_errors_within_timeout() {
        let probe = probe_with_timeout(1);
        let started = Instant::now();
        let err = probe.probe(&unreachable_profile()).await.unwrap_err();

        assert!(matches!(err, MongorunError::Connection(_)));
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "probe must respect its bound, took {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn test_probe_cancellation() {
        let probe = probe_with_timeout(30);
        let cancel = CancellationToken::new();
        let pre_cancelled = cancel.clone();
        pre_cancelled.cancel();

        let err = probe
            .probe_cancellable(&unreachable_profile(), cancel)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MongorunError::Connection(ConnectionError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_list_collections_respects_allow_list() {
        let probe = probe_with_timeout(1);
        let mut profile = unreachable_profile();
        profile.databases = crate::profile::parse_string_set("orders");

        // Rejected before any network I/O, so even an unreachable host
        // reports the configuration problem.
        let err = probe.list_collections(&profile, "secrets").await.unwrap_err();
        assert!(matches!(err, MongorunError::Config(_)));
    }
}
