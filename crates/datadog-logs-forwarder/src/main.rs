// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod entry;
mod pipeline;

use std::{env, sync::Arc};

use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use datadog_logs_sender::{
    Config, ConfigError, HttpTransport, HttpTransportConfig, JsonArrayFormatter, LogsSender,
    StdoutTransport, Transport,
};

use crate::entry::EntryTemplate;
use crate::pipeline::{forward_lines, wait_for_shutdown};

#[tokio::main]
pub async fn main() {
    let log_level = env::var("DD_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,{log_level}");
    let env_filter = match EnvFilter::try_new(&env_filter) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("Invalid DD_LOG_LEVEL {log_level:?}: {e}");
            EnvFilter::new("info")
        }
    };
    // Logs go to stderr: stdout may carry payloads
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Setting default subscriber failed: {e}");
    }
    debug!("Logging subsystem enabled");

    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid logs configuration: {e}");
            return;
        }
    };
    debug!("Logs configuration: {config:?}");

    let cancel_token = CancellationToken::new();
    let transport: Arc<dyn Transport> = match HttpTransportConfig::from_env() {
        Ok(transport_config) => match HttpTransport::new(&transport_config, cancel_token.clone()) {
            Ok(transport) => {
                info!("Forwarding logs to {}", transport_config.endpoint);
                Arc::new(transport)
            }
            Err(e) => {
                error!("Unable to create the logs transport: {e}");
                return;
            }
        },
        Err(ConfigError::Missing(key)) => {
            info!("{key} is not set, payloads are written to stdout");
            Arc::new(StdoutTransport::new())
        }
        Err(e) => {
            error!("Invalid logs transport configuration: {e}");
            return;
        }
    };

    let (sender, handle, mut processed) =
        match LogsSender::new(&config, Arc::new(JsonArrayFormatter), transport) {
            Ok(parts) => parts,
            Err(e) => {
                error!("Invalid logs configuration: {e}");
                return;
            }
        };
    let sender_task = tokio::spawn(sender.run());

    // Audits what the sender is done with
    let auditor_task = tokio::spawn(async move {
        let mut count: u64 = 0;
        while let Some(message) = processed.recv().await {
            count += 1;
            debug!(
                "Processed log of {} bytes from {}",
                message.size(),
                message.origin().unwrap_or("unknown")
            );
        }
        count
    });

    // Installed once for the whole run: Ctrl+C also interrupts the final flush
    let signal_task = tokio::spawn(wait_for_shutdown(cancel_token.clone()));

    let template = EntryTemplate::from_env();
    let reader = BufReader::new(tokio::io::stdin());
    forward_lines(reader, &template, handle, &cancel_token).await;

    match sender_task.await {
        Ok(stats) => info!(
            "Sent {} payloads, {} logs processed ({} send errors, {} cancelled, {} dropped)",
            stats.payloads, stats.forwarded, stats.send_errors, stats.cancelled, stats.dropped
        ),
        Err(e) => error!("Logs sender task failed: {e}"),
    }
    match auditor_task.await {
        Ok(count) => debug!("Audited {count} logs"),
        Err(e) => error!("Auditor task failed: {e}"),
    }
    signal_task.abort();
}
