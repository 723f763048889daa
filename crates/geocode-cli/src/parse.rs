//! `parse` and `validate` command handlers.

use std::path::{Path, PathBuf};

use anyhow::Context;
use futures::future::join_all;
use geocode_core::{filter_within, AppConfig, GeoLocation, GeoShape};
use geocode_xml::{Dispatcher, GeocodeReply, GeocodeRequest};
use serde::Serialize;

/// One line of `parse` output.
#[derive(Debug, Serialize)]
pub(crate) struct FileReport {
    pub(crate) file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) locations: Option<Vec<GeoLocation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

impl FileReport {
    fn new(path: &Path, reply: GeocodeReply, clip: Option<&GeoShape>) -> Self {
        let file = path.display().to_string();
        match reply {
            GeocodeReply::Results(locations) => {
                let locations = match clip {
                    Some(bounds) => filter_within(locations, bounds),
                    None => locations,
                };
                Self {
                    file,
                    locations: Some(locations),
                    error: None,
                }
            }
            GeocodeReply::Error(message) => Self {
                file,
                locations: None,
                error: Some(message),
            },
        }
    }
}

async fn read_response(path: &Path, max_bytes: u64) -> anyhow::Result<Vec<u8>> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("cannot stat {}", path.display()))?;
    if metadata.len() > max_bytes {
        anyhow::bail!(
            "{} is {} bytes, above the {max_bytes} byte limit",
            path.display(),
            metadata.len()
        );
    }
    tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))
}

async fn reply_for(
    dispatcher: Dispatcher,
    path: &Path,
    bounds: GeoShape,
    max_bytes: u64,
) -> GeocodeReply {
    match read_response(path, max_bytes).await {
        Ok(data) => {
            dispatcher
                .parse(GeocodeRequest::new(data).with_bounds(bounds))
                .await
        }
        Err(error) => GeocodeReply::Error(format!("{error:#}")),
    }
}

/// Parse every file concurrently; reports come back in argument order.
pub(crate) async fn run_parse(
    config: &AppConfig,
    files: &[PathBuf],
    bounds: GeoShape,
    clip: bool,
    pretty: bool,
) -> anyhow::Result<()> {
    let dispatcher = Dispatcher::from_app_config(config);
    let replies = join_all(
        files
            .iter()
            .map(|path| reply_for(dispatcher, path, bounds, config.max_input_bytes)),
    )
    .await;

    let clip_bounds = clip.then_some(&bounds);
    let mut failed = 0usize;
    for (path, reply) in files.iter().zip(replies) {
        if reply.is_error() {
            failed += 1;
        }
        let report = FileReport::new(path, reply, clip_bounds);
        let line = if pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        println!("{line}");
    }

    tracing::info!(files = files.len(), failed, "geocode responses processed");
    if failed > 0 {
        anyhow::bail!("{failed} of {} responses failed to parse", files.len());
    }
    Ok(())
}

pub(crate) async fn run_validate(config: &AppConfig, file: &Path) -> anyhow::Result<()> {
    let dispatcher = Dispatcher::from_app_config(config);
    match reply_for(dispatcher, file, GeoShape::Unset, config.max_input_bytes).await {
        GeocodeReply::Results(locations) => {
            println!("{}: ok, {} places", file.display(), locations.len());
            Ok(())
        }
        GeocodeReply::Error(message) => {
            anyhow::bail!("{}: {message}", file.display())
        }
    }
}
