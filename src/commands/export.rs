use crate::api::{self, Ledger};
use crate::args::ExportArgs;
use crate::commands::{fetch, query, Out};
use crate::error::{ErrorType, IntoResult};
use crate::export::{file_name, ExportDepth, ExportFormat, Report};
use crate::tree::shape;
use crate::{utils, Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// What an export wrote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exported {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub depth: ExportDepth,
    pub rows: usize,
}

/// Fetches a project's data, shapes it with the months, search and sort from `args`, and writes
/// the whole tree down to `--depth` as CSV, PDF or xlsx.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<Exported>> {
    let mut ledger = api::ledger(&config, args.view().file()).pub_result(ErrorType::Config)?;
    export_with(ledger.as_mut(), &config, &args).await
}

pub(super) async fn export_with(
    ledger: &mut (dyn Ledger + Send),
    config: &Config,
    args: &ExportArgs,
) -> Result<Out<Exported>> {
    let view = args.view();
    let query = query(view, config)?;
    let data = fetch(ledger, view.project()).await?;
    let tree = shape(&data, &query);

    let report = Report::new(view.project(), args.name(), &tree, args.depth());
    let path = match args.output() {
        Some(p) => p.to_path_buf(),
        None => config
            .exports_dir()
            .join(file_name(view.project(), args.depth(), args.format())),
    };
    debug!(
        "Exporting {} rows of project {} to {}",
        report.rows.len(),
        view.project(),
        path.display()
    );

    let bytes = report
        .render(args.format())
        .with_context(|| format!("Unable to render the {} export", args.format()))
        .pub_result(ErrorType::Export)?;
    utils::write_creating_parent(&path, bytes)
        .await
        .pub_result(ErrorType::Export)?;

    let exported = Exported {
        path,
        format: args.format(),
        depth: args.depth(),
        rows: report.rows.len(),
    };
    Ok(Out::new(
        format!(
            "Exported {} rows ({}) to {}",
            exported.rows,
            exported.depth.label(),
            exported.path.display()
        ),
        exported,
    ))
}
