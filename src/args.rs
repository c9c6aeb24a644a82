//! These structs provide the CLI interface for the ledger-tree CLI.

use crate::export::{ExportDepth, ExportFormat};
use crate::tree::SortKey;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger-tree: Browse and export a project's expenses as a mother/child/grandchild tree.
///
/// Ledger lines are fetched from the ledger API configured with `init` (or read from a JSON file
/// with --file), grouped by nature code into a three-level tree, and then filtered by month,
/// searched, sorted and paginated.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and the configuration file.
    ///
    /// Pass the base URL of the ledger API with --api-url. Without it, the other commands need
    /// --file to read ledger data from disk.
    Init(InitArgs),
    /// Print one page of a project's expense tree.
    Tree(TreeArgs),
    /// List the months present in a project's ledger data.
    Months(MonthsArgs),
    /// Write a project's expense tree to a CSV, PDF or xlsx file.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where configuration and exports are kept. Defaults to ~/ledger-tree
    #[arg(long, env = "LEDGER_TREE_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Args for the `ledger-tree init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the ledger API, e.g. https://erp.example.org/api/v1. Project data is
    /// fetched from <api-url>/movements/<project>.
    #[arg(long)]
    api_url: Option<String>,
}

impl InitArgs {
    pub fn new(api_url: Option<String>) -> Self {
        Self { api_url }
    }

    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }
}

/// Where to read ledger data from and how to shape the tree. Shared by `tree` and `export`.
#[derive(Debug, Parser, Clone, Default)]
pub struct ViewArgs {
    /// The project code.
    project: String,

    /// Read ledger data from this JSON file, or from <dir>/<project>.json when it is a directory,
    /// instead of the ledger API.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Only include these months, as YYYY-MM. May be repeated. Nodes without dates are always
    /// included.
    #[arg(long)]
    month: Vec<String>,

    /// Only include nodes whose name contains this text (case-insensitive), with their
    /// ancestors.
    #[arg(long)]
    search: Option<String>,

    /// The sibling order. Defaults to the `sort` setting in config.json.
    #[arg(long, value_enum)]
    sort: Option<SortKey>,
}

impl ViewArgs {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Default::default()
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_month(mut self, month: impl Into<String>) -> Self {
        self.month.push(month.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn months(&self) -> &[String] {
        &self.month
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn sort(&self) -> Option<SortKey> {
        self.sort
    }
}

/// Args for the `ledger-tree tree` command.
#[derive(Debug, Parser, Clone)]
pub struct TreeArgs {
    #[clap(flatten)]
    view: ViewArgs,

    /// The page of mothers to show, starting at 1.
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Show the first page of children of this mother, or of grandchildren of this child. May be
    /// repeated.
    #[arg(long)]
    expand: Vec<String>,
}

impl TreeArgs {
    pub fn new(view: ViewArgs) -> Self {
        Self {
            view,
            page: 1,
            expand: Vec::new(),
        }
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn with_expand(mut self, id: impl Into<String>) -> Self {
        self.expand.push(id.into());
        self
    }

    pub fn view(&self) -> &ViewArgs {
        &self.view
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn expand(&self) -> &[String] {
        &self.expand
    }
}

/// Args for the `ledger-tree months` command.
#[derive(Debug, Parser, Clone)]
pub struct MonthsArgs {
    /// The project code.
    project: String,

    /// Read ledger data from this JSON file or directory instead of the ledger API.
    #[arg(long)]
    file: Option<PathBuf>,
}

impl MonthsArgs {
    pub fn new(project: impl Into<String>, file: Option<PathBuf>) -> Self {
        Self {
            project: project.into(),
            file,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

/// Args for the `ledger-tree export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[clap(flatten)]
    view: ViewArgs,

    /// How many levels to include.
    #[arg(long, value_enum, default_value_t = ExportDepth::Full)]
    depth: ExportDepth,

    /// The output file format.
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    format: ExportFormat,

    /// Where to write the file. Defaults to the exports directory with a generated name.
    #[arg(long)]
    output: Option<PathBuf>,

    /// The project name printed in the PDF header. Defaults to the project code.
    #[arg(long)]
    name: Option<String>,
}

impl ExportArgs {
    pub fn new(view: ViewArgs, depth: ExportDepth, format: ExportFormat) -> Self {
        Self {
            view,
            depth,
            format,
            output: None,
            name: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn view(&self) -> &ViewArgs {
        &self.view
    }

    pub fn depth(&self) -> ExportDepth {
        self.depth
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("ledger-tree"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or LEDGER_TREE_HOME instead of relying on the default \
                home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("ledger-tree")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree_command() {
        let args = Args::try_parse_from([
            "ledger-tree",
            "--home",
            "/tmp/lt",
            "tree",
            "PRJ-001",
            "--month",
            "2024-01",
            "--month",
            "2024-02",
            "--sort",
            "name",
            "--expand",
            "0060",
            "--page",
            "2",
        ])
        .unwrap();
        assert_eq!(args.common().home().path(), Path::new("/tmp/lt"));
        let Command::Tree(tree) = args.command() else {
            panic!("expected the tree command");
        };
        assert_eq!(tree.view().project(), "PRJ-001");
        assert_eq!(tree.view().months(), ["2024-01", "2024-02"]);
        assert_eq!(tree.view().sort(), Some(SortKey::Name));
        assert_eq!(tree.page(), 2);
        assert_eq!(tree.expand(), ["0060"]);
    }

    #[test]
    fn test_parse_export_defaults() {
        let args = Args::try_parse_from(["ledger-tree", "export", "PRJ-001", "--format", "pdf"])
            .unwrap();
        let Command::Export(export) = args.command() else {
            panic!("expected the export command");
        };
        assert_eq!(export.depth(), ExportDepth::Full);
        assert_eq!(export.format(), ExportFormat::Pdf);
        assert!(export.output().is_none());
        assert_eq!(args.common().log_level(), LevelFilter::INFO);

        let args = Args::try_parse_from(["ledger-tree", "export", "PRJ-001", "--format", "xlsx"])
            .unwrap();
        let Command::Export(export) = args.command() else {
            panic!("expected the export command");
        };
        assert_eq!(export.format(), ExportFormat::Xlsx);
    }

    #[test]
    fn test_parse_log_level() {
        let args =
            Args::try_parse_from(["ledger-tree", "--log-level", "debug", "init"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
    }
}
