use std::path::PathBuf;

use auditlens_core::ReviewConfig;
use clap::Parser;

/// Review an audit-log CSV and flag unusual entries for compliance review.
///
/// Flags left unset fall back to the AUDITLENS_* environment
/// configuration (a `.env` file is read when present).
#[derive(Parser, Debug)]
#[command(name = "auditlens", version, about)]
pub struct CliArgs {
    /// Audit log file with a header row.
    pub path: PathBuf,

    /// Field delimiter (single ASCII character).
    #[arg(long, env = "AUDITLENS_DELIMITER", default_value_t = ',')]
    pub delimiter: char,

    /// Expected fraction of anomalous records, in (0, 0.5].
    #[arg(long)]
    pub contamination: Option<f64>,

    /// Number of isolation trees.
    #[arg(long)]
    pub estimators: Option<usize>,

    /// Random seed for the isolation forest.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum number of TF-IDF terms.
    #[arg(long)]
    pub max_features: Option<usize>,

    /// Rows shown in the raw preview.
    #[arg(long, env = "AUDITLENS_PREVIEW_ROWS", default_value_t = 10)]
    pub preview_rows: usize,

    /// Print the full report as JSON instead of the terminal view.
    #[arg(long)]
    pub json: bool,

    /// Write the summary document to this path.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

impl CliArgs {
    /// Overlay explicitly passed flags on the environment configuration.
    pub fn apply(&self, config: &mut ReviewConfig) {
        if let Some(c) = self.contamination {
            config.contamination = c;
        }
        if let Some(n) = self.estimators {
            config.n_estimators = n;
        }
        if let Some(s) = self.seed {
            config.random_seed = s;
        }
        if let Some(m) = self.max_features {
            config.max_features = m;
        }
    }

    pub fn delimiter_byte(&self) -> Option<u8> {
        u8::try_from(self.delimiter).ok().filter(u8::is_ascii)
    }
}
