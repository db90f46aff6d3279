//! Command line definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use svsm::BackendKind;

#[derive(Parser)]
#[command(name = "svsm", version, about = "Stardew Valley saves manager (PC <-> Android)")]
pub struct Cli {
    /// Settings file (defaults to <config dir>/svsm/settings.json)
    #[arg(long, global = true, env = "SVSM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip the snapshot normally taken at startup
    #[arg(long, global = true)]
    pub no_backup: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List saves on the PC and the device
    List {
        /// Only list one side (local/pc or remote/android)
        #[arg(short, long)]
        backend: Option<BackendKind>,
        /// Case-insensitive regex matched against farm name and id
        #[arg(short = 'F', long)]
        filter: Option<String>,
    },

    /// Copy a save to the other side (the source is kept)
    Transfer {
        /// Farm name
        name: String,
        /// Save id
        id: String,
        /// Side the save is on now
        #[arg(short, long, default_value = "local")]
        from: BackendKind,
    },

    /// Delete a save
    Delete {
        name: String,
        id: String,
        #[arg(short, long)]
        from: BackendKind,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Snapshot every PC save into the backup directory
    Backup,

    /// Copy one save into a directory of your choice
    Export {
        name: String,
        id: String,
        #[arg(short, long)]
        from: BackendKind,
        /// Destination directory; the save lands in <dest>/<name>_<id>
        #[arg(short, long)]
        dest: PathBuf,
    },

    /// Show the effective settings
    Config {
        /// Write the effective settings back to the settings file
        #[arg(long)]
        save: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definitions_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn transfer_defaults_to_local_source() {
        let cli = Cli::try_parse_from(["svsm", "transfer", "Robin", "1001"]).unwrap();
        match cli.command {
            Commands::Transfer { name, id, from } => {
                assert_eq!(name, "Robin");
                assert_eq!(id, "1001");
                assert_eq!(from, BackendKind::Local);
            }
            _ => panic!("expected transfer"),
        }
    }

    #[test]
    fn delete_requires_side() {
        assert!(Cli::try_parse_from(["svsm", "delete", "Robin", "1001"]).is_err());
        let cli =
            Cli::try_parse_from(["svsm", "delete", "Robin", "1001", "--from", "android", "-y"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Delete { from: BackendKind::Remote, yes: true, .. }
        ));
    }

    #[test]
    fn list_accepts_filter() {
        let cli = Cli::try_parse_from(["svsm", "list", "--filter", "rob"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List { backend: None, filter: Some(ref f) } if f == "rob"
        ));
    }
}
