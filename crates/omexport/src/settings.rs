use clap::Parser;
use omexport_lib::ExportConfig;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Export Oruxmaps tracks to GPX files
pub struct Settings {
    /// The oruxmapstracks.db database file
    #[clap(long, env = "OMEXPORT_DATABASE", default_value = "oruxmapstracks.db")]
    pub database: PathBuf,

    /// The output directory (will be created if non-existing)
    #[clap(long, env = "OMEXPORT_TRACKS", default_value = "tracks")]
    pub tracks: PathBuf,

    /// Write all tracks into this single GPX file instead of one file per track
    #[clap(long, value_name = "FILE", conflicts_with_all = ["folder_gpx", "force"])]
    pub combined: Option<PathBuf>,

    /// Also write one GPX file per track folder, next to the folder directory
    #[clap(long)]
    pub folder_gpx: bool,

    /// Regenerate GPX files that already exist
    #[clap(short, long)]
    pub force: bool,
}

impl Settings {
    pub fn export_config(&self) -> ExportConfig {
        match &self.combined {
            Some(file) => ExportConfig::combined(file),
            None => ExportConfig::individual(&self.tracks)
                .with_folder_aggregate(self.folder_gpx)
                .with_force(self.force),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omexport_lib::ExportMode;

    #[test]
    fn test_defaults() {
        let settings = Settings::try_parse_from(["omexport"]).unwrap();
        let config = settings.export_config();
        assert_eq!(config.mode, ExportMode::Individual);
        assert_eq!(config.output_dir, PathBuf::from("tracks"));
        assert!(!config.folder_aggregate);
        assert!(!config.force);
    }

    #[test]
    fn test_individual_flags() {
        let settings = Settings::try_parse_from([
            "omexport",
            "--database",
            "backup.db",
            "--tracks",
            "out",
            "--folder-gpx",
            "--force",
        ])
        .unwrap();
        assert_eq!(settings.database, PathBuf::from("backup.db"));

        let config = settings.export_config();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(config.folder_aggregate);
        assert!(config.force);
    }

    #[test]
    fn test_combined_mode() {
        let settings = Settings::try_parse_from(["omexport", "--combined", "all.gpx"]).unwrap();
        let config = settings.export_config();
        assert_eq!(config.mode, ExportMode::Combined);
        assert_eq!(config.combined_file, PathBuf::from("all.gpx"));
    }

    #[test]
    fn test_combined_conflicts_with_individual_options() {
        assert!(Settings::try_parse_from(["omexport", "--combined", "a.gpx", "--force"]).is_err());
        assert!(
            Settings::try_parse_from(["omexport", "--combined", "a.gpx", "--folder-gpx"]).is_err()
        );
    }
}
