//! Process sounding documents one after another, from file to finished diagram.
//!
//! A file that fails is logged and skipped, it never stops the rest of the batch.
use crate::{
    analysis::Analysis,
    config::Config,
    error::SkewTError,
    geocode::{ReverseGeocoder, UNKNOWN_LOCATION},
    geojson::{load_geojson, parse_sounding},
    render::{output_file_name, render_diagram},
};
use log::{error, info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// What happened to each file of a batch.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Diagrams written.
    pub rendered: Vec<PathBuf>,
    /// Input files that failed and why.
    pub failed: Vec<(PathBuf, SkewTError)>,
}

/// The `.json` files in a directory, sorted by name.
pub fn collect_input_files(dir: &Path) -> Result<Vec<PathBuf>, SkewTError> {
    let list_err = |source| SkewTError::InputDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = vec![];
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

/// Load, analyze and draw one sounding document. Returns the path of the diagram.
pub fn process_file(
    path: &Path,
    config: &Config,
    geocoder: &mut dyn ReverseGeocoder,
) -> Result<PathBuf, SkewTError> {
    let doc = load_geojson(path)?;
    let snd = parse_sounding(&doc, &config.ingest)?
        .with_source_description(path.display().to_string());

    let location_name = match snd.station_info().location() {
        Some((lat, lon)) => geocoder.locate_or_unknown(lat, lon),
        None => {
            warn!("{} has no location", path.display());
            UNKNOWN_LOCATION.to_owned()
        }
    };
    let snd = {
        let station = snd.station_info().clone().with_name(location_name.clone());
        snd.with_station_info(station)
    };

    let out_path = config
        .output_dir
        .join(output_file_name(path, snd.valid_time()));

    let anal = Analysis::new(snd, &config.analysis);
    render_diagram(&anal, &location_name, &out_path, &config.image)?;

    Ok(out_path)
}

/// Process every file, logging each failure and carrying on with the rest.
pub fn process_all(
    files: &[PathBuf],
    config: &Config,
    geocoder: &mut dyn ReverseGeocoder,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for path in files {
        match process_file(path, config, geocoder) {
            Ok(out_path) => {
                info!("{} -> {}", path.display(), out_path.display());
                summary.rendered.push(out_path);
            }
            Err(err) => {
                error!("{} failed: {}", path.display(), err);
                summary.failed.push((path.clone(), err));
            }
        }
    }

    summary
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{error::InputError, geocode::OfflineGeocoder};

    #[test]
    fn test_collect_input_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in &["b.json", "a.JSON", "notes.txt", "c.json.bak"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        fs::create_dir(dir.path().join("d.json")).unwrap();

        let files = collect_input_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JSON", "b.json"]);

        assert!(matches!(
            collect_input_files(&dir.path().join("missing")),
            Err(SkewTError::InputDir { .. })
        ));
    }

    #[test]
    fn test_bad_files_do_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        let empty = dir.path().join("empty.json");
        let missing = dir.path().join("missing.json");
        fs::write(&broken, "{ \"features\": [").unwrap();
        fs::write(
            &empty,
            r#"{"properties": {"lat": 0.0, "lon": 0.0, "station_id": "X", "syn_timestamp": 0},
                "features": []}"#,
        )
        .unwrap();

        let config = Config {
            output_dir: dir.path().join("out"),
            ..Config::default()
        };

        let files = vec![broken.clone(), empty.clone(), missing.clone()];
        let summary = process_all(&files, &config, &mut OfflineGeocoder);

        assert!(summary.rendered.is_empty());
        assert_eq!(summary.failed.len(), 3);
        assert!(matches!(
            summary.failed[0],
            (ref p, SkewTError::Input(InputError::Json(_))) if *p == broken
        ));
        assert!(matches!(
            summary.failed[1].1,
            SkewTError::Input(InputError::InvalidProfile(_))
        ));
        assert!(matches!(
            summary.failed[2].1,
            SkewTError::Input(InputError::Io { .. })
        ));
    }

    #[test]
    fn test_missing_property_fails_only_that_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a_good.json");
        let no_station = dir.path().join("b_no_station.json");

        let text = fs::read_to_string(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data/standard.json"),
        )
        .unwrap();
        fs::write(&good, &text).unwrap();
        fs::write(&no_station, text.replace(r#""station_id": 72562,"#, "")).unwrap();

        let config = Config {
            output_dir: dir.path().join("out"),
            ..Config::default()
        };

        let files = vec![no_station.clone(), good.clone()];
        let summary = process_all(&files, &config, &mut OfflineGeocoder);

        assert!(matches!(
            summary.failed[0],
            (ref p, SkewTError::Input(InputError::MissingProperty("station_id"))) if *p == no_station
        ));

        // The good file is drawn, unless the machine has no fonts to draw text with.
        match summary.failed.get(1) {
            Some((p, err)) => {
                assert_eq!(*p, good);
                assert!(matches!(err, SkewTError::Render(_)));
            }
            None => assert_eq!(summary.rendered.len(), 1),
        }
    }
}
