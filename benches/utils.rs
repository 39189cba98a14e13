use skewt_analysis::{load_geojson, parse_sounding, IngestOptions, Sounding};
use std::path::PathBuf;

pub fn load_all_test_files() -> [Sounding; 1] {
    [load_test_file("standard.json")]
}

fn load_test_file(fname: &str) -> Sounding {
    let mut test_path = PathBuf::new();
    test_path.push("test_data");
    test_path.push(fname);

    let doc = load_geojson(&test_path).expect(&format!("Error opening file: {:#?}", test_path));
    parse_sounding(&doc, &IngestOptions::default())
        .expect(&format!("Error parsing file: {:#?}", test_path))
}
