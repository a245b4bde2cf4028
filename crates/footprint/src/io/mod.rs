pub mod geojson;

pub use self::geojson::{features_from_geojson_string, features_to_geojson_string, read_features, write_features};
