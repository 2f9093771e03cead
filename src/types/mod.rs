mod country_types;
mod geojson_types;

pub use country_types::*;
pub use geojson_types::*;
