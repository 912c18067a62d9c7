use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::foundation::core::{Point, Polyline};
use crate::foundation::error::{TourError, TourResult};
use crate::foundation::spatial::SpatialReference;
use crate::source::{DataSource, Geometry, Query, QueryFuture, Record};

/// [`DataSource`] reading feature sets from JSON files on disk.
///
/// The query endpoint is a file path, resolved against the source's base
/// directory. An endpoint without an existing file falls back to the same path
/// with a `.json` extension, so layer-style locators such as `trip/1` map to
/// `trip/1.json`.
///
/// The file layout follows the common feature-set JSON shape:
///
/// ```json
/// {
///   "spatialReference": { "wkid": 4326 },
///   "features": [
///     { "geometry": { "x": -122.27, "y": 37.80 }, "attributes": { "Name": "Oakland", "Sequence": 1 } },
///     { "geometry": { "paths": [[[-122.27, 37.80], [-121.9, 37.7]]] }, "attributes": { "Sequence": 2 } },
///     { "geometry": null, "attributes": { "Sequence": 3 } }
///   ]
/// }
/// ```
///
/// A missing `spatialReference` means WGS84.
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    base_dir: PathBuf,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeatureSetFile {
    #[serde(default)]
    spatial_reference: Option<SpatialReference>,
    features: Vec<FeatureFile>,
}

#[derive(serde::Deserialize)]
struct FeatureFile {
    #[serde(default)]
    geometry: Option<GeometryFile>,
    #[serde(default)]
    attributes: BTreeMap<String, serde_json::Value>,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum GeometryFile {
    Point { x: f64, y: f64 },
    Polyline { paths: Vec<Vec<[f64; 2]>> },
}

impl From<GeometryFile> for Geometry {
    fn from(g: GeometryFile) -> Self {
        match g {
            GeometryFile::Point { x, y } => Geometry::Point(Point::new(x, y)),
            GeometryFile::Polyline { paths } => Geometry::Polyline(Polyline::new(
                paths
                    .into_iter()
                    .map(|path| path.into_iter().map(|[x, y]| Point::new(x, y)).collect())
                    .collect(),
            )),
        }
    }
}

impl JsonFileSource {
    /// Source resolving relative endpoints against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, endpoint: &str) -> PathBuf {
        let path = Path::new(endpoint);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };
        if path.is_file() {
            return path;
        }
        let mut with_ext = path.clone().into_os_string();
        with_ext.push(".json");
        PathBuf::from(with_ext)
    }

    async fn read(&self, query: &Query) -> TourResult<Vec<Record>> {
        if !query.filter_all {
            return Err(TourError::query("filtered queries are not supported"));
        }
        let path = self.resolve(&query.endpoint);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| TourError::query(format!("read '{}': {e}", path.display())))?;
        let file: FeatureSetFile = serde_json::from_slice(&bytes)
            .map_err(|e| TourError::query(format!("parse '{}': {e}", path.display())))?;

        let native = file.spatial_reference.unwrap_or(SpatialReference::WGS84);
        native
            .validate()
            .map_err(|e| TourError::query(format!("'{}': {e}", path.display())))?;

        tracing::debug!(
            path = %path.display(),
            features = file.features.len(),
            wkid = native.wkid,
            "read feature set"
        );

        let records = file
            .features
            .into_iter()
            .map(|f| Record {
                geometry: f.geometry.map(Geometry::from),
                attributes: f.attributes,
            })
            .collect();
        Ok(query.apply(records, native))
    }
}

impl DataSource for JsonFileSource {
    fn query<'a>(&'a self, query: &'a Query) -> QueryFuture<'a> {
        Box::pin(self.read(query))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/json_file.rs"]
mod tests;
