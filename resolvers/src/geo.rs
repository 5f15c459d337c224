//! Geo-ip resolution backed by a MaxMind City database.

use errors::GeoError;
use ingest_core::{GeoData, GeoResolver};
use maxminddb::{MaxMindDBError, Reader, geoip2};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Database file looked up when `geo.maxmind_path` points at a directory.
pub const DEFAULT_DATABASE_FILE: &str = "GeoLite2-City.mmdb";

/// Opens the MaxMind database at `path`.
///
/// `path` may be the `.mmdb` file itself or a directory holding
/// [`DEFAULT_DATABASE_FILE`].
pub fn create_resolver(path: &str) -> Result<MaxMindGeoResolver, GeoError> {
    MaxMindGeoResolver::open(&database_file(Path::new(path)))
}

fn database_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(DEFAULT_DATABASE_FILE)
    } else {
        path.to_path_buf()
    }
}

fn parse_ip(ip: &str) -> Result<IpAddr, GeoError> {
    ip.trim().parse().map_err(|_| GeoError::InvalidIp {
        ip: ip.to_string()
    })
}

pub struct MaxMindGeoResolver {
    reader: Reader<Vec<u8>>
}

impl MaxMindGeoResolver {
    pub fn open(path: &Path) -> Result<Self, GeoError> {
        let reader = Reader::open_readfile(path).map_err(|e| GeoError::DatabaseOpen {
            path: path.display().to_string(),
            reason: e.to_string()
        })?;
        tracing::info!(path = %path.display(), "Loaded geo database");
        Ok(Self { reader })
    }
}

impl GeoResolver for MaxMindGeoResolver {
    fn resolve(&self, ip: &str) -> Result<GeoData, GeoError> {
        let address = parse_ip(ip)?;

        let record: geoip2::City = self.reader.lookup(address).map_err(|e| match e {
            MaxMindDBError::AddressNotFoundError(_) => GeoError::NotFound { ip: ip.to_string() },
            other => GeoError::LookupFailed {
                ip: ip.to_string(),
                reason: other.to_string()
            }
        })?;

        let mut data = GeoData::default();

        if let Some(country) = record.country.and_then(|c| c.iso_code) {
            data.country = country.to_string();
        }
        if let Some(region) = record
            .subdivisions
            .as_ref()
            .and_then(|subdivisions| subdivisions.first())
            .and_then(|s| s.iso_code)
        {
            data.region = region.to_string();
        }
        if let Some(city) = record
            .city
            .and_then(|c| c.names)
            .and_then(|names| names.get("en").copied())
        {
            data.city = city.to_string();
        }
        if let Some(zip) = record.postal.and_then(|p| p.code) {
            data.zip = zip.to_string();
        }
        if let Some(location) = record.location {
            data.lat = location.latitude;
            data.lon = location.longitude;
        }

        Ok(data)
    }
}

/// Stand-in used when the geo database could not be opened.
///
/// Reports itself unavailable so enrichment is skipped instead of logging a
/// failure on every fact.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableGeoResolver;

impl GeoResolver for UnavailableGeoResolver {
    fn resolve(&self, _ip: &str) -> Result<GeoData, GeoError> {
        Err(GeoError::Unavailable)
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_ip() {
        assert!(parse_ip("95.82.232.185").is_ok());
        assert!(parse_ip("2001:db8::1").is_ok());
        assert!(parse_ip(" 10.0.0.1 ").is_ok());
        assert!(matches!(
            parse_ip("not-an-ip"),
            Err(GeoError::InvalidIp { .. })
        ));
    }

    #[test]
    fn test_database_file_for_directory() {
        let dir = tempdir().unwrap();
        assert_eq!(
            database_file(dir.path()),
            dir.path().join(DEFAULT_DATABASE_FILE)
        );
    }

    #[test]
    fn test_database_file_for_file_path() {
        let path = Path::new("/opt/geo/custom.mmdb");
        assert_eq!(database_file(path), PathBuf::from("/opt/geo/custom.mmdb"));
    }

    #[test]
    fn test_missing_database_fails_to_open() {
        let dir = tempdir().unwrap();
        let result = create_resolver(dir.path().to_str().unwrap());
        assert!(matches!(result, Err(GeoError::DatabaseOpen { .. })));
    }

    #[test]
    fn test_garbage_database_fails_to_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.mmdb");
        std::fs::write(&path, b"definitely not a maxmind database").unwrap();

        let result = MaxMindGeoResolver::open(&path);
        assert!(matches!(result, Err(GeoError::DatabaseOpen { .. })));
    }

    #[test]
    fn test_unavailable_resolver() {
        let resolver = UnavailableGeoResolver;
        assert!(!resolver.is_available());
        assert!(matches!(
            resolver.resolve("95.82.232.185"),
            Err(GeoError::Unavailable)
        ));
    }
}
