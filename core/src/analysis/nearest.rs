//! Joins sites of interest to the closest landfall of the matching storm.

use std::io::{Read, Write};

use crate::math::geodesic_km;
use crate::prelude::{AnalysisError, AnalysisResult};
use crate::records::LandfallRecord;

/// Columns appended to the site table, in output order.
pub const JOIN_COLUMNS: [&str; 7] = [
    "Landfall_lat",
    "Landfall_lon",
    "Landfall_dist_km",
    "Landfall_intensity",
    "Landfall_wspd_kts",
    "Landfall_pres",
    "max_usa_sshs",
];

/// A CSV table kept as text so unknown columns survive the join untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SiteTable {
    pub fn read<R: Read>(reader: R) -> AnalysisResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.iter().map(String::from).collect();
        let rows = csv_reader
            .records()
            .map(|record| record.map(|r| r.iter().map(String::from).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;
        Ok(Self { headers, rows })
    }

    pub fn write<W: Write>(&self, writer: W) -> AnalysisResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    fn column(&self, name: &str) -> AnalysisResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AnalysisError::InvalidInput(format!("site table has no {} column", name)))
    }
}

struct Site {
    name: String,
    year: i32,
    lat: f64,
    lon: f64,
}

fn parse_site(table: &SiteTable, row: usize, cols: [usize; 4]) -> AnalysisResult<Site> {
    let cells = &table.rows[row];
    let cell = |col: usize| cells.get(col).map(String::as_str).unwrap_or("");
    let invalid = |what: &str, raw: &str| {
        AnalysisError::InvalidInput(format!("site row {}: bad {} {:?}", row + 1, what, raw))
    };

    let coordinate = |what: &str, raw: &str| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid(what, raw))
    };

    let year = cell(cols[1]);
    Ok(Site {
        name: cell(cols[0]).to_lowercase(),
        year: year.parse().map_err(|_| invalid("Year", year))?,
        lat: coordinate("Lat", cell(cols[2]))?,
        // Site longitudes are recorded as positive degrees west.
        lon: -coordinate("Lon", cell(cols[3]))?,
    })
}

fn fmt_opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Appends the attributes of the closest matching landfall to every site.
///
/// Candidates share the site's year and (case-insensitive) storm name.
/// Sites without candidates get blank join columns.
pub fn join_nearest(sites: &SiteTable, landfalls: &[LandfallRecord]) -> AnalysisResult<SiteTable> {
    let cols = [
        sites.column("Name")?,
        sites.column("Year")?,
        sites.column("Lat")?,
        sites.column("Lon")?,
    ];

    let mut joined = SiteTable {
        headers: sites.headers.clone(),
        rows: Vec::with_capacity(sites.rows.len()),
    };
    joined
        .headers
        .extend(JOIN_COLUMNS.iter().map(|c| c.to_string()));

    for row in 0..sites.rows.len() {
        let site = parse_site(sites, row, cols)?;
        let candidates: Vec<&LandfallRecord> = landfalls
            .iter()
            .filter(|lf| lf.year == site.year && lf.name.to_lowercase() == site.name)
            .collect();

        let mut out = sites.rows[row].clone();
        out.resize(sites.headers.len(), String::new());

        let nearest = candidates
            .iter()
            .map(|lf| {
                let dist = geodesic_km(site.lat, site.lon, lf.landfall_lat, lf.landfall_lon);
                (dist.round() as i64, *lf)
            })
            .min_by_key(|(dist, _)| *dist);

        match nearest {
            Some((dist, lf)) => {
                let max_category = candidates.iter().filter_map(|c| c.max_usa_sshs).max();
                out.extend([
                    lf.landfall_lat.to_string(),
                    lf.landfall_lon.to_string(),
                    dist.to_string(),
                    fmt_opt(lf.landfall_cat),
                    fmt_opt(lf.landfall_wspd_kts),
                    fmt_opt(lf.landfall_pres),
                    fmt_opt(max_category),
                ]);
            }
            None => out.extend(std::iter::repeat(String::new()).take(JOIN_COLUMNS.len())),
        }
        joined.rows.push(out);
    }
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn landfall(name: &str, year: i32, lat: f64, lon: f64, cat: i8) -> LandfallRecord {
        let t = Utc.with_ymd_and_hms(year, 8, 25, 0, 0, 0).unwrap();
        LandfallRecord {
            name: name.to_string(),
            year,
            t0: t,
            tf: t,
            max_usa_sshs: Some(cat),
            landfall_lat: lat,
            landfall_lon: lon,
            dist_from_shore_km: 0.0,
            landfall_cat: Some(cat),
            landfall_wspd_kts: Some(100.0),
            landfall_pres: None,
            sid: format!("{year}X"),
            findex: 0,
        }
    }

    #[test]
    fn picks_closest_landfall_of_same_storm() {
        let sites = SiteTable::read(
            "Site,Name,Year,Lat,Lon\nMarsh A,Katrina,2005,30.0,89.5\nReef B,Nobody,2005,25.0,80.0\n"
                .as_bytes(),
        )
        .unwrap();
        let landfalls = vec![
            landfall("KATRINA", 2005, 25.9, -80.1, 1),
            landfall("KATRINA", 2005, 29.3, -89.6, 3),
            landfall("KATRINA", 1995, 30.0, -89.5, 5),
        ];

        let joined = join_nearest(&sites, &landfalls).unwrap();
        assert_eq!(joined.headers.len(), 5 + JOIN_COLUMNS.len());

        let row = &joined.rows[0];
        assert_eq!(row[0], "Marsh A");
        assert_eq!(row[5], "29.3");
        assert_eq!(row[6], "-89.6");
        assert_eq!(row[7], "78");
        assert_eq!(row[8], "3");
        assert_eq!(row[10], "");
        assert_eq!(row[11], "3");

        assert!(joined.rows[1][5..].iter().all(String::is_empty));
    }

    #[test]
    fn missing_column_is_reported() {
        let sites = SiteTable::read("Name,Year,Lat\nX,2005,1.0\n".as_bytes()).unwrap();
        let err = join_nearest(&sites, &[]).unwrap_err();
        assert!(err.to_string().contains("Lon"));
    }

    #[test]
    fn unparsable_coordinates_fail_fast() {
        let sites = SiteTable::read("Name,Year,Lat,Lon\nX,2005,north,80\n".as_bytes()).unwrap();
        assert!(join_nearest(&sites, &[]).is_err());
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let landfalls = vec![landfall("KATRINA", 2005, 29.3, -89.6, 3)];
        for row in ["Katrina,2005,NaN,89.5", "Katrina,2005,30.0,inf"] {
            let csv = format!("Name,Year,Lat,Lon\n{row}\n");
            let sites = SiteTable::read(csv.as_bytes()).unwrap();
            let err = join_nearest(&sites, &landfalls).unwrap_err();
            assert!(err.to_string().contains("site row 1"), "{row}: {err}");
        }
    }

    #[test]
    fn ellipsoidal_distance_decides_rounding() {
        let sites = SiteTable::read("Name,Year,Lat,Lon\nKatrina,2005,30.0,89.5\n".as_bytes()).unwrap();
        let landfalls = vec![landfall("KATRINA", 2005, 25.9, -80.1, 1)];
        let joined = join_nearest(&sites, &landfalls).unwrap();
        assert_eq!(joined.rows[0][6], "1030");
    }

    #[test]
    fn write_round_trips_headers() {
        let sites = SiteTable::read("Name,Year,Lat,Lon\nX,2005,1.0,80\n".as_bytes()).unwrap();
        let mut out = Vec::new();
        sites.write(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Name,Year,Lat,Lon\nX,2005,1.0,80\n");
    }
}
