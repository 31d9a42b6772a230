//! Built-in health-indicator dataset.
//!
//! Ten OECD countries, 2019–2022. Densities are per 1,000 population,
//! spending is government health expenditure as % of GDP.

use super::HealthRecord;

/// (code, year, life expectancy, doctor density, nurse density, health spending)
type Row = (&'static str, i32, f64, f64, f64, f64);

const ROWS: &[Row] = &[
    ("CAN", 2019, 81.1, 2.56, 9.73, 7.48),
    ("CAN", 2020, 81.3, 2.64, 9.87, 7.71),
    ("CAN", 2021, 81.4, 2.72, 9.98, 7.90),
    ("CAN", 2022, 81.6, 2.80, 10.12, 8.13),
    ("DEU", 2019, 80.3, 4.26, 11.65, 8.91),
    ("DEU", 2020, 80.4, 4.34, 11.76, 9.10),
    ("DEU", 2021, 80.6, 4.42, 11.90, 9.33),
    ("DEU", 2022, 80.7, 4.50, 11.99, 9.48),
    ("ESP", 2019, 82.8, 4.36, 5.94, 6.70),
    ("ESP", 2020, 82.9, 4.44, 6.07, 6.93),
    ("ESP", 2021, 83.0, 4.52, 6.17, 7.08),
    ("ESP", 2022, 83.2, 4.60, 6.30, 7.31),
    ("FRA", 2019, 81.9, 2.96, 10.96, 9.73),
    ("FRA", 2020, 82.0, 3.04, 11.05, 9.88),
    ("FRA", 2021, 82.2, 3.12, 11.19, 10.11),
    ("FRA", 2022, 82.3, 3.20, 11.30, 10.30),
    ("GBR", 2019, 80.2, 2.96, 8.33, 8.68),
    ("GBR", 2020, 80.4, 3.04, 8.46, 8.91),
    ("GBR", 2021, 80.5, 3.12, 8.58, 9.10),
    ("GBR", 2022, 80.7, 3.20, 8.71, 9.33),
    ("GRC", 2019, 80.2, 6.06, 3.43, 4.78),
    ("GRC", 2020, 80.4, 6.14, 3.56, 5.01),
    ("GRC", 2021, 80.5, 6.22, 3.68, 5.20),
    ("GRC", 2022, 80.7, 6.30, 3.81, 5.43),
    ("ITA", 2019, 82.5, 3.86, 6.14, 6.20),
    ("ITA", 2020, 82.6, 3.94, 6.27, 6.43),
    ("ITA", 2021, 82.7, 4.02, 6.37, 6.58),
    ("ITA", 2022, 82.9, 4.10, 6.50, 6.81),
    ("PRT", 2019, 81.3, 5.36, 7.04, 5.91),
    ("PRT", 2020, 81.4, 5.44, 7.16, 6.10),
    ("PRT", 2021, 81.6, 5.52, 7.29, 6.33),
    ("PRT", 2022, 81.7, 5.60, 7.39, 6.48),
    ("SWE", 2019, 82.6, 4.06, 10.43, 8.68),
    ("SWE", 2020, 82.8, 4.14, 10.57, 8.91),
    ("SWE", 2021, 82.9, 4.22, 10.68, 9.10),
    ("SWE", 2022, 83.1, 4.30, 10.82, 9.33),
    ("USA", 2019, 77.0, 2.46, 11.64, 8.30),
    ("USA", 2020, 77.2, 2.54, 11.78, 8.53),
    ("USA", 2021, 77.3, 2.62, 11.87, 8.68),
    ("USA", 2022, 77.5, 2.70, 12.01, 8.91),
];

/// Latest-year life expectancy by sex: (code, male, female).
pub const GENDER_LIFE_EXPECTANCY: &[(&str, f64, f64)] = &[
    ("CAN", 79.6, 83.7),
    ("DEU", 78.2, 83.2),
    ("ESP", 80.4, 85.9),
    ("FRA", 79.3, 85.2),
    ("GBR", 78.6, 82.8),
    ("GRC", 78.2, 83.2),
    ("ITA", 80.7, 85.0),
    ("PRT", 78.8, 84.5),
    ("SWE", 81.4, 84.8),
    ("USA", 74.8, 80.2),
];

/// Display names for known ISO3 codes.
pub const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("PRT", "Portugal"),
    ("ESP", "Spain"),
    ("SWE", "Sweden"),
    ("GRC", "Greece"),
    ("DEU", "Germany"),
    ("FRA", "France"),
    ("ITA", "Italy"),
    ("GBR", "United Kingdom"),
    ("USA", "United States"),
    ("CAN", "Canada"),
];

/// Year the sex split in `GENDER_LIFE_EXPECTANCY` refers to.
const GENDER_SPLIT_YEAR: i32 = 2022;

/// The built-in records. The latest year of each country carries its sex
/// split.
pub fn records() -> Vec<HealthRecord> {
    ROWS.iter()
        .map(|&(code, year, le, doctors, nurses, spending)| {
            let record = HealthRecord::new(code, year, le, doctors, nurses, spending);
            match GENDER_LIFE_EXPECTANCY.iter().find(|(c, _, _)| *c == code) {
                Some(&(_, male, female)) if year == GENDER_SPLIT_YEAR => {
                    record.with_gender_split(male, female)
                }
                _ => record,
            }
        })
        .collect()
}

/// Display name for a code, if known.
pub fn country_name(code: &str) -> Option<&'static str> {
    COUNTRY_NAMES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}
