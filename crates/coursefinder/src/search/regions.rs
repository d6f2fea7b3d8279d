//! UK regions offered by the location filter and the cities each one covers.

/// Region name followed by its cities.
pub const LOCATION_REGIONS: &[(&str, &[&str])] = &[
    (
        "London & South East",
        &["London", "Brighton", "Oxford", "Reading", "Southampton", "Surrey", "Kent", "Sussex"],
    ),
    (
        "South West",
        &["Bristol", "Bath", "Exeter", "Plymouth", "Bournemouth", "Falmouth"],
    ),
    (
        "West Midlands",
        &["Birmingham", "Coventry", "Warwick", "Wolverhampton", "Aston"],
    ),
    (
        "East Midlands",
        &["Nottingham", "Leicester", "Loughborough", "Derby", "Lincoln"],
    ),
    (
        "North West",
        &["Manchester", "Liverpool", "Lancaster", "Chester", "Salford"],
    ),
    (
        "North East & Yorkshire",
        &["Leeds", "Sheffield", "York", "Newcastle", "Durham", "Hull", "Bradford"],
    ),
    (
        "Scotland",
        &["Edinburgh", "Glasgow", "Aberdeen", "St Andrews", "Dundee", "Stirling"],
    ),
    ("Wales", &["Cardiff", "Swansea", "Bangor", "Aberystwyth"]),
    ("Northern Ireland", &["Belfast", "Ulster"]),
];

/// Cities of a region, matched case-insensitively. Empty for an unknown region.
pub fn cities_for_region(region: &str) -> &'static [&'static str] {
    let region = region.trim();
    LOCATION_REGIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(region))
        .map(|(_, cities)| *cities)
        .unwrap_or(&[])
}

/// Whether `place` is exactly one of the cities listed under any region.
pub fn is_listed_city(place: &str) -> bool {
    let place = place.trim();
    LOCATION_REGIONS
        .iter()
        .flat_map(|(_, cities)| cities.iter())
        .any(|city| city.eq_ignore_ascii_case(place))
}

pub fn region_names() -> Vec<&'static str> {
    LOCATION_REGIONS.iter().map(|(name, _)| *name).collect()
}
