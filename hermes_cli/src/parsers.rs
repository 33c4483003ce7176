use hermes_navigation::coordinate::Coordinate;

/// Parses `lat,lng` in decimal degrees.
pub fn parse_coordinate(input: &str) -> Result<Coordinate, String> {
    let (lat, lng) = input
        .split_once(',')
        .ok_or_else(|| String::from("Expected lat,lng"))?;

    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid latitude: {lat}"))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid longitude: {lng}"))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(String::from("Coordinate out of range"));
    }

    Ok(Coordinate::new(lat, lng))
}
