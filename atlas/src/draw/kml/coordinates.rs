use atlas_types::cartesian::Point2d;

use crate::error::AtlasError;

/// Formats points as a KML coordinate list: components of a tuple are separated by a comma, tuples by a single space.
///
/// Numbers are written in their shortest form that parses back to the same value.
pub fn format_coordinates<'a>(points: impl IntoIterator<Item = &'a Point2d>) -> String {
    let mut out = String::new();
    for (i, point) in points.into_iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{},{}", point.x, point.y));
    }
    out
}

/// Parses a KML coordinate list into 2d points.
///
/// Tuples are separated by whitespace and their components by commas. Components after the second one (altitude)
/// are dropped, which also strips the zero altitudes some tools add to every tuple. A list without any commas is read
/// as a flat sequence of numbers, two per point.
pub fn parse_coordinates(text: &str) -> Result<Vec<Point2d>, AtlasError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(vec![]);
    }

    if !text.contains(',') {
        let numbers = text
            .split_whitespace()
            .map(parse_number)
            .collect::<Result<Vec<_>, _>>()?;
        if numbers.len() % 2 != 0 {
            return Err(AtlasError::Decoding(format!(
                "odd number of coordinate components: {text}"
            )));
        }

        return Ok(numbers
            .chunks_exact(2)
            .map(|pair| Point2d::new(pair[0], pair[1]))
            .collect());
    }

    text.split_whitespace().map(parse_tuple).collect()
}

fn parse_tuple(tuple: &str) -> Result<Point2d, AtlasError> {
    let mut components = tuple.split(',').filter(|c| !c.is_empty());
    let (Some(x), Some(y)) = (components.next(), components.next()) else {
        return Err(AtlasError::Decoding(format!(
            "coordinate tuple needs two components: {tuple}"
        )));
    };

    Ok(Point2d::new(parse_number(x)?, parse_number(y)?))
}

fn parse_number(value: &str) -> Result<f64, AtlasError> {
    value
        .parse()
        .map_err(|_| AtlasError::Decoding(format!("invalid coordinate value: {value}")))
}
