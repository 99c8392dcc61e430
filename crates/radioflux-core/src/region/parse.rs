use tracing::debug;

use crate::error::{RadioError, Result};

use super::{CoordSystem, Geometry, Length, Point, Region, Shape};

/// Shapes that annotate a display but enclose no pixels.
const ANNOTATION_SHAPES: [&str; 8] = [
    "point", "text", "line", "vector", "ruler", "compass", "projection", "composite",
];

/// Parse ds9 region text.
pub fn parse_region(text: &str) -> Result<Region> {
    let mut system = CoordSystem::Image;
    let mut shapes = Vec::new();

    for statement in text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(|line| line.split(';'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let lower = statement.to_ascii_lowercase();
        if lower.starts_with("global") {
            continue;
        }
        if let Some(next) = coordinate_system(&lower)? {
            system = next;
            continue;
        }
        if let Some(shape) = parse_shape(statement, system)? {
            shapes.push(shape);
        }
    }

    if shapes.is_empty() {
        return Err(RadioError::RegionParse("no shapes in region".into()));
    }
    Ok(Region { shapes })
}

fn coordinate_system(statement: &str) -> Result<Option<CoordSystem>> {
    match statement {
        "image" | "physical" => Ok(Some(CoordSystem::Image)),
        "fk5" | "icrs" | "j2000" => Ok(Some(CoordSystem::Sky)),
        "fk4" | "b1950" | "galactic" | "ecliptic" | "linear" | "amplifier" | "detector" => Err(
            RadioError::RegionParse(format!("unsupported coordinate system '{statement}'")),
        ),
        _ => Ok(None),
    }
}

fn parse_shape(statement: &str, system: CoordSystem) -> Result<Option<Shape>> {
    let (exclude, body) = match statement.as_bytes()[0] {
        b'-' => (true, statement[1..].trim_start()),
        b'+' => (false, statement[1..].trim_start()),
        _ => (false, statement),
    };

    let open = body
        .find('(')
        .ok_or_else(|| RadioError::RegionParse(format!("cannot parse '{statement}'")))?;
    let close = body
        .rfind(')')
        .filter(|&close| close > open)
        .ok_or_else(|| RadioError::RegionParse(format!("unbalanced parentheses in '{statement}'")))?;
    let name = body[..open].trim().to_ascii_lowercase();
    let args: Vec<&str> = body[open + 1..close]
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|a| !a.is_empty())
        .collect();

    if ANNOTATION_SHAPES.contains(&name.as_str()) {
        debug!(shape = %name, "Skipping annotation shape");
        return Ok(None);
    }

    let args = Args {
        name: &name,
        values: &args,
        system,
    };
    let geometry = match name.as_str() {
        "circle" => {
            args.expect_count(3)?;
            Geometry::Circle {
                center: args.point(0)?,
                radius: args.length(2)?,
            }
        }
        "ellipse" => {
            args.expect_range(4, 5)?;
            Geometry::Ellipse {
                center: args.point(0)?,
                semi_major: args.length(2)?,
                semi_minor: args.length(3)?,
                angle_deg: args.optional_angle(4)?,
            }
        }
        "box" => {
            args.expect_range(4, 5)?;
            Geometry::Box {
                center: args.point(0)?,
                width: args.length(2)?,
                height: args.length(3)?,
                angle_deg: args.optional_angle(4)?,
            }
        }
        "polygon" => {
            if args.values.len() < 6 || args.values.len() % 2 != 0 {
                return Err(args.error("needs an even number of at least 6 coordinates"));
            }
            Geometry::Polygon {
                vertices: (0..args.values.len())
                    .step_by(2)
                    .map(|i| args.point(i))
                    .collect::<Result<_>>()?,
            }
        }
        "annulus" => {
            if args.values.len() < 4 {
                return Err(args.error("needs a centre and at least two radii"));
            }
            Geometry::Annulus {
                center: args.point(0)?,
                inner: args.length(2)?,
                outer: args.length(args.values.len() - 1)?,
            }
        }
        other => {
            return Err(RadioError::RegionParse(format!(
                "unsupported shape '{other}'"
            )))
        }
    };

    Ok(Some(Shape {
        system,
        geometry,
        exclude,
    }))
}

struct Args<'a> {
    name: &'a str,
    values: &'a [&'a str],
    system: CoordSystem,
}

impl Args<'_> {
    fn error(&self, msg: &str) -> RadioError {
        RadioError::RegionParse(format!("{}: {}", self.name, msg))
    }

    fn expect_count(&self, n: usize) -> Result<()> {
        self.expect_range(n, n)
    }

    fn expect_range(&self, min: usize, max: usize) -> Result<()> {
        let got = self.values.len();
        if got < min || got > max {
            return Err(self.error(&format!("expected {min}..={max} arguments, got {got}")));
        }
        Ok(())
    }

    fn point(&self, index: usize) -> Result<Point> {
        let (x, y) = (self.values[index], self.values[index + 1]);
        let parsed = match self.system {
            CoordSystem::Image => parse_plain(x).zip(parse_plain(y)),
            CoordSystem::Sky => parse_ra(x).zip(parse_dec(y)),
        };
        parsed
            .map(|(x, y)| Point { x, y })
            .ok_or_else(|| self.error(&format!("bad coordinate ({x}, {y})")))
    }

    fn length(&self, index: usize) -> Result<Length> {
        let raw = self.values[index];
        parse_length(raw, self.system).ok_or_else(|| self.error(&format!("bad size '{raw}'")))
    }

    fn optional_angle(&self, index: usize) -> Result<f64> {
        match self.values.get(index) {
            Some(raw) => {
                parse_plain(raw).ok_or_else(|| self.error(&format!("bad angle '{raw}'")))
            }
            None => Ok(0.0),
        }
    }
}

fn parse_plain(s: &str) -> Option<f64> {
    s.trim_end_matches('d').parse().ok()
}

/// Right ascension: `hh:mm:ss.s` in hours, otherwise decimal degrees.
fn parse_ra(s: &str) -> Option<f64> {
    if s.contains(':') {
        sexagesimal(s).map(|hours| hours * 15.0)
    } else {
        parse_plain(s)
    }
}

/// Declination: `[+-]dd:mm:ss.s`, otherwise decimal degrees.
fn parse_dec(s: &str) -> Option<f64> {
    if s.contains(':') {
        sexagesimal(s)
    } else {
        parse_plain(s)
    }
}

fn sexagesimal(s: &str) -> Option<f64> {
    let negative = s.trim_start().starts_with('-');
    let mut total = 0.0;
    let mut scale = 1.0;
    for part in s.split(':') {
        let value: f64 = part.trim().trim_start_matches(['+', '-']).parse().ok()?;
        total += value / scale;
        scale *= 60.0;
    }
    Some(if negative { -total } else { total })
}

fn parse_length(s: &str, system: CoordSystem) -> Option<Length> {
    let (number, unit) = match s.char_indices().last()? {
        (i, '"') => (&s[..i], Some(1.0 / 3600.0)),
        (i, '\'') => (&s[..i], Some(1.0 / 60.0)),
        (i, 'd') => (&s[..i], Some(1.0)),
        (i, 'r') => (&s[..i], Some(180.0 / std::f64::consts::PI)),
        (i, 'i' | 'p') => (&s[..i], None),
        _ => (
            s,
            match system {
                CoordSystem::Sky => Some(1.0),
                CoordSystem::Image => None,
            },
        ),
    };
    let value: f64 = number.parse().ok()?;
    Some(match unit {
        Some(to_degrees) => Length::Degrees(value * to_degrees),
        None => Length::Pixels(value),
    })
}
