use crate::host::properties::Properties;

/// Rectangle parameter value.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for Rect {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            opacity: 1.0,
        }
    }
}

impl Rect {
    /// Parse `x/y:wxh[:opacity]`. Opacity may be a fraction or a percentage (`50%`).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (pos, rest) = s.split_once(':')?;
        let (x, y) = pos.split_once('/')?;
        let (dims, opacity) = match rest.split_once(':') {
            Some((dims, opacity)) => (dims, Some(opacity)),
            None => (rest, None),
        };
        let (w, h) = dims.split_once('x')?;

        let opacity = match opacity.map(str::trim) {
            None => 1.0,
            Some(o) => match o.strip_suffix('%') {
                Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0,
                None => o.parse::<f64>().ok()?,
            },
        };

        Some(Self {
            x: x.trim().parse().ok()?,
            y: y.trim().parse().ok()?,
            width: w.trim().parse().ok()?,
            height: h.trim().parse().ok()?,
            opacity,
        })
    }
}

/// Named values exposed to content.
///
/// Unknown names read as the type's neutral value.
pub trait Parameters: Send + Sync {
    /// Numeric value for `name`.
    fn number(&self, name: &str) -> f64 {
        let _ = name;
        0.0
    }

    /// String value for `name`.
    fn string(&self, name: &str) -> String {
        let _ = name;
        String::new()
    }

    /// Rectangle value for `name`.
    fn rect(&self, name: &str) -> Rect {
        let _ = name;
        Rect::default()
    }
}

/// Parameters read live from an effect service's property bag.
#[derive(Clone, Debug)]
pub struct PropertyParameters {
    properties: Properties,
}

impl PropertyParameters {
    /// Wrap a property bag.
    pub fn new(properties: Properties) -> Self {
        Self { properties }
    }
}

impl Parameters for PropertyParameters {
    fn number(&self, name: &str) -> f64 {
        self.properties.get_double(name)
    }

    fn string(&self, name: &str) -> String {
        self.properties.get_string(name).unwrap_or_default()
    }

    fn rect(&self, name: &str) -> Rect {
        self.properties
            .get_string(name)
            .and_then(|s| Rect::parse(&s))
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/parameters.rs"]
mod tests;
