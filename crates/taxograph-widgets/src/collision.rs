//! Drop-target filtering for dragged widgets.
//!
//! Geometry stays with the caller: a hit test decides whether the dragged
//! item overlaps an element, and this module only filters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Elements of `elements` for which `predicate` holds, in input order.
pub fn colliding_elements<'a, E, P>(mut predicate: P, elements: &'a [E]) -> Vec<&'a E>
where
    P: FnMut(&E) -> bool,
{
    elements.iter().filter(|e| predicate(*e)).collect()
}

/// Overlap test supplied by the drag collaborator.
pub trait HitTest<E> {
    fn hit_test(&self, element: &E, tolerance: Tolerance) -> bool;
}

/// [`colliding_elements`] driven by a [`HitTest`] at a fixed tolerance.
pub fn colliding_with<'a, D, E>(dragged: &D, elements: &'a [E], tolerance: Tolerance) -> Vec<&'a E>
where
    D: HitTest<E> + ?Sized,
{
    colliding_elements(|e| dragged.hit_test(e, tolerance), elements)
}

/// Minimum overlap, as a fraction in `0.0..=1.0`. Written as `"50%"` in
/// configuration; a bare fraction such as `"0.5"` is accepted too.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tolerance(f32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tolerance {0:?}: expected a percentage like \"50%\"")]
pub struct ToleranceError(String);

impl Tolerance {
    pub fn from_fraction(fraction: f32) -> Result<Self, ToleranceError> {
        if (0.0..=1.0).contains(&fraction) {
            Ok(Self(fraction))
        } else {
            Err(ToleranceError(fraction.to_string()))
        }
    }

    pub fn fraction(self) -> f32 {
        self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(0.5)
    }
}

impl FromStr for Tolerance {
    type Err = ToleranceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let fraction = match trimmed.strip_suffix('%') {
            Some(percent) => percent.trim().parse::<f32>().map(|p| p / 100.0),
            None => trimmed.parse::<f32>(),
        }
        .map_err(|_| ToleranceError(s.to_string()))?;
        Self::from_fraction(fraction).map_err(|_| ToleranceError(s.to_string()))
    }
}

impl TryFrom<String> for Tolerance {
    type Error = ToleranceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tolerance> for String {
    fn from(value: Tolerance) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Rounded to a thousandth of a percent; 0.3f32 * 100.0 is not 30.0.
        let percent = (self.0 * 100_000.0).round() / 1000.0;
        write!(f, "{percent}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1-D spans standing in for screen rectangles.
    struct Span(f32, f32);

    impl HitTest<Span> for Span {
        fn hit_test(&self, other: &Span, tolerance: Tolerance) -> bool {
            let overlap = (self.1.min(other.1) - self.0.max(other.0)).max(0.0);
            overlap / (self.1 - self.0) >= tolerance.fraction()
        }
    }

    #[test]
    fn test_colliding_elements_is_a_filter() {
        let elements = [1, 2, 3, 4, 5, 6];
        let hits = colliding_elements(|n| n % 2 == 0, &elements);
        assert_eq!(hits, vec![&2, &4, &6]);
        assert!(colliding_elements(|_: &i32| false, &elements).is_empty());
    }

    #[test]
    fn test_colliding_with_hit_test() {
        let dragged = Span(0.0, 10.0);
        let targets = [Span(2.0, 12.0), Span(8.0, 20.0), Span(-5.0, 5.0)];

        let half = colliding_with(&dragged, &targets, Tolerance::default());
        assert_eq!(half.len(), 2);
        assert_eq!(half[0].0, 2.0);
        assert_eq!(half[1].0, -5.0);

        let strict: Tolerance = "90%".parse().unwrap();
        assert!(colliding_with(&dragged, &targets, strict).is_empty());
    }

    #[test]
    fn test_tolerance_parsing() {
        assert_eq!("50%".parse::<Tolerance>().unwrap().fraction(), 0.5);
        assert_eq!(" 25 % ".parse::<Tolerance>().unwrap().fraction(), 0.25);
        assert_eq!("0.75".parse::<Tolerance>().unwrap().fraction(), 0.75);
        assert!("150%".parse::<Tolerance>().is_err());
        assert!("half".parse::<Tolerance>().is_err());
        assert_eq!(Tolerance::default().to_string(), "50%");
    }

    #[test]
    fn test_tolerance_serde() {
        let t: Tolerance = serde_json::from_str(r#""10%""#).unwrap();
        assert_eq!(t.fraction(), 0.1);
        assert_eq!(serde_json::to_string(&Tolerance::default()).unwrap(), r#""50%""#);
        assert!(serde_json::from_str::<Tolerance>(r#""-1%""#).is_err());
    }

    #[test]
    fn test_tolerance_displays_as_written() {
        for text in ["30%", "10%", "12.5%", "33%", "0%", "100%"] {
            let tolerance: Tolerance = text.parse().unwrap();
            assert_eq!(tolerance.to_string(), text);
        }
        let t: Tolerance = serde_json::from_str(r#""30%""#).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), r#""30%""#);
    }
}
