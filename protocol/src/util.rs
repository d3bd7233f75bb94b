use serde::{de::IgnoredAny, Deserialize, Deserializer};

/// Seconds as sent by the server, with anything that can't be a point in a song
/// replaced by zero.
pub fn secs_or_zero(f: f64) -> f64 {
    if f.is_finite() && f > 0.0 {
        f
    } else {
        0.0
    }
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn lenient_secs<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?
        .map(secs_or_zero)
        .unwrap_or(0.0))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Number {
    Int(u64),
    Float(f64),
    Other(IgnoredAny),
}

impl Number {
    fn whole(self) -> Option<u32> {
        match self {
            Number::Int(i) => u32::try_from(i).ok(),
            Number::Float(f) if f.is_finite() && f >= 0.0 && f <= u32::MAX as f64 => {
                Some(f.round() as u32)
            }
            Number::Float(_) | Number::Other(_) => None,
        }
    }
}

/// A non-negative whole number, or `None` for null, negatives and anything that isn't a
/// number at all. Floats are rounded.
pub(crate) fn lenient_whole<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Number>::deserialize(deserializer)?.and_then(Number::whole))
}

/// A value that is hopefully a name, but is accepted whatever it is.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum Lenient {
    Name(String),
    Other(IgnoredAny),
}

impl Lenient {
    pub fn name(&self) -> Option<&str> {
        match self {
            Lenient::Name(name) => Some(name.trim()).filter(|n| !n.is_empty()),
            Lenient::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn weird_seconds() {
        assert_eq!(0.0, secs_or_zero(-3.0));
        assert_eq!(0.0, secs_or_zero(f64::NAN));
        assert_eq!(0.0, secs_or_zero(f64::INFINITY));
        assert_eq!(12.5, secs_or_zero(12.5));
    }

    #[derive(Deserialize)]
    struct Px {
        #[serde(default, deserialize_with = "lenient_whole")]
        px: Option<u32>,
    }

    fn px(json: &str) -> Option<u32> {
        serde_json::from_str::<Px>(json).unwrap().px
    }

    #[test]
    fn weird_whole_numbers() {
        assert_eq!(Some(14), px(r#"{"px":14}"#));
        assert_eq!(Some(15), px(r#"{"px":14.5}"#));
        assert_eq!(None, px(r#"{"px":null}"#));
        assert_eq!(None, px(r#"{}"#));
        assert_eq!(None, px(r#"{"px":-3}"#));
        assert_eq!(None, px(r#"{"px":"big"}"#));
        assert_eq!(None, px(r#"{"px":[1,2]}"#));
        assert_eq!(None, px(r#"{"px":1e20}"#));
    }
}
