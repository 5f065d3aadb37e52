use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct CommaSeparatedVec<T>(pub Vec<T>);

impl<T> CommaSeparatedVec<T> {
    pub fn new() -> Self {
        CommaSeparatedVec(Vec::new())
    }
}

impl<T> Default for CommaSeparatedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'de, T> Deserialize<'de> for CommaSeparatedVec<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let vec = s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<T>())
            .collect::<Result<Vec<T>, _>>()
            .map_err(|err| {
                serde::de::Error::custom(format!("Failed to parse comma separated list: {err}"))
            })?;
        Ok(CommaSeparatedVec(vec))
    }
}

impl<T> std::fmt::Display for CommaSeparatedVec<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for field in self.0.iter() {
            if !first {
                write!(f, ",")?;
            }
            first = false;
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}

/// Deserializes a form field that may be sent blank. A blank or
/// whitespace-only value becomes `None`; anything else must parse as `T`.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let s = Option::<String>::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|err| serde::de::Error::custom(format!("'{value}': {err}"))),
    }
}
