use serde::{Deserialize, Deserializer};

use crate::error::{AppError, AppResult};

/// One field of a partial update.
///
/// A JSON key that is missing stays `Absent`, an explicit `null` becomes `Null`,
/// and anything else is `Set`. Fields using it need `#[serde(default)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// For columns that cannot be null: `Null` is an error, `Absent` means "keep".
    pub fn required(self, field: &str) -> AppResult<Option<T>> {
        match self {
            Patch::Absent => Ok(None),
            Patch::Null => Err(AppError::validation(format!("{field} cannot be null"))),
            Patch::Set(v) => Ok(Some(v)),
        }
    }

    /// `(touched, value)` pair, the shape the SQL layer binds.
    pub fn into_parts(self) -> (bool, Option<T>) {
        match self {
            Patch::Absent => (false, None),
            Patch::Null => (true, None),
            Patch::Set(v) => (true, Some(v)),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Patch<U> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Set(v) => Patch::Set(f(v)),
        }
    }

    /// Applies the patch to an optional column in place.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *slot = None,
            Patch::Set(v) => *slot = Some(v),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Set(v),
            None => Patch::Null,
        })
    }
}
