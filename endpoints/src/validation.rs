//! Basic shape check for resolved base URLs.
//!
//! Accepted values are absolute paths served behind the same origin
//! (`/api/auth`, but not protocol-relative `//host`) and absolute `http`/`https` URLs
//! (`https://quiz.example.com`). Nothing is fetched.

use url::{ParseError, Url};

use crate::error::{ConfigValidationError, ShapeFailure, ShapeProblem};

pub fn check_shape(value: &str) -> Result<(), ShapeProblem> {
    if value.is_empty() {
        return Err(ShapeProblem::Empty);
    }
    // `//host/path` is resolved against the page's scheme, not its origin.
    if value.starts_with("//") {
        return Err(ShapeProblem::ProtocolRelative);
    }
    if value.starts_with('/') {
        return Ok(());
    }

    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(_) => Err(ShapeProblem::UnsupportedScheme),
        Err(ParseError::RelativeUrlWithoutBase) => Err(ShapeProblem::Relative),
        Err(_) => Err(ShapeProblem::Unparseable),
    }
}

/// Checks every `(name, value)` pair and reports all failures at once.
pub fn check_all<'a, I>(values: I) -> Result<(), ConfigValidationError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let failures: Vec<ShapeFailure> = values
        .into_iter()
        .filter_map(|(name, value)| {
            check_shape(value).err().map(|problem| ShapeFailure {
                name: name.to_string(),
                value: value.to_string(),
                problem,
            })
        })
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(ConfigValidationError { failures })
    }
}
