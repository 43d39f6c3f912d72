use std::io::{Error, ErrorKind, Result};

pub fn bad_header<A>(who: &str, what: &str) -> Result<A> {
    Err(Error::new(
        ErrorKind::InvalidData,
        format!("{}: could not decode: {}", who, what),
    ))
}
