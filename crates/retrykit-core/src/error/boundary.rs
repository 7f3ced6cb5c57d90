/// Declare how a foreign error converts into a retrykit error type.
///
/// Generates the `From` implementation so the `?` operator converts at the
/// boundary without `map_err()` chains.
///
/// # Syntax
///
/// ```ignore
/// error_boundary!(SourceError => TargetError, |err_var| {
///     // conversion logic returning TargetError
/// });
/// ```
///
/// # Example
///
/// ```
/// use retrykit_core::error_boundary;
///
/// #[derive(Debug, thiserror::Error)]
/// enum LoadError {
///     #[error("bad number: {0}")]
///     Number(String),
/// }
///
/// error_boundary!(std::num::ParseIntError => LoadError, |e| {
///     LoadError::Number(e.to_string())
/// });
///
/// fn max_attempts(raw: &str) -> Result<u32, LoadError> {
///     Ok(raw.parse::<u32>()?)
/// }
///
/// assert!(max_attempts("three").is_err());
/// assert_eq!(max_attempts("3").unwrap(), 3);
/// ```
#[macro_export]
macro_rules! error_boundary {
    ($inner:ty => $outer:ty, |$err:ident| $body:expr) => {
        impl ::std::convert::From<$inner> for $outer {
            fn from($err: $inner) -> $outer {
                $body
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[derive(Debug, thiserror::Error, PartialEq)]
    enum TestError {
        #[error("Parse: {0}")]
        Parse(String),
    }

    error_boundary!(std::num::ParseIntError => TestError, |e| {
        TestError::Parse(e.to_string())
    });

    #[test]
    fn test_error_boundary_with_question_mark() {
        fn parse_attempts(s: &str) -> Result<u32, TestError> {
            let num = s.parse::<u32>()?;
            Ok(num)
        }

        match parse_attempts("-1").unwrap_err() {
            TestError::Parse(msg) => assert!(msg.contains("invalid digit")),
        }
        assert_eq!(parse_attempts("5"), Ok(5));
    }
}
