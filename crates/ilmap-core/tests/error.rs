//! Tests for error handling

use ilmap_core::error::{IlmapError, IlmapResult};

#[test]
fn test_error_display()
{
    let error = IlmapError::NotFound("no module registered at 0x1000".to_string());
    assert_eq!(format!("{error}"), "Not found: no module registered at 0x1000");

    let error = IlmapError::NoSymbols("App.dll".to_string());
    assert!(error.to_string().contains("App.dll"));

    let error = IlmapError::HostUnavailable("runtime missing".to_string());
    assert!(error.to_string().contains("runtime missing"));
}

#[test]
fn test_recoverable_errors()
{
    assert!(IlmapError::NotFound(String::new()).is_recoverable());
    assert!(IlmapError::NoSymbols(String::new()).is_recoverable());
    assert!(IlmapError::Provider(String::new()).is_recoverable());

    assert!(!IlmapError::MalformedMetadata(String::new()).is_recoverable());
    assert!(!IlmapError::HostUnavailable(String::new()).is_recoverable());
    assert!(!IlmapError::OutOfMemory.is_recoverable());
    assert!(!IlmapError::InvalidArgument(String::new()).is_recoverable());
}

#[test]
fn test_result_type()
{
    fn lookup(found: bool) -> IlmapResult<u32>
    {
        if found {
            Ok(42)
        } else {
            Err(IlmapError::NotFound("missing".to_string()))
        }
    }

    fn chained() -> IlmapResult<u32>
    {
        let value = lookup(true)?;
        lookup(false).map(|other| value + other)
    }

    assert_eq!(lookup(true), Ok(42));
    assert_eq!(chained(), Err(IlmapError::NotFound("missing".to_string())));
}
