//! Tests for error handling

use std::path::PathBuf;

use dieindex_core::config::{IndexConfig, SchedulerKind};
use dieindex_core::error::{IndexError, IndexResult};
use dieindex_core::scanner;
use dieindex_core::types::Address;

#[test]
fn test_invalid_argument_display()
{
    let error = IndexError::InvalidArgument("test arg".to_string());
    let message = format!("{}", error);
    assert!(message.contains("Invalid argument"));
    assert!(message.contains("test arg"));
}

#[test]
fn test_object_parse_display()
{
    let error = IndexError::ObjectParse {
        path: PathBuf::from("/tmp/a.out"),
        details: "bad magic".to_string(),
    };
    let message = format!("{}", error);
    assert!(message.contains("/tmp/a.out"));
    assert!(message.contains("bad magic"));
}

#[test]
fn test_dwarf_error_keeps_source()
{
    use std::error::Error;

    let error = IndexError::dwarf("reading unit header", gimli::Error::UnexpectedEof(gimli::ReaderOffsetId(0)));
    assert!(error.to_string().contains("reading unit header"));
    assert!(error.source().is_some());
}

#[test]
fn test_io_error_conversion()
{
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error: IndexError = io.into();
    assert!(matches!(error, IndexError::Io(_)));
}

#[test]
fn test_scan_missing_file()
{
    let config = IndexConfig::default();
    let options = config.index_options().unwrap();
    let result = scanner::scan_file("/nonexistent/dieindex-test-binary", &config, options);
    assert!(matches!(result, Err(IndexError::Io(_))));
}

#[test]
fn test_config_errors()
{
    assert!(matches!("fast".parse::<SchedulerKind>(), Err(IndexError::InvalidConfig(_))));
    assert!(matches!("0xnope".parse::<Address>(), Err(IndexError::InvalidArgument(_))));
}

#[test]
fn test_result_type()
{
    // Test that Result type is properly aliased
    let _result: IndexResult<()> = Ok(());
    let _error_result: IndexResult<()> = Err(IndexError::InvalidConfig("x".to_string()));
}
