use crate::prelude::*;

#[cfg(not(feature = "stdio"))]
pub fn write_to_stdout(_buf: &[u8]) -> Xresult {
    OK
}

#[cfg(feature = "stdio")]
pub fn write_to_stdout(buf: &[u8]) -> Xresult {
    use std::io::*;
    let stdout = std::io::stdout();
    let mut h = stdout.lock();
    h.write_all(buf)
        .and_then(|_| h.flush())
        .map_err(|e| Xerr::IOError {
            filename: Xstr::from("stdout"),
            reason: e.to_string().into(),
        })
}

fn ioerror_with_path(filename: Xstr, e: &std::io::Error) -> Xerr {
    Xerr::IOError {
        filename,
        reason: Xstr::from(e.to_string()),
    }
}

pub fn read_source_file(path: &str) -> Xresult1<String> {
    std::fs::read_to_string(path).map_err(|e| ioerror_with_path(Xstr::from(path), &e))
}

#[test]
fn test_missing_file() {
    match read_source_file("no/such/file.fs") {
        Err(Xerr::IOError { filename, .. }) => assert_eq!("no/such/file.fs", filename.as_str()),
        other => panic!("{:?}", other),
    }
}
